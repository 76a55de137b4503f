//! Expression graph: an arena of constant, variable, placeholder and operator nodes.
//!
//! A [`Graph`] owns every node. Expressions are lightweight [`Expr`] handles
//! (`Copy`, a graph reference plus a [`NodeId`]), so building `a * a` stores two
//! references to the same node instead of copying `a`. The borrow of the graph
//! guarantees that the nodes outlive every expression, order and optimizer
//! built over them.
//!
//! Operators `+ - * /` and unary `-` combine any mix of [`Expr`], [`Variable`]
//! and [`Placeholder`]; [`Pow`], [`Log`], [`Sin`], [`Cos`], [`Tan`] and [`Exp`]
//! (or the free functions of the same names) build the remaining operators.
//! Raw scalars must be wrapped with [`Graph::constant`] first.

mod impls;
mod node;

use std::cell::RefCell;
use std::fmt;

use crate::error::{Error, Result};
use crate::numeric::Numeric;

pub use impls::ops::{cos, exp, log, pow, sin, tan};
pub use node::{BinaryOp, LeafKind, NodeId, NodeKind, UnaryOp};

pub(crate) use node::Node;

/// Trait for raising an expression to a power (e.g. `x.pow(two)`).
pub trait Pow<Rhs> {
    /// Result of the power operation.
    type Output;

    /// Returns `self^exp`.
    #[must_use]
    fn pow(self, exp: Rhs) -> Self::Output;
}

/// Trait for the natural log of an expression.
pub trait Log {
    /// Result of the log.
    type Output;

    /// Returns `ln(self)`.
    #[must_use]
    fn log(self) -> Self::Output;
}

/// Trait for the sine of an expression.
pub trait Sin {
    type Output;

    #[must_use]
    fn sin(self) -> Self::Output;
}

/// Trait for the cosine of an expression.
pub trait Cos {
    type Output;

    #[must_use]
    fn cos(self) -> Self::Output;
}

/// Trait for the tangent of an expression.
pub trait Tan {
    type Output;

    #[must_use]
    fn tan(self) -> Self::Output;
}

/// Trait for the exponential of an expression.
pub trait Exp {
    /// Result of the exponential.
    type Output;

    /// Returns `e^self`.
    #[must_use]
    fn exp(self) -> Self::Output;
}

/// Arena holding every node of one or more expression trees.
///
/// Nodes are append-only. Leaf state (variable values, placeholder feeds)
/// lives in the arena behind a `RefCell`, so the graph is single-threaded.
pub struct Graph<T: Numeric = f64> {
    nodes: RefCell<Vec<Node<T>>>,
}

impl<T: Numeric> Default for Graph<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Numeric> fmt::Debug for Graph<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("nodes", &*self.nodes.borrow())
            .finish()
    }
}

impl<T: Numeric> Graph<T> {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: RefCell::new(Vec::new()),
        }
    }

    /// Number of nodes in the arena.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.borrow().is_empty()
    }

    /// Adds an immutable, non-trainable leaf.
    pub fn constant(&self, value: T) -> Expr<'_, T> {
        self.push(Node::Constant(value))
    }

    /// Adds a trainable leaf with the given initial value.
    pub fn variable(&self, initial: T) -> Variable<'_, T> {
        Variable(self.push(Node::Variable(initial)))
    }

    /// Adds a leaf whose value must be fed before it is read.
    pub fn placeholder(&self) -> Placeholder<'_, T> {
        Placeholder(self.push(Node::Placeholder(None)))
    }

    fn push(&self, node: Node<T>) -> Expr<'_, T> {
        let mut nodes = self.nodes.borrow_mut();
        let id = NodeId(nodes.len());
        nodes.push(node);
        Expr { graph: self, id }
    }

    pub(crate) fn node(&self, id: NodeId) -> Node<T> {
        self.nodes.borrow()[id.0]
    }

    /// Like [`node`](Self::node), but `None` for ids this arena never handed out.
    pub(crate) fn try_node(&self, id: NodeId) -> Option<Node<T>> {
        self.nodes.borrow().get(id.0).copied()
    }

    /// Value stored in a leaf; fails for unfed placeholders.
    pub(crate) fn leaf_value(&self, id: NodeId) -> Result<T> {
        match self.node(id) {
            Node::Constant(v) | Node::Variable(v) => Ok(v),
            Node::Placeholder(v) => v.ok_or(Error::MissingValue { node: id }),
            Node::Unary { .. } | Node::Binary { .. } => {
                unreachable!("node {id} is not a leaf")
            }
        }
    }

    pub(crate) fn add_to_variable(&self, id: NodeId, delta: T) {
        if let Node::Variable(v) = &mut self.nodes.borrow_mut()[id.0] {
            *v += delta;
        }
    }

    fn feed(&self, id: NodeId, value: T) {
        if let Node::Placeholder(slot) = &mut self.nodes.borrow_mut()[id.0] {
            *slot = Some(value);
        }
    }

    /// Evaluates `root` from the current leaf state.
    ///
    /// Only nodes reachable from `root` are touched, each exactly once, in
    /// increasing id order (children before parents).
    fn evaluate(&self, root: NodeId) -> Result<T> {
        let nodes = self.nodes.borrow();
        let mut reachable = vec![false; root.0 + 1];
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if reachable[id.0] {
                continue;
            }
            reachable[id.0] = true;
            match nodes[id.0] {
                Node::Unary { arg, .. } => stack.push(arg),
                Node::Binary { lhs, rhs, .. } => {
                    stack.push(lhs);
                    stack.push(rhs);
                }
                _ => {}
            }
        }

        let mut values: Vec<Option<T>> = vec![None; root.0 + 1];
        for (i, node) in nodes[..=root.0].iter().enumerate() {
            if !reachable[i] {
                continue;
            }
            let value = match *node {
                Node::Constant(v) | Node::Variable(v) => v,
                Node::Placeholder(v) => v.ok_or(Error::MissingValue { node: NodeId(i) })?,
                Node::Unary { op, arg } => op.apply(computed(&values, arg)),
                Node::Binary { op, lhs, rhs } => {
                    op.apply(computed(&values, lhs), computed(&values, rhs))
                }
            };
            values[i] = Some(value);
        }
        Ok(computed(&values, root))
    }

    /// Writes `id` in fully parenthesized infix form with an explicit stack.
    ///
    /// Output is not deduplicated: a shared node is written once per
    /// occurrence, so the text grows like [`ComputationOrder::size_of`](crate::ComputationOrder::size_of).
    fn render(&self, id: NodeId, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        enum Piece {
            Node(NodeId),
            Infix(BinaryOp),
            Close,
        }

        let mut stack = vec![Piece::Node(id)];
        while let Some(piece) = stack.pop() {
            match piece {
                Piece::Close => f.write_str(")")?,
                Piece::Infix(op) => write!(f, " {} ", op.symbol())?,
                Piece::Node(id) => match self.node(id) {
                    Node::Constant(v) => write!(f, "{v:?}")?,
                    Node::Variable(_) => write!(f, "var{id}")?,
                    Node::Placeholder(_) => write!(f, "ph{id}")?,
                    Node::Unary { op, arg } => {
                        write!(f, "{}(", op.symbol())?;
                        stack.extend([Piece::Close, Piece::Node(arg)]);
                    }
                    Node::Binary { op, lhs, rhs } => {
                        f.write_str("(")?;
                        stack.extend([
                            Piece::Close,
                            Piece::Node(rhs),
                            Piece::Infix(op),
                            Piece::Node(lhs),
                        ]);
                    }
                },
            }
        }
        Ok(())
    }
}

fn computed<T: Copy>(values: &[Option<T>], id: NodeId) -> T {
    match values[id.0] {
        Some(v) => v,
        None => unreachable!("child {id} evaluated after its parent"),
    }
}

/// Handle to a node of a [`Graph`].
pub struct Expr<'g, T: Numeric = f64> {
    graph: &'g Graph<T>,
    id: NodeId,
}

impl<T: Numeric> Clone for Expr<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Numeric> Copy for Expr<'_, T> {}

impl<T: Numeric> fmt::Debug for Expr<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expr")
            .field("id", &self.id)
            .field("kind", &self.kind())
            .finish()
    }
}

/// Renders the expression in fully parenthesized infix form.
///
/// Shared sub-expressions are spelled out at every use, so heavily shared
/// graphs produce text exponential in their depth.
impl<T: Numeric> fmt::Display for Expr<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.graph.render(self.id, f)
    }
}

impl<'g, T: Numeric> Expr<'g, T> {
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The graph this expression lives in.
    #[must_use]
    pub fn graph(&self) -> &'g Graph<T> {
        self.graph
    }

    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.graph.node(self.id).kind()
    }

    /// Leaf kind, or `None` for operator nodes.
    #[must_use]
    pub fn leaf_kind(&self) -> Option<LeafKind> {
        self.graph.node(self.id).leaf_kind()
    }

    /// Current value, computed from the present leaf state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingValue`] if a placeholder reachable from this
    /// expression has not been fed.
    pub fn value(&self) -> Result<T> {
        self.graph.evaluate(self.id)
    }

    /// Whether both handles point into the same arena.
    #[must_use]
    pub fn same_graph(&self, other: &Expr<'_, T>) -> bool {
        std::ptr::eq(self.graph, other.graph)
    }

    pub(crate) fn unary(self, op: UnaryOp) -> Expr<'g, T> {
        self.graph.push(Node::Unary { op, arg: self.id })
    }

    /// # Panics
    ///
    /// Panics if `rhs` belongs to a different graph.
    pub(crate) fn binary(self, op: BinaryOp, rhs: Expr<'g, T>) -> Expr<'g, T> {
        assert!(
            self.same_graph(&rhs),
            "cannot combine {} with {}: expressions belong to different graphs",
            self.id,
            rhs.id
        );
        self.graph.push(Node::Binary {
            op,
            lhs: self.id,
            rhs: rhs.id,
        })
    }
}

/// Trainable leaf. Its value changes only through an optimizer update.
pub struct Variable<'g, T: Numeric = f64>(Expr<'g, T>);

impl<T: Numeric> Clone for Variable<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Numeric> Copy for Variable<'_, T> {}

impl<T: Numeric> fmt::Debug for Variable<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Variable").field(&self.0.id).finish()
    }
}

impl<'g, T: Numeric> Variable<'g, T> {
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.0.id
    }

    /// The variable as a plain expression.
    #[must_use]
    pub fn expr(&self) -> Expr<'g, T> {
        self.0
    }

    /// Current value.
    #[must_use]
    pub fn value(&self) -> T {
        match self.0.graph.node(self.0.id) {
            Node::Variable(v) => v,
            _ => unreachable!("variable handle points at a non-variable node"),
        }
    }
}

impl<'g, T: Numeric> From<Variable<'g, T>> for Expr<'g, T> {
    fn from(v: Variable<'g, T>) -> Self {
        v.0
    }
}

/// Leaf fed with a value from outside before each evaluation.
pub struct Placeholder<'g, T: Numeric = f64>(Expr<'g, T>);

impl<T: Numeric> Clone for Placeholder<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Numeric> Copy for Placeholder<'_, T> {}

impl<T: Numeric> fmt::Debug for Placeholder<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Placeholder").field(&self.0.id).finish()
    }
}

impl<'g, T: Numeric> Placeholder<'g, T> {
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.0.id
    }

    /// The placeholder as a plain expression.
    #[must_use]
    pub fn expr(&self) -> Expr<'g, T> {
        self.0
    }

    /// Stores `value`, replacing any earlier feed.
    pub fn feed(&self, value: T) {
        self.0.graph.feed(self.0.id, value);
    }

    #[must_use]
    pub fn is_fed(&self) -> bool {
        matches!(self.0.graph.node(self.0.id), Node::Placeholder(Some(_)))
    }

    /// The fed value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingValue`] if nothing has been fed yet.
    pub fn value(&self) -> Result<T> {
        self.0.graph.leaf_value(self.0.id)
    }
}

impl<'g, T: Numeric> From<Placeholder<'g, T>> for Expr<'g, T> {
    fn from(p: Placeholder<'g, T>) -> Self {
        p.0
    }
}
