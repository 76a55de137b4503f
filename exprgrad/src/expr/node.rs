//! Arena node variants and the local-derivative rules of every operator.

use std::fmt;

use crate::numeric::Numeric;

/// Index of a node inside its [`Graph`](super::Graph) arena.
///
/// Ids are handed out in creation order, so a node's children always have
/// smaller ids than the node itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position of the node in the arena.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Arity class of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// No children: constants, variables and placeholders.
    Terminal,
    /// One child.
    Unary,
    /// Two children.
    Binary,
}

/// Which kind of leaf a terminal node is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeafKind {
    Constant,
    /// Trainable; updated by the optimizer.
    Variable,
    Placeholder,
}

/// Operators taking one operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Log,
    Sin,
    Cos,
    Tan,
    Exp,
}

impl UnaryOp {
    /// Applies the operator to `a`.
    #[inline]
    pub fn apply<T: Numeric>(self, a: T) -> T {
        match self {
            UnaryOp::Neg => -a,
            UnaryOp::Log => a.ln(),
            UnaryOp::Sin => a.sin(),
            UnaryOp::Cos => a.cos(),
            UnaryOp::Tan => a.tan(),
            UnaryOp::Exp => a.exp(),
        }
    }

    /// Partial derivative of the result with respect to `a`, given the
    /// already computed `result`.
    #[inline]
    pub fn partial<T: Numeric>(self, a: T, result: T) -> T {
        match self {
            UnaryOp::Neg => -T::one(),
            UnaryOp::Log => a.recip(),
            UnaryOp::Sin => a.cos(),
            UnaryOp::Cos => -a.sin(),
            UnaryOp::Tan => {
                let c = a.cos();
                (c * c).recip()
            }
            UnaryOp::Exp => result,
        }
    }

    pub(crate) fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Log => "log",
            UnaryOp::Sin => "sin",
            UnaryOp::Cos => "cos",
            UnaryOp::Tan => "tan",
            UnaryOp::Exp => "exp",
        }
    }
}

/// Operators taking two operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinaryOp {
    /// Applies the operator to `a` and `b`.
    #[inline]
    pub fn apply<T: Numeric>(self, a: T, b: T) -> T {
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
            BinaryOp::Pow => a.powf(b),
        }
    }

    /// Partial derivatives `(d/da, d/db)` of the result, given the already
    /// computed `result`.
    ///
    /// `Div` and `Pow` need `b` (resp. `a`) to be invertible, and the `Pow`
    /// exponent partial needs `a > 0`. Outside that domain the partials are
    /// infinite or NaN, exactly as the formulas evaluate.
    #[inline]
    pub fn partials<T: Numeric>(self, a: T, b: T, result: T) -> (T, T) {
        match self {
            BinaryOp::Add => (T::one(), T::one()),
            BinaryOp::Sub => (T::one(), -T::one()),
            BinaryOp::Mul => (b, a),
            BinaryOp::Div => (b.recip(), -a / (b * b)),
            BinaryOp::Pow => (b * result * a.recip(), result * a.ln()),
        }
    }

    pub(crate) fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "^",
        }
    }
}

/// One arena entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Node<T> {
    Constant(T),
    Variable(T),
    Placeholder(Option<T>),
    Unary { op: UnaryOp, arg: NodeId },
    Binary { op: BinaryOp, lhs: NodeId, rhs: NodeId },
}

impl<T> Node<T> {
    pub(crate) fn kind(&self) -> NodeKind {
        match self {
            Node::Constant(_) | Node::Variable(_) | Node::Placeholder(_) => NodeKind::Terminal,
            Node::Unary { .. } => NodeKind::Unary,
            Node::Binary { .. } => NodeKind::Binary,
        }
    }

    pub(crate) fn leaf_kind(&self) -> Option<LeafKind> {
        match self {
            Node::Constant(_) => Some(LeafKind::Constant),
            Node::Variable(_) => Some(LeafKind::Variable),
            Node::Placeholder(_) => Some(LeafKind::Placeholder),
            Node::Unary { .. } | Node::Binary { .. } => None,
        }
    }
}
