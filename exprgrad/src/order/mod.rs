//! Computation order: the linear, children-before-parent layout of an expression.
//!
//! Every *occurrence* of a node gets its own slot. A node reachable along two
//! paths (e.g. `a` in `a * a`) is laid out twice, so the backward pass can
//! accumulate one gradient contribution per occurrence. For a node with
//! children `a` and `b` the left subtree occupies `[0, size(a))`, the right
//! subtree the next `size(b)` slots, and the node itself the final slot.
//!
//! The order depends only on the expression's shape, never on leaf values,
//! so one order can be reused across any number of optimization steps.

use log::trace;

use crate::error::{Error, Result};
use crate::expr::{BinaryOp, Expr, LeafKind, Node, NodeId, NodeKind, UnaryOp};
use crate::numeric::Numeric;

/// What a slot computes, with children given as slot indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitKind {
    Terminal { leaf: LeafKind },
    Unary { op: UnaryOp, child: usize },
    Binary { op: BinaryOp, lhs: usize, rhs: usize },
}

/// One node occurrence in the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visit {
    /// Position of this visit in the order.
    pub slot: usize,
    /// The arena node this occurrence refers to.
    pub node: NodeId,
    pub kind: VisitKind,
}

impl Visit {
    #[must_use]
    pub fn node_kind(&self) -> NodeKind {
        match self.kind {
            VisitKind::Terminal { .. } => NodeKind::Terminal,
            VisitKind::Unary { .. } => NodeKind::Unary,
            VisitKind::Binary { .. } => NodeKind::Binary,
        }
    }

    /// Child slot indices (empty for terminals).
    #[must_use]
    pub fn children(&self) -> Vec<usize> {
        match self.kind {
            VisitKind::Terminal { .. } => Vec::new(),
            VisitKind::Unary { child, .. } => vec![child],
            VisitKind::Binary { lhs, rhs, .. } => vec![lhs, rhs],
        }
    }
}

/// Depth-first, left-first, children-before-parent order of an expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputationOrder {
    visits: Vec<Visit>,
}

/// Largest order whose visits fit in one allocation.
const MAX_VISITS: usize = isize::MAX as usize / std::mem::size_of::<Visit>();

enum Step {
    Enter(NodeId),
    Emit(NodeId),
}

impl ComputationOrder {
    /// Lays out `root` with an explicit stack.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OrderTooLarge`] if `root` has more occurrences than an
    /// order can hold (see [`size_of`](Self::size_of)).
    pub fn build<T: Numeric>(root: Expr<'_, T>) -> Result<Self> {
        let size = Self::size_of(root)
            .filter(|&n| n <= MAX_VISITS)
            .ok_or(Error::OrderTooLarge { root: root.id() })?;
        let graph = root.graph();
        let mut visits = Vec::with_capacity(size);
        // Slots of finished subtrees whose parent has not been emitted yet.
        let mut finished: Vec<usize> = Vec::new();
        let mut stack = vec![Step::Enter(root.id())];

        while let Some(step) = stack.pop() {
            match step {
                Step::Enter(id) => {
                    stack.push(Step::Emit(id));
                    match graph.node(id) {
                        Node::Unary { arg, .. } => stack.push(Step::Enter(arg)),
                        Node::Binary { lhs, rhs, .. } => {
                            stack.push(Step::Enter(rhs));
                            stack.push(Step::Enter(lhs));
                        }
                        _ => {}
                    }
                }
                Step::Emit(id) => {
                    let node = graph.node(id);
                    let kind = match node {
                        Node::Unary { op, .. } => VisitKind::Unary {
                            op,
                            child: pop_finished(&mut finished),
                        },
                        Node::Binary { op, .. } => {
                            let rhs = pop_finished(&mut finished);
                            let lhs = pop_finished(&mut finished);
                            VisitKind::Binary { op, lhs, rhs }
                        }
                        leaf => VisitKind::Terminal {
                            leaf: leaf
                                .leaf_kind()
                                .unwrap_or_else(|| unreachable!("operator handled above")),
                        },
                    };
                    let slot = visits.len();
                    visits.push(Visit {
                        slot,
                        node: id,
                        kind,
                    });
                    finished.push(slot);
                }
            }
        }

        trace!("computation order for {}: {} slots", root.id(), visits.len());
        Ok(Self { visits })
    }

    /// Number of slots [`build`](Self::build) lays out for `root`:
    /// `1` for a terminal, `size(a) + 1` for a unary node, `size(a) + size(b) + 1`
    /// for a binary node.
    ///
    /// Sharing makes the count grow exponentially with depth (`e = e + e`
    /// repeated 64 times already exceeds `usize`); `None` when it overflows.
    #[must_use]
    pub fn size_of<T: Numeric>(root: Expr<'_, T>) -> Option<usize> {
        let graph = root.graph();
        // Sizes are memoized per arena node; ids below the root cover all children.
        let mut sizes: Vec<Option<usize>> = vec![None; root.id().index() + 1];
        let mut stack = vec![root.id()];
        while let Some(&id) = stack.last() {
            if sizes[id.index()].is_some() {
                stack.pop();
                continue;
            }
            let size = match graph.node(id) {
                Node::Unary { arg, .. } => match sizes[arg.index()] {
                    Some(a) => Some(a.checked_add(1)?),
                    None => {
                        stack.push(arg);
                        None
                    }
                },
                Node::Binary { lhs, rhs, .. } => {
                    match (sizes[lhs.index()], sizes[rhs.index()]) {
                        (Some(a), Some(b)) => Some(a.checked_add(b)?.checked_add(1)?),
                        (a, b) => {
                            if a.is_none() {
                                stack.push(lhs);
                            }
                            if b.is_none() {
                                stack.push(rhs);
                            }
                            None
                        }
                    }
                }
                _ => Some(1),
            };
            if let Some(size) = size {
                sizes[id.index()] = Some(size);
                stack.pop();
            }
        }
        sizes[root.id().index()]
    }

    /// Checks that this order lays out exactly `root`, node for node.
    ///
    /// Runs in one pass over the visits and does not rebuild the order: every
    /// visit must match its arena node's operator (or leaf kind), and its child
    /// slots must hold that node's operands.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OrderMismatch`] if the order belongs to another expression.
    pub fn check_shape<T: Numeric>(&self, root: Expr<'_, T>) -> Result<()> {
        let mismatch = || Error::OrderMismatch {
            expected: self.root_node().unwrap_or(root.id()),
            found: root.id(),
        };
        if self.root_node() != Some(root.id()) {
            return Err(mismatch());
        }
        let graph = root.graph();
        for visit in &self.visits {
            let node = graph.try_node(visit.node).ok_or_else(mismatch)?;
            let operands_match = match (node, visit.kind) {
                (Node::Unary { op, arg }, VisitKind::Unary { op: o, child }) => {
                    op == o && self.visits[child].node == arg
                }
                (Node::Binary { op, lhs, rhs }, VisitKind::Binary { op: o, lhs: l, rhs: r }) => {
                    op == o && self.visits[l].node == lhs && self.visits[r].node == rhs
                }
                (leaf, VisitKind::Terminal { leaf: kind }) => leaf.leaf_kind() == Some(kind),
                _ => false,
            };
            if !operands_match {
                return Err(mismatch());
            }
        }
        Ok(())
    }

    /// Re-targets this order at `root`, which may be a different expression
    /// (or live in another graph) as long as it has the same shape.
    ///
    /// Walks the visits from the root slot down, handing every operator's
    /// operands to its child slots, so no traversal of `root` is repeated.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OrderMismatch`] if `root`'s shape differs.
    pub fn rebind<T: Numeric>(mut self, root: Expr<'_, T>) -> Result<Self> {
        let expected = self.root_node().unwrap_or(root.id());
        let mismatch = Error::OrderMismatch {
            expected,
            found: root.id(),
        };
        let graph = root.graph();
        let root_slot = self.root_slot();
        self.visits[root_slot].node = root.id();

        // Parents sit after their children, so a slot's node is assigned
        // before the slot itself is reached.
        for slot in (0..self.visits.len()).rev() {
            let visit = self.visits[slot];
            let Some(node) = graph.try_node(visit.node) else {
                return Err(mismatch);
            };
            match (node, visit.kind) {
                (Node::Unary { op, arg }, VisitKind::Unary { op: o, child }) if op == o => {
                    self.visits[child].node = arg;
                }
                (
                    Node::Binary { op, lhs, rhs },
                    VisitKind::Binary { op: o, lhs: l, rhs: r },
                ) if op == o => {
                    self.visits[l].node = lhs;
                    self.visits[r].node = rhs;
                }
                (leaf, VisitKind::Terminal { leaf: kind }) if leaf.leaf_kind() == Some(kind) => {}
                _ => return Err(mismatch),
            }
        }
        Ok(self)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.visits.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.visits.is_empty()
    }

    #[must_use]
    pub fn visits(&self) -> &[Visit] {
        &self.visits
    }

    /// Slot of the root expression (always the last one).
    #[must_use]
    pub fn root_slot(&self) -> usize {
        self.visits.len().saturating_sub(1)
    }

    #[must_use]
    pub fn root_node(&self) -> Option<NodeId> {
        self.visits.last().map(|v| v.node)
    }
}

fn pop_finished(finished: &mut Vec<usize>) -> usize {
    finished
        .pop()
        .unwrap_or_else(|| unreachable!("children are emitted before their parent"))
}
