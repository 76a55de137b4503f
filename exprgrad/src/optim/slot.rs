//! Per-occurrence bookkeeping for the forward and backward passes.

use crate::expr::NodeId;
use crate::numeric::Numeric;

/// Local partial derivatives recorded for one slot during the forward pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocalPartials<T> {
    /// Terminal slot: nothing to propagate.
    None,
    /// `d(result)/d(child)`.
    Unary(T),
    /// `(d(result)/d(lhs), d(result)/d(rhs))`.
    Binary(T, T),
}

/// Mutable record backing one visit of a [`ComputationOrder`](crate::ComputationOrder).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientSlot<T> {
    /// The arena node this slot evaluates.
    pub node: NodeId,
    /// Value computed by the last forward pass.
    pub value: T,
    /// Gradient accumulated so far in the current backward pass.
    pub grad: T,
    pub partials: LocalPartials<T>,
}

impl<T: Numeric> GradientSlot<T> {
    pub(crate) fn new(node: NodeId) -> Self {
        Self {
            node,
            value: T::zero(),
            grad: T::zero(),
            partials: LocalPartials::None,
        }
    }

    #[inline]
    pub(crate) fn accumulate(&mut self, g: T) {
        self.grad += g;
    }

    #[inline]
    pub(crate) fn reset_grad(&mut self) {
        self.grad = T::zero();
    }
}
