//! Optimizer: forward evaluation, reverse-mode backprop and gradient updates.
//!
//! An [`Optimizer`] binds to a root expression, lays it out once as a
//! [`ComputationOrder`] and keeps one [`GradientSlot`] per visit. Each
//! iteration runs
//!
//! 1. [`feed_placeholders`](Optimizer::feed_placeholders) (when the expression has placeholders),
//! 2. [`forward_pass`](Optimizer::forward_pass): values and local partials, leaves first,
//! 3. [`minimize`](Optimizer::minimize) or [`maximize`](Optimizer::maximize): the backward walk
//!    from the root, followed by the variable update.
//!
//! Updates are staged per variable and applied only after the whole backward
//! walk, so every gradient is computed from the values of the forward pass.
//! Minimizing subtracts `rate * gradient`; maximizing adds it.

mod gradients;
mod slot;

use log::{debug, trace};

use crate::error::{Error, Result};
use crate::expr::{Expr, LeafKind, Placeholder};
use crate::numeric::Numeric;
use crate::order::{ComputationOrder, VisitKind};

pub use gradients::Gradients;
pub use slot::{GradientSlot, LocalPartials};

/// Drives forward and backward passes over one root expression.
#[derive(Debug)]
pub struct Optimizer<'g, T: Numeric = f64> {
    root: Expr<'g, T>,
    order: ComputationOrder,
    slots: Vec<GradientSlot<T>>,
    pre_result: Option<T>,
    /// Set by a forward pass, consumed by the next backward pass.
    forward_pending: bool,
}

impl<'g, T: Numeric> Optimizer<'g, T> {
    /// Lays out `root` and allocates its gradient slots.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OrderTooLarge`] if `root` cannot be laid out.
    pub fn new(root: impl Into<Expr<'g, T>>) -> Result<Self> {
        let root = root.into();
        let order = ComputationOrder::build(root)?;
        Ok(Self::from_parts(root, order))
    }

    /// Reuses an order built earlier for any expression of the same shape,
    /// e.g. one rebuilt in a fresh graph each iteration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OrderMismatch`] if `order` was built for another shape.
    pub fn with_order(root: impl Into<Expr<'g, T>>, order: ComputationOrder) -> Result<Self> {
        let root = root.into();
        let order = order.rebind(root)?;
        Ok(Self::from_parts(root, order))
    }

    fn from_parts(root: Expr<'g, T>, order: ComputationOrder) -> Self {
        let slots = order
            .visits()
            .iter()
            .map(|visit| GradientSlot::new(visit.node))
            .collect();
        debug!("optimizer for {}: {} slots", root.id(), order.len());
        Self {
            root,
            order,
            slots,
            pre_result: None,
            forward_pending: false,
        }
    }

    #[must_use]
    pub fn root(&self) -> Expr<'g, T> {
        self.root
    }

    #[must_use]
    pub fn order(&self) -> &ComputationOrder {
        &self.order
    }

    #[must_use]
    pub fn slots(&self) -> &[GradientSlot<T>] {
        &self.slots
    }

    /// Feeds each `(placeholder, value)` pair.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ForeignExpression`] if a placeholder belongs to another
    /// graph; nothing is fed in that case.
    pub fn feed_placeholders<I>(&mut self, bindings: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = (Placeholder<'g, T>, T)>,
    {
        let bindings: Vec<_> = bindings.into_iter().collect();
        if let Some((foreign, _)) = bindings
            .iter()
            .find(|(p, _)| !p.expr().same_graph(&self.root))
        {
            return Err(Error::ForeignExpression { node: foreign.id() });
        }
        for (placeholder, value) in bindings {
            placeholder.feed(value);
        }
        Ok(self)
    }

    /// Evaluates every slot in order, recording local partials, and keeps the
    /// root value as the pre-result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingValue`] if an occurring placeholder is unfed.
    /// The optimizer is then left without a pending forward pass.
    pub fn forward_pass(&mut self) -> Result<&mut Self> {
        self.pre_result = None;
        self.forward_pending = false;

        let graph = self.root.graph();
        for visit in self.order.visits() {
            let (value, partials) = match visit.kind {
                VisitKind::Terminal { .. } => (graph.leaf_value(visit.node)?, LocalPartials::None),
                VisitKind::Unary { op, child } => {
                    let a = self.slots[child].value;
                    let result = op.apply(a);
                    (result, LocalPartials::Unary(op.partial(a, result)))
                }
                VisitKind::Binary { op, lhs, rhs } => {
                    let a = self.slots[lhs].value;
                    let b = self.slots[rhs].value;
                    let result = op.apply(a, b);
                    let (da, db) = op.partials(a, b, result);
                    (result, LocalPartials::Binary(da, db))
                }
            };
            let slot = &mut self.slots[visit.slot];
            slot.value = value;
            slot.partials = partials;
        }

        let result = self.slots[self.order.root_slot()].value;
        trace!("forward pass for {}: {:?}", self.root.id(), result);
        self.pre_result = Some(result);
        self.forward_pending = true;
        Ok(self)
    }

    /// Runs the backward walk and returns the per-variable gradients without
    /// touching any variable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoForwardPass`] unless a forward pass ran since the
    /// last backward pass.
    pub fn compute_gradients(&mut self) -> Result<Gradients<T>> {
        self.backward()
    }

    /// Backward pass followed by a gradient-descent step:
    /// `variable -= rate * gradient`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoForwardPass`] unless a forward pass ran since the
    /// last backward pass.
    pub fn minimize(&mut self, rate: T) -> Result<&mut Self> {
        self.step(-rate)
    }

    /// Backward pass followed by a gradient-ascent step:
    /// `variable += rate * gradient`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoForwardPass`] unless a forward pass ran since the
    /// last backward pass.
    pub fn maximize(&mut self, rate: T) -> Result<&mut Self> {
        self.step(rate)
    }

    fn step(&mut self, signed_rate: T) -> Result<&mut Self> {
        let gradients = self.backward()?;
        gradients.apply(self.root.graph(), signed_rate);
        debug!(
            "updated {} variable(s) of {} with rate {:?}",
            gradients.len(),
            self.root.id(),
            signed_rate
        );
        Ok(self)
    }

    /// Seeds the root with 1, pushes `grad * partial` from every operator slot
    /// to its children in reverse order and stages the totals that reach
    /// variable slots. All slot gradients are zero again afterwards.
    fn backward(&mut self) -> Result<Gradients<T>> {
        if !self.forward_pending {
            return Err(Error::NoForwardPass);
        }
        self.forward_pending = false;

        let root_slot = self.order.root_slot();
        self.slots[root_slot].grad = T::one();

        let mut gradients = Gradients::default();
        for visit in self.order.visits().iter().rev() {
            let slot = self.slots[visit.slot];
            match (visit.kind, slot.partials) {
                (VisitKind::Unary { child, .. }, LocalPartials::Unary(d)) => {
                    self.slots[child].accumulate(slot.grad * d);
                }
                (VisitKind::Binary { lhs, rhs, .. }, LocalPartials::Binary(da, db)) => {
                    self.slots[lhs].accumulate(slot.grad * da);
                    self.slots[rhs].accumulate(slot.grad * db);
                }
                (
                    VisitKind::Terminal {
                        leaf: LeafKind::Variable,
                    },
                    _,
                ) => gradients.accumulate(visit.node, slot.grad),
                _ => {}
            }
        }

        for slot in &mut self.slots {
            slot.reset_grad();
        }
        Ok(gradients)
    }

    /// Root value captured by the last forward pass.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoForwardPass`] if no forward pass has completed.
    pub fn pre_result(&self) -> Result<T> {
        self.pre_result.ok_or(Error::NoForwardPass)
    }

    /// Root value recomputed from the live graph, reflecting any updates
    /// applied since the last forward pass.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingValue`] if an occurring placeholder is unfed.
    pub fn post_result(&self) -> Result<T> {
        self.root.value()
    }
}
