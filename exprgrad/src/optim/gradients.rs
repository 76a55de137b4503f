//! Per-variable gradient totals staged by one backward pass.

use std::collections::BTreeMap;

use crate::expr::{Graph, NodeId, Variable};
use crate::numeric::Numeric;

/// Gradient of the root with respect to every trainable variable it reaches.
///
/// A variable that occurs several times in the expression holds the sum of
/// the contributions of all its occurrences.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradients<T> {
    by_node: BTreeMap<NodeId, T>,
}

impl<T> Default for Gradients<T> {
    fn default() -> Self {
        Self {
            by_node: BTreeMap::new(),
        }
    }
}

impl<T: Numeric> Gradients<T> {
    /// Gradient with respect to `variable`, or `None` if the root does not reach it.
    #[must_use]
    pub fn wrt(&self, variable: &Variable<'_, T>) -> Option<T> {
        self.get(variable.id())
    }

    #[must_use]
    pub fn get(&self, node: NodeId) -> Option<T> {
        self.by_node.get(&node).copied()
    }

    /// `(variable id, gradient)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, T)> + '_ {
        self.by_node.iter().map(|(&id, &g)| (id, g))
    }

    /// Number of distinct variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_node.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_node.is_empty()
    }

    pub(crate) fn accumulate(&mut self, node: NodeId, g: T) {
        *self.by_node.entry(node).or_insert_with(T::zero) += g;
    }

    /// Adds `scale * gradient` to every variable.
    pub(crate) fn apply(&self, graph: &Graph<T>, scale: T) {
        for (&node, &g) in &self.by_node {
            graph.add_to_variable(node, scale * g);
        }
    }
}
