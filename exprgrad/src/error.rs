//! Crate-level error type.
//!
//! Evaluation, optimizer and configuration failures all surface as [`Error`].
//! Numeric degeneracy (division by zero, `ln` of a non-positive number) is not
//! an error: it shows up as infinity or NaN in the computed values.

use thiserror::Error;

use crate::config::ConfigError;
use crate::expr::NodeId;

/// Result type alias using the crate's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the expression engine.
///
/// # Variants
///
/// - **MissingValue**: A placeholder was read before a value was fed.
///   *When*: [`Expr::value`](crate::Expr::value) or
///   [`Optimizer::forward_pass`](crate::Optimizer::forward_pass) reaches the placeholder.
///   *Recovery*: Feed the placeholder and evaluate again.
///
/// - **NoForwardPass**: A backward pass or the pre-result was requested without a
///   preceding forward pass.
///   *Recovery*: Call `forward_pass` first; every backward pass consumes one forward pass.
///
/// - **OrderMismatch**: A cached computation order was paired with a root of a
///   different shape.
///
/// - **OrderTooLarge**: The expression has more occurrences than a computation
///   order can hold, typically from repeated self-sharing such as `e = e + e`.
///
/// - **ForeignExpression**: A placeholder from another graph was passed to an optimizer.
///
/// - **Config**: The training configuration failed to load or validate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Placeholder read before it was fed.
    #[error("placeholder {node} has no value; feed it before evaluating")]
    MissingValue {
        /// The unfed placeholder.
        node: NodeId,
    },

    /// Backward pass (or pre-result) requested before a forward pass.
    #[error("no forward pass since the last backward pass")]
    NoForwardPass,

    /// Cached computation order does not fit the given root.
    #[error("computation order for root {expected} does not fit {found}")]
    OrderMismatch {
        /// Root the order was built from.
        expected: NodeId,
        /// Root it was paired with.
        found: NodeId,
    },

    /// Expression has too many occurrences to lay out.
    #[error("expression {root} has too many occurrences for a computation order")]
    OrderTooLarge {
        /// Root of the expression.
        root: NodeId,
    },

    /// Expression belongs to a different graph than the optimizer's root.
    #[error("expression {node} belongs to a different graph")]
    ForeignExpression {
        /// The offending node.
        node: NodeId,
    },

    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
