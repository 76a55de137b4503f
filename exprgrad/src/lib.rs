//! # exprgrad
//!
//! Expression graphs with reverse-mode automatic differentiation.
//!
//! Build an expression out of constants, trainable variables and fed
//! placeholders, evaluate it directly with [`Expr::value`], or bind an
//! [`Optimizer`] to it to compute exact gradients and take gradient-descent
//! (or ascent) steps on every variable.
//!
//! ```
//! use exprgrad::{Graph, Optimizer};
//!
//! let g = Graph::new();
//! let x = g.variable(3.0);
//! let p = g.placeholder();
//! let f = x * x + p;
//!
//! let mut opt = Optimizer::new(f)?;
//! opt.feed_placeholders([(p, 1.0)])?
//!     .forward_pass()?
//!     .minimize(0.25)?;
//! assert_eq!(opt.pre_result()?, 10.0);
//! assert_eq!(x.value(), 1.5);
//! # Ok::<(), exprgrad::Error>(())
//! ```

pub mod config;
pub mod demo;
pub mod error;
pub mod expr;
pub mod numeric;
pub mod optim;
pub mod order;

pub use error::{Error, Result};
pub use expr::{
    cos, exp, log, pow, sin, tan, BinaryOp, Cos, Exp, Expr, Graph, LeafKind, Log, NodeId,
    NodeKind, Placeholder, Pow, Sin, Tan, UnaryOp, Variable,
};
pub use numeric::Numeric;
pub use optim::{GradientSlot, Gradients, LocalPartials, Optimizer};
pub use order::{ComputationOrder, Visit, VisitKind};
