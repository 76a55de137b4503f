//! Operator sugar for expression handles.

pub(crate) mod ops;
