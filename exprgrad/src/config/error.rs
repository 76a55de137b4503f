//! Failures while loading or checking the demo settings.

use thiserror::Error;

/// Why a [`Config`](super::Config) could not be produced or used.
///
/// Unset variables are never an error: they fall back to the defaults.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A setting is out of range for training, e.g. `learning_rate = 0` or a
    /// negative noise level.
    #[error("invalid setting `{field}`: {reason}")]
    Invalid {
        /// Name of the [`Config`](super::Config) field.
        field: &'static str,
        reason: String,
    },

    /// An `EXPRGRAD_*` variable holds bytes that are not UTF-8.
    #[error("{key} is not valid unicode")]
    NotUnicode { key: String },

    /// An `EXPRGRAD_*` variable is set to text the field type cannot hold.
    #[error("cannot parse {key}={value:?}: {reason}")]
    Parse {
        key: String,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }

    /// The field or variable the error is about.
    #[must_use]
    pub fn subject(&self) -> &str {
        match self {
            ConfigError::Invalid { field, .. } => field,
            ConfigError::NotUnicode { key } | ConfigError::Parse { key, .. } => key,
        }
    }
}
