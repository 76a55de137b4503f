//! Loading [`Config`] from `EXPRGRAD_*` environment variables.

use std::str::FromStr;

use log::debug;

use super::constants::{
    ENV_FIT_EPOCHS, ENV_FIT_INTERCEPT, ENV_FIT_SAMPLES, ENV_FIT_SLOPE, ENV_LEARNING_RATE,
    ENV_LOG_EVERY, ENV_NOISE_STD, ENV_NUM_STEPS, ENV_OFFSET, ENV_PREFIX, ENV_SEED, ENV_X1_INIT,
    ENV_X2_INIT,
};
use super::{Config, ConfigError};

/// Full variable name for a setting, e.g. `SEED` → `EXPRGRAD_SEED`.
#[must_use]
pub fn env_key(suffix: &str) -> String {
    format!("{ENV_PREFIX}{suffix}")
}

/// Reads and parses the setting `EXPRGRAD_<suffix>`.
///
/// `Ok(None)` when the variable is unset. Surrounding whitespace is ignored.
///
/// # Errors
///
/// [`ConfigError::NotUnicode`] or [`ConfigError::Parse`] when the variable is
/// set but unusable.
pub fn lookup<T>(suffix: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let key = env_key(suffix);
    let Some(raw) = std::env::var_os(&key) else {
        return Ok(None);
    };
    let value = raw
        .into_string()
        .map_err(|_| ConfigError::NotUnicode { key: key.clone() })?;
    let parsed = value.trim().parse::<T>().map_err(|e| ConfigError::Parse {
        key: key.clone(),
        value: value.clone(),
        reason: e.to_string(),
    })?;
    debug!("{key} = {}", value.trim());
    Ok(Some(parsed))
}

/// Builds [`Config`] from the environment; unset settings keep their defaults.
///
/// The result is not validated; call [`Config::validate`] before training.
///
/// # Errors
///
/// Fails on the first variable that is set but cannot be read or parsed.
pub fn from_env() -> Result<Config, ConfigError> {
    let d = Config::default();
    Ok(Config {
        learning_rate: lookup(ENV_LEARNING_RATE)?.unwrap_or(d.learning_rate),
        num_steps: lookup(ENV_NUM_STEPS)?.unwrap_or(d.num_steps),
        log_every: lookup(ENV_LOG_EVERY)?.unwrap_or(d.log_every),
        x1_init: lookup(ENV_X1_INIT)?.unwrap_or(d.x1_init),
        x2_init: lookup(ENV_X2_INIT)?.unwrap_or(d.x2_init),
        offset: lookup(ENV_OFFSET)?.unwrap_or(d.offset),
        seed: lookup(ENV_SEED)?.unwrap_or(d.seed),
        fit_samples: lookup(ENV_FIT_SAMPLES)?.unwrap_or(d.fit_samples),
        fit_epochs: lookup(ENV_FIT_EPOCHS)?.unwrap_or(d.fit_epochs),
        fit_slope: lookup(ENV_FIT_SLOPE)?.unwrap_or(d.fit_slope),
        fit_intercept: lookup(ENV_FIT_INTERCEPT)?.unwrap_or(d.fit_intercept),
        noise_std: lookup(ENV_NOISE_STD)?.unwrap_or(d.noise_std),
    })
}
