//! Variable names and default values of every setting.

/// Environment variable prefix (e.g. `EXPRGRAD_LEARNING_RATE`).
pub(crate) const ENV_PREFIX: &str = "EXPRGRAD_";

// --- Env key suffixes (full key = ENV_PREFIX + suffix) ---

pub(crate) const ENV_LEARNING_RATE: &str = "LEARNING_RATE";
pub(crate) const ENV_NUM_STEPS: &str = "NUM_STEPS";
pub(crate) const ENV_LOG_EVERY: &str = "LOG_EVERY";
pub(crate) const ENV_X1_INIT: &str = "X1_INIT";
pub(crate) const ENV_X2_INIT: &str = "X2_INIT";
pub(crate) const ENV_OFFSET: &str = "OFFSET";
pub(crate) const ENV_SEED: &str = "SEED";
pub(crate) const ENV_FIT_SAMPLES: &str = "FIT_SAMPLES";
pub(crate) const ENV_FIT_EPOCHS: &str = "FIT_EPOCHS";
pub(crate) const ENV_FIT_SLOPE: &str = "FIT_SLOPE";
pub(crate) const ENV_FIT_INTERCEPT: &str = "FIT_INTERCEPT";
pub(crate) const ENV_NOISE_STD: &str = "NOISE_STD";

// --- Default values ---

pub(crate) const DEFAULT_LEARNING_RATE: f64 = 0.01;
pub(crate) const DEFAULT_NUM_STEPS: usize = 1000;
pub(crate) const DEFAULT_LOG_EVERY: usize = 100;
pub(crate) const DEFAULT_X1_INIT: f64 = 5.53;
pub(crate) const DEFAULT_X2_INIT: f64 = -3.12;
pub(crate) const DEFAULT_OFFSET: f64 = -6.3;
pub(crate) const DEFAULT_SEED: u64 = 42;
pub(crate) const DEFAULT_FIT_SAMPLES: usize = 64;
pub(crate) const DEFAULT_FIT_EPOCHS: usize = 200;
pub(crate) const DEFAULT_FIT_SLOPE: f64 = 2.0;
pub(crate) const DEFAULT_FIT_INTERCEPT: f64 = -1.0;
pub(crate) const DEFAULT_NOISE_STD: f64 = 0.1;
