//! Settings of the demo training runs.
//!
//! Every field can be overridden by an `EXPRGRAD_<FIELD>` variable (see
//! [`from_env`]); [`Config::validate`] rejects values no run could use.

mod builder;
mod constants;
mod error;

use constants::{
    DEFAULT_FIT_EPOCHS, DEFAULT_FIT_INTERCEPT, DEFAULT_FIT_SAMPLES, DEFAULT_FIT_SLOPE,
    DEFAULT_LEARNING_RATE, DEFAULT_LOG_EVERY, DEFAULT_NOISE_STD, DEFAULT_NUM_STEPS,
    DEFAULT_OFFSET, DEFAULT_SEED, DEFAULT_X1_INIT, DEFAULT_X2_INIT,
};

pub use builder::{env_key, from_env, lookup};
pub use error::ConfigError;

/// Learning rate, step counts, paraboloid start and line-fit data.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Step size of every minimize call.
    pub learning_rate: f64,
    /// Number of paraboloid descent steps.
    pub num_steps: usize,
    /// Log progress every this many steps (and at step 0).
    pub log_every: usize,

    /// Paraboloid starting point.
    pub x1_init: f64,
    pub x2_init: f64,
    /// Value fed to the paraboloid's constant-offset placeholder.
    pub offset: f64,

    /// Seed for the sample generator (reproducibility).
    pub seed: u64,
    /// Number of noisy samples drawn for the line fit.
    pub fit_samples: usize,
    /// Passes over the samples.
    pub fit_epochs: usize,
    /// True line the samples are drawn from.
    pub fit_slope: f64,
    pub fit_intercept: f64,
    /// Standard deviation of the Gaussian noise added to each sample.
    pub noise_std: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            learning_rate: DEFAULT_LEARNING_RATE,
            num_steps: DEFAULT_NUM_STEPS,
            log_every: DEFAULT_LOG_EVERY,
            x1_init: DEFAULT_X1_INIT,
            x2_init: DEFAULT_X2_INIT,
            offset: DEFAULT_OFFSET,
            seed: DEFAULT_SEED,
            fit_samples: DEFAULT_FIT_SAMPLES,
            fit_epochs: DEFAULT_FIT_EPOCHS,
            fit_slope: DEFAULT_FIT_SLOPE,
            fit_intercept: DEFAULT_FIT_INTERCEPT,
            noise_std: DEFAULT_NOISE_STD,
        }
    }
}

impl Config {
    /// Checks that the settings describe a runnable training session.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(ConfigError::invalid(
                "learning_rate",
                format!("must be positive and finite, got {}", self.learning_rate),
            ));
        }
        let counts = [
            ("num_steps", self.num_steps),
            ("log_every", self.log_every),
            ("fit_samples", self.fit_samples),
            ("fit_epochs", self.fit_epochs),
        ];
        if let Some(&(field, _)) = counts.iter().find(|(_, n)| *n == 0) {
            return Err(ConfigError::invalid(field, "must be at least 1"));
        }
        let reals = [
            ("x1_init", self.x1_init),
            ("x2_init", self.x2_init),
            ("offset", self.offset),
            ("fit_slope", self.fit_slope),
            ("fit_intercept", self.fit_intercept),
        ];
        if let Some(&(field, value)) = reals.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::invalid(field, format!("must be finite, got {value}")));
        }
        if !(self.noise_std.is_finite() && self.noise_std >= 0.0) {
            return Err(ConfigError::invalid(
                "noise_std",
                format!("must be non-negative and finite, got {}", self.noise_std),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::constants::{ENV_LEARNING_RATE, ENV_NUM_STEPS, ENV_SEED};
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(Config::default().validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_non_positive_learning_rate() {
        for learning_rate in [0.0, -0.1, f64::NAN, f64::INFINITY] {
            let cfg = Config {
                learning_rate,
                ..Config::default()
            };
            let err = cfg.validate().unwrap_err();
            assert_eq!(err.subject(), "learning_rate", "accepted {learning_rate}");
        }
    }

    #[test]
    fn validate_names_the_zero_count() {
        let cases = [
            ("num_steps", Config { num_steps: 0, ..Config::default() }),
            ("log_every", Config { log_every: 0, ..Config::default() }),
            ("fit_samples", Config { fit_samples: 0, ..Config::default() }),
            ("fit_epochs", Config { fit_epochs: 0, ..Config::default() }),
        ];
        for (field, cfg) in cases {
            assert!(matches!(
                cfg.validate(),
                Err(ConfigError::Invalid { field: f, .. }) if f == field
            ));
        }
    }

    #[test]
    fn validate_rejects_non_finite_start() {
        let cfg = Config {
            x1_init: f64::NAN,
            ..Config::default()
        };
        let err = cfg.validate().unwrap_err();
        assert_eq!(err.subject(), "x1_init");
        assert!(err.to_string().contains("must be finite"));
    }

    #[test]
    fn validate_noise_bounds() {
        let negative = Config {
            noise_std: -1.0,
            ..Config::default()
        };
        assert!(negative.validate().is_err());
        let noiseless = Config {
            noise_std: 0.0,
            ..Config::default()
        };
        assert!(noiseless.validate().is_ok());
    }

    /// Env tests share process state; run them one at a time.
    static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        ENV_LOCK
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    #[test]
    fn from_env_falls_back_to_defaults() {
        let _g = env_lock();
        std::env::remove_var(env_key(ENV_LEARNING_RATE));
        std::env::remove_var(env_key(ENV_NUM_STEPS));
        std::env::remove_var(env_key(ENV_SEED));
        let cfg = from_env().unwrap();
        assert_eq!(cfg.learning_rate, Config::default().learning_rate);
        assert_eq!(cfg.seed, Config::default().seed);
    }

    #[test]
    fn from_env_overrides_with_env_vars() {
        let _g = env_lock();
        let key_rate = env_key(ENV_LEARNING_RATE);
        let key_steps = env_key(ENV_NUM_STEPS);
        std::env::set_var(&key_rate, "0.05");
        std::env::set_var(&key_steps, " 250 ");
        let cfg = from_env();
        std::env::remove_var(key_rate);
        std::env::remove_var(key_steps);
        let cfg = cfg.unwrap();
        assert_eq!(cfg.learning_rate, 0.05);
        assert_eq!(cfg.num_steps, 250);
    }

    #[test]
    fn from_env_reports_unparsable_value() {
        let _g = env_lock();
        let key = env_key(ENV_SEED);
        std::env::set_var(&key, "forty-two");
        let res = from_env();
        std::env::remove_var(&key);
        match res {
            Err(ConfigError::Parse { key: k, value, .. }) => {
                assert_eq!(k, "EXPRGRAD_SEED");
                assert_eq!(value, "forty-two");
            }
            other => panic!("expected a parse error, got {other:?}"),
        }
    }

    #[test]
    fn lookup_of_unset_variable_is_none() {
        assert_eq!(lookup::<u64>("UNLIKELY_KEY_67890"), Ok(None));
        assert_eq!(env_key("UNLIKELY_KEY_67890"), "EXPRGRAD_UNLIKELY_KEY_67890");
    }

    #[test]
    fn error_messages_name_the_subject() {
        let e = ConfigError::invalid("num_steps", "must be at least 1");
        assert_eq!(e.to_string(), "invalid setting `num_steps`: must be at least 1");
        let e = ConfigError::NotUnicode {
            key: "EXPRGRAD_OFFSET".to_string(),
        };
        assert_eq!(e.subject(), "EXPRGRAD_OFFSET");
    }
}
