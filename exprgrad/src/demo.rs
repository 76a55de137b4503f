//! Reference training runs driven by a [`Config`].
//!
//! - [`minimize_paraboloid`]: gradient descent on
//!   `f(x1, x2) = x1² + x2² + 4·x1 + 2·x2 + p` with `p` fed through a
//!   placeholder. The closed-form minimum is at `(-2, -1)` with value `p - 5`.
//! - [`fit_line`]: stochastic gradient descent of `(w·x + b - y)²` over noisy
//!   samples of a known line, re-feeding the `x`/`y` placeholders per sample.

use log::{debug, info};
use rand::{prelude::*, rngs::StdRng};
use rand_distr::{Distribution, Normal, Uniform};

use crate::config::{Config, ConfigError};
use crate::error::Result;
use crate::expr::Graph;
use crate::optim::Optimizer;

/// Outcome of [`minimize_paraboloid`].
#[derive(Clone, Debug, PartialEq)]
pub struct ParaboloidReport {
    pub x1: f64,
    pub x2: f64,
    /// `f(x1, x2)` after the last update.
    pub value: f64,
    pub steps: usize,
}

/// Outcome of [`fit_line`].
#[derive(Clone, Debug, PartialEq)]
pub struct LineFit {
    pub slope: f64,
    pub intercept: f64,
    /// Mean squared residual over the samples after training.
    pub mean_loss: f64,
}

/// Minimizes the paraboloid from `(config.x1_init, config.x2_init)`.
///
/// # Errors
///
/// Returns [`Error::Config`](crate::Error::Config) if the configuration is invalid.
pub fn minimize_paraboloid(config: &Config) -> Result<ParaboloidReport> {
    config.validate()?;

    let g = Graph::new();
    let x1 = g.variable(config.x1_init);
    let x2 = g.variable(config.x2_init);
    let p = g.placeholder();
    let four = g.constant(4.0);
    let two = g.constant(2.0);
    let f = x1 * x1 + x2 * x2 + four * x1 + two * x2 + p;
    debug!("paraboloid: {f}");

    let mut opt = Optimizer::new(f)?;
    for step in 0..config.num_steps {
        opt.feed_placeholders([(p, config.offset)])?
            .forward_pass()?
            .minimize(config.learning_rate)?;
        if (step + 1) % config.log_every == 0 || step == 0 {
            info!(
                "step {:5} / {:5} | f {:+.6} -> {:+.6} | x1 {:+.6} x2 {:+.6}",
                step + 1,
                config.num_steps,
                opt.pre_result()?,
                opt.post_result()?,
                x1.value(),
                x2.value()
            );
        }
    }

    Ok(ParaboloidReport {
        x1: x1.value(),
        x2: x2.value(),
        value: opt.post_result()?,
        steps: config.num_steps,
    })
}

/// Draws `config.fit_samples` points `(x, slope·x + intercept + noise)` with
/// `x` uniform in `[-1, 1)`.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] if the noise level is unusable.
pub fn sample_line(config: &Config) -> std::result::Result<Vec<(f64, f64)>, ConfigError> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let xs = Uniform::new(-1.0, 1.0)
        .map_err(|e| ConfigError::invalid("fit range", e.to_string()))?;
    let noise = Normal::new(0.0, config.noise_std)
        .map_err(|e| ConfigError::invalid("noise_std", e.to_string()))?;
    Ok((0..config.fit_samples)
        .map(|_| {
            let x = xs.sample(&mut rng);
            let y = config.fit_slope * x + config.fit_intercept + noise.sample(&mut rng);
            (x, y)
        })
        .collect())
}

/// Fits `w·x + b` to noisy samples of the configured line.
///
/// The samples are shuffled before every epoch.
///
/// # Errors
///
/// Returns [`Error::Config`](crate::Error::Config) if the configuration is invalid.
pub fn fit_line(config: &Config) -> Result<LineFit> {
    config.validate()?;
    let mut samples = sample_line(config)?;
    let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(1));

    let g = Graph::new();
    let w = g.variable(0.0);
    let b = g.variable(0.0);
    let x = g.placeholder();
    let y = g.placeholder();
    let residual = w * x + b - y;
    let loss = residual * residual;
    debug!("line fit loss: {loss}");

    let mut opt = Optimizer::new(loss)?;
    for epoch in 0..config.fit_epochs {
        samples.shuffle(&mut rng);
        let mut total = 0.0;
        for &(xv, yv) in &samples {
            opt.feed_placeholders([(x, xv), (y, yv)])?
                .forward_pass()?
                .minimize(config.learning_rate)?;
            total += opt.pre_result()?;
        }
        if (epoch + 1) % config.log_every == 0 || epoch == 0 {
            info!(
                "epoch {:4} / {:4} | mean loss {:.6} | w {:+.4} b {:+.4}",
                epoch + 1,
                config.fit_epochs,
                total / samples.len() as f64,
                w.value(),
                b.value()
            );
        }
    }

    let mut total = 0.0;
    for &(xv, yv) in &samples {
        opt.feed_placeholders([(x, xv), (y, yv)])?;
        total += opt.post_result()?;
    }

    Ok(LineFit {
        slope: w.value(),
        intercept: b.value(),
        mean_loss: total / samples.len() as f64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn paraboloid_reaches_closed_form_minimum() {
        let report = minimize_paraboloid(&Config::default()).unwrap();
        assert!((report.x1 + 2.0).abs() < 1e-6, "x1 = {}", report.x1);
        assert!((report.x2 + 1.0).abs() < 1e-6, "x2 = {}", report.x2);
        assert!((report.value + 11.3).abs() < 1e-9, "f = {}", report.value);
        assert_eq!(report.steps, 1000);
    }

    #[test]
    fn paraboloid_minimum_follows_fed_offset() {
        let cfg = Config {
            offset: 1.0,
            num_steps: 2000,
            ..Config::default()
        };
        let report = minimize_paraboloid(&cfg).unwrap();
        assert!((report.value - (1.0 - 5.0)).abs() < 1e-9);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let cfg = Config {
            learning_rate: -1.0,
            ..Config::default()
        };
        assert!(matches!(
            minimize_paraboloid(&cfg),
            Err(Error::Config(ConfigError::Invalid {
                field: "learning_rate",
                ..
            }))
        ));
        assert!(matches!(fit_line(&cfg), Err(Error::Config(_))));
    }

    #[test]
    fn samples_are_reproducible_and_noiseless_when_std_is_zero() {
        let cfg = Config {
            noise_std: 0.0,
            ..Config::default()
        };
        let a = sample_line(&cfg).unwrap();
        let b = sample_line(&cfg).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), cfg.fit_samples);
        for (x, y) in a {
            assert!((-1.0..1.0).contains(&x));
            assert!((y - (cfg.fit_slope * x + cfg.fit_intercept)).abs() < 1e-12);
        }
    }

    #[test]
    fn line_fit_recovers_the_true_line() {
        let cfg = Config::default();
        let fit = fit_line(&cfg).unwrap();
        assert!((fit.slope - cfg.fit_slope).abs() < 0.15, "slope {}", fit.slope);
        assert!(
            (fit.intercept - cfg.fit_intercept).abs() < 0.15,
            "intercept {}",
            fit.intercept
        );
        assert!(fit.mean_loss < 0.05, "mean loss {}", fit.mean_loss);
    }
}
