//! # exprgrad demo
//!
//! Runs the two reference training routines from [`exprgrad::demo`]:
//! gradient descent on a fixed paraboloid, then a stochastic line fit over
//! seeded noisy samples. Settings come from `EXPRGRAD_*` environment
//! variables (see [`exprgrad::config`]); log verbosity from `RUST_LOG`.

use env_logger::Env;
use log::info;

use exprgrad::config;
use exprgrad::demo::{fit_line, minimize_paraboloid};

// =============================================================================
// MAIN
// =============================================================================

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cfg = config::from_env()?;
    cfg.validate()?;
    info!("config: {cfg:?}");

    info!("--- paraboloid descent ---");
    let report = minimize_paraboloid(&cfg)?;
    info!(
        "minimum after {} steps: f({:+.6}, {:+.6}) = {:+.6}",
        report.steps, report.x1, report.x2, report.value
    );

    info!("--- line fit ---");
    let fit = fit_line(&cfg)?;
    info!(
        "fitted y = {:+.4}·x {:+.4} (true {:+.4}·x {:+.4}), mean loss {:.6}",
        fit.slope, fit.intercept, cfg.fit_slope, cfg.fit_intercept, fit.mean_loss
    );

    Ok(())
}
