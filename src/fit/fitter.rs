//! Gamma CDF fit for a single distillation profile.
//!
//! Given samples `(T_i, m_i)` (boiling temperature, recovered mass fraction),
//! we solve
//!
//! ```text
//! minimize Σ (F(T_i; a, b) - m_i)^2
//! ```
//!
//! where `F` is the Gamma CDF with shape `a` and scale `b`, always starting
//! from `a = 5, b = 60`.

use tracing::{info, warn};

use crate::domain::{CurveGrid, DistillationProfile, FitResult, GammaParams};
use crate::error::AppError;
use crate::math::{SolverOptions, gamma_cdf, levenberg_marquardt, linspace};

pub const INITIAL_SHAPE: f64 = 5.0;
pub const INITIAL_SCALE: f64 = 60.0;

/// Number of points in the sampled fit curve.
pub const CURVE_POINTS: usize = 1000;

/// Fewest measured temperatures that determine both parameters.
pub const MIN_SAMPLES: usize = 2;

/// Fit a Gamma CDF to `profile` with default solver settings.
///
/// Returns `Ok(None)` when the profile has fewer than two measured
/// temperatures. Solver failures are errors.
pub fn fit_profile(profile: &DistillationProfile) -> Result<Option<FitResult>, AppError> {
    fit_profile_with(profile, &SolverOptions::default())
}

pub fn fit_profile_with(
    profile: &DistillationProfile,
    opts: &SolverOptions,
) -> Result<Option<FitResult>, AppError> {
    let samples = profile.samples();
    if samples.len() < MIN_SAMPLES {
        warn!(
            acronym = %profile.acronym,
            samples = samples.len(),
            "not enough measured temperatures to fit"
        );
        return Ok(None);
    }

    let temps: Vec<f64> = samples.iter().map(|s| s.temperature).collect();
    let fractions: Vec<f64> = samples.iter().map(|s| s.mass_fraction).collect();

    let solution = levenberg_marquardt(
        |t, p| gamma_cdf(t, p[0], p[1]),
        &temps,
        &fractions,
        &[INITIAL_SHAPE, INITIAL_SCALE],
        opts,
    )
    .map_err(|e| {
        AppError::new(
            e.exit_code(),
            format!("Gamma fit for '{}' failed: {e}", profile.acronym),
        )
    })?;

    let params = GammaParams::new(solution.params[0], solution.params[1])?;
    let c = &solution.covariance;
    let covariance = [[c[(0, 0)], c[(0, 1)]], [c[(1, 0)], c[(1, 1)]]];

    let t_max = temps.iter().copied().fold(0.0_f64, f64::max);
    let temperatures = linspace(0.0, t_max, CURVE_POINTS);
    let values = params.curve()?.evaluate(&temperatures);

    info!(
        acronym = %profile.acronym,
        date = %profile.date,
        shape = params.shape,
        scale = params.scale,
        sse = solution.sse,
        iterations = solution.iterations,
        "fitted gamma curve"
    );

    Ok(Some(FitResult {
        acronym: profile.acronym.clone(),
        date: profile.date,
        params,
        covariance,
        curve: CurveGrid { temperatures, values },
        samples,
        sse: solution.sse,
        iterations: solution.iterations,
    }))
}
