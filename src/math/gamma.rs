//! Gamma CDF evaluation.
//!
//! Curves are parameterized by shape `a` and scale `b`. `statrs` uses the
//! rate form, so the scale is inverted on construction.

use statrs::distribution::{ContinuousCDF, Gamma};

use crate::error::AppError;

/// A validated Gamma CDF.
#[derive(Debug, Clone)]
pub struct GammaCurve {
    dist: Gamma,
}

impl GammaCurve {
    pub fn new(shape: f64, scale: f64) -> Result<Self, AppError> {
        if !(shape.is_finite() && scale.is_finite() && shape > 0.0 && scale > 0.0) {
            return Err(AppError::failure(format!(
                "Invalid Gamma curve: shape={shape}, scale={scale} (both must be finite and > 0)."
            )));
        }
        let dist = Gamma::new(shape, 1.0 / scale)
            .map_err(|e| AppError::failure(format!("Invalid Gamma curve: {e}")))?;
        Ok(Self { dist })
    }

    pub fn cdf(&self, t: f64) -> f64 {
        if t <= 0.0 {
            return 0.0;
        }
        self.dist.cdf(t).clamp(0.0, 1.0)
    }

    /// Evaluate on a grid sorted ascending.
    ///
    /// The regularized incomplete gamma can drift by an ulp where its expansion
    /// switches; the running maximum keeps the sampled curve monotone.
    pub fn evaluate(&self, grid: &[f64]) -> Vec<f64> {
        let mut floor = 0.0_f64;
        grid.iter()
            .map(|&t| {
                floor = floor.max(self.cdf(t));
                floor
            })
            .collect()
    }
}

/// Gamma CDF as a model function for the solver.
///
/// Returns `None` when the parameters leave the valid domain.
pub fn gamma_cdf(t: f64, shape: f64, scale: f64) -> Option<f64> {
    if !(shape.is_finite() && scale.is_finite() && shape > 0.0 && scale > 0.0) {
        return None;
    }
    if t <= 0.0 {
        return Some(0.0);
    }
    let dist = Gamma::new(shape, 1.0 / scale).ok()?;
    let v = dist.cdf(t);
    if v.is_finite() { Some(v) } else { None }
}

/// `n` evenly spaced points over `[start, end]`, both ends included.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n as f64 - 1.0);
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exponential_special_case_matches_closed_form() {
        // shape = 1 is the exponential distribution: F(t) = 1 - exp(-t/b).
        let curve = GammaCurve::new(1.0, 50.0).unwrap();
        for &t in &[1.0, 10.0, 50.0, 200.0] {
            let expected = 1.0 - (-t / 50.0_f64).exp();
            assert!((curve.cdf(t) - expected).abs() < 1e-10, "t={t}");
        }
    }

    #[test]
    fn cdf_is_zero_at_origin_and_bounded() {
        let curve = GammaCurve::new(5.0, 60.0).unwrap();
        assert_eq!(curve.cdf(0.0), 0.0);
        assert_eq!(curve.cdf(-10.0), 0.0);
        let values = curve.evaluate(&linspace(0.0, 5000.0, 1000));
        assert!(values.iter().all(|v| (0.0..=1.0).contains(v)));
        assert!(values.windows(2).all(|w| w[1] >= w[0]));
        assert!(values[999] > 0.999);
    }

    #[test]
    fn gamma_cdf_rejects_invalid_parameters() {
        assert!(gamma_cdf(10.0, -1.0, 60.0).is_none());
        assert!(gamma_cdf(10.0, 5.0, 0.0).is_none());
        assert!(gamma_cdf(10.0, f64::NAN, 60.0).is_none());
        assert!(GammaCurve::new(0.0, 1.0).is_err());
    }

    #[test]
    fn linspace_includes_both_ends() {
        let grid = linspace(0.0, 1000.0, 1000);
        assert_eq!(grid.len(), 1000);
        assert_eq!(grid[0], 0.0);
        assert_eq!(grid[999], 1000.0);
        assert!((grid[1] - 1000.0 / 999.0).abs() < 1e-12);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }
}
