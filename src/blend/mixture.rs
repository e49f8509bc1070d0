//! Mixture curve evaluation and representative-point lookup.

use tracing::info;

use crate::domain::{
    CurveGrid, FitResult, MixtureBlend, MixturePoint, MixtureProfile, MixtureRequest, TARGET_FRACTIONS,
};
use crate::error::AppError;
use crate::math::linspace;

/// Upper end of the blending grid (°C).
pub const MIXTURE_T_MAX: f64 = 1000.0;

/// Number of points on the blending grid.
pub const MIXTURE_POINTS: usize = 1000;

/// Blend two fits according to `request`'s volumes.
///
/// The fits must belong to `request.crude1` and `request.crude2`, in that order.
pub fn blend_fits(request: &MixtureRequest, fit1: FitResult, fit2: FitResult) -> Result<MixtureBlend, AppError> {
    let weights = request.weights();
    let curve = mixture_curve(&fit1, &fit2, weights)?;
    let profile = mixture_profile(&curve)?;

    info!(
        crude1 = %request.crude1,
        crude2 = %request.crude2,
        w1 = weights.0,
        w2 = weights.1,
        "blended distillation profiles"
    );

    Ok(MixtureBlend {
        request: request.clone(),
        fit1,
        fit2,
        weights,
        curve,
        profile,
    })
}

/// `w1 * F1(T) + w2 * F2(T)` over `[0, MIXTURE_T_MAX]`.
pub fn mixture_curve(fit1: &FitResult, fit2: &FitResult, weights: (f64, f64)) -> Result<CurveGrid, AppError> {
    let temperatures = linspace(0.0, MIXTURE_T_MAX, MIXTURE_POINTS);
    let f1 = fit1.params.curve()?.evaluate(&temperatures);
    let f2 = fit2.params.curve()?.evaluate(&temperatures);

    let (w1, w2) = weights;
    let values = f1
        .iter()
        .zip(&f2)
        .map(|(a, b)| (w1 * a + w2 * b).clamp(0.0, 1.0))
        .collect();

    Ok(CurveGrid { temperatures, values })
}

/// Read the temperature for every target fraction off `curve`.
///
/// Yields exactly one point per target fraction, or an error.
pub fn mixture_profile(curve: &CurveGrid) -> Result<MixtureProfile, AppError> {
    let points = TARGET_FRACTIONS
        .iter()
        .map(|&fraction| {
            let temperature = nearest_index(&curve.values, fraction)
                .and_then(|idx| curve.temperatures.get(idx).copied())
                .ok_or_else(|| {
                    AppError::failure(format!(
                        "Mixture curve has no finite value near mass fraction {fraction}."
                    ))
                })?;
            Ok(MixturePoint {
                mass_fraction: fraction,
                temperature,
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;
    Ok(MixtureProfile { points })
}

/// Index of the value closest to `target`; ties go to the lowest index.
pub fn nearest_index(values: &[f64], target: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, &v) in values.iter().enumerate() {
        let dist = (v - target).abs();
        if !dist.is_finite() {
            continue;
        }
        match best {
            Some((_, d)) if dist >= d => {}
            _ => best = Some((idx, dist)),
        }
    }
    best.map(|(idx, _)| idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GammaParams, ProfileDate};
    use crate::math::GammaCurve;

    fn fit(acronym: &str, shape: f64, scale: f64) -> FitResult {
        let params = GammaParams::new(shape, scale).unwrap();
        let temperatures = linspace(0.0, 700.0, 1000);
        let values = params.curve().unwrap().evaluate(&temperatures);
        FitResult {
            acronym: acronym.to_string(),
            date: ProfileDate::Recent,
            params,
            covariance: [[1.0, 0.0], [0.0, 1.0]],
            curve: CurveGrid { temperatures, values },
            samples: Vec::new(),
            sse: 0.0,
            iterations: 0,
        }
    }

    #[test]
    fn nearest_index_breaks_ties_low() {
        assert_eq!(nearest_index(&[0.0, 0.4, 0.6, 1.0], 0.5), Some(1));
        assert_eq!(nearest_index(&[0.1, 0.1, 0.1], 0.1), Some(0));
        assert_eq!(nearest_index(&[0.0, 0.2, 0.9], 0.95), Some(2));
        assert_eq!(nearest_index(&[], 0.5), None);
    }

    #[test]
    fn mixture_is_weighted_sum_of_cdfs() {
        let f1 = fit("MGS", 3.0, 80.0);
        let f2 = fit("RA", 5.0, 60.0);
        let curve = mixture_curve(&f1, &f2, (2.0 / 3.0, 1.0 / 3.0)).unwrap();

        assert_eq!(curve.len(), MIXTURE_POINTS);
        assert_eq!(curve.temperatures[MIXTURE_POINTS - 1], MIXTURE_T_MAX);

        let c1 = GammaCurve::new(3.0, 80.0).unwrap();
        let c2 = GammaCurve::new(5.0, 60.0).unwrap();
        for idx in [0, 250, 500, 999] {
            let t = curve.temperatures[idx];
            let expected = 2.0 / 3.0 * c1.cdf(t) + 1.0 / 3.0 * c2.cdf(t);
            assert!((curve.values[idx] - expected).abs() < 1e-12);
        }
        assert!(curve.values.windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn profile_follows_target_order() {
        let request = MixtureRequest::new("MGS", "RA", 10.0, 5.0).unwrap();
        let blend = blend_fits(&request, fit("MGS", 3.0, 80.0), fit("RA", 5.0, 60.0)).unwrap();

        let fractions: Vec<f64> = blend.profile.points.iter().map(|p| p.mass_fraction).collect();
        assert_eq!(fractions, TARGET_FRACTIONS.to_vec());
        assert!(blend
            .profile
            .points
            .windows(2)
            .all(|w| w[1].temperature >= w[0].temperature));
        assert!(blend.profile.points.iter().all(|p| (0.0..=MIXTURE_T_MAX).contains(&p.temperature)));
    }

    #[test]
    fn reported_temperatures_sit_on_the_grid() {
        let request = MixtureRequest::new("A", "B", 1.0, 1.0).unwrap();
        let blend = blend_fits(&request, fit("A", 4.0, 50.0), fit("B", 4.0, 50.0)).unwrap();
        let step = MIXTURE_T_MAX / (MIXTURE_POINTS as f64 - 1.0);
        let curve = GammaCurve::new(4.0, 50.0).unwrap();

        for p in &blend.profile.points {
            let idx = (p.temperature / step).round();
            assert!((idx * step - p.temperature).abs() < 1e-9);
            // Nearest grid point: the true CDF at neighbouring grid points brackets the target.
            let lo = curve.cdf(p.temperature - step);
            let hi = curve.cdf(p.temperature + step);
            assert!(lo <= p.mass_fraction + 1e-12 && p.mass_fraction <= hi + 1e-12);
        }
    }

    #[test]
    fn profile_without_usable_values_is_an_error() {
        let empty = CurveGrid { temperatures: vec![], values: vec![] };
        assert!(mixture_profile(&empty).is_err());

        let broken = CurveGrid {
            temperatures: vec![0.0, 500.0, 1000.0],
            values: vec![f64::NAN; 3],
        };
        let err = mixture_profile(&broken).unwrap_err();
        assert!(!err.is_usage());
        assert!(err.message().contains("0.05"));
    }

    #[test]
    fn profile_has_one_point_per_target() {
        let curve = CurveGrid {
            temperatures: vec![0.0, 500.0, 1000.0],
            values: vec![0.0, 0.5, 1.0],
        };
        let profile = mixture_profile(&curve).unwrap();
        assert_eq!(profile.points.len(), TARGET_FRACTIONS.len());
        assert_eq!(profile.points[0].temperature, 0.0);
        assert_eq!(profile.points[5].temperature, 500.0);
        assert_eq!(profile.points[11].temperature, 1000.0);
    }

    #[test]
    fn zero_volume_uses_single_crude() {
        let request = MixtureRequest::new("A", "B", 0.0, 3.0).unwrap();
        let blend = blend_fits(&request, fit("A", 2.0, 40.0), fit("B", 6.0, 70.0)).unwrap();
        let b = GammaCurve::new(6.0, 70.0).unwrap();
        for (t, v) in blend.curve.points() {
            assert!((v - b.cdf(t)).abs() < 1e-12);
        }
    }
}
