//! Levenberg–Marquardt nonlinear least squares.
//!
//! We minimize
//!
//! ```text
//! Σ (f(x_i; p) - y_i)^2
//! ```
//!
//! over a small parameter vector `p`, starting from a fixed initial guess.
//!
//! Implementation choices:
//! - The Jacobian is approximated by forward differences, so model functions
//!   only need to provide values.
//! - Damping is applied to the diagonal of `JᵀJ` (Marquardt scaling), which keeps
//!   steps well-sized for parameters of very different magnitude.
//! - A model may reject a trial point by returning `None` (e.g. a non-positive
//!   scale). Such steps count as failed and increase damping.
//! - The covariance follows the classical curve-fit convention:
//!   `pinv(JᵀJ) · SSE / (n - p)`, filled with `+∞` when `n == p`.

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::error::AppError;

/// Residual sum of squares below which a fit is treated as exact.
const SSE_FLOOR: f64 = 1e-30;
/// Damping above which no further progress is possible in double precision.
const LAMBDA_MAX: f64 = 1e20;
const LAMBDA_MIN: f64 = 1e-12;
const DIAG_FLOOR: f64 = 1e-12;

/// Solver stopping rules.
#[derive(Debug, Clone)]
pub struct SolverOptions {
    /// Maximum number of trial steps.
    pub max_iterations: usize,
    /// Relative reduction in SSE below which the fit has converged.
    pub ftol: f64,
    /// Relative step size below which the fit has converged.
    pub xtol: f64,
    /// Initial damping factor.
    pub lambda0: f64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            // 200 * (p + 1) for a two-parameter model.
            max_iterations: 600,
            ftol: 1.49012e-8,
            xtol: 1.49012e-8,
            lambda0: 1e-3,
        }
    }
}

/// Converged solution.
#[derive(Debug, Clone)]
pub struct LeastSquaresFit {
    pub params: Vec<f64>,
    pub covariance: DMatrix<f64>,
    pub sse: f64,
    pub iterations: usize,
}

/// Fit `model(x, p)` to `(x, y)` starting from `p0`.
///
/// Fails when the data cannot determine the parameters, when the initial
/// guess is outside the model domain, or when the iteration budget runs out.
pub fn levenberg_marquardt<F>(
    model: F,
    x: &[f64],
    y: &[f64],
    p0: &[f64],
    opts: &SolverOptions,
) -> Result<LeastSquaresFit, AppError>
where
    F: Fn(f64, &[f64]) -> Option<f64>,
{
    if x.len() != y.len() {
        return Err(AppError::failure(format!(
            "Mismatched observations: {} x-values vs {} y-values.",
            x.len(),
            y.len()
        )));
    }
    if p0.is_empty() || x.len() < p0.len() {
        return Err(AppError::failure(format!(
            "Need at least {} observations to fit {} parameters (got {}).",
            p0.len(),
            p0.len(),
            x.len()
        )));
    }

    let mut p = DVector::from_column_slice(p0);
    let mut r = residuals(&model, x, y, &p)
        .ok_or_else(|| AppError::failure("Initial guess is outside the model domain."))?;
    let mut sse = r.norm_squared();
    let mut lambda = opts.lambda0;
    let mut jac = jacobian(&model, x, y, &p, &r)?;

    for iteration in 1..=opts.max_iterations {
        let jtj = jac.tr_mul(&jac);
        let grad = jac.tr_mul(&r);
        if sse <= SSE_FLOOR || grad.amax() == 0.0 {
            return finish(&model, x, y, p, sse, iteration - 1);
        }

        let mut damped = jtj.clone();
        for k in 0..p.len() {
            damped[(k, k)] += lambda * jtj[(k, k)].max(DIAG_FLOOR);
        }

        let Some(step) = solve_damped(&damped, &(-&grad)) else {
            lambda *= 10.0;
            if lambda > LAMBDA_MAX {
                return Err(AppError::failure("Normal equations are singular."));
            }
            continue;
        };

        let small_step = step.norm() <= opts.xtol * (p.norm() + opts.xtol);
        let candidate = &p + &step;

        match residuals(&model, x, y, &candidate) {
            Some(r_new) if r_new.norm_squared() < sse => {
                let sse_new = r_new.norm_squared();
                let reduction = (sse - sse_new) / sse;
                p = candidate;
                r = r_new;
                sse = sse_new;
                lambda = (lambda / 10.0).max(LAMBDA_MIN);
                debug!(iteration, sse, lambda, params = ?p.as_slice(), "accepted step");

                if reduction <= opts.ftol || small_step {
                    return finish(&model, x, y, p, sse, iteration);
                }
                jac = jacobian(&model, x, y, &p, &r)?;
            }
            _ => {
                // The step cannot improve the fit; once it is below resolution the
                // current point is the minimum.
                if small_step || lambda >= LAMBDA_MAX {
                    return finish(&model, x, y, p, sse, iteration);
                }
                lambda *= 10.0;
            }
        }
    }

    Err(AppError::failure(format!(
        "Least-squares fit did not converge within {} iterations (sse={sse:.3e}).",
        opts.max_iterations
    )))
}

fn residuals<F>(model: &F, x: &[f64], y: &[f64], p: &DVector<f64>) -> Option<DVector<f64>>
where
    F: Fn(f64, &[f64]) -> Option<f64>,
{
    let params = p.as_slice();
    let mut out = DVector::zeros(x.len());
    for (i, (&xi, &yi)) in x.iter().zip(y).enumerate() {
        let v = model(xi, params)?;
        if !v.is_finite() {
            return None;
        }
        out[i] = v - yi;
    }
    Some(out)
}

/// Forward-difference Jacobian of the residual vector.
fn jacobian<F>(
    model: &F,
    x: &[f64],
    y: &[f64],
    p: &DVector<f64>,
    r: &DVector<f64>,
) -> Result<DMatrix<f64>, AppError>
where
    F: Fn(f64, &[f64]) -> Option<f64>,
{
    let eps = f64::EPSILON.sqrt();
    let mut jac = DMatrix::zeros(x.len(), p.len());
    let mut shifted: Vec<f64> = p.iter().copied().collect();

    for j in 0..p.len() {
        let h = if p[j] == 0.0 { eps } else { eps * p[j].abs() };
        shifted[j] = p[j] + h;
        for (i, (&xi, &yi)) in x.iter().zip(y).enumerate() {
            let v = model(xi, &shifted)
                .filter(|v| v.is_finite())
                .ok_or_else(|| AppError::failure("Model is undefined next to the current parameters."))?;
            jac[(i, j)] = ((v - yi) - r[i]) / h;
        }
        shifted[j] = p[j];
    }

    Ok(jac)
}

/// Solve the damped normal equations via SVD.
///
/// The system is tiny (one row per parameter), and SVD degrades gracefully when
/// `JᵀJ` is nearly singular.
fn solve_damped(a: &DMatrix<f64>, b: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = a.clone().svd(true, true);
    for &tol in &[1e-14, 1e-12, 1e-10] {
        if let Ok(step) = svd.solve(b, tol) {
            if step.iter().all(|v| v.is_finite()) {
                return Some(step);
            }
        }
    }
    None
}

fn finish<F>(
    model: &F,
    x: &[f64],
    y: &[f64],
    p: DVector<f64>,
    sse: f64,
    iterations: usize,
) -> Result<LeastSquaresFit, AppError>
where
    F: Fn(f64, &[f64]) -> Option<f64>,
{
    let r = residuals(model, x, y, &p)
        .ok_or_else(|| AppError::failure("Model is undefined at the solution."))?;
    let jac = jacobian(model, x, y, &p, &r)?;
    let covariance = covariance(&jac, sse);
    Ok(LeastSquaresFit {
        params: p.iter().copied().collect(),
        covariance,
        sse,
        iterations,
    })
}

/// `pinv(JᵀJ) · SSE / (n - p)`; all entries `+∞` without residual degrees of freedom.
fn covariance(jac: &DMatrix<f64>, sse: f64) -> DMatrix<f64> {
    let (n, m) = jac.shape();
    if n <= m {
        return DMatrix::from_element(m, m, f64::INFINITY);
    }

    let jtj = jac.tr_mul(jac);
    let svd = jtj.svd(true, true);
    let s_max = svd.singular_values.max();
    let threshold = f64::EPSILON * n.max(m) as f64 * s_max;
    match svd.pseudo_inverse(threshold) {
        Ok(pinv) => pinv * (sse / (n - m) as f64),
        Err(_) => DMatrix::from_element(m, m, f64::INFINITY),
    }
}
