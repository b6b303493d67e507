//! Nonlinear least-squares fit of a 4-parameter logistic curve.
//!
//! Given:
//! - calibration pH values `x_i`
//! - observed channel intensities `y_i`
//!
//! we minimize `Σ (f(x_i; L, x0, k, b) - y_i)²` with Levenberg–Marquardt:
//!
//! - each iteration solves the damped step `[J; √λ D] δ = [-r; 0]` by SVD
//! - `D` is the Marquardt scaling `sqrt(diag(JᵀJ))`
//! - accepted steps shrink `λ` by 10, rejected steps grow it by 10
//!
//! Convergence is declared when any of these holds:
//! - relative SSE reduction of an accepted step is `<= ftol`
//! - the step is tiny relative to the parameter vector (`<= xtol`)
//! - the gradient `Jᵀr` is flat (`<= gtol`)
//! - `λ` has grown so large that no step can reduce the SSE further
//!
//! Running out of residual evaluations before any of those is a fit failure.

use log::debug;
use nalgebra::{DMatrix, DVector};

use crate::domain::{FitQuality, LogisticParams};
use crate::error::AppError;
use crate::math::{logistic, logistic_gradient, solve_damped_step};

const LAMBDA_INIT: f64 = 1e-3;
const LAMBDA_MIN: f64 = 1e-12;
const LAMBDA_MAX: f64 = 1e16;
/// Floor for the Marquardt scaling so saturated columns still get damped.
const SCALE_FLOOR: f64 = 1e-12;

/// Solver controls for the logistic fit.
#[derive(Debug, Clone)]
pub struct LogisticFitOptions {
    /// Maximum number of residual evaluations.
    pub max_evals: usize,
    pub ftol: f64,
    pub xtol: f64,
    pub gtol: f64,
}

impl Default for LogisticFitOptions {
    fn default() -> Self {
        Self {
            max_evals: crate::domain::DEFAULT_MAX_EVALS,
            ftol: 1e-10,
            xtol: 1e-10,
            gtol: 1e-10,
        }
    }
}

/// Best fit for a single channel.
#[derive(Debug, Clone)]
pub struct LogisticFit {
    pub params: LogisticParams,
    pub quality: FitQuality,
}

/// Fit `L / (1 + exp(-k (x - x0))) + b` to `(xs, ys)`.
pub fn fit_logistic(xs: &[f64], ys: &[f64], opts: &LogisticFitOptions) -> Result<LogisticFit, AppError> {
    if xs.len() != ys.len() {
        return Err(AppError::fit(format!(
            "Mismatched fit input: {} x values vs {} y values.",
            xs.len(),
            ys.len()
        )));
    }
    if xs.len() < 4 {
        return Err(AppError::fit(format!(
            "Logistic fit needs at least 4 points, got {}.",
            xs.len()
        )));
    }
    if xs.iter().chain(ys.iter()).any(|v| !v.is_finite()) {
        return Err(AppError::fit("Non-finite value in fit input."));
    }

    let n = xs.len();
    let mut p = initial_guess(xs, ys);
    let mut r = residuals(xs, ys, &p);
    let mut evals = 1usize;
    let mut cost = r.norm_squared();
    if !cost.is_finite() {
        return Err(AppError::fit("Non-finite residuals at the initial guess."));
    }

    let mut lambda = LAMBDA_INIT;
    let mut converged = cost == 0.0;

    while !converged {
        if evals >= opts.max_evals {
            return Err(AppError::fit(format!(
                "Logistic fit did not converge within {} evaluations (sse={cost:.4}).",
                opts.max_evals
            )));
        }

        let j = jacobian(xs, &p);
        let g = j.transpose() * &r;
        if g.amax() <= opts.gtol * (1.0 + cost) {
            break;
        }

        let scale: Vec<f64> = (0..4)
            .map(|c| j.column(c).norm_squared().max(SCALE_FLOOR).sqrt())
            .collect();

        let Some(delta) = solve_damped_step(&j, &r, &scale, lambda) else {
            lambda *= 10.0;
            converged = lambda > LAMBDA_MAX;
            continue;
        };

        let p_norm = p.iter().map(|v| v * v).sum::<f64>().sqrt();
        let step_small = delta.norm() <= opts.xtol * (opts.xtol + p_norm);

        let candidate = [p[0] + delta[0], p[1] + delta[1], p[2] + delta[2], p[3] + delta[3]];
        let r_new = residuals(xs, ys, &candidate);
        evals += 1;
        let cost_new = r_new.norm_squared();

        if cost_new.is_finite() && cost_new < cost {
            let reduction = (cost - cost_new) / cost;
            p = candidate;
            r = r_new;
            cost = cost_new;
            lambda = (lambda / 10.0).max(LAMBDA_MIN);
            converged = reduction <= opts.ftol || step_small || cost == 0.0;
        } else {
            lambda *= 10.0;
            converged = step_small || lambda > LAMBDA_MAX;
        }
    }

    let params = LogisticParams::from_slice(&p);
    if !params.is_finite() {
        return Err(AppError::fit(format!("Logistic fit produced non-finite parameters: {params:?}")));
    }

    let rmse = (cost / n as f64).sqrt();
    debug!(
        "logistic fit: L={:.4} x0={:.4} k={:.4} b={:.4} sse={cost:.4} evals={evals}",
        params.l, params.x0, params.k, params.b
    );

    Ok(LogisticFit {
        params,
        quality: FitQuality {
            sse: cost,
            rmse,
            evaluations: evals,
            n,
        },
    })
}

/// Deterministic starting point derived from the data.
///
/// The curve starts spanning the observed range in the direction of the
/// overall trend, centered on the x range, with a midpoint slope equal to the
/// average slope of the data.
pub fn initial_guess(xs: &[f64], ys: &[f64]) -> [f64; 4] {
    let (y_min, y_max) = ys
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &y| (lo.min(y), hi.max(y)));
    let x_first = xs[0];
    let x_last = xs[xs.len() - 1];
    let rising = ys[ys.len() - 1] >= ys[0];
    let span = y_max - y_min;

    let x_range = (x_last - x_first).abs().max(1e-9);
    let l = if rising { span } else { -span };
    let b = if rising { y_min } else { y_max };
    [l, 0.5 * (x_first + x_last), 4.0 / x_range, b]
}

fn residuals(xs: &[f64], ys: &[f64], p: &[f64; 4]) -> DVector<f64> {
    DVector::from_iterator(xs.len(), xs.iter().zip(ys).map(|(&x, &y)| logistic(x, p) - y))
}

fn jacobian(xs: &[f64], p: &[f64; 4]) -> DMatrix<f64> {
    let mut j = DMatrix::<f64>::zeros(xs.len(), 4);
    for (i, &x) in xs.iter().enumerate() {
        let g = logistic_gradient(x, p);
        for (c, v) in g.iter().enumerate() {
            j[(i, c)] = *v;
        }
    }
    j
}
