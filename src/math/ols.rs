//! Least squares solver for the damped Gauss–Newton step.
//!
//! Each Levenberg–Marquardt iteration solves a small linear problem of the form:
//!
//! ```text
//! minimize ‖J δ + r‖² + λ ‖D δ‖²
//! ```
//!
//! which we express as a single stacked least-squares system
//! `[J; √λ D] δ = [-r; 0]`.
//!
//! Implementation choices:
//! - We use SVD so the tall system (more rows than columns) is solved robustly
//!   even when the Jacobian is rank deficient (e.g. a saturated logistic where
//!   the `x0` and `k` columns vanish).
//!   (Nalgebra's `QR::solve` is intended for square systems and will panic for
//!   non-square matrices.)
//! - The parameter dimension is 4, so SVD cost is negligible.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Solve the damped step `[J; √λ D] δ = [-r; 0]`.
///
/// `scale` holds the diagonal of `D`.
pub fn solve_damped_step(
    jacobian: &DMatrix<f64>,
    residuals: &DVector<f64>,
    scale: &[f64],
    lambda: f64,
) -> Option<DVector<f64>> {
    let (n, p) = jacobian.shape();
    let sqrt_lambda = lambda.max(0.0).sqrt();

    let mut a = DMatrix::<f64>::zeros(n + p, p);
    a.view_mut((0, 0), (n, p)).copy_from(jacobian);
    for j in 0..p {
        a[(n + j, j)] = sqrt_lambda * scale[j];
    }

    let mut rhs = DVector::<f64>::zeros(n + p);
    for i in 0..n {
        rhs[i] = -residuals[i];
    }

    solve_least_squares(&a, &rhs)
}
