//! The 4-parameter logistic curve and its partial derivatives.
//!
//! ```text
//! f(x) = L / (1 + exp(-k (x - x0))) + b
//! ```
//!
//! Numerical notes:
//! - Everything is expressed through `s = 1 / (1 + exp(-z))`, which stays in
//!   `[0, 1]` even when `exp(-z)` overflows to infinity.
//! - The derivative `ds/dz = s (1 - s)` is computed from `s` rather than from
//!   `exp(-z) / (1 + exp(-z))^2`, which would produce `inf / inf` for large `|z|`.

/// Standard logistic `1 / (1 + exp(-z))`.
pub fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Evaluate the logistic curve with parameters `[L, x0, k, b]`.
pub fn logistic(x: f64, p: &[f64; 4]) -> f64 {
    let [l, x0, k, b] = *p;
    l * sigmoid(k * (x - x0)) + b
}

/// Partial derivatives of the curve w.r.t. `[L, x0, k, b]` at `x`.
pub fn logistic_gradient(x: f64, p: &[f64; 4]) -> [f64; 4] {
    let [l, x0, k, _] = *p;
    let s = sigmoid(k * (x - x0));
    let ds = s * (1.0 - s);
    [s, -l * k * ds, l * (x - x0) * ds, 1.0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn midpoint_is_half_height() {
        let p = [200.0, 7.0, 0.8, 20.0];
        assert!((logistic(7.0, &p) - 120.0).abs() < 1e-12);
    }

    #[test]
    fn saturates_without_overflow() {
        let p = [100.0, 0.0, 1e6, 5.0];
        assert_eq!(logistic(-10.0, &p), 5.0);
        assert_eq!(logistic(10.0, &p), 105.0);
        for g in logistic_gradient(10.0, &p) {
            assert!(g.is_finite());
        }
    }

    #[test]
    fn gradient_matches_finite_differences() {
        let p = [-210.0, 6.5, 0.6, 230.0];
        let x = 4.2;
        let g = logistic_gradient(x, &p);
        let h = 1e-6;
        for i in 0..4 {
            let mut hi = p;
            let mut lo = p;
            hi[i] += h;
            lo[i] -= h;
            let fd = (logistic(x, &hi) - logistic(x, &lo)) / (2.0 * h);
            assert!((fd - g[i]).abs() < 1e-5, "param {i}: fd={fd}, analytic={}", g[i]);
        }
    }
}
