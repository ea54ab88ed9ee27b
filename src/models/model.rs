//! Exponential response model.
//!
//! ```text
//! r(c) = a · (e^(b·c) − 1)
//! ```
//!
//! The `− 1` pins the curve to the origin, so `r(0) = 0` for any `(a, b)`.
//! The rising branch observed in the sweeps has `a < 0` and `b < 0`.
//!
//! The solver relies on two primitive operations:
//! - predict `r(c)` given `(a, b)` (for residuals/plots)
//! - fill a Jacobian row `[∂r/∂a, ∂r/∂b]` for a given `c`

/// Fitted (or candidate) model coefficients.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpParams {
    pub a: f64,
    pub b: f64,
}

impl ExpParams {
    pub fn from_slice(p: &[f64]) -> Self {
        Self { a: p[0], b: p[1] }
    }

    pub fn is_finite(self) -> bool {
        self.a.is_finite() && self.b.is_finite()
    }
}

/// Predict `r(c)`.
pub fn predict(c: f64, params: ExpParams) -> f64 {
    params.a * (params.b * c).exp_m1()
}

/// Fill the Jacobian row of the model at `c`.
///
/// # Panics
/// Panics if `out` has fewer than two elements.
pub fn fill_jacobian_row(c: f64, params: ExpParams, out: &mut [f64]) {
    let e = (params.b * c).exp();
    out[0] = e - 1.0;
    out[1] = params.a * c * e;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curve_passes_through_origin() {
        let p = ExpParams { a: -0.5, b: -6.0 };
        assert_eq!(predict(0.0, p), 0.0);
        assert!(predict(0.5, p) > 0.0);
    }

    #[test]
    fn jacobian_matches_finite_differences() {
        let p = ExpParams { a: -0.7, b: -4.0 };
        let c = 0.3;
        let mut row = [0.0; 2];
        fill_jacobian_row(c, p, &mut row);

        let h = 1e-7;
        let da = (predict(c, ExpParams { a: p.a + h, ..p }) - predict(c, p)) / h;
        let db = (predict(c, ExpParams { b: p.b + h, ..p }) - predict(c, p)) / h;
        assert!((row[0] - da).abs() < 1e-5);
        assert!((row[1] - db).abs() < 1e-5);
    }
}
