//! Linear least squares solver.
//!
//! Every Levenberg–Marquardt step solves a small problem of the form:
//!
//! ```text
//! minimize ‖J δ - r‖² + λ ‖D δ‖²
//! ```
//!
//! which is an ordinary least squares problem on the stacked matrix
//! `[J; √λ·D]` with right-hand side `[r; 0]`.
//!
//! We solve it with SVD rather than normal equations: the stacked matrix is
//! tall and, for nearly flat response curves, `J` is close to rank one.
//! (Nalgebra's `QR::solve` is intended for square systems and will panic for
//! non-square matrices.)

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}
