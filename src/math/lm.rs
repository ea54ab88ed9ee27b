//! Levenberg–Marquardt nonlinear least squares.
//!
//! Given a model `f(p)` with observations `y`, we minimize `‖y − f(p)‖²`.
//! Each iteration solves the damped linearized problem
//!
//! ```text
//! minimize ‖J δ − r‖² + λ ‖D δ‖²
//! ```
//!
//! with `r = y − f(p)`, `J = ∂f/∂p` and `D` the Jacobian column norms
//! (Marquardt scaling). A step that lowers the cost is accepted and `λ`
//! shrinks; otherwise `λ` grows and the step is retried.
//!
//! The evaluation budget counts residual evaluations, including rejected
//! trial steps. A step that only became small because `λ` is saturated is
//! reported as a stall rather than convergence.

use nalgebra::{DMatrix, DVector};
use thiserror::Error;

use crate::math::solve_least_squares;

const LAMBDA_INIT: f64 = 1e-3;
const LAMBDA_MIN: f64 = 1e-15;
const LAMBDA_MAX: f64 = 1e32;
const LAMBDA_UP: f64 = 10.0;
const LAMBDA_DOWN: f64 = 10.0;
/// Past this damping a tiny step reflects the damping, not a minimum.
const LAMBDA_SATURATED: f64 = 1e6;
const SCALE_FLOOR: f64 = 1e-12;

/// A nonlinear least squares problem.
pub trait LeastSquaresProblem {
    /// Residuals `y − f(p)`.
    fn residuals(&self, params: &DVector<f64>) -> DVector<f64>;

    /// Jacobian of the model `f` at `p` (one row per observation).
    fn jacobian(&self, params: &DVector<f64>) -> DMatrix<f64>;
}

/// Solver settings.
#[derive(Debug, Clone)]
pub struct LmOptions {
    pub max_evals: usize,
    /// Relative cost reduction below which an accepted step ends the solve.
    pub ftol: f64,
    /// Relative step size below which the solve ends.
    pub xtol: f64,
}

impl Default for LmOptions {
    fn default() -> Self {
        // Same tolerances MINPACK's lmder uses by default.
        Self {
            max_evals: 10_000,
            ftol: 1.49012e-8,
            xtol: 1.49012e-8,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LmReport {
    pub params: DVector<f64>,
    /// Final sum of squared residuals.
    pub cost: f64,
    pub evals: usize,
    /// Accepted steps.
    pub iterations: usize,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LmError {
    #[error("residuals are not finite at the starting point")]
    NonFiniteStart,
    #[error("no convergence within {evals} evaluations")]
    NoConvergence { evals: usize },
    #[error("solver stalled without reaching a minimum")]
    Stalled,
}

/// Minimize `‖y − f(p)‖²` starting from `initial`.
pub fn levenberg_marquardt<P: LeastSquaresProblem>(
    problem: &P,
    initial: DVector<f64>,
    opts: &LmOptions,
) -> Result<LmReport, LmError> {
    let m = initial.len();
    let mut params = initial;
    let mut residuals = problem.residuals(&params);
    let mut evals = 1usize;
    if !residuals.iter().all(|v| v.is_finite()) {
        return Err(LmError::NonFiniteStart);
    }
    let mut cost = residuals.norm_squared();
    let mut lambda = LAMBDA_INIT;
    let mut iterations = 0usize;

    loop {
        if cost <= f64::MIN_POSITIVE {
            return Ok(LmReport { params, cost, evals, iterations });
        }

        let jac = problem.jacobian(&params);
        let n = jac.nrows();
        let scale: Vec<f64> = (0..m).map(|j| jac.column(j).norm().max(SCALE_FLOOR)).collect();

        loop {
            if evals >= opts.max_evals {
                return Err(LmError::NoConvergence { evals });
            }

            // Stack [J; √λ·D] so the damped step is a plain least squares solve.
            let damp = lambda.sqrt();
            let mut stacked = DMatrix::<f64>::zeros(n + m, m);
            stacked.view_mut((0, 0), (n, m)).copy_from(&jac);
            for (j, s) in scale.iter().enumerate() {
                stacked[(n + j, j)] = damp * s;
            }
            let mut rhs = DVector::<f64>::zeros(n + m);
            rhs.rows_mut(0, n).copy_from(&residuals);

            let Some(step) = solve_least_squares(&stacked, &rhs) else {
                lambda *= LAMBDA_UP;
                if lambda > LAMBDA_MAX {
                    return Err(LmError::Stalled);
                }
                continue;
            };

            if step.norm() <= opts.xtol * (params.norm() + opts.xtol) {
                if lambda > LAMBDA_SATURATED {
                    return Err(LmError::Stalled);
                }
                return Ok(LmReport { params, cost, evals, iterations });
            }

            let candidate = &params + &step;
            let candidate_residuals = problem.residuals(&candidate);
            evals += 1;
            let candidate_cost = candidate_residuals.norm_squared();

            if candidate_cost.is_finite() && candidate_cost < cost {
                let previous = cost;
                params = candidate;
                residuals = candidate_residuals;
                cost = candidate_cost;
                iterations += 1;
                lambda = (lambda / LAMBDA_DOWN).max(LAMBDA_MIN);

                if previous - cost <= opts.ftol * previous {
                    return Ok(LmReport { params, cost, evals, iterations });
                }
                break;
            }

            lambda *= LAMBDA_UP;
            if lambda > LAMBDA_MAX {
                return Err(LmError::Stalled);
            }
        }
    }
}
