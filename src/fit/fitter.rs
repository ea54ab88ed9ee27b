//! Exponential fit for a single configuration group.
//!
//! Given the aggregated `(c, rmean)` curve of one `GroupKey`, we:
//! - sort by ascending `c` and drop non-finite `rmean` values
//! - keep the rising segment: every point up to the first maximum of `rmean`
//! - require at least `min_points` distinct `c` values on that segment
//! - fit `r = a·(e^(b·c) − 1)` by Levenberg–Marquardt from the configured
//!   starting point
//! - reject fits that slid into the `b → 0` limit, where the model is a line
//!   and `a` grows without bound

use nalgebra::{DMatrix, DVector};
use thiserror::Error;

use crate::domain::{AggRecord, FitOptions, FitRecord, GroupKey};
use crate::math::{LeastSquaresProblem, LmError, LmOptions, levenberg_marquardt};
use crate::models::{ExpParams, fill_jacobian_row, predict};

/// Smallest `|b|·max|c|` accepted from the solver.
const MIN_CURVATURE: f64 = 1e-2;

/// Why a group produced no fit record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    #[error("insufficient sample: {distinct} distinct c-values on the rising segment, need {required}")]
    InsufficientSample { distinct: usize, required: usize },
    #[error("no finite rmean values")]
    NoFiniteResponse,
    #[error("degenerate input: all c-values are identical")]
    Degenerate,
    #[error("fit failed: {0}")]
    Solver(#[from] LmError),
    #[error("fit produced non-finite coefficients")]
    NonFinite,
}

/// Points of a group curve up to (and including) its peak.
#[derive(Debug, Clone, PartialEq)]
pub struct RisingSegment {
    pub cs: Vec<f64>,
    pub rs: Vec<f64>,
    /// `c` at the peak.
    pub cmax: f64,
    /// `rmean` at the peak.
    pub rmax: f64,
}

impl RisingSegment {
    pub fn distinct_c(&self) -> usize {
        let mut cs = self.cs.clone();
        cs.sort_by(f64::total_cmp);
        cs.dedup();
        cs.len()
    }
}

/// Successful fit of one group.
#[derive(Debug, Clone)]
pub struct GroupFit {
    pub record: FitRecord,
    pub segment: RisingSegment,
    pub params: ExpParams,
    /// Model evaluations spent by the solver.
    pub evals: usize,
}

/// Cut a c-sorted curve at its first maximum.
///
/// Returns `None` for an empty curve.
pub fn rising_segment(points: &[(f64, f64)]) -> Option<RisingSegment> {
    let peak = argmax_first(points)?;
    let prefix = &points[..=peak];

    // The peak is located again inside the prefix. For a c-sorted curve this
    // lands on the same point; it is kept as a separate step so the prefix,
    // not the full curve, defines (cmax, rmax).
    let peak = argmax_first(prefix)?;
    let kept = &prefix[..=peak];

    Some(RisingSegment {
        cs: kept.iter().map(|p| p.0).collect(),
        rs: kept.iter().map(|p| p.1).collect(),
        cmax: prefix[peak].0,
        rmax: prefix[peak].1,
    })
}

/// Index of the first maximum of the second coordinate.
fn argmax_first(points: &[(f64, f64)]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, p) in points.iter().enumerate() {
        match best {
            Some(b) if p.1 <= points[b].1 => {}
            _ => best = Some(i),
        }
    }
    best
}

/// Fit one group from its aggregated rows (any order).
pub fn fit_group(key: &GroupKey, rows: &[&AggRecord], opts: &FitOptions) -> Result<GroupFit, FitError> {
    let mut points: Vec<(f64, f64)> = rows
        .iter()
        .filter(|r| r.rmean.is_finite() && r.c.is_finite())
        .map(|r| (r.c, r.rmean))
        .collect();
    points.sort_by(|a, b| a.0.total_cmp(&b.0));

    let segment = rising_segment(&points).ok_or(FitError::NoFiniteResponse)?;

    let distinct = segment.distinct_c();
    if distinct < opts.min_points {
        return Err(FitError::InsufficientSample {
            distinct,
            required: opts.min_points,
        });
    }
    if distinct < 2 {
        return Err(FitError::Degenerate);
    }

    let problem = ExpProblem {
        cs: &segment.cs,
        rs: &segment.rs,
    };
    let lm_opts = LmOptions {
        max_evals: opts.max_evals,
        ..LmOptions::default()
    };
    let report = levenberg_marquardt(&problem, DVector::from_row_slice(&opts.initial), &lm_opts)?;

    let params = ExpParams::from_slice(report.params.as_slice());
    if !params.is_finite() {
        return Err(FitError::NonFinite);
    }
    if collapsed_to_line(params, &segment.cs) {
        return Err(FitError::Solver(LmError::Stalled));
    }

    Ok(GroupFit {
        record: FitRecord::new(key, segment.cmax, segment.rmax, params.a, params.b),
        segment,
        params,
        evals: report.evals,
    })
}

/// Whether the exponential degenerated into a straight line over `cs`.
///
/// Convex segments pull a fit started on the concave side into this valley;
/// the solver then stops on a flat direction, not at a minimum.
fn collapsed_to_line(params: ExpParams, cs: &[f64]) -> bool {
    let c_span = cs.iter().fold(0.0_f64, |m, c| m.max(c.abs()));
    (params.b * c_span).abs() < MIN_CURVATURE
}

struct ExpProblem<'a> {
    cs: &'a [f64],
    rs: &'a [f64],
}

impl LeastSquaresProblem for ExpProblem<'_> {
    fn residuals(&self, params: &DVector<f64>) -> DVector<f64> {
        let p = ExpParams::from_slice(params.as_slice());
        DVector::from_iterator(
            self.cs.len(),
            self.cs.iter().zip(self.rs).map(|(&c, &r)| r - predict(c, p)),
        )
    }

    fn jacobian(&self, params: &DVector<f64>) -> DMatrix<f64> {
        let p = ExpParams::from_slice(params.as_slice());
        let mut jac = DMatrix::<f64>::zeros(self.cs.len(), 2);
        let mut row = [0.0; 2];
        for (i, &c) in self.cs.iter().enumerate() {
            fill_jacobian_row(c, p, &mut row);
            jac[(i, 0)] = row[0];
            jac[(i, 1)] = row[1];
        }
        jac
    }
}
