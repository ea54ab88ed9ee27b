//! SVG plot families rendered with Plotters.
//!
//! The renderers only consume computed tables; nothing here feeds back into
//! aggregation or fitting. Every family writes into its own subdirectory of
//! the run output and returns the number of images written.
//!
//! - `scatter`: raw c-vs-r points and per-group fit diagnostics
//! - `errorbar`: r/s mean ± std per configuration, parameter slices
//! - `pairwise`: fit parameters against each other
//! - `contour` / `surface`: fit parameters over the nvertices × avgdegree grid

use std::collections::BTreeMap;
use std::fmt::Display;
use std::fs::create_dir_all;
use std::ops::Range;
use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::domain::{FitParam, FitRecord, OrdF64};
use crate::error::AppError;

pub mod contour;
pub mod errorbar;
pub mod pairwise;
pub mod scatter;
pub mod surface;

pub use contour::*;
pub use errorbar::*;
pub use pairwise::*;
pub use scatter::*;
pub use surface::*;

pub(crate) type Area<'a> = DrawingArea<SVGBackend<'a>, Shift>;
pub(crate) type DrawResult = Result<(), Box<dyn std::error::Error>>;

/// Series colours, one per model (cycled).
pub(crate) const PALETTE: [RGBColor; 3] = [
    RGBColor(0, 128, 0),   // green
    RGBColor(255, 140, 0), // darkorange
    RGBColor(0, 0, 255),   // blue
];

pub(crate) fn palette(idx: usize) -> RGBColor {
    PALETTE[idx % PALETTE.len()]
}

pub(crate) fn ensure_dir(dir: &Path) -> Result<(), AppError> {
    create_dir_all(dir).map_err(|e| AppError::new(4, format!("Failed to create '{}': {e}", dir.display())))
}

/// Render one SVG file.
pub(crate) fn render_svg<F>(path: &Path, size: (u32, u32), draw: F) -> Result<(), AppError>
where
    F: FnOnce(&Area<'_>) -> DrawResult,
{
    let fail = |e: &dyn Display| AppError::new(4, format!("Failed to render '{}': {e}", path.display()));

    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).map_err(|e| fail(&e))?;
    draw(&root).map_err(|e| fail(&e))?;
    root.present().map_err(|e| fail(&e))?;
    Ok(())
}

/// Axis range covering `values` with a 5% margin.
///
/// Non-finite values are ignored. A flat or empty set gets a unit-wide range
/// so Plotters never sees an empty interval.
pub(crate) fn padded_range<I: IntoIterator<Item = f64>>(values: I) -> Range<f64> {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for v in values.into_iter().filter(|v| v.is_finite()) {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if !lo.is_finite() {
        return 0.0..1.0;
    }
    let span = hi - lo;
    if span <= f64::EPSILON * lo.abs().max(1.0) {
        return (lo - 0.5)..(hi + 0.5);
    }
    let pad = span * 0.05;
    (lo - pad)..(hi + pad)
}

/// Mean of one fit parameter per (nvertices, avgdegree) cell.
///
/// Shared by the contour and surface families. Axes are the distinct sizes
/// present in `records`, ascending.
#[derive(Debug, Clone)]
pub(crate) struct SizeGrid {
    pub nvertices: Vec<i64>,
    pub avgdegree: Vec<f64>,
    /// `(nvertices index, avgdegree index) -> mean value`.
    pub cells: BTreeMap<(usize, usize), f64>,
}

impl SizeGrid {
    pub fn build(records: &[&FitRecord], param: FitParam) -> Self {
        let mut sums: BTreeMap<(i64, OrdF64), (f64, usize)> = BTreeMap::new();
        for rec in records {
            let v = rec.param(param);
            if !v.is_finite() {
                continue;
            }
            let e = sums.entry((rec.nvertices, OrdF64::new(rec.avgdegree))).or_insert((0.0, 0));
            e.0 += v;
            e.1 += 1;
        }

        let mut nvertices: Vec<i64> = sums.keys().map(|k| k.0).collect();
        nvertices.dedup();
        let mut degrees: Vec<OrdF64> = sums.keys().map(|k| k.1).collect();
        degrees.sort();
        degrees.dedup();

        let cells = sums
            .iter()
            .filter_map(|((nv, k), (sum, n))| {
                let i = nvertices.binary_search(nv).ok()?;
                let j = degrees.binary_search(k).ok()?;
                Some(((i, j), sum / *n as f64))
            })
            .collect();

        Self {
            nvertices,
            avgdegree: degrees.into_iter().map(OrdF64::get).collect(),
            cells,
        }
    }

    pub fn is_grid(&self) -> bool {
        self.nvertices.len() >= 2 && self.avgdegree.len() >= 2
    }

    pub fn value_range(&self) -> Range<f64> {
        padded_range(self.cells.values().copied())
    }
}
