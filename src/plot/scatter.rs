//! c-vs-r scatter plots: raw trials and fit diagnostics.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use plotters::prelude::*;

use crate::domain::{GroupKey, Observation};
use crate::error::AppError;
use crate::fit::{FitSink, GroupFit};
use crate::models::{ExpParams, predict};
use crate::plot::{ensure_dir, render_svg};

const SIZE: (u32, u32) = (640, 480);
const CURVE_SAMPLES: usize = 100;

/// One scatter per configuration with every raw trial's `(c, r)`.
pub fn plot_origpoints(rows: &[Observation], outdir: &Path) -> Result<usize, AppError> {
    ensure_dir(outdir)?;

    let mut groups: BTreeMap<&GroupKey, Vec<(f64, f64)>> = BTreeMap::new();
    for row in rows {
        groups.entry(&row.key).or_default().push((row.c, row.r));
    }

    for (key, points) in &groups {
        let path = outdir.join(format!("{}.svg", key.file_stem()));
        scatter_c_vs_r(points, None, &path)?;
    }
    Ok(groups.len())
}

/// Scatter `(c, r)` points on the unit square, optionally with a fitted curve
/// drawn over the c-range of the points.
pub fn scatter_c_vs_r(points: &[(f64, f64)], fit: Option<ExpParams>, path: &Path) -> Result<(), AppError> {
    let curve = fit.map(|params| {
        let (lo, hi) = c_span(points);
        sample_curve(params, lo, hi, CURVE_SAMPLES)
    });

    render_svg(path, SIZE, |root| {
        let mut chart = ChartBuilder::on(root)
            .margin(10)
            .x_label_area_size(35)
            .y_label_area_size(45)
            .build_cartesian_2d(0f64..1f64, 0f64..1f64)?;

        chart.configure_mesh().x_desc("c").y_desc("r").draw()?;

        chart.draw_series(
            points
                .iter()
                .filter(|p| p.0.is_finite() && p.1.is_finite())
                .map(|&(c, r)| Circle::new((c, r), 3, BLUE.filled())),
        )?;

        if let Some(curve) = curve {
            chart.draw_series(LineSeries::new(curve, &RED))?;
        }
        Ok(())
    })
}

/// Evenly spaced samples of the fitted curve over `[lo, hi]`.
pub fn sample_curve(params: ExpParams, lo: f64, hi: f64, n: usize) -> Vec<(f64, f64)> {
    let n = n.max(2);
    (0..n)
        .map(|i| {
            let c = lo + (hi - lo) * i as f64 / (n - 1) as f64;
            (c, predict(c, params))
        })
        .filter(|p| p.1.is_finite())
        .collect()
}

fn c_span(points: &[(f64, f64)]) -> (f64, f64) {
    let cs = points.iter().map(|p| p.0).filter(|c| c.is_finite());
    let lo = cs.clone().fold(f64::INFINITY, f64::min);
    let hi = cs.fold(f64::NEG_INFINITY, f64::max);
    if lo.is_finite() { (lo, hi) } else { (0.0, 1.0) }
}

/// Writes a diagnostic plot (rising segment + fitted curve) per fitted group.
///
/// The directory is created on the first fit, so a run that only reads
/// cached coefficients leaves no empty `fits/` behind.
#[derive(Debug)]
pub struct FitDiagnostics {
    dir: PathBuf,
    written: usize,
}

impl FitDiagnostics {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: 0,
        }
    }

    pub fn written(&self) -> usize {
        self.written
    }
}

impl FitSink for FitDiagnostics {
    fn fitted(&mut self, key: &GroupKey, fit: &GroupFit) -> Result<(), AppError> {
        if self.written == 0 {
            ensure_dir(&self.dir)?;
        }
        let points: Vec<(f64, f64)> = fit
            .segment
            .cs
            .iter()
            .copied()
            .zip(fit.segment.rs.iter().copied())
            .collect();
        let path = self.dir.join(format!("{}.svg", key.file_stem()));
        scatter_c_vs_r(&points, Some(fit.params), &path)?;
        self.written += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OrdF64;

    fn obs(seed: i64, c: f64, r: f64) -> Observation {
        Observation {
            key: GroupKey {
                nucleipref: "de".to_string(),
                model: "ba".to_string(),
                nvertices: 100,
                avgdegree: OrdF64::new(4.0),
                seed,
            },
            c,
            r,
            s: 0.0,
        }
    }

    #[test]
    fn sample_curve_spans_range() {
        let pts = sample_curve(ExpParams { a: -0.5, b: -6.0 }, 0.1, 0.5, 5);
        assert_eq!(pts.len(), 5);
        assert_eq!(pts[0].0, 0.1);
        assert!((pts[4].0 - 0.5).abs() < 1e-12);
        assert!(pts.windows(2).all(|w| w[1].1 > w[0].1));
    }

    #[test]
    fn origpoints_writes_one_file_per_configuration() {
        let dir = tempfile::tempdir().unwrap();
        let outdir = dir.path().join("origpoints");
        let rows = vec![obs(0, 0.1, 0.2), obs(0, 0.5, 0.6), obs(1, 0.1, 0.3)];

        let n = plot_origpoints(&rows, &outdir).unwrap();
        assert_eq!(n, 2);
        assert!(outdir.join("de_ba_100_4_0.svg").exists());
        assert!(outdir.join("de_ba_100_4_1.svg").exists());
    }

    #[test]
    fn fitted_scatter_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fit.svg");
        let points = [(0.1, 0.22), (0.2, 0.35), (0.3, 0.42)];
        scatter_c_vs_r(&points, Some(ExpParams { a: -0.5, b: -6.0 }), &path).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("<circle"));
    }
}
