//! Mean ± std plots: r/s per configuration and fit parameters versus size.

use std::collections::BTreeMap;
use std::ops::Range;
use std::path::Path;

use plotters::prelude::*;

use crate::data::DistinctValues;
use crate::domain::{AggRecord, FitParam, FitRecord, GroupKey};
use crate::error::AppError;
use crate::math::{mean, population_std};
use crate::plot::{Area, DrawResult, ensure_dir, padded_range, palette, render_svg};

/// One line with vertical error bars.
#[derive(Debug, Clone)]
pub struct ErrorSeries {
    pub label: Option<String>,
    pub color: RGBColor,
    /// `(x, mean, std)`; a NaN std draws no bar.
    pub points: Vec<(f64, f64, f64)>,
}

/// Side-by-side r and s error-bar plots per configuration.
pub fn plot_r_s(aggregated: &[AggRecord], outdir: &Path) -> Result<usize, AppError> {
    ensure_dir(outdir)?;

    let mut groups: BTreeMap<GroupKey, Vec<&AggRecord>> = BTreeMap::new();
    for rec in aggregated {
        groups.entry(rec.group_key()).or_default().push(rec);
    }

    let written = groups.len();
    for (key, mut rows) in groups {
        rows.sort_by(|a, b| a.c.total_cmp(&b.c));
        let r = ErrorSeries {
            label: None,
            color: BLUE,
            points: rows.iter().map(|x| (x.c, x.rmean, x.rstd)).collect(),
        };
        let s = ErrorSeries {
            label: None,
            color: BLUE,
            points: rows.iter().map(|x| (x.c, x.smean, x.sstd)).collect(),
        };

        let path = outdir.join(format!("{}.svg", key.file_stem()));
        render_svg(&path, (1280, 480), |root| {
            let (left, right) = root.split_horizontally(640);
            draw_errorbar_panel(&left, ("c", "r"), 0.0..1.0, 0.0..1.0, &[r])?;
            draw_errorbar_panel(&right, ("c", "s"), 0.0..1.0, 0.0..1.0, &[s])?;
            Ok(())
        })?;
    }
    Ok(written)
}

/// For each nucleipref and fit parameter: mean ± std across seeds (and
/// avgdegree values) versus nvertices, one series per model.
pub fn plot_slices(coeffs: &[FitRecord], un: &DistinctValues, outdir: &Path) -> Result<usize, AppError> {
    ensure_dir(outdir)?;

    let mut written = 0;
    for nucleipref in &un.nucleipref {
        let subset: Vec<&FitRecord> = coeffs.iter().filter(|r| &r.nucleipref == nucleipref).collect();
        if subset.is_empty() {
            continue;
        }

        for param in FitParam::ALL {
            let series = slice_series(&subset, param, un);
            let x_range = padded_range(series.iter().flat_map(|s| s.points.iter().map(|p| p.0)));
            let y_range = padded_range(series.iter().flat_map(|s| {
                s.points.iter().flat_map(|p| {
                    let std = if p.2.is_finite() { p.2 } else { 0.0 };
                    [p.1 - std, p.1 + std]
                })
            }));

            let path = outdir.join(format!("{}_{}.svg", nucleipref, param.name()));
            render_svg(&path, (640, 480), |root| {
                draw_errorbar_panel(root, ("nvertices", param.name()), x_range, y_range, &series)
            })?;
            written += 1;
        }
    }
    Ok(written)
}

fn slice_series(subset: &[&FitRecord], param: FitParam, un: &DistinctValues) -> Vec<ErrorSeries> {
    let mut out = Vec::new();
    for (j, model) in un.model.iter().enumerate() {
        let mut by_size: BTreeMap<i64, Vec<f64>> = BTreeMap::new();
        for rec in subset.iter().filter(|r| &r.model == model) {
            let v = rec.param(param);
            if v.is_finite() {
                by_size.entry(rec.nvertices).or_default().push(v);
            }
        }
        if by_size.is_empty() {
            continue;
        }
        out.push(ErrorSeries {
            label: Some(model.clone()),
            color: palette(j),
            points: by_size
                .iter()
                .map(|(&nv, vals)| (nv as f64, mean(vals), population_std(vals)))
                .collect(),
        });
    }
    out
}

pub(crate) fn draw_errorbar_panel(
    area: &Area<'_>,
    (x_desc, y_desc): (&str, &str),
    x_range: Range<f64>,
    y_range: Range<f64>,
    series: &[ErrorSeries],
) -> DrawResult {
    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(50)
        .build_cartesian_2d(x_range, y_range)?;

    chart.configure_mesh().x_desc(x_desc).y_desc(y_desc).draw()?;

    let mut labelled = false;
    for s in series {
        let color = s.color;
        let finite: Vec<(f64, f64, f64)> = s
            .points
            .iter()
            .copied()
            .filter(|p| p.0.is_finite() && p.1.is_finite())
            .collect();

        let line = chart.draw_series(LineSeries::new(finite.iter().map(|p| (p.0, p.1)), &color))?;
        if let Some(label) = &s.label {
            line.label(label.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
            labelled = true;
        }

        chart.draw_series(finite.iter().filter(|p| p.2.is_finite()).map(|&(x, m, sd)| {
            ErrorBar::new_vertical(x, m - sd, m, m + sd, color.filled(), 8)
        }))?;
    }

    if labelled {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }
    Ok(())
}
