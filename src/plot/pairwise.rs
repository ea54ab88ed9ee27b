//! Fit parameters plotted against each other.

use std::path::Path;

use plotters::prelude::*;

use crate::data::DistinctValues;
use crate::domain::{FitParam, FitRecord};
use crate::error::AppError;
use crate::plot::{ensure_dir, padded_range, palette, render_svg};

/// Parameter pairs, x first. The x value is plotted as its magnitude.
pub const PARAM_PAIRS: [(FitParam, FitParam); 3] = [
    (FitParam::B, FitParam::Rmax),
    (FitParam::Cmax, FitParam::Rmax),
    (FitParam::B, FitParam::Cmax),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Circle,
    Square,
}

/// Marker size grows with network size.
pub fn marker_radius(nvertices: i64) -> i32 {
    let r = (nvertices.max(0) as f64 / 4.0).sqrt().round() as i32;
    r.clamp(2, 20)
}

/// One scatter per parameter pair. Marker shape encodes nucleipref, colour
/// encodes model.
pub fn plot_parameters_pairwise(coeffs: &[FitRecord], un: &DistinctValues, outdir: &Path) -> Result<usize, AppError> {
    ensure_dir(outdir)?;

    for (p1, p2) in PARAM_PAIRS {
        let points: Vec<(f64, f64, &FitRecord)> = coeffs
            .iter()
            .map(|r| (r.param(p1).abs(), r.param(p2), r))
            .filter(|(x, y, _)| x.is_finite() && y.is_finite())
            .collect();

        let x_range = padded_range(points.iter().map(|p| p.0));
        let y_range = padded_range(points.iter().map(|p| p.1));

        let path = outdir.join(format!("{}_{}.svg", p1.name(), p2.name()));
        render_svg(&path, (640, 480), |root| {
            let mut chart = ChartBuilder::on(root)
                .margin(10)
                .x_label_area_size(35)
                .y_label_area_size(50)
                .build_cartesian_2d(x_range, y_range)?;

            chart
                .configure_mesh()
                .x_desc(format!("|{}|", p1.name()))
                .y_desc(p2.name())
                .draw()?;

            // One legend entry per (nucleipref, model) combination present.
            for (i, nucleipref) in un.nucleipref.iter().enumerate() {
                let marker = if i == 0 { Marker::Circle } else { Marker::Square };
                for (j, model) in un.model.iter().enumerate() {
                    let color = palette(j);
                    let group: Vec<_> = points
                        .iter()
                        .filter(|(_, _, r)| &r.nucleipref == nucleipref && &r.model == model)
                        .map(|&(x, y, r)| (x, y, marker_radius(r.nvertices)))
                        .collect();
                    if group.is_empty() {
                        continue;
                    }

                    let label = format!("{nucleipref}/{model}");
                    match marker {
                        Marker::Circle => {
                            chart
                                .draw_series(group.iter().map(|&(x, y, size)| {
                                    Circle::new((x, y), size, color.mix(0.6).filled())
                                }))?
                                .label(label)
                                .legend(move |(x, y)| Circle::new((x + 8, y), 4, color.filled()));
                        }
                        Marker::Square => {
                            chart
                                .draw_series(group.iter().map(|&(x, y, size)| {
                                    EmptyElement::at((x, y))
                                        + Rectangle::new([(-size, -size), (size, size)], color.mix(0.6).filled())
                                }))?
                                .label(label)
                                .legend(move |(x, y)| {
                                    Rectangle::new([(x + 4, y - 4), (x + 12, y + 4)], color.filled())
                                });
                        }
                    }
                }
            }

            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()?;
            Ok(())
        })?;
    }
    Ok(PARAM_PAIRS.len())
}
