//! Fit parameters over the nvertices × avgdegree grid, drawn as filled cells.

use std::path::Path;

use plotters::prelude::*;

use crate::data::DistinctValues;
use crate::domain::{FitParam, FitRecord};
use crate::error::AppError;
use crate::plot::{SizeGrid, ensure_dir, render_svg};

/// Cell boundaries for sorted grid coordinates: midpoints between
/// neighbours, with the outer cells as wide as their inner neighbour.
pub fn cell_edges(values: &[f64]) -> Vec<f64> {
    match values {
        [] => Vec::new(),
        [v] => vec![v - 0.5, v + 0.5],
        _ => {
            let n = values.len();
            let mut edges = Vec::with_capacity(n + 1);
            edges.push(values[0] - (values[1] - values[0]) / 2.0);
            edges.extend(values.windows(2).map(|w| (w[0] + w[1]) / 2.0));
            edges.push(values[n - 1] + (values[n - 1] - values[n - 2]) / 2.0);
            edges
        }
    }
}

/// Diverging blue-white-red map over `t` in `[0, 1]`.
pub fn coolwarm(t: f64) -> RGBColor {
    const COLD: (f64, f64, f64) = (59.0, 76.0, 192.0);
    const MID: (f64, f64, f64) = (221.0, 221.0, 221.0);
    const WARM: (f64, f64, f64) = (180.0, 4.0, 38.0);

    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.5 };
    let (from, to, u) = if t < 0.5 { (COLD, MID, t * 2.0) } else { (MID, WARM, (t - 0.5) * 2.0) };
    let lerp = |a: f64, b: f64| (a + (b - a) * u).round() as u8;
    RGBColor(lerp(from.0, to.0), lerp(from.1, to.1), lerp(from.2, to.2))
}

pub fn plot_contours(coeffs: &[FitRecord], un: &DistinctValues, outdir: &Path) -> Result<usize, AppError> {
    ensure_dir(outdir)?;

    let mut written = 0;
    for nucleipref in &un.nucleipref {
        for param in FitParam::ALL {
            for model in &un.model {
                let subset: Vec<&FitRecord> = coeffs
                    .iter()
                    .filter(|r| &r.nucleipref == nucleipref && &r.model == model)
                    .collect();
                let grid = SizeGrid::build(&subset, param);
                if !grid.is_grid() {
                    tracing::debug!(%nucleipref, %model, param = param.name(), "no size grid for contour");
                    continue;
                }

                let path = outdir.join(format!("{}_{}_{}.svg", nucleipref, param.name(), model));
                draw_cells(&grid, &format!("{nucleipref}/{model}"), param, &path)?;
                written += 1;
            }
        }
    }
    Ok(written)
}

fn draw_cells(grid: &SizeGrid, title: &str, param: FitParam, path: &Path) -> Result<(), AppError> {
    let xs: Vec<f64> = grid.nvertices.iter().map(|&v| v as f64).collect();
    let x_edges = cell_edges(&xs);
    let y_edges = cell_edges(&grid.avgdegree);
    let range = grid.value_range();
    let span = range.end - range.start;

    render_svg(path, (640, 520), |root| {
        let x_axis = x_edges[0]..x_edges[x_edges.len() - 1];
        let y_axis = y_edges[0]..y_edges[y_edges.len() - 1];
        let caption = format!("{} {} [{:.3}, {:.3}]", title, param.name(), range.start, range.end);

        let mut chart = ChartBuilder::on(root)
            .caption(caption, ("sans-serif", 16))
            .margin(10)
            .x_label_area_size(35)
            .y_label_area_size(45)
            .build_cartesian_2d(x_axis, y_axis)?;

        chart
            .configure_mesh()
            .disable_mesh()
            .x_desc("nvertices")
            .y_desc("avgdegree")
            .draw()?;

        chart.draw_series(grid.cells.iter().map(|(&(i, j), &v)| {
            let color = coolwarm((v - range.start) / span);
            Rectangle::new([(x_edges[i], y_edges[j]), (x_edges[i + 1], y_edges[j + 1])], color.filled())
        }))?;

        chart.draw_series(
            grid.cells
                .keys()
                .map(|&(i, j)| Circle::new((xs[i], grid.avgdegree[j]), 2, BLACK.filled())),
        )?;
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fit(model: &str, nvertices: i64, avgdegree: f64, cmax: f64) -> FitRecord {
        FitRecord {
            nucleipref: "de".to_string(),
            model: model.to_string(),
            nvertices,
            avgdegree,
            seed: 0,
            cmax,
            rmax: 0.8,
            a: -0.5,
            b: -6.0,
        }
    }

    #[test]
    fn edges_sit_between_coordinates() {
        assert_eq!(cell_edges(&[100.0, 200.0, 400.0]), vec![50.0, 150.0, 300.0, 500.0]);
        assert_eq!(cell_edges(&[4.0]), vec![3.5, 4.5]);
        assert!(cell_edges(&[]).is_empty());
    }

    #[test]
    fn colormap_endpoints() {
        assert_eq!(coolwarm(0.0), RGBColor(59, 76, 192));
        assert_eq!(coolwarm(0.5), RGBColor(221, 221, 221));
        assert_eq!(coolwarm(1.0), RGBColor(180, 4, 38));
        assert_eq!(coolwarm(f64::NAN), coolwarm(0.5));
    }

    #[test]
    fn only_models_with_a_grid_are_drawn() {
        let dir = tempfile::tempdir().unwrap();
        let rows = vec![
            fit("ba", 100, 2.0, 0.3),
            fit("ba", 100, 4.0, 0.4),
            fit("ba", 200, 2.0, 0.5),
            fit("ba", 200, 4.0, 0.6),
            fit("er", 100, 2.0, 0.3),
        ];
        let un = DistinctValues {
            nucleipref: vec!["de".to_string()],
            model: vec!["ba".to_string(), "er".to_string()],
            ..DistinctValues::default()
        };

        let n = plot_contours(&rows, &un, dir.path()).unwrap();
        assert_eq!(n, 4);
        assert!(dir.path().join("de_cmax_ba.svg").exists());
        assert!(!dir.path().join("de_cmax_er.svg").exists());
    }
}
