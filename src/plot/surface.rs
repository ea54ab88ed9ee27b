//! Fit parameters as 3-D surfaces over the nvertices × avgdegree grid.

use std::path::Path;

use plotters::prelude::*;

use crate::data::DistinctValues;
use crate::domain::{FitParam, FitRecord};
use crate::error::AppError;
use crate::plot::{SizeGrid, coolwarm, ensure_dir, padded_range, render_svg};

const EDGE: RGBColor = RGBColor(51, 51, 51);

/// Grid cells whose four corners all carry a value, as
/// `(nvertices index, avgdegree index)` of the lower corner.
pub(crate) fn complete_cells(grid: &SizeGrid) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    for i in 0..grid.nvertices.len().saturating_sub(1) {
        for j in 0..grid.avgdegree.len().saturating_sub(1) {
            let corners = [(i, j), (i + 1, j), (i + 1, j + 1), (i, j + 1)];
            if corners.iter().all(|c| grid.cells.contains_key(c)) {
                out.push((i, j));
            }
        }
    }
    out
}

pub fn plot_surfaces(coeffs: &[FitRecord], un: &DistinctValues, outdir: &Path) -> Result<usize, AppError> {
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
                    continue;
                }

                let path = outdir.join(format!("{}_{}_{}.svg", nucleipref, param.name(), model));
                draw_surface(&grid, &format!("{nucleipref}/{model} {}", param.name()), &path)?;
                written += 1;
            }
        }
    }
    Ok(written)
}

fn draw_surface(grid: &SizeGrid, caption: &str, path: &Path) -> Result<(), AppError> {
    let xs: Vec<f64> = grid.nvertices.iter().map(|&v| v as f64).collect();
    let zs = &grid.avgdegree;
    let value_range = grid.value_range();
    let span = value_range.end - value_range.start;
    let cells = complete_cells(grid);

    let corner = |i: usize, j: usize| -> Option<(f64, f64, f64)> {
        grid.cells.get(&(i, j)).map(|&v| (xs[i], v, zs[j]))
    };

    render_svg(path, (640, 560), |root| {
        let mut chart = ChartBuilder::on(root)
            .caption(caption, ("sans-serif", 16))
            .margin(10)
            .build_cartesian_3d(
                padded_range(xs.iter().copied()),
                value_range.clone(),
                padded_range(zs.iter().copied()),
            )?;

        chart.with_projection(|mut pb| {
            pb.yaw = 0.6;
            pb.pitch = 0.35;
            pb.scale = 0.85;
            pb.into_matrix()
        });

        chart.configure_axes().draw()?;

        chart.draw_series(cells.iter().filter_map(|&(i, j)| {
            let quad = [corner(i, j)?, corner(i + 1, j)?, corner(i + 1, j + 1)?, corner(i, j + 1)?];
            let mean = quad.iter().map(|p| p.1).sum::<f64>() / 4.0;
            let color = coolwarm((mean - value_range.start) / span);
            Some(Polygon::new(quad.to_vec(), color.mix(0.85).filled()))
        }))?;

        chart.draw_series(cells.iter().filter_map(|&(i, j)| {
            let quad = [corner(i, j)?, corner(i + 1, j)?, corner(i + 1, j + 1)?, corner(i, j + 1)?, corner(i, j)?];
            Some(PathElement::new(quad.to_vec(), EDGE.mix(0.8)))
        }))?;

        chart.draw_series(
            grid.cells
                .iter()
                .map(|(&(i, j), &v)| Circle::new((xs[i], v, zs[j]), 2, BLACK.filled())),
        )?;
        Ok(())
    })
}
