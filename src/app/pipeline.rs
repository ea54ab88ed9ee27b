//! The analysis workflow, in order:
//!
//! manifest -> load -> index -> raw scatter -> aggregate (cached) -> r/s plots
//! -> fit (cached) -> pairwise -> slices -> contours/surfaces
//!
//! Each stage only consumes the tables of earlier stages. Any fatal error
//! stops the run; per-group fit failures do not.

use std::path::PathBuf;

use tracing::info;

use crate::aggregate::aggregate_cached;
use crate::data::DistinctValues;
use crate::domain::{AggRecord, RunConfig};
use crate::error::AppError;
use crate::fit::{CoeffRun, find_coeffs_cached};
use crate::io::cache::{Cached, FsStore, TableStore};
use crate::io::ingest::load_results;
use crate::io::manifest::write_manifest;
use crate::plot::{
    FitDiagnostics, plot_contours, plot_origpoints, plot_parameters_pairwise, plot_r_s, plot_slices, plot_surfaces,
};

pub const ORIGPOINTS_DIR: &str = "origpoints";
pub const R_S_DIR: &str = "plots_r_s";
pub const FITS_DIR: &str = "fits";
pub const PARAMS_DIR: &str = "params";
pub const SLICES_DIR: &str = "slices";
pub const CONTOURS_DIR: &str = "contours";
pub const SURFACE_DIR: &str = "surface_tri";

/// Everything a run produced, for the summary.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub results_path: PathBuf,
    pub outdir: PathBuf,
    pub manifest: PathBuf,
    pub rows_read: usize,
    pub distinct: DistinctValues,
    pub aggregated: Cached<AggRecord>,
    pub coeffs: CoeffRun,
    /// `(plot family directory, images written)`.
    pub images: Vec<(&'static str, usize)>,
}

/// Run the full workflow against the file system.
pub fn run(config: &RunConfig, argv: &[String]) -> Result<RunOutput, AppError> {
    run_with_store(config, argv, &FsStore)
}

/// Run the full workflow with tables cached in `store`.
pub fn run_with_store<S: TableStore>(config: &RunConfig, argv: &[String], store: &S) -> Result<RunOutput, AppError> {
    let outdir = &config.outdir;
    let manifest = write_manifest(argv, outdir)?;

    let table = load_results(&config.results_path)?;
    info!(rows = table.len(), path = %config.results_path.display(), "loaded results");

    let distinct = DistinctValues::index(&table.rows);
    let mut images = Vec::new();

    images.push((ORIGPOINTS_DIR, plot_origpoints(&table.rows, &outdir.join(ORIGPOINTS_DIR))?));

    let aggregated = aggregate_cached(store, &config.aggregated_path(), &table.rows)?;
    info!(records = aggregated.rows.len(), status = aggregated.status.label(), "aggregated table ready");

    images.push((R_S_DIR, plot_r_s(&aggregated.rows, &outdir.join(R_S_DIR))?));

    let mut diagnostics = FitDiagnostics::new(outdir.join(FITS_DIR));
    let coeffs = find_coeffs_cached(store, &config.coeffs_path(), &aggregated.rows, &config.fit, &mut diagnostics)?;
    info!(
        records = coeffs.table.rows.len(),
        status = coeffs.table.status.label(),
        "coefficient table ready"
    );
    images.push((FITS_DIR, diagnostics.written()));

    let fits = &coeffs.table.rows;
    images.push((PARAMS_DIR, plot_parameters_pairwise(fits, &distinct, &outdir.join(PARAMS_DIR))?));
    images.push((SLICES_DIR, plot_slices(fits, &distinct, &outdir.join(SLICES_DIR))?));

    if distinct.has_size_grid() {
        images.push((CONTOURS_DIR, plot_contours(fits, &distinct, &outdir.join(CONTOURS_DIR))?));
        images.push((SURFACE_DIR, plot_surfaces(fits, &distinct, &outdir.join(SURFACE_DIR))?));
    } else {
        info!(
            nvertices = distinct.nvertices.len(),
            avgdegree = distinct.avgdegree.len(),
            "skipping contour and surface plots: sweep has no size grid"
        );
    }

    Ok(RunOutput {
        results_path: config.results_path.clone(),
        outdir: outdir.clone(),
        manifest,
        rows_read: table.len(),
        distinct,
        aggregated,
        coeffs,
        images,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use super::*;
    use crate::domain::FitOptions;
    use crate::io::cache::{CacheStatus, MemoryStore};
    use crate::models::{ExpParams, predict};

    const HEADER: &str = "nucleipref,model,nvertices,avgdegree,seed,c,r,s\n";
    const CS: [f64; 6] = [0.0, 0.1, 0.2, 0.3, 0.4, 0.5];

    /// Two sizes × two degrees, rising on `CS[..5]` then dropping.
    fn sweep() -> String {
        let params = ExpParams { a: -0.5, b: -6.0 };
        let mut out = String::from(HEADER);
        for nv in [100, 200] {
            for k in [2.0, 4.0] {
                for trial in 0..2 {
                    for (i, &c) in CS.iter().enumerate() {
                        let r = if i < 5 { predict(c, params) } else { 0.1 };
                        let jitter = trial as f64 * 1e-3;
                        out.push_str(&format!("de,ba,{nv},{k},0,{c},{},{}\n", r + jitter, 1.0 - r));
                    }
                }
            }
        }
        out
    }

    fn config(dir: &Path, body: &str) -> RunConfig {
        let results_path = dir.join("res.csv");
        fs::write(&results_path, body).unwrap();
        RunConfig {
            results_path,
            outdir: dir.join("out"),
            fit: FitOptions::default(),
        }
    }

    fn svg_count(dir: &Path) -> usize {
        fs::read_dir(dir).map(|it| it.count()).unwrap_or(0)
    }

    #[test]
    fn full_run_writes_every_family() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path(), &sweep());
        let out = run(&cfg, &["rc".to_string()]).unwrap();

        assert_eq!(out.rows_read, 48);
        assert_eq!(out.aggregated.status, CacheStatus::Computed);
        assert_eq!(out.aggregated.rows.len(), 24);
        assert_eq!(out.coeffs.table.rows.len(), 4);
        assert!(out.coeffs.skipped.is_empty());

        for fit in &out.coeffs.table.rows {
            assert!((fit.cmax - 0.4).abs() < 1e-12);
        }

        let outdir = &cfg.outdir;
        assert!(outdir.join("README.md").exists());
        assert!(cfg.aggregated_path().exists());
        assert!(cfg.coeffs_path().exists());
        assert_eq!(svg_count(&outdir.join(ORIGPOINTS_DIR)), 4);
        assert_eq!(svg_count(&outdir.join(R_S_DIR)), 4);
        assert_eq!(svg_count(&outdir.join(FITS_DIR)), 4);
        assert_eq!(svg_count(&outdir.join(PARAMS_DIR)), 3);
        assert_eq!(svg_count(&outdir.join(SLICES_DIR)), 4);
        assert_eq!(svg_count(&outdir.join(CONTOURS_DIR)), 4);
        assert_eq!(svg_count(&outdir.join(SURFACE_DIR)), 4);
    }

    #[test]
    fn second_run_reuses_tables() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path(), &sweep());
        let store = MemoryStore::new();
        run_with_store(&cfg, &[], &store).unwrap();

        // A changed input does not invalidate cached tables.
        fs::write(&cfg.results_path, HEADER).unwrap();
        let again = run_with_store(&cfg, &[], &store).unwrap();
        assert_eq!(again.rows_read, 0);
        assert_eq!(again.aggregated.status, CacheStatus::Hit);
        assert_eq!(again.coeffs.table.status, CacheStatus::Hit);
        assert_eq!(again.coeffs.table.rows.len(), 4);
        assert_eq!(store.writes(), 2);
    }

    #[test]
    fn single_size_sweep_skips_grid_plots() {
        let dir = tempfile::tempdir().unwrap();
        let body: String = sweep()
            .lines()
            .filter(|l| !l.starts_with("de,ba,200"))
            .map(|l| format!("{l}\n"))
            .collect();
        let cfg = config(dir.path(), &body);
        let out = run(&cfg, &[]).unwrap();

        assert!(!out.distinct.has_size_grid());
        assert!(!cfg.outdir.join(CONTOURS_DIR).exists());
        assert!(!cfg.outdir.join(SURFACE_DIR).exists());
    }

    #[test]
    fn missing_input_is_an_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = RunConfig {
            results_path: dir.path().join("nope.csv"),
            outdir: dir.path().join("out"),
            fit: FitOptions::default(),
        };
        let err = run(&cfg, &[]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
