//! Fit every configuration group of an aggregated table.
//!
//! Groups that cannot be fitted are skipped, never fatal: they are logged and
//! returned alongside the records so the run summary can list them.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{info, warn};

use crate::domain::{AggRecord, FitOptions, FitRecord, GroupKey};
use crate::error::AppError;
use crate::fit::fitter::{FitError, GroupFit, fit_group};
use crate::io::cache::{Cached, TableStore, load_or_compute};

/// Receives every successful group fit (used for diagnostic plots).
pub trait FitSink {
    fn fitted(&mut self, key: &GroupKey, fit: &GroupFit) -> Result<(), AppError>;
}

/// Discards fits.
impl FitSink for () {
    fn fitted(&mut self, _key: &GroupKey, _fit: &GroupFit) -> Result<(), AppError> {
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct SkippedGroup {
    pub key: GroupKey,
    pub reason: FitError,
}

#[derive(Debug, Clone, Default)]
pub struct CoeffTable {
    pub records: Vec<FitRecord>,
    pub skipped: Vec<SkippedGroup>,
}

/// Fit all groups, in key order.
pub fn find_coeffs<K: FitSink>(
    aggregated: &[AggRecord],
    opts: &FitOptions,
    sink: &mut K,
) -> Result<CoeffTable, AppError> {
    let mut groups: BTreeMap<GroupKey, Vec<&AggRecord>> = BTreeMap::new();
    for rec in aggregated {
        groups.entry(rec.group_key()).or_default().push(rec);
    }

    let mut table = CoeffTable::default();
    for (key, rows) in groups {
        match fit_group(&key, &rows, opts) {
            Ok(fit) => {
                sink.fitted(&key, &fit)?;
                table.records.push(fit.record);
            }
            Err(reason) => {
                match &reason {
                    FitError::InsufficientSample { .. } => info!(group = %key, %reason, "skipping group"),
                    _ => warn!(group = %key, %reason, "skipping group"),
                }
                table.skipped.push(SkippedGroup { key, reason });
            }
        }
    }
    Ok(table)
}

/// Output of `find_coeffs_cached`. `skipped` is empty on a cache hit.
#[derive(Debug, Clone)]
pub struct CoeffRun {
    pub table: Cached<FitRecord>,
    pub skipped: Vec<SkippedGroup>,
}

/// `find_coeffs` behind the table cache stored under `path`.
///
/// The sink only sees fits computed by this call.
pub fn find_coeffs_cached<S: TableStore, K: FitSink>(
    store: &S,
    path: &Path,
    aggregated: &[AggRecord],
    opts: &FitOptions,
    sink: &mut K,
) -> Result<CoeffRun, AppError> {
    let mut skipped = Vec::new();
    let table = load_or_compute(store, path, || {
        let computed = find_coeffs(aggregated, opts, sink)?;
        info!(
            fitted = computed.records.len(),
            skipped = computed.skipped.len(),
            "fitted configuration groups"
        );
        skipped = computed.skipped;
        Ok(computed.records)
    })?;
    Ok(CoeffRun { table, skipped })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::cache::{CacheStatus, MemoryStore};
    use crate::models::{ExpParams, predict};

    fn rec(seed: i64, c: f64, rmean: f64) -> AggRecord {
        AggRecord {
            nucleipref: "de".to_string(),
            model: "ba".to_string(),
            nvertices: 100,
            avgdegree: 4.0,
            seed,
            c,
            rmean,
            rstd: 0.0,
            smean: 0.0,
            sstd: 0.0,
        }
    }

    /// Seed 0 rises over four c-values then drops; seed 1 peaks at its
    /// second c-value.
    fn table() -> Vec<AggRecord> {
        let truth = ExpParams { a: -0.5, b: -6.0 };
        let mut rows: Vec<AggRecord> = [0.1, 0.2, 0.3, 0.4]
            .iter()
            .map(|&c| rec(0, c, predict(c, truth)))
            .collect();
        rows.push(rec(0, 0.9, 0.1));
        rows.extend([rec(1, 0.1, 0.35), rec(1, 0.5, 0.75), rec(1, 0.9, 0.15)]);
        rows
    }

    #[derive(Default)]
    struct Recorder {
        keys: Vec<GroupKey>,
    }

    impl FitSink for Recorder {
        fn fitted(&mut self, key: &GroupKey, _fit: &GroupFit) -> Result<(), AppError> {
            self.keys.push(key.clone());
            Ok(())
        }
    }

    #[test]
    fn fits_rising_groups_and_skips_short_ones() {
        let mut sink = Recorder::default();
        let out = find_coeffs(&table(), &FitOptions::default(), &mut sink).unwrap();

        assert_eq!(out.records.len(), 1);
        let fit = &out.records[0];
        assert_eq!(fit.seed, 0);
        assert_eq!(fit.cmax, 0.4);
        assert!((fit.a + 0.5).abs() < 1e-4);
        assert!((fit.b + 6.0).abs() < 1e-4);

        assert_eq!(out.skipped.len(), 1);
        assert_eq!(out.skipped[0].key.seed, 1);
        assert!(matches!(
            out.skipped[0].reason,
            FitError::InsufficientSample { distinct: 2, .. }
        ));
        assert_eq!(sink.keys.len(), 1);
    }

    #[test]
    fn convex_group_is_listed_as_solver_skip() {
        let mut rows = table();
        rows.retain(|r| r.seed == 0);
        rows.extend([0.1, 0.2, 0.3, 0.4, 0.5].iter().map(|&c| rec(2, c, c * c)));
        rows.push(rec(2, 0.6, 0.1));

        let mut sink = Recorder::default();
        let out = find_coeffs(&rows, &FitOptions::default(), &mut sink).unwrap();

        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].seed, 0);
        assert_eq!(out.skipped.len(), 1);
        assert_eq!(out.skipped[0].key.seed, 2);
        assert!(matches!(out.skipped[0].reason, FitError::Solver(_)));
        assert_eq!(sink.keys.len(), 1);
    }

    #[test]
    fn cmax_is_c_at_max_rmean() {
        let out = find_coeffs(&table(), &FitOptions::default(), &mut ()).unwrap();
        let rows = table();
        for fit in &out.records {
            let best = rows
                .iter()
                .filter(|r| r.seed == fit.seed)
                .max_by(|a, b| a.rmean.total_cmp(&b.rmean))
                .unwrap();
            assert_eq!(fit.cmax, best.c);
            assert_eq!(fit.rmax, best.rmean);
        }
    }

    #[test]
    fn cache_hit_skips_fitting_and_sink() {
        let store = MemoryStore::new();
        let path = Path::new("out/aggregated.csv");

        let mut sink = Recorder::default();
        let first = find_coeffs_cached(&store, path, &table(), &FitOptions::default(), &mut sink).unwrap();
        assert_eq!(first.table.status, CacheStatus::Computed);
        assert_eq!(first.skipped.len(), 1);

        let mut sink = Recorder::default();
        let second = find_coeffs_cached(&store, path, &[], &FitOptions::default(), &mut sink).unwrap();
        assert_eq!(second.table.status, CacheStatus::Hit);
        assert_eq!(second.table.rows.len(), 1);
        assert_eq!(second.table.rows[0].a, first.table.rows[0].a);
        assert!(second.skipped.is_empty());
        assert!(sink.keys.is_empty());
    }
}
