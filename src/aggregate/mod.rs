//! Per-configuration reduction of repeated trials.
//!
//! Rows are grouped by `ConfigKey` (nucleipref, model, nvertices, avgdegree,
//! seed, c) and `r`/`s` are reduced to mean and sample standard deviation.
//! Output is ordered by key, which matches iterating the sorted distinct
//! values of each column in that nesting order.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::info;

use crate::domain::{AggRecord, ConfigKey, Observation};
use crate::error::AppError;
use crate::io::cache::{Cached, TableStore, load_or_compute};
use crate::math::Summary;

#[derive(Default)]
struct Trials {
    r: Vec<f64>,
    s: Vec<f64>,
}

/// Reduce raw observations to one record per distinct `ConfigKey`.
pub fn aggregate(rows: &[Observation]) -> Vec<AggRecord> {
    let mut groups: BTreeMap<ConfigKey, Trials> = BTreeMap::new();
    for row in rows {
        let trials = groups.entry(row.config_key()).or_default();
        trials.r.push(row.r);
        trials.s.push(row.s);
    }

    groups
        .into_iter()
        .map(|(key, trials)| {
            let r = Summary::of(&trials.r);
            let s = Summary::of(&trials.s);
            AggRecord {
                nucleipref: key.group.nucleipref,
                model: key.group.model,
                nvertices: key.group.nvertices,
                avgdegree: key.group.avgdegree.get(),
                seed: key.group.seed,
                c: key.c.get(),
                rmean: r.mean,
                rstd: r.std,
                smean: s.mean,
                sstd: s.std,
            }
        })
        .collect()
}

/// `aggregate` behind the table cache stored under `path`.
pub fn aggregate_cached<S: TableStore>(
    store: &S,
    path: &Path,
    rows: &[Observation],
) -> Result<Cached<AggRecord>, AppError> {
    load_or_compute(store, path, || {
        let records = aggregate(rows);
        info!(rows = rows.len(), records = records.len(), "aggregated trials");
        Ok(records)
    })
}
