//! Shared domain types.
//!
//! Table records are flat and serde-derived so they can be written to and read
//! back from the cached CSV tables without any mapping layer.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Totally ordered `f64` used inside grouping keys.
///
/// Ordering follows `f64::total_cmp`. Negative zero is folded into positive
/// zero on construction so `-0.0` and `0.0` land in the same group.
#[derive(Debug, Clone, Copy)]
pub struct OrdF64(f64);

impl OrdF64 {
    pub fn new(value: f64) -> Self {
        if value == 0.0 { Self(0.0) } else { Self(value) }
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl From<f64> for OrdF64 {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl PartialEq for OrdF64 {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OrdF64 {}

impl PartialOrd for OrdF64 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrdF64 {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Hash for OrdF64 {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl fmt::Display for OrdF64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One simulated configuration, excluding the sweep variable `c`.
///
/// Field order is the grouping order: nucleipref → model → nvertices →
/// avgdegree → seed. The derived `Ord` therefore reproduces the nested
/// iteration order over sorted distinct values.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey {
    pub nucleipref: String,
    pub model: String,
    pub nvertices: i64,
    pub avgdegree: OrdF64,
    pub seed: i64,
}

impl GroupKey {
    /// File stem used for per-configuration artifacts.
    pub fn file_stem(&self) -> String {
        format!(
            "{}_{}_{}_{}_{}",
            self.nucleipref, self.model, self.nvertices, self.avgdegree, self.seed
        )
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "nucleipref={} model={} nvertices={} avgdegree={} seed={}",
            self.nucleipref, self.model, self.nvertices, self.avgdegree, self.seed
        )
    }
}

/// Full aggregation key: a configuration plus one value of `c`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConfigKey {
    pub group: GroupKey,
    pub c: OrdF64,
}

/// One simulation trial as read from the input table.
#[derive(Debug, Clone)]
pub struct Observation {
    pub key: GroupKey,
    pub c: f64,
    pub r: f64,
    pub s: f64,
}

impl Observation {
    pub fn config_key(&self) -> ConfigKey {
        ConfigKey {
            group: self.key.clone(),
            c: OrdF64::new(self.c),
        }
    }
}

/// Mean/std of `r` and `s` over all trials sharing one `ConfigKey`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggRecord {
    pub nucleipref: String,
    pub model: String,
    pub nvertices: i64,
    pub avgdegree: f64,
    pub seed: i64,
    pub c: f64,
    pub rmean: f64,
    pub rstd: f64,
    pub smean: f64,
    pub sstd: f64,
}

impl AggRecord {
    pub fn group_key(&self) -> GroupKey {
        GroupKey {
            nucleipref: self.nucleipref.clone(),
            model: self.model.clone(),
            nvertices: self.nvertices,
            avgdegree: OrdF64::new(self.avgdegree),
            seed: self.seed,
        }
    }
}

/// Peak location/value and fitted coefficients for one `GroupKey`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitRecord {
    pub nucleipref: String,
    pub model: String,
    pub nvertices: i64,
    pub avgdegree: f64,
    pub seed: i64,
    pub cmax: f64,
    pub rmax: f64,
    pub a: f64,
    pub b: f64,
}

impl FitRecord {
    pub fn new(key: &GroupKey, cmax: f64, rmax: f64, a: f64, b: f64) -> Self {
        Self {
            nucleipref: key.nucleipref.clone(),
            model: key.model.clone(),
            nvertices: key.nvertices,
            avgdegree: key.avgdegree.get(),
            seed: key.seed,
            cmax,
            rmax,
            a,
            b,
        }
    }

    pub fn param(&self, param: FitParam) -> f64 {
        match param {
            FitParam::Cmax => self.cmax,
            FitParam::Rmax => self.rmax,
            FitParam::A => self.a,
            FitParam::B => self.b,
        }
    }
}

/// Columns of a `FitRecord` that the plot families sweep over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitParam {
    Cmax,
    A,
    B,
    Rmax,
}

impl FitParam {
    pub const ALL: [FitParam; 4] = [FitParam::Cmax, FitParam::A, FitParam::B, FitParam::Rmax];

    pub fn name(self) -> &'static str {
        match self {
            FitParam::Cmax => "cmax",
            FitParam::A => "a",
            FitParam::B => "b",
            FitParam::Rmax => "rmax",
        }
    }
}

/// Options for the per-group exponential fit.
#[derive(Debug, Clone)]
pub struct FitOptions {
    /// Starting point `(a, b)` for the solver.
    pub initial: [f64; 2],
    /// Budget of model evaluations before the fit counts as non-converged.
    pub max_evals: usize,
    /// Minimum distinct c-values required on the rising segment.
    pub min_points: usize,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            initial: [-0.5, -6.0],
            max_evals: 10_000,
            min_points: 3,
        }
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub results_path: PathBuf,
    pub outdir: PathBuf,
    pub fit: FitOptions,
}

impl RunConfig {
    pub fn aggregated_path(&self) -> PathBuf {
        self.outdir.join("parsed.csv")
    }

    pub fn coeffs_path(&self) -> PathBuf {
        self.outdir.join("aggregated.csv")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(nucleipref: &str, nvertices: i64, avgdegree: f64, seed: i64) -> GroupKey {
        GroupKey {
            nucleipref: nucleipref.to_string(),
            model: "ba".to_string(),
            nvertices,
            avgdegree: OrdF64::new(avgdegree),
            seed,
        }
    }

    #[test]
    fn group_keys_order_like_nested_loops() {
        let mut keys = vec![
            key("de", 200, 4.0, 1),
            key("ac", 500, 2.0, 0),
            key("de", 100, 8.0, 0),
            key("de", 100, 4.0, 2),
            key("de", 100, 4.0, 1),
        ];
        keys.sort();
        let order: Vec<(String, i64, f64, i64)> = keys
            .iter()
            .map(|k| (k.nucleipref.clone(), k.nvertices, k.avgdegree.get(), k.seed))
            .collect();
        assert_eq!(
            order,
            vec![
                ("ac".to_string(), 500, 2.0, 0),
                ("de".to_string(), 100, 4.0, 1),
                ("de".to_string(), 100, 4.0, 2),
                ("de".to_string(), 100, 8.0, 0),
                ("de".to_string(), 200, 4.0, 1),
            ]
        );
    }

    #[test]
    fn negative_zero_joins_zero() {
        assert_eq!(OrdF64::new(-0.0), OrdF64::new(0.0));
        assert!(OrdF64::new(0.1) < OrdF64::new(0.5));
    }

    #[test]
    fn file_stem_joins_key_fields() {
        assert_eq!(key("de", 100, 4.5, 3).file_stem(), "de_ba_100_4.5_3");
    }
}
