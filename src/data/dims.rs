//! Distinct values per column of the results table.
//!
//! The index drives the plot families (axes, legend order, marker/colour
//! assignment) and the run summary. Every list is sorted ascending and free
//! of duplicates; an empty table yields empty lists.

use std::collections::BTreeSet;

use crate::domain::{Observation, OrdF64};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistinctValues {
    pub nucleipref: Vec<String>,
    pub model: Vec<String>,
    pub nvertices: Vec<i64>,
    pub avgdegree: Vec<f64>,
    pub seed: Vec<i64>,
    pub c: Vec<f64>,
    pub r: Vec<f64>,
    pub s: Vec<f64>,
}

impl DistinctValues {
    pub fn index(rows: &[Observation]) -> Self {
        let mut nucleipref = BTreeSet::new();
        let mut model = BTreeSet::new();
        let mut nvertices = BTreeSet::new();
        let mut avgdegree = BTreeSet::new();
        let mut seed = BTreeSet::new();
        let mut c = BTreeSet::new();
        let mut r = BTreeSet::new();
        let mut s = BTreeSet::new();

        for row in rows {
            nucleipref.insert(row.key.nucleipref.as_str());
            model.insert(row.key.model.as_str());
            nvertices.insert(row.key.nvertices);
            avgdegree.insert(row.key.avgdegree);
            seed.insert(row.key.seed);
            c.insert(OrdF64::new(row.c));
            r.insert(OrdF64::new(row.r));
            s.insert(OrdF64::new(row.s));
        }

        Self {
            nucleipref: nucleipref.into_iter().map(str::to_string).collect(),
            model: model.into_iter().map(str::to_string).collect(),
            nvertices: nvertices.into_iter().collect(),
            avgdegree: floats(avgdegree),
            seed: seed.into_iter().collect(),
            c: floats(c),
            r: floats(r),
            s: floats(s),
        }
    }

    /// Whether the sweep spans a 2-D grid of network sizes, which the contour
    /// and surface families need.
    pub fn has_size_grid(&self) -> bool {
        self.nvertices.len() >= 2 && self.avgdegree.len() >= 2
    }
}

fn floats(set: BTreeSet<OrdF64>) -> Vec<f64> {
    set.into_iter().map(OrdF64::get).collect()
}
