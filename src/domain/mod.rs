//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - configuration keys (`GroupKey`, `ConfigKey`) and the ordered float wrapper
//! - raw sweep observations (`Observation`)
//! - reduced tables (`AggRecord`, `FitRecord`)
//! - the resolved run configuration (`RunConfig`)

pub mod types;

pub use types::*;
