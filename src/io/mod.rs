//! Input/output helpers.
//!
//! - results CSV ingest + validation (`ingest`)
//! - reduced table CSV codec (`tables`)
//! - skip-if-present table cache (`cache`)
//! - run manifest (`manifest`)

pub mod cache;
pub mod ingest;
pub mod manifest;
pub mod tables;

pub use cache::*;
pub use ingest::*;
pub use manifest::*;
pub use tables::*;
