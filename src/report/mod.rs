//! Terminal run summary.

pub mod format;

pub use format::*;
