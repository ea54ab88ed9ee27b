//! Response model for the r-vs-c curves.
//!
//! Models are implemented as small, pure functions so that the solver code can
//! stay generic.

pub mod model;

pub use model::*;
