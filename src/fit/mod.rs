//! Curve fitting.
//!
//! Responsibilities:
//!
//! - cut each group curve at its peak and fit the exponential model (`fitter`)
//! - run the fit over every group of an aggregated table, with caching (`coeffs`)

pub mod coeffs;
pub mod fitter;

pub use coeffs::*;
pub use fitter::*;
