//! `rc-curves` library crate.
//!
//! The binary (`rc`) is a thin wrapper around this library so that the
//! loader, aggregation, fitting and rendering stages are testable without
//! spawning processes.

pub mod aggregate;
pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
