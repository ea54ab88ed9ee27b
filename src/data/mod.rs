//! Views over the loaded sweep data.

pub mod dims;

pub use dims::*;
