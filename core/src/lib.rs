//! Core geometry, numeric helpers, statistics and error types shared by the
//! curve and instance crates.

#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;

// Re-export.
pub mod error;
pub mod geometry;
pub mod pbrt;
pub mod primitive;
pub mod stats;
