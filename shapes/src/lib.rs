//! Curves

#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;

mod bezier_basis;
mod bezier_curve;

// Re-export
pub use bezier_basis::*;
pub use bezier_curve::*;
