//! Instances of acceleration structures and the primitive references they
//! hand to BVH builders.

#[macro_use]
extern crate log;

mod accel;
mod instance;
mod prim_ref;
mod scene;

// Re-export
pub use accel::*;
pub use instance::*;
pub use prim_ref::*;
pub use scene::*;
