//! Geometry
use super::pbrt::*;

// Define macros for property based testing.
#[cfg(test)]
#[macro_export]
macro_rules! prop_range {
    ($name: ident, $t: ty, $r: expr) => {
        prop_compose! {
            fn $name()(f in $r) -> $t {
                f
            }
        }
    };
}

#[cfg(test)]
#[macro_export]
macro_rules! prop_vector3 {
    ($name: ident, $t: ty, $xr: expr, $yr: expr, $zr: expr) => {
        prop_compose! {
            fn $name()(x in $xr, y in $yr, z in $zr) -> Vector3<$t> {
                Vector3 { x, y, z }
            }
        }
    };
}

#[cfg(test)]
#[macro_export]
macro_rules! prop_point3 {
    ($name: ident, $t: ty, $xr: expr, $yr: expr, $zr: expr) => {
        prop_compose! {
            fn $name()(x in $xr, y in $yr, z in $zr) -> Point3<$t> {
                Point3 { x, y, z }
            }
        }
    };
}

mod bounds3;
mod common;
mod interval;
mod lbounds3;
mod matrix4x4;
mod motion_derivative;
mod point3;
mod quaternion;
mod quaternion_decomposition;
mod time_range;
mod transform;
mod vector3;
mod vector4;

// Re-export
pub use bounds3::*;
pub use common::*;
pub use interval::*;
pub use lbounds3::*;
pub use matrix4x4::*;
pub use motion_derivative::*;
pub use point3::*;
pub use quaternion::*;
pub use quaternion_decomposition::*;
pub use time_range::*;
pub use transform::*;
pub use vector3::*;
pub use vector4::*;
