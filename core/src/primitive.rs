//! Primitive

use crate::geometry::*;
use std::ops::RangeInclusive;

/// Bounds queries a geometry answers for an acceleration structure builder.
/// Primitive indices are local to the geometry.
pub trait BoundsProvider {
    /// Returns the world space bounds at the first time step.
    ///
    /// * `prim` - Primitive index.
    fn bounds(&self, prim: usize) -> Bounds3f;

    /// Returns the world space bounds at a time step.
    ///
    /// * `prim`  - Primitive index.
    /// * `itime` - Time step index.
    fn bounds_at_step(&self, prim: usize, itime: usize) -> Bounds3f;

    /// Returns the bounds at both ends of a time segment.
    ///
    /// * `prim`  - Primitive index.
    /// * `itime` - Index of the time segment.
    fn linear_bounds_at_segment(&self, prim: usize, itime: usize) -> LBounds3f;

    /// Returns linear bounds enclosing the primitive's motion over a time range.
    ///
    /// * `prim`       - Primitive index.
    /// * `time_range` - Global time range.
    fn linear_bounds(&self, prim: usize, time_range: &TimeRange) -> LBounds3f;

    /// Returns true if the primitive has valid bounds at every time step in
    /// a range.
    ///
    /// * `prim`   - Primitive index.
    /// * `itimes` - Time step indices.
    fn valid(&self, prim: usize, itimes: RangeInclusive<usize>) -> bool;
}
