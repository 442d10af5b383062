//! Primitive References

use rtcore::geometry::*;
use std::ops::Range;

/// Reference to a primitive with its bounds, handed to a BVH builder.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PrimRef {
    /// World space bounds.
    pub bounds: Bounds3f,

    /// Geometry id.
    pub geom_id: u32,

    /// Primitive index within the geometry.
    pub prim_id: u32,
}

impl Default for PrimRef {
    fn default() -> Self {
        Self::new(Bounds3f::EMPTY, 0, 0)
    }
}

impl PrimRef {
    /// Create a primitive reference.
    ///
    /// * `bounds`  - World space bounds.
    /// * `geom_id` - Geometry id.
    /// * `prim_id` - Primitive index within the geometry.
    pub fn new(bounds: Bounds3f, geom_id: u32, prim_id: u32) -> Self {
        Self {
            bounds,
            geom_id,
            prim_id,
        }
    }

    /// Returns twice the center of the bounds.
    pub fn center2(&self) -> Point3f {
        self.bounds.center2()
    }
}

/// Bounds of a set of primitive references.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PrimInfo {
    /// Union of the primitive bounds.
    pub geom_bounds: Bounds3f,

    /// Bounds of twice the primitive centers.
    pub cent_bounds: Bounds3f,

    /// First reference.
    pub begin: usize,

    /// One past the last reference.
    pub end: usize,
}

impl Default for PrimInfo {
    fn default() -> Self {
        Self::empty()
    }
}

impl PrimInfo {
    /// Returns info describing no primitives.
    pub fn empty() -> Self {
        Self {
            geom_bounds: Bounds3f::EMPTY,
            cent_bounds: Bounds3f::EMPTY,
            begin: 0,
            end: 0,
        }
    }

    /// Adds a primitive reference.
    ///
    /// * `prim` - The primitive reference.
    pub fn add_center2(&mut self, prim: &PrimRef) {
        self.geom_bounds = self.geom_bounds.union(&prim.bounds);
        self.cent_bounds = self.cent_bounds.union(&prim.center2());
        self.end += 1;
    }

    /// Returns the number of primitives.
    pub fn size(&self) -> usize {
        self.end - self.begin
    }
}

/// Reference to a moving primitive with linear bounds, handed to a motion
/// blur BVH builder.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PrimRefMB {
    /// Linear bounds over `time_range`.
    pub lbounds: LBounds3f,

    /// Number of time segments overlapping the build time range.
    pub num_time_segments: usize,

    /// Time range of the geometry.
    pub time_range: TimeRange,

    /// Number of time segments of the geometry.
    pub total_time_segments: usize,

    /// Geometry id.
    pub geom_id: u32,

    /// Primitive index within the geometry.
    pub prim_id: u32,
}

impl PrimRefMB {
    /// Returns twice the center of the bounds at the middle of the time range.
    pub fn center2(&self) -> Point3f {
        self.lbounds.center2()
    }
}

/// Bounds of a set of moving primitive references.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PrimInfoMB {
    /// Union of the primitive bounds over time.
    pub geom_bounds: Bounds3f,

    /// Bounds of twice the primitive centers.
    pub cent_bounds: Bounds3f,

    /// First reference.
    pub begin: usize,

    /// One past the last reference.
    pub end: usize,

    /// Sum of the time segments of all references.
    pub num_time_segments: usize,

    /// Largest number of time segments of any reference.
    pub max_num_time_segments: usize,

    /// Union of the geometry time ranges.
    pub max_time_range: TimeRange,
}

impl Default for PrimInfoMB {
    fn default() -> Self {
        Self::empty()
    }
}

impl PrimInfoMB {
    /// Returns info describing no primitives.
    pub fn empty() -> Self {
        Self {
            geom_bounds: Bounds3f::EMPTY,
            cent_bounds: Bounds3f::EMPTY,
            begin: 0,
            end: 0,
            num_time_segments: 0,
            max_num_time_segments: 0,
            max_time_range: TimeRange::EMPTY,
        }
    }

    /// Adds a primitive reference.
    ///
    /// * `prim` - The primitive reference.
    pub fn add_primref(&mut self, prim: &PrimRefMB) {
        self.geom_bounds = self.geom_bounds.union(&prim.lbounds.bounds());
        self.cent_bounds = self.cent_bounds.union(&prim.center2());
        self.end += 1;
        self.num_time_segments += prim.num_time_segments;
        self.max_num_time_segments = self.max_num_time_segments.max(prim.total_time_segments);
        self.max_time_range = self.max_time_range.extend(&prim.time_range);
    }

    /// Returns the number of primitives.
    pub fn size(&self) -> usize {
        self.end - self.begin
    }
}

/// Geometries that write references to their primitives for a BVH builder.
/// Each method writes the references for primitives `r` starting at index
/// `k` of `prims`. Invalid primitives are skipped.
pub trait PrimRefProducer {
    /// Writes references bounding the primitives at the first time step.
    ///
    /// * `prims`   - Output references.
    /// * `r`       - Primitive indices.
    /// * `k`       - First output index.
    /// * `geom_id` - Geometry id.
    fn create_prim_ref_array(
        &self,
        prims: &mut [PrimRef],
        r: Range<usize>,
        k: usize,
        geom_id: u32,
    ) -> PrimInfo;

    /// Writes references bounding the primitives over one time segment.
    ///
    /// * `prims`   - Output references.
    /// * `itime`   - Time segment.
    /// * `r`       - Primitive indices.
    /// * `k`       - First output index.
    /// * `geom_id` - Geometry id.
    fn create_prim_ref_array_mb(
        &self,
        prims: &mut [PrimRef],
        itime: usize,
        r: Range<usize>,
        k: usize,
        geom_id: u32,
    ) -> PrimInfo;

    /// Writes moving references bounding the primitives over a time range.
    ///
    /// * `prims`   - Output references.
    /// * `t0t1`    - Time range.
    /// * `r`       - Primitive indices.
    /// * `k`       - First output index.
    /// * `geom_id` - Geometry id.
    fn create_prim_ref_mb_array(
        &self,
        prims: &mut [PrimRefMB],
        t0t1: &TimeRange,
        r: Range<usize>,
        k: usize,
        geom_id: u32,
    ) -> PrimInfoMB;
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
