//! Instance

use crate::accel::*;
use crate::prim_ref::*;
use crate::scene::*;
use rtcore::error::*;
use rtcore::geometry::*;
use rtcore::pbrt::*;
use rtcore::primitive::*;
use rtcore::{stat_counter, stat_percent, stat_register_fns};
use std::fmt;
use std::ops::{Range, RangeInclusive};
use std::sync::{Arc, Weak};

mod bounds;
mod world_to_local;

pub use world_to_local::*;

stat_percent!(
    "Instance/Divergent world-to-local batches",
    DIVERGENT_BATCHES,
    WORLD_TO_LOCAL_BATCHES,
    instance_stats_divergent_batches,
);
stat_counter!(
    "Instance/Motion derivative zeros",
    MOTION_DERIVATIVE_ZEROS,
    instance_stats_motion_derivative_zeros,
);

stat_register_fns!(
    instance_stats_divergent_batches,
    instance_stats_motion_derivative_zeros,
);

/// How motion keys are interpolated.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum TransformationInterpolation {
    /// Keys are affine matrices interpolated element-wise.
    #[default]
    Linear,

    /// Keys are packed quaternion decompositions; rotations are interpolated
    /// spherically.
    NonLinear,
}

/// Encoding of a motion key as written by the user.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TransformEncoding {
    /// An affine matrix.
    Affine,

    /// A packed quaternion decomposition.
    QuaternionDecomposition,
}

/// An acceleration structure placed in a scene with a transformation that
/// may change over time. The instance is a single primitive with index 0.
pub struct Instance {
    /// The instanced acceleration structure.
    object: Option<ArcAccel>,

    /// Local to world transformation per motion key; affine or packed
    /// quaternion decomposition depending on `interpolation`.
    local2world: Vec<Matrix4x4>,

    /// How each motion key was written; `None` for keys never written.
    encodings: Vec<Option<TransformEncoding>>,

    /// Cached world to local transformation of the first key.
    world2local0: Transform,

    /// Interpolation mode.
    interpolation: TransformationInterpolation,

    /// Motion derivative coefficients per time segment in non-linear mode.
    motion_derivative_coeffs: Vec<MotionDerivativeCoefficients>,

    /// Time range the motion keys are spread over.
    time_range: TimeRange,

    /// Ray mask.
    mask: u32,

    /// Scene the instance is attached to and its geometry id there.
    scene: Option<(Weak<Scene>, u32)>,
}

impl Instance {
    /// Create a new instance with identity transformations.
    ///
    /// * `object`         - The instanced acceleration structure.
    /// * `num_time_steps` - Number of motion keys; at least 1.
    pub fn new(object: Option<ArcAccel>, num_time_steps: usize) -> Result<Self> {
        register_stats();

        if num_time_steps == 0 {
            return invalid_argument(String::from("instance needs at least one time step"));
        }

        Ok(Self {
            object,
            local2world: vec![IDENTITY_MATRIX; num_time_steps],
            encodings: vec![None; num_time_steps],
            world2local0: Transform::default(),
            interpolation: TransformationInterpolation::Linear,
            motion_derivative_coeffs: vec![],
            time_range: TimeRange::default(),
            mask: u32::MAX,
            scene: None,
        })
    }

    /// Attaches the instance to a scene under a geometry id.
    ///
    /// * `scene`   - The scene.
    /// * `geom_id` - The geometry id.
    pub fn attach(&mut self, scene: &Arc<Scene>, geom_id: u32) -> Result<()> {
        if let Some((_, id)) = &self.scene {
            return invalid_operation(format!(
                "instance is already attached as geometry {}",
                id
            ));
        }
        scene.register_geometry(geom_id)?;
        self.scene = Some((Arc::downgrade(scene), geom_id));
        Ok(())
    }

    /// Detaches the instance from its scene, if attached, and releases the
    /// instanced acceleration structure.
    pub fn detach(&mut self) {
        if let Some((scene, geom_id)) = self.scene.take() {
            if let Some(scene) = scene.upgrade() {
                scene.unregister_geometry(geom_id);
            }
        }
        self.object = None;
    }

    /// Returns the geometry id if attached.
    pub fn geom_id(&self) -> Option<u32> {
        self.scene.as_ref().map(|(_, id)| *id)
    }

    /// Returns the instanced acceleration structure.
    pub fn object(&self) -> Option<&ArcAccel> {
        self.object.as_ref()
    }

    /// Replaces the instanced acceleration structure.
    ///
    /// * `object` - The acceleration structure.
    pub fn set_instanced_scene(&mut self, object: ArcAccel) {
        self.object = Some(object);
    }

    /// Returns the number of motion keys.
    pub fn num_time_steps(&self) -> usize {
        self.local2world.len()
    }

    /// Returns the number of time segments between motion keys.
    pub fn num_time_segments(&self) -> usize {
        self.local2world.len() - 1
    }

    /// Changes the number of motion keys. Existing keys are kept; new keys
    /// are identity transformations.
    ///
    /// * `num_time_steps` - Number of motion keys; at least 1.
    pub fn set_num_time_steps(&mut self, num_time_steps: usize) -> Result<()> {
        if num_time_steps == 0 {
            return invalid_argument(String::from("instance needs at least one time step"));
        }
        self.local2world.resize(num_time_steps, IDENTITY_MATRIX);
        self.encodings.resize(num_time_steps, None);
        self.motion_derivative_coeffs.clear();
        self.interpolation = self.encoded_interpolation();
        Ok(())
    }

    /// Sets the affine local to world transformation of a motion key. The
    /// bottom row is set to `(0, 0, 0, 1)`.
    ///
    /// * `local2world` - The transformation.
    /// * `step`        - Motion key index.
    pub fn set_transform(&mut self, local2world: &Matrix4x4, step: usize) -> Result<()> {
        self.check_step(step)?;
        let mut m = *local2world;
        m.m[3] = IDENTITY_MATRIX.m[3];
        self.local2world[step] = m;
        self.encodings[step] = Some(TransformEncoding::Affine);
        Ok(())
    }

    /// Sets the local to world transformation of a motion key as a quaternion
    /// decomposition. The instance switches to non-linear interpolation.
    ///
    /// * `qd`   - The decomposition.
    /// * `step` - Motion key index.
    pub fn set_quaternion_decomposition(
        &mut self,
        qd: &QuaternionDecomposition,
        step: usize,
    ) -> Result<()> {
        self.check_step(step)?;
        self.local2world[step] = qd.pack();
        self.encodings[step] = Some(TransformEncoding::QuaternionDecomposition);
        self.interpolation = TransformationInterpolation::NonLinear;
        Ok(())
    }

    fn check_step(&self, step: usize) -> Result<()> {
        if step >= self.num_time_steps() {
            return invalid_argument(format!(
                "time step {} out of range for {} time steps",
                step,
                self.num_time_steps()
            ));
        }
        Ok(())
    }

    /// Returns the time range the motion keys are spread over.
    pub fn time_range(&self) -> TimeRange {
        self.time_range
    }

    /// Sets the time range the motion keys are spread over.
    ///
    /// * `time_range` - Range within `[0, 1]`.
    pub fn set_time_range(&mut self, time_range: TimeRange) -> Result<()> {
        let TimeRange { lower, upper } = time_range;
        if !(0.0 <= lower && lower <= upper && upper <= 1.0) {
            return invalid_argument(format!("invalid time range {}", time_range));
        }
        self.time_range = time_range;
        Ok(())
    }

    /// Returns the ray mask.
    pub fn mask(&self) -> u32 {
        self.mask
    }

    /// Sets the ray mask.
    ///
    /// * `mask` - The mask.
    pub fn set_mask(&mut self, mask: u32) {
        self.mask = mask;
    }

    /// Returns the interpolation mode.
    pub fn interpolation(&self) -> TransformationInterpolation {
        self.interpolation
    }

    /// Returns the mode implied by the key encodings.
    fn encoded_interpolation(&self) -> TransformationInterpolation {
        if self
            .encodings
            .contains(&Some(TransformEncoding::QuaternionDecomposition))
        {
            TransformationInterpolation::NonLinear
        } else {
            TransformationInterpolation::Linear
        }
    }

    /// Recomputes the interpolation mode from the key encodings. Any quaternion
    /// decomposition key makes the mode non-linear. Mixing affine and
    /// quaternion decomposition keys is an error and leaves the instance in
    /// linear mode, so affine keys are read as affine matrices.
    pub fn update_interpolation_mode(&mut self) -> Result<()> {
        let has = |e| self.encodings.contains(&Some(e));
        if has(TransformEncoding::Affine) && has(TransformEncoding::QuaternionDecomposition) {
            self.interpolation = TransformationInterpolation::Linear;
            self.motion_derivative_coeffs.clear();
            return invalid_operation(String::from(
                "instance mixes affine and quaternion decomposition time steps",
            ));
        }
        self.interpolation = self.encoded_interpolation();
        Ok(())
    }

    /// Validates the instance before a commit.
    pub fn pre_commit(&mut self) -> Result<()> {
        self.update_interpolation_mode()?;
        if let Some(step) = self.local2world.iter().position(|m| !m.is_finite()) {
            return invalid_operation(format!("time step {} has a non-finite transform", step));
        }
        Ok(())
    }

    /// Rebuilds cached data after a commit.
    pub fn post_commit(&mut self) {
        self.world2local0 = self.get_local_to_world0().inverse();
        self.motion_derivative_coeffs = match self.interpolation {
            TransformationInterpolation::Linear => vec![],
            TransformationInterpolation::NonLinear => self
                .local2world
                .windows(2)
                .map(|w| MotionDerivativeCoefficients::new(&w[0], &w[1]))
                .collect(),
        };
        trace!(
            "Committed instance with {} time steps, {:?} interpolation",
            self.num_time_steps(),
            self.interpolation
        );
    }

    /// Validates the instance and rebuilds cached data.
    pub fn commit(&mut self) -> Result<()> {
        self.pre_commit()?;
        self.post_commit();
        Ok(())
    }

    /// Adds the instance to the geometry counts.
    ///
    /// * `counts` - The counts.
    pub fn add_elements_to_count(&self, counts: &mut GeometryCounts) {
        if self.num_time_steps() == 1 {
            counts.num_instances += 1;
        } else {
            counts.num_mb_instances += 1;
        }
    }

    /// Maps a global time to the instance's local time in `[0, 1]`.
    fn local_time(&self, time: Float) -> Float {
        let size = self.time_range.size();
        if size > 0.0 {
            clamp((time - self.time_range.lower) / size, 0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Returns the time segment containing a global time and the relative
    /// time within the segment.
    ///
    /// * `time` - Global time.
    pub fn time_segment(&self, time: Float) -> (usize, Float) {
        self.local_time_segment(self.local_time(time))
    }

    fn local_time_segment(&self, t: Float) -> (usize, Float) {
        let segments = self.num_time_segments();
        if segments == 0 {
            return (0, 0.0);
        }
        let scaled = t * segments as Float;
        let itime = clamp(scaled.floor(), 0.0, (segments - 1) as Float);
        (itime as usize, scaled - itime)
    }

    /// Returns the motion keys needed to cover a global time range.
    ///
    /// * `range` - Global time range.
    pub fn time_segment_range(&self, range: &TimeRange) -> RangeInclusive<usize> {
        let segments = self.num_time_segments() as Float;
        let round_up = 1.0 + 2.0 * MACHINE_EPSILON;
        let round_down = 1.0 - 2.0 * MACHINE_EPSILON;
        let lower = self.local_time(range.lower);
        let upper = self.local_time(range.upper);
        let ilower = max((round_up * lower * segments).floor(), 0.0) as usize;
        let iupper = min((round_down * upper * segments).ceil(), segments) as usize;
        min(ilower, iupper)..=iupper
    }

    /// Returns the global time of a motion key.
    ///
    /// * `itime` - Motion key index.
    pub fn time_step(&self, itime: usize) -> Float {
        let segments = self.num_time_segments();
        if segments == 0 {
            return self.time_range.lower;
        }
        self.time_range.lower + self.time_range.size() * itime as Float / segments as Float
    }

    /// Returns the affine transformation of a motion key.
    fn key_transform(&self, itime: usize) -> Matrix4x4 {
        match self.interpolation {
            TransformationInterpolation::Linear => self.local2world[itime],
            TransformationInterpolation::NonLinear => {
                quaternion_decomposition_to_affine(&self.local2world[itime])
            }
        }
    }

    /// Interpolates two motion keys and returns the affine transformation.
    fn interpolate(&self, m0: &Matrix4x4, m1: &Matrix4x4, ftime: Float) -> Matrix4x4 {
        match self.interpolation {
            TransformationInterpolation::Linear => m0.lerp(ftime, m1),
            TransformationInterpolation::NonLinear => {
                slerp_quaternion_decomposition(ftime, m0, m1)
            }
        }
    }

    /// Returns the affine transformation at a local time.
    fn local_transform(&self, t: Float) -> Matrix4x4 {
        if self.num_time_steps() == 1 {
            return self.key_transform(0);
        }
        let (itime, ftime) = self.local_time_segment(t);
        self.interpolate(&self.local2world[itime], &self.local2world[itime + 1], ftime)
    }

    /// Returns the affine local to world transformation at a global time.
    ///
    /// * `time` - Global time.
    pub fn get_transform(&self, time: Float) -> Matrix4x4 {
        self.local_transform(self.local_time(time))
    }

    /// Returns the local to world transformation at a global time.
    ///
    /// * `time` - Global time.
    pub fn get_local_to_world(&self, time: Float) -> Transform {
        Transform::new(self.get_transform(time))
    }

    /// Returns the local to world transformation of the first motion key.
    pub fn get_local_to_world0(&self) -> Transform {
        Transform::new(self.key_transform(0))
    }

    /// Returns the world to local transformation of the first motion key as
    /// of the last commit.
    pub fn get_world_to_local0(&self) -> Transform {
        self.world2local0
    }

    /// Returns the world to local transformation at a global time.
    ///
    /// * `time` - Global time.
    pub fn get_world_to_local(&self, time: Float) -> Transform {
        self.get_local_to_world(time).inverse()
    }
}

impl Drop for Instance {
    fn drop(&mut self) {
        self.detach();
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("geom_id", &self.geom_id())
            .field("num_time_steps", &self.num_time_steps())
            .field("interpolation", &self.interpolation)
            .field("time_range", &self.time_range)
            .field("mask", &self.mask)
            .finish()
    }
}

impl PrimRefProducer for Instance {
    fn create_prim_ref_array(
        &self,
        prims: &mut [PrimRef],
        r: Range<usize>,
        k: usize,
        geom_id: u32,
    ) -> PrimInfo {
        debug_assert!(r == (0..1));

        let mut pinfo = PrimInfo::empty();
        let b = self.bounds(0);
        if !b.is_valid() {
            return pinfo;
        }

        let prim = PrimRef::new(b, geom_id, 0);
        pinfo.add_center2(&prim);
        prims[k] = prim;
        pinfo
    }

    fn create_prim_ref_array_mb(
        &self,
        prims: &mut [PrimRef],
        itime: usize,
        r: Range<usize>,
        k: usize,
        geom_id: u32,
    ) -> PrimInfo {
        debug_assert!(r == (0..1));

        let mut pinfo = PrimInfo::empty();
        let next = min(itime + 1, self.num_time_segments());
        if !self.valid(0, itime..=next) {
            return pinfo;
        }

        let prim = PrimRef::new(self.linear_bounds_at_segment(0, itime).bounds(), geom_id, 0);
        pinfo.add_center2(&prim);
        prims[k] = prim;
        pinfo
    }

    fn create_prim_ref_mb_array(
        &self,
        prims: &mut [PrimRefMB],
        t0t1: &TimeRange,
        r: Range<usize>,
        k: usize,
        geom_id: u32,
    ) -> PrimInfoMB {
        debug_assert!(r == (0..1));

        let mut pinfo = PrimInfoMB::empty();
        if !self.valid(0, self.time_segment_range(t0t1)) {
            return pinfo;
        }

        let prim = PrimRefMB {
            lbounds: self.linear_bounds(0, t0t1),
            num_time_segments: self.num_time_segments(),
            time_range: self.time_range,
            total_time_segments: self.num_time_segments(),
            geom_id,
            prim_id: 0,
        };
        pinfo.add_primref(&prim);
        prims[k] = prim;
        pinfo
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
