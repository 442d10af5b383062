//! Accel

use rtcore::geometry::*;
use rtcore::pbrt::*;
use std::sync::Arc;

/// An acceleration structure that can be instanced. It reports the bounds of
/// everything it contains over its whole time range.
pub trait Accel {
    /// Returns the linear bounds over the time range `[0, 1]`.
    fn linear_bounds(&self) -> LBounds3f;

    /// Returns the bounds at a time.
    ///
    /// * `time` - Time in `[0, 1]`.
    fn bounds_at(&self, time: Float) -> Bounds3f {
        self.linear_bounds().interpolate(time)
    }
}

/// Atomic reference counted `Accel`.
pub type ArcAccel = Arc<dyn Accel + Send + Sync>;
