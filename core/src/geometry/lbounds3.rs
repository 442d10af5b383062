//! Linear Bounds

use super::{lerp, Bounds3f, Point3f, Union};
use super::Float;

/// A pair of boxes bounding a primitive at the start and the end of a time
/// interval. The primitive is contained in the linear interpolation of the
/// two boxes at every time in between.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LBounds3f {
    /// Bounds at the start of the interval.
    pub bounds0: Bounds3f,

    /// Bounds at the end of the interval.
    pub bounds1: Bounds3f,
}

impl LBounds3f {
    /// Linear bounds where both boxes are empty.
    pub const EMPTY: LBounds3f = LBounds3f {
        bounds0: Bounds3f::EMPTY,
        bounds1: Bounds3f::EMPTY,
    };

    /// Create linear bounds from the start and end boxes.
    ///
    /// * `bounds0` - Bounds at the start.
    /// * `bounds1` - Bounds at the end.
    pub fn new(bounds0: Bounds3f, bounds1: Bounds3f) -> Self {
        Self { bounds0, bounds1 }
    }

    /// Returns the box containing both ends.
    pub fn bounds(&self) -> Bounds3f {
        self.bounds0.union(&self.bounds1)
    }

    /// Returns the box at a relative time within the interval.
    ///
    /// * `t` - Time in `[0, 1]` relative to the interval.
    pub fn interpolate(&self, t: Float) -> Bounds3f {
        Bounds3f {
            p_min: lerp(t, self.bounds0.p_min, self.bounds1.p_min),
            p_max: lerp(t, self.bounds0.p_max, self.bounds1.p_max),
        }
    }

    /// Returns true if both boxes are valid.
    pub fn is_valid(&self) -> bool {
        self.bounds0.is_valid() && self.bounds1.is_valid()
    }

    /// Returns twice the center of the box at the middle of the interval.
    pub fn center2(&self) -> Point3f {
        self.interpolate(0.5).center2()
    }
}

impl From<Bounds3f> for LBounds3f {
    /// Linear bounds of a static box.
    ///
    /// * `b` - The box.
    fn from(b: Bounds3f) -> Self {
        Self::new(b, b)
    }
}

impl Union<LBounds3f> for LBounds3f {
    /// Returns the linear bounds containing both.
    ///
    /// * `other` - The other linear bounds.
    fn union(&self, other: &LBounds3f) -> Self {
        Self::new(
            self.bounds0.union(&other.bounds0),
            self.bounds1.union(&other.bounds1),
        )
    }
}
