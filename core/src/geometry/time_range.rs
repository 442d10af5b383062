//! Time Ranges

use super::{max, min, Float};
use std::fmt;

/// A closed interval of time values. Geometry time ranges lie inside
/// `[0, 1]`; motion keys are spread uniformly over a geometry's range.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TimeRange {
    /// Start time.
    pub lower: Float,

    /// End time.
    pub upper: Float,
}

impl TimeRange {
    /// An empty range that any extension will replace.
    pub const EMPTY: TimeRange = TimeRange {
        lower: Float::INFINITY,
        upper: Float::NEG_INFINITY,
    };

    /// Create a new time range.
    ///
    /// * `lower` - Start time.
    /// * `upper` - End time.
    pub fn new(lower: Float, upper: Float) -> Self {
        Self { lower, upper }
    }

    /// Returns the length of the range.
    pub fn size(&self) -> Float {
        self.upper - self.lower
    }

    /// Returns true if `lower <= upper`.
    pub fn is_empty(&self) -> bool {
        !(self.lower <= self.upper)
    }

    /// Returns the range covering both ranges.
    ///
    /// * `other` - The other range.
    pub fn extend(&self, other: &TimeRange) -> TimeRange {
        TimeRange::new(min(self.lower, other.lower), max(self.upper, other.upper))
    }

    /// Returns the overlap of both ranges; may be empty.
    ///
    /// * `other` - The other range.
    pub fn intersect(&self, other: &TimeRange) -> TimeRange {
        TimeRange::new(max(self.lower, other.lower), min(self.upper, other.upper))
    }
}

impl Default for TimeRange {
    /// Returns the unit range `[0, 1]`.
    fn default() -> Self {
        Self::new(0.0, 1.0)
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lower, self.upper)
    }
}
