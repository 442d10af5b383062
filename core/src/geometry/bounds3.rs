//! 3-D Axis Aligned Bounding Boxes.

use super::{max, min, point3, vector3, Float, Point3, Point3f, Union, Vector3, INFINITY};
use num_traits::Num;
use std::fmt;
use std::ops::Index;

/// 3-D Axis Aligned Bounding Box.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds3<T: Num> {
    /// Minimum bounds.
    pub p_min: Point3<T>,

    /// Maximum bounds.
    pub p_max: Point3<T>,
}

/// 3-D bounding box containing `Float` points.
pub type Bounds3f = Bounds3<Float>;

/// Creates a new 3-D bounding box from 2 points. The minimum and maximum bounds
/// are used for each coordinate axis.
///
/// * `p1` - First point.
/// * `p2` - Second point.
pub fn bounds3<T: Num + PartialOrd + Copy>(p1: Point3<T>, p2: Point3<T>) -> Bounds3<T> {
    Bounds3 {
        p_min: point3(min(p1.x, p2.x), min(p1.y, p2.y), min(p1.z, p2.z)),
        p_max: point3(max(p1.x, p2.x), max(p1.y, p2.y), max(p1.z, p2.z)),
    }
}

impl<T: Num + PartialOrd + Copy> From<Point3<T>> for Bounds3<T> {
    /// Use a 3-D point as minimum and maximum 3-D bounds.
    ///
    /// * `p` - 3-D point.
    fn from(p: Point3<T>) -> Self {
        Bounds3 { p_min: p, p_max: p }
    }
}

impl Bounds3f {
    /// An empty box that any union will replace. It is not valid.
    pub const EMPTY: Bounds3f = Bounds3 {
        p_min: Point3 {
            x: INFINITY,
            y: INFINITY,
            z: INFINITY,
        },
        p_max: Point3 {
            x: -INFINITY,
            y: -INFINITY,
            z: -INFINITY,
        },
    };

    /// Returns true if all corners are finite and `p_min <= p_max` on every
    /// axis. Invalid boxes are excluded from acceleration structure builds.
    pub fn is_valid(&self) -> bool {
        self.p_min.is_finite()
            && self.p_max.is_finite()
            && self.p_min.x <= self.p_max.x
            && self.p_min.y <= self.p_max.y
            && self.p_min.z <= self.p_max.z
    }

    /// Returns twice the box center; cheaper than the center and good enough
    /// for centroid bounds.
    pub fn center2(&self) -> Point3f {
        self.p_min + self.p_max
    }

    /// Pad the bounding box by a constant factor in all dimensions.
    ///
    /// * `delta` - Padding amount.
    pub fn expand(&self, delta: Float) -> Bounds3f {
        // Don't call bounds3() to prevent flipping p_min and p_max when
        // the input is an empty box.
        Bounds3 {
            p_min: self.p_min - vector3(delta, delta, delta),
            p_max: self.p_max + vector3(delta, delta, delta),
        }
    }

    /// Moves `p_min` down by `lower` and `p_max` up by `upper`.
    ///
    /// * `lower` - Amount subtracted from the minimum bounds.
    /// * `upper` - Amount added to the maximum bounds.
    pub fn enlarge(&self, lower: &Vector3<Float>, upper: &Vector3<Float>) -> Bounds3f {
        Bounds3 {
            p_min: self.p_min - *lower,
            p_max: self.p_max + *upper,
        }
    }
}

impl<T: Num + Copy> Bounds3<T> {
    /// Returns the vector along the box diagonal from the minimum point to
    /// the maximum point.
    pub fn diagonal(&self) -> Vector3<T> {
        self.p_max - self.p_min
    }

    /// Returns true if a point is inside the bounding box.
    ///
    /// * `p` - The point.
    pub fn contains(&self, p: &Point3<T>) -> bool
    where
        T: PartialOrd,
    {
        (p.x >= self.p_min.x && p.x <= self.p_max.x)
            && (p.y >= self.p_min.y && p.y <= self.p_max.y)
            && (p.z >= self.p_min.z && p.z <= self.p_max.z)
    }

    /// Returns true if another bounding box is completely inside this one.
    ///
    /// * `other` - The other bounding box.
    pub fn contains_bounds(&self, other: &Self) -> bool
    where
        T: PartialOrd,
    {
        self.contains(&other.p_min) && self.contains(&other.p_max)
    }

    /// Returns the coordinates of one of the eight corners.
    ///
    /// * `corner` - Corner index in [0, 7]; bit 0 selects x, bit 1 y, bit 2 z.
    pub fn corner(&self, corner: u8) -> Point3<T> {
        debug_assert!(corner < 8);
        let x = corner & 1;
        let y = (corner >> 1) & 1;
        let z = (corner >> 2) & 1;
        point3(self[x].x, self[y].y, self[z].z)
    }
}

impl<T: Num> Index<u8> for Bounds3<T> {
    type Output = Point3<T>;

    /// Index the minimum and maximum bounds.
    ///
    /// * `i` - 0 for minimum and 1 for maximum.
    fn index(&self, index: u8) -> &Self::Output {
        match index {
            0 => &self.p_min,
            1 => &self.p_max,
            _ => panic!("Invalid index for std::Index on Bounds3<T>"),
        }
    }
}

impl<T: Num + PartialOrd + Copy> Union<Point3<T>> for Bounds3<T> {
    /// Return a bounding box containing the itself and a point.
    ///
    /// * `other` - The point.
    fn union(&self, other: &Point3<T>) -> Self {
        Bounds3 {
            p_min: self.p_min.min(other),
            p_max: self.p_max.max(other),
        }
    }
}

impl<T: Num + PartialOrd + Copy> Union<Bounds3<T>> for Bounds3<T> {
    /// Return a bounding box containing both bounding boxes.
    ///
    /// * `other` - The other bounding box.
    fn union(&self, other: &Bounds3<T>) -> Self {
        Bounds3 {
            p_min: self.p_min.min(&other.p_min),
            p_max: self.p_max.max(&other.p_max),
        }
    }
}

impl fmt::Display for Bounds3f {
    /// Formats the value using the given formatter.
    ///
    /// * `f` - Formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[({}, {}, {}), ({}, {}, {})]",
            self.p_min.x, self.p_min.y, self.p_min.z, self.p_max.x, self.p_max.y, self.p_max.z
        )
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
