//! 4-D Vectors

use super::{abs, point3, Float, Point3f};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

/// A 4-D vector used for curve control vertices: `x`, `y`, `z` hold the
/// position and `w` holds the radius.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Vector4f {
    /// X-coordinate.
    pub x: Float,

    /// Y-coordinate.
    pub y: Float,

    /// Z-coordinate.
    pub z: Float,

    /// W-coordinate.
    pub w: Float,
}

/// Creates a new 4-D vector.
///
/// * `x` - X-coordinate.
/// * `y` - Y-coordinate.
/// * `z` - Z-coordinate.
/// * `w` - W-coordinate.
pub fn vector4(x: Float, y: Float, z: Float, w: Float) -> Vector4f {
    Vector4f { x, y, z, w }
}

impl Vector4f {
    /// Returns the position part.
    pub fn xyz(&self) -> Point3f {
        point3(self.x, self.y, self.z)
    }

    /// Returns the absolute value of the radius part.
    pub fn abs_w(&self) -> Float {
        abs(self.w)
    }
}

impl Add for Vector4f {
    type Output = Self;

    /// Adds the given vector and returns the result.
    ///
    /// * `other` - The vector to add.
    fn add(self, other: Self) -> Self::Output {
        vector4(
            self.x + other.x,
            self.y + other.y,
            self.z + other.z,
            self.w + other.w,
        )
    }
}

impl Sub for Vector4f {
    type Output = Self;

    /// Subtracts the given vector and returns the result.
    ///
    /// * `other` - The vector to subtract.
    fn sub(self, other: Self) -> Self::Output {
        vector4(
            self.x - other.x,
            self.y - other.y,
            self.z - other.z,
            self.w - other.w,
        )
    }
}

impl Mul<Float> for Vector4f {
    type Output = Self;

    /// Scale the vector.
    ///
    /// * `f` - The scaling factor.
    fn mul(self, f: Float) -> Self::Output {
        vector4(f * self.x, f * self.y, f * self.z, f * self.w)
    }
}

impl Mul<Vector4f> for Float {
    type Output = Vector4f;

    /// Scale the vector.
    ///
    /// * `v` - The vector.
    fn mul(self, v: Vector4f) -> Vector4f {
        v * self
    }
}

impl Neg for Vector4f {
    type Output = Self;

    /// Flip the vector's direction (scale by -1).
    fn neg(self) -> Self::Output {
        vector4(-self.x, -self.y, -self.z, -self.w)
    }
}

impl fmt::Display for Vector4f {
    /// Formats the value using the given formatter.
    ///
    /// * `f` - Formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}, {})", self.x, self.y, self.z, self.w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_is_component_wise() {
        let a = vector4(1.0, 2.0, 3.0, 0.5);
        let b = vector4(-1.0, 0.0, 1.0, 0.25);
        assert_eq!(a + b, vector4(0.0, 2.0, 4.0, 0.75));
        assert_eq!(a - b, vector4(2.0, 2.0, 2.0, 0.25));
        assert_eq!(2.0 * a, vector4(2.0, 4.0, 6.0, 1.0));
        assert_eq!(-a, vector4(-1.0, -2.0, -3.0, -0.5));
    }

    #[test]
    fn position_and_radius_parts() {
        let v = vector4(1.0, -4.0, 3.0, -0.5);
        assert_eq!(v.xyz(), point3(1.0, -4.0, 3.0));
        assert_eq!(v.abs_w(), 0.5);
        assert_eq!(format!("{}", v), "(1, -4, 3, -0.5)");
    }
}
