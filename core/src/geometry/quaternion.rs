//! Quaternions

use super::common::*;
use super::{clamp, Float, Matrix4x4, Vector3f, IDENTITY_MATRIX};
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// A quaternion
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Quaternion {
    /// The `x`, `y`, `z` components represented as a vector.
    pub v: Vector3f,

    /// The real component `w`.
    pub w: Float,
}

impl Quaternion {
    /// Create a new quaternion.
    ///
    /// * `v` - The `x`, `y`, `z` components represented as a vector.
    /// * `w` - The real component `w`.
    pub fn new(v: Vector3f, w: Float) -> Self {
        Self { v, w }
    }

    /// Create a quaternion representing a rotation about an axis.
    ///
    /// * `theta` - Angle in degrees.
    /// * `axis`  - Rotation axis.
    pub fn from_axis_angle(theta: Float, axis: &Vector3f) -> Self {
        let half = 0.5 * theta.to_radians();
        Self::new(axis.normalize() * half.sin(), half.cos())
    }

    /// Normlizes the quaternion by dividing each component by its length.
    pub fn normalize(&self) -> Self {
        *self / self.length()
    }

    /// Returns the square of the length of the quaternion which is the
    /// inner product with itself.
    pub fn length_squared(&self) -> Float {
        self.dot(self)
    }

    /// Returns the length of the quaternion which is square root of the inner
    /// product with itself.
    pub fn length(&self) -> Float {
        self.length_squared().sqrt()
    }

    /// Interpolate between this and another quaternion using sqpherical linear
    /// interpolation. The shorter arc is not enforced: `q` and `-q` give
    /// different paths.
    ///
    /// * `t` - The interpolation parameter.
    /// * `q` - The other quaternion.
    pub fn slerp(&self, t: Float, q: Self) -> Self {
        let cos_theta = self.dot(&q);
        if cos_theta > 0.9995 {
            // Quaternions are nearly parallel. Use linear interpolation to
            // avoid numerical instability.
            ((1.0 - t) * *self + t * q).normalize()
        } else {
            //  Compute the orthogonal quaternion `qperp`.
            let theta = clamp(cos_theta, -1.0, 1.0).acos();
            let thetap = theta * t;
            let qperp = (q - *self * cos_theta).normalize();

            // Compute the interpolated quaternion.
            *self * thetap.cos() + qperp * thetap.sin()
        }
    }

    /// Returns the rotation matrix `w² + x² - y² - z², 2(xy - wz), ...` in
    /// homogeneous form. For unit quaternions this is the usual rotation
    /// matrix; the form is quadratic in the components which the motion
    /// derivative relies on.
    #[rustfmt::skip]
    pub fn to_matrix(&self) -> Matrix4x4 {
        let (x, y, z, w) = (self.v.x, self.v.y, self.v.z, self.w);
        let mut m = IDENTITY_MATRIX;
        m.m[0][0] = w * w + x * x - y * y - z * z;
        m.m[0][1] = 2.0 * (x * y - w * z);
        m.m[0][2] = 2.0 * (x * z + w * y);
        m.m[1][0] = 2.0 * (x * y + w * z);
        m.m[1][1] = w * w - x * x + y * y - z * z;
        m.m[1][2] = 2.0 * (y * z - w * x);
        m.m[2][0] = 2.0 * (x * z - w * y);
        m.m[2][1] = 2.0 * (y * z + w * x);
        m.m[2][2] = w * w - x * x - y * y + z * z;
        m
    }
}

impl Default for Quaternion {
    /// Returns the default quaternion [0, 0, 0, 1].
    fn default() -> Self {
        Self {
            v: Vector3f::zero(),
            w: 1.0,
        }
    }
}

impl fmt::Display for Quaternion {
    /// Formats the value using the given formatter.
    ///
    /// * `f` - Formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}, {}]", self.v.x, self.v.y, self.v.z, self.w)
    }
}

impl From<&Matrix4x4> for Quaternion {
    /// Returns a quaternion representing the rotation in the linear part of
    /// a matrix. The linear part must be a pure rotation.
    ///
    /// * `m` - The matrix.
    fn from(m: &Matrix4x4) -> Self {
        let m = &m.m;
        let trace = m[0][0] + m[1][1] + m[2][2];
        if trace > 0.0 {
            // Compute w from matrix trace, then xyz
            // 4w^2 = m[0][0] + m[1][1] + m[2][2] + m[3][3] (but m[3][3] == 1)
            let mut s = (trace + 1.0).sqrt();
            let w = s / 2.0;
            s = 0.5 / s;

            let v = Vector3f::new(
                (m[2][1] - m[1][2]) * s,
                (m[0][2] - m[2][0]) * s,
                (m[1][0] - m[0][1]) * s,
            );

            Self::new(v, w)
        } else {
            // Compute largest of x, y, or z, then remaining components
            let nxt = [1, 2, 0];
            let mut q = [0.0; 3];

            let mut i = 0;
            if m[1][1] > m[0][0] {
                i = 1;
            }
            if m[2][2] > m[i][i] {
                i = 2;
            }

            let j = nxt[i];
            let k = nxt[j];

            let mut s = ((m[i][i] - (m[j][j] + m[k][k])) + 1.0).sqrt();
            q[i] = s * 0.5;

            if s != 0.0 {
                s = 0.5 / s;
            }

            let w = (m[k][j] - m[j][k]) * s;
            q[j] = (m[j][i] + m[i][j]) * s;
            q[k] = (m[k][i] + m[i][k]) * s;

            Self::new(Vector3f::new(q[0], q[1], q[2]), w)
        }
    }
}

impl Add<Quaternion> for Quaternion {
    type Output = Self;

    /// Adds the components of the given quaternion.
    ///
    /// * `other` - The quaternion to add.
    fn add(self, other: Self) -> Self::Output {
        Self::Output::new(self.v + other.v, self.w + other.w)
    }
}

impl Sub<Quaternion> for Quaternion {
    type Output = Self;

    /// Subtracts the components of the given quaternion.
    ///
    /// * `other` - The quaternion to subtract.
    fn sub(self, other: Self) -> Self::Output {
        Self::new(self.v - other.v, self.w - other.w)
    }
}

impl Mul<Float> for Quaternion {
    type Output = Self;

    /// Scales the components of the given quaternion.
    ///
    /// * `f` - The scaling factor.
    fn mul(self, f: Float) -> Self::Output {
        Self::Output::new(f * self.v, f * self.w)
    }
}

impl Mul<Quaternion> for Float {
    type Output = Quaternion;

    /// Scales the components of the given quaternion.
    ///
    /// * `q` - The quaternion to scale.
    fn mul(self, q: Quaternion) -> Self::Output {
        Self::Output::new(self * q.v, self * q.w)
    }
}

impl Div<Float> for Quaternion {
    type Output = Self;

    /// Scales the components of the given quaternion by 1/f.
    ///
    /// * `f` - The scaling factor.
    fn div(self, f: Float) -> Self::Output {
        Self::Output::new(self.v / f, self.w / f)
    }
}

impl Neg for Quaternion {
    type Output = Self;

    /// Scales the components by -1.
    fn neg(self) -> Self::Output {
        Self::Output::new(-self.v, -self.w)
    }
}

impl Dot<Quaternion> for Quaternion {
    type Output = Float;

    /// Returns the inner product with another quaternion.
    ///
    /// * `other` - The other quaternion.
    fn dot(&self, other: &Quaternion) -> Float {
        self.v.dot(&other.v) + self.w * other.w
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::super::{point3, vector3, Transform};
    use super::*;
    use float_cmp::*;
    use proptest::prelude::*;

    fn assert_matrix_approx_eq(a: &Matrix4x4, b: &Matrix4x4) {
        for i in 0..4 {
            for j in 0..4 {
                assert!(
                    approx_eq!(Float, a.m[i][j], b.m[i][j], epsilon = 0.0001),
                    "{:?} != {:?}",
                    a,
                    b
                );
            }
        }
    }

    #[test]
    fn identity_quaternion_is_identity_matrix() {
        assert_eq!(Quaternion::default().to_matrix(), IDENTITY_MATRIX);
    }

    #[test]
    fn axis_angle_matches_rotate_axis() {
        let axis = vector3(1.0, -2.0, 0.5);
        for theta in [-170.0, -45.0, 0.0, 30.0, 90.0, 179.0] {
            let q = Quaternion::from_axis_angle(theta, &axis);
            assert_matrix_approx_eq(&q.to_matrix(), &Transform::rotate_axis(theta, &axis).m);
        }
    }

    #[test]
    fn slerp_halfway_about_z() {
        let q0 = Quaternion::default();
        let q1 = Quaternion::from_axis_angle(90.0, &vector3(0.0, 0.0, 1.0));
        let q = q0.slerp(0.5, q1);
        let p = Transform::new(q.to_matrix()).transform_point(&point3(1.0, 0.0, 0.0));
        let h = (0.5 as Float).sqrt();
        assert!(approx_eq!(Float, p.x, h, epsilon = 0.0001));
        assert!(approx_eq!(Float, p.y, h, epsilon = 0.0001));
    }

    proptest! {
        #[test]
        fn matrix_round_trip(
            theta in -179.0..179.0f32,
            x in -1.0..1.0f32, y in -1.0..1.0f32, z in 0.1..1.0f32,
        ) {
            let q = Quaternion::from_axis_angle(theta, &vector3(x, y, z));
            let r = Quaternion::from(&q.to_matrix());

            // q and -q are the same rotation.
            let s = if r.dot(&q) < 0.0 { -r } else { r };
            prop_assert!(approx_eq!(Float, s.w, q.w, epsilon = 0.001));
            prop_assert!(approx_eq!(Float, s.v.x, q.v.x, epsilon = 0.001));
            prop_assert!(approx_eq!(Float, s.v.y, q.v.y, epsilon = 0.001));
            prop_assert!(approx_eq!(Float, s.v.z, q.v.z, epsilon = 0.001));
        }

        #[test]
        fn slerp_endpoints(t0 in -179.0..179.0f32, t1 in -179.0..179.0f32) {
            let axis = vector3(0.3, 0.4, 0.5);
            let q0 = Quaternion::from_axis_angle(t0, &axis);
            let q1 = Quaternion::from_axis_angle(t1, &vector3(-0.2, 0.9, 0.1));
            let a = q0.slerp(0.0, q1);
            let b = q0.slerp(1.0, q1);
            prop_assert!(approx_eq!(Float, a.dot(&q0), 1.0, epsilon = 0.0001));
            prop_assert!(approx_eq!(Float, b.dot(&q1), 1.0, epsilon = 0.0001));
        }
    }
}
