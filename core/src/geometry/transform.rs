//! Transformations

use super::{matrix4x4, point3, Bounds3f, Float, Matrix4x4, Point3f, Union, Vector3f};
use std::ops::Mul;

/// An affine transformation for mapping from points to points and vectors to
/// vectors, stored together with its inverse.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Transform {
    /// The transformation matrix.
    pub m: Matrix4x4,

    /// The inverse transformation matrix.
    pub m_inv: Matrix4x4,
}

impl Transform {
    /// Create a transformation from an affine matrix. The inverse is not
    /// finite when the linear part is singular.
    ///
    /// * `m` - The matrix.
    pub fn new(m: Matrix4x4) -> Self {
        Self {
            m,
            m_inv: m.affine_inverse(),
        }
    }

    /// Create a transformation representing a translation.
    ///
    /// * `delta` -  Translation.
    #[rustfmt::skip]
    pub fn translate(delta: &Vector3f) -> Self {
        Self {
            m: matrix4x4(
                1.0, 0.0, 0.0, delta.x,
                0.0, 1.0, 0.0, delta.y,
                0.0, 0.0, 1.0, delta.z,
                0.0, 0.0, 0.0, 1.0,
            ),
            m_inv: matrix4x4(
                1.0, 0.0, 0.0, -delta.x,
                0.0, 1.0, 0.0, -delta.y,
                0.0, 0.0, 1.0, -delta.z,
                0.0, 0.0, 0.0,  1.0,
            ),
        }
    }

    /// Create a transformation representing a scale.
    ///
    /// * `x` -  Scaling factor in x-axis.
    /// * `y` -  Scaling factor in y-axis.
    /// * `z` -  Scaling factor in z-axis.
    #[rustfmt::skip]
    pub fn scale(x: Float, y: Float, z: Float) -> Self {
        Self {
            m: matrix4x4(
                x,   0.0, 0.0, 0.0,
                0.0, y,   0.0, 0.0,
                0.0, 0.0, z,   0.0,
                0.0, 0.0, 0.0, 1.0,
            ),
            m_inv: matrix4x4(
                1.0 / x, 0.0,     0.0,     0.0,
                0.0,     1.0 / y, 0.0,     0.0,
                0.0,     0.0,     1.0 / z, 0.0,
                0.0,     0.0,     0.0,     1.0,
            ),
        }
    }

    /// Create a transformation representing rotation about the z-axis.
    ///
    /// * `theta` -  Angle in degrees.
    #[rustfmt::skip]
    pub fn rotate_z(theta: Float) -> Self {
        let r = theta.to_radians();
        let sin_theta = r.sin();
        let cos_theta = r.cos();
        let m = matrix4x4(
            cos_theta, -sin_theta, 0.0, 0.0,
            sin_theta,  cos_theta, 0.0, 0.0,
            0.0,        0.0,       1.0, 0.0,
            0.0,        0.0,       0.0, 1.0,
        );
        Self { m, m_inv: m.transpose3x3() }
    }

    /// Create a transformation representing rotation about a vector.
    ///
    /// * `theta` - Angle in degrees.
    /// * `axis`  - Vector.
    pub fn rotate_axis(theta: Float, axis: &Vector3f) -> Self {
        let a = axis.normalize();
        let r = theta.to_radians();
        let sin_theta = r.sin();
        let cos_theta = r.cos();
        let mut m = Matrix4x4::default();

        // Compute rotation of first basis vector
        m.m[0][0] = a.x * a.x + (1.0 - a.x * a.x) * cos_theta;
        m.m[0][1] = a.x * a.y * (1.0 - cos_theta) - a.z * sin_theta;
        m.m[0][2] = a.x * a.z * (1.0 - cos_theta) + a.y * sin_theta;

        // Compute rotations of second and third basis vectors
        m.m[1][0] = a.x * a.y * (1.0 - cos_theta) + a.z * sin_theta;
        m.m[1][1] = a.y * a.y + (1.0 - a.y * a.y) * cos_theta;
        m.m[1][2] = a.y * a.z * (1.0 - cos_theta) - a.x * sin_theta;

        m.m[2][0] = a.x * a.z * (1.0 - cos_theta) - a.y * sin_theta;
        m.m[2][1] = a.y * a.z * (1.0 - cos_theta) + a.x * sin_theta;
        m.m[2][2] = a.z * a.z + (1.0 - a.z * a.z) * cos_theta;

        Self {
            m,
            m_inv: m.transpose3x3(),
        }
    }

    /// Returns the inverse transformation.
    pub fn inverse(&self) -> Transform {
        Transform {
            m: self.m_inv,
            m_inv: self.m,
        }
    }

    /// Returns true if the matrix and its inverse are finite. This fails for
    /// transformations with a singular linear part.
    pub fn is_finite(&self) -> bool {
        self.m.is_finite() && self.m_inv.is_finite()
    }

    /// Applies transformation to a given point.
    ///
    /// * `p` - The point.
    pub fn transform_point(&self, p: &Point3f) -> Point3f {
        let m = &self.m;
        point3(
            m[0][0] * p.x + m[0][1] * p.y + m[0][2] * p.z + m[0][3],
            m[1][0] * p.x + m[1][1] * p.y + m[1][2] * p.z + m[1][3],
            m[2][0] * p.x + m[2][1] * p.y + m[2][2] * p.z + m[2][3],
        )
    }

    /// Applies transformation to a bounding box by transforming its eight
    /// corners. Invalid boxes and non-finite transformations produce an
    /// empty box.
    ///
    /// * `b` - The bounding box.
    pub fn transform_bounds(&self, b: &Bounds3f) -> Bounds3f {
        if !b.is_valid() || !self.is_finite() {
            return Bounds3f::EMPTY;
        }

        (0..8u8).fold(Bounds3f::EMPTY, |bounds, corner| {
            bounds.union(&self.transform_point(&b.corner(corner)))
        })
    }
}

impl Matrix4x4 {
    /// Returns the matrix with the linear part transposed; the inverse of a
    /// pure rotation.
    fn transpose3x3(&self) -> Matrix4x4 {
        let mut t = *self;
        for i in 0..3 {
            for j in 0..3 {
                t.m[i][j] = self.m[j][i];
            }
        }
        t
    }
}

impl From<Matrix4x4> for Transform {
    /// Create a transformation from an affine matrix.
    ///
    /// * `m` - The matrix.
    fn from(m: Matrix4x4) -> Self {
        Self::new(m)
    }
}

impl Mul<Transform> for Transform {
    type Output = Transform;

    /// Composes this transformation with another one. The result applies
    /// `t2` first.
    ///
    /// * `t2` - The second transformation.
    fn mul(self, t2: Transform) -> Self::Output {
        Transform {
            m: self.m * t2.m,
            m_inv: t2.m_inv * self.m_inv,
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
