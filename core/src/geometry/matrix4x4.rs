//! 4x4 Matrix

use super::{lerp, Float};
use std::ops::{Index, Mul};

/// A 4x4 matrix containing Float values. Affine transforms keep
/// `(0, 0, 0, 1)` in the bottom row; packed quaternion decompositions reuse
/// the otherwise constant slots.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Matrix4x4 {
    /// Stores a 2-D array of Float
    pub m: [[Float; 4]; 4],
}

/// Identity matrix.
pub const IDENTITY_MATRIX: Matrix4x4 = Matrix4x4 {
    m: [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ],
};

/// Create a 4x4 matrix using the following order of the parameters:
///
/// * `t00`, `t01`, `t02`, `t03` - Row 1
/// * `t10`, `t11`, `t12`, `t13` - Row 2
/// * `t20`, `t21`, `t22`, `t23` - Row 3
/// * `t30`, `t31`, `t32`, `t33` - Row 4
#[rustfmt::skip]
#[allow(clippy::too_many_arguments)]
pub fn matrix4x4(
    t00: Float, t01: Float, t02: Float, t03: Float,
    t10: Float, t11: Float, t12: Float, t13: Float,
    t20: Float, t21: Float, t22: Float, t23: Float,
    t30: Float, t31: Float, t32: Float, t33: Float,
) -> Matrix4x4 {
    Matrix4x4 {
        m: [
            [t00, t01, t02, t03],
            [t10, t11, t12, t13],
            [t20, t21, t22, t23],
            [t30, t31, t32, t33],
        ],
    }
}

impl Matrix4x4 {
    /// Returns true if every element is finite.
    pub fn is_finite(&self) -> bool {
        self.m.iter().flatten().all(|v| v.is_finite())
    }

    /// Returns the determinant of the upper-left 3x3 (linear) part.
    pub fn linear_determinant(&self) -> Float {
        let m = &self.m;
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    /// Returns the inverse of an affine matrix using the adjugate of its
    /// linear part. The bottom row is assumed to be `(0, 0, 0, 1)`.
    ///
    /// A singular linear part produces non-finite elements instead of a
    /// panic so that callers can detect it with `is_finite()`.
    #[rustfmt::skip]
    pub fn affine_inverse(&self) -> Matrix4x4 {
        let m = &self.m;
        let inv_det = 1.0 / self.linear_determinant();

        let a00 = (m[1][1] * m[2][2] - m[1][2] * m[2][1]) * inv_det;
        let a01 = (m[0][2] * m[2][1] - m[0][1] * m[2][2]) * inv_det;
        let a02 = (m[0][1] * m[1][2] - m[0][2] * m[1][1]) * inv_det;
        let a10 = (m[1][2] * m[2][0] - m[1][0] * m[2][2]) * inv_det;
        let a11 = (m[0][0] * m[2][2] - m[0][2] * m[2][0]) * inv_det;
        let a12 = (m[0][2] * m[1][0] - m[0][0] * m[1][2]) * inv_det;
        let a20 = (m[1][0] * m[2][1] - m[1][1] * m[2][0]) * inv_det;
        let a21 = (m[0][1] * m[2][0] - m[0][0] * m[2][1]) * inv_det;
        let a22 = (m[0][0] * m[1][1] - m[0][1] * m[1][0]) * inv_det;

        // Inverse translation is -A^-1 * t.
        let (tx, ty, tz) = (m[0][3], m[1][3], m[2][3]);
        matrix4x4(
            a00, a01, a02, -(a00 * tx + a01 * ty + a02 * tz),
            a10, a11, a12, -(a10 * tx + a11 * ty + a12 * tz),
            a20, a21, a22, -(a20 * tx + a21 * ty + a22 * tz),
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Returns the element-wise linear interpolation with another matrix.
    ///
    /// * `t`     - Interpolation parameter.
    /// * `other` - Matrix at `t = 1`.
    pub fn lerp(&self, t: Float, other: &Matrix4x4) -> Matrix4x4 {
        let mut r = *self;
        for i in 0..4 {
            for j in 0..4 {
                r.m[i][j] = lerp(t, self.m[i][j], other.m[i][j]);
            }
        }
        r
    }
}

impl Default for Matrix4x4 {
    /// Returns the default as identity matrix.
    fn default() -> Self {
        IDENTITY_MATRIX
    }
}

impl Mul<Matrix4x4> for Matrix4x4 {
    type Output = Matrix4x4;

    /// Post-multiply the given matrix.
    ///
    /// * `other` - The other matrix
    fn mul(self, other: Matrix4x4) -> Self::Output {
        let mut m = Matrix4x4::default();

        for i in 0..4 {
            for j in 0..4 {
                m.m[i][j] = self.m[i][0] * other.m[0][j]
                    + self.m[i][1] * other.m[1][j]
                    + self.m[i][2] * other.m[2][j]
                    + self.m[i][3] * other.m[3][j];
            }
        }

        m
    }
}

impl Index<usize> for Matrix4x4 {
    type Output = [Float; 4];

    /// Index the matrix row. The column can be further indexed from the
    /// returned result.
    ///
    /// * `row` - Row
    fn index(&self, row: usize) -> &Self::Output {
        assert!(row < 4, "matrix row not in [0, 3]");
        &self.m[row]
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;
    use proptest::prelude::*;

    #[test]
    fn affine_inverse_of_identity_is_identity() {
        assert_eq!(IDENTITY_MATRIX.affine_inverse(), IDENTITY_MATRIX);
    }

    #[test]
    fn affine_inverse_of_singular_matrix_is_not_finite() {
        let mut m = IDENTITY_MATRIX;
        m.m[1][1] = 0.0;
        assert_eq!(m.linear_determinant(), 0.0);
        assert!(!m.affine_inverse().is_finite());
    }

    #[test]
    fn lerp_endpoints() {
        let mut a = IDENTITY_MATRIX;
        a.m[0][3] = 10.0;
        assert_eq!(IDENTITY_MATRIX.lerp(0.0, &a), IDENTITY_MATRIX);
        assert_eq!(IDENTITY_MATRIX.lerp(1.0, &a), a);
        assert_eq!(IDENTITY_MATRIX.lerp(0.5, &a).m[0][3], 5.0);
    }

    proptest! {
        #[test]
        fn affine_inverse_returns_inverse_when_non_singular(
            a in 0.5..10.0f32, b in 0.5..10.0f32, c in 0.5..10.0f32,
            s in -1.0..1.0f32, tx in -10.0..10.0f32, ty in -10.0..10.0f32, tz in -10.0..10.0f32,
        ) {
            let mat = matrix4x4(
                  a,   s, 0.0,  tx,
                0.0,   b,   s,  ty,
                0.0, 0.0,   c,  tz,
                0.0, 0.0, 0.0, 1.0,
            );

            let prod = mat * mat.affine_inverse();
            for j in 0..4 {
                for i in 0..4 {
                    prop_assert!(approx_eq!(
                            Float,
                            prod.m[i][j],
                            IDENTITY_MATRIX.m[i][j],
                            epsilon = 0.001
                    ));
                }
            }

            let prod = mat.affine_inverse() * mat;
            for j in 0..4 {
                for i in 0..4 {
                    prop_assert!(approx_eq!(
                            Float,
                            prod.m[i][j],
                            IDENTITY_MATRIX.m[i][j],
                            epsilon = 0.001
                    ));
                }
            }
        }
    }
}
