//! Quaternion Decomposition

use super::{vector3, Float, Matrix4x4, Quaternion, Transform, Vector3f, IDENTITY_MATRIX};

/// An affine transformation split into a scale/skew/shift part `M`, a
/// rotation `R` and a translation `T`, applied as `T · R · M`. Interpolating
/// the rotation as a quaternion keeps rotating motion on its arc.
///
/// Packed into a `Matrix4x4` the parts occupy:
///
/// ```text
/// | scale.x  skew.xy  skew.xz  shift.x |
/// | trans.x  scale.y  skew.yz  shift.y |
/// | trans.y  trans.z  scale.z  shift.z |
/// | quat.i   quat.j   quat.k   quat.r  |
/// ```
///
/// The identity matrix packs the identity decomposition.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct QuaternionDecomposition {
    /// Scale along each axis.
    pub scale: Vector3f,

    /// Skew `xy`, `xz` and `yz` (the strictly upper triangle of `M`).
    pub skew: Vector3f,

    /// Shift applied before the rotation.
    pub shift: Vector3f,

    /// Translation applied after the rotation.
    pub translation: Vector3f,

    /// The rotation as a unit quaternion.
    pub quaternion: Quaternion,
}

impl Default for QuaternionDecomposition {
    /// Returns the identity decomposition.
    fn default() -> Self {
        Self {
            scale: vector3(1.0, 1.0, 1.0),
            skew: Vector3f::zero(),
            shift: Vector3f::zero(),
            translation: Vector3f::zero(),
            quaternion: Quaternion::default(),
        }
    }
}

impl QuaternionDecomposition {
    /// Returns the decomposition with the given scale.
    ///
    /// * `x` - Scale along the x-axis.
    /// * `y` - Scale along the y-axis.
    /// * `z` - Scale along the z-axis.
    pub fn with_scale(mut self, x: Float, y: Float, z: Float) -> Self {
        self.scale = vector3(x, y, z);
        self
    }

    /// Returns the decomposition with the given skew.
    ///
    /// * `xy` - Skew of x by y.
    /// * `xz` - Skew of x by z.
    /// * `yz` - Skew of y by z.
    pub fn with_skew(mut self, xy: Float, xz: Float, yz: Float) -> Self {
        self.skew = vector3(xy, xz, yz);
        self
    }

    /// Returns the decomposition with the given shift.
    ///
    /// * `shift` - Shift applied before the rotation.
    pub fn with_shift(mut self, shift: Vector3f) -> Self {
        self.shift = shift;
        self
    }

    /// Returns the decomposition with the given translation.
    ///
    /// * `translation` - Translation applied after the rotation.
    pub fn with_translation(mut self, translation: Vector3f) -> Self {
        self.translation = translation;
        self
    }

    /// Returns the decomposition with the given rotation. The quaternion is
    /// normalized; a zero quaternion is replaced by the identity rotation.
    ///
    /// * `q` - The rotation.
    pub fn with_quaternion(mut self, q: Quaternion) -> Self {
        let l = q.length();
        self.quaternion = if l > 0.0 && l.is_finite() {
            q / l
        } else {
            warn!("Ignoring degenerate rotation quaternion {}.", q);
            Quaternion::default()
        };
        self
    }

    /// Returns the decomposition packed into a matrix.
    #[rustfmt::skip]
    pub fn pack(&self) -> Matrix4x4 {
        let (s, k, h, t, q) = (self.scale, self.skew, self.shift, self.translation, self.quaternion);
        Matrix4x4 {
            m: [
                [s.x, k.x, k.y, h.x],
                [t.x, s.y, k.z, h.y],
                [t.y, t.z, s.z, h.z],
                [q.v.x, q.v.y, q.v.z, q.w],
            ],
        }
    }

    /// Returns the decomposition stored in a packed matrix.
    ///
    /// * `packed` - The packed matrix.
    pub fn unpack(packed: &Matrix4x4) -> Self {
        let m = &packed.m;
        Self {
            scale: vector3(m[0][0], m[1][1], m[2][2]),
            skew: vector3(m[0][1], m[0][2], m[1][2]),
            shift: vector3(m[0][3], m[1][3], m[2][3]),
            translation: packed_translation(packed),
            quaternion: packed_quaternion(packed),
        }
    }

    /// Returns the affine matrix `T · R · M`.
    pub fn to_affine(&self) -> Matrix4x4 {
        quaternion_decomposition_to_affine(&self.pack())
    }
}

/// Returns the rotation stored in a packed decomposition.
///
/// * `m` - The packed matrix.
pub fn packed_quaternion(m: &Matrix4x4) -> Quaternion {
    Quaternion::new(vector3(m.m[3][0], m.m[3][1], m.m[3][2]), m.m[3][3])
}

/// Returns the translation stored in a packed decomposition.
///
/// * `m` - The packed matrix.
pub fn packed_translation(m: &Matrix4x4) -> Vector3f {
    vector3(m.m[1][0], m.m[2][0], m.m[2][1])
}

/// Returns the scale/skew/shift matrix `M` of a packed decomposition: the
/// translation and rotation slots are cleared.
///
/// * `m` - The packed matrix.
pub fn packed_scale_shift(m: &Matrix4x4) -> Matrix4x4 {
    let mut s = *m;
    s.m[1][0] = 0.0;
    s.m[2][0] = 0.0;
    s.m[2][1] = 0.0;
    s.m[3] = IDENTITY_MATRIX.m[3];
    s
}

/// Decodes a packed quaternion decomposition into the affine matrix
/// `T · R · M`.
///
/// * `m` - The packed matrix.
pub fn quaternion_decomposition_to_affine(m: &Matrix4x4) -> Matrix4x4 {
    let d = Transform::translate(&packed_translation(m)).m;
    let r = packed_quaternion(m).to_matrix();
    d * r * packed_scale_shift(m)
}

/// Interpolates two packed decompositions and returns the affine matrix.
/// Scale, skew, shift and translation are interpolated linearly and the
/// rotation spherically.
///
/// * `t`  - Interpolation parameter.
/// * `m0` - Packed matrix at `t = 0`.
/// * `m1` - Packed matrix at `t = 1`.
pub fn slerp_quaternion_decomposition(t: Float, m0: &Matrix4x4, m1: &Matrix4x4) -> Matrix4x4 {
    let q = packed_quaternion(m0).slerp(t, packed_quaternion(m1));
    let mut m = m0.lerp(t, m1);
    m.m[3] = [q.v.x, q.v.y, q.v.z, q.w];
    quaternion_decomposition_to_affine(&m)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::super::{matrix4x4, point3, Vector3};
    use super::*;
    use float_cmp::*;
    use proptest::prelude::*;

    fn assert_matrix_approx_eq(a: &Matrix4x4, b: &Matrix4x4, epsilon: Float) {
        for i in 0..4 {
            for j in 0..4 {
                assert!(
                    approx_eq!(Float, a.m[i][j], b.m[i][j], epsilon = epsilon),
                    "{:?} != {:?}",
                    a,
                    b
                );
            }
        }
    }

    prop_vector3!(
        vector3_f32,
        f32,
        -10.0..10.0f32,
        -10.0..10.0f32,
        -10.0..10.0f32
    );

    #[test]
    fn identity_packs_to_identity() {
        let qd = QuaternionDecomposition::default();
        assert_eq!(qd.pack(), IDENTITY_MATRIX);
        assert_eq!(quaternion_decomposition_to_affine(&IDENTITY_MATRIX), IDENTITY_MATRIX);
        assert_eq!(QuaternionDecomposition::unpack(&IDENTITY_MATRIX), qd);
    }

    #[test]
    fn degenerate_quaternion_falls_back_to_identity() {
        let qd = QuaternionDecomposition::default()
            .with_quaternion(Quaternion::new(Vector3f::zero(), 0.0));
        assert_eq!(qd.quaternion, Quaternion::default());
    }

    #[test]
    fn translation_only() {
        let qd = QuaternionDecomposition::default().with_translation(vector3(10.0, -2.0, 3.0));
        let a = qd.to_affine();
        assert_eq!(
            Transform::new(a).transform_point(&point3(1.0, 1.0, 1.0)),
            point3(11.0, -1.0, 4.0)
        );
    }

    #[test]
    fn slerp_quarter_turn_stays_on_arc() {
        let m0 = QuaternionDecomposition::default().pack();
        let m1 = QuaternionDecomposition::default()
            .with_quaternion(Quaternion::from_axis_angle(180.0, &vector3(0.0, 0.0, 1.0)))
            .pack();
        let a = slerp_quaternion_decomposition(0.5, &m0, &m1);
        let p = Transform::new(a).transform_point(&point3(2.0, 0.0, 0.0));

        // Halfway through a half turn about z a point at radius 2 is at (0, 2).
        assert!(approx_eq!(Float, p.x, 0.0, epsilon = 0.0001));
        assert!(approx_eq!(Float, p.y, 2.0, epsilon = 0.0001));
    }

    proptest! {
        #[test]
        fn decoded_matrix_is_translation_rotation_scale_shift(
            t in vector3_f32(),
            h in vector3_f32(),
            theta in -179.0..179.0f32,
            sx in 0.1..4.0f32, sy in 0.1..4.0f32, sz in 0.1..4.0f32,
            kxy in -1.0..1.0f32, kxz in -1.0..1.0f32, kyz in -1.0..1.0f32,
        ) {
            let q = Quaternion::from_axis_angle(theta, &vector3(0.2, -0.7, 0.4));
            let qd = QuaternionDecomposition::default()
                .with_scale(sx, sy, sz)
                .with_skew(kxy, kxz, kyz)
                .with_shift(h)
                .with_translation(t)
                .with_quaternion(q);

            let m = matrix4x4(
                 sx, kxy, kxz, h.x,
                0.0,  sy, kyz, h.y,
                0.0, 0.0,  sz, h.z,
                0.0, 0.0, 0.0, 1.0,
            );
            let expected = (Transform::translate(&t) * Transform::new(q.to_matrix()) * Transform::new(m)).m;
            assert_matrix_approx_eq(&qd.to_affine(), &expected, 0.001);
        }

        #[test]
        fn unpack_reverses_pack(
            t in vector3_f32(),
            h in vector3_f32(),
            theta in -179.0..179.0f32,
        ) {
            let qd = QuaternionDecomposition::default()
                .with_scale(1.0, 2.0, 3.0)
                .with_skew(0.1, 0.2, 0.3)
                .with_shift(h)
                .with_translation(t)
                .with_quaternion(Quaternion::from_axis_angle(theta, &vector3(1.0, 0.0, 0.0)));
            prop_assert_eq!(QuaternionDecomposition::unpack(&qd.pack()), qd);
        }

        #[test]
        fn slerp_reproduces_endpoints(
            t0 in vector3_f32(),
            t1 in vector3_f32(),
            theta0 in -90.0..90.0f32,
            theta1 in -90.0..90.0f32,
        ) {
            let axis = vector3(0.0, 1.0, 1.0);
            let qd0 = QuaternionDecomposition::default()
                .with_translation(t0)
                .with_quaternion(Quaternion::from_axis_angle(theta0, &axis));
            let qd1 = QuaternionDecomposition::default()
                .with_scale(2.0, 1.0, 0.5)
                .with_translation(t1)
                .with_quaternion(Quaternion::from_axis_angle(theta1, &axis));
            let (m0, m1) = (qd0.pack(), qd1.pack());

            assert_matrix_approx_eq(&slerp_quaternion_decomposition(0.0, &m0, &m1), &qd0.to_affine(), 0.001);
            assert_matrix_approx_eq(&slerp_quaternion_decomposition(1.0, &m0, &m1), &qd1.to_affine(), 0.001);
        }
    }
}
