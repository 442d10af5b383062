//! Motion Derivative

use super::common::*;
use super::{
    clamp, packed_quaternion, packed_scale_shift, packed_translation, Float, Interval,
    Matrix4x4, MotionEquation, Point3f, Vector3f,
};

/// Rotation angles below this are treated as no rotation.
const MIN_ROTATION_ANGLE: Float = 1e-4;

/// Bisection depth used when searching for zeros of the motion derivative.
const ZERO_SEARCH_DEPTH: usize = 8;

/// DerivativeTerm encapsulates the coefficients `ki` to bound the motion of a
/// point `p`.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct DerivativeTerm {
    pub kc: Float,
    pub kx: Float,
    pub ky: Float,
    pub kz: Float,
}

impl DerivativeTerm {
    /// Return the coefficient `kc + kx p.x + ky p.y + kz p.z`.
    ///
    /// * `p` - The point.
    pub fn eval(&self, p: &Point3f) -> Float {
        self.kc + self.kx * p.x + self.ky * p.y + self.kz * p.z
    }
}

/// Coefficients of the derivative of a point's motion along one time segment
/// between two packed quaternion decompositions. For segment parameter
/// `u ∈ [0, 1]` the derivative along each axis is
///
/// `c1 + (c2 + c3 u) cos(2θu) + (c4 + c5 u) sin(2θu)`
///
/// where every `ci` is affine in the point.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct MotionDerivativeCoefficients {
    /// Rotation angle θ between the two keys; 0 if there is no rotation.
    pub theta: Float,

    /// Terms `c1..c5` per axis.
    pub c: [[DerivativeTerm; 3]; 5],
}

impl MotionDerivativeCoefficients {
    /// Computes the coefficients for the segment between two packed
    /// decompositions.
    ///
    /// * `m0` - Packed decomposition at the start of the segment.
    /// * `m1` - Packed decomposition at the end of the segment.
    pub fn new(m0: &Matrix4x4, m1: &Matrix4x4) -> Self {
        let q0 = packed_quaternion(m0);
        let q1 = packed_quaternion(m1);

        // Positions before rotation are `a + u b` with `a = S0 p` and
        // `b = (S1 - S0) p`.
        let s0 = packed_scale_shift(m0);
        let ds = combine(&packed_scale_shift(m1), 1.0, &s0, -1.0);
        let d1 = packed_translation(m1) - packed_translation(m0);

        let cos_theta = q0.dot(&q1);
        let theta = clamp(cos_theta, -1.0, 1.0).acos();

        let mut c = [[DerivativeTerm::default(); 3]; 5];
        if theta < MIN_ROTATION_ANGLE || !theta.is_finite() {
            let r = linear_part(&q0.to_matrix());
            c[0] = terms(&(r * ds), &d1);
            return Self { theta: 0.0, c };
        }

        let qperp = (q1 - q0 * cos_theta).normalize();
        let r0 = linear_part(&q0.to_matrix());
        let rp = linear_part(&qperp.to_matrix());
        let rs = linear_part(&(q0 + qperp).to_matrix());

        // R(u) = Rc + Rcos cos(2θu) + Rsin sin(2θu)
        let r_c = combine(&r0, 0.5, &rp, 0.5);
        let r_cos = combine(&r0, 0.5, &rp, -0.5);
        let r_sin = combine(&combine(&rs, 0.5, &r0, -0.5), 1.0, &rp, -0.5);

        let a = linear_part_with_shift(&s0);
        let two_theta = 2.0 * theta;
        let zero = Vector3f::zero();

        c[0] = terms(&(r_c * ds), &d1);
        c[1] = terms(&combine(&(r_cos * ds), 1.0, &(r_sin * a), two_theta), &zero);
        c[2] = terms(&scaled(&(r_sin * ds), two_theta), &zero);
        c[3] = terms(&combine(&(r_sin * ds), 1.0, &(r_cos * a), -two_theta), &zero);
        c[4] = terms(&scaled(&(r_cos * ds), -two_theta), &zero);

        Self { theta, c }
    }

    /// Returns the derivative function of a point along one axis with a
    /// constant slope subtracted.
    ///
    /// * `p`     - The point.
    /// * `axis`  - The axis.
    /// * `slope` - Constant subtracted from the derivative.
    pub fn equation(&self, p: &Point3f, axis: usize, slope: Float) -> MotionEquation {
        let mut c = [0.0; 5];
        for (ci, terms) in c.iter_mut().zip(self.c.iter()) {
            *ci = terms[axis].eval(p);
        }
        c[0] -= slope;
        MotionEquation {
            c,
            theta: self.theta,
        }
    }

    /// Finds the segment parameters in `[0, 1]` where the derivative of `p`
    /// along `axis` equals `slope`. Returns the number of zeros written.
    ///
    /// * `p`     - The point.
    /// * `axis`  - The axis.
    /// * `slope` - The slope in segment parameter units.
    /// * `zeros` - Buffer receiving the zeros.
    pub fn find_zeros(&self, p: &Point3f, axis: usize, slope: Float, zeros: &mut [Float]) -> usize {
        let mut count = 0;
        let f = self.equation(p, axis, slope);
        Interval::new(0.0, 1.0).find_zeros(&f, zeros, &mut count, ZERO_SEARCH_DEPTH);
        count
    }
}

/// Returns `wa a + wb b` element-wise.
fn combine(a: &Matrix4x4, wa: Float, b: &Matrix4x4, wb: Float) -> Matrix4x4 {
    let mut r = *a;
    for i in 0..4 {
        for j in 0..4 {
            r.m[i][j] = wa * a.m[i][j] + wb * b.m[i][j];
        }
    }
    r
}

fn scaled(a: &Matrix4x4, s: Float) -> Matrix4x4 {
    combine(a, s, a, 0.0)
}

/// Returns the upper-left 3x3 block, every other element zero.
fn linear_part(a: &Matrix4x4) -> Matrix4x4 {
    let mut r = Matrix4x4 { m: [[0.0; 4]; 4] };
    for i in 0..3 {
        r.m[i][..3].copy_from_slice(&a.m[i][..3]);
    }
    r
}

/// Returns the upper 3x4 block, the bottom row zero.
fn linear_part_with_shift(a: &Matrix4x4) -> Matrix4x4 {
    let mut r = *a;
    r.m[3] = [0.0; 4];
    r
}

/// Splits the rows of an affine map into per-axis terms, adding a constant.
fn terms(a: &Matrix4x4, constant: &Vector3f) -> [DerivativeTerm; 3] {
    let mut t = [DerivativeTerm::default(); 3];
    for (axis, term) in t.iter_mut().enumerate() {
        *term = DerivativeTerm {
            kc: a.m[axis][3] + constant[axis],
            kx: a.m[axis][0],
            ky: a.m[axis][1],
            kz: a.m[axis][2],
        };
    }
    t
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
