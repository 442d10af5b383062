//! Bezier Curves

use crate::bezier_basis::*;
use rtcore::geometry::*;
use rtcore::pbrt::*;
use rtcore::{stat_counter, stat_inc, stat_register_fns};
use std::fmt;
use std::ops::{Add, Mul, Sub};

stat_counter!(
    "Curves/Bounds evaluations",
    CURVE_BOUNDS_EVALS,
    curve_stats_bounds_evals
);

stat_register_fns!(curve_stats_bounds_evals);

/// Number of samples used by `accurate_bounds()`.
const ACCURATE_BOUNDS_SEGMENTS: usize = 7;

/// Operations a curve vertex supports: sums, differences and scaling.
pub trait CurveVertex:
    Copy + Default + Add<Output = Self> + Sub<Output = Self> + Mul<Float, Output = Self>
{
}

impl<V> CurveVertex for V where
    V: Copy + Default + Add<Output = V> + Sub<Output = V> + Mul<Float, Output = V>
{
}

/// A cubic Bezier curve given by four control vertices.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct BezierCurve<V> {
    pub v0: V,
    pub v1: V,
    pub v2: V,
    pub v3: V,
}

/// A curve whose vertices hold the position in `xyz` and the radius in `w`.
pub type BezierCurve4f = BezierCurve<Vector4f>;

impl<V: CurveVertex> BezierCurve<V>
where
    Float: Mul<V, Output = V>,
{
    /// Create a new curve.
    ///
    /// * `v0` - First control vertex; the curve starts here.
    /// * `v1` - Second control vertex.
    /// * `v2` - Third control vertex.
    /// * `v3` - Fourth control vertex; the curve ends here.
    pub fn new(v0: V, v1: V, v2: V, v3: V) -> Self {
        register_stats();
        Self { v0, v1, v2, v3 }
    }

    /// Returns the start point.
    pub fn begin(&self) -> V {
        self.v0
    }

    /// Returns the end point.
    pub fn end(&self) -> V {
        self.v3
    }

    /// Returns the weighted sum of the control vertices.
    fn combine(&self, b: [Float; 4]) -> V {
        self.v0 * b[0] + self.v1 * b[1] + self.v2 * b[2] + self.v3 * b[3]
    }

    /// Returns the point at `t`.
    ///
    /// * `t` - Curve parameter.
    pub fn eval(&self, t: Float) -> V {
        self.combine(BezierBasis::eval(t))
    }

    /// Returns the first derivative at `t`.
    ///
    /// * `t` - Curve parameter.
    pub fn eval_du(&self, t: Float) -> V {
        self.combine(BezierBasis::derivative(t))
    }

    /// Returns the second derivative at `t`.
    ///
    /// * `t` - Curve parameter.
    pub fn eval_dudu(&self, t: Float) -> V {
        self.combine(BezierBasis::derivative2(t))
    }

    /// Returns the point and the first and second derivatives at `t`. The
    /// point and first derivative come from de Casteljau subdivision.
    ///
    /// * `t` - Curve parameter.
    pub fn eval_all(&self, t: Float) -> (V, V, V) {
        let (p20, p21) = self.de_casteljau(t);
        (lerp(t, p20, p21), (p21 - p20) * 3.0, self.eval_dudu(t))
    }

    /// Returns the points and first derivatives for a batch of parameters.
    ///
    /// * `t` - Curve parameters.
    pub fn eval_lanes<const M: usize>(&self, t: &[Float; M]) -> ([V; M], [V; M]) {
        let mut p = [V::default(); M];
        let mut dp = [V::default(); M];
        for (i, ti) in t.iter().enumerate() {
            let (p20, p21) = self.de_casteljau(*ti);
            p[i] = lerp(*ti, p20, p21);
            dp[i] = (p21 - p20) * 3.0;
        }
        (p, dp)
    }

    /// Returns the two points of the second de Casteljau level.
    fn de_casteljau(&self, t: Float) -> (V, V) {
        let p10 = lerp(t, self.v0, self.v1);
        let p11 = lerp(t, self.v1, self.v2);
        let p12 = lerp(t, self.v2, self.v3);
        (lerp(t, p10, p11), lerp(t, p11, p12))
    }

    /// Returns `M` points at consecutive samples of the `BEZIER_BASIS0` table.
    ///
    /// * `ofs`  - First sample index.
    /// * `size` - Tessellation rate.
    pub fn eval0<const M: usize>(&self, ofs: usize, size: usize) -> [V; M] {
        self.eval_table(&BEZIER_BASIS0.c, ofs, size)
    }

    /// Returns `M` points at consecutive samples of the `BEZIER_BASIS1` table.
    ///
    /// * `ofs`  - First sample index.
    /// * `size` - Tessellation rate.
    pub fn eval1<const M: usize>(&self, ofs: usize, size: usize) -> [V; M] {
        self.eval_table(&BEZIER_BASIS1.c, ofs, size)
    }

    /// Returns `M` derivatives at consecutive samples of the `BEZIER_BASIS0`
    /// table.
    ///
    /// * `ofs`  - First sample index.
    /// * `size` - Tessellation rate.
    pub fn derivative0<const M: usize>(&self, ofs: usize, size: usize) -> [V; M] {
        self.eval_table(&BEZIER_BASIS0.d, ofs, size)
    }

    /// Returns `M` derivatives at consecutive samples of the `BEZIER_BASIS1`
    /// table.
    ///
    /// * `ofs`  - First sample index.
    /// * `size` - Tessellation rate.
    pub fn derivative1<const M: usize>(&self, ofs: usize, size: usize) -> [V; M] {
        self.eval_table(&BEZIER_BASIS1.d, ofs, size)
    }

    /// Weights the control vertices by table row `size` starting at column
    /// `ofs`. Lanes past the last column are zero.
    fn eval_table<const M: usize>(&self, table: &[BasisTable; 4], ofs: usize, size: usize) -> [V; M] {
        assert!(
            size <= PrecomputedBezierBasis::N,
            "tessellation rate {} > {}",
            size,
            PrecomputedBezierBasis::N
        );
        assert!(ofs <= size, "sample offset {} > tessellation rate {}", ofs, size);

        let mut r = [V::default(); M];
        for (lane, j) in (ofs..=PrecomputedBezierBasis::N).take(M).enumerate() {
            r[lane] = self.combine([
                table[0][size][j],
                table[1][size][j],
                table[2][size][j],
                table[3][size][j],
            ]);
        }
        r
    }
}

impl BezierCurve4f {
    /// Returns bounds that enclose the swept volume of the curve. The curve is
    /// sampled with tangent offsets at each sample so that the bounds contain
    /// the control polygon of every span between samples. The box is expanded
    /// by the largest radius found.
    pub fn accurate_bounds(&self) -> Bounds3f {
        stat_inc!(CURVE_BOUNDS_EVALS, 1);

        const N: usize = ACCURATE_BOUNDS_SEGMENTS;
        let scale = 1.0 / (3.0 * (N - 1) as Float);
        let p: [Vector4f; N + 1] = self.eval0(0, N);
        let dp: [Vector4f; N + 1] = self.derivative0(0, N);

        let mut b = Bounds3f::EMPTY;
        let mut r_max: Float = 0.0;
        for i in 0..=N {
            let pm = if i != 0 { p[i] - scale * dp[i] } else { p[i] };
            let pp = if i != N { p[i] + scale * dp[i] } else { p[i] };
            for v in [p[i], pm, pp] {
                b = b.union(&v.xyz());
                r_max = max(r_max, v.abs_w());
            }
        }
        b.expand(r_max)
    }

    /// Returns bounds that enclose the curve tessellated into `segments` line
    /// segments with the sampled radii.
    ///
    /// * `segments` - Number of line segments; at most
    ///                `PrecomputedBezierBasis::N`.
    pub fn tessellated_bounds(&self, segments: usize) -> Bounds3f {
        stat_inc!(CURVE_BOUNDS_EVALS, 1);

        let mut b = Bounds3f::from(self.v3.xyz());
        let mut r_max = self.v3.abs_w();
        if segments == 4 {
            let p: [Vector4f; 4] = self.eval0(0, 4);
            for v in p {
                b = b.union(&v.xyz());
                r_max = max(r_max, v.abs_w());
            }
        } else {
            const LANES: usize = 4;
            for i in (0..segments).step_by(LANES) {
                let p: [Vector4f; LANES] = self.eval0(i, segments);
                for v in p.iter().take(segments - i) {
                    b = b.union(&v.xyz());
                    r_max = max(r_max, v.abs_w());
                }
            }
        }
        b.expand(r_max)
    }
}

impl<V: fmt::Display> fmt::Display for BezierCurve<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BezierCurve {{ v0 = {}, v1 = {}, v2 = {}, v3 = {} }}",
            self.v0, self.v1, self.v2, self.v3
        )
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

    prop_compose! {
        fn vertex()(
            x in -10.0..10.0f32,
            y in -10.0..10.0f32,
            z in -10.0..10.0f32,
            w in 0.01..1.0f32,
        ) -> Vector4f {
            vector4(x, y, z, w)
        }
    }

    prop_compose! {
        fn curve()(v0 in vertex(), v1 in vertex(), v2 in vertex(), v3 in vertex()) -> BezierCurve4f {
            BezierCurve::new(v0, v1, v2, v3)
        }
    }

    fn assert_vertex_approx_eq(a: &Vector4f, b: &Vector4f, epsilon: Float) {
        assert!(
            approx_eq!(Float, a.x, b.x, epsilon = epsilon)
                && approx_eq!(Float, a.y, b.y, epsilon = epsilon)
                && approx_eq!(Float, a.z, b.z, epsilon = epsilon)
                && approx_eq!(Float, a.w, b.w, epsilon = epsilon),
            "{} != {}",
            a,
            b
        );
    }

    fn line(r: Float) -> BezierCurve4f {
        BezierCurve::new(
            vector4(0.0, 0.0, 0.0, r),
            vector4(1.0, 2.0, -1.0, r),
            vector4(2.0, 4.0, -2.0, r),
            vector4(3.0, 6.0, -3.0, r),
        )
    }

    #[test]
    fn straight_line_tessellated_bounds() {
        let b = line(0.5).tessellated_bounds(4);
        let expected = [(-0.5, -0.5, -3.5), (3.5, 6.5, 0.5)];
        for (p, e) in [(b.p_min, expected[0]), (b.p_max, expected[1])] {
            assert!(approx_eq!(Float, p.x, e.0, epsilon = 1e-5), "{}", b);
            assert!(approx_eq!(Float, p.y, e.1, epsilon = 1e-5), "{}", b);
            assert!(approx_eq!(Float, p.z, e.2, epsilon = 1e-5), "{}", b);
        }
    }

    #[test]
    fn straight_line_general_path_matches_fast_path() {
        let c = line(0.25);
        let fast = c.tessellated_bounds(4);
        for segments in [1, 2, 3, 5, 8, 16] {
            let b = c.tessellated_bounds(segments);
            assert!(approx_eq!(Float, b.p_min.x, fast.p_min.x, epsilon = 1e-5));
            assert!(approx_eq!(Float, b.p_max.y, fast.p_max.y, epsilon = 1e-5));
        }
    }

    #[test]
    fn begin_and_end() {
        let c = line(1.0);
        assert_eq!(c.begin(), c.eval(0.0));
        assert_eq!(c.end(), c.eval(1.0));
    }

    #[test]
    fn table_lanes_past_last_column_are_zero() {
        let c = line(1.0);
        let p: [Vector4f; 8] = c.eval0(14, 16);
        assert_vertex_approx_eq(&p[2], &c.eval(1.0), 1e-5);
        assert!(p[3..].iter().all(|v| *v == Vector4f::default()));
    }

    #[test]
    #[should_panic]
    fn table_offset_past_size_panics() {
        let _: [Vector4f; 4] = line(1.0).eval0(5, 4);
    }

    #[test]
    #[should_panic]
    fn table_size_past_limit_panics() {
        let _: [Vector4f; 4] = line(1.0).derivative1(0, PrecomputedBezierBasis::N + 1);
    }

    #[test]
    fn display() {
        let c = BezierCurve::new(
            vector4(0.0, 0.0, 0.0, 1.0),
            vector4(1.0, 0.0, 0.0, 1.0),
            vector4(2.0, 0.0, 0.0, 1.0),
            vector4(3.0, 0.0, 0.0, 1.0),
        );
        assert_eq!(
            c.to_string(),
            "BezierCurve { v0 = (0, 0, 0, 1), v1 = (1, 0, 0, 1), v2 = (2, 0, 0, 1), v3 = (3, 0, 0, 1) }"
        );
    }

    proptest! {
        #[test]
        fn eval_all_matches_direct_evaluation(c in curve(), t in 0.0..=1.0f32) {
            let (p, dp, ddp) = c.eval_all(t);
            assert_vertex_approx_eq(&p, &c.eval(t), 1e-3);
            assert_vertex_approx_eq(&dp, &c.eval_du(t), 1e-3);
            prop_assert_eq!(ddp, c.eval_dudu(t));
        }

        #[test]
        fn lanes_match_scalar(c in curve(), t in prop::array::uniform4(0.0..=1.0f32)) {
            let (p, dp) = c.eval_lanes(&t);
            for i in 0..4 {
                let (ps, dps, _) = c.eval_all(t[i]);
                prop_assert_eq!(p[i], ps);
                prop_assert_eq!(dp[i], dps);
            }
        }

        #[test]
        fn table_samples_match_basis(c in curve(), size in 1..=16usize, ofs in 0..=16usize) {
            let ofs = ofs.min(size);
            let p: [Vector4f; 1] = c.eval1(ofs, size);
            let dp: [Vector4f; 1] = c.derivative0(ofs, size);
            prop_assert_eq!(p[0], c.eval((ofs + 1) as Float / size as Float));
            prop_assert_eq!(dp[0], c.eval_du(ofs as Float / size as Float));
        }

        #[test]
        fn accurate_bounds_contain_curve(c in curve(), t in 0.0..=1.0f32) {
            let b = c.accurate_bounds();
            let e = b.expand(1e-3);
            prop_assert!(e.contains(&c.v0.xyz()));
            prop_assert!(e.contains(&c.v3.xyz()));
            prop_assert!(e.contains(&c.eval(0.5).xyz()));
            prop_assert!(e.contains(&c.eval(t).xyz()));
            prop_assert!(b.p_max.x - b.p_min.x >= 2.0 * c.v0.w - 1e-3);
        }

        #[test]
        fn tessellated_bounds_contain_samples(c in curve(), segments in 1..=16usize) {
            let b = c.tessellated_bounds(segments).expand(1e-3);
            prop_assert!(b.contains(&c.v0.xyz()));
            prop_assert!(b.contains(&c.v3.xyz()));
            for i in 0..=segments {
                prop_assert!(b.contains(&c.eval(i as Float / segments as Float).xyz()));
            }
        }

        #[test]
        fn tessellated_bounds_four_contain_midpoint(c in curve()) {
            let b = c.tessellated_bounds(4).expand(1e-3);
            prop_assert!(b.contains(&c.eval(0.5).xyz()));
        }
    }
}
