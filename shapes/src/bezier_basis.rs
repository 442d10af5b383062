//! Bezier Basis

use rtcore::pbrt::*;

lazy_static! {
    /// Precomputed basis sampled at `u = j / size`.
    pub static ref BEZIER_BASIS0: PrecomputedBezierBasis = PrecomputedBezierBasis::new(0);

    /// Precomputed basis sampled at `u = (j + 1) / size`.
    pub static ref BEZIER_BASIS1: PrecomputedBezierBasis = PrecomputedBezierBasis::new(1);
}

/// The cubic Bernstein basis.
pub struct BezierBasis;

impl BezierBasis {
    /// Returns the weights `B0..B3` of the four control points at `u`.
    ///
    /// * `u` - Curve parameter.
    pub fn eval(u: Float) -> [Float; 4] {
        let t1 = u;
        let t0 = 1.0 - t1;
        [
            t0 * t0 * t0,
            3.0 * t1 * (t0 * t0),
            3.0 * (t1 * t1) * t0,
            t1 * t1 * t1,
        ]
    }

    /// Returns the weights of the first derivative at `u`.
    ///
    /// * `u` - Curve parameter.
    pub fn derivative(u: Float) -> [Float; 4] {
        let t1 = u;
        let t0 = 1.0 - t1;
        [
            -3.0 * (t0 * t0),
            3.0 * (t0 * t0 - 2.0 * t0 * t1),
            3.0 * (2.0 * t0 * t1 - t1 * t1),
            3.0 * (t1 * t1),
        ]
    }

    /// Returns the weights of the second derivative at `u`.
    ///
    /// * `u` - Curve parameter.
    pub fn derivative2(u: Float) -> [Float; 4] {
        let t1 = u;
        let t0 = 1.0 - t1;
        [
            6.0 * t0,
            6.0 * (t1 - 2.0 * t0),
            6.0 * (t0 - 2.0 * t1),
            6.0 * t1,
        ]
    }
}

/// Table of basis weights.
pub type BasisTable = [[Float; PrecomputedBezierBasis::N + 1]; PrecomputedBezierBasis::N + 1];

/// Basis and derivative weights sampled at every tessellation rate up to `N`.
///
/// Row `size` holds the weights at `u = (j + shift) / size` in column `j`.
/// Columns past `size` extrapolate the curve so that lane-wide reads starting
/// at any `ofs <= size` stay initialized. Row 0 is zero.
pub struct PrecomputedBezierBasis {
    /// Weights of `v0..v3`.
    pub c: [BasisTable; 4],

    /// Derivative weights of `v0..v3`.
    pub d: [BasisTable; 4],
}

impl PrecomputedBezierBasis {
    /// Largest tessellation rate.
    pub const N: usize = 16;

    /// Builds the tables.
    ///
    /// * `shift` - Offset added to the column index before sampling.
    pub fn new(shift: usize) -> Self {
        debug!("Building Bezier basis tables with shift {}", shift);

        let mut c = [[[0.0; Self::N + 1]; Self::N + 1]; 4];
        let mut d = [[[0.0; Self::N + 1]; Self::N + 1]; 4];
        for size in 1..=Self::N {
            for j in 0..=Self::N {
                let u = (j + shift) as Float / size as Float;
                let f = BezierBasis::eval(u);
                let df = BezierBasis::derivative(u);
                for k in 0..4 {
                    c[k][size][j] = f[k];
                    d[k][size][j] = df[k];
                }
            }
        }
        Self { c, d }
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
    fn endpoint_weights() {
        assert_eq!(BezierBasis::eval(0.0), [1.0, 0.0, 0.0, 0.0]);
        assert_eq!(BezierBasis::eval(1.0), [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(BezierBasis::derivative(0.0), [-3.0, 3.0, 0.0, 0.0]);
        assert_eq!(BezierBasis::derivative(1.0), [0.0, 0.0, -3.0, 3.0]);
        assert_eq!(BezierBasis::derivative2(0.0), [6.0, -12.0, 6.0, 0.0]);
    }

    #[test]
    fn tables_sample_the_basis() {
        for (table, shift) in [(&*BEZIER_BASIS0, 0), (&*BEZIER_BASIS1, 1)] {
            assert!(table.c.iter().all(|t| t[0].iter().all(|w| *w == 0.0)));
            for size in 1..=PrecomputedBezierBasis::N {
                for j in 0..=PrecomputedBezierBasis::N {
                    let u = (j + shift) as Float / size as Float;
                    let f = BezierBasis::eval(u);
                    let df = BezierBasis::derivative(u);
                    for k in 0..4 {
                        assert_eq!(table.c[k][size][j], f[k]);
                        assert_eq!(table.d[k][size][j], df[k]);
                    }
                }
            }
        }
    }

    proptest! {
        #[test]
        fn partition_of_unity(u in 0.0..=1.0f32) {
            let b = BezierBasis::eval(u);
            prop_assert!(approx_eq!(Float, b.iter().sum::<Float>(), 1.0, epsilon = 1e-5));
            prop_assert!(b.iter().all(|w| *w >= 0.0));
        }

        #[test]
        fn derivative_weights_sum_to_zero(u in 0.0..=1.0f32) {
            let d = BezierBasis::derivative(u);
            prop_assert!(approx_eq!(Float, d.iter().sum::<Float>(), 0.0, epsilon = 1e-5));
            let d2 = BezierBasis::derivative2(u);
            prop_assert!(approx_eq!(Float, d2.iter().sum::<Float>(), 0.0, epsilon = 1e-5));
        }

        #[test]
        fn derivative_matches_finite_difference(u in 0.05..0.95f32) {
            let h = 1e-3;
            let b0 = BezierBasis::eval(u - h);
            let b1 = BezierBasis::eval(u + h);
            let d = BezierBasis::derivative(u);
            for k in 0..4 {
                prop_assert!(approx_eq!(Float, (b1[k] - b0[k]) / (2.0 * h), d[k], epsilon = 0.01));
            }
        }
    }
}
