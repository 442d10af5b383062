//! Interval of real numbers

use super::{max, min, Float, PI, PI_OVER_TWO};
use std::fmt;
use std::mem::swap;
use std::ops::{Add, Mul};

/// Interval of real numbers used to give conservative bounds for functions.
#[derive(Copy, Clone, Default, PartialEq)]
pub struct Interval {
    /// Low value.
    pub low: Float,

    /// High value.
    pub high: Float,
}

/// Coefficients and angle of the function
///
/// `f(t) = c1 + (c2 + c3 t) cos(2θt) + (c4 + c5 t) sin(2θt)`
///
/// whose zeros are searched by `Interval::find_zeros`.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct MotionEquation {
    /// Coefficients `[c1, c2, c3, c4, c5]`.
    pub c: [Float; 5],

    /// Rotation angle θ.
    pub theta: Float,
}

impl MotionEquation {
    /// Evaluates the function at `t`.
    ///
    /// * `t` - Parameter value.
    pub fn eval(&self, t: Float) -> Float {
        let [c1, c2, c3, c4, c5] = self.c;
        let a = 2.0 * self.theta * t;
        c1 + (c2 + c3 * t) * a.cos() + (c4 + c5 * t) * a.sin()
    }

    /// Evaluates the derivative of the function at `t`.
    ///
    /// * `t` - Parameter value.
    pub fn derivative(&self, t: Float) -> Float {
        let [_, c2, c3, c4, c5] = self.c;
        let a = 2.0 * self.theta * t;
        (c3 + 2.0 * (c4 + c5 * t) * self.theta) * a.cos()
            + (c5 - 2.0 * (c2 + c3 * t) * self.theta) * a.sin()
    }

    /// Returns conservative bounds of the function over an interval.
    ///
    /// * `i` - The interval. Must satisfy `0 <= 2θ i.low` and `2θ i.high <= 2π`.
    pub fn eval_interval(&self, i: Interval) -> Interval {
        let [c1, c2, c3, c4, c5] = self.c;
        let a = Interval::from(2.0 * self.theta) * i;
        Interval::from(c1)
            + (Interval::from(c2) + Interval::from(c3) * i) * a.cos()
            + (Interval::from(c4) + Interval::from(c5) * i) * a.sin()
    }
}

impl Interval {
    /// Create an interval with given bounds. The interval will sort the input.
    ///
    /// * `v0` - A real number.
    /// * `v1` - A real number.
    pub fn new(v0: Float, v1: Float) -> Self {
        Self {
            low: min(v0, v1),
            high: max(v0, v1),
        }
    }

    /// Return the interval used for sine function assuming this interval fits
    /// inside [0, 2π].
    pub fn sin(&self) -> Interval {
        assert!(
            self.low >= 0.0,
            "interval low < 0 not allowed for sine function"
        );
        assert!(
            self.high <= 2.0001 * PI,
            "interval high > 2π not allowed for sine function"
        );

        let mut sin_low = self.low.sin();
        let mut sin_high = self.high.sin();

        if sin_low > sin_high {
            swap(&mut sin_low, &mut sin_high);
        }

        if self.low < PI_OVER_TWO && self.high > PI_OVER_TWO {
            sin_high = 1.0;
        }

        if self.low < 3.0 * PI_OVER_TWO && self.high > 3.0 * PI_OVER_TWO {
            sin_low = -1.0;
        }

        Interval::new(sin_low, sin_high)
    }

    /// Return the interval used for cosine function assuming this interval fits
    /// inside [0, 2π].
    pub fn cos(&self) -> Interval {
        assert!(
            self.low >= 0.0,
            "interval low < 0 not allowed for cosine function"
        );
        assert!(
            self.high <= 2.0001 * PI,
            "interval high > 2π not allowed for cosine function"
        );

        let mut cos_low = self.low.cos();
        let mut cos_high = self.high.cos();

        if cos_low > cos_high {
            swap(&mut cos_low, &mut cos_high);
        }

        if self.low < PI && self.high > PI {
            cos_low = -1.0;
        }

        Interval::new(cos_low, cos_high)
    }

    /// Find the zero crossings of `f` over the interval by bisection followed
    /// by Newton refinement. Zeros are appended to `zeros` until it is full;
    /// further zeros are dropped.
    ///
    /// * `f`          - The function.
    /// * `zeros`      - Buffer to return zeros in.
    /// * `zero_count` - Number of zeros stored in `zeros`.
    /// * `depth`      - Remaining bisection depth.
    pub fn find_zeros(
        &self,
        f: &MotionEquation,
        zeros: &mut [Float],
        zero_count: &mut usize,
        depth: usize,
    ) {
        if *zero_count >= zeros.len() {
            return;
        }

        // Evaluate motion derivative in interval form, return if no zeros
        let range = f.eval_interval(*self);
        if range.low > 0.0 || range.high < 0.0 || range.low == range.high {
            return;
        }

        if depth > 0 {
            // Split self and check both resulting intervals
            let mid = (self.low + self.high) * 0.5;
            Interval::new(self.low, mid).find_zeros(f, zeros, zero_count, depth - 1);
            Interval::new(mid, self.high).find_zeros(f, zeros, zero_count, depth - 1);
        } else {
            // Use Newton's method to refine zero
            let mut t_newton = (self.low + self.high) * 0.5;
            for _ in 0..4 {
                let f_newton = f.eval(t_newton);
                let f_prime_newton = f.derivative(t_newton);
                if f_newton == 0.0 || f_prime_newton == 0.0 {
                    break;
                }
                t_newton -= f_newton / f_prime_newton;
            }
            if t_newton >= self.low - 1e-3 && t_newton < self.high + 1e-3 {
                zeros[*zero_count] = t_newton;
                *zero_count += 1;
            }
        }
    }
}

impl From<Float> for Interval {
    /// Create an interval on single point.
    ///
    /// * `v` - A real number.
    fn from(v: Float) -> Self {
        Self { low: v, high: v }
    }
}

impl Add for Interval {
    type Output = Self;

    /// Returns the conservative bounds for addition.
    ///
    /// * `i` -  The interval to add.
    fn add(self, i: Self) -> Self::Output {
        Interval::new(self.low + i.low, self.high + i.high)
    }
}

impl Mul for Interval {
    type Output = Self;

    /// Returns the conservative bounds for multiplication.
    ///
    /// * `i` -  The interval to multiply.
    fn mul(self, i: Self) -> Self::Output {
        let (a, b, c, d) = (
            self.low * i.low,
            self.high * i.low,
            self.low * i.high,
            self.high * i.high,
        );
        Self::new(min(min(a, b), min(c, d)), max(max(a, b), max(c, d)))
    }
}

impl fmt::Debug for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interval")
            .field("low", &self.low)
            .field("high", &self.high)
            .finish()
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.low, self.high)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
