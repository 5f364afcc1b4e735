// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use num_traits::Float;
use std::fmt::Debug;

/// Reason a square surrogate could not be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvalidSurrogateError {
    ZeroSegments,
    NegativeUpperBound,
    NonFiniteBreakpoint,
    UnsortedBreakpoints,
    EmptyBreakpoints,
}

impl std::fmt::Display for InvalidSurrogateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidSurrogateError::ZeroSegments => {
                write!(f, "A square surrogate needs at least one segment")
            }
            InvalidSurrogateError::NegativeUpperBound => {
                write!(f, "The surrogate upper bound must be non-negative")
            }
            InvalidSurrogateError::NonFiniteBreakpoint => {
                write!(f, "Surrogate breakpoints must be finite")
            }
            InvalidSurrogateError::UnsortedBreakpoints => {
                write!(f, "Surrogate breakpoints must be strictly increasing")
            }
            InvalidSurrogateError::EmptyBreakpoints => {
                write!(f, "A square surrogate needs at least one breakpoint")
            }
        }
    }
}

impl std::error::Error for InvalidSurrogateError {}

/// The chord of `x²` between two consecutive breakpoints.
///
/// `y = slope * x + intercept` with `slope = b0 + b1` and
/// `intercept = -b0 * b1`; the line touches the parabola at both ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Secant<F> {
    lower: F,
    upper: F,
    slope: F,
    intercept: F,
}

impl<F: Float> Secant<F> {
    #[inline]
    pub fn through(lower: F, upper: F) -> Self {
        Self {
            lower,
            upper,
            slope: lower + upper,
            intercept: -(lower * upper),
        }
    }

    #[inline]
    pub fn lower(&self) -> F {
        self.lower
    }

    #[inline]
    pub fn upper(&self) -> F {
        self.upper
    }

    #[inline]
    pub fn slope(&self) -> F {
        self.slope
    }

    #[inline]
    pub fn intercept(&self) -> F {
        self.intercept
    }

    #[inline]
    pub fn at(&self, x: F) -> F {
        self.slope * x + self.intercept
    }
}

/// Convex piecewise-linear over-estimator of `x²` on `[0, upper]`.
///
/// The surrogate is the upper envelope of the chords between consecutive
/// breakpoints, clamped below at zero. It is exact at every breakpoint and
/// over-estimates in between by at most `(b_{k+1} - b_k)² / 4`, attained at
/// the midpoint of the widest segment.
#[derive(Debug, Clone, PartialEq)]
pub struct SquareSurrogate<F> {
    breakpoints: Vec<F>,
}

impl<F: Float + Debug> SquareSurrogate<F> {
    /// Spreads `segments` segments evenly over `[0, upper]`, rounding every
    /// breakpoint to the nearest integer so integral waits stay exact.
    pub fn uniform(upper: F, segments: usize) -> Result<Self, InvalidSurrogateError> {
        if segments == 0 {
            return Err(InvalidSurrogateError::ZeroSegments);
        }
        if !upper.is_finite() {
            return Err(InvalidSurrogateError::NonFiniteBreakpoint);
        }
        if upper < F::zero() {
            return Err(InvalidSurrogateError::NegativeUpperBound);
        }

        let n = F::from(segments).ok_or(InvalidSurrogateError::NonFiniteBreakpoint)?;
        let mut points = Vec::with_capacity(segments + 1);
        for k in 0..=segments {
            let kf = F::from(k).ok_or(InvalidSurrogateError::NonFiniteBreakpoint)?;
            points.push((kf * upper / n).round());
        }
        points.push(F::zero());
        points.push(upper);
        points.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        points.dedup();

        Self::from_breakpoints(points)
    }

    pub fn from_breakpoints<I>(breakpoints: I) -> Result<Self, InvalidSurrogateError>
    where
        I: IntoIterator<Item = F>,
    {
        let breakpoints: Vec<F> = breakpoints.into_iter().collect();
        if breakpoints.is_empty() {
            return Err(InvalidSurrogateError::EmptyBreakpoints);
        }
        if breakpoints.iter().any(|b| !b.is_finite()) {
            return Err(InvalidSurrogateError::NonFiniteBreakpoint);
        }
        if breakpoints.windows(2).any(|w| w[0] >= w[1]) {
            return Err(InvalidSurrogateError::UnsortedBreakpoints);
        }
        Ok(Self { breakpoints })
    }

    #[inline]
    pub fn breakpoints(&self) -> &[F] {
        &self.breakpoints
    }

    #[inline]
    pub fn segment_count(&self) -> usize {
        self.breakpoints.len().saturating_sub(1)
    }

    #[inline]
    pub fn secants(&self) -> impl Iterator<Item = Secant<F>> + '_ {
        self.breakpoints
            .windows(2)
            .map(|w| Secant::through(w[0], w[1]))
    }

    /// Value of the surrogate at `x`: `max(0, max_k secant_k(x))`.
    pub fn evaluate(&self, x: F) -> F {
        self.secants()
            .map(|s| s.at(x))
            .fold(F::zero(), |acc, v| if v > acc { v } else { acc })
    }

    /// Largest gap between the surrogate and `x²` inside the covered range.
    pub fn max_error(&self) -> F {
        let four = F::from(4.0).unwrap_or_else(F::one);
        self.breakpoints
            .windows(2)
            .map(|w| (w[1] - w[0]) * (w[1] - w[0]) / four)
            .fold(F::zero(), |acc, v| if v > acc { v } else { acc })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_breakpoints_include_both_ends() {
        let s = SquareSurrogate::<f64>::uniform(60.0, 6).unwrap();
        assert_eq!(
            s.breakpoints(),
            &[0.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0]
        );
        assert_eq!(s.segment_count(), 6);
    }

    #[test]
    fn test_uniform_rounding_dedups() {
        // 5 / 4 = 1.25 → 1, 2.5 → 3 (round half away from zero), 3.75 → 4
        let s = SquareSurrogate::<f64>::uniform(5.0, 4).unwrap();
        assert_eq!(s.breakpoints(), &[0.0, 1.0, 3.0, 4.0, 5.0]);

        // More segments than integers in range collapses duplicates.
        let s = SquareSurrogate::<f64>::uniform(2.0, 8).unwrap();
        assert_eq!(s.breakpoints(), &[0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_zero_upper_bound_has_no_secants() {
        let s = SquareSurrogate::<f64>::uniform(0.0, 3).unwrap();
        assert_eq!(s.breakpoints(), &[0.0]);
        assert_eq!(s.secants().count(), 0);
        assert_eq!(s.evaluate(0.0), 0.0);
    }

    #[test]
    fn test_exact_at_breakpoints() {
        let s = SquareSurrogate::<f64>::uniform(60.0, 6).unwrap();
        for &b in s.breakpoints() {
            assert!((s.evaluate(b) - b * b).abs() < 1e-9);
        }
    }

    #[test]
    fn test_overestimates_between_breakpoints_within_bound() {
        let s = SquareSurrogate::<f64>::uniform(60.0, 6).unwrap();
        let bound = s.max_error();
        assert_eq!(bound, 25.0);
        for w in 0..=60 {
            let x = w as f64;
            let gap = s.evaluate(x) - x * x;
            assert!(gap >= -1e-9, "surrogate below square at {x}");
            assert!(gap <= bound + 1e-9, "gap {gap} exceeds bound at {x}");
        }
        // midpoint of first segment: 5 * 10 - 0 = 50 vs 25
        assert_eq!(s.evaluate(5.0), 50.0);
    }

    #[test]
    fn test_secant_coefficients() {
        let s = Secant::through(10.0_f64, 20.0);
        assert_eq!(s.slope(), 30.0);
        assert_eq!(s.intercept(), -200.0);
        assert_eq!(s.at(10.0), 100.0);
        assert_eq!(s.at(20.0), 400.0);
    }

    #[test]
    fn test_rejects_invalid_input() {
        assert_eq!(
            SquareSurrogate::<f64>::uniform(10.0, 0).unwrap_err(),
            InvalidSurrogateError::ZeroSegments
        );
        assert_eq!(
            SquareSurrogate::<f64>::uniform(-1.0, 2).unwrap_err(),
            InvalidSurrogateError::NegativeUpperBound
        );
        assert_eq!(
            SquareSurrogate::<f64>::from_breakpoints([0.0, 2.0, 2.0]).unwrap_err(),
            InvalidSurrogateError::UnsortedBreakpoints
        );
        assert_eq!(
            SquareSurrogate::<f64>::from_breakpoints(Vec::new()).unwrap_err(),
            InvalidSurrogateError::EmptyBreakpoints
        );
    }
}
