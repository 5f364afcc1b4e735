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

use serde::{Deserialize, Serialize};
use shuttle_core::prelude::{InvalidSurrogateError, Slot, SquareSurrogate};

/// How waiting time is charged in the objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ObjectiveKind {
    /// Total wait.
    #[default]
    Linear,
    /// Convex piecewise-linear over-estimate of the total squared wait,
    /// exact at `segments + 1` evenly spaced breakpoints over `[0, w_max]`.
    PiecewiseSquare { segments: usize },
    /// Exact total squared wait. Only used to score reference solutions.
    Squared,
}

impl ObjectiveKind {
    /// Surrogate used for `PiecewiseSquare` over `[0, w_max]`.
    pub fn surrogate(&self, w_max: Slot) -> Result<Option<SquareSurrogate<f64>>, InvalidSurrogateError> {
        match *self {
            ObjectiveKind::PiecewiseSquare { segments } => {
                SquareSurrogate::uniform(w_max as f64, segments).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Objective contribution of a single wait.
    ///
    /// `surrogate` must come from [`ObjectiveKind::surrogate`]; without one
    /// the piecewise kind falls back to the exact square.
    #[inline]
    pub fn charge(&self, wait: Slot, surrogate: Option<&SquareSurrogate<f64>>) -> f64 {
        let w = wait as f64;
        match self {
            ObjectiveKind::Linear => w,
            ObjectiveKind::Squared => w * w,
            ObjectiveKind::PiecewiseSquare { .. } => match surrogate {
                Some(s) => s.evaluate(w),
                None => w * w,
            },
        }
    }

    /// Sum of the charges of `waits`.
    pub fn evaluate<I>(&self, w_max: Slot, waits: I) -> Result<f64, InvalidSurrogateError>
    where
        I: IntoIterator<Item = Slot>,
    {
        let surrogate = self.surrogate(w_max)?;
        Ok(waits
            .into_iter()
            .map(|w| self.charge(w, surrogate.as_ref()))
            .sum())
    }
}

impl std::fmt::Display for ObjectiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectiveKind::Linear => write!(f, "linear"),
            ObjectiveKind::PiecewiseSquare { segments } => write!(f, "pwl({})", segments),
            ObjectiveKind::Squared => write!(f, "squared"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_and_squared() {
        assert_eq!(ObjectiveKind::Linear.evaluate(10, [1, 2, 3]).unwrap(), 6.0);
        assert_eq!(ObjectiveKind::Squared.evaluate(10, [1, 2, 3]).unwrap(), 14.0);
    }

    #[test]
    fn test_piecewise_is_exact_at_breakpoints() {
        let k = ObjectiveKind::PiecewiseSquare { segments: 6 };
        assert_eq!(k.evaluate(60, [0, 10, 60]).unwrap(), 3700.0);
        // Midpoint of [0, 10] is over-estimated by the secant.
        assert_eq!(k.evaluate(60, [5]).unwrap(), 50.0);
    }

    #[test]
    fn test_piecewise_with_zero_segments_is_rejected() {
        let k = ObjectiveKind::PiecewiseSquare { segments: 0 };
        assert!(k.evaluate(10, [1]).is_err());
    }

    #[test]
    fn test_serde_shape() {
        let k: ObjectiveKind =
            serde_json::from_str(r#"{"kind": "piecewise_square", "segments": 4}"#).unwrap();
        assert_eq!(k, ObjectiveKind::PiecewiseSquare { segments: 4 });
        assert_eq!(
            serde_json::to_string(&ObjectiveKind::Linear).unwrap(),
            r#"{"kind":"linear"}"#
        );
    }
}
