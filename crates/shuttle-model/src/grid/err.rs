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

use shuttle_core::prelude::Slot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeGridError {
    NonPositiveStep(Slot),
    NegativeTau(Slot),
    HorizonBeforeStart { start: Slot, horizon: Slot },
    TauNotMultipleOfStep { tau: Slot, step: Slot },
}

impl std::fmt::Display for TimeGridError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeGridError::NonPositiveStep(step) => {
                write!(f, "Slot step must be positive, got {}", step)
            }
            TimeGridError::NegativeTau(tau) => {
                write!(f, "Travel delay must be non-negative, got {}", tau)
            }
            TimeGridError::HorizonBeforeStart { start, horizon } => {
                write!(f, "Horizon {} lies before the grid start {}", horizon, start)
            }
            TimeGridError::TauNotMultipleOfStep { tau, step } => {
                write!(
                    f,
                    "Travel delay {} is not a whole number of slots of size {}",
                    tau, step
                )
            }
        }
    }
}

impl std::error::Error for TimeGridError {}
