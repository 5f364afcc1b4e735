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

use shuttle_core::prelude::{InvalidSurrogateError, Slot};
use shuttle_model::prelude::{ObjectiveKind, PassengerKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EmptyFeasibleRangeError {
    passenger: PassengerKey,
    arrival: Slot,
    cutoff: Slot,
}

impl EmptyFeasibleRangeError {
    #[inline]
    pub fn new(passenger: PassengerKey, arrival: Slot, cutoff: Slot) -> Self {
        Self {
            passenger,
            arrival,
            cutoff,
        }
    }

    #[inline]
    pub fn passenger(&self) -> PassengerKey {
        self.passenger
    }

    #[inline]
    pub fn arrival(&self) -> Slot {
        self.arrival
    }

    #[inline]
    pub fn cutoff(&self) -> Slot {
        self.cutoff
    }
}

impl std::fmt::Display for EmptyFeasibleRangeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Passenger {} arrives at {} after the last departure slot {}",
            self.passenger, self.arrival, self.cutoff
        )
    }
}

impl std::error::Error for EmptyFeasibleRangeError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    EmptyFeasibleRange(EmptyFeasibleRangeError),
    NoBuses,
    UnsupportedObjective(ObjectiveKind),
    Surrogate(InvalidSurrogateError),
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::EmptyFeasibleRange(e) => write!(f, "{}", e),
            ModelError::NoBuses => write!(f, "The instance has no buses"),
            ModelError::UnsupportedObjective(kind) => {
                write!(f, "Objective {} cannot be expressed linearly", kind)
            }
            ModelError::Surrogate(e) => write!(f, "Invalid square surrogate: {}", e),
        }
    }
}

impl std::error::Error for ModelError {}

impl From<EmptyFeasibleRangeError> for ModelError {
    #[inline]
    fn from(e: EmptyFeasibleRangeError) -> Self {
        ModelError::EmptyFeasibleRange(e)
    }
}

impl From<InvalidSurrogateError> for ModelError {
    #[inline]
    fn from(e: InvalidSurrogateError) -> Self {
        ModelError::Surrogate(e)
    }
}
