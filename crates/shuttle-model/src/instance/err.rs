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

use crate::{common::BusIdentifier, grid::err::TimeGridError, instance::passenger::PassengerKey};
use shuttle_core::prelude::Slot;
use std::num::ParseIntError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArrivalOffGridError {
    passenger: PassengerKey,
    arrival: Slot,
}

impl ArrivalOffGridError {
    #[inline]
    pub fn new(passenger: PassengerKey, arrival: Slot) -> Self {
        Self { passenger, arrival }
    }

    #[inline]
    pub fn passenger(&self) -> PassengerKey {
        self.passenger
    }

    #[inline]
    pub fn arrival(&self) -> Slot {
        self.arrival
    }
}

impl std::fmt::Display for ArrivalOffGridError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Arrival {} of passenger {} is not a slot of the time grid",
            self.arrival, self.passenger
        )
    }
}

impl std::error::Error for ArrivalOffGridError {}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InstanceError {
    Grid(TimeGridError),
    DuplicatePassenger(PassengerKey),
    DuplicateBus(BusIdentifier),
    ArrivalOffGrid(ArrivalOffGridError),
    ZeroCapacity(BusIdentifier),
    NegativeWaitBound(Slot),
    PlacementExceedsFleet { at_a: usize, buses: usize },
}

impl std::fmt::Display for InstanceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstanceError::Grid(e) => write!(f, "{}", e),
            InstanceError::DuplicatePassenger(key) => {
                write!(f, "Passenger {} is declared more than once", key)
            }
            InstanceError::DuplicateBus(id) => write!(f, "Bus {} is declared more than once", id),
            InstanceError::ArrivalOffGrid(e) => write!(f, "{}", e),
            InstanceError::ZeroCapacity(id) => write!(f, "Bus {} has zero capacity", id),
            InstanceError::NegativeWaitBound(w) => {
                write!(f, "Wait bound must be non-negative, got {}", w)
            }
            InstanceError::PlacementExceedsFleet { at_a, buses } => write!(
                f,
                "{} buses requested at terminal A but the fleet only has {}",
                at_a, buses
            ),
        }
    }
}

impl std::error::Error for InstanceError {}

impl From<TimeGridError> for InstanceError {
    fn from(e: TimeGridError) -> Self {
        InstanceError::Grid(e)
    }
}

impl From<ArrivalOffGridError> for InstanceError {
    fn from(e: ArrivalOffGridError) -> Self {
        InstanceError::ArrivalOffGrid(e)
    }
}

#[derive(Debug)]
pub enum InstanceLoaderError {
    Io(std::io::Error),
    Json(serde_json::Error),
    ParseInt(ParseIntError),
    MissingField(&'static str),
    Instance(InstanceError),
}

impl std::fmt::Display for InstanceLoaderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstanceLoaderError::Io(e) => write!(f, "I/O error: {}", e),
            InstanceLoaderError::Json(e) => write!(f, "Invalid case file: {}", e),
            InstanceLoaderError::ParseInt(e) => write!(f, "Invalid passenger id: {}", e),
            InstanceLoaderError::MissingField(name) => {
                write!(f, "Case file is missing the '{}' field", name)
            }
            InstanceLoaderError::Instance(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for InstanceLoaderError {}

impl From<InstanceError> for InstanceLoaderError {
    fn from(e: InstanceError) -> Self {
        InstanceLoaderError::Instance(e)
    }
}

impl From<TimeGridError> for InstanceLoaderError {
    fn from(e: TimeGridError) -> Self {
        InstanceLoaderError::Instance(InstanceError::Grid(e))
    }
}
