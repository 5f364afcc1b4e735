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

use crate::{
    common::BusIdentifier, grid::err::TimeGridError, instance::err::InstanceError,
    schedule::err::UnknownStatusError,
};
use shuttle_core::prelude::Slot;
use std::num::ParseIntError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UndeclaredBusError {
    bus: BusIdentifier,
}

impl UndeclaredBusError {
    #[inline]
    pub fn new(bus: BusIdentifier) -> Self {
        Self { bus }
    }

    #[inline]
    pub fn bus(&self) -> BusIdentifier {
        self.bus
    }
}

impl std::fmt::Display for UndeclaredBusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Bus {} is used but not declared in the initial positions",
            self.bus
        )
    }
}

impl std::error::Error for UndeclaredBusError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeOffGridError {
    record: &'static str,
    time: Slot,
}

impl TimeOffGridError {
    #[inline]
    pub fn new(record: &'static str, time: Slot) -> Self {
        Self { record, time }
    }

    #[inline]
    pub fn record(&self) -> &'static str {
        self.record
    }

    #[inline]
    pub fn time(&self) -> Slot {
        self.time
    }
}

impl std::fmt::Display for TimeOffGridError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Time {} of a {} record is not a slot of the time grid",
            self.time, self.record
        )
    }
}

impl std::error::Error for TimeOffGridError {}

/// A result payload that cannot be turned into an instance and a schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedResult {
    MissingField(&'static str),
    UnknownStatus(UnknownStatusError),
    Grid(TimeGridError),
    Instance(InstanceError),
    PassengerId(ParseIntError),
    UndeclaredBus(UndeclaredBusError),
    TimeOffGrid(TimeOffGridError),
}

impl std::fmt::Display for MalformedResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MalformedResult::MissingField(name) => {
                write!(f, "Malformed result: missing field '{}'", name)
            }
            MalformedResult::UnknownStatus(e) => write!(f, "Malformed result: {}", e),
            MalformedResult::Grid(e) => write!(f, "Malformed result: {}", e),
            MalformedResult::Instance(e) => write!(f, "Malformed result: {}", e),
            MalformedResult::PassengerId(e) => {
                write!(f, "Malformed result: invalid passenger id: {}", e)
            }
            MalformedResult::UndeclaredBus(e) => write!(f, "Malformed result: {}", e),
            MalformedResult::TimeOffGrid(e) => write!(f, "Malformed result: {}", e),
        }
    }
}

impl std::error::Error for MalformedResult {}

impl From<UnknownStatusError> for MalformedResult {
    fn from(e: UnknownStatusError) -> Self {
        MalformedResult::UnknownStatus(e)
    }
}

impl From<TimeGridError> for MalformedResult {
    fn from(e: TimeGridError) -> Self {
        MalformedResult::Grid(e)
    }
}

impl From<InstanceError> for MalformedResult {
    fn from(e: InstanceError) -> Self {
        MalformedResult::Instance(e)
    }
}

impl From<ParseIntError> for MalformedResult {
    fn from(e: ParseIntError) -> Self {
        MalformedResult::PassengerId(e)
    }
}

impl From<UndeclaredBusError> for MalformedResult {
    fn from(e: UndeclaredBusError) -> Self {
        MalformedResult::UndeclaredBus(e)
    }
}

impl From<TimeOffGridError> for MalformedResult {
    fn from(e: TimeOffGridError) -> Self {
        MalformedResult::TimeOffGrid(e)
    }
}

#[derive(Debug)]
pub enum PayloadReadError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Empty,
}

impl std::fmt::Display for PayloadReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PayloadReadError::Io(e) => write!(f, "I/O error: {}", e),
            PayloadReadError::Json(e) => write!(f, "Invalid JSON: {}", e),
            PayloadReadError::Empty => write!(f, "Payload is empty"),
        }
    }
}

impl std::error::Error for PayloadReadError {}

impl From<std::io::Error> for PayloadReadError {
    fn from(e: std::io::Error) -> Self {
        PayloadReadError::Io(e)
    }
}

impl From<serde_json::Error> for PayloadReadError {
    fn from(e: serde_json::Error) -> Self {
        PayloadReadError::Json(e)
    }
}
