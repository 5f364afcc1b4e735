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

pub mod common;
pub mod grid;
pub mod instance;
pub mod objective;
pub mod payload;
pub mod schedule;
pub mod validation;

pub mod prelude {
    pub use crate::common::{BusIdentifier, PassengerIdentifier};
    pub use crate::grid::{SlotRange, TimeGrid, err::TimeGridError};
    pub use crate::instance::builder::InstanceBuilder;
    pub use crate::instance::bus::Bus;
    pub use crate::instance::err::{ArrivalOffGridError, InstanceError, InstanceLoaderError};
    pub use crate::instance::inst::{InitialPlacement, Instance};
    pub use crate::instance::loader::InstanceLoader;
    pub use crate::instance::passenger::{Passenger, PassengerKey};
    pub use crate::objective::ObjectiveKind;
    pub use crate::payload::err::{MalformedResult, PayloadReadError};
    pub use crate::payload::expected::ExpectedCase;
    pub use crate::payload::extract::ScheduleExtractor;
    pub use crate::payload::result::{PayloadMeta, ResultPayload};
    pub use crate::schedule::err::UnknownStatusError;
    pub use crate::schedule::event::{AssignmentEvent, Boarding, DepartureEvent};
    pub use crate::schedule::sched::Schedule;
    pub use crate::schedule::status::ScheduleStatus;
    pub use crate::validation::violation::{
        Verdict, VerificationReport, Violation, ViolationKind,
    };
    pub use crate::validation::{Verifier, VerifierConfig};
}
