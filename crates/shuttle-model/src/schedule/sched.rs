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
    common::{BusIdentifier, PassengerIdentifier},
    schedule::{
        event::{AssignmentEvent, Boarding, DepartureEvent},
        status::ScheduleStatus,
    },
};
use shuttle_core::prelude::{Slot, Terminal};
use std::collections::BTreeMap;

/// A produced schedule as reported, before any checking.
///
/// Nothing here is validated; that is the verifier's job. Departures are kept
/// sorted by `(bus, terminal, time)`, boardings in the order they were given.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    status: ScheduleStatus,
    objective: Option<f64>,
    departures: Vec<DepartureEvent>,
    boardings: Vec<Boarding>,
}

impl Schedule {
    pub fn new<D, B>(
        status: ScheduleStatus,
        objective: Option<f64>,
        departures: D,
        boardings: B,
    ) -> Self
    where
        D: IntoIterator<Item = DepartureEvent>,
        B: IntoIterator<Item = Boarding>,
    {
        let mut departures: Vec<DepartureEvent> = departures.into_iter().collect();
        departures.sort();
        Self {
            status,
            objective,
            departures,
            boardings: boardings.into_iter().collect(),
        }
    }

    /// A schedule carrying only a status, as returned for infeasible or
    /// timed out solves.
    #[inline]
    pub fn empty(status: ScheduleStatus) -> Self {
        Self {
            status,
            objective: None,
            departures: Vec::new(),
            boardings: Vec::new(),
        }
    }

    #[inline]
    pub fn status(&self) -> ScheduleStatus {
        self.status
    }

    #[inline]
    pub fn objective(&self) -> Option<f64> {
        self.objective
    }

    #[inline]
    pub fn departures(&self) -> &[DepartureEvent] {
        &self.departures
    }

    #[inline]
    pub fn boardings(&self) -> &[Boarding] {
        &self.boardings
    }

    /// No departures and no boardings, whatever the status claims.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.departures.is_empty() && self.boardings.is_empty()
    }

    #[inline]
    pub fn iter_departures_of(&self, bus: BusIdentifier) -> impl Iterator<Item = &DepartureEvent> {
        self.departures.iter().filter(move |d| d.bus() == bus)
    }

    /// Departures of each bus in time order.
    pub fn departures_by_bus(&self) -> BTreeMap<BusIdentifier, Vec<DepartureEvent>> {
        let mut out: BTreeMap<BusIdentifier, Vec<DepartureEvent>> = BTreeMap::new();
        for d in &self.departures {
            out.entry(d.bus()).or_default().push(*d);
        }
        for deps in out.values_mut() {
            deps.sort_by_key(|d| (d.time(), d.terminal()));
        }
        out
    }

    /// Boardings grouped by `(terminal, bus, time)`, passengers sorted.
    pub fn assignment_events(&self) -> Vec<AssignmentEvent> {
        let mut groups: BTreeMap<(Terminal, BusIdentifier, Slot), Vec<PassengerIdentifier>> =
            BTreeMap::new();
        for b in &self.boardings {
            groups
                .entry((b.terminal(), b.bus(), b.time()))
                .or_default()
                .push(b.passenger());
        }
        groups
            .into_iter()
            .map(|((terminal, bus, time), mut passengers)| {
                passengers.sort();
                AssignmentEvent::new(terminal, bus, time, passengers)
            })
            .collect()
    }
}
