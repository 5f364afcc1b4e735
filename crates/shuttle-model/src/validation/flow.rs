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
    common::BusIdentifier,
    schedule::event::DepartureEvent,
    validation::violation::{Violation, ViolationKind},
};
use shuttle_core::prelude::{Slot, Terminal};
use std::collections::BTreeMap;

/// Where a bus is, as far as its departures tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BusPhase {
    At(Terminal),
    /// Left `from` and reaches the opposite terminal at `until`.
    Travelling { from: Terminal, until: Slot },
}

impl BusPhase {
    /// Phase observed at `time`; a finished trip has arrived.
    #[inline]
    pub fn at_time(self, time: Slot) -> Self {
        match self {
            BusPhase::Travelling { from, until } if time >= until => BusPhase::At(from.opposite()),
            p => p,
        }
    }

    /// The terminal the bus is at, or heading to.
    #[inline]
    pub fn terminal(&self) -> Terminal {
        match *self {
            BusPhase::At(t) => t,
            BusPhase::Travelling { from, .. } => from.opposite(),
        }
    }

    #[inline]
    pub fn is_travelling(&self) -> bool {
        matches!(self, BusPhase::Travelling { .. })
    }
}

/// Replays the departures of one bus and reports every inconsistency.
#[derive(Debug, Clone)]
pub struct BusTracker {
    bus: BusIdentifier,
    tau: Slot,
    phase: Option<BusPhase>,
    last_departure: Option<Slot>,
}

impl BusTracker {
    /// Without a known starting terminal the first departure fixes it.
    #[inline]
    pub fn new(bus: BusIdentifier, tau: Slot, initial: Option<Terminal>) -> Self {
        Self {
            bus,
            tau,
            phase: initial.map(BusPhase::At),
            last_departure: None,
        }
    }

    #[inline]
    pub fn phase(&self) -> Option<BusPhase> {
        self.phase
    }

    /// Departures must be fed in time order.
    pub fn depart(&mut self, terminal: Terminal, time: Slot, out: &mut Vec<Violation>) {
        let bus = self.bus.value();
        if self.last_departure == Some(time) {
            out.push(Violation::new(
                ViolationKind::Simultaneous,
                format!("bus{} has several departures at t={}", bus, time),
            ));
        }

        let phase = self.phase.unwrap_or(BusPhase::At(terminal)).at_time(time);
        if let BusPhase::Travelling { until, .. } = phase {
            out.push(Violation::new(
                ViolationKind::Flow,
                format!(
                    "bus{} departs at t={} while travelling until {}",
                    bus, time, until
                ),
            ));
        }
        if phase.terminal() != terminal {
            out.push(Violation::new(
                ViolationKind::Location,
                format!(
                    "bus{} departs {} at t={} but is at {}",
                    bus,
                    terminal,
                    time,
                    phase.terminal()
                ),
            ));
        }

        self.last_departure = Some(time);
        self.phase = Some(BusPhase::Travelling {
            from: terminal,
            until: time + self.tau,
        });
    }
}

/// Replays every bus. `initial` supplies the known starting terminals.
pub fn check_bus_flow<F>(
    tau: Slot,
    departures: &BTreeMap<BusIdentifier, Vec<DepartureEvent>>,
    initial: F,
    out: &mut Vec<Violation>,
) where
    F: Fn(BusIdentifier) -> Option<Terminal>,
{
    for (&bus, deps) in departures {
        let mut tracker = BusTracker::new(bus, tau, initial(bus));
        for d in deps {
            tracker.depart(d.terminal(), d.time(), out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bid(n: u32) -> BusIdentifier {
        BusIdentifier::new(n)
    }

    fn run(tau: Slot, initial: Option<Terminal>, deps: &[(Terminal, Slot)]) -> Vec<Violation> {
        let mut out = Vec::new();
        let mut t = BusTracker::new(bid(1), tau, initial);
        for &(term, time) in deps {
            t.depart(term, time, &mut out);
        }
        out
    }

    fn kinds(v: &[Violation]) -> Vec<ViolationKind> {
        v.iter().map(Violation::kind).collect()
    }

    #[test]
    fn test_alternating_round_trips_pass() {
        let v = run(
            3,
            Some(Terminal::A),
            &[(Terminal::A, 0), (Terminal::B, 3), (Terminal::A, 7)],
        );
        assert!(v.is_empty(), "{v:?}");
    }

    #[test]
    fn test_departure_one_slot_early_is_flow() {
        let v = run(3, Some(Terminal::A), &[(Terminal::A, 0), (Terminal::B, 2)]);
        assert_eq!(kinds(&v), vec![ViolationKind::Flow]);
    }

    #[test]
    fn test_same_terminal_twice_is_location() {
        // Back at A only after a trip to B.
        let v = run(2, Some(Terminal::A), &[(Terminal::A, 0), (Terminal::A, 5)]);
        assert_eq!(kinds(&v), vec![ViolationKind::Location]);
    }

    #[test]
    fn test_same_terminal_before_tau_is_flow_and_location() {
        let v = run(2, Some(Terminal::A), &[(Terminal::A, 0), (Terminal::A, 1)]);
        assert_eq!(kinds(&v), vec![ViolationKind::Flow, ViolationKind::Location]);
    }

    #[test]
    fn test_initial_terminal_mismatch() {
        let v = run(2, Some(Terminal::B), &[(Terminal::A, 0)]);
        assert_eq!(kinds(&v), vec![ViolationKind::Location]);
    }

    #[test]
    fn test_unknown_start_is_inferred() {
        let v = run(2, None, &[(Terminal::B, 4), (Terminal::A, 6)]);
        assert!(v.is_empty());
    }

    #[test]
    fn test_simultaneous_departures() {
        let v = run(2, Some(Terminal::A), &[(Terminal::A, 0), (Terminal::B, 0)]);
        assert!(kinds(&v).contains(&ViolationKind::Simultaneous));
    }

    #[test]
    fn test_zero_tau_allows_immediate_return() {
        let v = run(0, Some(Terminal::A), &[(Terminal::A, 0), (Terminal::B, 1)]);
        assert!(v.is_empty());
    }

    #[test]
    fn test_phase_transitions() {
        let p = BusPhase::Travelling {
            from: Terminal::A,
            until: 5,
        };
        assert!(p.at_time(4).is_travelling());
        assert_eq!(p.at_time(5), BusPhase::At(Terminal::B));
        assert_eq!(p.terminal(), Terminal::B);
    }

    #[test]
    fn test_check_bus_flow_uses_initial_lookup() {
        let mut deps = BTreeMap::new();
        deps.insert(bid(1), vec![DepartureEvent::new(bid(1), Terminal::A, 0)]);
        deps.insert(bid(2), vec![DepartureEvent::new(bid(2), Terminal::A, 0)]);
        let mut out = Vec::new();
        check_bus_flow(
            2,
            &deps,
            |b| (b == bid(2)).then_some(Terminal::B),
            &mut out,
        );
        assert_eq!(out.len(), 1);
        assert!(out[0].message().contains("bus2"));
    }
}
