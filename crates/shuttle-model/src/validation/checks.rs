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

//! Individual schedule checks. Each appends its findings and never stops early.

use crate::{
    common::BusIdentifier,
    instance::{inst::Instance, passenger::PassengerKey},
    objective::ObjectiveKind,
    schedule::{event::DepartureEvent, sched::Schedule},
    validation::{
        flow::check_bus_flow,
        violation::{Violation, ViolationKind},
    },
};
use std::collections::{BTreeMap, BTreeSet};

/// Boardings per passenger key.
pub(crate) fn boarding_counts(schedule: &Schedule) -> BTreeMap<PassengerKey, usize> {
    let mut counts = BTreeMap::new();
    for b in schedule.boardings() {
        *counts.entry(b.key()).or_insert(0) += 1;
    }
    counts
}

/// Every known passenger boards exactly once.
pub fn check_uniqueness(instance: &Instance, schedule: &Schedule, out: &mut Vec<Violation>) {
    let counts = boarding_counts(schedule);
    for p in instance.iter_passengers() {
        let n = counts.get(&p.key()).copied().unwrap_or(0);
        if n != 1 {
            out.push(Violation::new(
                ViolationKind::Uniqueness,
                format!("passenger {} assigned {} times (expected 1)", p.key(), n),
            ));
        }
    }
}

/// Every boarding rides an existing departure of a known bus.
pub fn check_links(instance: &Instance, schedule: &Schedule, out: &mut Vec<Violation>) {
    let unknown: BTreeSet<BusIdentifier> = schedule
        .departures()
        .iter()
        .map(DepartureEvent::bus)
        .chain(schedule.boardings().iter().map(|b| b.bus()))
        .filter(|b| instance.bus(*b).is_none())
        .collect();
    for bus in unknown {
        out.push(Violation::new(
            ViolationKind::UnknownBus,
            format!("bus{} is not part of the fleet", bus.value()),
        ));
    }

    let departures: BTreeSet<DepartureEvent> = schedule.departures().iter().copied().collect();
    for b in schedule.boardings() {
        if !departures.contains(&b.departure()) {
            out.push(Violation::new(
                ViolationKind::Link,
                format!(
                    "{} bus{} t={} p={} has no matching departure",
                    b.terminal(),
                    b.bus().value(),
                    b.time(),
                    b.passenger().value()
                ),
            ));
        }
    }
}

/// Boardings per departure stay within the bus capacity.
pub fn check_capacity(instance: &Instance, schedule: &Schedule, out: &mut Vec<Violation>) {
    for ev in schedule.assignment_events() {
        let Some(bus) = instance.bus(ev.bus()) else {
            continue;
        };
        if ev.len() > bus.capacity() {
            out.push(Violation::new(
                ViolationKind::Capacity,
                format!(
                    "{} bus{} t={}: {} > {}",
                    ev.terminal(),
                    ev.bus().value(),
                    ev.time(),
                    ev.len(),
                    bus.capacity()
                ),
            ));
        }
    }
}

/// Reported waits, wait bounds and the late-boarding cutoff.
pub fn check_waits(instance: &Instance, schedule: &Schedule, out: &mut Vec<Violation>) {
    let cutoff = instance.cutoff();
    let w_max = instance.w_max();
    for b in schedule.boardings() {
        let key = b.key();
        let Some(p) = instance.passenger(key) else {
            out.push(Violation::new(
                ViolationKind::Arrival,
                format!("no arrival on record for {}", key),
            ));
            continue;
        };
        let wait = b.time() - p.arrival();
        if let Some(reported) = b.reported_wait()
            && reported != wait
        {
            out.push(Violation::new(
                ViolationKind::Wait,
                format!(
                    "wrong wait for {} at t={}: got {}, expect {}",
                    key,
                    b.time(),
                    reported,
                    wait
                ),
            ));
        }
        if wait < 0 {
            out.push(Violation::new(
                ViolationKind::Arrival,
                format!(
                    "negative wait for {}: arrival {}, boards at t={}",
                    key,
                    p.arrival(),
                    b.time()
                ),
            ));
        }
        if wait > w_max {
            out.push(Violation::new(
                ViolationKind::WaitBound,
                format!("wait {} > w_max {} for {}", wait, w_max, key),
            ));
        }
        if b.time() > cutoff {
            out.push(Violation::new(
                ViolationKind::Late,
                format!(
                    "{} boards at t={} after the cutoff {}",
                    key,
                    b.time(),
                    cutoff
                ),
            ));
        }
    }
}

/// Per-bus departure sequences are physically possible.
pub fn check_flow(instance: &Instance, schedule: &Schedule, out: &mut Vec<Violation>) {
    check_bus_flow(
        instance.tau(),
        &schedule.departures_by_bus(),
        |bus| instance.initial_terminal_of(bus),
        out,
    );
}

/// Reported objective matches the one recomputed from the waits.
pub fn check_objective(
    instance: &Instance,
    schedule: &Schedule,
    objective: ObjectiveKind,
    tolerance: f64,
    out: &mut Vec<Violation>,
) {
    let Some(reported) = schedule.objective() else {
        return;
    };
    let waits = schedule.boardings().iter().filter_map(|b| {
        b.reported_wait().or_else(|| {
            instance
                .passenger(b.key())
                .map(|p| b.time() - p.arrival())
        })
    });
    match objective.evaluate(instance.w_max(), waits) {
        Ok(recomputed) => {
            if !reported.is_finite() || (reported - recomputed).abs() > tolerance {
                out.push(Violation::new(
                    ViolationKind::Objective,
                    format!(
                        "objective reported {} but recomputed {} ({})",
                        reported, recomputed, objective
                    ),
                ));
            }
        }
        Err(e) => out.push(Violation::new(
            ViolationKind::Objective,
            format!("cannot recompute the {} objective: {}", objective, e),
        )),
    }
}
