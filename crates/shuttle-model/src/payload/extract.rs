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
    grid::TimeGrid,
    instance::{builder::InstanceBuilder, bus::Bus, inst::Instance, passenger::Passenger},
    payload::{
        err::{MalformedResult, TimeOffGridError, UndeclaredBusError},
        result::ResultPayload,
    },
    schedule::{
        event::{Boarding, DepartureEvent},
        sched::Schedule,
        status::ScheduleStatus,
    },
};
use shuttle_core::prelude::Terminal;
use std::collections::{BTreeMap, BTreeSet};

/// Turns result payloads into an instance and the schedule claimed for it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduleExtractor;

impl ScheduleExtractor {
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn from_payload(payload: &ResultPayload) -> Result<(Instance, Schedule), MalformedResult> {
        let status = payload
            .status
            .as_deref()
            .ok_or(MalformedResult::MissingField("status"))?;
        let status = ScheduleStatus::parse(status)?;

        let meta = payload
            .meta
            .as_ref()
            .ok_or(MalformedResult::MissingField("meta"))?;
        let tau = meta.tau.ok_or(MalformedResult::MissingField("meta.tau"))?;
        let capacity = meta
            .capacity
            .ok_or(MalformedResult::MissingField("meta.capacity"))?;
        let w_max = meta.w_max.ok_or(MalformedResult::MissingField("meta.w_max"))?;
        let t_end = meta.t_end.ok_or(MalformedResult::MissingField("meta.T_end"))?;
        let grid = TimeGrid::new(
            meta.t_start.unwrap_or(0),
            meta.step.unwrap_or(1),
            t_end,
            tau,
        )?;

        let declared: BTreeMap<BusIdentifier, Terminal> = payload
            .initial_positions
            .iter()
            .map(|r| (r.bus, r.terminal))
            .collect();
        let used: BTreeSet<BusIdentifier> = payload
            .departures
            .iter()
            .map(|d| d.bus)
            .chain(payload.assignments.iter().map(|a| a.bus))
            .collect();

        let buses: Vec<Bus> = if declared.is_empty() {
            used.iter().map(|&id| Bus::new(id, capacity)).collect()
        } else {
            if let Some(&bus) = used.iter().find(|b| !declared.contains_key(b)) {
                return Err(UndeclaredBusError::new(bus).into());
            }
            declared
                .iter()
                .map(|(&id, &t)| Bus::new(id, capacity).starting_at(t))
                .collect()
        };

        let mut builder = InstanceBuilder::new(grid).w_max(w_max).with_buses(buses);
        for terminal in Terminal::ALL {
            for r in payload.arrivals.at(terminal).to_records() {
                builder.add_passenger(Passenger::new(terminal, r.p.to_passenger_id()?, r.arr));
            }
        }
        let instance = builder.build()?;

        let mut departures = Vec::with_capacity(payload.departures.len());
        for d in &payload.departures {
            if !grid.is_valid_slot(d.t) {
                return Err(TimeOffGridError::new("departure", d.t).into());
            }
            departures.push(DepartureEvent::new(d.bus, d.terminal, d.t));
        }

        let mut boardings = Vec::with_capacity(payload.assignments.len());
        for a in &payload.assignments {
            if !grid.is_valid_slot(a.t) {
                return Err(TimeOffGridError::new("assignment", a.t).into());
            }
            let boarding = Boarding::new(a.terminal, a.p.to_passenger_id()?, a.bus, a.t);
            boardings.push(match a.wait {
                Some(w) => boarding.with_wait(w),
                None => boarding,
            });
        }

        tracing::debug!(
            %status,
            departures = departures.len(),
            boardings = boardings.len(),
            "extracted schedule from payload"
        );
        Ok((
            instance,
            Schedule::new(status, payload.objective, departures, boardings),
        ))
    }
}
