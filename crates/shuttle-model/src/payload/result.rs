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
    instance::inst::Instance,
    objective::ObjectiveKind,
    payload::{
        err::PayloadReadError,
        parse_document, read_document,
        records::{
            ArrivalList, ArrivalRecord, Arrivals, AssignmentRecord, DepartureRecord,
            InitialPositionRecord,
        },
    },
    schedule::sched::Schedule,
};
use serde::{Deserialize, Serialize};
use shuttle_core::prelude::{Slot, Terminal};
use std::{collections::BTreeMap, path::Path};

/// Parameters echoed next to a schedule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PayloadMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tau: Option<Slot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w_max: Option<Slot>,
    #[serde(rename = "T_start", default, skip_serializing_if = "Option::is_none")]
    pub t_start: Option<Slot>,
    #[serde(rename = "T_end", default, skip_serializing_if = "Option::is_none")]
    pub t_end: Option<Slot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<Slot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objective: Option<ObjectiveKind>,
}

impl PayloadMeta {
    pub fn of_instance(instance: &Instance, objective: ObjectiveKind) -> Self {
        let grid = instance.grid();
        Self {
            tau: Some(grid.tau()),
            capacity: Some(instance.max_capacity()),
            w_max: Some(instance.w_max()),
            t_start: Some(grid.start()),
            t_end: Some(grid.horizon()),
            step: (grid.step() != 1).then_some(grid.step()),
            objective: Some(objective),
        }
    }

    #[inline]
    pub fn objective_kind(&self) -> ObjectiveKind {
        self.objective.unwrap_or_default()
    }
}

/// The JSON record a solver run produces and the verifier consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultPayload {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub objective: Option<f64>,
    #[serde(default)]
    pub meta: Option<PayloadMeta>,
    #[serde(default)]
    pub initial_positions: Vec<InitialPositionRecord>,
    #[serde(default)]
    pub arrivals: Arrivals,
    #[serde(default)]
    pub departures: Vec<DepartureRecord>,
    #[serde(default)]
    pub assignments: Vec<AssignmentRecord>,
    /// Wall-clock seconds spent solving.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<f64>,
}

impl ResultPayload {
    #[inline]
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PayloadReadError> {
        read_document(path)
    }

    #[inline]
    pub fn from_str(s: &str) -> Result<Self, PayloadReadError> {
        parse_document(s)
    }

    /// Serializes a schedule together with the instance it solves.
    ///
    /// Buses whose starting terminal the instance leaves open are written
    /// with the terminal of their first departure.
    pub fn from_schedule(instance: &Instance, schedule: &Schedule, objective: ObjectiveKind) -> Self {
        let by_bus = schedule.departures_by_bus();
        let initial_positions = instance
            .iter_buses()
            .filter_map(|b| {
                instance
                    .initial_terminal_of(b.id())
                    .or_else(|| by_bus.get(&b.id()).and_then(|d| d.first()).map(|d| d.terminal()))
                    .map(|terminal| InitialPositionRecord {
                        bus: b.id(),
                        terminal,
                    })
            })
            .collect();

        let arrivals_at = |terminal: Terminal| {
            ArrivalList::Records(
                instance
                    .iter_passengers_at(terminal)
                    .map(|p| ArrivalRecord {
                        p: p.id().into(),
                        arr: p.arrival(),
                    })
                    .collect(),
            )
        };

        let mut departures: Vec<DepartureRecord> = schedule
            .departures()
            .iter()
            .map(|d| DepartureRecord {
                terminal: d.terminal(),
                bus: d.bus(),
                t: d.time(),
            })
            .collect();
        departures.sort_by_key(|d| (d.t, d.bus, d.terminal));

        let assignments = schedule
            .boardings()
            .iter()
            .map(|b| AssignmentRecord {
                terminal: b.terminal(),
                p: b.passenger().into(),
                bus: b.bus(),
                t: b.time(),
                wait: b.reported_wait().or_else(|| {
                    instance
                        .passenger(b.key())
                        .map(|p| b.time() - p.arrival())
                }),
            })
            .collect();

        Self {
            status: Some(schedule.status().as_str().to_string()),
            objective: schedule.objective(),
            meta: Some(PayloadMeta::of_instance(instance, objective)),
            initial_positions,
            arrivals: Arrivals {
                a: arrivals_at(Terminal::A),
                b: arrivals_at(Terminal::B),
            },
            departures,
            assignments,
            runtime: None,
        }
    }

    #[inline]
    pub fn with_runtime(mut self, seconds: f64) -> Self {
        self.runtime = Some(seconds);
        self
    }

    /// Arrival slot per passenger label, per terminal.
    pub fn arrival_labels(&self) -> BTreeMap<(Terminal, String), Slot> {
        let mut out = BTreeMap::new();
        for terminal in Terminal::ALL {
            for r in self.arrivals.at(terminal).to_records() {
                out.insert((terminal, r.p.to_label()), r.arr);
            }
        }
        out
    }
}
