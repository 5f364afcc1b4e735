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
    instance::{
        builder::InstanceBuilder, bus::Bus, err::InstanceLoaderError, inst::Instance,
        passenger::Passenger,
    },
    payload::records::{Arrivals, InitialPositionRecord},
};
use serde::Deserialize;
use shuttle_core::prelude::{Slot, Terminal};
use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum FleetSpec {
    Ids(Vec<BusIdentifier>),
    Count(u32),
}

#[derive(Debug, Clone, Deserialize)]
struct CaseFile {
    #[serde(rename = "T", alias = "T_end", alias = "horizon", default)]
    horizon: Option<Slot>,
    #[serde(rename = "T_start", alias = "start", default)]
    start: Option<Slot>,
    #[serde(default)]
    step: Option<Slot>,
    #[serde(default)]
    tau: Option<Slot>,
    #[serde(rename = "c_max", alias = "capacity", default)]
    capacity: Option<usize>,
    #[serde(default)]
    w_max: Option<Slot>,
    #[serde(rename = "B", alias = "buses", alias = "n", default)]
    fleet: Option<FleetSpec>,
    #[serde(default)]
    initial_at_a: Option<usize>,
    #[serde(default)]
    initial_positions: Vec<InitialPositionRecord>,
    #[serde(default)]
    arrivals: Arrivals,
}

/// Reads solver input cases from JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceLoader {
    fail_on_off_grid: bool,
}

impl Default for InstanceLoader {
    fn default() -> Self {
        Self {
            fail_on_off_grid: true,
        }
    }
}

impl InstanceLoader {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// When disabled, passengers arriving off the grid are dropped with a
    /// warning instead of failing the load.
    #[inline]
    pub fn fail_on_off_grid(mut self, yes: bool) -> Self {
        self.fail_on_off_grid = yes;
        self
    }

    pub fn from_value(&self, value: serde_json::Value) -> Result<Instance, InstanceLoaderError> {
        let case: CaseFile = serde_json::from_value(value).map_err(InstanceLoaderError::Json)?;
        self.from_case(case)
    }

    #[inline]
    pub fn from_path(&self, path: impl AsRef<Path>) -> Result<Instance, InstanceLoaderError> {
        let file = File::open(path).map_err(InstanceLoaderError::Io)?;
        self.from_reader(BufReader::new(file))
    }

    #[inline]
    pub fn from_reader<R: Read>(&self, r: R) -> Result<Instance, InstanceLoaderError> {
        let case: CaseFile = serde_json::from_reader(r).map_err(InstanceLoaderError::Json)?;
        self.from_case(case)
    }

    #[inline]
    pub fn from_str(&self, s: &str) -> Result<Instance, InstanceLoaderError> {
        self.from_reader(s.as_bytes())
    }

    fn from_case(&self, case: CaseFile) -> Result<Instance, InstanceLoaderError> {
        let horizon = case.horizon.ok_or(InstanceLoaderError::MissingField("T"))?;
        let tau = case.tau.ok_or(InstanceLoaderError::MissingField("tau"))?;
        let capacity = case
            .capacity
            .ok_or(InstanceLoaderError::MissingField("c_max"))?;
        let grid = TimeGrid::new(
            case.start.unwrap_or(0),
            case.step.unwrap_or(1),
            horizon,
            tau,
        )?;

        let ids: Vec<BusIdentifier> = match case.fleet {
            Some(FleetSpec::Ids(ids)) => ids,
            Some(FleetSpec::Count(n)) => (1..=n).map(BusIdentifier::new).collect(),
            None if !case.initial_positions.is_empty() => {
                case.initial_positions.iter().map(|r| r.bus).collect()
            }
            None => return Err(InstanceLoaderError::MissingField("B")),
        };

        let mut builder = InstanceBuilder::new(grid);
        if let Some(w) = case.w_max {
            builder = builder.w_max(w);
        }
        if let Some(k) = case.initial_at_a {
            builder = builder.initial_at_a(k);
        }

        builder.extend_buses(ids.into_iter().map(|id| {
            let bus = Bus::new(id, capacity);
            match case.initial_positions.iter().find(|r| r.bus == id) {
                Some(r) => bus.starting_at(r.terminal),
                None => bus,
            }
        }));

        for terminal in Terminal::ALL {
            for rec in case.arrivals.at(terminal).to_records() {
                let id = rec.p.to_passenger_id().map_err(InstanceLoaderError::ParseInt)?;
                if !self.fail_on_off_grid && !grid.is_valid_slot(rec.arr) {
                    tracing::warn!(
                        passenger = %id,
                        %terminal,
                        arrival = rec.arr,
                        "dropping passenger arriving off the time grid"
                    );
                    continue;
                }
                builder.add_passenger(Passenger::new(terminal, id, rec.arr));
            }
        }

        let instance = builder.build()?;
        tracing::debug!(
            buses = instance.bus_count(),
            passengers = instance.passenger_count(),
            horizon,
            tau,
            "loaded case"
        );
        Ok(instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        common::PassengerIdentifier,
        instance::{err::InstanceError, inst::InitialPlacement, passenger::PassengerKey},
    };

    const CASE: &str = r#"{
        "T": 20,
        "tau": 3,
        "c_max": 4,
        "w_max": 6,
        "B": [1, 2],
        "arrivals": {
            "A": [{"p": 1, "arr": 0}, {"p": "2", "arr": 5}],
            "B": [{"p": 1, "arr": 2}]
        }
    }"#;

    fn key(t: Terminal, n: u32) -> PassengerKey {
        PassengerKey::new(t, PassengerIdentifier::new(n))
    }

    #[test]
    fn test_load_basic_case() {
        let inst = InstanceLoader::new().from_str(CASE).unwrap();
        assert_eq!(inst.grid().horizon(), 20);
        assert_eq!(inst.tau(), 3);
        assert_eq!(inst.w_max(), 6);
        assert_eq!(inst.bus_count(), 2);
        assert_eq!(inst.max_capacity(), 4);
        assert_eq!(inst.passenger_count(), 3);
        assert_eq!(inst.passenger(key(Terminal::A, 2)).unwrap().arrival(), 5);
        assert_eq!(inst.passenger(key(Terminal::B, 1)).unwrap().arrival(), 2);
        assert_eq!(inst.placement(), InitialPlacement::AtA(2));
    }

    #[test]
    fn test_load_legacy_keys_and_bare_slots() {
        let s = r#"{
            "T_end": 12, "tau": 2, "capacity": 2, "n": 3, "initial_at_a": 1,
            "arrivals": {"CEI": [0, 0, 4], "T2": [1]}
        }"#;
        let inst = InstanceLoader::new().from_str(s).unwrap();
        assert_eq!(inst.bus_count(), 3);
        assert_eq!(inst.iter_passengers_at(Terminal::A).count(), 3);
        assert_eq!(inst.passenger(key(Terminal::A, 3)).unwrap().arrival(), 4);
        assert_eq!(inst.placement(), InitialPlacement::AtA(1));
        // No w_max given: the whole horizon.
        assert_eq!(inst.w_max(), 12);
    }

    #[test]
    fn test_initial_positions_pin_buses() {
        let s = r#"{
            "T": 10, "tau": 1, "c_max": 1,
            "initial_positions": [{"bus": 1, "terminal": "A"}, {"bus": 2, "terminal": "T2"}],
            "arrivals": {}
        }"#;
        let inst = InstanceLoader::new().from_str(s).unwrap();
        assert_eq!(inst.bus_count(), 2);
        assert_eq!(
            inst.initial_terminal_of(BusIdentifier::new(2)),
            Some(Terminal::B)
        );
    }

    #[test]
    fn test_missing_fields() {
        let err = InstanceLoader::new()
            .from_str(r#"{"tau": 1, "c_max": 1, "B": 1}"#)
            .unwrap_err();
        assert!(matches!(err, InstanceLoaderError::MissingField("T")));

        let err = InstanceLoader::new()
            .from_str(r#"{"T": 5, "tau": 1, "c_max": 1}"#)
            .unwrap_err();
        assert!(matches!(err, InstanceLoaderError::MissingField("B")));
    }

    #[test]
    fn test_bad_passenger_id() {
        let s = r#"{"T": 5, "tau": 1, "c_max": 1, "B": 1,
                    "arrivals": {"A": [{"p": "x1", "arr": 0}]}}"#;
        let err = InstanceLoader::new().from_str(s).unwrap_err();
        assert!(matches!(err, InstanceLoaderError::ParseInt(_)));
    }

    #[test]
    fn test_off_grid_arrivals() {
        let s = r#"{"T": 20, "step": 5, "tau": 5, "c_max": 1, "B": 1,
                    "arrivals": {"A": [{"p": 1, "arr": 3}, {"p": 2, "arr": 5}]}}"#;
        let err = InstanceLoader::new().from_str(s).unwrap_err();
        assert!(matches!(
            err,
            InstanceLoaderError::Instance(InstanceError::ArrivalOffGrid(_))
        ));

        let inst = InstanceLoader::new()
            .fail_on_off_grid(false)
            .from_str(s)
            .unwrap();
        assert_eq!(inst.passenger_count(), 1);
    }

    #[test]
    fn test_invalid_json() {
        let err = InstanceLoader::new().from_str("{").unwrap_err();
        assert!(matches!(err, InstanceLoaderError::Json(_)));
    }
}
