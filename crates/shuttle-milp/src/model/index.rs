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

use crate::formulation::VarId;
use shuttle_core::prelude::{Slot, SquareSurrogate, Terminal};
use shuttle_model::prelude::{
    BusIdentifier, InitialPlacement, Instance, PassengerKey, Schedule, TimeGrid,
};
use std::collections::BTreeMap;

pub type AssignmentKey = (PassengerKey, BusIdentifier, Slot);
pub type BusSlotKey = (BusIdentifier, Terminal, Slot);

/// Where every decision variable of a built model lives.
#[derive(Debug, Clone)]
pub struct ModelIndex {
    grid: TimeGrid,
    transit_slots: usize,
    var_count: usize,
    assignments: BTreeMap<AssignmentKey, VarId>,
    departures: BTreeMap<BusSlotKey, VarId>,
    available: BTreeMap<BusSlotKey, VarId>,
    waits: BTreeMap<PassengerKey, VarId>,
    surrogates: BTreeMap<PassengerKey, VarId>,
    surrogate: Option<SquareSurrogate<f64>>,
}

impl ModelIndex {
    pub(crate) fn new(grid: TimeGrid, surrogate: Option<SquareSurrogate<f64>>) -> Self {
        Self {
            grid,
            transit_slots: grid.tau_slots().max(1),
            var_count: 0,
            assignments: BTreeMap::new(),
            departures: BTreeMap::new(),
            available: BTreeMap::new(),
            waits: BTreeMap::new(),
            surrogates: BTreeMap::new(),
            surrogate,
        }
    }

    pub(crate) fn insert_assignment(&mut self, key: AssignmentKey, var: VarId) {
        self.assignments.insert(key, var);
    }

    pub(crate) fn insert_departure(&mut self, key: BusSlotKey, var: VarId) {
        self.departures.insert(key, var);
    }

    pub(crate) fn insert_available(&mut self, key: BusSlotKey, var: VarId) {
        self.available.insert(key, var);
    }

    pub(crate) fn insert_wait(&mut self, key: PassengerKey, var: VarId) {
        self.waits.insert(key, var);
    }

    pub(crate) fn insert_surrogate(&mut self, key: PassengerKey, var: VarId) {
        self.surrogates.insert(key, var);
    }

    pub(crate) fn set_var_count(&mut self, n: usize) {
        self.var_count = n;
    }

    #[inline]
    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    /// Slots a trip occupies; a zero travel delay still takes one slot.
    #[inline]
    pub fn transit_slots(&self) -> usize {
        self.transit_slots
    }

    #[inline]
    pub fn var_count(&self) -> usize {
        self.var_count
    }

    #[inline]
    pub fn assignment(&self, key: PassengerKey, bus: BusIdentifier, t: Slot) -> Option<VarId> {
        self.assignments.get(&(key, bus, t)).copied()
    }

    #[inline]
    pub fn departure(&self, bus: BusIdentifier, terminal: Terminal, t: Slot) -> Option<VarId> {
        self.departures.get(&(bus, terminal, t)).copied()
    }

    #[inline]
    pub fn available(&self, bus: BusIdentifier, terminal: Terminal, t: Slot) -> Option<VarId> {
        self.available.get(&(bus, terminal, t)).copied()
    }

    #[inline]
    pub fn wait(&self, key: PassengerKey) -> Option<VarId> {
        self.waits.get(&key).copied()
    }

    #[inline]
    pub fn surrogate_var(&self, key: PassengerKey) -> Option<VarId> {
        self.surrogates.get(&key).copied()
    }

    #[inline]
    pub fn surrogate(&self) -> Option<&SquareSurrogate<f64>> {
        self.surrogate.as_ref()
    }

    #[inline]
    pub fn iter_assignments(&self) -> impl Iterator<Item = (&AssignmentKey, &VarId)> {
        self.assignments.iter()
    }

    #[inline]
    pub fn iter_departures(&self) -> impl Iterator<Item = (&BusSlotKey, &VarId)> {
        self.departures.iter()
    }

    #[inline]
    pub fn assignment_count(&self) -> usize {
        self.assignments.len()
    }

    #[inline]
    pub fn departure_count(&self) -> usize {
        self.departures.len()
    }

    /// Variable values that represent `schedule` in this model.
    ///
    /// Bus availability is replayed from the departures. Buses without a
    /// stated start take the terminal of their first departure; idle ones
    /// fill the placement count. The result can be checked with
    /// [`crate::formulation::MilpProblem::violated_constraints`].
    pub fn encode(&self, instance: &Instance, schedule: &Schedule) -> Vec<f64> {
        let mut values = vec![0.0; self.var_count];
        let mut set = |var: Option<VarId>, value: f64| {
            if let Some(v) = var
                && let Some(slot) = values.get_mut(v.index())
            {
                *slot = value;
            }
        };

        for b in schedule.boardings() {
            set(self.assignment(b.key(), b.bus(), b.time()), 1.0);
            if let Some(p) = instance.passenger(b.key()) {
                let wait = b.time() - p.arrival();
                set(self.wait(b.key()), wait as f64);
                let charge = match &self.surrogate {
                    Some(s) => s.evaluate(wait as f64),
                    None => wait as f64,
                };
                set(self.surrogate_var(b.key()), charge);
            }
        }

        let by_bus = schedule.departures_by_bus();
        for (bus, start) in self.starting_terminals(instance, schedule) {
            let plan: BTreeMap<usize, Terminal> = by_bus
                .get(&bus)
                .into_iter()
                .flatten()
                .filter_map(|d| self.grid.slot_index(d.time()).map(|i| (i, d.terminal())))
                .collect();

            let mut at = Some(start);
            let mut inbound: Option<(Terminal, usize)> = None;
            for (i, t) in self.grid.slots().into_iter().enumerate() {
                if let Some((to, when)) = inbound
                    && i >= when
                {
                    at = Some(to);
                    inbound = None;
                }
                if let Some(here) = at {
                    set(self.available(bus, here, t), 1.0);
                }
                if let Some(&from) = plan.get(&i) {
                    set(self.departure(bus, from, t), 1.0);
                    at = None;
                    inbound = Some((from.opposite(), i + self.transit_slots));
                }
            }
        }
        values
    }

    fn starting_terminals(
        &self,
        instance: &Instance,
        schedule: &Schedule,
    ) -> Vec<(BusIdentifier, Terminal)> {
        let by_bus = schedule.departures_by_bus();
        match instance.placement() {
            InitialPlacement::Explicit(map) => map.into_iter().collect(),
            InitialPlacement::AtA(at_a) => {
                let mut starts: Vec<(BusIdentifier, Option<Terminal>)> = instance
                    .iter_buses()
                    .map(|b| {
                        let first = by_bus
                            .get(&b.id())
                            .and_then(|ds| ds.first())
                            .map(|d| d.terminal());
                        (b.id(), first)
                    })
                    .collect();
                let mut left_at_a = at_a.saturating_sub(
                    starts
                        .iter()
                        .filter(|(_, t)| *t == Some(Terminal::A))
                        .count(),
                );
                for (_, t) in starts.iter_mut().filter(|(_, t)| t.is_none()) {
                    if left_at_a > 0 {
                        *t = Some(Terminal::A);
                        left_at_a -= 1;
                    } else {
                        *t = Some(Terminal::B);
                    }
                }
                starts
                    .into_iter()
                    .filter_map(|(b, t)| t.map(|t| (b, t)))
                    .collect()
            }
        }
    }
}
