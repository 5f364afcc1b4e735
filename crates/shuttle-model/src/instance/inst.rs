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
    grid::{SlotRange, TimeGrid},
    instance::{
        bus::Bus,
        passenger::{Passenger, PassengerKey},
    },
};
use shuttle_core::prelude::{Slot, Terminal};
use std::collections::BTreeMap;

/// Where the fleet stands at the first slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitialPlacement {
    /// The given number of buses start at A, the remainder at B; which
    /// bus starts where is left to the optimizer.
    AtA(usize),
    /// Every bus has a fixed starting terminal.
    Explicit(BTreeMap<BusIdentifier, Terminal>),
}

#[derive(Debug, Clone)]
pub struct Instance {
    grid: TimeGrid,
    w_max: Slot,
    buses: BTreeMap<BusIdentifier, Bus>,
    passengers: BTreeMap<PassengerKey, Passenger>,
    at_a: Option<usize>,
}

impl Instance {
    #[inline]
    pub(crate) fn new_unchecked(
        grid: TimeGrid,
        w_max: Slot,
        buses: BTreeMap<BusIdentifier, Bus>,
        passengers: BTreeMap<PassengerKey, Passenger>,
        at_a: Option<usize>,
    ) -> Self {
        Self {
            grid,
            w_max,
            buses,
            passengers,
            at_a,
        }
    }

    #[inline]
    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    #[inline]
    pub fn tau(&self) -> Slot {
        self.grid.tau()
    }

    #[inline]
    pub fn w_max(&self) -> Slot {
        self.w_max
    }

    #[inline]
    pub fn cutoff(&self) -> Slot {
        self.grid.cutoff()
    }

    #[inline]
    pub fn buses(&self) -> &BTreeMap<BusIdentifier, Bus> {
        &self.buses
    }

    #[inline]
    pub fn bus(&self, id: BusIdentifier) -> Option<&Bus> {
        self.buses.get(&id)
    }

    #[inline]
    pub fn bus_count(&self) -> usize {
        self.buses.len()
    }

    #[inline]
    pub fn iter_buses(&self) -> impl Iterator<Item = &Bus> {
        self.buses.values()
    }

    #[inline]
    pub fn passengers(&self) -> &BTreeMap<PassengerKey, Passenger> {
        &self.passengers
    }

    #[inline]
    pub fn passenger(&self, key: PassengerKey) -> Option<&Passenger> {
        self.passengers.get(&key)
    }

    #[inline]
    pub fn passenger_count(&self) -> usize {
        self.passengers.len()
    }

    #[inline]
    pub fn iter_passengers(&self) -> impl Iterator<Item = &Passenger> {
        self.passengers.values()
    }

    #[inline]
    pub fn iter_passengers_at(&self, origin: Terminal) -> impl Iterator<Item = &Passenger> {
        self.passengers.values().filter(move |p| p.origin() == origin)
    }

    #[inline]
    pub fn allowed_times(&self, passenger: &Passenger) -> SlotRange {
        self.grid.allowed_times(passenger.arrival())
    }

    /// Largest capacity in the fleet; zero for an empty fleet.
    #[inline]
    pub fn max_capacity(&self) -> usize {
        self.buses.values().map(Bus::capacity).max().unwrap_or(0)
    }

    pub fn placement(&self) -> InitialPlacement {
        let explicit: Option<BTreeMap<BusIdentifier, Terminal>> = self
            .buses
            .values()
            .map(|b| b.initial_terminal().map(|t| (b.id(), t)))
            .collect();

        match explicit {
            Some(map) if !map.is_empty() => InitialPlacement::Explicit(map),
            _ => InitialPlacement::AtA(self.at_a.unwrap_or(self.buses.len())),
        }
    }

    /// Starting terminal of `bus`, when the instance states it.
    ///
    /// Either the bus is pinned, or an explicit placement count puts the
    /// whole fleet on one side. The implicit all-at-A default used for model
    /// building does not count.
    pub fn initial_terminal_of(&self, bus: BusIdentifier) -> Option<Terminal> {
        let b = self.buses.get(&bus)?;
        if let Some(t) = b.initial_terminal() {
            return Some(t);
        }
        match self.at_a? {
            0 => Some(Terminal::B),
            n if n == self.buses.len() => Some(Terminal::A),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{common::PassengerIdentifier, instance::builder::InstanceBuilder};

    fn bid(n: u32) -> BusIdentifier {
        BusIdentifier::new(n)
    }

    fn pid(n: u32) -> PassengerIdentifier {
        PassengerIdentifier::new(n)
    }

    #[test]
    fn test_placement_defaults_to_all_at_a() {
        let inst = InstanceBuilder::new(TimeGrid::unit(10, 2).unwrap())
            .with_uniform_fleet(3, 5)
            .build()
            .unwrap();
        assert_eq!(inst.placement(), InitialPlacement::AtA(3));
        assert_eq!(inst.initial_terminal_of(bid(2)), None);
    }

    #[test]
    fn test_explicit_count_pins_a_one_sided_fleet() {
        let grid = TimeGrid::unit(10, 2).unwrap();
        let all_a = InstanceBuilder::new(grid)
            .with_uniform_fleet(3, 5)
            .initial_at_a(3)
            .build()
            .unwrap();
        assert_eq!(all_a.initial_terminal_of(bid(2)), Some(Terminal::A));
        assert_eq!(all_a.initial_terminal_of(bid(9)), None);

        let all_b = InstanceBuilder::new(grid)
            .with_uniform_fleet(3, 5)
            .initial_at_a(0)
            .build()
            .unwrap();
        assert_eq!(all_b.initial_terminal_of(bid(1)), Some(Terminal::B));
    }

    #[test]
    fn test_placement_split_leaves_terminal_open() {
        let inst = InstanceBuilder::new(TimeGrid::unit(10, 2).unwrap())
            .with_uniform_fleet(3, 5)
            .initial_at_a(2)
            .build()
            .unwrap();
        assert_eq!(inst.placement(), InitialPlacement::AtA(2));
        assert_eq!(inst.initial_terminal_of(bid(1)), None);
    }

    #[test]
    fn test_explicit_placement_when_every_bus_is_pinned() {
        let mut b = InstanceBuilder::new(TimeGrid::unit(10, 2).unwrap());
        b.add_bus(Bus::new(bid(1), 5).starting_at(Terminal::A))
            .add_bus(Bus::new(bid(2), 5).starting_at(Terminal::B));
        let inst = b.build().unwrap();
        match inst.placement() {
            InitialPlacement::Explicit(m) => {
                assert_eq!(m[&bid(1)], Terminal::A);
                assert_eq!(m[&bid(2)], Terminal::B);
            }
            other => panic!("unexpected placement {other:?}"),
        }
        assert_eq!(inst.initial_terminal_of(bid(2)), Some(Terminal::B));
    }

    #[test]
    fn test_passenger_lookup_by_origin() {
        let mut b = InstanceBuilder::new(TimeGrid::unit(10, 2).unwrap());
        b.add_passenger(Passenger::new(Terminal::A, pid(1), 0))
            .add_passenger(Passenger::new(Terminal::B, pid(1), 3));
        let inst = b.with_uniform_fleet(1, 2).build().unwrap();
        assert_eq!(inst.passenger_count(), 2);
        assert_eq!(inst.iter_passengers_at(Terminal::B).count(), 1);
        let p = inst
            .passenger(PassengerKey::new(Terminal::B, pid(1)))
            .unwrap();
        assert_eq!(p.arrival(), 3);
        assert_eq!(inst.allowed_times(p).len(), 6);
    }
}
