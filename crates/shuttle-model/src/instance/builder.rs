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
        bus::Bus,
        err::{ArrivalOffGridError, InstanceError},
        inst::Instance,
        passenger::Passenger,
    },
};
use shuttle_core::prelude::Slot;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct InstanceBuilder {
    grid: TimeGrid,
    w_max: Option<Slot>,
    buses: Vec<Bus>,
    passengers: Vec<Passenger>,
    at_a: Option<usize>,
}

impl InstanceBuilder {
    #[inline]
    pub fn new(grid: TimeGrid) -> Self {
        Self {
            grid,
            w_max: None,
            buses: Vec::new(),
            passengers: Vec::new(),
            at_a: None,
        }
    }

    /// Upper bound on any passenger's wait. Defaults to the horizon length.
    #[inline]
    pub fn w_max(mut self, w_max: Slot) -> Self {
        self.w_max = Some(w_max);
        self
    }

    #[inline]
    pub fn initial_at_a(mut self, at_a: usize) -> Self {
        self.at_a = Some(at_a);
        self
    }

    #[inline]
    pub fn with_buses<I>(mut self, buses: I) -> Self
    where
        I: IntoIterator<Item = Bus>,
    {
        self.buses.clear();
        self.buses.extend(buses);
        self
    }

    /// Appends `count` buses numbered from 1 with the same capacity.
    #[inline]
    pub fn with_uniform_fleet(mut self, count: u32, capacity: usize) -> Self {
        self.buses
            .extend((1..=count).map(|i| Bus::new(BusIdentifier::new(i), capacity)));
        self
    }

    #[inline]
    pub fn with_passengers<I>(mut self, passengers: I) -> Self
    where
        I: IntoIterator<Item = Passenger>,
    {
        self.passengers.clear();
        self.passengers.extend(passengers);
        self
    }

    #[inline]
    pub fn add_bus(&mut self, bus: Bus) -> &mut Self {
        self.buses.push(bus);
        self
    }

    #[inline]
    pub fn extend_buses<I>(&mut self, buses: I) -> &mut Self
    where
        I: IntoIterator<Item = Bus>,
    {
        self.buses.extend(buses);
        self
    }

    #[inline]
    pub fn add_passenger(&mut self, passenger: Passenger) -> &mut Self {
        self.passengers.push(passenger);
        self
    }

    #[inline]
    pub fn extend_passengers<I>(&mut self, passengers: I) -> &mut Self
    where
        I: IntoIterator<Item = Passenger>,
    {
        self.passengers.extend(passengers);
        self
    }

    pub fn build(self) -> Result<Instance, InstanceError> {
        let grid = self.grid;
        let w_max = self.w_max.unwrap_or(grid.horizon() - grid.start());
        if w_max < 0 {
            return Err(InstanceError::NegativeWaitBound(w_max));
        }

        let mut buses = BTreeMap::new();
        for bus in self.buses {
            if bus.capacity() == 0 {
                return Err(InstanceError::ZeroCapacity(bus.id()));
            }
            if buses.insert(bus.id(), bus).is_some() {
                return Err(InstanceError::DuplicateBus(bus.id()));
            }
        }

        if let Some(at_a) = self.at_a
            && at_a > buses.len()
        {
            return Err(InstanceError::PlacementExceedsFleet {
                at_a,
                buses: buses.len(),
            });
        }

        let mut passengers = BTreeMap::new();
        for p in self.passengers {
            if !grid.is_valid_slot(p.arrival()) {
                return Err(ArrivalOffGridError::new(p.key(), p.arrival()).into());
            }
            if passengers.insert(p.key(), p).is_some() {
                return Err(InstanceError::DuplicatePassenger(p.key()));
            }
        }

        Ok(Instance::new_unchecked(
            grid, w_max, buses, passengers, self.at_a,
        ))
    }
}
