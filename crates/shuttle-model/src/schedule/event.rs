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
    instance::passenger::PassengerKey,
};
use shuttle_core::prelude::{Slot, Terminal};

/// One trip start of a bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DepartureEvent {
    bus: BusIdentifier,
    terminal: Terminal,
    time: Slot,
}

impl DepartureEvent {
    #[inline]
    pub fn new(bus: BusIdentifier, terminal: Terminal, time: Slot) -> Self {
        Self {
            bus,
            terminal,
            time,
        }
    }

    #[inline]
    pub fn bus(&self) -> BusIdentifier {
        self.bus
    }

    #[inline]
    pub fn terminal(&self) -> Terminal {
        self.terminal
    }

    #[inline]
    pub fn time(&self) -> Slot {
        self.time
    }

    /// Terminal and slot at which the bus becomes available again.
    #[inline]
    pub fn arrival(&self, tau: Slot) -> (Terminal, Slot) {
        (self.terminal.opposite(), self.time + tau)
    }
}

impl std::fmt::Display for DepartureEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "bus {} leaves {} at t={}", self.bus.value(), self.terminal, self.time)
    }
}

/// A single passenger boarding a departure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Boarding {
    terminal: Terminal,
    passenger: PassengerIdentifier,
    bus: BusIdentifier,
    time: Slot,
    wait: Option<Slot>,
}

impl Boarding {
    #[inline]
    pub fn new(terminal: Terminal, passenger: PassengerIdentifier, bus: BusIdentifier, time: Slot) -> Self {
        Self {
            terminal,
            passenger,
            bus,
            time,
            wait: None,
        }
    }

    /// Attaches the wait as reported by whoever produced the schedule.
    #[inline]
    pub fn with_wait(mut self, wait: Slot) -> Self {
        self.wait = Some(wait);
        self
    }

    #[inline]
    pub fn terminal(&self) -> Terminal {
        self.terminal
    }

    #[inline]
    pub fn passenger(&self) -> PassengerIdentifier {
        self.passenger
    }

    #[inline]
    pub fn key(&self) -> PassengerKey {
        PassengerKey::new(self.terminal, self.passenger)
    }

    #[inline]
    pub fn bus(&self) -> BusIdentifier {
        self.bus
    }

    #[inline]
    pub fn time(&self) -> Slot {
        self.time
    }

    #[inline]
    pub fn reported_wait(&self) -> Option<Slot> {
        self.wait
    }

    #[inline]
    pub fn departure(&self) -> DepartureEvent {
        DepartureEvent::new(self.bus, self.terminal, self.time)
    }
}

/// Boardings grouped by the departure they ride.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssignmentEvent {
    terminal: Terminal,
    bus: BusIdentifier,
    time: Slot,
    passengers: Vec<PassengerIdentifier>,
}

impl AssignmentEvent {
    #[inline]
    pub fn new(
        terminal: Terminal,
        bus: BusIdentifier,
        time: Slot,
        passengers: Vec<PassengerIdentifier>,
    ) -> Self {
        Self {
            terminal,
            bus,
            time,
            passengers,
        }
    }

    #[inline]
    pub fn terminal(&self) -> Terminal {
        self.terminal
    }

    #[inline]
    pub fn bus(&self) -> BusIdentifier {
        self.bus
    }

    #[inline]
    pub fn time(&self) -> Slot {
        self.time
    }

    #[inline]
    pub fn passengers(&self) -> &[PassengerIdentifier] {
        &self.passengers
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.passengers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.passengers.is_empty()
    }

    #[inline]
    pub fn departure(&self) -> DepartureEvent {
        DepartureEvent::new(self.bus, self.terminal, self.time)
    }
}
