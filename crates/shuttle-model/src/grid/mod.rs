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

pub mod err;

use crate::grid::err::TimeGridError;
use shuttle_core::prelude::Slot;

/// Uniform discretization of the planning horizon.
///
/// Valid slots are `start, start + step, ...` up to and including the last
/// one not past `horizon`. All quantities, `tau` included, are expressed in
/// the same time unit as the slots themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeGrid {
    start: Slot,
    step: Slot,
    horizon: Slot,
    tau: Slot,
}

impl TimeGrid {
    pub fn new(start: Slot, step: Slot, horizon: Slot, tau: Slot) -> Result<Self, TimeGridError> {
        if step <= 0 {
            return Err(TimeGridError::NonPositiveStep(step));
        }
        if tau < 0 {
            return Err(TimeGridError::NegativeTau(tau));
        }
        if horizon < start {
            return Err(TimeGridError::HorizonBeforeStart { start, horizon });
        }
        if tau % step != 0 {
            return Err(TimeGridError::TauNotMultipleOfStep { tau, step });
        }
        Ok(Self {
            start,
            step,
            horizon,
            tau,
        })
    }

    /// Grid starting at zero with unit slots.
    #[inline]
    pub fn unit(horizon: Slot, tau: Slot) -> Result<Self, TimeGridError> {
        Self::new(0, 1, horizon, tau)
    }

    #[inline]
    pub fn start(&self) -> Slot {
        self.start
    }

    #[inline]
    pub fn step(&self) -> Slot {
        self.step
    }

    #[inline]
    pub fn horizon(&self) -> Slot {
        self.horizon
    }

    #[inline]
    pub fn tau(&self) -> Slot {
        self.tau
    }

    #[inline]
    pub fn tau_slots(&self) -> usize {
        (self.tau / self.step) as usize
    }

    /// Last slot from which a departure still completes within the horizon.
    #[inline]
    pub fn cutoff(&self) -> Slot {
        self.horizon - self.tau
    }

    #[inline]
    pub fn last_slot(&self) -> Slot {
        self.floor_to_grid(self.horizon)
    }

    #[inline]
    pub fn len(&self) -> usize {
        ((self.last_slot() - self.start) / self.step) as usize + 1
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    #[inline]
    pub fn slots(&self) -> SlotRange {
        SlotRange::new(self.start, self.last_slot(), self.step)
    }

    #[inline]
    pub fn is_valid_slot(&self, t: Slot) -> bool {
        t >= self.start && t <= self.horizon && (t - self.start) % self.step == 0
    }

    #[inline]
    pub fn slot_index(&self, t: Slot) -> Option<usize> {
        self.is_valid_slot(t)
            .then(|| ((t - self.start) / self.step) as usize)
    }

    #[inline]
    pub fn slot_at(&self, index: usize) -> Option<Slot> {
        (index < self.len()).then(|| self.start + index as Slot * self.step)
    }

    /// Ordered boarding slots `[arrival, cutoff]` open to a passenger.
    ///
    /// An off-grid arrival is rounded up to the next slot. The range is
    /// empty when the passenger arrives after the cutoff.
    pub fn allowed_times(&self, arrival: Slot) -> SlotRange {
        let first = self.ceil_to_grid(arrival.max(self.start));
        let last = self.floor_to_grid(self.cutoff().min(self.horizon));
        SlotRange::new(first, last, self.step)
    }

    #[inline]
    fn floor_to_grid(&self, t: Slot) -> Slot {
        self.start + (t - self.start).div_euclid(self.step) * self.step
    }

    #[inline]
    fn ceil_to_grid(&self, t: Slot) -> Slot {
        let floor = self.floor_to_grid(t);
        if floor == t { t } else { floor + self.step }
    }
}

/// Inclusive, evenly spaced range of slots; empty when `first > last`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotRange {
    first: Slot,
    last: Slot,
    step: Slot,
}

impl SlotRange {
    #[inline]
    fn new(first: Slot, last: Slot, step: Slot) -> Self {
        Self { first, last, step }
    }

    #[inline]
    pub fn first(&self) -> Option<Slot> {
        (!self.is_empty()).then_some(self.first)
    }

    #[inline]
    pub fn last(&self) -> Option<Slot> {
        (!self.is_empty()).then_some(self.last)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.first > self.last
    }

    #[inline]
    pub fn len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            ((self.last - self.first) / self.step) as usize + 1
        }
    }

    #[inline]
    pub fn contains(&self, t: Slot) -> bool {
        !self.is_empty() && t >= self.first && t <= self.last && (t - self.first) % self.step == 0
    }

    #[inline]
    pub fn iter(&self) -> <Self as IntoIterator>::IntoIter {
        (*self).into_iter()
    }
}

impl IntoIterator for SlotRange {
    type Item = Slot;
    type IntoIter = std::iter::StepBy<std::ops::RangeInclusive<Slot>>;

    fn into_iter(self) -> Self::IntoIter {
        let end = if self.is_empty() {
            self.first - 1
        } else {
            self.last
        };
        (self.first..=end).step_by(self.step as usize)
    }
}
