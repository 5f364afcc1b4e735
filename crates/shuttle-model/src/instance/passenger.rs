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

use crate::common::PassengerIdentifier;
use serde::{Deserialize, Serialize};
use shuttle_core::prelude::{Slot, Terminal};

/// Passenger ids are only unique per origin terminal, so the pair is the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PassengerKey {
    origin: Terminal,
    id: PassengerIdentifier,
}

impl PassengerKey {
    #[inline]
    pub const fn new(origin: Terminal, id: PassengerIdentifier) -> Self {
        Self { origin, id }
    }

    #[inline]
    pub fn origin(&self) -> Terminal {
        self.origin
    }

    #[inline]
    pub fn id(&self) -> PassengerIdentifier {
        self.id
    }
}

impl std::fmt::Display for PassengerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.origin, self.id.value())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Passenger {
    key: PassengerKey,
    arrival: Slot,
}

impl Passenger {
    #[inline]
    pub fn new(origin: Terminal, id: PassengerIdentifier, arrival: Slot) -> Self {
        Self {
            key: PassengerKey::new(origin, id),
            arrival,
        }
    }

    #[inline]
    pub fn key(&self) -> PassengerKey {
        self.key
    }

    #[inline]
    pub fn id(&self) -> PassengerIdentifier {
        self.key.id()
    }

    #[inline]
    pub fn origin(&self) -> Terminal {
        self.key.origin()
    }

    #[inline]
    pub fn arrival(&self) -> Slot {
        self.arrival
    }
}
