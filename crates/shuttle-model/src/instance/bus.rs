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

use crate::common::BusIdentifier;
use shuttle_core::prelude::Terminal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bus {
    id: BusIdentifier,
    capacity: usize,
    initial_terminal: Option<Terminal>,
}

impl Bus {
    #[inline]
    pub fn new(id: BusIdentifier, capacity: usize) -> Self {
        Self {
            id,
            capacity,
            initial_terminal: None,
        }
    }

    #[inline]
    pub fn starting_at(mut self, terminal: Terminal) -> Self {
        self.initial_terminal = Some(terminal);
        self
    }

    #[inline]
    pub fn id(&self) -> BusIdentifier {
        self.id
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn initial_terminal(&self) -> Option<Terminal> {
        self.initial_terminal
    }
}
