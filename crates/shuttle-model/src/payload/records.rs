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

//! Record shapes shared by case files, result payloads and expected cases.

use crate::common::{BusIdentifier, PassengerIdentifier};
use serde::{Deserialize, Serialize};
use shuttle_core::prelude::{Slot, Terminal};
use std::num::ParseIntError;

/// A passenger id as written by external tools: a number or a numeric string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LooseId {
    Number(u32),
    Text(String),
}

impl LooseId {
    pub fn to_passenger_id(&self) -> Result<PassengerIdentifier, ParseIntError> {
        match self {
            LooseId::Number(n) => Ok(PassengerIdentifier::new(*n)),
            LooseId::Text(s) => s.trim().parse::<u32>().map(PassengerIdentifier::new),
        }
    }

    /// The id as an opaque label, as reference cases treat it.
    pub fn to_label(&self) -> String {
        match self {
            LooseId::Number(n) => n.to_string(),
            LooseId::Text(s) => s.clone(),
        }
    }
}

impl From<PassengerIdentifier> for LooseId {
    fn from(id: PassengerIdentifier) -> Self {
        LooseId::Number(id.into_inner())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrivalRecord {
    pub p: LooseId,
    pub arr: Slot,
}

/// Arrivals of one terminal: explicit records, or bare slots numbered from 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArrivalList {
    Records(Vec<ArrivalRecord>),
    Slots(Vec<Slot>),
}

impl Default for ArrivalList {
    fn default() -> Self {
        ArrivalList::Records(Vec::new())
    }
}

impl ArrivalList {
    pub fn to_records(&self) -> Vec<ArrivalRecord> {
        match self {
            ArrivalList::Records(r) => r.clone(),
            ArrivalList::Slots(s) => s
                .iter()
                .enumerate()
                .map(|(i, &arr)| ArrivalRecord {
                    p: LooseId::Number(i as u32 + 1),
                    arr,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arrivals {
    #[serde(rename = "A", alias = "CEI", default)]
    pub a: ArrivalList,
    #[serde(rename = "B", alias = "T2", default)]
    pub b: ArrivalList,
}

impl Arrivals {
    #[inline]
    pub fn at(&self, terminal: Terminal) -> &ArrivalList {
        match terminal {
            Terminal::A => &self.a,
            Terminal::B => &self.b,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialPositionRecord {
    pub bus: BusIdentifier,
    pub terminal: Terminal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DepartureRecord {
    pub terminal: Terminal,
    pub bus: BusIdentifier,
    pub t: Slot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRecord {
    pub terminal: Terminal,
    pub p: LooseId,
    pub bus: BusIdentifier,
    pub t: Slot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait: Option<Slot>,
}
