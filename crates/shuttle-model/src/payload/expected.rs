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

use crate::payload::{
    err::PayloadReadError,
    parse_document, read_document,
    records::{AssignmentRecord, DepartureRecord, InitialPositionRecord},
    result::PayloadMeta,
};
use serde::{Deserialize, Serialize};
use shuttle_core::prelude::{Slot, Terminal};
use std::{collections::BTreeMap, path::Path};

/// Arrival slot per anonymized passenger label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelledArrivals {
    #[serde(rename = "A", alias = "CEI", default)]
    pub a: BTreeMap<String, Slot>,
    #[serde(rename = "B", alias = "T2", default)]
    pub b: BTreeMap<String, Slot>,
}

impl LabelledArrivals {
    #[inline]
    pub fn at(&self, terminal: Terminal) -> &BTreeMap<String, Slot> {
        match terminal {
            Terminal::A => &self.a,
            Terminal::B => &self.b,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.a.is_empty() && self.b.is_empty()
    }
}

/// A reference solution whose passenger ids are opaque labels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpectedCase {
    #[serde(default)]
    pub expected_departures: Vec<DepartureRecord>,
    #[serde(default)]
    pub expected_assignments: Vec<AssignmentRecord>,
    #[serde(default)]
    pub expected_objective: Option<f64>,
    #[serde(default)]
    pub infeasible: bool,
    #[serde(default)]
    pub meta: PayloadMeta,
    #[serde(default)]
    pub arrivals: LabelledArrivals,
    #[serde(rename = "init", alias = "initial_positions", default)]
    pub initial_positions: Vec<InitialPositionRecord>,
}

impl ExpectedCase {
    #[inline]
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PayloadReadError> {
        read_document(path)
    }

    #[inline]
    pub fn from_str(s: &str) -> Result<Self, PayloadReadError> {
        parse_document(s)
    }
}
