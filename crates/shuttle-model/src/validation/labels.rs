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
    payload::records::AssignmentRecord,
    schedule::sched::Schedule,
    validation::violation::{Violation, ViolationKind},
};
use shuttle_core::prelude::{Slot, Terminal};
use std::collections::{BTreeMap, BTreeSet};

type EventKey = (Terminal, BusIdentifier, Slot);

/// Correspondence between a reference solution's passenger labels and the
/// passenger ids of a produced schedule.
///
/// Built departure by departure: within one `(terminal, bus, time)` group
/// the sorted labels are paired with the sorted ids. Passengers sharing a
/// departure are assumed interchangeable, so this is not a general matching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelMapping {
    forward: BTreeMap<(Terminal, String), PassengerIdentifier>,
    inverse: BTreeMap<PassengerKey, String>,
}

/// Numeric labels first in numeric order, then the rest lexically.
fn label_order(label: &str) -> (bool, u64, String) {
    match label.trim().parse::<u64>() {
        Ok(n) => (false, n, String::new()),
        Err(_) => (true, 0, label.to_string()),
    }
}

impl LabelMapping {
    pub fn reconcile(
        expected: &[AssignmentRecord],
        actual: &Schedule,
        out: &mut Vec<Violation>,
    ) -> Self {
        let mut want: BTreeMap<EventKey, Vec<String>> = BTreeMap::new();
        for a in expected {
            want.entry((a.terminal, a.bus, a.t))
                .or_default()
                .push(a.p.to_label());
        }
        let got: BTreeMap<EventKey, Vec<PassengerIdentifier>> = actual
            .assignment_events()
            .into_iter()
            .map(|ev| ((ev.terminal(), ev.bus(), ev.time()), ev.passengers().to_vec()))
            .collect();

        let keys: BTreeSet<EventKey> = want.keys().chain(got.keys()).copied().collect();
        let mut mapping = Self::default();
        for key @ (terminal, bus, time) in keys {
            let mut labels = want.get(&key).cloned().unwrap_or_default();
            labels.sort_by_cached_key(|l| label_order(l));
            let ids = got.get(&key).map(Vec::as_slice).unwrap_or_default();

            if labels.len() != ids.len() {
                out.push(Violation::new(
                    ViolationKind::AssignCount,
                    format!(
                        "event ({}, bus{}, t={}) expected {} got {}",
                        terminal,
                        bus.value(),
                        time,
                        labels.len(),
                        ids.len()
                    ),
                ));
                continue;
            }

            for (label, &id) in labels.into_iter().zip(ids) {
                mapping.bind(terminal, label, id, out);
            }
        }
        mapping
    }

    fn bind(
        &mut self,
        terminal: Terminal,
        label: String,
        id: PassengerIdentifier,
        out: &mut Vec<Violation>,
    ) {
        let key = PassengerKey::new(terminal, id);
        if let Some(prev) = self.forward.get(&(terminal, label.clone()))
            && *prev != id
        {
            out.push(Violation::new(
                ViolationKind::Mapping,
                format!(
                    "label {}:{} -> {} and {}",
                    terminal,
                    label,
                    prev.value(),
                    id.value()
                ),
            ));
        }
        if let Some(prev) = self.inverse.get(&key)
            && *prev != label
        {
            out.push(Violation::new(
                ViolationKind::Mapping,
                format!("passenger {} -> {} and {}", key, prev, label),
            ));
        }
        self.forward.insert((terminal, label.clone()), id);
        self.inverse.insert(key, label);
    }

    #[inline]
    pub fn passenger_of(&self, terminal: Terminal, label: &str) -> Option<PassengerIdentifier> {
        self.forward.get(&(terminal, label.to_string())).copied()
    }

    #[inline]
    pub fn label_of(&self, key: PassengerKey) -> Option<&str> {
        self.inverse.get(&key).map(String::as_str)
    }

    /// Label under which `key` appears in the reference, or its own id.
    pub fn relabel(&self, key: PassengerKey) -> String {
        self.label_of(key)
            .map(str::to_string)
            .unwrap_or_else(|| key.id().value().to_string())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}
