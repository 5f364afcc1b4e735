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
    grid::TimeGrid,
    instance::{
        builder::InstanceBuilder, bus::Bus, err::InstanceError, inst::Instance,
        passenger::PassengerKey,
    },
    objective::ObjectiveKind,
    payload::{expected::ExpectedCase, records::DepartureRecord},
    schedule::{sched::Schedule, status::ScheduleStatus},
    validation::{
        Verifier, checks,
        labels::LabelMapping,
        violation::{VerificationReport, Violation, ViolationKind},
    },
};
use shuttle_core::prelude::{Slot, Terminal};
use std::collections::BTreeMap;

const OBJECTIVE_CHECK_TOLERANCE: f64 = 1e-9;

/// The instance as the reference sees it: its parameters and starting
/// terminals where it states them, the produced instance everywhere else.
fn reference_instance(actual: &Instance, expected: &ExpectedCase) -> Result<Instance, InstanceError> {
    let g = actual.grid();
    let meta = &expected.meta;
    let grid = TimeGrid::new(
        g.start(),
        g.step(),
        meta.t_end.unwrap_or(g.horizon()),
        meta.tau.unwrap_or(g.tau()),
    )?;

    let pinned: BTreeMap<_, _> = expected
        .initial_positions
        .iter()
        .map(|r| (r.bus, r.terminal))
        .collect();
    let mut buses: Vec<Bus> = actual
        .iter_buses()
        .map(|b| {
            let bus = Bus::new(b.id(), meta.capacity.unwrap_or(b.capacity()));
            match pinned
                .get(&b.id())
                .copied()
                .or_else(|| actual.initial_terminal_of(b.id()))
            {
                Some(t) => bus.starting_at(t),
                None => bus,
            }
        })
        .collect();
    buses.extend(
        pinned
            .iter()
            .filter(|(id, _)| actual.bus(**id).is_none())
            .map(|(&id, &t)| {
                Bus::new(id, meta.capacity.unwrap_or(actual.max_capacity().max(1))).starting_at(t)
            }),
    );

    InstanceBuilder::new(grid)
        .w_max(meta.w_max.unwrap_or(actual.w_max()))
        .with_buses(buses)
        .with_passengers(actual.iter_passengers().copied())
        .build()
}

fn sorted_departures<I>(records: I) -> Vec<(Slot, u32, Terminal)>
where
    I: IntoIterator<Item = DepartureRecord>,
{
    let mut v: Vec<_> = records
        .into_iter()
        .map(|d| (d.t, d.bus.into_inner(), d.terminal))
        .collect();
    v.sort();
    v
}

impl Verifier {
    /// Checks a schedule against a reference solution with anonymized
    /// passenger labels.
    #[tracing::instrument(level = "debug", skip_all, fields(status = %schedule.status()))]
    pub fn verify_against(
        &self,
        instance: &Instance,
        schedule: &Schedule,
        expected: &ExpectedCase,
    ) -> VerificationReport {
        let mut out = Vec::new();
        let status = schedule.status();

        if expected.infeasible {
            if status != ScheduleStatus::Infeasible {
                out.push(Violation::new(
                    ViolationKind::Status,
                    format!("expected infeasible, got status={}", status),
                ));
            }
            return VerificationReport::from_violations(out);
        }
        if !status.has_solution() && schedule.is_empty() {
            out.push(Violation::new(
                ViolationKind::Status,
                format!("expected a schedule, got status={}", status),
            ));
        }

        Self::check_meta(instance, expected, &mut out);
        Self::check_departures(schedule, expected, &mut out);

        let mapping = LabelMapping::reconcile(&expected.expected_assignments, schedule, &mut out);
        Self::check_assignments(schedule, expected, &mapping, &mut out);
        Self::check_labels_once(schedule, expected, &mapping, &mut out);

        let reference = match reference_instance(instance, expected) {
            Ok(r) => r,
            Err(e) => {
                out.push(Violation::new(
                    ViolationKind::Meta,
                    format!("reference parameters do not fit the instance: {}", e),
                ));
                instance.clone()
            }
        };
        checks::check_links(&reference, schedule, &mut out);
        checks::check_capacity(&reference, schedule, &mut out);
        checks::check_waits(&reference, schedule, &mut out);
        checks::check_flow(&reference, schedule, &mut out);

        if let Some(want) = expected.expected_objective {
            self.check_expected_objective(schedule, expected, want, &mut out);
        }

        tracing::debug!(
            violations = out.len(),
            mapped = mapping.len(),
            "reference verification finished"
        );
        VerificationReport::from_violations(out)
    }

    fn check_meta(instance: &Instance, expected: &ExpectedCase, out: &mut Vec<Violation>) {
        let meta = &expected.meta;
        let pairs = [
            ("tau", meta.tau, instance.tau()),
            ("capacity", meta.capacity.map(|c| c as Slot), instance.max_capacity() as Slot),
            ("w_max", meta.w_max, instance.w_max()),
            ("T_end", meta.t_end, instance.grid().horizon()),
        ];
        for (name, want, got) in pairs {
            if let Some(want) = want
                && want != got
            {
                out.push(Violation::new(
                    ViolationKind::Meta,
                    format!("{} expected {} got {}", name, want, got),
                ));
            }
        }
    }

    fn check_departures(schedule: &Schedule, expected: &ExpectedCase, out: &mut Vec<Violation>) {
        let want = sorted_departures(expected.expected_departures.iter().copied());
        let got = sorted_departures(schedule.departures().iter().map(|d| DepartureRecord {
            terminal: d.terminal(),
            bus: d.bus(),
            t: d.time(),
        }));
        if want != got {
            let missing: Vec<_> = want.iter().filter(|d| !got.contains(*d)).collect();
            let extra: Vec<_> = got.iter().filter(|d| !want.contains(*d)).collect();
            out.push(Violation::new(
                ViolationKind::Departures,
                format!(
                    "mismatch: {} expected, {} got; missing (t, bus, terminal) {:?}, unexpected {:?}",
                    want.len(),
                    got.len(),
                    missing,
                    extra
                ),
            ));
        }
    }

    fn check_assignments(
        schedule: &Schedule,
        expected: &ExpectedCase,
        mapping: &LabelMapping,
        out: &mut Vec<Violation>,
    ) {
        let mut want: Vec<(Slot, u32, Terminal, String)> = expected
            .expected_assignments
            .iter()
            .map(|a| (a.t, a.bus.into_inner(), a.terminal, a.p.to_label()))
            .collect();
        let mut got: Vec<(Slot, u32, Terminal, String)> = schedule
            .boardings()
            .iter()
            .map(|b| {
                (
                    b.time(),
                    b.bus().into_inner(),
                    b.terminal(),
                    mapping.relabel(b.key()),
                )
            })
            .collect();
        want.sort();
        got.sort();
        if want != got {
            let missing = want.iter().filter(|a| !got.contains(*a)).count();
            let extra = got.iter().filter(|a| !want.contains(*a)).count();
            out.push(Violation::new(
                ViolationKind::Assignments,
                format!(
                    "mismatch after relabelling: {} expected, {} got, {} missing, {} unexpected",
                    want.len(),
                    got.len(),
                    missing,
                    extra
                ),
            ));
        }
    }

    fn check_labels_once(
        schedule: &Schedule,
        expected: &ExpectedCase,
        mapping: &LabelMapping,
        out: &mut Vec<Violation>,
    ) {
        let counts = checks::boarding_counts(schedule);
        for terminal in Terminal::ALL {
            for label in expected.arrivals.at(terminal).keys() {
                let n = mapping
                    .passenger_of(terminal, label)
                    .and_then(|id| {
                        counts.get(&PassengerKey::new(terminal, id)).copied()
                    })
                    .unwrap_or(0);
                if n != 1 {
                    out.push(Violation::new(
                        ViolationKind::Uniqueness,
                        format!("{}:{} assigned {} times", terminal, label, n),
                    ));
                }
            }
        }
    }

    fn check_expected_objective(
        &self,
        schedule: &Schedule,
        expected: &ExpectedCase,
        want: f64,
        out: &mut Vec<Violation>,
    ) {
        match schedule.objective() {
            Some(got) if (got - want).abs() <= self.config().tolerance => {}
            got => out.push(Violation::new(
                ViolationKind::Objective,
                format!("objective {:?} != expected {}", got, want),
            )),
        }

        if expected.arrivals.is_empty() {
            return;
        }
        let mut waits = Vec::with_capacity(expected.expected_assignments.len());
        for a in &expected.expected_assignments {
            let label = a.p.to_label();
            match expected.arrivals.at(a.terminal).get(&label) {
                Some(arr) => waits.push(a.t - arr),
                None => out.push(Violation::new(
                    ViolationKind::ObjectiveCheck,
                    format!("no arrival for label {}:{}", a.terminal, label),
                )),
            }
        }
        let recomputed: f64 = waits
            .into_iter()
            .map(|w| ObjectiveKind::Squared.charge(w, None))
            .sum();
        if (recomputed - want).abs() > OBJECTIVE_CHECK_TOLERANCE {
            out.push(Violation::new(
                ViolationKind::ObjectiveCheck,
                format!("expected {} but recomputed {}", want, recomputed),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        common::{BusIdentifier, PassengerIdentifier},
        payload::{extract::ScheduleExtractor, result::ResultPayload},
    };

    const EXPECTED: &str = r#"{
        "expected_departures": [
            {"terminal": "CEI", "bus": 1, "t": 0},
            {"terminal": "T2", "bus": 1, "t": 3}
        ],
        "expected_assignments": [
            {"terminal": "CEI", "p": "a", "bus": 1, "t": 0},
            {"terminal": "CEI", "p": "b", "bus": 1, "t": 0},
            {"terminal": "T2", "p": "c", "bus": 1, "t": 3}
        ],
        "expected_objective": 5,
        "meta": {"tau": 3, "capacity": 2, "w_max": 4, "T_end": 10},
        "arrivals": {"CEI": {"a": 0, "b": 0}, "T2": {"c": 1}},
        "init": [{"bus": 1, "terminal": "CEI"}]
    }"#;

    fn result(objective: f64, departures: &str, assignments: &str) -> String {
        format!(
            r#"{{
            "status": "OPTIMAL",
            "objective": {objective},
            "meta": {{"tau": 3, "capacity": 2, "w_max": 4, "T_start": 0, "T_end": 10}},
            "initial_positions": [{{"bus": 1, "terminal": "A"}}],
            "arrivals": {{"A": [{{"p": 7, "arr": 0}}, {{"p": 8, "arr": 0}}], "B": [{{"p": 1, "arr": 1}}]}},
            "departures": {departures},
            "assignments": {assignments}
        }}"#
        )
    }

    const DEPS: &str = r#"[{"terminal": "A", "bus": 1, "t": 0}, {"terminal": "B", "bus": 1, "t": 3}]"#;
    const ASG: &str = r#"[
        {"terminal": "A", "p": 8, "bus": 1, "t": 0, "wait": 0},
        {"terminal": "A", "p": 7, "bus": 1, "t": 0, "wait": 0},
        {"terminal": "B", "p": 1, "bus": 1, "t": 3, "wait": 2}
    ]"#;

    fn verify(expected: &str, result: &str) -> VerificationReport {
        let expected = ExpectedCase::from_str(expected).unwrap();
        let payload = ResultPayload::from_str(result).unwrap();
        let (inst, sched) = ScheduleExtractor::from_payload(&payload).unwrap();
        Verifier::default().verify_against(&inst, &sched, &expected)
    }

    fn tags(r: &VerificationReport) -> Vec<&'static str> {
        r.violations().iter().map(|v| v.tag()).collect()
    }

    #[test]
    fn test_matching_result_passes() {
        // Squared waits 0 + 0 + 2^2.
        let exp = EXPECTED.replace(r#""expected_objective": 5"#, r#""expected_objective": 4"#);
        let r = verify(&exp, &result(4.0, DEPS, ASG));
        assert!(r.is_pass(), "{r}");
    }

    #[test]
    fn test_expected_objective_is_rechecked() {
        let r = verify(EXPECTED, &result(5.0, DEPS, ASG));
        assert_eq!(tags(&r), vec!["OBJ-CHECK"]);
    }

    #[test]
    fn test_objective_mismatch() {
        let exp = EXPECTED.replace(r#""expected_objective": 5"#, r#""expected_objective": 4"#);
        let r = verify(&exp, &result(6.0, DEPS, ASG));
        assert_eq!(tags(&r), vec!["OBJ"]);
    }

    #[test]
    fn test_departure_and_assignment_mismatch() {
        let exp = EXPECTED.replace(r#""expected_objective": 5"#, r#""expected_objective": 4"#);
        let deps = r#"[{"terminal": "A", "bus": 1, "t": 0}, {"terminal": "B", "bus": 1, "t": 4}]"#;
        let asg = r#"[
            {"terminal": "A", "p": 8, "bus": 1, "t": 0, "wait": 0},
            {"terminal": "A", "p": 7, "bus": 1, "t": 0, "wait": 0},
            {"terminal": "B", "p": 1, "bus": 1, "t": 4, "wait": 3}
        ]"#;
        let r = verify(&exp, &result(9.0, deps, asg));
        let t = tags(&r);
        assert!(t.contains(&"DEPARTURES"));
        assert!(t.contains(&"ASSIGN-COUNT"));
        assert!(t.contains(&"ASSIGNMENTS"));
        // Label "c" never got mapped.
        assert!(t.contains(&"F1"));
        assert!(t.contains(&"OBJ"));
    }

    #[test]
    fn test_meta_mismatch_and_reference_capacity() {
        let exp = EXPECTED
            .replace(r#""expected_objective": 5"#, r#""expected_objective": 4"#)
            .replace(r#""capacity": 2"#, r#""capacity": 1"#);
        let r = verify(&exp, &result(4.0, DEPS, ASG));
        assert_eq!(tags(&r), vec!["META", "CAP"]);
    }

    #[test]
    fn test_reference_flow_uses_reference_tau() {
        let exp = EXPECTED
            .replace(r#""expected_objective": 5"#, r#""expected_objective": 4"#)
            .replace(r#""tau": 3"#, r#""tau": 4"#);
        let r = verify(&exp, &result(4.0, DEPS, ASG));
        assert_eq!(tags(&r), vec!["META", "FLOW"]);
    }

    #[test]
    fn test_infeasible_reference() {
        let infeasible = r#"{"infeasible": true}"#;
        let r = verify(infeasible, &result(4.0, DEPS, ASG));
        assert_eq!(tags(&r), vec!["STATUS"]);

        let claimed = result(0.0, "[]", "[]").replace("OPTIMAL", "INFEASIBLE");
        let r = verify(infeasible, &claimed);
        assert!(r.is_pass());
    }

    #[test]
    fn test_timed_out_incumbent_matching_reference_passes() {
        let exp = EXPECTED.replace(r#""expected_objective": 5"#, r#""expected_objective": 4"#);
        let timed_out = result(4.0, DEPS, ASG).replace("OPTIMAL", "TIME_LIMIT");
        let r = verify(&exp, &timed_out);
        assert!(r.is_pass(), "{r}");
    }

    #[test]
    fn test_timeout_without_schedule_fails_reference() {
        let exp = EXPECTED.replace(r#""expected_objective": 5"#, r#""expected_objective": 4"#);
        let timed_out = result(0.0, "[]", "[]").replace("OPTIMAL", "TIME_LIMIT");
        let r = verify(&exp, &timed_out);
        assert!(r.has(ViolationKind::Status));
        assert!(r.has(ViolationKind::Departures));
    }

    #[test]
    fn test_reference_instance_overrides() {
        let payload = ResultPayload::from_str(&result(4.0, DEPS, ASG)).unwrap();
        let (inst, _) = ScheduleExtractor::from_payload(&payload).unwrap();
        let mut exp = ExpectedCase::from_str(EXPECTED).unwrap();
        exp.meta.capacity = Some(5);
        exp.initial_positions[0].terminal = Terminal::B;
        let r = reference_instance(&inst, &exp).unwrap();
        assert_eq!(r.bus(BusIdentifier::new(1)).unwrap().capacity(), 5);
        assert_eq!(
            r.initial_terminal_of(BusIdentifier::new(1)),
            Some(Terminal::B)
        );
        assert_eq!(r.passenger_count(), 3);
        assert!(
            r.passenger(PassengerKey::new(Terminal::A, PassengerIdentifier::new(7)))
                .is_some()
        );
    }
}
