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

pub mod checks;
pub mod flow;
pub mod labels;
pub mod reference;
pub mod violation;

use crate::{
    instance::inst::Instance,
    objective::ObjectiveKind,
    schedule::sched::Schedule,
    validation::violation::VerificationReport,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VerifierConfig {
    /// Objective the reported value is checked against.
    #[serde(default)]
    pub objective: ObjectiveKind,
    #[serde(default = "VerifierConfig::default_tolerance")]
    pub tolerance: f64,
}

impl VerifierConfig {
    const DEFAULT_TOLERANCE: f64 = 1e-6;

    fn default_tolerance() -> f64 {
        Self::DEFAULT_TOLERANCE
    }

    #[inline]
    pub fn with_objective(mut self, objective: ObjectiveKind) -> Self {
        self.objective = objective;
        self
    }

    #[inline]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            objective: ObjectiveKind::Linear,
            tolerance: Self::DEFAULT_TOLERANCE,
        }
    }
}

/// Re-derives every schedule invariant from scratch.
#[derive(Debug, Clone, Copy, Default)]
pub struct Verifier {
    config: VerifierConfig,
}

impl Verifier {
    #[inline]
    pub fn new(config: VerifierConfig) -> Self {
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Checks a schedule on its own.
    ///
    /// A bare infeasibility or timeout claim cannot be checked here and
    /// yields an inconclusive report. A timed out run that still carries an
    /// incumbent is checked like any other schedule.
    #[tracing::instrument(level = "debug", skip_all, fields(status = %schedule.status()))]
    pub fn verify(&self, instance: &Instance, schedule: &Schedule) -> VerificationReport {
        if !schedule.status().has_solution() && schedule.is_empty() {
            tracing::info!(
                status = %schedule.status(),
                "no schedule to check without a reference"
            );
            return VerificationReport::inconclusive();
        }

        let mut out = Vec::new();
        checks::check_uniqueness(instance, schedule, &mut out);
        checks::check_links(instance, schedule, &mut out);
        checks::check_capacity(instance, schedule, &mut out);
        checks::check_waits(instance, schedule, &mut out);
        checks::check_flow(instance, schedule, &mut out);
        checks::check_objective(
            instance,
            schedule,
            self.config.objective,
            self.config.tolerance,
            &mut out,
        );

        tracing::debug!(violations = out.len(), "verification finished");
        VerificationReport::from_violations(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        common::{BusIdentifier, PassengerIdentifier},
        grid::TimeGrid,
        instance::{builder::InstanceBuilder, bus::Bus, passenger::Passenger},
        schedule::{
            event::{Boarding, DepartureEvent},
            status::ScheduleStatus,
        },
        validation::violation::{Verdict, ViolationKind},
    };
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use shuttle_core::prelude::{Slot, Terminal};

    fn bid(n: u32) -> BusIdentifier {
        BusIdentifier::new(n)
    }

    fn pid(n: u32) -> PassengerIdentifier {
        PassengerIdentifier::new(n)
    }

    fn dep(bus: u32, term: Terminal, t: Slot) -> DepartureEvent {
        DepartureEvent::new(bid(bus), term, t)
    }

    fn board(term: Terminal, p: u32, bus: u32, t: Slot) -> Boarding {
        Boarding::new(term, pid(p), bid(bus), t)
    }

    /// One bus of capacity `cap` starting at A, horizon 10, tau 2, w_max 5.
    fn instance(cap: usize, passengers: &[(Terminal, u32, Slot)]) -> Instance {
        let mut b = InstanceBuilder::new(TimeGrid::unit(10, 2).unwrap()).w_max(5);
        b.add_bus(Bus::new(bid(1), cap).starting_at(Terminal::A));
        for &(t, id, arr) in passengers {
            b.add_passenger(Passenger::new(t, pid(id), arr));
        }
        b.build().unwrap()
    }

    fn schedule(obj: Option<f64>, deps: Vec<DepartureEvent>, boardings: Vec<Boarding>) -> Schedule {
        Schedule::new(ScheduleStatus::Optimal, obj, deps, boardings)
    }

    fn tags(r: &VerificationReport) -> Vec<&'static str> {
        r.violations().iter().map(|v| v.tag()).collect()
    }

    #[test]
    fn test_single_bus_single_passenger_passes() {
        let inst = instance(1, &[(Terminal::A, 1, 0)]);
        for t in 0..=inst.cutoff() {
            let s = schedule(
                Some(t as f64),
                vec![dep(1, Terminal::A, t)],
                vec![board(Terminal::A, 1, 1, t).with_wait(t)],
            );
            let r = Verifier::default().verify(&inst, &s);
            if t <= 5 {
                assert!(r.is_pass(), "t={t}: {r}");
            } else {
                assert_eq!(tags(&r), vec!["WMAX"], "t={t}");
            }
        }
    }

    #[test]
    fn test_missing_and_double_assignment() {
        let inst = instance(2, &[(Terminal::A, 1, 0), (Terminal::A, 2, 0)]);
        let s = schedule(
            None,
            vec![dep(1, Terminal::A, 0), dep(1, Terminal::B, 2)],
            vec![board(Terminal::A, 1, 1, 0), board(Terminal::A, 1, 1, 0)],
        );
        let r = Verifier::default().verify(&inst, &s);
        assert_eq!(r.count_of(ViolationKind::Uniqueness), 2);
        assert!(r.violations()[0].message().contains("A:1 assigned 2 times"));
    }

    #[test]
    fn test_capacity_boundary() {
        let pass = [(Terminal::A, 1, 0), (Terminal::A, 2, 0), (Terminal::A, 3, 0)];
        let boardings = vec![
            board(Terminal::A, 1, 1, 0),
            board(Terminal::A, 2, 1, 0),
            board(Terminal::A, 3, 1, 0),
        ];
        let at_cap = instance(3, &pass);
        let s = schedule(None, vec![dep(1, Terminal::A, 0)], boardings);
        assert!(Verifier::default().verify(&at_cap, &s).is_pass());

        let over = instance(2, &pass);
        let r = Verifier::default().verify(&over, &s);
        assert_eq!(tags(&r), vec!["CAP"]);
    }

    #[test]
    fn test_boarding_without_departure_is_link() {
        let inst = instance(1, &[(Terminal::A, 1, 0)]);
        let s = schedule(None, vec![dep(1, Terminal::A, 0)], vec![board(Terminal::A, 1, 1, 1)]);
        let r = Verifier::default().verify(&inst, &s);
        assert_eq!(tags(&r), vec!["LINK"]);
    }

    #[test]
    fn test_unknown_bus() {
        let inst = instance(1, &[(Terminal::A, 1, 0)]);
        let s = schedule(
            None,
            vec![dep(9, Terminal::A, 0)],
            vec![board(Terminal::A, 1, 9, 0)],
        );
        let r = Verifier::default().verify(&inst, &s);
        assert_eq!(tags(&r), vec!["BUS"]);
    }

    #[test]
    fn test_wait_checks() {
        let inst = instance(1, &[(Terminal::A, 1, 3)]);
        let s = schedule(
            None,
            vec![dep(1, Terminal::A, 2)],
            vec![board(Terminal::A, 1, 1, 2).with_wait(0)],
        );
        let r = Verifier::default().verify(&inst, &s);
        assert_eq!(tags(&r), vec!["WAIT", "ARR"]);
    }

    #[test]
    fn test_unknown_passenger_is_arr() {
        let inst = instance(2, &[(Terminal::A, 1, 0)]);
        let s = schedule(
            None,
            vec![dep(1, Terminal::A, 0)],
            vec![board(Terminal::A, 1, 1, 0), board(Terminal::A, 5, 1, 0)],
        );
        let r = Verifier::default().verify(&inst, &s);
        assert_eq!(tags(&r), vec!["ARR"]);
    }

    #[test]
    fn test_cutoff_boundary() {
        // cutoff = 10 - 2 = 8; w_max lifted so only the cutoff matters.
        let mut b = InstanceBuilder::new(TimeGrid::unit(10, 2).unwrap());
        b.add_bus(Bus::new(bid(1), 1).starting_at(Terminal::A))
            .add_passenger(Passenger::new(Terminal::A, pid(1), 0));
        let inst = b.build().unwrap();

        let ok = schedule(None, vec![dep(1, Terminal::A, 8)], vec![board(Terminal::A, 1, 1, 8)]);
        assert!(Verifier::default().verify(&inst, &ok).is_pass());

        let late = schedule(None, vec![dep(1, Terminal::A, 9)], vec![board(Terminal::A, 1, 1, 9)]);
        assert_eq!(tags(&Verifier::default().verify(&inst, &late)), vec!["LATE"]);
    }

    #[test]
    fn test_flow_violation_from_early_return() {
        let inst = instance(1, &[]);
        let s = schedule(None, vec![dep(1, Terminal::A, 0), dep(1, Terminal::B, 1)], vec![]);
        let r = Verifier::default().verify(&inst, &s);
        assert_eq!(tags(&r), vec!["FLOW"]);

        let s = schedule(None, vec![dep(1, Terminal::A, 0), dep(1, Terminal::B, 2)], vec![]);
        assert!(Verifier::default().verify(&inst, &s).is_pass());
    }

    #[test]
    fn test_repeat_departure_from_a_before_tau() {
        let inst = instance(1, &[]);
        let s = schedule(None, vec![dep(1, Terminal::A, 0), dep(1, Terminal::A, 1)], vec![]);
        let r = Verifier::default().verify(&inst, &s);
        assert!(r.has(ViolationKind::Flow));
        assert!(r.has(ViolationKind::Location));
    }

    #[test]
    fn test_objective_linear_and_squared() {
        let inst = instance(2, &[(Terminal::A, 1, 0), (Terminal::A, 2, 1)]);
        let deps = vec![dep(1, Terminal::A, 3)];
        let boardings = vec![board(Terminal::A, 1, 1, 3), board(Terminal::A, 2, 1, 3)];

        let s = schedule(Some(5.0), deps.clone(), boardings.clone());
        assert!(Verifier::default().verify(&inst, &s).is_pass());

        let s = schedule(Some(5.5), deps.clone(), boardings.clone());
        assert_eq!(tags(&Verifier::default().verify(&inst, &s)), vec!["OBJ"]);

        let sq = Verifier::new(VerifierConfig::default().with_objective(ObjectiveKind::Squared));
        let s = schedule(Some(13.0), deps, boardings);
        assert!(sq.verify(&inst, &s).is_pass());
    }

    #[test]
    fn test_objective_prefers_reported_waits() {
        let inst = instance(1, &[(Terminal::A, 1, 0)]);
        // The wait is wrong but the objective agrees with what was reported.
        let s = schedule(
            Some(1.0),
            vec![dep(1, Terminal::A, 2)],
            vec![board(Terminal::A, 1, 1, 2).with_wait(1)],
        );
        let r = Verifier::default().verify(&inst, &s);
        assert_eq!(tags(&r), vec!["WAIT"]);
    }

    #[test]
    fn test_infeasible_and_timeout_are_inconclusive() {
        let inst = instance(1, &[(Terminal::A, 1, 0)]);
        for status in [ScheduleStatus::Infeasible, ScheduleStatus::Timeout] {
            let r = Verifier::default().verify(&inst, &Schedule::empty(status));
            assert_eq!(r.verdict(), Verdict::Inconclusive);
            assert!(r.violations().is_empty());
        }
    }

    #[test]
    fn test_timed_out_incumbent_is_checked() {
        use crate::payload::{extract::ScheduleExtractor, result::ResultPayload};

        let json = r#"{
            "status": "TIME_LIMIT",
            "objective": 99,
            "meta": {"tau": 3, "capacity": 1, "w_max": 5, "T_start": 0, "T_end": 10},
            "initial_positions": [{"bus": 1, "terminal": "A"}],
            "arrivals": {"A": [{"p": 1, "arr": 0}, {"p": 2, "arr": 0}], "B": []},
            "departures": [
                {"terminal": "A", "bus": 1, "t": 0},
                {"terminal": "A", "bus": 1, "t": 1}
            ],
            "assignments": [
                {"terminal": "A", "p": 1, "bus": 1, "t": 0, "wait": 0},
                {"terminal": "A", "p": 2, "bus": 1, "t": 0, "wait": 0}
            ]
        }"#;
        let payload = ResultPayload::from_str(json).unwrap();
        let (inst, sched) = ScheduleExtractor::from_payload(&payload).unwrap();
        assert_eq!(sched.status(), ScheduleStatus::Timeout);

        let r = Verifier::default().verify(&inst, &sched);
        assert_eq!(r.verdict(), Verdict::Fail, "{r}");
        assert!(r.has(ViolationKind::Capacity));
        assert!(r.has(ViolationKind::Flow));
        assert!(r.has(ViolationKind::Objective));
    }

    #[test]
    fn test_timed_out_valid_incumbent_passes() {
        let inst = instance(1, &[(Terminal::A, 1, 0)]);
        let s = Schedule::new(
            ScheduleStatus::Timeout,
            Some(0.0),
            vec![dep(1, Terminal::A, 0)],
            vec![board(Terminal::A, 1, 1, 0)],
        );
        assert!(Verifier::default().verify(&inst, &s).is_pass());
    }

    #[test]
    fn test_checks_continue_past_failures() {
        let inst = instance(1, &[(Terminal::A, 1, 0), (Terminal::A, 2, 0)]);
        let s = schedule(
            Some(100.0),
            vec![dep(1, Terminal::B, 0), dep(1, Terminal::A, 1)],
            vec![board(Terminal::A, 1, 1, 1), board(Terminal::A, 2, 1, 1)],
        );
        let r = Verifier::default().verify(&inst, &s);
        assert_eq!(tags(&r), vec!["CAP", "LOC", "FLOW", "OBJ"]);
    }

    /// Random single-bus shuttles that respect every rule must pass, and
    /// pulling any return trip one slot early must be caught.
    #[test]
    fn test_random_valid_shuttles_pass() {
        let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);
        for _ in 0..200 {
            let tau: Slot = rng.random_range(1..=4);
            let horizon: Slot = rng.random_range(tau + 4..=40);
            let inst_grid = TimeGrid::unit(horizon, tau).unwrap();

            let mut deps = Vec::new();
            let mut t: Slot = rng.random_range(0..=2);
            let mut term = Terminal::A;
            while t <= inst_grid.cutoff() {
                deps.push(dep(1, term, t));
                t += tau + rng.random_range(0..=3);
                term = term.opposite();
            }

            let mut b = InstanceBuilder::new(inst_grid);
            b.add_bus(Bus::new(bid(1), 4).starting_at(Terminal::A));
            let mut boardings = Vec::new();
            for (i, d) in deps.iter().enumerate() {
                let arr = (d.time() - rng.random_range(0..=2)).max(0);
                b.add_passenger(Passenger::new(d.terminal(), pid(i as u32 + 1), arr));
                boardings.push(
                    board(d.terminal(), i as u32 + 1, 1, d.time()).with_wait(d.time() - arr),
                );
            }
            let inst = b.build().unwrap();
            let total: Slot = boardings.iter().filter_map(|b| b.reported_wait()).sum();

            let s = schedule(Some(total as f64), deps.clone(), boardings.clone());
            let r = Verifier::default().verify(&inst, &s);
            assert!(r.is_pass(), "{r}");

            if deps.len() >= 2 {
                let k = rng.random_range(1..deps.len());
                let early = dep(1, deps[k].terminal(), deps[k - 1].time() + tau - 1);
                let mut bad = deps.clone();
                bad[k] = early;
                let s = schedule(None, bad, vec![]);
                let r = Verifier::default().verify(&inst, &s);
                assert!(r.has(ViolationKind::Flow), "{r}");
            }
        }
    }
}
