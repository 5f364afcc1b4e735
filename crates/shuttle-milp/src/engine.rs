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
    model::{builder::ModelBuilder, config::ModelConfig, err::ModelError},
    solver::{MilpSolver, err::SolverError, goodlp::GoodLpSolver},
};
use shuttle_model::prelude::{Instance, ResultPayload, Schedule};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    Model(ModelError),
    Solver(SolverError),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::Model(err) => write!(f, "Model build error: {}", err),
            EngineError::Solver(err) => write!(f, "Solver error: {}", err),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<ModelError> for EngineError {
    #[inline]
    fn from(err: ModelError) -> Self {
        EngineError::Model(err)
    }
}

impl From<SolverError> for EngineError {
    #[inline]
    fn from(err: SolverError) -> Self {
        EngineError::Solver(err)
    }
}

/// What one build-and-solve produced.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveRun {
    schedule: Schedule,
    config: ModelConfig,
    runtime: Duration,
    var_count: usize,
    constraint_count: usize,
}

impl SolveRun {
    #[inline]
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    #[inline]
    pub fn into_schedule(self) -> Schedule {
        self.schedule
    }

    #[inline]
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Wall-clock time of model building and solving together.
    #[inline]
    pub fn runtime(&self) -> Duration {
        self.runtime
    }

    #[inline]
    pub fn var_count(&self) -> usize {
        self.var_count
    }

    #[inline]
    pub fn constraint_count(&self) -> usize {
        self.constraint_count
    }

    /// Result payload for `instance`, runtime included.
    pub fn to_payload(&self, instance: &Instance) -> ResultPayload {
        ResultPayload::from_schedule(instance, &self.schedule, self.config.objective)
            .with_runtime(self.runtime.as_secs_f64())
    }
}

/// Builds the model of an instance, solves it and extracts the schedule.
#[derive(Debug, Clone)]
pub struct SolveEngine<S = GoodLpSolver> {
    solver: S,
    config: ModelConfig,
}

impl Default for SolveEngine<GoodLpSolver> {
    #[inline]
    fn default() -> Self {
        Self::new(GoodLpSolver::default(), ModelConfig::default())
    }
}

impl<S: MilpSolver> SolveEngine<S> {
    #[inline]
    pub fn new(solver: S, config: ModelConfig) -> Self {
        Self { solver, config }
    }

    #[inline]
    pub fn solver(&self) -> &S {
        &self.solver
    }

    #[inline]
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    #[tracing::instrument(
        level = "info",
        skip_all,
        fields(
            solver = self.solver.name(),
            objective = %self.config.objective,
            passengers = instance.passenger_count()
        )
    )]
    pub fn solve(&self, instance: &Instance) -> Result<SolveRun, EngineError> {
        let start = Instant::now();
        let model = ModelBuilder::new(instance)
            .with_objective(self.config.objective)
            .build()?;
        let outcome = self
            .solver
            .solve(model.problem(), self.config.time_limit())?;
        let schedule = model.extract(instance, &outcome);
        let runtime = start.elapsed();

        tracing::info!(
            status = %schedule.status(),
            objective = ?schedule.objective(),
            departures = schedule.departures().len(),
            ?runtime,
            "solve finished"
        );

        Ok(SolveRun {
            schedule,
            config: self.config,
            runtime,
            var_count: model.problem().var_count(),
            constraint_count: model.problem().constraint_count(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{formulation::MilpProblem, solver::SolveOutcome};
    use shuttle_core::prelude::{Slot, Terminal};
    use shuttle_model::prelude::*;
    use std::cell::Cell;

    fn pid(n: u32) -> PassengerIdentifier {
        PassengerIdentifier::new(n)
    }

    fn instance(capacity: usize, passengers: &[(Terminal, u32, Slot)]) -> Instance {
        let mut b =
            InstanceBuilder::new(TimeGrid::unit(10, 2).unwrap()).with_uniform_fleet(1, capacity);
        for &(term, id, arr) in passengers {
            b.add_passenger(Passenger::new(term, pid(id), arr));
        }
        b.build().unwrap()
    }

    fn engine() -> SolveEngine {
        SolveEngine::default()
    }

    struct FixedSolver {
        status: ScheduleStatus,
        calls: Cell<usize>,
    }

    impl MilpSolver for FixedSolver {
        fn name(&self) -> &str {
            "fixed"
        }

        fn solve(&self, _: &MilpProblem, t: Duration) -> Result<SolveOutcome, SolverError> {
            self.calls.set(self.calls.get() + 1);
            Ok(SolveOutcome::new(self.status, Vec::new(), t))
        }
    }

    struct BrokenSolver;

    impl MilpSolver for BrokenSolver {
        fn name(&self) -> &str {
            "broken"
        }

        fn solve(&self, _: &MilpProblem, _: Duration) -> Result<SolveOutcome, SolverError> {
            Err(SolverError::Backend("license expired".into()))
        }
    }

    #[test]
    fn test_scenario_single_passenger_is_verified() {
        let inst = instance(1, &[(Terminal::A, 1, 0)]);
        let run = engine().solve(&inst).unwrap();
        let schedule = run.schedule();

        assert_eq!(schedule.status(), ScheduleStatus::Optimal);
        assert_eq!(schedule.objective(), Some(0.0));
        let b = schedule.boardings()[0];
        assert!(b.time() <= inst.cutoff());
        assert_eq!(b.reported_wait(), Some(b.time()));
        assert!(Verifier::default().verify(&inst, schedule).is_pass());
    }

    #[test]
    fn test_scenario_capacity_one_splits_departures() {
        let inst = instance(1, &[(Terminal::A, 1, 0), (Terminal::A, 2, 0)]);
        let run = engine().solve(&inst).unwrap();
        let schedule = run.schedule();

        assert!(schedule.status().has_solution());
        let events = schedule.assignment_events();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.len() == 1));
        assert_ne!(events[0].time(), events[1].time());
        // Out at 0, back at 4.
        assert_eq!(schedule.objective(), Some(4.0));
        assert!(Verifier::default().verify(&inst, schedule).is_pass());
    }

    #[test]
    fn test_piecewise_objective_is_verified() {
        let inst = instance(
            1,
            &[(Terminal::A, 1, 0), (Terminal::A, 2, 0), (Terminal::B, 1, 1)],
        );
        let objective = ObjectiveKind::PiecewiseSquare { segments: 5 };
        let engine = SolveEngine::new(
            GoodLpSolver::default(),
            ModelConfig::default().with_objective(objective),
        );
        let run = engine.solve(&inst).unwrap();

        let verifier = Verifier::new(VerifierConfig::default().with_objective(objective));
        let report = verifier.verify(&inst, run.schedule());
        assert!(report.is_pass(), "{report}");
    }

    #[test]
    fn test_unreachable_passenger_fails_before_solving() {
        let inst = instance(1, &[(Terminal::B, 1, 9)]);
        let solver = FixedSolver {
            status: ScheduleStatus::Optimal,
            calls: Cell::new(0),
        };
        let engine = SolveEngine::new(&solver, ModelConfig::default());
        let err = engine.solve(&inst).unwrap_err();
        assert!(matches!(err, EngineError::Model(ModelError::EmptyFeasibleRange(_))));
        assert_eq!(solver.calls.get(), 0);
    }

    #[test]
    fn test_timeout_is_passed_through_as_empty_schedule() {
        let inst = instance(1, &[(Terminal::A, 1, 0)]);
        let solver = FixedSolver {
            status: ScheduleStatus::Timeout,
            calls: Cell::new(0),
        };
        let run = SolveEngine::new(&solver, ModelConfig::default())
            .solve(&inst)
            .unwrap();
        assert_eq!(run.schedule().status(), ScheduleStatus::Timeout);
        assert!(run.schedule().boardings().is_empty());
        assert_eq!(solver.calls.get(), 1);

        let report = Verifier::default().verify(&inst, run.schedule());
        assert_eq!(report.verdict(), Verdict::Inconclusive);
    }

    #[test]
    fn test_solver_errors_propagate() {
        let inst = instance(1, &[(Terminal::A, 1, 0)]);
        let err = SolveEngine::new(BrokenSolver, ModelConfig::default())
            .solve(&inst)
            .unwrap_err();
        assert!(matches!(err, EngineError::Solver(SolverError::Backend(_))));
    }

    #[test]
    fn test_payload_round_trips_through_extractor() {
        let inst = instance(2, &[(Terminal::A, 1, 0), (Terminal::B, 1, 3)]);
        let run = engine().solve(&inst).unwrap();
        let payload = run.to_payload(&inst);
        assert!(payload.runtime.is_some());

        let json = serde_json::to_string(&payload).unwrap();
        let back = ResultPayload::from_str(&json).unwrap();
        let (instance, schedule) = ScheduleExtractor::from_payload(&back).unwrap();
        assert!(Verifier::default().verify(&instance, &schedule).is_pass());
    }
}
