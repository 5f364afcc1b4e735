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
    formulation::{LinearExpr, MilpProblem, Sense, VarDef, VarKind},
    solver::{MilpSolver, SolveOutcome, err::SolverError},
};
use good_lp::{
    Expression, ResolutionError, Solution, SolverModel, Variable, VariableDefinition,
    solvers::microlp::microlp, variable, variables,
};
use shuttle_model::prelude::ScheduleStatus;
use std::{
    panic::{AssertUnwindSafe, catch_unwind},
    sync::mpsc::{RecvTimeoutError, channel},
    thread,
    time::{Duration, Instant},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Backend {
    /// Pure Rust branch and bound; has no internal time limit.
    #[default]
    MicroLp,
    #[cfg(feature = "highs")]
    Highs,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::MicroLp => write!(f, "microlp"),
            #[cfg(feature = "highs")]
            Backend::Highs => write!(f, "highs"),
        }
    }
}

/// [`MilpSolver`] on top of `good_lp`.
///
/// Every solve runs on its own `milp-worker` thread. The caller waits for
/// the time limit plus `grace`; a worker that has not answered by then is
/// abandoned and the outcome is a timeout.
///
/// An abandoned worker cannot be cancelled. HiGHS is handed the time limit
/// and stops on its own shortly after, but microlp keeps its core busy
/// until the search ends. Sweeps that run many microlp solves in one
/// process should keep the budget generous or use HiGHS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GoodLpSolver {
    backend: Backend,
    grace: Duration,
}

impl Default for GoodLpSolver {
    #[inline]
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            grace: Duration::from_secs(1),
        }
    }
}

impl GoodLpSolver {
    #[inline]
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            ..Self::default()
        }
    }

    #[inline]
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    #[inline]
    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// The backend honours the time limit itself and may return an
    /// incumbent that is not proven optimal.
    #[inline]
    fn stops_early(&self) -> bool {
        match self.backend {
            Backend::MicroLp => false,
            #[cfg(feature = "highs")]
            Backend::Highs => true,
        }
    }
}

type Reply = std::thread::Result<Result<Vec<f64>, ResolutionError>>;

impl MilpSolver for GoodLpSolver {
    fn name(&self) -> &str {
        match self.backend {
            Backend::MicroLp => "good_lp/microlp",
            #[cfg(feature = "highs")]
            Backend::Highs => "good_lp/highs",
        }
    }

    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(
            backend = %self.backend,
            vars = problem.var_count(),
            constraints = problem.constraint_count()
        )
    )]
    fn solve(
        &self,
        problem: &MilpProblem,
        time_limit: Duration,
    ) -> Result<SolveOutcome, SolverError> {
        let (tx, rx) = channel::<Reply>();
        let job = problem.clone();
        let backend = self.backend;
        let start = Instant::now();

        let _worker = thread::Builder::new()
            .name("milp-worker".into())
            .spawn(move || {
                let res = catch_unwind(AssertUnwindSafe(|| run_job(backend, &job, time_limit)));
                let _ = tx.send(res);
            })?;

        let reply = rx.recv_timeout(time_limit.saturating_add(self.grace));
        let elapsed = start.elapsed();
        match reply {
            Ok(Ok(Ok(values))) => {
                let status = if self.stops_early() && elapsed >= time_limit {
                    ScheduleStatus::Feasible
                } else {
                    ScheduleStatus::Optimal
                };
                tracing::debug!(%status, ?elapsed, "solve finished");
                Ok(SolveOutcome::new(status, values, elapsed))
            }
            Ok(Ok(Err(ResolutionError::Infeasible))) => {
                tracing::debug!(?elapsed, "problem infeasible");
                Ok(SolveOutcome::infeasible(elapsed))
            }
            Ok(Ok(Err(ResolutionError::Unbounded))) => Err(SolverError::Unbounded),
            Ok(Ok(Err(e))) => Err(SolverError::Backend(e.to_string())),
            Ok(Err(_)) | Err(RecvTimeoutError::Disconnected) => Err(SolverError::WorkerPanicked),
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!(
                    ?time_limit,
                    still_running = !self.stops_early(),
                    "solver did not answer in time, worker abandoned"
                );
                Ok(SolveOutcome::timeout(elapsed))
            }
        }
    }
}

fn declare(def: &VarDef) -> VariableDefinition {
    let v = variable().name(def.name());
    match def.kind() {
        VarKind::Binary => v.binary(),
        VarKind::Integer => v.integer().min(def.lower()).max(def.upper()),
        VarKind::Continuous => v.min(def.lower()).max(def.upper()),
    }
}

fn to_expression(expr: &LinearExpr, xs: &[Variable]) -> Expression {
    expr.terms()
        .iter()
        .fold(Expression::from(expr.constant_term()), |acc, (v, c)| {
            acc + *c * xs[v.index()]
        })
}

#[cfg_attr(not(feature = "highs"), allow(unused_variables))]
fn run_job(
    backend: Backend,
    problem: &MilpProblem,
    time_limit: Duration,
) -> Result<Vec<f64>, ResolutionError> {
    let mut vars = variables!();
    let xs: Vec<Variable> = problem.vars().iter().map(|d| vars.add(declare(d))).collect();
    let objective = to_expression(problem.objective(), &xs);
    let unsolved = vars.minimise(objective);

    match backend {
        Backend::MicroLp => finish(unsolved.using(microlp), problem, &xs),
        #[cfg(feature = "highs")]
        Backend::Highs => finish(
            unsolved
                .using(good_lp::solvers::highs::highs)
                .with_time_limit(time_limit.as_secs_f64()),
            problem,
            &xs,
        ),
    }
}

fn finish<M>(mut model: M, problem: &MilpProblem, xs: &[Variable]) -> Result<Vec<f64>, ResolutionError>
where
    M: SolverModel<Error = ResolutionError>,
{
    for c in problem.constraints() {
        let lhs = to_expression(c.expr(), xs);
        let row = match c.sense() {
            Sense::Eq => lhs.eq(c.rhs()),
            Sense::Le => lhs.leq(c.rhs()),
            Sense::Ge => lhs.geq(c.rhs()),
        };
        model.add_constraint(row);
    }
    let solution = model.solve()?;
    Ok(xs.iter().map(|v| solution.value(*v)).collect())
}
