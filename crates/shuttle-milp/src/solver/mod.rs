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
pub mod goodlp;

use crate::{formulation::MilpProblem, solver::err::SolverError};
use shuttle_model::prelude::ScheduleStatus;
use std::time::Duration;

/// Result of one solve.
///
/// `values` is indexed by variable id and empty unless the status carries
/// a solution.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveOutcome {
    status: ScheduleStatus,
    values: Vec<f64>,
    elapsed: Duration,
}

impl SolveOutcome {
    #[inline]
    pub fn new(status: ScheduleStatus, values: Vec<f64>, elapsed: Duration) -> Self {
        Self {
            status,
            values,
            elapsed,
        }
    }

    #[inline]
    pub fn infeasible(elapsed: Duration) -> Self {
        Self::new(ScheduleStatus::Infeasible, Vec::new(), elapsed)
    }

    #[inline]
    pub fn timeout(elapsed: Duration) -> Self {
        Self::new(ScheduleStatus::Timeout, Vec::new(), elapsed)
    }

    #[inline]
    pub fn status(&self) -> ScheduleStatus {
        self.status
    }

    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    #[inline]
    pub fn has_solution(&self) -> bool {
        self.status.has_solution() && !self.values.is_empty()
    }
}

/// Blocking solve with a wall-clock budget.
///
/// Running out of time is not an error: implementations report
/// [`ScheduleStatus::Timeout`], or [`ScheduleStatus::Feasible`] when they
/// stopped early with an incumbent.
pub trait MilpSolver {
    fn name(&self) -> &str;

    fn solve(&self, problem: &MilpProblem, time_limit: Duration)
    -> Result<SolveOutcome, SolverError>;
}

impl<S: MilpSolver + ?Sized> MilpSolver for &S {
    #[inline]
    fn name(&self) -> &str {
        (**self).name()
    }

    #[inline]
    fn solve(
        &self,
        problem: &MilpProblem,
        time_limit: Duration,
    ) -> Result<SolveOutcome, SolverError> {
        (**self).solve(problem, time_limit)
    }
}
