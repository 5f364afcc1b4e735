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

use crate::schedule::err::UnknownStatusError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduleStatus {
    Optimal,
    Feasible,
    Infeasible,
    #[serde(rename = "TIME_LIMIT")]
    Timeout,
}

impl ScheduleStatus {
    /// Maps a solver status string onto a status.
    ///
    /// Matching is case-insensitive and checked in order: anything mentioning
    /// infeasibility or starting with `NO_`, then optimality, then a time
    /// limit, then the plain feasible markers.
    pub fn parse(s: &str) -> Result<Self, UnknownStatusError> {
        let up = s.trim().to_ascii_uppercase();
        if up.contains("INFEASIBLE") || up.starts_with("NO_") {
            Ok(ScheduleStatus::Infeasible)
        } else if up.contains("OPTIMAL") {
            Ok(ScheduleStatus::Optimal)
        } else if up.contains("TIME") {
            Ok(ScheduleStatus::Timeout)
        } else if matches!(up.as_str(), "FEASIBLE" | "LOCALLY_SOLVED" | "SOLUTION_LIMIT") {
            Ok(ScheduleStatus::Feasible)
        } else {
            Err(UnknownStatusError::new(s))
        }
    }

    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleStatus::Optimal => "OPTIMAL",
            ScheduleStatus::Feasible => "FEASIBLE",
            ScheduleStatus::Infeasible => "INFEASIBLE",
            ScheduleStatus::Timeout => "TIME_LIMIT",
        }
    }

    /// Whether the status comes with a schedule worth checking.
    #[inline]
    pub fn has_solution(&self) -> bool {
        matches!(self, ScheduleStatus::Optimal | ScheduleStatus::Feasible)
    }
}

impl std::fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ScheduleStatus {
    type Err = UnknownStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
