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

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ViolationKind {
    /// A passenger is boarded zero or several times.
    Uniqueness,
    /// A boarding rides a departure that does not exist.
    Link,
    /// A schedule mentions a bus the instance does not know.
    UnknownBus,
    Capacity,
    /// Reported wait differs from `time - arrival`.
    Wait,
    /// Negative wait, or no arrival on record for the boarded passenger.
    Arrival,
    WaitBound,
    /// Boarding after the late-boarding cutoff.
    Late,
    /// A bus departs twice in the same slot.
    Simultaneous,
    /// A bus departs while still travelling.
    Flow,
    /// A bus departs from a terminal it is not at.
    Location,
    Objective,
    Status,
    Meta,
    Departures,
    AssignCount,
    Mapping,
    Assignments,
    ObjectiveCheck,
}

impl ViolationKind {
    pub fn tag(&self) -> &'static str {
        match self {
            ViolationKind::Uniqueness => "F1",
            ViolationKind::Link => "LINK",
            ViolationKind::UnknownBus => "BUS",
            ViolationKind::Capacity => "CAP",
            ViolationKind::Wait => "WAIT",
            ViolationKind::Arrival => "ARR",
            ViolationKind::WaitBound => "WMAX",
            ViolationKind::Late => "LATE",
            ViolationKind::Simultaneous => "M3",
            ViolationKind::Flow => "FLOW",
            ViolationKind::Location => "LOC",
            ViolationKind::Objective => "OBJ",
            ViolationKind::Status => "STATUS",
            ViolationKind::Meta => "META",
            ViolationKind::Departures => "DEPARTURES",
            ViolationKind::AssignCount => "ASSIGN-COUNT",
            ViolationKind::Mapping => "MAP",
            ViolationKind::Assignments => "ASSIGNMENTS",
            ViolationKind::ObjectiveCheck => "OBJ-CHECK",
        }
    }
}

impl std::fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Violation {
    kind: ViolationKind,
    message: String,
}

impl Violation {
    #[inline]
    pub fn new(kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    #[inline]
    pub fn kind(&self) -> ViolationKind {
        self.kind
    }

    #[inline]
    pub fn tag(&self) -> &'static str {
        self.kind.tag()
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind.tag(), self.message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Fail,
    /// The schedule claims infeasibility or ran out of time and there is
    /// nothing to compare it against.
    Inconclusive,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Pass => write!(f, "PASSED"),
            Verdict::Fail => write!(f, "FAILED"),
            Verdict::Inconclusive => write!(f, "INCONCLUSIVE"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    verdict: Verdict,
    violations: Vec<Violation>,
}

impl VerificationReport {
    /// Pass when `violations` is empty, fail otherwise.
    pub fn from_violations(violations: Vec<Violation>) -> Self {
        let verdict = if violations.is_empty() {
            Verdict::Pass
        } else {
            Verdict::Fail
        };
        Self {
            verdict,
            violations,
        }
    }

    #[inline]
    pub fn inconclusive() -> Self {
        Self {
            verdict: Verdict::Inconclusive,
            violations: Vec::new(),
        }
    }

    #[inline]
    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    #[inline]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    #[inline]
    pub fn is_pass(&self) -> bool {
        self.verdict == Verdict::Pass
    }

    #[inline]
    pub fn is_fail(&self) -> bool {
        self.verdict == Verdict::Fail
    }

    pub fn count_of(&self, kind: ViolationKind) -> usize {
        self.violations.iter().filter(|v| v.kind() == kind).count()
    }

    #[inline]
    pub fn has(&self, kind: ViolationKind) -> bool {
        self.violations.iter().any(|v| v.kind() == kind)
    }
}

impl std::fmt::Display for VerificationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TEST {}", self.verdict)?;
        for v in &self.violations {
            write!(f, "\n - {}", v)?;
        }
        Ok(())
    }
}
