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

pub mod builder;
pub mod config;
pub mod err;
pub mod index;

use crate::{formulation::MilpProblem, model::index::ModelIndex};
use shuttle_model::prelude::ObjectiveKind;

/// A built problem together with the map back to the instance.
#[derive(Debug, Clone)]
pub struct ShuttleModel {
    problem: MilpProblem,
    index: ModelIndex,
    objective: ObjectiveKind,
}

impl ShuttleModel {
    #[inline]
    pub(crate) fn new(problem: MilpProblem, index: ModelIndex, objective: ObjectiveKind) -> Self {
        Self {
            problem,
            index,
            objective,
        }
    }

    #[inline]
    pub fn problem(&self) -> &MilpProblem {
        &self.problem
    }

    #[inline]
    pub fn index(&self) -> &ModelIndex {
        &self.index
    }

    #[inline]
    pub fn objective_kind(&self) -> ObjectiveKind {
        self.objective
    }

    #[inline]
    pub fn into_parts(self) -> (MilpProblem, ModelIndex) {
        (self.problem, self.index)
    }
}
