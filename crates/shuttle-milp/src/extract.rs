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

use crate::{formulation::VarId, model::ShuttleModel, solver::SolveOutcome};
use shuttle_model::prelude::{Boarding, DepartureEvent, Instance, Schedule};

/// Binaries above this value count as selected.
const SELECTED: f64 = 0.5;

impl ShuttleModel {
    /// Turns solver values into a schedule.
    ///
    /// Waits are recomputed from the arrival, not read back from the
    /// continuous wait variables. Outcomes without a solution give an empty
    /// schedule carrying only the status.
    pub fn extract(&self, instance: &Instance, outcome: &SolveOutcome) -> Schedule {
        if !outcome.has_solution() {
            return Schedule::empty(outcome.status());
        }
        let values = outcome.values();
        let selected = |var: VarId| values.get(var.index()).is_some_and(|v| *v > SELECTED);

        let departures = self
            .index()
            .iter_departures()
            .filter(|(_, var)| selected(**var))
            .map(|(&(bus, terminal, t), _)| DepartureEvent::new(bus, terminal, t));

        let boardings = self
            .index()
            .iter_assignments()
            .filter(|(_, var)| selected(**var))
            .filter_map(|(&(key, bus, t), _)| {
                let p = instance.passenger(key)?;
                Some(Boarding::new(key.origin(), key.id(), bus, t).with_wait(t - p.arrival()))
            });

        // Integral breakpoints keep the objective integral.
        let raw = self.problem().objective().eval(values);
        let objective = if (raw - raw.round()).abs() < 1e-6 {
            raw.round()
        } else {
            raw
        };

        Schedule::new(outcome.status(), Some(objective), departures, boardings)
    }
}

#[cfg(test)]
mod tests {
    use crate::{model::builder::ModelBuilder, solver::SolveOutcome};
    use shuttle_core::prelude::Terminal;
    use shuttle_model::prelude::*;
    use std::time::Duration;

    fn bid(n: u32) -> BusIdentifier {
        BusIdentifier::new(n)
    }

    fn pid(n: u32) -> PassengerIdentifier {
        PassengerIdentifier::new(n)
    }

    fn instance() -> Instance {
        let mut b =
            InstanceBuilder::new(TimeGrid::unit(10, 2).unwrap()).with_uniform_fleet(1, 2);
        b.add_passenger(Passenger::new(Terminal::A, pid(1), 1));
        b.build().unwrap()
    }

    #[test]
    fn test_round_trip_through_encoded_values() {
        let instance = instance();
        let model = ModelBuilder::new(&instance).build().unwrap();
        let original = Schedule::new(
            ScheduleStatus::Optimal,
            Some(2.0),
            [DepartureEvent::new(bid(1), Terminal::A, 3)],
            [Boarding::new(Terminal::A, pid(1), bid(1), 3).with_wait(2)],
        );
        let values = model.index().encode(&instance, &original);
        let outcome = SolveOutcome::new(ScheduleStatus::Optimal, values, Duration::ZERO);

        let schedule = model.extract(&instance, &outcome);
        assert_eq!(schedule, original);
    }

    #[test]
    fn test_timeout_gives_empty_schedule() {
        let instance = instance();
        let model = ModelBuilder::new(&instance).build().unwrap();
        let schedule = model.extract(&instance, &SolveOutcome::timeout(Duration::ZERO));
        assert_eq!(schedule.status(), ScheduleStatus::Timeout);
        assert!(schedule.departures().is_empty());
        assert!(schedule.boardings().is_empty());
        assert_eq!(schedule.objective(), None);
    }

    #[test]
    fn test_near_integral_values_are_selected() {
        let instance = instance();
        let model = ModelBuilder::new(&instance).build().unwrap();
        let mut values = vec![0.0; model.problem().var_count()];
        let d = model.index().departure(bid(1), Terminal::A, 1).unwrap();
        let x = model
            .index()
            .assignment(PassengerKey::new(Terminal::A, pid(1)), bid(1), 1)
            .unwrap();
        values[d.index()] = 0.999_999_7;
        values[x.index()] = 1.000_000_2;
        let outcome = SolveOutcome::new(ScheduleStatus::Feasible, values, Duration::ZERO);

        let schedule = model.extract(&instance, &outcome);
        assert_eq!(schedule.departures(), &[DepartureEvent::new(bid(1), Terminal::A, 1)]);
        assert_eq!(schedule.boardings()[0].reported_wait(), Some(0));
        assert_eq!(schedule.status(), ScheduleStatus::Feasible);
    }
}
