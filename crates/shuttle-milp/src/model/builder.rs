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
    formulation::{Constraint, LinearExpr, MilpProblem, Sense, VarDef, VarId},
    model::{ShuttleModel, err::{EmptyFeasibleRangeError, ModelError}, index::ModelIndex},
};
use shuttle_core::prelude::{Slot, Terminal};
use shuttle_model::prelude::{
    BusIdentifier, InitialPlacement, Instance, ObjectiveKind, Passenger,
};

/// Expresses the shuttle scheduling problem of one instance as a MILP.
///
/// Decision variables, per bus `b`, terminal `X` and slot `t`:
///
/// * `x[p,b,t]` passenger `p` boards bus `b` at `t`, only for `t` in
///   `[arrival(p), cutoff]`;
/// * `d[b,X,t]` bus `b` leaves `X` at `t`, only for `t <= cutoff`;
/// * `a[b,X,t]` bus `b` stands at `X` at `t`;
/// * `wait[p]` and, for the piecewise objective, its surrogate `z[p]`.
///
/// A bus leaving `Y` at `s` stands at `X` again from `s + tau`; in between
/// it is in transit and neither `a` is set.
#[derive(Debug, Clone)]
pub struct ModelBuilder<'a> {
    instance: &'a Instance,
    objective: ObjectiveKind,
}

fn bus_tag(bus: BusIdentifier) -> String {
    format!("b{}", bus.value())
}

impl<'a> ModelBuilder<'a> {
    #[inline]
    pub fn new(instance: &'a Instance) -> Self {
        Self {
            instance,
            objective: ObjectiveKind::Linear,
        }
    }

    #[inline]
    pub fn with_objective(mut self, objective: ObjectiveKind) -> Self {
        self.objective = objective;
        self
    }

    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(
            buses = self.instance.bus_count(),
            passengers = self.instance.passenger_count(),
            objective = %self.objective
        )
    )]
    pub fn build(self) -> Result<ShuttleModel, ModelError> {
        let instance = self.instance;
        if instance.bus_count() == 0 {
            return Err(ModelError::NoBuses);
        }
        if self.objective == ObjectiveKind::Squared {
            return Err(ModelError::UnsupportedObjective(self.objective));
        }
        for p in instance.iter_passengers() {
            if instance.allowed_times(p).is_empty() {
                return Err(EmptyFeasibleRangeError::new(p.key(), p.arrival(), instance.cutoff())
                    .into());
            }
        }

        let surrogate = self.objective.surrogate(instance.w_max())?;
        let mut problem = MilpProblem::new();
        let mut index = ModelIndex::new(*instance.grid(), surrogate);

        self.add_bus_variables(&mut problem, &mut index);
        self.add_passenger_variables(&mut problem, &mut index);
        self.add_assignment_rows(&mut problem, &index);
        self.add_capacity_rows(&mut problem, &index);
        self.add_location_rows(&mut problem, &index);
        self.add_flow_rows(&mut problem, &index);
        self.add_initial_rows(&mut problem, &index);
        self.add_wait_rows(&mut problem, &index);
        self.add_objective(&mut problem, &mut index);

        index.set_var_count(problem.var_count());
        tracing::debug!(
            vars = problem.var_count(),
            constraints = problem.constraint_count(),
            assignments = index.assignment_count(),
            departures = index.departure_count(),
            "model built"
        );
        Ok(ShuttleModel::new(problem, index, self.objective))
    }

    fn add_bus_variables(&self, problem: &mut MilpProblem, index: &mut ModelIndex) {
        let grid = self.instance.grid();
        let cutoff = grid.cutoff();
        for bus in self.instance.iter_buses() {
            let b = bus_tag(bus.id());
            for t in grid.slots() {
                for term in Terminal::ALL {
                    let a = problem.add_var(VarDef::binary(format!("a[{},{},t{}]", b, term, t)));
                    index.insert_available((bus.id(), term, t), a);
                    if t <= cutoff {
                        let d =
                            problem.add_var(VarDef::binary(format!("d[{},{},t{}]", b, term, t)));
                        index.insert_departure((bus.id(), term, t), d);
                    }
                }
            }
        }
    }

    fn add_passenger_variables(&self, problem: &mut MilpProblem, index: &mut ModelIndex) {
        let w_max = self.instance.w_max() as f64;
        for p in self.instance.iter_passengers() {
            let key = p.key();
            for t in self.instance.allowed_times(p) {
                for bus in self.instance.iter_buses() {
                    let x = problem.add_var(VarDef::binary(format!(
                        "x[{},{},t{}]",
                        key,
                        bus_tag(bus.id()),
                        t
                    )));
                    index.insert_assignment((key, bus.id(), t), x);
                }
            }
            let wait = problem.add_var(VarDef::continuous(format!("wait[{}]", key), 0.0, w_max));
            index.insert_wait(key, wait);
        }
    }

    fn boarding_terms<'p>(
        &'p self,
        index: &'p ModelIndex,
        p: &'p Passenger,
    ) -> impl Iterator<Item = (BusIdentifier, Slot, VarId)> + 'p {
        self.instance.allowed_times(p).into_iter().flat_map(move |t| {
            self.instance
                .iter_buses()
                .filter_map(move |bus| index.assignment(p.key(), bus.id(), t).map(|x| (bus.id(), t, x)))
        })
    }

    /// `Σ_{b,t} x[p,b,t] = 1`.
    fn add_assignment_rows(&self, problem: &mut MilpProblem, index: &ModelIndex) {
        for p in self.instance.iter_passengers() {
            let expr: LinearExpr = self
                .boarding_terms(index, p)
                .map(|(_, _, x)| (x, 1.0))
                .collect();
            problem.add_constraint(Constraint::new(
                format!("assign_{}[{}]", p.origin(), p.id().value()),
                expr,
                Sense::Eq,
                1.0,
            ));
        }
    }

    /// `Σ_p x[p,b,t] - capacity(b) · d[b,X,t] <= 0` for boarders at `X`.
    fn add_capacity_rows(&self, problem: &mut MilpProblem, index: &ModelIndex) {
        for ((bus, term, t), &d) in index.iter_departures() {
            let Some(capacity) = self.instance.bus(*bus).map(|b| b.capacity()) else {
                continue;
            };
            let mut expr: LinearExpr = self
                .instance
                .iter_passengers_at(*term)
                .filter_map(|p| index.assignment(p.key(), *bus, *t))
                .map(|x| (x, 1.0))
                .collect();
            if expr.is_empty() {
                continue;
            }
            expr.add_term(d, -(capacity as f64));
            problem.add_constraint(Constraint::new(
                format!("board_cap[{},{},t{}]", bus_tag(*bus), term, t),
                expr,
                Sense::Le,
                0.0,
            ));
        }
    }

    /// A bus departs only from where it stands and stands in one place.
    fn add_location_rows(&self, problem: &mut MilpProblem, index: &ModelIndex) {
        let grid = self.instance.grid();
        for bus in self.instance.iter_buses() {
            let id = bus.id();
            let b = bus_tag(id);
            for t in grid.slots() {
                let mut leaving = LinearExpr::new();
                let mut standing = LinearExpr::new();
                for term in Terminal::ALL {
                    let Some(a) = index.available(id, term, t) else {
                        continue;
                    };
                    standing.add_term(a, 1.0);
                    if let Some(d) = index.departure(id, term, t) {
                        leaving.add_term(d, 1.0);
                        problem.add_constraint(Constraint::new(
                            format!("depart_if_avail[{},{},t{}]", b, term, t),
                            LinearExpr::from_iter([(d, 1.0), (a, -1.0)]),
                            Sense::Le,
                            0.0,
                        ));
                    }
                }
                if !leaving.is_empty() {
                    problem.add_constraint(Constraint::new(
                        format!("one_departure[{},t{}]", b, t),
                        leaving,
                        Sense::Le,
                        1.0,
                    ));
                }
                problem.add_constraint(Constraint::new(
                    format!("one_location[{},t{}]", b, t),
                    standing,
                    Sense::Le,
                    1.0,
                ));
            }
        }
    }

    /// `a[b,X,i+1] = a[b,X,i] - d[b,X,i] + d[b,Y,i+1-k]` with `k` transit slots.
    fn add_flow_rows(&self, problem: &mut MilpProblem, index: &ModelIndex) {
        let grid = self.instance.grid();
        let k = index.transit_slots();
        for bus in self.instance.iter_buses() {
            let id = bus.id();
            for i in 0..grid.len().saturating_sub(1) {
                let (Some(now), Some(next)) = (grid.slot_at(i), grid.slot_at(i + 1)) else {
                    continue;
                };
                for term in Terminal::ALL {
                    let (Some(a_now), Some(a_next)) =
                        (index.available(id, term, now), index.available(id, term, next))
                    else {
                        continue;
                    };
                    let mut expr = LinearExpr::from_iter([(a_next, 1.0), (a_now, -1.0)]);
                    if let Some(d) = index.departure(id, term, now) {
                        expr.add_term(d, 1.0);
                    }
                    if let Some(sent) = (i + 1).checked_sub(k).and_then(|j| grid.slot_at(j))
                        && let Some(d) = index.departure(id, term.opposite(), sent)
                    {
                        expr.add_term(d, -1.0);
                    }
                    problem.add_constraint(Constraint::new(
                        format!("flow[{},{},t{}]", bus_tag(id), term, next),
                        expr,
                        Sense::Eq,
                        0.0,
                    ));
                }
            }
        }
    }

    fn add_initial_rows(&self, problem: &mut MilpProblem, index: &ModelIndex) {
        let first = self.instance.grid().start();
        match self.instance.placement() {
            InitialPlacement::Explicit(map) => {
                for (bus, start) in map {
                    for term in Terminal::ALL {
                        let Some(a) = index.available(bus, term, first) else {
                            continue;
                        };
                        let value = if term == start { 1.0 } else { 0.0 };
                        problem.add_constraint(Constraint::new(
                            format!("init[{},{}]", bus_tag(bus), term),
                            LinearExpr::new().with_term(a, 1.0),
                            Sense::Eq,
                            value,
                        ));
                    }
                }
            }
            InitialPlacement::AtA(at_a) => {
                let n = self.instance.bus_count();
                for (term, count) in [(Terminal::A, at_a), (Terminal::B, n.saturating_sub(at_a))] {
                    let expr: LinearExpr = self
                        .instance
                        .iter_buses()
                        .filter_map(|b| index.available(b.id(), term, first))
                        .map(|a| (a, 1.0))
                        .collect();
                    problem.add_constraint(Constraint::new(
                        format!("init_count_{}", term),
                        expr,
                        Sense::Eq,
                        count as f64,
                    ));
                }
            }
        }
    }

    /// `wait[p] - Σ t · x[p,b,t] = -arrival(p)`.
    fn add_wait_rows(&self, problem: &mut MilpProblem, index: &ModelIndex) {
        for p in self.instance.iter_passengers() {
            let Some(wait) = index.wait(p.key()) else {
                continue;
            };
            let mut expr: LinearExpr = self
                .boarding_terms(index, p)
                .map(|(_, t, x)| (x, -(t as f64)))
                .collect();
            expr.add_term(wait, 1.0);
            problem.add_constraint(Constraint::new(
                format!("wait_def[{}]", p.key()),
                expr,
                Sense::Eq,
                -(p.arrival() as f64),
            ));
        }
    }

    fn add_objective(&self, problem: &mut MilpProblem, index: &mut ModelIndex) {
        let waits: Vec<_> = self
            .instance
            .iter_passengers()
            .filter_map(|p| index.wait(p.key()).map(|w| (p.key(), w)))
            .collect();

        let Some(surrogate) = index.surrogate().cloned() else {
            problem.set_objective(waits.into_iter().map(|(_, w)| (w, 1.0)).collect());
            return;
        };

        let mut objective = LinearExpr::new();
        for (key, wait) in waits {
            let z = problem.add_var(VarDef::continuous(format!("z[{}]", key), 0.0, f64::INFINITY));
            index.insert_surrogate(key, z);
            objective.add_term(z, 1.0);
            for (k, secant) in surrogate.secants().enumerate() {
                problem.add_constraint(Constraint::new(
                    format!("square_cut[{},{}]", key, k),
                    LinearExpr::from_iter([(z, 1.0), (wait, -secant.slope())]),
                    Sense::Ge,
                    secant.intercept(),
                ));
            }
        }
        problem.set_objective(objective);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shuttle_model::prelude::{
        Boarding, Bus, DepartureEvent, InstanceBuilder, PassengerIdentifier, PassengerKey,
        Schedule, ScheduleStatus, TimeGrid,
    };

    fn bid(n: u32) -> BusIdentifier {
        BusIdentifier::new(n)
    }

    fn pid(n: u32) -> PassengerIdentifier {
        PassengerIdentifier::new(n)
    }

    fn single_bus(horizon: Slot, tau: Slot, capacity: usize) -> InstanceBuilder {
        InstanceBuilder::new(TimeGrid::unit(horizon, tau).unwrap()).with_uniform_fleet(1, capacity)
    }

    fn violations(model: &ShuttleModel, instance: &Instance, schedule: &Schedule) -> Vec<String> {
        let values = model.index().encode(instance, schedule);
        model.problem().violated_constraints(&values, 1e-9)
    }

    #[test]
    fn test_no_buses_is_rejected() {
        let instance = InstanceBuilder::new(TimeGrid::unit(10, 2).unwrap())
            .build()
            .unwrap();
        let err = ModelBuilder::new(&instance).build().unwrap_err();
        assert_eq!(err, ModelError::NoBuses);
    }

    #[test]
    fn test_arrival_after_cutoff_is_empty_range() {
        let mut b = single_bus(10, 2, 1);
        b.add_passenger(Passenger::new(Terminal::A, pid(7), 9));
        let instance = b.build().unwrap();
        match ModelBuilder::new(&instance).build() {
            Err(ModelError::EmptyFeasibleRange(e)) => {
                assert_eq!(e.passenger().id(), pid(7));
                assert_eq!(e.cutoff(), 8);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_squared_objective_is_unsupported() {
        let instance = single_bus(10, 2, 1).build().unwrap();
        let err = ModelBuilder::new(&instance)
            .with_objective(ObjectiveKind::Squared)
            .build()
            .unwrap_err();
        assert!(matches!(err, ModelError::UnsupportedObjective(_)));
    }

    #[test]
    fn test_variable_layout() {
        let mut b = single_bus(10, 2, 4);
        b.add_passenger(Passenger::new(Terminal::A, pid(1), 0));
        b.add_passenger(Passenger::new(Terminal::B, pid(1), 5));
        let instance = b.build().unwrap();
        let model = ModelBuilder::new(&instance).build().unwrap();
        let index = model.index();

        // 11 slots, departures only up to the cutoff 8.
        assert_eq!(index.departure_count(), 2 * 9);
        assert!(index.departure(bid(1), Terminal::A, 9).is_none());
        assert!(index.available(bid(1), Terminal::A, 10).is_some());
        // A:1 may board at 0..=8, B:1 at 5..=8.
        assert_eq!(index.assignment_count(), 9 + 4);
        assert!(index.assignment(PassengerKey::new(Terminal::B, pid(1)), bid(1), 4).is_none());
        assert_eq!(model.problem().iter_constraints_named("assign_").count(), 2);
        assert_eq!(model.problem().iter_constraints_named("init_count_").count(), 2);
    }

    #[test]
    fn test_valid_schedule_satisfies_every_row() {
        let mut b = single_bus(10, 2, 1);
        b.add_passenger(Passenger::new(Terminal::A, pid(1), 0));
        b.add_passenger(Passenger::new(Terminal::A, pid(2), 0));
        b.add_passenger(Passenger::new(Terminal::B, pid(1), 1));
        let instance = b.build().unwrap();
        let model = ModelBuilder::new(&instance).build().unwrap();

        let schedule = Schedule::new(
            ScheduleStatus::Optimal,
            Some(5.0),
            [
                DepartureEvent::new(bid(1), Terminal::A, 0),
                DepartureEvent::new(bid(1), Terminal::B, 2),
                DepartureEvent::new(bid(1), Terminal::A, 4),
            ],
            [
                Boarding::new(Terminal::A, pid(1), bid(1), 0),
                Boarding::new(Terminal::B, pid(1), bid(1), 2),
                Boarding::new(Terminal::A, pid(2), bid(1), 4),
            ],
        );
        assert!(violations(&model, &instance, &schedule).is_empty());
        let values = model.index().encode(&instance, &schedule);
        assert_eq!(model.problem().objective().eval(&values), 5.0);
    }

    #[test]
    fn test_over_capacity_breaks_board_cap() {
        let mut b = single_bus(10, 2, 1);
        b.add_passenger(Passenger::new(Terminal::A, pid(1), 0));
        b.add_passenger(Passenger::new(Terminal::A, pid(2), 0));
        let instance = b.build().unwrap();
        let model = ModelBuilder::new(&instance).build().unwrap();

        let schedule = Schedule::new(
            ScheduleStatus::Optimal,
            None,
            [DepartureEvent::new(bid(1), Terminal::A, 0)],
            [
                Boarding::new(Terminal::A, pid(1), bid(1), 0),
                Boarding::new(Terminal::A, pid(2), bid(1), 0),
            ],
        );
        let broken = violations(&model, &instance, &schedule);
        assert_eq!(broken, vec!["board_cap[b1,A,t0]".to_string()]);
    }

    #[test]
    fn test_early_return_breaks_flow() {
        let instance = single_bus(10, 3, 1).build().unwrap();
        let model = ModelBuilder::new(&instance).build().unwrap();

        // Back at A after two slots with tau = 3.
        let schedule = Schedule::new(
            ScheduleStatus::Optimal,
            None,
            [
                DepartureEvent::new(bid(1), Terminal::A, 0),
                DepartureEvent::new(bid(1), Terminal::B, 2),
            ],
            [],
        );
        let broken = violations(&model, &instance, &schedule);
        assert!(broken.iter().any(|n| n.starts_with("depart_if_avail[b1,B,t2]")), "{broken:?}");
    }

    #[test]
    fn test_explicit_placement_pins_first_slot() {
        let grid = TimeGrid::unit(6, 2).unwrap();
        let instance = InstanceBuilder::new(grid)
            .with_buses([
                Bus::new(bid(1), 2).starting_at(Terminal::A),
                Bus::new(bid(2), 2).starting_at(Terminal::B),
            ])
            .build()
            .unwrap();
        let model = ModelBuilder::new(&instance).build().unwrap();
        assert_eq!(model.problem().iter_constraints_named("init[").count(), 4);
        assert_eq!(model.problem().iter_constraints_named("init_count_").count(), 0);

        // Bus 2 cannot leave A first.
        let schedule = Schedule::new(
            ScheduleStatus::Optimal,
            None,
            [DepartureEvent::new(bid(2), Terminal::A, 0)],
            [],
        );
        assert!(!violations(&model, &instance, &schedule).is_empty());
    }

    #[test]
    fn test_piecewise_objective_adds_cuts() {
        let mut b = single_bus(10, 2, 2).w_max(4);
        b.add_passenger(Passenger::new(Terminal::A, pid(1), 0));
        let instance = b.build().unwrap();
        let model = ModelBuilder::new(&instance)
            .with_objective(ObjectiveKind::PiecewiseSquare { segments: 2 })
            .build()
            .unwrap();
        let key = PassengerKey::new(Terminal::A, pid(1));
        assert!(model.index().surrogate_var(key).is_some());
        // Breakpoints 0, 2, 4.
        assert_eq!(model.problem().iter_constraints_named("square_cut").count(), 2);

        let schedule = Schedule::new(
            ScheduleStatus::Optimal,
            None,
            [DepartureEvent::new(bid(1), Terminal::A, 3)],
            [Boarding::new(Terminal::A, pid(1), bid(1), 3)],
        );
        let values = model.index().encode(&instance, &schedule);
        assert!(model.problem().violated_constraints(&values, 1e-9).is_empty());
        // Chord through (2, 4) and (4, 16) at 3.
        assert_eq!(model.problem().objective().eval(&values), 10.0);
    }

    #[test]
    fn test_zero_tau_uses_one_transit_slot() {
        let instance = single_bus(4, 0, 1).build().unwrap();
        let model = ModelBuilder::new(&instance).build().unwrap();
        assert_eq!(model.index().transit_slots(), 1);
        assert!(model.index().departure(bid(1), Terminal::A, 4).is_some());

        let schedule = Schedule::new(
            ScheduleStatus::Optimal,
            None,
            [
                DepartureEvent::new(bid(1), Terminal::A, 0),
                DepartureEvent::new(bid(1), Terminal::B, 1),
            ],
            [],
        );
        assert!(violations(&model, &instance, &schedule).is_empty());
    }
}
