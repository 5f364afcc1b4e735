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

//! Solver-agnostic mixed-integer linear program.
//!
//! Variables are addressed by dense [`VarId`]s in creation order, so a
//! solution is simply a `Vec<f64>` indexed by `VarId::index`.

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarId(usize);

impl VarId {
    #[inline]
    pub fn index(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for VarId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarKind {
    Binary,
    Integer,
    Continuous,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDef {
    name: String,
    kind: VarKind,
    lower: f64,
    upper: f64,
}

impl VarDef {
    #[inline]
    pub fn binary(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: VarKind::Binary,
            lower: 0.0,
            upper: 1.0,
        }
    }

    #[inline]
    pub fn integer(name: impl Into<String>, lower: f64, upper: f64) -> Self {
        Self {
            name: name.into(),
            kind: VarKind::Integer,
            lower,
            upper,
        }
    }

    #[inline]
    pub fn continuous(name: impl Into<String>, lower: f64, upper: f64) -> Self {
        Self {
            name: name.into(),
            kind: VarKind::Continuous,
            lower,
            upper,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn kind(&self) -> VarKind {
        self.kind
    }

    #[inline]
    pub fn lower(&self) -> f64 {
        self.lower
    }

    /// `f64::INFINITY` when unbounded above.
    #[inline]
    pub fn upper(&self) -> f64 {
        self.upper
    }

    /// Whether `value` respects the bounds and integrality of the variable.
    pub fn admits(&self, value: f64, tolerance: f64) -> bool {
        if value < self.lower - tolerance || value > self.upper + tolerance {
            return false;
        }
        match self.kind {
            VarKind::Continuous => true,
            VarKind::Binary | VarKind::Integer => (value - value.round()).abs() <= tolerance,
        }
    }
}

/// `Σ coef · var + constant`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LinearExpr {
    terms: Vec<(VarId, f64)>,
    constant: f64,
}

impl LinearExpr {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn constant(value: f64) -> Self {
        Self {
            terms: Vec::new(),
            constant: value,
        }
    }

    #[inline]
    pub fn with_term(mut self, var: VarId, coef: f64) -> Self {
        self.add_term(var, coef);
        self
    }

    #[inline]
    pub fn add_term(&mut self, var: VarId, coef: f64) -> &mut Self {
        self.terms.push((var, coef));
        self
    }

    #[inline]
    pub fn add_constant(&mut self, value: f64) -> &mut Self {
        self.constant += value;
        self
    }

    #[inline]
    pub fn terms(&self) -> &[(VarId, f64)] {
        &self.terms
    }

    #[inline]
    pub fn constant_term(&self) -> f64 {
        self.constant
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Value of the expression under `values`; missing entries count as 0.
    pub fn eval(&self, values: &[f64]) -> f64 {
        self.terms.iter().fold(self.constant, |acc, (v, c)| {
            acc + c * values.get(v.index()).copied().unwrap_or(0.0)
        })
    }
}

impl FromIterator<(VarId, f64)> for LinearExpr {
    fn from_iter<I: IntoIterator<Item = (VarId, f64)>>(iter: I) -> Self {
        Self {
            terms: iter.into_iter().collect(),
            constant: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sense {
    Eq,
    Le,
    Ge,
}

impl std::fmt::Display for Sense {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sense::Eq => write!(f, "="),
            Sense::Le => write!(f, "<="),
            Sense::Ge => write!(f, ">="),
        }
    }
}

/// Named row `expr (sense) rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    name: String,
    expr: LinearExpr,
    sense: Sense,
    rhs: f64,
}

impl Constraint {
    #[inline]
    pub fn new(name: impl Into<String>, expr: LinearExpr, sense: Sense, rhs: f64) -> Self {
        Self {
            name: name.into(),
            expr,
            sense,
            rhs,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn expr(&self) -> &LinearExpr {
        &self.expr
    }

    #[inline]
    pub fn sense(&self) -> Sense {
        self.sense
    }

    #[inline]
    pub fn rhs(&self) -> f64 {
        self.rhs
    }

    /// How far `values` are from satisfying the row; 0 when satisfied.
    pub fn violation(&self, values: &[f64]) -> f64 {
        let lhs = self.expr.eval(values);
        match self.sense {
            Sense::Eq => (lhs - self.rhs).abs(),
            Sense::Le => (lhs - self.rhs).max(0.0),
            Sense::Ge => (self.rhs - lhs).max(0.0),
        }
    }
}

/// Minimization problem over binary, integer and continuous variables.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MilpProblem {
    vars: Vec<VarDef>,
    constraints: Vec<Constraint>,
    objective: LinearExpr,
}

impl MilpProblem {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn add_var(&mut self, def: VarDef) -> VarId {
        self.vars.push(def);
        VarId(self.vars.len() - 1)
    }

    #[inline]
    pub fn add_constraint(&mut self, constraint: Constraint) -> &mut Self {
        self.constraints.push(constraint);
        self
    }

    #[inline]
    pub fn set_objective(&mut self, objective: LinearExpr) -> &mut Self {
        self.objective = objective;
        self
    }

    #[inline]
    pub fn vars(&self) -> &[VarDef] {
        &self.vars
    }

    #[inline]
    pub fn var(&self, id: VarId) -> Option<&VarDef> {
        self.vars.get(id.index())
    }

    #[inline]
    pub fn var_count(&self) -> usize {
        self.vars.len()
    }

    #[inline]
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    #[inline]
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    #[inline]
    pub fn iter_constraints_named<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = &'a Constraint> + 'a {
        self.constraints
            .iter()
            .filter(move |c| c.name.starts_with(prefix))
    }

    #[inline]
    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    /// Names of the rows and variables that `values` violate by more than
    /// `tolerance`.
    pub fn violated_constraints(&self, values: &[f64], tolerance: f64) -> Vec<String> {
        let mut out: Vec<String> = self
            .vars
            .iter()
            .enumerate()
            .filter(|(i, def)| !def.admits(values.get(*i).copied().unwrap_or(0.0), tolerance))
            .map(|(_, def)| def.name.clone())
            .collect();
        out.extend(
            self.constraints
                .iter()
                .filter(|c| c.violation(values) > tolerance)
                .map(|c| c.name.clone()),
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_var_ids_are_dense() {
        let mut p = MilpProblem::new();
        let a = p.add_var(VarDef::binary("a"));
        let b = p.add_var(VarDef::continuous("b", 0.0, f64::INFINITY));
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(p.var(b).map(VarDef::name), Some("b"));
        assert_eq!(p.var_count(), 2);
    }

    #[test]
    fn test_expr_eval_with_constant() {
        let mut p = MilpProblem::new();
        let a = p.add_var(VarDef::binary("a"));
        let b = p.add_var(VarDef::integer("b", 0.0, 5.0));
        let e = LinearExpr::constant(-1.0).with_term(a, 2.0).with_term(b, 3.0);
        assert_eq!(e.eval(&[1.0, 2.0]), 7.0);
        assert_eq!(e.eval(&[]), -1.0);
    }

    #[test]
    fn test_constraint_violation_by_sense() {
        let mut p = MilpProblem::new();
        let a = p.add_var(VarDef::continuous("a", 0.0, 10.0));
        let e = LinearExpr::new().with_term(a, 1.0);
        let le = Constraint::new("le", e.clone(), Sense::Le, 3.0);
        let ge = Constraint::new("ge", e.clone(), Sense::Ge, 3.0);
        let eq = Constraint::new("eq", e, Sense::Eq, 3.0);
        assert_eq!(le.violation(&[5.0]), 2.0);
        assert_eq!(le.violation(&[1.0]), 0.0);
        assert_eq!(ge.violation(&[1.0]), 2.0);
        assert_eq!(eq.violation(&[1.0]), 2.0);
        assert_eq!(eq.violation(&[3.0]), 0.0);
    }

    #[test]
    fn test_violated_constraints_reports_bounds_and_rows() {
        let mut p = MilpProblem::new();
        let a = p.add_var(VarDef::binary("a"));
        let b = p.add_var(VarDef::binary("b"));
        p.add_constraint(Constraint::new(
            "pick_one",
            LinearExpr::from_iter([(a, 1.0), (b, 1.0)]),
            Sense::Eq,
            1.0,
        ));
        assert!(p.violated_constraints(&[1.0, 0.0], 1e-9).is_empty());
        assert_eq!(p.violated_constraints(&[1.0, 1.0], 1e-9), vec!["pick_one"]);
        assert_eq!(
            p.violated_constraints(&[0.5, 0.5], 1e-9),
            vec!["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn test_iter_constraints_named() {
        let mut p = MilpProblem::new();
        for name in ["cap_1", "flow_1", "cap_2"] {
            p.add_constraint(Constraint::new(name, LinearExpr::new(), Sense::Le, 0.0));
        }
        assert_eq!(p.iter_constraints_named("cap_").count(), 2);
    }
}
