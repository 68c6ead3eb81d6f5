use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::constraint::LinearConstraint;
use crate::solver::{SolveStatus, Solver};

/// Beam-search approximation of the solver contract, the one backend with no
/// external dependency.
///
/// Variables form an ordered sequence of decision groups: one group per
/// standalone boolean, one per discrete variable, in creation order. The
/// search assigns groups strictly in that order, so the caller's declaration
/// order is a load-bearing precondition: declaring the same problem in a
/// different order can change the result. The algorithm never reorders
/// groups.
///
/// Only boolean and discrete variables are supported; creating an integer or
/// real variable is a contract violation and panics.
#[derive(Debug)]
pub struct BeamSearch {
    beam_width: Option<usize>,
    time_budget: Option<Duration>,
    groups: Vec<Vec<usize>>,
    var_coeffs: Vec<f64>,
    constraints: Vec<LinearConstraint>,
    maximize: bool,
    solved: bool,
    used_fallback: bool,
    assignment: Vec<bool>,
    objective: f64,
}

/// One search state: a full assignment vector of which the first
/// `vars_assigned` entries are fixed, plus per-constraint satisfied markers.
///
/// A marker is set at most once and never cleared. That is sound only
/// because assignments are never retracted and groups are expanded in a
/// fixed order: once every variable a constraint references is fixed and the
/// constraint held, no later assignment can break it.
#[derive(Debug, Clone)]
struct PartialAssignment {
    assignment: Vec<bool>,
    satisfied: Vec<bool>,
    score: f64,
    vars_assigned: usize,
    groups_assigned: usize,
}

impl BeamSearch {
    /// `beam_width` bounds the frontier kept between expansion rounds;
    /// `None` keeps every state (full search).
    pub fn new(beam_width: Option<usize>) -> Self {
        Self {
            beam_width,
            time_budget: None,
            groups: Vec::new(),
            var_coeffs: Vec::new(),
            constraints: Vec::new(),
            maximize: true,
            solved: false,
            used_fallback: false,
            assignment: Vec::new(),
            objective: 0.0,
        }
    }

    /// Like [`new`](Self::new), with a wall-clock budget checked once per
    /// expansion round. Exceeding it yields [`SolveStatus::TimedOut`].
    pub fn with_time_budget(beam_width: Option<usize>, budget: Duration) -> Self {
        let mut solver = Self::new(beam_width);
        solver.time_budget = Some(budget);
        solver
    }

    pub fn beam_width(&self) -> Option<usize> {
        self.beam_width
    }

    pub fn num_variables(&self) -> usize {
        self.var_coeffs.len()
    }

    /// Whether the last solve fell back to the unconstrained greedy
    /// completion. A fallback solution carries no feasibility guarantee.
    pub fn used_fallback(&self) -> bool {
        self.used_fallback
    }

    fn expand_into(&self, state: &PartialAssignment, out: &mut Vec<PartialAssignment>) {
        let Some(group) = self.groups.get(state.groups_assigned) else {
            return;
        };

        if group.len() == 1 {
            // a standalone boolean has two values: true scores its
            // coefficient, false scores nothing
            let id = group[0];

            let mut child = self.child_of(state, group.len());
            child.assignment[id] = true;
            child.score += self.var_coeffs[id];
            if self.check_constraints(&mut child) {
                out.push(child);
            }

            let mut child = self.child_of(state, group.len());
            if self.check_constraints(&mut child) {
                out.push(child);
            }
        } else {
            for &id in group {
                let mut child = self.child_of(state, group.len());
                child.assignment[id] = true;
                child.score += self.var_coeffs[id];
                if self.check_constraints(&mut child) {
                    out.push(child);
                }
            }
        }
    }

    fn child_of(&self, state: &PartialAssignment, group_len: usize) -> PartialAssignment {
        let mut child = state.clone();
        child.vars_assigned = state.vars_assigned + group_len;
        child.groups_assigned = state.groups_assigned + 1;
        child
    }

    /// Evaluates each constraint at most once per search path: a constraint
    /// is checked only when the child has fixed every variable it references
    /// and it has not been marked satisfied on this path. Returns false when
    /// the child violates some constraint and must be discarded.
    fn check_constraints(&self, child: &mut PartialAssignment) -> bool {
        for (idx, constraint) in self.constraints.iter().enumerate() {
            if child.satisfied[idx] {
                continue;
            }
            if constraint.max_var() >= child.vars_assigned {
                continue;
            }
            if !constraint.is_satisfied_by(&child.assignment) {
                return false;
            }
            child.satisfied[idx] = true;
        }
        true
    }

    fn sort_frontier(&self, frontier: &mut [PartialAssignment]) {
        // stable sort: equal scores keep child creation order, which breaks
        // ties toward the lowest value index
        if self.maximize {
            frontier.sort_by(|a, b| b.score.total_cmp(&a.score));
        } else {
            frontier.sort_by(|a, b| a.score.total_cmp(&b.score));
        }
    }

    /// Completes every group independently by its best objective
    /// coefficient, ignoring all constraints. Always produces a full
    /// assignment; never guarantees feasibility.
    fn run_unconstrained_greedy(&mut self) {
        self.used_fallback = true;
        self.assignment = vec![false; self.var_coeffs.len()];
        self.objective = 0.0;

        for group in &self.groups {
            if group.len() == 1 {
                let id = group[0];
                let coeff = self.var_coeffs[id];
                if coeff >= 0.0 {
                    self.assignment[id] = true;
                    self.objective += coeff;
                }
            } else {
                let mut best = group[0];
                for &id in &group[1..] {
                    if self.var_coeffs[id] > self.var_coeffs[best] {
                        best = id;
                    }
                }
                self.assignment[best] = true;
                self.objective += self.var_coeffs[best];
            }
        }
    }
}

impl Default for BeamSearch {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Solver for BeamSearch {
    fn set_maximize(&mut self, maximize: bool) {
        self.maximize = maximize;
    }

    fn add_boolean_variable(&mut self, coeff: f64) -> usize {
        let id = self.var_coeffs.len();
        self.var_coeffs.push(coeff);
        self.groups.push(vec![id]);
        self.solved = false;
        id
    }

    fn add_integer_variable(&mut self, _coeff: f64) -> usize {
        panic!("BeamSearch supports only boolean and discrete variables");
    }

    fn add_real_variable(&mut self, _coeff: f64) -> usize {
        panic!("BeamSearch supports only boolean and discrete variables");
    }

    fn add_discrete_variable(&mut self, coeffs: &[f64]) -> Vec<usize> {
        assert!(!coeffs.is_empty(), "discrete variable with no values");
        let first = self.var_coeffs.len();
        let ids: Vec<usize> = (first..first + coeffs.len()).collect();
        self.var_coeffs.extend_from_slice(coeffs);
        // the exactly-one property holds by construction of group expansion;
        // no explicit constraint is added
        self.groups.push(ids.clone());
        self.solved = false;
        ids
    }

    fn add_equality_constraint(&mut self, vars: &[usize], coeffs: &[f64], rhs: f64) {
        self.constraints
            .push(LinearConstraint::equal(vars.to_vec(), coeffs.to_vec(), rhs));
        self.solved = false;
    }

    fn add_greater_than_constraint(&mut self, vars: &[usize], coeffs: &[f64], rhs: f64) {
        self.constraints.push(LinearConstraint::greater_than(
            vars.to_vec(),
            coeffs.to_vec(),
            rhs,
        ));
        self.solved = false;
    }

    fn add_less_than_constraint(&mut self, vars: &[usize], coeffs: &[f64], rhs: f64) {
        self.constraints.push(LinearConstraint::less_than(
            vars.to_vec(),
            coeffs.to_vec(),
            rhs,
        ));
        self.solved = false;
    }

    fn solve(&mut self) -> SolveStatus {
        self.solved = false;
        self.used_fallback = false;

        if self.groups.is_empty() {
            return SolveStatus::NoVariables;
        }

        let start = Instant::now();
        let deadline = self.time_budget.map(|budget| start + budget);

        let root = PartialAssignment {
            assignment: vec![false; self.var_coeffs.len()],
            satisfied: vec![false; self.constraints.len()],
            score: 0.0,
            vars_assigned: 0,
            groups_assigned: 0,
        };
        let mut frontier = Vec::new();
        self.expand_into(&root, &mut frontier);

        loop {
            if frontier.is_empty() {
                debug!(
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "beam exhausted with no feasible completion"
                );
                self.objective = if self.maximize {
                    f64::NEG_INFINITY
                } else {
                    f64::INFINITY
                };
                return SolveStatus::Infeasible;
            }
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    debug!("beam search exceeded its time budget");
                    return SolveStatus::TimedOut;
                }
            }

            let mut next = Vec::new();
            for state in &frontier {
                self.expand_into(state, &mut next);
            }
            if next.is_empty() {
                break;
            }

            self.sort_frontier(&mut next);
            if let Some(width) = self.beam_width {
                next.truncate(width);
            }
            frontier = next;
        }

        self.sort_frontier(&mut frontier);
        let Some(top) = frontier.into_iter().next() else {
            return SolveStatus::Infeasible;
        };

        if top.groups_assigned < self.groups.len() {
            warn!(
                groups_assigned = top.groups_assigned,
                groups_total = self.groups.len(),
                "beam search halted before covering every group; \
                 completing greedily without constraints"
            );
            self.run_unconstrained_greedy();
        } else {
            self.assignment = top.assignment;
            self.objective = top.score;
        }

        debug!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            objective = self.objective,
            fallback = self.used_fallback,
            "beam search finished"
        );
        self.solved = true;
        SolveStatus::Solved
    }

    fn is_solved(&self) -> bool {
        self.solved
    }

    fn boolean_value(&self, id: usize) -> bool {
        if !self.solved {
            return false;
        }
        self.assignment[id]
    }

    fn integer_value(&self, _id: usize) -> i64 {
        panic!("BeamSearch supports only boolean and discrete variables");
    }

    fn real_value(&self, _id: usize) -> f64 {
        panic!("BeamSearch supports only boolean and discrete variables");
    }

    fn objective_value(&self) -> f64 {
        self.objective
    }

    fn objective_coeff(&self, id: usize) -> f64 {
        self.var_coeffs[id]
    }

    fn reset(&mut self) {
        self.groups.clear();
        self.var_coeffs.clear();
        self.constraints.clear();
        self.maximize = true;
        self.solved = false;
        self.used_fallback = false;
        self.assignment.clear();
        self.objective = 0.0;
    }

    fn dump(&self) -> String {
        use std::fmt::Write;

        let mut out = String::new();
        let direction = if self.maximize { "maximize" } else { "minimize" };
        let terms: Vec<String> = self
            .var_coeffs
            .iter()
            .enumerate()
            .map(|(id, coeff)| format!("{} x{}", coeff, id))
            .collect();
        let _ = writeln!(out, "{} {}", direction, terms.join(" + "));

        let one_of: Vec<&Vec<usize>> = self.groups.iter().filter(|g| g.len() > 1).collect();
        if !self.constraints.is_empty() || !one_of.is_empty() {
            let _ = writeln!(out, "subject to");
            for group in one_of {
                let names: Vec<String> = group.iter().map(|id| format!("x{}", id)).collect();
                let _ = writeln!(out, "  one-of {{{}}}", names.join(", "));
            }
            for constraint in &self.constraints {
                let _ = writeln!(out, "  {}", constraint);
            }
        }
        out
    }
}
