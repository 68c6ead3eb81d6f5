pub mod beam;

use crate::constraint::{LinearConstraint, Sense};
use crate::lexicon::VariableLexicon;

/// Outcome of one solve call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// A feasible optimum (or the best assignment found within the backend's
    /// limits) is available for value reads.
    Solved,
    /// No assignment satisfies all constraints. For approximate backends this
    /// means no feasible completion was found within the explored region.
    Infeasible,
    /// The backend exhausted its time budget without proving feasibility or
    /// infeasibility.
    TimedOut,
    /// The problem declared no variables; solving was refused.
    NoVariables,
}

impl SolveStatus {
    pub fn is_solved(self) -> bool {
        matches!(self, SolveStatus::Solved)
    }
}

/// The contract every inference backend implements, exact or approximate.
///
/// Variable ids are dense and assigned in creation order. Value reads are
/// defined only after a solve that returned [`SolveStatus::Solved`]; before
/// any solve they return the zero-valued default (`false`, `0`, `0.0`),
/// never an error. Reading an id that was never created is a contract
/// violation and may panic. Backends that do not support a variable kind
/// panic on its creation call for the same reason.
pub trait Solver {
    /// Sets the objective direction; `true` maximizes.
    fn set_maximize(&mut self, maximize: bool);

    /// Adds a boolean variable with the given objective coefficient and
    /// returns its id.
    fn add_boolean_variable(&mut self, coeff: f64) -> usize;

    fn add_integer_variable(&mut self, coeff: f64) -> usize;

    fn add_real_variable(&mut self, coeff: f64) -> usize;

    /// Adds one multi-valued decision encoded as `coeffs.len()` boolean
    /// variables of which exactly one is true in any solved assignment. The
    /// exclusivity is structural: backends enforce it at creation, not
    /// through a user-visible constraint.
    fn add_discrete_variable(&mut self, coeffs: &[f64]) -> Vec<usize>;

    fn add_equality_constraint(&mut self, vars: &[usize], coeffs: &[f64], rhs: f64);

    fn add_greater_than_constraint(&mut self, vars: &[usize], coeffs: &[f64], rhs: f64);

    fn add_less_than_constraint(&mut self, vars: &[usize], coeffs: &[f64], rhs: f64);

    /// Single dispatch point mapping a constraint's sense onto the three
    /// typed constraint calls.
    fn add_linear_constraint(&mut self, c: &LinearConstraint) {
        match c.sense {
            Sense::Equal => self.add_equality_constraint(&c.vars, &c.coeffs, c.rhs),
            Sense::GreaterThan => self.add_greater_than_constraint(&c.vars, &c.coeffs, c.rhs),
            Sense::LessThan => self.add_less_than_constraint(&c.vars, &c.coeffs, c.rhs),
        }
    }

    fn solve(&mut self) -> SolveStatus;

    fn is_solved(&self) -> bool;

    fn boolean_value(&self, id: usize) -> bool;

    fn integer_value(&self, id: usize) -> i64;

    fn real_value(&self, id: usize) -> f64;

    /// Objective value at the solution. When the backend detected
    /// infeasibility this is signed infinity against the optimization
    /// direction (negative when maximizing).
    fn objective_value(&self) -> f64;

    /// The objective coefficient the variable was created with.
    fn objective_coeff(&self, id: usize) -> f64;

    /// Returns the backend to its newly-constructed, empty state. Idempotent.
    fn reset(&mut self);

    /// Human-readable algebraic rendering of the problem, for diagnostics.
    /// Free-form text; no tool may depend on its grammar.
    fn dump(&self) -> String;

    /// Called by the builder once variable declaration is complete. Backends
    /// that decode structured output mid-solve keep a copy; the default
    /// ignores it.
    fn install_lexicon(&mut self, _lexicon: &VariableLexicon) {}
}
