use tracing::{debug, warn};

use crate::constraint::LinearConstraint;
use crate::infer::generators::{ConstraintGenerator, OutputDecoder};
use crate::lexicon::VariableLexicon;
use crate::solver::{SolveStatus, Solver};

/// Iteration bound of the refinement loop.
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Wraps a base backend and lazily materializes constraint families too large
/// to enumerate upfront.
///
/// Variable and constraint creation pass straight through to the base
/// backend. `solve` runs the cutting-plane loop: solve, decode the current
/// assignment, ask every registered generator for the members of its family
/// violated by that assignment, materialize them, and re-solve until no
/// generator reports a violation or the iteration bound is hit. The
/// materialized set only ever grows within one run.
///
/// Exhausting the iteration bound still returns `Solved` with the last
/// solution, which may violate constraints the loop never got to satisfy;
/// the condition is logged and observable through [`converged`](Self::converged).
/// Infeasible and timed-out base results are propagated unchanged.
pub struct CuttingPlaneSolver<I, O, S> {
    base: S,
    input: I,
    decoder: Box<dyn OutputDecoder<I, O>>,
    generators: Vec<Box<dyn ConstraintGenerator<I, O>>>,
    lexicon: VariableLexicon,
    max_iterations: usize,
    variables_created: usize,
    iterations: usize,
    constraints_added: usize,
    converged: bool,
    solved: bool,
}

impl<I, O, S: Solver> CuttingPlaneSolver<I, O, S> {
    pub fn new(base: S, input: I, decoder: Box<dyn OutputDecoder<I, O>>) -> Self {
        Self {
            base,
            input,
            decoder,
            generators: Vec::new(),
            lexicon: VariableLexicon::new(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            variables_created: 0,
            iterations: 0,
            constraints_added: 0,
            converged: false,
            solved: false,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Registers a delayed constraint family for lazy materialization.
    pub fn add_generator(&mut self, generator: Box<dyn ConstraintGenerator<I, O>>) {
        self.generators.push(generator);
    }

    /// Whether the last solve ended because every generator reported no
    /// violations, as opposed to exhausting the iteration bound.
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Refinement iterations of the last solve (0 when the first round
    /// already converged).
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Total constraints materialized into the base backend. Non-decreasing
    /// within one run.
    pub fn constraints_added(&self) -> usize {
        self.constraints_added
    }

    pub fn base(&self) -> &S {
        &self.base
    }

    fn collect_violated(&self, output: &O) -> Vec<LinearConstraint> {
        let mut violated = Vec::new();
        for generator in &self.generators {
            let input = generator.constraint_input(&self.input);
            let mut reported = generator.violated_constraints(input, output, &self.lexicon);
            if !reported.is_empty() {
                debug!(
                    generator = generator.name(),
                    violations = reported.len(),
                    "generator reported violated constraints"
                );
            }
            violated.append(&mut reported);
        }
        violated
    }
}

impl<I, O, S: Solver> Solver for CuttingPlaneSolver<I, O, S> {
    fn set_maximize(&mut self, maximize: bool) {
        self.base.set_maximize(maximize);
    }

    fn add_boolean_variable(&mut self, coeff: f64) -> usize {
        self.solved = false;
        self.variables_created += 1;
        self.base.add_boolean_variable(coeff)
    }

    fn add_integer_variable(&mut self, coeff: f64) -> usize {
        self.solved = false;
        self.variables_created += 1;
        self.base.add_integer_variable(coeff)
    }

    fn add_real_variable(&mut self, coeff: f64) -> usize {
        self.solved = false;
        self.variables_created += 1;
        self.base.add_real_variable(coeff)
    }

    fn add_discrete_variable(&mut self, coeffs: &[f64]) -> Vec<usize> {
        self.solved = false;
        self.variables_created += coeffs.len();
        self.base.add_discrete_variable(coeffs)
    }

    fn add_equality_constraint(&mut self, vars: &[usize], coeffs: &[f64], rhs: f64) {
        self.solved = false;
        self.base.add_equality_constraint(vars, coeffs, rhs);
    }

    fn add_greater_than_constraint(&mut self, vars: &[usize], coeffs: &[f64], rhs: f64) {
        self.solved = false;
        self.base.add_greater_than_constraint(vars, coeffs, rhs);
    }

    fn add_less_than_constraint(&mut self, vars: &[usize], coeffs: &[f64], rhs: f64) {
        self.solved = false;
        self.base.add_less_than_constraint(vars, coeffs, rhs);
    }

    fn solve(&mut self) -> SolveStatus {
        self.solved = false;
        self.converged = false;
        self.iterations = 0;

        if self.variables_created == 0 {
            return SolveStatus::NoVariables;
        }

        let status = self.base.solve();
        if !status.is_solved() {
            return status;
        }

        loop {
            let output = self
                .decoder
                .decode(&self.base, &self.lexicon, &self.input);
            let violated = self.collect_violated(&output);

            if violated.is_empty() {
                self.converged = true;
                self.solved = true;
                return SolveStatus::Solved;
            }
            if self.iterations >= self.max_iterations {
                warn!(
                    iterations = self.iterations,
                    outstanding = violated.len(),
                    "cutting-plane iteration budget exhausted; returning the last solution"
                );
                self.solved = true;
                return SolveStatus::Solved;
            }

            for constraint in &violated {
                self.base.add_linear_constraint(constraint);
            }
            self.constraints_added += violated.len();
            self.iterations += 1;
            debug!(
                iteration = self.iterations,
                materialized = self.constraints_added,
                "re-solving with materialized cutting planes"
            );

            let status = self.base.solve();
            if !status.is_solved() {
                return status;
            }
        }
    }

    fn is_solved(&self) -> bool {
        self.solved
    }

    fn boolean_value(&self, id: usize) -> bool {
        self.base.boolean_value(id)
    }

    fn integer_value(&self, id: usize) -> i64 {
        self.base.integer_value(id)
    }

    fn real_value(&self, id: usize) -> f64 {
        self.base.real_value(id)
    }

    fn objective_value(&self) -> f64 {
        self.base.objective_value()
    }

    fn objective_coeff(&self, id: usize) -> f64 {
        self.base.objective_coeff(id)
    }

    /// Clears all problem state from the base backend and this wrapper. The
    /// configured input, decoder, and generator registrations survive: they
    /// are construction-time configuration, and the build lifecycle resets
    /// the backend before declaring anything.
    fn reset(&mut self) {
        self.base.reset();
        self.lexicon = VariableLexicon::new();
        self.variables_created = 0;
        self.iterations = 0;
        self.constraints_added = 0;
        self.converged = false;
        self.solved = false;
    }

    fn dump(&self) -> String {
        self.base.dump()
    }

    fn install_lexicon(&mut self, lexicon: &VariableLexicon) {
        self.lexicon = lexicon.clone();
        self.base.install_lexicon(lexicon);
    }
}
