pub mod cutting_plane;
pub mod generators;

use tracing::{debug, warn};

use crate::error::InferenceError;
use crate::lexicon::VariableLexicon;
use crate::solver::{SolveStatus, Solver};

/// One inference problem: the caller-supplied steps of the fixed build
/// lifecycle run by [`run_inference`].
///
/// `declare_variables` creates backend variables and registers each under a
/// semantic key in the lexicon; `declare_constraints` resolves those keys
/// back to ids. A key that resolves to `None` means the variable was never
/// instantiated (a structural precondition excluded it) and the constraint
/// should be skipped or adapted, not treated as an error.
pub trait InferenceProblem {
    type Output;

    /// Backend-specific setup before any declaration. Default: nothing.
    fn initialize(&mut self, _solver: &mut dyn Solver, _lexicon: &mut VariableLexicon) {}

    fn declare_variables(
        &mut self,
        solver: &mut dyn Solver,
        lexicon: &mut VariableLexicon,
    ) -> Result<(), InferenceError>;

    fn declare_constraints(
        &mut self,
        solver: &mut dyn Solver,
        lexicon: &VariableLexicon,
    ) -> Result<(), InferenceError>;

    fn decode(&self, solver: &dyn Solver, lexicon: &VariableLexicon) -> Self::Output;
}

/// Runs the fixed inference lifecycle against one backend:
/// reset, initialize, declare variables, declare constraints, fix the
/// objective direction to maximize, solve, decode.
///
/// A fresh lexicon is created per run and handed to the backend once
/// declaration is complete. Solve failures are classified into the
/// distinguishable [`InferenceError`] kinds.
pub fn run_inference<P>(
    problem: &mut P,
    solver: &mut dyn Solver,
) -> Result<P::Output, InferenceError>
where
    P: InferenceProblem + ?Sized,
{
    solver.reset();
    let mut lexicon = VariableLexicon::new();
    problem.initialize(solver, &mut lexicon);
    problem.declare_variables(solver, &mut lexicon)?;
    problem.declare_constraints(solver, &lexicon)?;
    solver.set_maximize(true);
    solver.install_lexicon(&lexicon);

    if tracing::enabled!(tracing::Level::DEBUG) {
        debug!(problem = %solver.dump(), "assembled inference problem");
    }
    if lexicon.is_empty() {
        warn!("no variables registered in the lexicon; likely a defect in the caller's builder");
    }

    match solver.solve() {
        SolveStatus::Solved => Ok(problem.decode(solver, &lexicon)),
        SolveStatus::Infeasible => Err(InferenceError::Infeasible),
        SolveStatus::TimedOut => Err(InferenceError::TimedOut),
        SolveStatus::NoVariables => Err(InferenceError::NoVariables),
    }
}

/// Two-phase strategy: attempt the lifecycle against a short-budget backend;
/// on timeout only, rebuild and re-solve against the full-effort backend.
/// Any other outcome, success or failure, is returned as-is.
pub fn run_inference_two_phase<P>(
    problem: &mut P,
    fast: &mut dyn Solver,
    full: &mut dyn Solver,
) -> Result<P::Output, InferenceError>
where
    P: InferenceProblem + ?Sized,
{
    match run_inference(problem, fast) {
        Err(InferenceError::TimedOut) => {
            warn!("fast solve timed out; retrying with the full-effort backend");
            run_inference(problem, full)
        }
        other => other,
    }
}
