use crate::constraint::LinearConstraint;
use crate::lexicon::VariableLexicon;
use crate::solver::Solver;

/// Decodes a solved backend state into a caller-defined structured result.
///
/// `I` is the inference input the problem was built from, `O` the structured
/// output type. Implementations read variable values through the solver and
/// resolve semantic keys through the lexicon.
pub trait OutputDecoder<I, O> {
    fn decode(&self, solver: &dyn Solver, lexicon: &VariableLexicon, input: &I) -> O;
}

/// A family of constraints over an inference problem, possibly far too large
/// to enumerate upfront.
///
/// Eager generators (`is_delayed() == false`) have their whole family
/// materialized by the caller via [`constraints`](Self::constraints).
/// Delayed generators are registered with the cutting-plane orchestrator,
/// which materializes only the members reported violated by
/// [`violated_constraints`](Self::violated_constraints) each round.
pub trait ConstraintGenerator<I, O> {
    fn name(&self) -> &str;

    /// Whether this family should be discovered lazily through cutting
    /// planes instead of being added upfront.
    fn is_delayed(&self) -> bool {
        false
    }

    /// Every member of the constraint family for `input`.
    fn constraints(&self, input: &I, lexicon: &VariableLexicon) -> Vec<LinearConstraint>;

    /// The members violated by `output`, the current decoded candidate.
    fn violated_constraints(
        &self,
        input: &I,
        output: &O,
        lexicon: &VariableLexicon,
    ) -> Vec<LinearConstraint>;

    /// The input this generator inspects. Defaults to the orchestrator's
    /// global input; generators scoped to a sub-problem return their own.
    fn constraint_input<'a>(&'a self, global: &'a I) -> &'a I {
        global
    }
}
