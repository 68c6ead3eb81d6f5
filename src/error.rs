use thiserror::Error;

/// Failure kinds of one inference call.
///
/// `Infeasible` and `TimedOut` must stay distinguishable: the first is a
/// proof that no assignment satisfies the constraints, the second only says
/// the backend ran out of budget, so callers may retry with a larger one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InferenceError {
    #[error("no assignment satisfies all constraints")]
    Infeasible,

    #[error("solver exhausted its time budget without a verdict")]
    TimedOut,

    #[error("inference problem declared no variables")]
    NoVariables,

    #[error("variable identifier already registered: {0}")]
    DuplicateVariable(String),
}
