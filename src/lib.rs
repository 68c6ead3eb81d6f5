//! Constraint-based structured inference: pose a combinatorial decision
//! problem as boolean/discrete variables with a linear objective and linear
//! constraints, then find the best-scoring assignment.
//!
//! Backends implement the [`solver::Solver`] contract. The crate ships one
//! dependency-free backend, [`solver::beam::BeamSearch`]; exact ILP backends
//! are injected by callers behind the same trait. The [`infer`] module
//! layers the build lifecycle and the cutting-plane refinement loop on top
//! of the contract.

pub mod constraint;
pub mod error;
pub mod gen;
pub mod infer;
pub mod lexicon;
pub mod problem;
pub mod solver;
