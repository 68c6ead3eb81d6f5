use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::constraint::LinearConstraint;
use crate::problem::{ConstraintDecl, ProblemSpec, VarDecl};
use crate::solver::Solver;

/// Parameters for seeded random instance generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenConfig {
    pub groups: usize,
    pub max_group_size: usize,
    pub constraints: usize,
    pub seed: u64,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            groups: 8,
            max_group_size: 4,
            constraints: 6,
            seed: 1,
        }
    }
}

/// A generated instance: per-group value coefficients (length 1 means a
/// standalone boolean) and pairwise at-most-one constraints over the dense
/// ids the groups receive when installed in declaration order.
///
/// Instances are deterministic in the seed. Feasibility is not guaranteed:
/// conflicting at-most-one constraints between small discrete groups can
/// rule out every completion.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedProblem {
    pub groups: Vec<Vec<f64>>,
    pub constraints: Vec<LinearConstraint>,
}

pub fn generate_problem(cfg: &GenConfig) -> GeneratedProblem {
    let mut rng = ChaCha8Rng::seed_from_u64(cfg.seed);

    let mut groups = Vec::with_capacity(cfg.groups);
    let mut first_ids = Vec::with_capacity(cfg.groups);
    let mut next_id = 0usize;
    for _ in 0..cfg.groups {
        let size = rng.random_range(1..=cfg.max_group_size.max(1));
        let coeffs: Vec<f64> = (0..size).map(|_| rng.random_range(-1.0..1.0)).collect();
        first_ids.push(next_id);
        next_id += size;
        groups.push(coeffs);
    }

    let mut constraints = Vec::with_capacity(cfg.constraints);
    if cfg.groups >= 2 {
        for _ in 0..cfg.constraints {
            let a = rng.random_range(0..groups.len());
            let mut b = rng.random_range(0..groups.len());
            while b == a {
                b = rng.random_range(0..groups.len());
            }
            let va = first_ids[a] + rng.random_range(0..groups[a].len());
            let vb = first_ids[b] + rng.random_range(0..groups[b].len());
            let (lo, hi) = if va < vb { (va, vb) } else { (vb, va) };
            constraints.push(LinearConstraint::less_than(
                vec![lo, hi],
                vec![1.0, 1.0],
                1.0,
            ));
        }
    }

    GeneratedProblem {
        groups,
        constraints,
    }
}

impl GeneratedProblem {
    /// Creates the instance's variables and constraints on `solver` and
    /// returns the per-group ids. Must run against a freshly reset backend
    /// so the dense ids the constraints were generated for line up.
    pub fn install(&self, solver: &mut dyn Solver) -> Vec<Vec<usize>> {
        let mut ids = Vec::with_capacity(self.groups.len());
        for coeffs in &self.groups {
            if coeffs.len() == 1 {
                ids.push(vec![solver.add_boolean_variable(coeffs[0])]);
            } else {
                ids.push(solver.add_discrete_variable(coeffs));
            }
        }
        for constraint in &self.constraints {
            solver.add_linear_constraint(constraint);
        }
        ids
    }

    /// Renders the instance in the text problem format, naming groups
    /// `g0`, `g1`, ...
    pub fn to_spec(&self) -> ProblemSpec {
        let mut keys = Vec::new();
        let mut decls = Vec::with_capacity(self.groups.len());
        for (g, coeffs) in self.groups.iter().enumerate() {
            let name = format!("g{}", g);
            if coeffs.len() == 1 {
                keys.push(name.clone());
                decls.push(VarDecl::Bool {
                    name,
                    coeff: coeffs[0],
                });
            } else {
                for i in 0..coeffs.len() {
                    keys.push(format!("{}@{}", name, i));
                }
                decls.push(VarDecl::Group {
                    name,
                    coeffs: coeffs.clone(),
                });
            }
        }

        let constraints = self
            .constraints
            .iter()
            .map(|c| ConstraintDecl {
                sense: c.sense,
                rhs: c.rhs,
                terms: c
                    .vars
                    .iter()
                    .zip(&c.coeffs)
                    .map(|(&v, &coeff)| (keys[v].clone(), coeff))
                    .collect(),
            })
            .collect();

        ProblemSpec { decls, constraints }
    }
}
