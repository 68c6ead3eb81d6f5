use std::fmt;

/// Tolerance used when checking equality constraints against a boolean
/// assignment.
pub const EPSILON: f64 = 1e-8;

/// Comparison sense of a linear constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sense {
    Equal,
    LessThan,
    GreaterThan,
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sense::Equal => write!(f, "="),
            Sense::LessThan => write!(f, "<="),
            Sense::GreaterThan => write!(f, ">="),
        }
    }
}

/// An immutable linear constraint over inference variables:
/// `sum(coeffs[i] * x[vars[i]]) sense rhs`.
///
/// The maximum referenced variable id is cached at construction so that
/// incremental checkers can tell when every referenced variable has been
/// assigned without rescanning the id list.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    pub vars: Vec<usize>,
    pub coeffs: Vec<f64>,
    pub rhs: f64,
    pub sense: Sense,
    max_var: usize,
}

impl LinearConstraint {
    /// Panics if `vars` and `coeffs` differ in length; ids must be unique
    /// within one constraint.
    pub fn new(vars: Vec<usize>, coeffs: Vec<f64>, rhs: f64, sense: Sense) -> Self {
        assert_eq!(
            vars.len(),
            coeffs.len(),
            "constraint has {} variable ids but {} coefficients",
            vars.len(),
            coeffs.len()
        );
        debug_assert!(
            vars.iter()
                .enumerate()
                .all(|(i, v)| !vars[..i].contains(v)),
            "constraint references a variable id twice"
        );
        let max_var = vars.iter().copied().max().unwrap_or(0);
        Self {
            vars,
            coeffs,
            rhs,
            sense,
            max_var,
        }
    }

    pub fn equal(vars: Vec<usize>, coeffs: Vec<f64>, rhs: f64) -> Self {
        Self::new(vars, coeffs, rhs, Sense::Equal)
    }

    pub fn less_than(vars: Vec<usize>, coeffs: Vec<f64>, rhs: f64) -> Self {
        Self::new(vars, coeffs, rhs, Sense::LessThan)
    }

    pub fn greater_than(vars: Vec<usize>, coeffs: Vec<f64>, rhs: f64) -> Self {
        Self::new(vars, coeffs, rhs, Sense::GreaterThan)
    }

    /// Largest variable id referenced by this constraint.
    pub fn max_var(&self) -> usize {
        self.max_var
    }

    /// Left-hand side value under a boolean assignment: the sum of the
    /// coefficients of the referenced variables that are true.
    pub fn lhs(&self, assignment: &[bool]) -> f64 {
        self.vars
            .iter()
            .zip(&self.coeffs)
            .filter(|(&v, _)| assignment[v])
            .map(|(_, &c)| c)
            .sum()
    }

    pub fn is_satisfied_by(&self, assignment: &[bool]) -> bool {
        let lhs = self.lhs(assignment);
        match self.sense {
            Sense::Equal => (lhs - self.rhs).abs() <= EPSILON,
            Sense::LessThan => lhs <= self.rhs,
            Sense::GreaterThan => lhs >= self.rhs,
        }
    }
}

impl fmt::Display for LinearConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (v, c)) in self.vars.iter().zip(&self.coeffs).enumerate() {
            if i > 0 {
                write!(f, " + ")?;
            }
            write!(f, "{} x{}", c, v)?;
        }
        write!(f, " {} {}", self.sense, self.rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn satisfaction_per_sense() {
        let le = LinearConstraint::less_than(vec![0, 1], vec![1.0, 1.0], 1.0);
        assert!(le.is_satisfied_by(&[true, false]));
        assert!(!le.is_satisfied_by(&[true, true]));

        let ge = LinearConstraint::greater_than(vec![0, 1], vec![1.0, 1.0], 1.0);
        assert!(!ge.is_satisfied_by(&[false, false]));
        assert!(ge.is_satisfied_by(&[false, true]));

        let eq = LinearConstraint::equal(vec![0, 1], vec![1.0, 1.0], 1.0);
        assert!(eq.is_satisfied_by(&[true, false]));
        assert!(!eq.is_satisfied_by(&[true, true]));
        assert!(!eq.is_satisfied_by(&[false, false]));
    }

    #[test]
    fn max_var_is_cached() {
        let c = LinearConstraint::equal(vec![3, 7, 1], vec![1.0, 2.0, 3.0], 0.0);
        assert_eq!(c.max_var(), 7);
        assert_eq!(LinearConstraint::equal(vec![], vec![], 0.0).max_var(), 0);
    }

    #[test]
    fn algebraic_display() {
        let c = LinearConstraint::less_than(vec![0, 2], vec![3.0, 5.0], 1.0);
        assert_eq!(c.to_string(), "3 x0 + 5 x2 <= 1");
    }

    #[test]
    #[should_panic]
    fn mismatched_lengths_panic() {
        let _ = LinearConstraint::equal(vec![0, 1], vec![1.0], 0.0);
    }
}
