//! Line-based text format for inference problems, and the builder steps that
//! turn a parsed file into a solvable instance.
//!
//! ```text
//! # objective coefficients per value
//! bool  keep 1.5
//! group label 1 4 2
//! # constraints: sense, right-hand side, then name:coeff terms
//! le 1 keep:1 label@1:1
//! ```
//!
//! Group members are addressed as `name@index`. Those strings are also the
//! lexicon keys the variables are registered under.

use std::fmt::Write as _;

use anyhow::{Context, Result, bail};

use crate::constraint::{LinearConstraint, Sense};
use crate::error::InferenceError;
use crate::infer::InferenceProblem;
use crate::lexicon::VariableLexicon;
use crate::solver::Solver;

#[derive(Debug, Clone, PartialEq)]
pub enum VarDecl {
    Bool { name: String, coeff: f64 },
    Group { name: String, coeffs: Vec<f64> },
}

impl VarDecl {
    pub fn name(&self) -> &str {
        match self {
            VarDecl::Bool { name, .. } => name,
            VarDecl::Group { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintDecl {
    pub sense: Sense,
    pub rhs: f64,
    /// (lexicon key, coefficient) pairs.
    pub terms: Vec<(String, f64)>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProblemSpec {
    pub decls: Vec<VarDecl>,
    pub constraints: Vec<ConstraintDecl>,
}

pub fn parse_problem_str(src: &str) -> Result<ProblemSpec> {
    let mut spec = ProblemSpec::default();

    for (lineno, raw) in src.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = line.split_whitespace();
        let keyword = fields.next().unwrap_or_default();
        let rest: Vec<&str> = fields.collect();

        let parsed = match keyword {
            "bool" => parse_bool(&rest, &mut spec),
            "group" => parse_group(&rest, &mut spec),
            "eq" => parse_constraint(&rest, Sense::Equal, &mut spec),
            "le" => parse_constraint(&rest, Sense::LessThan, &mut spec),
            "ge" => parse_constraint(&rest, Sense::GreaterThan, &mut spec),
            other => Err(anyhow::anyhow!("unknown keyword '{}'", other)),
        };
        parsed.with_context(|| format!("line {}: {}", lineno + 1, raw))?;
    }

    validate(&spec)?;
    Ok(spec)
}

fn parse_bool(fields: &[&str], spec: &mut ProblemSpec) -> Result<()> {
    let [name, coeff] = fields else {
        bail!("expected: bool <name> <coeff>");
    };
    spec.decls.push(VarDecl::Bool {
        name: (*name).to_string(),
        coeff: coeff.parse()?,
    });
    Ok(())
}

fn parse_group(fields: &[&str], spec: &mut ProblemSpec) -> Result<()> {
    let Some((name, coeffs)) = fields.split_first() else {
        bail!("expected: group <name> <coeff>...");
    };
    if coeffs.is_empty() {
        bail!("group '{}' has no values", name);
    }
    let coeffs = coeffs
        .iter()
        .map(|c| c.parse::<f64>().map_err(Into::into))
        .collect::<Result<Vec<f64>>>()?;
    spec.decls.push(VarDecl::Group {
        name: (*name).to_string(),
        coeffs,
    });
    Ok(())
}

fn parse_constraint(fields: &[&str], sense: Sense, spec: &mut ProblemSpec) -> Result<()> {
    let Some((rhs, terms)) = fields.split_first() else {
        bail!("expected: <sense> <rhs> <name>:<coeff>...");
    };
    if terms.is_empty() {
        bail!("constraint has no terms");
    }
    let rhs: f64 = rhs.parse()?;
    let terms = terms
        .iter()
        .map(|term| {
            let Some((key, coeff)) = term.rsplit_once(':') else {
                bail!("expected <name>:<coeff>, got '{}'", term);
            };
            Ok((key.to_string(), coeff.parse::<f64>()?))
        })
        .collect::<Result<Vec<_>>>()?;
    spec.constraints.push(ConstraintDecl { sense, rhs, terms });
    Ok(())
}

/// Every constraint term must reference a declared variable: `name` for a
/// boolean, `name@index` with an in-range index for a group member.
fn validate(spec: &ProblemSpec) -> Result<()> {
    for constraint in &spec.constraints {
        for (key, _) in &constraint.terms {
            let (name, member) = match key.rsplit_once('@') {
                Some((name, idx)) => {
                    let idx: usize = idx
                        .parse()
                        .with_context(|| format!("bad member index in '{}'", key))?;
                    (name, Some(idx))
                }
                None => (key.as_str(), None),
            };
            let decl = spec
                .decls
                .iter()
                .find(|d| d.name() == name)
                .with_context(|| format!("constraint references undeclared variable '{}'", key))?;
            match (decl, member) {
                (VarDecl::Bool { .. }, None) => {}
                (VarDecl::Bool { .. }, Some(_)) => {
                    bail!("'{}' is a boolean, not a group", name)
                }
                (VarDecl::Group { .. }, None) => {
                    bail!("'{}' is a group; address a member as {}@<index>", name, name)
                }
                (VarDecl::Group { coeffs, .. }, Some(idx)) => {
                    if idx >= coeffs.len() {
                        bail!("'{}' has only {} values", key, coeffs.len());
                    }
                }
            }
        }
    }
    Ok(())
}

impl ProblemSpec {
    /// Renders the spec back into the text format. `parse_problem_str` of the
    /// result yields an equal spec.
    pub fn emit(&self) -> String {
        let mut out = String::new();
        for decl in &self.decls {
            match decl {
                VarDecl::Bool { name, coeff } => {
                    let _ = writeln!(out, "bool {} {}", name, coeff);
                }
                VarDecl::Group { name, coeffs } => {
                    let values: Vec<String> = coeffs.iter().map(f64::to_string).collect();
                    let _ = writeln!(out, "group {} {}", name, values.join(" "));
                }
            }
        }
        for c in &self.constraints {
            let keyword = match c.sense {
                Sense::Equal => "eq",
                Sense::LessThan => "le",
                Sense::GreaterThan => "ge",
            };
            let terms: Vec<String> = c
                .terms
                .iter()
                .map(|(key, coeff)| format!("{}:{}", key, coeff))
                .collect();
            let _ = writeln!(out, "{} {} {}", keyword, c.rhs, terms.join(" "));
        }
        out
    }
}

/// The value a solved assignment selected for one declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Bool(bool),
    /// Index of the group member set true.
    Value(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub selections: Vec<(String, Choice)>,
    pub objective: f64,
}

/// Builder steps for a parsed [`ProblemSpec`].
#[derive(Debug, Clone)]
pub struct TextProblem {
    spec: ProblemSpec,
}

impl TextProblem {
    pub fn new(spec: ProblemSpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &ProblemSpec {
        &self.spec
    }
}

impl InferenceProblem for TextProblem {
    type Output = Solution;

    fn declare_variables(
        &mut self,
        solver: &mut dyn Solver,
        lexicon: &mut VariableLexicon,
    ) -> Result<(), InferenceError> {
        for decl in &self.spec.decls {
            match decl {
                VarDecl::Bool { name, coeff } => {
                    let id = solver.add_boolean_variable(*coeff);
                    lexicon.add_variable(name.clone(), id)?;
                }
                VarDecl::Group { name, coeffs } => {
                    let ids = solver.add_discrete_variable(coeffs);
                    for (i, id) in ids.into_iter().enumerate() {
                        lexicon.add_variable(format!("{}@{}", name, i), id)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn declare_constraints(
        &mut self,
        solver: &mut dyn Solver,
        lexicon: &VariableLexicon,
    ) -> Result<(), InferenceError> {
        for constraint in &self.spec.constraints {
            // a key that never got a variable is "not instantiated": drop the
            // term rather than fail (validated files never hit this)
            let mut vars = Vec::with_capacity(constraint.terms.len());
            let mut coeffs = Vec::with_capacity(constraint.terms.len());
            for (key, coeff) in &constraint.terms {
                if let Some(id) = lexicon.get_variable(key) {
                    vars.push(id);
                    coeffs.push(*coeff);
                }
            }
            if vars.is_empty() {
                continue;
            }
            let c = LinearConstraint::new(vars, coeffs, constraint.rhs, constraint.sense);
            solver.add_linear_constraint(&c);
        }
        Ok(())
    }

    fn decode(&self, solver: &dyn Solver, lexicon: &VariableLexicon) -> Solution {
        let mut selections = Vec::with_capacity(self.spec.decls.len());
        for decl in &self.spec.decls {
            match decl {
                VarDecl::Bool { name, .. } => {
                    let value = lexicon
                        .get_variable(name)
                        .map(|id| solver.boolean_value(id))
                        .unwrap_or(false);
                    selections.push((name.clone(), Choice::Bool(value)));
                }
                VarDecl::Group { name, coeffs } => {
                    let chosen = (0..coeffs.len())
                        .position(|i| {
                            lexicon
                                .get_variable(&format!("{}@{}", name, i))
                                .map(|id| solver.boolean_value(id))
                                .unwrap_or(false)
                        })
                        .unwrap_or(0);
                    selections.push((name.clone(), Choice::Value(chosen)));
                }
            }
        }
        Solution {
            selections,
            objective: solver.objective_value(),
        }
    }
}
