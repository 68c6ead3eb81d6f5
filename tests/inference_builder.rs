use std::time::Duration;

use ilpinfer::constraint::LinearConstraint;
use ilpinfer::error::InferenceError;
use ilpinfer::infer::cutting_plane::CuttingPlaneSolver;
use ilpinfer::infer::generators::{ConstraintGenerator, OutputDecoder};
use ilpinfer::infer::{InferenceProblem, run_inference, run_inference_two_phase};
use ilpinfer::lexicon::VariableLexicon;
use ilpinfer::solver::Solver;
use ilpinfer::solver::beam::BeamSearch;

/// Picks a subset of named labels; weights are fixed in the test.
struct PickLabels {
    labels: Vec<(&'static str, f64)>,
}

impl InferenceProblem for PickLabels {
    type Output = Vec<String>;

    fn declare_variables(
        &mut self,
        solver: &mut dyn Solver,
        lexicon: &mut VariableLexicon,
    ) -> Result<(), InferenceError> {
        for (name, weight) in &self.labels {
            let id = solver.add_boolean_variable(*weight);
            lexicon.add_variable(*name, id)?;
        }
        Ok(())
    }

    fn declare_constraints(
        &mut self,
        _solver: &mut dyn Solver,
        _lexicon: &VariableLexicon,
    ) -> Result<(), InferenceError> {
        Ok(())
    }

    fn decode(&self, solver: &dyn Solver, lexicon: &VariableLexicon) -> Vec<String> {
        selected_labels(solver, lexicon, &self.labels)
    }
}

fn selected_labels(
    solver: &dyn Solver,
    lexicon: &VariableLexicon,
    labels: &[(&'static str, f64)],
) -> Vec<String> {
    labels
        .iter()
        .filter_map(|&(name, _)| {
            lexicon
                .get_variable(name)
                .filter(|&id| solver.boolean_value(id))
                .map(|_| name.to_string())
        })
        .collect()
}

#[test]
fn lifecycle_solves_and_decodes() {
    let mut problem = PickLabels {
        labels: vec![("keep", 2.0), ("drop", -1.0)],
    };
    let mut solver = BeamSearch::new(Some(10));

    let output = run_inference(&mut problem, &mut solver).expect("solve");
    assert_eq!(output, vec!["keep".to_string()]);
    assert_eq!(solver.objective_value(), 2.0);
}

#[test]
fn solver_is_rebuilt_on_each_run() {
    let mut problem = PickLabels {
        labels: vec![("a", 1.0)],
    };
    let mut solver = BeamSearch::new(Some(10));

    let first = run_inference(&mut problem, &mut solver).expect("first");
    let second = run_inference(&mut problem, &mut solver).expect("second");
    assert_eq!(first, second);
    assert_eq!(solver.num_variables(), 1);
}

#[test]
fn duplicate_identifier_fails_the_run() {
    struct Doubled;
    impl InferenceProblem for Doubled {
        type Output = ();
        fn declare_variables(
            &mut self,
            solver: &mut dyn Solver,
            lexicon: &mut VariableLexicon,
        ) -> Result<(), InferenceError> {
            let a = solver.add_boolean_variable(1.0);
            let b = solver.add_boolean_variable(1.0);
            lexicon.add_variable("x", a)?;
            lexicon.add_variable("x", b)?;
            Ok(())
        }
        fn declare_constraints(
            &mut self,
            _solver: &mut dyn Solver,
            _lexicon: &VariableLexicon,
        ) -> Result<(), InferenceError> {
            Ok(())
        }
        fn decode(&self, _solver: &dyn Solver, _lexicon: &VariableLexicon) {}
    }

    let err = run_inference(&mut Doubled, &mut BeamSearch::new(Some(2))).expect_err("must fail");
    assert_eq!(err, InferenceError::DuplicateVariable("x".to_string()));
}

#[test]
fn infeasible_and_timeout_are_distinguishable() {
    struct Pinned;
    impl InferenceProblem for Pinned {
        type Output = ();
        fn declare_variables(
            &mut self,
            solver: &mut dyn Solver,
            lexicon: &mut VariableLexicon,
        ) -> Result<(), InferenceError> {
            let id = solver.add_boolean_variable(1.0);
            lexicon.add_variable("pinned", id)?;
            Ok(())
        }
        fn declare_constraints(
            &mut self,
            solver: &mut dyn Solver,
            lexicon: &VariableLexicon,
        ) -> Result<(), InferenceError> {
            if let Some(id) = lexicon.get_variable("pinned") {
                solver.add_equality_constraint(&[id], &[1.0], 0.5);
            }
            Ok(())
        }
        fn decode(&self, _solver: &dyn Solver, _lexicon: &VariableLexicon) {}
    }

    let err = run_inference(&mut Pinned, &mut BeamSearch::new(Some(2))).expect_err("infeasible");
    assert_eq!(err, InferenceError::Infeasible);

    let mut exhausted = BeamSearch::with_time_budget(Some(2), Duration::ZERO);
    let mut problem = PickLabels {
        labels: vec![("a", 1.0), ("b", 2.0)],
    };
    let err = run_inference(&mut problem, &mut exhausted).expect_err("timeout");
    assert_eq!(err, InferenceError::TimedOut);
}

#[test]
fn empty_problems_report_no_variables() {
    struct Empty;
    impl InferenceProblem for Empty {
        type Output = ();
        fn declare_variables(
            &mut self,
            _solver: &mut dyn Solver,
            _lexicon: &mut VariableLexicon,
        ) -> Result<(), InferenceError> {
            Ok(())
        }
        fn declare_constraints(
            &mut self,
            _solver: &mut dyn Solver,
            _lexicon: &VariableLexicon,
        ) -> Result<(), InferenceError> {
            Ok(())
        }
        fn decode(&self, _solver: &dyn Solver, _lexicon: &VariableLexicon) {}
    }

    let err = run_inference(&mut Empty, &mut BeamSearch::new(Some(2))).expect_err("no vars");
    assert_eq!(err, InferenceError::NoVariables);
}

#[test]
fn two_phase_falls_back_to_the_full_backend_on_timeout() {
    let mut problem = PickLabels {
        labels: vec![("a", 1.0), ("b", 2.0)],
    };
    let mut fast = BeamSearch::with_time_budget(Some(1), Duration::ZERO);
    let mut full = BeamSearch::new(None);

    let output = run_inference_two_phase(&mut problem, &mut fast, &mut full).expect("fallback");
    assert_eq!(output, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(full.objective_value(), 3.0);
}

/// Lazily materialized at-most-one family over all declared labels.
struct AtMostOne {
    labels: Vec<&'static str>,
}

impl ConstraintGenerator<(), Vec<String>> for AtMostOne {
    fn name(&self) -> &str {
        "at-most-one"
    }
    fn is_delayed(&self) -> bool {
        true
    }
    fn constraints(&self, _input: &(), lexicon: &VariableLexicon) -> Vec<LinearConstraint> {
        let mut family = Vec::new();
        for (i, a) in self.labels.iter().enumerate() {
            for b in &self.labels[i + 1..] {
                if let (Some(va), Some(vb)) =
                    (lexicon.get_variable(a), lexicon.get_variable(b))
                {
                    family.push(LinearConstraint::less_than(
                        vec![va, vb],
                        vec![1.0, 1.0],
                        1.0,
                    ));
                }
            }
        }
        family
    }
    fn violated_constraints(
        &self,
        _input: &(),
        output: &Vec<String>,
        lexicon: &VariableLexicon,
    ) -> Vec<LinearConstraint> {
        let mut violated = Vec::new();
        for (i, a) in self.labels.iter().enumerate() {
            for b in &self.labels[i + 1..] {
                let both = output.iter().any(|s| s == a) && output.iter().any(|s| s == b);
                if !both {
                    continue;
                }
                if let (Some(va), Some(vb)) = (lexicon.get_variable(a), lexicon.get_variable(b)) {
                    violated.push(LinearConstraint::less_than(
                        vec![va, vb],
                        vec![1.0, 1.0],
                        1.0,
                    ));
                }
            }
        }
        violated
    }
}

struct LabelDecoder {
    labels: Vec<(&'static str, f64)>,
}

impl OutputDecoder<(), Vec<String>> for LabelDecoder {
    fn decode(&self, solver: &dyn Solver, lexicon: &VariableLexicon, _input: &()) -> Vec<String> {
        selected_labels(solver, lexicon, &self.labels)
    }
}

#[test]
fn cutting_plane_backend_through_the_builder() {
    let labels = vec![("a", 5.0), ("b", 3.0), ("c", 2.0)];
    let mut problem = PickLabels {
        labels: labels.clone(),
    };

    let decoder = Box::new(LabelDecoder {
        labels: labels.clone(),
    });
    let mut solver = CuttingPlaneSolver::new(BeamSearch::new(None), (), decoder);
    solver.add_generator(Box::new(AtMostOne {
        labels: labels.iter().map(|(name, _)| *name).collect(),
    }));

    let output = run_inference(&mut problem, &mut solver).expect("solve");
    // first round selects everything, the lazy family then prunes to the
    // single best label
    assert_eq!(output, vec!["a".to_string()]);
    assert!(solver.converged());
    assert_eq!(solver.iterations(), 1);
    assert_eq!(solver.constraints_added(), 3);
    assert_eq!(solver.objective_value(), 5.0);
}
