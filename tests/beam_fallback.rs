use ilpinfer::constraint::LinearConstraint;
use ilpinfer::solver::Solver;
use ilpinfer::solver::SolveStatus;
use ilpinfer::solver::beam::BeamSearch;

// Five decision groups; groups 2 and 4 carry negative coefficients but an
// equality constraint demands both be set. A greedy-leaning narrow beam
// abandons that branch early and dead-ends.
fn build(width: Option<usize>) -> (BeamSearch, Vec<usize>, LinearConstraint) {
    let mut solver = BeamSearch::new(width);
    let coeffs = [1.0, -5.0, 1.0, -5.0, 1.0];
    let ids: Vec<usize> = coeffs
        .iter()
        .map(|&c| solver.add_boolean_variable(c))
        .collect();
    let conflict = LinearConstraint::equal(vec![ids[1], ids[3]], vec![1.0, 1.0], 2.0);
    solver.add_linear_constraint(&conflict);
    solver.set_maximize(true);
    (solver, ids, conflict)
}

#[test]
fn width_one_falls_back_to_a_possibly_violating_greedy_result() {
    let (mut solver, ids, conflict) = build(Some(1));

    assert_eq!(solver.solve(), SolveStatus::Solved);
    assert!(solver.used_fallback());

    // the fallback covers every group but ignores the constraint
    let assignment: Vec<bool> = ids.iter().map(|&id| solver.boolean_value(id)).collect();
    assert_eq!(assignment, vec![true, false, true, false, true]);
    assert_eq!(solver.objective_value(), 3.0);
    assert!(!conflict.is_satisfied_by(&assignment));
}

#[test]
fn width_ten_finds_a_feasible_optimum() {
    let (mut solver, ids, conflict) = build(Some(10));

    assert_eq!(solver.solve(), SolveStatus::Solved);
    assert!(!solver.used_fallback());

    let assignment: Vec<bool> = ids.iter().map(|&id| solver.boolean_value(id)).collect();
    assert!(conflict.is_satisfied_by(&assignment));
    assert!(solver.boolean_value(ids[1]));
    assert!(solver.boolean_value(ids[3]));
    assert_eq!(solver.objective_value(), -7.0);
}

#[test]
fn fallback_matches_full_search_when_unconstrained() {
    // with no constraints the fallback's per-group argmax and the full
    // search coincide
    let mut full = BeamSearch::new(None);
    let mut greedy_scored = 0.0;
    for &c in &[1.25, -0.5, 3.0] {
        full.add_boolean_variable(c);
        if c >= 0.0 {
            greedy_scored += c;
        }
    }
    let group = [0.5, 2.5];
    full.add_discrete_variable(&group);
    greedy_scored += 2.5;
    full.set_maximize(true);

    assert_eq!(full.solve(), SolveStatus::Solved);
    assert!(!full.used_fallback());
    assert_eq!(full.objective_value(), greedy_scored);
}
