//! End-to-end integration tests for the presolve/postsolve engine.
//!
//! These tests drive the full pipeline: build an LP, presolve it, hand a
//! solution of the reduced problem back, and check that postsolve restores
//! an original-size solution satisfying the original bounds, constraints
//! and basis/reduced-cost consistency.

use presolve_core::{
    postsolve, presolve, BasisStatus, LpProblem, ObjSense, PresolveSettings, PresolveStatus,
    ReducedSolution,
};

fn lp(
    nrows: usize,
    ncols: usize,
    triplets: &[(usize, usize, f64)],
    col_lower: Vec<f64>,
    col_upper: Vec<f64>,
    cost: Vec<f64>,
    row_lower: Vec<f64>,
    row_upper: Vec<f64>,
) -> LpProblem {
    let mut tri = sprs::TriMat::new((nrows, ncols));
    for &(r, c, v) in triplets {
        tri.add_triplet(r, c, v);
    }
    LpProblem {
        a: tri.to_csc(),
        col_lower,
        col_upper,
        cost,
        integrality: None,
        row_lower,
        row_upper,
        sense: ObjSense::Minimize,
        primal: None,
        col_status: None,
        row_status: None,
    }
}

fn all_rules_off() -> PresolveSettings {
    PresolveSettings {
        rule_singleton: false,
        rule_fixed: false,
        rule_doubleton: false,
        rule_tripleton: false,
        rule_forcing: false,
        rule_dup_rows: false,
        rule_dup_cols: false,
        rule_dual_fix: false,
        rule_implied_free: false,
        ..PresolveSettings::default()
    }
}

#[test]
fn test_round_trip_identity_on_irreducible_problem() {
    // min x0 + x1
    // s.t. x0 + x1 >= 1
    //      x0 - x1 <= 2
    //      0 <= x0, x1 <= 10
    //
    // No rule applies: no singletons, no equality rows, no duplicates, no
    // forcing or useless rows, and dual-fix proves nothing. Presolve must
    // find zero transforms, and postsolve of an optimal solution of the
    // original problem must return that exact solution unchanged.
    let prob = lp(
        2,
        2,
        &[(0, 0, 1.0), (0, 1, 1.0), (1, 0, 1.0), (1, 1, -1.0)],
        vec![0.0, 0.0],
        vec![10.0, 10.0],
        vec![1.0, 1.0],
        vec![1.0, f64::NEG_INFINITY],
        vec![f64::INFINITY, 2.0],
    );
    let settings = PresolveSettings::default();
    let pre = presolve(&prob, &settings).unwrap();

    assert_eq!(pre.status, PresolveStatus::Feasible);
    assert_eq!(pre.stats.total(), 0, "expected zero transforms");
    assert_eq!(pre.problem.num_rows(), 2);
    assert_eq!(pre.problem.num_cols(), 2);

    // Optimal vertex x = (1, 0): row 0 binds at its lower bound with dual
    // y0 = 1 (zeroing x0's reduced cost), row 1 is slack with y1 = 0, and
    // x1's reduced cost is 1 - y0 = 0.
    let sol = ReducedSolution {
        x: vec![1.0, 0.0],
        row_activity: vec![1.0, 1.0],
        duals: vec![1.0, 0.0],
        reduced_costs: vec![0.0, 0.0],
        col_status: vec![BasisStatus::Basic, BasisStatus::AtLower],
        row_status: vec![BasisStatus::AtLower, BasisStatus::Basic],
    };
    let out = postsolve(&pre, &sol).unwrap();

    assert_eq!(out.x, vec![1.0, 0.0]);
    assert_eq!(out.duals, vec![1.0, 0.0]);
    assert_eq!(out.reduced_costs, vec![0.0, 0.0]);
    assert_eq!(out.row_activity, vec![1.0, 1.0]);
    assert_eq!(
        out.col_status,
        vec![BasisStatus::Basic, BasisStatus::AtLower]
    );
    assert_eq!(
        out.row_status,
        vec![BasisStatus::AtLower, BasisStatus::Basic]
    );
}

#[test]
fn test_doubleton_elimination_closes_algebraically() {
    // min x
    // s.t. 2x + 3y = 12, x in [1, 4], y in [0, 10]
    //
    // The doubleton eliminates one variable and the empty-column sweep
    // finishes the other, so the reduced problem is 0x0. Postsolve must
    // reconstruct a pair satisfying the row exactly and both original
    // bounds, with the reconstructed objective matching the offset.
    let prob = lp(
        1,
        2,
        &[(0, 0, 2.0), (0, 1, 3.0)],
        vec![1.0, 0.0],
        vec![4.0, 10.0],
        vec![1.0, 0.0],
        vec![12.0],
        vec![12.0],
    );
    let settings = PresolveSettings::default();
    let pre = presolve(&prob, &settings).unwrap();

    assert_eq!(pre.status, PresolveStatus::Feasible);
    assert_eq!(pre.stats.doubletons, 1);
    assert_eq!(pre.problem.num_rows(), 0);
    assert_eq!(pre.problem.num_cols(), 0);

    let sol = ReducedSolution {
        x: vec![],
        row_activity: vec![],
        duals: vec![],
        reduced_costs: vec![],
        col_status: vec![],
        row_status: vec![],
    };
    let out = postsolve(&pre, &sol).unwrap();
    let (x, y) = (out.x[0], out.x[1]);

    assert!(
        (2.0 * x + 3.0 * y - 12.0).abs() <= 1e-9,
        "row not satisfied: 2*{x} + 3*{y} != 12"
    );
    assert!((1.0 - 1e-9..=4.0 + 1e-9).contains(&x), "x out of bounds: {x}");
    assert!((-1e-9..=10.0 + 1e-9).contains(&y), "y out of bounds: {y}");
    // min x over the feasible segment is x = 1 (at y = 10/3); the whole
    // objective was absorbed into the offset.
    assert!((x - 1.0).abs() <= 1e-9);
    assert!((pre.obj_offset - 1.0).abs() <= 1e-9);
    assert!((out.row_activity[0] - 12.0).abs() <= 1e-9);
}

#[test]
fn test_useless_rows_no_false_positives() {
    // Three rows, none of which has an implied activity interval inside its
    // stated bounds; the classifier must leave all of them alone.
    //   r0: x + y in [0.5, 1.5]   (implied [0, 2])
    //   r1: x - y in [-0.9, 0.9]  (implied [-1, 1])
    //   r2: z in [0, 5]           (z unbounded above, implied [0, +inf))
    let prob = lp(
        3,
        3,
        &[
            (0, 0, 1.0),
            (0, 1, 1.0),
            (1, 0, 1.0),
            (1, 1, -1.0),
            (2, 2, 1.0),
        ],
        vec![0.0, 0.0, 0.0],
        vec![1.0, 1.0, f64::INFINITY],
        vec![0.0, 0.0, 0.0],
        vec![0.5, -0.9, 0.0],
        vec![1.5, 0.9, 5.0],
    );
    let settings = PresolveSettings {
        rule_forcing: true,
        ..all_rules_off()
    };
    let pre = presolve(&prob, &settings).unwrap();

    assert_eq!(pre.status, PresolveStatus::Feasible);
    assert_eq!(pre.stats.useless_rows, 0);
    assert_eq!(pre.stats.forcing_rows, 0);
    assert_eq!(pre.problem.num_rows(), 3);
    assert_eq!(pre.problem.num_cols(), 3);
}

#[test]
fn test_useless_rows_no_false_negatives() {
    // Both rows have implied activity strictly inside their bounds and must
    // be flagged, including the free-row (all-infinite-bounds) edge case.
    //   r0: x + y in [-100, 100]        (implied [0, 2])
    //   r1: x - y in (-inf, +inf)       (free row)
    let prob = lp(
        2,
        2,
        &[(0, 0, 1.0), (0, 1, 1.0), (1, 0, 1.0), (1, 1, -1.0)],
        vec![0.0, 0.0],
        vec![1.0, 1.0],
        vec![0.0, 0.0],
        vec![-100.0, f64::NEG_INFINITY],
        vec![100.0, f64::INFINITY],
    );
    let settings = PresolveSettings {
        rule_forcing: true,
        ..all_rules_off()
    };
    let pre = presolve(&prob, &settings).unwrap();

    assert_eq!(pre.status, PresolveStatus::Feasible);
    assert_eq!(pre.stats.useless_rows, 2);
    assert_eq!(pre.problem.num_rows(), 0);
}

#[test]
fn test_duplicate_columns_bucket_exact_pairs_only() {
    // Columns 0 and 1 are identical; column 2 matches except one coefficient
    // perturbed well beyond tolerance. The weighted-sum bucketing must pair
    // the exact duplicates, the exact comparison must confirm them, and the
    // near-duplicate must survive unmerged.
    let prob = lp(
        2,
        3,
        &[
            (0, 0, 1.0),
            (1, 0, 2.0),
            (0, 1, 1.0),
            (1, 1, 2.0),
            (0, 2, 1.0),
            (1, 2, 2.001),
        ],
        vec![0.0, 0.0, 0.0],
        vec![1.0, 1.0, 1.0],
        vec![1.0, 1.0, 1.0],
        vec![-100.0, -100.0],
        vec![100.0, 100.0],
    );
    let settings = PresolveSettings {
        rule_dup_cols: true,
        ..all_rules_off()
    };
    let pre = presolve(&prob, &settings).unwrap();

    assert_eq!(pre.status, PresolveStatus::Feasible);
    assert_eq!(pre.stats.dup_cols, 1);
    assert_eq!(pre.problem.num_cols(), 2);
    // The lowest-indexed duplicate is kept with summed bounds; the
    // near-duplicate keeps its own.
    assert_eq!(pre.orig_cols, vec![0, 2]);
    assert_eq!(pre.problem.col_upper, vec![2.0, 1.0]);
}

#[test]
fn test_infeasibility_detection_respects_tolerance() {
    // r0: x0 + x1 >= 5 with the weighted upper bounds summing to 4.999999.
    // Under feas_tol = 1e-5 the gap of 1e-6 is within tolerance and must
    // not be flagged; shrinking x1 so the sum is 4.9 must be.
    let build = |x1_upper: f64| {
        lp(
            1,
            2,
            &[(0, 0, 1.0), (0, 1, 1.0)],
            vec![0.0, 0.0],
            vec![2.5, x1_upper],
            vec![0.0, 0.0],
            vec![5.0],
            vec![f64::INFINITY],
        )
    };
    let settings = PresolveSettings {
        feas_tol: 1e-5,
        ..PresolveSettings::default()
    };

    let near = presolve(&build(2.499999), &settings).unwrap();
    assert_eq!(near.status, PresolveStatus::Feasible);

    let beyond = presolve(&build(2.4), &settings).unwrap();
    assert_eq!(beyond.status, PresolveStatus::PrimalInfeasible);
}

#[test]
fn test_end_to_end_doubleton_chain() {
    // min x0
    // s.t. x0 + x1 = 10
    //      x1 - x2 = 0
    //      0 <= x0, x1, x2 <= 20
    //
    // Both rows are doubletons; presolve eliminates everything and the
    // empty-column sweep pins the last survivor. Postsolve must reconstruct
    // the optimum x0 = 0 with x1 = x2 exactly.
    let prob = lp(
        2,
        3,
        &[(0, 0, 1.0), (0, 1, 1.0), (1, 1, 1.0), (1, 2, -1.0)],
        vec![0.0, 0.0, 0.0],
        vec![20.0, 20.0, 20.0],
        vec![1.0, 0.0, 0.0],
        vec![10.0, 0.0],
        vec![10.0, 0.0],
    );
    let settings = PresolveSettings::default();
    let pre = presolve(&prob, &settings).unwrap();

    assert_eq!(pre.status, PresolveStatus::Feasible);
    assert_eq!(pre.stats.doubletons, 2);
    assert_eq!(pre.problem.num_rows(), 0);
    assert_eq!(pre.problem.num_cols(), 0);
    // The eliminated objective contributions cancel: min x0 = 0.
    assert!(pre.obj_offset.abs() <= 1e-9);

    let sol = ReducedSolution {
        x: vec![],
        row_activity: vec![],
        duals: vec![],
        reduced_costs: vec![],
        col_status: vec![],
        row_status: vec![],
    };
    let out = postsolve(&pre, &sol).unwrap();

    assert!((out.x[0]).abs() <= 1e-9, "x0 not optimal: {}", out.x[0]);
    assert_eq!(out.x[1], out.x[2], "substitution must close exactly");
    assert!((out.x[0] + out.x[1] - 10.0).abs() <= 1e-9);
    assert!((out.row_activity[0] - 10.0).abs() <= 1e-9);
    assert!(out.row_activity[1].abs() <= 1e-9);
    for (j, &v) in out.x.iter().enumerate() {
        assert!(
            (-1e-9..=20.0 + 1e-9).contains(&v),
            "x{j} out of bounds: {v}"
        );
    }
}

#[test]
fn test_singleton_row_removed_and_restored() {
    // min x0 + x1
    // s.t. r0: 2 x0 in [2, 6]       (singleton, tightens x0 to [1, 3])
    //      r1: x0 + x1 in [0, 10]
    //      x0 in [0, 5], x1 in [0, 10]
    //
    // The reduced optimum puts x0 at its implied lower bound 1, a bound r0
    // created. Postsolve must move the dual onto r0 (y = dj/coeff = 1/2),
    // make x0 basic, and mark r0 binding at its lower bound.
    let prob = lp(
        2,
        2,
        &[(0, 0, 2.0), (1, 0, 1.0), (1, 1, 1.0)],
        vec![0.0, 0.0],
        vec![5.0, 10.0],
        vec![1.0, 1.0],
        vec![2.0, 0.0],
        vec![6.0, 10.0],
    );
    let settings = PresolveSettings {
        rule_singleton: true,
        ..all_rules_off()
    };
    let pre = presolve(&prob, &settings).unwrap();

    assert_eq!(pre.status, PresolveStatus::Feasible);
    assert_eq!(pre.stats.singleton_rows, 1);
    assert_eq!(pre.problem.num_rows(), 1);
    assert_eq!(pre.problem.col_lower, vec![1.0, 0.0]);
    assert_eq!(pre.problem.col_upper, vec![3.0, 10.0]);

    let sol = ReducedSolution {
        x: vec![1.0, 0.0],
        row_activity: vec![1.0],
        duals: vec![0.0],
        reduced_costs: vec![1.0, 1.0],
        col_status: vec![BasisStatus::AtLower, BasisStatus::AtLower],
        row_status: vec![BasisStatus::Basic],
    };
    let out = postsolve(&pre, &sol).unwrap();

    assert_eq!(out.x, vec![1.0, 0.0]);
    assert_eq!(out.duals, vec![0.5, 0.0]);
    assert_eq!(out.reduced_costs, vec![0.0, 1.0]);
    assert_eq!(out.col_status, vec![BasisStatus::Basic, BasisStatus::AtLower]);
    assert_eq!(
        out.row_status,
        vec![BasisStatus::AtLower, BasisStatus::Basic]
    );
    // r0 binds at its restored lower bound 2 with complementary dual.
    assert_eq!(out.row_activity, vec![2.0, 1.0]);
}

#[test]
fn test_slack_singleton_removed_and_restored() {
    // r0: x0 + x1 + x2 in [1, 4] with x1 a zero-cost slack in [0, 2]; the
    // row relaxes to [-1, 4]. The reduced optimum x0 = x2 = 0 leaves the
    // relaxed row interior, so postsolve must pick a slack value that pulls
    // the activity back inside the original bounds: x1 = 1, right at the
    // restored row's lower edge, with a zero dual.
    let prob = lp(
        1,
        3,
        &[(0, 0, 1.0), (0, 1, 1.0), (0, 2, 1.0)],
        vec![0.0, 0.0, 0.0],
        vec![10.0, 2.0, 10.0],
        vec![1.0, 0.0, 1.0],
        vec![1.0],
        vec![4.0],
    );
    let settings = PresolveSettings {
        rule_singleton: true,
        ..all_rules_off()
    };
    let pre = presolve(&prob, &settings).unwrap();

    assert_eq!(pre.status, PresolveStatus::Feasible);
    assert_eq!(pre.stats.slack_singletons, 1);
    assert_eq!(pre.orig_cols, vec![0, 2]);
    assert_eq!(pre.problem.row_lower, vec![-1.0]);
    assert_eq!(pre.problem.row_upper, vec![4.0]);

    let sol = ReducedSolution {
        x: vec![0.0, 0.0],
        row_activity: vec![0.0],
        duals: vec![0.0],
        reduced_costs: vec![1.0, 1.0],
        col_status: vec![BasisStatus::AtLower, BasisStatus::AtLower],
        row_status: vec![BasisStatus::Basic],
    };
    let out = postsolve(&pre, &sol).unwrap();

    assert_eq!(out.x, vec![0.0, 1.0, 0.0]);
    assert_eq!(out.duals, vec![0.0]);
    assert_eq!(out.reduced_costs, vec![1.0, 0.0, 1.0]);
    assert_eq!(out.row_activity, vec![1.0]);
    assert!((0.0..=2.0).contains(&out.x[1]));
}

#[test]
fn test_tripleton_elimination_restores_duals() {
    // min x0 + x1 + 3 x2
    // s.t. r0: x0 + x1 + x2 = 5     (tripleton; x2 in [-10, 10] implied free)
    //      r1: x2 + x3 in [0, 8]
    //
    // Substituting x2 = 5 - x0 - x1 turns r1 into -x0 - x1 + x3 in [-5, 3]
    // and the costs into -2 x0 - 2 x1 with offset 15. The reduced optimum
    // x0 = x1 = 2, x3 = 0 has an interior row, so all the dual weight comes
    // back through the undo: y(r0) = dj(x2) = 3 zeroes x2's reduced cost and
    // reproduces dj = -2 on the survivors.
    let prob = lp(
        2,
        4,
        &[
            (0, 0, 1.0),
            (0, 1, 1.0),
            (0, 2, 1.0),
            (1, 2, 1.0),
            (1, 3, 1.0),
        ],
        vec![0.0, 0.0, -10.0, 0.0],
        vec![2.0, 2.0, 10.0, 8.0],
        vec![1.0, 1.0, 3.0, 0.0],
        vec![5.0, 0.0],
        vec![5.0, 8.0],
    );
    let settings = PresolveSettings {
        rule_tripleton: true,
        ..all_rules_off()
    };
    let pre = presolve(&prob, &settings).unwrap();

    assert_eq!(pre.status, PresolveStatus::Feasible);
    assert_eq!(pre.stats.tripletons, 1);
    assert_eq!(pre.problem.num_rows(), 1);
    assert_eq!(pre.orig_cols, vec![0, 1, 3]);
    assert!((pre.obj_offset - 15.0).abs() <= 1e-9);
    assert_eq!(pre.problem.cost, vec![-2.0, -2.0, 0.0]);

    let sol = ReducedSolution {
        x: vec![2.0, 2.0, 0.0],
        row_activity: vec![-4.0],
        duals: vec![0.0],
        reduced_costs: vec![-2.0, -2.0, 0.0],
        col_status: vec![
            BasisStatus::AtUpper,
            BasisStatus::AtUpper,
            BasisStatus::AtLower,
        ],
        row_status: vec![BasisStatus::Basic],
    };
    let out = postsolve(&pre, &sol).unwrap();

    assert_eq!(out.x, vec![2.0, 2.0, 1.0, 0.0]);
    assert_eq!(out.duals, vec![3.0, 0.0]);
    assert_eq!(out.reduced_costs, vec![-2.0, -2.0, 0.0, 0.0]);
    assert_eq!(out.col_status[2], BasisStatus::Basic);
    assert_eq!(out.row_activity, vec![5.0, 1.0]);
    // Restored objective matches the reduced one plus the offset.
    let obj: f64 = out.x.iter().zip(&prob.cost).map(|(x, c)| x * c).sum();
    assert!((obj - 7.0).abs() <= 1e-9);
}

#[test]
fn test_implied_free_substitution_restores_duals() {
    // min x0 + 2 x2
    // s.t. r0: x0 + x1 + x2 = 6     (pivot row for x2, bounds [-20, 20])
    //      r1: 2 x2 + x3 in [0, 4]
    //
    // x2 = 6 - x0 - x1 rewrites r1 to -2 x0 - 2 x1 + x3 in [-12, -8] with
    // costs -x0 - 2 x1 and offset 12. At the reduced optimum x0 = x1 = 2,
    // x3 = 0 the rewritten row sits at its upper edge with a zero dual, so
    // the undo derives y(r0) = dj(x2) = 2 and x2 = 2 goes basic.
    let prob = lp(
        2,
        4,
        &[
            (0, 0, 1.0),
            (0, 1, 1.0),
            (0, 2, 1.0),
            (1, 2, 2.0),
            (1, 3, 1.0),
        ],
        vec![0.0, 0.0, -20.0, 0.0],
        vec![2.0, 2.0, 20.0, 4.0],
        vec![1.0, 0.0, 2.0, 0.0],
        vec![6.0, 0.0],
        vec![6.0, 4.0],
    );
    let settings = PresolveSettings {
        rule_implied_free: true,
        ..all_rules_off()
    };
    let pre = presolve(&prob, &settings).unwrap();

    assert_eq!(pre.status, PresolveStatus::Feasible);
    assert_eq!(pre.stats.substitutions, 1);
    assert_eq!(pre.orig_cols, vec![0, 1, 3]);
    assert!((pre.obj_offset - 12.0).abs() <= 1e-9);
    assert_eq!(pre.problem.cost, vec![-1.0, -2.0, 0.0]);
    assert_eq!(pre.problem.row_lower, vec![-12.0]);
    assert_eq!(pre.problem.row_upper, vec![-8.0]);

    let sol = ReducedSolution {
        x: vec![2.0, 2.0, 0.0],
        row_activity: vec![-8.0],
        duals: vec![0.0],
        reduced_costs: vec![-1.0, -2.0, 0.0],
        col_status: vec![
            BasisStatus::AtUpper,
            BasisStatus::AtUpper,
            BasisStatus::AtLower,
        ],
        row_status: vec![BasisStatus::Basic],
    };
    let out = postsolve(&pre, &sol).unwrap();

    assert_eq!(out.x, vec![2.0, 2.0, 2.0, 0.0]);
    assert_eq!(out.duals, vec![2.0, 0.0]);
    assert_eq!(out.reduced_costs, vec![-1.0, -2.0, 0.0, 0.0]);
    assert_eq!(out.col_status[2], BasisStatus::Basic);
    assert_eq!(out.row_activity, vec![6.0, 4.0]);
}

#[test]
fn test_forcing_row_restores_fixed_vars_and_dual() {
    // r0: x0 + x1 >= 2 with x0, x1 in [0, 1]: the maximum activity only just
    // reaches the bound, so both variables are forced to their uppers and
    // the emptied columns are absorbed. Postsolve must find a row dual under
    // which both forced reduced costs are sign-feasible: y = 1 zeroes both,
    // one variable goes basic and the other stays nonbasic at its upper.
    let prob = lp(
        1,
        2,
        &[(0, 0, 1.0), (0, 1, 1.0)],
        vec![0.0, 0.0],
        vec![1.0, 1.0],
        vec![1.0, 1.0],
        vec![2.0],
        vec![10.0],
    );
    let settings = PresolveSettings {
        rule_forcing: true,
        ..all_rules_off()
    };
    let pre = presolve(&prob, &settings).unwrap();

    assert_eq!(pre.status, PresolveStatus::Feasible);
    assert_eq!(pre.stats.forcing_rows, 1);
    assert_eq!(pre.stats.empty_cols, 2);
    assert_eq!(pre.problem.num_rows(), 0);
    assert_eq!(pre.problem.num_cols(), 0);
    assert!((pre.obj_offset - 2.0).abs() <= 1e-9);

    let sol = ReducedSolution {
        x: vec![],
        row_activity: vec![],
        duals: vec![],
        reduced_costs: vec![],
        col_status: vec![],
        row_status: vec![],
    };
    let out = postsolve(&pre, &sol).unwrap();

    assert_eq!(out.x, vec![1.0, 1.0]);
    assert_eq!(out.duals, vec![1.0]);
    assert_eq!(out.reduced_costs, vec![0.0, 0.0]);
    // Exactly one of the pair goes basic against the nonzero dual; the
    // other stays nonbasic at its forced upper bound.
    let basic = out
        .col_status
        .iter()
        .filter(|&&s| s == BasisStatus::Basic)
        .count();
    assert_eq!(basic, 1);
    assert!(out.col_status.contains(&BasisStatus::AtUpper));
    assert_eq!(out.row_status, vec![BasisStatus::AtLower]);
    assert_eq!(out.row_activity, vec![2.0]);
}

#[test]
fn test_useless_row_restored_with_zero_dual() {
    // r0: x0 + x1 in [-100, 100] can never bind (implied [0, 2]) and is
    // dropped; r1: x0 + 2 x1 in [0, 1] survives. The restored row must come
    // back basic with a zero dual and its activity inside the old bounds.
    let prob = lp(
        2,
        2,
        &[(0, 0, 1.0), (0, 1, 1.0), (1, 0, 1.0), (1, 1, 2.0)],
        vec![0.0, 0.0],
        vec![1.0, 1.0],
        vec![1.0, 1.0],
        vec![-100.0, 0.0],
        vec![100.0, 1.0],
    );
    let settings = PresolveSettings {
        rule_forcing: true,
        ..all_rules_off()
    };
    let pre = presolve(&prob, &settings).unwrap();

    assert_eq!(pre.status, PresolveStatus::Feasible);
    assert_eq!(pre.stats.useless_rows, 1);
    assert_eq!(pre.orig_rows, vec![1]);

    let sol = ReducedSolution {
        x: vec![0.0, 0.0],
        row_activity: vec![0.0],
        duals: vec![0.0],
        reduced_costs: vec![1.0, 1.0],
        col_status: vec![BasisStatus::AtLower, BasisStatus::AtLower],
        row_status: vec![BasisStatus::Basic],
    };
    let out = postsolve(&pre, &sol).unwrap();

    assert_eq!(out.x, vec![0.0, 0.0]);
    assert_eq!(out.duals, vec![0.0, 0.0]);
    assert_eq!(out.row_status, vec![BasisStatus::Basic, BasisStatus::Basic]);
    assert_eq!(out.row_activity, vec![0.0, 0.0]);
}

#[test]
fn test_duplicate_rows_transfer_dual_to_binding_row() {
    // Rows 0 and 1 share the vector x0 + 2 x1; their bound intervals
    // intersect to [2, 5] on the kept row 0. The reduced optimum binds at
    // the lower bound 2, which came from the dropped row, so the undo must
    // move the dual and the binding status onto row 1 and leave row 0 basic.
    let prob = lp(
        2,
        2,
        &[(0, 0, 1.0), (0, 1, 2.0), (1, 0, 1.0), (1, 1, 2.0)],
        vec![0.0, 0.0],
        vec![10.0, 10.0],
        vec![1.0, 1.0],
        vec![0.0, 2.0],
        vec![5.0, 8.0],
    );
    let settings = PresolveSettings {
        rule_dup_rows: true,
        ..all_rules_off()
    };
    let pre = presolve(&prob, &settings).unwrap();

    assert_eq!(pre.status, PresolveStatus::Feasible);
    assert_eq!(pre.stats.dup_rows, 1);
    assert_eq!(pre.orig_rows, vec![0]);
    assert_eq!(pre.problem.row_lower, vec![2.0]);
    assert_eq!(pre.problem.row_upper, vec![5.0]);

    // min x0 + x1 subject to x0 + 2 x1 >= 2: x1 = 1 with y = 1/2.
    let sol = ReducedSolution {
        x: vec![0.0, 1.0],
        row_activity: vec![2.0],
        duals: vec![0.5],
        reduced_costs: vec![0.5, 0.0],
        col_status: vec![BasisStatus::AtLower, BasisStatus::Basic],
        row_status: vec![BasisStatus::AtLower],
    };
    let out = postsolve(&pre, &sol).unwrap();

    assert_eq!(out.x, vec![0.0, 1.0]);
    assert_eq!(out.duals, vec![0.0, 0.5]);
    assert_eq!(out.reduced_costs, vec![0.5, 0.0]);
    assert_eq!(
        out.row_status,
        vec![BasisStatus::Basic, BasisStatus::AtLower]
    );
    assert_eq!(out.row_activity, vec![2.0, 2.0]);
}

#[test]
fn test_duplicate_columns_split_merged_value() {
    // Columns 0 and 1 are identical with equal cost and merge into one
    // variable on [0, 4]; column 2 differs. The reduced optimum puts the
    // merged variable at 2, which postsolve must split so at most one of
    // the pair leaves its bounds: the dropped one parks at its lower bound
    // 0 and the kept one takes the full value.
    let prob = lp(
        1,
        3,
        &[(0, 0, 1.0), (0, 1, 1.0), (0, 2, 2.0)],
        vec![0.0, 0.0, 0.0],
        vec![2.0, 2.0, 5.0],
        vec![1.0, 1.0, 5.0],
        vec![2.0],
        vec![10.0],
    );
    let settings = PresolveSettings {
        rule_dup_cols: true,
        ..all_rules_off()
    };
    let pre = presolve(&prob, &settings).unwrap();

    assert_eq!(pre.status, PresolveStatus::Feasible);
    assert_eq!(pre.stats.dup_cols, 1);
    assert_eq!(pre.orig_cols, vec![0, 2]);
    assert_eq!(pre.problem.col_upper, vec![4.0, 5.0]);

    // min x + 5 z subject to x + 2 z >= 2, x in [0, 4]: x = 2 with y = 1.
    let sol = ReducedSolution {
        x: vec![2.0, 0.0],
        row_activity: vec![2.0],
        duals: vec![1.0],
        reduced_costs: vec![0.0, 3.0],
        col_status: vec![BasisStatus::Basic, BasisStatus::AtLower],
        row_status: vec![BasisStatus::AtLower],
    };
    let out = postsolve(&pre, &sol).unwrap();

    assert_eq!(out.x, vec![2.0, 0.0, 0.0]);
    assert_eq!(out.duals, vec![1.0]);
    assert_eq!(out.reduced_costs, vec![0.0, 0.0, 3.0]);
    assert_eq!(out.col_status[1], BasisStatus::AtLower);
    assert_eq!(out.row_activity, vec![2.0]);
    // The split never violates either variable's own bounds.
    assert!((0.0..=2.0).contains(&out.x[0]));
    assert!((0.0..=2.0).contains(&out.x[1]));
}

#[test]
fn test_fixed_variable_removed_and_restored() {
    // x1 is fixed at 3.5 and appears in both rows:
    //   r0: x0 + 2 x1 in [0, 20]    -> shifted to [-7, 13]
    //   r1: x1 + x2 in [-10, 10]    -> shifted to [-13.5, 6.5]
    let prob = lp(
        2,
        3,
        &[(0, 0, 1.0), (0, 1, 2.0), (1, 1, 1.0), (1, 2, 1.0)],
        vec![0.0, 3.5, 0.0],
        vec![5.0, 3.5, 5.0],
        vec![1.0, 0.0, 0.0],
        vec![0.0, -10.0],
        vec![20.0, 10.0],
    );
    let settings = PresolveSettings {
        rule_fixed: true,
        ..all_rules_off()
    };
    let pre = presolve(&prob, &settings).unwrap();

    assert_eq!(pre.status, PresolveStatus::Feasible);
    assert_eq!(pre.stats.fixed_removed, 1);
    assert_eq!(pre.problem.num_cols(), 2);
    assert_eq!(pre.problem.num_rows(), 2);
    assert_eq!(pre.orig_cols, vec![0, 2]);
    assert_eq!(pre.problem.row_lower, vec![-7.0, -13.5]);
    assert_eq!(pre.problem.row_upper, vec![13.0, 6.5]);

    // Solve the reduced problem by inspection: x0 = x2 = 0 is feasible and
    // minimal with everything basic except the variables at their lower
    // bounds.
    let sol = ReducedSolution {
        x: vec![0.0, 0.0],
        row_activity: vec![0.0, 0.0],
        duals: vec![0.0, 0.0],
        reduced_costs: vec![1.0, 0.0],
        col_status: vec![BasisStatus::AtLower, BasisStatus::AtLower],
        row_status: vec![BasisStatus::Basic, BasisStatus::Basic],
    };
    let out = postsolve(&pre, &sol).unwrap();

    assert_eq!(out.x, vec![0.0, 3.5, 0.0]);
    assert_eq!(out.reduced_costs[1], 0.0);
    // Restored activities satisfy the original row bounds.
    assert!((out.row_activity[0] - 7.0).abs() <= 1e-9);
    assert!((out.row_activity[1] - 3.5).abs() <= 1e-9);
}
