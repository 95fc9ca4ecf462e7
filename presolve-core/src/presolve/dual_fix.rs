//! Dual bound propagation and reduced-cost fixing.
//!
//! Internal convention: minimization, `dj = c_j - y'a_j`, and a positive
//! row dual means the row binds at its lower bound. Each row dual starts
//! with the interval its bound structure allows (`y <= 0` when only the
//! upper row bound is finite, `y >= 0` when only the lower one is).
//! Columns with an infinite bound contribute dual-feasibility constraints
//! (`y'a_j <= c_j` when unbounded above, `>=` when unbounded below) which
//! are propagated back onto the row intervals. A column whose reduced-cost
//! interval then excludes zero can only sit at one of its bounds at any
//! optimum; if that bound is infinite the problem is dual infeasible.

use crate::error::PresolveError;
use crate::presolve::context::PresolveContext;
use crate::transform::TransformRecord;

/// Interval sum of `y' a_j` over a column, with counters so infinite
/// interval ends never cancel.
struct DualActivity {
    down: f64,
    up: f64,
    inf_down: usize,
    inf_up: usize,
}

impl DualActivity {
    fn lower(&self) -> f64 {
        if self.inf_down > 0 {
            f64::NEG_INFINITY
        } else {
            self.down
        }
    }

    fn upper(&self) -> f64 {
        if self.inf_up > 0 {
            f64::INFINITY
        } else {
            self.up
        }
    }
}

fn dual_activity(
    ctx: &PresolveContext,
    col: usize,
    ymin: &[f64],
    ymax: &[f64],
    skip_row: Option<usize>,
) -> DualActivity {
    let mut acc = DualActivity {
        down: 0.0,
        up: 0.0,
        inf_down: 0,
        inf_up: 0,
    };
    for (row, coeff) in ctx.mat.iter_col(col) {
        if Some(row) == skip_row {
            continue;
        }
        let (lo, hi) = if coeff > 0.0 {
            (coeff * ymin[row], coeff * ymax[row])
        } else {
            (coeff * ymax[row], coeff * ymin[row])
        };
        if lo.is_finite() {
            acc.down += lo;
        } else {
            acc.inf_down += 1;
        }
        if hi.is_finite() {
            acc.up += hi;
        } else {
            acc.inf_up += 1;
        }
    }
    acc
}

/// Run the dual-fix sweep over all active columns. Returns the number of
/// variables fixed.
pub(crate) fn dual_fix(ctx: &mut PresolveContext) -> Result<usize, PresolveError> {
    let tol = ctx.settings.feas_tol;
    let m = ctx.mat.nrows();

    // Sign restrictions from the row bound structure. Inactive rows carry a
    // zero dual.
    let mut ymin = vec![0.0; m];
    let mut ymax = vec![0.0; m];
    for row in ctx.active_rows.iter() {
        ymin[row] = if ctx.bc.row_upper[row].is_finite() {
            f64::NEG_INFINITY
        } else {
            0.0
        };
        ymax[row] = if ctx.bc.row_lower[row].is_finite() {
            f64::INFINITY
        } else {
            0.0
        };
    }

    // Propagate the dual-feasibility constraints of unbounded columns onto
    // the row intervals until a pass changes nothing.
    let cols: Vec<usize> = ctx.active_cols.iter().collect();
    for _ in 0..ctx.settings.dual_fix_passes {
        let mut changed = false;
        for &col in &cols {
            let c = ctx.bc.cost[col];
            let unbounded_up = ctx.bc.col_upper[col] == f64::INFINITY;
            let unbounded_down = ctx.bc.col_lower[col] == f64::NEG_INFINITY;
            if !unbounded_up && !unbounded_down {
                continue;
            }
            let entries = ctx.mat.col_vector(col, None);
            for &(row, coeff) in &entries {
                if unbounded_up {
                    // y'a_j <= c: a y_row <= c - min(rest).
                    let rest = dual_activity(ctx, col, &ymin, &ymax, Some(row));
                    let slack = c - rest.lower();
                    if slack.is_finite() {
                        let bound = slack / coeff;
                        if coeff > 0.0 && bound < ymax[row] - tol {
                            ymax[row] = bound;
                            changed = true;
                        } else if coeff < 0.0 && bound > ymin[row] + tol {
                            ymin[row] = bound;
                            changed = true;
                        }
                    }
                }
                if unbounded_down {
                    // y'a_j >= c: a y_row >= c - max(rest).
                    let rest = dual_activity(ctx, col, &ymin, &ymax, Some(row));
                    let slack = c - rest.upper();
                    if slack.is_finite() {
                        let bound = slack / coeff;
                        if coeff > 0.0 && bound > ymin[row] + tol {
                            ymin[row] = bound;
                            changed = true;
                        } else if coeff < 0.0 && bound < ymax[row] - tol {
                            ymax[row] = bound;
                            changed = true;
                        }
                    }
                }
            }
        }
        if !changed {
            break;
        }
    }

    // Fix columns whose reduced-cost interval excludes zero.
    let mut applied = 0;
    for &col in &cols {
        if !ctx.feasible() {
            break;
        }
        if !ctx.active_cols.contains(col) {
            continue;
        }
        let act = dual_activity(ctx, col, &ymin, &ymax, None);
        let dj_lo = ctx.bc.cost[col] - act.upper();
        let dj_hi = ctx.bc.cost[col] - act.lower();

        if dj_lo > tol {
            // dj > 0 at every dual-feasible point: the variable sits at its
            // lower bound at any optimum.
            if ctx.bc.col_lower[col] == f64::NEG_INFINITY {
                ctx.set_dual_infeasible();
                break;
            }
            fix_dominated(ctx, col, false);
            applied += 1;
        } else if dj_hi < -tol {
            if ctx.bc.col_upper[col] == f64::INFINITY {
                ctx.set_dual_infeasible();
                break;
            }
            fix_dominated(ctx, col, true);
            applied += 1;
        }
    }
    Ok(applied)
}

fn fix_dominated(ctx: &mut PresolveContext, col: usize, at_upper: bool) {
    let old_lower = ctx.bc.col_lower[col];
    let old_upper = ctx.bc.col_upper[col];
    let value = if at_upper { old_upper } else { old_lower };
    ctx.bc.col_lower[col] = value;
    ctx.bc.col_upper[col] = value;
    ctx.col_queue.push(col);
    ctx.log.push(TransformRecord::FixedAtBound {
        col,
        old_lower,
        old_upper,
        at_upper,
    });
    ctx.stats.dual_fixes += 1;
}
