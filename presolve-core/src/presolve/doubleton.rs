//! Doubleton elimination.
//!
//! An equality row with exactly two nonzeros, `a·x + b·y = c`, defines
//! `y = (c - a·x)/b`. The eliminated variable's bounds are transferred onto
//! the survivor, every other row containing `y` is rewritten in terms of
//! `x`, and the row and column disappear. Both matrix views are updated for
//! each affected row before the next row is touched.

use crate::error::PresolveError;
use crate::presolve::bounds::{tighten_col_lower, tighten_col_upper, Tighten};
use crate::presolve::context::PresolveContext;
use crate::transform::TransformRecord;

/// Decide which of the two doubleton variables to eliminate, or None when
/// neither is safe. Prefers continuous over integer, then the shorter
/// column, then the larger pivot magnitude.
fn choose_eliminated(
    ctx: &PresolveContext,
    first: (usize, f64),
    second: (usize, f64),
    rhs: f64,
) -> Option<((usize, f64), (usize, f64))> {
    let cap = ctx.settings.max_substitution_ratio;
    let int1 = ctx.bc.integer[first.0];
    let int2 = ctx.bc.integer[second.0];

    let stable = |elim: (usize, f64), keep: (usize, f64)| (keep.1 / elim.1).abs() <= cap;
    let integral_ok = |elim: (usize, f64), keep: (usize, f64)| {
        let ratio = keep.1 / elim.1;
        let shift = rhs / elim.1;
        ratio.fract() == 0.0 && shift.fract() == 0.0
    };

    let order = match (int1, int2) {
        (false, true) => vec![(first, second)],
        (true, false) => vec![(second, first)],
        (false, false) => {
            // Shorter column first: less fill and a smaller undo record.
            if ctx.mat.col_count(first.0) <= ctx.mat.col_count(second.0) {
                vec![(first, second), (second, first)]
            } else {
                vec![(second, first), (first, second)]
            }
        }
        (true, true) => {
            // Integer-by-integer elimination only when the relation stays
            // integral.
            let mut cands = Vec::new();
            if integral_ok(first, second) {
                cands.push((first, second));
            }
            if integral_ok(second, first) {
                cands.push((second, first));
            }
            cands
        }
    };
    order
        .into_iter()
        .find(|&(elim, keep)| stable(elim, keep))
        .map(|(elim, keep)| (elim, keep))
}

/// Apply doubleton elimination to every queued row that still qualifies.
pub(crate) fn doubletons(
    ctx: &mut PresolveContext,
    rows: &[usize],
) -> Result<usize, PresolveError> {
    let tol = ctx.settings.feas_tol;
    let drop_tol = ctx.settings.drop_tol;
    let mut applied = 0;

    for &row in rows {
        if !ctx.feasible() {
            break;
        }
        if !ctx.active_rows.contains(row)
            || ctx.mat.row_count(row) != 2
            || !ctx.bc.is_equality_row(row, tol)
        {
            continue;
        }
        let entries = ctx.mat.row_vector(row, None);
        let (first, second) = (entries[0], entries[1]);
        if first.1.abs() < drop_tol || second.1.abs() < drop_tol {
            continue;
        }
        let rhs = 0.5 * (ctx.bc.row_lower[row] + ctx.bc.row_upper[row]);

        let Some(((elim_col, elim_coeff), (keep_col, keep_coeff))) =
            choose_eliminated(ctx, first, second, rhs)
        else {
            continue;
        };

        // Transfer the eliminated variable's bounds onto the survivor before
        // touching the matrix, so infeasibility leaves the problem intact.
        let elim_lower = ctx.bc.col_lower[elim_col];
        let elim_upper = ctx.bc.col_upper[elim_col];
        let old_keep_lower = ctx.bc.col_lower[keep_col];
        let old_keep_upper = ctx.bc.col_upper[keep_col];
        let old_keep_cost = ctx.bc.cost[keep_col];
        let elim_cost = ctx.bc.cost[elim_col];

        // t = c - b*y over y's range, then x = t / a.
        let (t_lo, t_hi) = if elim_coeff > 0.0 {
            (rhs - elim_coeff * elim_upper, rhs - elim_coeff * elim_lower)
        } else {
            (rhs - elim_coeff * elim_lower, rhs - elim_coeff * elim_upper)
        };
        let (x_lo, x_hi) = if keep_coeff > 0.0 {
            (t_lo / keep_coeff, t_hi / keep_coeff)
        } else {
            (t_hi / keep_coeff, t_lo / keep_coeff)
        };
        if tighten_col_lower(&mut ctx.bc, keep_col, x_lo, ctx.settings) == Tighten::Infeasible
            || tighten_col_upper(&mut ctx.bc, keep_col, x_hi, ctx.settings) == Tighten::Infeasible
        {
            ctx.set_primal_infeasible();
            continue;
        }

        // Snapshot the shorter column for the undo record; the other is
        // regenerated from the doubleton relation during postsolve.
        let keep_vec = ctx.mat.col_vector(keep_col, Some(row));
        let elim_vec = ctx.mat.col_vector(elim_col, Some(row));
        let saved_is_elim = elim_vec.len() <= keep_vec.len();
        let saved = if saved_is_elim {
            elim_vec.clone()
        } else {
            keep_vec
        };
        let old_row_bounds: Vec<(usize, f64, f64)> = elim_vec
            .iter()
            .map(|&(r, _)| (r, ctx.bc.row_lower[r], ctx.bc.row_upper[r]))
            .collect();

        // Rewrite every other row containing the eliminated variable,
        // keeping both views in lockstep per row.
        let sub_ratio = -keep_coeff / elim_coeff;
        for &(r, y_coeff) in &elim_vec {
            ctx.mat.add_to(r, keep_col, sub_ratio * y_coeff, drop_tol)?;
            ctx.mat.delete(r, elim_col);
            let shift = y_coeff * rhs / elim_coeff;
            ctx.bc.row_lower[r] = if ctx.bc.row_lower[r].is_finite() {
                ctx.bc.row_lower[r] - shift
            } else {
                ctx.bc.row_lower[r]
            };
            ctx.bc.row_upper[r] = if ctx.bc.row_upper[r].is_finite() {
                ctx.bc.row_upper[r] - shift
            } else {
                ctx.bc.row_upper[r]
            };
            ctx.row_queue.push(r);
        }

        ctx.drop_row(row);
        ctx.active_cols.remove(elim_col);
        ctx.col_queue.push(keep_col);

        ctx.bc.cost[keep_col] += elim_cost * sub_ratio;
        ctx.obj_offset += elim_cost * rhs / elim_coeff;

        ctx.log.push(TransformRecord::Doubleton {
            row,
            rhs,
            keep_col,
            elim_col,
            keep_coeff,
            elim_coeff,
            old_keep_lower,
            old_keep_upper,
            old_keep_cost,
            elim_lower,
            elim_upper,
            elim_cost,
            saved_is_elim,
            saved,
            old_row_bounds,
        });
        ctx.stats.doubletons += 1;
        applied += 1;
    }
    Ok(applied)
}
