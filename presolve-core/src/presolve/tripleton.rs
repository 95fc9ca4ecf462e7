//! Tripleton elimination.
//!
//! An equality row with exactly three nonzeros, `k1·x1 + k2·x2 + e·y = c`,
//! defines `y = (c - k1·x1 - k2·x2)/e`. Unlike the doubleton case there is no
//! single survivor to transfer bounds onto, so the eliminated variable must
//! already be implied free: the interval the row implies for it sits inside
//! its stated bounds. Every other row containing `y` picks up fill on both
//! survivors.

use crate::error::PresolveError;
use crate::presolve::context::PresolveContext;
use crate::transform::TransformRecord;

/// Whether eliminating `elim` out of `row` is sound: continuous, implied
/// free with respect to the two survivors, and numerically stable.
fn eligible(
    ctx: &PresolveContext,
    row: usize,
    elim: (usize, f64),
    keep: [(usize, f64); 2],
    rhs: f64,
) -> bool {
    let (col, coeff) = elim;
    if ctx.bc.integer[col] {
        return false;
    }
    let cap = ctx.settings.max_substitution_ratio;
    if (keep[0].1 / coeff).abs() > cap || (keep[1].1 / coeff).abs() > cap {
        return false;
    }

    // Implied interval for y: (rhs - rest)/coeff over the survivors' ranges.
    let act = ctx.implied_activity(row, Some(col));
    let (rest_lo, rest_hi) = (act.lower(), act.upper());
    let (y_lo, y_hi) = if coeff > 0.0 {
        ((rhs - rest_hi) / coeff, (rhs - rest_lo) / coeff)
    } else {
        ((rhs - rest_lo) / coeff, (rhs - rest_hi) / coeff)
    };
    let tol = ctx.settings.feas_tol;
    y_lo >= ctx.bc.col_lower[col] - tol && y_hi <= ctx.bc.col_upper[col] + tol
}

/// Apply tripleton elimination to every queued row that still qualifies.
pub(crate) fn tripletons(
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
            || ctx.mat.row_count(row) != 3
            || !ctx.bc.is_equality_row(row, tol)
        {
            continue;
        }
        let entries = ctx.mat.row_vector(row, None);
        if entries.iter().any(|&(_, v)| v.abs() < drop_tol) {
            continue;
        }
        let rhs = 0.5 * (ctx.bc.row_lower[row] + ctx.bc.row_upper[row]);

        // Try each variable as the eliminated one, shortest column first.
        let mut order = [0usize, 1, 2];
        order.sort_unstable_by_key(|&i| ctx.mat.col_count(entries[i].0));
        let mut chosen = None;
        for &i in &order {
            let elim = entries[i];
            let keep = [entries[(i + 1) % 3], entries[(i + 2) % 3]];
            if eligible(ctx, row, elim, keep, rhs) {
                chosen = Some((elim, keep));
                break;
            }
        }
        let Some(((elim_col, elim_coeff), keep)) = chosen else {
            continue;
        };

        let elim_vec = ctx.mat.col_vector(elim_col, Some(row));
        let old_row_bounds: Vec<(usize, f64, f64)> = elim_vec
            .iter()
            .map(|&(r, _)| (r, ctx.bc.row_lower[r], ctx.bc.row_upper[r]))
            .collect();
        let old_keep_cost = [ctx.bc.cost[keep[0].0], ctx.bc.cost[keep[1].0]];

        let ratio = [
            -keep[0].1 / elim_coeff,
            -keep[1].1 / elim_coeff,
        ];
        for &(r, y_coeff) in &elim_vec {
            ctx.mat.add_to(r, keep[0].0, ratio[0] * y_coeff, drop_tol)?;
            ctx.mat.add_to(r, keep[1].0, ratio[1] * y_coeff, drop_tol)?;
            ctx.mat.delete(r, elim_col);
            let shift = y_coeff * rhs / elim_coeff;
            if ctx.bc.row_lower[r].is_finite() {
                ctx.bc.row_lower[r] -= shift;
            }
            if ctx.bc.row_upper[r].is_finite() {
                ctx.bc.row_upper[r] -= shift;
            }
            ctx.row_queue.push(r);
        }

        let elim_cost = ctx.bc.cost[elim_col];
        ctx.bc.cost[keep[0].0] += elim_cost * ratio[0];
        ctx.bc.cost[keep[1].0] += elim_cost * ratio[1];
        ctx.obj_offset += elim_cost * rhs / elim_coeff;

        ctx.drop_row(row);
        ctx.active_cols.remove(elim_col);
        ctx.col_queue.push(keep[0].0);
        ctx.col_queue.push(keep[1].0);

        ctx.log.push(TransformRecord::Tripleton {
            row,
            rhs,
            elim_col,
            elim_coeff,
            elim_lower: ctx.bc.col_lower[elim_col],
            elim_upper: ctx.bc.col_upper[elim_col],
            elim_cost,
            keep,
            old_keep_cost,
            saved_elim: elim_vec,
            old_row_bounds,
        });
        ctx.stats.tripletons += 1;
        applied += 1;
    }
    Ok(applied)
}
