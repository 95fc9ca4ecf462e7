//! Implied-free substitution.
//!
//! A column whose bounds are redundant given one of its equality rows (the
//! interval that row implies for it, from the other variables' bounds, sits
//! inside the stated bounds) can be solved out of the problem entirely:
//! `x_j = (rhs - sum_{k!=j} a_rk x_k) / a_rj` replaces `x_j` in every other
//! row and in the objective, and both the pivot row and the column vanish.
//!
//! Substituting a column appearing in `L` rows through a row of length `p`
//! creates up to `(L-1)(p-1)` fill entries, so candidates are scanned in
//! escalating column-count levels. Escalation stops early once a pass has
//! already found enough substitutions; the threshold and level cap are
//! settings, not constants.

use crate::error::PresolveError;
use crate::presolve::context::PresolveContext;
use crate::transform::TransformRecord;

/// Minimum pivot magnitude for a substitution.
const PIVOT_TOL: f64 = 1e-8;

/// Run the implied-free substitution sweep, escalating the fill level while
/// productive. Returns the number of substitutions performed.
pub(crate) fn implied_free(ctx: &mut PresolveContext) -> Result<usize, PresolveError> {
    let mut total = 0;
    for level in 1..=ctx.settings.max_fill_level {
        let cols: Vec<usize> = ctx
            .active_cols
            .iter()
            .filter(|&c| {
                let count = ctx.mat.col_count(c);
                count >= 1 && count <= level && !ctx.bc.integer[c]
            })
            .collect();
        for col in cols {
            if !ctx.feasible() {
                return Ok(total);
            }
            if !ctx.active_cols.contains(col) || ctx.mat.col_count(col) > level {
                continue;
            }
            if try_substitute(ctx, col)? {
                total += 1;
            }
        }
        if total >= ctx.settings.substitution_retry_threshold {
            break;
        }
    }
    Ok(total)
}

/// Attempt to substitute `col` out through one of its equality rows.
fn try_substitute(ctx: &mut PresolveContext, col: usize) -> Result<bool, PresolveError> {
    let tol = ctx.settings.feas_tol;
    let col_entries_all = ctx.mat.col_vector(col, None);

    let Some((row, coeff)) = pick_pivot_row(ctx, col, &col_entries_all) else {
        return Ok(false);
    };

    // Implied-free test: the interval the pivot row implies for the column
    // must sit inside its stated bounds.
    let rhs = 0.5 * (ctx.bc.row_lower[row] + ctx.bc.row_upper[row]);
    let act = ctx.implied_activity(row, Some(col));
    let (rest_lo, rest_hi) = (act.lower(), act.upper());
    let (implied_lo, implied_hi) = if coeff > 0.0 {
        ((rhs - rest_hi) / coeff, (rhs - rest_lo) / coeff)
    } else {
        ((rhs - rest_lo) / coeff, (rhs - rest_hi) / coeff)
    };
    if implied_lo < ctx.bc.col_lower[col] - tol || implied_hi > ctx.bc.col_upper[col] + tol {
        return Ok(false);
    }

    let drop_tol = ctx.settings.drop_tol;
    let row_entries = ctx.mat.row_vector(row, Some(col));
    let col_entries: Vec<(usize, f64)> = col_entries_all
        .iter()
        .copied()
        .filter(|&(r, _)| r != row)
        .collect();
    let old_costs: Vec<(usize, f64)> = row_entries
        .iter()
        .map(|&(k, _)| (k, ctx.bc.cost[k]))
        .collect();
    let old_row_bounds: Vec<(usize, f64, f64)> = col_entries
        .iter()
        .map(|&(s, _)| (s, ctx.bc.row_lower[s], ctx.bc.row_upper[s]))
        .collect();

    // Rewrite every other row containing the column, both views per row.
    for &(s, b) in &col_entries {
        for &(k, a) in &row_entries {
            ctx.mat.add_to(s, k, -(a / coeff) * b, drop_tol)?;
        }
        ctx.mat.delete(s, col);
        let shift = b * rhs / coeff;
        if ctx.bc.row_lower[s].is_finite() {
            ctx.bc.row_lower[s] -= shift;
        }
        if ctx.bc.row_upper[s].is_finite() {
            ctx.bc.row_upper[s] -= shift;
        }
        ctx.row_queue.push(s);
    }

    let col_cost = ctx.bc.cost[col];
    for &(k, a) in &row_entries {
        ctx.bc.cost[k] -= col_cost * a / coeff;
        ctx.col_queue.push(k);
    }
    ctx.obj_offset += col_cost * rhs / coeff;

    ctx.drop_row(row);
    ctx.active_cols.remove(col);

    ctx.log.push(TransformRecord::ImpliedFree {
        col,
        row,
        rhs,
        coeff,
        col_lower: ctx.bc.col_lower[col],
        col_upper: ctx.bc.col_upper[col],
        col_cost,
        row_entries,
        col_entries,
        old_costs,
        old_row_bounds,
    });
    ctx.stats.substitutions += 1;
    Ok(true)
}

/// Choose an equality row of the column usable as the substitution pivot:
/// stable coefficient, and not a bare singleton row (that rule is cheaper).
fn pick_pivot_row(
    ctx: &PresolveContext,
    col: usize,
    col_entries: &[(usize, f64)],
) -> Option<(usize, f64)> {
    let tol = ctx.settings.feas_tol;
    let cap = ctx.settings.max_substitution_ratio;
    let mut best: Option<(usize, f64, usize)> = None;
    for &(row, coeff) in col_entries {
        if !ctx.bc.is_equality_row(row, tol) || coeff.abs() < PIVOT_TOL {
            continue;
        }
        let len = ctx.mat.row_count(row);
        if len < 2 {
            continue;
        }
        let max_other = ctx
            .mat
            .iter_row(row)
            .filter(|&(k, _)| k != col)
            .map(|(_, v)| v.abs())
            .fold(0.0_f64, f64::max);
        if max_other / coeff.abs() > cap {
            continue;
        }
        // Shortest pivot row means least fill.
        match best {
            Some((_, _, best_len)) if best_len <= len => {}
            _ => best = Some((row, coeff, len)),
        }
    }
    best.map(|(row, coeff, _)| (row, coeff))
}
