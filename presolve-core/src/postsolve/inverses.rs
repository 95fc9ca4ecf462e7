//! Per-record undo logic.
//!
//! Each arm restores exactly what its rule changed: matrix entries, bounds,
//! costs, primal values, duals, reduced costs and basis status. Entries a
//! substitution cancelled are reconstructed from the recorded delta (the
//! old value of a cancelled entry is the delta itself, since old + delta
//! vanished); entries a substitution created are removed the same way.

use crate::error::PresolveError;
use crate::postsolve::context::PostsolveContext;
use crate::problem::BasisStatus;
use crate::transform::TransformRecord;

pub(crate) fn undo(
    ctx: &mut PostsolveContext,
    record: &TransformRecord,
) -> Result<(), PresolveError> {
    match record {
        TransformRecord::ZeroDrop { entries } => {
            // Reinsert explicit zeros so entry positions round-trip.
            for &(row, col) in entries {
                ctx.mat.insert(row, col, 0.0)?;
            }
            Ok(())
        }

        TransformRecord::EmptyRow { row, lower, upper } => {
            ctx.row_lower[*row] = *lower;
            ctx.row_upper[*row] = *upper;
            ctx.duals[*row] = 0.0;
            ctx.row_status[*row] = BasisStatus::Basic;
            Ok(())
        }

        TransformRecord::EmptyCol {
            col,
            lower,
            upper,
            cost,
            value,
        } => {
            ctx.col_lower[*col] = *lower;
            ctx.col_upper[*col] = *upper;
            ctx.cost[*col] = *cost;
            ctx.x[*col] = *value;
            ctx.djs[*col] = *cost;
            ctx.col_status[*col] = ctx.status_at_value(*col, *value);
            Ok(())
        }

        TransformRecord::SingletonRow {
            row,
            col,
            coeff,
            row_lower,
            row_upper,
            old_col_lower,
            old_col_upper,
        } => undo_singleton_row(
            ctx,
            *row,
            *col,
            *coeff,
            *row_lower,
            *row_upper,
            *old_col_lower,
            *old_col_upper,
        ),

        TransformRecord::SlackSingleton {
            col,
            row,
            coeff,
            col_lower,
            col_upper,
            old_row_lower,
            old_row_upper,
        } => undo_slack_singleton(
            ctx,
            *col,
            *row,
            *coeff,
            *col_lower,
            *col_upper,
            *old_row_lower,
            *old_row_upper,
        ),

        TransformRecord::FixedAtBound {
            col,
            old_lower,
            old_upper,
            at_upper,
        } => {
            ctx.col_lower[*col] = *old_lower;
            ctx.col_upper[*col] = *old_upper;
            ctx.col_status[*col] = if *at_upper {
                BasisStatus::AtUpper
            } else {
                BasisStatus::AtLower
            };
            ctx.djs[*col] = ctx.dj(*col);
            Ok(())
        }

        TransformRecord::FixedRemoval {
            col,
            value,
            cost,
            lower,
            upper,
            entries,
        } => {
            ctx.x[*col] = *value;
            ctx.cost[*col] = *cost;
            ctx.col_lower[*col] = *lower;
            ctx.col_upper[*col] = *upper;
            for e in entries {
                ctx.mat.insert(e.row, *col, e.coeff)?;
                ctx.row_lower[e.row] = e.old_lower;
                ctx.row_upper[e.row] = e.old_upper;
            }
            let dj = ctx.dj(*col);
            ctx.djs[*col] = dj;
            ctx.col_status[*col] = if dj >= 0.0 {
                BasisStatus::AtLower
            } else {
                BasisStatus::AtUpper
            };
            Ok(())
        }

        TransformRecord::Doubleton { .. } => undo_doubleton(ctx, record),
        TransformRecord::Tripleton { .. } => undo_tripleton(ctx, record),
        TransformRecord::ForcingRow { .. } => undo_forcing(ctx, record),

        TransformRecord::UselessRow {
            row,
            row_lower,
            row_upper,
            entries,
        } => {
            for &(col, v) in entries {
                ctx.mat.insert(*row, col, v)?;
            }
            ctx.row_lower[*row] = *row_lower;
            ctx.row_upper[*row] = *row_upper;
            ctx.duals[*row] = 0.0;
            ctx.row_status[*row] = BasisStatus::Basic;
            Ok(())
        }

        TransformRecord::DupRow { .. } => undo_dup_row(ctx, record),
        TransformRecord::DupCol { .. } => undo_dup_col(ctx, record),
        TransformRecord::ImpliedFree { .. } => undo_implied_free(ctx, record),
    }
}

#[allow(clippy::too_many_arguments)]
fn undo_singleton_row(
    ctx: &mut PostsolveContext,
    row: usize,
    col: usize,
    coeff: f64,
    row_lower: f64,
    row_upper: f64,
    old_col_lower: f64,
    old_col_upper: f64,
) -> Result<(), PresolveError> {
    let tol = ctx.feas_tol;
    ctx.mat.insert(row, col, coeff)?;
    ctx.row_lower[row] = row_lower;
    ctx.row_upper[row] = row_upper;

    // Whether the bound the variable currently sits at was created by this
    // row rather than being one of its own restored bounds.
    let value = ctx.x[col];
    let implied_bound_binds = match ctx.col_status[col] {
        BasisStatus::AtLower => {
            !(old_col_lower.is_finite() && (value - old_col_lower).abs() <= tol)
        }
        BasisStatus::AtUpper => {
            !(old_col_upper.is_finite() && (value - old_col_upper).abs() <= tol)
        }
        _ => false,
    };
    ctx.col_lower[col] = old_col_lower;
    ctx.col_upper[col] = old_col_upper;

    if implied_bound_binds {
        // The row's implied bound is the binding one: move the dual onto the
        // row and let the variable go basic.
        ctx.duals[row] = 0.0;
        let y = ctx.dj(col) / coeff;
        ctx.duals[row] = y;
        ctx.djs[col] = 0.0;
        ctx.col_status[col] = BasisStatus::Basic;
        let act = coeff * value;
        ctx.row_status[row] =
            if row_lower.is_finite() && (act - row_lower).abs() <= tol {
                BasisStatus::AtLower
            } else {
                BasisStatus::AtUpper
            };
    } else {
        ctx.duals[row] = 0.0;
        ctx.row_status[row] = BasisStatus::Basic;
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn undo_slack_singleton(
    ctx: &mut PostsolveContext,
    col: usize,
    row: usize,
    coeff: f64,
    col_lower: f64,
    col_upper: f64,
    old_row_lower: f64,
    old_row_upper: f64,
) -> Result<(), PresolveError> {
    let tol = ctx.feas_tol;
    ctx.mat.insert(row, col, coeff)?;
    ctx.col_lower[col] = col_lower;
    ctx.col_upper[col] = col_upper;
    ctx.row_lower[row] = old_row_lower;
    ctx.row_upper[row] = old_row_upper;
    ctx.cost[col] = 0.0;

    // Activity contributed by everything except the slack (its value is
    // still the placeholder zero).
    let act_rest = ctx.row_activity(row);
    let (xa, xb) = if coeff > 0.0 {
        (
            (old_row_lower - act_rest) / coeff,
            (old_row_upper - act_rest) / coeff,
        )
    } else {
        (
            (old_row_upper - act_rest) / coeff,
            (old_row_lower - act_rest) / coeff,
        )
    };
    let lo = xa.max(col_lower);
    let hi = xb.min(col_upper);

    // dj of the slack is -y*coeff; nonbasic-at-lower needs dj >= 0.
    let y = ctx.duals[row];
    let value = if y.abs() <= tol {
        if lo.is_finite() {
            lo
        } else if hi.is_finite() {
            hi
        } else {
            0.0
        }
    } else if y * coeff < 0.0 {
        lo
    } else {
        hi
    };
    ctx.x[col] = value;
    ctx.djs[col] = -y * coeff;
    ctx.col_status[col] = ctx.status_at_value(col, value);
    Ok(())
}

/// Align two sorted sparse vectors, yielding (index, in_a, in_b).
fn merge_sorted(
    a: &[(usize, f64)],
    b: &[(usize, f64)],
) -> Vec<(usize, f64, f64)> {
    let mut out = Vec::with_capacity(a.len().max(b.len()));
    let (mut i, mut j) = (0, 0);
    while i < a.len() || j < b.len() {
        if j >= b.len() || (i < a.len() && a[i].0 < b[j].0) {
            out.push((a[i].0, a[i].1, 0.0));
            i += 1;
        } else if i >= a.len() || b[j].0 < a[i].0 {
            out.push((b[j].0, 0.0, b[j].1));
            j += 1;
        } else {
            out.push((a[i].0, a[i].1, b[j].1));
            i += 1;
            j += 1;
        }
    }
    out
}

fn undo_doubleton(
    ctx: &mut PostsolveContext,
    record: &TransformRecord,
) -> Result<(), PresolveError> {
    let TransformRecord::Doubleton {
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
    } = record
    else {
        unreachable!()
    };
    let (row, keep_col, elim_col) = (*row, *keep_col, *elim_col);
    let sub_ratio = -keep_coeff / elim_coeff;
    let tol = ctx.feas_tol;

    // Recover the eliminated column's coefficients in the other rows and
    // strip the fill from the kept one. When the kept column was the
    // shorter (saved) one, the eliminated coefficients fall out of the
    // difference between its current and saved values, and the kept column
    // is restored to the saved values exactly.
    let elim_entries: Vec<(usize, f64)> = if *saved_is_elim {
        for &(r, b) in saved {
            ctx.mat.add_to(r, keep_col, -sub_ratio * b, ctx.drop_tol)?;
        }
        saved.clone()
    } else {
        let cur = ctx.mat.col_vector(keep_col, None);
        let mut entries = Vec::new();
        for (r, cur_v, old_v) in merge_sorted(&cur, saved) {
            let b = (cur_v - old_v) / sub_ratio;
            if b.abs() >= ctx.drop_tol {
                entries.push((r, b));
            }
            if cur_v != old_v {
                if cur_v != 0.0 {
                    ctx.mat.delete(r, keep_col);
                }
                if old_v != 0.0 {
                    ctx.mat.insert(r, keep_col, old_v)?;
                }
            }
        }
        entries
    };
    for &(r, b) in &elim_entries {
        ctx.mat.insert(r, elim_col, b)?;
    }
    for &(r, lo, up) in old_row_bounds {
        ctx.row_lower[r] = lo;
        ctx.row_upper[r] = up;
    }
    ctx.mat.insert(row, keep_col, *keep_coeff)?;
    ctx.mat.insert(row, elim_col, *elim_coeff)?;
    ctx.row_lower[row] = *rhs;
    ctx.row_upper[row] = *rhs;

    ctx.col_lower[keep_col] = *old_keep_lower;
    ctx.col_upper[keep_col] = *old_keep_upper;
    ctx.cost[keep_col] = *old_keep_cost;
    ctx.col_lower[elim_col] = *elim_lower;
    ctx.col_upper[elim_col] = *elim_upper;
    ctx.cost[elim_col] = *elim_cost;

    ctx.x[elim_col] = (rhs - keep_coeff * ctx.x[keep_col]) / elim_coeff;

    // Basis: normally the eliminated variable goes basic in the restored
    // row. But when the survivor sits at a bound that was transferred (not
    // one of its own), the roles flip: the survivor goes basic and the
    // eliminated variable is nonbasic at the matching bound.
    ctx.duals[row] = 0.0;
    let keep_at_own_bound = match ctx.col_status[keep_col] {
        BasisStatus::AtLower => {
            old_keep_lower.is_finite() && (ctx.x[keep_col] - old_keep_lower).abs() <= tol
        }
        BasisStatus::AtUpper => {
            old_keep_upper.is_finite() && (ctx.x[keep_col] - old_keep_upper).abs() <= tol
        }
        _ => true,
    };
    let y = if keep_at_own_bound {
        let y = ctx.dj(elim_col) / elim_coeff;
        ctx.duals[row] = y;
        ctx.djs[elim_col] = 0.0;
        ctx.col_status[elim_col] = BasisStatus::Basic;
        ctx.djs[keep_col] = ctx.dj(keep_col);
        y
    } else {
        let y = ctx.dj(keep_col) / keep_coeff;
        ctx.duals[row] = y;
        ctx.djs[keep_col] = 0.0;
        ctx.col_status[keep_col] = BasisStatus::Basic;
        ctx.djs[elim_col] = ctx.dj(elim_col);
        ctx.col_status[elim_col] = ctx.status_at_value(elim_col, ctx.x[elim_col]);
        y
    };
    ctx.row_status[row] = if y >= 0.0 {
        BasisStatus::AtLower
    } else {
        BasisStatus::AtUpper
    };
    Ok(())
}

fn undo_tripleton(
    ctx: &mut PostsolveContext,
    record: &TransformRecord,
) -> Result<(), PresolveError> {
    let TransformRecord::Tripleton {
        row,
        rhs,
        elim_col,
        elim_coeff,
        elim_lower,
        elim_upper,
        elim_cost,
        keep,
        old_keep_cost,
        saved_elim,
        old_row_bounds,
    } = record
    else {
        unreachable!()
    };
    let (row, elim_col) = (*row, *elim_col);
    let ratio = [-keep[0].1 / elim_coeff, -keep[1].1 / elim_coeff];

    for &(r, b) in saved_elim {
        ctx.mat.add_to(r, keep[0].0, -ratio[0] * b, ctx.drop_tol)?;
        ctx.mat.add_to(r, keep[1].0, -ratio[1] * b, ctx.drop_tol)?;
        ctx.mat.insert(r, elim_col, b)?;
    }
    for &(r, lo, up) in old_row_bounds {
        ctx.row_lower[r] = lo;
        ctx.row_upper[r] = up;
    }
    ctx.mat.insert(row, keep[0].0, keep[0].1)?;
    ctx.mat.insert(row, keep[1].0, keep[1].1)?;
    ctx.mat.insert(row, elim_col, *elim_coeff)?;
    ctx.row_lower[row] = *rhs;
    ctx.row_upper[row] = *rhs;

    ctx.cost[keep[0].0] = old_keep_cost[0];
    ctx.cost[keep[1].0] = old_keep_cost[1];
    ctx.cost[elim_col] = *elim_cost;
    ctx.col_lower[elim_col] = *elim_lower;
    ctx.col_upper[elim_col] = *elim_upper;

    ctx.x[elim_col] =
        (rhs - keep[0].1 * ctx.x[keep[0].0] - keep[1].1 * ctx.x[keep[1].0]) / elim_coeff;

    // The eliminated variable was implied free, so it goes basic in the
    // restored row without any bound conflict.
    ctx.duals[row] = 0.0;
    let y = ctx.dj(elim_col) / elim_coeff;
    ctx.duals[row] = y;
    ctx.djs[elim_col] = 0.0;
    ctx.col_status[elim_col] = BasisStatus::Basic;
    ctx.djs[keep[0].0] = ctx.dj(keep[0].0);
    ctx.djs[keep[1].0] = ctx.dj(keep[1].0);
    ctx.row_status[row] = if y >= 0.0 {
        BasisStatus::AtLower
    } else {
        BasisStatus::AtUpper
    };
    Ok(())
}

fn undo_forcing(
    ctx: &mut PostsolveContext,
    record: &TransformRecord,
) -> Result<(), PresolveError> {
    let TransformRecord::ForcingRow {
        row,
        row_lower,
        row_upper,
        at_lower,
        entries,
        fixed,
    } = record
    else {
        unreachable!()
    };
    let row = *row;
    let tol = ctx.feas_tol;

    for &(col, v) in entries {
        ctx.mat.insert(row, col, v)?;
    }
    ctx.row_lower[row] = *row_lower;
    ctx.row_upper[row] = *row_upper;
    for f in fixed {
        ctx.col_lower[f.col] = f.old_lower;
        ctx.col_upper[f.col] = f.old_upper;
    }

    // Pick a row dual under which every forced variable's reduced cost has
    // the sign its bound requires: dj = dj0 - y*a, at-lower needs dj >= 0,
    // at-upper needs dj <= 0. Zero is used when admissible; otherwise the
    // interval endpoint, whose variable then goes basic in this row.
    ctx.duals[row] = 0.0;
    let mut ylo = f64::NEG_INFINITY;
    let mut yhi = f64::INFINITY;
    for f in fixed {
        let a = entries
            .iter()
            .find(|&&(c, _)| c == f.col)
            .map(|&(_, v)| v)
            .unwrap_or(0.0);
        if a == 0.0 {
            continue;
        }
        let dj0 = ctx.dj(f.col);
        let ratio = dj0 / a;
        // at_upper: y*a >= dj0; at_lower: y*a <= dj0.
        if f.at_upper == (a > 0.0) {
            ylo = ylo.max(ratio);
        } else {
            yhi = yhi.min(ratio);
        }
    }
    let y = if ylo <= tol && -tol <= yhi {
        0.0
    } else if ylo > tol {
        ylo
    } else {
        yhi
    };
    ctx.duals[row] = y;

    let mut basic_assigned = false;
    for f in fixed {
        let dj = ctx.dj(f.col);
        ctx.djs[f.col] = dj;
        if y != 0.0 && !basic_assigned && dj.abs() <= tol {
            ctx.col_status[f.col] = BasisStatus::Basic;
            basic_assigned = true;
        } else {
            ctx.col_status[f.col] = if f.at_upper {
                BasisStatus::AtUpper
            } else {
                BasisStatus::AtLower
            };
        }
    }
    ctx.row_status[row] = if y == 0.0 {
        BasisStatus::Basic
    } else if *at_lower {
        BasisStatus::AtLower
    } else {
        BasisStatus::AtUpper
    };
    Ok(())
}

fn undo_dup_row(
    ctx: &mut PostsolveContext,
    record: &TransformRecord,
) -> Result<(), PresolveError> {
    let TransformRecord::DupRow {
        kept,
        dropped,
        old_kept_lower,
        old_kept_upper,
        dropped_lower,
        dropped_upper,
        entries,
    } = record
    else {
        unreachable!()
    };
    let (kept, dropped) = (*kept, *dropped);
    let tol = ctx.feas_tol;

    for &(col, v) in entries {
        ctx.mat.insert(dropped, col, v)?;
    }
    ctx.row_lower[dropped] = *dropped_lower;
    ctx.row_upper[dropped] = *dropped_upper;

    // If the merged row's binding bound came from the dropped row, the dual
    // moves with it; the rows have identical coefficients, so reduced costs
    // are unaffected by the transfer.
    let y = ctx.duals[kept];
    let transfer = (y > tol && *dropped_lower > *old_kept_lower)
        || (y < -tol && *dropped_upper < *old_kept_upper);
    ctx.row_lower[kept] = *old_kept_lower;
    ctx.row_upper[kept] = *old_kept_upper;
    if transfer {
        ctx.duals[dropped] = y;
        ctx.duals[kept] = 0.0;
        ctx.row_status[dropped] = ctx.row_status[kept];
        ctx.row_status[kept] = BasisStatus::Basic;
    } else {
        ctx.duals[dropped] = 0.0;
        ctx.row_status[dropped] = BasisStatus::Basic;
    }
    Ok(())
}

fn undo_dup_col(
    ctx: &mut PostsolveContext,
    record: &TransformRecord,
) -> Result<(), PresolveError> {
    let TransformRecord::DupCol {
        kept,
        dropped,
        cost,
        old_kept_lower,
        old_kept_upper,
        dropped_lower,
        dropped_upper,
        entries,
    } = record
    else {
        unreachable!()
    };
    let (kept, dropped) = (*kept, *dropped);
    let tol = ctx.feas_tol;

    for &(r, v) in entries {
        ctx.mat.insert(r, dropped, v)?;
    }
    ctx.cost[dropped] = *cost;
    let total = ctx.x[kept];
    ctx.col_lower[kept] = *old_kept_lower;
    ctx.col_upper[kept] = *old_kept_upper;
    ctx.col_lower[dropped] = *dropped_lower;
    ctx.col_upper[dropped] = *dropped_upper;

    // Split the merged value so at most one of the pair leaves its bounds:
    // park the dropped variable at a bound whenever the remainder fits the
    // kept one's range.
    let fits = |v: f64| {
        v >= old_kept_lower - tol && v <= old_kept_upper + tol
    };
    let (x_kept, x_dropped, dropped_status) =
        if dropped_lower.is_finite() && fits(total - dropped_lower) {
            (total - dropped_lower, *dropped_lower, BasisStatus::AtLower)
        } else if dropped_upper.is_finite() && fits(total - dropped_upper) {
            (total - dropped_upper, *dropped_upper, BasisStatus::AtUpper)
        } else {
            let xk = total.clamp(*old_kept_lower, *old_kept_upper);
            (xk, total - xk, BasisStatus::Basic)
        };
    ctx.x[kept] = x_kept;
    ctx.x[dropped] = x_dropped;
    ctx.djs[dropped] = ctx.djs[kept];
    ctx.col_status[dropped] = dropped_status;
    if matches!(
        ctx.col_status[kept],
        BasisStatus::AtLower | BasisStatus::AtUpper
    ) {
        // The combined variable was nonbasic; re-derive which bound the
        // kept one actually sits at now.
        ctx.col_status[kept] = ctx.status_at_value(kept, x_kept);
    }
    Ok(())
}

fn undo_implied_free(
    ctx: &mut PostsolveContext,
    record: &TransformRecord,
) -> Result<(), PresolveError> {
    let TransformRecord::ImpliedFree {
        col,
        row,
        rhs,
        coeff,
        col_lower,
        col_upper,
        col_cost,
        row_entries,
        col_entries,
        old_costs,
        old_row_bounds,
    } = record
    else {
        unreachable!()
    };
    let (col, row) = (*col, *row);

    for &(s, b) in col_entries {
        for &(k, a) in row_entries {
            ctx.mat.add_to(s, k, (a / coeff) * b, ctx.drop_tol)?;
        }
        ctx.mat.insert(s, col, b)?;
    }
    for &(s, lo, up) in old_row_bounds {
        ctx.row_lower[s] = lo;
        ctx.row_upper[s] = up;
    }
    for &(k, a) in row_entries {
        ctx.mat.insert(row, k, a)?;
    }
    ctx.mat.insert(row, col, *coeff)?;
    ctx.row_lower[row] = *rhs;
    ctx.row_upper[row] = *rhs;

    for &(k, c) in old_costs {
        ctx.cost[k] = c;
    }
    ctx.cost[col] = *col_cost;
    ctx.col_lower[col] = *col_lower;
    ctx.col_upper[col] = *col_upper;

    let rest: f64 = row_entries.iter().map(|&(k, a)| a * ctx.x[k]).sum();
    ctx.x[col] = (rhs - rest) / coeff;

    // The substituted variable goes basic in its definition row.
    ctx.duals[row] = 0.0;
    let y = ctx.dj(col) / coeff;
    ctx.duals[row] = y;
    ctx.djs[col] = 0.0;
    ctx.col_status[col] = BasisStatus::Basic;
    for &(k, _) in row_entries {
        ctx.djs[k] = ctx.dj(k);
    }
    ctx.row_status[row] = if y >= 0.0 {
        BasisStatus::AtLower
    } else {
        BasisStatus::AtUpper
    };
    Ok(())
}
