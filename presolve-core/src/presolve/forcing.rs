//! Forcing and useless constraints.
//!
//! The implied activity interval `[L, U]` of a row (from the current column
//! bounds, with unbounded sides tracked as counters) classifies it:
//! disjoint from `[rlo, rup]` beyond tolerance means primal infeasible;
//! `U` touching `rlo` (or `L` touching `rup`) forces every variable to the
//! bound that produced that edge; `[L, U]` inside `[rlo, rup]` means the row
//! can never bind and is dropped.

use crate::error::PresolveError;
use crate::presolve::context::PresolveContext;
use crate::transform::{ForcedVar, TransformRecord};

/// Classify every queued row; fix variables of forcing rows and drop rows
/// that cannot bind.
pub(crate) fn forcing_rows(
    ctx: &mut PresolveContext,
    rows: &[usize],
) -> Result<usize, PresolveError> {
    let tol = ctx.settings.feas_tol;
    let mut applied = 0;

    for &row in rows {
        if !ctx.feasible() {
            break;
        }
        if !ctx.active_rows.contains(row) || ctx.mat.row_count(row) == 0 {
            continue;
        }
        let act = ctx.implied_activity(row, None);
        let (lower, upper) = (act.lower(), act.upper());
        let rlo = ctx.bc.row_lower[row];
        let rup = ctx.bc.row_upper[row];

        // Disjoint intervals first.
        if lower > rup + tol || upper < rlo - tol {
            if ctx.settings.force_feasible {
                // Escape hatch for marginal inputs: relax the violated row
                // bound to the implied edge and keep going.
                if lower > rup + tol {
                    ctx.bc.row_upper[row] = lower;
                }
                if upper < rlo - tol {
                    ctx.bc.row_lower[row] = upper;
                }
            } else {
                ctx.set_primal_infeasible();
            }
            continue;
        }

        // Forcing at the lower row bound: the maximum possible activity only
        // just reaches rlo, so every variable must sit at the bound that
        // produced U. Requires every binding-side bound finite.
        if act.inf_up == 0 && rlo.is_finite() && upper <= rlo + tol {
            applied += apply_forcing(ctx, row, true);
            continue;
        }
        // Symmetric case at the upper row bound.
        if act.inf_down == 0 && rup.is_finite() && lower >= rup - tol {
            applied += apply_forcing(ctx, row, false);
            continue;
        }

        // Useless: the row bounds cannot cut the implied interval.
        if lower >= rlo - tol && upper <= rup + tol {
            let entries = ctx.drop_row(row);
            ctx.log.push(TransformRecord::UselessRow {
                row,
                row_lower: rlo,
                row_upper: rup,
                entries,
            });
            ctx.stats.useless_rows += 1;
            applied += 1;
        }
    }
    Ok(applied)
}

/// Fix every variable of a forcing row at its binding-side bound and drop
/// the row. `at_lower` selects which row bound the activity touches.
fn apply_forcing(ctx: &mut PresolveContext, row: usize, at_lower: bool) -> usize {
    let row_lower = ctx.bc.row_lower[row];
    let row_upper = ctx.bc.row_upper[row];
    let entries = ctx.drop_row(row);

    let mut fixed = Vec::with_capacity(entries.len());
    for &(col, coeff) in &entries {
        // Touching rlo means each term sat at its maximum (coeff > 0 at the
        // upper bound); touching rup means each term at its minimum.
        let at_upper = (coeff > 0.0) == at_lower;
        let old_lower = ctx.bc.col_lower[col];
        let old_upper = ctx.bc.col_upper[col];
        let value = if at_upper { old_upper } else { old_lower };
        ctx.bc.col_lower[col] = value;
        ctx.bc.col_upper[col] = value;
        ctx.col_queue.push(col);
        fixed.push(ForcedVar {
            col,
            old_lower,
            old_upper,
            at_upper,
        });
    }

    ctx.log.push(TransformRecord::ForcingRow {
        row,
        row_lower,
        row_upper,
        at_lower,
        entries,
        fixed,
    });
    ctx.stats.forcing_rows += 1;
    1
}
