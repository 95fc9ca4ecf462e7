//! Singleton rules.
//!
//! A row with one nonzero directly bounds its variable; the bound is
//! intersected into the column and the row dropped. A zero-cost column with
//! one nonzero is a pure slack: its contribution is folded into the row
//! bounds and the column dropped.

use crate::error::PresolveError;
use crate::presolve::bounds::{shift_finite, tighten_col_lower, tighten_col_upper, Tighten};
use crate::presolve::context::PresolveContext;
use crate::transform::TransformRecord;

/// Apply the singleton-row rule to every queued row that still qualifies.
///
/// Queued rows are revalidated at application time: a row may have gained or
/// lost entries since it was queued (a two-entry row can become a singleton
/// mid-pass after an independent column elimination), so the count is
/// rechecked immediately before each application.
pub(crate) fn singleton_rows(
    ctx: &mut PresolveContext,
    rows: &[usize],
) -> Result<usize, PresolveError> {
    let mut applied = 0;
    for &row in rows {
        if !ctx.feasible() {
            break;
        }
        if !ctx.active_rows.contains(row) || ctx.mat.row_count(row) != 1 {
            continue;
        }
        let (col, coeff) = match ctx.mat.iter_row(row).next() {
            Some(entry) => entry,
            None => continue,
        };
        // A structurally-zero singleton is a data anomaly; the purge
        // invariant should make this unreachable.
        if coeff.abs() < ctx.settings.drop_tol {
            debug_assert!(false, "zero coefficient survived in row {row}");
            continue;
        }

        let rlo = ctx.bc.row_lower[row];
        let rup = ctx.bc.row_upper[row];
        let (implied_lower, implied_upper) = if coeff > 0.0 {
            (rlo / coeff, rup / coeff)
        } else {
            (rup / coeff, rlo / coeff)
        };

        let old_col_lower = ctx.bc.col_lower[col];
        let old_col_upper = ctx.bc.col_upper[col];

        if tighten_col_lower(&mut ctx.bc, col, implied_lower, ctx.settings) == Tighten::Infeasible
            || tighten_col_upper(&mut ctx.bc, col, implied_upper, ctx.settings)
                == Tighten::Infeasible
        {
            ctx.set_primal_infeasible();
            continue;
        }

        ctx.mat.delete(row, col);
        ctx.active_rows.remove(row);
        ctx.col_queue.push(col);
        ctx.log.push(TransformRecord::SingletonRow {
            row,
            col,
            coeff,
            row_lower: rlo,
            row_upper: rup,
            old_col_lower,
            old_col_upper,
        });
        ctx.stats.singleton_rows += 1;
        applied += 1;
    }
    Ok(applied)
}

/// Apply the slack-singleton rule to every queued column that still
/// qualifies: zero cost, exactly one nonzero, continuous.
pub(crate) fn slack_singletons(
    ctx: &mut PresolveContext,
    cols: &[usize],
) -> Result<usize, PresolveError> {
    let mut applied = 0;
    for &col in cols {
        if !ctx.feasible() {
            break;
        }
        if !ctx.active_cols.contains(col) || ctx.mat.col_count(col) != 1 {
            continue;
        }
        if ctx.bc.cost[col] != 0.0 {
            // Costed singletons on equality rows are handled by the
            // implied-free substitution at fill level 1.
            continue;
        }
        if ctx.bc.integer[col] {
            // Splitting the slack back out may not land on an integer value.
            continue;
        }
        let (row, coeff) = match ctx.mat.iter_col(col).next() {
            Some(entry) => entry,
            None => continue,
        };
        if coeff.abs() < ctx.settings.drop_tol {
            debug_assert!(false, "zero coefficient survived in column {col}");
            continue;
        }

        let clo = ctx.bc.col_lower[col];
        let cup = ctx.bc.col_upper[col];
        let (contrib_min, contrib_max) = if coeff > 0.0 {
            (coeff * clo, coeff * cup)
        } else {
            (coeff * cup, coeff * clo)
        };

        let old_row_lower = ctx.bc.row_lower[row];
        let old_row_upper = ctx.bc.row_upper[row];
        // rlo <= rest + contrib <= rup, so rest spans
        // [rlo - max contrib, rup - min contrib].
        ctx.bc.row_lower[row] = if contrib_max.is_finite() {
            shift_finite(old_row_lower, contrib_max)
        } else {
            f64::NEG_INFINITY
        };
        ctx.bc.row_upper[row] = if contrib_min.is_finite() {
            shift_finite(old_row_upper, contrib_min)
        } else {
            f64::INFINITY
        };

        ctx.mat.delete(row, col);
        ctx.active_cols.remove(col);
        ctx.row_queue.push(row);
        ctx.log.push(TransformRecord::SlackSingleton {
            col,
            row,
            coeff,
            col_lower: clo,
            col_upper: cup,
            old_row_lower,
            old_row_upper,
        });
        ctx.stats.slack_singletons += 1;
        applied += 1;
    }
    Ok(applied)
}
