//! Empty-row and empty-column housekeeping.
//!
//! Earlier rules strip entries but leave the emptied rows and columns
//! linked; this pass removes them. An empty row is feasible iff zero lies
//! within its bounds. An empty column is set to whichever bound its cost
//! prefers, which also catches unboundedness when that bound is infinite.

use crate::error::PresolveError;
use crate::presolve::context::PresolveContext;
use crate::transform::TransformRecord;

pub(crate) fn drop_empty_rows(ctx: &mut PresolveContext) -> Result<usize, PresolveError> {
    let tol = ctx.settings.feas_tol;
    let rows: Vec<usize> = ctx
        .active_rows
        .iter()
        .filter(|&r| ctx.mat.row_count(r) == 0)
        .collect();
    let mut applied = 0;
    for row in rows {
        let lower = ctx.bc.row_lower[row];
        let upper = ctx.bc.row_upper[row];
        if 0.0 < lower - tol || 0.0 > upper + tol {
            if !ctx.settings.force_feasible {
                ctx.set_primal_infeasible();
                break;
            }
        }
        ctx.active_rows.remove(row);
        ctx.log.push(TransformRecord::EmptyRow { row, lower, upper });
        ctx.stats.empty_rows += 1;
        applied += 1;
    }
    Ok(applied)
}

pub(crate) fn drop_empty_cols(ctx: &mut PresolveContext) -> Result<usize, PresolveError> {
    let cols: Vec<usize> = ctx
        .active_cols
        .iter()
        .filter(|&c| ctx.mat.col_count(c) == 0)
        .collect();
    let mut applied = 0;
    for col in cols {
        let lower = ctx.bc.col_lower[col];
        let upper = ctx.bc.col_upper[col];
        let cost = ctx.bc.cost[col];

        let value = if cost > 0.0 {
            if lower == f64::NEG_INFINITY {
                ctx.set_dual_infeasible();
                break;
            }
            lower
        } else if cost < 0.0 {
            if upper == f64::INFINITY {
                ctx.set_dual_infeasible();
                break;
            }
            upper
        } else if lower.is_finite() {
            lower
        } else if upper.is_finite() {
            upper
        } else {
            0.0
        };

        ctx.active_cols.remove(col);
        ctx.obj_offset += cost * value;
        ctx.log.push(TransformRecord::EmptyCol {
            col,
            lower,
            upper,
            cost,
            value,
        });
        ctx.stats.empty_cols += 1;
        applied += 1;
    }
    Ok(applied)
}
