//! The postsolve driver.
//!
//! Replays the transform log newest-first over an original-size problem
//! seeded with the reduced solution, restoring primal values, duals,
//! reduced costs and basis status for everything presolve removed. Row
//! activities are recomputed from the fully restored matrix at the end.

pub(crate) mod context;
mod inverses;

use crate::error::PresolveError;
use crate::postsolve::context::PostsolveContext;
use crate::presolve::Presolved;
use crate::problem::{PresolveStatus, ReducedSolution, Solution};

/// Expand a reduced solution back to the original problem.
pub fn postsolve(pre: &Presolved, sol: &ReducedSolution) -> Result<Solution, PresolveError> {
    if pre.status != PresolveStatus::Feasible {
        return Err(PresolveError::InvalidProblem(format!(
            "cannot postsolve a presolve result with status {}",
            pre.status
        )));
    }
    let mut ctx = PostsolveContext::new(pre, sol)?;
    for record in pre.log.iter_undo() {
        inverses::undo(&mut ctx, record)?;
    }
    ctx.mat.assert_consistent();

    let mult = pre.sense.multiplier();
    let row_activity = (0..pre.orig_nrows).map(|r| ctx.row_activity(r)).collect();
    Ok(Solution {
        x: ctx.x,
        row_activity,
        duals: ctx.duals.iter().map(|&y| mult * y).collect(),
        reduced_costs: ctx.djs.iter().map(|&d| mult * d).collect(),
        col_status: ctx.col_status,
        row_status: ctx.row_status,
    })
}
