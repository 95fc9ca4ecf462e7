//! The presolve driver.
//!
//! Cheap rules (singleton, fixed, doubleton, tripleton, forcing) run to a
//! fixed point over worklists of dirty rows and columns: every rule marks
//! what it touches and the loop continues until a sweep fires nothing.
//! Expensive whole-matrix rules (duplicates, dual-fix, implied-free) run
//! once per outer pass, followed by another cheap fixed point to absorb
//! whatever they queued. Empty rows and columns are swept at the end of
//! each pass. The outer loop stops when a pass finds nothing new, a
//! contradiction is proven, or the pass limit is hit.

pub(crate) mod bounds;
pub(crate) mod context;
mod doubleton;
mod dual_fix;
mod duplicate;
mod empty;
mod fixed;
mod forcing;
mod implied_free;
mod singleton;
mod tripleton;

use crate::error::PresolveError;
use crate::presolve::context::PresolveContext;
use crate::problem::{LpProblem, ObjSense, PresolveSettings, PresolveStats, PresolveStatus};
use crate::transform::TransformLog;

/// Result of a presolve run: the reduced problem plus everything postsolve
/// needs to expand a reduced solution back to the original space.
#[derive(Debug, Clone)]
pub struct Presolved {
    /// The reduced problem, in the caller's objective sense
    pub problem: LpProblem,
    /// Feasibility outcome; the reduced problem is only meaningful when
    /// `Feasible`
    pub status: PresolveStatus,
    /// Rule application counts
    pub stats: PresolveStats,
    /// Constant objective term removed during presolve, in the caller's
    /// sense: original objective = reduced objective + offset
    pub obj_offset: f64,
    /// Original index of each reduced row
    pub orig_rows: Vec<usize>,
    /// Original index of each reduced column
    pub orig_cols: Vec<usize>,
    pub(crate) log: TransformLog,
    pub(crate) orig_nrows: usize,
    pub(crate) orig_ncols: usize,
    pub(crate) sense: ObjSense,
    pub(crate) feas_tol: f64,
    pub(crate) drop_tol: f64,
}

/// Reduce a problem. The returned [`Presolved`] owns the reduced problem
/// and the transform log needed by [`crate::postsolve`].
pub fn presolve(
    prob: &LpProblem,
    settings: &PresolveSettings,
) -> Result<Presolved, PresolveError> {
    prob.validate().map_err(PresolveError::InvalidProblem)?;
    let mut ctx = PresolveContext::new(prob, settings)?;

    for pass in 1..=settings.max_passes {
        ctx.stats.passes = pass;
        cheap_fixed_point(&mut ctx)?;
        if !ctx.feasible() {
            break;
        }
        let before = ctx.stats.total();

        if settings.rule_dup_rows {
            duplicate::dup_rows(&mut ctx)?;
        }
        if ctx.feasible() && settings.rule_dup_cols {
            duplicate::dup_cols(&mut ctx)?;
        }
        if ctx.feasible() && settings.rule_dual_fix {
            dual_fix::dual_fix(&mut ctx)?;
        }
        if ctx.feasible() && settings.rule_implied_free {
            implied_free::implied_free(&mut ctx)?;
        }
        cheap_fixed_point(&mut ctx)?;

        if ctx.feasible() {
            empty::drop_empty_rows(&mut ctx)?;
        }
        if ctx.feasible() {
            empty::drop_empty_cols(&mut ctx)?;
        }
        ctx.log_pass(pass);
        if !ctx.feasible() || ctx.stats.total() == before {
            break;
        }
    }

    ctx.mat.assert_consistent();
    Ok(extract(ctx, prob))
}

/// Run the cheap rules until a sweep fires nothing. Rules requeue whatever
/// they touch, so an empty sweep means the queues are empty too.
fn cheap_fixed_point(ctx: &mut PresolveContext) -> Result<(), PresolveError> {
    loop {
        if !ctx.feasible() {
            return Ok(());
        }
        let mut fired = 0;
        let rows = ctx.row_queue.take_all();
        if ctx.settings.rule_singleton {
            fired += singleton::singleton_rows(ctx, &rows)?;
        }
        if ctx.settings.rule_doubleton {
            fired += doubleton::doubletons(ctx, &rows)?;
        }
        if ctx.settings.rule_tripleton {
            fired += tripleton::tripletons(ctx, &rows)?;
        }
        if ctx.settings.rule_forcing {
            fired += forcing::forcing_rows(ctx, &rows)?;
        }
        let cols = ctx.col_queue.take_all();
        if ctx.settings.rule_fixed {
            fired += fixed::remove_fixed(ctx, &cols)?;
        }
        if ctx.settings.rule_singleton {
            fired += singleton::slack_singletons(ctx, &cols)?;
        }
        if fired == 0 {
            return Ok(());
        }
    }
}

/// Renumber the surviving rows and columns densely and build the reduced
/// problem in the caller's objective sense. Warm-start data carries over on
/// the surviving indices, with primal values clamped into the tightened
/// bounds.
fn extract(ctx: PresolveContext, prob: &LpProblem) -> Presolved {
    let orig_rows: Vec<usize> = ctx.active_rows.iter().collect();
    let orig_cols: Vec<usize> = ctx.active_cols.iter().collect();

    let mut new_row = vec![usize::MAX; ctx.mat.nrows()];
    for (k, &r) in orig_rows.iter().enumerate() {
        new_row[r] = k;
    }

    let mut tri = sprs::TriMat::new((orig_rows.len(), orig_cols.len()));
    for (k, &c) in orig_cols.iter().enumerate() {
        for (r, v) in ctx.mat.col_vector(c, None) {
            debug_assert_ne!(new_row[r], usize::MAX, "entry in dropped row {r}");
            tri.add_triplet(new_row[r], k, v);
        }
    }

    let mult = prob.sense.multiplier();
    let problem = LpProblem {
        a: tri.to_csc(),
        col_lower: orig_cols.iter().map(|&c| ctx.bc.col_lower[c]).collect(),
        col_upper: orig_cols.iter().map(|&c| ctx.bc.col_upper[c]).collect(),
        cost: orig_cols.iter().map(|&c| mult * ctx.bc.cost[c]).collect(),
        integrality: prob
            .integrality
            .as_ref()
            .map(|t| orig_cols.iter().map(|&c| t[c]).collect()),
        row_lower: orig_rows.iter().map(|&r| ctx.bc.row_lower[r]).collect(),
        row_upper: orig_rows.iter().map(|&r| ctx.bc.row_upper[r]).collect(),
        sense: prob.sense,
        primal: prob.primal.as_ref().map(|x| {
            orig_cols
                .iter()
                .map(|&c| x[c].max(ctx.bc.col_lower[c]).min(ctx.bc.col_upper[c]))
                .collect()
        }),
        col_status: prob
            .col_status
            .as_ref()
            .map(|s| orig_cols.iter().map(|&c| s[c]).collect()),
        row_status: prob
            .row_status
            .as_ref()
            .map(|s| orig_rows.iter().map(|&r| s[r]).collect()),
    };

    Presolved {
        problem,
        status: ctx.status,
        stats: ctx.stats,
        obj_offset: mult * ctx.obj_offset,
        orig_rows,
        orig_cols,
        log: ctx.log,
        orig_nrows: ctx.mat.nrows(),
        orig_ncols: ctx.mat.ncols(),
        sense: prob.sense,
        feas_tol: ctx.settings.feas_tol,
        drop_tol: ctx.settings.drop_tol,
    }
}
