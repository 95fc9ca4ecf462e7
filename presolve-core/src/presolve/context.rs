//! Mutable presolve state threaded through every rule.
//!
//! Rules receive a `&mut PresolveContext` rather than sharing a global
//! problem object: the matrix pair, bounds/costs, membership threads,
//! worklists, transform log and status all live here.

use crate::error::PresolveError;
use crate::matrix::{ActiveList, SparseMatrixPair};
use crate::presolve::bounds::BoundsAndCosts;
use crate::problem::{LpProblem, PresolveSettings, PresolveStats, PresolveStatus};
use crate::transform::{TransformLog, TransformRecord};

/// Deduplicated worklist of dirty row or column indices.
#[derive(Debug, Clone)]
pub struct DirtyQueue {
    queue: Vec<usize>,
    queued: Vec<bool>,
}

impl DirtyQueue {
    pub fn new(n: usize) -> Self {
        Self {
            queue: Vec::new(),
            queued: vec![false; n],
        }
    }

    /// Queue every index.
    pub fn fill(&mut self, n: usize) {
        for i in 0..n {
            self.push(i);
        }
    }

    pub fn push(&mut self, i: usize) {
        if !self.queued[i] {
            self.queued[i] = true;
            self.queue.push(i);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Drain the current worklist, clearing the membership flags so rules can
    /// requeue indices for the next sweep.
    pub fn take_all(&mut self) -> Vec<usize> {
        for &i in &self.queue {
            self.queued[i] = false;
        }
        std::mem::take(&mut self.queue)
    }
}

/// Implied activity range of a row, with explicit counters for unbounded
/// contributions on each side so infinities are never subtracted from each
/// other.
#[derive(Debug, Clone, Copy)]
pub struct ActivityInterval {
    /// Sum of finite contributions to the minimum activity
    pub down: f64,
    /// Sum of finite contributions to the maximum activity
    pub up: f64,
    /// Number of terms unbounded below
    pub inf_down: usize,
    /// Number of terms unbounded above
    pub inf_up: usize,
}

impl ActivityInterval {
    /// The implied minimum activity, `-inf` when any term is unbounded below.
    pub fn lower(&self) -> f64 {
        if self.inf_down > 0 {
            f64::NEG_INFINITY
        } else {
            self.down
        }
    }

    /// The implied maximum activity, `+inf` when any term is unbounded above.
    pub fn upper(&self) -> f64 {
        if self.inf_up > 0 {
            f64::INFINITY
        } else {
            self.up
        }
    }
}

/// All mutable state for one presolve run.
pub struct PresolveContext<'a> {
    pub mat: SparseMatrixPair,
    pub bc: BoundsAndCosts,
    pub active_rows: ActiveList,
    pub active_cols: ActiveList,
    pub row_queue: DirtyQueue,
    pub col_queue: DirtyQueue,
    pub log: TransformLog,
    pub status: PresolveStatus,
    /// Constant objective bias accumulated from substitutions (internal
    /// minimization convention)
    pub obj_offset: f64,
    pub settings: &'a PresolveSettings,
    pub stats: PresolveStats,
}

impl<'a> PresolveContext<'a> {
    /// Ingest the problem: build both matrix views (purging tiny input
    /// coefficients with a `ZeroDrop` record), canonicalize bounds, and queue
    /// everything for the first sweep.
    pub fn new(prob: &LpProblem, settings: &'a PresolveSettings) -> Result<Self, PresolveError> {
        let (mat, purged) =
            SparseMatrixPair::from_csc(&prob.a, settings.drop_tol, settings.slot_limit)?;
        let m = prob.num_rows();
        let n = prob.num_cols();
        let mut log = TransformLog::new();
        if !purged.is_empty() {
            log.push(TransformRecord::ZeroDrop { entries: purged });
        }
        let mut row_queue = DirtyQueue::new(m);
        let mut col_queue = DirtyQueue::new(n);
        row_queue.fill(m);
        col_queue.fill(n);
        Ok(Self {
            mat,
            bc: BoundsAndCosts::from_problem(prob, settings),
            active_rows: ActiveList::new(m),
            active_cols: ActiveList::new(n),
            row_queue,
            col_queue,
            log,
            status: PresolveStatus::Feasible,
            obj_offset: 0.0,
            settings,
            stats: PresolveStats::default(),
        })
    }

    /// Whether no contradiction has been found yet.
    pub fn feasible(&self) -> bool {
        self.status == PresolveStatus::Feasible
    }

    pub fn set_primal_infeasible(&mut self) {
        if self.status == PresolveStatus::Feasible {
            self.status = PresolveStatus::PrimalInfeasible;
        }
    }

    pub fn set_dual_infeasible(&mut self) {
        if self.status == PresolveStatus::Feasible {
            self.status = PresolveStatus::DualInfeasible;
        }
    }

    /// Delete every entry of `row`, unlink it, and mark the touched columns
    /// dirty. Returns the removed (col, value) pairs.
    pub fn drop_row(&mut self, row: usize) -> Vec<(usize, f64)> {
        let entries = self.mat.delete_row(row);
        self.active_rows.remove(row);
        for &(col, _) in &entries {
            self.col_queue.push(col);
        }
        entries
    }

    /// Delete every entry of `col`, unlink it, and mark the touched rows
    /// dirty. Returns the removed (row, value) pairs.
    pub fn drop_col(&mut self, col: usize) -> Vec<(usize, f64)> {
        let entries = self.mat.delete_col(col);
        self.active_cols.remove(col);
        for &(row, _) in &entries {
            self.row_queue.push(row);
        }
        entries
    }

    /// Implied activity interval of `row` from the current column bounds,
    /// optionally excluding one column's contribution.
    pub fn implied_activity(&self, row: usize, skip_col: Option<usize>) -> ActivityInterval {
        let mut acc = ActivityInterval {
            down: 0.0,
            up: 0.0,
            inf_down: 0,
            inf_up: 0,
        };
        for (col, coeff) in self.mat.iter_row(row) {
            if Some(col) == skip_col {
                continue;
            }
            let lo = self.bc.col_lower[col];
            let up = self.bc.col_upper[col];
            let (cmin, cmax) = if coeff > 0.0 {
                (lo, up)
            } else {
                (up, lo)
            };
            let (cmin, cmax) = (coeff * cmin, coeff * cmax);
            if cmin.is_finite() {
                acc.down += cmin;
            } else {
                acc.inf_down += 1;
            }
            if cmax.is_finite() {
                acc.up += cmax;
            } else {
                acc.inf_up += 1;
            }
        }
        acc
    }

    /// Emit a one-line rule application summary when verbose.
    pub fn log_pass(&self, pass: usize) {
        if self.settings.verbose {
            let s = &self.stats;
            eprintln!(
                "presolve pass {pass}: singleton_rows={} slack_singletons={} fixed={} \
                 doubletons={} tripletons={} forcing={} useless={} dup_rows={} dup_cols={} \
                 dual_fixes={} substitutions={} rows_left={} cols_left={}",
                s.singleton_rows,
                s.slack_singletons,
                s.fixed_removed,
                s.doubletons,
                s.tripletons,
                s.forcing_rows,
                s.useless_rows,
                s.dup_rows,
                s.dup_cols,
                s.dual_fixes,
                s.substitutions,
                self.active_rows.len(),
                self.active_cols.len()
            );
        }
    }
}
