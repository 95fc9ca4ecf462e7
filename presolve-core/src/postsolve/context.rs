//! Mutable postsolve state.
//!
//! Postsolve owns a fresh original-size matrix pair seeded from the reduced
//! problem's entries scattered back to their original coordinates; each undo
//! reinserts what its rule deleted. Bounds, costs, primal values, duals,
//! reduced costs and basis statuses live here in the original index space
//! and the internal minimization convention; the driver converts sense at
//! the boundary.

use crate::error::PresolveError;
use crate::matrix::SparseMatrixPair;
use crate::presolve::Presolved;
use crate::problem::{BasisStatus, ReducedSolution};

pub struct PostsolveContext {
    pub mat: SparseMatrixPair,
    pub x: Vec<f64>,
    pub duals: Vec<f64>,
    pub djs: Vec<f64>,
    pub col_status: Vec<BasisStatus>,
    pub row_status: Vec<BasisStatus>,
    pub cost: Vec<f64>,
    pub col_lower: Vec<f64>,
    pub col_upper: Vec<f64>,
    pub row_lower: Vec<f64>,
    pub row_upper: Vec<f64>,
    pub feas_tol: f64,
    pub drop_tol: f64,
}

impl PostsolveContext {
    /// Scatter the reduced solution back to original coordinates. Indices
    /// that presolve removed start with neutral placeholders; the undo
    /// records are responsible for every one of them.
    pub fn new(pre: &Presolved, sol: &ReducedSolution) -> Result<Self, PresolveError> {
        let m = pre.orig_nrows;
        let n = pre.orig_ncols;
        let m_red = pre.orig_rows.len();
        let n_red = pre.orig_cols.len();

        if sol.x.len() != n_red
            || sol.reduced_costs.len() != n_red
            || sol.col_status.len() != n_red
        {
            return Err(PresolveError::DimensionMismatch(format!(
                "reduced solution has {} columns, expected {}",
                sol.x.len(),
                n_red
            )));
        }
        if sol.duals.len() != m_red || sol.row_status.len() != m_red {
            return Err(PresolveError::DimensionMismatch(format!(
                "reduced solution has {} rows, expected {}",
                sol.duals.len(),
                m_red
            )));
        }

        let mult = pre.sense.multiplier();
        let red = &pre.problem;

        let mut mat = SparseMatrixPair::new(m, n, red.a.nnz(), usize::MAX);
        for (k, &col) in pre.orig_cols.iter().enumerate() {
            if let Some(col_view) = red.a.outer_view(k) {
                for (r, &v) in col_view.iter() {
                    mat.insert(pre.orig_rows[r], col, v)?;
                }
            }
        }

        let mut ctx = Self {
            mat,
            x: vec![0.0; n],
            duals: vec![0.0; m],
            djs: vec![0.0; n],
            col_status: vec![BasisStatus::AtLower; n],
            row_status: vec![BasisStatus::Basic; m],
            cost: vec![0.0; n],
            col_lower: vec![0.0; n],
            col_upper: vec![0.0; n],
            row_lower: vec![0.0; m],
            row_upper: vec![0.0; m],
            feas_tol: pre.feas_tol,
            drop_tol: pre.drop_tol,
        };
        for (k, &col) in pre.orig_cols.iter().enumerate() {
            ctx.x[col] = sol.x[k];
            ctx.djs[col] = mult * sol.reduced_costs[k];
            ctx.col_status[col] = sol.col_status[k];
            ctx.cost[col] = mult * red.cost[k];
            ctx.col_lower[col] = red.col_lower[k];
            ctx.col_upper[col] = red.col_upper[k];
        }
        for (k, &row) in pre.orig_rows.iter().enumerate() {
            ctx.duals[row] = mult * sol.duals[k];
            ctx.row_status[row] = sol.row_status[k];
            ctx.row_lower[row] = red.row_lower[k];
            ctx.row_upper[row] = red.row_upper[k];
        }
        Ok(ctx)
    }

    /// Reduced cost of a column from the current duals and matrix.
    pub fn dj(&self, col: usize) -> f64 {
        let mut acc = self.cost[col];
        for (row, coeff) in self.mat.iter_col(col) {
            acc -= self.duals[row] * coeff;
        }
        acc
    }

    /// Activity of a row from the current primal values.
    pub fn row_activity(&self, row: usize) -> f64 {
        self.mat
            .iter_row(row)
            .map(|(col, coeff)| coeff * self.x[col])
            .sum()
    }

    /// Nonbasic status matching a value against the column's bounds.
    pub fn status_at_value(&self, col: usize, value: f64) -> BasisStatus {
        if self.col_lower[col].is_finite() && (value - self.col_lower[col]).abs() <= self.feas_tol
        {
            BasisStatus::AtLower
        } else if self.col_upper[col].is_finite()
            && (value - self.col_upper[col]).abs() <= self.feas_tol
        {
            BasisStatus::AtUpper
        } else {
            BasisStatus::Free
        }
    }
}
