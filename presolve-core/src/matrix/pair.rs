//! The mirrored row-major/column-major matrix pair.
//!
//! Every mutation updates both views before returning, so the invariant
//! "each (row, col, value) present in one view is present in the other" holds
//! at every point where a transform completes. Debug builds can verify it
//! with [`SparseMatrixPair::assert_consistent`].

use sprs::CsMat;

use crate::error::PresolveError;
use crate::matrix::threaded::{MajorIter, ThreadedView};

/// What happened to an entry under a coefficient merge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntryUpdate {
    /// No entry existed; one was created with the delta as its value
    Created,
    /// The entry's value changed
    Updated {
        /// Value before the merge
        old: f64,
    },
    /// The merged value fell below the drop tolerance and the entry was
    /// purged from both views
    Cancelled {
        /// Value before the merge
        old: f64,
    },
}

/// One logical sparse matrix stored in two threaded views.
#[derive(Debug, Clone)]
pub struct SparseMatrixPair {
    cols: ThreadedView,
    rows: ThreadedView,
}

impl SparseMatrixPair {
    /// Create an empty m × n pair.
    pub fn new(nrows: usize, ncols: usize, nnz_hint: usize, slot_limit: usize) -> Self {
        Self {
            cols: ThreadedView::new(ncols, nnz_hint, slot_limit),
            rows: ThreadedView::new(nrows, nnz_hint, slot_limit),
        }
    }

    /// Build the pair from a CSC matrix, purging entries below `drop_tol`.
    /// Returns the pair and the (row, col) positions of purged entries.
    pub fn from_csc(
        a: &CsMat<f64>,
        drop_tol: f64,
        slot_limit: usize,
    ) -> Result<(Self, Vec<(usize, usize)>), PresolveError> {
        let mut pair = Self::new(a.rows(), a.cols(), a.nnz(), slot_limit);
        let mut purged = Vec::new();
        for col in 0..a.cols() {
            if let Some(col_view) = a.outer_view(col) {
                for (row, &val) in col_view.iter() {
                    if val.abs() < drop_tol {
                        purged.push((row, col));
                    } else {
                        pair.insert(row, col, val)?;
                    }
                }
            }
        }
        Ok((pair, purged))
    }

    /// Number of rows.
    pub fn nrows(&self) -> usize {
        self.rows.n_major()
    }

    /// Number of columns.
    pub fn ncols(&self) -> usize {
        self.cols.n_major()
    }

    /// Live entry count in column `col`.
    pub fn col_count(&self, col: usize) -> usize {
        self.cols.count(col)
    }

    /// Live entry count in row `row`.
    pub fn row_count(&self, row: usize) -> usize {
        self.rows.count(row)
    }

    /// Total live entries.
    pub fn nnz(&self) -> usize {
        self.cols.total_entries()
    }

    /// Insert a new entry into both views.
    pub fn insert(&mut self, row: usize, col: usize, value: f64) -> Result<(), PresolveError> {
        self.cols.insert(col, row, value)?;
        self.rows.insert(row, col, value)?;
        Ok(())
    }

    /// Delete the entry at (row, col) from both views, returning its value.
    pub fn delete(&mut self, row: usize, col: usize) -> Option<f64> {
        let value = self.cols.remove(col, row)?;
        let mirrored = self.rows.remove(row, col);
        debug_assert_eq!(mirrored, Some(value), "views disagree at ({row},{col})");
        Some(value)
    }

    /// Look up the value at (row, col).
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.cols.get(col, row)
    }

    /// Merge `delta` into the entry at (row, col): create it when absent,
    /// update it otherwise, and purge it from both views when the merged
    /// value falls below `drop_tol`.
    pub fn add_to(
        &mut self,
        row: usize,
        col: usize,
        delta: f64,
        drop_tol: f64,
    ) -> Result<EntryUpdate, PresolveError> {
        match self.cols.get(col, row) {
            None => {
                if delta.abs() < drop_tol {
                    // A vanishing delta on a missing entry stays structurally
                    // absent.
                    return Ok(EntryUpdate::Cancelled { old: 0.0 });
                }
                self.insert(row, col, delta)?;
                Ok(EntryUpdate::Created)
            }
            Some(old) => {
                let merged = old + delta;
                if merged.abs() < drop_tol {
                    self.delete(row, col);
                    Ok(EntryUpdate::Cancelled { old })
                } else {
                    self.cols.set(col, row, merged);
                    self.rows.set(row, col, merged);
                    Ok(EntryUpdate::Updated { old })
                }
            }
        }
    }

    /// Delete every entry of `row` from both views, returning (col, value)
    /// pairs in thread order.
    pub fn delete_row(&mut self, row: usize) -> Vec<(usize, f64)> {
        let entries = self.rows.drain_major(row);
        for &(col, _) in &entries {
            let removed = self.cols.remove(col, row);
            debug_assert!(removed.is_some(), "views disagree at ({row},{col})");
        }
        entries
    }

    /// Delete every entry of `col` from both views, returning (row, value)
    /// pairs in thread order.
    pub fn delete_col(&mut self, col: usize) -> Vec<(usize, f64)> {
        let entries = self.cols.drain_major(col);
        for &(row, _) in &entries {
            let removed = self.rows.remove(row, col);
            debug_assert!(removed.is_some(), "views disagree at ({row},{col})");
        }
        entries
    }

    /// Batched deletion: remove from `row` every entry whose column is
    /// flagged in `marked`, in one walk of the row thread. Returns the
    /// removed (col, value) pairs. Used when many columns are emptied out of
    /// one row at once, to avoid one full row scan per column.
    pub fn delete_marked_in_row(&mut self, row: usize, marked: &[bool]) -> Vec<(usize, f64)> {
        let hits: Vec<(usize, f64)> = self
            .rows
            .iter_major(row)
            .filter(|&(col, _)| marked[col])
            .collect();
        for &(col, _) in &hits {
            self.rows.remove(row, col);
            let removed = self.cols.remove(col, row);
            debug_assert!(removed.is_some(), "views disagree at ({row},{col})");
        }
        hits
    }

    /// Iterate the entries of `col` as (row, value) in thread order.
    pub fn iter_col(&self, col: usize) -> MajorIter<'_> {
        self.cols.iter_major(col)
    }

    /// Iterate the entries of `row` as (col, value) in thread order.
    pub fn iter_row(&self, row: usize) -> MajorIter<'_> {
        self.rows.iter_major(row)
    }

    /// Deep-copy column `col` sorted by row, optionally excluding one row.
    pub fn col_vector(&self, col: usize, skip_row: Option<usize>) -> Vec<(usize, f64)> {
        self.cols.vector(col, skip_row)
    }

    /// Deep-copy row `row` sorted by column, optionally excluding one column.
    pub fn row_vector(&self, row: usize, skip_col: Option<usize>) -> Vec<(usize, f64)> {
        self.rows.vector(row, skip_col)
    }

    /// Structural consistency check: every entry of one view must appear in
    /// the other with the same value. Debug builds only; release builds
    /// compile this to nothing.
    pub fn assert_consistent(&self) {
        #[cfg(debug_assertions)]
        {
            let mut col_entries = 0;
            for col in 0..self.ncols() {
                let mut seen = 0;
                for (row, value) in self.cols.iter_major(col) {
                    seen += 1;
                    let mirror = self.rows.get(row, col);
                    debug_assert_eq!(
                        mirror,
                        Some(value),
                        "column view entry ({row},{col})={value} missing from row view"
                    );
                }
                debug_assert_eq!(seen, self.cols.count(col), "bad count for column {col}");
                col_entries += seen;
            }
            let mut row_entries = 0;
            for row in 0..self.nrows() {
                let mut seen = 0;
                for (col, value) in self.rows.iter_major(row) {
                    seen += 1;
                    let mirror = self.cols.get(col, row);
                    debug_assert_eq!(
                        mirror,
                        Some(value),
                        "row view entry ({row},{col})={value} missing from column view"
                    );
                }
                debug_assert_eq!(seen, self.rows.count(row), "bad count for row {row}");
                row_entries += seen;
            }
            debug_assert_eq!(col_entries, row_entries);
        }
    }
}
