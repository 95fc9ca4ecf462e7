//! Fixed-variable removal.
//!
//! A column whose bounds have collapsed is removed outright: each containing
//! row's bounds shift by `-value * coeff` and the objective picks up
//! `cost * value`. Deletion is batched per row so emptying many fixed
//! columns out of one row costs one row walk, not one per column.

use crate::error::PresolveError;
use crate::presolve::context::PresolveContext;
use crate::transform::{FixedRowEntry, TransformRecord};

/// Remove every queued column that is fixed within the feasibility tolerance.
pub(crate) fn remove_fixed(
    ctx: &mut PresolveContext,
    cols: &[usize],
) -> Result<usize, PresolveError> {
    let tol = ctx.settings.feas_tol;
    let mut fixed_cols: Vec<usize> = cols
        .iter()
        .copied()
        .filter(|&col| ctx.active_cols.contains(col) && ctx.bc.is_fixed(col, tol))
        .collect();
    if fixed_cols.is_empty() {
        return Ok(0);
    }
    fixed_cols.sort_unstable();
    fixed_cols.dedup();

    // Batched deletion: walk each affected row once, stripping every marked
    // column, then apply the bound shifts column by column in a fixed order
    // so each record snapshots the row bounds as they were just before its
    // own shift.
    let mut marked = vec![false; ctx.mat.ncols()];
    for &col in &fixed_cols {
        marked[col] = true;
    }
    let mut removed: Vec<Vec<(usize, f64)>> = vec![Vec::new(); fixed_cols.len()];
    let mut slot_of = vec![usize::MAX; ctx.mat.ncols()];
    for (k, &col) in fixed_cols.iter().enumerate() {
        slot_of[col] = k;
    }
    let affected_rows: Vec<usize> = {
        let mut rows: Vec<usize> = fixed_cols
            .iter()
            .flat_map(|&col| ctx.mat.col_vector(col, None))
            .map(|(row, _)| row)
            .collect();
        rows.sort_unstable();
        rows.dedup();
        rows
    };
    for &row in &affected_rows {
        for (col, coeff) in ctx.mat.delete_marked_in_row(row, &marked) {
            removed[slot_of[col]].push((row, coeff));
        }
    }

    let mut applied = 0;
    for (k, &col) in fixed_cols.iter().enumerate() {
        let lower = ctx.bc.col_lower[col];
        let upper = ctx.bc.col_upper[col];
        let value = lower;
        let cost = ctx.bc.cost[col];

        let mut entries = Vec::with_capacity(removed[k].len());
        for &(row, coeff) in &removed[k] {
            let old_lower = ctx.bc.row_lower[row];
            let old_upper = ctx.bc.row_upper[row];
            let shift = coeff * value;
            ctx.bc.row_lower[row] = if old_lower.is_finite() {
                old_lower - shift
            } else {
                old_lower
            };
            ctx.bc.row_upper[row] = if old_upper.is_finite() {
                old_upper - shift
            } else {
                old_upper
            };
            ctx.row_queue.push(row);
            entries.push(FixedRowEntry {
                row,
                coeff,
                old_lower,
                old_upper,
            });
        }

        ctx.obj_offset += cost * value;
        ctx.active_cols.remove(col);
        ctx.log.push(TransformRecord::FixedRemoval {
            col,
            value,
            cost,
            lower,
            upper,
            entries,
        });
        ctx.stats.fixed_removed += 1;
        applied += 1;
    }
    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{LpProblem, ObjSense, PresolveSettings};

    fn problem() -> LpProblem {
        // Row 0: 2 x0 + x1 in [1, 5]
        // Row 1: 3 x0 - x2 in [0, 2]
        // x0 fixed at 3.5.
        let mut tri = sprs::TriMat::new((2, 3));
        tri.add_triplet(0, 0, 2.0);
        tri.add_triplet(0, 1, 1.0);
        tri.add_triplet(1, 0, 3.0);
        tri.add_triplet(1, 2, -1.0);
        LpProblem {
            a: tri.to_csc(),
            col_lower: vec![3.5, 0.0, 0.0],
            col_upper: vec![3.5, 10.0, 10.0],
            cost: vec![2.0, 1.0, 0.0],
            integrality: None,
            row_lower: vec![1.0, 0.0],
            row_upper: vec![5.0, 2.0],
            sense: ObjSense::Minimize,
            primal: None,
            col_status: None,
            row_status: None,
        }
    }

    #[test]
    fn test_fixed_removal_shifts_rows() {
        let settings = PresolveSettings::default();
        let mut ctx = PresolveContext::new(&problem(), &settings).unwrap();
        let n = remove_fixed(&mut ctx, &[0, 1]).unwrap();
        assert_eq!(n, 1);
        assert!(!ctx.active_cols.contains(0));
        // Row 0 shifts by -2*3.5, row 1 by -3*3.5.
        assert_eq!(ctx.bc.row_lower[0], 1.0 - 7.0);
        assert_eq!(ctx.bc.row_upper[0], 5.0 - 7.0);
        assert_eq!(ctx.bc.row_lower[1], 0.0 - 10.5);
        assert_eq!(ctx.bc.row_upper[1], 2.0 - 10.5);
        assert_eq!(ctx.obj_offset, 7.0);
        assert_eq!(ctx.mat.row_count(0), 1);
        assert_eq!(ctx.mat.row_count(1), 1);
        ctx.mat.assert_consistent();
    }

    #[test]
    fn test_infinite_row_bound_not_shifted() {
        let mut prob = problem();
        prob.row_upper[1] = f64::INFINITY;
        let settings = PresolveSettings::default();
        let mut ctx = PresolveContext::new(&prob, &settings).unwrap();
        remove_fixed(&mut ctx, &[0]).unwrap();
        assert!(ctx.bc.row_upper[1].is_infinite());
        assert_eq!(ctx.bc.row_lower[1], -10.5);
    }

    #[test]
    fn test_two_fixed_cols_one_row_batched() {
        // Both x0 and x1 fixed, sharing row 0: record bounds must chain so
        // the LIFO undo restores the original bounds exactly.
        let mut prob = problem();
        prob.col_lower[1] = 2.0;
        prob.col_upper[1] = 2.0;
        let settings = PresolveSettings::default();
        let mut ctx = PresolveContext::new(&prob, &settings).unwrap();
        let n = remove_fixed(&mut ctx, &[1, 0]).unwrap();
        assert_eq!(n, 2);
        // Row 0 shifted by both: 1 - 7 - 2 = -8.
        assert_eq!(ctx.bc.row_lower[0], -8.0);
        assert_eq!(ctx.mat.row_count(0), 0);
        // Two records, the later one snapshotting the intermediate bounds.
        assert_eq!(ctx.log.len(), 2);
    }
}
