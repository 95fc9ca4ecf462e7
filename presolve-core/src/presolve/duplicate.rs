//! Duplicate row and column detection.
//!
//! Each row and column index gets a pseudo-random weight from a fixed-seed
//! generator, so signatures are reproducible run to run. A vector's
//! signature is the weighted sum of its entries accumulated in ascending
//! index order; identical vectors therefore produce bitwise-identical
//! signatures and land in the same bucket. Bucket membership is only a
//! candidate filter: pairs are confirmed element by element before any
//! merge.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::PresolveError;
use crate::presolve::context::PresolveContext;
use crate::transform::TransformRecord;

const ROW_WEIGHT_SEED: u64 = 0x7265_6475_6365;
const COL_WEIGHT_SEED: u64 = 0x636f_6c75_6d6e;

fn weights(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n).map(|_| rng.gen_range(0.5..1.5)).collect()
}

/// Weighted sum of a sorted sparse vector, accumulated in index order so
/// identical vectors sum to bitwise-identical values.
fn signature(entries: &[(usize, f64)], w: &[f64]) -> f64 {
    let mut sum = 0.0;
    for &(i, v) in entries {
        sum += v * w[i];
    }
    sum
}

/// Group indices whose signatures are bitwise equal. `vectors` must be
/// sorted by minor index already.
fn buckets(sigs: &mut [(f64, usize)]) -> Vec<(usize, usize)> {
    sigs.sort_unstable_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    let mut ranges = Vec::new();
    let mut start = 0;
    for i in 1..=sigs.len() {
        if i == sigs.len() || sigs[i].0.to_bits() != sigs[start].0.to_bits() {
            if i - start > 1 {
                ranges.push((start, i));
            }
            start = i;
        }
    }
    ranges
}

fn inf_aware_sum(a: f64, b: f64) -> f64 {
    if a.is_infinite() || b.is_infinite() {
        if a == f64::NEG_INFINITY || b == f64::NEG_INFINITY {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        }
    } else {
        a + b
    }
}

/// Detect and merge duplicate rows: identical coefficient vectors with
/// compatible bound intervals collapse into one row carrying the
/// intersection; disjoint intervals are primal infeasible.
pub(crate) fn dup_rows(ctx: &mut PresolveContext) -> Result<usize, PresolveError> {
    let tol = ctx.settings.feas_tol;
    let w = weights(ctx.mat.ncols(), COL_WEIGHT_SEED);

    let rows: Vec<usize> = ctx
        .active_rows
        .iter()
        .filter(|&r| ctx.mat.row_count(r) > 0)
        .collect();
    let mut vectors: Vec<Vec<(usize, f64)>> = Vec::with_capacity(rows.len());
    let mut sigs: Vec<(f64, usize)> = Vec::with_capacity(rows.len());
    for (k, &r) in rows.iter().enumerate() {
        let v = ctx.mat.row_vector(r, None);
        sigs.push((signature(&v, &w), k));
        vectors.push(v);
    }

    let mut applied = 0;
    for (start, end) in buckets(&mut sigs) {
        for i in start..end {
            let ki = sigs[i].1;
            if !ctx.active_rows.contains(rows[ki]) {
                continue;
            }
            for j in (i + 1)..end {
                if !ctx.feasible() {
                    return Ok(applied);
                }
                let kj = sigs[j].1;
                if !ctx.active_rows.contains(rows[kj]) || vectors[ki] != vectors[kj] {
                    continue;
                }
                let (kept, dropped) = (rows[ki].min(rows[kj]), rows[ki].max(rows[kj]));
                let old_kept_lower = ctx.bc.row_lower[kept];
                let old_kept_upper = ctx.bc.row_upper[kept];
                let dropped_lower = ctx.bc.row_lower[dropped];
                let dropped_upper = ctx.bc.row_upper[dropped];
                let new_lower = old_kept_lower.max(dropped_lower);
                let new_upper = old_kept_upper.min(dropped_upper);
                if new_lower > new_upper + tol {
                    ctx.set_primal_infeasible();
                    return Ok(applied);
                }
                ctx.bc.row_lower[kept] = new_lower;
                ctx.bc.row_upper[kept] = new_upper.max(new_lower);
                let entries = ctx.drop_row(dropped);
                ctx.row_queue.push(kept);
                ctx.log.push(TransformRecord::DupRow {
                    kept,
                    dropped,
                    old_kept_lower,
                    old_kept_upper,
                    dropped_lower,
                    dropped_upper,
                    entries,
                });
                ctx.stats.dup_rows += 1;
                applied += 1;
                if dropped == rows[ki] {
                    break;
                }
            }
        }
    }
    Ok(applied)
}

/// Detect duplicate columns. Equal costs merge the pair into one column
/// whose bounds are the sums; unequal costs fix whichever variable can
/// never be preferred, or prove dual infeasibility when the preferred one
/// is unbounded in the improving direction.
pub(crate) fn dup_cols(ctx: &mut PresolveContext) -> Result<usize, PresolveError> {
    let w = weights(ctx.mat.nrows(), ROW_WEIGHT_SEED);
    let allow_integer = ctx.settings.dup_cols_integers;

    let cols: Vec<usize> = ctx
        .active_cols
        .iter()
        .filter(|&c| ctx.mat.col_count(c) > 0 && (allow_integer || !ctx.bc.integer[c]))
        .collect();
    let mut vectors: Vec<Vec<(usize, f64)>> = Vec::with_capacity(cols.len());
    let mut sigs: Vec<(f64, usize)> = Vec::with_capacity(cols.len());
    for (k, &c) in cols.iter().enumerate() {
        let v = ctx.mat.col_vector(c, None);
        sigs.push((signature(&v, &w), k));
        vectors.push(v);
    }

    let mut applied = 0;
    for (start, end) in buckets(&mut sigs) {
        for i in start..end {
            let ki = sigs[i].1;
            if !ctx.active_cols.contains(cols[ki]) {
                continue;
            }
            for j in (i + 1)..end {
                if !ctx.feasible() {
                    return Ok(applied);
                }
                let kj = sigs[j].1;
                if !ctx.active_cols.contains(cols[kj]) || vectors[ki] != vectors[kj] {
                    continue;
                }
                if merge_pair(ctx, cols[ki], cols[kj]) {
                    ctx.stats.dup_cols += 1;
                    applied += 1;
                }
                if !ctx.active_cols.contains(cols[ki]) {
                    break;
                }
            }
        }
    }
    Ok(applied)
}

/// Resolve one confirmed duplicate pair. Returns true when a reduction was
/// recorded.
fn merge_pair(ctx: &mut PresolveContext, c1: usize, c2: usize) -> bool {
    let cost1 = ctx.bc.cost[c1];
    let cost2 = ctx.bc.cost[c2];

    if cost1 == cost2 {
        // Merge: the pair acts as one variable x1 + x2 with summed bounds.
        let (kept, dropped) = (c1, c2);
        let old_kept_lower = ctx.bc.col_lower[kept];
        let old_kept_upper = ctx.bc.col_upper[kept];
        let dropped_lower = ctx.bc.col_lower[dropped];
        let dropped_upper = ctx.bc.col_upper[dropped];
        ctx.bc.col_lower[kept] = inf_aware_sum(old_kept_lower, dropped_lower);
        ctx.bc.col_upper[kept] = inf_aware_sum(old_kept_upper, dropped_upper);
        let entries = ctx.drop_col(dropped);
        ctx.col_queue.push(kept);
        ctx.log.push(TransformRecord::DupCol {
            kept,
            dropped,
            cost: cost1,
            old_kept_lower,
            old_kept_upper,
            dropped_lower,
            dropped_upper,
            entries,
        });
        return true;
    }

    // Unequal costs: normalize so `cheap` is the preferred variable. Weight
    // can shift between the pair without changing any activity, so at an
    // optimum the expensive one sits at its lower bound or the cheap one at
    // its upper bound. Only two bound configurations are actionable: cheap
    // unbounded above (pin pricey at its lower bound, or dual infeasible if
    // that bound is missing too) and pricey unbounded below (pin cheap at
    // its upper bound). With cheap's upper and pricey's lower both finite,
    // either variable can end up strictly interior and no fix is valid; the
    // pair is deliberately left alone.
    let (cheap, pricey) = if cost1 < cost2 { (c1, c2) } else { (c2, c1) };
    if ctx.bc.col_upper[cheap] == f64::INFINITY {
        if ctx.bc.col_lower[pricey] == f64::NEG_INFINITY {
            ctx.set_dual_infeasible();
            return false;
        }
        fix_at(ctx, pricey, false);
        return true;
    }
    if ctx.bc.col_lower[pricey] == f64::NEG_INFINITY {
        fix_at(ctx, cheap, true);
        return true;
    }
    false
}

/// Fix a column at one of its (finite) bounds, leaving the matrix removal
/// to the fixed-variable rule.
fn fix_at(ctx: &mut PresolveContext, col: usize, at_upper: bool) {
    let old_lower = ctx.bc.col_lower[col];
    let old_upper = ctx.bc.col_upper[col];
    let value = if at_upper { old_upper } else { old_lower };
    ctx.bc.col_lower[col] = value;
    ctx.bc.col_upper[col] = value;
    ctx.col_queue.push(col);
    ctx.log.push(TransformRecord::FixedAtBound {
        col,
        old_lower,
        old_upper,
        at_upper,
    });
}
