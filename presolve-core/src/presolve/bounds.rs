//! Bounds, costs and the bound-tightening numeric policy.
//!
//! Every rule that computes a new bound goes through [`tighten_col_lower`] /
//! [`tighten_col_upper`]: results are snapped to the existing bound or the
//! nearest integer when within tolerance (so epsilon drift cannot accumulate
//! across passes), magnitudes beyond the infinity threshold become the
//! canonical `±f64::INFINITY` sentinel, and opposing tightenings that cross
//! by less than the feasibility tolerance collapse to a single fixed value
//! instead of reporting infeasibility.

use crate::problem::{LpProblem, PresolveSettings};

/// Per-column and per-row bound/cost state for the active problem.
#[derive(Debug, Clone)]
pub struct BoundsAndCosts {
    pub col_lower: Vec<f64>,
    pub col_upper: Vec<f64>,
    /// Objective in the internal minimization convention
    pub cost: Vec<f64>,
    pub integer: Vec<bool>,
    pub row_lower: Vec<f64>,
    pub row_upper: Vec<f64>,
}

impl BoundsAndCosts {
    /// Ingest a problem: canonicalize infinities and fold the objective sense
    /// into the cost vector.
    pub fn from_problem(prob: &LpProblem, settings: &PresolveSettings) -> Self {
        let clamp = |v: f64| {
            if v <= -settings.infinity {
                f64::NEG_INFINITY
            } else if v >= settings.infinity {
                f64::INFINITY
            } else {
                v
            }
        };
        let sense = prob.sense.multiplier();
        Self {
            col_lower: prob.col_lower.iter().map(|&v| clamp(v)).collect(),
            col_upper: prob.col_upper.iter().map(|&v| clamp(v)).collect(),
            cost: prob.cost.iter().map(|&c| sense * c).collect(),
            integer: match &prob.integrality {
                Some(types) => types.iter().map(|t| t.is_integer()).collect(),
                None => vec![false; prob.num_cols()],
            },
            row_lower: prob.row_lower.iter().map(|&v| clamp(v)).collect(),
            row_upper: prob.row_upper.iter().map(|&v| clamp(v)).collect(),
        }
    }

    /// Whether column `col` is fixed within `tol`.
    pub fn is_fixed(&self, col: usize, tol: f64) -> bool {
        self.col_upper[col].is_finite()
            && self.col_lower[col].is_finite()
            && self.col_upper[col] - self.col_lower[col] <= tol
    }

    /// Whether row `row` is an equality within `tol`.
    pub fn is_equality_row(&self, row: usize, tol: f64) -> bool {
        self.row_upper[row].is_finite()
            && self.row_lower[row].is_finite()
            && self.row_upper[row] - self.row_lower[row] <= tol
    }
}

/// Outcome of a bound tightening attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tighten {
    /// The candidate did not improve on the existing bound
    Unchanged,
    /// The bound moved
    Tightened,
    /// The tightening crossed the opposite bound within tolerance; both
    /// bounds were collapsed to one value
    Fixed,
    /// The tightening crossed the opposite bound beyond tolerance
    Infeasible,
}

/// Shift a row bound by `delta`, leaving infinite bounds untouched.
pub fn shift_finite(bound: f64, delta: f64) -> f64 {
    if bound.is_finite() {
        bound - delta
    } else {
        bound
    }
}

fn snap_integer_lower(candidate: f64, tol: f64) -> f64 {
    let rounded = candidate.round();
    if (candidate - rounded).abs() <= tol {
        rounded
    } else {
        candidate.ceil()
    }
}

fn snap_integer_upper(candidate: f64, tol: f64) -> f64 {
    let rounded = candidate.round();
    if (candidate - rounded).abs() <= tol {
        rounded
    } else {
        candidate.floor()
    }
}

/// Try to raise the lower bound of `col` to `candidate`.
pub fn tighten_col_lower(
    bc: &mut BoundsAndCosts,
    col: usize,
    candidate: f64,
    settings: &PresolveSettings,
) -> Tighten {
    let mut candidate = candidate;
    if candidate <= -settings.infinity || candidate == f64::NEG_INFINITY {
        return Tighten::Unchanged;
    }
    if candidate >= settings.infinity {
        candidate = f64::INFINITY;
    }
    let tol = settings.feas_tol;
    let lower = bc.col_lower[col];
    let upper = bc.col_upper[col];

    // Snap to the existing bounds before anything else.
    if lower.is_finite() && (candidate - lower).abs() <= tol {
        return Tighten::Unchanged;
    }
    if upper.is_finite() && (candidate - upper).abs() <= tol {
        candidate = upper;
    }
    if bc.integer[col] && candidate.is_finite() {
        candidate = snap_integer_lower(candidate, tol);
    }
    if candidate <= lower {
        return Tighten::Unchanged;
    }
    if candidate > upper {
        if candidate - upper <= tol {
            let fixed = if bc.integer[col] { upper.round() } else { upper };
            bc.col_lower[col] = fixed;
            bc.col_upper[col] = fixed;
            return Tighten::Fixed;
        }
        return Tighten::Infeasible;
    }
    bc.col_lower[col] = candidate;
    if candidate >= upper {
        Tighten::Fixed
    } else {
        Tighten::Tightened
    }
}

/// Try to lower the upper bound of `col` to `candidate`.
pub fn tighten_col_upper(
    bc: &mut BoundsAndCosts,
    col: usize,
    candidate: f64,
    settings: &PresolveSettings,
) -> Tighten {
    let mut candidate = candidate;
    if candidate >= settings.infinity || candidate == f64::INFINITY {
        return Tighten::Unchanged;
    }
    if candidate <= -settings.infinity {
        candidate = f64::NEG_INFINITY;
    }
    let tol = settings.feas_tol;
    let lower = bc.col_lower[col];
    let upper = bc.col_upper[col];

    if upper.is_finite() && (candidate - upper).abs() <= tol {
        return Tighten::Unchanged;
    }
    if lower.is_finite() && (candidate - lower).abs() <= tol {
        candidate = lower;
    }
    if bc.integer[col] && candidate.is_finite() {
        candidate = snap_integer_upper(candidate, tol);
    }
    if candidate >= upper {
        return Tighten::Unchanged;
    }
    if candidate < lower {
        if lower - candidate <= tol {
            let fixed = if bc.integer[col] { lower.round() } else { lower };
            bc.col_lower[col] = fixed;
            bc.col_upper[col] = fixed;
            return Tighten::Fixed;
        }
        return Tighten::Infeasible;
    }
    bc.col_upper[col] = candidate;
    if candidate <= lower {
        Tighten::Fixed
    } else {
        Tighten::Tightened
    }
}
