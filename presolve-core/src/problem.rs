//! Problem data structures and validation.
//!
//! This module defines the boundary representation exchanged with the
//! enclosing LP/MIP solver: a sparse constraint matrix with bounds, costs and
//! integrality flags on the way in, and solution/dual/basis arrays on the way
//! out. The engine's internal threaded matrix lives in [`crate::matrix`].

use std::fmt;

/// Sparse matrix in CSC format.
pub type SparseCsc = sprs::CsMat<f64>;

/// Linear program in bounded-row form.
///
/// The engine works with the formulation:
///
/// ```text
/// minimize (or maximize)  c^T x
/// subject to              rlo <= A x <= rup
///                         clo <=   x <= cup
/// ```
///
/// Bounds with magnitude at or beyond [`PresolveSettings::infinity`] are
/// treated as absent; they are canonicalized to `±f64::INFINITY` on
/// ingestion and never propagated through arithmetic as finite numbers.
///
/// # Dimensions
///
/// - `n`: number of columns (variables), the length of `cost`
/// - `m`: number of rows (constraints), the length of `row_lower`
/// - A: m × n in CSC
#[derive(Debug, Clone)]
pub struct LpProblem {
    /// Constraint matrix A (m × n, CSC format)
    pub a: SparseCsc,

    /// Per-column lower bounds (length n)
    pub col_lower: Vec<f64>,

    /// Per-column upper bounds (length n)
    pub col_upper: Vec<f64>,

    /// Objective coefficients (length n)
    pub cost: Vec<f64>,

    /// Optional integrality flags for mixed-integer problems
    pub integrality: Option<Vec<VarType>>,

    /// Per-row lower bounds (length m)
    pub row_lower: Vec<f64>,

    /// Per-row upper bounds (length m)
    pub row_upper: Vec<f64>,

    /// Optimization direction
    pub sense: ObjSense,

    /// Optional starting primal point (length n)
    pub primal: Option<Vec<f64>>,

    /// Optional starting column basis status (length n)
    pub col_status: Option<Vec<BasisStatus>>,

    /// Optional starting row basis status (length m)
    pub row_status: Option<Vec<BasisStatus>>,
}

/// Optimization direction, applied as a ±1 multiplier on the objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjSense {
    /// Minimize c^T x
    Minimize,
    /// Maximize c^T x
    Maximize,
}

impl ObjSense {
    /// The ±1 multiplier mapping this sense onto the internal minimization form.
    pub fn multiplier(self) -> f64 {
        match self {
            ObjSense::Minimize => 1.0,
            ObjSense::Maximize => -1.0,
        }
    }
}

/// Variable type for mixed-integer problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarType {
    /// Continuous variable
    Continuous,
    /// Integer variable
    Integer,
    /// Binary variable (0 or 1)
    Binary,
}

impl VarType {
    /// Whether this variable must take integer values.
    pub fn is_integer(self) -> bool {
        matches!(self, VarType::Integer | VarType::Binary)
    }
}

/// Simplex basis status of a variable or row.
///
/// For rows the status refers to the constraint itself: `AtLower` means the
/// activity sits at the row lower bound, `Basic` means the constraint is not
/// binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasisStatus {
    /// In the basis
    Basic,
    /// Nonbasic at the lower bound
    AtLower,
    /// Nonbasic at the upper bound
    AtUpper,
    /// Nonbasic free (superbasic)
    Free,
}

impl fmt::Display for BasisStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BasisStatus::Basic => write!(f, "basic"),
            BasisStatus::AtLower => write!(f, "at-lower"),
            BasisStatus::AtUpper => write!(f, "at-upper"),
            BasisStatus::Free => write!(f, "free"),
        }
    }
}

/// Outcome of a presolve run.
///
/// Primal infeasibility and dual infeasibility (possible unboundedness) are
/// kept distinct so the caller can tell "definitely infeasible" from
/// "possibly unbounded".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresolveStatus {
    /// No contradiction found; the reduced problem is equivalent
    Feasible,
    /// Some row or column bound set is provably empty beyond tolerance
    PrimalInfeasible,
    /// No valid dual can exist (a needed bound is missing); the primal is
    /// infeasible or unbounded
    DualInfeasible,
}

impl fmt::Display for PresolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresolveStatus::Feasible => write!(f, "Feasible"),
            PresolveStatus::PrimalInfeasible => write!(f, "Primal Infeasible"),
            PresolveStatus::DualInfeasible => write!(f, "Dual Infeasible / Unbounded"),
        }
    }
}

/// Presolve settings and tolerances.
#[derive(Debug, Clone)]
pub struct PresolveSettings {
    /// Feasibility tolerance for bound comparisons and crossing detection
    pub feas_tol: f64,

    /// Coefficients below this magnitude are structurally absent
    pub drop_tol: f64,

    /// Bounds at or beyond this magnitude are treated as infinite
    pub infinity: f64,

    /// Maximum number of outer driver passes
    pub max_passes: usize,

    /// Maximum dual bound propagation sweeps per dual-fix invocation
    pub dual_fix_passes: usize,

    /// Largest column length considered for implied-free substitution
    pub max_fill_level: usize,

    /// Retry implied-free substitution at the next fill level only when the
    /// previous level produced fewer substitutions than this
    pub substitution_retry_threshold: usize,

    /// Reject a substitution when the largest coefficient in the pivot row or
    /// column exceeds the pivot magnitude by more than this factor
    pub max_substitution_ratio: f64,

    /// Allow duplicate-column merging to consider integer columns
    pub dup_cols_integers: bool,

    /// Clamp row bounds instead of failing when a row's implied activity
    /// violates its stated bounds (escape hatch for marginal inputs)
    pub force_feasible: bool,

    /// Enable the singleton row / singleton column rules
    pub rule_singleton: bool,
    /// Enable fixed-variable removal
    pub rule_fixed: bool,
    /// Enable doubleton elimination
    pub rule_doubleton: bool,
    /// Enable tripleton elimination
    pub rule_tripleton: bool,
    /// Enable forcing / useless constraint detection
    pub rule_forcing: bool,
    /// Enable duplicate row detection
    pub rule_dup_rows: bool,
    /// Enable duplicate column detection
    pub rule_dup_cols: bool,
    /// Enable dual-fix (reduced-cost bound propagation)
    pub rule_dual_fix: bool,
    /// Enable implied-free substitution
    pub rule_implied_free: bool,

    /// Cap on total matrix slot storage per view (allocation failure beyond)
    pub slot_limit: usize,

    /// Print per-pass rule statistics to stderr
    pub verbose: bool,
}

impl Default for PresolveSettings {
    fn default() -> Self {
        Self {
            feas_tol: 1e-8,
            drop_tol: 1e-13,
            infinity: 1e30,
            max_passes: 5,
            dual_fix_passes: 100,
            max_fill_level: 3,
            substitution_retry_threshold: 30,
            max_substitution_ratio: 1e4,
            dup_cols_integers: false,
            force_feasible: false,
            rule_singleton: true,
            rule_fixed: true,
            rule_doubleton: true,
            rule_tripleton: true,
            rule_forcing: true,
            rule_dup_rows: true,
            rule_dup_cols: true,
            rule_dual_fix: true,
            rule_implied_free: true,
            slot_limit: usize::MAX / 4,
            verbose: false,
        }
    }
}

/// Counts of rule applications accumulated over a presolve run.
#[derive(Debug, Clone, Copy, Default)]
pub struct PresolveStats {
    pub singleton_rows: usize,
    pub slack_singletons: usize,
    pub fixed_removed: usize,
    pub doubletons: usize,
    pub tripletons: usize,
    pub forcing_rows: usize,
    pub useless_rows: usize,
    pub dup_rows: usize,
    pub dup_cols: usize,
    pub dual_fixes: usize,
    pub substitutions: usize,
    pub empty_rows: usize,
    pub empty_cols: usize,
    pub passes: usize,
}

impl PresolveStats {
    /// Total number of rule applications.
    pub fn total(&self) -> usize {
        self.singleton_rows
            + self.slack_singletons
            + self.fixed_removed
            + self.doubletons
            + self.tripletons
            + self.forcing_rows
            + self.useless_rows
            + self.dup_rows
            + self.dup_cols
            + self.dual_fixes
            + self.substitutions
            + self.empty_rows
            + self.empty_cols
    }
}

/// Optimal solution of the reduced problem, handed back for postsolve.
///
/// All arrays are sized to the reduced problem. Duals and reduced costs use
/// the minimization convention `dj = c_j - y^T a_j`, with `y > 0` meaning the
/// row binds at its lower bound; maximization problems are converted at the
/// boundary.
#[derive(Debug, Clone)]
pub struct ReducedSolution {
    /// Primal values (reduced n)
    pub x: Vec<f64>,
    /// Row activities A x (reduced m)
    pub row_activity: Vec<f64>,
    /// Row dual values (reduced m)
    pub duals: Vec<f64>,
    /// Reduced costs (reduced n)
    pub reduced_costs: Vec<f64>,
    /// Column basis status (reduced n)
    pub col_status: Vec<BasisStatus>,
    /// Row basis status (reduced m)
    pub row_status: Vec<BasisStatus>,
}

/// Solution arrays re-expanded to the original problem size.
#[derive(Debug, Clone)]
pub struct Solution {
    /// Primal values (original n)
    pub x: Vec<f64>,
    /// Row activities A x (original m)
    pub row_activity: Vec<f64>,
    /// Row dual values (original m)
    pub duals: Vec<f64>,
    /// Reduced costs (original n)
    pub reduced_costs: Vec<f64>,
    /// Column basis status (original n)
    pub col_status: Vec<BasisStatus>,
    /// Row basis status (original m)
    pub row_status: Vec<BasisStatus>,
}

impl LpProblem {
    /// Number of columns (variables).
    pub fn num_cols(&self) -> usize {
        self.cost.len()
    }

    /// Number of rows (constraints).
    pub fn num_rows(&self) -> usize {
        self.row_lower.len()
    }

    /// Validate problem dimensions and bound ordering.
    pub fn validate(&self) -> Result<(), String> {
        let n = self.num_cols();
        let m = self.num_rows();

        if !self.a.is_csc() {
            return Err("A must be in CSC format".to_string());
        }
        if self.a.rows() != m {
            return Err(format!("A has {} rows, expected {}", self.a.rows(), m));
        }
        if self.a.cols() != n {
            return Err(format!("A has {} cols, expected {}", self.a.cols(), n));
        }
        if self.col_lower.len() != n || self.col_upper.len() != n {
            return Err(format!(
                "column bounds have lengths {}/{}, expected {}",
                self.col_lower.len(),
                self.col_upper.len(),
                n
            ));
        }
        if self.row_upper.len() != m {
            return Err(format!(
                "row_upper has length {}, expected {}",
                self.row_upper.len(),
                m
            ));
        }
        for j in 0..n {
            if self.col_lower[j] > self.col_upper[j] {
                return Err(format!(
                    "column {} has lower bound {} > upper bound {}",
                    j, self.col_lower[j], self.col_upper[j]
                ));
            }
        }
        for i in 0..m {
            if self.row_lower[i] > self.row_upper[i] {
                return Err(format!(
                    "row {} has lower bound {} > upper bound {}",
                    i, self.row_lower[i], self.row_upper[i]
                ));
            }
        }
        if let Some(ref types) = self.integrality {
            if types.len() != n {
                return Err(format!(
                    "integrality vector has length {}, expected {}",
                    types.len(),
                    n
                ));
            }
        }
        if let Some(ref x) = self.primal {
            if x.len() != n {
                return Err(format!(
                    "starting primal has length {}, expected {}",
                    x.len(),
                    n
                ));
            }
        }
        if let Some(ref s) = self.col_status {
            if s.len() != n {
                return Err(format!(
                    "column status has length {}, expected {}",
                    s.len(),
                    n
                ));
            }
        }
        if let Some(ref s) = self.row_status {
            if s.len() != m {
                return Err(format!("row status has length {}, expected {}", s.len(), m));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_problem() -> LpProblem {
        let mut tri = sprs::TriMat::new((1, 2));
        tri.add_triplet(0, 0, 1.0);
        tri.add_triplet(0, 1, 1.0);
        LpProblem {
            a: tri.to_csc(),
            col_lower: vec![0.0, 0.0],
            col_upper: vec![1.0, 1.0],
            cost: vec![1.0, 2.0],
            integrality: None,
            row_lower: vec![1.0],
            row_upper: vec![1.0],
            sense: ObjSense::Minimize,
            primal: None,
            col_status: None,
            row_status: None,
        }
    }

    #[test]
    fn test_validate_ok() {
        assert!(tiny_problem().validate().is_ok());
    }

    #[test]
    fn test_validate_crossed_bounds() {
        let mut prob = tiny_problem();
        prob.col_lower[0] = 2.0;
        assert!(prob.validate().is_err());
    }

    #[test]
    fn test_validate_dimension_mismatch() {
        let mut prob = tiny_problem();
        prob.row_upper.push(0.0);
        assert!(prob.validate().is_err());
    }

    #[test]
    fn test_sense_multiplier() {
        assert_eq!(ObjSense::Minimize.multiplier(), 1.0);
        assert_eq!(ObjSense::Maximize.multiplier(), -1.0);
    }
}
