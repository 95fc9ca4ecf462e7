//! Undo records for every reduction.
//!
//! Each record is a closed snapshot of "what changed and what it used to be",
//! tagged by the rule that produced it and owning exactly the arrays needed
//! to invert itself. The log is LIFO: records are pushed as rules fire and
//! replayed newest-first during postsolve, since later reductions were built
//! on the assumption that earlier ones had already fired.

/// One row touched by a fixed-variable removal: the coefficient that was
/// deleted and the row bounds before the right-hand-side shift.
#[derive(Debug, Clone)]
pub struct FixedRowEntry {
    pub row: usize,
    pub coeff: f64,
    pub old_lower: f64,
    pub old_upper: f64,
}

/// One variable pinned by a forcing constraint.
#[derive(Debug, Clone)]
pub struct ForcedVar {
    pub col: usize,
    pub old_lower: f64,
    pub old_upper: f64,
    /// Whether the variable was fixed at its upper bound
    pub at_upper: bool,
}

/// A reduction's undo record.
#[derive(Debug, Clone)]
pub enum TransformRecord {
    /// Entries purged for being numerically zero; postsolve reinserts
    /// explicit zeros so entry counts round-trip exactly.
    ZeroDrop {
        /// (row, col) positions of the purged entries
        entries: Vec<(usize, usize)>,
    },

    /// A row with no remaining entries was dropped.
    EmptyRow {
        row: usize,
        lower: f64,
        upper: f64,
    },

    /// A column with no remaining entries was dropped at `value`.
    EmptyCol {
        col: usize,
        lower: f64,
        upper: f64,
        cost: f64,
        value: f64,
    },

    /// A row with one nonzero implied a bound on its variable and was
    /// dropped; the column bounds before the intersection are kept.
    SingletonRow {
        row: usize,
        col: usize,
        coeff: f64,
        row_lower: f64,
        row_upper: f64,
        old_col_lower: f64,
        old_col_upper: f64,
    },

    /// A zero-cost column with one nonzero was dropped and its contribution
    /// folded into the row bounds.
    SlackSingleton {
        col: usize,
        row: usize,
        coeff: f64,
        col_lower: f64,
        col_upper: f64,
        old_row_lower: f64,
        old_row_upper: f64,
    },

    /// A column's bounds were collapsed onto one of its existing bounds
    /// (duplicate-column case analysis or dual-fix).
    FixedAtBound {
        col: usize,
        old_lower: f64,
        old_upper: f64,
        at_upper: bool,
    },

    /// A fixed column was removed and each containing row's bounds shifted
    /// by `-value * coeff`.
    FixedRemoval {
        col: usize,
        value: f64,
        cost: f64,
        lower: f64,
        upper: f64,
        entries: Vec<FixedRowEntry>,
    },

    /// An equality row with two nonzeros eliminated one variable by
    /// substitution. The shorter of the two columns is stored; the other is
    /// regenerated from the doubleton relation during postsolve.
    Doubleton {
        row: usize,
        rhs: f64,
        keep_col: usize,
        elim_col: usize,
        keep_coeff: f64,
        elim_coeff: f64,
        old_keep_lower: f64,
        old_keep_upper: f64,
        old_keep_cost: f64,
        elim_lower: f64,
        elim_upper: f64,
        elim_cost: f64,
        /// Whether `saved` holds the eliminated column (else the kept one),
        /// excluding the doubleton row itself
        saved_is_elim: bool,
        saved: Vec<(usize, f64)>,
        /// Bounds of every other row containing the eliminated column before
        /// the right-hand-side shift
        old_row_bounds: Vec<(usize, f64, f64)>,
    },

    /// An equality row with three nonzeros eliminated one implied-free
    /// variable by substitution into the two survivors.
    Tripleton {
        row: usize,
        rhs: f64,
        elim_col: usize,
        elim_coeff: f64,
        elim_lower: f64,
        elim_upper: f64,
        elim_cost: f64,
        /// The two surviving (col, coeff) pairs of the row
        keep: [(usize, f64); 2],
        /// Survivors' objective coefficients before redistribution
        old_keep_cost: [f64; 2],
        /// The eliminated column excluding the tripleton row
        saved_elim: Vec<(usize, f64)>,
        old_row_bounds: Vec<(usize, f64, f64)>,
    },

    /// A row whose implied activity touched one of its bounds forced every
    /// variable to a specific bound; the row was then dropped.
    ForcingRow {
        row: usize,
        row_lower: f64,
        row_upper: f64,
        /// Whether the implied activity touched the row lower bound
        at_lower: bool,
        entries: Vec<(usize, f64)>,
        fixed: Vec<ForcedVar>,
    },

    /// A row whose implied activity can never leave its stated bounds.
    UselessRow {
        row: usize,
        row_lower: f64,
        row_upper: f64,
        entries: Vec<(usize, f64)>,
    },

    /// Two structurally identical rows were merged into the tighter one.
    DupRow {
        kept: usize,
        dropped: usize,
        old_kept_lower: f64,
        old_kept_upper: f64,
        dropped_lower: f64,
        dropped_upper: f64,
        /// The dropped row's entries (identical to the kept row's)
        entries: Vec<(usize, f64)>,
    },

    /// Two structurally identical columns with equal cost were merged.
    DupCol {
        kept: usize,
        dropped: usize,
        cost: f64,
        old_kept_lower: f64,
        old_kept_upper: f64,
        dropped_lower: f64,
        dropped_upper: f64,
        /// The shared column pattern as (row, value)
        entries: Vec<(usize, f64)>,
    },

    /// An implied-free column was substituted out of every row it appeared
    /// in, using one of its equality rows as the definition.
    ImpliedFree {
        col: usize,
        row: usize,
        rhs: f64,
        coeff: f64,
        col_lower: f64,
        col_upper: f64,
        col_cost: f64,
        /// The pivot row excluding `col`
        row_entries: Vec<(usize, f64)>,
        /// The pivot column excluding `row`
        col_entries: Vec<(usize, f64)>,
        /// Partners' objective coefficients before cost redistribution
        old_costs: Vec<(usize, f64)>,
        old_row_bounds: Vec<(usize, f64, f64)>,
    },
}

impl TransformRecord {
    /// Short rule name, for verbose logging.
    pub fn rule_name(&self) -> &'static str {
        match self {
            TransformRecord::ZeroDrop { .. } => "zero_drop",
            TransformRecord::EmptyRow { .. } => "empty_row",
            TransformRecord::EmptyCol { .. } => "empty_col",
            TransformRecord::SingletonRow { .. } => "singleton_row",
            TransformRecord::SlackSingleton { .. } => "slack_singleton",
            TransformRecord::FixedAtBound { .. } => "fixed_at_bound",
            TransformRecord::FixedRemoval { .. } => "fixed_removal",
            TransformRecord::Doubleton { .. } => "doubleton",
            TransformRecord::Tripleton { .. } => "tripleton",
            TransformRecord::ForcingRow { .. } => "forcing_row",
            TransformRecord::UselessRow { .. } => "useless_row",
            TransformRecord::DupRow { .. } => "dup_row",
            TransformRecord::DupCol { .. } => "dup_col",
            TransformRecord::ImpliedFree { .. } => "implied_free",
        }
    }
}

/// LIFO log of reductions: pushed during presolve, walked newest-first
/// during postsolve.
#[derive(Debug, Clone, Default)]
pub struct TransformLog {
    records: Vec<TransformRecord>,
}

impl TransformLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record (it becomes the newest).
    pub fn push(&mut self, record: TransformRecord) {
        self.records.push(record);
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the log holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Walk the records newest-first, the order postsolve must undo them in.
    pub fn iter_undo(&self) -> impl Iterator<Item = &TransformRecord> {
        self.records.iter().rev()
    }
}
