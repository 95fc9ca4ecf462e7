//! LP/MIP presolve and postsolve engine
//!
//! This library reduces linear (and mixed-integer) programs before they are
//! handed to a solver, and expands the solver's answer back to the original
//! problem afterwards. Reductions implemented:
//!
//! - **Singleton rows / columns**: direct bound intersection, slack folding
//! - **Fixed-variable removal**: batched right-hand-side shifts
//! - **Doubleton / tripleton elimination**: equality-row substitution
//! - **Forcing / useless constraints**: implied-activity classification
//! - **Duplicate rows / columns**: deterministic randomized-sum bucketing
//! - **Implied-free substitution**: fill-level-limited column elimination
//! - **Dual-fix**: reduced-cost sign analysis over propagated dual bounds
//!
//! Every reduction pushes an undo record onto a LIFO transform log;
//! postsolve replays the log newest-first, restoring primal values, duals,
//! reduced costs and simplex basis status alongside the matrix itself.
//!
//! # Example
//!
//! ```ignore
//! use presolve_core::{presolve, postsolve, LpProblem, PresolveSettings};
//!
//! let prob: LpProblem = /* sparse constraint data */;
//! let settings = PresolveSettings::default();
//!
//! let reduced = presolve(&prob, &settings)?;
//! let reduced_solution = /* solve reduced.problem with any LP solver */;
//! let solution = postsolve(&reduced, &reduced_solution)?;
//!
//! println!("x = {:?}", solution.x);
//! ```
//!
//! # Conventions
//!
//! Internally everything is minimization with `dj = c_j - y^T a_j` and a
//! positive row dual meaning the row binds at its lower bound; maximization
//! problems are converted at the boundary in both directions. Bounds with
//! magnitude at or beyond the configured infinity threshold are treated as
//! absent.

#![warn(clippy::all)]

pub mod error;
pub mod matrix;
pub mod postsolve;
pub mod presolve;
pub mod problem;
pub mod transform;

pub use error::PresolveError;
pub use postsolve::postsolve;
pub use presolve::{presolve, Presolved};
pub use problem::{
    BasisStatus, LpProblem, ObjSense, PresolveSettings, PresolveStats, PresolveStatus,
    ReducedSolution, Solution, VarType,
};
