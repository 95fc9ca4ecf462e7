//! Error types for the presolve engine.

use thiserror::Error;

/// Errors that can occur during presolve or postsolve.
///
/// Infeasibility and unboundedness are *not* errors: they are reported
/// through [`crate::problem::PresolveStatus`] so the caller can decide how to
/// react (report infeasibility, or re-solve without presolve). Only failures
/// that leave no usable result surface here.
#[derive(Error, Debug)]
pub enum PresolveError {
    /// Problem validation failed
    #[error("Invalid problem: {0}")]
    InvalidProblem(String),

    /// Bulk matrix storage could not grow any further. Fatal: once an
    /// expansion fails mid-transform the matrix state cannot be trusted.
    #[error("Matrix slot storage exhausted (limit {limit} slots)")]
    AllocationExhausted {
        /// Configured slot limit that was hit
        limit: usize,
    },

    /// Reduced solution arrays do not match the reduced problem's dimensions
    #[error("Reduced solution dimension mismatch: {0}")]
    DimensionMismatch(String),
}

/// Result type for presolve operations.
pub type Result<T> = std::result::Result<T, PresolveError>;
