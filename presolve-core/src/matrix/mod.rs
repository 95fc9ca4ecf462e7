//! Threaded sparse matrix storage.
//!
//! The presolve engine keeps one logical matrix in two mirrored views, row
//! major and column major, each a set of singly linked (index, value) threads
//! embedded in a slot arena with a free list. Deletion unlinks in O(1) once
//! the entry is located and never compacts, so slot indices held by a caller
//! stay valid across unrelated mutations.

pub mod active;
pub mod arena;
pub mod pair;
pub mod threaded;

pub use active::ActiveList;
pub use pair::{EntryUpdate, SparseMatrixPair};
pub use threaded::ThreadedView;
