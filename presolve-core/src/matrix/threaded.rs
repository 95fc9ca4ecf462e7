//! One major-axis view of the matrix: a thread of (minor, value) slots per
//! major index, plus the live entry count. Insertion prepends; removal
//! unlinks and returns the slot to the arena's free list.

use crate::error::PresolveError;
use crate::matrix::arena::{SlotArena, NIL};

/// A single threaded view (row major or column major).
#[derive(Debug, Clone)]
pub struct ThreadedView {
    head: Vec<usize>,
    count: Vec<usize>,
    arena: SlotArena,
}

impl ThreadedView {
    /// Create an empty view with `n_major` threads.
    pub fn new(n_major: usize, nnz_hint: usize, slot_limit: usize) -> Self {
        Self {
            head: vec![NIL; n_major],
            count: vec![0; n_major],
            arena: SlotArena::with_capacity(nnz_hint, slot_limit),
        }
    }

    /// Number of major indices (threads).
    pub fn n_major(&self) -> usize {
        self.head.len()
    }

    /// Number of live entries in thread `major`.
    pub fn count(&self, major: usize) -> usize {
        self.count[major]
    }

    /// Total live entries across all threads.
    pub fn total_entries(&self) -> usize {
        self.arena.live()
    }

    /// Prepend an entry to thread `major`. The caller guarantees no entry for
    /// `minor` already exists in the thread.
    pub fn insert(&mut self, major: usize, minor: usize, value: f64) -> Result<(), PresolveError> {
        debug_assert!(self.get(major, minor).is_none(), "duplicate entry ({major},{minor})");
        let slot = self.arena.alloc(minor, value, self.head[major])?;
        self.head[major] = slot;
        self.count[major] += 1;
        Ok(())
    }

    /// Remove the entry for `minor` from thread `major`, returning its value.
    pub fn remove(&mut self, major: usize, minor: usize) -> Option<f64> {
        let mut prev = NIL;
        let mut cur = self.head[major];
        while cur != NIL {
            let slot = *self.arena.get(cur);
            if slot.minor == minor {
                if prev == NIL {
                    self.head[major] = slot.next;
                } else {
                    self.arena.get_mut(prev).next = slot.next;
                }
                self.arena.release(cur);
                self.count[major] -= 1;
                return Some(slot.value);
            }
            prev = cur;
            cur = slot.next;
        }
        None
    }

    /// Look up the value at (`major`, `minor`).
    pub fn get(&self, major: usize, minor: usize) -> Option<f64> {
        let mut cur = self.head[major];
        while cur != NIL {
            let slot = self.arena.get(cur);
            if slot.minor == minor {
                return Some(slot.value);
            }
            cur = slot.next;
        }
        None
    }

    /// Overwrite the value at (`major`, `minor`). Returns false when the
    /// entry does not exist.
    pub fn set(&mut self, major: usize, minor: usize, value: f64) -> bool {
        let mut cur = self.head[major];
        while cur != NIL {
            let slot = self.arena.get_mut(cur);
            if slot.minor == minor {
                slot.value = value;
                return true;
            }
            cur = slot.next;
        }
        false
    }

    /// Iterate the entries of thread `major` in thread order.
    pub fn iter_major(&self, major: usize) -> MajorIter<'_> {
        MajorIter {
            view: self,
            cur: self.head[major],
        }
    }

    /// Deep-copy thread `major` sorted by minor index, optionally excluding
    /// one minor. This is the snapshot primitive every rule uses before
    /// destroying a vector, and the local sort that makes comparisons between
    /// two vectors well defined regardless of thread order.
    pub fn vector(&self, major: usize, skip: Option<usize>) -> Vec<(usize, f64)> {
        let mut out = Vec::with_capacity(self.count[major]);
        for (minor, value) in self.iter_major(major) {
            if Some(minor) != skip {
                out.push((minor, value));
            }
        }
        out.sort_unstable_by_key(|&(minor, _)| minor);
        out
    }

    /// Remove every entry of thread `major`, returning them in thread order.
    pub fn drain_major(&mut self, major: usize) -> Vec<(usize, f64)> {
        let mut out = Vec::with_capacity(self.count[major]);
        let mut cur = self.head[major];
        while cur != NIL {
            let slot = *self.arena.get(cur);
            out.push((slot.minor, slot.value));
            self.arena.release(cur);
            cur = slot.next;
        }
        self.head[major] = NIL;
        self.count[major] = 0;
        out
    }
}

/// Iterator over one thread's (minor, value) entries.
pub struct MajorIter<'a> {
    view: &'a ThreadedView,
    cur: usize,
}

impl Iterator for MajorIter<'_> {
    type Item = (usize, f64);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cur == NIL {
            return None;
        }
        let slot = self.view.arena.get(self.cur);
        self.cur = slot.next;
        Some((slot.minor, slot.value))
    }
}
