//! Slot arena backing the threaded matrix views.
//!
//! An arena of (minor index, value, next) slots linked by index rather than
//! pointer. Freed slots go on an embedded free list and are reused before the
//! arena grows. Growth past the configured limit is the engine's only
//! unrecoverable failure.

use crate::error::PresolveError;

/// Sentinel index terminating every thread.
pub(crate) const NIL: usize = usize::MAX;

#[derive(Debug, Clone, Copy)]
pub(crate) struct Slot {
    pub minor: usize,
    pub value: f64,
    pub next: usize,
}

/// Index-linked slot storage with an embedded free list.
#[derive(Debug, Clone)]
pub struct SlotArena {
    slots: Vec<Slot>,
    free_head: usize,
    limit: usize,
    live: usize,
}

impl SlotArena {
    /// Create an arena with room reserved for `hint` slots and a hard growth
    /// limit of `limit` slots.
    pub fn with_capacity(hint: usize, limit: usize) -> Self {
        Self {
            slots: Vec::with_capacity(hint),
            free_head: NIL,
            limit,
            live: 0,
        }
    }

    /// Number of live (allocated, not freed) slots.
    pub fn live(&self) -> usize {
        self.live
    }

    /// Allocate a slot, reusing the free list before growing.
    pub(crate) fn alloc(
        &mut self,
        minor: usize,
        value: f64,
        next: usize,
    ) -> Result<usize, PresolveError> {
        self.live += 1;
        if self.free_head != NIL {
            let idx = self.free_head;
            self.free_head = self.slots[idx].next;
            self.slots[idx] = Slot { minor, value, next };
            return Ok(idx);
        }
        if self.slots.len() >= self.limit {
            self.live -= 1;
            return Err(PresolveError::AllocationExhausted { limit: self.limit });
        }
        self.slots.push(Slot { minor, value, next });
        Ok(self.slots.len() - 1)
    }

    /// Return a slot to the free list. The slot must already be unlinked from
    /// its thread.
    pub(crate) fn release(&mut self, idx: usize) {
        debug_assert!(idx < self.slots.len());
        debug_assert_ne!(self.slots[idx].minor, NIL, "double free of slot {idx}");
        self.slots[idx] = Slot {
            minor: NIL,
            value: 0.0,
            next: self.free_head,
        };
        self.free_head = idx;
        self.live -= 1;
    }

    pub(crate) fn get(&self, idx: usize) -> &Slot {
        &self.slots[idx]
    }

    pub(crate) fn get_mut(&mut self, idx: usize) -> &mut Slot {
        &mut self.slots[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_release_reuse() {
        let mut arena = SlotArena::with_capacity(4, 16);
        let a = arena.alloc(1, 1.0, NIL).unwrap();
        let b = arena.alloc(2, 2.0, a).unwrap();
        assert_eq!(arena.live(), 2);
        assert_eq!(arena.get(b).next, a);

        arena.release(a);
        assert_eq!(arena.live(), 1);
        // Freed slot is handed out again before the arena grows.
        let c = arena.alloc(3, 3.0, NIL).unwrap();
        assert_eq!(c, a);
        assert_eq!(arena.get(c).minor, 3);
    }

    #[test]
    fn test_limit_exhaustion() {
        let mut arena = SlotArena::with_capacity(0, 2);
        arena.alloc(0, 1.0, NIL).unwrap();
        arena.alloc(1, 1.0, NIL).unwrap();
        let err = arena.alloc(2, 1.0, NIL).unwrap_err();
        assert!(matches!(
            err,
            PresolveError::AllocationExhausted { limit: 2 }
        ));
        // Releasing makes room again without growing.
        arena.release(0);
        assert!(arena.alloc(3, 1.0, NIL).is_ok());
    }
}
