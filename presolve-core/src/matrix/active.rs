//! Doubly linked membership threads for "rows/columns still present".
//!
//! Initialized once for the full original size. Entries are unlinked in O(1)
//! when a row or column is eliminated and never relinked during presolve;
//! postsolve reconstructs a same-size problem from scratch instead.

/// Doubly linked list over `0..n` with a sentinel at index `n`.
#[derive(Debug, Clone)]
pub struct ActiveList {
    next: Vec<usize>,
    prev: Vec<usize>,
    present: Vec<bool>,
    len: usize,
}

impl ActiveList {
    /// Create a list containing all of `0..n`.
    pub fn new(n: usize) -> Self {
        let mut next = Vec::with_capacity(n + 1);
        let mut prev = Vec::with_capacity(n + 1);
        for i in 0..=n {
            next.push(if i == n { 0 } else { i + 1 });
            prev.push(if i == 0 { n } else { i - 1 });
        }
        if n == 0 {
            next[0] = 0;
            prev[0] = 0;
        }
        Self {
            next,
            prev,
            present: vec![true; n],
            len: n,
        }
    }

    /// Number of members still linked.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no members remain.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether `i` is still linked.
    pub fn contains(&self, i: usize) -> bool {
        self.present[i]
    }

    /// Unlink `i` in O(1). Unlinking an absent member is a no-op.
    pub fn remove(&mut self, i: usize) {
        if !self.present[i] {
            return;
        }
        let (p, n) = (self.prev[i], self.next[i]);
        self.next[p] = n;
        self.prev[n] = p;
        self.present[i] = false;
        self.len -= 1;
    }

    /// Iterate the remaining members in ascending order.
    pub fn iter(&self) -> ActiveIter<'_> {
        let sentinel = self.present.len();
        ActiveIter {
            list: self,
            cur: self.next[sentinel],
            sentinel,
        }
    }
}

/// Iterator over the linked members.
pub struct ActiveIter<'a> {
    list: &'a ActiveList,
    cur: usize,
    sentinel: usize,
}

impl Iterator for ActiveIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.cur == self.sentinel {
            return None;
        }
        let item = self.cur;
        self.cur = self.list.next[item];
        Some(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_middle() {
        let mut list = ActiveList::new(5);
        assert_eq!(list.len(), 5);
        list.remove(2);
        assert!(!list.contains(2));
        assert_eq!(list.iter().collect::<Vec<_>>(), vec![0, 1, 3, 4]);
        // Removing twice is harmless.
        list.remove(2);
        assert_eq!(list.len(), 4);
    }

    #[test]
    fn test_remove_ends() {
        let mut list = ActiveList::new(3);
        list.remove(0);
        list.remove(2);
        assert_eq!(list.iter().collect::<Vec<_>>(), vec![1]);
        list.remove(1);
        assert!(list.is_empty());
        assert_eq!(list.iter().count(), 0);
    }

    #[test]
    fn test_empty_list() {
        let list = ActiveList::new(0);
        assert!(list.is_empty());
        assert_eq!(list.iter().count(), 0);
    }
}
