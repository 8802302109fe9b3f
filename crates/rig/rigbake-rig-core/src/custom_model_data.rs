//! Custom Model Data allocation.
//!
//! One allocator is owned by each export pass and handed down explicitly, so independent
//! exports never share a counter.

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

/// Monotonic counter that skips IDs reserved by other rigs.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct CustomModelDataAllocator {
    current: u32,
    used_ids: HashSet<u32>,
}

impl CustomModelDataAllocator {
    pub fn new(start: u32) -> Self {
        Self {
            current: start,
            used_ids: HashSet::new(),
        }
    }

    pub fn with_used_ids(start: u32, used: impl IntoIterator<Item = u32>) -> Self {
        Self {
            current: start,
            used_ids: used.into_iter().collect(),
        }
    }

    /// Mark an ID as taken by someone else.
    pub fn reserve(&mut self, id: u32) {
        self.used_ids.insert(id);
    }

    pub fn is_reserved(&self, id: u32) -> bool {
        self.used_ids.contains(&id)
    }

    /// The next candidate, before skipping reserved IDs.
    #[inline]
    pub fn current(&self) -> u32 {
        self.current
    }

    /// Next unused ID at or above the counter; the counter moves past it.
    pub fn get(&mut self) -> u32 {
        while self.used_ids.contains(&self.current) {
            self.current = self.current.wrapping_add(1);
        }
        let id = self.current;
        self.current = self.current.wrapping_add(1);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_monotonic() {
        let mut alloc = CustomModelDataAllocator::new(10);
        let ids: Vec<u32> = (0..5).map(|_| alloc.get()).collect();
        assert_eq!(ids, vec![10, 11, 12, 13, 14]);
    }

    #[test]
    fn skips_reserved_ids() {
        let mut alloc = CustomModelDataAllocator::with_used_ids(0, [2, 3]);
        let ids: Vec<u32> = (0..3).map(|_| alloc.get()).collect();
        assert_eq!(ids, vec![0, 1, 4]);
        assert_eq!(alloc.current(), 5);
    }

    #[test]
    fn reserve_after_construction() {
        let mut alloc = CustomModelDataAllocator::new(1);
        alloc.reserve(1);
        assert!(alloc.is_reserved(1));
        assert_eq!(alloc.get(), 2);
    }
}
