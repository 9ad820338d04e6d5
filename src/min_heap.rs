use tracing::trace;

use crate::error::{HuffmanError, Result};

#[derive(Debug, Clone)]
struct Entry<T> {
    priority: u64,
    payload: T,
}

/// Binary min-heap over an implicit array. Positions are 1-based; position
/// `i` lives at `elements[i - 1]`.
#[derive(Debug, Clone)]
pub struct MinHeap<T> {
    elements: Vec<Entry<T>>,
}

impl<T> MinHeap<T> {
    pub fn new() -> Self {
        MinHeap { elements: vec![] }
    }

    /// Empty heap that holds at least `capacity` entries before growing.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut elements = Vec::new();
        elements
            .try_reserve_exact(capacity)
            .map_err(|_| HuffmanError::OutOfMemory {
                what: "priority queue",
                requested: capacity,
            })?;
        Ok(MinHeap { elements })
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.elements.capacity()
    }

    pub fn parent(&self, i: usize) -> usize {
        i / 2
    }

    pub fn left(&self, i: usize) -> usize {
        2 * i
    }

    pub fn right(&self, i: usize) -> usize {
        2 * i + 1
    }

    fn priority(&self, i: usize) -> u64 {
        self.elements[i - 1].priority
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.elements.swap(a - 1, b - 1);
    }

    pub fn valid_min_heap(&self) -> bool {
        (2..=self.len()).all(|i| self.priority(self.parent(i)) <= self.priority(i))
    }

    // capacity doubles when full
    fn grow(&mut self) -> Result<()> {
        if self.elements.len() < self.elements.capacity() {
            return Ok(());
        }
        let additional = self.elements.capacity().max(1);
        let requested = self.elements.capacity() + additional;
        self.elements
            .try_reserve_exact(additional)
            .map_err(|_| HuffmanError::OutOfMemory {
                what: "priority queue",
                requested,
            })?;
        trace!(capacity = self.elements.capacity(), "priority queue grew");
        Ok(())
    }

    pub fn push(&mut self, payload: T, priority: u64) -> Result<()> {
        self.grow()?;
        self.elements.push(Entry { priority, payload });

        let mut i = self.len();
        while i > 1 && self.priority(i) <= self.priority(self.parent(i)) {
            let p = self.parent(i);
            self.swap(i, p);
            i = p;
        }
        Ok(())
    }

    /// Removes the minimum-priority payload, or `None` once the heap is empty.
    pub fn pop(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let size = self.len();
        self.swap(1, size);
        let min = self.elements.pop()?;

        let n = self.len();
        let mut k = 1;
        while self.left(k) <= n {
            let mut j = self.left(k);
            if j < n && self.priority(j) >= self.priority(self.right(k)) {
                j = self.right(k);
            }
            if self.priority(k) < self.priority(j) {
                break;
            }
            self.swap(k, j);
            k = j;
        }
        Some(min.payload)
    }
}

impl<T> Default for MinHeap<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn pop_on_empty_heap_is_none() {
        let mut heap: MinHeap<&str> = MinHeap::new();
        assert!(heap.is_empty());
        assert!(heap.pop().is_none());
        heap.push("only", 3).unwrap();
        assert!(!heap.is_empty());
        assert_eq!(heap.pop(), Some("only"));
        assert!(heap.is_empty());
        assert!(heap.pop().is_none());
    }

    #[test]
    fn capacity_doubles_when_full() {
        let mut heap = MinHeap::with_capacity(1).unwrap();
        assert!(heap.capacity() >= 1);
        for i in 0..9u64 {
            heap.push(i, 9 - i).unwrap();
            assert!(heap.capacity() >= heap.len());
        }
        assert_eq!(heap.len(), 9);
        assert!(heap.valid_min_heap());
    }

    #[test]
    fn equal_priorities_pop_in_a_repeatable_order() {
        let order = |n: usize| {
            let mut heap = MinHeap::new();
            for i in 0..n {
                heap.push(i, 1).unwrap();
            }
            std::iter::from_fn(|| heap.pop()).collect::<Vec<_>>()
        };
        assert_eq!(order(7), order(7));
        // the last pushed tie climbs to the root
        assert_eq!(order(3), vec![2, 0, 1]);
    }

    proptest! {
        #[test]
        fn permutation_pops_sorted(
            priorities in Just((0..200u64).collect::<Vec<_>>()).prop_shuffle()
        ) {
            let mut heap = MinHeap::with_capacity(4).unwrap();
            for &p in &priorities {
                heap.push(p, p).unwrap();
            }
            prop_assert!(heap.valid_min_heap());
            let popped: Vec<u64> = std::iter::from_fn(|| heap.pop()).collect();
            prop_assert_eq!(popped, (0..200u64).collect::<Vec<_>>());
        }

        #[test]
        fn interleaved_push_pop_returns_current_minimum(
            ops in proptest::collection::vec(proptest::option::of(0..50u64), 1..300)
        ) {
            let mut heap = MinHeap::new();
            let mut reference: Vec<u64> = Vec::new();
            for op in ops {
                match op {
                    Some(p) => {
                        heap.push(p, p).unwrap();
                        reference.push(p);
                    }
                    None => {
                        reference.sort_unstable_by(|a, b| b.cmp(a));
                        prop_assert_eq!(heap.pop(), reference.pop());
                    }
                }
                prop_assert!(heap.valid_min_heap());
            }
        }
    }
}
