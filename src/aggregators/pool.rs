//! Bounded, always-sorted retention pool.

use crate::error::StageError;
use std::cmp::Ordering;
use std::fmt;

/* ===================== BoundedPool<T, F> ===================== */

/// Keeps at most `capacity` items, sorted best-first by a comparator.
///
/// `cmp(a, b) == Less` means `a` ranks ahead of `b`. While the pool has room
/// every offer is inserted. Once full, an offer is compared against the last
/// (worst) item and replaces it only if it ranks strictly ahead; ties keep the
/// incumbent.
///
/// Memory is bounded by `capacity` regardless of stream length.
pub struct BoundedPool<T, F> {
    capacity: usize,
    items: Vec<T>,
    cmp: F,
}

impl<T, F> BoundedPool<T, F>
where
    F: Fn(&T, &T) -> Ordering,
{
    /// # Errors
    /// Returns [`StageError::Configuration`] if `capacity` is zero.
    pub fn new(capacity: usize, cmp: F) -> Result<Self, StageError> {
        if capacity == 0 {
            return Err(StageError::config("pool capacity must be at least 1"));
        }
        Ok(Self {
            capacity,
            items: Vec::with_capacity(capacity),
            cmp,
        })
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    /// Current contents, best first.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Offer an item. Returns whether it was retained.
    pub fn offer(&mut self, item: T) -> bool {
        if self.is_full() {
            let better = self
                .items
                .last()
                .is_some_and(|worst| (self.cmp)(&item, worst) == Ordering::Less);
            if !better {
                return false;
            }
            self.items.pop();
        }
        // Equal items stay in arrival order.
        let at = self
            .items
            .partition_point(|x| (self.cmp)(x, &item) != Ordering::Greater);
        self.items.insert(at, item);
        true
    }

    /// Take the contents, best first, leaving the pool empty.
    pub fn drain_sorted(&mut self) -> Vec<T> {
        std::mem::take(&mut self.items)
    }
}

impl<T: fmt::Debug, F> fmt::Debug for BoundedPool<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedPool")
            .field("capacity", &self.capacity)
            .field("items", &self.items)
            .finish_non_exhaustive()
    }
}
