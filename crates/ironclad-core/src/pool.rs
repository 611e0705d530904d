//! Fixed-capacity object pool.
//!
//! The pool owns a free list of pre-allocated instances. [`ObjectPool::acquire`]
//! moves an instance out to the caller and [`ObjectPool::release`] moves it
//! back, so an instance is owned by exactly one of {pool, caller} at any time.
//! The type system enforces this; the counters only report it.
//!
//! # Example
//!
//! ```
//! use ironclad_core::entity::Projectile;
//! use ironclad_core::pool::ObjectPool;
//!
//! let mut pool: ObjectPool<Projectile> = ObjectPool::with_capacity(2);
//! let a = pool.acquire().unwrap();
//! let b = pool.acquire().unwrap();
//! assert!(pool.acquire().is_none());
//!
//! pool.release(a);
//! assert_eq!(pool.available(), 1);
//! assert_eq!(pool.in_use(), 1);
//! # drop(b);
//! ```

use tracing::{debug, warn};

/// Types that can be recycled through an [`ObjectPool`].
pub trait Poolable: Default {
    /// Returns the instance to its pristine state.
    fn reset(&mut self);
}

/// Pre-allocated pool with no growth.
///
/// Acquisition never allocates. When the free list is empty,
/// [`ObjectPool::acquire`] returns `None` and the caller drops the action.
#[derive(Debug)]
pub struct ObjectPool<T: Poolable> {
    free: Vec<T>,
    capacity: usize,
    outstanding: usize,
}

impl<T: Poolable> ObjectPool<T> {
    /// Creates a pool holding `capacity` default instances.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let mut free = Vec::with_capacity(capacity);
        free.resize_with(capacity, T::default);
        Self {
            free,
            capacity,
            outstanding: 0,
        }
    }

    /// Takes an instance out of the pool, or `None` if every instance is in use.
    pub fn acquire(&mut self) -> Option<T> {
        let item = self.free.pop();
        match item {
            Some(_) => self.outstanding += 1,
            None => debug!(capacity = self.capacity, "pool exhausted"),
        }
        item
    }

    /// Resets `item` and returns it to the free list.
    ///
    /// An instance that would push the free list past capacity (one that did
    /// not come from this pool) is dropped with a warning.
    pub fn release(&mut self, mut item: T) {
        item.reset();
        if self.free.len() >= self.capacity {
            warn!(capacity = self.capacity, "released instance beyond pool capacity, dropping");
            return;
        }
        self.outstanding = self.outstanding.saturating_sub(1);
        self.free.push(item);
    }

    /// Instances ready to be acquired.
    #[must_use]
    pub fn available(&self) -> usize {
        self.free.len()
    }

    /// Instances currently held by callers.
    #[must_use]
    pub const fn in_use(&self) -> usize {
        self.outstanding
    }

    /// Total instances this pool manages.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}
