#![forbid(unsafe_code)]

//! Recycling pool for reusable objects.
//!
//! Provides [`Pool`], a free list of values produced by a creator closure.
//! Hosts use it to recycle per-cell or per-item presentation objects across
//! grid rebuilds instead of constructing them on every notification. The
//! grid engine itself never touches a pool.
//!
//! The pool counts values, it does not track identity: [`Pool::recycle`]
//! rejects a value only when more values come back than were handed out.
//!
//! # Usage
//!
//! ```
//! use stowage_core::pool::Pool;
//!
//! let mut pool = Pool::new(|| String::with_capacity(16), 2);
//! assert_eq!(pool.len(), 2);
//!
//! let mut label = pool.take().expect("pool grows on demand");
//! label.push_str("sword");
//! assert_eq!(pool.active_count(), 1);
//!
//! label.clear(); // recycled values are not reset by the pool
//! pool.recycle(label).expect("value came from this pool");
//! assert_eq!(pool.len(), 2);
//! ```
//!
//! # Reset semantics
//!
//! The creator runs only when the pool has to grow. A recycled value is
//! handed out again exactly as it was returned, so callers reset state
//! before calling [`recycle`](Pool::recycle).

use std::fmt;

/// Errors returned by [`Pool::recycle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
    /// More values were recycled than were ever taken.
    NotTaken,
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotTaken => write!(f, "recycled more values than were taken"),
        }
    }
}

impl std::error::Error for PoolError {}

/// A free list of reusable values.
pub struct Pool<T> {
    inactive: Vec<T>,
    active: usize,
    creator: Box<dyn FnMut() -> T>,
    grow_when_empty: bool,
}

impl<T> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("inactive", &self.inactive.len())
            .field("active", &self.active)
            .field("grow_when_empty", &self.grow_when_empty)
            .finish()
    }
}

impl<T> Pool<T> {
    /// Create a pool pre-filled with `initial` values that grows on demand.
    pub fn new(creator: impl FnMut() -> T + 'static, initial: usize) -> Self {
        Self::with_growth(creator, initial, true)
    }

    /// Create a pool with explicit growth policy.
    ///
    /// With `grow_when_empty == false`, [`take`](Self::take) returns `None`
    /// once the pre-filled values are all handed out.
    pub fn with_growth(
        creator: impl FnMut() -> T + 'static,
        initial: usize,
        grow_when_empty: bool,
    ) -> Self {
        let mut creator: Box<dyn FnMut() -> T> = Box::new(creator);
        let inactive = (0..initial).map(|_| creator()).collect();
        Self {
            inactive,
            active: 0,
            creator,
            grow_when_empty,
        }
    }

    /// Number of values waiting in the pool.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inactive.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inactive.is_empty()
    }

    /// Number of values currently handed out.
    #[must_use]
    pub const fn active_count(&self) -> usize {
        self.active
    }

    /// Whether [`take`](Self::take) would succeed right now.
    #[must_use]
    pub fn can_take(&self) -> bool {
        self.grow_when_empty || !self.is_empty()
    }

    /// Take a value, creating one if the pool is empty and allowed to grow.
    pub fn take(&mut self) -> Option<T> {
        let value = match self.inactive.pop() {
            Some(value) => value,
            None if self.grow_when_empty => (self.creator)(),
            None => return None,
        };
        self.active += 1;
        Some(value)
    }

    /// Return a value to the pool.
    ///
    /// Fails with [`PoolError::NotTaken`] when no value is outstanding.
    pub fn recycle(&mut self, value: T) -> Result<(), PoolError> {
        if self.active == 0 {
            return Err(PoolError::NotTaken);
        }
        self.active -= 1;
        self.inactive.push(value);
        Ok(())
    }
}
