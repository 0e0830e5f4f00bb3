//! Arena of grids addressed by stable identifiers.
//!
//! A transfer touches two grids that may be the same grid. Holding them in
//! one [`GridSet`] and addressing them by [`GridId`] lets the protocol borrow
//! each grid mutably in turn without aliasing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::grid::{GridError, InventoryGrid};

/// Stable identifier of a grid inside a [`GridSet`].
///
/// `0` is reserved/invalid so IDs are always non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GridId(u64);

impl GridId {
    /// Lowest valid grid ID.
    pub const MIN: Self = Self(1);

    /// Create a grid ID, rejecting 0.
    pub fn new(raw: u64) -> Result<Self, GridError> {
        if raw == 0 {
            return Err(GridError::ZeroGridId);
        }
        Ok(Self(raw))
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    fn checked_next(self) -> Result<Self, GridError> {
        let Some(next) = self.0.checked_add(1) else {
            return Err(GridError::GridIdOverflow { current: self.0 });
        };
        Self::new(next)
    }
}

impl Default for GridId {
    fn default() -> Self {
        Self::MIN
    }
}

/// Owning collection of grids, iterated in ID order.
#[derive(Debug, Default)]
pub struct GridSet {
    grids: BTreeMap<GridId, InventoryGrid>,
    next: GridId,
}

impl GridSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `grid` and assign it the next ID.
    ///
    /// IDs are never reused, even after [`remove`](Self::remove).
    pub fn insert(&mut self, grid: InventoryGrid) -> Result<GridId, GridError> {
        let id = self.next;
        self.next = id.checked_next()?;
        self.grids.insert(id, grid);
        Ok(id)
    }

    #[must_use]
    pub fn get(&self, id: GridId) -> Option<&InventoryGrid> {
        self.grids.get(&id)
    }

    pub fn get_mut(&mut self, id: GridId) -> Option<&mut InventoryGrid> {
        self.grids.get_mut(&id)
    }

    pub fn remove(&mut self, id: GridId) -> Option<InventoryGrid> {
        self.grids.remove(&id)
    }

    #[must_use]
    pub fn contains(&self, id: GridId) -> bool {
        self.grids.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.grids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (GridId, &InventoryGrid)> {
        self.grids.iter().map(|(id, grid)| (*id, grid))
    }
}
