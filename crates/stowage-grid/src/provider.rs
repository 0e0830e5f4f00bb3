//! Backing store contract.
//!
//! An [`InventoryProvider`] owns the authoritative item list of one grid and
//! decides capacity and permission questions. The grid engine never mutates
//! its cache directly: it asks the provider, then re-reads it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::item::{ItemRef, same_item};

/// How a grid places its items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Many items, each on its own footprint, no overlap.
    #[default]
    Grid,
    /// One logical slot; the occupant is centered.
    Single,
}

/// Authoritative item store with capacity and permission policy.
pub trait InventoryProvider {
    /// Placement regime, fixed for the provider's lifetime.
    fn render_mode(&self) -> RenderMode;

    fn item_count(&self) -> usize;

    /// Provider-side capacity check (independent of geometry).
    fn is_full(&self) -> bool;

    /// Item at `index` in storage order.
    fn item(&self, index: usize) -> Option<ItemRef>;

    /// Whether `item` is admitted by type or permission.
    fn can_add_item(&self, item: &ItemRef) -> bool;

    fn can_remove_item(&self, item: &ItemRef) -> bool;

    fn can_drop_item(&self, item: &ItemRef) -> bool;

    /// Record `item`. Returns whether storage changed.
    fn add_item(&mut self, item: ItemRef) -> bool;

    /// Forget `item`. Returns whether storage changed.
    fn remove_item(&mut self, item: &ItemRef) -> bool;

    /// Forget `item` because it left onto open space.
    fn drop_item(&mut self, item: &ItemRef) -> bool;
}

type Admission = Box<dyn Fn(&ItemRef) -> bool>;

/// In-memory provider backed by a `Vec`.
///
/// Optional item cap and admission predicate cover the usual "bag of N
/// slots" and "only weapons here" policies. Dropping an item is the same
/// storage mutation as removing it.
pub struct ListProvider {
    mode: RenderMode,
    items: Vec<ItemRef>,
    max_items: Option<usize>,
    admission: Option<Admission>,
}

impl ListProvider {
    /// Create an empty, unbounded provider.
    #[must_use]
    pub fn new(mode: RenderMode) -> Self {
        Self {
            mode,
            items: Vec::new(),
            max_items: None,
            admission: None,
        }
    }

    /// Cap the number of stored items.
    #[must_use]
    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = Some(max_items);
        self
    }

    /// Only admit items for which `admit` returns true.
    #[must_use]
    pub fn with_admission(mut self, admit: impl Fn(&ItemRef) -> bool + 'static) -> Self {
        self.admission = Some(Box::new(admit));
        self
    }

    /// Seed storage directly, bypassing policy.
    #[must_use]
    pub fn with_items(mut self, items: impl IntoIterator<Item = ItemRef>) -> Self {
        self.items.extend(items);
        self
    }

    /// Stored items in order.
    #[must_use]
    pub fn items(&self) -> &[ItemRef] {
        &self.items
    }

    fn position_of(&self, item: &ItemRef) -> Option<usize> {
        self.items.iter().position(|stored| same_item(stored, item))
    }
}

impl fmt::Debug for ListProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListProvider")
            .field("mode", &self.mode)
            .field("items", &self.items.len())
            .field("max_items", &self.max_items)
            .field("has_admission", &self.admission.is_some())
            .finish()
    }
}

impl InventoryProvider for ListProvider {
    fn render_mode(&self) -> RenderMode {
        self.mode
    }

    fn item_count(&self) -> usize {
        self.items.len()
    }

    fn is_full(&self) -> bool {
        self.max_items
            .is_some_and(|max_items| self.items.len() >= max_items)
    }

    fn item(&self, index: usize) -> Option<ItemRef> {
        self.items.get(index).cloned()
    }

    fn can_add_item(&self, item: &ItemRef) -> bool {
        self.admission.as_ref().is_none_or(|admit| admit(item))
    }

    fn can_remove_item(&self, _item: &ItemRef) -> bool {
        true
    }

    fn can_drop_item(&self, _item: &ItemRef) -> bool {
        true
    }

    fn add_item(&mut self, item: ItemRef) -> bool {
        if self.position_of(&item).is_some() {
            return false;
        }
        self.items.push(item);
        true
    }

    fn remove_item(&mut self, item: &ItemRef) -> bool {
        match self.position_of(item) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    fn drop_item(&mut self, item: &ItemRef) -> bool {
        self.remove_item(item)
    }
}
