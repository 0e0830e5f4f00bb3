//! The grid engine.
//!
//! [`InventoryGrid`] validates placements on a bounded cell grid and routes
//! every mutation through its [`InventoryProvider`]. It keeps a read-through
//! cache of the provider's items, rebuilt after each accepted mutation, and
//! notifies subscribers once the cache is consistent again.
//!
//! # Placement regimes
//!
//! - [`RenderMode::Grid`]: items keep their own positions; a placement must
//!   lie inside the bounds and must not overlap any cached item.
//! - [`RenderMode::Single`]: one logical slot. Geometry is ignored when
//!   validating and the occupant is centered on success.
//!
//! # Failure Modes
//!
//! Rule rejections (capacity, permission, bounds, overlap) are `false`
//! results plus events. A provider whose `item(index)` disagrees with its own
//! `item_count()` means the cache can no longer mirror it; the grid panics
//! on the next rebuild instead of serving a stale view.

use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use stowage_core::{Point, Rect, Size};

use crate::config::GridConfig;
use crate::event::{GridEvent, Listeners, Subscription};
use crate::item::{ItemRef, bounding_rect, contains_point, footprint, overlaps, same_item};
use crate::provider::{InventoryProvider, RenderMode};

/// Construction, resize, and grid-set errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    /// Width or height is zero.
    ZeroSize { width: u16, height: u16 },
    /// Grid identifiers are non-zero.
    ZeroGridId,
    /// A [`GridSet`](crate::GridSet) ran out of identifiers.
    GridIdOverflow { current: u64 },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroSize { width, height } => {
                write!(f, "grid dimensions must be > 0 (got {width}x{height})")
            }
            Self::ZeroGridId => write!(f, "grid id must be non-zero"),
            Self::GridIdOverflow { current } => {
                write!(f, "grid id overflow after {current}")
            }
        }
    }
}

impl std::error::Error for GridError {}

/// Items affected by a [`resize`](InventoryGrid::resize).
#[derive(Debug, Default)]
pub struct ResizeOutcome {
    /// Evicted through a regular drop.
    pub dropped: Vec<ItemRef>,
    /// Drop was refused; evicted through provider removal instead.
    pub removed: Vec<ItemRef>,
    /// The provider refused both; still cached although out of bounds.
    pub stranded: Vec<ItemRef>,
}

impl ResizeOutcome {
    /// Number of items that left the grid.
    #[must_use]
    pub fn evicted(&self) -> usize {
        self.dropped.len() + self.removed.len()
    }
}

/// One cached item as seen by [`InventoryGrid::snapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlacementRecord {
    pub label: String,
    pub position: Point,
    pub size: Size,
}

/// Serializable view of a grid's bounds and placements, in cache order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub size: Size,
    pub mode: RenderMode,
    pub full: bool,
    pub placements: Vec<PlacementRecord>,
}

impl GridSnapshot {
    /// Deterministic FNV-1a hash for state diagnostics.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        snapshot_state_hash(self)
    }
}

fn snapshot_state_hash(snapshot: &GridSnapshot) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0001_0000_01b3;

    fn mix(hash: &mut u64, byte: u8) {
        *hash ^= u64::from(byte);
        *hash = hash.wrapping_mul(PRIME);
    }

    fn mix_bytes(hash: &mut u64, bytes: &[u8]) {
        for byte in bytes {
            mix(hash, *byte);
        }
    }

    fn mix_u16(hash: &mut u64, value: u16) {
        mix_bytes(hash, &value.to_le_bytes());
    }

    fn mix_i32(hash: &mut u64, value: i32) {
        mix_bytes(hash, &value.to_le_bytes());
    }

    fn mix_u64(hash: &mut u64, value: u64) {
        mix_bytes(hash, &value.to_le_bytes());
    }

    fn mix_str(hash: &mut u64, value: &str) {
        mix_u64(hash, value.len() as u64);
        mix_bytes(hash, value.as_bytes());
    }

    let mut hash = OFFSET_BASIS;
    mix_u16(&mut hash, snapshot.size.width);
    mix_u16(&mut hash, snapshot.size.height);
    mix(
        &mut hash,
        match snapshot.mode {
            RenderMode::Grid => 0,
            RenderMode::Single => 1,
        },
    );
    mix(&mut hash, u8::from(snapshot.full));
    mix_u64(&mut hash, snapshot.placements.len() as u64);
    for placement in &snapshot.placements {
        mix_str(&mut hash, &placement.label);
        mix_i32(&mut hash, placement.position.x);
        mix_i32(&mut hash, placement.position.y);
        mix_u16(&mut hash, placement.size.width);
        mix_u16(&mut hash, placement.size.height);
    }
    hash
}

/// Placement engine over one provider.
pub struct InventoryGrid {
    size: Size,
    bounds: Rect,
    mode: RenderMode,
    provider: Box<dyn InventoryProvider>,
    cache: Vec<ItemRef>,
    listeners: Listeners,
    config: GridConfig,
}

impl InventoryGrid {
    /// Build a grid over `provider` with default configuration.
    ///
    /// Items already stored by the provider that do not fit the bounds are
    /// evicted immediately.
    pub fn new(
        provider: impl InventoryProvider + 'static,
        width: u16,
        height: u16,
    ) -> Result<Self, GridError> {
        Self::with_config(Box::new(provider), width, height, GridConfig::default())
    }

    /// Build a grid with explicit configuration.
    pub fn with_config(
        provider: Box<dyn InventoryProvider>,
        width: u16,
        height: u16,
        config: GridConfig,
    ) -> Result<Self, GridError> {
        let size = checked_size(width, height)?;
        let mode = provider.render_mode();
        let mut grid = Self {
            size,
            bounds: Rect::from_size(size),
            mode,
            provider,
            cache: Vec::new(),
            listeners: Listeners::default(),
            config: config.validated(),
        };
        grid.rebuild_cache();
        grid.settle_bounds();
        Ok(grid)
    }

    #[must_use]
    pub const fn width(&self) -> u16 {
        self.size.width
    }

    #[must_use]
    pub const fn height(&self) -> u16 {
        self.size.height
    }

    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// The walkable region `[0, width) x [0, height)`.
    #[must_use]
    pub const fn bounds(&self) -> Rect {
        self.bounds
    }

    #[must_use]
    pub const fn render_mode(&self) -> RenderMode {
        self.mode
    }

    #[must_use]
    pub const fn config(&self) -> &GridConfig {
        &self.config
    }

    #[must_use]
    pub fn provider(&self) -> &dyn InventoryProvider {
        self.provider.as_ref()
    }

    /// Mutable provider access for out-of-band storage changes.
    ///
    /// The cache is not refreshed; call [`rebuild`](Self::rebuild) afterwards.
    pub fn provider_mut(&mut self) -> &mut dyn InventoryProvider {
        self.provider.as_mut()
    }

    /// Cached items in provider order.
    #[must_use]
    pub fn items(&self) -> &[ItemRef] {
        &self.cache
    }

    #[must_use]
    pub fn item_count(&self) -> usize {
        self.cache.len()
    }

    /// Whether `item` is currently cached.
    #[must_use]
    pub fn contains(&self, item: &ItemRef) -> bool {
        self.cache.iter().any(|cached| same_item(cached, item))
    }

    /// Register a change listener. Dropping the guard unsubscribes.
    pub fn subscribe(&mut self, callback: impl Fn(&GridEvent) + 'static) -> Subscription {
        self.listeners.subscribe(callback)
    }

    /// Registered listeners, including dropped ones not yet pruned.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }

    /// Re-read every item from the provider and emit [`GridEvent::Rebuilt`].
    pub fn rebuild(&mut self) {
        self.rebuild_cache();
        self.listeners.emit(GridEvent::Rebuilt);
    }

    /// Silent rebuild used after single-item mutations.
    fn rebuild_cache(&mut self) {
        let count = self.provider.item_count();
        let mut cache = Vec::with_capacity(count);
        for index in 0..count {
            let Some(item) = self.provider.item(index) else {
                panic!(
                    "provider reported {count} items but has none at index {index}; \
                     grid cache is out of sync"
                );
            };
            cache.push(item);
        }
        self.cache = cache;

        #[cfg(feature = "tracing")]
        tracing::debug!(message = "grid.rebuild", items = self.cache.len());
    }

    /// Whether nothing more can be placed.
    ///
    /// True when the provider is at capacity, or in grid mode when every
    /// cell is covered.
    #[must_use]
    pub fn is_full(&self) -> bool {
        if self.provider.is_full() {
            return true;
        }
        self.mode == RenderMode::Grid
            && self
                .bounds
                .cells()
                .all(|cell| self.get_at_point(cell).is_some())
    }

    /// Item covering `point`.
    ///
    /// A full single-slot grid answers with its occupant for every point.
    #[must_use]
    pub fn get_at_point(&self, point: Point) -> Option<&ItemRef> {
        if self.mode == RenderMode::Single && self.provider.is_full() {
            return self.cache.first();
        }
        self.cache
            .iter()
            .find(|item| contains_point(item.as_ref(), point))
    }

    /// Distinct items covering any cell of the `size` block anchored at
    /// `point`, in discovery order.
    #[must_use]
    pub fn get_at_region(&self, point: Point, size: Size) -> Vec<ItemRef> {
        let mut seen = FxHashSet::default();
        let mut found = Vec::new();
        for cell in Rect::at(point, size).cells() {
            if let Some(item) = self.get_at_point(cell)
                && seen.insert(Rc::as_ptr(item).cast::<()>())
            {
                found.push(Rc::clone(item));
            }
        }
        found
    }

    fn admits(&self, item: &ItemRef) -> bool {
        self.provider.can_add_item(item) && !self.provider.is_full()
    }

    fn fits_bounds(&self, item: &ItemRef) -> bool {
        self.bounds
            .contains_padded(&bounding_rect(item.as_ref()), self.config.bounds_epsilon)
    }

    fn overlaps_cached(&self, item: &ItemRef) -> bool {
        self.cache
            .iter()
            .any(|other| overlaps(item.as_ref(), other.as_ref()))
    }

    /// Whether `item` could be recorded with its minimum corner at `point`.
    ///
    /// The item's position is moved to `point` for the test and restored
    /// before returning.
    #[must_use]
    pub fn can_add_at(&self, item: &ItemRef, point: Point) -> bool {
        if !self.admits(item) {
            return false;
        }
        if self.mode == RenderMode::Single {
            return true;
        }

        let previous = item.position();
        item.set_position(point);
        let fits = self.fits_bounds(item) && !self.overlaps_cached(item);
        item.set_position(previous);
        fits
    }

    /// Record `item` at `point`.
    ///
    /// Emits [`GridEvent::ItemAddFailed`] when the provider refuses the item
    /// after validation passed. In single mode the item is centered instead
    /// of placed at `point`.
    pub fn try_add_at(&mut self, item: &ItemRef, point: Point) -> bool {
        if !self.can_add_at(item, point) {
            return false;
        }
        if !self.provider.add_item(Rc::clone(item)) {
            #[cfg(feature = "tracing")]
            tracing::warn!(message = "grid.add_failed", label = item.label());
            self.listeners
                .emit(GridEvent::ItemAddFailed(Rc::clone(item)));
            return false;
        }

        let position = match self.mode {
            RenderMode::Single => self.centered(item),
            RenderMode::Grid => point,
        };
        item.set_position(position);
        self.rebuild_cache();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            message = "grid.add",
            label = item.label(),
            x = position.x,
            y = position.y
        );
        self.listeners.emit(GridEvent::ItemAdded(Rc::clone(item)));
        true
    }

    fn centered(&self, item: &ItemRef) -> Point {
        Point::new(
            (i32::from(self.size.width) - i32::from(item.width())) / 2,
            (i32::from(self.size.height) - i32::from(item.height())) / 2,
        )
    }

    /// First point accepted by [`can_add_at`](Self::can_add_at).
    ///
    /// Scans `x` outer, `y` inner, starting at the origin. Footprints larger
    /// than the grid are rejected without scanning.
    #[must_use]
    pub fn first_fit(&self, item: &ItemRef) -> Option<Point> {
        if !footprint(item.as_ref()).fits_within(self.size) || !self.admits(item) {
            return None;
        }
        let max_x = i32::from(self.size.width) - i32::from(item.width());
        let max_y = i32::from(self.size.height) - i32::from(item.height());
        (0..=max_x)
            .flat_map(|x| (0..=max_y).map(move |y| Point::new(x, y)))
            .find(|&point| self.can_add_at(item, point))
    }

    /// Whether `item` fits anywhere. Already-cached items are rejected.
    #[must_use]
    pub fn can_add(&self, item: &ItemRef) -> bool {
        !self.contains(item) && self.first_fit(item).is_some()
    }

    /// Record `item` at its [`first_fit`](Self::first_fit) point.
    pub fn try_add(&mut self, item: &ItemRef) -> bool {
        if self.contains(item) {
            return false;
        }
        match self.first_fit(item) {
            Some(point) => self.try_add_at(item, point),
            None => false,
        }
    }

    #[must_use]
    pub fn can_remove(&self, item: &ItemRef) -> bool {
        self.contains(item) && self.provider.can_remove_item(item)
    }

    /// Remove `item` and emit [`GridEvent::ItemRemoved`].
    pub fn try_remove(&mut self, item: &ItemRef) -> bool {
        if !self.can_remove(item) || !self.provider.remove_item(item) {
            return false;
        }
        self.rebuild_cache();

        #[cfg(feature = "tracing")]
        tracing::debug!(message = "grid.remove", label = item.label());
        self.listeners.emit(GridEvent::ItemRemoved(Rc::clone(item)));
        true
    }

    #[must_use]
    pub fn can_drop(&self, item: &ItemRef) -> bool {
        self.contains(item) && self.provider.can_drop_item(item) && item.can_be_dropped()
    }

    /// Drop `item` onto open space.
    ///
    /// Emits [`GridEvent::ItemDropped`] on success and
    /// [`GridEvent::ItemDropFailed`] on every failure path.
    pub fn try_drop(&mut self, item: &ItemRef) -> bool {
        if !self.can_drop(item) || !self.provider.drop_item(item) {
            #[cfg(feature = "tracing")]
            tracing::debug!(message = "grid.drop_failed", label = item.label());
            self.listeners
                .emit(GridEvent::ItemDropFailed(Rc::clone(item)));
            return false;
        }
        self.rebuild_cache();

        #[cfg(feature = "tracing")]
        tracing::debug!(message = "grid.drop", label = item.label());
        self.listeners.emit(GridEvent::ItemDropped(Rc::clone(item)));
        true
    }

    /// Report an item that was already taken out of this grid as dropped.
    ///
    /// Used when an in-flight item is released over open space: the provider
    /// no longer holds it, so only the item's own permission is checked.
    pub(crate) fn release_to_open_space(&mut self, item: &ItemRef) -> bool {
        if item.can_be_dropped() {
            self.listeners.emit(GridEvent::ItemDropped(Rc::clone(item)));
            true
        } else {
            self.listeners
                .emit(GridEvent::ItemDropFailed(Rc::clone(item)));
            false
        }
    }

    /// Try to drop every cached item. Returns how many left.
    pub fn drop_all(&mut self) -> usize {
        let snapshot = self.cache.clone();
        snapshot.iter().filter(|item| self.try_drop(item)).count()
    }

    /// Try to remove every cached item. Returns how many left.
    pub fn clear(&mut self) -> usize {
        let snapshot = self.cache.clone();
        snapshot.iter().filter(|item| self.try_remove(item)).count()
    }

    /// Whether `item` could take over the slot of a single-mode grid.
    #[must_use]
    pub fn can_swap(&self, item: &ItemRef) -> bool {
        self.mode == RenderMode::Single
            && footprint(item.as_ref()).fits_within(self.size)
            && self.provider.can_add_item(item)
    }

    /// Change the bounds and evict items that no longer fit.
    ///
    /// Eviction goes through [`try_drop`](Self::try_drop). If a drop is
    /// refused the provider is asked to remove the item instead; if that is
    /// refused too the item stays cached and is reported as stranded.
    /// [`GridEvent::Resized`] is emitted after eviction.
    pub fn resize(&mut self, width: u16, height: u16) -> Result<ResizeOutcome, GridError> {
        self.size = checked_size(width, height)?;
        self.bounds = Rect::from_size(self.size);
        let outcome = self.settle_bounds();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            message = "grid.resize",
            width,
            height,
            dropped = outcome.dropped.len(),
            removed = outcome.removed.len(),
            stranded = outcome.stranded.len()
        );
        self.listeners.emit(GridEvent::Resized { width, height });
        Ok(outcome)
    }

    fn settle_bounds(&mut self) -> ResizeOutcome {
        if self.mode == RenderMode::Single {
            for item in &self.cache {
                item.set_position(self.centered(item));
            }
        }

        let mut outcome = ResizeOutcome::default();
        let mut index = 0;
        while index < self.cache.len() {
            let item = Rc::clone(&self.cache[index]);
            if self.fits_bounds(&item) {
                index += 1;
                continue;
            }

            if self.try_drop(&item) {
                outcome.dropped.push(Rc::clone(&item));
            } else if self.try_remove(&item) {
                outcome.removed.push(Rc::clone(&item));
            } else {
                #[cfg(feature = "tracing")]
                tracing::warn!(message = "grid.stranded", label = item.label());
                outcome.stranded.push(item);
                index += 1;
                continue;
            }

            // Provider acknowledged the eviction but still lists the item.
            if self.contains(&item) {
                index += 1;
            }
        }
        outcome
    }

    /// Serializable view of bounds and placements.
    #[must_use]
    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot {
            size: self.size,
            mode: self.mode,
            full: self.is_full(),
            placements: self
                .cache
                .iter()
                .map(|item| PlacementRecord {
                    label: item.label().to_owned(),
                    position: item.position(),
                    size: footprint(item.as_ref()),
                })
                .collect(),
        }
    }
}

impl fmt::Debug for InventoryGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InventoryGrid")
            .field("size", &self.size)
            .field("mode", &self.mode)
            .field("items", &self.cache.len())
            .field("listeners", &self.listeners)
            .field("config", &self.config)
            .finish()
    }
}

fn checked_size(width: u16, height: u16) -> Result<Size, GridError> {
    let size = Size::new(width, height);
    if size.is_empty() {
        return Err(GridError::ZeroSize { width, height });
    }
    Ok(size)
}
