//! Moving an item between grids.
//!
//! A [`TransferSession`] starts when an item is successfully removed from its
//! origin grid and ends when it is concluded into exactly one [`DropMode`]:
//!
//! 1. Hovering a grid whose `try_add_at` accepts the item: [`DropMode::Added`].
//! 2. Hovering a full single-slot grid whose occupant can move to the origin:
//!    [`DropMode::Swapped`].
//! 3. Anything else while hovering a grid: the item goes back to its origin
//!    point, [`DropMode::Returned`].
//! 4. Over open space: [`DropMode::Dropped`] if the item may be dropped,
//!    otherwise it is returned.
//!
//! The item is never lost: a failed swap step rolls back the steps before
//! it, and a failed return to origin panics because it means a provider and
//! its grid cache disagree.
//!
//! [`DragSlot`] is the "thing in hand" a pointer coordinator owns. It holds
//! at most one session.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use stowage_core::Point;

use crate::grid::InventoryGrid;
use crate::item::ItemRef;
use crate::provider::RenderMode;
use crate::set::{GridId, GridSet};

/// How a transfer ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropMode {
    Added,
    Swapped,
    Returned,
    Dropped,
}

/// Protocol misuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferError {
    /// The grid is not (or no longer) part of the set.
    UnknownGrid(GridId),
    /// The origin grid refused to release the item.
    PickupRefused,
    /// A session is already in hand.
    AlreadyActive,
    /// No session is in hand.
    NoActiveTransfer,
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownGrid(id) => write!(f, "unknown grid id {}", id.get()),
            Self::PickupRefused => write!(f, "origin grid refused to release the item"),
            Self::AlreadyActive => write!(f, "a transfer is already in progress"),
            Self::NoActiveTransfer => write!(f, "no transfer in progress"),
        }
    }
}

impl std::error::Error for TransferError {}

fn grid_ref(grids: &GridSet, id: GridId) -> Result<&InventoryGrid, TransferError> {
    grids.get(id).ok_or(TransferError::UnknownGrid(id))
}

fn grid_mut(grids: &mut GridSet, id: GridId) -> Result<&mut InventoryGrid, TransferError> {
    grids.get_mut(id).ok_or(TransferError::UnknownGrid(id))
}

/// One item in flight.
#[derive(Debug)]
pub struct TransferSession {
    origin: GridId,
    origin_point: Point,
    current: Option<GridId>,
    item: ItemRef,
}

impl TransferSession {
    /// Remove `item` from `origin` and start carrying it.
    ///
    /// The session starts hovering its origin grid.
    pub fn pick_up(
        grids: &mut GridSet,
        origin: GridId,
        item: ItemRef,
    ) -> Result<Self, TransferError> {
        let grid = grid_mut(grids, origin)?;
        let origin_point = item.position();
        if !grid.try_remove(&item) {
            return Err(TransferError::PickupRefused);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            message = "transfer.pick_up",
            origin = origin.get(),
            label = item.label()
        );
        Ok(Self {
            origin,
            origin_point,
            current: Some(origin),
            item,
        })
    }

    #[must_use]
    pub const fn origin(&self) -> GridId {
        self.origin
    }

    /// Where the item sat before pickup.
    #[must_use]
    pub const fn origin_point(&self) -> Point {
        self.origin_point
    }

    /// Grid under the pointer; `None` is open space.
    #[must_use]
    pub const fn current(&self) -> Option<GridId> {
        self.current
    }

    #[must_use]
    pub fn item(&self) -> &ItemRef {
        &self.item
    }

    /// Pointer moved onto another grid, or onto open space.
    pub fn hover(&mut self, target: Option<GridId>) {
        self.current = target;
    }

    /// Whether releasing at `target` would add or swap.
    ///
    /// Open space, or a grid missing from `grids`, previews as `false`.
    #[must_use]
    pub fn preview(&self, grids: &GridSet, target: Point) -> bool {
        let Some(grid) = self.current.and_then(|id| grids.get(id)) else {
            return false;
        };
        grid.can_add_at(&self.item, target) || self.swap_partner(grids).is_some()
    }

    /// Fail if the origin or hovered grid has left `grids`.
    pub fn check_grids(&self, grids: &GridSet) -> Result<(), TransferError> {
        grid_ref(grids, self.origin)?;
        if let Some(current) = self.current {
            grid_ref(grids, current)?;
        }
        Ok(())
    }

    /// Release the item at `target` (in the hovered grid's coordinates).
    ///
    /// Grids are checked before anything is mutated.
    ///
    /// # Panics
    ///
    /// Panics if the item cannot be put back where it was picked up.
    pub fn conclude(self, grids: &mut GridSet, target: Point) -> Result<DropMode, TransferError> {
        self.check_grids(grids)?;
        let mode = match self.current {
            Some(current) => self.place(grids, current, target)?,
            None => self.release(grids)?,
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            message = "transfer.conclude",
            origin = self.origin.get(),
            current = ?self.current.map(GridId::get),
            mode = ?mode,
            label = self.item.label()
        );
        Ok(mode)
    }

    /// Put the item back where it was picked up.
    ///
    /// # Panics
    ///
    /// Same as [`conclude`](Self::conclude).
    pub fn cancel(self, grids: &mut GridSet) -> Result<DropMode, TransferError> {
        grid_ref(grids, self.origin)?;
        self.return_to_origin(grids)
    }

    fn place(
        &self,
        grids: &mut GridSet,
        current: GridId,
        target: Point,
    ) -> Result<DropMode, TransferError> {
        if grid_mut(grids, current)?.try_add_at(&self.item, target) {
            return Ok(DropMode::Added);
        }
        if self.try_swap(grids, current)? {
            return Ok(DropMode::Swapped);
        }
        self.return_to_origin(grids)
    }

    fn release(&self, grids: &mut GridSet) -> Result<DropMode, TransferError> {
        if grid_mut(grids, self.origin)?.release_to_open_space(&self.item) {
            return Ok(DropMode::Dropped);
        }
        self.return_to_origin(grids)
    }

    fn return_to_origin(&self, grids: &mut GridSet) -> Result<DropMode, TransferError> {
        let origin = grid_mut(grids, self.origin)?;
        assert!(
            origin.try_add_at(&self.item, self.origin_point),
            "item {:?} could not be returned to grid {} at {:?}; provider and grid cache are out of sync",
            self.item.label(),
            self.origin.get(),
            self.origin_point,
        );
        Ok(DropMode::Returned)
    }

    /// Occupant of the hovered grid that could trade places with the item.
    fn swap_partner(&self, grids: &GridSet) -> Option<ItemRef> {
        let current = grids.get(self.current?)?;
        let origin = grids.get(self.origin)?;
        if current.render_mode() != RenderMode::Single || !current.can_swap(&self.item) {
            return None;
        }
        let [other] = current.items() else {
            return None;
        };
        (origin.can_add(other) && current.can_remove(other)).then(|| Rc::clone(other))
    }

    fn try_swap(&self, grids: &mut GridSet, current: GridId) -> Result<bool, TransferError> {
        let Some(other) = self.swap_partner(grids) else {
            return Ok(false);
        };
        let other_point = other.position();

        if !grid_mut(grids, current)?.try_remove(&other) {
            return Ok(false);
        }

        let origin = grid_mut(grids, self.origin)?;
        if !origin.can_add(&other) || !origin.try_add(&other) {
            restore_occupant(grid_mut(grids, current)?, &other, other_point);
            return Ok(false);
        }

        let target = grid_mut(grids, current)?;
        if !target.can_swap(&self.item) || !target.try_add(&self.item) {
            assert!(
                grid_mut(grids, self.origin)?.try_remove(&other),
                "swap rollback could not take {:?} back out of grid {}",
                other.label(),
                self.origin.get(),
            );
            restore_occupant(grid_mut(grids, current)?, &other, other_point);
            return Ok(false);
        }
        Ok(true)
    }
}

fn restore_occupant(grid: &mut InventoryGrid, other: &ItemRef, at: Point) {
    assert!(
        grid.try_add_at(other, at),
        "swap rollback could not restore {:?} at {at:?}",
        other.label(),
    );
}

/// Holder for the single transfer a pointer can carry.
#[derive(Debug, Default)]
pub struct DragSlot {
    session: Option<TransferSession>,
}

impl DragSlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.session.is_some()
    }

    #[must_use]
    pub fn session(&self) -> Option<&TransferSession> {
        self.session.as_ref()
    }

    /// Pick `item` up from `origin`.
    pub fn begin(
        &mut self,
        grids: &mut GridSet,
        origin: GridId,
        item: ItemRef,
    ) -> Result<(), TransferError> {
        if self.session.is_some() {
            return Err(TransferError::AlreadyActive);
        }
        self.session = Some(TransferSession::pick_up(grids, origin, item)?);
        Ok(())
    }

    pub fn hover(&mut self, target: Option<GridId>) -> Result<(), TransferError> {
        let session = self
            .session
            .as_mut()
            .ok_or(TransferError::NoActiveTransfer)?;
        session.hover(target);
        Ok(())
    }

    /// See [`TransferSession::preview`]. An empty slot previews as `false`.
    #[must_use]
    pub fn preview(&self, grids: &GridSet, target: Point) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.preview(grids, target))
    }

    /// Conclude the held session.
    ///
    /// On [`TransferError::UnknownGrid`] the session stays in the slot so it
    /// can be re-targeted or cancelled.
    pub fn finish(&mut self, grids: &mut GridSet, target: Point) -> Result<DropMode, TransferError> {
        self.session
            .as_ref()
            .ok_or(TransferError::NoActiveTransfer)?
            .check_grids(grids)?;
        let session = self
            .session
            .take()
            .ok_or(TransferError::NoActiveTransfer)?;
        session.conclude(grids, target)
    }

    /// Return the held item to its origin.
    pub fn cancel(&mut self, grids: &mut GridSet) -> Result<DropMode, TransferError> {
        let session = self
            .session
            .as_ref()
            .ok_or(TransferError::NoActiveTransfer)?;
        grid_ref(grids, session.origin())?;
        let session = self
            .session
            .take()
            .ok_or(TransferError::NoActiveTransfer)?;
        session.cancel(grids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{StowedItem, same_item};
    use crate::provider::ListProvider;
    use crate::shape::Shape;

    fn block(label: &str, width: u16, height: u16) -> ItemRef {
        let shape = Rc::new(Shape::filled(width, height).expect("valid shape"));
        StowedItem::new(label, shape).into_ref()
    }

    fn two_grids() -> (GridSet, GridId, GridId) {
        let mut grids = GridSet::new();
        let a = grids
            .insert(InventoryGrid::new(ListProvider::new(RenderMode::Grid), 4, 4).expect("grid"))
            .expect("id");
        let b = grids
            .insert(InventoryGrid::new(ListProvider::new(RenderMode::Grid), 4, 4).expect("grid"))
            .expect("id");
        (grids, a, b)
    }

    #[test]
    fn pickup_of_foreign_item_is_refused() {
        let (mut grids, a, _) = two_grids();
        let stray = block("stray", 1, 1);
        let err = TransferSession::pick_up(&mut grids, a, stray).unwrap_err();
        assert_eq!(err, TransferError::PickupRefused);
    }

    #[test]
    fn pickup_from_unknown_grid_fails() {
        let (mut grids, _, _) = two_grids();
        let ghost = GridId::new(99).expect("non-zero");
        let err = TransferSession::pick_up(&mut grids, ghost, block("x", 1, 1)).unwrap_err();
        assert_eq!(err, TransferError::UnknownGrid(ghost));
        assert_eq!(err.to_string(), "unknown grid id 99");
    }

    #[test]
    fn move_between_grids_adds() {
        let (mut grids, a, b) = two_grids();
        let gem = block("gem", 1, 1);
        assert!(grids.get_mut(a).expect("a").try_add_at(&gem, Point::new(2, 2)));

        let mut session = TransferSession::pick_up(&mut grids, a, Rc::clone(&gem)).expect("pickup");
        assert_eq!(session.origin_point(), Point::new(2, 2));
        assert_eq!(session.current(), Some(a));
        session.hover(Some(b));
        assert!(session.preview(&grids, Point::new(0, 3)));

        let mode = session.conclude(&mut grids, Point::new(0, 3)).expect("conclude");
        assert_eq!(mode, DropMode::Added);
        assert!(!grids.get(a).expect("a").contains(&gem));
        assert!(grids.get(b).expect("b").contains(&gem));
        assert_eq!(gem.position(), Point::new(0, 3));
    }

    #[test]
    fn blocked_target_returns_to_origin() {
        let (mut grids, a, b) = two_grids();
        let gem = block("gem", 1, 1);
        let wall = block("wall", 4, 4);
        assert!(grids.get_mut(a).expect("a").try_add_at(&gem, Point::new(1, 0)));
        assert!(grids.get_mut(b).expect("b").try_add(&wall));

        let mut session = TransferSession::pick_up(&mut grids, a, Rc::clone(&gem)).expect("pickup");
        session.hover(Some(b));
        assert!(!session.preview(&grids, Point::ZERO));
        let mode = session.conclude(&mut grids, Point::ZERO).expect("conclude");
        assert_eq!(mode, DropMode::Returned);
        assert!(grids.get(a).expect("a").contains(&gem));
        assert_eq!(gem.position(), Point::new(1, 0));
    }

    #[test]
    fn slot_holds_one_session() {
        let (mut grids, a, b) = two_grids();
        let first = block("first", 1, 1);
        let second = block("second", 1, 1);
        let grid_a = grids.get_mut(a).expect("a");
        assert!(grid_a.try_add(&first));
        assert!(grid_a.try_add(&second));

        let mut slot = DragSlot::new();
        assert_eq!(slot.hover(Some(b)), Err(TransferError::NoActiveTransfer));
        slot.begin(&mut grids, a, Rc::clone(&first)).expect("begin");
        assert_eq!(
            slot.begin(&mut grids, a, Rc::clone(&second)),
            Err(TransferError::AlreadyActive)
        );
        assert!(grids.get(a).expect("a").contains(&second));

        let mode = slot.cancel(&mut grids).expect("cancel");
        assert_eq!(mode, DropMode::Returned);
        assert!(!slot.is_active());
        assert_eq!(
            slot.finish(&mut grids, Point::ZERO),
            Err(TransferError::NoActiveTransfer)
        );
    }

    #[test]
    fn finish_keeps_session_when_target_vanished() {
        let (mut grids, a, b) = two_grids();
        let gem = block("gem", 1, 1);
        assert!(grids.get_mut(a).expect("a").try_add(&gem));

        let mut slot = DragSlot::new();
        slot.begin(&mut grids, a, Rc::clone(&gem)).expect("begin");
        slot.hover(Some(b)).expect("hover");
        assert!(grids.remove(b).is_some());

        assert_eq!(
            slot.finish(&mut grids, Point::ZERO),
            Err(TransferError::UnknownGrid(b))
        );
        assert!(slot.is_active());
        let carried = slot.session().expect("held").item();
        assert!(same_item(carried, &gem));

        slot.hover(Some(a)).expect("hover");
        assert_eq!(slot.finish(&mut grids, Point::new(3, 3)), Ok(DropMode::Added));
    }

    #[test]
    fn drop_mode_serializes_snake_case() {
        let json = serde_json::to_string(&DropMode::Swapped).expect("json");
        assert_eq!(json, "\"swapped\"");
    }
}
