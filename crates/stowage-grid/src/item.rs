//! Item capability and placement geometry.
//!
//! Anything that can sit in a grid implements [`InventoryItem`]: a footprint,
//! a mutable position, and a drop permission. Items are shared handles
//! ([`ItemRef`]) because the provider, the grid cache, and an in-flight
//! transfer all refer to the same entity. Identity is handle identity, see
//! [`same_item`].

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use stowage_core::{Point, Rect, Size};

use crate::shape::Shape;

/// Shared handle to a placeable item.
pub type ItemRef = Rc<dyn InventoryItem>;

/// Capability set of a placeable item.
///
/// Position uses interior mutability: the grid tentatively moves an item
/// while validating a placement and restores it on rejection.
pub trait InventoryItem {
    /// Width of the footprint's bounding box.
    fn width(&self) -> u16;

    /// Height of the footprint's bounding box.
    fn height(&self) -> u16;

    /// Minimum corner of the bounding box in grid space.
    fn position(&self) -> Point;

    fn set_position(&self, position: Point);

    /// Whether `local` (relative to [`position`](Self::position)) is occupied.
    fn is_part_of_shape(&self, local: Point) -> bool;

    /// Whether the item may leave the inventory onto open space.
    fn can_be_dropped(&self) -> bool {
        true
    }

    /// Human-readable label for diagnostics.
    fn label(&self) -> &str {
        ""
    }
}

impl fmt::Debug for dyn InventoryItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InventoryItem")
            .field("label", &self.label())
            .field("size", &footprint(self))
            .field("position", &self.position())
            .finish()
    }
}

/// Whether two handles refer to the same item.
#[must_use]
pub fn same_item(a: &ItemRef, b: &ItemRef) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

/// Footprint size of an item.
#[must_use]
pub fn footprint(item: &dyn InventoryItem) -> Size {
    Size::new(item.width(), item.height())
}

/// Bounding box of an item at its current position.
#[must_use]
pub fn bounding_rect(item: &dyn InventoryItem) -> Rect {
    Rect::at(item.position(), footprint(item))
}

/// Grid cell of a local offset at the item's current position.
#[must_use]
pub fn world_cell(item: &dyn InventoryItem, local: Point) -> Point {
    item.position() + local
}

/// Whether the item occupies `point` in grid space.
#[must_use]
pub fn contains_point(item: &dyn InventoryItem, point: Point) -> bool {
    point
        .checked_sub(item.position())
        .is_some_and(|local| item.is_part_of_shape(local))
}

/// Whether two placed items share an occupied cell.
///
/// Bounding boxes are compared first; only intersecting boxes pay for the
/// cell scan, which is limited to the intersection.
#[must_use]
pub fn overlaps(a: &dyn InventoryItem, b: &dyn InventoryItem) -> bool {
    let Some(shared) = bounding_rect(a).intersection_opt(&bounding_rect(b)) else {
        return false;
    };
    shared
        .cells()
        .any(|cell| contains_point(a, cell) && contains_point(b, cell))
}

/// Standard item backed by a [`Shape`].
pub struct StowedItem {
    label: String,
    shape: Rc<Shape>,
    position: Cell<Point>,
    droppable: bool,
}

impl StowedItem {
    /// Create a droppable item at the origin.
    pub fn new(label: impl Into<String>, shape: Rc<Shape>) -> Self {
        Self {
            label: label.into(),
            shape,
            position: Cell::new(Point::ZERO),
            droppable: true,
        }
    }

    /// Set whether the item may be dropped onto open space.
    #[must_use]
    pub fn droppable(mut self, droppable: bool) -> Self {
        self.droppable = droppable;
        self
    }

    /// Set the starting position.
    #[must_use]
    pub fn at(self, position: Point) -> Self {
        self.position.set(position);
        self
    }

    #[must_use]
    pub fn shape(&self) -> &Rc<Shape> {
        &self.shape
    }

    /// Wrap into a shared [`ItemRef`].
    #[must_use]
    pub fn into_ref(self) -> ItemRef {
        Rc::new(self)
    }
}

impl InventoryItem for StowedItem {
    fn width(&self) -> u16 {
        self.shape.width()
    }

    fn height(&self) -> u16 {
        self.shape.height()
    }

    fn position(&self) -> Point {
        self.position.get()
    }

    fn set_position(&self, position: Point) {
        self.position.set(position);
    }

    fn is_part_of_shape(&self, local: Point) -> bool {
        self.shape.is_part_of_shape(local)
    }

    fn can_be_dropped(&self) -> bool {
        self.droppable
    }

    fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Debug for StowedItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StowedItem")
            .field("label", &self.label)
            .field("size", &self.shape.size())
            .field("position", &self.position.get())
            .field("droppable", &self.droppable)
            .finish()
    }
}
