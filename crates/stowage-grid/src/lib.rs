#![forbid(unsafe_code)]

//! Spatial inventory grids.
//!
//! Items with irregular footprints ([`Shape`]) are placed on bounded grids
//! ([`InventoryGrid`]) that enforce non-overlap and defer capacity and
//! permission to an [`InventoryProvider`]. A [`TransferSession`] moves one
//! item between grids held in a [`GridSet`] and always ends in a
//! [`DropMode`].
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use stowage_grid::{InventoryGrid, ListProvider, Point, RenderMode, Shape, StowedItem};
//!
//! let mut grid = InventoryGrid::new(ListProvider::new(RenderMode::Grid), 4, 2).unwrap();
//! let sword = StowedItem::new("sword", Rc::new(Shape::from_rows(&["###"]).unwrap())).into_ref();
//!
//! assert!(grid.try_add(&sword));
//! assert_eq!(sword.position(), Point::new(0, 0));
//! assert!(grid.get_at_point(Point::new(2, 0)).is_some());
//! ```
//!
//! # Feature Flags
//!
//! - `tracing`: emit `tracing` events for grid mutations and transfer
//!   conclusions.

pub mod config;
pub mod event;
pub mod grid;
pub mod item;
pub mod provider;
pub mod set;
pub mod shape;
pub mod transfer;

pub use config::GridConfig;
pub use event::{GridEvent, GridEventKind, Subscription};
pub use grid::{GridError, GridSnapshot, InventoryGrid, PlacementRecord, ResizeOutcome};
pub use item::{
    InventoryItem, ItemRef, StowedItem, bounding_rect, contains_point, footprint, overlaps,
    same_item, world_cell,
};
pub use provider::{InventoryProvider, ListProvider, RenderMode};
pub use set::{GridId, GridSet};
pub use shape::{Shape, ShapeError};
pub use stowage_core::{Point, Rect, Size};
pub use transfer::{DragSlot, DropMode, TransferError, TransferSession};
