#![forbid(unsafe_code)]

//! Core: grid-space geometry and shared utilities.
//!
//! # Role in Stowage
//! `stowage-core` is the leaf crate. It owns the integer coordinate types the
//! inventory engine reasons in, plus the padded containment test used for
//! bounds checks, and a small object pool hosts use to recycle presentation
//! objects.
//!
//! # Coordinate system
//! Grid space is cell-indexed with the origin at the bottom-left corner and
//! `y` increasing upward. A [`Rect`] covers `[x, x + width) x [y, y + height)`.

pub mod geometry;
pub mod pool;

pub use geometry::{Point, Rect, Size};
pub use pool::{Pool, PoolError};
