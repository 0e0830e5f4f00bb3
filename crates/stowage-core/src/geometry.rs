#![forbid(unsafe_code)]

//! Geometric primitives.

use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// A cell coordinate in grid space.
///
/// Signed so that candidate placements dragged past the left or bottom edge
/// can be represented and rejected by bounds checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// The origin cell.
    pub const ZERO: Self = Self::new(0, 0);

    /// Create a new point.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Component-wise subtraction, `None` on overflow.
    #[inline]
    pub const fn checked_sub(self, rhs: Point) -> Option<Point> {
        match (self.x.checked_sub(rhs.x), self.y.checked_sub(rhs.y)) {
            (Some(x), Some(y)) => Some(Point::new(x, y)),
            _ => None,
        }
    }
}

impl Add for Point {
    type Output = Point;

    #[inline]
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    #[inline]
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Point;

    #[inline]
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Point {
    #[inline]
    fn sub_assign(&mut self, rhs: Point) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Neg for Point {
    type Output = Point;

    #[inline]
    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// Width and height in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: u16,
    pub height: u16,
}

impl Size {
    /// Create a new size.
    #[inline]
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// Area in cells.
    #[inline]
    pub const fn area(&self) -> u32 {
        self.width as u32 * self.height as u32
    }

    /// Check if either dimension is zero.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Check if this size fits inside `outer` without rotation.
    #[inline]
    pub const fn fits_within(&self, outer: Size) -> bool {
        self.width <= outer.width && self.height <= outer.height
    }
}

impl From<(u16, u16)> for Size {
    fn from((width, height): (u16, u16)) -> Self {
        Self::new(width, height)
    }
}

/// An axis-aligned block of cells in grid space.
///
/// Covers `[x, x + width) x [y, y + height)`. `y` grows upward, so
/// [`bottom`](Self::bottom) is the inclusive lower edge and
/// [`top`](Self::top) the exclusive upper edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: i32,
    /// Bottom edge (inclusive).
    pub y: i32,
    /// Width in cells.
    pub width: u16,
    /// Height in cells.
    pub height: u16,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: i32, y: i32, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle anchored at the origin with the given size.
    #[inline]
    pub const fn from_size(size: Size) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    /// Create a rectangle with its minimum corner at `origin`.
    #[inline]
    pub const fn at(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    /// Left edge (alias for x).
    #[inline]
    pub const fn left(&self) -> i32 {
        self.x
    }

    /// Bottom edge (alias for y).
    #[inline]
    pub const fn bottom(&self) -> i32 {
        self.y
    }

    /// Right edge (exclusive), saturating at `i32::MAX`.
    #[inline]
    pub const fn right(&self) -> i32 {
        self.x.saturating_add(self.width as i32)
    }

    /// Top edge (exclusive), saturating at `i32::MAX`.
    #[inline]
    pub const fn top(&self) -> i32 {
        self.y.saturating_add(self.height as i32)
    }

    /// Minimum corner.
    #[inline]
    pub const fn min(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Maximum corner (exclusive on both axes).
    #[inline]
    pub const fn max(&self) -> Point {
        Point::new(self.right(), self.top())
    }

    #[inline]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Area in cells.
    #[inline]
    pub const fn area(&self) -> u32 {
        self.size().area()
    }

    /// Check if the rectangle has zero area.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Check if a cell is inside the rectangle.
    #[inline]
    pub const fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.top()
    }

    /// Check if `other` lies entirely inside this rectangle.
    #[inline]
    pub const fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.top() <= self.top()
    }

    /// Padded containment test used for placement bounds.
    ///
    /// `other`'s minimum corner is nudged inward by `+epsilon` and its maximum
    /// corner by `-epsilon`; both nudged corners must then fall inside this
    /// rectangle under half-open containment. A box sitting exactly on the
    /// far edge is therefore still inside.
    ///
    /// Evaluated in `f64`, which represents every `i32` edge exactly.
    pub fn contains_padded(&self, other: &Rect, epsilon: f32) -> bool {
        let epsilon = f64::from(epsilon);
        let min = (f64::from(other.x) + epsilon, f64::from(other.y) + epsilon);
        let max = (
            f64::from(other.right()) - epsilon,
            f64::from(other.top()) - epsilon,
        );
        self.contains_f64(min) && self.contains_f64(max)
    }

    fn contains_f64(&self, (x, y): (f64, f64)) -> bool {
        x >= f64::from(self.x)
            && x < f64::from(self.right())
            && y >= f64::from(self.y)
            && y < f64::from(self.top())
    }

    /// Check whether the two rectangles share at least one cell.
    #[inline]
    pub const fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.top()
            && other.y < self.top()
    }

    /// Compute the intersection with another rectangle, returning `None` if no overlap.
    pub fn intersection_opt(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let top = self.top().min(other.top());

        if x < right && y < top {
            Some(Rect::new(x, y, (right - x) as u16, (top - y) as u16))
        } else {
            None
        }
    }

    /// Iterate over every cell, `x` outer and `y` inner.
    pub fn cells(&self) -> impl Iterator<Item = Point> + '_ {
        (self.x..self.right()).flat_map(move |x| (self.y..self.top()).map(move |y| Point::new(x, y)))
    }
}
