//! Item footprints.
//!
//! A [`Shape`] records which cells of a bounding box an item occupies. Local
//! coordinates put the origin at the bottom-left cell with `y` growing upward,
//! matching grid space, so an item at position `p` covers `p + local` for
//! every occupied `local`.
//!
//! Shapes are immutable. The occupied point list is computed once at
//! construction and shared by every overlap test afterwards.
//!
//! ```
//! use stowage_grid::Shape;
//! use stowage_core::Point;
//!
//! // An "L": rows are written top to bottom.
//! let shape = Shape::from_rows(&["#.", "#.", "##"]).unwrap();
//! assert_eq!((shape.width(), shape.height()), (2, 3));
//! assert!(shape.is_part_of_shape(Point::new(1, 0)));
//! assert!(!shape.is_part_of_shape(Point::new(1, 2)));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use stowage_core::{Point, Size};

const OCCUPIED: char = '#';
const EMPTY: char = '.';

/// Errors raised while building a [`Shape`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    /// Width or height is zero.
    ZeroSize { width: usize, height: usize },
    /// A dimension does not fit in `u16`.
    TooLarge { width: usize, height: usize },
    /// Rows (or columns) of the input matrix differ in length.
    Ragged {
        line: usize,
        expected: usize,
        found: usize,
    },
    /// A row string contained a character other than `#`, `X`, `.` or space.
    UnknownCell {
        line: usize,
        column: usize,
        found: char,
    },
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroSize { width, height } => {
                write!(f, "shape dimensions must be > 0 (got {width}x{height})")
            }
            Self::TooLarge { width, height } => {
                write!(f, "shape dimensions exceed u16 (got {width}x{height})")
            }
            Self::Ragged {
                line,
                expected,
                found,
            } => write!(
                f,
                "shape line {line} has length {found}, expected {expected}"
            ),
            Self::UnknownCell {
                line,
                column,
                found,
            } => write!(
                f,
                "shape line {line} column {column}: unexpected cell {found:?}"
            ),
        }
    }
}

impl std::error::Error for ShapeError {}

/// Immutable occupied-cell pattern within a bounding box.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ShapeRecord", into = "ShapeRecord")]
pub struct Shape {
    width: u16,
    height: u16,
    /// Row-major from the bottom row: index `x + width * y`.
    cells: Vec<bool>,
    points: Vec<Point>,
}

impl Shape {
    /// Create an empty footprint of the given size.
    ///
    /// Nothing is occupied, so the shape never overlaps anything. Used for
    /// placeholder and disabled items.
    pub fn new(width: u16, height: u16) -> Result<Self, ShapeError> {
        check_size(usize::from(width), usize::from(height))?;
        Ok(Self::from_cells(
            width,
            height,
            vec![false; usize::from(width) * usize::from(height)],
        ))
    }

    /// Create a fully occupied rectangle.
    pub fn filled(width: u16, height: u16) -> Result<Self, ShapeError> {
        check_size(usize::from(width), usize::from(height))?;
        Ok(Self::from_cells(
            width,
            height,
            vec![true; usize::from(width) * usize::from(height)],
        ))
    }

    /// Create a shape from an occupancy matrix indexed `columns[x][y]`.
    pub fn from_columns(columns: Vec<Vec<bool>>) -> Result<Self, ShapeError> {
        let width = columns.len();
        let height = columns.first().map_or(0, Vec::len);
        check_size(width, height)?;
        if let Some((line, column)) = columns.iter().enumerate().find(|(_, c)| c.len() != height) {
            return Err(ShapeError::Ragged {
                line,
                expected: height,
                found: column.len(),
            });
        }

        let mut cells = vec![false; width * height];
        for (x, column) in columns.iter().enumerate() {
            for (y, &occupied) in column.iter().enumerate() {
                cells[x + width * y] = occupied;
            }
        }
        Ok(Self::from_cells(width as u16, height as u16, cells))
    }

    /// Create a shape from text rows listed top to bottom.
    ///
    /// `#` or `X` marks an occupied cell, `.` or a space an empty one. The
    /// last row is local `y = 0`.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, ShapeError> {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.as_ref().chars().count());
        check_size(width, height)?;

        let mut cells = vec![false; width * height];
        for (line, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let found = row.chars().count();
            if found != width {
                return Err(ShapeError::Ragged {
                    line,
                    expected: width,
                    found,
                });
            }
            let y = height - 1 - line;
            for (x, cell) in row.chars().enumerate() {
                cells[x + width * y] = match cell {
                    '#' | 'X' => true,
                    '.' | ' ' => false,
                    found => {
                        return Err(ShapeError::UnknownCell {
                            line,
                            column: x,
                            found,
                        });
                    }
                };
            }
        }
        Ok(Self::from_cells(width as u16, height as u16, cells))
    }

    fn from_cells(width: u16, height: u16, cells: Vec<bool>) -> Self {
        let mut points = Vec::new();
        for x in 0..width {
            for y in 0..height {
                if cells[usize::from(x) + usize::from(width) * usize::from(y)] {
                    points.push(Point::new(i32::from(x), i32::from(y)));
                }
            }
        }
        Self {
            width,
            height,
            cells,
            points,
        }
    }

    /// Width of the bounding box.
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Height of the bounding box.
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    #[must_use]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Occupied local cells, `x` outer and `y` inner.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Whether no cell is occupied.
    #[must_use]
    pub fn is_vacant(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether `local` is an occupied cell. Always false outside the box.
    #[must_use]
    pub fn is_part_of_shape(&self, local: Point) -> bool {
        if local.x < 0
            || local.y < 0
            || local.x >= i32::from(self.width)
            || local.y >= i32::from(self.height)
        {
            return false;
        }
        self.cells[local.x as usize + usize::from(self.width) * local.y as usize]
    }

    /// Text rows top to bottom, the inverse of [`from_rows`](Self::from_rows).
    #[must_use]
    pub fn rows(&self) -> Vec<String> {
        (0..i32::from(self.height))
            .rev()
            .map(|y| {
                (0..i32::from(self.width))
                    .map(|x| {
                        if self.is_part_of_shape(Point::new(x, y)) {
                            OCCUPIED
                        } else {
                            EMPTY
                        }
                    })
                    .collect()
            })
            .collect()
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shape")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("rows", &self.rows())
            .finish()
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows().iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            f.write_str(row)?;
        }
        Ok(())
    }
}

fn check_size(width: usize, height: usize) -> Result<(), ShapeError> {
    if width == 0 || height == 0 {
        return Err(ShapeError::ZeroSize { width, height });
    }
    if width > usize::from(u16::MAX) || height > usize::from(u16::MAX) {
        return Err(ShapeError::TooLarge { width, height });
    }
    Ok(())
}

/// Persisted form of a [`Shape`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ShapeRecord {
    width: u16,
    height: u16,
    rows: Vec<String>,
}

impl From<Shape> for ShapeRecord {
    fn from(shape: Shape) -> Self {
        Self {
            width: shape.width,
            height: shape.height,
            rows: shape.rows(),
        }
    }
}

impl TryFrom<ShapeRecord> for Shape {
    type Error = ShapeError;

    fn try_from(record: ShapeRecord) -> Result<Self, Self::Error> {
        let shape = Shape::from_rows(&record.rows)?;
        if shape.width != record.width || shape.height != record.height {
            return Err(ShapeError::Ragged {
                line: 0,
                expected: usize::from(record.width),
                found: usize::from(shape.width),
            });
        }
        Ok(shape)
    }
}
