//! Program grid and toroidal addressing.
//!
//! The grid is an immutable snapshot of the program's pixels. All addressing
//! wraps on both axes, so every lookup is in bounds by construction.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GridError;

/// A single 3-channel colour cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Pixel(pub [u8; 3]);

impl Pixel {
    /// Creates a pixel from its red, green and blue channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }

    pub const fn r(self) -> u8 {
        self.0[0]
    }

    pub const fn g(self) -> u8 {
        self.0[1]
    }

    pub const fn b(self) -> u8 {
        self.0[2]
    }

    /// Returns the channel selected by a 1-based index (1 red, 2 green, 3 blue).
    pub fn channel(self, index: u8) -> Option<u8> {
        match index {
            1..=3 => Some(self.0[index as usize - 1]),
            _ => None,
        }
    }
}

impl From<[u8; 3]> for Pixel {
    fn from(rgb: [u8; 3]) -> Self {
        Self(rgb)
    }
}

/// A cursor position inside the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Location {
    pub x: usize,
    pub y: usize,
}

impl Location {
    pub const ORIGIN: Location = Location { x: 0, y: 0 };

    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Unit direction of cursor travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Direction {
    pub dx: i8,
    pub dy: i8,
}

impl Direction {
    pub const EAST: Direction = Direction { dx: 1, dy: 0 };
    pub const WEST: Direction = Direction { dx: -1, dy: 0 };
    pub const SOUTH: Direction = Direction { dx: 0, dy: 1 };
    pub const NORTH: Direction = Direction { dx: 0, dy: -1 };

    /// Quarter turn: `(dx, dy)` becomes `(-dy, dx)`.
    pub const fn rotated(self) -> Self {
        Self {
            dx: -self.dy,
            dy: self.dx,
        }
    }
}

impl Default for Direction {
    fn default() -> Self {
        Self::EAST
    }
}

/// Immutable program grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Pixel>,
}

fn cell_count(width: usize, height: usize) -> Result<usize, GridError> {
    width
        .checked_mul(height)
        .ok_or(GridError::TooLarge { width, height })
}

impl Grid {
    /// Creates a grid from row-major cells.
    ///
    /// # Errors
    ///
    /// Returns [`GridError`] if either dimension is zero, the product
    /// overflows, or the cell count does not equal `width * height`.
    pub fn new(width: usize, height: usize, cells: Vec<Pixel>) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::EmptyDimensions { width, height });
        }
        let expected = cell_count(width, height)?;
        if cells.len() != expected {
            return Err(GridError::CellCountMismatch {
                expected,
                found: cells.len(),
            });
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Creates a grid from a tightly packed RGBA buffer, ignoring alpha.
    ///
    /// # Errors
    ///
    /// Returns [`GridError`] if the buffer does not hold exactly
    /// `width * height` four-byte pixels.
    pub fn from_rgba(width: usize, height: usize, bytes: &[u8]) -> Result<Self, GridError> {
        if bytes.len() % 4 != 0 {
            return Err(GridError::CellCountMismatch {
                expected: cell_count(width, height)?,
                found: bytes.len() / 4,
            });
        }
        let cells = bytes
            .chunks_exact(4)
            .map(|px| Pixel::new(px[0], px[1], px[2]))
            .collect();
        Self::new(width, height, cells)
    }

    /// Creates a grid from nested rows of pixels.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::RaggedRow`] if rows differ in length, or
    /// [`GridError::EmptyDimensions`] for an empty grid.
    pub fn from_rows(rows: Vec<Vec<Pixel>>) -> Result<Self, GridError> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        let mut cells = Vec::with_capacity(cell_count(width, height)?);
        for (row, pixels) in rows.into_iter().enumerate() {
            if pixels.len() != width {
                return Err(GridError::RaggedRow {
                    row,
                    expected: width,
                    found: pixels.len(),
                });
            }
            cells.extend(pixels);
        }
        Self::new(width, height, cells)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the pixel at an in-bounds location.
    pub fn get(&self, location: Location) -> Pixel {
        self.cells[location.y * self.width + location.x]
    }

    /// Location reached by moving `advance` cells along `direction`.
    ///
    /// Biasing each delta by the axis length keeps the operand non-negative
    /// before the modulo, so negative directions wrap correctly.
    pub fn offset(&self, location: Location, direction: Direction, advance: usize) -> Location {
        let wrap = |coord: usize, len: usize, delta: i8| -> usize {
            let len = len as i64;
            let moved = coord as i64 + (len + delta as i64) * advance as i64;
            moved.rem_euclid(len) as usize
        };
        Location {
            x: wrap(location.x, self.width, direction.dx),
            y: wrap(location.y, self.height, direction.dy),
        }
    }

    /// Reads the pixel `advance` cells ahead of `location` along `direction`.
    ///
    /// `advance = 0` is the instruction pixel itself, `advance = 1` the
    /// lookahead operand pixel.
    pub fn read(&self, location: Location, direction: Direction, advance: usize) -> Pixel {
        self.get(self.offset(location, direction, advance))
    }
}
