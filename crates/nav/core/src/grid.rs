//! Walkability grid.
//!
//! The grid is the only terrain representation the core understands: a dense
//! row-major matrix of booleans where `true` means traversable. Every query is
//! bounds-safe (outside the grid is simply not walkable); only explicit cell
//! edits report [`GridError::OutOfBounds`].
use std::fmt;
use std::str::FromStr;

use crate::error::{ErrorSeverity, NavError};
use crate::geometry::{Line, Position, swept_cells};

/// Character used for walkable cells in the text format.
pub const WALKABLE_CHAR: char = '.';
/// Character written for obstacles by [`Grid`]'s `Display` impl.
pub const BLOCKED_CHAR: char = '#';

/// Errors raised when constructing or editing a [`Grid`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    /// A cell edit addressed a position outside `[0,width) x [0,height)`.
    #[error("position {position} is outside the {width}x{height} grid")]
    OutOfBounds {
        position: Position,
        width: u32,
        height: u32,
    },

    /// Rows of a 2D array or text block have different lengths.
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Zero width or height.
    #[error("grid must have at least one row and one column")]
    Empty,
}

impl NavError for GridError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            GridError::OutOfBounds { .. } => "GRID_OUT_OF_BOUNDS",
            GridError::RaggedRows { .. } => "GRID_RAGGED_ROWS",
            GridError::Empty => "GRID_EMPTY",
        }
    }
}

/// Two-dimensional walkability map.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<bool>,
}

impl Grid {
    /// Creates a fully walkable grid.
    pub fn new(width: u32, height: u32) -> Result<Self, GridError> {
        Self::filled(width, height, true)
    }

    /// Creates a grid where every cell has the same walkability.
    pub fn filled(width: u32, height: u32, walkable: bool) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::Empty);
        }
        Ok(Self {
            width,
            height,
            cells: vec![walkable; width as usize * height as usize],
        })
    }

    /// Builds a grid from a row-major 2D boolean array (`rows[y][x]`).
    pub fn from_rows<R: AsRef<[bool]>>(rows: &[R]) -> Result<Self, GridError> {
        let expected = rows.first().map(|row| row.as_ref().len()).unwrap_or(0);
        if expected == 0 {
            return Err(GridError::Empty);
        }

        let mut cells = Vec::with_capacity(expected * rows.len());
        for (row, values) in rows.iter().enumerate() {
            let values = values.as_ref();
            if values.len() != expected {
                return Err(GridError::RaggedRows {
                    row,
                    expected,
                    found: values.len(),
                });
            }
            cells.extend_from_slice(values);
        }

        Ok(Self {
            width: expected as u32,
            height: rows.len() as u32,
            cells,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of cells (`width * height`).
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false; a grid has at least one cell.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn contains(&self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && position.x < self.width as i32
            && position.y < self.height as i32
    }

    /// Row-major index of an in-bounds position.
    #[inline]
    pub fn index(&self, position: Position) -> Option<usize> {
        if self.contains(position) {
            Some(position.y as usize * self.width as usize + position.x as usize)
        } else {
            None
        }
    }

    /// Inverse of [`Grid::index`].
    #[inline]
    pub fn position_of(&self, index: usize) -> Position {
        let width = self.width as usize;
        Position::new((index % width) as i32, (index / width) as i32)
    }

    /// Whether the cell can be occupied. Out-of-bounds cells are never walkable.
    #[inline]
    pub fn is_walkable(&self, position: Position) -> bool {
        self.index(position)
            .map(|index| self.cells[index])
            .unwrap_or(false)
    }

    /// Edits a single cell. Fails without mutating anything when out of bounds.
    pub fn set_walkable(&mut self, position: Position, walkable: bool) -> Result<(), GridError> {
        let index = self.index(position).ok_or(GridError::OutOfBounds {
            position,
            width: self.width,
            height: self.height,
        })?;
        self.cells[index] = walkable;
        Ok(())
    }

    /// Clamps a position into the grid bounds.
    pub fn clamp(&self, position: Position) -> Position {
        Position::new(
            position.x.clamp(0, self.width as i32 - 1),
            position.y.clamp(0, self.height as i32 - 1),
        )
    }

    /// Searches concentric square rings around `origin` for a walkable cell.
    ///
    /// Returns `origin` itself when it is walkable. Rings are scanned row by
    /// row, so the result is deterministic for a given grid.
    pub fn find_nearest_walkable(&self, origin: Position, max_radius: u32) -> Option<Position> {
        if self.is_walkable(origin) {
            return Some(origin);
        }

        let max_radius = max_radius.min(self.width.max(self.height)) as i32;
        for radius in 1..=max_radius {
            for dy in -radius..=radius {
                for dx in -radius..=radius {
                    if dx.abs() != radius && dy.abs() != radius {
                        continue;
                    }
                    let candidate = origin.offset(dx, dy);
                    if self.is_walkable(candidate) {
                        return Some(candidate);
                    }
                }
            }
        }

        None
    }

    /// True when every cell strictly between `from` and `to` is walkable.
    ///
    /// The endpoints themselves are not tested, so an observer standing on any
    /// cell can still "see" a target standing on any other cell.
    pub fn has_line_of_sight(&self, from: Position, to: Position) -> bool {
        Line::new(from, to)
            .filter(|&cell| cell != from && cell != to)
            .all(|cell| self.is_walkable(cell))
    }

    /// True when a body moving in a straight line between the two cell
    /// centers only ever occupies walkable cells, endpoints included.
    pub fn is_segment_clear(&self, from: Position, to: Position) -> bool {
        swept_cells(from, to)
            .into_iter()
            .all(|cell| self.is_walkable(cell))
    }

    /// Iterates over all walkable cells in row-major order.
    pub fn walkable_cells(&self) -> impl Iterator<Item = Position> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, walkable)| **walkable)
            .map(|(index, _)| self.position_of(index))
    }

    pub fn walkable_count(&self) -> usize {
        self.cells.iter().filter(|walkable| **walkable).count()
    }
}

impl FromStr for Grid {
    type Err = GridError;

    /// Parses a text block where `.` is walkable and any other character is an
    /// obstacle. Blank lines and whitespace around rows are ignored.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let rows: Vec<Vec<bool>> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| line.chars().map(|c| c == WALKABLE_CHAR).collect())
            .collect();
        Self::from_rows(&rows)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, row) in self.cells.chunks(self.width as usize).enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            for &walkable in row {
                let c = if walkable { WALKABLE_CHAR } else { BLOCKED_CHAR };
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}

impl TryFrom<String> for Grid {
    type Error = GridError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        text.parse()
    }
}

impl From<Grid> for String {
    fn from(grid: Grid) -> Self {
        grid.to_string()
    }
}
