use serde::{Deserialize, Serialize};

use super::block::BlockId;

/// Integer coordinate of a cell.
///
/// The origin is the bottom-left cell and `y` grows upward, so [`Direction::Up`]
/// increases `y`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[display("({x}, {y})")]
pub struct Position {
    x: u8,
    y: u8,
}

impl Position {
    #[must_use]
    pub const fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn x(self) -> usize {
        self.x as usize
    }

    #[must_use]
    pub const fn y(self) -> usize {
        self.y as usize
    }

    /// Returns the position one step away in `direction`.
    ///
    /// Only the lower bound is checked here; use [`Grid::neighbor`] to also stay
    /// inside the grid.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<Self> {
        let (dx, dy) = direction.delta();
        Some(Self {
            x: self.x.checked_add_signed(dx)?,
            y: self.y.checked_add_signed(dy)?,
        })
    }
}

/// Axis-aligned movement direction.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// Unit vector `(dx, dy)` of the direction.
    #[must_use]
    pub const fn delta(self) -> (i8, i8) {
        match self {
            Self::Up => (0, 1),
            Self::Down => (0, -1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    /// How far `position` already is along this direction.
    ///
    /// Larger values are closer to the edge blocks slide towards.
    #[must_use]
    pub(crate) fn progress(self, position: Position) -> i16 {
        let (dx, dy) = self.delta();
        i16::from(dx) * i16::from(position.x) + i16::from(dy) * i16::from(position.y)
    }
}

/// Dimensions of the playing field and the coordinate <-> index mapping.
///
/// Cells are stored row-major from the bottom row up, so index `y * width + x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: u8,
    height: u8,
}

impl Grid {
    pub const MAX_SIDE: u8 = 16;

    #[must_use]
    pub const fn new(width: u8, height: u8) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub const fn width(self) -> usize {
        self.width as usize
    }

    #[must_use]
    pub const fn height(self) -> usize {
        self.height as usize
    }

    #[must_use]
    pub const fn len(self) -> usize {
        self.width() * self.height()
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub const fn contains(self, position: Position) -> bool {
        position.x < self.width && position.y < self.height
    }

    #[must_use]
    pub const fn index_of(self, position: Position) -> Option<usize> {
        if self.contains(position) {
            Some(position.y() * self.width() + position.x())
        } else {
            None
        }
    }

    /// Inverse of [`Self::index_of`].
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below [`Self::len`].
    #[must_use]
    pub fn position_of(self, index: usize) -> Position {
        assert!(index < self.len(), "cell index {index} out of range");
        let x = u8::try_from(index % self.width()).unwrap();
        let y = u8::try_from(index / self.width()).unwrap();
        Position::new(x, y)
    }

    /// Neighboring position in `direction`, or `None` at the edge of the grid.
    #[must_use]
    pub fn neighbor(self, position: Position, direction: Direction) -> Option<Position> {
        position.step(direction).filter(|next| self.contains(*next))
    }

    /// All positions in index order.
    pub fn positions(self) -> impl Iterator<Item = Position> {
        (0..self.len()).map(move |index| self.position_of(index))
    }
}

/// A single addressable grid position and its current occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    position: Position,
    occupant: Option<BlockId>,
}

impl Cell {
    pub(crate) const fn new(position: Position) -> Self {
        Self {
            position,
            occupant: None,
        }
    }

    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    #[must_use]
    pub const fn occupant(&self) -> Option<BlockId> {
        self.occupant
    }

    #[must_use]
    pub const fn is_free(&self) -> bool {
        self.occupant.is_none()
    }

    pub(crate) fn set_occupant(&mut self, occupant: Option<BlockId>) {
        self.occupant = occupant;
    }
}
