use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Single coordinate axis used for grid rows, columns and positions.
pub type Coord = u8;

/// Count type used for cell counts.
pub type CellCount = u16;

/// Two-dimensional coordinates `(row, col)`.
pub type Coord2 = (Coord, Coord);

/// Conversion of board coordinates into an `ndarray` index.
pub trait GridIndex {
    fn ix(self) -> [usize; 2];
}

impl GridIndex for Coord2 {
    fn ix(self) -> [usize; 2] {
        [self.0.into(), self.1.into()]
    }
}

/// Number of cells on a `rows` by `cols` board.
pub const fn cell_area(rows: Coord, cols: Coord) -> CellCount {
    (rows as CellCount).saturating_mul(cols as CellCount)
}

/// One of the two seats in a match.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Player {
    First,
    Second,
}

impl Player {
    pub const BOTH: [Player; 2] = [Player::First, Player::Second];

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::First),
            1 => Some(Self::Second),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
        }
    }

    pub const fn other(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }
}

/// Adjacency lookup on any board-shaped array.
pub trait GridNeighbors {
    /// Cells touching `center` by side or corner, in row-major order.
    fn adjacent_cells(&self, center: Coord2) -> Neighbors;
}

impl<T> GridNeighbors for Array2<T> {
    fn adjacent_cells(&self, center: Coord2) -> Neighbors {
        let (rows, cols) = self.dim();
        let bounds = (
            Coord::try_from(rows).unwrap_or(Coord::MAX),
            Coord::try_from(cols).unwrap_or(Coord::MAX),
        );
        Neighbors::new(center, bounds)
    }
}

/// Walks the 3x3 block around a cell, skipping the cell itself and anything off the board.
#[derive(Clone, Debug)]
pub struct Neighbors {
    center: Coord2,
    bounds: Coord2,
    slot: u8,
}

impl Neighbors {
    const CENTER_SLOT: u8 = 4;
    const SLOTS: u8 = 9;

    pub fn new(center: Coord2, bounds: Coord2) -> Self {
        Self {
            center,
            bounds,
            slot: 0,
        }
    }

    /// Board cell at block `slot`, where slot 0 is the top-left corner of the block.
    fn at_slot(&self, slot: u8) -> Option<Coord2> {
        let row = self.center.0.checked_add(slot / 3)?.checked_sub(1)?;
        let col = self.center.1.checked_add(slot % 3)?.checked_sub(1)?;
        (row < self.bounds.0 && col < self.bounds.1).then_some((row, col))
    }
}

impl Iterator for Neighbors {
    type Item = Coord2;

    fn next(&mut self) -> Option<Coord2> {
        while self.slot < Self::SLOTS {
            let slot = self.slot;
            self.slot += 1;
            if slot == Self::CENTER_SLOT {
                continue;
            }
            if let Some(coords) = self.at_slot(slot) {
                return Some(coords);
            }
        }
        None
    }
}
