use serde::{Deserialize, Serialize};

/// What a cell holds underneath, fixed once the grid is generated (except the surprise latch).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellKind {
    Mine,
    Empty,
    /// Adjacent mine count, always in `1..=8`.
    Number(u8),
    Question,
    Surprise { operated: bool },
}

impl CellKind {
    /// Kind for a non-special cell with `count` adjacent mines.
    pub const fn from_adjacent(count: u8) -> Self {
        match count {
            0 => Self::Empty,
            // a cell only has 8 neighbors
            n => Self::Number(if n > 8 { 8 } else { n }),
        }
    }

    pub const fn is_mine(self) -> bool {
        matches!(self, Self::Mine)
    }

    /// Whether a flood reveal continues through this cell.
    pub const fn is_flood_passable(self) -> bool {
        matches!(self, Self::Empty | Self::Question | Self::Surprise { .. })
    }

    pub const fn interaction(self) -> Option<InteractionKind> {
        match self {
            Self::Question => Some(InteractionKind::Question),
            Self::Surprise { .. } => Some(InteractionKind::Surprise),
            _ => None,
        }
    }
}

/// Special cells that need a follow-up interaction once revealed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InteractionKind {
    Question,
    Surprise,
}

impl InteractionKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Question => "Question",
            Self::Surprise => "Surprise",
        }
    }
}

/// Player-visible state of one cell.
///
/// `flagged` and `revealed` are never both set: revealing clears the flag, and revealed cells
/// refuse flags.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    kind: CellKind,
    revealed: bool,
    flagged: bool,
}

impl Cell {
    pub const fn new(kind: CellKind) -> Self {
        Self {
            kind,
            revealed: false,
            flagged: false,
        }
    }

    pub const fn kind(&self) -> CellKind {
        self.kind
    }

    pub const fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub const fn is_flagged(&self) -> bool {
        self.flagged
    }

    pub const fn is_mine(&self) -> bool {
        self.kind.is_mine()
    }

    /// Mine that is either revealed or flagged.
    pub const fn is_handled_mine(&self) -> bool {
        self.kind.is_mine() && (self.revealed || self.flagged)
    }

    pub(crate) fn reveal(&mut self) {
        self.revealed = true;
        self.flagged = false;
    }

    pub(crate) fn set_flag(&mut self, flagged: bool) {
        debug_assert!(!self.revealed || !flagged);
        self.flagged = flagged;
    }

    pub(crate) fn mark_operated(&mut self) {
        if let CellKind::Surprise { operated } = &mut self.kind {
            *operated = true;
        }
    }

    /// Character used when rendering the cell for a player.
    pub const fn symbol(&self) -> char {
        if !self.revealed {
            return if self.flagged { 'F' } else { '#' };
        }
        match self.kind {
            CellKind::Mine => '*',
            CellKind::Empty => '.',
            CellKind::Number(n) => (b'0' + n) as char,
            CellKind::Question => 'Q',
            CellKind::Surprise { operated: false } => 'S',
            CellKind::Surprise { operated: true } => 's',
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::new(CellKind::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_adjacent_is_empty() {
        assert_eq!(CellKind::from_adjacent(0), CellKind::Empty);
        assert_eq!(CellKind::from_adjacent(3), CellKind::Number(3));
    }

    #[test]
    fn reveal_clears_flag() {
        let mut cell = Cell::new(CellKind::Number(2));
        cell.set_flag(true);
        assert_eq!(cell.symbol(), 'F');

        cell.reveal();
        assert!(cell.is_revealed());
        assert!(!cell.is_flagged());
        assert_eq!(cell.symbol(), '2');
    }

    #[test]
    fn surprise_symbol_tracks_operated() {
        let mut cell = Cell::new(CellKind::Surprise { operated: false });
        cell.reveal();
        assert_eq!(cell.symbol(), 'S');
        cell.mark_operated();
        assert_eq!(cell.symbol(), 's');
        assert_eq!(cell.kind(), CellKind::Surprise { operated: true });
    }

    #[test]
    fn handled_mine_needs_flag_or_reveal() {
        let mut mine = Cell::new(CellKind::Mine);
        assert!(!mine.is_handled_mine());
        mine.set_flag(true);
        assert!(mine.is_handled_mine());
    }
}
