use serde::{Deserialize, Serialize};

use crate::*;

/// Upper bound on the shared life pool; gains beyond it overflow into points.
pub const MAX_LIVES: i32 = 10;

/// Difficulty of a whole match. Drives board size, special-cell counts and every cost/effect table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DifficultyLevel {
    Easy,   // 9x9, 10 mines
    Medium, // 13x13, 26 mines
    Hard,   // 16x16, 44 mines
}

impl DifficultyLevel {
    pub const ALL: [DifficultyLevel; 3] = [
        DifficultyLevel::Easy,
        DifficultyLevel::Medium,
        DifficultyLevel::Hard,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        }
    }

    pub const fn board_config(self) -> BoardConfig {
        match self {
            Self::Easy => BoardConfig::new_unchecked((9, 9), 10, 6, 2),
            Self::Medium => BoardConfig::new_unchecked((13, 13), 26, 7, 3),
            Self::Hard => BoardConfig::new_unchecked((16, 16), 44, 11, 4),
        }
    }

    /// Points paid upfront to activate a question or surprise cell.
    pub const fn activation_cost(self) -> i32 {
        match self {
            Self::Easy => 5,
            Self::Medium => 8,
            Self::Hard => 12,
        }
    }

    /// Points one life is worth when converting lives to points.
    pub const fn life_value(self) -> i32 {
        match self {
            Self::Easy => 5,
            Self::Medium => 8,
            Self::Hard => 12,
        }
    }
}

/// Difficulty of an individual trivia question, independent of the match difficulty.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionLevel {
    Easy,
    Medium,
    Hard,
    Master,
}

impl QuestionLevel {
    pub const ALL: [QuestionLevel; 4] = [
        QuestionLevel::Easy,
        QuestionLevel::Medium,
        QuestionLevel::Hard,
        QuestionLevel::Master,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
            Self::Master => "Master",
        }
    }
}

/// Shape and special-cell counts of one board.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub size: Coord2,
    pub mines: CellCount,
    pub question_cells: CellCount,
    pub surprise_cells: CellCount,
}

impl BoardConfig {
    pub const fn new_unchecked(
        size: Coord2,
        mines: CellCount,
        question_cells: CellCount,
        surprise_cells: CellCount,
    ) -> Self {
        Self {
            size,
            mines,
            question_cells,
            surprise_cells,
        }
    }

    /// Builds a config, clamping the size to at least 1x1 and the special cells to what fits.
    pub fn new(
        (rows, cols): Coord2,
        mines: CellCount,
        question_cells: CellCount,
        surprise_cells: CellCount,
    ) -> Self {
        let rows = rows.clamp(1, Coord::MAX);
        let cols = cols.clamp(1, Coord::MAX);
        let total = cell_area(rows, cols);
        let mines = mines.min(total);
        let question_cells = question_cells.min(total - mines);
        let surprise_cells = surprise_cells.min(total - mines - question_cells);
        Self::new_unchecked((rows, cols), mines, question_cells, surprise_cells)
    }

    pub const fn total_cells(&self) -> CellCount {
        cell_area(self.size.0, self.size.1)
    }

    pub const fn special_cells(&self) -> CellCount {
        self.mines + self.question_cells + self.surprise_cells
    }
}
