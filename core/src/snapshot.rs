use chrono::{DateTime, Utc};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Copy-out view of a match handed to observers. Never shares state with the engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub players: [String; 2],
    pub difficulty: DifficultyLevel,
    pub lives: i32,
    pub points: i32,
    pub active: Player,
    pub elapsed_secs: u64,
    pub finished: bool,
    /// Rendered symbols of each player's board, indexed by [`Player::index`].
    pub boards: [Array2<char>; 2],
    pub pending: [Vec<PendingInteraction>; 2],
}

impl MatchSnapshot {
    pub fn board(&self, player: Player) -> &Array2<char> {
        &self.boards[player.index()]
    }

    pub fn active_name(&self) -> &str {
        &self.players[self.active.index()]
    }
}

/// Summary of a finished match, produced exactly once at the finishing transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub players: [String; 2],
    pub difficulty: DifficultyLevel,
    /// Lives left at the moment the match ended, before they were banked as points.
    pub lives: i32,
    pub points: i32,
    pub won: bool,
    pub elapsed_secs: u64,
    pub created_at: DateTime<Utc>,
}
