use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::prelude::*;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::*;

/// Everything needed to start a match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSettings {
    pub difficulty: DifficultyLevel,
    pub players: [String; 2],
    /// Drives board generation and every chance roll during the match.
    pub seed: u64,
}

impl MatchSettings {
    pub fn new(
        difficulty: DifficultyLevel,
        first: impl Into<String>,
        second: impl Into<String>,
        seed: u64,
    ) -> Self {
        Self {
            difficulty,
            players: [first.into(), second.into()],
            seed,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchState {
    Active(Player),
    Finished,
}

impl MatchState {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Finished)
    }
}

/// Shared state of one two-player match: a board per player, a common life pool and score.
#[derive(Clone, Debug)]
pub struct MatchEngine {
    players: [String; 2],
    difficulty: DifficultyLevel,
    grids: [CellGrid; 2],
    lives: i32,
    points: i32,
    active: Player,
    finished: bool,
    started_at: DateTime<Utc>,
    started: Instant,
    frozen_elapsed: Option<Duration>,
    rng: SmallRng,
}

impl MatchEngine {
    pub fn new(settings: MatchSettings) -> Self {
        let mut rng = SmallRng::seed_from_u64(settings.seed);
        let config = settings.difficulty.board_config();
        let grids = [
            RandomGridGenerator::new(rng.random()).generate(config),
            RandomGridGenerator::new(rng.random()).generate(config),
        ];
        Self::from_parts(settings, grids, rng)
    }

    /// Starts a match on pre-built boards, e.g. hand-made layouts.
    pub fn with_grids(settings: MatchSettings, grids: [CellGrid; 2]) -> Self {
        let rng = SmallRng::seed_from_u64(settings.seed);
        Self::from_parts(settings, grids, rng)
    }

    fn from_parts(settings: MatchSettings, grids: [CellGrid; 2], rng: SmallRng) -> Self {
        log::info!(
            "Match started: {} vs {} on {} (seed {})",
            settings.players[0],
            settings.players[1],
            settings.difficulty.name(),
            settings.seed
        );
        Self {
            players: settings.players,
            difficulty: settings.difficulty,
            grids,
            lives: MAX_LIVES,
            points: 0,
            active: Player::First,
            finished: false,
            started_at: Utc::now(),
            started: Instant::now(),
            frozen_elapsed: None,
            rng,
        }
    }

    pub fn players(&self) -> &[String; 2] {
        &self.players
    }

    pub fn player_name(&self, player: Player) -> &str {
        &self.players[player.index()]
    }

    pub fn difficulty(&self) -> DifficultyLevel {
        self.difficulty
    }

    pub fn grid(&self, player: Player) -> &CellGrid {
        &self.grids[player.index()]
    }

    pub fn lives(&self) -> i32 {
        self.lives
    }

    pub fn points(&self) -> i32 {
        self.points
    }

    pub fn active_player(&self) -> Player {
        self.active
    }

    pub fn state(&self) -> MatchState {
        if self.is_finished() {
            MatchState::Finished
        } else {
            MatchState::Active(self.active)
        }
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Time since the match started, frozen once it finishes.
    pub fn elapsed(&self) -> Duration {
        self.frozen_elapsed
            .unwrap_or_else(|| self.started.elapsed())
    }

    /// Mines on `player`'s board that are neither flagged nor revealed.
    pub fn mines_left(&self, player: Player) -> usize {
        let grid = self.grid(player);
        usize::from(grid.mine_count()).saturating_sub(grid.mines_handled())
    }

    /// Whether [`check_finished`](Self::check_finished) has closed the match.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// A match ends once the life pool is empty or either board has every mine handled.

    fn finish_condition(&self) -> bool {
        self.lives == 0 || self.grids.iter().any(CellGrid::all_mines_handled)
    }

    pub fn add_points(&mut self, delta: i32) {
        self.points += delta;
    }

    /// Losses clamp at zero; gains beyond [`MAX_LIVES`] turn into points at the life value.
    pub fn add_lives(&mut self, delta: i32) {
        if delta < 0 {
            self.lives = (self.lives + delta).max(0);
        } else if delta > 0 {
            self.lives += delta;
            if self.lives > MAX_LIVES {
                let overflow = self.lives - MAX_LIVES;
                self.points += overflow * self.difficulty.life_value();
                self.lives = MAX_LIVES;
            }
        }
    }

    pub fn convert_lives_to_points(&mut self) {
        if self.lives > 0 {
            self.points += self.lives * self.difficulty.life_value();
            self.lives = 0;
        }
    }

    pub fn apply_effect(&mut self, effect: Effect) {
        self.add_points(effect.points);
        self.add_lives(effect.lives);
    }

    /// Reveals on `player`'s board and scores every newly revealed cell.
    pub fn reveal(&mut self, player: Player, coords: Coord2) -> Result<RevealReport> {
        let report = self.grids[player.index()].reveal(coords)?;
        for &(_, kind) in &report.revealed {
            if kind.is_mine() {
                self.add_lives(-1);
            } else {
                self.add_points(1);
            }
        }
        Ok(report)
    }

    /// Toggles a flag on `player`'s board and scores the change.
    pub fn toggle_flag(&mut self, player: Player, coords: Coord2) -> Result<FlagOutcome> {
        let outcome = self.grids[player.index()].toggle_flag(coords)?;
        match outcome {
            FlagOutcome::NoChange => {}
            FlagOutcome::Placed { on_mine: true } => self.add_points(1),
            FlagOutcome::Removed { on_mine: true } => self.add_points(-1),
            FlagOutcome::Placed { on_mine: false } => self.add_points(-3),
            FlagOutcome::Removed { on_mine: false } => self.add_points(3),
        }
        Ok(outcome)
    }

    pub fn operate_surprise(&mut self, player: Player, coords: Coord2) -> Result<bool> {
        self.grids[player.index()].operate_surprise(coords)
    }

    /// Reveals one random hidden mine on `player`'s board without scoring it.
    pub fn reveal_random_mine(&mut self, player: Player) -> Option<Coord2> {
        let hidden = self.grid(player).hidden_mines();
        let &coords = hidden.choose(&mut self.rng)?;
        self.grids[player.index()].reveal_quiet(coords).ok()?;
        Some(coords)
    }

    /// Reveals a random 3x3 block on `player`'s board (the whole board if it is smaller) without
    /// scoring it.
    pub fn reveal_random_area(&mut self, player: Player) -> RevealReport {
        let (rows, cols) = self.grid(player).size();
        let grid = &mut self.grids[player.index()];
        if rows < 3 || cols < 3 {
            return grid.reveal_all();
        }
        let center = (
            self.rng.random_range(1..rows - 1),
            self.rng.random_range(1..cols - 1),
        );
        grid.reveal_area(center).unwrap_or_default()
    }

    pub fn flip_coin(&mut self) -> bool {
        self.rng.random_bool(0.5)
    }

    pub fn end_turn(&mut self) {
        self.active = self.active.other();
    }

    /// Runs finish detection; on the finishing transition freezes the clock, banks remaining
    /// lives, opens both boards and returns the match record.
    pub fn check_finished(&mut self) -> Option<GameRecord> {
        if self.finished || !self.finish_condition() {
            return None;
        }

        self.finished = true;
        let elapsed = self.started.elapsed();
        self.frozen_elapsed = Some(elapsed);

        let final_lives = self.lives;
        let won = final_lives > 0;
        if won {
            self.convert_lives_to_points();
        }
        for grid in &mut self.grids {
            grid.reveal_all();
        }

        log::info!(
            "Match finished: {} with {} points after {}s",
            if won { "won" } else { "lost" },
            self.points,
            elapsed.as_secs()
        );

        Some(GameRecord {
            players: self.players.clone(),
            difficulty: self.difficulty,
            lives: final_lives,
            points: self.points,
            won,
            elapsed_secs: elapsed.as_secs(),
            created_at: Utc::now(),
        })
    }

    pub fn snapshot(&self, pending: [Vec<PendingInteraction>; 2]) -> MatchSnapshot {
        MatchSnapshot {
            players: self.players.clone(),
            difficulty: self.difficulty,
            lives: self.lives,
            points: self.points,
            active: self.active,
            elapsed_secs: self.elapsed().as_secs(),
            finished: self.is_finished(),
            boards: [self.grids[0].symbols(), self.grids[1].symbols()],
            pending,
        }
    }
}
