use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::*;

/// A revealed question or surprise cell its owner has not resolved yet.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PendingInteraction {
    pub coords: Coord2,
    pub kind: InteractionKind,
}

/// Synchronous questions the controller asks the player mid-turn.
pub trait InteractionPrompt {
    /// Whether the player pays `cost` points to activate a special cell.
    fn confirm_activation(&mut self, kind: InteractionKind, cost: i32) -> bool;

    /// Index of the option the player picked. `None` means the dialog was cancelled, which
    /// counts as picking option 0, as does any out-of-range index.
    fn ask_question(&mut self, question: &Question) -> Option<usize>;
}

/// Notified after every state-changing action, including the finishing one.
pub trait MatchObserver {
    fn on_match_changed(&mut self, snapshot: &MatchSnapshot);
}

impl<F: FnMut(&MatchSnapshot)> MatchObserver for F {
    fn on_match_changed(&mut self, snapshot: &MatchSnapshot) {
        self(snapshot)
    }
}

/// Why an action was turned down. A rejected action never changes match state.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Rejection {
    MatchFinished,
    NotActivePlayer,
    InvalidCoords,
    AlreadyRevealed,
    NoPendingInteraction,
    StaleInteraction,
    Declined,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    Rejected(Rejection),
    /// The action went through and the match goes on.
    Applied,
    /// The action went through and finished the match.
    Finished,
}

impl ActionOutcome {
    pub const fn is_applied(self) -> bool {
        !matches!(self, Self::Rejected(_))
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Finished)
    }
}

/// Controller shared between threads; the mutex keeps one action in flight at a time.
pub type SharedTurnController = Arc<Mutex<TurnController>>;

/// Sole mutator of a match: validates actions, resolves special cells, alternates turns and
/// reports the result.
pub struct TurnController {
    engine: MatchEngine,
    pending: [BTreeSet<PendingInteraction>; 2],
    observers: Vec<Box<dyn MatchObserver + Send>>,
    history: Box<dyn HistoryStore + Send>,
    record: Option<GameRecord>,
}

impl TurnController {
    /// Takes over `engine`. A match that is already over is closed and recorded right away.
    pub fn new(engine: MatchEngine, history: impl HistoryStore + Send + 'static) -> Self {
        let mut controller = Self {
            engine,
            pending: Default::default(),
            observers: Vec::new(),
            history: Box::new(history),
            record: None,
        };
        controller.close_if_finished();
        controller
    }

    pub fn with_observer(mut self, observer: impl MatchObserver + Send + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    pub fn into_shared(self) -> SharedTurnController {
        Arc::new(Mutex::new(self))
    }

    /// Replaces the current match with a fresh one, dropping all pending interactions.
    pub fn start_match(&mut self, engine: MatchEngine) {
        self.engine = engine;
        self.pending = Default::default();
        self.record = None;
        if !self.close_if_finished() {
            self.notify();
        }
    }

    pub fn engine(&self) -> &MatchEngine {
        &self.engine
    }

    pub fn pending(&self, player: Player) -> Vec<PendingInteraction> {
        self.pending[player.index()].iter().copied().collect()
    }

    /// Record of the finished match, once there is one.
    pub fn game_record(&self) -> Option<&GameRecord> {
        self.record.as_ref()
    }

    pub fn snapshot(&self) -> MatchSnapshot {
        self.engine
            .snapshot([self.pending(Player::First), self.pending(Player::Second)])
    }

    /// Reveals a hidden cell on the acting player's board, then passes the turn.
    pub fn reveal(&mut self, player: Player, coords: Coord2) -> ActionOutcome {
        if let Err(rejection) = self.check_turn(player) {
            return reject(player, rejection);
        }
        let grid = self.engine.grid(player);
        if grid.validate_coords(coords).is_err() {
            return reject(player, Rejection::InvalidCoords);
        }
        if grid.cell_at(coords).is_revealed() {
            return reject(player, Rejection::AlreadyRevealed);
        }

        let report = match self.engine.reveal(player, coords) {
            Ok(report) => report,
            Err(_) => return reject(player, Rejection::InvalidCoords),
        };
        log::debug!(
            "{player:?} revealed {} cells from {coords:?}, {} mines",
            report.revealed.len(),
            report.mines_hit()
        );
        self.register(player, &report);
        self.finish_turn()
    }

    /// Toggles a flag on the acting player's board. Flagging never passes the turn.
    pub fn toggle_flag(&mut self, player: Player, coords: Coord2) -> ActionOutcome {
        if let Err(rejection) = self.check_turn(player) {
            return reject(player, rejection);
        }
        let outcome = match self.engine.toggle_flag(player, coords) {
            Ok(outcome) => outcome,
            Err(_) => return reject(player, Rejection::InvalidCoords),
        };
        if !outcome.has_update() {
            return reject(player, Rejection::AlreadyRevealed);
        }

        if self.close_if_finished() {
            return ActionOutcome::Finished;
        }
        self.notify();
        ActionOutcome::Applied
    }

    /// Resolves a pending question or surprise cell for the active player.
    pub fn try_interact(
        &mut self,
        player: Player,
        coords: Coord2,
        questions: &mut dyn QuestionSource,
        prompt: &mut dyn InteractionPrompt,
    ) -> ActionOutcome {
        if let Err(rejection) = self.check_turn(player) {
            return reject(player, rejection);
        }
        let Some(pending) = self.pending[player.index()]
            .iter()
            .find(|pending| pending.coords == coords)
            .copied()
        else {
            return reject(player, Rejection::NoPendingInteraction);
        };
        if !self.is_live_target(player, pending) {
            return reject(player, Rejection::StaleInteraction);
        }

        let cost = self.engine.difficulty().activation_cost();
        if !prompt.confirm_activation(pending.kind, cost) {
            log::debug!("{player:?} declined {} at {coords:?}", pending.kind.label());
            return ActionOutcome::Rejected(Rejection::Declined);
        }
        if pending.kind == InteractionKind::Surprise {
            match self.engine.operate_surprise(player, coords) {
                Ok(true) => {}
                Ok(false) | Err(_) => return reject(player, Rejection::StaleInteraction),
            }
        }
        self.engine.add_points(-cost);

        match pending.kind {
            InteractionKind::Question => self.resolve_question(player, questions, prompt),
            InteractionKind::Surprise => self.resolve_surprise(player),
        }

        self.pending[player.index()].remove(&pending);
        self.finish_turn()
    }

    fn resolve_question(
        &mut self,
        player: Player,
        questions: &mut dyn QuestionSource,
        prompt: &mut dyn InteractionPrompt,
    ) {
        let (question, right) = match questions.draw_random_question() {
            Some(question) => {
                let choice = match prompt.ask_question(&question) {
                    Some(choice) if choice < OPTION_COUNT => choice,
                    Some(choice) => {
                        log::warn!("Answer index {choice} out of range, using option 0");
                        0
                    }
                    None => 0,
                };
                let right = question.is_correct(choice);
                (question, right)
            }
            None => {
                log::warn!("Question bank is empty, counting an easy question as answered");
                (Question::placeholder(), true)
            }
        };

        let coin = self.engine.flip_coin();
        let effect = question_effect(self.engine.difficulty(), question.level(), right, coin);
        log::debug!(
            "{player:?} answered question {} ({}) {}: {effect:?}",
            question.id(),
            question.level().name(),
            if right { "right" } else { "wrong" }
        );
        self.engine.apply_effect(effect);

        if effect.reveal_mine {
            if let Some(mine) = self.engine.reveal_random_mine(player) {
                log::debug!("Bonus revealed mine at {mine:?}");
            }
        }
        if effect.reveal_area {
            let report = self.engine.reveal_random_area(player);
            self.register(player, &report);
        }
    }

    fn resolve_surprise(&mut self, player: Player) {
        let good = self.engine.flip_coin();
        let effect = surprise_effect(self.engine.difficulty(), good);
        log::debug!(
            "{player:?} opened a {} surprise: {effect:?}",
            if good { "good" } else { "bad" }
        );
        self.engine.apply_effect(effect);
    }

    fn check_turn(&self, player: Player) -> core::result::Result<(), Rejection> {
        if self.engine.is_finished() {
            Err(Rejection::MatchFinished)
        } else if self.engine.active_player() != player {
            Err(Rejection::NotActivePlayer)
        } else {
            Ok(())
        }
    }

    fn is_live_target(&self, player: Player, pending: PendingInteraction) -> bool {
        let grid = self.engine.grid(player);
        if grid.validate_coords(pending.coords).is_err() {
            return false;
        }
        let cell = grid.cell_at(pending.coords);
        cell.is_revealed()
            && match (pending.kind, cell.kind()) {
                (InteractionKind::Question, CellKind::Question) => true,
                (InteractionKind::Surprise, CellKind::Surprise { operated }) => !operated,
                _ => false,
            }
    }

    fn register(&mut self, player: Player, report: &RevealReport) {
        let pending = &mut self.pending[player.index()];
        for (coords, kind) in report.interactions() {
            pending.insert(PendingInteraction { coords, kind });
        }
    }

    fn finish_turn(&mut self) -> ActionOutcome {
        if self.close_if_finished() {
            return ActionOutcome::Finished;
        }
        self.engine.end_turn();
        self.notify();
        ActionOutcome::Applied
    }

    /// Hands the record to history and observers if the match just ended.
    fn close_if_finished(&mut self) -> bool {
        let Some(record) = self.engine.check_finished() else {
            return false;
        };
        self.history.record(record.clone());
        self.record = Some(record);
        self.notify();
        true
    }

    fn notify(&mut self) {
        if self.observers.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        for observer in &mut self.observers {
            observer.on_match_changed(&snapshot);
        }
    }
}

fn reject(player: Player, rejection: Rejection) -> ActionOutcome {
    log::debug!("Rejected action from {player:?}: {rejection:?}");
    ActionOutcome::Rejected(rejection)
}

impl core::fmt::Debug for TurnController {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TurnController")
            .field("engine", &self.engine)
            .field("pending", &self.pending)
            .field("observers", &self.observers.len())
            .field("record", &self.record)
            .finish_non_exhaustive()
    }
}
