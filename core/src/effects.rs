//! Cost and effect tables for question and surprise cells.
//!
//! Every lookup is a pure function. Entries that depend on chance take a pre-flipped `coin`
//! so callers own the randomness.

use serde::{Deserialize, Serialize};

use crate::*;

/// Deltas and bonuses applied after resolving a special cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Effect {
    pub points: i32,
    pub lives: i32,
    pub reveal_mine: bool,
    pub reveal_area: bool,
}

impl Effect {
    pub const NONE: Effect = Effect::new(0, 0);

    pub const fn new(points: i32, lives: i32) -> Self {
        Self {
            points,
            lives,
            reveal_mine: false,
            reveal_area: false,
        }
    }

    pub const fn with_mine_bonus(self) -> Self {
        Self {
            reveal_mine: true,
            ..self
        }
    }

    pub const fn with_area_bonus(self) -> Self {
        Self {
            reveal_area: true,
            ..self
        }
    }

    const fn either(coin: bool, heads: Effect, tails: Effect) -> Effect {
        if coin { heads } else { tails }
    }
}

/// Effect of answering a question of `question` level during a `level` match.
pub const fn question_effect(
    level: DifficultyLevel,
    question: QuestionLevel,
    right: bool,
    coin: bool,
) -> Effect {
    use DifficultyLevel as D;
    use QuestionLevel as Q;

    match (level, question, right) {
        (D::Easy, Q::Easy, true) => Effect::new(3, 1),
        (D::Easy, Q::Medium, true) => Effect::new(6, 0).with_mine_bonus(),
        (D::Easy, Q::Hard, true) => Effect::new(10, 0).with_area_bonus(),
        (D::Easy, Q::Master, true) => Effect::new(15, 2),
        (D::Easy, Q::Easy, false) => Effect::either(coin, Effect::new(-3, 0), Effect::NONE),
        (D::Easy, Q::Medium, false) => Effect::either(coin, Effect::new(-6, 0), Effect::NONE),
        (D::Easy, Q::Hard, false) => Effect::new(-10, 0),
        (D::Easy, Q::Master, false) => Effect::new(-15, -1),

        (D::Medium, Q::Easy, true) => Effect::new(8, 1),
        (D::Medium, Q::Medium, true) => Effect::new(10, 1),
        (D::Medium, Q::Hard, true) => Effect::new(15, 1),
        (D::Medium, Q::Master, true) => Effect::new(20, 2),
        (D::Medium, Q::Easy, false) => Effect::new(-8, 0),
        (D::Medium, Q::Medium, false) => {
            Effect::either(coin, Effect::new(-10, -1), Effect::NONE)
        }
        (D::Medium, Q::Hard, false) => Effect::new(-15, -1),
        (D::Medium, Q::Master, false) => {
            Effect::either(coin, Effect::new(-20, -1), Effect::new(-20, -2))
        }

        (D::Hard, Q::Easy, true) => Effect::new(10, 1),
        (D::Hard, Q::Medium, true) => Effect::either(coin, Effect::new(15, 1), Effect::new(15, 2)),
        (D::Hard, Q::Hard, true) => Effect::new(20, 2),
        (D::Hard, Q::Master, true) => Effect::new(40, 3),
        (D::Hard, Q::Easy, false) => Effect::new(-10, -1),
        (D::Hard, Q::Medium, false) => {
            Effect::either(coin, Effect::new(-15, -1), Effect::new(-15, -2))
        }
        (D::Hard, Q::Hard, false) => Effect::new(-20, -2),
        (D::Hard, Q::Master, false) => Effect::new(-40, -3),
    }
}

/// Effect of a surprise cell; `good` is the fair coin flipped by the caller.
pub const fn surprise_effect(level: DifficultyLevel, good: bool) -> Effect {
    let points = match level {
        DifficultyLevel::Easy => 8,
        DifficultyLevel::Medium => 12,
        DifficultyLevel::Hard => 16,
    };
    if good {
        Effect::new(points, 1)
    } else {
        Effect::new(-points, -1)
    }
}
