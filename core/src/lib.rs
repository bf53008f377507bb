//! Match engine for a two-player minesweeper variant.
//!
//! Each player works a private board while sharing one life pool and one score. Besides mines
//! and numbers, boards hide question cells (a trivia question with a difficulty-scaled payoff)
//! and surprise cells (a coin flip). [`TurnController`] is the single entry point that mutates a
//! match; hosts supply the UI prompt, question source, history store and observers.

pub use cell::*;
pub use controller::*;
pub use effects::*;
pub use engine::*;
pub use error::*;
pub use generator::*;
pub use grid::*;
pub use history::*;
pub use level::*;
pub use question::*;
pub use snapshot::*;
pub use types::*;

mod cell;
mod controller;
mod effects;
mod engine;
mod error;
mod generator;
mod grid;
mod history;
mod level;
mod question;
mod snapshot;
mod types;
