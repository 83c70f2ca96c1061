pub mod accumulator;
pub mod events;
pub mod resolver;

use thiserror::Error;

use crate::domain::BonusKind;

pub use accumulator::{check_win, replay, Completion, GameProgress, RoundOutcome};
pub use events::{BonusDeclaration, RoundInput};
pub use resolver::{resolve_round, RoundScore};

/// Rule violations raised by the scoring core. All of them reject the
/// request before any state is touched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    #[error("player {0} is not seated in this game")]
    UnknownDeclarer(i64),
    #[error("the {0} bonus was declared more than once in this round")]
    DuplicateDeclaration(BonusKind),
    #[error("the game is already completed")]
    GameCompleted,
    #[error("the game was abandoned")]
    GameAbandoned,
}
