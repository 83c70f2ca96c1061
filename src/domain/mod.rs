pub mod models;

pub use models::{BonusKind, GameStatus, Role, TeamSide, TeamSlots};
