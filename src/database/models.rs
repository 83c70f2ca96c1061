use chrono::{NaiveDate, NaiveDateTime};

use crate::domain::{GameStatus, TeamSide, TeamSlots};
use crate::scoring::RoundInput;

#[derive(Debug, Clone)]
pub struct PlayerRow {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub profile_url: Option<String>,
    pub is_admin: bool,
    pub active: bool,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone)]
pub struct GameRow {
    pub id: i64,
    pub play_date: NaiveDate,
    pub slots: TeamSlots,
    pub score_a: i32,
    pub score_b: i32,
    pub status: GameStatus,
    pub winner: Option<TeamSide>,
    pub created_at: Option<NaiveDateTime>,
}

/// One live (non-superseded) round of a game's append-only log.
#[derive(Debug, Clone)]
pub struct StoredRound {
    pub round_id: i64,
    pub seq: u32,
    pub input: RoundInput,
}

/// Declaration joined with its game context, for ranking aggregation.
#[derive(Debug, Clone)]
pub struct DeclarationRow {
    pub game_id: i64,
    pub play_date: NaiveDate,
    pub player_id: i64,
    pub kind: String,
    pub success: bool,
}
