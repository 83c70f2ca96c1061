use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{BonusKind, TeamSide};
use crate::scoring::{BonusDeclaration, RoundInput};

// --- Requests ---

#[derive(Deserialize)]
pub struct VerifyRequest {
    pub code: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlayerRequest {
    pub name: String,
    pub code: String,
    pub profile_url: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlayerRequest {
    pub name: Option<String>,
    pub code: Option<String>,
    pub profile_url: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignTeamsRequest {
    pub player_ids: Vec<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameRequest {
    pub team_a: [i64; 2],
    pub team_b: [i64; 2],
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundEventRequest {
    pub player_id: i64,
    pub kind: BonusKind,
    pub success: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundRequest {
    pub round_number: Option<u32>,
    pub card_points: i32,
    pub sweep: Option<TeamSide>,
    #[serde(default)]
    pub events: Vec<RoundEventRequest>,
}

impl RoundRequest {
    pub fn into_input(self) -> (Option<u32>, RoundInput) {
        let declarations = self
            .events
            .into_iter()
            .map(|event| BonusDeclaration {
                player_id: event.player_id,
                kind: event.kind,
                success: event.success,
            })
            .collect();
        (
            self.round_number,
            RoundInput {
                card_points: self.card_points,
                sweep: self.sweep,
                declarations,
            },
        )
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayRecordParams {
    /// Comma separated player ids, e.g. "1,2".
    pub team_a_ids: String,
    pub team_b_ids: String,
}

#[derive(Deserialize)]
pub struct SeasonParams {
    pub year: Option<i32>,
}

// --- Responses ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResponse {
    pub id: i64,
    pub name: String,
    pub profile_url: Option<String>,
    pub active: bool,
}

/// Admin view: includes the access code so the table owner can hand it out.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub profile_url: Option<String>,
    pub active: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairRecord {
    pub games_played: i64,
    pub wins: i64,
    pub win_rate: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignTeamsResponse {
    pub team_a: [i64; 2],
    pub team_b: [i64; 2],
    pub team_a_record: PairRecord,
    pub team_b_record: PairRecord,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundEventResponse {
    pub player_id: i64,
    pub kind: BonusKind,
    pub success: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundResponse {
    pub round_number: u32,
    pub card_points: i32,
    pub sweep: Option<TeamSide>,
    pub team_a_delta: i32,
    pub team_b_delta: i32,
    pub team_a_bonus: i32,
    pub team_b_bonus: i32,
    pub team_a_total: i32,
    pub team_b_total: i32,
    pub events: Vec<RoundEventResponse>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatedPlayer {
    pub id: i64,
    pub name: String,
    pub profile_url: Option<String>,
    pub win_rate: f64,
    pub recent_win_rate: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameDetailResponse {
    pub id: i64,
    pub play_date: NaiveDate,
    pub status: String,
    pub winner: Option<TeamSide>,
    pub team_a_players: Vec<SeatedPlayer>,
    pub team_b_players: Vec<SeatedPlayer>,
    pub score_a: i32,
    pub score_b: i32,
    pub team_a_record: PairRecord,
    pub team_b_record: PairRecord,
    pub rounds: Vec<RoundResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishedGameResponse {
    pub id: i64,
    pub play_date: NaiveDate,
    pub team_a_names: Vec<String>,
    pub team_b_names: Vec<String>,
    pub score_a: i32,
    pub score_b: i32,
    pub winner: Option<TeamSide>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OngoingGameResponse {
    pub id: i64,
    pub play_date: NaiveDate,
    pub team_a_players: Vec<SeatedPlayer>,
    pub team_b_players: Vec<SeatedPlayer>,
    pub score_a: i32,
    pub score_b: i32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayRecordResponse {
    pub team_a_wins: i64,
    pub team_b_wins: i64,
    pub total_games: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStatsResponse {
    pub player_id: i64,
    pub player_name: String,
    pub profile_url: Option<String>,
    pub total_games: i64,
    pub wins: i64,
    pub losses: i64,
    pub win_rate: f64,
    pub recent_games: i64,
    pub recent_wins: i64,
    pub recent_win_rate: f64,
    pub small_attempts: i64,
    pub small_successes: i64,
    pub small_success_rate: f64,
    pub big_attempts: i64,
    pub big_successes: i64,
    pub big_success_rate: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub stats: PlayerStatsResponse,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStatsResponse {
    pub player_one_id: i64,
    pub player_two_id: i64,
    pub player_one_name: String,
    pub player_two_name: String,
    pub total_games: i64,
    pub wins: i64,
    pub losses: i64,
    pub win_rate: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamLeaderboardEntry {
    pub rank: usize,
    pub stats: TeamStatsResponse,
}

/// Rates leave the core as fractions; the API reports percentages with
/// one decimal, matching the scoreboard display.
pub fn as_percent(rate: f64) -> f64 {
    (rate * 1000.0).round() / 10.0
}
