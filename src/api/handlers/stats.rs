use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use rusqlite::Connection;
use std::collections::HashMap;
use std::sync::Arc;

use crate::api::models::{
    as_percent, LeaderboardEntry, PlayerStatsResponse, SeasonParams, TeamLeaderboardEntry,
    TeamStatsResponse,
};
use crate::database::players;
use crate::services::stats_service::{PlayerReport, StatsService};
use crate::stats::PlayerStanding;

use super::{connect, internal_error, AppState};

fn standing_to_response(
    standing: &PlayerStanding,
    name: String,
    profile_url: Option<String>,
    recent_games: i64,
    recent_wins: i64,
) -> PlayerStatsResponse {
    let recent_rate = if recent_games == 0 {
        0.0
    } else {
        recent_wins as f64 / recent_games as f64
    };
    PlayerStatsResponse {
        player_id: standing.player_id,
        player_name: name,
        profile_url,
        total_games: standing.games_played,
        wins: standing.wins,
        losses: standing.games_played - standing.wins,
        win_rate: as_percent(standing.win_rate),
        recent_games,
        recent_wins,
        recent_win_rate: as_percent(recent_rate),
        small_attempts: standing.small.attempts,
        small_successes: standing.small.successes,
        small_success_rate: as_percent(standing.small.success_rate()),
        big_attempts: standing.big.attempts,
        big_successes: standing.big.successes,
        big_success_rate: as_percent(standing.big.success_rate()),
    }
}

fn report_to_response(report: PlayerReport) -> PlayerStatsResponse {
    standing_to_response(
        &report.standing,
        report.player.name.clone(),
        report.player.profile_url.clone(),
        report.recent_games,
        report.recent_wins,
    )
}

fn player_names(conn: &Connection) -> anyhow::Result<HashMap<i64, (String, Option<String>)>> {
    Ok(players::list_all(conn)?
        .into_iter()
        .map(|player| (player.id, (player.name, player.profile_url)))
        .collect())
}

pub async fn player_stats(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<i64>,
    Query(params): Query<SeasonParams>,
) -> Response {
    let conn = match connect(&state) {
        Ok(conn) => conn,
        Err(response) => return response,
    };

    match StatsService::player_report(&conn, player_id, params.year) {
        Ok(Some(report)) => Json(report_to_response(report)).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "Player not found").into_response(),
        Err(err) => internal_error(err),
    }
}

pub async fn leaderboard(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SeasonParams>,
) -> Response {
    let conn = match connect(&state) {
        Ok(conn) => conn,
        Err(response) => return response,
    };

    let reports = match StatsService::leaderboard(&conn, params.year) {
        Ok(reports) => reports,
        Err(err) => return internal_error(err),
    };

    let entries: Vec<LeaderboardEntry> = reports
        .into_iter()
        .enumerate()
        .map(|(idx, report)| LeaderboardEntry {
            rank: idx + 1,
            stats: report_to_response(report),
        })
        .collect();

    Json(entries).into_response()
}

pub async fn team_leaderboard(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SeasonParams>,
) -> Response {
    let conn = match connect(&state) {
        Ok(conn) => conn,
        Err(response) => return response,
    };

    let standings = match StatsService::team_leaderboard(&conn, params.year) {
        Ok(standings) => standings,
        Err(err) => return internal_error(err),
    };
    let names = match player_names(&conn) {
        Ok(names) => names,
        Err(err) => return internal_error(err),
    };

    let name_of = |id: i64| {
        names
            .get(&id)
            .map(|(name, _)| name.clone())
            .unwrap_or_else(|| "Unknown".to_string())
    };

    let entries: Vec<TeamLeaderboardEntry> = standings
        .iter()
        .enumerate()
        .map(|(idx, standing)| TeamLeaderboardEntry {
            rank: idx + 1,
            stats: TeamStatsResponse {
                player_one_id: standing.player_ids.0,
                player_two_id: standing.player_ids.1,
                player_one_name: name_of(standing.player_ids.0),
                player_two_name: name_of(standing.player_ids.1),
                total_games: standing.games_played,
                wins: standing.wins,
                losses: standing.games_played - standing.wins,
                win_rate: as_percent(standing.win_rate),
            },
        })
        .collect();

    Json(entries).into_response()
}
