use anyhow::Result;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use chrono::{Datelike, Local};
use rusqlite::Connection;
use std::sync::Arc;

use crate::api::models::{
    as_percent, AssignTeamsRequest, AssignTeamsResponse, CreateGameRequest, FinishedGameResponse,
    GameDetailResponse, OngoingGameResponse, PairRecord, RoundEventResponse, RoundRequest,
    RoundResponse, SeatedPlayer, TodayRecordParams, TodayRecordResponse,
};
use crate::database::{games, players};
use crate::domain::{GameStatus, TeamSlots};
use crate::services::game_service::{GameDetail, GameService};
use crate::services::stats_service::StatsService;
use crate::services::team_service;
use crate::stats::TeamStanding;

use super::{connect, internal_error, require_admin, require_role, service_error, AppState};

fn game_service(state: &AppState) -> GameService {
    GameService::new(state.config.scoring.clone())
}

fn pair_record(standing: &TeamStanding) -> PairRecord {
    PairRecord {
        games_played: standing.games_played,
        wins: standing.wins,
        win_rate: as_percent(standing.win_rate),
    }
}

fn seated_player(conn: &Connection, player_id: i64) -> Result<SeatedPlayer> {
    let season = Some(Local::now().date_naive().year());
    let report = StatsService::player_report(conn, player_id, season)?;

    Ok(match report {
        Some(report) => {
            let recent_rate = if report.recent_games == 0 {
                0.0
            } else {
                report.recent_wins as f64 / report.recent_games as f64
            };
            SeatedPlayer {
                id: report.player.id,
                name: report.player.name,
                profile_url: report.player.profile_url,
                win_rate: as_percent(report.standing.win_rate),
                recent_win_rate: as_percent(recent_rate),
            }
        }
        None => SeatedPlayer {
            id: player_id,
            name: "Unknown".to_string(),
            profile_url: None,
            win_rate: 0.0,
            recent_win_rate: 0.0,
        },
    })
}

fn side_players(conn: &Connection, pair: [i64; 2]) -> Result<Vec<SeatedPlayer>> {
    pair.iter().map(|id| seated_player(conn, *id)).collect()
}

fn build_detail(
    conn: &Connection,
    detail: GameDetail,
    warning: Option<String>,
) -> Result<GameDetailResponse> {
    let game = detail.game;

    let rounds = detail
        .rounds
        .into_iter()
        .map(|round| RoundResponse {
            round_number: round.seq,
            card_points: round.input.card_points,
            sweep: round.input.sweep,
            team_a_delta: round.score.delta_a,
            team_b_delta: round.score.delta_b,
            team_a_bonus: round.score.bonus_a,
            team_b_bonus: round.score.bonus_b,
            team_a_total: round.total_a,
            team_b_total: round.total_b,
            events: round
                .input
                .declarations
                .into_iter()
                .map(|declaration| RoundEventResponse {
                    player_id: declaration.player_id,
                    kind: declaration.kind,
                    success: declaration.success,
                })
                .collect(),
        })
        .collect();

    Ok(GameDetailResponse {
        id: game.id,
        play_date: game.play_date,
        status: game.status.as_str().to_string(),
        winner: game.winner,
        team_a_players: side_players(conn, game.slots.team_a)?,
        team_b_players: side_players(conn, game.slots.team_b)?,
        score_a: game.score_a,
        score_b: game.score_b,
        team_a_record: pair_record(&StatsService::pair_record(conn, game.slots.team_a, None)?),
        team_b_record: pair_record(&StatsService::pair_record(conn, game.slots.team_b, None)?),
        rounds,
        warning,
    })
}

fn detail_response(
    conn: &Connection,
    state: &AppState,
    game_id: i64,
    warning: Option<String>,
) -> Response {
    let detail = match game_service(state).game_detail(conn, game_id) {
        Ok(detail) => detail,
        Err(err) => return service_error(err),
    };
    match build_detail(conn, detail, warning) {
        Ok(response) => Json(response).into_response(),
        Err(err) => internal_error(err),
    }
}

pub async fn assign_teams(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<AssignTeamsRequest>,
) -> Response {
    let conn = match connect(&state) {
        Ok(conn) => conn,
        Err(response) => return response,
    };
    if let Err(response) = require_role(&conn, &state, &headers) {
        return response;
    }

    let slots = match team_service::assign_teams(&conn, &request.player_ids) {
        Ok(slots) => slots,
        Err(err) => return service_error(err),
    };

    let team_a_record = match StatsService::pair_record(&conn, slots.team_a, None) {
        Ok(standing) => pair_record(&standing),
        Err(err) => return internal_error(err),
    };
    let team_b_record = match StatsService::pair_record(&conn, slots.team_b, None) {
        Ok(standing) => pair_record(&standing),
        Err(err) => return internal_error(err),
    };

    Json(AssignTeamsResponse {
        team_a: slots.team_a,
        team_b: slots.team_b,
        team_a_record,
        team_b_record,
    })
    .into_response()
}

pub async fn create_game(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<CreateGameRequest>,
) -> Response {
    let conn = match connect(&state) {
        Ok(conn) => conn,
        Err(response) => return response,
    };
    if let Err(response) = require_role(&conn, &state, &headers) {
        return response;
    }

    let slots = TeamSlots::new(request.team_a, request.team_b);
    match game_service(&state).create_game(&conn, slots) {
        Ok(game) => detail_response(&conn, &state, game.id, None),
        Err(err) => service_error(err),
    }
}

pub async fn game_detail(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<i64>,
) -> Response {
    let conn = match connect(&state) {
        Ok(conn) => conn,
        Err(response) => return response,
    };
    detail_response(&conn, &state, game_id, None)
}

#[derive(serde::Deserialize)]
pub struct FinishedParams {
    pub limit: Option<usize>,
}

pub async fn finished_games(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FinishedParams>,
) -> Response {
    let limit = params.limit.unwrap_or(10).clamp(1, 50);
    let conn = match connect(&state) {
        Ok(conn) => conn,
        Err(response) => return response,
    };

    let rows = match games::list_recent_completed(&conn, limit) {
        Ok(rows) => rows,
        Err(err) => return internal_error(err),
    };

    let mut result = Vec::with_capacity(rows.len());
    for game in rows {
        let names = |pair: [i64; 2]| -> Result<Vec<String>> {
            pair.iter()
                .map(|id| {
                    Ok(players::find_by_id(&conn, *id)?
                        .map(|p| p.name)
                        .unwrap_or_else(|| "Unknown".to_string()))
                })
                .collect()
        };
        let (team_a_names, team_b_names) =
            match (names(game.slots.team_a), names(game.slots.team_b)) {
                (Ok(a), Ok(b)) => (a, b),
                (Err(err), _) | (_, Err(err)) => return internal_error(err),
            };
        result.push(FinishedGameResponse {
            id: game.id,
            play_date: game.play_date,
            team_a_names,
            team_b_names,
            score_a: game.score_a,
            score_b: game.score_b,
            winner: game.winner,
        });
    }

    Json(result).into_response()
}

/// The scoreboard rejoin flow: only the most recent game counts, and only
/// if it is still open and the asking player is seated in it.
pub async fn ongoing_game(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<i64>,
) -> Response {
    let conn = match connect(&state) {
        Ok(conn) => conn,
        Err(response) => return response,
    };

    let latest = match games::latest(&conn) {
        Ok(latest) => latest,
        Err(err) => return internal_error(err),
    };

    let Some(game) = latest else {
        return Json(Vec::<OngoingGameResponse>::new()).into_response();
    };
    if game.status != GameStatus::InProgress || !game.slots.contains(player_id) {
        return Json(Vec::<OngoingGameResponse>::new()).into_response();
    }

    let (team_a_players, team_b_players) = match (
        side_players(&conn, game.slots.team_a),
        side_players(&conn, game.slots.team_b),
    ) {
        (Ok(a), Ok(b)) => (a, b),
        (Err(err), _) | (_, Err(err)) => return internal_error(err),
    };

    Json(vec![OngoingGameResponse {
        id: game.id,
        play_date: game.play_date,
        team_a_players,
        team_b_players,
        score_a: game.score_a,
        score_b: game.score_b,
    }])
    .into_response()
}

fn parse_pair(raw: &str) -> Option<[i64; 2]> {
    let ids: Vec<i64> = raw
        .split(',')
        .map(|part| part.trim().parse().ok())
        .collect::<Option<Vec<_>>>()?;
    if ids.len() == 2 {
        Some([ids[0], ids[1]])
    } else {
        None
    }
}

pub async fn today_record(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TodayRecordParams>,
) -> Response {
    let (Some(team_a), Some(team_b)) =
        (parse_pair(&params.team_a_ids), parse_pair(&params.team_b_ids))
    else {
        return (
            StatusCode::BAD_REQUEST,
            "Team ids must be two comma separated numbers",
        )
            .into_response();
    };

    let conn = match connect(&state) {
        Ok(conn) => conn,
        Err(response) => return response,
    };

    match StatsService::today_record(&conn, team_a, team_b) {
        Ok(record) => Json(TodayRecordResponse {
            team_a_wins: record.team_a_wins,
            team_b_wins: record.team_b_wins,
            total_games: record.team_a_wins + record.team_b_wins,
        })
        .into_response(),
        Err(err) => internal_error(err),
    }
}

pub async fn append_round(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<i64>,
    headers: HeaderMap,
    Json(request): Json<RoundRequest>,
) -> Response {
    let mut conn = match connect(&state) {
        Ok(conn) => conn,
        Err(response) => return response,
    };
    if let Err(response) = require_role(&conn, &state, &headers) {
        return response;
    }

    let (seq, input) = request.into_input();
    match game_service(&state).append_round(&mut conn, game_id, seq, input) {
        Ok(change) => detail_response(&conn, &state, game_id, change.warning),
        Err(err) => service_error(err),
    }
}

/// Historical correction; admin only. The game is replayed from round one,
/// and the response carries a warning when trailing rounds were discarded.
pub async fn replace_round(
    State(state): State<Arc<AppState>>,
    Path((game_id, seq)): Path<(i64, u32)>,
    headers: HeaderMap,
    Json(request): Json<RoundRequest>,
) -> Response {
    let mut conn = match connect(&state) {
        Ok(conn) => conn,
        Err(response) => return response,
    };
    if let Err(response) = require_admin(&conn, &state, &headers) {
        return response;
    }

    let (_, input) = request.into_input();
    match game_service(&state).replace_round(&mut conn, game_id, seq, input) {
        Ok(change) => detail_response(&conn, &state, game_id, change.warning),
        Err(err) => service_error(err),
    }
}

pub async fn delete_round(
    State(state): State<Arc<AppState>>,
    Path((game_id, seq)): Path<(i64, u32)>,
    headers: HeaderMap,
) -> Response {
    let mut conn = match connect(&state) {
        Ok(conn) => conn,
        Err(response) => return response,
    };
    if let Err(response) = require_admin(&conn, &state, &headers) {
        return response;
    }

    match game_service(&state).delete_round(&mut conn, game_id, seq) {
        Ok(change) => detail_response(&conn, &state, game_id, change.warning),
        Err(err) => service_error(err),
    }
}

pub async fn reset_game(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let mut conn = match connect(&state) {
        Ok(conn) => conn,
        Err(response) => return response,
    };
    if let Err(response) = require_role(&conn, &state, &headers) {
        return response;
    }

    match game_service(&state).reset_game(&mut conn, game_id) {
        Ok(_) => detail_response(&conn, &state, game_id, None),
        Err(err) => service_error(err),
    }
}

pub async fn abandon_game(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let conn = match connect(&state) {
        Ok(conn) => conn,
        Err(response) => return response,
    };
    if let Err(response) = require_admin(&conn, &state, &headers) {
        return response;
    }

    match game_service(&state).abandon_game(&conn, game_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => service_error(err),
    }
}
