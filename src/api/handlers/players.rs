use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use std::sync::Arc;

use crate::api::models::{CreatePlayerRequest, PlayerResponse, UpdatePlayerRequest};
use crate::database::{players, PlayerRow};
use crate::domain::Role;

use super::{connect, internal_error, require_admin, require_role, AppState};

fn to_response(player: PlayerRow) -> PlayerResponse {
    PlayerResponse {
        id: player.id,
        name: player.name,
        profile_url: player.profile_url,
        active: player.active,
    }
}

fn default_profile_url(name: &str) -> String {
    format!("https://ui-avatars.com/api/?name={name}&size=150&background=9ca3af&color=fff")
}

pub async fn list_players(State(state): State<Arc<AppState>>) -> Response {
    let conn = match connect(&state) {
        Ok(conn) => conn,
        Err(response) => return response,
    };

    match players::list_active(&conn) {
        Ok(rows) => Json(rows.into_iter().map(to_response).collect::<Vec<_>>()).into_response(),
        Err(err) => internal_error(err),
    }
}

pub async fn get_player(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<i64>,
) -> Response {
    let conn = match connect(&state) {
        Ok(conn) => conn,
        Err(response) => return response,
    };

    match players::find_by_id(&conn, player_id) {
        Ok(Some(player)) => Json(to_response(player)).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "Player not found").into_response(),
        Err(err) => internal_error(err),
    }
}

pub async fn create_player(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<CreatePlayerRequest>,
) -> Response {
    let conn = match connect(&state) {
        Ok(conn) => conn,
        Err(response) => return response,
    };
    if let Err(response) = require_admin(&conn, &state, &headers) {
        return response;
    }

    let code = request.code.trim().to_string();
    if code.is_empty() || code.contains(char::is_whitespace) {
        return (StatusCode::BAD_REQUEST, "Access code must not contain spaces").into_response();
    }
    match players::code_in_use(&conn, &code, None) {
        Ok(true) => return (StatusCode::BAD_REQUEST, "Access code already in use").into_response(),
        Ok(false) => {}
        Err(err) => return internal_error(err),
    }

    let profile_url = request
        .profile_url
        .unwrap_or_else(|| default_profile_url(&request.name));

    match players::insert_player(&conn, &request.name, &code, Some(&profile_url)) {
        Ok(player) => {
            log::info!("Player created: {} (id {})", player.name, player.id);
            Json(to_response(player)).into_response()
        }
        Err(err) => internal_error(err),
    }
}

/// Players may edit their own entry; admins may edit anyone.
pub async fn update_player(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<i64>,
    headers: HeaderMap,
    Json(request): Json<UpdatePlayerRequest>,
) -> Response {
    let conn = match connect(&state) {
        Ok(conn) => conn,
        Err(response) => return response,
    };
    let role = match require_role(&conn, &state, &headers) {
        Ok(role) => role,
        Err(response) => return response,
    };
    let allowed = match &role {
        Role::Admin => true,
        Role::Player { id, .. } => *id == player_id,
    };
    if !allowed {
        return (StatusCode::FORBIDDEN, "You may only edit your own profile").into_response();
    }

    let existing = match players::find_by_id(&conn, player_id) {
        Ok(Some(player)) => player,
        Ok(None) => return (StatusCode::NOT_FOUND, "Player not found").into_response(),
        Err(err) => return internal_error(err),
    };

    let name = request.name.unwrap_or(existing.name);
    let code = match request.code {
        Some(code) => {
            let code = code.trim().to_string();
            if code.is_empty() || code.contains(char::is_whitespace) {
                return (StatusCode::BAD_REQUEST, "Access code must not contain spaces")
                    .into_response();
            }
            match players::code_in_use(&conn, &code, Some(player_id)) {
                Ok(true) => {
                    return (StatusCode::BAD_REQUEST, "Access code already in use").into_response()
                }
                Ok(false) => code,
                Err(err) => return internal_error(err),
            }
        }
        None => existing.code,
    };
    let profile_url = request.profile_url.or(existing.profile_url);

    match players::update_player(&conn, player_id, &name, &code, profile_url.as_deref()) {
        Ok(player) => Json(to_response(player)).into_response(),
        Err(err) => internal_error(err),
    }
}

/// Soft delete: the player disappears from rosters and can no longer log
/// in, but their games and stats history stays intact.
pub async fn deactivate_player(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let conn = match connect(&state) {
        Ok(conn) => conn,
        Err(response) => return response,
    };
    if let Err(response) = require_admin(&conn, &state, &headers) {
        return response;
    }

    match players::find_by_id(&conn, player_id) {
        Ok(Some(_)) => {}
        Ok(None) => return (StatusCode::NOT_FOUND, "Player not found").into_response(),
        Err(err) => return internal_error(err),
    }

    match players::deactivate(&conn, player_id) {
        Ok(()) => {
            log::info!("Player {player_id} deactivated");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(err) => internal_error(err),
    }
}
