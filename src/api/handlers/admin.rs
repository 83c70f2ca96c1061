use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use std::sync::Arc;

use crate::api::models::RosterEntry;
use crate::database::players;

use super::{connect, internal_error, require_admin, AppState};

/// Full roster including access codes and deactivated players.
pub async fn roster(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let conn = match connect(&state) {
        Ok(conn) => conn,
        Err(response) => return response,
    };
    if let Err(response) = require_admin(&conn, &state, &headers) {
        return response;
    }

    match players::list_all(&conn) {
        Ok(rows) => {
            let entries: Vec<RosterEntry> = rows
                .into_iter()
                .map(|player| RosterEntry {
                    id: player.id,
                    name: player.name,
                    code: player.code,
                    profile_url: player.profile_url,
                    active: player.active,
                })
                .collect();
            Json(entries).into_response()
        }
        Err(err) => internal_error(err),
    }
}

/// Wipe every table. There is deliberately no partial variant; per-entity
/// cleanup goes through the regular endpoints.
pub async fn reset_all(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let mut conn = match connect(&state) {
        Ok(conn) => conn,
        Err(response) => return response,
    };
    if let Err(response) = require_admin(&conn, &state, &headers) {
        return response;
    }

    let result = (|| -> anyhow::Result<()> {
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM declarations", [])?;
        tx.execute("DELETE FROM rounds", [])?;
        tx.execute("DELETE FROM games", [])?;
        tx.execute("DELETE FROM players", [])?;
        tx.commit()?;
        Ok(())
    })();

    match result {
        Ok(()) => {
            log::warn!("Admin wiped all data");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(err) => internal_error(err),
    }
}
