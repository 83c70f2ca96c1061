use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use rusqlite::Connection;

use crate::api::auth;
use crate::config::settings::AppConfig;
use crate::database::{DbConn, DbPool};
use crate::domain::Role;
use crate::errors::ServiceError;
use crate::scoring::ScoringError;

pub mod admin;
pub mod auth_routes;
pub mod games;
pub mod players;
pub mod stats;

pub struct AppState {
    pub pool: DbPool,
    pub config: AppConfig,
}

/// Grab a pooled connection or bail out with a 500.
pub fn connect(state: &AppState) -> Result<DbConn, Response> {
    state.pool.get().map_err(|_| {
        (StatusCode::INTERNAL_SERVER_ERROR, "DB Connection Error").into_response()
    })
}

pub fn internal_error(err: anyhow::Error) -> Response {
    log::error!("Request failed: {err:?}");
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}

pub fn service_error(err: ServiceError) -> Response {
    let status = match &err {
        ServiceError::NotFound(_) | ServiceError::RoundMissing(_) => StatusCode::NOT_FOUND,
        ServiceError::RoundExists(_) | ServiceError::Invalid(_) => StatusCode::BAD_REQUEST,
        ServiceError::Scoring(ScoringError::GameCompleted)
        | ServiceError::Scoring(ScoringError::GameAbandoned) => StatusCode::CONFLICT,
        ServiceError::Scoring(_) => StatusCode::BAD_REQUEST,
        ServiceError::Internal(inner) => {
            log::error!("Request failed: {inner:?}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response();
        }
    };
    (status, err.to_string()).into_response()
}

/// Role of the caller, re-derived from the presented code on every call.
pub fn require_role(
    conn: &Connection,
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Role, Response> {
    match auth::role_from_headers(conn, &state.config.server.admin_code, headers) {
        Ok(Some(role)) => Ok(role),
        Ok(None) => Err((StatusCode::UNAUTHORIZED, "Invalid or missing access code").into_response()),
        Err(err) => Err(internal_error(err)),
    }
}

pub fn require_admin(
    conn: &Connection,
    state: &AppState,
    headers: &HeaderMap,
) -> Result<(), Response> {
    let role = require_role(conn, state, headers)?;
    if role.is_admin() {
        Ok(())
    } else {
        Err((StatusCode::FORBIDDEN, "Admin access required").into_response())
    }
}
