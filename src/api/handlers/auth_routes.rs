use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use std::sync::Arc;

use crate::api::auth;
use crate::api::models::{AuthResponse, VerifyRequest};
use crate::domain::Role;

use super::{connect, internal_error, AppState};

/// Shared-code login. The response tells the client who it is; the client
/// keeps the code and presents it again on every privileged request.
pub async fn verify_code(
    State(state): State<Arc<AppState>>,
    Json(request): Json<VerifyRequest>,
) -> Response {
    let conn = match connect(&state) {
        Ok(conn) => conn,
        Err(response) => return response,
    };

    let role = match auth::role_for_code(&conn, &state.config.server.admin_code, request.code.trim())
    {
        Ok(Some(role)) => role,
        Ok(None) => return (StatusCode::UNAUTHORIZED, "Unknown access code").into_response(),
        Err(err) => return internal_error(err),
    };

    let response = match role {
        Role::Admin => AuthResponse {
            role: "admin".to_string(),
            player_id: None,
            player_name: None,
        },
        Role::Player { id, name } => AuthResponse {
            role: "player".to_string(),
            player_id: Some(id),
            player_name: Some(name),
        },
    };
    Json(response).into_response()
}
