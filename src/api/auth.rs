use anyhow::Result;
use axum::http::HeaderMap;
use rusqlite::Connection;

use crate::database::players;
use crate::domain::Role;

/// Pull the access code out of the Authorization header. Both
/// "Bearer <code>" and a bare code are accepted.
pub fn bearer_code(headers: &HeaderMap) -> Option<String> {
    let value = headers.get("Authorization")?.to_str().ok()?;
    let code = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    if code.is_empty() {
        None
    } else {
        Some(code.to_string())
    }
}

/// Re-derive the caller's role from a presented code. The admin code comes
/// from configuration; anything else is matched against active player
/// codes. `None` means the code is missing or matches nobody; whatever
/// role the client claims for itself is never consulted.
pub fn role_for_code(conn: &Connection, admin_code: &str, code: &str) -> Result<Option<Role>> {
    if code == admin_code {
        return Ok(Some(Role::Admin));
    }

    Ok(players::find_by_code(conn, code)?.map(|player| Role::Player {
        id: player.id,
        name: player.name,
    }))
}

pub fn role_from_headers(
    conn: &Connection,
    admin_code: &str,
    headers: &HeaderMap,
) -> Result<Option<Role>> {
    match bearer_code(headers) {
        Some(code) => role_for_code(conn, admin_code, &code),
        None => Ok(None),
    }
}
