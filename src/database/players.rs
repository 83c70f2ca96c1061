use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use super::models::PlayerRow;

const PLAYER_COLUMNS: &str = "id, name, code, profile_url, is_admin, active, created_at";

pub fn insert_player(
    conn: &Connection,
    name: &str,
    code: &str,
    profile_url: Option<&str>,
) -> Result<PlayerRow> {
    let sql = format!(
        "INSERT INTO players (name, code, profile_url) VALUES (?1, ?2, ?3) RETURNING {PLAYER_COLUMNS}"
    );

    conn.query_row(&sql, params![name, code, profile_url], parse_player_row)
        .context("Failed to insert new player")
}

pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<PlayerRow>> {
    let sql = format!("SELECT {PLAYER_COLUMNS} FROM players WHERE id = ?1");

    conn.query_row(&sql, params![id], parse_player_row)
        .optional()
        .context("Failed to query player by id")
}

pub fn find_by_code(conn: &Connection, code: &str) -> Result<Option<PlayerRow>> {
    let sql = format!("SELECT {PLAYER_COLUMNS} FROM players WHERE code = ?1 AND active = 1");

    conn.query_row(&sql, params![code], parse_player_row)
        .optional()
        .context("Failed to query player by code")
}

pub fn code_in_use(conn: &Connection, code: &str, exclude_id: Option<i64>) -> Result<bool> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM players WHERE code = ?1 AND id != ?2",
            params![code, exclude_id.unwrap_or(-1)],
            |row| row.get(0),
        )
        .context("Failed to check code uniqueness")?;
    Ok(count > 0)
}

pub fn list_active(conn: &Connection) -> Result<Vec<PlayerRow>> {
    let sql = format!("SELECT {PLAYER_COLUMNS} FROM players WHERE active = 1 ORDER BY name");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], parse_player_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn list_all(conn: &Connection) -> Result<Vec<PlayerRow>> {
    let sql = format!("SELECT {PLAYER_COLUMNS} FROM players ORDER BY created_at DESC");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], parse_player_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn update_player(
    conn: &Connection,
    id: i64,
    name: &str,
    code: &str,
    profile_url: Option<&str>,
) -> Result<PlayerRow> {
    let sql = format!(
        "UPDATE players SET name = ?1, code = ?2, profile_url = ?3 WHERE id = ?4 RETURNING {PLAYER_COLUMNS}"
    );

    conn.query_row(&sql, params![name, code, profile_url, id], parse_player_row)
        .context("Failed to update player")
}

/// Soft delete. Historical games keep referencing the row, so players are
/// deactivated instead of removed.
pub fn deactivate(conn: &Connection, id: i64) -> Result<()> {
    conn.execute("UPDATE players SET active = 0 WHERE id = ?1", params![id])
        .context("Failed to deactivate player")?;
    Ok(())
}

pub fn count_active_among(conn: &Connection, ids: &[i64]) -> Result<usize> {
    let mut count = 0;
    for id in ids {
        let found: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM players WHERE id = ?1 AND active = 1",
                params![id],
                |row| row.get(0),
            )
            .context("Failed to check player existence")?;
        count += found as usize;
    }
    Ok(count)
}

fn parse_player_row(row: &rusqlite::Row) -> rusqlite::Result<PlayerRow> {
    Ok(PlayerRow {
        id: row.get(0)?,
        name: row.get(1)?,
        code: row.get(2)?,
        profile_url: row.get(3)?,
        is_admin: row.get(4)?,
        active: row.get(5)?,
        created_at: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{connection::create_memory_pool, setup::apply_schema};

    #[test]
    fn insert_and_soft_delete() {
        let pool = create_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        apply_schema(&conn).unwrap();

        let player = insert_player(&conn, "Mina", "mina77", None).unwrap();
        assert!(player.active);
        assert!(find_by_code(&conn, "mina77").unwrap().is_some());

        deactivate(&conn, player.id).unwrap();
        // Deactivated players no longer authenticate but remain loadable.
        assert!(find_by_code(&conn, "mina77").unwrap().is_none());
        assert!(find_by_id(&conn, player.id).unwrap().is_some());
        assert!(list_active(&conn).unwrap().is_empty());
        assert_eq!(list_all(&conn).unwrap().len(), 1);
    }

    #[test]
    fn code_uniqueness_check_can_exclude_self() {
        let pool = create_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        apply_schema(&conn).unwrap();

        let player = insert_player(&conn, "Jae", "jae01", None).unwrap();
        assert!(code_in_use(&conn, "jae01", None).unwrap());
        assert!(!code_in_use(&conn, "jae01", Some(player.id)).unwrap());
        assert!(!code_in_use(&conn, "other", None).unwrap());
    }
}
