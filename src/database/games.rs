use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::{BonusKind, GameStatus, TeamSide, TeamSlots};
use crate::scoring::{BonusDeclaration, RoundInput};

use super::models::{DeclarationRow, GameRow, StoredRound};

const GAME_COLUMNS: &str = "id, play_date, team_a_first, team_a_second, team_b_first, \
     team_b_second, score_a, score_b, status, winner, created_at";

pub fn insert_game(conn: &Connection, play_date: NaiveDate, slots: &TeamSlots) -> Result<GameRow> {
    let sql = format!(
        "INSERT INTO games (play_date, team_a_first, team_a_second, team_b_first, team_b_second) \
         VALUES (?1, ?2, ?3, ?4, ?5) RETURNING {GAME_COLUMNS}"
    );

    conn.query_row(
        &sql,
        params![
            play_date,
            slots.team_a[0],
            slots.team_a[1],
            slots.team_b[0],
            slots.team_b[1]
        ],
        parse_game_row,
    )
    .context("Failed to insert game")
}

pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<GameRow>> {
    let sql = format!("SELECT {GAME_COLUMNS} FROM games WHERE id = ?1");

    conn.query_row(&sql, params![id], parse_game_row)
        .optional()
        .context("Failed to query game by id")
}

pub fn latest(conn: &Connection) -> Result<Option<GameRow>> {
    let sql = format!("SELECT {GAME_COLUMNS} FROM games ORDER BY id DESC LIMIT 1");

    conn.query_row(&sql, [], parse_game_row)
        .optional()
        .context("Failed to query latest game")
}

pub fn list_completed(conn: &Connection) -> Result<Vec<GameRow>> {
    let sql = format!("SELECT {GAME_COLUMNS} FROM games WHERE status = 'completed' ORDER BY id");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], parse_game_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn list_recent_completed(conn: &Connection, limit: usize) -> Result<Vec<GameRow>> {
    let sql = format!(
        "SELECT {GAME_COLUMNS} FROM games WHERE status = 'completed' ORDER BY id DESC LIMIT ?1"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![limit as i64], parse_game_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn list_stale_in_progress(conn: &Connection, cutoff: NaiveDate) -> Result<Vec<GameRow>> {
    let sql = format!(
        "SELECT {GAME_COLUMNS} FROM games WHERE status = 'in_progress' AND play_date < ?1"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![cutoff], parse_game_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn update_totals(
    conn: &Connection,
    game_id: i64,
    score_a: i32,
    score_b: i32,
    status: GameStatus,
    winner: Option<TeamSide>,
) -> Result<()> {
    conn.execute(
        "UPDATE games SET score_a = ?1, score_b = ?2, status = ?3, winner = ?4 WHERE id = ?5",
        params![
            score_a,
            score_b,
            status.as_str(),
            winner.map(TeamSide::as_str),
            game_id
        ],
    )
    .context("Failed to update game totals")?;
    Ok(())
}

pub fn set_status(
    conn: &Connection,
    game_id: i64,
    status: GameStatus,
    winner: Option<TeamSide>,
) -> Result<()> {
    conn.execute(
        "UPDATE games SET status = ?1, winner = ?2 WHERE id = ?3",
        params![status.as_str(), winner.map(TeamSide::as_str), game_id],
    )
    .context("Failed to update game status")?;
    Ok(())
}

// --- Round log ---

/// Live rounds of a game, ordered by sequence number. Superseded rows stay
/// in the table for audit but are invisible here.
pub fn load_rounds(conn: &Connection, game_id: i64) -> Result<Vec<StoredRound>> {
    let sql = "SELECT id, seq, card_points, sweep FROM rounds \
               WHERE game_id = ?1 AND superseded = 0 ORDER BY seq";

    let mut stmt = conn.prepare(sql)?;
    let bare_rounds = stmt
        .query_map(params![game_id], |row| {
            let sweep_text: Option<String> = row.get(3)?;
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, u32>(1)?,
                row.get::<_, i32>(2)?,
                sweep_text,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut rounds = Vec::with_capacity(bare_rounds.len());
    for (round_id, seq, card_points, sweep_text) in bare_rounds {
        rounds.push(StoredRound {
            round_id,
            seq,
            input: RoundInput {
                card_points,
                sweep: sweep_text.as_deref().and_then(TeamSide::parse),
                declarations: load_declarations(conn, round_id)?,
            },
        });
    }

    Ok(rounds)
}

fn load_declarations(conn: &Connection, round_id: i64) -> Result<Vec<BonusDeclaration>> {
    let sql = "SELECT player_id, kind, success FROM declarations WHERE round_id = ?1 ORDER BY id";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![round_id], |row| {
            let kind_text: String = row.get(1)?;
            let kind = BonusKind::parse(&kind_text).ok_or_else(|| {
                rusqlite::Error::FromSqlConversionFailure(
                    1,
                    rusqlite::types::Type::Text,
                    format!("unknown bonus kind: {kind_text}").into(),
                )
            })?;
            Ok(BonusDeclaration {
                player_id: row.get(0)?,
                kind,
                success: row.get(2)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn insert_round(
    conn: &Connection,
    game_id: i64,
    seq: u32,
    input: &RoundInput,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO rounds (game_id, seq, card_points, sweep) VALUES (?1, ?2, ?3, ?4)",
        params![
            game_id,
            seq,
            input.card_points,
            input.sweep.map(TeamSide::as_str)
        ],
    )
    .context("Failed to insert round")?;
    let round_id = conn.last_insert_rowid();

    for declaration in &input.declarations {
        conn.execute(
            "INSERT INTO declarations (round_id, player_id, kind, success) VALUES (?1, ?2, ?3, ?4)",
            params![
                round_id,
                declaration.player_id,
                declaration.kind.as_str(),
                declaration.success
            ],
        )
        .context("Failed to insert declaration")?;
    }

    Ok(round_id)
}

/// Correction marker: the old row stays in the log, flagged as replaced.
pub fn supersede_round(conn: &Connection, game_id: i64, seq: u32) -> Result<usize> {
    conn.execute(
        "UPDATE rounds SET superseded = 1 WHERE game_id = ?1 AND seq = ?2 AND superseded = 0",
        params![game_id, seq],
    )
    .context("Failed to supersede round")
}

pub fn supersede_after(conn: &Connection, game_id: i64, seq: u32) -> Result<usize> {
    conn.execute(
        "UPDATE rounds SET superseded = 1 WHERE game_id = ?1 AND seq > ?2 AND superseded = 0",
        params![game_id, seq],
    )
    .context("Failed to supersede trailing rounds")
}

pub fn supersede_all(conn: &Connection, game_id: i64) -> Result<usize> {
    conn.execute(
        "UPDATE rounds SET superseded = 1 WHERE game_id = ?1 AND superseded = 0",
        params![game_id],
    )
    .context("Failed to supersede all rounds")
}

/// Declarations of live rounds of completed games, with the game context
/// the aggregator filters seasons by.
pub fn completed_declarations(conn: &Connection) -> Result<Vec<DeclarationRow>> {
    let sql = "SELECT g.id, g.play_date, d.player_id, d.kind, d.success \
               FROM declarations d \
               JOIN rounds r ON d.round_id = r.id AND r.superseded = 0 \
               JOIN games g ON r.game_id = g.id AND g.status = 'completed' \
               ORDER BY d.id";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(DeclarationRow {
                game_id: row.get(0)?,
                play_date: row.get(1)?,
                player_id: row.get(2)?,
                kind: row.get(3)?,
                success: row.get(4)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

fn parse_game_row(row: &rusqlite::Row) -> rusqlite::Result<GameRow> {
    let status_text: String = row.get(8)?;
    let status = GameStatus::parse(&status_text).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            8,
            rusqlite::types::Type::Text,
            format!("unknown game status: {status_text}").into(),
        )
    })?;
    let winner_text: Option<String> = row.get(9)?;

    Ok(GameRow {
        id: row.get(0)?,
        play_date: row.get(1)?,
        slots: TeamSlots::new(
            [row.get(2)?, row.get(3)?],
            [row.get(4)?, row.get(5)?],
        ),
        score_a: row.get(6)?,
        score_b: row.get(7)?,
        status,
        winner: winner_text.as_deref().and_then(TeamSide::parse),
        created_at: row.get(10)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{connection::create_memory_pool, players, setup::apply_schema};

    fn seeded_game(conn: &Connection) -> GameRow {
        apply_schema(conn).unwrap();
        for (name, code) in [("a", "c1"), ("b", "c2"), ("c", "c3"), ("d", "c4")] {
            players::insert_player(conn, name, code, None).unwrap();
        }
        let slots = TeamSlots::new([1, 2], [3, 4]);
        insert_game(conn, NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(), &slots).unwrap()
    }

    #[test]
    fn round_log_roundtrip() {
        let pool = create_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let game = seeded_game(&conn);

        let input = RoundInput {
            card_points: 35,
            sweep: Some(TeamSide::B),
            declarations: vec![BonusDeclaration {
                player_id: 1,
                kind: BonusKind::Big,
                success: false,
            }],
        };
        insert_round(&conn, game.id, 1, &input).unwrap();

        let rounds = load_rounds(&conn, game.id).unwrap();
        assert_eq!(rounds.len(), 1);
        assert_eq!(rounds[0].seq, 1);
        assert_eq!(rounds[0].input, input);
    }

    #[test]
    fn superseded_rounds_disappear_from_loads_but_stay_in_the_log() {
        let pool = create_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let game = seeded_game(&conn);

        let original = RoundInput {
            card_points: 10,
            sweep: None,
            declarations: vec![],
        };
        let corrected = RoundInput {
            card_points: -10,
            sweep: None,
            declarations: vec![],
        };
        insert_round(&conn, game.id, 1, &original).unwrap();
        assert_eq!(supersede_round(&conn, game.id, 1).unwrap(), 1);
        insert_round(&conn, game.id, 1, &corrected).unwrap();

        let rounds = load_rounds(&conn, game.id).unwrap();
        assert_eq!(rounds.len(), 1);
        assert_eq!(rounds[0].input.card_points, -10);

        let total_rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM rounds WHERE game_id = ?1", params![game.id], |r| {
                r.get(0)
            })
            .unwrap();
        assert_eq!(total_rows, 2);
    }

    #[test]
    fn completed_declarations_skip_unfinished_games() {
        let pool = create_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let game = seeded_game(&conn);

        let input = RoundInput {
            card_points: 0,
            sweep: None,
            declarations: vec![BonusDeclaration {
                player_id: 2,
                kind: BonusKind::Small,
                success: true,
            }],
        };
        insert_round(&conn, game.id, 1, &input).unwrap();

        assert!(completed_declarations(&conn).unwrap().is_empty());

        update_totals(&conn, game.id, 1000, -1000, GameStatus::Completed, Some(TeamSide::A))
            .unwrap();
        let declarations = completed_declarations(&conn).unwrap();
        assert_eq!(declarations.len(), 1);
        assert_eq!(declarations[0].player_id, 2);
    }
}
