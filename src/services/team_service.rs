use rand::seq::SliceRandom;
use rusqlite::Connection;

use crate::database::players;
use crate::domain::TeamSlots;
use crate::errors::ServiceError;

/// Random 2:2 pairing of four players for one game. Teams live only as the
/// slot assignment of the game they were drawn for.
pub fn assign_teams(conn: &Connection, player_ids: &[i64]) -> Result<TeamSlots, ServiceError> {
    if player_ids.len() != 4 {
        return Err(ServiceError::Invalid(
            "exactly four players must be selected".to_string(),
        ));
    }

    let mut ids = player_ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    if ids.len() != 4 {
        return Err(ServiceError::Invalid(
            "the selected players must be distinct".to_string(),
        ));
    }

    if players::count_active_among(conn, &ids)? != 4 {
        return Err(ServiceError::NotFound("player"));
    }

    ids.shuffle(&mut rand::rng());
    Ok(TeamSlots::new([ids[0], ids[1]], [ids[2], ids[3]]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{connection::create_memory_pool, setup::apply_schema};

    fn seeded_conn() -> crate::database::DbPool {
        let pool = create_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        apply_schema(&conn).unwrap();
        for (name, code) in [("a", "c1"), ("b", "c2"), ("c", "c3"), ("d", "c4")] {
            players::insert_player(&conn, name, code, None).unwrap();
        }
        pool
    }

    #[test]
    fn pairs_all_four_players_exactly_once() {
        let pool = seeded_conn();
        let conn = pool.get().unwrap();

        let slots = assign_teams(&conn, &[1, 2, 3, 4]).unwrap();
        assert!(slots.is_valid());
        let mut ids = slots.all_players().to_vec();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn rejects_wrong_count_and_duplicates() {
        let pool = seeded_conn();
        let conn = pool.get().unwrap();

        assert!(matches!(
            assign_teams(&conn, &[1, 2, 3]),
            Err(ServiceError::Invalid(_))
        ));
        assert!(matches!(
            assign_teams(&conn, &[1, 2, 3, 3]),
            Err(ServiceError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_unknown_players() {
        let pool = seeded_conn();
        let conn = pool.get().unwrap();

        assert!(matches!(
            assign_teams(&conn, &[1, 2, 3, 99]),
            Err(ServiceError::NotFound(_))
        ));
    }
}
