use anyhow::Result;
use chrono::{Duration, Local};
use log::{error, info};

use crate::config::settings::CleanupSettings;
use crate::database::{self, DbPool};
use crate::domain::GameStatus;

/// Background sweep that abandons games left unfinished at the table.
/// Abandoned games stay in the database for audit but are invisible to
/// ranking aggregation.
pub struct CleanupService {
    pool: DbPool,
    settings: CleanupSettings,
}

impl CleanupService {
    pub fn new(pool: DbPool, settings: CleanupSettings) -> Self {
        Self { pool, settings }
    }

    /// One pass: flag every in-progress game older than the staleness
    /// cutoff. Returns how many games were abandoned.
    pub fn run_once(&self) -> Result<usize> {
        let conn = database::get_connection(&self.pool)?;
        let cutoff = Local::now().date_naive() - Duration::days(self.settings.stale_after_days);

        let stale = database::games::list_stale_in_progress(&conn, cutoff)?;
        for game in &stale {
            database::games::set_status(&conn, game.id, GameStatus::Abandoned, None)?;
        }

        if stale.is_empty() {
            info!("Cleanup sweep: no stale games");
        } else {
            info!(
                "Cleanup sweep: abandoned {} stale game(s) older than {}",
                stale.len(),
                cutoff
            );
        }
        Ok(stale.len())
    }

    /// Periodic sweep on the server's runtime. The first tick fires
    /// immediately, so stale games are cleared right after startup.
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(std::time::Duration::from_secs(
                self.settings.sweep_interval_secs,
            ));
            loop {
                interval.tick().await;
                if let Err(e) = self.run_once() {
                    error!("Cleanup sweep failed: {e:?}");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::database::{connection::create_memory_pool, games, players, setup::apply_schema};
    use crate::domain::TeamSlots;

    #[test]
    fn abandons_only_stale_in_progress_games() {
        let pool = create_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        apply_schema(&conn).unwrap();
        for (name, code) in [("a", "c1"), ("b", "c2"), ("c", "c3"), ("d", "c4")] {
            players::insert_player(&conn, name, code, None).unwrap();
        }
        let slots = TeamSlots::new([1, 2], [3, 4]);

        let old_date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let stale = games::insert_game(&conn, old_date, &slots).unwrap();
        let fresh = games::insert_game(&conn, Local::now().date_naive(), &slots).unwrap();
        let finished = games::insert_game(&conn, old_date, &slots).unwrap();
        games::update_totals(
            &conn,
            finished.id,
            1000,
            -1000,
            GameStatus::Completed,
            Some(crate::domain::TeamSide::A),
        )
        .unwrap();
        drop(conn);

        let service = CleanupService::new(pool.clone(), CleanupSettings::default());
        assert_eq!(service.run_once().unwrap(), 1);

        let conn = pool.get().unwrap();
        assert_eq!(
            games::find_by_id(&conn, stale.id).unwrap().unwrap().status,
            GameStatus::Abandoned
        );
        assert_eq!(
            games::find_by_id(&conn, fresh.id).unwrap().unwrap().status,
            GameStatus::InProgress
        );
        assert_eq!(
            games::find_by_id(&conn, finished.id).unwrap().unwrap().status,
            GameStatus::Completed
        );
    }
}
