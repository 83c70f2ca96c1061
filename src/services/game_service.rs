use anyhow::{Context, Result};
use chrono::Local;
use log::{info, warn};
use rusqlite::Connection;

use crate::config::settings::ScoringSettings;
use crate::database::{self, DbConn, GameRow, StoredRound};
use crate::domain::{GameStatus, TeamSide, TeamSlots};
use crate::errors::ServiceError;
use crate::scoring::{self, GameProgress, RoundInput, RoundScore};

/// One live round with its resolved score and the running totals after it.
#[derive(Debug, Clone)]
pub struct RoundDetail {
    pub seq: u32,
    pub input: RoundInput,
    pub score: RoundScore,
    pub total_a: i32,
    pub total_b: i32,
}

#[derive(Debug, Clone)]
pub struct GameDetail {
    pub game: GameRow,
    pub rounds: Vec<RoundDetail>,
}

/// Result of a round append/correction/delete: the reloaded game plus a
/// warning when the change moved the completion point backwards and later
/// rounds had to be discarded.
#[derive(Debug, Clone)]
pub struct RoundChange {
    pub game: GameRow,
    pub warning: Option<String>,
}

/// Orchestrates game mutations. All totals are re-derived by replaying the
/// round log through the scoring core; this service never patches totals
/// incrementally. Callers are expected to serialize writes per game.
pub struct GameService {
    scoring: ScoringSettings,
}

impl GameService {
    pub fn new(scoring: ScoringSettings) -> Self {
        Self { scoring }
    }

    pub fn create_game(
        &self,
        conn: &Connection,
        slots: TeamSlots,
    ) -> Result<GameRow, ServiceError> {
        if !slots.is_valid() {
            return Err(ServiceError::Invalid(
                "a game needs four distinct players, two per team".to_string(),
            ));
        }
        let known = database::players::count_active_among(conn, &slots.all_players())?;
        if known != 4 {
            return Err(ServiceError::NotFound("player"));
        }

        let game = database::games::insert_game(conn, Local::now().date_naive(), &slots)?;
        info!(
            "Game {} created: {:?} vs {:?}",
            game.id, slots.team_a, slots.team_b
        );
        Ok(game)
    }

    pub fn game_detail(&self, conn: &Connection, game_id: i64) -> Result<GameDetail, ServiceError> {
        let game = self.load_game(conn, game_id)?;
        let rounds = database::games::load_rounds(conn, game_id)?;
        let progress = self.replay_stored(&game, &rounds)?;

        let details = rounds
            .iter()
            .zip(progress.rounds.iter())
            .map(|(stored, outcome)| RoundDetail {
                seq: stored.seq,
                input: stored.input.clone(),
                score: outcome.score,
                total_a: outcome.total_a,
                total_b: outcome.total_b,
            })
            .collect();

        Ok(GameDetail {
            game,
            rounds: details,
        })
    }

    /// Append one round and re-check the win condition. The resolve, the
    /// insert and the totals update land in one transaction, so the caller
    /// never observes a half-applied round.
    pub fn append_round(
        &self,
        conn: &mut DbConn,
        game_id: i64,
        seq: Option<u32>,
        input: RoundInput,
    ) -> Result<RoundChange, ServiceError> {
        let game = self.load_game(conn, game_id)?;
        self.reject_frozen(&game)?;

        let mut rounds = database::games::load_rounds(conn, game_id)?;
        let seq = seq.unwrap_or_else(|| rounds.last().map(|r| r.seq + 1).unwrap_or(1));
        if rounds.iter().any(|r| r.seq == seq) {
            return Err(ServiceError::RoundExists(seq));
        }

        rounds.push(StoredRound {
            round_id: 0,
            seq,
            input: input.clone(),
        });
        rounds.sort_by_key(|r| r.seq);
        let progress = self.replay_stored(&game, &rounds)?;

        let tx = conn.transaction().context("Failed to open transaction")?;
        database::games::insert_round(&tx, game_id, seq, &input)?;
        let warning = self.truncate_discarded(&tx, game_id, &rounds, &progress)?;
        self.store_progress(&tx, game_id, &progress)?;
        tx.commit().context("Failed to commit round append")?;

        if let Some(completion) = progress.completion {
            info!(
                "Game {} completed after round {}: winner {}",
                game_id,
                seq,
                completion.winner.as_str()
            );
        }

        Ok(RoundChange {
            game: self.load_game(conn, game_id)?,
            warning,
        })
    }

    /// Admin correction: supersede the recorded round and replay the whole
    /// game from round one. A correction may complete, un-complete, or move
    /// the completion point of the game; rounds past a new, earlier
    /// completion point are discarded and reported back.
    pub fn replace_round(
        &self,
        conn: &mut DbConn,
        game_id: i64,
        seq: u32,
        input: RoundInput,
    ) -> Result<RoundChange, ServiceError> {
        let game = self.load_game(conn, game_id)?;
        self.reject_abandoned(&game)?;

        let mut rounds = database::games::load_rounds(conn, game_id)?;
        let position = rounds
            .iter()
            .position(|r| r.seq == seq)
            .ok_or(ServiceError::RoundMissing(seq))?;
        rounds[position].input = input.clone();

        let progress = self.replay_stored(&game, &rounds)?;

        let tx = conn.transaction().context("Failed to open transaction")?;
        database::games::supersede_round(&tx, game_id, seq)?;
        database::games::insert_round(&tx, game_id, seq, &input)?;
        let warning = self.truncate_discarded(&tx, game_id, &rounds, &progress)?;
        self.store_progress(&tx, game_id, &progress)?;
        tx.commit().context("Failed to commit round correction")?;

        info!("Game {game_id}: round {seq} corrected");
        Ok(RoundChange {
            game: self.load_game(conn, game_id)?,
            warning,
        })
    }

    pub fn delete_round(
        &self,
        conn: &mut DbConn,
        game_id: i64,
        seq: u32,
    ) -> Result<RoundChange, ServiceError> {
        let game = self.load_game(conn, game_id)?;
        self.reject_abandoned(&game)?;

        let mut rounds = database::games::load_rounds(conn, game_id)?;
        let position = rounds
            .iter()
            .position(|r| r.seq == seq)
            .ok_or(ServiceError::RoundMissing(seq))?;
        rounds.remove(position);

        let progress = self.replay_stored(&game, &rounds)?;

        let tx = conn.transaction().context("Failed to open transaction")?;
        database::games::supersede_round(&tx, game_id, seq)?;
        let warning = self.truncate_discarded(&tx, game_id, &rounds, &progress)?;
        self.store_progress(&tx, game_id, &progress)?;
        tx.commit().context("Failed to commit round delete")?;

        info!("Game {game_id}: round {seq} removed");
        Ok(RoundChange {
            game: self.load_game(conn, game_id)?,
            warning,
        })
    }

    /// Wipe the round log and return the game to its opening state. The
    /// superseded rows stay behind for audit.
    pub fn reset_game(&self, conn: &mut DbConn, game_id: i64) -> Result<GameRow, ServiceError> {
        let game = self.load_game(conn, game_id)?;
        self.reject_abandoned(&game)?;

        let tx = conn.transaction().context("Failed to open transaction")?;
        database::games::supersede_all(&tx, game_id)?;
        database::games::update_totals(&tx, game_id, 0, 0, GameStatus::InProgress, None)?;
        tx.commit().context("Failed to commit game reset")?;

        info!("Game {game_id} reset");
        self.load_game(conn, game_id)
    }

    /// Status entry point used by the cleanup sweep and by explicit admin
    /// action. Completed games are history and cannot be abandoned.
    pub fn abandon_game(&self, conn: &Connection, game_id: i64) -> Result<(), ServiceError> {
        let game = self.load_game(conn, game_id)?;
        match game.status {
            GameStatus::Completed => Err(ServiceError::Invalid(
                "completed games cannot be abandoned".to_string(),
            )),
            GameStatus::Abandoned => Ok(()),
            GameStatus::InProgress => {
                database::games::set_status(conn, game_id, GameStatus::Abandoned, None)?;
                info!("Game {game_id} abandoned");
                Ok(())
            }
        }
    }

    fn load_game(&self, conn: &Connection, game_id: i64) -> Result<GameRow, ServiceError> {
        database::games::find_by_id(conn, game_id)?.ok_or(ServiceError::NotFound("game"))
    }

    fn reject_frozen(&self, game: &GameRow) -> Result<(), ServiceError> {
        match game.status {
            GameStatus::Completed => Err(scoring::ScoringError::GameCompleted.into()),
            GameStatus::Abandoned => Err(scoring::ScoringError::GameAbandoned.into()),
            GameStatus::InProgress => Ok(()),
        }
    }

    fn reject_abandoned(&self, game: &GameRow) -> Result<(), ServiceError> {
        if game.status == GameStatus::Abandoned {
            Err(scoring::ScoringError::GameAbandoned.into())
        } else {
            Ok(())
        }
    }

    fn replay_stored(
        &self,
        game: &GameRow,
        rounds: &[StoredRound],
    ) -> Result<GameProgress, ServiceError> {
        let inputs: Vec<RoundInput> = rounds.iter().map(|r| r.input.clone()).collect();
        Ok(scoring::replay(&inputs, &game.slots, &self.scoring)?)
    }

    fn store_progress(
        &self,
        conn: &Connection,
        game_id: i64,
        progress: &GameProgress,
    ) -> Result<(), ServiceError> {
        let (status, winner) = match progress.completion {
            Some(completion) => (GameStatus::Completed, Some(completion.winner)),
            None => (GameStatus::InProgress, None),
        };
        database::games::update_totals(
            conn,
            game_id,
            progress.total_a,
            progress.total_b,
            status,
            winner,
        )?;
        Ok(())
    }

    /// After a correction the game may now complete before the end of the
    /// recorded log. Discard the unreachable tail instead of keeping totals
    /// that no replay can reproduce, and tell the admin what happened.
    fn truncate_discarded(
        &self,
        conn: &Connection,
        game_id: i64,
        rounds: &[StoredRound],
        progress: &GameProgress,
    ) -> Result<Option<String>, ServiceError> {
        if progress.truncated == 0 {
            return Ok(None);
        }

        let last_applied_seq = rounds[progress.rounds.len() - 1].seq;
        database::games::supersede_after(conn, game_id, last_applied_seq)?;

        let message = format!(
            "game now completes after round {}; {} later round(s) were discarded",
            last_applied_seq, progress.truncated
        );
        warn!("Game {game_id}: {message}");
        Ok(Some(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{connection::create_memory_pool, players, setup::apply_schema, DbPool};

    fn service() -> GameService {
        GameService::new(ScoringSettings::default())
    }

    fn seeded_pool() -> DbPool {
        let pool = create_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        apply_schema(&conn).unwrap();
        for (name, code) in [("a", "c1"), ("b", "c2"), ("c", "c3"), ("d", "c4")] {
            players::insert_player(&conn, name, code, None).unwrap();
        }
        pool
    }

    fn plain(card_points: i32) -> RoundInput {
        RoundInput {
            card_points,
            sweep: None,
            declarations: vec![],
        }
    }

    #[test]
    fn append_accumulates_and_completes() {
        let pool = seeded_pool();
        let mut conn = pool.get().unwrap();
        let service = service();
        let game = service
            .create_game(&conn, TeamSlots::new([1, 2], [3, 4]))
            .unwrap();

        let change = service
            .append_round(&mut conn, game.id, None, plain(600))
            .unwrap();
        assert_eq!(change.game.score_a, 600);
        assert_eq!(change.game.status, GameStatus::InProgress);

        let change = service
            .append_round(&mut conn, game.id, None, plain(450))
            .unwrap();
        assert_eq!(change.game.score_a, 1050);
        assert_eq!(change.game.status, GameStatus::Completed);
        assert_eq!(change.game.winner, Some(TeamSide::A));

        // Frozen after completion.
        let err = service
            .append_round(&mut conn, game.id, None, plain(10))
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Scoring(scoring::ScoringError::GameCompleted)
        ));
    }

    #[test]
    fn duplicate_sequence_number_is_rejected() {
        let pool = seeded_pool();
        let mut conn = pool.get().unwrap();
        let service = service();
        let game = service
            .create_game(&conn, TeamSlots::new([1, 2], [3, 4]))
            .unwrap();

        service
            .append_round(&mut conn, game.id, Some(1), plain(50))
            .unwrap();
        let err = service
            .append_round(&mut conn, game.id, Some(1), plain(60))
            .unwrap_err();
        assert!(matches!(err, ServiceError::RoundExists(1)));
    }

    #[test]
    fn correction_can_uncomplete_a_game() {
        let pool = seeded_pool();
        let mut conn = pool.get().unwrap();
        let service = service();
        let game = service
            .create_game(&conn, TeamSlots::new([1, 2], [3, 4]))
            .unwrap();

        service
            .append_round(&mut conn, game.id, None, plain(600))
            .unwrap();
        let change = service
            .append_round(&mut conn, game.id, None, plain(500))
            .unwrap();
        assert_eq!(change.game.status, GameStatus::Completed);

        let change = service
            .replace_round(&mut conn, game.id, 2, plain(100))
            .unwrap();
        assert_eq!(change.game.status, GameStatus::InProgress);
        assert_eq!(change.game.score_a, 700);
        assert_eq!(change.game.winner, None);
        assert!(change.warning.is_none());
    }

    #[test]
    fn correction_that_completes_early_truncates_the_tail() {
        let pool = seeded_pool();
        let mut conn = pool.get().unwrap();
        let service = service();
        let game = service
            .create_game(&conn, TeamSlots::new([1, 2], [3, 4]))
            .unwrap();

        for points in [300, 300, 200, 150] {
            service
                .append_round(&mut conn, game.id, None, plain(points))
                .unwrap();
        }

        // Bumping round 2 to 800 makes the game end there instead.
        let change = service
            .replace_round(&mut conn, game.id, 2, plain(800))
            .unwrap();
        assert_eq!(change.game.status, GameStatus::Completed);
        assert_eq!(change.game.score_a, 1100);
        assert_eq!(change.game.winner, Some(TeamSide::A));
        assert!(change.warning.unwrap().contains("2 later round(s)"));

        let detail = service.game_detail(&conn, game.id).unwrap();
        assert_eq!(detail.rounds.len(), 2);
    }

    #[test]
    fn reset_reopens_the_game_with_empty_log() {
        let pool = seeded_pool();
        let mut conn = pool.get().unwrap();
        let service = service();
        let game = service
            .create_game(&conn, TeamSlots::new([1, 2], [3, 4]))
            .unwrap();

        service
            .append_round(&mut conn, game.id, None, plain(1200))
            .unwrap();
        let game = service.reset_game(&mut conn, game.id).unwrap();
        assert_eq!(game.status, GameStatus::InProgress);
        assert_eq!((game.score_a, game.score_b), (0, 0));
        assert!(service.game_detail(&conn, game.id).unwrap().rounds.is_empty());
    }

    #[test]
    fn abandoned_games_reject_mutations() {
        let pool = seeded_pool();
        let mut conn = pool.get().unwrap();
        let service = service();
        let game = service
            .create_game(&conn, TeamSlots::new([1, 2], [3, 4]))
            .unwrap();

        service.abandon_game(&conn, game.id).unwrap();
        let err = service
            .append_round(&mut conn, game.id, None, plain(10))
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Scoring(scoring::ScoringError::GameAbandoned)
        ));
        let err = service.reset_game(&mut conn, game.id).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Scoring(scoring::ScoringError::GameAbandoned)
        ));
    }
}
