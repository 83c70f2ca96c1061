use anyhow::Result;
use chrono::{Datelike, Local, NaiveDate};
use rusqlite::Connection;
use std::collections::HashMap;

use crate::database::{self, PlayerRow};
use crate::domain::{BonusKind, TeamSide};
use crate::stats::{
    self, CompletedGame, DeclarationOutcome, PlayerStanding, TeamStanding,
};

/// A player's full record, ready for display.
#[derive(Debug, Clone)]
pub struct PlayerReport {
    pub player: PlayerRow,
    pub standing: PlayerStanding,
    pub recent_games: i64,
    pub recent_wins: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct TodayRecord {
    pub team_a_wins: i64,
    pub team_b_wins: i64,
}

const RECENT_FORM_GAMES: usize = 10;

/// Read-only projections over completed games. A season is a calendar
/// year of the play date; `None` spans all seasons. Everything here is
/// re-derived on each call; the games are the source of truth.
pub struct StatsService;

impl StatsService {
    /// Ranked player reports. Ordering comes from the aggregator (win rate,
    /// games played, ascending id); ranks are assigned by the caller.
    pub fn leaderboard(conn: &Connection, season: Option<i32>) -> Result<Vec<PlayerReport>> {
        let (games, declarations) = load_inputs(conn, season)?;
        let players: HashMap<i64, PlayerRow> = database::players::list_all(conn)?
            .into_iter()
            .map(|player| (player.id, player))
            .collect();

        let reports = stats::player_standings(&games, &declarations)
            .into_iter()
            .filter_map(|standing| {
                let player = players.get(&standing.player_id)?.clone();
                let (recent_games, recent_wins) =
                    stats::recent_form(standing.player_id, &games, RECENT_FORM_GAMES);
                Some(PlayerReport {
                    player,
                    standing,
                    recent_games,
                    recent_wins,
                })
            })
            .collect();
        Ok(reports)
    }

    pub fn team_leaderboard(conn: &Connection, season: Option<i32>) -> Result<Vec<TeamStanding>> {
        let (games, _) = load_inputs(conn, season)?;
        Ok(stats::team_standings(&games))
    }

    pub fn player_report(
        conn: &Connection,
        player_id: i64,
        season: Option<i32>,
    ) -> Result<Option<PlayerReport>> {
        let Some(player) = database::players::find_by_id(conn, player_id)? else {
            return Ok(None);
        };

        let (games, declarations) = load_inputs(conn, season)?;
        let standing = stats::standing_for_player(player_id, &games, &declarations);
        let (recent_games, recent_wins) =
            stats::recent_form(player_id, &games, RECENT_FORM_GAMES);

        Ok(Some(PlayerReport {
            player,
            standing,
            recent_games,
            recent_wins,
        }))
    }

    pub fn pair_record(
        conn: &Connection,
        pair: [i64; 2],
        season: Option<i32>,
    ) -> Result<TeamStanding> {
        let (games, _) = load_inputs(conn, season)?;
        Ok(stats::standing_for_pair(pair, &games))
    }

    /// Head-to-head record of one specific table split, today only. Used
    /// by the scoreboard to show the running tally of the evening.
    pub fn today_record(
        conn: &Connection,
        team_a: [i64; 2],
        team_b: [i64; 2],
    ) -> Result<TodayRecord> {
        let today = Local::now().date_naive();
        let (games, _) = load_inputs(conn, None)?;

        let mut record = TodayRecord {
            team_a_wins: 0,
            team_b_wins: 0,
        };
        for game in games.iter().filter(|g| g.play_date == today) {
            let same_split = pair_set(game.slots.team_a) == pair_set(team_a)
                && pair_set(game.slots.team_b) == pair_set(team_b);
            let swapped_split = pair_set(game.slots.team_a) == pair_set(team_b)
                && pair_set(game.slots.team_b) == pair_set(team_a);
            if !same_split && !swapped_split {
                continue;
            }

            let winner_is_a = (game.winner == TeamSide::A) == same_split;
            if winner_is_a {
                record.team_a_wins += 1;
            } else {
                record.team_b_wins += 1;
            }
        }
        Ok(record)
    }
}

fn pair_set(pair: [i64; 2]) -> (i64, i64) {
    if pair[0] <= pair[1] {
        (pair[0], pair[1])
    } else {
        (pair[1], pair[0])
    }
}

fn in_season(date: NaiveDate, season: Option<i32>) -> bool {
    season.is_none_or(|year| date.year() == year)
}

fn load_inputs(
    conn: &Connection,
    season: Option<i32>,
) -> Result<(Vec<CompletedGame>, Vec<DeclarationOutcome>)> {
    let games = database::games::list_completed(conn)?
        .into_iter()
        .filter(|game| in_season(game.play_date, season))
        .filter_map(|game| {
            let winner = game.winner?;
            Some(CompletedGame {
                id: game.id,
                slots: game.slots,
                winner,
                play_date: game.play_date,
            })
        })
        .collect();

    let declarations = database::games::completed_declarations(conn)?
        .into_iter()
        .filter(|row| in_season(row.play_date, season))
        .filter_map(|row| {
            Some(DeclarationOutcome {
                player_id: row.player_id,
                kind: BonusKind::parse(&row.kind)?,
                success: row.success,
            })
        })
        .collect();

    Ok((games, declarations))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::ScoringSettings;
    use crate::database::{connection::create_memory_pool, players, setup::apply_schema, DbPool};
    use crate::domain::TeamSlots;
    use crate::scoring::{BonusDeclaration, RoundInput};
    use crate::services::game_service::GameService;

    fn seeded_pool() -> DbPool {
        let pool = create_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        apply_schema(&conn).unwrap();
        for (name, code) in [("a", "c1"), ("b", "c2"), ("c", "c3"), ("d", "c4")] {
            players::insert_player(&conn, name, code, None).unwrap();
        }
        pool
    }

    fn finish_game(pool: &DbPool, team_a: [i64; 2], team_b: [i64; 2], a_wins: bool) {
        let service = GameService::new(ScoringSettings::default());
        let mut conn = pool.get().unwrap();
        let game = service
            .create_game(&conn, TeamSlots::new(team_a, team_b))
            .unwrap();
        let points = if a_wins { 1000 } else { -1000 };
        let input = RoundInput {
            card_points: points,
            sweep: None,
            declarations: vec![BonusDeclaration {
                player_id: team_a[0],
                kind: BonusKind::Small,
                success: a_wins,
            }],
        };
        service.append_round(&mut conn, game.id, None, input).unwrap();
    }

    #[test]
    fn leaderboard_only_counts_completed_games() {
        let pool = seeded_pool();
        finish_game(&pool, [1, 2], [3, 4], true);

        // An unfinished game must not show up anywhere.
        let service = GameService::new(ScoringSettings::default());
        let mut conn = pool.get().unwrap();
        let open_game = service
            .create_game(&conn, TeamSlots::new([1, 3], [2, 4]))
            .unwrap();
        service
            .append_round(
                &mut conn,
                open_game.id,
                None,
                RoundInput {
                    card_points: 40,
                    sweep: None,
                    declarations: vec![],
                },
            )
            .unwrap();

        let reports = StatsService::leaderboard(&conn, None).unwrap();
        assert_eq!(reports.len(), 4);
        for report in &reports {
            assert_eq!(report.standing.games_played, 1);
        }

        let winner = reports.iter().find(|r| r.player.id == 1).unwrap();
        assert_eq!(winner.standing.wins, 1);
        assert_eq!(winner.standing.small.attempts, 1);
        assert_eq!(winner.standing.small.successes, 1);
        assert_eq!(winner.recent_games, 1);
    }

    #[test]
    fn player_report_with_no_games_has_zero_rates() {
        let pool = seeded_pool();
        let conn = pool.get().unwrap();

        let report = StatsService::player_report(&conn, 1, None).unwrap().unwrap();
        assert_eq!(report.standing.games_played, 0);
        assert_eq!(report.standing.win_rate, 0.0);
        assert_eq!(report.recent_games, 0);

        assert!(StatsService::player_report(&conn, 99, None).unwrap().is_none());
    }

    #[test]
    fn today_record_matches_split_in_either_orientation() {
        let pool = seeded_pool();
        finish_game(&pool, [1, 2], [3, 4], true);
        finish_game(&pool, [3, 4], [2, 1], true);
        finish_game(&pool, [1, 3], [2, 4], true);

        let conn = pool.get().unwrap();
        let record = StatsService::today_record(&conn, [1, 2], [3, 4]).unwrap();
        assert_eq!(record.team_a_wins, 1);
        assert_eq!(record.team_b_wins, 1);
    }

    #[test]
    fn season_filter_scopes_by_calendar_year() {
        let pool = seeded_pool();
        finish_game(&pool, [1, 2], [3, 4], true);

        let conn = pool.get().unwrap();
        let this_year = Local::now().date_naive().year();
        assert_eq!(
            StatsService::leaderboard(&conn, Some(this_year)).unwrap().len(),
            4
        );
        assert!(StatsService::leaderboard(&conn, Some(this_year - 1))
            .unwrap()
            .is_empty());
    }
}
