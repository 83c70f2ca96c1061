use std::collections::HashMap;

use chrono::NaiveDate;

use crate::domain::{BonusKind, TeamSide, TeamSlots};

/// A completed game as the aggregator sees it. Abandoned and in-progress
/// games never reach this type.
#[derive(Debug, Clone, Copy)]
pub struct CompletedGame {
    pub id: i64,
    pub slots: TeamSlots,
    pub winner: TeamSide,
    pub play_date: NaiveDate,
}

/// One bonus declaration from a completed game's round log.
#[derive(Debug, Clone, Copy)]
pub struct DeclarationOutcome {
    pub player_id: i64,
    pub kind: BonusKind,
    pub success: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BonusRecord {
    pub attempts: i64,
    pub successes: i64,
}

impl BonusRecord {
    pub fn success_rate(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.successes as f64 / self.attempts as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStanding {
    pub player_id: i64,
    pub games_played: i64,
    pub wins: i64,
    pub win_rate: f64,
    pub small: BonusRecord,
    pub big: BonusRecord,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamStanding {
    /// Unordered pair, normalized to ascending ids.
    pub player_ids: (i64, i64),
    pub games_played: i64,
    pub wins: i64,
    pub win_rate: f64,
}

fn win_rate(wins: i64, played: i64) -> f64 {
    if played == 0 {
        0.0
    } else {
        wins as f64 / played as f64
    }
}

/// Per-player leaderboard over a set of completed games.
///
/// Pure projection: same input, same output, in the same order. Sorted by
/// win rate, then games played, then ascending player id so the ordering
/// is total and pagination is stable.
pub fn player_standings(
    games: &[CompletedGame],
    declarations: &[DeclarationOutcome],
) -> Vec<PlayerStanding> {
    let mut tally: HashMap<i64, (i64, i64)> = HashMap::new();
    for game in games {
        for player_id in game.slots.all_players() {
            let entry = tally.entry(player_id).or_insert((0, 0));
            entry.0 += 1;
            if game.slots.members(game.winner).contains(&player_id) {
                entry.1 += 1;
            }
        }
    }

    let mut bonuses: HashMap<i64, (BonusRecord, BonusRecord)> = HashMap::new();
    for declaration in declarations {
        let entry = bonuses.entry(declaration.player_id).or_default();
        let record = match declaration.kind {
            BonusKind::Small => &mut entry.0,
            BonusKind::Big => &mut entry.1,
        };
        record.attempts += 1;
        if declaration.success {
            record.successes += 1;
        }
    }

    let mut standings: Vec<PlayerStanding> = tally
        .into_iter()
        .map(|(player_id, (played, wins))| {
            let (small, big) = bonuses.get(&player_id).copied().unwrap_or_default();
            PlayerStanding {
                player_id,
                games_played: played,
                wins,
                win_rate: win_rate(wins, played),
                small,
                big,
            }
        })
        .collect();

    standings.sort_by(|a, b| {
        b.win_rate
            .total_cmp(&a.win_rate)
            .then(b.games_played.cmp(&a.games_played))
            .then(a.player_id.cmp(&b.player_id))
    });
    standings
}

/// Per-pair leaderboard. Teams are ephemeral, so pairs are re-grouped here
/// from the game slots rather than read from any stored team entity.
pub fn team_standings(games: &[CompletedGame]) -> Vec<TeamStanding> {
    let mut tally: HashMap<(i64, i64), (i64, i64)> = HashMap::new();
    for game in games {
        for side in [TeamSide::A, TeamSide::B] {
            let pair = normalize_pair(game.slots.members(side));
            let entry = tally.entry(pair).or_insert((0, 0));
            entry.0 += 1;
            if side == game.winner {
                entry.1 += 1;
            }
        }
    }

    let mut standings: Vec<TeamStanding> = tally
        .into_iter()
        .map(|(player_ids, (played, wins))| TeamStanding {
            player_ids,
            games_played: played,
            wins,
            win_rate: win_rate(wins, played),
        })
        .collect();

    standings.sort_by(|a, b| {
        b.win_rate
            .total_cmp(&a.win_rate)
            .then(b.games_played.cmp(&a.games_played))
            .then(a.player_ids.cmp(&b.player_ids))
    });
    standings
}

/// Record of one specific pair, regardless of whether they rank.
pub fn standing_for_pair(pair: [i64; 2], games: &[CompletedGame]) -> TeamStanding {
    let wanted = normalize_pair(pair);
    let mut played = 0;
    let mut wins = 0;
    for game in games {
        for side in [TeamSide::A, TeamSide::B] {
            if normalize_pair(game.slots.members(side)) == wanted {
                played += 1;
                if side == game.winner {
                    wins += 1;
                }
            }
        }
    }
    TeamStanding {
        player_ids: wanted,
        games_played: played,
        wins,
        win_rate: win_rate(wins, played),
    }
}

/// Full record of one player, with zeroes when they never finished a game.
pub fn standing_for_player(
    player_id: i64,
    games: &[CompletedGame],
    declarations: &[DeclarationOutcome],
) -> PlayerStanding {
    let mut played = 0;
    let mut wins = 0;
    for game in games {
        if game.slots.contains(player_id) {
            played += 1;
            if game.slots.members(game.winner).contains(&player_id) {
                wins += 1;
            }
        }
    }

    let mut small = BonusRecord::default();
    let mut big = BonusRecord::default();
    for declaration in declarations {
        if declaration.player_id != player_id {
            continue;
        }
        let record = match declaration.kind {
            BonusKind::Small => &mut small,
            BonusKind::Big => &mut big,
        };
        record.attempts += 1;
        if declaration.success {
            record.successes += 1;
        }
    }

    PlayerStanding {
        player_id,
        games_played: played,
        wins,
        win_rate: win_rate(wins, played),
        small,
        big,
    }
}

/// Win record over the player's most recent `limit` completed games,
/// newest first by play date then id.
pub fn recent_form(player_id: i64, games: &[CompletedGame], limit: usize) -> (i64, i64) {
    let mut involved: Vec<&CompletedGame> = games
        .iter()
        .filter(|game| game.slots.contains(player_id))
        .collect();
    involved.sort_by(|a, b| b.play_date.cmp(&a.play_date).then(b.id.cmp(&a.id)));

    let mut played = 0;
    let mut wins = 0;
    for game in involved.into_iter().take(limit) {
        played += 1;
        if game.slots.members(game.winner).contains(&player_id) {
            wins += 1;
        }
    }
    (played, wins)
}

fn normalize_pair(pair: [i64; 2]) -> (i64, i64) {
    if pair[0] <= pair[1] {
        (pair[0], pair[1])
    } else {
        (pair[1], pair[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(id: i64, team_a: [i64; 2], team_b: [i64; 2], winner: TeamSide, day: u32) -> CompletedGame {
        CompletedGame {
            id,
            slots: TeamSlots::new(team_a, team_b),
            winner,
            play_date: NaiveDate::from_ymd_opt(2026, 5, day).unwrap(),
        }
    }

    #[test]
    fn counts_games_and_wins_per_player() {
        let games = vec![
            game(1, [1, 2], [3, 4], TeamSide::A, 1),
            game(2, [1, 3], [2, 4], TeamSide::B, 2),
        ];
        let standings = player_standings(&games, &[]);

        let p1 = standings.iter().find(|s| s.player_id == 1).unwrap();
        assert_eq!((p1.games_played, p1.wins), (2, 1));
        let p4 = standings.iter().find(|s| s.player_id == 4).unwrap();
        assert_eq!((p4.games_played, p4.wins), (2, 1));
    }

    #[test]
    fn identical_records_order_by_ascending_id() {
        // Players 1 and 2 always play together, so every counter matches.
        let games = vec![
            game(1, [2, 1], [3, 4], TeamSide::A, 1),
            game(2, [1, 2], [3, 4], TeamSide::B, 2),
        ];
        let standings = player_standings(&games, &[]);
        let pair: Vec<i64> = standings
            .iter()
            .filter(|s| s.player_id == 1 || s.player_id == 2)
            .map(|s| s.player_id)
            .collect();
        assert_eq!(pair, vec![1, 2]);
    }

    #[test]
    fn aggregation_is_idempotent() {
        let games = vec![
            game(1, [1, 2], [3, 4], TeamSide::A, 1),
            game(2, [1, 3], [2, 4], TeamSide::B, 2),
            game(3, [1, 4], [2, 3], TeamSide::A, 3),
        ];
        let declarations = vec![
            DeclarationOutcome {
                player_id: 1,
                kind: BonusKind::Small,
                success: true,
            },
            DeclarationOutcome {
                player_id: 1,
                kind: BonusKind::Small,
                success: false,
            },
        ];
        assert_eq!(
            player_standings(&games, &declarations),
            player_standings(&games, &declarations)
        );
        assert_eq!(team_standings(&games), team_standings(&games));
    }

    #[test]
    fn zero_games_means_zero_rate_not_an_error() {
        let standing = standing_for_player(99, &[], &[]);
        assert_eq!(standing.games_played, 0);
        assert_eq!(standing.win_rate, 0.0);
        assert_eq!(standing.small.success_rate(), 0.0);
    }

    #[test]
    fn bonus_rates_count_attempts_and_successes() {
        let declarations = vec![
            DeclarationOutcome {
                player_id: 5,
                kind: BonusKind::Big,
                success: true,
            },
            DeclarationOutcome {
                player_id: 5,
                kind: BonusKind::Big,
                success: false,
            },
            DeclarationOutcome {
                player_id: 5,
                kind: BonusKind::Small,
                success: true,
            },
        ];
        let standing = standing_for_player(5, &[], &declarations);
        assert_eq!(standing.big.attempts, 2);
        assert_eq!(standing.big.successes, 1);
        assert_eq!(standing.big.success_rate(), 0.5);
        assert_eq!(standing.small.success_rate(), 1.0);
    }

    #[test]
    fn pairs_are_unordered() {
        let games = vec![
            game(1, [2, 1], [3, 4], TeamSide::A, 1),
            game(2, [1, 2], [4, 3], TeamSide::A, 2),
        ];
        let standing = standing_for_pair([1, 2], &games);
        assert_eq!((standing.games_played, standing.wins), (2, 2));
        let standings = team_standings(&games);
        assert_eq!(standings[0].player_ids, (1, 2));
        assert_eq!(standings[0].games_played, 2);
    }

    #[test]
    fn recent_form_takes_newest_games_first() {
        let mut games = Vec::new();
        // Ten old losses, then two recent wins on later dates.
        for i in 0..10 {
            games.push(game(i, [1, 2], [3, 4], TeamSide::B, 1));
        }
        games.push(game(20, [1, 2], [3, 4], TeamSide::A, 10));
        games.push(game(21, [1, 2], [3, 4], TeamSide::A, 11));

        let (played, wins) = recent_form(1, &games, 10);
        assert_eq!(played, 10);
        assert_eq!(wins, 2);
    }
}
