use crate::config::settings::ScoringSettings;
use crate::domain::{TeamSide, TeamSlots};

use super::events::RoundInput;
use super::resolver::{resolve_round, RoundScore};
use super::ScoringError;

/// One applied round together with the running totals after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundOutcome {
    pub score: RoundScore,
    pub total_a: i32,
    pub total_b: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub winner: TeamSide,
    /// 1-based position of the round that sealed the game.
    pub after_round: usize,
}

/// Result of replaying a full round sequence from scratch.
#[derive(Debug, Clone, PartialEq)]
pub struct GameProgress {
    pub rounds: Vec<RoundOutcome>,
    pub total_a: i32,
    pub total_b: i32,
    pub completion: Option<Completion>,
    /// Rounds in the input that fall after the completion point. A correction
    /// can move the completion earlier; these are never applied to the totals.
    pub truncated: usize,
}

/// Win check after a round: at or over the threshold and strictly ahead.
/// Both teams tied at the threshold keeps the game going.
pub fn check_win(total_a: i32, total_b: i32, threshold: i32) -> Option<TeamSide> {
    if total_a >= threshold && total_a > total_b {
        Some(TeamSide::A)
    } else if total_b >= threshold && total_b > total_a {
        Some(TeamSide::B)
    } else {
        None
    }
}

/// Re-derive a game's totals and completion status from its ordered rounds.
///
/// Replay is the only way totals are ever produced: appends and historical
/// corrections both go through here, so derived state can never go stale.
/// Rounds past the completion point are counted in `truncated` rather than
/// applied; the caller decides how to surface that to the admin.
pub fn replay(
    rounds: &[RoundInput],
    slots: &TeamSlots,
    settings: &ScoringSettings,
) -> Result<GameProgress, ScoringError> {
    let mut progress = GameProgress {
        rounds: Vec::with_capacity(rounds.len()),
        total_a: 0,
        total_b: 0,
        completion: None,
        truncated: 0,
    };

    for input in rounds {
        if progress.completion.is_some() {
            progress.truncated += 1;
            continue;
        }

        let score = resolve_round(input, slots, settings)?;
        progress.total_a += score.delta_a;
        progress.total_b += score.delta_b;
        progress.rounds.push(RoundOutcome {
            score,
            total_a: progress.total_a,
            total_b: progress.total_b,
        });

        if let Some(winner) = check_win(progress.total_a, progress.total_b, settings.win_threshold)
        {
            progress.completion = Some(Completion {
                winner,
                after_round: progress.rounds.len(),
            });
        }
    }

    Ok(progress)
}
