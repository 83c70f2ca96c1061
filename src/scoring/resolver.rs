use crate::config::settings::ScoringSettings;
use crate::domain::{BonusKind, TeamSide, TeamSlots};

use super::events::RoundInput;
use super::ScoringError;

/// Resolved point movement of a single round.
///
/// `bonus_a`/`bonus_b` carry the declaration subtotal separately so the
/// scoreboard can show base and bonus columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundScore {
    pub delta_a: i32,
    pub delta_b: i32,
    pub bonus_a: i32,
    pub bonus_b: i32,
}

/// Turn one round's raw inputs into per-team deltas.
///
/// Base term: a sweep awards the fixed total to the sweeping side and its
/// negation to the other; otherwise the card-point difference is mirrored
/// (+diff / -diff). Bonus declarations are then added on top in every case,
/// to the declaring team only; a failed call costs nobody but the caller.
pub fn resolve_round(
    input: &RoundInput,
    slots: &TeamSlots,
    settings: &ScoringSettings,
) -> Result<RoundScore, ScoringError> {
    input.validate(slots)?;

    let (mut delta_a, mut delta_b) = match input.sweep {
        Some(TeamSide::A) => (settings.sweep_total, -settings.sweep_total),
        Some(TeamSide::B) => (-settings.sweep_total, settings.sweep_total),
        None => (input.card_points, -input.card_points),
    };

    let mut bonus_a = 0;
    let mut bonus_b = 0;
    for declaration in &input.declarations {
        let value = match declaration.kind {
            BonusKind::Small => settings.small_bonus,
            BonusKind::Big => settings.big_bonus,
        };
        let signed = if declaration.success { value } else { -value };

        // validate() guarantees the declarer is seated
        match slots.side_of(declaration.player_id) {
            Some(TeamSide::A) => bonus_a += signed,
            Some(TeamSide::B) => bonus_b += signed,
            None => return Err(ScoringError::UnknownDeclarer(declaration.player_id)),
        }
    }

    delta_a += bonus_a;
    delta_b += bonus_b;

    Ok(RoundScore {
        delta_a,
        delta_b,
        bonus_a,
        bonus_b,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::events::BonusDeclaration;

    fn slots() -> TeamSlots {
        TeamSlots::new([1, 2], [3, 4])
    }

    fn settings() -> ScoringSettings {
        ScoringSettings::default()
    }

    fn plain_round(card_points: i32) -> RoundInput {
        RoundInput {
            card_points,
            sweep: None,
            declarations: vec![],
        }
    }

    #[test]
    fn plain_round_is_zero_sum() {
        let score = resolve_round(&plain_round(55), &slots(), &settings()).unwrap();
        assert_eq!((score.delta_a, score.delta_b), (55, -55));
        assert_eq!(score.delta_a + score.delta_b, 0);
    }

    #[test]
    fn sweep_overrides_card_points() {
        let input = RoundInput {
            card_points: 85,
            sweep: Some(TeamSide::B),
            declarations: vec![],
        };
        let score = resolve_round(&input, &slots(), &settings()).unwrap();
        assert_eq!((score.delta_a, score.delta_b), (-200, 200));
    }

    #[test]
    fn bonus_is_not_mirrored_but_card_diff_is() {
        // Big bonus success for team A plus a card diff of -50 against A:
        // A gets 200 - 50, B gets the mirrored +50 only.
        let input = RoundInput {
            card_points: -50,
            sweep: None,
            declarations: vec![BonusDeclaration {
                player_id: 1,
                kind: BonusKind::Big,
                success: true,
            }],
        };
        let score = resolve_round(&input, &slots(), &settings()).unwrap();
        assert_eq!((score.delta_a, score.delta_b), (150, 50));
        assert_eq!((score.bonus_a, score.bonus_b), (200, 0));
    }

    #[test]
    fn failed_small_costs_only_the_declarer() {
        let input = RoundInput {
            card_points: 0,
            sweep: None,
            declarations: vec![BonusDeclaration {
                player_id: 4,
                kind: BonusKind::Small,
                success: false,
            }],
        };
        let score = resolve_round(&input, &slots(), &settings()).unwrap();
        assert_eq!((score.delta_a, score.delta_b), (0, -100));
    }

    #[test]
    fn bonuses_stack_on_top_of_a_sweep() {
        // Sweep for A while a B player fails a big call.
        let input = RoundInput {
            card_points: 0,
            sweep: Some(TeamSide::A),
            declarations: vec![BonusDeclaration {
                player_id: 3,
                kind: BonusKind::Big,
                success: false,
            }],
        };
        let score = resolve_round(&input, &slots(), &settings()).unwrap();
        assert_eq!((score.delta_a, score.delta_b), (200, -400));
    }

    #[test]
    fn both_teams_may_declare_different_kinds() {
        let input = RoundInput {
            card_points: 10,
            sweep: None,
            declarations: vec![
                BonusDeclaration {
                    player_id: 2,
                    kind: BonusKind::Small,
                    success: true,
                },
                BonusDeclaration {
                    player_id: 3,
                    kind: BonusKind::Big,
                    success: false,
                },
            ],
        };
        let score = resolve_round(&input, &slots(), &settings()).unwrap();
        assert_eq!((score.delta_a, score.delta_b), (110, -210));
    }

    #[test]
    fn invalid_declarer_is_rejected_before_scoring() {
        let input = RoundInput {
            card_points: 10,
            sweep: None,
            declarations: vec![BonusDeclaration {
                player_id: 42,
                kind: BonusKind::Small,
                success: true,
            }],
        };
        assert!(resolve_round(&input, &slots(), &settings()).is_err());
    }
}
