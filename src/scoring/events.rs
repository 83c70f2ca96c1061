use serde::{Deserialize, Serialize};

use crate::domain::{BonusKind, TeamSide, TeamSlots};

use super::ScoringError;

/// One pre-play declaration inside a round. The declaring player is kept
/// (not just the team) because success rates are tracked per player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BonusDeclaration {
    pub player_id: i64,
    pub kind: BonusKind,
    pub success: bool,
}

/// Raw inputs of one dealt hand, before any scoring rule is applied.
///
/// `card_points` is the signed card-point difference of the deal, oriented
/// to team A: +diff goes to A and -diff to B, so the base deltas of the two
/// teams always mirror each other. A sweep replaces that term entirely with
/// a fixed total for the sweeping side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundInput {
    pub card_points: i32,
    pub sweep: Option<TeamSide>,
    pub declarations: Vec<BonusDeclaration>,
}

impl RoundInput {
    /// Every declarer must be seated in the game, and each bonus kind may
    /// be declared at most once per round across both teams.
    pub fn validate(&self, slots: &TeamSlots) -> Result<(), ScoringError> {
        let mut seen_small = false;
        let mut seen_big = false;

        for declaration in &self.declarations {
            if !slots.contains(declaration.player_id) {
                return Err(ScoringError::UnknownDeclarer(declaration.player_id));
            }

            let seen = match declaration.kind {
                BonusKind::Small => &mut seen_small,
                BonusKind::Big => &mut seen_big,
            };
            if *seen {
                return Err(ScoringError::DuplicateDeclaration(declaration.kind));
            }
            *seen = true;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slots() -> TeamSlots {
        TeamSlots::new([1, 2], [3, 4])
    }

    fn declaration(player_id: i64, kind: BonusKind) -> BonusDeclaration {
        BonusDeclaration {
            player_id,
            kind,
            success: true,
        }
    }

    #[test]
    fn accepts_one_declaration_of_each_kind() {
        let input = RoundInput {
            card_points: 40,
            sweep: None,
            declarations: vec![declaration(1, BonusKind::Small), declaration(3, BonusKind::Big)],
        };
        assert!(input.validate(&slots()).is_ok());
    }

    #[test]
    fn rejects_declarer_outside_the_game() {
        let input = RoundInput {
            card_points: 0,
            sweep: None,
            declarations: vec![declaration(7, BonusKind::Small)],
        };
        assert_eq!(
            input.validate(&slots()),
            Err(ScoringError::UnknownDeclarer(7))
        );
    }

    #[test]
    fn rejects_same_kind_twice_even_across_teams() {
        let input = RoundInput {
            card_points: 0,
            sweep: None,
            declarations: vec![declaration(1, BonusKind::Small), declaration(3, BonusKind::Small)],
        };
        assert_eq!(
            input.validate(&slots()),
            Err(ScoringError::DuplicateDeclaration(BonusKind::Small))
        );
    }
}
