pub mod aggregate;

pub use aggregate::{
    player_standings, recent_form, standing_for_pair, standing_for_player, team_standings,
    BonusRecord, CompletedGame, DeclarationOutcome, PlayerStanding, TeamStanding,
};
