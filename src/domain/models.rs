use serde::{Deserialize, Serialize};

/// One of the two sides at the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TeamSide {
    A,
    B,
}

impl TeamSide {
    pub fn opponent(self) -> TeamSide {
        match self {
            TeamSide::A => TeamSide::B,
            TeamSide::B => TeamSide::A,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TeamSide::A => "A",
            TeamSide::B => "B",
        }
    }

    pub fn parse(value: &str) -> Option<TeamSide> {
        match value {
            "A" => Some(TeamSide::A),
            "B" => Some(TeamSide::B),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    InProgress,
    Completed,
    Abandoned,
}

impl GameStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            GameStatus::InProgress => "in_progress",
            GameStatus::Completed => "completed",
            GameStatus::Abandoned => "abandoned",
        }
    }

    pub fn parse(value: &str) -> Option<GameStatus> {
        match value {
            "in_progress" => Some(GameStatus::InProgress),
            "completed" => Some(GameStatus::Completed),
            "abandoned" => Some(GameStatus::Abandoned),
            _ => None,
        }
    }
}

/// Pre-play bonus declarations: small is the solo first-out call,
/// big is the higher-stakes variant declared before picking up the hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BonusKind {
    Small,
    Big,
}

impl BonusKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BonusKind::Small => "small",
            BonusKind::Big => "big",
        }
    }

    pub fn parse(value: &str) -> Option<BonusKind> {
        match value {
            "small" => Some(BonusKind::Small),
            "big" => Some(BonusKind::Big),
            _ => None,
        }
    }
}

impl std::fmt::Display for BonusKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four player slots of one game. Teams exist only for the lifetime
/// of the game; ranking re-groups pairs at aggregation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamSlots {
    pub team_a: [i64; 2],
    pub team_b: [i64; 2],
}

impl TeamSlots {
    pub fn new(team_a: [i64; 2], team_b: [i64; 2]) -> Self {
        Self { team_a, team_b }
    }

    pub fn side_of(&self, player_id: i64) -> Option<TeamSide> {
        if self.team_a.contains(&player_id) {
            Some(TeamSide::A)
        } else if self.team_b.contains(&player_id) {
            Some(TeamSide::B)
        } else {
            None
        }
    }

    pub fn contains(&self, player_id: i64) -> bool {
        self.side_of(player_id).is_some()
    }

    pub fn all_players(&self) -> [i64; 4] {
        [
            self.team_a[0],
            self.team_a[1],
            self.team_b[0],
            self.team_b[1],
        ]
    }

    pub fn members(&self, side: TeamSide) -> [i64; 2] {
        match side {
            TeamSide::A => self.team_a,
            TeamSide::B => self.team_b,
        }
    }

    /// Two players per side, four distinct players overall.
    pub fn is_valid(&self) -> bool {
        let ids = self.all_players();
        for i in 0..ids.len() {
            for j in (i + 1)..ids.len() {
                if ids[i] == ids[j] {
                    return false;
                }
            }
        }
        true
    }
}

/// Caller role derived from the presented access code. The client may
/// remember what it was told, but privileged handlers re-derive this on
/// every request instead of trusting the client-asserted role.
#[derive(Debug, Clone, PartialEq)]
pub enum Role {
    Admin,
    Player { id: i64, name: String },
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}
