//! Game lifecycle and scoreboard value types.

use serde::{Deserialize, Serialize};

/// The lifecycle of a game.
///
/// State transitions:
/// ```text
/// NotStarted ──► InProgress ──► Completed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    /// Created, first pitch not thrown.
    #[default]
    NotStarted,

    /// Being played; scoring and outs are accepted.
    InProgress,

    /// Finished (terminal state).
    Completed,
}

impl GameStatus {
    /// Returns true if the game can be started in this status.
    pub fn can_start(&self) -> bool {
        matches!(self, GameStatus::NotStarted)
    }

    /// Returns true if play (runs, outs, innings, completion) is accepted.
    pub fn is_in_progress(&self) -> bool {
        matches!(self, GameStatus::InProgress)
    }

    /// Returns true if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, GameStatus::Completed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::NotStarted => "not started",
            GameStatus::InProgress => "in progress",
            GameStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a completed game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EndingType {
    Regulation,
    MercyRule,
    Forfeit,
    TimeLimit,
}

impl std::fmt::Display for EndingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EndingType::Regulation => "REGULATION",
            EndingType::MercyRule => "MERCY_RULE",
            EndingType::Forfeit => "FORFEIT",
            EndingType::TimeLimit => "TIME_LIMIT",
        };
        f.write_str(name)
    }
}

/// Which team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TeamSide {
    Home,
    Away,
}

impl TeamSide {
    /// The side that bats in the given half: away in the top, home in the bottom.
    pub fn batting(is_top_half: bool) -> Self {
        if is_top_half {
            TeamSide::Away
        } else {
            TeamSide::Home
        }
    }
}

/// Runs for both teams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GameScore {
    home: u32,
    away: u32,
}

impl GameScore {
    pub fn new(home: u32, away: u32) -> Self {
        Self { home, away }
    }

    pub fn home_runs(&self) -> u32 {
        self.home
    }

    pub fn away_runs(&self) -> u32 {
        self.away
    }

    pub fn runs_for(&self, side: TeamSide) -> u32 {
        match side {
            TeamSide::Home => self.home,
            TeamSide::Away => self.away,
        }
    }

    /// Absolute run differential.
    pub fn differential(&self) -> u32 {
        self.home.abs_diff(self.away)
    }

    /// The side ahead, or `None` when tied.
    pub fn leader(&self) -> Option<TeamSide> {
        match self.home.cmp(&self.away) {
            std::cmp::Ordering::Greater => Some(TeamSide::Home),
            std::cmp::Ordering::Less => Some(TeamSide::Away),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Adds runs to one side, returning `None` on overflow.
    pub fn with_runs(&self, side: TeamSide, runs: u32) -> Option<Self> {
        let mut next = *self;
        match side {
            TeamSide::Home => next.home = self.home.checked_add(runs)?,
            TeamSide::Away => next.away = self.away.checked_add(runs)?,
        }
        Some(next)
    }
}

impl std::fmt::Display for GameScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.home, self.away)
    }
}
