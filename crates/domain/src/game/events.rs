//! Game domain events.

use serde::{Deserialize, Serialize};

use crate::config::GameRules;
use crate::error::DomainError;
use crate::event::SoftballEvent;

use super::{EndingType, GameScore, TeamSide};

/// Data for GameCreated event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameCreatedData {
    /// Home team display name.
    pub home_team_name: String,

    /// Away team display name.
    pub away_team_name: String,

    /// Rules the game is played under.
    #[serde(default)]
    pub rules: GameRules,
}

/// Data for GameStarted event.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GameStartedData {}

/// Data for ScoreUpdated event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreUpdatedData {
    /// Team that scored.
    pub team: TeamSide,

    /// Runs added by this update.
    pub runs_added: u32,

    /// Cumulative score after the update.
    pub new_score: GameScore,
}

/// Data for InningAdvanced event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InningAdvancedData {
    /// Inning now being played.
    pub new_inning: u32,

    /// Whether the new half is the top.
    pub is_top_half: bool,
}

/// Data for OutRecorded event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutRecordedData {
    /// Outs in the half-inning including this one.
    pub outs: u8,
}

/// Data for GameCompleted event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameCompletedData {
    /// How the game ended.
    pub ending_type: EndingType,

    /// Score when the game ended.
    pub final_score: GameScore,

    /// Inning in which the game ended.
    pub final_inning: u32,
}

fn validate_team_name(label: &str, name: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::validation(format!("{label} team name cannot be empty")));
    }
    Ok(())
}

impl GameCreatedData {
    pub(crate) fn validate(&self) -> Result<(), DomainError> {
        validate_team_name("Home", &self.home_team_name)?;
        validate_team_name("Away", &self.away_team_name)?;
        if self
            .home_team_name
            .trim()
            .eq_ignore_ascii_case(self.away_team_name.trim())
        {
            return Err(DomainError::validation(
                "Home and away team names must be different",
            ));
        }
        Ok(())
    }
}

impl ScoreUpdatedData {
    pub(crate) fn validate(&self) -> Result<(), DomainError> {
        if self.runs_added == 0 {
            return Err(DomainError::validation("Runs added must be a positive integer"));
        }
        if self.new_score.runs_for(self.team) < self.runs_added {
            return Err(DomainError::validation(format!(
                "Score {} cannot include {} new runs",
                self.new_score, self.runs_added
            )));
        }
        Ok(())
    }
}

impl InningAdvancedData {
    pub(crate) fn validate(&self) -> Result<(), DomainError> {
        if self.new_inning == 0 {
            return Err(DomainError::validation("Inning must be at least 1"));
        }
        Ok(())
    }
}

impl OutRecordedData {
    pub(crate) fn validate(&self) -> Result<(), DomainError> {
        if !(1..=3).contains(&self.outs) {
            return Err(DomainError::validation(format!(
                "Out count {} must be between 1 and 3",
                self.outs
            )));
        }
        Ok(())
    }
}

impl GameCompletedData {
    pub(crate) fn validate(&self) -> Result<(), DomainError> {
        if self.final_inning == 0 {
            return Err(DomainError::validation("Final inning must be at least 1"));
        }
        Ok(())
    }
}

// Convenience constructors for game events
impl SoftballEvent {
    /// Creates a GameCreated event.
    pub fn game_created(
        home_team_name: impl Into<String>,
        away_team_name: impl Into<String>,
        rules: GameRules,
    ) -> Result<Self, DomainError> {
        let data = GameCreatedData {
            home_team_name: home_team_name.into().trim().to_string(),
            away_team_name: away_team_name.into().trim().to_string(),
            rules,
        };
        data.validate()?;
        Ok(SoftballEvent::GameCreated(data))
    }

    /// Creates a GameStarted event.
    pub fn game_started() -> Self {
        SoftballEvent::GameStarted(GameStartedData {})
    }

    /// Creates a ScoreUpdated event.
    pub fn score_updated(
        team: TeamSide,
        runs_added: u32,
        new_score: GameScore,
    ) -> Result<Self, DomainError> {
        let data = ScoreUpdatedData {
            team,
            runs_added,
            new_score,
        };
        data.validate()?;
        Ok(SoftballEvent::ScoreUpdated(data))
    }

    /// Creates an InningAdvanced event.
    pub fn inning_advanced(new_inning: u32, is_top_half: bool) -> Result<Self, DomainError> {
        let data = InningAdvancedData {
            new_inning,
            is_top_half,
        };
        data.validate()?;
        Ok(SoftballEvent::InningAdvanced(data))
    }

    /// Creates an OutRecorded event.
    pub fn out_recorded(outs: u8) -> Result<Self, DomainError> {
        let data = OutRecordedData { outs };
        data.validate()?;
        Ok(SoftballEvent::OutRecorded(data))
    }

    /// Creates a GameCompleted event.
    pub fn game_completed(
        ending_type: EndingType,
        final_score: GameScore,
        final_inning: u32,
    ) -> Result<Self, DomainError> {
        let data = GameCompletedData {
            ending_type,
            final_score,
            final_inning,
        };
        data.validate()?;
        Ok(SoftballEvent::GameCompleted(data))
    }
}
