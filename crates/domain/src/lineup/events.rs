//! Team lineup domain events.

use common::{JerseyNumber, PlayerId};
use serde::{Deserialize, Serialize};

use crate::batting::validate_batting_slot;
use crate::error::DomainError;
use crate::event::SoftballEvent;

use super::FieldPosition;

/// Longest team name a lineup accepts, in characters.
pub const MAX_TEAM_NAME_LENGTH: usize = 50;

/// Data for TeamLineupCreated event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamLineupCreatedData {
    /// Team display name.
    pub team_name: String,
}

/// Data for PlayerAddedToLineup event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerAddedToLineupData {
    pub player_id: PlayerId,
    pub jersey_number: JerseyNumber,
    pub player_name: String,
    pub batting_slot: u8,
    pub field_position: FieldPosition,
}

/// Data for PlayerSubstitutedIntoGame event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSubstitutedIntoGameData {
    pub batting_slot: u8,
    pub outgoing_player_id: PlayerId,
    pub incoming_player_id: PlayerId,
    /// Number the incoming player wears.
    pub jersey_number: JerseyNumber,
    pub player_name: String,
    pub field_position: FieldPosition,
    pub inning: u32,
    /// The incoming player is a starter using their one re-entry.
    pub is_reentry: bool,
}

/// Data for FieldPositionChanged event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldPositionChangedData {
    pub player_id: PlayerId,
    pub from_position: FieldPosition,
    pub to_position: FieldPosition,
    pub inning: u32,
}

fn validate_player_name(name: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("Player name cannot be empty"));
    }
    Ok(())
}

fn validate_inning(inning: u32) -> Result<(), DomainError> {
    if inning == 0 {
        return Err(DomainError::validation("Inning must be at least 1"));
    }
    Ok(())
}

impl TeamLineupCreatedData {
    pub(crate) fn validate(&self) -> Result<(), DomainError> {
        let name = self.team_name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("Team name cannot be empty"));
        }
        if name.chars().count() > MAX_TEAM_NAME_LENGTH {
            return Err(DomainError::validation(format!(
                "Team name cannot exceed {MAX_TEAM_NAME_LENGTH} characters"
            )));
        }
        Ok(())
    }
}

impl PlayerAddedToLineupData {
    pub(crate) fn validate(&self) -> Result<(), DomainError> {
        validate_batting_slot(self.batting_slot)?;
        validate_player_name(&self.player_name)
    }
}

impl PlayerSubstitutedIntoGameData {
    pub(crate) fn validate(&self) -> Result<(), DomainError> {
        validate_batting_slot(self.batting_slot)?;
        validate_player_name(&self.player_name)?;
        validate_inning(self.inning)?;
        if self.outgoing_player_id == self.incoming_player_id {
            return Err(DomainError::validation(
                "A player cannot be substituted for themselves",
            ));
        }
        Ok(())
    }
}

impl FieldPositionChangedData {
    pub(crate) fn validate(&self) -> Result<(), DomainError> {
        validate_inning(self.inning)?;
        if self.from_position == self.to_position {
            return Err(DomainError::validation(format!(
                "Player is already playing {}",
                self.to_position
            )));
        }
        Ok(())
    }
}

// Convenience constructors for lineup events
impl SoftballEvent {
    /// Creates a TeamLineupCreated event.
    pub fn team_lineup_created(team_name: impl Into<String>) -> Result<Self, DomainError> {
        let data = TeamLineupCreatedData {
            team_name: team_name.into().trim().to_string(),
        };
        data.validate()?;
        Ok(SoftballEvent::TeamLineupCreated(data))
    }

    /// Creates a PlayerAddedToLineup event.
    pub fn player_added_to_lineup(
        player_id: PlayerId,
        jersey_number: JerseyNumber,
        player_name: impl Into<String>,
        batting_slot: u8,
        field_position: FieldPosition,
    ) -> Result<Self, DomainError> {
        let data = PlayerAddedToLineupData {
            player_id,
            jersey_number,
            player_name: player_name.into().trim().to_string(),
            batting_slot,
            field_position,
        };
        data.validate()?;
        Ok(SoftballEvent::PlayerAddedToLineup(data))
    }

    /// Creates a PlayerSubstitutedIntoGame event.
    pub fn player_substituted_into_game(
        data: PlayerSubstitutedIntoGameData,
    ) -> Result<Self, DomainError> {
        data.validate()?;
        Ok(SoftballEvent::PlayerSubstitutedIntoGame(data))
    }

    /// Creates a FieldPositionChanged event.
    pub fn field_position_changed(
        player_id: PlayerId,
        from_position: FieldPosition,
        to_position: FieldPosition,
        inning: u32,
    ) -> Result<Self, DomainError> {
        let data = FieldPositionChangedData {
            player_id,
            from_position,
            to_position,
            inning,
        };
        data.validate()?;
        Ok(SoftballEvent::FieldPositionChanged(data))
    }
}
