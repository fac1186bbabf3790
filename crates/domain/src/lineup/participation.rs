//! Read models describing who is, or has been, in a lineup.

use common::{JerseyNumber, PlayerId};
use serde::{Deserialize, Serialize};

use super::FieldPosition;

/// A player's participation history within one lineup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerParticipation {
    pub player_id: PlayerId,
    pub jersey_number: JerseyNumber,
    pub player_name: String,
    /// Part of the lineup before any substitution.
    pub is_starter: bool,
    /// Slot a starter opened the game in; re-entry returns them there.
    pub starting_batting_slot: Option<u8>,
    pub current_position: Option<FieldPosition>,
    /// `None` while the player is on the bench.
    pub current_batting_slot: Option<u8>,
    pub has_been_substituted: bool,
    pub has_used_reentry: bool,
}

impl PlayerParticipation {
    /// Returns true while the player occupies a batting slot.
    pub fn is_active(&self) -> bool {
        self.current_batting_slot.is_some()
    }

    /// A starter who left the game and still holds their one re-entry.
    pub fn can_reenter(&self) -> bool {
        self.is_starter && self.has_been_substituted && !self.has_used_reentry && !self.is_active()
    }
}

/// A batting slot's current occupant and everyone who has held it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattingSlot {
    pub current_player: PlayerId,
    /// Occupants in order, starting with the starter.
    pub history: Vec<PlayerId>,
}

/// One row of the active batting order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineupEntry {
    pub batting_slot: u8,
    pub player_id: PlayerId,
    pub jersey_number: JerseyNumber,
    pub player_name: String,
    pub field_position: Option<FieldPosition>,
}
