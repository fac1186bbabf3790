//! TeamLineup aggregate and related types.

mod aggregate;
mod events;
mod participation;
mod position;

pub use aggregate::{Substitution, TeamLineup};
pub use events::{
    FieldPositionChangedData, MAX_TEAM_NAME_LENGTH, PlayerAddedToLineupData,
    PlayerSubstitutedIntoGameData, TeamLineupCreatedData,
};
pub use participation::{BattingSlot, LineupEntry, PlayerParticipation};
pub use position::FieldPosition;
