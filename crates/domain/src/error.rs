//! Domain error types.

use common::InvalidJerseyNumber;
use thiserror::Error;

use crate::game::GameStatus;
use crate::inning::Base;
use crate::lineup::FieldPosition;

/// Errors raised when a command, event or reconstruction violates a rule.
///
/// Every command validates before it records anything, so receiving one of
/// these means the aggregate and its uncommitted events are untouched.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A business rule was violated.
    #[error("{0}")]
    Validation(String),

    /// The game is not in a status that allows the action.
    #[error("Cannot {action} when game is {status}")]
    InvalidGameStatus {
        action: &'static str,
        status: GameStatus,
    },

    /// A batting slot outside 1–20.
    #[error("Invalid batting slot: {0} (must be between 1 and 20)")]
    InvalidBattingSlot(u8),

    /// An at-bat was recorded for someone other than the current batter.
    #[error("Batting out of order: expected slot {expected}, got slot {actual}")]
    BattingOutOfOrder { expected: u8, actual: u8 },

    /// The defensive position already has a player.
    #[error("Field position {0} is already occupied")]
    PositionOccupied(FieldPosition),

    /// Another active player already wears the number.
    #[error("Jersey number {0} is already in use")]
    JerseyInUse(common::JerseyNumber),

    /// A runner already stands on the base.
    #[error("Base {0} is already occupied")]
    BaseOccupied(Base),

    /// The substitution breaks the starter re-entry rule.
    #[error("{0}")]
    ReentryNotAllowed(String),

    /// The event stream cannot be replayed at all.
    #[error("Invalid event stream: {0}")]
    InvalidEventStream(String),

    /// The aggregate has no transition for this event type.
    #[error("Unknown event type {event_type} for {aggregate}")]
    UnsupportedEvent {
        aggregate: &'static str,
        event_type: String,
    },

    /// The snapshot cannot be restored.
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// A jersey number could not be parsed.
    #[error(transparent)]
    JerseyNumber(#[from] InvalidJerseyNumber),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DomainError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        DomainError::Validation(message.into())
    }
}
