//! Game aggregate and related types.

mod aggregate;
mod events;
mod status;

pub use aggregate::Game;
pub use events::{
    GameCompletedData, GameCreatedData, GameStartedData, InningAdvancedData, OutRecordedData,
    ScoreUpdatedData,
};
pub use status::{EndingType, GameScore, GameStatus, TeamSide};
