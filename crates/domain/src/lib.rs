//! Event-sourced softball scoring domain.
//!
//! This crate provides:
//! - Aggregate and SnapshotCapable traits with replay and snapshot restore
//! - The closed SoftballEvent set, its envelope and persistence records
//! - Game, TeamLineup and InningState aggregates with their rule engines

pub mod aggregate;
pub mod batting;
pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod game;
pub mod inning;
pub mod lineup;

pub use aggregate::{Aggregate, DomainEvent, EventLog, ReplayPolicy, SnapshotCapable};
pub use clock::{EventClock, SharedClock, SteppingClock, SystemClock};
pub use config::{GameRules, MercyThreshold};
pub use error::DomainError;
pub use event::{EVENT_SCHEMA_VERSION, EventEnvelope, SoftballEvent};
pub use game::{EndingType, Game, GameScore, GameStatus, TeamSide};
pub use inning::{
    AdvanceReason, AtBatResultType, Base, BasesState, InningSituation, InningState,
    RunnerDestination, RunnerMovement,
};
pub use lineup::{
    BattingSlot, FieldPosition, LineupEntry, PlayerParticipation, Substitution, TeamLineup,
};
