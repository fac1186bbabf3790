//! The closed set of softball domain events and their envelope.

use chrono::{DateTime, Utc};
use common::{AggregateId, EventId, EventRecord, GameId};
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;
use crate::clock::EventClock;
use crate::error::DomainError;
use crate::game::{
    GameCompletedData, GameCreatedData, GameStartedData, InningAdvancedData, OutRecordedData,
    ScoreUpdatedData,
};
use crate::inning::{
    AtBatCompletedData, CurrentBatterChangedData, HalfInningEndedData, InningStateCreatedData,
    RunScoredData, RunnerAdvancedData,
};
use crate::lineup::{
    FieldPositionChangedData, PlayerAddedToLineupData, PlayerSubstitutedIntoGameData,
    TeamLineupCreatedData,
};

/// Schema version stamped on every event this crate records.
pub const EVENT_SCHEMA_VERSION: u32 = 1;

/// Every event any softball aggregate can record.
///
/// Replay is an exhaustive match over this enum; each aggregate decides what
/// to do with the variants that belong to the other aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum SoftballEvent {
    GameCreated(GameCreatedData),
    GameStarted(GameStartedData),
    ScoreUpdated(ScoreUpdatedData),
    InningAdvanced(InningAdvancedData),
    OutRecorded(OutRecordedData),
    GameCompleted(GameCompletedData),
    TeamLineupCreated(TeamLineupCreatedData),
    PlayerAddedToLineup(PlayerAddedToLineupData),
    PlayerSubstitutedIntoGame(PlayerSubstitutedIntoGameData),
    FieldPositionChanged(FieldPositionChangedData),
    InningStateCreated(InningStateCreatedData),
    AtBatCompleted(AtBatCompletedData),
    RunnerAdvanced(RunnerAdvancedData),
    RunScored(RunScoredData),
    CurrentBatterChanged(CurrentBatterChangedData),
    HalfInningEnded(HalfInningEndedData),
}

impl DomainEvent for SoftballEvent {
    fn event_type(&self) -> &'static str {
        match self {
            SoftballEvent::GameCreated(_) => "GameCreated",
            SoftballEvent::GameStarted(_) => "GameStarted",
            SoftballEvent::ScoreUpdated(_) => "ScoreUpdated",
            SoftballEvent::InningAdvanced(_) => "InningAdvanced",
            SoftballEvent::OutRecorded(_) => "OutRecorded",
            SoftballEvent::GameCompleted(_) => "GameCompleted",
            SoftballEvent::TeamLineupCreated(_) => "TeamLineupCreated",
            SoftballEvent::PlayerAddedToLineup(_) => "PlayerAddedToLineup",
            SoftballEvent::PlayerSubstitutedIntoGame(_) => "PlayerSubstitutedIntoGame",
            SoftballEvent::FieldPositionChanged(_) => "FieldPositionChanged",
            SoftballEvent::InningStateCreated(_) => "InningStateCreated",
            SoftballEvent::AtBatCompleted(_) => "AtBatCompleted",
            SoftballEvent::RunnerAdvanced(_) => "RunnerAdvanced",
            SoftballEvent::RunScored(_) => "RunScored",
            SoftballEvent::CurrentBatterChanged(_) => "CurrentBatterChanged",
            SoftballEvent::HalfInningEnded(_) => "HalfInningEnded",
        }
    }
}

impl SoftballEvent {
    /// Returns true for the events that open an aggregate stream.
    pub fn is_creation(&self) -> bool {
        matches!(
            self,
            SoftballEvent::GameCreated(_)
                | SoftballEvent::TeamLineupCreated(_)
                | SoftballEvent::InningStateCreated(_)
        )
    }

    /// Checks the payload's own field-level rules.
    ///
    /// Runs when an event is constructed by a command and again when it is
    /// replayed, so a tampered or corrupt log is caught before it is applied.
    pub fn validate(&self) -> Result<(), DomainError> {
        match self {
            SoftballEvent::GameCreated(data) => data.validate(),
            SoftballEvent::GameStarted(_) => Ok(()),
            SoftballEvent::ScoreUpdated(data) => data.validate(),
            SoftballEvent::InningAdvanced(data) => data.validate(),
            SoftballEvent::OutRecorded(data) => data.validate(),
            SoftballEvent::GameCompleted(data) => data.validate(),
            SoftballEvent::TeamLineupCreated(data) => data.validate(),
            SoftballEvent::PlayerAddedToLineup(data) => data.validate(),
            SoftballEvent::PlayerSubstitutedIntoGame(data) => data.validate(),
            SoftballEvent::FieldPositionChanged(data) => data.validate(),
            SoftballEvent::InningStateCreated(data) => data.validate(),
            SoftballEvent::AtBatCompleted(data) => data.validate(),
            SoftballEvent::RunnerAdvanced(data) => data.validate(),
            SoftballEvent::RunScored(data) => data.validate(),
            SoftballEvent::CurrentBatterChanged(data) => data.validate(),
            SoftballEvent::HalfInningEnded(data) => data.validate(),
        }
    }
}

/// An event together with its identity, time and correlation.
///
/// Envelopes are immutable once built: fields are only readable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    event_id: EventId,
    timestamp: DateTime<Utc>,
    schema_version: u32,
    game_id: GameId,
    aggregate_id: AggregateId,
    event: SoftballEvent,
}

impl EventEnvelope {
    /// Stamps an event with an id and timestamp from `clock`.
    pub fn new(
        clock: &dyn EventClock,
        game_id: GameId,
        aggregate_id: impl Into<AggregateId>,
        event: SoftballEvent,
    ) -> Self {
        Self {
            event_id: clock.next_event_id(),
            timestamp: clock.now(),
            schema_version: EVENT_SCHEMA_VERSION,
            game_id,
            aggregate_id: aggregate_id.into(),
            event,
        }
    }

    pub fn event_id(&self) -> EventId {
        self.event_id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }

    pub fn game_id(&self) -> GameId {
        self.game_id
    }

    pub fn aggregate_id(&self) -> AggregateId {
        self.aggregate_id
    }

    pub fn event(&self) -> &SoftballEvent {
        &self.event
    }

    pub fn event_type(&self) -> &'static str {
        self.event.event_type()
    }

    /// Converts the envelope into its plain persistence record.
    pub fn to_record(&self) -> Result<EventRecord, DomainError> {
        Ok(EventRecord {
            event_id: self.event_id,
            event_type: self.event_type().to_string(),
            aggregate_id: self.aggregate_id,
            game_id: self.game_id,
            schema_version: self.schema_version,
            timestamp: self.timestamp,
            payload: serde_json::to_value(&self.event)?,
        })
    }

    /// Decodes and validates a persistence record.
    pub fn from_record(record: &EventRecord) -> Result<Self, DomainError> {
        if record.schema_version != EVENT_SCHEMA_VERSION {
            return Err(DomainError::InvalidEventStream(format!(
                "event {} has unsupported schema version {}",
                record.event_id, record.schema_version
            )));
        }

        let event: SoftballEvent = serde_json::from_value(record.payload.clone())?;
        if event.event_type() != record.event_type {
            return Err(DomainError::InvalidEventStream(format!(
                "event {} is tagged {} but carries a {} payload",
                record.event_id,
                record.event_type,
                event.event_type()
            )));
        }
        event.validate()?;

        Ok(Self {
            event_id: record.event_id,
            timestamp: record.timestamp,
            schema_version: record.schema_version,
            game_id: record.game_id,
            aggregate_id: record.aggregate_id,
            event,
        })
    }
}
