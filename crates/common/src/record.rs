use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AggregateId, EventId, GameId};

/// The plain structured form of one event, as handed to an event store.
///
/// The payload is opaque JSON here; the domain crate owns its meaning and
/// decides what to do with payloads it cannot decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Unique identifier for this event.
    pub event_id: EventId,

    /// Discriminant tag (e.g. "GameStarted", "RunnerAdvanced").
    pub event_type: String,

    /// The stream the event belongs to.
    pub aggregate_id: AggregateId,

    /// The game every stream is correlated with.
    pub game_id: GameId,

    /// Schema version of the payload.
    pub schema_version: u32,

    /// When the event was recorded.
    pub timestamp: DateTime<Utc>,

    /// The tagged event payload.
    pub payload: serde_json::Value,
}
