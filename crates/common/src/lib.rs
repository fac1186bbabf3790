//! Shared primitives for the softball game tracker.
//!
//! Identifiers are opaque, already-validated values. The record and snapshot
//! types are the plain JSON shapes handed to whatever persists the event log.

mod ids;
mod jersey;
mod record;
mod snapshot;
mod version;

pub use ids::{AggregateId, EventId, GameId, InningStateId, PlayerId, TeamLineupId};
pub use jersey::{InvalidJerseyNumber, JerseyNumber};
pub use record::EventRecord;
pub use snapshot::Snapshot;
pub use version::Version;
