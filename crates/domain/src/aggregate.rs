//! Core aggregate, replay and snapshot traits.

use common::{AggregateId, EventRecord, GameId, Snapshot, Version};
use serde::{Serialize, de::DeserializeOwned};

use crate::clock::SharedClock;
use crate::error::DomainError;
use crate::event::{EventEnvelope, SoftballEvent};

/// Trait for domain events.
///
/// Domain events represent facts that have happened in the game.
/// They are immutable and named in past tense.
pub trait DomainEvent: Serialize + DeserializeOwned + Send + Sync + Clone {
    /// Returns the event type name used as the serialization tag.
    fn event_type(&self) -> &'static str;
}

/// What replay does with an event the aggregate cannot apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayPolicy {
    /// Abort reconstruction with the error.
    Strict,
    /// Log, count and skip the event.
    Lenient,
}

/// Pending events plus the running version of an aggregate.
///
/// Not part of serialized state: snapshots carry the version separately and
/// uncommitted events are never persisted through a snapshot.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    version: Version,
    uncommitted: Vec<EventEnvelope>,
    clock: SharedClock,
}

impl EventLog {
    pub fn version(&self) -> Version {
        self.version
    }

    pub fn uncommitted(&self) -> &[EventEnvelope] {
        &self.uncommitted
    }

    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }

    fn stamp(
        &self,
        game_id: GameId,
        aggregate_id: AggregateId,
        event: SoftballEvent,
    ) -> EventEnvelope {
        EventEnvelope::new(&*self.clock, game_id, aggregate_id, event)
    }

    fn push(&mut self, envelope: EventEnvelope) {
        self.version = self.version.next();
        self.uncommitted.push(envelope);
    }

    fn count_replayed(&mut self) {
        self.version = self.version.next();
    }

    fn restore(&mut self, version: Version) {
        self.version = version;
        self.uncommitted.clear();
    }
}

/// Trait for event-sourced softball aggregates.
///
/// Aggregates:
/// - Are rebuilt by replaying their own stream
/// - Validate commands against current state before recording anything
/// - Apply events deterministically, with no side effects
pub trait Aggregate: Sized {
    /// Returns the aggregate type name.
    fn aggregate_type() -> &'static str;

    /// How replay treats events this aggregate cannot apply.
    fn replay_policy() -> ReplayPolicy;

    /// Returns the identity of this aggregate's stream.
    fn aggregate_id(&self) -> AggregateId;

    /// Returns the game the aggregate belongs to.
    fn game_id(&self) -> GameId;

    fn event_log(&self) -> &EventLog;

    fn event_log_mut(&mut self) -> &mut EventLog;

    /// Builds the initial state from the stream's first event.
    fn from_creation_event(envelope: &EventEnvelope) -> Result<Self, DomainError>;

    /// Applies a non-creation event.
    ///
    /// Returns an error for events that have no meaning for this aggregate;
    /// the replay policy decides whether that error is fatal.
    fn apply(&mut self, event: &SoftballEvent) -> Result<(), DomainError>;

    /// Returns the number of events applied over the aggregate's life.
    fn version(&self) -> Version {
        self.event_log().version()
    }

    /// Events recorded since the last commit.
    fn uncommitted_events(&self) -> &[EventEnvelope] {
        self.event_log().uncommitted()
    }

    /// Clears pending events once they are persisted. State and version are untouched.
    fn mark_events_as_committed(&mut self) {
        self.event_log_mut().uncommitted.clear();
    }

    /// Replaces the provider used to stamp new events.
    fn with_clock(mut self, clock: SharedClock) -> Self {
        self.event_log_mut().clock = clock;
        self
    }

    /// Rebuilds an aggregate from its complete stream.
    ///
    /// The first event must be this aggregate's creation event and every event
    /// must share its game and stream id. The result has no uncommitted events.
    fn from_events(events: &[EventEnvelope]) -> Result<Self, DomainError> {
        let Some((first, rest)) = events.split_first() else {
            return Err(DomainError::InvalidEventStream(format!(
                "cannot reconstruct {} from an empty event stream",
                Self::aggregate_type()
            )));
        };

        let _span = tracing::debug_span!(
            "replay",
            aggregate = Self::aggregate_type(),
            events = events.len()
        )
        .entered();

        first.event().validate()?;
        let mut aggregate = Self::from_creation_event(first)?;
        aggregate.event_log_mut().count_replayed();
        aggregate.replay(rest)?;
        Ok(aggregate)
    }

    /// Decodes persistence records and rebuilds the aggregate from them.
    ///
    /// Records that fail to decode follow the replay policy, except the first:
    /// without a readable creation event there is nothing to rebuild.
    fn from_records(records: &[EventRecord]) -> Result<Self, DomainError> {
        let mut events = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            match EventEnvelope::from_record(record) {
                Ok(envelope) => events.push(envelope),
                Err(err) if index > 0 && Self::replay_policy() == ReplayPolicy::Lenient => {
                    skip_event::<Self>(&record.event_type, &err);
                }
                Err(err) => return Err(err),
            }
        }
        Self::from_events(&events)
    }

    /// Applies events recorded after the aggregate's current state.
    fn replay(&mut self, events: &[EventEnvelope]) -> Result<(), DomainError> {
        for envelope in events {
            check_correlation(self, envelope)?;
            if envelope.event().is_creation() {
                return Err(DomainError::InvalidEventStream(format!(
                    "{} may only open a stream, found it at version {}",
                    envelope.event_type(),
                    self.version().next()
                )));
            }

            let outcome = envelope
                .event()
                .validate()
                .and_then(|()| self.apply(envelope.event()));
            match outcome {
                Ok(()) => {
                    self.event_log_mut().count_replayed();
                    metrics::counter!(
                        "softball_events_replayed_total",
                        "aggregate" => Self::aggregate_type()
                    )
                    .increment(1);
                }
                Err(err) => match Self::replay_policy() {
                    ReplayPolicy::Strict => return Err(err),
                    ReplayPolicy::Lenient => skip_event::<Self>(envelope.event_type(), &err),
                },
            }
        }
        Ok(())
    }
}

fn check_correlation<A: Aggregate>(
    aggregate: &A,
    envelope: &EventEnvelope,
) -> Result<(), DomainError> {
    if envelope.game_id() != aggregate.game_id() {
        return Err(DomainError::InvalidEventStream(format!(
            "event {} belongs to game {}, expected {}",
            envelope.event_id(),
            envelope.game_id(),
            aggregate.game_id()
        )));
    }
    if envelope.aggregate_id() != aggregate.aggregate_id() {
        return Err(DomainError::InvalidEventStream(format!(
            "event {} belongs to {} stream {}, expected {}",
            envelope.event_id(),
            A::aggregate_type(),
            envelope.aggregate_id(),
            aggregate.aggregate_id()
        )));
    }
    Ok(())
}

fn skip_event<A: Aggregate>(event_type: &str, err: &DomainError) {
    tracing::warn!(
        aggregate = A::aggregate_type(),
        event_type,
        error = %err,
        "skipping event during replay"
    );
    metrics::counter!("softball_events_skipped_total", "aggregate" => A::aggregate_type())
        .increment(1);
}

/// Stamps, applies and buffers an event produced by a command.
///
/// Commands call this only after all validation has passed.
pub(crate) fn record<A: Aggregate>(
    aggregate: &mut A,
    event: SoftballEvent,
) -> Result<(), DomainError> {
    let envelope = aggregate
        .event_log()
        .stamp(aggregate.game_id(), aggregate.aggregate_id(), event);
    aggregate.apply(envelope.event())?;

    tracing::debug!(
        aggregate = A::aggregate_type(),
        aggregate_id = %aggregate.aggregate_id(),
        event_type = envelope.event_type(),
        "recorded event"
    );
    metrics::counter!("softball_events_recorded_total", "aggregate" => A::aggregate_type())
        .increment(1);

    aggregate.event_log_mut().push(envelope);
    Ok(())
}

/// Stamps the creation event of a new aggregate and buffers it.
pub(crate) fn open_stream<A: Aggregate>(
    clock: SharedClock,
    game_id: GameId,
    aggregate_id: AggregateId,
    event: SoftballEvent,
) -> Result<A, DomainError> {
    event.validate()?;
    let envelope = EventEnvelope::new(&*clock, game_id, aggregate_id, event);
    let mut aggregate = A::from_creation_event(&envelope)?;

    tracing::debug!(
        aggregate = A::aggregate_type(),
        %aggregate_id,
        event_type = envelope.event_type(),
        "opened stream"
    );
    metrics::counter!("softball_events_recorded_total", "aggregate" => A::aggregate_type())
        .increment(1);

    let log = aggregate.event_log_mut();
    log.clock = clock;
    log.push(envelope);
    Ok(aggregate)
}

/// Trait for aggregates that support snapshotting.
///
/// A snapshot is the serialized state plus the version it reflects. Restoring
/// one and replaying the events recorded after it gives the same aggregate as
/// replaying the whole stream.
pub trait SnapshotCapable: Aggregate + Serialize + DeserializeOwned {
    /// Returns the snapshot interval (number of events between snapshots).
    fn snapshot_interval() -> i64 {
        100
    }

    /// Returns whether a snapshot should be taken at the current version.
    fn should_snapshot(&self) -> bool {
        let version = self.version().as_i64();
        version > 0 && version % Self::snapshot_interval() == 0
    }

    /// Checks that deserialized state obeys the aggregate's invariants.
    fn check_consistency(&self) -> Result<(), DomainError>;

    /// Captures the current state.
    fn to_snapshot(&self) -> Result<Snapshot, DomainError> {
        Ok(Snapshot::from_state(
            self.aggregate_id(),
            Self::aggregate_type(),
            self.version(),
            self.event_log().clock().now(),
            self,
        )?)
    }

    /// Restores from `snapshot`, then replays `subsequent` on top of it.
    fn from_snapshot(
        snapshot: &Snapshot,
        subsequent: &[EventEnvelope],
    ) -> Result<Self, DomainError> {
        if snapshot.aggregate_type != Self::aggregate_type() {
            return Err(DomainError::InvalidSnapshot(format!(
                "expected a {} snapshot, got {}",
                Self::aggregate_type(),
                snapshot.aggregate_type
            )));
        }
        if snapshot.version.is_negative() {
            return Err(DomainError::InvalidSnapshot(format!(
                "version {} is negative",
                snapshot.version
            )));
        }

        let mut aggregate: Self = snapshot
            .state_as()
            .map_err(|err| DomainError::InvalidSnapshot(format!("state does not decode: {err}")))?;
        if aggregate.aggregate_id() != snapshot.aggregate_id {
            return Err(DomainError::InvalidSnapshot(format!(
                "state belongs to {}, snapshot is for {}",
                aggregate.aggregate_id(),
                snapshot.aggregate_id
            )));
        }
        aggregate.check_consistency()?;

        aggregate.event_log_mut().restore(snapshot.version);
        aggregate.replay(subsequent)?;
        Ok(aggregate)
    }
}
