use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AggregateId, Version};

/// A precomputed projection of an aggregate's state at a given version.
///
/// Restoring from a snapshot and replaying only the events recorded after it
/// must give the same aggregate as replaying the whole stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// The aggregate this snapshot belongs to.
    pub aggregate_id: AggregateId,

    /// Type tag of the aggregate (e.g. "Game", "TeamLineup").
    pub aggregate_type: String,

    /// Number of events folded into the state.
    pub version: Version,

    /// When the snapshot was taken.
    pub timestamp: DateTime<Utc>,

    /// The serialized aggregate state.
    pub state: serde_json::Value,
}

impl Snapshot {
    /// Creates a snapshot from a serializable state.
    pub fn from_state<T: Serialize>(
        aggregate_id: AggregateId,
        aggregate_type: impl Into<String>,
        version: Version,
        timestamp: DateTime<Utc>,
        state: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            aggregate_id,
            aggregate_type: aggregate_type.into(),
            version,
            timestamp,
            state: serde_json::to_value(state)?,
        })
    }

    /// Deserializes the snapshot state into a concrete type.
    pub fn state_as<T: for<'de> Deserialize<'de>>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Tally {
        home: u32,
        away: u32,
    }

    #[test]
    fn state_survives_the_round_trip() {
        let id = AggregateId::new();
        let snapshot =
            Snapshot::from_state(id, "Tally", Version::new(4), Utc::now(), &Tally { home: 3, away: 1 })
                .unwrap();

        assert_eq!(snapshot.aggregate_type, "Tally");
        assert_eq!(snapshot.version, Version::new(4));
        assert_eq!(snapshot.state_as::<Tally>().unwrap(), Tally { home: 3, away: 1 });
    }

    #[test]
    fn mismatched_state_fails_to_decode() {
        let snapshot = Snapshot::from_state(
            AggregateId::new(),
            "Tally",
            Version::new(1),
            Utc::now(),
            &serde_json::json!({"home": "lots"}),
        )
        .unwrap();

        assert!(snapshot.state_as::<Tally>().is_err());
    }
}
