use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Declares a UUID-backed identifier newtype.
///
/// Every identifier gets the same surface: random construction, UUID
/// round-tripping, `Display`, and transparent serde so records stay flat.
macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID.
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

uuid_id!(
    /// Identity of any aggregate stream, independent of its concrete kind.
    AggregateId
);

uuid_id!(
    /// Identifies a game. Every event of every aggregate carries one.
    GameId
);

uuid_id!(
    /// Identifies one team's lineup within a game.
    TeamLineupId
);

uuid_id!(
    /// Identifies the play-by-play state stream of a game.
    InningStateId
);

uuid_id!(
    /// Identifies a player across lineups and substitutions.
    PlayerId
);

uuid_id!(
    /// Unique token attached to every recorded event.
    EventId
);

impl From<GameId> for AggregateId {
    fn from(id: GameId) -> Self {
        Self(id.0)
    }
}

impl From<TeamLineupId> for AggregateId {
    fn from(id: TeamLineupId) -> Self {
        Self(id.0)
    }
}

impl From<InningStateId> for AggregateId {
    fn from(id: InningStateId) -> Self {
        Self(id.0)
    }
}
