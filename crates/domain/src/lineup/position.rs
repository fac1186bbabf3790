//! Defensive positions.

use serde::{Deserialize, Serialize};

/// A defensive position.
///
/// `ShortFielder` is the optional tenth fielder of slow-pitch; `ExtraPlayer`
/// bats without fielding and may be held by several players at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldPosition {
    Pitcher,
    Catcher,
    FirstBase,
    SecondBase,
    ThirdBase,
    Shortstop,
    LeftField,
    CenterField,
    RightField,
    ShortFielder,
    ExtraPlayer,
}

impl FieldPosition {
    /// The nine positions a valid lineup must cover.
    pub const REQUIRED: [FieldPosition; 9] = [
        FieldPosition::Pitcher,
        FieldPosition::Catcher,
        FieldPosition::FirstBase,
        FieldPosition::SecondBase,
        FieldPosition::ThirdBase,
        FieldPosition::Shortstop,
        FieldPosition::LeftField,
        FieldPosition::CenterField,
        FieldPosition::RightField,
    ];

    /// Returns true for the position exempt from uniqueness.
    pub fn is_extra_player(&self) -> bool {
        matches!(self, FieldPosition::ExtraPlayer)
    }

    /// Returns true if the position is one of the nine required ones.
    pub fn is_required(&self) -> bool {
        Self::REQUIRED.contains(self)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldPosition::Pitcher => "PITCHER",
            FieldPosition::Catcher => "CATCHER",
            FieldPosition::FirstBase => "FIRST_BASE",
            FieldPosition::SecondBase => "SECOND_BASE",
            FieldPosition::ThirdBase => "THIRD_BASE",
            FieldPosition::Shortstop => "SHORTSTOP",
            FieldPosition::LeftField => "LEFT_FIELD",
            FieldPosition::CenterField => "CENTER_FIELD",
            FieldPosition::RightField => "RIGHT_FIELD",
            FieldPosition::ShortFielder => "SHORT_FIELDER",
            FieldPosition::ExtraPlayer => "EXTRA_PLAYER",
        }
    }
}

impl std::fmt::Display for FieldPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_positions() {
        assert_eq!(FieldPosition::REQUIRED.len(), 9);
        assert!(FieldPosition::Shortstop.is_required());
        assert!(!FieldPosition::ShortFielder.is_required());
        assert!(!FieldPosition::ExtraPlayer.is_required());
    }

    #[test]
    fn test_display_matches_serialization() {
        for position in [FieldPosition::CenterField, FieldPosition::ExtraPlayer] {
            let json = serde_json::to_string(&position).unwrap();
            assert_eq!(json, format!("\"{position}\""));
        }
    }
}
