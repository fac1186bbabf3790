use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Jersey numbers outside 0–99 do not fit on a softball uniform.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid jersey number: {0} (must be between 0 and 99)")]
pub struct InvalidJerseyNumber(pub String);

/// A validated jersey number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct JerseyNumber(u8);

impl JerseyNumber {
    pub const MAX: u8 = 99;

    /// Creates a jersey number, rejecting values above 99.
    pub fn new(number: u8) -> Result<Self, InvalidJerseyNumber> {
        if number > Self::MAX {
            return Err(InvalidJerseyNumber(number.to_string()));
        }
        Ok(Self(number))
    }

    /// Returns the numeric value.
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for JerseyNumber {
    type Error = InvalidJerseyNumber;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<JerseyNumber> for u8 {
    fn from(number: JerseyNumber) -> Self {
        number.0
    }
}

impl std::str::FromStr for JerseyNumber {
    type Err = InvalidJerseyNumber;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        trimmed
            .parse::<u8>()
            .map_err(|_| InvalidJerseyNumber(trimmed.to_string()))
            .and_then(Self::new)
    }
}

impl std::fmt::Display for JerseyNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
