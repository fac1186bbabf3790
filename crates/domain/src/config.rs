//! Rule configuration for mercy and regulation checks.

use serde::{Deserialize, Serialize};

/// A run-differential threshold that ends the game early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MercyThreshold {
    /// First inning in which the threshold applies.
    pub min_inning: u32,
    /// Lead (in runs) that triggers the rule.
    pub run_differential: u32,
}

impl MercyThreshold {
    pub fn is_met(&self, inning: u32, differential: u32) -> bool {
        inning >= self.min_inning && differential >= self.run_differential
    }
}

/// Rules a game is played under.
///
/// Reads from environment variables via [`GameRules::from_env`]:
/// - `SOFTBALL_REGULATION_INNINGS` (default: `7`)
/// - `SOFTBALL_EARLY_MERCY_INNING` / `SOFTBALL_EARLY_MERCY_RUNS` (default: `5` / `15`)
/// - `SOFTBALL_LATE_MERCY_INNING` / `SOFTBALL_LATE_MERCY_RUNS` (default: `7` / `10`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRules {
    pub regulation_innings: u32,
    pub early_mercy: MercyThreshold,
    pub late_mercy: MercyThreshold,
}

impl GameRules {
    /// Loads rules from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads rules from an arbitrary key lookup. Unparseable values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let read = |key: &str, fallback: u32| -> u32 {
            lookup(key)
                .and_then(|v| v.trim().parse::<u32>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(fallback)
        };

        Self {
            regulation_innings: read("SOFTBALL_REGULATION_INNINGS", defaults.regulation_innings),
            early_mercy: MercyThreshold {
                min_inning: read("SOFTBALL_EARLY_MERCY_INNING", defaults.early_mercy.min_inning),
                run_differential: read(
                    "SOFTBALL_EARLY_MERCY_RUNS",
                    defaults.early_mercy.run_differential,
                ),
            },
            late_mercy: MercyThreshold {
                min_inning: read("SOFTBALL_LATE_MERCY_INNING", defaults.late_mercy.min_inning),
                run_differential: read(
                    "SOFTBALL_LATE_MERCY_RUNS",
                    defaults.late_mercy.run_differential,
                ),
            },
        }
    }

    /// Returns true if either mercy threshold is met.
    pub fn is_mercy(&self, inning: u32, differential: u32) -> bool {
        self.early_mercy.is_met(inning, differential)
            || self.late_mercy.is_met(inning, differential)
    }
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            regulation_innings: 7,
            early_mercy: MercyThreshold {
                min_inning: 5,
                run_differential: 15,
            },
            late_mercy: MercyThreshold {
                min_inning: 7,
                run_differential: 10,
            },
        }
    }
}
