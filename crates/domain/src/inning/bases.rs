//! Base occupancy value object.

use common::PlayerId;
use serde::{Deserialize, Serialize};

/// One of the three bases a runner can stand on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Base {
    First,
    Second,
    Third,
}

impl Base {
    /// Bases in running order.
    pub const ALL: [Base; 3] = [Base::First, Base::Second, Base::Third];

    /// 1 for first base through 3 for third.
    pub fn number(&self) -> u8 {
        match self {
            Base::First => 1,
            Base::Second => 2,
            Base::Third => 3,
        }
    }

    /// The base a forced runner moves to, or `None` from third.
    pub fn next(&self) -> Option<Base> {
        match self {
            Base::First => Some(Base::Second),
            Base::Second => Some(Base::Third),
            Base::Third => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Base::First => "FIRST",
            Base::Second => "SECOND",
            Base::Third => "THIRD",
        }
    }
}

impl std::fmt::Display for Base {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who stands on each base.
///
/// Immutable: every transition returns a new value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasesState {
    first: Option<PlayerId>,
    second: Option<PlayerId>,
    third: Option<PlayerId>,
}

impl BasesState {
    /// Bases with nobody on.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn runner_on(&self, base: Base) -> Option<PlayerId> {
        match base {
            Base::First => self.first,
            Base::Second => self.second,
            Base::Third => self.third,
        }
    }

    pub fn is_occupied(&self, base: Base) -> bool {
        self.runner_on(base).is_some()
    }

    /// Returns the base `player_id` stands on.
    pub fn base_of(&self, player_id: PlayerId) -> Option<Base> {
        Base::ALL
            .into_iter()
            .find(|base| self.runner_on(*base) == Some(player_id))
    }

    /// Places a runner, replacing whoever stood there.
    #[must_use]
    pub fn with_runner(self, base: Base, player_id: PlayerId) -> Self {
        self.set(base, Some(player_id))
    }

    /// Empties a base.
    #[must_use]
    pub fn without(self, base: Base) -> Self {
        self.set(base, None)
    }

    #[must_use]
    pub fn cleared(self) -> Self {
        Self::empty()
    }

    /// Occupied bases, lead runner last.
    pub fn occupied_bases(&self) -> Vec<Base> {
        Base::ALL
            .into_iter()
            .filter(|base| self.is_occupied(*base))
            .collect()
    }

    pub fn runner_count(&self) -> usize {
        self.occupied_bases().len()
    }

    pub fn is_empty(&self) -> bool {
        self.runner_count() == 0
    }

    pub fn bases_loaded(&self) -> bool {
        self.runner_count() == Base::ALL.len()
    }

    /// Bases whose runner must advance when the batter takes first.
    ///
    /// A runner is forced only if every base behind them is occupied.
    pub fn forced_bases(&self) -> Vec<Base> {
        Base::ALL
            .into_iter()
            .take_while(|base| self.is_occupied(*base))
            .collect()
    }

    /// True if some runner stands on more than one base.
    pub fn has_duplicate_runner(&self) -> bool {
        let runners: Vec<PlayerId> = [self.first, self.second, self.third]
            .into_iter()
            .flatten()
            .collect();
        runners
            .iter()
            .enumerate()
            .any(|(index, runner)| runners[index + 1..].contains(runner))
    }

    fn set(mut self, base: Base, runner: Option<PlayerId>) -> Self {
        match base {
            Base::First => self.first = runner,
            Base::Second => self.second = runner,
            Base::Third => self.third = runner,
        }
        self
    }
}
