//! At-bat outcomes and runner movement vocabulary.

use std::fmt;
use std::str::FromStr;

use common::PlayerId;
use serde::{Deserialize, Serialize};

use super::Base;
use crate::error::DomainError;

/// Outcome of a plate appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AtBatResultType {
    Single,
    Double,
    Triple,
    HomeRun,
    Walk,
    Strikeout,
    GroundOut,
    FlyOut,
    SacrificeFly,
    Error,
    FieldersChoice,
    DoublePlay,
    TriplePlay,
}

impl AtBatResultType {
    pub const ALL: [AtBatResultType; 13] = [
        AtBatResultType::Single,
        AtBatResultType::Double,
        AtBatResultType::Triple,
        AtBatResultType::HomeRun,
        AtBatResultType::Walk,
        AtBatResultType::Strikeout,
        AtBatResultType::GroundOut,
        AtBatResultType::FlyOut,
        AtBatResultType::SacrificeFly,
        AtBatResultType::Error,
        AtBatResultType::FieldersChoice,
        AtBatResultType::DoublePlay,
        AtBatResultType::TriplePlay,
    ];

    /// Outs the play itself produces, before any runner movement.
    pub fn outs_on_play(&self) -> u8 {
        match self {
            AtBatResultType::Strikeout
            | AtBatResultType::GroundOut
            | AtBatResultType::FlyOut
            | AtBatResultType::SacrificeFly
            | AtBatResultType::FieldersChoice => 1,
            AtBatResultType::DoublePlay => 2,
            AtBatResultType::TriplePlay => 3,
            AtBatResultType::Single
            | AtBatResultType::Double
            | AtBatResultType::Triple
            | AtBatResultType::HomeRun
            | AtBatResultType::Walk
            | AtBatResultType::Error => 0,
        }
    }

    /// The base the batter ends on, if they stay on base.
    pub fn batter_destination(&self) -> Option<Base> {
        match self {
            AtBatResultType::Single
            | AtBatResultType::Walk
            | AtBatResultType::Error
            | AtBatResultType::FieldersChoice => Some(Base::First),
            AtBatResultType::Double => Some(Base::Second),
            AtBatResultType::Triple => Some(Base::Third),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AtBatResultType::Single => "SINGLE",
            AtBatResultType::Double => "DOUBLE",
            AtBatResultType::Triple => "TRIPLE",
            AtBatResultType::HomeRun => "HOME_RUN",
            AtBatResultType::Walk => "WALK",
            AtBatResultType::Strikeout => "STRIKEOUT",
            AtBatResultType::GroundOut => "GROUND_OUT",
            AtBatResultType::FlyOut => "FLY_OUT",
            AtBatResultType::SacrificeFly => "SACRIFICE_FLY",
            AtBatResultType::Error => "ERROR",
            AtBatResultType::FieldersChoice => "FIELDERS_CHOICE",
            AtBatResultType::DoublePlay => "DOUBLE_PLAY",
            AtBatResultType::TriplePlay => "TRIPLE_PLAY",
        }
    }
}

impl fmt::Display for AtBatResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AtBatResultType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|result| result.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("Unknown at-bat result: {s}")))
    }
}

/// Why a runner moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdvanceReason {
    Hit,
    Walk,
    Error,
    FieldersChoice,
    Sacrifice,
    OutOnPlay,
}

impl AdvanceReason {
    /// The reason runners move on a given result.
    pub fn from_result(result: AtBatResultType) -> Self {
        match result {
            AtBatResultType::Single
            | AtBatResultType::Double
            | AtBatResultType::Triple
            | AtBatResultType::HomeRun => AdvanceReason::Hit,
            AtBatResultType::Walk => AdvanceReason::Walk,
            AtBatResultType::Error => AdvanceReason::Error,
            AtBatResultType::FieldersChoice => AdvanceReason::FieldersChoice,
            AtBatResultType::SacrificeFly => AdvanceReason::Sacrifice,
            AtBatResultType::Strikeout
            | AtBatResultType::GroundOut
            | AtBatResultType::FlyOut
            | AtBatResultType::DoublePlay
            | AtBatResultType::TriplePlay => AdvanceReason::OutOnPlay,
        }
    }
}

/// Where a runner ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunnerDestination {
    First,
    Second,
    Third,
    Home,
    Out,
}

impl RunnerDestination {
    /// The base the runner stands on afterwards, if any.
    pub fn base(&self) -> Option<Base> {
        match self {
            RunnerDestination::First => Some(Base::First),
            RunnerDestination::Second => Some(Base::Second),
            RunnerDestination::Third => Some(Base::Third),
            RunnerDestination::Home | RunnerDestination::Out => None,
        }
    }

    /// Checks the move goes forward around the bases.
    ///
    /// `from` is `None` for the batter. Being put out is allowed from anywhere.
    pub(crate) fn check_reachable_from(&self, from: Option<Base>) -> Result<(), DomainError> {
        let start = from.map_or(0, |base| base.number());
        let reachable = match self {
            RunnerDestination::Out | RunnerDestination::Home => true,
            _ => self.base().is_some_and(|base| base.number() > start),
        };
        if !reachable {
            let from = from.map_or("BATTER", |base| base.as_str());
            return Err(DomainError::validation(format!(
                "Runner cannot move from {from} to {self}"
            )));
        }
        Ok(())
    }
}

impl From<Base> for RunnerDestination {
    fn from(base: Base) -> Self {
        match base {
            Base::First => RunnerDestination::First,
            Base::Second => RunnerDestination::Second,
            Base::Third => RunnerDestination::Third,
        }
    }
}

impl fmt::Display for RunnerDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunnerDestination::Home => f.write_str("HOME"),
            RunnerDestination::Out => f.write_str("OUT"),
            _ => self.base().map_or(Ok(()), |base| f.write_str(base.as_str())),
        }
    }
}

/// A manual runner placement for `InningState::advance_runners`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerMovement {
    pub runner_id: PlayerId,
    /// `None` moves the batter.
    pub from: Option<Base>,
    pub to: RunnerDestination,
}

impl RunnerMovement {
    pub fn new(runner_id: PlayerId, from: Option<Base>, to: RunnerDestination) -> Self {
        Self { runner_id, from, to }
    }
}
