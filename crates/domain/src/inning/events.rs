//! Inning state domain events.

use common::PlayerId;
use serde::{Deserialize, Serialize};

use crate::batting::validate_batting_slot;
use crate::error::DomainError;
use crate::event::SoftballEvent;

use super::{AdvanceReason, AtBatResultType, Base, RunnerDestination};

/// Outs that end a half-inning.
pub const OUTS_PER_HALF_INNING: u8 = 3;

/// Data for InningStateCreated event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InningStateCreatedData {
    pub inning: u32,
    pub is_top_half: bool,
}

/// Data for AtBatCompleted event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtBatCompletedData {
    pub batter_id: PlayerId,
    pub batting_slot: u8,
    pub result: AtBatResultType,
    pub inning: u32,

    /// Outs charged by the play itself. Runners put out are recorded
    /// separately as `RunnerAdvanced` to `OUT`.
    pub outs_on_play: u8,
}

/// Data for RunnerAdvanced event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerAdvancedData {
    pub runner_id: PlayerId,

    /// `None` when the runner is the batter.
    pub from: Option<Base>,
    pub to: RunnerDestination,
    pub reason: AdvanceReason,
}

/// Data for RunScored event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunScoredData {
    pub runner_id: PlayerId,

    /// Batter credited with driving the run in, if any.
    pub batter_id: Option<PlayerId>,
    pub inning: u32,
    pub is_top_half: bool,
}

/// Data for CurrentBatterChanged event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentBatterChangedData {
    pub previous_slot: u8,
    pub new_slot: u8,
    pub inning: u32,
    pub is_top_half: bool,
}

/// Data for HalfInningEnded event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HalfInningEndedData {
    pub inning: u32,
    pub was_top_half: bool,
    pub final_outs: u8,
}

fn validate_inning(inning: u32) -> Result<(), DomainError> {
    if inning == 0 {
        return Err(DomainError::validation("Inning must be at least 1"));
    }
    Ok(())
}

impl InningStateCreatedData {
    pub(crate) fn validate(&self) -> Result<(), DomainError> {
        validate_inning(self.inning)
    }
}

impl AtBatCompletedData {
    pub(crate) fn validate(&self) -> Result<(), DomainError> {
        validate_batting_slot(self.batting_slot)?;
        validate_inning(self.inning)?;
        if self.outs_on_play > self.result.outs_on_play() {
            return Err(DomainError::validation(format!(
                "{} cannot produce {} outs",
                self.result, self.outs_on_play
            )));
        }
        Ok(())
    }
}

impl RunnerAdvancedData {
    pub(crate) fn validate(&self) -> Result<(), DomainError> {
        self.to.check_reachable_from(self.from)
    }
}

impl RunScoredData {
    pub(crate) fn validate(&self) -> Result<(), DomainError> {
        validate_inning(self.inning)
    }
}

impl CurrentBatterChangedData {
    pub(crate) fn validate(&self) -> Result<(), DomainError> {
        validate_batting_slot(self.previous_slot)?;
        validate_batting_slot(self.new_slot)?;
        validate_inning(self.inning)
    }
}

impl HalfInningEndedData {
    pub(crate) fn validate(&self) -> Result<(), DomainError> {
        validate_inning(self.inning)?;
        if self.final_outs > OUTS_PER_HALF_INNING {
            return Err(DomainError::validation(format!(
                "A half-inning cannot end with {} outs",
                self.final_outs
            )));
        }
        Ok(())
    }
}

// Convenience constructors for inning events
impl SoftballEvent {
    /// Creates an InningStateCreated event.
    pub fn inning_state_created(inning: u32, is_top_half: bool) -> Result<Self, DomainError> {
        let data = InningStateCreatedData { inning, is_top_half };
        data.validate()?;
        Ok(SoftballEvent::InningStateCreated(data))
    }

    /// Creates an AtBatCompleted event.
    pub fn at_bat_completed(
        batter_id: PlayerId,
        batting_slot: u8,
        result: AtBatResultType,
        inning: u32,
        outs_on_play: u8,
    ) -> Result<Self, DomainError> {
        let data = AtBatCompletedData {
            batter_id,
            batting_slot,
            result,
            inning,
            outs_on_play,
        };
        data.validate()?;
        Ok(SoftballEvent::AtBatCompleted(data))
    }

    /// Creates a RunnerAdvanced event.
    pub fn runner_advanced(
        runner_id: PlayerId,
        from: Option<Base>,
        to: RunnerDestination,
        reason: AdvanceReason,
    ) -> Result<Self, DomainError> {
        let data = RunnerAdvancedData {
            runner_id,
            from,
            to,
            reason,
        };
        data.validate()?;
        Ok(SoftballEvent::RunnerAdvanced(data))
    }

    /// Creates a RunScored event.
    pub fn run_scored(
        runner_id: PlayerId,
        batter_id: Option<PlayerId>,
        inning: u32,
        is_top_half: bool,
    ) -> Result<Self, DomainError> {
        let data = RunScoredData {
            runner_id,
            batter_id,
            inning,
            is_top_half,
        };
        data.validate()?;
        Ok(SoftballEvent::RunScored(data))
    }

    /// Creates a CurrentBatterChanged event.
    pub fn current_batter_changed(
        previous_slot: u8,
        new_slot: u8,
        inning: u32,
        is_top_half: bool,
    ) -> Result<Self, DomainError> {
        let data = CurrentBatterChangedData {
            previous_slot,
            new_slot,
            inning,
            is_top_half,
        };
        data.validate()?;
        Ok(SoftballEvent::CurrentBatterChanged(data))
    }

    /// Creates a HalfInningEnded event.
    pub fn half_inning_ended(
        inning: u32,
        was_top_half: bool,
        final_outs: u8,
    ) -> Result<Self, DomainError> {
        let data = HalfInningEndedData {
            inning,
            was_top_half,
            final_outs,
        };
        data.validate()?;
        Ok(SoftballEvent::HalfInningEnded(data))
    }
}
