//! InningState aggregate implementation.

use std::cmp::Reverse;

use common::{AggregateId, GameId, InningStateId, PlayerId};
use serde::{Deserialize, Serialize};

use crate::aggregate::{
    Aggregate, DomainEvent, EventLog, ReplayPolicy, SnapshotCapable, open_stream, record,
};
use crate::batting::{MIN_BATTING_SLOT, next_batting_slot, validate_batting_slot};
use crate::clock::SharedClock;
use crate::error::DomainError;
use crate::event::{EventEnvelope, SoftballEvent};
use crate::game::InningAdvancedData;

use super::events::{
    AtBatCompletedData, CurrentBatterChangedData, HalfInningEndedData, OUTS_PER_HALF_INNING,
    RunScoredData, RunnerAdvancedData,
};
use super::{AdvanceReason, AtBatResultType, Base, BasesState, RunnerDestination, RunnerMovement};

/// Point-in-time view of the half-inning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InningSituation {
    pub inning: u32,
    pub is_top_half: bool,
    pub outs: u8,
    pub current_batting_slot: u8,
    pub bases: BasesState,
    pub runs_this_half: u32,
}

/// The half-inning a third out just closed, kept until the command's
/// closing events are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct ClosedHalf {
    inning: u32,
    was_top_half: bool,
    final_outs: u8,
    runs: u32,
    batting_slot: u8,
}

/// InningState aggregate root.
///
/// Play-by-play state of the half-inning being played: bases, outs and the
/// batter due up. Runs and outs reach the game score through a coordinator
/// that reads these events; this type never touches a `Game`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InningState {
    id: InningStateId,
    game_id: GameId,
    inning: u32,
    is_top_half: bool,
    outs: u8,
    current_batting_slot: u8,
    bases: BasesState,
    #[serde(default)]
    runs_this_half: u32,
    #[serde(default)]
    closed_half: Option<ClosedHalf>,
    #[serde(skip)]
    log: EventLog,
}

impl Aggregate for InningState {
    fn aggregate_type() -> &'static str {
        "InningState"
    }

    fn replay_policy() -> ReplayPolicy {
        ReplayPolicy::Lenient
    }

    fn aggregate_id(&self) -> AggregateId {
        self.id.into()
    }

    fn game_id(&self) -> GameId {
        self.game_id
    }

    fn event_log(&self) -> &EventLog {
        &self.log
    }

    fn event_log_mut(&mut self) -> &mut EventLog {
        &mut self.log
    }

    fn from_creation_event(envelope: &EventEnvelope) -> Result<Self, DomainError> {
        let SoftballEvent::InningStateCreated(data) = envelope.event() else {
            return Err(DomainError::InvalidEventStream(format!(
                "first InningState event must be InningStateCreated, got {}",
                envelope.event_type()
            )));
        };

        Ok(Self {
            id: InningStateId::from_uuid(envelope.aggregate_id().as_uuid()),
            game_id: envelope.game_id(),
            inning: data.inning,
            is_top_half: data.is_top_half,
            outs: 0,
            current_batting_slot: MIN_BATTING_SLOT,
            bases: BasesState::empty(),
            runs_this_half: 0,
            closed_half: None,
            log: EventLog::default(),
        })
    }

    fn apply(&mut self, event: &SoftballEvent) -> Result<(), DomainError> {
        match event {
            SoftballEvent::AtBatCompleted(data) => self.apply_at_bat(data),
            SoftballEvent::RunnerAdvanced(data) => self.apply_runner_advanced(data),
            SoftballEvent::RunScored(data) => self.apply_run_scored(data),
            SoftballEvent::CurrentBatterChanged(data) => self.apply_batter_changed(data),
            SoftballEvent::HalfInningEnded(data) => self.apply_half_inning_ended(data),
            SoftballEvent::InningAdvanced(data) => self.apply_inning_advanced(data),
            SoftballEvent::GameCreated(_)
            | SoftballEvent::GameStarted(_)
            | SoftballEvent::ScoreUpdated(_)
            | SoftballEvent::OutRecorded(_)
            | SoftballEvent::GameCompleted(_)
            | SoftballEvent::TeamLineupCreated(_)
            | SoftballEvent::PlayerAddedToLineup(_)
            | SoftballEvent::PlayerSubstitutedIntoGame(_)
            | SoftballEvent::FieldPositionChanged(_)
            | SoftballEvent::InningStateCreated(_) => Err(DomainError::UnsupportedEvent {
                aggregate: Self::aggregate_type(),
                event_type: event.event_type().to_string(),
            }),
        }
    }
}

impl SnapshotCapable for InningState {
    fn check_consistency(&self) -> Result<(), DomainError> {
        if self.inning == 0 {
            return Err(DomainError::InvalidSnapshot("inning must be at least 1".to_string()));
        }
        if self.outs >= OUTS_PER_HALF_INNING {
            return Err(DomainError::InvalidSnapshot(format!(
                "{} outs is not a resting state",
                self.outs
            )));
        }
        validate_batting_slot(self.current_batting_slot)
            .map_err(|err| DomainError::InvalidSnapshot(err.to_string()))?;
        if self.bases.has_duplicate_runner() {
            return Err(DomainError::InvalidSnapshot(
                "a runner occupies two bases".to_string(),
            ));
        }
        if let Some(closed) = self.closed_half {
            let follows = if closed.was_top_half {
                (closed.inning, false)
            } else {
                (closed.inning.saturating_add(1), true)
            };
            if follows != (self.inning, self.is_top_half)
                || closed.final_outs != OUTS_PER_HALF_INNING
                || self.outs != 0
                || !self.bases.is_empty()
            {
                return Err(DomainError::InvalidSnapshot(
                    "a closed half-inning must be followed by an empty one".to_string(),
                ));
            }
        }
        Ok(())
    }
}

// Factories
impl InningState {
    /// Opens play-by-play tracking at the top of the first inning.
    pub fn create_new(id: InningStateId, game_id: GameId) -> Result<Self, DomainError> {
        Self::create_with_clock(SharedClock::default(), id, game_id, 1, true)
    }

    /// Opens tracking at an arbitrary half-inning with events stamped by `clock`.
    pub fn create_with_clock(
        clock: SharedClock,
        id: InningStateId,
        game_id: GameId,
        inning: u32,
        is_top_half: bool,
    ) -> Result<Self, DomainError> {
        let event = SoftballEvent::inning_state_created(inning, is_top_half)?;
        open_stream(clock, game_id, id.into(), event)
    }
}

// Query methods
impl InningState {
    pub fn id(&self) -> InningStateId {
        self.id
    }

    pub fn inning(&self) -> u32 {
        self.inning
    }

    pub fn is_top_half(&self) -> bool {
        self.is_top_half
    }

    pub fn outs(&self) -> u8 {
        self.outs
    }

    pub fn current_batting_slot(&self) -> u8 {
        self.current_batting_slot
    }

    pub fn bases_state(&self) -> BasesState {
        self.bases
    }

    /// Runs scored since the half-inning began.
    pub fn runs_this_half(&self) -> u32 {
        self.runs_this_half
    }

    pub fn get_current_situation(&self) -> InningSituation {
        InningSituation {
            inning: self.inning,
            is_top_half: self.is_top_half,
            outs: self.outs,
            current_batting_slot: self.current_batting_slot,
            bases: self.bases,
            runs_this_half: self.runs_this_half,
        }
    }
}

// Command methods
impl InningState {
    /// Records a completed plate appearance and its automatic consequences.
    ///
    /// Hits place only the batter. Runners already on base stay put unless the
    /// result forces them, so a hit whose destination base is occupied is
    /// rejected until `advance_runners` has moved the runner ahead.
    ///
    /// Results that cannot happen in the current situation are rejected rather
    /// than capped: a sacrifice fly with two outs, and a double or triple play
    /// that would put more than three outs on the board.
    pub fn record_at_bat(
        &mut self,
        batter_id: PlayerId,
        batting_slot: u8,
        result: AtBatResultType,
        inning: u32,
    ) -> Result<(), DomainError> {
        validate_batting_slot(batting_slot)?;
        if batting_slot != self.current_batting_slot {
            return Err(DomainError::BattingOutOfOrder {
                expected: self.current_batting_slot,
                actual: batting_slot,
            });
        }
        if inning != self.inning {
            return Err(DomainError::validation(format!(
                "At-bat recorded for inning {inning} during inning {}",
                self.inning
            )));
        }
        if self.outs + result.outs_on_play() > OUTS_PER_HALF_INNING {
            return Err(DomainError::validation(format!(
                "A {result} is not possible with {} outs",
                self.outs
            )));
        }
        if result == AtBatResultType::SacrificeFly && self.outs >= 2 {
            return Err(DomainError::validation(
                "A sacrifice fly requires fewer than two outs",
            ));
        }

        let mut play = Play::new(self);
        let runner_on_first = self.bases.runner_on(Base::First);
        let outs_on_play = match (result, runner_on_first) {
            (AtBatResultType::FieldersChoice, Some(_)) => 0,
            _ => result.outs_on_play(),
        };
        play.push(SoftballEvent::at_bat_completed(
            batter_id,
            batting_slot,
            result,
            inning,
            outs_on_play,
        )?)?;

        let reason = AdvanceReason::from_result(result);
        let credit = Some(batter_id);
        match result {
            AtBatResultType::HomeRun => {
                for base in self.bases.occupied_bases().into_iter().rev() {
                    if let Some(runner) = self.bases.runner_on(base) {
                        let home = RunnerDestination::Home;
                        play.move_runner(runner, Some(base), home, reason, credit)?;
                    }
                }
                play.move_runner(batter_id, None, RunnerDestination::Home, reason, credit)?;
            }
            AtBatResultType::Walk => {
                // lead runner first so each forced runner finds the next base empty
                for base in self.bases.forced_bases().into_iter().rev() {
                    if let Some(runner) = self.bases.runner_on(base) {
                        let to = base
                            .next()
                            .map_or(RunnerDestination::Home, RunnerDestination::from);
                        play.move_runner(runner, Some(base), to, reason, credit)?;
                    }
                }
                play.move_runner(batter_id, None, RunnerDestination::First, reason, credit)?;
            }
            AtBatResultType::FieldersChoice => {
                if let Some(runner) = runner_on_first {
                    let out = RunnerDestination::Out;
                    play.move_runner(runner, Some(Base::First), out, reason, None)?;
                }
                if play.draft.closed_half.is_none() {
                    play.move_runner(batter_id, None, RunnerDestination::First, reason, None)?;
                }
            }
            AtBatResultType::SacrificeFly => {
                if let Some(runner) = self.bases.runner_on(Base::Third) {
                    let home = RunnerDestination::Home;
                    play.move_runner(runner, Some(Base::Third), home, reason, credit)?;
                }
            }
            AtBatResultType::Single
            | AtBatResultType::Double
            | AtBatResultType::Triple
            | AtBatResultType::Error => {
                if let Some(base) = result.batter_destination() {
                    play.move_runner(batter_id, None, base.into(), reason, None)?;
                }
            }
            AtBatResultType::Strikeout
            | AtBatResultType::GroundOut
            | AtBatResultType::FlyOut
            | AtBatResultType::DoublePlay
            | AtBatResultType::TriplePlay => {}
        }

        play.push(SoftballEvent::current_batter_changed(
            batting_slot,
            next_batting_slot(batting_slot),
            self.inning,
            self.is_top_half,
        )?)?;

        if play.draft.closed_half.is_some() {
            play.end_half_inning()?;
        }
        self.commit(play)
    }

    /// Moves runners explicitly.
    ///
    /// Used where the automatic at-bat handling cannot know what happened,
    /// such as runners taking extra bases on a hit or a specific runner being
    /// put out. Lead runners are moved first; the batter last.
    pub fn advance_runners(
        &mut self,
        result: AtBatResultType,
        movements: &[RunnerMovement],
    ) -> Result<(), DomainError> {
        if movements.is_empty() {
            return Err(DomainError::validation("At least one runner movement is required"));
        }

        let mut ordered = movements.to_vec();
        ordered.sort_by_key(|movement| Reverse(movement.from.map_or(0, |base| base.number())));

        let reason = AdvanceReason::from_result(result);
        let mut play = Play::new(self);
        for movement in ordered {
            let reason = match movement.to {
                RunnerDestination::Out => AdvanceReason::OutOnPlay,
                _ => reason,
            };
            play.move_runner(movement.runner_id, movement.from, movement.to, reason, None)?;
        }

        if play.draft.closed_half.is_some() {
            play.end_half_inning()?;
        }
        self.commit(play)
    }

    /// Closes the current half-inning regardless of outs.
    ///
    /// Leaving the bottom half also starts the next inning.
    pub fn end_half_inning(&mut self) -> Result<(), DomainError> {
        let mut play = Play::new(self);
        play.end_half_inning()?;
        self.commit(play)
    }

    /// Points the batting order at `slot` without an at-bat.
    pub fn set_current_batting_slot(&mut self, slot: u8) -> Result<(), DomainError> {
        validate_batting_slot(slot)?;
        if slot == self.current_batting_slot {
            return Err(DomainError::validation(format!("Slot {slot} is already due up")));
        }
        let event = SoftballEvent::current_batter_changed(
            self.current_batting_slot,
            slot,
            self.inning,
            self.is_top_half,
        )?;
        record(self, event)
    }

    fn commit(&mut self, play: Play) -> Result<(), DomainError> {
        for event in play.events {
            if let SoftballEvent::HalfInningEnded(data) = &event {
                let runs = self.closed_half.map_or(self.runs_this_half, |closed| closed.runs);
                tracing::info!(
                    inning_state_id = %self.id,
                    inning = data.inning,
                    top = data.was_top_half,
                    outs = data.final_outs,
                    runs,
                    "half-inning ended"
                );
            }
            record(self, event)?;
        }
        Ok(())
    }

    /// A copy of the state without the event log, for planning.
    fn detached(&self) -> Self {
        Self {
            id: self.id,
            game_id: self.game_id,
            inning: self.inning,
            is_top_half: self.is_top_half,
            outs: self.outs,
            current_batting_slot: self.current_batting_slot,
            bases: self.bases,
            runs_this_half: self.runs_this_half,
            closed_half: self.closed_half,
            log: EventLog::default(),
        }
    }
}

/// Events planned against a detached draft.
///
/// Each event is applied to the draft as it is planned, so a rule violation
/// anywhere in a multi-event command surfaces before anything is recorded.
struct Play {
    draft: InningState,
    events: Vec<SoftballEvent>,
}

impl Play {
    fn new(state: &InningState) -> Self {
        Self {
            draft: state.detached(),
            events: Vec::new(),
        }
    }

    fn push(&mut self, event: SoftballEvent) -> Result<(), DomainError> {
        self.draft.apply(&event)?;
        self.events.push(event);
        Ok(())
    }

    /// Moves one runner, crediting the run when they reach home.
    fn move_runner(
        &mut self,
        runner_id: PlayerId,
        from: Option<Base>,
        to: RunnerDestination,
        reason: AdvanceReason,
        batter_id: Option<PlayerId>,
    ) -> Result<(), DomainError> {
        self.push(SoftballEvent::runner_advanced(runner_id, from, to, reason)?)?;
        if to == RunnerDestination::Home {
            let (inning, is_top_half) = (self.draft.inning, self.draft.is_top_half);
            self.push(SoftballEvent::run_scored(runner_id, batter_id, inning, is_top_half)?)?;
        }
        Ok(())
    }

    fn end_half_inning(&mut self) -> Result<(), DomainError> {
        let (inning, was_top_half, final_outs) = match self.draft.closed_half {
            Some(closed) => (closed.inning, closed.was_top_half, closed.final_outs),
            None => (self.draft.inning, self.draft.is_top_half, self.draft.outs),
        };
        self.push(SoftballEvent::half_inning_ended(inning, was_top_half, final_outs)?)?;
        if !was_top_half {
            self.push(SoftballEvent::inning_advanced(self.draft.inning, true)?)?;
        }
        Ok(())
    }
}

// Apply event helpers
impl InningState {
    fn require_half(&self, inning: u32, is_top_half: bool, what: &str) -> Result<(), DomainError> {
        if inning != self.inning || is_top_half != self.is_top_half {
            return Err(DomainError::validation(format!(
                "{what} for inning {inning} ({}) does not match inning {} ({})",
                half_name(is_top_half),
                self.inning,
                half_name(self.is_top_half)
            )));
        }
        Ok(())
    }

    fn require_open_half(&self) -> Result<(), DomainError> {
        if self.closed_half.is_some() {
            return Err(DomainError::validation("The half-inning already has three outs"));
        }
        Ok(())
    }

    /// Counts outs on the play. The third closes the half on the spot.
    fn add_outs(&mut self, outs: u8) -> Result<(), DomainError> {
        let total = self.outs + outs;
        if total < OUTS_PER_HALF_INNING {
            self.outs = total;
            return Ok(());
        }

        let closed = ClosedHalf {
            inning: self.inning,
            was_top_half: self.is_top_half,
            final_outs: total,
            runs: self.runs_this_half,
            batting_slot: self.current_batting_slot,
        };
        self.turn_over()?;
        self.closed_half = Some(closed);
        Ok(())
    }

    /// Starts the next half-inning with nobody out and the bases empty.
    fn turn_over(&mut self) -> Result<(), DomainError> {
        if self.is_top_half {
            self.is_top_half = false;
        } else {
            self.inning = self
                .inning
                .checked_add(1)
                .ok_or_else(|| DomainError::validation("Inning counter overflow"))?;
            self.is_top_half = true;
        }
        self.outs = 0;
        self.current_batting_slot = MIN_BATTING_SLOT;
        self.bases = self.bases.cleared();
        self.runs_this_half = 0;
        Ok(())
    }

    fn apply_at_bat(&mut self, data: &AtBatCompletedData) -> Result<(), DomainError> {
        if data.batting_slot != self.current_batting_slot {
            return Err(DomainError::BattingOutOfOrder {
                expected: self.current_batting_slot,
                actual: data.batting_slot,
            });
        }
        self.require_half(data.inning, self.is_top_half, "At-bat")?;
        self.require_open_half()?;
        if self.bases.base_of(data.batter_id).is_some() {
            return Err(DomainError::validation(format!(
                "Batter {} is already on base",
                data.batter_id
            )));
        }
        let outs = self.outs + data.outs_on_play;
        if outs > OUTS_PER_HALF_INNING {
            return Err(DomainError::validation(format!(
                "{} would make {outs} outs",
                data.result
            )));
        }

        if matches!(
            data.result,
            AtBatResultType::DoublePlay | AtBatResultType::TriplePlay
        ) {
            self.bases = self.bases.cleared();
        }
        self.add_outs(data.outs_on_play)
    }

    fn apply_runner_advanced(&mut self, data: &RunnerAdvancedData) -> Result<(), DomainError> {
        self.require_open_half()?;
        let bases = match data.from {
            Some(base) => {
                if self.bases.runner_on(base) != Some(data.runner_id) {
                    return Err(DomainError::validation(format!(
                        "Runner {} is not on {base}",
                        data.runner_id
                    )));
                }
                self.bases.without(base)
            }
            None => {
                if self.bases.base_of(data.runner_id).is_some() {
                    return Err(DomainError::validation(format!(
                        "Batter {} is already on base",
                        data.runner_id
                    )));
                }
                self.bases
            }
        };

        match (data.to, data.to.base()) {
            (RunnerDestination::Out, _) => {
                self.bases = bases;
                self.add_outs(1)?;
            }
            (_, Some(base)) => {
                if bases.is_occupied(base) {
                    return Err(DomainError::BaseOccupied(base));
                }
                self.bases = bases.with_runner(base, data.runner_id);
            }
            (_, None) => self.bases = bases,
        }
        Ok(())
    }

    fn apply_run_scored(&mut self, data: &RunScoredData) -> Result<(), DomainError> {
        self.require_half(data.inning, data.is_top_half, "Run")?;
        self.runs_this_half = self
            .runs_this_half
            .checked_add(1)
            .ok_or_else(|| DomainError::validation("Run counter overflow"))?;
        Ok(())
    }

    fn apply_batter_changed(&mut self, data: &CurrentBatterChangedData) -> Result<(), DomainError> {
        if let Some(closed) = self.closed_half.as_mut() {
            // the order moves on in the closed half; the new half leads off with slot 1
            if data.previous_slot != closed.batting_slot {
                return Err(DomainError::BattingOutOfOrder {
                    expected: closed.batting_slot,
                    actual: data.previous_slot,
                });
            }
            if (data.inning, data.is_top_half) != (closed.inning, closed.was_top_half) {
                return Err(DomainError::validation(
                    "Batter change does not belong to the half-inning just closed",
                ));
            }
            closed.batting_slot = data.new_slot;
            return Ok(());
        }

        if data.previous_slot != self.current_batting_slot {
            return Err(DomainError::BattingOutOfOrder {
                expected: self.current_batting_slot,
                actual: data.previous_slot,
            });
        }
        self.require_half(data.inning, data.is_top_half, "Batter change")?;
        self.current_batting_slot = data.new_slot;
        Ok(())
    }

    fn apply_half_inning_ended(&mut self, data: &HalfInningEndedData) -> Result<(), DomainError> {
        let Some(closed) = self.closed_half else {
            self.require_half(data.inning, data.was_top_half, "Half-inning end")?;
            if data.final_outs != self.outs {
                return Err(DomainError::validation(format!(
                    "Half-inning ended with {} outs but {} were recorded",
                    data.final_outs, self.outs
                )));
            }
            return self.turn_over();
        };

        if (data.inning, data.was_top_half, data.final_outs)
            != (closed.inning, closed.was_top_half, closed.final_outs)
        {
            return Err(DomainError::validation(format!(
                "Half-inning end for inning {} ({}) with {} outs does not match the \
                 third out in inning {} ({})",
                data.inning,
                half_name(data.was_top_half),
                data.final_outs,
                closed.inning,
                half_name(closed.was_top_half)
            )));
        }
        self.closed_half = None;
        Ok(())
    }

    /// Confirms the inning a preceding `HalfInningEnded` already moved to.
    fn apply_inning_advanced(&mut self, data: &InningAdvancedData) -> Result<(), DomainError> {
        if self.closed_half.is_some() {
            return Err(DomainError::validation(
                "Inning advance arrived before the half-inning end",
            ));
        }
        self.require_half(data.new_inning, data.is_top_half, "Inning advance")
    }
}

fn half_name(is_top_half: bool) -> &'static str {
    if is_top_half { "top" } else { "bottom" }
}
