//! Game aggregate implementation.

use common::{AggregateId, GameId};
use serde::{Deserialize, Serialize};

use crate::aggregate::{
    Aggregate, EventLog, ReplayPolicy, SnapshotCapable, open_stream, record,
};
use crate::clock::SharedClock;
use crate::config::GameRules;
use crate::error::DomainError;
use crate::event::{EventEnvelope, SoftballEvent};

use super::events::{GameCompletedData, InningAdvancedData, OutRecordedData, ScoreUpdatedData};
use super::{EndingType, GameScore, GameStatus, TeamSide};

/// Outs that end a half-inning.
const OUTS_PER_HALF_INNING: u8 = 3;

/// Game aggregate root.
///
/// Owns the score, lifecycle status and the inning/half/outs pointer.
/// Cross-aggregate coordination (turning an inning-state out or run into a
/// game out or score update) happens above this type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    id: GameId,
    home_team_name: String,
    away_team_name: String,
    #[serde(default)]
    rules: GameRules,
    status: GameStatus,
    score: GameScore,
    current_inning: u32,
    is_top_half: bool,
    outs: u8,
    #[serde(default)]
    ending_type: Option<EndingType>,
    /// Set by the third out, which already moved the pointer; the
    /// `InningAdvanced` that follows confirms it.
    #[serde(default)]
    third_out_recorded: bool,
    #[serde(skip)]
    log: EventLog,
}

impl Aggregate for Game {
    fn aggregate_type() -> &'static str {
        "Game"
    }

    fn replay_policy() -> ReplayPolicy {
        ReplayPolicy::Strict
    }

    fn aggregate_id(&self) -> AggregateId {
        self.id.into()
    }

    fn game_id(&self) -> GameId {
        self.id
    }

    fn event_log(&self) -> &EventLog {
        &self.log
    }

    fn event_log_mut(&mut self) -> &mut EventLog {
        &mut self.log
    }

    fn from_creation_event(envelope: &EventEnvelope) -> Result<Self, DomainError> {
        let SoftballEvent::GameCreated(data) = envelope.event() else {
            return Err(DomainError::InvalidEventStream(format!(
                "first Game event must be GameCreated, got {}",
                envelope.event_type()
            )));
        };
        if envelope.aggregate_id() != AggregateId::from(envelope.game_id()) {
            return Err(DomainError::InvalidEventStream(
                "GameCreated must be recorded on the game's own stream".to_string(),
            ));
        }

        Ok(Self {
            id: envelope.game_id(),
            home_team_name: data.home_team_name.clone(),
            away_team_name: data.away_team_name.clone(),
            rules: data.rules,
            status: GameStatus::NotStarted,
            score: GameScore::default(),
            current_inning: 1,
            is_top_half: true,
            outs: 0,
            ending_type: None,
            third_out_recorded: false,
            log: EventLog::default(),
        })
    }

    fn apply(&mut self, event: &SoftballEvent) -> Result<(), DomainError> {
        if self.third_out_recorded && !matches!(event, SoftballEvent::InningAdvanced(_)) {
            return Err(DomainError::InvalidEventStream(format!(
                "expected InningAdvanced after the third out, got {}",
                crate::aggregate::DomainEvent::event_type(event)
            )));
        }

        match event {
            SoftballEvent::GameStarted(_) => {
                self.require_not_started("start game")?;
                self.status = GameStatus::InProgress;
            }
            SoftballEvent::ScoreUpdated(data) => self.apply_score_updated(data)?,
            SoftballEvent::InningAdvanced(data) => self.apply_inning_advanced(data)?,
            SoftballEvent::OutRecorded(data) => self.apply_out_recorded(data)?,
            SoftballEvent::GameCompleted(data) => self.apply_game_completed(data)?,
            SoftballEvent::GameCreated(_)
            | SoftballEvent::TeamLineupCreated(_)
            | SoftballEvent::PlayerAddedToLineup(_)
            | SoftballEvent::PlayerSubstitutedIntoGame(_)
            | SoftballEvent::FieldPositionChanged(_)
            | SoftballEvent::InningStateCreated(_)
            | SoftballEvent::AtBatCompleted(_)
            | SoftballEvent::RunnerAdvanced(_)
            | SoftballEvent::RunScored(_)
            | SoftballEvent::CurrentBatterChanged(_)
            | SoftballEvent::HalfInningEnded(_) => {
                return Err(DomainError::UnsupportedEvent {
                    aggregate: Self::aggregate_type(),
                    event_type: crate::aggregate::DomainEvent::event_type(event).to_string(),
                });
            }
        }
        Ok(())
    }
}

impl SnapshotCapable for Game {
    fn snapshot_interval() -> i64 {
        50
    }

    fn check_consistency(&self) -> Result<(), DomainError> {
        SoftballEvent::game_created(
            self.home_team_name.as_str(),
            self.away_team_name.as_str(),
            self.rules,
        )
        .map_err(|err| DomainError::InvalidSnapshot(err.to_string()))?;

        if self.current_inning == 0 {
            return Err(DomainError::InvalidSnapshot("inning must be at least 1".to_string()));
        }
        if self.outs >= OUTS_PER_HALF_INNING {
            return Err(DomainError::InvalidSnapshot(format!(
                "{} outs is not a resting state",
                self.outs
            )));
        }
        if self.status.is_terminal() != self.ending_type.is_some() {
            return Err(DomainError::InvalidSnapshot(
                "only completed games carry an ending type".to_string(),
            ));
        }
        if self.third_out_recorded && (self.outs != 0 || !self.status.is_in_progress()) {
            return Err(DomainError::InvalidSnapshot(
                "a pending inning change requires a game in progress with no outs".to_string(),
            ));
        }
        Ok(())
    }
}

// Factories
impl Game {
    /// Creates a game under the default rules.
    pub fn create_new(
        id: GameId,
        home_team_name: impl Into<String>,
        away_team_name: impl Into<String>,
    ) -> Result<Self, DomainError> {
        Self::create_with_rules(id, home_team_name, away_team_name, GameRules::default())
    }

    /// Creates a game under explicit rules.
    pub fn create_with_rules(
        id: GameId,
        home_team_name: impl Into<String>,
        away_team_name: impl Into<String>,
        rules: GameRules,
    ) -> Result<Self, DomainError> {
        Self::create_with_clock(SharedClock::default(), id, home_team_name, away_team_name, rules)
    }

    /// Creates a game whose events are stamped by `clock`.
    pub fn create_with_clock(
        clock: SharedClock,
        id: GameId,
        home_team_name: impl Into<String>,
        away_team_name: impl Into<String>,
        rules: GameRules,
    ) -> Result<Self, DomainError> {
        let event = SoftballEvent::game_created(home_team_name, away_team_name, rules)?;
        open_stream(clock, id, id.into(), event)
    }
}

// Query methods
impl Game {
    pub fn id(&self) -> GameId {
        self.id
    }

    pub fn home_team_name(&self) -> &str {
        &self.home_team_name
    }

    pub fn away_team_name(&self) -> &str {
        &self.away_team_name
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn score(&self) -> GameScore {
        self.score
    }

    pub fn current_inning(&self) -> u32 {
        self.current_inning
    }

    pub fn is_top_half(&self) -> bool {
        self.is_top_half
    }

    pub fn outs(&self) -> u8 {
        self.outs
    }

    /// Set once the game is completed.
    pub fn ending_type(&self) -> Option<EndingType> {
        self.ending_type
    }

    /// The team currently at bat.
    pub fn batting_side(&self) -> TeamSide {
        TeamSide::batting(self.is_top_half)
    }

    /// True once the run differential meets a mercy threshold for the current inning.
    pub fn is_mercy_rule_triggered(&self) -> bool {
        self.rules
            .is_mercy(self.current_inning, self.score.differential())
    }

    /// True once regulation play is over: past the last regulation inning, or
    /// in it with the pointer on the top half.
    pub fn is_regulation_complete(&self) -> bool {
        let last = self.rules.regulation_innings;
        self.current_inning > last || (self.current_inning == last && self.is_top_half)
    }

    /// The side ahead on runs, or `None` while tied.
    pub fn leading_side(&self) -> Option<TeamSide> {
        self.score.leader()
    }

    /// True when the home team leads in the bottom of the last regulation inning or later.
    pub fn is_walk_off_scenario(&self) -> bool {
        !self.is_top_half
            && self.current_inning >= self.rules.regulation_innings
            && self.leading_side() == Some(TeamSide::Home)
    }
}

// Command methods
impl Game {
    /// Starts play.
    pub fn start_game(&mut self) -> Result<(), DomainError> {
        self.require_not_started("start game")?;
        record(self, SoftballEvent::game_started())
    }

    /// Ends the game, recording the final score and inning.
    pub fn complete_game(&mut self, ending_type: EndingType) -> Result<(), DomainError> {
        self.require_in_progress("complete game")?;
        let event = SoftballEvent::game_completed(ending_type, self.score, self.current_inning)?;
        record(self, event)?;

        tracing::info!(
            game_id = %self.id,
            %ending_type,
            score = %self.score,
            inning = self.current_inning,
            "game completed"
        );
        Ok(())
    }

    /// Adds runs for the home team.
    pub fn add_home_runs(&mut self, runs: u32) -> Result<(), DomainError> {
        self.add_runs(TeamSide::Home, runs)
    }

    /// Adds runs for the away team.
    pub fn add_away_runs(&mut self, runs: u32) -> Result<(), DomainError> {
        self.add_runs(TeamSide::Away, runs)
    }

    /// Adds runs for either side.
    pub fn add_runs(&mut self, team: TeamSide, runs: u32) -> Result<(), DomainError> {
        self.require_in_progress("add runs")?;
        if runs == 0 {
            return Err(DomainError::validation("Runs must be a positive integer"));
        }
        let new_score = self
            .score
            .with_runs(team, runs)
            .ok_or_else(|| DomainError::validation("Score is too large to record"))?;

        let event = SoftballEvent::score_updated(team, runs, new_score)?;
        record(self, event)
    }

    /// Moves to the next half-inning and clears the outs.
    ///
    /// Top goes to bottom of the same inning; bottom goes to the top of the next.
    pub fn advance_inning(&mut self) -> Result<(), DomainError> {
        self.require_in_progress("advance inning")?;
        let (new_inning, is_top_half) = self.next_half()?;
        let event = SoftballEvent::inning_advanced(new_inning, is_top_half)?;
        record(self, event)
    }

    /// Records one out.
    ///
    /// The third out moves the pointer to the next half-inning as it is
    /// applied, so outs never rest at three; the `InningAdvanced` recorded
    /// right after it names the half now being played.
    pub fn add_out(&mut self) -> Result<(), DomainError> {
        self.require_in_progress("add out")?;
        let outs = self.outs + 1;
        if outs >= OUTS_PER_HALF_INNING {
            // an inning overflow must fail before the out is recorded
            self.next_half()?;
        }
        record(self, SoftballEvent::out_recorded(outs)?)?;

        if self.third_out_recorded {
            let event = SoftballEvent::inning_advanced(self.current_inning, self.is_top_half)?;
            record(self, event)?;
        }
        Ok(())
    }
}

// Apply event helpers
impl Game {
    fn require_not_started(&self, action: &'static str) -> Result<(), DomainError> {
        if !self.status.can_start() {
            return Err(DomainError::InvalidGameStatus {
                action,
                status: self.status,
            });
        }
        Ok(())
    }

    fn require_in_progress(&self, action: &'static str) -> Result<(), DomainError> {
        if !self.status.is_in_progress() {
            return Err(DomainError::InvalidGameStatus {
                action,
                status: self.status,
            });
        }
        Ok(())
    }

    /// The half after the current one: top goes to bottom, bottom to the next top.
    fn next_half(&self) -> Result<(u32, bool), DomainError> {
        if self.is_top_half {
            return Ok((self.current_inning, false));
        }
        let next = self
            .current_inning
            .checked_add(1)
            .ok_or_else(|| DomainError::validation("Inning counter overflow"))?;
        Ok((next, true))
    }

    fn apply_score_updated(&mut self, data: &ScoreUpdatedData) -> Result<(), DomainError> {
        self.require_in_progress("add runs")?;
        let expected = self.score.with_runs(data.team, data.runs_added);
        if expected != Some(data.new_score) {
            return Err(DomainError::InvalidEventStream(format!(
                "ScoreUpdated to {} does not follow from {}",
                data.new_score, self.score
            )));
        }
        self.score = data.new_score;
        Ok(())
    }

    fn apply_out_recorded(&mut self, data: &OutRecordedData) -> Result<(), DomainError> {
        self.require_in_progress("record an out")?;
        if data.outs != self.outs + 1 {
            return Err(DomainError::InvalidEventStream(format!(
                "OutRecorded with {} outs does not follow {} outs",
                data.outs, self.outs
            )));
        }

        if data.outs < OUTS_PER_HALF_INNING {
            self.outs = data.outs;
            return Ok(());
        }
        (self.current_inning, self.is_top_half) = self.next_half()?;
        self.outs = 0;
        self.third_out_recorded = true;
        Ok(())
    }

    fn apply_inning_advanced(&mut self, data: &InningAdvancedData) -> Result<(), DomainError> {
        self.require_in_progress("advance inning")?;
        let expected = if self.third_out_recorded {
            (self.current_inning, self.is_top_half)
        } else {
            self.next_half()?
        };
        if (data.new_inning, data.is_top_half) != expected {
            return Err(DomainError::InvalidEventStream(format!(
                "InningAdvanced to inning {} ({}) does not follow inning {} ({})",
                data.new_inning,
                half_name(data.is_top_half),
                self.current_inning,
                half_name(self.is_top_half)
            )));
        }

        (self.current_inning, self.is_top_half) = expected;
        self.outs = 0;
        self.third_out_recorded = false;
        Ok(())
    }

    fn apply_game_completed(&mut self, data: &GameCompletedData) -> Result<(), DomainError> {
        self.require_in_progress("complete game")?;
        if data.final_score != self.score || data.final_inning != self.current_inning {
            return Err(DomainError::InvalidEventStream(format!(
                "GameCompleted at {} in inning {} does not match {} in inning {}",
                data.final_score, data.final_inning, self.score, self.current_inning
            )));
        }
        self.status = GameStatus::Completed;
        self.ending_type = Some(data.ending_type);
        Ok(())
    }
}

fn half_name(is_top_half: bool) -> &'static str {
    if is_top_half { "top" } else { "bottom" }
}
