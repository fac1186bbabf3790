//! TeamLineup aggregate implementation.

use std::collections::BTreeMap;

use common::{AggregateId, GameId, JerseyNumber, PlayerId, TeamLineupId};
use serde::{Deserialize, Serialize};

use crate::aggregate::{
    Aggregate, DomainEvent, EventLog, ReplayPolicy, SnapshotCapable, open_stream, record,
};
use crate::batting::validate_batting_slot;
use crate::clock::SharedClock;
use crate::error::DomainError;
use crate::event::{EventEnvelope, SoftballEvent};

use super::events::{
    FieldPositionChangedData, PlayerAddedToLineupData, PlayerSubstitutedIntoGameData,
};
use super::{BattingSlot, FieldPosition, LineupEntry, PlayerParticipation};

/// A substitution request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub batting_slot: u8,
    pub outgoing_player_id: PlayerId,
    pub incoming_player_id: PlayerId,
    pub jersey_number: JerseyNumber,
    pub player_name: String,
    pub field_position: FieldPosition,
    pub inning: u32,
    pub is_reentry: bool,
}

impl Substitution {
    /// A regular substitution of a player who has not appeared in the game.
    pub fn new(
        batting_slot: u8,
        outgoing_player_id: PlayerId,
        incoming_player_id: PlayerId,
        jersey_number: JerseyNumber,
        player_name: impl Into<String>,
        field_position: FieldPosition,
        inning: u32,
    ) -> Self {
        Self {
            batting_slot,
            outgoing_player_id,
            incoming_player_id,
            jersey_number,
            player_name: player_name.into(),
            field_position,
            inning,
            is_reentry: false,
        }
    }

    /// Marks the substitution as a starter returning to the game.
    pub fn as_reentry(mut self) -> Self {
        self.is_reentry = true;
        self
    }
}

/// TeamLineup aggregate root.
///
/// One team's batting order, defensive assignments and the participation
/// history that drives the re-entry rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamLineup {
    id: TeamLineupId,
    game_id: GameId,
    team_name: String,
    batting_slots: BTreeMap<u8, BattingSlot>,
    /// EXTRA_PLAYER is never a key here.
    field_positions: BTreeMap<FieldPosition, PlayerId>,
    players: BTreeMap<PlayerId, PlayerParticipation>,
    #[serde(skip)]
    log: EventLog,
}

impl Aggregate for TeamLineup {
    fn aggregate_type() -> &'static str {
        "TeamLineup"
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
        let SoftballEvent::TeamLineupCreated(data) = envelope.event() else {
            return Err(DomainError::InvalidEventStream(format!(
                "first TeamLineup event must be TeamLineupCreated, got {}",
                envelope.event_type()
            )));
        };

        Ok(Self {
            id: TeamLineupId::from_uuid(envelope.aggregate_id().as_uuid()),
            game_id: envelope.game_id(),
            team_name: data.team_name.clone(),
            batting_slots: BTreeMap::new(),
            field_positions: BTreeMap::new(),
            players: BTreeMap::new(),
            log: EventLog::default(),
        })
    }

    fn apply(&mut self, event: &SoftballEvent) -> Result<(), DomainError> {
        match event {
            SoftballEvent::PlayerAddedToLineup(data) => {
                self.check_add(data)?;
                self.apply_player_added(data);
            }
            SoftballEvent::PlayerSubstitutedIntoGame(data) => {
                self.check_substitution(data)?;
                self.apply_substitution(data);
            }
            SoftballEvent::FieldPositionChanged(data) => {
                self.check_position_change(data)?;
                self.apply_position_change(data);
            }
            SoftballEvent::GameCreated(_)
            | SoftballEvent::GameStarted(_)
            | SoftballEvent::ScoreUpdated(_)
            | SoftballEvent::InningAdvanced(_)
            | SoftballEvent::OutRecorded(_)
            | SoftballEvent::GameCompleted(_)
            | SoftballEvent::TeamLineupCreated(_)
            | SoftballEvent::InningStateCreated(_)
            | SoftballEvent::AtBatCompleted(_)
            | SoftballEvent::RunnerAdvanced(_)
            | SoftballEvent::RunScored(_)
            | SoftballEvent::CurrentBatterChanged(_)
            | SoftballEvent::HalfInningEnded(_) => {
                return Err(DomainError::UnsupportedEvent {
                    aggregate: Self::aggregate_type(),
                    event_type: event.event_type().to_string(),
                });
            }
        }
        Ok(())
    }
}

impl SnapshotCapable for TeamLineup {
    fn check_consistency(&self) -> Result<(), DomainError> {
        let invalid = |message: String| Err(DomainError::InvalidSnapshot(message));

        SoftballEvent::team_lineup_created(self.team_name.as_str())
            .map_err(|err| DomainError::InvalidSnapshot(err.to_string()))?;

        for (&slot, entry) in &self.batting_slots {
            validate_batting_slot(slot)
                .map_err(|err| DomainError::InvalidSnapshot(err.to_string()))?;
            let holder = self.players.get(&entry.current_player);
            if holder.and_then(|p| p.current_batting_slot) != Some(slot) {
                return invalid(format!("slot {slot} holder has no matching participation"));
            }
            if entry.history.last() != Some(&entry.current_player) {
                return invalid(format!("slot {slot} history does not end with its holder"));
            }
        }

        for (&position, player_id) in &self.field_positions {
            if position.is_extra_player() {
                return invalid("EXTRA_PLAYER cannot be an exclusive position".to_string());
            }
            let holder = self.players.get(player_id);
            if holder.and_then(|p| p.current_position) != Some(position) {
                return invalid(format!("{position} holder has no matching participation"));
            }
        }

        let mut jerseys = Vec::new();
        for (player_id, player) in &self.players {
            if player.player_id != *player_id {
                return invalid(format!("participation for {player_id} is keyed wrongly"));
            }
            let Some(slot) = player.current_batting_slot else {
                if player.current_position.is_some() {
                    return invalid(format!("benched player {player_id} holds a position"));
                }
                continue;
            };
            if self.player_at_slot(slot) != Some(*player_id) {
                return invalid(format!("player {player_id} claims slot {slot}"));
            }
            if jerseys.contains(&player.jersey_number) {
                return invalid(format!("jersey {} is worn twice", player.jersey_number));
            }
            jerseys.push(player.jersey_number);
        }
        Ok(())
    }
}

// Factories
impl TeamLineup {
    /// Creates an empty lineup for one team in a game.
    pub fn create_new(
        id: TeamLineupId,
        game_id: GameId,
        team_name: impl Into<String>,
    ) -> Result<Self, DomainError> {
        Self::create_with_clock(SharedClock::default(), id, game_id, team_name)
    }

    /// Creates a lineup whose events are stamped by `clock`.
    pub fn create_with_clock(
        clock: SharedClock,
        id: TeamLineupId,
        game_id: GameId,
        team_name: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let event = SoftballEvent::team_lineup_created(team_name)?;
        open_stream(clock, game_id, id.into(), event)
    }
}

// Query methods
impl TeamLineup {
    pub fn id(&self) -> TeamLineupId {
        self.id
    }

    pub fn team_name(&self) -> &str {
        &self.team_name
    }

    /// Current occupants of every filled slot, in batting order.
    pub fn get_active_lineup(&self) -> Vec<LineupEntry> {
        self.batting_slots
            .iter()
            .filter_map(|(&slot, entry)| {
                let player = self.players.get(&entry.current_player)?;
                Some(LineupEntry {
                    batting_slot: slot,
                    player_id: player.player_id,
                    jersey_number: player.jersey_number,
                    player_name: player.player_name.clone(),
                    field_position: player.current_position,
                })
            })
            .collect()
    }

    /// Exclusive defensive assignments. Extra players are not listed.
    pub fn get_fielding_positions(&self) -> &BTreeMap<FieldPosition, PlayerId> {
        &self.field_positions
    }

    pub fn get_player_info(&self, player_id: PlayerId) -> Option<&PlayerParticipation> {
        self.players.get(&player_id)
    }

    /// Returns the player currently batting in `slot`.
    pub fn player_at_slot(&self, slot: u8) -> Option<PlayerId> {
        self.batting_slots.get(&slot).map(|entry| entry.current_player)
    }

    /// Returns a slot with its full occupancy history.
    pub fn batting_slot(&self, slot: u8) -> Option<&BattingSlot> {
        self.batting_slots.get(&slot)
    }

    pub fn is_player_eligible_for_reentry(&self, player_id: PlayerId) -> bool {
        self.players
            .get(&player_id)
            .is_some_and(PlayerParticipation::can_reenter)
    }

    /// All nine required positions are covered and someone is batting.
    pub fn is_lineup_valid(&self) -> bool {
        !self.batting_slots.is_empty()
            && FieldPosition::REQUIRED
                .iter()
                .all(|position| self.field_positions.contains_key(position))
    }
}

// Command methods
impl TeamLineup {
    /// Adds a starter to the lineup.
    pub fn add_player(
        &mut self,
        player_id: PlayerId,
        jersey_number: JerseyNumber,
        player_name: impl Into<String>,
        batting_slot: u8,
        field_position: FieldPosition,
    ) -> Result<(), DomainError> {
        let event = SoftballEvent::player_added_to_lineup(
            player_id,
            jersey_number,
            player_name,
            batting_slot,
            field_position,
        )?;
        if let SoftballEvent::PlayerAddedToLineup(data) = &event {
            self.check_add(data)?;
        }
        record(self, event)
    }

    /// Replaces the player in a batting slot.
    pub fn substitute_player(&mut self, substitution: Substitution) -> Result<(), DomainError> {
        let data = PlayerSubstitutedIntoGameData {
            batting_slot: substitution.batting_slot,
            outgoing_player_id: substitution.outgoing_player_id,
            incoming_player_id: substitution.incoming_player_id,
            jersey_number: substitution.jersey_number,
            player_name: substitution.player_name.trim().to_string(),
            field_position: substitution.field_position,
            inning: substitution.inning,
            is_reentry: substitution.is_reentry,
        };
        data.validate()?;
        self.check_substitution(&data)?;
        record(self, SoftballEvent::player_substituted_into_game(data)?)?;

        tracing::info!(
            lineup_id = %self.id,
            slot = substitution.batting_slot,
            incoming = %substitution.incoming_player_id,
            outgoing = %substitution.outgoing_player_id,
            reentry = substitution.is_reentry,
            "player substituted"
        );
        Ok(())
    }

    /// Moves an active player to another defensive position.
    pub fn change_position(
        &mut self,
        player_id: PlayerId,
        new_position: FieldPosition,
        inning: u32,
    ) -> Result<(), DomainError> {
        let current = self
            .players
            .get(&player_id)
            .filter(|player| player.is_active())
            .and_then(|player| player.current_position)
            .ok_or_else(|| {
                DomainError::validation(format!("Player {player_id} is not active in the lineup"))
            })?;

        let event =
            SoftballEvent::field_position_changed(player_id, current, new_position, inning)?;
        if let SoftballEvent::FieldPositionChanged(data) = &event {
            self.check_position_change(data)?;
        }
        record(self, event)
    }
}

// Rule checks, shared by commands and replay
impl TeamLineup {
    fn active_players(&self) -> impl Iterator<Item = &PlayerParticipation> {
        self.players.values().filter(|player| player.is_active())
    }

    /// Jersey must not be worn by an active player other than those in `except`.
    fn check_jersey_free(
        &self,
        jersey_number: JerseyNumber,
        except: &[PlayerId],
    ) -> Result<(), DomainError> {
        let taken = self.active_players().any(|player| {
            player.jersey_number == jersey_number && !except.contains(&player.player_id)
        });
        if taken {
            return Err(DomainError::JerseyInUse(jersey_number));
        }
        Ok(())
    }

    /// Position must be open, or held by a player in `except`.
    fn check_position_free(
        &self,
        position: FieldPosition,
        except: &[PlayerId],
    ) -> Result<(), DomainError> {
        if position.is_extra_player() {
            return Ok(());
        }
        match self.field_positions.get(&position) {
            Some(holder) if !except.contains(holder) => {
                Err(DomainError::PositionOccupied(position))
            }
            _ => Ok(()),
        }
    }

    fn check_add(&self, data: &PlayerAddedToLineupData) -> Result<(), DomainError> {
        if self.batting_slots.contains_key(&data.batting_slot) {
            return Err(DomainError::validation(format!(
                "Batting slot {} is already occupied",
                data.batting_slot
            )));
        }
        if self.players.contains_key(&data.player_id) {
            return Err(DomainError::validation(format!(
                "Player {} is already in the lineup",
                data.player_id
            )));
        }
        self.check_jersey_free(data.jersey_number, &[])?;
        self.check_position_free(data.field_position, &[])
    }

    fn check_substitution(&self, data: &PlayerSubstitutedIntoGameData) -> Result<(), DomainError> {
        let outgoing = data.outgoing_player_id;
        let incoming = data.incoming_player_id;

        if self.player_at_slot(data.batting_slot) != Some(outgoing) {
            return Err(DomainError::validation(format!(
                "Player {outgoing} is not batting in slot {}",
                data.batting_slot
            )));
        }

        let history = self.players.get(&incoming);
        if history.is_some_and(PlayerParticipation::is_active) {
            return Err(DomainError::validation(format!(
                "Player {incoming} is already active in the lineup"
            )));
        }

        if data.is_reentry {
            check_reentry(history, data)?;
        } else if let Some(previous) = history {
            let message = if previous.is_starter {
                format!(
                    "Starter {} must return using their re-entry",
                    previous.player_name
                )
            } else {
                format!(
                    "Player {} is not a starter and cannot re-enter the game",
                    previous.player_name
                )
            };
            return Err(DomainError::ReentryNotAllowed(message));
        }

        self.check_jersey_free(data.jersey_number, &[outgoing, incoming])?;
        self.check_position_free(data.field_position, &[outgoing])
    }

    fn check_position_change(&self, data: &FieldPositionChangedData) -> Result<(), DomainError> {
        let player = self
            .players
            .get(&data.player_id)
            .filter(|player| player.is_active())
            .ok_or_else(|| {
                DomainError::validation(format!(
                    "Player {} is not active in the lineup",
                    data.player_id
                ))
            })?;
        if player.current_position != Some(data.from_position) {
            return Err(DomainError::validation(format!(
                "Player {} is not playing {}",
                data.player_id, data.from_position
            )));
        }
        self.check_position_free(data.to_position, &[])
    }
}

fn check_reentry(
    history: Option<&PlayerParticipation>,
    data: &PlayerSubstitutedIntoGameData,
) -> Result<(), DomainError> {
    let Some(player) = history else {
        return Err(DomainError::ReentryNotAllowed(format!(
            "Player {} has never played in this game",
            data.incoming_player_id
        )));
    };
    if !player.is_starter {
        return Err(DomainError::ReentryNotAllowed(format!(
            "Only starters may re-enter; {} is not a starter",
            player.player_name
        )));
    }
    if !player.has_been_substituted {
        return Err(DomainError::ReentryNotAllowed(format!(
            "{} has not been substituted out",
            player.player_name
        )));
    }
    if player.has_used_reentry {
        return Err(DomainError::ReentryNotAllowed(
            "Player has already used their re-entry privilege".to_string(),
        ));
    }
    if player.starting_batting_slot != Some(data.batting_slot) {
        return Err(DomainError::ReentryNotAllowed(format!(
            "{} must re-enter in their original batting slot",
            player.player_name
        )));
    }
    Ok(())
}

// Apply event helpers
impl TeamLineup {
    fn apply_player_added(&mut self, data: &PlayerAddedToLineupData) {
        self.batting_slots.insert(
            data.batting_slot,
            BattingSlot {
                current_player: data.player_id,
                history: vec![data.player_id],
            },
        );
        if !data.field_position.is_extra_player() {
            self.field_positions.insert(data.field_position, data.player_id);
        }
        self.players.insert(
            data.player_id,
            PlayerParticipation {
                player_id: data.player_id,
                jersey_number: data.jersey_number,
                player_name: data.player_name.clone(),
                is_starter: true,
                starting_batting_slot: Some(data.batting_slot),
                current_position: Some(data.field_position),
                current_batting_slot: Some(data.batting_slot),
                has_been_substituted: false,
                has_used_reentry: false,
            },
        );
    }

    fn apply_substitution(&mut self, data: &PlayerSubstitutedIntoGameData) {
        if let Some(outgoing) = self.players.get_mut(&data.outgoing_player_id) {
            outgoing.current_position = None;
            outgoing.current_batting_slot = None;
            outgoing.has_been_substituted = true;
        }
        self.field_positions
            .retain(|_, holder| *holder != data.outgoing_player_id);

        let incoming = self
            .players
            .entry(data.incoming_player_id)
            .or_insert_with(|| PlayerParticipation {
                player_id: data.incoming_player_id,
                jersey_number: data.jersey_number,
                player_name: data.player_name.clone(),
                is_starter: false,
                starting_batting_slot: None,
                current_position: None,
                current_batting_slot: None,
                has_been_substituted: false,
                has_used_reentry: false,
            });
        incoming.jersey_number = data.jersey_number;
        incoming.player_name = data.player_name.clone();
        incoming.current_position = Some(data.field_position);
        incoming.current_batting_slot = Some(data.batting_slot);
        if data.is_reentry {
            incoming.has_used_reentry = true;
        }

        if !data.field_position.is_extra_player() {
            self.field_positions
                .insert(data.field_position, data.incoming_player_id);
        }
        if let Some(slot) = self.batting_slots.get_mut(&data.batting_slot) {
            slot.current_player = data.incoming_player_id;
            slot.history.push(data.incoming_player_id);
        }
    }

    fn apply_position_change(&mut self, data: &FieldPositionChangedData) {
        self.field_positions.retain(|_, holder| *holder != data.player_id);
        if !data.to_position.is_extra_player() {
            self.field_positions.insert(data.to_position, data.player_id);
        }
        if let Some(player) = self.players.get_mut(&data.player_id) {
            player.current_position = Some(data.to_position);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SteppingClock;

    fn jersey(n: u8) -> JerseyNumber {
        JerseyNumber::new(n).unwrap()
    }

    fn new_lineup() -> TeamLineup {
        TeamLineup::create_new(TeamLineupId::new(), GameId::new(), "Hawks").unwrap()
    }

    /// A lineup with nine starters covering every required position.
    fn full_lineup() -> (TeamLineup, Vec<PlayerId>) {
        let mut lineup = new_lineup();
        let mut ids = Vec::new();
        for (index, position) in FieldPosition::REQUIRED.iter().enumerate() {
            let id = PlayerId::new();
            let slot = index as u8 + 1;
            lineup
                .add_player(id, jersey(slot * 2), format!("Player {slot}"), slot, *position)
                .unwrap();
            ids.push(id);
        }
        (lineup, ids)
    }

    #[test]
    fn test_create_lineup() {
        let lineup = new_lineup();
        assert_eq!(lineup.team_name(), "Hawks");
        assert_eq!(lineup.version().as_i64(), 1);
        assert!(lineup.get_active_lineup().is_empty());
        assert!(!lineup.is_lineup_valid());
    }

    #[test]
    fn test_create_rejects_bad_team_name() {
        assert!(TeamLineup::create_new(TeamLineupId::new(), GameId::new(), "").is_err());
        assert!(TeamLineup::create_new(TeamLineupId::new(), GameId::new(), "a".repeat(51)).is_err());
    }

    #[test]
    fn test_full_lineup_is_valid() {
        let (lineup, ids) = full_lineup();
        assert!(lineup.is_lineup_valid());

        let active = lineup.get_active_lineup();
        assert_eq!(active.len(), 9);
        assert_eq!(active[0].batting_slot, 1);
        assert_eq!(active[0].player_id, ids[0]);
        assert_eq!(active[8].batting_slot, 9);
        assert_eq!(lineup.version().as_i64(), 10);
    }

    #[test]
    fn test_add_player_rejects_conflicts() {
        let mut lineup = new_lineup();
        let first = PlayerId::new();
        lineup
            .add_player(first, jersey(7), "Ann", 1, FieldPosition::Pitcher)
            .unwrap();

        // slot taken
        assert!(
            lineup
                .add_player(PlayerId::new(), jersey(8), "Bea", 1, FieldPosition::Catcher)
                .is_err()
        );
        // jersey taken
        assert!(matches!(
            lineup.add_player(PlayerId::new(), jersey(7), "Bea", 2, FieldPosition::Catcher),
            Err(DomainError::JerseyInUse(_))
        ));
        // position taken
        assert!(matches!(
            lineup.add_player(PlayerId::new(), jersey(8), "Bea", 2, FieldPosition::Pitcher),
            Err(DomainError::PositionOccupied(FieldPosition::Pitcher))
        ));
        // already rostered
        assert!(
            lineup
                .add_player(first, jersey(9), "Ann", 3, FieldPosition::Catcher)
                .is_err()
        );
        // slot out of range
        assert!(matches!(
            lineup.add_player(PlayerId::new(), jersey(10), "Cal", 21, FieldPosition::Catcher),
            Err(DomainError::InvalidBattingSlot(21))
        ));

        assert_eq!(lineup.uncommitted_events().len(), 2);
    }

    #[test]
    fn test_extra_players_share_position() {
        let mut lineup = new_lineup();
        lineup
            .add_player(PlayerId::new(), jersey(1), "Ann", 1, FieldPosition::ExtraPlayer)
            .unwrap();
        lineup
            .add_player(PlayerId::new(), jersey(2), "Bea", 2, FieldPosition::ExtraPlayer)
            .unwrap();

        assert!(lineup.get_fielding_positions().is_empty());
        assert_eq!(lineup.get_active_lineup().len(), 2);
    }

    #[test]
    fn test_substitution_updates_history() {
        let (mut lineup, ids) = full_lineup();
        let sub = PlayerId::new();
        lineup
            .substitute_player(Substitution::new(
                1,
                ids[0],
                sub,
                jersey(50),
                "Sub",
                FieldPosition::Pitcher,
                3,
            ))
            .unwrap();

        assert_eq!(lineup.player_at_slot(1), Some(sub));
        assert_eq!(lineup.get_fielding_positions()[&FieldPosition::Pitcher], sub);
        assert_eq!(lineup.batting_slot(1).unwrap().history, vec![ids[0], sub]);

        let starter = lineup.get_player_info(ids[0]).unwrap();
        assert!(starter.has_been_substituted);
        assert!(!starter.is_active());
        assert!(lineup.is_player_eligible_for_reentry(ids[0]));

        let info = lineup.get_player_info(sub).unwrap();
        assert!(!info.is_starter);
        assert_eq!(info.current_batting_slot, Some(1));
    }

    #[test]
    fn test_substitute_may_take_outgoing_jersey() {
        let (mut lineup, ids) = full_lineup();
        let result = lineup.substitute_player(Substitution::new(
            1,
            ids[0],
            PlayerId::new(),
            jersey(2),
            "Sub",
            FieldPosition::Pitcher,
            3,
        ));
        assert!(result.is_ok());
    }

    #[test]
    fn test_substitution_rejects_active_jersey_and_position() {
        let (mut lineup, ids) = full_lineup();
        let result = lineup.substitute_player(Substitution::new(
            1,
            ids[0],
            PlayerId::new(),
            jersey(4),
            "Sub",
            FieldPosition::Pitcher,
            3,
        ));
        assert!(matches!(result, Err(DomainError::JerseyInUse(_))));

        let result = lineup.substitute_player(Substitution::new(
            1,
            ids[0],
            PlayerId::new(),
            jersey(60),
            "Sub",
            FieldPosition::Catcher,
            3,
        ));
        assert!(matches!(
            result,
            Err(DomainError::PositionOccupied(FieldPosition::Catcher))
        ));
    }

    #[test]
    fn test_substitution_requires_slot_holder() {
        let (mut lineup, ids) = full_lineup();
        let result = lineup.substitute_player(Substitution::new(
            2,
            ids[0],
            PlayerId::new(),
            jersey(60),
            "Sub",
            FieldPosition::Pitcher,
            3,
        ));
        assert!(result.is_err());

        let result = lineup.substitute_player(Substitution::new(
            1,
            ids[0],
            ids[1],
            jersey(60),
            "Sub",
            FieldPosition::Pitcher,
            3,
        ));
        assert!(result.is_err());
    }

    #[test]
    fn test_reentry_once() {
        let (mut lineup, ids) = full_lineup();
        let starter = ids[0];
        let sub = PlayerId::new();
        lineup
            .substitute_player(Substitution::new(
                1,
                starter,
                sub,
                jersey(50),
                "Sub",
                FieldPosition::Pitcher,
                3,
            ))
            .unwrap();

        lineup
            .substitute_player(
                Substitution::new(1, sub, starter, jersey(2), "Player 1", FieldPosition::Pitcher, 7)
                    .as_reentry(),
            )
            .unwrap();
        assert!(!lineup.is_player_eligible_for_reentry(starter));
        assert!(lineup.get_player_info(starter).unwrap().has_used_reentry);

        let second_sub = PlayerId::new();
        lineup
            .substitute_player(Substitution::new(
                1,
                starter,
                second_sub,
                jersey(51),
                "Sub 2",
                FieldPosition::Pitcher,
                8,
            ))
            .unwrap();

        let err = lineup
            .substitute_player(
                Substitution::new(1, second_sub, starter, jersey(2), "Player 1", FieldPosition::Pitcher, 9)
                    .as_reentry(),
            )
            .unwrap_err();
        assert_eq!(err.to_string(), "Player has already used their re-entry privilege");
    }

    #[test]
    fn test_reentry_requires_flag_and_original_slot() {
        let (mut lineup, ids) = full_lineup();
        let starter = ids[0];
        let sub = PlayerId::new();
        lineup
            .substitute_player(Substitution::new(
                1,
                starter,
                sub,
                jersey(50),
                "Sub",
                FieldPosition::Pitcher,
                3,
            ))
            .unwrap();

        let without_flag = lineup.substitute_player(Substitution::new(
            1,
            sub,
            starter,
            jersey(2),
            "Player 1",
            FieldPosition::Pitcher,
            5,
        ));
        assert!(matches!(without_flag, Err(DomainError::ReentryNotAllowed(_))));

        let wrong_slot = lineup.substitute_player(
            Substitution::new(2, ids[1], starter, jersey(2), "Player 1", FieldPosition::Catcher, 5)
                .as_reentry(),
        );
        assert!(matches!(wrong_slot, Err(DomainError::ReentryNotAllowed(_))));
    }

    #[test]
    fn test_non_starter_cannot_reenter() {
        let (mut lineup, ids) = full_lineup();
        let sub = PlayerId::new();
        lineup
            .substitute_player(Substitution::new(
                1,
                ids[0],
                sub,
                jersey(50),
                "Sub",
                FieldPosition::Pitcher,
                3,
            ))
            .unwrap();
        lineup
            .substitute_player(Substitution::new(
                1,
                sub,
                PlayerId::new(),
                jersey(51),
                "Sub 2",
                FieldPosition::Pitcher,
                4,
            ))
            .unwrap();

        let slot_holder = lineup.player_at_slot(1).unwrap();
        for substitution in [
            Substitution::new(1, slot_holder, sub, jersey(50), "Sub", FieldPosition::Pitcher, 5),
            Substitution::new(1, slot_holder, sub, jersey(50), "Sub", FieldPosition::Pitcher, 5)
                .as_reentry(),
        ] {
            let result = lineup.substitute_player(substitution);
            assert!(matches!(result, Err(DomainError::ReentryNotAllowed(_))));
        }
        assert!(!lineup.is_player_eligible_for_reentry(sub));
    }

    #[test]
    fn test_reentry_of_unsubstituted_starter_rejected() {
        let (mut lineup, ids) = full_lineup();
        // active starters are rejected before the re-entry rule is consulted
        let result = lineup.substitute_player(
            Substitution::new(1, ids[0], ids[1], jersey(4), "Player 2", FieldPosition::Pitcher, 2)
                .as_reentry(),
        );
        assert!(result.is_err());
        assert!(!lineup.is_player_eligible_for_reentry(ids[1]));
    }

    #[test]
    fn test_change_position() {
        let mut lineup = new_lineup();
        let ann = PlayerId::new();
        let bea = PlayerId::new();
        lineup
            .add_player(ann, jersey(1), "Ann", 1, FieldPosition::Pitcher)
            .unwrap();
        lineup
            .add_player(bea, jersey(2), "Bea", 2, FieldPosition::Catcher)
            .unwrap();

        assert!(matches!(
            lineup.change_position(ann, FieldPosition::Catcher, 2),
            Err(DomainError::PositionOccupied(FieldPosition::Catcher))
        ));
        assert!(lineup.change_position(ann, FieldPosition::Pitcher, 2).is_err());
        assert!(lineup.change_position(PlayerId::new(), FieldPosition::LeftField, 2).is_err());

        lineup.change_position(ann, FieldPosition::LeftField, 2).unwrap();
        let positions = lineup.get_fielding_positions();
        assert_eq!(positions.get(&FieldPosition::LeftField), Some(&ann));
        assert!(!positions.contains_key(&FieldPosition::Pitcher));

        lineup.change_position(bea, FieldPosition::ExtraPlayer, 3).unwrap();
        assert!(!lineup.get_fielding_positions().contains_key(&FieldPosition::Catcher));
        assert_eq!(
            lineup.get_player_info(bea).unwrap().current_position,
            Some(FieldPosition::ExtraPlayer)
        );
    }

    #[test]
    fn test_reconstruct_from_events() {
        let (mut lineup, ids) = full_lineup();
        lineup
            .substitute_player(Substitution::new(
                4,
                ids[3],
                PlayerId::new(),
                jersey(70),
                "Sub",
                FieldPosition::SecondBase,
                5,
            ))
            .unwrap();

        let events = lineup.uncommitted_events().to_vec();
        let rebuilt = TeamLineup::from_events(&events).unwrap();

        assert_eq!(rebuilt.id(), lineup.id());
        assert_eq!(rebuilt.version(), lineup.version());
        assert_eq!(rebuilt.get_active_lineup(), lineup.get_active_lineup());
        assert_eq!(rebuilt.get_fielding_positions(), lineup.get_fielding_positions());
        assert!(rebuilt.uncommitted_events().is_empty());
    }

    #[test]
    fn test_replay_skips_foreign_and_conflicting_events() {
        let clock = SharedClock::new(SteppingClock::from_epoch());
        let game_id = GameId::new();
        let id = TeamLineupId::new();
        let mut lineup =
            TeamLineup::create_with_clock(clock.clone(), id, game_id, "Hawks").unwrap();
        lineup
            .add_player(PlayerId::new(), jersey(1), "Ann", 1, FieldPosition::Pitcher)
            .unwrap();

        let mut events = lineup.uncommitted_events().to_vec();
        events.push(EventEnvelope::new(
            &*clock,
            game_id,
            id,
            SoftballEvent::game_started(),
        ));
        // same slot again: rejected by the apply-time rule check
        events.push(EventEnvelope::new(
            &*clock,
            game_id,
            id,
            SoftballEvent::player_added_to_lineup(
                PlayerId::new(),
                jersey(2),
                "Bea",
                1,
                FieldPosition::Catcher,
            )
            .unwrap(),
        ));

        let rebuilt = TeamLineup::from_events(&events).unwrap();
        assert_eq!(rebuilt.version().as_i64(), 2);
        assert_eq!(rebuilt.get_active_lineup().len(), 1);
    }

    #[test]
    fn test_replay_rejects_foreign_stream() {
        let lineup = new_lineup();
        let other = new_lineup();
        let mut events = lineup.uncommitted_events().to_vec();
        events.extend_from_slice(other.uncommitted_events());

        assert!(matches!(
            TeamLineup::from_events(&events),
            Err(DomainError::InvalidEventStream(_))
        ));
    }

    #[test]
    fn test_snapshot_round_trip() {
        let (mut lineup, ids) = full_lineup();
        lineup
            .substitute_player(Substitution::new(
                1,
                ids[0],
                PlayerId::new(),
                jersey(50),
                "Sub",
                FieldPosition::Pitcher,
                3,
            ))
            .unwrap();
        lineup.mark_events_as_committed();

        let snapshot = lineup.to_snapshot().unwrap();
        assert_eq!(snapshot.aggregate_type, "TeamLineup");

        let restored = TeamLineup::from_snapshot(&snapshot, &[]).unwrap();
        assert_eq!(restored.version(), lineup.version());
        assert_eq!(restored.get_active_lineup(), lineup.get_active_lineup());
        assert!(restored.is_player_eligible_for_reentry(ids[0]));
    }

    #[test]
    fn test_snapshot_rejects_inconsistent_maps() {
        let (lineup, ids) = full_lineup();
        let mut snapshot = lineup.to_snapshot().unwrap();
        snapshot.state["field_positions"]["CATCHER"] = serde_json::json!(ids[0]);

        assert!(matches!(
            TeamLineup::from_snapshot(&snapshot, &[]),
            Err(DomainError::InvalidSnapshot(_))
        ));
    }
}
