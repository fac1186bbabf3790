//! Integration tests for the Game aggregate.
//!
//! These tests drive games through their public commands and check that
//! replay, snapshots and persistence records reproduce the same state.

use common::{EventRecord, GameId, PlayerId};
use domain::{
    Aggregate, DomainError, EndingType, EventEnvelope, FieldPosition, Game, GameRules, GameScore,
    GameStatus, SharedClock, SnapshotCapable, SoftballEvent, SteppingClock, TeamSide,
};

/// Everything a caller can observe on a game.
#[derive(Debug, PartialEq)]
struct Observed {
    home: String,
    away: String,
    status: GameStatus,
    score: GameScore,
    inning: u32,
    top: bool,
    outs: u8,
    version: i64,
}

fn observe(game: &Game) -> Observed {
    Observed {
        home: game.home_team_name().to_string(),
        away: game.away_team_name().to_string(),
        status: game.status(),
        score: game.score(),
        inning: game.current_inning(),
        top: game.is_top_half(),
        outs: game.outs(),
        version: game.version().as_i64(),
    }
}

fn started_game() -> Game {
    let clock = SharedClock::new(SteppingClock::from_epoch());
    let mut game =
        Game::create_with_clock(clock, GameId::new(), "Hawks", "Owls", GameRules::default())
            .unwrap();
    game.start_game().unwrap();
    game
}

/// A game with runs, outs and inning changes in its history.
fn played_game() -> Game {
    let mut game = started_game();
    game.add_away_runs(2).unwrap();
    for _ in 0..3 {
        game.add_out().unwrap();
    }
    game.add_home_runs(1).unwrap();
    game.add_out().unwrap();
    game.add_home_runs(4).unwrap();
    game.advance_inning().unwrap();
    game.add_out().unwrap();
    game.add_away_runs(3).unwrap();
    game
}

mod scenarios {
    use super::*;

    #[test]
    fn mercy_rule_in_bottom_of_fifth() {
        let mut game = Game::create_new(GameId::new(), "A", "B").unwrap();
        game.start_game().unwrap();
        game.add_home_runs(15).unwrap();

        while !(game.current_inning() == 5 && !game.is_top_half()) {
            game.advance_inning().unwrap();
        }

        assert!(game.is_mercy_rule_triggered());
        game.complete_game(EndingType::MercyRule).unwrap();
        assert_eq!(game.status(), GameStatus::Completed);
    }

    #[test]
    fn runs_accumulate_and_reject_zero() {
        let mut game = started_game();
        assert!(game.add_home_runs(0).is_err());

        for _ in 0..3 {
            game.add_home_runs(3).unwrap();
        }
        assert_eq!(game.score().home_runs(), 9);
    }

    #[test]
    fn outs_never_rest_at_three() {
        let mut game = started_game();
        for _ in 0..20 {
            game.add_out().unwrap();
            assert!(game.outs() <= 2);
        }
        for len in 1..=game.uncommitted_events().len() {
            let prefix = Game::from_events(&game.uncommitted_events()[..len]).unwrap();
            assert!(prefix.outs() <= 2);
        }
        // six full halves, then two outs into the top of the fourth
        assert_eq!(game.current_inning(), 4);
        assert!(game.is_top_half());
        assert_eq!(game.outs(), 2);
    }

    #[test]
    fn custom_rules_flow_through_replay() {
        let rules = GameRules {
            regulation_innings: 5,
            ..GameRules::default()
        };
        let mut game = Game::create_with_rules(GameId::new(), "A", "B", rules).unwrap();
        game.start_game().unwrap();
        while game.current_inning() < 5 {
            game.advance_inning().unwrap();
        }
        assert!(game.is_regulation_complete());

        let rebuilt = Game::from_events(game.uncommitted_events()).unwrap();
        assert_eq!(rebuilt.rules().regulation_innings, 5);
        assert!(rebuilt.is_regulation_complete());
    }
}

mod replay {
    use super::*;

    #[test]
    fn replay_is_idempotent() {
        let game = played_game();
        let events = game.uncommitted_events();

        let first = Game::from_events(events).unwrap();
        let second = Game::from_events(events).unwrap();

        assert_eq!(observe(&first), observe(&second));
        assert_eq!(observe(&first), observe(&game));
        assert!(first.uncommitted_events().is_empty());
    }

    #[test]
    fn version_equals_event_count() {
        let game = played_game();
        let events = game.uncommitted_events();

        for len in 1..=events.len() {
            let rebuilt = Game::from_events(&events[..len]).unwrap();
            assert_eq!(rebuilt.version().as_i64(), len as i64);
        }
    }

    #[test]
    fn snapshot_plus_suffix_matches_full_replay() {
        let game = played_game();
        let events = game.uncommitted_events();
        let full = observe(&Game::from_events(events).unwrap());

        for split in 1..events.len() {
            let prefix = Game::from_events(&events[..split]).unwrap();
            assert!(prefix.outs() <= 2, "prefix of {split} events rests at three outs");
            let snapshot = prefix.to_snapshot().unwrap();
            let restored = Game::from_snapshot(&snapshot, &events[split..]).unwrap();
            assert_eq!(observe(&restored), full, "split at {split}");
        }
    }

    #[test]
    fn records_round_trip() {
        let game = played_game();
        let records: Vec<EventRecord> = game
            .uncommitted_events()
            .iter()
            .map(|e| e.to_record().unwrap())
            .collect();

        let json = serde_json::to_string(&records).unwrap();
        let decoded: Vec<EventRecord> = serde_json::from_str(&json).unwrap();
        let rebuilt = Game::from_records(&decoded).unwrap();

        assert_eq!(observe(&rebuilt), observe(&game));
    }
}

mod strict_reconstruction {
    use super::*;

    /// The game's stream followed by hand-written events.
    fn extended(game: &Game, extra: Vec<SoftballEvent>) -> Vec<EventEnvelope> {
        let clock = SteppingClock::from_epoch();
        let mut events = game.uncommitted_events().to_vec();
        events.extend(
            extra
                .into_iter()
                .map(|event| EventEnvelope::new(&clock, game.id(), game.id(), event)),
        );
        events
    }

    fn assert_rejected(events: &[EventEnvelope]) {
        assert!(matches!(
            Game::from_events(events),
            Err(DomainError::InvalidEventStream(_))
        ));
    }

    #[test]
    fn out_count_must_follow_current_outs() {
        let game = started_game();
        assert_rejected(&extended(&game, vec![SoftballEvent::out_recorded(3).unwrap()]));

        let mut game = started_game();
        game.add_out().unwrap();
        assert_rejected(&extended(&game, vec![SoftballEvent::out_recorded(1).unwrap()]));
    }

    #[test]
    fn inning_advance_must_name_the_next_half() {
        let game = started_game();
        assert_rejected(&extended(
            &game,
            vec![SoftballEvent::inning_advanced(9, true).unwrap()],
        ));
        assert_rejected(&extended(
            &game,
            vec![SoftballEvent::inning_advanced(2, true).unwrap()],
        ));

        let next = extended(&game, vec![SoftballEvent::inning_advanced(1, false).unwrap()]);
        let rebuilt = Game::from_events(&next).unwrap();
        assert_eq!((rebuilt.current_inning(), rebuilt.is_top_half()), (1, false));
    }

    #[test]
    fn third_out_must_be_followed_by_its_inning_change() {
        let mut game = started_game();
        game.add_out().unwrap();
        game.add_out().unwrap();

        // nothing else may come between the third out and the inning change
        assert_rejected(&extended(
            &game,
            vec![
                SoftballEvent::out_recorded(3).unwrap(),
                SoftballEvent::score_updated(TeamSide::Home, 1, GameScore::new(1, 0)).unwrap(),
            ],
        ));
        // the inning change confirms the half the third out moved to
        assert_rejected(&extended(
            &game,
            vec![
                SoftballEvent::out_recorded(3).unwrap(),
                SoftballEvent::inning_advanced(2, true).unwrap(),
            ],
        ));

        let confirmed = extended(
            &game,
            vec![
                SoftballEvent::out_recorded(3).unwrap(),
                SoftballEvent::inning_advanced(1, false).unwrap(),
            ],
        );
        let rebuilt = Game::from_events(&confirmed).unwrap();
        assert_eq!((rebuilt.current_inning(), rebuilt.is_top_half()), (1, false));
        assert_eq!(rebuilt.outs(), 0);
    }

    #[test]
    fn completion_must_match_the_scoreboard() {
        let mut game = started_game();
        game.add_home_runs(2).unwrap();

        assert_rejected(&extended(
            &game,
            vec![
                SoftballEvent::game_completed(EndingType::Regulation, GameScore::new(9, 0), 1)
                    .unwrap(),
            ],
        ));
        assert_rejected(&extended(
            &game,
            vec![
                SoftballEvent::game_completed(EndingType::Regulation, GameScore::new(2, 0), 7)
                    .unwrap(),
            ],
        ));
    }

    #[test]
    fn empty_stream_fails() {
        assert!(matches!(
            Game::from_events(&[]),
            Err(DomainError::InvalidEventStream(_))
        ));
    }

    #[test]
    fn first_event_must_create_game() {
        let game = started_game();
        let events = &game.uncommitted_events()[1..];
        assert!(matches!(
            Game::from_events(events),
            Err(DomainError::InvalidEventStream(_))
        ));
    }

    #[test]
    fn mixed_game_ids_fail() {
        let game = started_game();
        let other = started_game();
        let mut events = game.uncommitted_events().to_vec();
        events.push(other.uncommitted_events()[1].clone());

        assert!(matches!(
            Game::from_events(&events),
            Err(DomainError::InvalidEventStream(_))
        ));
    }

    #[test]
    fn foreign_event_is_fatal() {
        let game = started_game();
        let clock = SteppingClock::from_epoch();
        let mut events = game.uncommitted_events().to_vec();
        events.push(EventEnvelope::new(
            &clock,
            game.id(),
            game.id(),
            SoftballEvent::player_added_to_lineup(
                PlayerId::new(),
                common::JerseyNumber::new(4).unwrap(),
                "Ann",
                1,
                FieldPosition::Pitcher,
            )
            .unwrap(),
        ));

        let err = Game::from_events(&events).unwrap_err();
        assert!(matches!(err, DomainError::UnsupportedEvent { aggregate: "Game", .. }));
    }

    #[test]
    fn invalid_transition_is_fatal() {
        let game = started_game();
        let mut events = game.uncommitted_events().to_vec();
        events.push(events[1].clone());

        assert!(matches!(
            Game::from_events(&events),
            Err(DomainError::InvalidGameStatus { .. })
        ));
    }

    #[test]
    fn undecodable_record_is_fatal() {
        let game = played_game();
        let mut records: Vec<EventRecord> = game
            .uncommitted_events()
            .iter()
            .map(|e| e.to_record().unwrap())
            .collect();
        records[2].payload = serde_json::json!({"type": "ScoreUpdated", "data": {"team": "BENCH"}});

        assert!(matches!(
            Game::from_records(&records),
            Err(DomainError::Serialization(_))
        ));
    }
}

mod snapshots {
    use super::*;

    #[test]
    fn snapshot_of_another_type_rejected() {
        let game = played_game();
        let mut snapshot = game.to_snapshot().unwrap();
        snapshot.aggregate_type = "TeamLineup".to_string();

        assert!(matches!(
            Game::from_snapshot(&snapshot, &[]),
            Err(DomainError::InvalidSnapshot(_))
        ));
    }

    #[test]
    fn snapshot_with_mismatched_id_rejected() {
        let game = played_game();
        let mut snapshot = game.to_snapshot().unwrap();
        snapshot.aggregate_id = GameId::new().into();

        assert!(matches!(
            Game::from_snapshot(&snapshot, &[]),
            Err(DomainError::InvalidSnapshot(_))
        ));
    }

    #[test]
    fn snapshot_with_negative_version_rejected() {
        let game = played_game();
        let mut snapshot = game.to_snapshot().unwrap();
        snapshot.version = common::Version::new(-1);

        assert!(Game::from_snapshot(&snapshot, &[]).is_err());
    }

    #[test]
    fn inconsistent_snapshot_rejected() {
        let game = played_game();
        let mut snapshot = game.to_snapshot().unwrap();
        snapshot.state["away_team_name"] = serde_json::json!("Hawks");

        assert!(matches!(
            Game::from_snapshot(&snapshot, &[]),
            Err(DomainError::InvalidSnapshot(_))
        ));
    }

    #[test]
    fn suffix_may_not_recreate_game() {
        let game = played_game();
        let snapshot = game.to_snapshot().unwrap();
        let creation = game.uncommitted_events()[..1].to_vec();

        assert!(matches!(
            Game::from_snapshot(&snapshot, &creation),
            Err(DomainError::InvalidEventStream(_))
        ));
    }

    #[test]
    fn snapshot_interval() {
        assert_eq!(Game::snapshot_interval(), 50);
        let game = played_game();
        assert!(!game.should_snapshot());
    }
}
