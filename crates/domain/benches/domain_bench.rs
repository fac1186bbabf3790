use common::{GameId, InningStateId, PlayerId};
use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use domain::{
    Aggregate, AtBatResultType, EventEnvelope, Game, InningState, SnapshotCapable,
};

/// A game with `halves` half-innings of scoring and outs.
fn game_events(halves: usize) -> Vec<EventEnvelope> {
    let mut game = Game::create_new(GameId::new(), "Hawks", "Owls").unwrap();
    game.start_game().unwrap();
    for half in 0..halves {
        if half % 2 == 0 {
            game.add_away_runs(1).unwrap();
        } else {
            game.add_home_runs(2).unwrap();
        }
        for _ in 0..3 {
            game.add_out().unwrap();
        }
    }
    game.uncommitted_events().to_vec()
}

/// Play-by-play for `at_bats` plate appearances.
fn inning_events(at_bats: usize) -> Vec<EventEnvelope> {
    let results = [
        AtBatResultType::Single,
        AtBatResultType::Walk,
        AtBatResultType::Strikeout,
        AtBatResultType::HomeRun,
        AtBatResultType::FlyOut,
        AtBatResultType::GroundOut,
    ];
    let mut state = InningState::create_new(InningStateId::new(), GameId::new()).unwrap();
    for result in results.iter().cycle().take(at_bats) {
        let slot = state.current_batting_slot();
        let inning = state.inning();
        if state
            .record_at_bat(PlayerId::new(), slot, *result, inning)
            .is_err()
        {
            state
                .record_at_bat(PlayerId::new(), slot, AtBatResultType::GroundOut, inning)
                .unwrap();
        }
    }
    state.uncommitted_events().to_vec()
}

fn bench_game_replay(c: &mut Criterion) {
    let events = game_events(200);

    c.bench_function("domain/game_full_replay", |b| {
        b.iter(|| Game::from_events(&events).unwrap());
    });
}

fn bench_game_snapshot_replay(c: &mut Criterion) {
    let events = game_events(200);
    let split = events.len() - 20;
    let snapshot = Game::from_events(&events[..split])
        .unwrap()
        .to_snapshot()
        .unwrap();

    c.bench_function("domain/game_snapshot_plus_suffix", |b| {
        b.iter(|| Game::from_snapshot(&snapshot, &events[split..]).unwrap());
    });
}

fn bench_inning_replay(c: &mut Criterion) {
    let events = inning_events(500);

    c.bench_function("domain/inning_full_replay", |b| {
        b.iter(|| InningState::from_events(&events).unwrap());
    });
}

fn bench_record_at_bat(c: &mut Criterion) {
    c.bench_function("domain/record_at_bat", |b| {
        b.iter_batched(
            || InningState::create_new(InningStateId::new(), GameId::new()).unwrap(),
            |mut state| {
                state
                    .record_at_bat(PlayerId::new(), 1, AtBatResultType::Walk, 1)
                    .unwrap();
                state
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    bench_game_replay,
    bench_game_snapshot_replay,
    bench_inning_replay,
    bench_record_at_bat,
);
criterion_main!(benches);
