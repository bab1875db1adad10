//! End-to-end: record a live run, load the log back, and re-simulate
//! it deterministically.

use gourd_core::KeyCode;
use gourd_log::{LogStore, ReplayLog};
use gourd_recorder::RecorderConfig;
use gourd_replay::DeterministicReplay;
use gourd_snake::{LiveGame, SnakeConfig, SnakeWorld, WorldSummary};
use gourd_test_utils::MemoryStore;

const DT: f64 = 1.0 / 60.0;

fn load(store: &MemoryStore, name: &str) -> ReplayLog {
    ReplayLog::from_lines(store.read_lines(name).unwrap())
}

fn run_replay(log: ReplayLog, world: SnakeWorld, ticks: usize) -> (WorldSummary, usize) {
    let mut replay = DeterministicReplay::new(log, world);
    let mut input = gourd_core::InputContext::new();
    for _ in 0..ticks {
        replay.tick(DT, &mut input);
    }
    (replay.sim().summary(), replay.mismatches().len())
}

#[test]
fn recorded_run_replays_to_the_same_final_state() {
    // No input, no monsters: the snake runs straight into the wall,
    // eating whatever reset seeds sit in its path.
    let config = SnakeConfig {
        initial_monsters: 0,
        ..Default::default()
    };
    let store = MemoryStore::new();
    let world = SnakeWorld::with_config(240, 240, 77, config);
    let mut game = LiveGame::begin(&store, "straight", world, RecorderConfig::default()).unwrap();

    for _ in 0..90 {
        game.tick(DT);
    }
    let live = game.finish();
    assert!(live.game_over().is_some(), "short grid must end the run");

    let log = load(&store, "straight");
    assert_eq!(log.seed(), Some(77));
    assert_eq!(log.viewport(), Some((240, 240)));
    assert!(!log.keyframes.is_empty());

    let replay_world = SnakeWorld::replaying_with_config(240, 240, 77, config);
    let (summary, mismatches) = run_replay(log, replay_world, 90);

    assert_eq!(summary, live.summary());
    assert_eq!(mismatches, 0);
}

#[test]
fn deterministic_replay_is_reproducible() {
    let store = MemoryStore::new();
    let world = SnakeWorld::new(800, 600, 2024);
    let mut game = LiveGame::begin(&store, "scripted", world, RecorderConfig::default()).unwrap();

    for i in 0..360 {
        match i {
            40 => game.input_mut().press(KeyCode::DOWN),
            100 => {
                game.input_mut().release(KeyCode::DOWN);
                game.input_mut().press(KeyCode::LEFT);
            }
            160 => {
                game.input_mut().release(KeyCode::LEFT);
                game.input_mut().press(KeyCode::UP);
            }
            _ => {}
        }
        game.tick(DT);
    }
    game.finish();

    let first = run_replay(
        load(&store, "scripted"),
        SnakeWorld::replaying(800, 600, 2024),
        360,
    );
    let second = run_replay(
        load(&store, "scripted"),
        SnakeWorld::replaying(800, 600, 2024),
        360,
    );
    assert_eq!(first, second, "same seed and schedule, same outcome");
}

#[test]
fn recorded_log_carries_every_record_class() {
    let config = SnakeConfig {
        initial_monsters: 0,
        first_seed_in: 0.3,
        ..Default::default()
    };
    let store = MemoryStore::new();
    let world = SnakeWorld::with_config(800, 600, 5, config);
    let mut game = LiveGame::begin(&store, "classes", world, RecorderConfig::default()).unwrap();

    for i in 0..120 {
        if i == 10 {
            game.input_mut().press(KeyCode::DOWN);
        }
        if i == 30 {
            game.input_mut().release(KeyCode::DOWN);
        }
        game.tick(DT);
    }
    game.finish();

    let log = load(&store, "classes");
    assert!(log.header.is_some());
    assert!(!log.keyframes.is_empty());
    assert!(!log.inputs.is_empty());
    // Reset seeds plus the timed spawn at 0.3s.
    assert!(log.timeline.iter().any(|e| e.is_spawn()));
    assert_eq!(log.skipped_lines(), 0);
}
