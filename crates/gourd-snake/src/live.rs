//! Wires a live [`SnakeWorld`] to a [`Recorder`]: per-tick sampling,
//! spawn/destroy side-channel records, and automatic stop on game
//! over.

use gourd_core::InputContext;
use gourd_log::record::{DestroyRecord, Record, SpawnRecord, SpawnedEntity};
use gourd_log::{quantize, LogError, LogStore};
use gourd_recorder::{Recorder, RecorderConfig};
use gourd_replay::Simulation;

use crate::world::SnakeWorld;

/// Timestamp precision for side-channel records, matching keyframes.
const RECORD_DECIMALS: u32 = 3;

/// A recorded live run.
///
/// The host feeds key events into [`input_mut`](LiveGame::input_mut)
/// and calls [`tick`](LiveGame::tick) once per frame; everything else
/// (sampling order, record timestamps, stopping the recorder when the
/// run ends) is handled here.
///
/// # Examples
///
/// ```no_run
/// use gourd_log::FsLogStore;
/// use gourd_recorder::RecorderConfig;
/// use gourd_snake::{LiveGame, SnakeWorld};
///
/// let store = FsLogStore::new("recordings");
/// let world = SnakeWorld::new(800, 600, 12345);
/// let mut game = LiveGame::begin(&store, "run-1", world, RecorderConfig::default()).unwrap();
/// while game.world().game_over().is_none() {
///     game.tick(1.0 / 60.0);
/// }
/// ```
pub struct LiveGame {
    world: SnakeWorld,
    recorder: Recorder,
    input: InputContext,
}

impl LiveGame {
    /// Start recording `world` into a fresh log named `name`.
    pub fn begin(
        store: &dyn LogStore,
        name: &str,
        world: SnakeWorld,
        config: RecorderConfig,
    ) -> Result<Self, LogError> {
        let sink = store.create(name)?;
        let mut recorder = Recorder::new(config);
        recorder.start(sink, world.viewport(), world.reproducible_seed());
        Ok(Self {
            world,
            recorder,
            input: InputContext::new(),
        })
    }

    /// One frame: sample, simulate, log the tick's spawns and
    /// consumptions, and stop the recorder if the run just ended.
    pub fn tick(&mut self, dt: f64) {
        let entities = self.world.snapshot_entities();
        let pressed = self.input.pressed_snapshot();
        self.recorder.sample(dt, &entities, &pressed);

        self.world.advance(dt, &mut self.input);

        let t = quantize(self.recorder.elapsed(), RECORD_DECIMALS);
        for spawned in self.world.drain_spawned() {
            self.recorder.record(&Record::Spawn(SpawnRecord {
                t,
                entity: SpawnedEntity {
                    id: spawned.id,
                    kind: "seed".to_owned(),
                    gx: spawned.pos.x,
                    gy: spawned.pos.y,
                    color: Some(spawned.color),
                },
            }));
        }
        for consumed in self.world.drain_consumed() {
            self.recorder.record(&Record::Destroy(DestroyRecord {
                t,
                id: consumed.id,
            }));
        }

        if self.world.game_over().is_some() {
            self.recorder.stop();
        }
        self.input.begin_tick();
    }

    /// Key state, for the host's input handler.
    pub fn input_mut(&mut self) -> &mut InputContext {
        &mut self.input
    }

    /// The running world.
    pub fn world(&self) -> &SnakeWorld {
        &self.world
    }

    /// Records dropped by the recorder so far.
    pub fn dropped_records(&self) -> u64 {
        self.recorder.dropped()
    }

    /// Stop recording early and return the world. Flushes everything
    /// already enqueued.
    pub fn finish(mut self) -> SnakeWorld {
        self.recorder.stop();
        self.world
    }
}
