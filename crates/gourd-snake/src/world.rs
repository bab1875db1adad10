//! The snake world: a grid-locked chain, timed seed spawns, and
//! bouncing monsters, all driven by one seeded RNG.
//!
//! The same type runs live sessions and deterministic replays. In
//! replay mode every RNG draw and counter advance happens exactly as
//! in the live run, but seed creation is skipped: recorded spawn
//! events place seeds authoritatively instead, so the step function
//! finds them at the recorded cells and consumption re-emerges on its
//! own.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use gourd_core::{
    EntityId, EntitySnapshot, GridPos, InputContext, KeyCode, RenderKind, Rgba, TimelineEvent,
    TimelinePayload,
};
use gourd_replay::{ConsumedEntity, Simulation};

/// The seven seed colors, drawn by index from the world RNG.
pub const SEED_COLORS: [Rgba; 7] = [
    Rgba { r: 1.0, g: 0.0, b: 0.0, a: 1.0 },
    Rgba { r: 1.0, g: 0.5, b: 0.0, a: 1.0 },
    Rgba { r: 1.0, g: 1.0, b: 0.0, a: 1.0 },
    Rgba { r: 0.0, g: 1.0, b: 0.0, a: 1.0 },
    Rgba { r: 0.0, g: 1.0, b: 1.0, a: 1.0 },
    Rgba { r: 0.0, g: 0.5, b: 1.0, a: 1.0 },
    Rgba { r: 0.6, g: 0.2, b: 1.0, a: 1.0 },
];

/// Tuning knobs for a [`SnakeWorld`]. Defaults match the reference
/// game; tests shrink or disable pieces to isolate behavior.
#[derive(Clone, Copy, Debug)]
pub struct SnakeConfig {
    /// Grid cell size in pixels.
    pub cell: i32,
    /// Seconds between snake steps.
    pub step_time: f64,
    /// Seeds placed at reset.
    pub initial_seeds: u32,
    /// Monsters placed at reset.
    pub initial_monsters: u32,
    /// Cells kept clear between spawned seeds and the walls.
    pub seed_margin: i32,
    /// Random spawn interval bounds in seconds.
    pub seed_interval: (f64, f64),
    /// Delay before the first timed spawn.
    pub first_seed_in: f64,
}

impl Default for SnakeConfig {
    fn default() -> Self {
        Self {
            cell: 20,
            step_time: 0.12,
            initial_seeds: 3,
            initial_monsters: 3,
            seed_margin: 2,
            seed_interval: (1.5, 3.0),
            first_seed_in: 2.0,
        }
    }
}

/// Why a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameOverReason {
    /// The head left the grid.
    HitWall,
    /// The head entered a body cell.
    SelfCollision,
    /// A monster touched the head.
    MonsterCollision,
}

impl std::fmt::Display for GameOverReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameOverReason::HitWall => write!(f, "hit the wall"),
            GameOverReason::SelfCollision => write!(f, "ran into itself"),
            GameOverReason::MonsterCollision => write!(f, "caught by a monster"),
        }
    }
}

/// A seed the world created this tick, to be written to the log by
/// the recording host.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnedSeed {
    /// Assigned id (`seed<N>`).
    pub id: EntityId,
    /// Grid cell it was placed in.
    pub pos: GridPos,
    /// Assigned color.
    pub color: Rgba,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Dir {
    Left,
    Right,
    Up,
    Down,
}

impl Dir {
    fn opposite(self, other: Dir) -> bool {
        matches!(
            (self, other),
            (Dir::Left, Dir::Right)
                | (Dir::Right, Dir::Left)
                | (Dir::Up, Dir::Down)
                | (Dir::Down, Dir::Up)
        )
    }

    fn delta(self) -> (i32, i32) {
        match self {
            Dir::Left => (-1, 0),
            Dir::Right => (1, 0),
            Dir::Up => (0, -1),
            Dir::Down => (0, 1),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Segment {
    pos: GridPos,
    color: Rgba,
}

#[derive(Clone, Debug, PartialEq)]
struct Seed {
    id: EntityId,
    pos: GridPos,
    color: Rgba,
}

#[derive(Clone, Debug, PartialEq)]
struct Monster {
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
    size: f64,
}

/// Comparable end-of-run digest, used to assert replay fidelity.
#[derive(Clone, Debug, PartialEq)]
pub struct WorldSummary {
    /// Final head cell.
    pub head: GridPos,
    /// Body cells, head-adjacent first.
    pub body: Vec<GridPos>,
    /// Live seeds with their cells.
    pub seeds: Vec<(EntityId, GridPos)>,
    /// Total seed ids ever assigned.
    pub seed_counter: u32,
    /// How the run ended, if it did.
    pub game_over: Option<GameOverReason>,
}

/// The simulation itself. See the module docs for the live/replay
/// split.
pub struct SnakeWorld {
    config: SnakeConfig,
    seed: u64,
    rng: ChaCha8Rng,
    width: u32,
    height: u32,
    cols: i32,
    rows: i32,
    dir: Dir,
    pending_dir: Dir,
    head: GridPos,
    body: Vec<Segment>,
    seeds: Vec<Seed>,
    seed_counter: u32,
    seed_timer: f64,
    next_seed_in: f64,
    monsters: Vec<Monster>,
    step_acc: f64,
    game_over: Option<GameOverReason>,
    replay_mode: bool,
    spawned: Vec<SpawnedSeed>,
    consumed: Vec<ConsumedEntity>,
}

impl SnakeWorld {
    /// A live world over a `width` x `height` pixel viewport.
    pub fn new(width: u32, height: u32, seed: u64) -> Self {
        Self::with_config(width, height, seed, SnakeConfig::default())
    }

    /// A replay-mode world: identical RNG progression, but seeds are
    /// only created through [`Simulation::apply_spawn`].
    pub fn replaying(width: u32, height: u32, seed: u64) -> Self {
        let mut world = Self::new(width, height, seed);
        world.replay_mode = true;
        world.seeds.clear();
        world.spawned.clear();
        world
    }

    /// A live world with explicit tuning.
    pub fn with_config(width: u32, height: u32, seed: u64, config: SnakeConfig) -> Self {
        // Ceiling division keeps partial edge cells playable, so wall
        // collision lines up with the visible world bounds.
        let cols = (width as i32 + config.cell - 1) / config.cell;
        let rows = (height as i32 + config.cell - 1) / config.cell;

        let mut world = Self {
            config,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            width,
            height,
            cols,
            rows,
            dir: Dir::Right,
            pending_dir: Dir::Right,
            head: GridPos::new(cols / 2, rows / 2),
            body: Vec::new(),
            seeds: Vec::new(),
            seed_counter: 0,
            seed_timer: 0.0,
            next_seed_in: config.first_seed_in,
            monsters: Vec::new(),
            step_acc: 0.0,
            game_over: None,
            replay_mode: false,
            spawned: Vec::new(),
            consumed: Vec::new(),
        };
        for _ in 0..world.config.initial_seeds {
            world.spawn_seed();
        }
        for _ in 0..world.config.initial_monsters {
            world.spawn_monster();
        }
        world
    }

    /// A replay-mode world with explicit tuning. The tuning must match
    /// the recording's, or RNG progression diverges.
    pub fn replaying_with_config(width: u32, height: u32, seed: u64, config: SnakeConfig) -> Self {
        let mut world = Self::with_config(width, height, seed, config);
        world.replay_mode = true;
        world.seeds.clear();
        world.spawned.clear();
        world
    }

    /// One cooperative tick. No-op once the game is over.
    pub fn update(&mut self, dt: f64, input: &InputContext) {
        if self.game_over.is_some() {
            return;
        }

        let mut intent = self.pending_dir;
        if input.is_pressed(KeyCode::LEFT) || input.is_pressed(KeyCode::A) {
            intent = Dir::Left;
        } else if input.is_pressed(KeyCode::RIGHT) || input.is_pressed(KeyCode::D) {
            intent = Dir::Right;
        } else if input.is_pressed(KeyCode::UP) || input.is_pressed(KeyCode::W) {
            intent = Dir::Up;
        } else if input.is_pressed(KeyCode::DOWN) || input.is_pressed(KeyCode::S) {
            intent = Dir::Down;
        }
        // A reversal would step the head straight into the first
        // segment, so it is rejected rather than fatal.
        if !self.dir.opposite(intent) {
            self.pending_dir = intent;
        }

        self.update_monsters(dt);
        if self.head_hits_monster() {
            self.game_over = Some(GameOverReason::MonsterCollision);
            return;
        }

        self.seed_timer += dt;
        if self.seed_timer >= self.next_seed_in {
            self.spawn_seed();
            self.seed_timer = 0.0;
            let (min, max) = self.config.seed_interval;
            self.next_seed_in = min + (max - min) * self.rng.random::<f64>();
        }

        self.step_acc += dt;
        if self.step_acc >= self.config.step_time {
            self.step_acc -= self.config.step_time;
            self.step();
        }
    }

    /// Monsters are independent and read-mostly, so they integrate in
    /// contiguous batches on a transient worker pool. The pool joins
    /// before this returns; concurrency never spans a tick.
    fn update_monsters(&mut self, dt: f64) {
        if self.monsters.is_empty() {
            return;
        }
        let workers = std::thread::available_parallelism()
            .map(|n| n.get().saturating_sub(1))
            .unwrap_or(1)
            .max(2);
        let batch = self.monsters.len() / workers + 1;
        let (w, h) = (self.width as f64, self.height as f64);

        std::thread::scope(|scope| {
            for chunk in self.monsters.chunks_mut(batch) {
                scope.spawn(move || {
                    for m in chunk {
                        m.x += m.vx * dt;
                        m.y += m.vy * dt;
                        if m.x < 0.0 {
                            m.x = 0.0;
                            m.vx = m.vx.abs();
                        }
                        if m.y < 0.0 {
                            m.y = 0.0;
                            m.vy = m.vy.abs();
                        }
                        if m.x > w - m.size {
                            m.x = w - m.size;
                            m.vx = -m.vx.abs();
                        }
                        if m.y > h - m.size {
                            m.y = h - m.size;
                            m.vy = -m.vy.abs();
                        }
                    }
                });
            }
        });
    }

    fn step(&mut self) {
        self.dir = self.pending_dir;
        let (dx, dy) = self.dir.delta();
        let nx = self.head.x + dx;
        let ny = self.head.y + dy;

        if nx < 0 || ny < 0 || nx >= self.cols || ny >= self.rows {
            self.game_over = Some(GameOverReason::HitWall);
            return;
        }
        if self.body.iter().any(|s| s.pos.x == nx && s.pos.y == ny) {
            self.game_over = Some(GameOverReason::SelfCollision);
            return;
        }

        let target = GridPos::new(nx, ny);
        let mut grow_color = None;
        if let Some(i) = self.seeds.iter().position(|s| s.pos == target) {
            let seed = self.seeds.remove(i);
            grow_color = Some(seed.color);
            self.consumed.push(ConsumedEntity {
                id: seed.id,
                pos: seed.pos,
            });
        }

        let mut prev = self.head;
        for seg in &mut self.body {
            std::mem::swap(&mut seg.pos, &mut prev);
        }
        if let Some(color) = grow_color {
            self.body.push(Segment { pos: prev, color });
        }
        self.head = target;

        if self.head_hits_monster() {
            self.game_over = Some(GameOverReason::MonsterCollision);
        }
    }

    /// Place a seed at a random margin-respecting cell.
    ///
    /// The RNG draws happen unconditionally so live and replay runs
    /// stay aligned: an occupied cell aborts the spawn after the
    /// position draws, and replay mode aborts after the counter
    /// advance, both without rolling anything back.
    fn spawn_seed(&mut self) {
        let margin = self.config.seed_margin;
        let (mut min_x, mut max_x) = (margin, self.cols - 1 - margin);
        if max_x < min_x {
            min_x = 0;
            max_x = self.cols - 1;
        }
        let (mut min_y, mut max_y) = (margin, self.rows - 1 - margin);
        if max_y < min_y {
            min_y = 0;
            max_y = self.rows - 1;
        }

        let gx = self.rng.random_range(min_x..=max_x);
        let gy = self.rng.random_range(min_y..=max_y);
        let pos = GridPos::new(gx, gy);
        if pos == self.head || self.body.iter().any(|s| s.pos == pos) {
            return;
        }
        let color = SEED_COLORS[self.rng.random_range(0..SEED_COLORS.len())];

        let id = EntityId::from(format!("seed{}", self.seed_counter));
        self.seed_counter += 1;
        if self.replay_mode {
            return;
        }

        self.seeds.push(Seed {
            id: id.clone(),
            pos,
            color,
        });
        self.spawned.push(SpawnedSeed { id, pos, color });
    }

    fn spawn_monster(&mut self) {
        let size = 16.0 + self.rng.random_range(0..10) as f64;
        let xf: f64 = self.rng.random();
        let yf: f64 = self.rng.random();
        let speed = 60.0 + self.rng.random::<f64>() * 80.0;
        let angle = self.rng.random::<f64>() * std::f64::consts::TAU;
        self.monsters.push(Monster {
            x: xf * (self.width as f64 - size),
            y: yf * (self.height as f64 - size),
            vx: angle.cos() * speed,
            vy: angle.sin() * speed,
            size,
        });
    }

    fn head_hits_monster(&self) -> bool {
        let cell = self.config.cell as f64;
        let hx = self.head.x as f64 * cell + cell * 0.5;
        let hy = self.head.y as f64 * cell + cell * 0.5;
        let r_head = cell * 0.5;
        self.monsters.iter().any(|m| {
            let mx = m.x + m.size * 0.5;
            let my = m.y + m.size * 0.5;
            let rad = r_head + m.size * 0.5;
            let (dx, dy) = (hx - mx, hy - my);
            dx * dx + dy * dy < rad * rad
        })
    }

    /// Pixel-space snapshots of every entity, for the recorder.
    pub fn snapshot_entities(&self) -> Vec<EntitySnapshot> {
        let cell = self.config.cell as f64;
        let mut out = Vec::with_capacity(1 + self.body.len() + self.seeds.len() + self.monsters.len());

        out.push(EntitySnapshot {
            id: EntityId::from("head"),
            x: self.head.x as f64 * cell,
            y: self.head.y as f64 * cell,
            rt: RenderKind::Rectangle,
            w: Some(cell),
            h: Some(cell),
            color: None,
        });
        for (i, seg) in self.body.iter().enumerate() {
            out.push(EntitySnapshot {
                id: EntityId::chain_segment(i),
                x: seg.pos.x as f64 * cell,
                y: seg.pos.y as f64 * cell,
                rt: RenderKind::Rectangle,
                w: Some(cell),
                h: Some(cell),
                color: Some(seg.color),
            });
        }
        for seed in &self.seeds {
            out.push(EntitySnapshot {
                id: seed.id.clone(),
                x: seed.pos.x as f64 * cell,
                y: seed.pos.y as f64 * cell,
                rt: RenderKind::Rectangle,
                w: Some(cell),
                h: Some(cell),
                color: Some(seed.color),
            });
        }
        for (i, m) in self.monsters.iter().enumerate() {
            out.push(EntitySnapshot {
                id: EntityId::from(format!("monster{i}")),
                x: m.x,
                y: m.y,
                rt: RenderKind::Circle,
                w: Some(m.size),
                h: Some(m.size),
                color: None,
            });
        }
        out
    }

    /// Seeds created since the last drain, for the recording host to
    /// turn into spawn records.
    pub fn drain_spawned(&mut self) -> Vec<SpawnedSeed> {
        std::mem::take(&mut self.spawned)
    }

    /// Recorded viewport dimensions.
    pub fn viewport(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Grid dimensions in cells.
    pub fn grid_size(&self) -> (i32, i32) {
        (self.cols, self.rows)
    }

    /// Current head cell.
    pub fn head(&self) -> GridPos {
        self.head
    }

    /// Number of body segments, excluding the head.
    pub fn body_len(&self) -> usize {
        self.body.len()
    }

    /// How the run ended, if it did.
    pub fn game_over(&self) -> Option<GameOverReason> {
        self.game_over
    }

    /// Comparable digest of the run's outcome.
    pub fn summary(&self) -> WorldSummary {
        WorldSummary {
            head: self.head,
            body: self.body.iter().map(|s| s.pos).collect(),
            seeds: self.seeds.iter().map(|s| (s.id.clone(), s.pos)).collect(),
            seed_counter: self.seed_counter,
            game_over: self.game_over,
        }
    }
}

impl Simulation for SnakeWorld {
    fn advance(&mut self, dt: f64, input: &mut InputContext) {
        self.update(dt, input);
    }

    fn apply_spawn(&mut self, event: &TimelineEvent) {
        let TimelinePayload::Spawn { pos, color } = event.payload else {
            return;
        };
        self.seeds.push(Seed {
            id: event.id.clone(),
            pos,
            color: color.unwrap_or(Rgba { r: 1.0, g: 1.0, b: 1.0, a: 1.0 }),
        });
        // Keep the id counter ahead of recorded numeric ids so a run
        // continued past the log never reuses one.
        if let Some(n) = event
            .id
            .as_str()
            .strip_prefix("seed")
            .and_then(|s| s.parse::<u32>().ok())
        {
            self.seed_counter = self.seed_counter.max(n + 1);
        }
    }

    fn drain_consumed(&mut self) -> Vec<ConsumedEntity> {
        std::mem::take(&mut self.consumed)
    }

    fn reproducible_seed(&self) -> Option<u64> {
        Some(self.seed)
    }
}
