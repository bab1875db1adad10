//! Per-tick sampling of input transitions and world snapshots.

use std::collections::{HashMap, HashSet};
use std::thread::JoinHandle;

use crossbeam_channel::{Sender, TrySendError};
use smallvec::SmallVec;

use gourd_core::{EntityId, EntitySnapshot, InputAction, InputEvent, KeyCode, Keyframe};
use gourd_log::record::{encode_line, Header, Record};
use gourd_log::{quantize, LineSink};

use crate::config::RecorderConfig;
use crate::writer::spawn_writer;

/// Records a live simulation session to an append-only log.
///
/// One recorder is bound to one output sink and one simulation
/// session. It is *active* between [`start`](Recorder::start) and
/// [`stop`](Recorder::stop); those two calls are the only
/// synchronization points with the writer thread, and all other
/// operations are non-blocking from the tick thread's point of view.
///
/// # Examples
///
/// ```
/// use gourd_core::{EntityId, EntitySnapshot};
/// use gourd_recorder::{Recorder, RecorderConfig};
/// use std::collections::HashSet;
///
/// let mut recorder = Recorder::new(RecorderConfig::default());
/// recorder.start(Box::new(Vec::<String>::new()), (800, 600), Some(42));
/// let entities = [EntitySnapshot::at(EntityId::from("head"), 40.0, 60.0)];
/// recorder.sample(0.016, &entities, &HashSet::new());
/// recorder.stop();
/// assert!(!recorder.is_recording());
/// ```
pub struct Recorder {
    config: RecorderConfig,
    tx: Option<Sender<String>>,
    writer: Option<JoinHandle<()>>,
    elapsed: f64,
    keyframe_elapsed: f64,
    prev_pressed: HashSet<KeyCode>,
    last_positions: HashMap<EntityId, (f64, f64)>,
    last_sample: Vec<EntitySnapshot>,
    dropped: u64,
}

impl Recorder {
    /// A recorder with the given configuration, not yet started.
    pub fn new(config: RecorderConfig) -> Self {
        Self {
            config: config.sanitized(),
            tx: None,
            writer: None,
            elapsed: 0.0,
            keyframe_elapsed: 0.0,
            prev_pressed: HashSet::new(),
            last_positions: HashMap::new(),
            last_sample: Vec::new(),
            dropped: 0,
        }
    }

    /// Whether a recording session is active.
    pub fn is_recording(&self) -> bool {
        self.tx.is_some()
    }

    /// Begin a session: spawn the writer thread over `sink` and emit
    /// the header record, embedding `seed` when the simulation exposes
    /// a reproducible one. No-op if already recording.
    pub fn start(&mut self, sink: Box<dyn LineSink>, viewport: (u32, u32), seed: Option<u64>) {
        if self.is_recording() {
            return;
        }

        let (tx, rx) = crossbeam_channel::bounded(self.config.queue_capacity);
        match spawn_writer(rx, sink) {
            Ok(handle) => self.writer = Some(handle),
            Err(e) => {
                log::error!("could not spawn recording writer: {e}");
                return;
            }
        }
        self.tx = Some(tx);
        self.elapsed = 0.0;
        self.keyframe_elapsed = 0.0;
        self.dropped = 0;
        self.prev_pressed.clear();
        self.last_positions.clear();
        self.last_sample.clear();

        let (w, h) = viewport;
        self.record(&Record::Header(Header::new(w, h, seed)));
    }

    /// Sample one simulation tick.
    ///
    /// `pressed` is the currently-held key set, copied by value by the
    /// caller so no live input state is shared across threads. Input
    /// records are emitted only on edges: one press record batching
    /// every newly-down key, one release record for the newly-up set.
    pub fn sample(&mut self, dt: f64, entities: &[EntitySnapshot], pressed: &HashSet<KeyCode>) {
        if !self.is_recording() {
            return;
        }
        self.elapsed += dt;
        self.keyframe_elapsed += dt;

        self.emit_input_edges(pressed);
        self.prev_pressed = pressed.clone();

        if self.elapsed >= self.config.warmup
            && self.keyframe_elapsed >= self.config.keyframe_interval
            && self.write_keyframe(entities, false)
        {
            self.keyframe_elapsed = 0.0;
        }

        self.last_sample = entities.to_vec();
    }

    /// Side channel: enqueue a record the simulation timestamped
    /// itself (spawn/destroy events). Use [`elapsed`](Recorder::elapsed)
    /// for timestamps consistent with keyframes.
    pub fn record(&mut self, record: &Record) {
        match encode_line(record) {
            Ok(line) => self.enqueue(line),
            Err(e) => log::error!("dropping unencodable record: {e}"),
        }
    }

    /// Side channel: enqueue an already-formatted log line verbatim.
    pub fn record_raw(&mut self, line: String) {
        if self.is_recording() {
            self.enqueue(line);
        }
    }

    /// Seconds of recording time elapsed so far. The simulation uses
    /// this to timestamp side-channel records.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Records dropped because the channel was full. Accepted loss:
    /// the enqueue path never blocks the simulation tick.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// End the session: flush one final keyframe, signal the writer to
    /// drain, and join it. Every record enqueued before this call is
    /// in the sink when it returns. No-op if not recording.
    pub fn stop(&mut self) {
        if !self.is_recording() {
            return;
        }
        // Capture the terminal state even if nothing moved since the
        // last periodic keyframe.
        let last = std::mem::take(&mut self.last_sample);
        self.write_keyframe(&last, true);

        // Dropping the sender disconnects the channel once drained;
        // the writer exits after flushing everything already queued.
        self.tx = None;
        if let Some(handle) = self.writer.take() {
            if handle.join().is_err() {
                log::warn!("recording writer thread panicked");
            }
        }
    }

    fn emit_input_edges(&mut self, pressed: &HashSet<KeyCode>) {
        let t = quantize(self.elapsed, self.config.quantize_decimals);

        let mut down: SmallVec<[KeyCode; 4]> =
            pressed.difference(&self.prev_pressed).copied().collect();
        if !down.is_empty() {
            down.sort_unstable();
            self.record(&Record::Input(InputEvent {
                t,
                action: InputAction::Press,
                keys: down,
            }));
        }

        let mut up: SmallVec<[KeyCode; 4]> =
            self.prev_pressed.difference(pressed).copied().collect();
        if !up.is_empty() {
            up.sort_unstable();
            self.record(&Record::Input(InputEvent {
                t,
                action: InputAction::Release,
                keys: up,
            }));
        }
    }

    /// Build and enqueue a keyframe. Returns false when every entity
    /// was filtered out; an empty keyframe is never written.
    ///
    /// Entities are sorted by id, a stable identity key, so downstream
    /// consumers never depend on creation order. `force` bypasses the
    /// motion threshold (used for the final keyframe on stop).
    fn write_keyframe(&mut self, entities: &[EntitySnapshot], force: bool) -> bool {
        let decimals = self.config.quantize_decimals;

        let mut kept: Vec<&EntitySnapshot> = entities
            .iter()
            .filter(|e| {
                force
                    || match self.last_positions.get(&e.id) {
                        Some(&(lx, ly)) => e.distance_to(lx, ly) >= self.config.motion_threshold,
                        None => true,
                    }
            })
            .collect();
        if kept.is_empty() {
            return false;
        }
        kept.sort_by(|a, b| a.id.cmp(&b.id));

        let snapshot: Vec<EntitySnapshot> = kept
            .into_iter()
            .map(|e| {
                self.last_positions.insert(e.id.clone(), (e.x, e.y));
                EntitySnapshot {
                    id: e.id.clone(),
                    x: quantize(e.x, decimals),
                    y: quantize(e.y, decimals),
                    rt: e.rt,
                    w: e.w.map(|v| quantize(v, decimals)),
                    h: e.h.map(|v| quantize(v, decimals)),
                    color: e.color,
                }
            })
            .collect();

        self.record(&Record::Keyframe(Keyframe {
            t: quantize(self.elapsed, decimals),
            entities: snapshot,
        }));
        true
    }

    fn enqueue(&mut self, line: String) {
        let Some(tx) = self.tx.as_ref() else {
            return;
        };
        match tx.try_send(line) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                // Deliberate lossy-telemetry tradeoff: never block the tick.
                self.dropped += 1;
            }
            Err(TrySendError::Disconnected(_)) => {
                // Writer died on an I/O failure; producer keeps running.
                self.dropped += 1;
            }
        }
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        self.stop();
    }
}
