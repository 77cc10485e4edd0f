use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use hh_core::{normalize_key_name, Entity, HiHippoError, KeySnapshot};

/// Per-frame body handed to [`RenderBridge::run_frame_loop`].
pub type TickFn<'a> = dyn FnMut(&mut dyn RenderBridge) -> Result<(), HiHippoError> + 'a;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// The host asked to stop (window closed, quit key).
    Quit,
    /// The bridge ran out of its own frame budget.
    Completed,
}

/// Drawing and input surface the interpreter talks to. The bridge owns the
/// key-state set and the frame timing; the interpreter only reads snapshots
/// and supplies the tick body.
pub trait RenderBridge {
    fn init(&mut self) -> Result<(), HiHippoError> {
        Ok(())
    }

    fn create_entity(&mut self, id: &str, entity: &Entity);

    fn move_entity(&mut self, id: &str, dx: i64, dy: i64);

    fn clear_all(&mut self);

    fn render(&mut self) -> Result<(), HiHippoError>;

    fn current_keys(&self) -> KeySnapshot;

    /// Output emitted while the frame loop runs.
    fn print_line(&mut self, _text: &str) {}

    /// Backs `sleep`. Blocks the tick, and with it rendering and input.
    fn pause(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }

    /// Calls `tick` once per frame at `target_hz` until the host quits or the
    /// bridge decides it is done. A started tick always runs to completion.
    fn run_frame_loop(
        &mut self,
        target_hz: u32,
        tick: &mut TickFn<'_>,
    ) -> Result<LoopExit, HiHippoError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameBudget {
    Frames(u64),
    Duration(Duration),
    /// Report [`LoopExit::Quit`] after this many frames.
    QuitAfter(u64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeCall {
    Init,
    Create { id: String, entity: Entity },
    Move { id: String, dx: i64, dy: i64 },
    ClearAll,
    Render,
    Print(String),
    Pause(Duration),
}

/// In-memory bridge: mirrors the scene, records every call and replays
/// scripted key state. Used by tests and by the CLI when no terminal is
/// attached. `pause` blocks like a real host unless turned off with
/// [`HeadlessBridge::with_blocking_pause`].
#[derive(Debug, Clone)]
pub struct HeadlessBridge {
    budget: FrameBudget,
    paced: bool,
    blocking_pause: bool,
    keys: KeySnapshot,
    scripted_keys: BTreeMap<u64, KeySnapshot>,
    entities: BTreeMap<String, Entity>,
    calls: Vec<BridgeCall>,
    frames_run: u64,
}

impl Default for HeadlessBridge {
    fn default() -> Self {
        Self::new(FrameBudget::Frames(0))
    }
}

impl HeadlessBridge {
    pub fn new(budget: FrameBudget) -> Self {
        Self {
            budget,
            paced: matches!(budget, FrameBudget::Duration(_)),
            blocking_pause: true,
            keys: KeySnapshot::new(),
            scripted_keys: BTreeMap::new(),
            entities: BTreeMap::new(),
            calls: Vec::new(),
            frames_run: 0,
        }
    }

    /// Sleep between frames to hold the target rate.
    pub fn with_pacing(mut self, paced: bool) -> Self {
        self.paced = paced;
        self
    }

    /// With `false`, `pause` is only recorded.
    pub fn with_blocking_pause(mut self, blocking: bool) -> Self {
        self.blocking_pause = blocking;
        self
    }

    pub fn press(&mut self, key: &str) {
        self.keys.insert(normalize_key_name(key));
    }

    pub fn release(&mut self, key: &str) {
        self.keys.remove(&normalize_key_name(key));
    }

    /// Replaces the held keys when frame `frame` (0-based) starts.
    pub fn script_keys(&mut self, frame: u64, keys: &[&str]) {
        self.scripted_keys.insert(
            frame,
            keys.iter().map(|key| normalize_key_name(key)).collect(),
        );
    }

    pub fn calls(&self) -> &[BridgeCall] {
        &self.calls
    }

    pub fn entities(&self) -> &BTreeMap<String, Entity> {
        &self.entities
    }

    pub fn frames_run(&self) -> u64 {
        self.frames_run
    }

    pub fn printed(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                BridgeCall::Print(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn budget_exhausted(&self, started: Instant) -> Option<LoopExit> {
        match self.budget {
            FrameBudget::Frames(limit) if self.frames_run >= limit => Some(LoopExit::Completed),
            FrameBudget::Duration(limit) if started.elapsed() >= limit => {
                Some(LoopExit::Completed)
            }
            FrameBudget::QuitAfter(limit) if self.frames_run >= limit => Some(LoopExit::Quit),
            _ => None,
        }
    }
}

impl RenderBridge for HeadlessBridge {
    fn init(&mut self) -> Result<(), HiHippoError> {
        self.calls.push(BridgeCall::Init);
        Ok(())
    }

    fn create_entity(&mut self, id: &str, entity: &Entity) {
        self.entities.insert(id.to_string(), entity.clone());
        self.calls.push(BridgeCall::Create {
            id: id.to_string(),
            entity: entity.clone(),
        });
    }

    fn move_entity(&mut self, id: &str, dx: i64, dy: i64) {
        if let Some(entity) = self.entities.get_mut(id) {
            entity.translate(dx, dy);
        }
        self.calls.push(BridgeCall::Move {
            id: id.to_string(),
            dx,
            dy,
        });
    }

    fn clear_all(&mut self) {
        self.entities.clear();
        self.calls.push(BridgeCall::ClearAll);
    }

    fn render(&mut self) -> Result<(), HiHippoError> {
        self.calls.push(BridgeCall::Render);
        Ok(())
    }

    fn current_keys(&self) -> KeySnapshot {
        self.keys.clone()
    }

    fn print_line(&mut self, text: &str) {
        self.calls.push(BridgeCall::Print(text.to_string()));
    }

    fn pause(&mut self, duration: Duration) {
        self.calls.push(BridgeCall::Pause(duration));
        if self.blocking_pause {
            std::thread::sleep(duration);
        }
    }

    fn run_frame_loop(
        &mut self,
        target_hz: u32,
        tick: &mut TickFn<'_>,
    ) -> Result<LoopExit, HiHippoError> {
        let period = Duration::from_secs_f64(1.0 / f64::from(target_hz.max(1)));
        let started = Instant::now();
        let mut next_frame = started;
        loop {
            if let Some(exit) = self.budget_exhausted(started) {
                return Ok(exit);
            }
            if let Some(keys) = self.scripted_keys.get(&self.frames_run) {
                self.keys = keys.clone();
            }
            tick(self)?;
            self.frames_run += 1;

            if self.paced {
                next_frame += period;
                let now = Instant::now();
                if next_frame > now {
                    std::thread::sleep(next_frame - now);
                }
            }
        }
    }
}
