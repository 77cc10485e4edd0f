use hh_core::HiHippoError;
use hh_parser::{is_loop_header, scan_lines, IndentUnit};
use tracing::debug;

use crate::bridge::{LoopExit, RenderBridge};
use crate::context::RunContext;
use crate::dispatch::execute_line;
use crate::scheduler::{run_tick, LoopScheduler, LoopState};

pub const DEFAULT_TARGET_HZ: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    pub target_hz: u32,
    pub indent: IndentUnit,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            target_hz: DEFAULT_TARGET_HZ,
            indent: IndentUnit::default(),
        }
    }
}

/// Result of [`HiHippoEngine::run_program`]. `output` holds the lines
/// emitted while loading; lines printed inside the frame loop go to the
/// bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramRun {
    pub output: Vec<String>,
    pub game_mode: bool,
    pub loop_state: LoopState,
    pub loop_exit: Option<LoopExit>,
}

#[derive(Debug, Clone, Default)]
pub struct HiHippoEngine {
    options: EngineOptions,
    context: RunContext,
    scheduler: LoopScheduler,
}

impl HiHippoEngine {
    pub fn new(options: EngineOptions) -> Self {
        Self {
            options,
            context: RunContext::new(),
            scheduler: LoopScheduler::new(),
        }
    }

    pub fn context(&self) -> &RunContext {
        &self.context
    }

    pub fn scheduler(&self) -> &LoopScheduler {
        &self.scheduler
    }

    /// Starts a fresh run: variables, scene, color, game mode and loop block
    /// are dropped, and the bridge forgets the previous run's entities.
    pub fn reset(&mut self, bridge: &mut dyn RenderBridge) {
        self.context.reset();
        self.scheduler.reset();
        bridge.clear_all();
    }

    /// Executes top-level lines in order and captures the `forever:` block.
    /// Does not start the frame loop.
    pub fn load_program(
        &mut self,
        source: &str,
        bridge: &mut dyn RenderBridge,
    ) -> Result<Vec<String>, HiHippoError> {
        let mut output = Vec::new();
        for line in scan_lines(source) {
            if self.scheduler.is_capturing() {
                if line.is_blank() {
                    continue;
                }
                if self.options.indent.is_indented(line.text) {
                    self.scheduler.capture(line.number, line.text);
                    continue;
                }
                self.scheduler.finish_capture();
                debug!(line = line.number, "loop block armed");
            }

            if is_loop_header(line.text) {
                debug!(line = line.number, "loop block capture started");
                self.scheduler.begin_capture();
                continue;
            }

            if let Some(text) = self.execute_line(line.text, bridge)? {
                output.push(text);
            }
        }
        self.scheduler.finish_capture();
        Ok(output)
    }

    pub fn execute_line(
        &mut self,
        line: &str,
        bridge: &mut dyn RenderBridge,
    ) -> Result<Option<String>, HiHippoError> {
        execute_line(line, &mut self.context, bridge)
    }

    /// Hands the block to the bridge's frame loop. Returns `None` when the
    /// loop already ran in this run.
    pub fn start_frame_loop(
        &mut self,
        bridge: &mut dyn RenderBridge,
    ) -> Result<Option<LoopExit>, HiHippoError> {
        if !self.scheduler.start() {
            return Ok(None);
        }
        debug!(
            lines = self.scheduler.block().len(),
            target_hz = self.options.target_hz,
            "frame loop started"
        );

        let block = self.scheduler.block();
        let context = &mut self.context;
        let result = bridge.run_frame_loop(
            self.options.target_hz,
            &mut |bridge: &mut dyn RenderBridge| run_tick(block, context, bridge),
        );
        self.scheduler.stop();
        let exit = result?;
        debug!(?exit, "frame loop stopped");
        Ok(Some(exit))
    }

    /// Full reset, load, then the frame loop when the program enabled game
    /// mode.
    pub fn run_program(
        &mut self,
        source: &str,
        bridge: &mut dyn RenderBridge,
    ) -> Result<ProgramRun, HiHippoError> {
        self.reset(bridge);
        let output = self.load_program(source, bridge)?;
        let loop_exit = if self.context.game_mode {
            self.start_frame_loop(bridge)?
        } else {
            None
        };
        Ok(ProgramRun {
            output,
            game_mode: self.context.game_mode,
            loop_state: self.scheduler.state(),
            loop_exit,
        })
    }
}

#[cfg(test)]
mod lifecycle_tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::bridge::{BridgeCall, FrameBudget, HeadlessBridge};
    use crate::dispatch::GAME_ENABLED_TEXT;
    use pretty_assertions::assert_eq;

    fn run(source: &str, bridge: &mut HeadlessBridge) -> (HiHippoEngine, ProgramRun) {
        let mut engine = HiHippoEngine::default();
        let run = engine.run_program(source, bridge).expect("program should run");
        (engine, run)
    }

    fn x_of(engine: &HiHippoEngine, id: &str) -> Option<i64> {
        engine.context().scene.get(id).map(|entity| entity.x)
    }

    #[test]
    fn plain_program_emits_lines_without_loop() {
        let mut bridge = HeadlessBridge::default();
        let (_, run) = run(
            "x = 5\ny = 7\nprint x + 1\nprint x + \"-\" + y\nfoobar 1 2 3\n",
            &mut bridge,
        );
        assert_eq!(run.output, vec!["6", "5-7"]);
        assert!(!run.game_mode);
        assert_eq!(run.loop_state, LoopState::Idle);
        assert_eq!(run.loop_exit, None);
        assert_eq!(bridge.frames_run(), 0);
    }

    #[test]
    fn forever_moves_about_sixty_steps_per_second() {
        let mut bridge = HeadlessBridge::new(FrameBudget::Duration(Duration::from_secs(1)));
        let (engine, run) = run(
            "import hippogame\ndraw_circle a 0 0 5\nforever:\n    move a 1 0\n",
            &mut bridge,
        );
        assert_eq!(run.output, vec![GAME_ENABLED_TEXT]);
        assert_eq!(run.loop_exit, Some(LoopExit::Completed));
        let x = x_of(&engine, "a").expect("entity a");
        assert!((45..=61).contains(&x), "x = {x}");
        assert_eq!(engine.context().scene.get("a").map(|e| e.y), Some(0));
    }

    #[test]
    fn quit_stops_the_loop() {
        let mut bridge = HeadlessBridge::new(FrameBudget::QuitAfter(3));
        let (mut engine, run) = run(
            "import hippogame\ndraw_rect p 0 0 4 4\nforever:\n    move p 1 0\n",
            &mut bridge,
        );
        assert_eq!(run.loop_exit, Some(LoopExit::Quit));
        assert_eq!(run.loop_state, LoopState::Stopped);
        assert_eq!(x_of(&engine, "p"), Some(3));
        assert_eq!(engine.start_frame_loop(&mut bridge).expect("restart"), None);
    }

    #[test]
    fn if_key_follows_scripted_snapshots() {
        let mut bridge = HeadlessBridge::new(FrameBudget::Frames(4));
        bridge.script_keys(0, &["Right"]);
        bridge.script_keys(2, &[]);
        let (engine, _) = run(
            "import hippogame\ndraw_circle a 0 0 5\nforever:\n    if_key right move a 1 0\n",
            &mut bridge,
        );
        assert_eq!(x_of(&engine, "a"), Some(2));
    }

    #[test]
    fn variables_reset_between_runs() {
        let mut bridge = HeadlessBridge::default();
        let mut engine = HiHippoEngine::default();
        engine.run_program("x = 5", &mut bridge).expect("first run");
        let run = engine.run_program("print x", &mut bridge).expect("second run");
        assert_eq!(run.output, vec!["x"]);
        assert!(engine.context().variables.is_empty());
    }

    #[test]
    fn scene_does_not_leak_into_next_run_on_shared_bridge() {
        let mut bridge = HeadlessBridge::new(FrameBudget::Frames(1));
        let mut engine = HiHippoEngine::default();
        engine
            .run_program("import hippogame\ndraw_circle ghost 5 5 5\n", &mut bridge)
            .expect("first run");
        assert!(bridge.entities().contains_key("ghost"));

        engine
            .run_program("import hippogame\ndraw_circle a 1 1 1\n", &mut bridge)
            .expect("second run");
        let engine_ids: Vec<&str> = engine.context().scene.all().map(|(id, _)| id).collect();
        let bridge_ids: Vec<&str> = bridge.entities().keys().map(String::as_str).collect();
        assert_eq!(engine_ids, vec!["a"]);
        assert_eq!(bridge_ids, vec!["a"]);
    }

    #[test]
    fn sleep_blocks_each_headless_tick() {
        let mut bridge = HeadlessBridge::new(FrameBudget::Frames(3));
        let started = Instant::now();
        let (_, run) = run("import hippogame\nforever:\n    sleep 0.05\n", &mut bridge);
        assert_eq!(run.loop_exit, Some(LoopExit::Completed));
        assert!(
            started.elapsed() >= Duration::from_millis(150),
            "elapsed {:?}",
            started.elapsed()
        );
    }

    #[test]
    fn last_loop_header_wins() {
        let mut bridge = HeadlessBridge::new(FrameBudget::Frames(2));
        let (engine, _) = run(
            "import hippogame\ndraw_circle a 0 0 1\nforever:\n    move a 100 0\nforever:\n    move a 1 0\n",
            &mut bridge,
        );
        assert_eq!(engine.scheduler().block().len(), 1);
        assert_eq!(x_of(&engine, "a"), Some(2));
    }

    #[test]
    fn capture_ends_at_first_unindented_line() {
        let mut bridge = HeadlessBridge::new(FrameBudget::Frames(1));
        let (engine, run) = run(
            "import hippogame\nforever:\n    move a 1 0\n\n\tmove a 0 1\nprint \"after\"\n",
            &mut bridge,
        );
        assert_eq!(run.output, vec![GAME_ENABLED_TEXT, "after"]);
        let numbers: Vec<usize> = engine
            .scheduler()
            .block()
            .iter()
            .map(|line| line.number)
            .collect();
        assert_eq!(numbers, vec![3, 5]);
    }

    #[test]
    fn loop_without_game_mode_stays_armed() {
        let mut bridge = HeadlessBridge::new(FrameBudget::Frames(5));
        let (_, run) = run("forever:\n    print \"never\"\n", &mut bridge);
        assert_eq!(run.loop_state, LoopState::Armed);
        assert_eq!(run.loop_exit, None);
        assert_eq!(bridge.frames_run(), 0);
    }

    #[test]
    fn game_mode_without_block_still_renders() {
        let mut bridge = HeadlessBridge::new(FrameBudget::Frames(2));
        let (_, run) = run("import hippogame\ndraw_text t 1 1 \"hi\"\n", &mut bridge);
        assert_eq!(run.loop_exit, Some(LoopExit::Completed));
        let renders = bridge
            .calls()
            .iter()
            .filter(|call| **call == BridgeCall::Render)
            .count();
        assert_eq!(renders, 2);
    }

    #[test]
    fn loop_output_goes_to_the_bridge() {
        let mut bridge = HeadlessBridge::new(FrameBudget::Frames(2));
        let (_, run) = run(
            "import hippogame\nn = 1\nforever:\n    print \"n=\" + n\n",
            &mut bridge,
        );
        assert_eq!(run.output, vec![GAME_ENABLED_TEXT]);
        assert_eq!(bridge.printed(), vec!["n=1", "n=1"]);
    }

    #[test]
    fn custom_indent_unit() {
        let mut bridge = HeadlessBridge::new(FrameBudget::Frames(1));
        let mut engine = HiHippoEngine::new(EngineOptions {
            indent: IndentUnit { spaces: 2 },
            ..EngineOptions::default()
        });
        engine
            .run_program(
                "import hippogame\ndraw_circle a 0 0 1\nforever:\n  move a 3 0\n",
                &mut bridge,
            )
            .expect("run");
        assert_eq!(x_of(&engine, "a"), Some(3));
    }
}
