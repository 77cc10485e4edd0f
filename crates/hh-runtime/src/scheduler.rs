use hh_core::HiHippoError;
use hh_parser::Statement;
use tracing::{debug, trace};

use crate::bridge::RenderBridge;
use crate::context::RunContext;
use crate::dispatch::execute_statement;

/// Lifecycle of the single `forever:` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    #[default]
    Idle,
    Capturing,
    Armed,
    Ticking,
    Stopped,
}

/// A captured loop-body line, classified once at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopLine {
    pub number: usize,
    pub text: String,
    pub statement: Statement,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoopScheduler {
    state: LoopState,
    block: Vec<LoopLine>,
}

impl LoopScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn block(&self) -> &[LoopLine] {
        &self.block
    }

    /// A later header replaces any block captured before it.
    pub fn begin_capture(&mut self) {
        if !self.block.is_empty() {
            debug!(
                discarded = self.block.len(),
                "loop block replaced by a later header"
            );
        }
        self.block.clear();
        self.state = LoopState::Capturing;
    }

    pub fn is_capturing(&self) -> bool {
        self.state == LoopState::Capturing
    }

    /// Stores the line with its indentation removed.
    pub fn capture(&mut self, number: usize, body: &str) {
        let text = body.trim().to_string();
        let statement = hh_parser::classify_line(&text);
        self.block.push(LoopLine {
            number,
            text,
            statement,
        });
    }

    pub fn finish_capture(&mut self) {
        if self.state == LoopState::Capturing {
            self.state = LoopState::Armed;
        }
    }

    /// Returns false when the loop already ran or is running.
    pub fn start(&mut self) -> bool {
        match self.state {
            LoopState::Idle | LoopState::Armed => {
                self.state = LoopState::Ticking;
                true
            }
            LoopState::Capturing => {
                self.finish_capture();
                self.start()
            }
            LoopState::Ticking | LoopState::Stopped => false,
        }
    }

    pub fn stop(&mut self) {
        self.state = LoopState::Stopped;
    }

    pub fn reset(&mut self) {
        self.state = LoopState::Idle;
        self.block.clear();
    }
}

/// One frame: every block line in order, then a render.
pub fn run_tick(
    block: &[LoopLine],
    context: &mut RunContext,
    bridge: &mut dyn RenderBridge,
) -> Result<(), HiHippoError> {
    for line in block {
        trace!(line = line.number, text = %line.text, "loop line");
        if let Some(text) = execute_statement(&line.statement, context, bridge)? {
            bridge.print_line(&text);
        }
    }
    bridge.render()
}
