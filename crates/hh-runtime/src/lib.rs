//! HiHippo interpreter: expression evaluation, statement dispatch and the
//! `forever:` tick scheduler, driven through an abstract [`RenderBridge`].

mod bridge;
mod context;
mod dispatch;
mod eval;
mod lifecycle;
mod scene;
mod scheduler;
mod store;

pub use bridge::{BridgeCall, FrameBudget, HeadlessBridge, LoopExit, RenderBridge, TickFn};
pub use context::RunContext;
pub use dispatch::{execute_line, execute_statement, requires_game_mode, GAME_ENABLED_TEXT};
pub use eval::{eval_arith, eval_int_arg, evaluate};
pub use lifecycle::{EngineOptions, HiHippoEngine, ProgramRun, DEFAULT_TARGET_HZ};
pub use scene::SceneTable;
pub use scheduler::{run_tick, LoopLine, LoopScheduler, LoopState};
pub use store::VariableStore;
