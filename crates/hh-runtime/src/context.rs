use hh_core::Color;

use crate::scene::SceneTable;
use crate::store::VariableStore;

/// Interpreter-owned state for one program run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunContext {
    pub variables: VariableStore,
    pub scene: SceneTable,
    pub color: Color,
    pub game_mode: bool,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.variables.clear();
        self.scene.clear();
        self.color = Color::default();
        self.game_mode = false;
    }
}
