use std::time::Duration;

use hh_core::{normalize_key_name, Color, Entity, HiHippoError, Shape};
use hh_parser::{classify_line, Statement};
use tracing::{debug, trace, warn};

use crate::bridge::RenderBridge;
use crate::context::RunContext;
use crate::eval::{eval_arith, eval_int_arg, evaluate};

/// Emitted by `import hippogame`.
pub const GAME_ENABLED_TEXT: &str = "HippoGame Enabled";

/// Statements that do nothing until `import hippogame` has run.
pub fn requires_game_mode(statement: &Statement) -> bool {
    matches!(
        statement,
        Statement::SetColor { .. }
            | Statement::DrawCircle { .. }
            | Statement::DrawRect { .. }
            | Statement::DrawText { .. }
            | Statement::Move { .. }
            | Statement::IfKey { .. }
            | Statement::Sleep { .. }
            | Statement::Update
            | Statement::Clear
    )
}

pub fn execute_line(
    line: &str,
    context: &mut RunContext,
    bridge: &mut dyn RenderBridge,
) -> Result<Option<String>, HiHippoError> {
    let statement = classify_line(line);
    execute_statement(&statement, context, bridge)
}

/// Runs one statement. Program mistakes never produce an error; only bridge
/// failures propagate.
pub fn execute_statement(
    statement: &Statement,
    context: &mut RunContext,
    bridge: &mut dyn RenderBridge,
) -> Result<Option<String>, HiHippoError> {
    if !context.game_mode && requires_game_mode(statement) {
        debug!(?statement, "game statement before import hippogame ignored");
        return Ok(None);
    }

    match statement {
        Statement::Empty | Statement::LoopHeader => Ok(None),
        Statement::ImportGame => {
            if !context.game_mode {
                context.game_mode = true;
                debug!("game mode enabled");
                bridge.init()?;
            }
            Ok(Some(GAME_ENABLED_TEXT.to_string()))
        }
        Statement::Assign(assignments) => {
            context.variables.assign(assignments);
            Ok(None)
        }
        Statement::Print { expr } => {
            let text = evaluate(expr, &context.variables);
            Ok((!text.is_empty()).then_some(text))
        }
        Statement::SetColor { name } => {
            context.color = Color::from_name(name);
            Ok(None)
        }
        Statement::DrawCircle { id, x, y, radius } => {
            let vars = &context.variables;
            let (Some(x), Some(y), Some(radius)) = (
                eval_int_arg(x, vars),
                eval_int_arg(y, vars),
                eval_int_arg(radius, vars),
            ) else {
                trace!(%id, "draw_circle skipped: non-numeric argument");
                return Ok(None);
            };
            draw(context, bridge, id, x, y, Shape::Circle { radius });
            Ok(None)
        }
        Statement::DrawRect {
            id,
            x,
            y,
            width,
            height,
        } => {
            let vars = &context.variables;
            let (Some(x), Some(y), Some(width), Some(height)) = (
                eval_int_arg(x, vars),
                eval_int_arg(y, vars),
                eval_int_arg(width, vars),
                eval_int_arg(height, vars),
            ) else {
                trace!(%id, "draw_rect skipped: non-numeric argument");
                return Ok(None);
            };
            draw(context, bridge, id, x, y, Shape::Rect { width, height });
            Ok(None)
        }
        Statement::DrawText { id, x, y, text } => {
            let vars = &context.variables;
            let (Some(x), Some(y)) = (eval_int_arg(x, vars), eval_int_arg(y, vars)) else {
                trace!(%id, "draw_text skipped: non-numeric argument");
                return Ok(None);
            };
            let text = evaluate(text, vars);
            draw(context, bridge, id, x, y, Shape::Text { text });
            Ok(None)
        }
        Statement::Move { id, dx, dy } => {
            let vars = &context.variables;
            let (Some(dx), Some(dy)) = (eval_int_arg(dx, vars), eval_int_arg(dy, vars)) else {
                trace!(%id, "move skipped: non-numeric offset");
                return Ok(None);
            };
            if context.scene.update_position(id, dx, dy) {
                bridge.move_entity(id, dx, dy);
            }
            Ok(None)
        }
        Statement::IfKey { key, body } => {
            let held = bridge.current_keys();
            if held.contains(&normalize_key_name(key)) {
                return execute_statement(body, context, bridge);
            }
            Ok(None)
        }
        Statement::Sleep { seconds } => {
            let Ok(seconds) = eval_arith(seconds, &context.variables) else {
                return Ok(None);
            };
            match Duration::try_from_secs_f64(seconds) {
                Ok(duration) if !duration.is_zero() => bridge.pause(duration),
                _ => trace!(seconds, "sleep skipped: not a positive duration"),
            }
            Ok(None)
        }
        Statement::Update => {
            bridge.render()?;
            Ok(None)
        }
        Statement::Clear => {
            context.scene.clear();
            bridge.clear_all();
            Ok(None)
        }
        Statement::Malformed { keyword, raw } => {
            warn!(keyword, %raw, "malformed statement skipped");
            Ok(None)
        }
        Statement::Unknown { raw } => {
            debug!(%raw, "unrecognized statement ignored");
            Ok(None)
        }
    }
}

fn draw(
    context: &mut RunContext,
    bridge: &mut dyn RenderBridge,
    id: &str,
    x: i64,
    y: i64,
    shape: Shape,
) {
    let entity = Entity {
        x,
        y,
        color: context.color,
        shape,
    };
    bridge.create_entity(id, &entity);
    context.scene.create(id, entity);
}

#[cfg(test)]
mod dispatch_tests {
    use super::*;
    use crate::bridge::{BridgeCall, HeadlessBridge};
    use hh_core::HhValue;
    use pretty_assertions::assert_eq;

    fn run_lines(lines: &[&str], bridge: &mut HeadlessBridge) -> (RunContext, Vec<String>) {
        let mut context = RunContext::new();
        let mut output = Vec::new();
        for line in lines {
            if let Some(text) = execute_line(line, &mut context, bridge).expect("dispatch") {
                output.push(text);
            }
        }
        (context, output)
    }

    #[test]
    fn import_enables_game_mode_once() {
        let mut bridge = HeadlessBridge::default();
        let (context, output) =
            run_lines(&["import hippogame", "import hippogame"], &mut bridge);
        assert!(context.game_mode);
        assert_eq!(output, vec![GAME_ENABLED_TEXT, GAME_ENABLED_TEXT]);
        assert_eq!(bridge.calls(), &[BridgeCall::Init]);
    }

    #[test]
    fn print_and_assignment_work_without_game_mode() {
        let mut bridge = HeadlessBridge::default();
        let (context, output) = run_lines(
            &["x = 5, name = \"Hippo\"", "print name + \" is \" + x", "print"],
            &mut bridge,
        );
        assert_eq!(output, vec!["Hippo is 5"]);
        assert_eq!(context.variables.lookup("x"), Some(&HhValue::Number(5.0)));
        assert!(bridge.calls().is_empty());
    }

    #[test]
    fn draw_then_move_updates_position() {
        let mut bridge = HeadlessBridge::default();
        let (context, _) = run_lines(
            &["import hippogame", "draw_circle a 10 10 5", "move a 5 0"],
            &mut bridge,
        );
        let entity = context.scene.get("a").expect("entity a");
        assert_eq!((entity.x, entity.y), (15, 10));
        assert_eq!(bridge.entities().get("a"), Some(entity));
    }

    #[test]
    fn drawing_uses_current_color_and_overwrites() {
        let mut bridge = HeadlessBridge::default();
        let (context, _) = run_lines(
            &[
                "import hippogame",
                "draw_rect box 0 0 10 10",
                "set_color red",
                "size = 4",
                "draw_rect box 1 2 size*2 size",
                "set_color nonsense",
                "draw_text label 5 5 \"n=\" + size",
            ],
            &mut bridge,
        );
        assert_eq!(context.scene.len(), 2);
        assert_eq!(
            context.scene.get("box"),
            Some(&Entity {
                x: 1,
                y: 2,
                color: Color::RED,
                shape: Shape::Rect {
                    width: 8,
                    height: 4
                },
            })
        );
        assert_eq!(
            context.scene.get("label"),
            Some(&Entity {
                x: 5,
                y: 5,
                color: Color::WHITE,
                shape: Shape::Text {
                    text: "n=4".to_string()
                },
            })
        );
    }

    #[test]
    fn game_statements_are_ignored_before_import() {
        let mut bridge = HeadlessBridge::default();
        let (context, output) =
            run_lines(&["draw_circle a 1 1 1", "set_color red", "clear"], &mut bridge);
        assert!(context.scene.is_empty());
        assert_eq!(context.color, Color::WHITE);
        assert!(output.is_empty());
        assert!(bridge.calls().is_empty());
    }

    #[test]
    fn move_of_unknown_entity_is_noop() {
        let mut bridge = HeadlessBridge::default();
        let (context, _) = run_lines(&["import hippogame", "move ghost 1 1"], &mut bridge);
        assert!(context.scene.is_empty());
        assert_eq!(bridge.calls(), &[BridgeCall::Init]);
    }

    #[test]
    fn if_key_runs_body_only_while_key_is_held() {
        let mut bridge = HeadlessBridge::default();
        let mut context = RunContext::new();
        for line in ["import hippogame", "draw_circle a 10 10 5"] {
            execute_line(line, &mut context, &mut bridge).expect("setup");
        }

        execute_line("if_key W move a 0 -1", &mut context, &mut bridge).expect("no key");
        assert_eq!(context.scene.get("a").map(|e| e.y), Some(10));

        bridge.press("W");
        execute_line("if_key W move a 0 -1", &mut context, &mut bridge).expect("key");
        execute_line("if_key w move a 0 -1", &mut context, &mut bridge).expect("lowercase");
        assert_eq!(context.scene.get("a").map(|e| e.y), Some(8));

        execute_line("if_key W if_key Up move a 0 -1", &mut context, &mut bridge)
            .expect("chained, second key missing");
        assert_eq!(context.scene.get("a").map(|e| e.y), Some(8));
    }

    #[test]
    fn if_key_never_writes_key_state() {
        let mut bridge = HeadlessBridge::default();
        bridge.press("Space");
        let before = bridge.current_keys();
        run_lines(&["import hippogame", "if_key Space print \"jump\""], &mut bridge);
        assert_eq!(bridge.current_keys(), before);
    }

    #[test]
    fn frame_control_talks_to_bridge() {
        let mut bridge = HeadlessBridge::default().with_blocking_pause(false);
        let (context, _) = run_lines(
            &[
                "import hippogame",
                "draw_circle a 1 1 1",
                "sleep 0.25",
                "sleep -1",
                "sleep soon",
                "update",
                "clear",
            ],
            &mut bridge,
        );
        assert!(context.scene.is_empty());
        assert!(bridge.entities().is_empty());
        assert_eq!(
            bridge.calls()[2..].to_vec(),
            vec![
                BridgeCall::Pause(Duration::from_millis(250)),
                BridgeCall::Render,
                BridgeCall::ClearAll,
            ]
        );
    }

    #[test]
    fn unknown_and_malformed_lines_are_silent() {
        let mut bridge = HeadlessBridge::default();
        let (context, output) = run_lines(
            &["foobar 1 2 3", "import hippogame", "draw_circle a", "move a x y"],
            &mut bridge,
        );
        assert_eq!(output, vec![GAME_ENABLED_TEXT]);
        assert!(context.scene.is_empty());
        assert!(context.variables.is_empty());
    }
}
