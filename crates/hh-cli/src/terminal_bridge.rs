#[cfg(coverage)]
pub(crate) fn run_interactive(
    engine: &mut hh_runtime::HiHippoEngine,
    source: &str,
) -> Result<i32, hh_core::HiHippoError> {
    crate::run_headless(engine, source, 0)
}

#[cfg(not(coverage))]
pub(crate) use rich::run_interactive;

#[cfg(not(coverage))]
mod rich {
    use std::collections::{BTreeMap, VecDeque};
    use std::io;
    use std::time::{Duration, Instant};

    use crossterm::event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    };
    use crossterm::terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    };
    use crossterm::ExecutableCommand;
    use hh_core::{normalize_key_name, Entity, HiHippoError, KeySnapshot, Shape};
    use hh_runtime::{HiHippoEngine, LoopExit, RenderBridge, TickFn};
    use ratatui::backend::CrosstermBackend;
    use ratatui::layout::{Constraint, Layout};
    use ratatui::style::{Color, Style};
    use ratatui::symbols::Marker;
    use ratatui::text::{Line, Span};
    use ratatui::widgets::canvas::{Canvas, Circle, Context, Rectangle};
    use ratatui::widgets::{Block, Borders, Paragraph};
    use ratatui::{Frame, Terminal};
    use tracing::{debug, info};

    use crate::map_bridge_io;

    /// Logical drawing space; program coordinates grow right and down.
    const CANVAS_WIDTH: f64 = 800.0;
    const CANVAS_HEIGHT: f64 = 600.0;
    /// Without release events a key counts as held this long after its last
    /// press or repeat.
    const KEY_HOLD_WINDOW: Duration = Duration::from_millis(400);
    const LOG_ROWS: usize = 3;

    struct TuiTerminal {
        terminal: Terminal<CrosstermBackend<io::Stdout>>,
        release_events: bool,
    }

    impl TuiTerminal {
        fn new() -> Result<Self, HiHippoError> {
            enable_raw_mode().map_err(map_bridge_io)?;
            io::stdout()
                .execute(EnterAlternateScreen)
                .map_err(map_bridge_io)?;
            let release_events = matches!(supports_keyboard_enhancement(), Ok(true))
                && io::stdout()
                    .execute(PushKeyboardEnhancementFlags(
                        KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
                    ))
                    .is_ok();
            let backend = CrosstermBackend::new(io::stdout());
            let terminal = Terminal::new(backend).map_err(map_bridge_io)?;
            Ok(Self {
                terminal,
                release_events,
            })
        }
    }

    impl Drop for TuiTerminal {
        fn drop(&mut self) {
            if self.release_events {
                let _ = io::stdout().execute(PopKeyboardEnhancementFlags);
            }
            let _ = disable_raw_mode();
            let _ = io::stdout().execute(LeaveAlternateScreen);
        }
    }

    /// Canvas bridge over the controlling terminal. The terminal is only
    /// taken over once `import hippogame` asks for it.
    #[derive(Default)]
    pub(crate) struct TerminalBridge {
        terminal: Option<TuiTerminal>,
        entities: BTreeMap<String, Entity>,
        held: BTreeMap<String, Instant>,
        log: VecDeque<String>,
        quit_requested: bool,
    }

    pub(crate) fn run_interactive(
        engine: &mut HiHippoEngine,
        source: &str,
    ) -> Result<i32, HiHippoError> {
        let mut bridge = TerminalBridge::default();
        let result = engine.run_program(source, &mut bridge);
        drop(bridge);

        let run = result?;
        for line in &run.output {
            println!("{line}");
        }
        info!(exit = ?run.loop_exit, "interactive run finished");
        Ok(0)
    }

    impl TerminalBridge {
        fn release_events(&self) -> bool {
            self.terminal
                .as_ref()
                .is_some_and(|terminal| terminal.release_events)
        }

        fn handle_event(&mut self, event: Event) {
            if let Event::Key(key) = event {
                self.handle_key(key);
            }
        }

        fn handle_key(&mut self, key: KeyEvent) {
            let interrupt =
                key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL);
            if key.code == KeyCode::Esc || interrupt {
                if key.kind != KeyEventKind::Release {
                    debug!("quit requested");
                    self.quit_requested = true;
                }
                return;
            }
            let Some(name) = key_name(key.code) else {
                return;
            };
            match key.kind {
                KeyEventKind::Press | KeyEventKind::Repeat => {
                    self.held.insert(name, Instant::now());
                }
                KeyEventKind::Release => {
                    self.held.remove(&name);
                }
            }
        }

        fn expire_keys(&mut self) {
            if self.release_events() {
                return;
            }
            self.held
                .retain(|_, pressed_at| pressed_at.elapsed() < KEY_HOLD_WINDOW);
        }

        /// Reads input until `timeout` passes or quit is requested.
        fn drain_input(&mut self, timeout: Duration) -> Result<(), HiHippoError> {
            let deadline = Instant::now() + timeout;
            loop {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if !event::poll(remaining).map_err(map_bridge_io)? {
                    return Ok(());
                }
                let event = event::read().map_err(map_bridge_io)?;
                self.handle_event(event);
                if self.quit_requested {
                    return Ok(());
                }
            }
        }
    }

    impl RenderBridge for TerminalBridge {
        fn init(&mut self) -> Result<(), HiHippoError> {
            if self.terminal.is_none() {
                self.terminal = Some(TuiTerminal::new()?);
                info!("terminal canvas opened");
            }
            Ok(())
        }

        fn create_entity(&mut self, id: &str, entity: &Entity) {
            self.entities.insert(id.to_string(), entity.clone());
        }

        fn move_entity(&mut self, id: &str, dx: i64, dy: i64) {
            if let Some(entity) = self.entities.get_mut(id) {
                entity.translate(dx, dy);
            }
        }

        fn clear_all(&mut self) {
            self.entities.clear();
        }

        fn render(&mut self) -> Result<(), HiHippoError> {
            let Some(tui) = self.terminal.as_mut() else {
                return Ok(());
            };
            let entities = &self.entities;
            let log = &self.log;
            tui.terminal
                .draw(|frame| draw_scene(frame, entities, log))
                .map_err(map_bridge_io)?;
            Ok(())
        }

        fn current_keys(&self) -> KeySnapshot {
            self.held.keys().cloned().collect()
        }

        fn print_line(&mut self, text: &str) {
            self.log.push_back(text.to_string());
            while self.log.len() > LOG_ROWS {
                self.log.pop_front();
            }
        }

        fn run_frame_loop(
            &mut self,
            target_hz: u32,
            tick: &mut TickFn<'_>,
        ) -> Result<LoopExit, HiHippoError> {
            self.init()?;
            let period = Duration::from_secs_f64(1.0 / f64::from(target_hz.max(1)));
            let mut next_frame = Instant::now();
            loop {
                self.drain_input(Duration::ZERO)?;
                if self.quit_requested {
                    return Ok(LoopExit::Quit);
                }
                self.expire_keys();
                tick(self)?;

                next_frame += period;
                let now = Instant::now();
                if next_frame < now {
                    next_frame = now;
                }
                self.drain_input(next_frame - now)?;
            }
        }
    }

    fn key_name(code: KeyCode) -> Option<String> {
        let name = match code {
            KeyCode::Char(' ') => "space".to_string(),
            KeyCode::Char(character) => character.to_string(),
            KeyCode::Up => "up".to_string(),
            KeyCode::Down => "down".to_string(),
            KeyCode::Left => "left".to_string(),
            KeyCode::Right => "right".to_string(),
            KeyCode::Enter => "return".to_string(),
            KeyCode::Tab => "tab".to_string(),
            KeyCode::Backspace => "backspace".to_string(),
            KeyCode::F(number) => format!("f{number}"),
            _ => return None,
        };
        Some(normalize_key_name(&name))
    }

    fn draw_scene(
        frame: &mut Frame<'_>,
        entities: &BTreeMap<String, Entity>,
        log: &VecDeque<String>,
    ) {
        let [canvas_area, log_area] = Layout::vertical([
            Constraint::Min(3),
            Constraint::Length(LOG_ROWS as u16 + 2),
        ])
        .areas(frame.area());

        let canvas = Canvas::default()
            .block(Block::default().borders(Borders::ALL).title("HiHippo"))
            .marker(Marker::Braille)
            .x_bounds([0.0, CANVAS_WIDTH])
            .y_bounds([0.0, CANVAS_HEIGHT])
            .paint(|ctx| paint_entities(ctx, entities));
        frame.render_widget(canvas, canvas_area);

        let lines = log
            .iter()
            .map(|line| Line::from(line.as_str()))
            .collect::<Vec<_>>();
        let output = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title("output | esc quits"),
        );
        frame.render_widget(output, log_area);
    }

    fn paint_entities(ctx: &mut Context<'_>, entities: &BTreeMap<String, Entity>) {
        for entity in entities.values() {
            let color = Color::Rgb(entity.color.r, entity.color.g, entity.color.b);
            let x = entity.x as f64;
            let top = CANVAS_HEIGHT - entity.y as f64;
            match &entity.shape {
                Shape::Circle { radius } => ctx.draw(&Circle {
                    x,
                    y: top,
                    radius: *radius as f64,
                    color,
                }),
                Shape::Rect { width, height } => ctx.draw(&Rectangle {
                    x,
                    y: top - *height as f64,
                    width: *width as f64,
                    height: *height as f64,
                    color,
                }),
                Shape::Text { text } => {
                    ctx.print(x, top, Span::styled(text.clone(), Style::default().fg(color)))
                }
            }
        }
    }

}
