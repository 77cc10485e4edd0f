use std::ffi::OsString;
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Once;

use clap::Parser;
use hh_core::{decode_program, encode_program, inspect_program_json, Entity, HiHippoError};
use hh_runtime::{EngineOptions, FrameBudget, HeadlessBridge, HiHippoEngine};
use serde::Serialize;
use tracing::debug;

mod cli_args;
mod error_map;
mod program_store;
mod terminal_bridge;

pub(crate) use cli_args::{Cli, DecodeArgs, EncodeArgs, Mode, RunArgs, ValidateArgs};
#[cfg(not(coverage))]
pub(crate) use error_map::map_bridge_io;
pub(crate) use error_map::{emit_error, map_cli_read, map_cli_write, map_scene_json};
pub(crate) use program_store::{load_program_source, read_text, write_text};

static TRACING_INIT: Once = Once::new();

/// Installs a stderr subscriber when `RUST_LOG` is set.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true),
                )
                .with(filter)
                .init();
        }
    });
}

pub fn run_cli_from_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => {
            let _ = error.print();
            return error.exit_code();
        }
    };
    init_tracing();
    match run(cli) {
        Ok(code) => code,
        Err(error) => emit_error(error),
    }
}

fn run(cli: Cli) -> Result<i32, HiHippoError> {
    match cli.command {
        Mode::Run(args) => run_program_file(args),
        Mode::Encode(args) => run_encode(args),
        Mode::Decode(args) => run_decode(args),
        Mode::Validate(args) => run_validate(args),
    }
}

fn stdio_is_terminal() -> bool {
    std::io::stdin().is_terminal() && std::io::stdout().is_terminal()
}

fn run_program_file(args: RunArgs) -> Result<i32, HiHippoError> {
    let source = load_program_source(Path::new(&args.path))?;
    let mut engine = HiHippoEngine::new(EngineOptions {
        target_hz: args.hz,
        ..EngineOptions::default()
    });
    debug!(path = %args.path, headless = args.headless, "running program");

    if !args.headless && stdio_is_terminal() {
        return terminal_bridge::run_interactive(&mut engine, &source);
    }
    run_headless(&mut engine, &source, args.ticks)
}

#[derive(Debug, Serialize)]
struct SceneEntry<'a> {
    id: &'a str,
    #[serde(flatten)]
    entity: &'a Entity,
}

pub(crate) fn run_headless(
    engine: &mut HiHippoEngine,
    source: &str,
    ticks: u64,
) -> Result<i32, HiHippoError> {
    let mut bridge = HeadlessBridge::new(FrameBudget::Frames(ticks)).with_pacing(true);
    let run = engine.run_program(source, &mut bridge)?;

    for line in run.output.iter().map(String::as_str).chain(bridge.printed()) {
        println!("{line}");
    }
    if run.game_mode {
        for (id, entity) in engine.context().scene.all() {
            let entry = SceneEntry { id, entity };
            println!(
                "SCENE_JSON:{}",
                serde_json::to_string(&entry).map_err(map_scene_json)?
            );
        }
    }
    debug!(frames = bridge.frames_run(), "headless run finished");
    Ok(0)
}

fn run_encode(args: EncodeArgs) -> Result<i32, HiHippoError> {
    let code = read_text(Path::new(&args.input))?;
    let document = encode_program(&code)?;
    write_text(Path::new(&args.output), &document)?;
    println!("RESULT:OK");
    println!("OUTPUT:{}", args.output);
    Ok(0)
}

fn run_decode(args: DecodeArgs) -> Result<i32, HiHippoError> {
    let raw = read_text(Path::new(&args.input))?;
    let code = decode_program(&raw)?;
    match args.output {
        Some(output) => {
            write_text(Path::new(&output), &code)?;
            println!("RESULT:OK");
            println!("OUTPUT:{}", output);
        }
        None => print!("{code}"),
    }
    Ok(0)
}

fn run_validate(args: ValidateArgs) -> Result<i32, HiHippoError> {
    let raw = read_text(Path::new(&args.input))?;
    let report = inspect_program_json(&raw);
    println!("RESULT:OK");
    println!("VALID_JSON:{}", report.valid_json);
    println!("HAS_CODE:{}", report.has_code);
    Ok(0)
}
