use clap::{Args, Parser, Subcommand};
use hh_runtime::DEFAULT_TARGET_HZ;

#[derive(Debug, Parser)]
#[command(name = "hihippo")]
#[command(about = "HiHippo interpreter and program tools")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Mode,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Mode {
    /// Run a program (`.json` documents are decoded first).
    Run(RunArgs),
    /// Wrap raw code into a `{"code": ...}` document.
    Encode(EncodeArgs),
    /// Extract the raw code from a document.
    Decode(DecodeArgs),
    /// Report whether a file is JSON and carries a `code` field.
    Validate(ValidateArgs),
}

#[derive(Debug, Args)]
pub(crate) struct RunArgs {
    pub(crate) path: String,
    /// Never open the terminal canvas.
    #[arg(long)]
    pub(crate) headless: bool,
    /// Frames the headless bridge runs in game mode.
    #[arg(long, default_value_t = 0)]
    pub(crate) ticks: u64,
    #[arg(long, default_value_t = DEFAULT_TARGET_HZ)]
    pub(crate) hz: u32,
}

#[derive(Debug, Args)]
pub(crate) struct EncodeArgs {
    #[arg(long = "input")]
    pub(crate) input: String,
    #[arg(long = "output")]
    pub(crate) output: String,
}

#[derive(Debug, Args)]
pub(crate) struct DecodeArgs {
    #[arg(long = "input")]
    pub(crate) input: String,
    #[arg(long = "output")]
    pub(crate) output: Option<String>,
}

#[derive(Debug, Args)]
pub(crate) struct ValidateArgs {
    #[arg(long = "input")]
    pub(crate) input: String,
}
