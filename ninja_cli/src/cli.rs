//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "ninja_cli", version, about = "Ninja robot motion CLI")]
pub struct Cli {
    /// Path to config TOML (defaults are used when omitted)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log and report as JSON lines instead of pretty text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); overrides [logging].level
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive session: one utterance per line, `quit` or EOF to leave
    Console,
    /// Run one utterance through routing, interpretation and dispatch
    Say {
        /// Text as it would be heard, e.g. "ninja walk fast"
        text: String,
        /// Keep running for this long afterwards so a continuous gait can move
        #[arg(long, value_name = "MS", default_value_t = 0)]
        hold_ms: u64,
    },
    /// Dispatch a raw action descriptor given as JSON
    Action {
        /// e.g. '{"action_type":"move","move_function":"walk","speed":"fast"}'
        json: String,
        /// Keep running for this long afterwards so a continuous gait can move
        #[arg(long, value_name = "MS", default_value_t = 0)]
        hold_ms: u64,
    },
    /// Build the hardware stack, run the greeting and report status
    SelfCheck,
}
