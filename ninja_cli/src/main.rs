mod cli;
mod console;
mod error_fmt;
mod gemini;
mod logging;
mod report;
mod stack;

use std::time::{Duration, Instant};

use clap::Parser;
use eyre::WrapErr;
use ninja_core::{MotionStatus, NinjaSession, SessionReply, parse_action_json};

use crate::cli::{Cli, Commands, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};
use crate::report::{print_auto_stop, print_reply, reply_result};

/// Poll cadence while holding the process open for a running gait.
const HOLD_POLL: Duration = Duration::from_millis(20);

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    if let Err(e) = color_eyre::install() {
        eprintln!("failed to install error hook: {e}");
    }

    if let Err(err) = run(cli) {
        let json = JSON_MODE.get().copied().unwrap_or(false);
        if json {
            eprintln!("{}", format_error_json(&err));
        } else {
            eprintln!("{}", humanize(&err));
        }
        tracing::error!(error = %err, "command failed");
        std::process::exit(exit_code_for_error(&err));
    }
}

fn run(cli: Cli) -> eyre::Result<()> {
    let cfg = match &cli.config {
        Some(path) => ninja_config::load_file(path)?,
        None => {
            let cfg = ninja_config::Config::default();
            cfg.validate()?;
            cfg
        }
    };
    let _log_guard = logging::init_tracing(cli.json, cli.log_level.as_deref(), &cfg.logging)?;
    tracing::debug!(config = ?cli.config, "configuration loaded");

    let mut session = stack::build_session(&cfg)?;
    match cli.cmd {
        Commands::Console => console::run_console(&mut session, cli.json),
        Commands::Say { text, hold_ms } => {
            let reply = session.handle_input(&text);
            finish(&mut session, &text, &reply, hold_ms, cli.json)
        }
        Commands::Action { json, hold_ms } => {
            let action = parse_action_json(&json)?;
            let outcome = session.dispatcher_mut().dispatch(action.clone());
            let reply = SessionReply::Dispatched { action, outcome };
            finish(&mut session, &json, &reply, hold_ms, cli.json)
        }
        Commands::SelfCheck => self_check(&mut session, cli.json),
    }
}

/// Print the reply, optionally let a continuous gait run, then shut down.
fn finish(
    session: &mut NinjaSession,
    input: &str,
    reply: &SessionReply,
    hold_ms: u64,
    json: bool,
) -> eyre::Result<()> {
    print_reply(input, reply, &session.status_line(), json);
    if hold_ms > 0 {
        hold(session, Duration::from_millis(hold_ms), json);
    }
    let outcome = session.shutdown();
    tracing::debug!(%outcome, "shutdown finished");
    reply_result(reply)?;
    Ok(())
}

/// Keep polling until the deadline or until the gait ends on its own.
fn hold(session: &mut NinjaSession, for_: Duration, json: bool) {
    let deadline = Instant::now() + for_;
    while Instant::now() < deadline {
        if let Some(stop) = session.poll() {
            print_auto_stop(&stop, json);
        }
        if session.dispatcher().status() == MotionStatus::Idle {
            break;
        }
        std::thread::sleep(HOLD_POLL);
    }
}

fn self_check(session: &mut NinjaSession, json: bool) -> eyre::Result<()> {
    let greeting = session.startup();
    let range = session.dispatcher().supervisor().sample_range();
    let status = session.status_line();
    if json {
        println!(
            "{}",
            serde_json::json!({
                "self_check": greeting.label(),
                "detail": greeting.detail(),
                "range": range.to_string(),
                "status": status,
            })
        );
    } else {
        println!("self-check: greeting {greeting}; range {range}; status {status}");
    }
    let outcome = session.shutdown();
    tracing::debug!(%outcome, "shutdown finished");
    report::outcome_result(&greeting).wrap_err("self-check greeting failed")?;
    Ok(())
}
