//! Interactive console: one utterance per line until `quit`, EOF or Ctrl-C.

use std::io::{BufRead, IsTerminal, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossbeam_channel as xch;
use ninja_core::NinjaSession;

use crate::report::{print_auto_stop, print_reply};

/// How often the loop wakes to reconcile gaits that ended on their own.
const POLL_EVERY: Duration = Duration::from_millis(50);

pub fn run_console(session: &mut NinjaSession, json: bool) -> eyre::Result<()> {
    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let flag = Arc::clone(&interrupted);
        if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed)) {
            tracing::warn!(error = %e, "failed to install Ctrl-C handler");
        }
    }

    let lines = spawn_stdin_reader()?;
    let interactive = std::io::stdin().is_terminal() && !json;

    let startup = session.startup();
    tracing::info!(outcome = %startup, "startup finished");
    if interactive {
        println!("{}", session.status_line());
    }

    loop {
        if interactive {
            print!("> ");
            let _ = std::io::stdout().flush();
        }
        let line = loop {
            if interrupted.load(Ordering::Relaxed) {
                break None;
            }
            match lines.recv_timeout(POLL_EVERY) {
                Ok(line) => break Some(line),
                Err(xch::RecvTimeoutError::Timeout) => {
                    if let Some(stop) = session.poll() {
                        print_auto_stop(&stop, json);
                    }
                }
                Err(xch::RecvTimeoutError::Disconnected) => break None,
            }
        };
        let Some(line) = line else { break };
        let input = line.trim();
        match input.to_ascii_lowercase().as_str() {
            "quit" | "exit" => break,
            "status" => {
                println!("{}", session.status_line());
                continue;
            }
            _ => {}
        }
        let reply = session.handle_input(input);
        print_reply(input, &reply, &session.status_line(), json);
    }

    if interrupted.load(Ordering::Relaxed) {
        tracing::info!("interrupted; shutting down");
    }
    let outcome = session.shutdown();
    tracing::info!(%outcome, "shutdown finished");
    Ok(())
}

/// Read stdin on a helper thread so the main loop can keep polling.
fn spawn_stdin_reader() -> eyre::Result<xch::Receiver<String>> {
    let (tx, rx) = xch::unbounded();
    std::thread::Builder::new()
        .name("ninja-stdin".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        })
        .map_err(|e| eyre::eyre!("failed to spawn stdin reader: {e}"))?;
    Ok(rx)
}
