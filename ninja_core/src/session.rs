//! Text-in, reply-out session wrapping routing, interpretation and dispatch.

use std::fmt;

use ninja_traits::SoundKey;

use crate::action::ActionDescriptor;
use crate::dispatcher::ActionDispatcher;
use crate::interpreter::{CommandInterpreter, Interpretation, RoutedInput, route_input};
use crate::status::{AutoStop, DispatchOutcome};

/// What one line of input produced.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionReply {
    /// Blank input.
    Ignored,
    Answer(String),
    Dispatched {
        action: ActionDescriptor,
        outcome: DispatchOutcome,
    },
    /// Interpreter failure; the `no` cue has been played.
    NotUnderstood(String),
}

impl fmt::Display for SessionReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionReply::Ignored => Ok(()),
            SessionReply::Answer(a) => f.write_str(a),
            SessionReply::Dispatched { action, outcome } => write!(f, "{action}: {outcome}"),
            SessionReply::NotUnderstood(e) => write!(f, "not understood: {e}"),
        }
    }
}

pub struct NinjaSession {
    dispatcher: ActionDispatcher,
    interpreter: Box<dyn CommandInterpreter>,
    wake_word: String,
}

impl NinjaSession {
    pub fn new(
        dispatcher: ActionDispatcher,
        interpreter: Box<dyn CommandInterpreter>,
        wake_word: impl Into<String>,
    ) -> Self {
        Self {
            dispatcher,
            interpreter,
            wake_word: wake_word.into(),
        }
    }

    pub fn dispatcher(&self) -> &ActionDispatcher {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut ActionDispatcher {
        &mut self.dispatcher
    }

    pub fn handle_input(&mut self, text: &str) -> SessionReply {
        let (body, is_command) = match route_input(text, &self.wake_word) {
            RoutedInput::Empty => return SessionReply::Ignored,
            RoutedInput::WakeOnly => {
                return self.dispatch(ActionDescriptor::Sound { key: SoundKey::Yes });
            }
            RoutedInput::Command(c) => (c, true),
            RoutedInput::Question(q) => (q, false),
        };
        tracing::debug!(is_command, input = body, "interpreting");
        match self.interpreter.interpret(body, is_command) {
            Interpretation::Action(action) => self.dispatch(action),
            Interpretation::Answer(a) => SessionReply::Answer(a),
            Interpretation::Error(e) => {
                tracing::warn!(error = %e, "interpretation failed");
                self.dispatcher.cue(SoundKey::No);
                SessionReply::NotUnderstood(e)
            }
        }
    }

    pub fn poll(&mut self) -> Option<AutoStop> {
        self.dispatcher.poll()
    }

    pub fn status_line(&self) -> String {
        self.dispatcher.status_line()
    }

    pub fn startup(&mut self) -> DispatchOutcome {
        self.dispatcher.startup()
    }

    pub fn shutdown(&mut self) -> DispatchOutcome {
        self.dispatcher.shutdown()
    }

    fn dispatch(&mut self, action: ActionDescriptor) -> SessionReply {
        let outcome = self.dispatcher.dispatch(action.clone());
        SessionReply::Dispatched { action, outcome }
    }
}
