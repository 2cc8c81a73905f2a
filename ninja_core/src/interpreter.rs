//! Command routing and interpretation.
//!
//! Input starting with the wake word is a command; anything else is a
//! question. A [`CommandInterpreter`] turns either into an [`Interpretation`].
//! [`KeywordInterpreter`] is the offline implementation; networked ones live
//! in the binary.

use ninja_traits::{Gait, SoundKey, SpeedClass};

use crate::action::ActionDescriptor;

/// What an interpreter made of one input.
#[derive(Debug, Clone, PartialEq)]
pub enum Interpretation {
    Answer(String),
    Action(ActionDescriptor),
    /// The interpreter failed or replied with something unreadable.
    Error(String),
}

pub trait CommandInterpreter {
    /// `is_command` is true when the input was addressed with the wake word.
    fn interpret(&self, text: &str, is_command: bool) -> Interpretation;
}

impl<T: CommandInterpreter + ?Sized> CommandInterpreter for Box<T> {
    fn interpret(&self, text: &str, is_command: bool) -> Interpretation {
        (**self).interpret(text, is_command)
    }
}

/// Classification of a raw input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutedInput<'a> {
    Empty,
    /// Wake word with nothing after it.
    WakeOnly,
    Command(&'a str),
    Question(&'a str),
}

/// Split `text` on a case-insensitive wake-word prefix.
///
/// The wake word must end at a word boundary, so "ninjas rock" is a question.
pub fn route_input<'a>(text: &'a str, wake_word: &str) -> RoutedInput<'a> {
    let text = text.trim();
    if text.is_empty() {
        return RoutedInput::Empty;
    }
    let wake = wake_word.trim();
    let addressed = !wake.is_empty()
        && text
            .get(..wake.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(wake));
    if !addressed {
        return RoutedInput::Question(text);
    }
    let rest = &text[wake.len()..];
    if rest.chars().next().is_some_and(char::is_alphanumeric) {
        return RoutedInput::Question(text);
    }
    let rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c.is_ascii_punctuation());
    let rest = rest.trim_end();
    if rest.is_empty() {
        RoutedInput::WakeOnly
    } else {
        RoutedInput::Command(rest)
    }
}

/// Prompt asking a language model for a structured action.
pub fn command_prompt(command: &str) -> String {
    let gaits = Gait::ALL
        .iter()
        .map(|g| g.name())
        .collect::<Vec<_>>()
        .join(", ");
    let sounds = SoundKey::ALL
        .iter()
        .map(|k| k.name())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "You control a small four-servo robot. Convert the user's command into a single JSON \
         object and reply with JSON only.\n\
         Fields: action_type (move|sound|combo|servo|unknown), move_function, speed \
         (slow|normal|fast), style, sound_keyword, servo_id, servo_angle, error.\n\
         move_function is one of: {gaits}.\n\
         sound_keyword is one of: {sounds}.\n\
         servo_id is 0-3 and servo_angle is 0-180.\n\
         If the command cannot be mapped, use action_type \"unknown\" and explain in error.\n\
         Command: {command}"
    )
}

/// Prompt for a short conversational answer.
pub fn answer_prompt(question: &str) -> String {
    format!(
        "You are Ninja, a small friendly robot. Answer briefly in one or two sentences.\n\
         Question: {question}"
    )
}

/// Offline interpreter that recognises a fixed set of phrases.
#[derive(Debug, Clone, Default)]
pub struct KeywordInterpreter;

impl KeywordInterpreter {
    pub fn new() -> Self {
        Self
    }

    fn parse_command(text: &str) -> ActionDescriptor {
        let lower = text.to_ascii_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .filter(|w| !w.is_empty())
            .collect();
        let has = |w: &str| words.contains(&w);
        let speed = if has("fast") || has("quick") || has("quickly") {
            SpeedClass::Fast
        } else if has("slow") || has("slowly") {
            SpeedClass::Slow
        } else {
            SpeedClass::Normal
        };
        let mv = |gait: Gait| ActionDescriptor::Move {
            gait,
            speed,
            style: None,
        };

        if has("servo") {
            let nums: Vec<i64> = words.iter().filter_map(|w| w.parse().ok()).collect();
            return match nums.as_slice() {
                [id, angle, ..] => ActionDescriptor::Servo {
                    servo_id: *id,
                    angle_degrees: *angle,
                },
                _ => ActionDescriptor::unknown("servo command needs an id and an angle"),
            };
        }
        if has("play") || has("sound") || has("beep") {
            let key = words
                .iter()
                .find_map(|w| SoundKey::lookup(w))
                .unwrap_or(SoundKey::FALLBACK);
            return ActionDescriptor::Sound { key };
        }
        if has("stop") || has("halt") || has("freeze") {
            return ActionDescriptor::stop();
        }
        if has("hello") || has("hi") || has("wave") || has("greet") {
            return ActionDescriptor::Combo {
                gait: Gait::Hello,
                speed,
                style: None,
                sound: SoundKey::Hello,
            };
        }
        let back = has("back") || has("backward") || has("backwards") || has("reverse");
        let left = has("left");
        let right = has("right");
        if has("rotate") || has("spin") {
            if left {
                return mv(Gait::RotateLeft);
            }
            if right {
                return mv(Gait::RotateRight);
            }
        }
        if has("turn") {
            if left {
                return mv(Gait::TurnLeftStep);
            }
            if right {
                return mv(Gait::TurnRightStep);
            }
        }
        if has("run") {
            return mv(if back { Gait::RunBack } else { Gait::Run });
        }
        if has("walk") || has("forward") || has("go") || back {
            return mv(if back { Gait::StepBack } else { Gait::Walk });
        }
        if has("rest") || has("sit") || has("sleep") {
            return mv(Gait::Rest);
        }
        if has("reset") || has("stand") {
            return mv(Gait::ResetServos);
        }
        ActionDescriptor::unknown(format!("not understood: {text}"))
    }
}

impl CommandInterpreter for KeywordInterpreter {
    fn interpret(&self, text: &str, is_command: bool) -> Interpretation {
        if is_command {
            Interpretation::Action(Self::parse_command(text))
        } else {
            Interpretation::Answer(
                "I can only follow commands right now. Start with my name to give one.".into(),
            )
        }
    }
}
