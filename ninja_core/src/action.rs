//! Structured action descriptors and the parser for interpreter output.
//!
//! Interpreters answer with a small JSON object. The parser accepts either the
//! bare object or one wrapped in a fenced ```json block, and maps anything it
//! can read but not act on to [`ActionDescriptor::Unknown`].

use std::fmt;

use ninja_traits::{Gait, SoundKey, SpeedClass};
use serde::Deserialize;

use crate::error::NinjaError;

/// One concrete directive produced from a natural-language command.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionDescriptor {
    Move {
        gait: Gait,
        speed: SpeedClass,
        style: Option<String>,
    },
    Sound {
        key: SoundKey,
    },
    /// Sound cue first, then the embedded move.
    Combo {
        gait: Gait,
        speed: SpeedClass,
        style: Option<String>,
        sound: SoundKey,
    },
    /// Raw values as received; range checks belong to the dispatcher.
    Servo {
        servo_id: i64,
        angle_degrees: i64,
    },
    Unknown {
        reason: String,
    },
}

impl ActionDescriptor {
    /// Shorthand for a move at `normal` speed without style.
    pub fn move_to(gait: Gait) -> Self {
        ActionDescriptor::Move {
            gait,
            speed: SpeedClass::Normal,
            style: None,
        }
    }

    pub fn stop() -> Self {
        Self::move_to(Gait::Stop)
    }

    pub fn unknown(reason: impl Into<String>) -> Self {
        ActionDescriptor::Unknown {
            reason: reason.into(),
        }
    }

    /// Gait this descriptor would drive, if any.
    pub fn gait(&self) -> Option<Gait> {
        match self {
            ActionDescriptor::Move { gait, .. } | ActionDescriptor::Combo { gait, .. } => {
                Some(*gait)
            }
            _ => None,
        }
    }
}

impl fmt::Display for ActionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionDescriptor::Move { gait, speed, style } => {
                write!(f, "move {gait} ({speed})")?;
                if let Some(s) = style {
                    write!(f, " style={s}")?;
                }
                Ok(())
            }
            ActionDescriptor::Sound { key } => write!(f, "sound {key}"),
            ActionDescriptor::Combo {
                gait, speed, sound, ..
            } => write!(f, "combo {sound} + {gait} ({speed})"),
            ActionDescriptor::Servo {
                servo_id,
                angle_degrees,
            } => write!(f, "servo {servo_id} -> {angle_degrees}deg"),
            ActionDescriptor::Unknown { reason } => write!(f, "unknown ({reason})"),
        }
    }
}

/// Wire shape of an interpreter reply. Every field is optional; the
/// `action_type` decides which ones matter.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawAction {
    action_type: Option<String>,
    move_function: Option<String>,
    speed: Option<String>,
    style: Option<String>,
    sound_keyword: Option<String>,
    servo_id: Option<serde_json::Value>,
    servo_angle: Option<serde_json::Value>,
    error: Option<String>,
}

/// Parse interpreter output into a descriptor.
///
/// Returns `NinjaError::Interpretation` only when no JSON object can be read
/// at all. Readable but unusable replies become `ActionDescriptor::Unknown`.
pub fn parse_action_json(text: &str) -> Result<ActionDescriptor, NinjaError> {
    let trimmed = text.trim();
    let raw: RawAction = match serde_json::from_str(trimmed) {
        Ok(r) => r,
        Err(first) => {
            let Some(block) = extract_fenced_json(trimmed) else {
                return Err(NinjaError::Interpretation(format!(
                    "reply is not JSON: {first}"
                )));
            };
            serde_json::from_str(block).map_err(|e| {
                NinjaError::Interpretation(format!("fenced JSON block is malformed: {e}"))
            })?
        }
    };
    Ok(raw.into_descriptor())
}

/// Body of the first ```json fenced block, if there is one.
pub fn extract_fenced_json(text: &str) -> Option<&str> {
    const OPEN: &str = "```json";
    const CLOSE: &str = "```";
    let start = text.find(OPEN)? + OPEN.len();
    let rest = &text[start..];
    let end = rest.find(CLOSE)?;
    let body = rest[..end].trim();
    (body.starts_with('{') && body.ends_with('}')).then_some(body)
}

fn int_field(v: Option<&serde_json::Value>) -> Option<i64> {
    match v? {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn norm(s: Option<&str>) -> Option<String> {
    s.map(|s| s.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty())
}

impl RawAction {
    fn into_descriptor(self) -> ActionDescriptor {
        let kind = norm(self.action_type.as_deref()).unwrap_or_default();
        let speed = SpeedClass::from_keyword(self.speed.as_deref());
        let style = self.style.filter(|s| !s.trim().is_empty());
        let sound = norm(self.sound_keyword.as_deref()).map(|k| SoundKey::from_keyword(&k));

        match kind.as_str() {
            "move" | "combo" => {
                let Some(name) = norm(self.move_function.as_deref()) else {
                    return ActionDescriptor::unknown("missing move_function");
                };
                let Ok(gait) = name.parse::<Gait>() else {
                    return ActionDescriptor::unknown(format!("unknown move function '{name}'"));
                };
                match (kind.as_str(), sound) {
                    ("combo", Some(sound)) => ActionDescriptor::Combo {
                        gait,
                        speed,
                        style,
                        sound,
                    },
                    ("combo", None) => ActionDescriptor::Combo {
                        gait,
                        speed,
                        style,
                        sound: SoundKey::FALLBACK,
                    },
                    _ => ActionDescriptor::Move { gait, speed, style },
                }
            }
            "sound" => ActionDescriptor::Sound {
                key: sound.unwrap_or(SoundKey::FALLBACK),
            },
            "servo" => {
                match (
                    int_field(self.servo_id.as_ref()),
                    int_field(self.servo_angle.as_ref()),
                ) {
                    (Some(servo_id), Some(angle_degrees)) => ActionDescriptor::Servo {
                        servo_id,
                        angle_degrees,
                    },
                    _ => ActionDescriptor::unknown("servo command needs integer servo_id and servo_angle"),
                }
            }
            "unknown" => ActionDescriptor::unknown(
                self.error
                    .filter(|e| !e.trim().is_empty())
                    .unwrap_or_else(|| "command not understood".into()),
            ),
            "" => ActionDescriptor::unknown("missing action_type"),
            other => ActionDescriptor::unknown(format!("unsupported action_type '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_block_is_extracted() {
        let text = "Sure!\n```json\n{\"action_type\": \"sound\"}\n```\nbye";
        assert_eq!(extract_fenced_json(text), Some("{\"action_type\": \"sound\"}"));
        assert_eq!(extract_fenced_json("```json\nnot an object\n```"), None);
        assert_eq!(extract_fenced_json("```json {\"a\":1}"), None);
    }

    #[test]
    fn numeric_strings_are_accepted_for_servo_fields() {
        let d = parse_action_json(r#"{"action_type":"servo","servo_id":"2","servo_angle":45}"#)
            .unwrap();
        assert_eq!(
            d,
            ActionDescriptor::Servo {
                servo_id: 2,
                angle_degrees: 45
            }
        );
    }
}
