//! Human-readable error descriptions and structured JSON error formatting.

use ninja_core::error::{BuildError, NinjaError};

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingActuator => {
                "What happened: No gait actuator was provided to the dispatcher.\nLikely causes: Servo driver failed to initialize or was not wired into the builder.\nHow to fix: Ensure the servo bus is created successfully and passed via with_actuator(...).".to_string()
            }
            BuildError::MissingSensor => {
                "What happened: No range sensor was provided to the dispatcher.\nLikely causes: HC-SR04 failed to initialize or was not wired into the builder.\nHow to fix: Ensure the sensor is created successfully and passed via with_sensor(...).".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    if let Some(ne) = err.downcast_ref::<NinjaError>() {
        return match ne {
            NinjaError::Interpretation(e) => format!(
                "What happened: The command could not be interpreted ({e}).\nLikely causes: Unrecognised phrasing or a malformed action JSON.\nHow to fix: Rephrase the command, e.g. `ninja walk`, or check the JSON fields (action_type, move_function, ...)."
            ),
            NinjaError::Busy => {
                "What happened: A continuous gait is already running.\nLikely causes: A previous movement was not stopped.\nHow to fix: Send `ninja stop` first.".to_string()
            }
            NinjaError::Rejected(r) => format!(
                "What happened: The action was rejected ({r}).\nLikely causes: Servo id or angle outside the allowed range, or a movement still in progress.\nHow to fix: Use servo ids below dispatch.servo_count and angles up to dispatch.max_angle_deg; stop movement before positioning servos."
            ),
            NinjaError::ActuatorFault(d) => format!(
                "What happened: The servos failed while moving ({d}).\nLikely causes: Loose servo wiring, brown-out, or missing GPIO permissions.\nHow to fix: Check the [servos] pins and power supply; movement has been stopped."
            ),
            NinjaError::SensorFault(d) => format!(
                "What happened: The distance sensor failed ({d}).\nLikely causes: Wrong TRIG/ECHO pins or timeout configured too low.\nHow to fix: Check [sensor] in the config and raise sensor.read_timeout_ms."
            ),
            other => format!(
                "What happened: {other}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    // String-based heuristics for errors coming from init or config
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("open servo pins")
        || lower.contains("open hc-sr04 pins")
        || lower.contains("open buzzer pin")
    {
        return "What happened: Failed to initialize hardware pins.\nLikely causes: Incorrect pin numbers or insufficient GPIO permissions.\nHow to fix: Fix the [servos], [sensor] and [buzzer] pins in the config; ensure the process has permission to access GPIO.".to_string();
    }

    if lower.contains("is not set") && lower.contains("gemini") {
        return format!(
            "What happened: The Gemini interpreter has no API key.\nLikely causes: {msg}.\nHow to fix: Export the key, or set interpreter.provider = \"keyword\" to run offline."
        );
    }

    if is_config_error(err) {
        return format!(
            "What happened: Configuration is invalid or incomplete ({msg}).\nLikely causes: A typo in the TOML or an out-of-range value.\nHow to fix: Edit the TOML config and try again."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable short name for JSON output.
pub fn reason_name(err: &eyre::Report) -> &'static str {
    if err.downcast_ref::<BuildError>().is_some() {
        return "Config";
    }
    match err.downcast_ref::<NinjaError>() {
        Some(NinjaError::Interpretation(_)) => "NotUnderstood",
        Some(NinjaError::Busy | NinjaError::Rejected(_)) => "Rejected",
        Some(NinjaError::ActuatorFault(_)) => "ActuatorFault",
        Some(NinjaError::SensorFault(_)) => "SensorFault",
        Some(NinjaError::Config(_)) => "Config",
        Some(NinjaError::State(_)) => "State",
        None if is_config_error(err) => "Config",
        None => "Error",
    }
}

/// Exit codes: 2 config, 3 not understood, 4 rejected, 5 actuator, 6 sensor, 1 other.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match reason_name(err) {
        "Config" => 2,
        "NotUnderstood" => 3,
        "Rejected" => 4,
        "ActuatorFault" => 5,
        "SensorFault" => 6,
        _ => 1,
    }
}

fn is_config_error(err: &eyre::Report) -> bool {
    let lower = err.to_string().to_ascii_lowercase();
    lower.contains("invalid configuration")
        || lower.contains("read config")
        || lower.contains("must ")
        || lower.contains("share gpio")
        || lower.contains("unreasonably large")
        || lower.contains("is not set")
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({ "reason": reason_name(err), "message": humanize(err) }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_maps_to_exit_4() {
        let err = eyre::Report::new(NinjaError::Rejected("out of range".into()));
        assert_eq!(exit_code_for_error(&err), 4);
        assert!(humanize(&err).contains("out of range"));
    }

    #[test]
    fn validation_message_is_config() {
        let err = eyre::eyre!("watchdog.poll_ms must be > 0");
        assert_eq!(exit_code_for_error(&err), 2);
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&err)).unwrap();
        assert_eq!(v["reason"], "Config");
    }

    #[test]
    fn unknown_error_is_generic() {
        let err = eyre::eyre!("boom");
        assert_eq!(exit_code_for_error(&err), 1);
        assert!(humanize(&err).starts_with("Something went wrong."));
    }
}
