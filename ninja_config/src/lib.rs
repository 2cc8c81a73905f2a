#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the robot runtime.
//!
//! - `Config` and its sections are deserialized from TOML and validated.
//! - Every section has defaults, so an empty file is a valid simulator config.
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Robot {
    /// Prefix that marks an utterance as a command rather than a question.
    pub wake_word: String,
}

impl Default for Robot {
    fn default() -> Self {
        Self {
            wake_word: "ninja".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Sensor {
    /// HC-SR04 trigger pin (BCM)
    pub trig_pin: u8,
    /// HC-SR04 echo pin (BCM)
    pub echo_pin: u8,
    /// Give up waiting for an echo after this many ms. Also accepts "timeout_ms".
    #[serde(alias = "timeout_ms")]
    pub read_timeout_ms: u64,
}

impl Default for Sensor {
    fn default() -> Self {
        Self {
            trig_pin: 21,
            echo_pin: 22,
            read_timeout_ms: 100,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Watchdog {
    /// Stop when an obstacle is strictly closer than this (cm)
    pub stop_threshold_cm: f32,
    /// Sleep between range samples (ms)
    pub poll_ms: u64,
    /// Only guard forward gaits (walk/run). When false every continuous gait is guarded.
    pub forward_only: bool,
}

impl Default for Watchdog {
    fn default() -> Self {
        Self {
            stop_threshold_cm: 5.0,
            poll_ms: 150,
            forward_only: true,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Supervisor {
    /// Bounded wait for the watchdog thread on stop (ms)
    pub watchdog_join_ms: u64,
    /// Bounded wait for the gait worker on stop (ms)
    pub gait_join_ms: u64,
}

impl Default for Supervisor {
    fn default() -> Self {
        Self {
            watchdog_join_ms: 500,
            gait_join_ms: 1000,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Dispatch {
    /// Pause between a combo's sound cue and its motion (ms)
    pub combo_settle_ms: u64,
    /// Pause after stopping a gait before starting the next action (ms)
    pub stop_pause_ms: u64,
    /// Number of addressable servos (ids 0..servo_count)
    pub servo_count: u8,
    /// Largest accepted servo angle in degrees
    pub max_angle_deg: u16,
}

impl Default for Dispatch {
    fn default() -> Self {
        Self {
            combo_settle_ms: 300,
            stop_pause_ms: 200,
            servo_count: 4,
            max_angle_deg: 180,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Servos {
    /// BCM pins for servos 0..=3 (software PWM, 50 Hz).
    pub pins: [u8; 4],
}

impl Default for Servos {
    fn default() -> Self {
        Self {
            pins: [16, 17, 18, 19],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Buzzer {
    pub pin: u8,
}

impl Default for Buzzer {
    fn default() -> Self {
        Self { pin: 23 }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Offline phrase matcher
    #[default]
    Keyword,
    /// Google Gemini generateContent API
    Gemini,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Interpreter {
    pub provider: Provider,
    pub model: String,
    /// Environment variable holding the API key (the key itself never lives in config)
    pub api_key_env: String,
    pub endpoint: String,
    pub timeout_ms: u64,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self {
            provider: Provider::Keyword,
            model: "gemini-2.0-flash-lite".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout_ms: 15_000,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Simulation {
    /// Multiplier applied to simulated servo hold times (1.0 = real time)
    pub time_scale: f32,
    /// First distance reported by the simulated range sensor (cm)
    pub start_distance_cm: f32,
    /// Distance lost per simulated sample, emulating a wall ahead (cm)
    pub approach_cm_per_sample: f32,
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            start_distance_cm: 100.0,
            approach_cm_per_sample: 0.0,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub robot: Robot,
    pub sensor: Sensor,
    pub watchdog: Watchdog,
    pub supervisor: Supervisor,
    pub dispatch: Dispatch,
    pub servos: Servos,
    pub buzzer: Buzzer,
    pub interpreter: Interpreter,
    pub simulation: Simulation,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read, parse and validate a config file.
pub fn load_file(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {:?}: {}", path, e))?;
    let cfg = load_toml(&text).map_err(|e| eyre::eyre!("invalid configuration {:?}: {}", path, e))?;
    cfg.validate()?;
    Ok(cfg)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Robot
        if self.robot.wake_word.trim().is_empty() {
            eyre::bail!("robot.wake_word must not be empty");
        }

        // Sensor
        if self.sensor.trig_pin == self.sensor.echo_pin {
            eyre::bail!("sensor.trig_pin and sensor.echo_pin must differ");
        }
        if self.sensor.read_timeout_ms == 0 {
            eyre::bail!("sensor.read_timeout_ms must be >= 1");
        }

        // Watchdog
        if !(self.watchdog.stop_threshold_cm.is_finite() && self.watchdog.stop_threshold_cm > 0.0)
        {
            eyre::bail!("watchdog.stop_threshold_cm must be > 0");
        }
        if !(10..=1000).contains(&self.watchdog.poll_ms) {
            eyre::bail!("watchdog.poll_ms must be in [10, 1000]");
        }

        // Supervisor
        for (name, ms) in [
            ("supervisor.watchdog_join_ms", self.supervisor.watchdog_join_ms),
            ("supervisor.gait_join_ms", self.supervisor.gait_join_ms),
        ] {
            if !(1..=10_000).contains(&ms) {
                eyre::bail!("{name} must be in [1, 10000]");
            }
        }

        // Dispatch
        if !(1..=16).contains(&self.dispatch.servo_count) {
            eyre::bail!("dispatch.servo_count must be in [1, 16]");
        }
        if !(1..=360).contains(&self.dispatch.max_angle_deg) {
            eyre::bail!("dispatch.max_angle_deg must be in [1, 360]");
        }
        if self.dispatch.combo_settle_ms > 5_000 {
            eyre::bail!("dispatch.combo_settle_ms is unreasonably large (>5s)");
        }
        if self.dispatch.stop_pause_ms > 5_000 {
            eyre::bail!("dispatch.stop_pause_ms is unreasonably large (>5s)");
        }

        // Pins
        let mut pins: Vec<(&str, u8)> = vec![
            ("sensor.trig_pin", self.sensor.trig_pin),
            ("sensor.echo_pin", self.sensor.echo_pin),
            ("buzzer.pin", self.buzzer.pin),
        ];
        pins.extend(self.servos.pins.iter().map(|&p| ("servos.pins", p)));
        for (i, (name, pin)) in pins.iter().enumerate() {
            if *pin > 27 {
                eyre::bail!("{name} must be a BCM GPIO number in [0, 27]");
            }
            if let Some((other, _)) = pins[i + 1..].iter().find(|(_, q)| q == pin) {
                eyre::bail!("{name} and {other} share GPIO {pin}");
            }
        }

        // Interpreter
        if self.interpreter.provider == Provider::Gemini {
            if self.interpreter.model.trim().is_empty() {
                eyre::bail!("interpreter.model must be set for the gemini provider");
            }
            if self.interpreter.api_key_env.trim().is_empty() {
                eyre::bail!("interpreter.api_key_env must be set for the gemini provider");
            }
        }
        if self.interpreter.timeout_ms == 0 {
            eyre::bail!("interpreter.timeout_ms must be >= 1");
        }

        // Simulation
        if !(self.simulation.time_scale.is_finite() && self.simulation.time_scale > 0.0) {
            eyre::bail!("simulation.time_scale must be > 0");
        }
        if self.simulation.start_distance_cm.is_sign_negative() {
            eyre::bail!("simulation.start_distance_cm must be >= 0");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        Ok(())
    }
}
