//! Runtime configuration for the motion core.
//!
//! These are the structs the supervisor, watchdog and dispatcher consume.
//! They are separate from the TOML-deserialized config in `ninja_config`.

use std::time::Duration;

/// Obstacle watchdog tuning.
#[derive(Debug, Clone)]
pub struct WatchdogCfg {
    /// Stop when a valid sample is strictly below this distance (cm).
    pub stop_threshold_cm: f32,
    /// Sleep between samples (ms). Bounds obstacle-to-stop latency.
    pub poll_ms: u64,
    /// Per-sample echo timeout handed to the sensor (ms).
    pub sensor_timeout_ms: u64,
    /// Guard only forward gaits. When false every continuous gait gets a watchdog.
    pub forward_only: bool,
}

impl WatchdogCfg {
    #[inline]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_ms)
    }

    #[inline]
    pub fn sensor_timeout(&self) -> Duration {
        Duration::from_millis(self.sensor_timeout_ms)
    }
}

impl Default for WatchdogCfg {
    fn default() -> Self {
        Self {
            stop_threshold_cm: 5.0,
            poll_ms: 150,
            sensor_timeout_ms: 100,
            forward_only: true,
        }
    }
}

/// Bounded joins used by `stop_continuous`.
#[derive(Debug, Clone)]
pub struct SupervisorCfg {
    pub watchdog_join_ms: u64,
    pub gait_join_ms: u64,
    pub watchdog: WatchdogCfg,
}

impl Default for SupervisorCfg {
    fn default() -> Self {
        Self {
            watchdog_join_ms: 500,
            gait_join_ms: 1000,
            watchdog: WatchdogCfg::default(),
        }
    }
}

/// Dispatcher policy knobs.
#[derive(Debug, Clone)]
pub struct DispatchCfg {
    /// Pause between a combo's sound cue and its motion (ms).
    pub combo_settle_ms: u64,
    /// Pause after an ordering-policy stop before the next action (ms).
    pub stop_pause_ms: u64,
    /// Servo ids accepted are `0..servo_count`.
    pub servo_count: u8,
    /// Largest accepted servo angle (degrees).
    pub max_angle_deg: u16,
}

impl Default for DispatchCfg {
    fn default() -> Self {
        Self {
            combo_settle_ms: 300,
            stop_pause_ms: 200,
            servo_count: 4,
            max_angle_deg: 180,
        }
    }
}
