//! `From` implementations bridging `ninja_config` types to `ninja_core` types.

use crate::config::{DispatchCfg, SupervisorCfg, WatchdogCfg};

// ── WatchdogCfg ──────────────────────────────────────────────────────────────

impl From<&ninja_config::Config> for WatchdogCfg {
    fn from(c: &ninja_config::Config) -> Self {
        Self {
            stop_threshold_cm: c.watchdog.stop_threshold_cm,
            poll_ms: c.watchdog.poll_ms,
            sensor_timeout_ms: c.sensor.read_timeout_ms,
            forward_only: c.watchdog.forward_only,
        }
    }
}

// ── SupervisorCfg ────────────────────────────────────────────────────────────

impl From<&ninja_config::Config> for SupervisorCfg {
    fn from(c: &ninja_config::Config) -> Self {
        Self {
            watchdog_join_ms: c.supervisor.watchdog_join_ms,
            gait_join_ms: c.supervisor.gait_join_ms,
            watchdog: WatchdogCfg::from(c),
        }
    }
}

// ── DispatchCfg ──────────────────────────────────────────────────────────────

impl From<&ninja_config::Dispatch> for DispatchCfg {
    fn from(c: &ninja_config::Dispatch) -> Self {
        Self {
            combo_settle_ms: c.combo_settle_ms,
            stop_pause_ms: c.stop_pause_ms,
            servo_count: c.servo_count,
            max_angle_deg: c.max_angle_deg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensor_timeout_comes_from_sensor_section() {
        let cfg = ninja_config::load_toml("[sensor]\nread_timeout_ms = 42\n[watchdog]\npoll_ms = 120")
            .unwrap();
        let sup = SupervisorCfg::from(&cfg);
        assert_eq!(sup.watchdog.sensor_timeout_ms, 42);
        assert_eq!(sup.watchdog.poll_ms, 120);
        assert_eq!(sup.gait_join_ms, 1000);
    }
}
