use std::time::{Duration, Instant};

use crate::error::{HwError, Result};

/// Speed of sound in air at ~20 °C, in centimetres per second.
pub const SPEED_OF_SOUND_CM_PER_S: f32 = 34_300.0;

/// Wait until `is_high()` reports `want_high`, or the deadline passes.
///
/// Returns the instant the level was first observed. A zero `poll_interval`
/// spins, which echo timing needs for centimetre resolution.
pub fn wait_for_level_until(
    mut is_high: impl FnMut() -> bool,
    want_high: bool,
    deadline: Instant,
    poll_interval: Duration,
) -> Result<Instant> {
    loop {
        let now = Instant::now();
        if is_high() == want_high {
            return Ok(now);
        }
        if now >= deadline {
            return Err(HwError::EchoTimeout);
        }
        if !poll_interval.is_zero() {
            std::thread::sleep(poll_interval);
        }
    }
}

/// Convert a round-trip echo pulse width to a one-way distance.
#[inline]
pub fn echo_to_cm(pulse: Duration) -> f32 {
    pulse.as_secs_f32() * SPEED_OF_SOUND_CM_PER_S / 2.0
}

/// Scale a nominal hold time, never rounding a non-zero hold down to zero.
#[inline]
pub fn scaled(ms: u64, time_scale: f32) -> Duration {
    if ms == 0 {
        return Duration::ZERO;
    }
    let micros = (ms as f64 * 1000.0 * f64::from(time_scale)).round();
    Duration::from_micros((micros as u64).max(1))
}
