//! Simulated and (behind the `hardware` feature) Raspberry Pi drivers for the
//! robot's servos, ultrasonic range sensor and buzzer.
pub mod actuator;
#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod buzzer;
pub mod error;
pub mod gaits;
#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod hcsr04;
#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod servo;
pub mod tunes;
pub mod util;

use std::sync::atomic::{AtomicU64, Ordering};

use ninja_traits::{Clock, MonotonicClock, RangeSample, RangeSensor, SoundKey, SoundPlayer};

pub use actuator::{KeyframeActuator, ServoBus, SimFault, SimServos, SimulatedActuator};

/// Four PWM servos on the Pi driven by the keyframe player.
#[cfg(all(feature = "hardware", target_os = "linux"))]
pub type PiActuator = KeyframeActuator<servo::PwmServos>;

/// Furthest distance an HC-SR04 reports before the echo is lost (cm).
pub const MAX_RANGE_CM: f32 = 400.0;

/// Simulated ultrasonic sensor: starts at a distance and optionally closes
/// in on a virtual wall by a fixed step per sample.
pub struct SimulatedRangeSensor {
    distance_cm: f32,
    approach_cm_per_sample: f32,
    samples: u64,
}

impl SimulatedRangeSensor {
    pub fn new(start_distance_cm: f32, approach_cm_per_sample: f32) -> Self {
        Self {
            distance_cm: start_distance_cm,
            approach_cm_per_sample,
            samples: 0,
        }
    }

    pub fn samples(&self) -> u64 {
        self.samples
    }
}

impl RangeSensor for SimulatedRangeSensor {
    fn measure(&mut self, _timeout: std::time::Duration) -> RangeSample {
        self.samples += 1;
        let d = self.distance_cm;
        self.distance_cm = (d - self.approach_cm_per_sample).max(0.0);
        if d > MAX_RANGE_CM {
            RangeSample::NoEcho
        } else {
            RangeSample::from_cm(d)
        }
    }
}

/// Buzzer stand-in that logs cues and waits out their duration.
pub struct SimulatedBuzzer {
    time_scale: f32,
    clock: MonotonicClock,
    played: AtomicU64,
}

impl SimulatedBuzzer {
    pub fn new(time_scale: f32) -> Self {
        Self {
            time_scale,
            clock: MonotonicClock::new(),
            played: AtomicU64::new(0),
        }
    }

    pub fn played(&self) -> u64 {
        self.played.load(Ordering::Relaxed)
    }
}

impl SoundPlayer for SimulatedBuzzer {
    fn play(&self, key: SoundKey) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        tracing::info!(sound = %key, notes = tunes::notes(key).len(), "buzzer (simulated)");
        self.clock
            .sleep(util::scaled(tunes::duration_ms(key), self.time_scale));
        self.played.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
