//! Keyframe gait player over any servo bus.
//!
//! The same player drives the simulated body and, with the `hardware`
//! feature, the software-PWM servos on the Pi.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use ninja_traits::{CancelToken, Clock, Gait, GaitActuator, MonotonicClock, SpeedClass};

use crate::error::{HwError, Result};
use crate::gaits::{self, Keyframe, MAX_ANGLE_DEG, SERVO_COUNT, STAND_ANGLES};
use crate::util;

/// Something that can position one servo.
pub trait ServoBus: Send + Sync {
    fn write(&self, servo_id: u8, angle_deg: u16) -> Result<()>;
}

/// Check a servo request against the body's limits.
pub fn check_servo(servo_id: u8, angle_deg: u16) -> Result<usize> {
    let idx = usize::from(servo_id);
    if idx >= SERVO_COUNT {
        return Err(HwError::InvalidServo(servo_id));
    }
    if angle_deg > MAX_ANGLE_DEG {
        return Err(HwError::InvalidAngle(angle_deg));
    }
    Ok(idx)
}

/// Plays gait keyframes on a [`ServoBus`], holding each frame for its
/// duration scaled by `time_scale`.
pub struct KeyframeActuator<B: ServoBus> {
    bus: B,
    time_scale: f32,
    clock: MonotonicClock,
}

impl<B: ServoBus> KeyframeActuator<B> {
    pub fn with_bus(bus: B, time_scale: f32) -> Self {
        Self {
            bus,
            time_scale,
            clock: MonotonicClock::new(),
        }
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Apply one keyframe; returns false if cancelled during the hold.
    fn play_frame(&self, frame: &Keyframe, cancel: &CancelToken) -> Result<bool> {
        for &(id, angle) in frame.moves {
            self.bus.write(id, angle)?;
        }
        Ok(self
            .clock
            .nap(util::scaled(frame.hold_ms, self.time_scale), cancel))
    }

    fn run_continuous(&self, gait: Gait, speed: SpeedClass, cancel: &CancelToken) -> Result<()> {
        let frames = gaits::keyframes(gait);
        let mut cycles: u64 = 0;
        'outer: while !cancel.is_cancelled() {
            for frame in frames {
                if !self.play_frame(frame, cancel)? {
                    break 'outer;
                }
            }
            cycles += 1;
            self.clock.nap(speed.step_delay(), cancel);
        }
        tracing::debug!(%gait, cycles, "continuous gait finished");
        // Back to standing; the old token is set, so use a fresh one for the hold.
        self.play_frame(&gaits::stand_frame(), &CancelToken::new())?;
        Ok(())
    }

    fn run_sequence(&self, gait: Gait) -> Result<()> {
        let token = CancelToken::new();
        for frame in gaits::keyframes(gait) {
            self.play_frame(frame, &token)?;
        }
        Ok(())
    }
}

impl<B: ServoBus> GaitActuator for KeyframeActuator<B> {
    fn run_gait(
        &self,
        gait: Gait,
        speed: SpeedClass,
        style: Option<&str>,
        cancel: &CancelToken,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        tracing::info!(%gait, %speed, style, "gait start");
        if gait.is_continuous() {
            self.run_continuous(gait, speed, cancel)?;
        } else {
            self.run_sequence(gait)?;
        }
        Ok(())
    }

    fn set_servo_angle(
        &self,
        servo_id: u8,
        angle_deg: u16,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.bus.write(servo_id, angle_deg)?;
        Ok(())
    }
}

/// Where a simulated fault is injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SimFault {
    #[default]
    None,
    /// Every servo write fails.
    ServoBus,
}

/// In-memory servo bus: remembers commanded angles.
pub struct SimServos {
    angles: Mutex<[u16; SERVO_COUNT]>,
    fault: SimFault,
    writes: AtomicU64,
}

impl SimServos {
    pub fn new(fault: SimFault) -> Self {
        Self {
            angles: Mutex::new(STAND_ANGLES),
            fault,
            writes: AtomicU64::new(0),
        }
    }
}

impl ServoBus for SimServos {
    fn write(&self, servo_id: u8, angle_deg: u16) -> Result<()> {
        if self.fault == SimFault::ServoBus {
            return Err(HwError::Bus("simulated servo bus failure".into()));
        }
        let idx = check_servo(servo_id, angle_deg)?;
        let mut angles = self
            .angles
            .lock()
            .map_err(|_| HwError::Bus("servo state lock poisoned".into()))?;
        angles[idx] = angle_deg;
        self.writes.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(servo_id, angle_deg, "servo write (simulated)");
        Ok(())
    }
}

/// Simulated four-servo body.
pub type SimulatedActuator = KeyframeActuator<SimServos>;

impl KeyframeActuator<SimServos> {
    pub fn new(time_scale: f32) -> Self {
        Self::with_bus(SimServos::new(SimFault::None), time_scale)
    }

    pub fn with_fault(self, fault: SimFault) -> Self {
        Self::with_bus(SimServos::new(fault), self.time_scale)
    }

    /// Current commanded angle of every servo.
    pub fn angles(&self) -> [u16; SERVO_COUNT] {
        self.bus.angles.lock().map(|a| *a).unwrap_or(STAND_ANGLES)
    }

    /// Number of individual servo writes so far.
    pub fn writes(&self) -> u64 {
        self.bus.writes.load(Ordering::Relaxed)
    }
}

impl Default for KeyframeActuator<SimServos> {
    fn default() -> Self {
        Self::new(1.0)
    }
}
