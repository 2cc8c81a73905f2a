//! Software-PWM hobby servos on four GPIO pins (50 Hz, 0.5..2.5 ms pulses).

use std::sync::Mutex;
use std::time::Duration;

use rppal::gpio::{Gpio, OutputPin};

use crate::actuator::{ServoBus, check_servo};
use crate::error::{HwError, Result};
use crate::gaits::{MAX_ANGLE_DEG, SERVO_COUNT};

/// Default BCM pins for servos 0..=3.
pub const DEFAULT_SERVO_PINS: [u8; SERVO_COUNT] = [16, 17, 18, 19];

const PERIOD: Duration = Duration::from_millis(20);
const MIN_PULSE_US: u64 = 500;
const MAX_PULSE_US: u64 = 2500;

/// Pulse width for `angle_deg`, linear across the servo's travel.
pub fn pulse_for(angle_deg: u16) -> Duration {
    let span = MAX_PULSE_US - MIN_PULSE_US;
    let angle = u64::from(angle_deg.min(MAX_ANGLE_DEG));
    let us = MIN_PULSE_US + span * angle / u64::from(MAX_ANGLE_DEG);
    Duration::from_micros(us)
}

pub struct PwmServos {
    pins: Mutex<Vec<OutputPin>>,
}

impl PwmServos {
    pub fn new(pins: [u8; SERVO_COUNT]) -> Result<Self> {
        let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
        let pins = pins
            .iter()
            .map(|&p| {
                gpio.get(p)
                    .map(rppal::gpio::Pin::into_output_low)
                    .map_err(|e| HwError::Gpio(format!("servo pin {p}: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            pins: Mutex::new(pins),
        })
    }
}

impl ServoBus for PwmServos {
    fn write(&self, servo_id: u8, angle_deg: u16) -> Result<()> {
        let idx = check_servo(servo_id, angle_deg)?;
        let mut pins = self
            .pins
            .lock()
            .map_err(|_| HwError::Bus("servo pins lock poisoned".into()))?;
        let pin = pins.get_mut(idx).ok_or(HwError::InvalidServo(servo_id))?;
        pin.set_pwm(PERIOD, pulse_for(angle_deg))
            .map_err(|e| HwError::Bus(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pulse_spans_travel() {
        assert_eq!(pulse_for(0), Duration::from_micros(500));
        assert_eq!(pulse_for(90), Duration::from_micros(1500));
        assert_eq!(pulse_for(180), Duration::from_micros(2500));
    }
}
