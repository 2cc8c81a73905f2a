//! HC-SR04 ultrasonic ranger on two GPIO lines.

use std::time::{Duration, Instant};

use ninja_traits::{RangeSample, RangeSensor};
use rppal::gpio::{Gpio, InputPin, OutputPin};

use crate::error::{HwError, Result};
use crate::util::{echo_to_cm, wait_for_level_until};

/// Quiet time on the trigger line before each ping.
const TRIGGER_SETTLE: Duration = Duration::from_millis(20);
const TRIGGER_PULSE: Duration = Duration::from_micros(10);

pub struct Hcsr04 {
    trig: OutputPin,
    echo: InputPin,
}

impl Hcsr04 {
    pub fn new(trig_pin: u8, echo_pin: u8) -> Result<Self> {
        let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
        let mut trig = gpio
            .get(trig_pin)
            .map_err(|e| HwError::Gpio(format!("open trig pin {trig_pin}: {e}")))?
            .into_output();
        trig.set_low();
        let echo = gpio
            .get(echo_pin)
            .map_err(|e| HwError::Gpio(format!("open echo pin {echo_pin}: {e}")))?
            .into_input();
        Ok(Self { trig, echo })
    }

    /// Fire one ping and return the echo pulse width.
    pub fn ping(&mut self, timeout: Duration) -> Result<Duration> {
        self.trig.set_low();
        std::thread::sleep(TRIGGER_SETTLE);
        self.trig.set_high();
        std::thread::sleep(TRIGGER_PULSE);
        self.trig.set_low();

        let deadline = Instant::now() + timeout;
        let echo = &self.echo;
        let start = wait_for_level_until(|| echo.is_high(), true, deadline, Duration::ZERO)?;
        let end = wait_for_level_until(|| echo.is_high(), false, deadline, Duration::ZERO)?;
        Ok(end.saturating_duration_since(start))
    }
}

impl RangeSensor for Hcsr04 {
    fn measure(&mut self, timeout: Duration) -> RangeSample {
        match self.ping(timeout) {
            Ok(pulse) => {
                let cm = echo_to_cm(pulse);
                tracing::trace!(cm, "hc-sr04 sample");
                RangeSample::from_cm(cm)
            }
            Err(HwError::EchoTimeout) => RangeSample::NoEcho,
            Err(e) => {
                tracing::warn!(error = %e, "hc-sr04 read failed");
                RangeSample::Fault
            }
        }
    }
}
