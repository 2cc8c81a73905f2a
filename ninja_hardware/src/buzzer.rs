//! Passive buzzer driven by rppal software PWM.

use std::sync::Mutex;
use std::time::Duration;

use ninja_traits::{SoundKey, SoundPlayer};
use rppal::gpio::{Gpio, OutputPin};

use crate::error::{HwError, Result};
use crate::tunes;

const DUTY_CYCLE: f64 = 0.5;

pub struct PwmBuzzer {
    pin: Mutex<OutputPin>,
}

impl PwmBuzzer {
    pub fn new(pin: u8) -> Result<Self> {
        let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
        let mut out = gpio
            .get(pin)
            .map_err(|e| HwError::Gpio(format!("open buzzer pin {pin}: {e}")))?
            .into_output();
        out.set_low();
        Ok(Self {
            pin: Mutex::new(out),
        })
    }

    fn play_notes(&self, key: SoundKey) -> Result<()> {
        let mut pin = self
            .pin
            .lock()
            .map_err(|_| HwError::Gpio("buzzer lock poisoned".into()))?;
        for &(freq, ms) in tunes::notes(key) {
            if freq == 0 {
                pin.clear_pwm().map_err(|e| HwError::Gpio(e.to_string()))?;
            } else {
                pin.set_pwm_frequency(f64::from(freq), DUTY_CYCLE)
                    .map_err(|e| HwError::Gpio(e.to_string()))?;
            }
            std::thread::sleep(Duration::from_millis(ms));
        }
        pin.clear_pwm().map_err(|e| HwError::Gpio(e.to_string()))?;
        pin.set_low();
        Ok(())
    }
}

impl SoundPlayer for PwmBuzzer {
    fn play(&self, key: SoundKey) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.play_notes(key)?;
        Ok(())
    }
}
