//! Collaborator boundaries for the robot's motion core.
//!
//! The core never touches GPIO, PWM or servo buses directly. Everything
//! physical sits behind these traits so the supervisor can be exercised with
//! simulated or instrumented stand-ins.
pub mod cancel;
pub mod clock;
pub mod motion;

pub use cancel::CancelToken;
pub use clock::{Clock, MonotonicClock};
pub use motion::{Gait, GaitClass, RangeSample, SoundKey, SpeedClass};

/// Drives the servos through gaits and direct positioning.
///
/// Shared between the caller thread and the gait worker, hence `&self`;
/// implementations serialise bus access internally.
pub trait GaitActuator: Send + Sync {
    /// Run `gait` to completion.
    ///
    /// Continuous gaits loop until `cancel` is observed set, polling it at
    /// least once per cycle. Single-step gaits run their bounded sequence and
    /// may ignore the token.
    fn run_gait(
        &self,
        gait: Gait,
        speed: SpeedClass,
        style: Option<&str>,
        cancel: &CancelToken,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Move a single servo to `angle_deg`.
    fn set_servo_angle(
        &self,
        servo_id: u8,
        angle_deg: u16,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Forward-facing distance sensor.
pub trait RangeSensor {
    /// Take one reading, giving up on the echo after `timeout`.
    fn measure(&mut self, timeout: std::time::Duration) -> RangeSample;
}

/// Buzzer cue output.
pub trait SoundPlayer: Send + Sync {
    fn play(&self, key: SoundKey) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
