//! Synchronous entry point from action descriptors to motion.
//!
//! The dispatcher applies the stop-before-start ordering policy, validates
//! servo requests, sequences combo cues ahead of motion and turns every
//! failure into an audible cue plus a [`DispatchOutcome`].

use std::sync::Arc;

use ninja_traits::{Clock, Gait, GaitClass, SoundKey, SoundPlayer, SpeedClass};

use crate::action::ActionDescriptor;
use crate::builder::{DispatcherBuilder, Missing};
use crate::config::DispatchCfg;
use crate::error::NinjaError;
use crate::status::{AutoStop, DispatchOutcome, MotionStatus, StopCause, StopOutcome};
use crate::supervisor::MotionSupervisor;
use crate::util::ms;

pub const NOT_INITIALIZED: &str = "not initialized";
pub const OUT_OF_RANGE: &str = "out of range";

/// Pause between the startup cue and the greeting gait.
const STARTUP_SETTLE_MS: u64 = 200;

/// Silent sound player, used when no buzzer is configured.
pub struct NoopSound;

impl SoundPlayer for NoopSound {
    fn play(&self, _key: SoundKey) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }
}

pub struct ActionDispatcher {
    pub(crate) supervisor: MotionSupervisor,
    pub(crate) sound: Arc<dyn SoundPlayer>,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
    pub(crate) cfg: DispatchCfg,
    pub(crate) initialized: bool,
}

impl core::fmt::Debug for ActionDispatcher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ActionDispatcher")
            .field("supervisor", &self.supervisor)
            .field("cfg", &self.cfg)
            .field("initialized", &self.initialized)
            .finish_non_exhaustive()
    }
}

impl ActionDispatcher {
    pub fn builder() -> DispatcherBuilder<Missing, Missing> {
        DispatcherBuilder::default()
    }

    pub fn supervisor(&self) -> &MotionSupervisor {
        &self.supervisor
    }

    pub fn status(&self) -> MotionStatus {
        self.supervisor.status()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn dispatch(&mut self, action: ActionDescriptor) -> DispatchOutcome {
        if !self.initialized {
            tracing::warn!(%action, "dispatch refused: hardware not initialized");
            return DispatchOutcome::Rejected(NOT_INITIALIZED.into());
        }
        self.poll();
        tracing::debug!(%action, "dispatching");

        let outcome = match action {
            ActionDescriptor::Move {
                gait: Gait::Stop, ..
            } => {
                self.supervisor.stop_continuous();
                DispatchOutcome::Executed
            }
            ActionDescriptor::Move { gait, speed, style } => {
                self.stop_before_motion(gait);
                self.run_motion(gait, speed, style)
            }
            ActionDescriptor::Sound { key } => match self.sound.play(key) {
                Ok(()) => DispatchOutcome::Executed,
                Err(e) => DispatchOutcome::Errored(format!("sound {key} failed: {e}")),
            },
            ActionDescriptor::Combo {
                gait,
                speed,
                style,
                sound,
            } => {
                self.stop_before_motion(gait);
                self.cue(sound);
                self.clock.sleep(ms(self.cfg.combo_settle_ms));
                if gait == Gait::Stop {
                    self.supervisor.stop_continuous();
                    DispatchOutcome::Executed
                } else {
                    self.run_motion(gait, speed, style)
                }
            }
            ActionDescriptor::Servo {
                servo_id,
                angle_degrees,
            } => self.position_servo(servo_id, angle_degrees),
            ActionDescriptor::Unknown { reason } => DispatchOutcome::Rejected(reason),
        };

        match &outcome {
            DispatchOutcome::Executed => tracing::info!("action executed"),
            DispatchOutcome::Rejected(r) => {
                tracing::info!(reason = %r, "action rejected");
                self.cue(SoundKey::No);
            }
            DispatchOutcome::Errored(d) => {
                tracing::error!(detail = %d, "action failed");
                self.cue(SoundKey::No);
            }
        }
        outcome
    }

    /// Reap gaits that ended on their own and play the matching cue.
    pub fn poll(&mut self) -> Option<AutoStop> {
        let stop = self.supervisor.reconcile()?;
        let cue = match &stop.cause {
            StopCause::Obstacle { .. } => Some(SoundKey::Stop),
            StopCause::SensorFault => Some(SoundKey::Danger),
            StopCause::GaitFault(_) => Some(SoundKey::No),
            StopCause::GaitEnded => None,
        };
        if let Some(key) = cue {
            self.cue(key);
        }
        tracing::info!(%stop, "motion ended without a stop request");
        Some(stop)
    }

    /// Greeting: `hello` cue, short settle, then the `hello` gait.
    pub fn startup(&mut self) -> DispatchOutcome {
        if !self.initialized {
            return DispatchOutcome::Rejected(NOT_INITIALIZED.into());
        }
        tracing::info!("startup sequence");
        self.cue(SoundKey::Hello);
        self.clock.sleep(ms(STARTUP_SETTLE_MS));
        self.one_shot(Gait::Hello, SpeedClass::Normal)
    }

    /// Stop and join, say goodbye, fold into the rest pose, then refuse further work.
    pub fn shutdown(&mut self) -> DispatchOutcome {
        if !self.initialized {
            return DispatchOutcome::Rejected(NOT_INITIALIZED.into());
        }
        tracing::info!("shutdown sequence");
        if let StopOutcome::Stopped { gait, timed_out } = self.supervisor.shutdown() {
            tracing::info!(%gait, timed_out, "stopped active gait for shutdown");
        }
        self.cue(SoundKey::Thanks);
        let outcome = self.one_shot(Gait::Rest, SpeedClass::Normal);
        self.initialized = false;
        outcome
    }

    /// Human-readable one-line status.
    pub fn status_line(&self) -> String {
        if !self.initialized {
            return "Hardware Not Initialized".into();
        }
        match self.supervisor.status() {
            MotionStatus::Running(g) if self.supervisor.has_watchdog() => {
                format!("Executing continuous movement: {g} (distance check active)")
            }
            MotionStatus::Running(g) => {
                format!("Executing continuous movement: {g} (no distance check)")
            }
            MotionStatus::Stale(_) => "Movement thread stopped unexpectedly.".into(),
            MotionStatus::Idle => "Idle / Standing".into(),
        }
    }

    /// Ordering policy: stop and join any active gait, then pause, before the next motion or cue.
    fn stop_before_motion(&mut self, next: Gait) {
        if self.supervisor.is_active() {
            let stopped = self.supervisor.stop_continuous();
            tracing::debug!(?stopped, %next, "stopped active gait before next motion");
            self.clock.sleep(ms(self.cfg.stop_pause_ms));
        }
    }

    fn run_motion(&mut self, gait: Gait, speed: SpeedClass, style: Option<String>) -> DispatchOutcome {
        match gait.class() {
            GaitClass::Continuous => match self.supervisor.start_continuous(gait, speed, style) {
                Ok(()) => DispatchOutcome::Executed,
                Err(NinjaError::Busy) => DispatchOutcome::Rejected("busy".into()),
                Err(e) => DispatchOutcome::Errored(e.to_string()),
            },
            GaitClass::SingleStep => self.one_shot(gait, speed),
            GaitClass::Stop => {
                self.supervisor.stop_continuous();
                DispatchOutcome::Executed
            }
        }
    }

    fn one_shot(&mut self, gait: Gait, speed: SpeedClass) -> DispatchOutcome {
        match self.supervisor.perform_one_shot(gait, speed) {
            Ok(()) => DispatchOutcome::Executed,
            Err(NinjaError::Rejected(r)) => DispatchOutcome::Rejected(r),
            Err(e) => self.emergency_stop(e),
        }
    }

    fn position_servo(&mut self, servo_id: i64, angle_degrees: i64) -> DispatchOutcome {
        if let Some(g) = self.supervisor.active_gait() {
            return DispatchOutcome::Rejected(format!(
                "{g} is running; servo positioning refused"
            ));
        }
        let id = u8::try_from(servo_id)
            .ok()
            .filter(|id| *id < self.cfg.servo_count);
        let angle = u16::try_from(angle_degrees)
            .ok()
            .filter(|a| *a <= self.cfg.max_angle_deg);
        let (Some(id), Some(angle)) = (id, angle) else {
            tracing::warn!(
                servo_id,
                angle_degrees,
                servo_count = self.cfg.servo_count,
                max_angle_deg = self.cfg.max_angle_deg,
                "servo request out of range"
            );
            return DispatchOutcome::Rejected(OUT_OF_RANGE.into());
        };
        match self.supervisor.position_servo(id, angle) {
            Ok(()) => DispatchOutcome::Executed,
            Err(NinjaError::Rejected(r)) => DispatchOutcome::Rejected(r),
            Err(e) => self.emergency_stop(e),
        }
    }

    /// Leave shared state consistent after an actuator fault. No retry.
    fn emergency_stop(&mut self, e: NinjaError) -> DispatchOutcome {
        tracing::error!(error = %e, "actuator fault; emergency stop");
        self.supervisor.stop_continuous();
        DispatchOutcome::Errored(e.to_string())
    }

    /// Fire-and-forget cue; failures are logged only.
    pub fn cue(&self, key: SoundKey) {
        if let Err(e) = self.sound.play(key) {
            tracing::warn!(%key, error = %e, "sound cue failed");
        }
    }
}

impl Drop for ActionDispatcher {
    fn drop(&mut self) {
        self.supervisor.shutdown();
    }
}
