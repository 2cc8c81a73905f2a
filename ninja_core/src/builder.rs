//! Type-state builder for `ActionDispatcher`.
//!
//! The builder enforces at compile time that the actuator and range sensor
//! are provided before `build()` is available. `try_build()` is always
//! available for dynamic checks.

use std::marker::PhantomData;
use std::sync::Arc;

use ninja_traits::{Clock, GaitActuator, MonotonicClock, RangeSensor, SoundPlayer};

use crate::config::{DispatchCfg, SupervisorCfg};
use crate::dispatcher::{ActionDispatcher, NoopSound};
use crate::error::{BuildError, Result};
use crate::supervisor::MotionSupervisor;
use crate::watchdog::{SharedSensor, share_sensor};

// ── Type-state markers ───────────────────────────────────────────────────────

#[derive(Default)]
pub struct Missing;
pub struct Set;

pub struct DispatcherBuilder<A, S> {
    actuator: Option<Arc<dyn GaitActuator>>,
    sensor: Option<SharedSensor>,
    sound: Option<Arc<dyn SoundPlayer>>,
    clock: Option<Arc<dyn Clock + Send + Sync>>,
    supervisor: SupervisorCfg,
    dispatch: DispatchCfg,
    initialized: bool,
    _a: PhantomData<A>,
    _s: PhantomData<S>,
}

impl Default for DispatcherBuilder<Missing, Missing> {
    fn default() -> Self {
        Self {
            actuator: None,
            sensor: None,
            sound: None,
            clock: None,
            supervisor: SupervisorCfg::default(),
            dispatch: DispatchCfg::default(),
            initialized: true,
            _a: PhantomData,
            _s: PhantomData,
        }
    }
}

impl<A, S> DispatcherBuilder<A, S> {
    pub fn with_sound(mut self, sound: impl SoundPlayer + 'static) -> Self {
        self.sound = Some(Arc::new(sound));
        self
    }

    pub fn with_supervisor_cfg(mut self, cfg: SupervisorCfg) -> Self {
        self.supervisor = cfg;
        self
    }

    pub fn with_dispatch_cfg(mut self, cfg: DispatchCfg) -> Self {
        self.dispatch = cfg;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Start uninitialised: every dispatch is refused until a new dispatcher is built.
    pub fn initialized(mut self, ready: bool) -> Self {
        self.initialized = ready;
        self
    }

    /// Validate and assemble regardless of type-state.
    pub fn try_build(self) -> Result<ActionDispatcher> {
        let actuator = self
            .actuator
            .ok_or_else(|| eyre::Report::new(BuildError::MissingActuator))?;
        let sensor = self
            .sensor
            .ok_or_else(|| eyre::Report::new(BuildError::MissingSensor))?;

        if self.supervisor.watchdog.poll_ms == 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "watchdog.poll_ms must be > 0",
            )));
        }
        let threshold = self.supervisor.watchdog.stop_threshold_cm;
        if threshold.is_nan() || threshold <= 0.0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "watchdog.stop_threshold_cm must be > 0",
            )));
        }
        if self.dispatch.servo_count == 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "dispatch.servo_count must be > 0",
            )));
        }

        let clock = self.clock.unwrap_or_else(|| Arc::new(MonotonicClock::new()));
        let supervisor =
            MotionSupervisor::with_clock(actuator, sensor, self.supervisor, Arc::clone(&clock));
        Ok(ActionDispatcher {
            supervisor,
            sound: self.sound.unwrap_or_else(|| Arc::new(NoopSound)),
            clock,
            cfg: self.dispatch,
            initialized: self.initialized,
        })
    }

    fn retag<A2, S2>(self) -> DispatcherBuilder<A2, S2> {
        DispatcherBuilder {
            actuator: self.actuator,
            sensor: self.sensor,
            sound: self.sound,
            clock: self.clock,
            supervisor: self.supervisor,
            dispatch: self.dispatch,
            initialized: self.initialized,
            _a: PhantomData,
            _s: PhantomData,
        }
    }
}

impl<S> DispatcherBuilder<Missing, S> {
    pub fn with_actuator(self, actuator: impl GaitActuator + 'static) -> DispatcherBuilder<Set, S> {
        self.with_shared_actuator(Arc::new(actuator))
    }

    /// Use an actuator the caller keeps a handle to (e.g. for inspection).
    pub fn with_shared_actuator(self, actuator: Arc<dyn GaitActuator>) -> DispatcherBuilder<Set, S> {
        let mut next = self.retag::<Set, S>();
        next.actuator = Some(actuator);
        next
    }
}

impl<A> DispatcherBuilder<A, Missing> {
    pub fn with_sensor(self, sensor: impl RangeSensor + Send + 'static) -> DispatcherBuilder<A, Set> {
        let mut next = self.retag::<A, Set>();
        next.sensor = Some(share_sensor(sensor));
        next
    }
}

impl DispatcherBuilder<Set, Set> {
    /// Build with compile-time guarantees that required collaborators are set.
    pub fn build(self) -> Result<ActionDispatcher> {
        self.try_build()
    }
}
