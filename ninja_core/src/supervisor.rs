//! Single-owner motion state machine.
//!
//! `MotionSupervisor` is the only place that spawns, cancels and reaps gait
//! workers and their watchdogs. At most one continuous gait (and at most one
//! watchdog) exists at a time; workers may set the shared cancel token but
//! only the supervisor replaces it, and only once the previous pair has been
//! joined or its bounded wait has elapsed.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use crossbeam_channel as xch;
use ninja_traits::{CancelToken, Clock, Gait, GaitActuator, MonotonicClock, RangeSample, SpeedClass};

use crate::config::SupervisorCfg;
use crate::error::{MotionResult, NinjaError};
use crate::hw_error::map_hw_error;
use crate::status::{AutoStop, MotionStatus, StopCause, StopOutcome};
use crate::util::{JoinOutcome, join_with_timeout, ms};
use crate::watchdog::{
    MotionEvent, MotionEventKind, ObstacleWatchdog, SharedSensor, WatchdogExit, sample,
};

struct ActiveMotion {
    gait: Gait,
    speed: SpeedClass,
    generation: u64,
    worker: JoinHandle<()>,
    watchdog: Option<JoinHandle<WatchdogExit>>,
}

pub struct MotionSupervisor {
    actuator: Arc<dyn GaitActuator>,
    sensor: SharedSensor,
    clock: Arc<dyn Clock + Send + Sync>,
    cfg: SupervisorCfg,
    cancel: CancelToken,
    active: Option<ActiveMotion>,
    generation: u64,
    events_tx: xch::Sender<MotionEvent>,
    events_rx: xch::Receiver<MotionEvent>,
}

impl core::fmt::Debug for MotionSupervisor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MotionSupervisor")
            .field("status", &self.status())
            .field("has_watchdog", &self.has_watchdog())
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl MotionSupervisor {
    pub fn new(actuator: Arc<dyn GaitActuator>, sensor: SharedSensor, cfg: SupervisorCfg) -> Self {
        Self::with_clock(actuator, sensor, cfg, Arc::new(MonotonicClock::new()))
    }

    pub fn with_clock(
        actuator: Arc<dyn GaitActuator>,
        sensor: SharedSensor,
        cfg: SupervisorCfg,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        let (events_tx, events_rx) = xch::unbounded();
        Self {
            actuator,
            sensor,
            clock,
            cfg,
            cancel: CancelToken::new(),
            active: None,
            generation: 0,
            events_tx,
            events_rx,
        }
    }

    pub fn cfg(&self) -> &SupervisorCfg {
        &self.cfg
    }

    /// Start a continuous gait on a worker thread.
    ///
    /// Returns `Busy` without touching state when a gait is already active.
    pub fn start_continuous(
        &mut self,
        gait: Gait,
        speed: SpeedClass,
        style: Option<String>,
    ) -> MotionResult<()> {
        if !gait.is_continuous() {
            return Err(NinjaError::Rejected(format!(
                "{gait} is not a continuous gait"
            )));
        }
        if self.active.is_some() {
            return Err(NinjaError::Busy);
        }

        // Previous pair is gone (joined or abandoned), so a fresh token is safe.
        let cancel = CancelToken::new();
        let gait_done = Arc::new(AtomicBool::new(false));
        let generation = self.generation + 1;

        let worker = {
            let actuator = Arc::clone(&self.actuator);
            let cancel = cancel.clone();
            let gait_done = Arc::clone(&gait_done);
            let events = self.events_tx.clone();
            std::thread::Builder::new()
                .name(format!("ninja-gait-{gait}"))
                .spawn(move || {
                    let res = actuator.run_gait(gait, speed, style.as_deref(), &cancel);
                    gait_done.store(true, Ordering::Release);
                    cancel.cancel();
                    let kind = match res {
                        Ok(()) => MotionEventKind::GaitFinished,
                        Err(e) => {
                            let err = map_hw_error(e.as_ref());
                            tracing::error!(%gait, error = %err, "gait worker failed");
                            MotionEventKind::GaitFaulted(err.to_string())
                        }
                    };
                    let _ = events.send(MotionEvent { generation, kind });
                })
                .map_err(|e| NinjaError::State(format!("failed to spawn gait worker: {e}")))?
        };

        let watchdog = if self.needs_watchdog(gait) {
            let wd = ObstacleWatchdog::new(
                Arc::clone(&self.sensor),
                self.cfg.watchdog.clone(),
                cancel.clone(),
                gait_done,
                Arc::clone(&self.clock),
            );
            match wd.spawn(generation, self.events_tx.clone()) {
                Ok(h) => Some(h),
                Err(e) => {
                    // Never run a forward gait blind.
                    cancel.cancel();
                    if join_with_timeout(worker, ms(self.cfg.gait_join_ms)).is_timed_out() {
                        tracing::warn!(%gait, "gait worker did not stop after watchdog spawn failure");
                    }
                    return Err(NinjaError::State(format!("failed to spawn watchdog: {e}")));
                }
            }
        } else {
            None
        };

        tracing::info!(
            %gait,
            %speed,
            generation,
            watchdog = watchdog.is_some(),
            "continuous gait started"
        );
        self.generation = generation;
        self.cancel = cancel;
        self.active = Some(ActiveMotion {
            gait,
            speed,
            generation,
            worker,
            watchdog,
        });
        Ok(())
    }

    /// Cancel the active gait and reap both tasks with bounded waits.
    ///
    /// Idempotent; from idle it only re-sets the already retired token.
    pub fn stop_continuous(&mut self) -> StopOutcome {
        self.cancel.cancel();
        let Some(m) = self.active.take() else {
            return StopOutcome::WasIdle;
        };

        let mut timed_out = false;
        if let Some(wd) = m.watchdog {
            match join_with_timeout(wd, ms(self.cfg.watchdog_join_ms)) {
                JoinOutcome::Joined(exit) => tracing::debug!(?exit, "watchdog joined"),
                JoinOutcome::Panicked => tracing::warn!(gait = %m.gait, "watchdog panicked"),
                JoinOutcome::TimedOut => {
                    timed_out = true;
                    tracing::warn!(
                        gait = %m.gait,
                        timeout_ms = self.cfg.watchdog_join_ms,
                        "watchdog did not exit in time; abandoning it"
                    );
                }
            }
        }
        match join_with_timeout(m.worker, ms(self.cfg.gait_join_ms)) {
            JoinOutcome::Joined(()) => {}
            JoinOutcome::Panicked => tracing::warn!(gait = %m.gait, "gait worker panicked"),
            JoinOutcome::TimedOut => {
                timed_out = true;
                tracing::warn!(
                    gait = %m.gait,
                    timeout_ms = self.cfg.gait_join_ms,
                    "gait worker did not exit in time; abandoning it"
                );
            }
        }

        tracing::info!(gait = %m.gait, speed = %m.speed, timed_out, "continuous gait stopped");
        StopOutcome::Stopped {
            gait: m.gait,
            timed_out,
        }
    }

    /// Run a single-step gait on the caller's thread.
    pub fn perform_one_shot(&mut self, gait: Gait, speed: SpeedClass) -> MotionResult<()> {
        if !gait.is_single_step() {
            return Err(NinjaError::Rejected(format!(
                "{gait} is not a single-step gait"
            )));
        }
        if let Some(m) = &self.active {
            return Err(NinjaError::Rejected(format!(
                "{} is running; stop it first",
                m.gait
            )));
        }
        tracing::info!(%gait, %speed, "single-step gait");
        // Single-step gaits ignore cancellation; the token only satisfies the signature.
        self.actuator
            .run_gait(gait, speed, None, &CancelToken::new())
            .map_err(|e| map_hw_error(e.as_ref()))
    }

    /// Position one servo. Refused while a continuous gait drives the bus.
    pub fn position_servo(&mut self, servo_id: u8, angle_deg: u16) -> MotionResult<()> {
        if let Some(m) = &self.active {
            return Err(NinjaError::Rejected(format!(
                "{} is running; servo positioning refused",
                m.gait
            )));
        }
        tracing::info!(servo_id, angle_deg, "servo positioning");
        self.actuator
            .set_servo_angle(servo_id, angle_deg)
            .map_err(|e| map_hw_error(e.as_ref()))
    }

    pub fn status(&self) -> MotionStatus {
        match &self.active {
            None => MotionStatus::Idle,
            Some(m) if m.worker.is_finished() => MotionStatus::Stale(m.gait),
            Some(m) => MotionStatus::Running(m.gait),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_gait(&self) -> Option<Gait> {
        self.active.as_ref().map(|m| m.gait)
    }

    /// Whether the active gait has a paired watchdog.
    pub fn has_watchdog(&self) -> bool {
        self.active.as_ref().is_some_and(|m| m.watchdog.is_some())
    }

    /// Generation of the most recently armed gait (0 before the first).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Take one range reading outside the watchdog, for diagnostics.
    pub fn sample_range(&self) -> RangeSample {
        sample(&self.sensor, self.cfg.watchdog.sensor_timeout())
    }

    /// Drain worker notifications and clean up a gait that ended on its own.
    ///
    /// Events from earlier generations are discarded. A worker that exited
    /// without reporting (panic) is reaped as `GaitEnded`.
    pub fn reconcile(&mut self) -> Option<AutoStop> {
        let current = self.active.as_ref().map(|m| m.generation)?;
        let mut cause = self.drain_events(current, None);

        if cause.is_none() && matches!(self.status(), MotionStatus::Stale(_)) {
            cause = Some(StopCause::GaitEnded);
        }
        let cause = cause?;
        let gait = self.active_gait()?;
        self.stop_continuous();
        // The watchdog is joined now, so its verdict is queued if it had one.
        let cause = self.drain_events(current, Some(cause)).unwrap_or(StopCause::GaitEnded);
        tracing::info!(%gait, ?cause, "reconciled stopped gait");
        Some(AutoStop { gait, cause })
    }

    fn drain_events(&self, generation: u64, mut cause: Option<StopCause>) -> Option<StopCause> {
        for ev in self.events_rx.try_iter() {
            if ev.generation != generation {
                tracing::trace!(generation = ev.generation, "discarding stale motion event");
                continue;
            }
            let this = match ev.kind {
                MotionEventKind::WatchdogExited(WatchdogExit::ObstacleDetected { distance_cm }) => {
                    Some(StopCause::Obstacle { distance_cm })
                }
                MotionEventKind::WatchdogExited(WatchdogExit::SensorFault) => {
                    Some(StopCause::SensorFault)
                }
                MotionEventKind::WatchdogExited(_) => None,
                MotionEventKind::GaitFaulted(d) => Some(StopCause::GaitFault(d)),
                MotionEventKind::GaitFinished => Some(StopCause::GaitEnded),
            };
            cause = match (cause, this) {
                (None, c) => c,
                // A specific cause wins over a plain `GaitEnded`.
                (Some(StopCause::GaitEnded), Some(c)) => Some(c),
                (c, _) => c,
            };
        }
        cause
    }

    /// Stop and join everything; called on the main path before exit.
    pub fn shutdown(&mut self) -> StopOutcome {
        let out = self.stop_continuous();
        // Drop anything the workers reported on their way out.
        for _ in self.events_rx.try_iter() {}
        out
    }

    fn needs_watchdog(&self, gait: Gait) -> bool {
        gait.is_forward() || !self.cfg.watchdog.forward_only
    }
}

impl Drop for MotionSupervisor {
    fn drop(&mut self) {
        if self.active.is_some() {
            tracing::debug!("supervisor dropped with active gait; stopping");
            self.stop_continuous();
        }
    }
}
