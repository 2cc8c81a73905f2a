//! Obstacle watchdog paired with forward continuous gaits.
//!
//! The watchdog owns no state of its own. It shares the gait's cancel token,
//! samples the range sensor at a fixed interval, and sets the token when it
//! sees something too close or the sensor fails. It never clears the token.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crossbeam_channel as xch;
use ninja_traits::{CancelToken, Clock, RangeSample, RangeSensor};

use crate::config::WatchdogCfg;

/// Range sensor shared between successive watchdogs.
///
/// A watchdog that outlives its bounded join still holds the lock only for a
/// single `measure` call, so the next one never waits longer than a sample.
pub type SharedSensor = Arc<Mutex<Box<dyn RangeSensor + Send>>>;

pub fn share_sensor(sensor: impl RangeSensor + Send + 'static) -> SharedSensor {
    Arc::new(Mutex::new(Box::new(sensor)))
}

/// Take one reading; a poisoned lock counts as a sensor fault.
pub fn sample(sensor: &SharedSensor, timeout: std::time::Duration) -> RangeSample {
    match sensor.lock() {
        Ok(mut s) => s.measure(timeout),
        Err(_) => RangeSample::Fault,
    }
}

/// Terminal states of the watchdog loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WatchdogExit {
    ObstacleDetected { distance_cm: f32 },
    /// The gait worker finished and set the token itself.
    GaitEnded,
    SensorFault,
    /// Someone other than the gait worker set the token.
    ExternalStop,
}

/// Supervisor-bound notification tagged with the arming generation.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionEvent {
    pub generation: u64,
    pub kind: MotionEventKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MotionEventKind {
    WatchdogExited(WatchdogExit),
    GaitFinished,
    GaitFaulted(String),
}

pub struct ObstacleWatchdog {
    sensor: SharedSensor,
    cfg: WatchdogCfg,
    cancel: CancelToken,
    gait_done: Arc<AtomicBool>,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl ObstacleWatchdog {
    pub fn new(
        sensor: SharedSensor,
        cfg: WatchdogCfg,
        cancel: CancelToken,
        gait_done: Arc<AtomicBool>,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self {
            sensor,
            cfg,
            cancel,
            gait_done,
            clock,
        }
    }

    /// Run the loop on the calling thread until a terminal state.
    pub fn run(&self) -> WatchdogExit {
        let timeout = self.cfg.sensor_timeout();
        let poll = self.cfg.poll_interval();
        let mut samples: u64 = 0;
        loop {
            if self.cancel.is_cancelled() {
                return if self.gait_done.load(Ordering::Acquire) {
                    WatchdogExit::GaitEnded
                } else {
                    WatchdogExit::ExternalStop
                };
            }

            samples += 1;
            // Sensors may build `Distance` directly; NaN or negative counts as a fault.
            let reading = match sample(&self.sensor, timeout) {
                RangeSample::Distance(d) => RangeSample::from_cm(d),
                other => other,
            };
            match reading {
                RangeSample::Fault => {
                    self.cancel.cancel();
                    tracing::warn!(samples, "range sensor fault; stopping gait");
                    return WatchdogExit::SensorFault;
                }
                RangeSample::Distance(d) if d < self.cfg.stop_threshold_cm => {
                    self.cancel.cancel();
                    tracing::info!(
                        distance_cm = d,
                        threshold_cm = self.cfg.stop_threshold_cm,
                        "obstacle detected; stopping gait"
                    );
                    return WatchdogExit::ObstacleDetected { distance_cm: d };
                }
                RangeSample::Distance(d) => tracing::trace!(distance_cm = d, "path clear"),
                RangeSample::NoEcho => tracing::trace!("no echo; path clear"),
            }

            // Wakes early on cancel; the check at the top decides the label.
            self.clock.nap(poll, &self.cancel);
        }
    }

    /// Spawn the loop on its own thread, reporting the exit on `events`.
    pub fn spawn(
        self,
        generation: u64,
        events: xch::Sender<MotionEvent>,
    ) -> std::io::Result<std::thread::JoinHandle<WatchdogExit>> {
        std::thread::Builder::new()
            .name("ninja-watchdog".into())
            .spawn(move || {
                let exit = self.run();
                tracing::debug!(generation, ?exit, "watchdog exited");
                // Receiver gone means the supervisor was dropped; nothing to tell.
                let _ = events.send(MotionEvent {
                    generation,
                    kind: MotionEventKind::WatchdogExited(exit),
                });
                exit
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::ScriptedSensor;
    use ninja_traits::MonotonicClock;

    fn watchdog(script: Vec<RangeSample>, cancel: &CancelToken) -> ObstacleWatchdog {
        let cfg = WatchdogCfg {
            poll_ms: 10,
            ..WatchdogCfg::default()
        };
        ObstacleWatchdog::new(
            share_sensor(ScriptedSensor::new(script)),
            cfg,
            cancel.clone(),
            Arc::new(AtomicBool::new(false)),
            Arc::new(MonotonicClock::new()),
        )
    }

    #[test]
    fn threshold_is_strict() {
        let cancel = CancelToken::new();
        let wd = watchdog(
            vec![RangeSample::Distance(5.0), RangeSample::Distance(4.9)],
            &cancel,
        );
        assert_eq!(
            wd.run(),
            WatchdogExit::ObstacleDetected { distance_cm: 4.9 }
        );
        assert!(cancel.is_cancelled());
    }

    #[test]
    fn invalid_distance_fails_closed() {
        for bad in [f32::NAN, f32::INFINITY, -3.0] {
            let cancel = CancelToken::new();
            let wd = watchdog(vec![RangeSample::Distance(bad)], &cancel);
            assert_eq!(wd.run(), WatchdogExit::SensorFault, "distance {bad}");
            assert!(cancel.is_cancelled());
        }
    }

    #[test]
    fn pre_cancelled_token_exits_without_sampling() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let wd = watchdog(vec![RangeSample::Fault], &cancel);
        assert_eq!(wd.run(), WatchdogExit::ExternalStop);
    }
}
