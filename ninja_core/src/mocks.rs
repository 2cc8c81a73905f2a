//! Instrumented collaborators for tests and dry runs.
//!
//! The actuator and sound stubs write into a shared [`TraceLog`] so tests can
//! assert ordering across collaborators (sound before motion, stop before
//! start) as well as counts.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ninja_traits::{CancelToken, Gait, GaitActuator, RangeSample, RangeSensor, SoundKey, SoundPlayer, SpeedClass};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// One observable collaborator call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trace {
    GaitStarted(Gait),
    GaitEnded(Gait),
    Servo(u8, u16),
    Sound(SoundKey),
}

/// Shared, append-only record of collaborator calls.
#[derive(Debug, Clone, Default)]
pub struct TraceLog(Arc<Mutex<Vec<Trace>>>);

impl TraceLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, t: Trace) {
        if let Ok(mut v) = self.0.lock() {
            v.push(t);
        }
    }

    pub fn snapshot(&self) -> Vec<Trace> {
        self.0.lock().map(|v| v.clone()).unwrap_or_default()
    }

    /// Index of the first entry equal to `t`.
    pub fn position(&self, t: &Trace) -> Option<usize> {
        self.snapshot().iter().position(|x| x == t)
    }

    pub fn count(&self, pred: impl Fn(&Trace) -> bool) -> usize {
        self.snapshot().iter().filter(|t| pred(t)).count()
    }
}

/// Actuator stub that counts concurrently running continuous gaits.
pub struct CountingActuator {
    log: TraceLog,
    running: AtomicUsize,
    max_running: AtomicUsize,
    cycle: Duration,
    one_shot: Duration,
    stop_lag: Duration,
    failing_gait: Option<Gait>,
    failing_servo: bool,
}

impl CountingActuator {
    pub fn new(log: TraceLog) -> Self {
        Self {
            log,
            running: AtomicUsize::new(0),
            max_running: AtomicUsize::new(0),
            cycle: Duration::from_millis(2),
            one_shot: Duration::from_millis(5),
            stop_lag: Duration::ZERO,
            failing_gait: None,
            failing_servo: false,
        }
    }

    /// Keep running for `lag` after the token is observed set.
    pub fn with_stop_lag(mut self, lag: Duration) -> Self {
        self.stop_lag = lag;
        self
    }

    pub fn with_one_shot(mut self, d: Duration) -> Self {
        self.one_shot = d;
        self
    }

    /// Make `gait` fail with a bus error.
    pub fn failing_gait(mut self, gait: Gait) -> Self {
        self.failing_gait = Some(gait);
        self
    }

    pub fn failing_servo(mut self) -> Self {
        self.failing_servo = true;
        self
    }

    /// Continuous gaits running right now.
    pub fn running(&self) -> usize {
        self.running.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneously running continuous gaits seen.
    pub fn max_concurrent(&self) -> usize {
        self.max_running.load(Ordering::SeqCst)
    }
}

impl GaitActuator for CountingActuator {
    fn run_gait(
        &self,
        gait: Gait,
        _speed: SpeedClass,
        _style: Option<&str>,
        cancel: &CancelToken,
    ) -> Result<(), BoxError> {
        self.log.push(Trace::GaitStarted(gait));
        if self.failing_gait == Some(gait) {
            self.log.push(Trace::GaitEnded(gait));
            return Err(Box::new(std::io::Error::other(format!(
                "servo bus error during {gait}"
            ))));
        }
        if gait.is_continuous() {
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_running.fetch_max(now, Ordering::SeqCst);
            while !cancel.is_cancelled() {
                std::thread::sleep(self.cycle);
            }
            std::thread::sleep(self.stop_lag);
            self.running.fetch_sub(1, Ordering::SeqCst);
        } else {
            std::thread::sleep(self.one_shot);
        }
        self.log.push(Trace::GaitEnded(gait));
        Ok(())
    }

    fn set_servo_angle(&self, servo_id: u8, angle_deg: u16) -> Result<(), BoxError> {
        if self.failing_servo {
            return Err(Box::new(std::io::Error::other("servo bus error")));
        }
        self.log.push(Trace::Servo(servo_id, angle_deg));
        Ok(())
    }
}

/// Range sensor that replays a script, then repeats its last sample.
pub struct ScriptedSensor {
    script: VecDeque<RangeSample>,
    last: RangeSample,
    samples: Arc<AtomicU64>,
}

impl ScriptedSensor {
    pub fn new(script: Vec<RangeSample>) -> Self {
        Self {
            script: script.into(),
            last: RangeSample::NoEcho,
            samples: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn always(sample: RangeSample) -> Self {
        Self::new(vec![sample])
    }

    /// `clear` samples far away, then one at `distance_cm`.
    pub fn obstacle_after(clear: usize, distance_cm: f32) -> Self {
        let mut script = vec![RangeSample::Distance(100.0); clear];
        script.push(RangeSample::Distance(distance_cm));
        Self::new(script)
    }

    /// Counter of `measure` calls, readable after the sensor is moved.
    pub fn counter(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.samples)
    }
}

impl RangeSensor for ScriptedSensor {
    fn measure(&mut self, _timeout: Duration) -> RangeSample {
        self.samples.fetch_add(1, Ordering::SeqCst);
        if let Some(s) = self.script.pop_front() {
            self.last = s;
        }
        self.last
    }
}

/// Sound player that records cues into the shared log.
pub struct RecordingSound {
    log: TraceLog,
}

impl RecordingSound {
    pub fn new(log: TraceLog) -> Self {
        Self { log }
    }
}

impl SoundPlayer for RecordingSound {
    fn play(&self, key: SoundKey) -> Result<(), BoxError> {
        self.log.push(Trace::Sound(key));
        Ok(())
    }
}
