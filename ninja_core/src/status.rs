//! Observable states and outcomes of the motion core.

use std::fmt;

use ninja_traits::Gait;

/// Snapshot reported by `MotionSupervisor::status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionStatus {
    Idle,
    Running(Gait),
    /// Supervisor still records the gait as active but its worker has exited.
    /// Reconciling (or stopping) clears it.
    Stale(Gait),
}

impl fmt::Display for MotionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionStatus::Idle => f.write_str("idle"),
            MotionStatus::Running(g) => write!(f, "running {g}"),
            MotionStatus::Stale(g) => write!(f, "stale {g}"),
        }
    }
}

/// Result of `stop_continuous`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    WasIdle,
    Stopped {
        gait: Gait,
        /// At least one bounded join elapsed before its task exited.
        timed_out: bool,
    },
}

/// Why a continuous gait ended without an external stop.
#[derive(Debug, Clone, PartialEq)]
pub enum StopCause {
    Obstacle { distance_cm: f32 },
    SensorFault,
    GaitFault(String),
    /// Worker returned or died without reporting a cause.
    GaitEnded,
}

/// A stop discovered and cleaned up by reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct AutoStop {
    pub gait: Gait,
    pub cause: StopCause,
}

impl fmt::Display for AutoStop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cause {
            StopCause::Obstacle { distance_cm } => {
                write!(f, "{} stopped: obstacle at {distance_cm:.1} cm", self.gait)
            }
            StopCause::SensorFault => write!(f, "{} stopped: range sensor fault", self.gait),
            StopCause::GaitFault(d) => write!(f, "{} stopped: {d}", self.gait),
            StopCause::GaitEnded => write!(f, "{} ended", self.gait),
        }
    }
}

/// Result of dispatching one action descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Executed,
    Rejected(String),
    Errored(String),
}

impl DispatchOutcome {
    pub fn is_executed(&self) -> bool {
        matches!(self, DispatchOutcome::Executed)
    }

    pub fn label(&self) -> &'static str {
        match self {
            DispatchOutcome::Executed => "executed",
            DispatchOutcome::Rejected(_) => "rejected",
            DispatchOutcome::Errored(_) => "errored",
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            DispatchOutcome::Executed => None,
            DispatchOutcome::Rejected(d) | DispatchOutcome::Errored(d) => Some(d),
        }
    }
}

impl fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchOutcome::Executed => f.write_str("executed"),
            DispatchOutcome::Rejected(r) => write!(f, "rejected: {r}"),
            DispatchOutcome::Errored(d) => write!(f, "errored: {d}"),
        }
    }
}
