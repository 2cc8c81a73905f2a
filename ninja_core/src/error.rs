use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NinjaError {
    #[error("interpretation error: {0}")]
    Interpretation(String),
    #[error("motion supervisor busy: a continuous gait is already active")]
    Busy,
    #[error("rejected: {0}")]
    Rejected(String),
    #[error("actuator fault: {0}")]
    ActuatorFault(String),
    #[error("sensor fault: {0}")]
    SensorFault(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("invalid state: {0}")]
    State(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing gait actuator")]
    MissingActuator,
    #[error("missing range sensor")]
    MissingSensor,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

/// Typed result for supervisor and dispatcher transitions.
pub type MotionResult<T> = std::result::Result<T, NinjaError>;

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
