use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("gpio error: {0}")]
    Gpio(String),
    #[error("ultrasonic echo timeout")]
    EchoTimeout,
    #[error("servo id {0} out of range")]
    InvalidServo(u8),
    #[error("servo angle {0} out of range")]
    InvalidAngle(u16),
    #[error("servo bus fault: {0}")]
    Bus(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HwError>;
