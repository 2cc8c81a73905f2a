#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Motion coordination core (hardware-agnostic).
//!
//! All hardware interactions go through the `ninja_traits` collaborator
//! traits (`GaitActuator`, `RangeSensor`, `SoundPlayer`).
//!
//! ## Architecture
//!
//! - **Supervisor**: owns the single "continuous gait in progress" state and
//!   the gait/watchdog worker threads (`supervisor` module)
//! - **Watchdog**: samples the range sensor during forward gaits and cancels
//!   the gait on obstacle or sensor fault (`watchdog` module)
//! - **Dispatcher**: ordering policy, validation and cues for each action
//!   descriptor (`dispatcher` module)
//! - **Interpretation**: wake-word routing, JSON action parsing, offline
//!   keyword interpreter (`interpreter`, `action` modules)
//!
//! ## Cancellation
//!
//! Workers stop cooperatively by polling a shared `CancelToken`. Nothing is
//! ever forcibly terminated; joins are bounded and a timeout is only logged.

pub mod action;
pub mod builder;
pub mod config;
pub mod conversions;
pub mod dispatcher;
pub mod error;
pub mod hw_error;
pub mod interpreter;
pub mod mocks;
pub mod session;
pub mod status;
pub mod supervisor;
pub mod util;
pub mod watchdog;

pub use action::{ActionDescriptor, parse_action_json};
pub use builder::DispatcherBuilder;
pub use config::{DispatchCfg, SupervisorCfg, WatchdogCfg};
pub use dispatcher::ActionDispatcher;
pub use error::{BuildError, NinjaError, Result};
pub use interpreter::{CommandInterpreter, Interpretation, KeywordInterpreter};
pub use session::{NinjaSession, SessionReply};
pub use status::{AutoStop, DispatchOutcome, MotionStatus, StopCause, StopOutcome};
pub use supervisor::MotionSupervisor;
pub use watchdog::{ObstacleWatchdog, WatchdogExit};

/// Build a dispatcher from a loaded configuration and concrete collaborators.
pub fn build_dispatcher(
    cfg: &ninja_config::Config,
    actuator: std::sync::Arc<dyn ninja_traits::GaitActuator>,
    sensor: impl ninja_traits::RangeSensor + Send + 'static,
    sound: impl ninja_traits::SoundPlayer + 'static,
) -> Result<ActionDispatcher> {
    ActionDispatcher::builder()
        .with_shared_actuator(actuator)
        .with_sensor(sensor)
        .with_sound(sound)
        .with_supervisor_cfg(SupervisorCfg::from(cfg))
        .with_dispatch_cfg(DispatchCfg::from(&cfg.dispatch))
        .build()
}
