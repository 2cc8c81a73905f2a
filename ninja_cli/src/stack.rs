//! Assemble the dispatcher and interpreter for the selected backend.

use std::sync::Arc;

use ninja_config::{Config, Provider};
use ninja_core::{ActionDispatcher, CommandInterpreter, KeywordInterpreter, NinjaSession};

use crate::gemini::GeminiInterpreter;

/// Env var that injects a simulated servo-bus fault; used by integration tests.
pub const SIM_FAULT_ENV: &str = "NINJA_TEST_SIM_FAULT";

pub fn build_session(cfg: &Config) -> eyre::Result<NinjaSession> {
    let dispatcher = build_dispatcher(cfg)?;
    let interpreter = build_interpreter(cfg)?;
    Ok(NinjaSession::new(
        dispatcher,
        interpreter,
        cfg.robot.wake_word.clone(),
    ))
}

fn build_interpreter(cfg: &Config) -> eyre::Result<Box<dyn CommandInterpreter>> {
    match cfg.interpreter.provider {
        Provider::Keyword => {
            tracing::info!(provider = "keyword", "interpreter ready");
            Ok(Box::new(KeywordInterpreter::new()))
        }
        Provider::Gemini => {
            let g = GeminiInterpreter::from_config(&cfg.interpreter)?;
            tracing::info!(provider = "gemini", model = %cfg.interpreter.model, "interpreter ready");
            Ok(Box::new(g))
        }
    }
}

#[cfg(not(all(feature = "hardware", target_os = "linux")))]
fn build_dispatcher(cfg: &Config) -> eyre::Result<ActionDispatcher> {
    use ninja_hardware::{SimFault, SimulatedActuator, SimulatedBuzzer, SimulatedRangeSensor};

    let sim = &cfg.simulation;
    let fault = match std::env::var(SIM_FAULT_ENV).as_deref() {
        Ok("servo") => SimFault::ServoBus,
        _ => SimFault::None,
    };
    let actuator = SimulatedActuator::new(sim.time_scale).with_fault(fault);
    let sensor = SimulatedRangeSensor::new(sim.start_distance_cm, sim.approach_cm_per_sample);
    let buzzer = SimulatedBuzzer::new(sim.time_scale);
    tracing::info!(
        backend = "simulation",
        time_scale = sim.time_scale,
        start_distance_cm = sim.start_distance_cm,
        ?fault,
        "motion stack ready"
    );
    ninja_core::build_dispatcher(cfg, Arc::new(actuator), sensor, buzzer)
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
fn build_dispatcher(cfg: &Config) -> eyre::Result<ActionDispatcher> {
    use eyre::WrapErr;
    use ninja_hardware::PiActuator;
    use ninja_hardware::buzzer::PwmBuzzer;
    use ninja_hardware::hcsr04::Hcsr04;
    use ninja_hardware::servo::PwmServos;

    let servos = PwmServos::new(cfg.servos.pins).wrap_err("open servo pins")?;
    let actuator = PiActuator::with_bus(servos, 1.0);
    let sensor =
        Hcsr04::new(cfg.sensor.trig_pin, cfg.sensor.echo_pin).wrap_err("open hc-sr04 pins")?;
    let buzzer = PwmBuzzer::new(cfg.buzzer.pin).wrap_err("open buzzer pin")?;
    tracing::info!(
        backend = "hardware",
        servos = ?cfg.servos.pins,
        trig = cfg.sensor.trig_pin,
        echo = cfg.sensor.echo_pin,
        buzzer = cfg.buzzer.pin,
        "motion stack ready"
    );
    ninja_core::build_dispatcher(cfg, Arc::new(actuator), sensor, buzzer)
}
