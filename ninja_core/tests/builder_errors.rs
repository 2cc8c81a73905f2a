use ninja_core::error::BuildError;
use ninja_core::mocks::{CountingActuator, ScriptedSensor, TraceLog};
use ninja_core::{ActionDispatcher, DispatchCfg, SupervisorCfg, WatchdogCfg};
use ninja_traits::RangeSample;
use rstest::rstest;

#[rstest]
fn missing_actuator_yields_typed_build_error() {
    let err = ActionDispatcher::builder()
        .with_sensor(ScriptedSensor::always(RangeSample::NoEcho))
        .try_build()
        .expect_err("should fail with MissingActuator");
    match err.downcast_ref::<BuildError>() {
        Some(BuildError::MissingActuator) => {}
        other => panic!("expected MissingActuator, got: {other:?}"),
    }
}

#[rstest]
fn missing_sensor_yields_typed_build_error() {
    let err = ActionDispatcher::builder()
        .with_actuator(CountingActuator::new(TraceLog::new()))
        .try_build()
        .expect_err("should fail with MissingSensor");
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::MissingSensor)
    ));
}

#[rstest]
#[case(SupervisorCfg { watchdog: WatchdogCfg { poll_ms: 0, ..WatchdogCfg::default() }, ..SupervisorCfg::default() }, DispatchCfg::default())]
#[case(SupervisorCfg { watchdog: WatchdogCfg { stop_threshold_cm: 0.0, ..WatchdogCfg::default() }, ..SupervisorCfg::default() }, DispatchCfg::default())]
#[case(SupervisorCfg::default(), DispatchCfg { servo_count: 0, ..DispatchCfg::default() })]
fn invalid_runtime_config_is_refused(#[case] sup: SupervisorCfg, #[case] dispatch: DispatchCfg) {
    let err = ActionDispatcher::builder()
        .with_actuator(CountingActuator::new(TraceLog::new()))
        .with_sensor(ScriptedSensor::always(RangeSample::NoEcho))
        .with_supervisor_cfg(sup)
        .with_dispatch_cfg(dispatch)
        .build()
        .expect_err("invalid config must be refused");
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::InvalidConfig(_))
    ));
}

#[test]
fn build_from_loaded_config() {
    let cfg = ninja_config::load_toml(
        "[watchdog]\nstop_threshold_cm = 12.5\n[dispatch]\nservo_count = 2",
    )
    .unwrap();
    let d = ninja_core::build_dispatcher(
        &cfg,
        std::sync::Arc::new(CountingActuator::new(TraceLog::new())),
        ScriptedSensor::always(RangeSample::NoEcho),
        ninja_core::dispatcher::NoopSound,
    )
    .unwrap();
    assert_eq!(d.supervisor().cfg().watchdog.stop_threshold_cm, 12.5);
    assert_eq!(d.status_line(), "Idle / Standing");
}

#[test]
fn dispatcher_without_sound_player_stays_silent() {
    let mut d = ActionDispatcher::builder()
        .with_actuator(CountingActuator::new(TraceLog::new()))
        .with_sensor(ScriptedSensor::always(RangeSample::NoEcho))
        .build()
        .unwrap();
    let out = d.dispatch(ninja_core::ActionDescriptor::Sound {
        key: ninja_traits::SoundKey::Happy,
    });
    assert_eq!(out, ninja_core::DispatchOutcome::Executed);
}
