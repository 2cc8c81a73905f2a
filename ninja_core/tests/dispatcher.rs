use std::sync::Arc;
use std::time::{Duration, Instant};

use ninja_core::mocks::{CountingActuator, RecordingSound, ScriptedSensor, Trace, TraceLog};
use ninja_core::{
    ActionDescriptor, ActionDispatcher, DispatchCfg, DispatchOutcome, MotionStatus, StopCause,
    SupervisorCfg, WatchdogCfg,
};
use ninja_traits::{Gait, RangeSample, SoundKey, SpeedClass};
use rstest::rstest;

struct Rig {
    dispatcher: ActionDispatcher,
    actuator: Arc<CountingActuator>,
    log: TraceLog,
}

fn rig_with(sensor: ScriptedSensor, make: impl FnOnce(TraceLog) -> CountingActuator) -> Rig {
    let log = TraceLog::new();
    let actuator = Arc::new(make(log.clone()));
    let dispatcher = ActionDispatcher::builder()
        .with_shared_actuator(actuator.clone())
        .with_sensor(sensor)
        .with_sound(RecordingSound::new(log.clone()))
        .with_supervisor_cfg(SupervisorCfg {
            watchdog: WatchdogCfg {
                poll_ms: 10,
                ..WatchdogCfg::default()
            },
            ..SupervisorCfg::default()
        })
        .with_dispatch_cfg(DispatchCfg {
            combo_settle_ms: 20,
            stop_pause_ms: 5,
            ..DispatchCfg::default()
        })
        .build()
        .unwrap();
    Rig {
        dispatcher,
        actuator,
        log,
    }
}

fn rig() -> Rig {
    rig_with(ScriptedSensor::always(RangeSample::NoEcho), CountingActuator::new)
}

fn mv(gait: Gait, speed: SpeedClass) -> ActionDescriptor {
    ActionDescriptor::Move {
        gait,
        speed,
        style: None,
    }
}

fn wait_until(timeout: Duration, mut f: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if f() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    f()
}

#[test]
fn walk_starts_with_watchdog() {
    let mut r = rig();
    assert_eq!(
        r.dispatcher.dispatch(mv(Gait::Walk, SpeedClass::Normal)),
        DispatchOutcome::Executed
    );
    assert_eq!(r.dispatcher.status(), MotionStatus::Running(Gait::Walk));
    assert!(r.dispatcher.supervisor().has_watchdog());
    assert!(r.dispatcher.status_line().contains("distance check active"));
}

#[test]
fn run_replaces_walk_after_join() {
    let mut r = rig();
    r.dispatcher.dispatch(mv(Gait::Walk, SpeedClass::Normal));
    assert_eq!(
        r.dispatcher.dispatch(mv(Gait::Run, SpeedClass::Fast)),
        DispatchOutcome::Executed
    );
    assert_eq!(r.dispatcher.status(), MotionStatus::Running(Gait::Run));
    assert!(r.dispatcher.supervisor().has_watchdog());

    let walk_ended = r.log.position(&Trace::GaitEnded(Gait::Walk)).unwrap();
    assert!(wait_until(Duration::from_millis(200), || {
        r.log.position(&Trace::GaitStarted(Gait::Run)).is_some()
    }));
    let run_started = r.log.position(&Trace::GaitStarted(Gait::Run)).unwrap();
    assert!(walk_ended < run_started);
    assert_eq!(r.actuator.max_concurrent(), 1);
}

#[rstest]
#[case(5, 90)]
#[case(-1, 90)]
#[case(0, 181)]
#[case(3, -5)]
fn out_of_range_servo_is_rejected_without_actuator_call(#[case] id: i64, #[case] angle: i64) {
    let mut r = rig();
    let out = r.dispatcher.dispatch(ActionDescriptor::Servo {
        servo_id: id,
        angle_degrees: angle,
    });
    assert_eq!(out, DispatchOutcome::Rejected("out of range".into()));
    assert_eq!(r.log.count(|t| matches!(t, Trace::Servo(..))), 0);
    assert_eq!(r.log.snapshot(), vec![Trace::Sound(SoundKey::No)]);
}

#[test]
fn servo_at_limits_is_forwarded() {
    let mut r = rig();
    for (id, angle) in [(0, 0), (3, 180)] {
        let out = r.dispatcher.dispatch(ActionDescriptor::Servo {
            servo_id: id,
            angle_degrees: angle,
        });
        assert_eq!(out, DispatchOutcome::Executed);
    }
    assert_eq!(
        r.log.snapshot(),
        vec![Trace::Servo(0, 0), Trace::Servo(3, 180)]
    );
}

#[test]
fn combo_plays_sound_before_motion() {
    let mut r = rig();
    let out = r.dispatcher.dispatch(ActionDescriptor::Combo {
        gait: Gait::Hello,
        speed: SpeedClass::Normal,
        style: None,
        sound: SoundKey::Hello,
    });
    assert_eq!(out, DispatchOutcome::Executed);
    let sound = r.log.position(&Trace::Sound(SoundKey::Hello)).unwrap();
    let motion = r.log.position(&Trace::GaitStarted(Gait::Hello)).unwrap();
    assert!(sound < motion);
}

#[test]
fn combo_stops_active_gait_before_cue() {
    let mut r = rig();
    r.dispatcher.dispatch(mv(Gait::Walk, SpeedClass::Normal));
    assert!(wait_until(Duration::from_millis(200), || r.actuator.running() == 1));
    let out = r.dispatcher.dispatch(ActionDescriptor::Combo {
        gait: Gait::Run,
        speed: SpeedClass::Fast,
        style: None,
        sound: SoundKey::Happy,
    });
    assert_eq!(out, DispatchOutcome::Executed);
    assert_eq!(r.dispatcher.status(), MotionStatus::Running(Gait::Run));

    let walk_ended = r.log.position(&Trace::GaitEnded(Gait::Walk)).unwrap();
    let cue = r.log.position(&Trace::Sound(SoundKey::Happy)).unwrap();
    assert!(walk_ended < cue, "cue played while walk was still running");
    assert!(wait_until(Duration::from_millis(200), || {
        r.log.position(&Trace::GaitStarted(Gait::Run)).is_some()
    }));
    let run_started = r.log.position(&Trace::GaitStarted(Gait::Run)).unwrap();
    assert!(cue < run_started);
    assert_eq!(r.actuator.max_concurrent(), 1);
}

#[test]
fn servo_while_moving_leaves_gait_untouched() {
    let mut r = rig();
    r.dispatcher.dispatch(mv(Gait::Walk, SpeedClass::Normal));
    let generation = r.dispatcher.supervisor().generation();
    let out = r.dispatcher.dispatch(ActionDescriptor::Servo {
        servo_id: 1,
        angle_degrees: 90,
    });
    assert!(matches!(out, DispatchOutcome::Rejected(_)));
    assert_eq!(r.dispatcher.status(), MotionStatus::Running(Gait::Walk));
    assert_eq!(r.dispatcher.supervisor().generation(), generation);
    assert!(wait_until(Duration::from_millis(200), || r.actuator.running() == 1));
    assert_eq!(r.log.count(|t| matches!(t, Trace::Servo(..))), 0);
    assert!(r.log.position(&Trace::GaitEnded(Gait::Walk)).is_none());
}

#[test]
fn single_step_stops_continuous_gait_first() {
    let mut r = rig();
    r.dispatcher.dispatch(mv(Gait::RotateLeft, SpeedClass::Normal));
    assert!(!r.dispatcher.supervisor().has_watchdog());
    assert_eq!(
        r.dispatcher.dispatch(mv(Gait::TurnRightStep, SpeedClass::Normal)),
        DispatchOutcome::Executed
    );
    assert_eq!(r.dispatcher.status(), MotionStatus::Idle);
    let rotate_ended = r.log.position(&Trace::GaitEnded(Gait::RotateLeft)).unwrap();
    let turn_started = r.log.position(&Trace::GaitStarted(Gait::TurnRightStep)).unwrap();
    assert!(rotate_ended < turn_started);
}

#[test]
fn stop_from_idle_is_silent() {
    let mut r = rig();
    assert_eq!(
        r.dispatcher.dispatch(ActionDescriptor::stop()),
        DispatchOutcome::Executed
    );
    assert_eq!(
        r.dispatcher.dispatch(ActionDescriptor::stop()),
        DispatchOutcome::Executed
    );
    assert!(r.log.snapshot().is_empty());
    assert_eq!(r.dispatcher.status_line(), "Idle / Standing");
}

#[test]
fn unknown_is_rejected_with_no_cue() {
    let mut r = rig();
    let out = r.dispatcher.dispatch(ActionDescriptor::unknown("gibberish"));
    assert_eq!(out, DispatchOutcome::Rejected("gibberish".into()));
    assert_eq!(r.log.snapshot(), vec![Trace::Sound(SoundKey::No)]);
}

#[test]
fn sound_only_touches_sound() {
    let mut r = rig();
    r.dispatcher.dispatch(mv(Gait::StepBack, SpeedClass::Slow));
    let out = r.dispatcher.dispatch(ActionDescriptor::Sound {
        key: SoundKey::Happy,
    });
    assert_eq!(out, DispatchOutcome::Executed);
    assert_eq!(r.dispatcher.status(), MotionStatus::Running(Gait::StepBack));
    assert!(r.log.position(&Trace::Sound(SoundKey::Happy)).is_some());
}

#[test]
fn actuator_fault_is_errored_and_state_stays_idle() {
    let mut r = rig_with(ScriptedSensor::always(RangeSample::NoEcho), |log| {
        CountingActuator::new(log).failing_gait(Gait::Hello)
    });
    let out = r.dispatcher.dispatch(mv(Gait::Hello, SpeedClass::Normal));
    assert!(matches!(out, DispatchOutcome::Errored(ref d) if d.contains("servo bus error")));
    assert_eq!(r.dispatcher.status(), MotionStatus::Idle);
    assert!(r.log.position(&Trace::Sound(SoundKey::No)).is_some());
}

#[test]
fn servo_fault_is_errored() {
    let mut r = rig_with(ScriptedSensor::always(RangeSample::NoEcho), |log| {
        CountingActuator::new(log).failing_servo()
    });
    let out = r.dispatcher.dispatch(ActionDescriptor::Servo {
        servo_id: 2,
        angle_degrees: 45,
    });
    assert!(matches!(out, DispatchOutcome::Errored(_)));
}

#[test]
fn obstacle_stop_is_reconciled_with_stop_cue() {
    let mut r = rig_with(ScriptedSensor::obstacle_after(2, 1.5), CountingActuator::new);
    r.dispatcher.dispatch(mv(Gait::Walk, SpeedClass::Fast));
    let mut auto = None;
    assert!(wait_until(Duration::from_millis(500), || {
        auto = r.dispatcher.poll();
        auto.is_some()
    }));
    let auto = auto.unwrap();
    assert_eq!(auto.gait, Gait::Walk);
    assert!(matches!(auto.cause, StopCause::Obstacle { .. }));
    assert_eq!(r.dispatcher.status(), MotionStatus::Idle);
    assert!(r.log.position(&Trace::Sound(SoundKey::Stop)).is_some());
}

#[test]
fn sensor_fault_plays_danger() {
    let mut r = rig_with(ScriptedSensor::always(RangeSample::Fault), CountingActuator::new);
    r.dispatcher.dispatch(mv(Gait::Run, SpeedClass::Normal));
    assert!(wait_until(Duration::from_millis(500), || r.dispatcher.poll().is_some()));
    assert!(r.log.position(&Trace::Sound(SoundKey::Danger)).is_some());
}

#[test]
fn uninitialized_dispatcher_refuses_everything_silently() {
    let log = TraceLog::new();
    let mut d = ActionDispatcher::builder()
        .with_actuator(CountingActuator::new(log.clone()))
        .with_sensor(ScriptedSensor::always(RangeSample::NoEcho))
        .with_sound(RecordingSound::new(log.clone()))
        .initialized(false)
        .build()
        .unwrap();
    for action in [
        mv(Gait::Walk, SpeedClass::Normal),
        ActionDescriptor::Sound { key: SoundKey::Yes },
        ActionDescriptor::unknown("x"),
    ] {
        assert_eq!(
            d.dispatch(action),
            DispatchOutcome::Rejected("not initialized".into())
        );
    }
    assert!(log.snapshot().is_empty());
    assert_eq!(d.status_line(), "Hardware Not Initialized");
}

#[test]
fn startup_then_shutdown_sequence() {
    let mut r = rig();
    assert_eq!(r.dispatcher.startup(), DispatchOutcome::Executed);
    r.dispatcher.dispatch(mv(Gait::Walk, SpeedClass::Normal));
    assert_eq!(r.dispatcher.shutdown(), DispatchOutcome::Executed);
    assert!(!r.dispatcher.is_initialized());
    assert_eq!(
        r.log.snapshot(),
        vec![
            Trace::Sound(SoundKey::Hello),
            Trace::GaitStarted(Gait::Hello),
            Trace::GaitEnded(Gait::Hello),
            Trace::GaitStarted(Gait::Walk),
            Trace::GaitEnded(Gait::Walk),
            Trace::Sound(SoundKey::Thanks),
            Trace::GaitStarted(Gait::Rest),
            Trace::GaitEnded(Gait::Rest),
        ]
    );
    assert_eq!(
        r.dispatcher.dispatch(mv(Gait::Walk, SpeedClass::Normal)),
        DispatchOutcome::Rejected("not initialized".into())
    );
}
