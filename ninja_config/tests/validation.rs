use ninja_config::{Provider, load_file, load_toml};
use rstest::rstest;
use std::fs;
use tempfile::tempdir;

#[test]
fn empty_file_is_a_valid_simulator_config() {
    let cfg = load_toml("").expect("parse TOML");
    cfg.validate().expect("defaults must validate");
    assert_eq!(cfg.robot.wake_word, "ninja");
    assert_eq!(cfg.watchdog.poll_ms, 150);
    assert!((cfg.watchdog.stop_threshold_cm - 5.0).abs() < f32::EPSILON);
    assert!(cfg.watchdog.forward_only);
    assert_eq!(cfg.dispatch.servo_count, 4);
    assert_eq!(cfg.interpreter.provider, Provider::Keyword);
}

#[test]
fn accepts_full_config() {
    let toml = r#"
[robot]
wake_word = "otto"

[sensor]
trig_pin = 21
echo_pin = 22
timeout_ms = 80

[watchdog]
stop_threshold_cm = 8.5
poll_ms = 100
forward_only = false

[supervisor]
watchdog_join_ms = 400
gait_join_ms = 900

[dispatch]
combo_settle_ms = 250
stop_pause_ms = 150
servo_count = 4
max_angle_deg = 180

[interpreter]
provider = "gemini"
model = "gemini-2.0-flash-lite"
api_key_env = "NINJA_KEY"

[simulation]
time_scale = 0.01

[logging]
level = "debug"
rotation = "daily"
"#;
    let cfg = load_toml(toml).expect("parse TOML");
    cfg.validate().expect("valid config should pass");
    assert_eq!(cfg.sensor.read_timeout_ms, 80);
    assert!(!cfg.watchdog.forward_only);
    assert_eq!(cfg.interpreter.provider, Provider::Gemini);
}

#[rstest]
#[case("[watchdog]\npoll_ms = 0", "watchdog.poll_ms")]
#[case("[watchdog]\npoll_ms = 5000", "watchdog.poll_ms")]
#[case("[watchdog]\nstop_threshold_cm = 0.0", "stop_threshold_cm")]
#[case("[supervisor]\ngait_join_ms = 0", "supervisor.gait_join_ms")]
#[case("[dispatch]\nservo_count = 0", "dispatch.servo_count")]
#[case("[robot]\nwake_word = \"  \"", "wake_word")]
#[case("[sensor]\ntrig_pin = 22\necho_pin = 22", "must differ")]
#[case("[servos]\npins = [16, 17, 18, 23]", "share GPIO 23")]
#[case("[buzzer]\npin = 40", "buzzer.pin")]
#[case("[simulation]\ntime_scale = 0.0", "time_scale")]
#[case("[logging]\nrotation = \"weekly\"", "logging.rotation")]
fn rejects_out_of_range_values(#[case] toml: &str, #[case] needle: &str) {
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should be rejected");
    assert!(
        format!("{err}").contains(needle),
        "expected '{needle}' in '{err}'"
    );
}

#[test]
fn unknown_provider_fails_to_parse() {
    assert!(load_toml("[interpreter]\nprovider = \"carrier-pigeon\"").is_err());
}

#[test]
fn load_file_validates() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ninja.toml");
    fs::write(&path, "[watchdog]\npoll_ms = 1").unwrap();
    let err = load_file(&path).expect_err("invalid poll_ms");
    assert!(format!("{err}").contains("watchdog.poll_ms"));

    fs::write(&path, "[watchdog]\npoll_ms = 120").unwrap();
    let cfg = load_file(&path).expect("valid file");
    assert_eq!(cfg.watchdog.poll_ms, 120);
}

#[test]
fn load_file_reports_missing_file() {
    let dir = tempdir().unwrap();
    let err = load_file(&dir.path().join("absent.toml")).expect_err("missing file");
    assert!(format!("{err}").contains("read config"));
}
