use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::thread;
use std::time::{Duration, Instant};

use ninja_hardware::error::HwError;
use ninja_hardware::util::wait_for_level_until;

#[test]
fn wait_for_high_success_path() {
    let high = Arc::new(AtomicBool::new(false));
    let high_bg = high.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_millis(3));
        high_bg.store(true, Ordering::Relaxed);
    });

    let res = wait_for_level_until(
        || high.load(Ordering::Relaxed),
        true,
        Instant::now() + Duration::from_millis(200),
        Duration::from_micros(200),
    );
    assert!(res.is_ok(), "expected success, got {res:?}");
}

#[test]
fn wait_for_low_times_out() {
    let high = Arc::new(AtomicBool::new(true));

    let err = wait_for_level_until(
        || high.load(Ordering::Relaxed),
        false,
        Instant::now() + Duration::from_millis(5),
        Duration::ZERO,
    )
    .expect_err("expected timeout error");

    match err {
        HwError::EchoTimeout => {}
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn already_at_level_returns_immediately() {
    let start = Instant::now();
    let seen = wait_for_level_until(|| true, true, start, Duration::ZERO).expect("level present");
    assert!(seen >= start);
}
