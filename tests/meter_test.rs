// tests/meter_test.rs — Integration test: session meter billing contract

use callmeter::core::meter::{is_low_balance, SessionMeter};
use callmeter::core::types::EndReason;
use callmeter::infra::errors::MeterError;
use pretty_assertions::assert_eq;

const EPS: f64 = 1e-9;

#[test]
fn test_elapsed_advances_by_exactly_one() {
    let mut session = SessionMeter::default().start(1.0, 100.0).unwrap();
    let mut previous = session.elapsed_seconds();
    for _ in 0..500 {
        let result = session.tick().unwrap();
        assert_eq!(result.elapsed_seconds, previous + 1);
        previous = result.elapsed_seconds;
    }
    assert_eq!(session.elapsed_seconds(), 500);
}

#[test]
fn test_cost_after_ninety_seconds() {
    let mut session = SessionMeter::default().start(3.50, 100.0).unwrap();
    let mut last = session.snapshot();
    for _ in 0..90 {
        last = session.tick().unwrap();
    }
    assert_eq!(last.elapsed_seconds, 90);
    assert!((last.accrued_cost - 5.25).abs() < EPS);
    assert!((last.projected_remaining - 94.75).abs() < EPS);
}

#[test]
fn test_fractional_minutes_not_rounded_up() {
    let mut session = SessionMeter::default().start(6.0, 100.0).unwrap();
    let result = session.tick().unwrap();
    // One second at 6/min is 0.1, not a whole minute's 6.0
    assert!((result.accrued_cost - 0.1).abs() < EPS);
}

#[test]
fn test_termination_on_exact_tick() {
    let mut session = SessionMeter::default().start(3.50, 5.25).unwrap();
    for expected in 1..=89u64 {
        let result = session.tick().unwrap();
        assert_eq!(result.elapsed_seconds, expected);
        assert!(!result.should_terminate, "terminated early at {expected}");
    }
    let result = session.tick().unwrap();
    assert_eq!(result.elapsed_seconds, 90);
    assert!(result.should_terminate);
    assert!(!session.is_active());

    let finalized = session.finalized().cloned().unwrap();
    assert_eq!(finalized.reason, EndReason::InsufficientFunds);
    assert_eq!(finalized.elapsed_seconds, 90);
    assert!((finalized.accrued_cost - 5.25).abs() < EPS);
    assert_eq!(finalized.final_balance, 0.0);
}

#[test]
fn test_end_is_idempotent() {
    let mut session = SessionMeter::default().start(2.0, 20.0).unwrap();
    for _ in 0..42 {
        session.tick().unwrap();
    }
    let first = session.end(EndReason::User);
    let second = session.end(EndReason::User);
    assert_eq!(first, second);
    assert_eq!(first.elapsed_seconds, 42);
    assert_eq!(session.elapsed_seconds(), 42);
    assert!((first.accrued_cost - 1.4).abs() < EPS);
}

#[test]
fn test_end_after_forced_termination_returns_same_record() {
    let mut session = SessionMeter::default().start(60.0, 60.0).unwrap();
    while session.is_active() {
        session.tick().unwrap();
    }
    let forced = session.finalized().cloned().unwrap();
    let later = session.end(EndReason::User);
    assert_eq!(later, forced);
    assert_eq!(later.reason, EndReason::InsufficientFunds);
}

#[test]
fn test_tick_after_end_rejected() {
    let mut session = SessionMeter::default().start(1.0, 10.0).unwrap();
    session.tick().unwrap();
    session.end(EndReason::User);
    let err = session.tick().unwrap_err();
    assert!(matches!(err, MeterError::SessionAlreadyEnded { .. }));
    assert_eq!(session.elapsed_seconds(), 1);
}

#[test]
fn test_low_balance_threshold() {
    assert!(is_low_balance(3.99, 2.00));
    assert!(!is_low_balance(4.00, 2.00));
}

#[test]
fn test_low_balance_turns_on_during_call() {
    // 2/min against 6: low once remaining < 4, i.e. after 60 seconds
    let mut session = SessionMeter::default().start(2.0, 6.0).unwrap();
    for _ in 0..60 {
        assert!(!session.tick().unwrap().low_balance);
    }
    assert!(!session.is_low_balance());
    let result = session.tick().unwrap();
    assert!(result.low_balance);
    assert!(session.is_low_balance());
}

#[test]
fn test_start_rejects_unaffordable_call() {
    let err = SessionMeter::default().start(5.00, 4.99).unwrap_err();
    match err {
        MeterError::InsufficientFunds { balance, required } => {
            assert_eq!(balance, 4.99);
            assert_eq!(required, 5.00);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_sessions_get_distinct_ids() {
    let meter = SessionMeter::default();
    let a = meter.start(1.0, 5.0).unwrap();
    let b = meter.start(1.0, 5.0).unwrap();
    assert_ne!(a.id(), b.id());
}
