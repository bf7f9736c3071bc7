//! Pipeline behavior driven with synthetic message sequences.

use sockdash::history::WINDOW_LEN;
use sockdash::{ConnState, Pipeline, PipelineError};

fn connected() -> Pipeline {
    let mut p = Pipeline::new();
    p.connect_started();
    p.connected();
    p
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn first_sample_has_zero_rates_and_full_window() {
    let mut p = connected();
    let snap = p.feed(r#"{"net_recv": 1000, "net_sent": 20}"#).unwrap();
    assert_eq!(snap.rates.recv_delta, 0);
    assert_eq!(snap.rates.sent_delta, 0);
    assert_eq!(snap.rates.recv_rate, 0.0);
    assert_eq!(snap.rates.sent_rate, 0.0);
    assert_eq!(snap.window.len(), WINDOW_LEN);
    // no point pushed yet: still the seeded zeros
    assert!(snap.window.iter().all(|pt| pt.received == 0.0 && pt.sent == 0.0));
}

#[test]
fn second_sample_yields_rate_over_three_seconds() {
    let mut p = connected();
    p.feed(r#"{"net_recv": 1000}"#).unwrap();
    let snap = p.feed(r#"{"net_recv": 1900}"#).unwrap();
    assert_eq!(snap.rates.recv_delta, 900);
    assert_eq!(snap.rates.recv_rate, 300.0);
    let last = snap.window.latest().unwrap();
    assert_eq!(last.received, 300.0);
    assert_eq!(last.sent, 0.0);
}

#[test]
fn memory_percent_scenarios() {
    let mut p = connected();
    let snap = p.feed(r#"{"memory_used": 500, "memory_total": 1000}"#).unwrap();
    assert_eq!(snap.sample.memory_percent, 50.0);
    let snap = p.feed(r#"{"memory_used": 500, "memory_total": 0}"#).unwrap();
    assert_eq!(snap.sample.memory_percent, 0.0);
    assert!(snap.sample.memory_percent.is_finite());
}

#[test]
fn counter_regression_is_reported_not_corrected() {
    let mut p = connected();
    p.feed(r#"{"net_sent": 5000}"#).unwrap();
    let snap = p.feed(r#"{"net_sent": 4000}"#).unwrap();
    assert_eq!(snap.rates.sent_delta, -1000);
    assert!(approx(snap.rates.sent_rate, -1000.0 / 3.0));
    let last = snap.window.latest().unwrap();
    assert!(approx(last.sent, 1000.0 / 3.0));
}

#[test]
fn sent_is_mirrored_below_zero() {
    let mut p = connected();
    let mut sent = 0u64;
    for step in [0u64, 300, 3000, 0, 45] {
        sent += step;
        let snap = p.feed(&format!(r#"{{"net_sent": {sent}, "net_recv": {sent}}}"#)).unwrap();
        if snap.rates.sent_rate >= 0.0 {
            assert!(snap.window.latest().unwrap().sent <= 0.0);
        }
        assert!(snap.window.latest().unwrap().received >= 0.0);
    }
}

#[test]
fn window_stays_full_and_fifo_over_long_runs() {
    let mut p = connected();
    let mut prev_points: Vec<f64> = Vec::new();
    for i in 0..40u64 {
        // recv grows by 3*i bytes so the rate of step i is exactly i
        let recv: u64 = (0..=i).map(|k| 3 * k).sum();
        let snap = p.feed(&format!(r#"{{"net_recv": {recv}}}"#)).unwrap();
        assert_eq!(snap.window.len(), WINDOW_LEN);
        let points: Vec<f64> = snap.window.iter().map(|pt| pt.received).collect();
        if i >= 1 {
            // everything but the oldest moved one slot left
            assert_eq!(&points[..WINDOW_LEN - 1], &prev_points[1..]);
            assert_eq!(points[WINDOW_LEN - 1], i as f64);
        }
        prev_points = points;
    }
}

#[test]
fn malformed_message_leaves_snapshot_untouched() {
    let mut p = connected();
    let mut rx = p.subscribe();
    p.feed(r#"{"net_recv": 10, "cpu_percent": 12.5}"#).unwrap();
    let before = p.snapshot().unwrap();
    let _ = rx.borrow_and_update();

    assert!(matches!(p.feed("{not json"), Err(PipelineError::Parse(_))));
    assert!(matches!(p.feed("[1, 2, 3]"), Err(PipelineError::NotAnObject)));
    assert!(matches!(p.feed("null"), Err(PipelineError::NotAnObject)));

    let after = p.snapshot().unwrap();
    assert_eq!(*before, *after);
    assert!(!rx.has_changed().unwrap());
    assert_eq!(p.counts(), (1, 3));

    // the next good sample still diffs against the last good one
    let snap = p.feed(r#"{"net_recv": 40}"#).unwrap();
    assert_eq!(snap.rates.recv_delta, 30);
}

#[test]
fn garbage_fields_default_to_zero() {
    let mut p = connected();
    let snap = p
        .feed(r#"{"cpu_percent": "n/a", "disk_total": null, "disk_used": {}, "net_recv": true}"#)
        .unwrap();
    assert_eq!(snap.sample.cpu_percent, 0.0);
    assert_eq!(snap.sample.disk_total, 0);
    assert_eq!(snap.sample.disk_used, 0);
    assert_eq!(snap.sample.net_recv, 0);
}

#[test]
fn state_machine_and_publishing_stop_after_close() {
    let mut p = Pipeline::new();
    let states = p.subscribe_state();
    assert_eq!(p.state(), ConnState::Disconnected);
    assert!(matches!(p.feed("{}"), Err(PipelineError::Inactive(ConnState::Disconnected))));

    p.connect_started();
    assert_eq!(*states.borrow(), ConnState::Connecting);
    assert!(p.feed("{}").is_err());
    p.connected();
    p.feed(r#"{"net_recv": 100}"#).unwrap();
    p.close();
    assert_eq!(*states.borrow(), ConnState::Closed);

    let before = p.snapshot().unwrap();
    assert!(matches!(p.feed(r#"{"net_recv": 200}"#), Err(PipelineError::Inactive(ConnState::Closed))));
    assert_eq!(*p.snapshot().unwrap(), *before);

    p.fail(&"boom");
    assert_eq!(p.state(), ConnState::Disconnected);
}

#[test]
fn reconnect_forgets_previous_counters() {
    let mut p = connected();
    p.feed(r#"{"net_recv": 100}"#).unwrap();
    p.feed(r#"{"net_recv": 400}"#).unwrap();
    p.close();

    p.connect_started();
    p.connected();
    // a restarted source reports small counters again; no bogus negative rate
    let snap = p.feed(r#"{"net_recv": 5}"#).unwrap();
    assert_eq!(snap.rates.recv_delta, 0);
    assert_eq!(snap.rates.recv_rate, 0.0);
    // history from the previous connection is kept
    assert_eq!(snap.window.latest().unwrap().received, 100.0);
}

#[test]
fn custom_interval_is_used_for_rates() {
    let mut p = Pipeline::with_interval(std::time::Duration::from_secs(1));
    p.connect_started();
    p.connected();
    p.feed(r#"{"net_recv": 0}"#).unwrap();
    let snap = p.feed(r#"{"net_recv": 750}"#).unwrap();
    assert_eq!(snap.rates.recv_rate, 750.0);
}
