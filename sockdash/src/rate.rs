//! Turns consecutive network counter readings into deltas and per-second rates.
//!
//! The interval is a nominal value: the source is expected to push one sample
//! every `SAMPLE_INTERVAL`. Arrival times are never measured, so if the source
//! drifts from that cadence the reported rates drift with it.

use std::time::Duration;

use crate::types::{NetCounters, RateState};

pub const SAMPLE_INTERVAL: Duration = Duration::from_secs(3);

/// Diff `current` against `previous`.
///
/// Returns the rate (None on the first observation) and the counters the
/// caller should remember for next time. A counter that went backwards
/// (source restart, wrap) yields a negative delta; it is reported as is.
pub fn update(
    previous: Option<NetCounters>,
    current: NetCounters,
    interval: Duration,
) -> (Option<RateState>, NetCounters) {
    let Some(prev) = previous else {
        return (None, current);
    };

    let recv_delta = signed_delta(prev.recv, current.recv);
    let sent_delta = signed_delta(prev.sent, current.sent);
    let rates = RateState {
        recv_delta,
        sent_delta,
        recv_rate: per_second(recv_delta, interval),
        sent_rate: per_second(sent_delta, interval),
    };
    (Some(rates), current)
}

fn signed_delta(prev: u64, cur: u64) -> i64 {
    cur.wrapping_sub(prev) as i64
}

fn per_second(delta: i64, interval: Duration) -> f64 {
    let secs = interval.as_secs_f64();
    if secs > 0.0 {
        delta as f64 / secs
    } else {
        0.0
    }
}

/// Holds the previous counters for one connection.
#[derive(Debug, Clone)]
pub struct RateEstimator {
    previous: Option<NetCounters>,
    interval: Duration,
}

impl RateEstimator {
    pub fn new(interval: Duration) -> Self {
        Self {
            previous: None,
            interval,
        }
    }

    /// Compute without remembering `current`; see [`RateEstimator::commit`].
    pub fn peek(&self, current: NetCounters) -> (Option<RateState>, NetCounters) {
        update(self.previous, current, self.interval)
    }

    pub fn commit(&mut self, counters: NetCounters) {
        self.previous = Some(counters);
    }

    // Forget the previous counters (new connection, new source process).
    pub fn reset(&mut self) {
        self.previous = None;
    }

    pub fn has_previous(&self) -> bool {
        self.previous.is_some()
    }
}

impl Default for RateEstimator {
    fn default() -> Self {
        Self::new(SAMPLE_INTERVAL)
    }
}
