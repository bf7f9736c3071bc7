//! Metrics pipeline: connection state, rate memory, chart window, and the
//! published snapshot.
//!
//! The pipeline does no I/O. A driver (see [`crate::ws`]) reports connection
//! events and hands each inbound text frame to [`Pipeline::feed`]; rendering
//! code holds a [`watch::Receiver`] and only ever reads.

use std::{fmt, sync::Arc, time::Duration};

use serde::Serialize;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::history::{now_millis, RollingWindow};
use crate::rate::{RateEstimator, SAMPLE_INTERVAL};
use crate::types::{ChartPoint, RateState, Sample};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConnState {
    Disconnected,
    Connecting,
    Connected,
    Closed,
}

impl fmt::Display for ConnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnState::Disconnected => "disconnected",
            ConnState::Connecting => "connecting",
            ConnState::Connected => "connected",
            ConnState::Closed => "closed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("malformed sample payload: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("sample payload is not a JSON object")]
    NotAnObject,
    #[error("pipeline is {0}, not accepting samples")]
    Inactive(ConnState),
}

/// What rendering code sees. Published as one unit, so `rates` and `window`
/// always belong to `sample`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub sample: Sample,
    pub rates: RateState,
    pub window: RollingWindow,
}

pub type SnapshotRx = watch::Receiver<Option<Arc<Snapshot>>>;

pub struct Pipeline {
    state: ConnState,
    rates: RateEstimator,
    last_rates: RateState,
    window: RollingWindow,
    snapshot_tx: watch::Sender<Option<Arc<Snapshot>>>,
    state_tx: watch::Sender<ConnState>,
    accepted: u64,
    rejected: u64,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::with_interval(SAMPLE_INTERVAL)
    }

    pub fn with_interval(interval: Duration) -> Self {
        let (snapshot_tx, _) = watch::channel(None);
        let (state_tx, _) = watch::channel(ConnState::Disconnected);
        Self {
            state: ConnState::Disconnected,
            rates: RateEstimator::new(interval),
            last_rates: RateState::default(),
            window: RollingWindow::new(),
            snapshot_tx,
            state_tx,
            accepted: 0,
            rejected: 0,
        }
    }

    pub fn subscribe(&self) -> SnapshotRx {
        self.snapshot_tx.subscribe()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ConnState> {
        self.state_tx.subscribe()
    }

    pub fn state(&self) -> ConnState {
        self.state
    }

    /// Latest published snapshot, if any sample has been processed.
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.snapshot_tx.borrow().clone()
    }

    /// (accepted, rejected) message counts over the pipeline's lifetime.
    pub fn counts(&self) -> (u64, u64) {
        (self.accepted, self.rejected)
    }

    // Disconnected/Closed -> Connecting. Counter memory is scoped to one
    // connection, so it is dropped here.
    pub fn connect_started(&mut self) {
        self.rates.reset();
        self.last_rates = RateState::default();
        self.transition(ConnState::Connecting);
    }

    pub fn connected(&mut self) {
        self.transition(ConnState::Connected);
    }

    /// Intentional teardown or remote close.
    pub fn close(&mut self) {
        self.transition(ConnState::Closed);
    }

    /// Connection error.
    pub fn fail(&mut self, reason: &dyn fmt::Display) {
        warn!(%reason, "connection failed");
        self.transition(ConnState::Disconnected);
    }

    fn transition(&mut self, next: ConnState) {
        if self.state == next {
            return;
        }
        debug!(from = %self.state, to = %next, "pipeline state");
        self.state = next;
        self.state_tx.send_replace(next);
    }

    /// Process one inbound text frame. On error nothing is mutated and the
    /// previous snapshot stays published.
    pub fn feed(&mut self, raw: &str) -> Result<Arc<Snapshot>, PipelineError> {
        if self.state != ConnState::Connected {
            return Err(PipelineError::Inactive(self.state));
        }
        let sample = match parse_sample(raw) {
            Ok(s) => s,
            Err(e) => {
                self.rejected += 1;
                warn!(error = %e, "dropping inbound message");
                return Err(e);
            }
        };
        Ok(self.ingest(sample))
    }

    fn ingest(&mut self, sample: Sample) -> Arc<Snapshot> {
        let (rates, counters) = self.rates.peek(sample.counters());
        if let Some(r) = rates {
            self.window.push_in_place(ChartPoint {
                label: String::new(),
                received: r.recv_rate,
                sent: -r.sent_rate,
                timestamp: now_millis(),
            });
            self.last_rates = r;
        }
        self.rates.commit(counters);
        self.accepted += 1;
        if self.accepted == 1 {
            info!("first sample received");
        }

        let snap = Arc::new(Snapshot {
            sample,
            rates: self.last_rates,
            window: self.window.clone(),
        });
        self.snapshot_tx.send_replace(Some(snap.clone()));
        snap
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse and coerce one inbound payload.
pub fn parse_sample(raw: &str) -> Result<Sample, PipelineError> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    let obj = value.as_object().ok_or(PipelineError::NotAnObject)?;
    Ok(Sample::from_json(obj))
}
