//! Background sampler: collects one sample per interval and publishes it as
//! JSON, so every connected client pushes the same reading.

use std::sync::atomic::Ordering;

use crate::metrics::collect_sample;
use crate::state::AppState;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, warn};

pub fn spawn_sampler(state: AppState) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(state.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            // Sample even with no clients so counters stay cumulative and the
            // first CPU reading a client sees is not the sysinfo warm-up zero.
            let sample = collect_sample(&state).await;
            match serde_json::to_string(&sample) {
                Ok(js) => {
                    debug!(
                        clients = state.client_count.load(Ordering::Relaxed),
                        "sample ready"
                    );
                    state.latest.send_replace(js);
                }
                Err(e) => warn!(error = %e, "failed to serialize sample"),
            }
        }
    })
}
