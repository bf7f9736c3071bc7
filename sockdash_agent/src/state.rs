//! Shared agent state: sysinfo handles and the latest serialized sample.

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use std::time::Duration;
use sysinfo::{CpuRefreshKind, Disks, MemoryRefreshKind, Networks, RefreshKind, System};
use tokio::sync::{watch, Mutex};

pub type SharedSystem = Arc<Mutex<System>>;
pub type SharedNetworks = Arc<Mutex<Networks>>;
pub type SharedDisks = Arc<Mutex<Disks>>;
// (rx_total, tx_total) summed over all interfaces since agent start
pub type SharedTotals = Arc<Mutex<(u64, u64)>>;

#[derive(Clone)]
pub struct AppState {
    // Persistent sysinfo handles
    pub sys: SharedSystem,
    pub nets: SharedNetworks,
    pub disks: SharedDisks,
    pub net_totals: SharedTotals,

    // Latest sample as JSON; empty until the sampler's first tick
    pub latest: Arc<watch::Sender<String>>,

    pub client_count: Arc<AtomicUsize>,
    pub interval: Duration,
}

impl AppState {
    pub fn new(interval: Duration) -> Self {
        let refresh_kind = RefreshKind::nothing()
            .with_cpu(CpuRefreshKind::nothing().with_cpu_usage())
            .with_memory(MemoryRefreshKind::nothing().with_ram());
        let sys = System::new_with_specifics(refresh_kind);

        // Keep Networks alive across ticks so received()/transmitted() deltas work
        let nets = Networks::new_with_refreshed_list();
        let disks = Disks::new_with_refreshed_list();
        let (latest, _) = watch::channel(String::new());

        Self {
            sys: Arc::new(Mutex::new(sys)),
            nets: Arc::new(Mutex::new(nets)),
            disks: Arc::new(Mutex::new(disks)),
            net_totals: Arc::new(Mutex::new((0, 0))),
            latest: Arc::new(latest),
            client_count: Arc::new(AtomicUsize::new(0)),
            interval,
        }
    }
}
