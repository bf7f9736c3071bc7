//! Data sent to the client over WebSocket.
//! Keep this module minimal and stable — it defines the wire format.

use serde::Serialize;

#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct Sample {
    pub cpu_percent: f32,
    pub disk_free: u64,
    pub disk_total: u64,
    pub disk_used: u64,
    pub memory_total: u64,
    pub memory_used: u64,
    // cumulative totals since the agent started (client diffs to get rates)
    pub net_recv: u64,
    pub net_sent: u64,
}
