//! Types that mirror the agent's JSON schema, plus the derived values the
//! pipeline publishes.

use serde::Serialize;
use serde_json::{Map, Value};

/// One point-in-time reading from the source. Built only through
/// [`Sample::from_json`], which coerces every field.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Sample {
    pub cpu_percent: f64,
    pub memory_used: u64,
    pub memory_total: u64,
    pub memory_percent: f64,
    pub disk_used: u64,
    pub disk_total: u64,
    pub disk_free: u64,
    // cumulative totals since the agent started; the pipeline diffs them
    pub net_recv: u64,
    pub net_sent: u64,
}

impl Sample {
    /// Build a sample from an already parsed JSON object. Missing,
    /// non-numeric or out-of-range fields become 0.
    pub fn from_json(obj: &Map<String, Value>) -> Self {
        let memory_used = coerce_u64(obj.get("memory_used"));
        let memory_total = coerce_u64(obj.get("memory_total"));
        Self {
            cpu_percent: coerce_f64(obj.get("cpu_percent")).clamp(0.0, 100.0),
            memory_used,
            memory_total,
            memory_percent: memory_percent(memory_used, memory_total),
            disk_used: coerce_u64(obj.get("disk_used")),
            disk_total: coerce_u64(obj.get("disk_total")),
            disk_free: coerce_u64(obj.get("disk_free")),
            net_recv: coerce_u64(obj.get("net_recv")),
            net_sent: coerce_u64(obj.get("net_sent")),
        }
    }

    pub fn counters(&self) -> NetCounters {
        NetCounters {
            recv: self.net_recv,
            sent: self.net_sent,
        }
    }
}

/// Finite JSON number, else 0.
pub fn coerce_f64(v: Option<&Value>) -> f64 {
    match v.and_then(Value::as_f64) {
        Some(x) if x.is_finite() => x,
        _ => 0.0,
    }
}

/// Non-negative JSON number (fractions truncated), else 0.
pub fn coerce_u64(v: Option<&Value>) -> u64 {
    match v {
        Some(Value::Number(n)) => n.as_u64().unwrap_or_else(|| {
            let x = n.as_f64().unwrap_or(0.0);
            if x.is_finite() && x > 0.0 {
                x as u64
            } else {
                0
            }
        }),
        _ => 0,
    }
}

/// `used / total * 100` rounded to two decimals; 0 when total is 0.
pub fn memory_percent(used: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let pct = used as f64 / total as f64 * 100.0;
    (pct * 100.0).round() / 100.0
}

/// Raw network counter pair remembered between samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetCounters {
    pub recv: u64,
    pub sent: u64,
}

/// Per-interval network change derived from two consecutive samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RateState {
    pub recv_delta: i64,
    pub sent_delta: i64,
    pub recv_rate: f64,
    pub sent_rate: f64,
}

/// One entry of the network chart history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub received: f64,
    // negated send rate so rx/tx render on opposite sides of the axis
    pub sent: f64,
    pub timestamp: i64,
}

impl ChartPoint {
    pub fn zero(label: impl Into<String>, timestamp: i64) -> Self {
        Self {
            label: label.into(),
            received: 0.0,
            sent: 0.0,
            timestamp,
        }
    }
}
