//! Bounded history buffers for charts.

use std::collections::VecDeque;

use serde::Serialize;

use crate::types::ChartPoint;

/// Number of points kept for the network chart (30s at the nominal 3s cadence).
pub const WINDOW_LEN: usize = 10;

pub fn push_capped<T>(dq: &mut VecDeque<T>, v: T, cap: usize) {
    while dq.len() >= cap && !dq.is_empty() {
        dq.pop_front();
    }
    dq.push_back(v);
}

/// Fixed-length FIFO of chart points, oldest first.
///
/// Always holds exactly [`WINDOW_LEN`] points once built through
/// [`RollingWindow::new`]; pushing drops the oldest and appends the newest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollingWindow {
    points: VecDeque<ChartPoint>,
    // points ever pushed; drives the cycling label
    #[serde(skip)]
    pushed: u64,
}

impl RollingWindow {
    /// Pre-seeded with zero points labelled "1".."10".
    pub fn new() -> Self {
        Self::seeded(now_millis())
    }

    fn seeded(timestamp: i64) -> Self {
        let points = (1..=WINDOW_LEN)
            .map(|i| ChartPoint::zero(i.to_string(), timestamp))
            .collect();
        Self { points, pushed: 0 }
    }

    /// Wrap arbitrary points, e.g. restored from elsewhere. The length is not
    /// checked here; the next push repairs a window of the wrong size.
    pub fn from_points(points: Vec<ChartPoint>) -> Self {
        Self {
            points: points.into(),
            pushed: 0,
        }
    }

    /// Return a new window with `point` appended and the oldest entry evicted.
    /// The point's label is replaced by the next cycling label.
    pub fn push(&self, point: ChartPoint) -> RollingWindow {
        let mut next = self.clone();
        next.push_in_place(point);
        next
    }

    pub fn push_in_place(&mut self, mut point: ChartPoint) {
        if self.points.len() != WINDOW_LEN {
            let pushed = self.pushed;
            *self = Self::seeded(point.timestamp);
            self.pushed = pushed;
        }
        self.pushed = self.pushed.wrapping_add(1);
        point.label = cycle_label(self.pushed);
        push_capped(&mut self.points, point, WINDOW_LEN);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChartPoint> {
        self.points.iter()
    }

    pub fn latest(&self) -> Option<&ChartPoint> {
        self.points.back()
    }

    /// Largest absolute value across both series; handy for chart bounds.
    pub fn peak(&self) -> f64 {
        self.points
            .iter()
            .map(|p| p.received.abs().max(p.sent.abs()))
            .fold(0.0, f64::max)
    }
}

impl Default for RollingWindow {
    fn default() -> Self {
        Self::new()
    }
}

/// `(count mod N) + 1`, so labels cycle through "1".."N".
pub fn cycle_label(count: u64) -> String {
    ((count % WINDOW_LEN as u64) + 1).to_string()
}

pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
