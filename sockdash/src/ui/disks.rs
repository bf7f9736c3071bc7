//! Disk gauge with used/total/free line.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Gauge},
};

use crate::types::Sample;
use crate::ui::util::{format_gb, format_percentage, gauge_percent};

pub fn draw_disk(f: &mut ratatui::Frame<'_>, area: Rect, s: Option<&Sample>) {
    let (used, total, free) = s.map(|s| (s.disk_used, s.disk_total, s.disk_free)).unwrap_or((0, 0, 0));
    let pct = if total > 0 { used as f64 / total as f64 * 100.0 } else { 0.0 };

    let color = if pct < 70.0 {
        Color::Green
    } else if pct < 90.0 {
        Color::Yellow
    } else {
        Color::Red
    };

    let g = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(format!("DISK: {}", format_percentage(pct, 2))))
        .gauge_style(Style::default().fg(color))
        .percent(gauge_percent(pct))
        .label(format!(
            "used {} / total {} / free {}",
            format_gb(used),
            format_gb(total),
            format_gb(free)
        ));
    f.render_widget(g, area);
}
