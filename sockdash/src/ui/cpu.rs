//! CPU gauge.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Gauge},
};

use crate::types::Sample;
use crate::ui::util::{format_percentage, gauge_percent};

pub fn draw_cpu(f: &mut ratatui::Frame<'_>, area: Rect, s: Option<&Sample>) {
    let pct = s.map(|s| (s.cpu_percent * 100.0).round() / 100.0).unwrap_or(0.0);
    let fg = match pct {
        x if x < 25.0 => Color::Green,
        x if x < 60.0 => Color::Yellow,
        _ => Color::Red,
    };
    let g = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(format!("CPU: {}", format_percentage(pct, 2))))
        .gauge_style(Style::default().fg(fg))
        .percent(gauge_percent(pct));
    f.render_widget(g, area);
}
