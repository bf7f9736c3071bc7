//! Memory gauge.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Gauge},
};

use crate::types::Sample;
use crate::ui::util::{format_mb, format_percentage, gauge_percent};

pub fn draw_mem(f: &mut ratatui::Frame<'_>, area: Rect, s: Option<&Sample>) {
    let (used, total, pct) = s.map(|s| (s.memory_used, s.memory_total, s.memory_percent)).unwrap_or((0, 0, 0.0));
    let free = total.saturating_sub(used);

    let g = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(format!("RAM: {}", format_percentage(pct, 2))))
        .gauge_style(Style::default().fg(Color::Magenta))
        .percent(gauge_percent(pct))
        .label(format!(
            "used {} / total {} / free {}",
            format_mb(used),
            format_mb(total),
            format_mb(free)
        ));
    f.render_widget(g, area);
}
