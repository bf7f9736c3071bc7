//! Network traffic chart (received above the axis, sent below) and totals.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
};

use crate::history::RollingWindow;
use crate::pipeline::Snapshot;
use crate::types::RateState;
use crate::ui::util::{format_bytes, format_bytes_signed, format_network_rate};

/// Chart series as (x, y) pairs: x is the slot index, oldest first.
pub fn chart_series(window: &RollingWindow) -> (Vec<(f64, f64)>, Vec<(f64, f64)>) {
    let rx = window.iter().enumerate().map(|(i, p)| (i as f64, p.received)).collect();
    let tx = window.iter().enumerate().map(|(i, p)| (i as f64, p.sent)).collect();
    (rx, tx)
}

pub fn draw_net(f: &mut ratatui::Frame<'_>, area: Rect, snap: Option<&Snapshot>) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(4)])
        .split(area);

    let empty = RollingWindow::new();
    let window = snap.map(|s| &s.window).unwrap_or(&empty);
    draw_chart(f, rows[0], window);
    draw_totals(f, rows[1], snap);
}

fn draw_chart(f: &mut ratatui::Frame<'_>, area: Rect, window: &RollingWindow) {
    let (rx, tx) = chart_series(window);
    // Symmetric bounds keep the zero line centered; 1 B/s floor for an idle link.
    let peak = window.peak().max(1.0);
    let x_max = (window.len().max(1) - 1) as f64;

    let datasets = vec![
        Dataset::default()
            .name("received")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Green))
            .data(&rx),
        Dataset::default()
            .name("sent")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Blue))
            .data(&tx),
    ];

    let x_labels: Vec<Span> = window
        .iter()
        .step_by(3)
        .map(|p| Span::raw(p.label.clone()))
        .collect();
    let y_labels = vec![
        Span::raw(format_network_rate(-peak)),
        Span::raw("0"),
        Span::raw(format_network_rate(peak)),
    ];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Network Traffic (Last 30 seconds)"),
        )
        .x_axis(Axis::default().bounds([0.0, x_max]).labels(x_labels))
        .y_axis(Axis::default().bounds([-peak, peak]).labels(y_labels));
    f.render_widget(chart, area);
}

/// One text line per direction: total, plus delta and rate when traffic grew.
pub fn totals_lines(total_recv: u64, total_sent: u64, rates: &RateState) -> [String; 2] {
    let line = |name: &str, total: u64, delta: i64, rate: f64| {
        if delta > 0 {
            format!(
                "{name}: {} (Δ: {} | Rate: {})",
                format_bytes(total),
                format_bytes_signed(delta),
                format_network_rate(rate)
            )
        } else {
            format!("{name}: {}", format_bytes(total))
        }
    };
    [
        line("Network Received", total_recv, rates.recv_delta, rates.recv_rate),
        line("Network Sent", total_sent, rates.sent_delta, rates.sent_rate),
    ]
}

fn draw_totals(f: &mut ratatui::Frame<'_>, area: Rect, snap: Option<&Snapshot>) {
    let Some(s) = snap else {
        f.render_widget(Block::default().borders(Borders::ALL), area);
        return;
    };
    let [rx, tx] = totals_lines(s.sample.net_recv, s.sample.net_sent, &s.rates);
    let text = vec![
        Line::from(Span::styled(rx, Style::default().fg(Color::Green))),
        Line::from(Span::styled(tx, Style::default().fg(Color::Blue))),
    ];
    f.render_widget(
        Paragraph::new(text).block(Block::default().borders(Borders::ALL)),
        area,
    );
}
