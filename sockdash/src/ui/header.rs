//! Top header with connection state.

use crate::pipeline::ConnState;
use ratatui::{
    layout::Rect,
    widgets::{Block, Borders},
};

/// Header text for the current connection state. `has_data` is whether any
/// snapshot has been received so far.
pub fn header_title(url: &str, state: ConnState, has_data: bool) -> String {
    let status = match (state, has_data) {
        (ConnState::Connected, true) => "live".to_string(),
        (ConnState::Connected, false) => "waiting for first sample...".to_string(),
        (ConnState::Connecting, _) => "connecting...".to_string(),
        // Disconnected is only reached through a failed connect or socket error
        (ConnState::Disconnected, false) => "connection failed, no data received".to_string(),
        (ConnState::Closed, false) => "closed, no data received".to_string(),
        (s, true) => format!("{s}, showing last data"),
    };
    format!("sockdash — {url} | {status}  (press 'q' to quit)")
}

pub fn draw_header(f: &mut ratatui::Frame<'_>, area: Rect, url: &str, state: ConnState, has_data: bool) {
    let title = header_title(url, state, has_data);
    f.render_widget(Block::default().title(title).borders(Borders::BOTTOM), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "ws://h:1/ws";

    #[test]
    fn failed_connection_is_not_shown_as_connecting() {
        let t = header_title(URL, ConnState::Disconnected, false);
        assert!(!t.contains("connecting"), "{t}");
        assert!(t.contains("connection failed"), "{t}");
        assert!(header_title(URL, ConnState::Connecting, false).contains("connecting..."));
    }

    #[test]
    fn closed_without_data_does_not_claim_last_data() {
        let t = header_title(URL, ConnState::Closed, false);
        assert!(!t.contains("showing last data"), "{t}");
        assert!(t.contains("closed"), "{t}");
        assert!(header_title(URL, ConnState::Closed, true).contains("closed, showing last data"));
        assert!(header_title(URL, ConnState::Disconnected, true)
            .contains("disconnected, showing last data"));
    }

    #[test]
    fn live_states() {
        assert_eq!(
            header_title(URL, ConnState::Connected, true),
            "sockdash — ws://h:1/ws | live  (press 'q' to quit)"
        );
        assert!(header_title(URL, ConnState::Connected, false).contains("waiting for first sample"));
    }
}
