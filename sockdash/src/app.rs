//! App state and main loop: input handling, session task, and drawing.

use std::{io, sync::Arc, time::Duration};

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};
use tokio::{
    sync::{oneshot, watch},
    task::JoinHandle,
    time::sleep,
};
use tracing::warn;

use crate::pipeline::{ConnState, Pipeline, Snapshot, SnapshotRx};
use crate::ui::{cpu::draw_cpu, disks::draw_disk, header::draw_header, mem::draw_mem, net::draw_net};
use crate::ws::{run_session, SessionEnd, SessionError};

type SessionHandle = JoinHandle<Result<SessionEnd, SessionError>>;

/// Start the pipeline on its own task. Dropping the sender (or sending) ends
/// the session and closes the socket.
pub fn spawn_session(
    url: String,
    interval: Duration,
) -> (SessionHandle, SnapshotRx, watch::Receiver<ConnState>, oneshot::Sender<()>) {
    let mut pipeline = Pipeline::with_interval(interval);
    let snapshots = pipeline.subscribe();
    let states = pipeline.subscribe_state();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    // Connecting is visible before the task first runs.
    pipeline.connect_started();
    let handle = tokio::spawn(async move { run_session(&url, &mut pipeline, stop_rx).await });
    (handle, snapshots, states, stop_tx)
}

pub struct App {
    url: String,
    interval: Duration,
    // Latest published snapshot; read-only copy of pipeline output
    last: Option<Arc<Snapshot>>,
    state: ConnState,
    should_quit: bool,
}

impl App {
    pub fn new(url: impl Into<String>, interval: Duration) -> Self {
        Self {
            url: url.into(),
            interval,
            last: None,
            state: ConnState::Connecting,
            should_quit: false,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let (handle, mut snapshots, mut states, stop) = spawn_session(self.url.clone(), self.interval);

        // Terminal setup
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        // Main loop
        let res = self.event_loop(&mut terminal, &mut snapshots, &mut states).await;

        // Teardown
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        let _ = stop.send(());
        match handle.await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => warn!(error = %e, "session ended with error"),
            Err(e) => warn!(error = %e, "session task failed"),
        }
        res
    }

    async fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        snapshots: &mut SnapshotRx,
        states: &mut watch::Receiver<ConnState>,
    ) -> Result<()> {
        loop {
            // Input (non-blocking)
            while event::poll(Duration::from_millis(10))? {
                if let Event::Key(k) = event::read()? {
                    if matches!(k.code, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc) {
                        self.should_quit = true;
                    }
                }
            }
            if self.should_quit {
                break;
            }

            self.refresh(snapshots, states);

            terminal.draw(|f| self.draw(f))?;

            // Tick rate
            sleep(Duration::from_millis(200)).await;
        }
        Ok(())
    }

    /// Copy the latest pipeline output into the view state.
    fn refresh(&mut self, snapshots: &mut SnapshotRx, states: &mut watch::Receiver<ConnState>) {
        // Err means the session ended; its final value may still be unseen.
        if snapshots.has_changed().unwrap_or(true) {
            self.last = snapshots.borrow_and_update().clone();
        }
        self.state = *states.borrow_and_update();
    }

    pub fn draw(&self, f: &mut ratatui::Frame<'_>) {
        let area = f.area();
        let snap = self.last.as_deref();
        let sample = snap.map(|s| &s.sample);

        // Root rows: header, gauges (cpu, ram, disk), network
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(10),
            ])
            .split(area);

        draw_header(f, rows[0], &self.url, self.state, snap.is_some());
        draw_cpu(f, rows[1], sample);
        draw_mem(f, rows[2], sample);
        draw_disk(f, rows[3], sample);
        draw_net(f, rows[4], snap);
    }
}

/// Print every published snapshot as one JSON line until the session ends
/// or Ctrl-C is pressed.
pub async fn run_headless(url: String, interval: Duration) -> Result<()> {
    let (handle, mut snapshots, _states, stop) = spawn_session(url, interval);
    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                // Sender dropped: the session task is done.
                if changed.is_err() {
                    break;
                }
                let snap = snapshots.borrow_and_update().clone();
                if let Some(s) = snap {
                    println!("{}", serde_json::to_string(&*s)?);
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    let _ = stop.send(());
    handle.await??;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn final_snapshot_is_shown_after_session_ends() {
        let mut pipeline = Pipeline::new();
        let mut snapshots = pipeline.subscribe();
        let mut states = pipeline.subscribe_state();
        pipeline.connect_started();
        pipeline.connected();
        pipeline.feed(r#"{"cpu_percent": 7.5}"#).unwrap();
        pipeline.close();
        // Session task done: both senders are gone before the UI ticks.
        drop(pipeline);

        let mut app = App::new("ws://h:1/ws", Duration::from_secs(3));
        app.refresh(&mut snapshots, &mut states);
        assert_eq!(app.last.as_ref().unwrap().sample.cpu_percent, 7.5);
        assert_eq!(app.state, ConnState::Closed);
    }

    #[tokio::test]
    async fn spawned_session_starts_in_connecting() {
        // Current-thread runtime: the session task has not been polled yet.
        let (handle, _snapshots, states, stop) =
            spawn_session("ws://127.0.0.1:9/ws".into(), Duration::from_secs(3));
        assert_eq!(*states.borrow(), ConnState::Connecting);
        let _ = stop.send(());
        let _ = handle.await;
    }
}
