//! WebSocket upgrade and per-connection handler. Pushes every new sample.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
    routing::get,
    Router,
};
use std::sync::atomic::Ordering;
use tracing::{debug, info};

use crate::state::AppState;

/// The agent's HTTP surface: a single WebSocket endpoint at `/ws`.
pub fn router(state: AppState) -> Router {
    Router::new().route("/ws", get(ws_handler)).with_state(state)
}

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: AppState) {
    let n = state.client_count.fetch_add(1, Ordering::Relaxed) + 1;
    info!(clients = n, "client connected");

    // Ensure we decrement on disconnect (drop).
    struct ClientGuard(AppState);
    impl Drop for ClientGuard {
        fn drop(&mut self) {
            let n = self.0.client_count.fetch_sub(1, Ordering::Relaxed) - 1;
            info!(clients = n, "client disconnected");
        }
    }
    let _guard = ClientGuard(state.clone());

    let mut samples = state.latest.subscribe();
    // Mark the current value seen; the client gets the next fresh sample.
    let _ = samples.borrow_and_update();

    loop {
        tokio::select! {
            changed = samples.changed() => {
                if changed.is_err() {
                    break;
                }
                let js = samples.borrow_and_update().clone();
                if socket.send(Message::Text(js)).await.is_err() {
                    break;
                }
            }
            msg = socket.recv() => match msg {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(other)) => debug!(?other, "ignoring client message"),
            },
        }
    }
}
