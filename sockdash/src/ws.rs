//! WebSocket session driver: connects to the agent and feeds every pushed
//! frame through the pipeline until the connection ends.

use std::future::Future;
use std::pin::Pin;

use futures_util::StreamExt;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async, tungstenite, tungstenite::Message, MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, info};

use crate::pipeline::Pipeline;

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("connect to {url} failed: {source}")]
    Connect {
        url: String,
        #[source]
        source: tungstenite::Error,
    },
    #[error("websocket error: {0}")]
    Socket(#[from] tungstenite::Error),
}

/// How a session that connected successfully came to an end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The agent sent a close frame or the stream ended.
    RemoteClosed,
    /// The caller's shutdown signal fired.
    Shutdown,
}

// Connect to the agent and return the WS stream
pub async fn connect(url: &str) -> Result<WsStream, SessionError> {
    let (ws, _) = connect_async(url).await.map_err(|source| SessionError::Connect {
        url: url.to_string(),
        source,
    })?;
    Ok(ws)
}

/// Run one connection to completion.
///
/// The socket lives only inside this call and is closed on every exit path.
/// When `shutdown` resolves, even mid-handshake, the session closes and returns
/// [`SessionEnd::Shutdown`]. There is no reconnect; call again for that.
pub async fn run_session<S>(
    url: &str,
    pipeline: &mut Pipeline,
    shutdown: S,
) -> Result<SessionEnd, SessionError>
where
    S: Future,
{
    tokio::pin!(shutdown);
    pipeline.connect_started();

    // The handshake can stall (peer accepts TCP and goes quiet), so it must
    // yield to shutdown too. Dropping the connect future drops the socket.
    let connecting = tokio::select! {
        res = connect(url) => Some(res),
        _ = &mut shutdown => None,
    };
    let mut ws = match connecting {
        Some(Ok(ws)) => ws,
        Some(Err(e)) => {
            pipeline.fail(&e);
            return Err(e);
        }
        None => {
            info!(%url, "shutdown while connecting");
            pipeline.close();
            return Ok(SessionEnd::Shutdown);
        }
    };
    pipeline.connected();
    info!(%url, "connected");

    let res = pump(&mut ws, pipeline, shutdown.as_mut()).await;

    // Best effort: the peer may already be gone.
    if let Err(e) = ws.close(None).await {
        debug!(error = %e, "close handshake");
    }
    match &res {
        Ok(end) => {
            info!(?end, "session ended");
            pipeline.close();
        }
        Err(e) => pipeline.fail(e),
    }
    res
}

async fn pump<S>(
    ws: &mut WsStream,
    pipeline: &mut Pipeline,
    mut shutdown: Pin<&mut S>,
) -> Result<SessionEnd, SessionError>
where
    S: Future,
{
    loop {
        tokio::select! {
            _ = &mut shutdown => return Ok(SessionEnd::Shutdown),
            msg = ws.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    // Parse errors are logged by the pipeline and do not end the session.
                    let _ = pipeline.feed(&text);
                }
                Some(Ok(Message::Close(frame))) => {
                    debug!(?frame, "close frame from agent");
                    return Ok(SessionEnd::RemoteClosed);
                }
                Some(Ok(other)) => {
                    debug!(kind = message_kind(&other), "ignoring non-text frame");
                }
                Some(Err(e)) => return Err(e.into()),
                None => return Ok(SessionEnd::RemoteClosed),
            },
        }
    }
}

fn message_kind(m: &Message) -> &'static str {
    match m {
        Message::Text(_) => "text",
        Message::Binary(_) => "binary",
        Message::Ping(_) => "ping",
        Message::Pong(_) => "pong",
        Message::Close(_) => "close",
        Message::Frame(_) => "frame",
    }
}
