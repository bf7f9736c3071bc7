//! sockdash_agent: pushes one host sample per interval to every WebSocket client.

mod metrics;
mod sampler;
mod state;
mod types;
mod ws;

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::sampler::spawn_sampler;
use crate::state::AppState;
use crate::ws::router;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_INTERVAL: Duration = Duration::from_secs(3);

#[derive(Debug, PartialEq)]
struct AgentArgs {
    port: u16,
    interval: Duration,
}

fn parse_interval(v: &str) -> Option<Duration> {
    v.parse::<f64>()
        .ok()
        .filter(|s| s.is_finite() && *s > 0.0)
        .map(Duration::from_secs_f64)
}

#[derive(Debug, PartialEq)]
enum ArgsError {
    Help(String),
    Invalid(String),
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<AgentArgs, ArgsError> {
    let mut it = args.into_iter();
    let prog = it.next().unwrap_or_else(|| "sockdash_agent".into());
    let mut port: Option<String> = std::env::var("SOCKDASH_AGENT_PORT").ok();
    let mut interval: Option<String> = std::env::var("SOCKDASH_AGENT_INTERVAL").ok();

    while let Some(a) = it.next() {
        match a.as_str() {
            "-h" | "--help" => {
                return Err(ArgsError::Help(format!(
                    "Usage: {prog} [--port PORT|-p PORT] [--interval SECS|-i SECS]"
                )))
            }
            "--port" | "-p" => port = it.next(),
            "--interval" | "-i" => interval = it.next(),
            _ if a.starts_with("--port=") => port = a.split_once('=').map(|(_, v)| v.to_string()),
            _ if a.starts_with("--interval=") => {
                interval = a.split_once('=').map(|(_, v)| v.to_string())
            }
            _ => {
                return Err(ArgsError::Invalid(format!(
                    "Unexpected argument '{a}'. Try {prog} --help"
                )))
            }
        }
    }

    let port = match port {
        Some(p) => p.parse::<u16>().map_err(|_| ArgsError::Invalid(format!("invalid port '{p}'")))?,
        None => DEFAULT_PORT,
    };
    let interval = match interval {
        Some(v) => parse_interval(&v).ok_or_else(|| ArgsError::Invalid(format!("invalid interval '{v}'")))?,
        None => DEFAULT_INTERVAL,
    };
    Ok(AgentArgs { port, interval })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = match parse_args(std::env::args()) {
        Ok(a) => a,
        Err(ArgsError::Help(usage)) => {
            eprintln!("{usage}");
            return Ok(());
        }
        Err(ArgsError::Invalid(msg)) => anyhow::bail!(msg),
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let state = AppState::new(args.interval);
    let _sampler = spawn_sampler(state.clone());

    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    info!(%addr, interval_secs = args.interval.as_secs_f64(), "sockdash_agent listening on ws://{addr}/ws");

    tokio::select! {
        res = axum::serve(listener, app).into_future() => res.context("server error")?,
        _ = tokio::signal::ctrl_c() => info!("shutting down"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        std::iter::once("sockdash_agent").chain(v.iter().copied()).map(String::from).collect()
    }

    #[test]
    fn rejects_garbage() {
        for bad in [&["--port", "nope"][..], &["--port", "99999"][..], &["-i", "-1"][..], &["--bogus"][..]] {
            assert!(matches!(parse_args(args(bad)), Err(ArgsError::Invalid(_))), "{bad:?}");
        }
        match parse_args(args(&["--help"])) {
            Err(ArgsError::Help(usage)) => assert!(usage.starts_with("Usage:")),
            other => panic!("expected help, got {other:?}"),
        }
    }
}
