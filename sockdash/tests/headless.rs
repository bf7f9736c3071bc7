//! `--headless` end to end: the binary prints each snapshot as a JSON line
//! and exits cleanly when the agent closes the socket.

use std::time::Duration;

use assert_cmd::Command;
use futures_util::SinkExt;
use tokio::net::TcpListener;
use tokio_tungstenite::{accept_async, tungstenite::Message};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn headless_prints_snapshots_until_remote_close() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}/ws", listener.local_addr().unwrap());
    let server = tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(tcp).await.unwrap();
        for recv in [1000u64, 1900] {
            let frame = format!(r#"{{"net_recv": {recv}, "cpu_percent": 12.5}}"#);
            ws.send(Message::Text(frame)).await.unwrap();
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        let _ = ws.close(None).await;
    });

    // assert_cmd blocks; keep it off the runtime thread serving the socket.
    let out = tokio::task::spawn_blocking(move || {
        Command::cargo_bin("sockdash")
            .unwrap()
            .env_remove("SOCKDASH_WS")
            .args(["--headless", url.as_str()])
            .timeout(Duration::from_secs(20))
            .output()
            .unwrap()
    })
    .await
    .unwrap();
    server.await.unwrap();

    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8(out.stdout).unwrap();
    let lines: Vec<serde_json::Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    // watch coalesces; the final snapshot is always delivered
    assert!((1..=2).contains(&lines.len()), "{stdout}");
    let last = lines.last().unwrap();
    assert_eq!(last["sample"]["net_recv"], 1900);
    assert_eq!(last["sample"]["cpu_percent"], 12.5);
    assert_eq!(last["rates"]["recv_delta"], 900);
    assert_eq!(last["window"]["points"].as_array().unwrap().len(), 10);
}

#[test]
fn headless_connect_failure_exits_nonzero() {
    // Bind then drop to get a port nobody listens on.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let url = format!("ws://127.0.0.1:{port}/ws");
    Command::cargo_bin("sockdash")
        .unwrap()
        .env_remove("SOCKDASH_WS")
        .args(["--headless", url.as_str()])
        .timeout(Duration::from_secs(20))
        .assert()
        .failure();
}
