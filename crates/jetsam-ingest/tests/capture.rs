//! Capture loop integration tests against a local WebSocket server.

use std::time::{Duration, Instant};

use futures_util::{SinkExt, StreamExt};
use jetsam_ingest::{JetstreamConfig, JetstreamSource};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

fn post_message(rkey: u32) -> String {
    format!(
        r#"{{"did":"did:plc:flood","kind":"commit","commit":{{"collection":"app.bsky.feed.post","operation":"create","rkey":"{rkey}","record":{{"text":"post {rkey}","langs":["en"],"createdAt":"2025-06-01T12:00:00Z"}}}}}}"#
    )
}

/// Bind a local server; the given task drives each accepted connection.
async fn spawn_server<F, Fut>(on_connect: F) -> String
where
    F: Fn(tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>) -> Fut + Send + 'static,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            on_connect(ws).await;
        }
    });

    format!("ws://{addr}")
}

fn config(endpoint: String, secs: u64) -> JetstreamConfig {
    JetstreamConfig {
        endpoint,
        capture_duration: Duration::from_secs(secs),
        recv_timeout: Duration::from_millis(200),
        ping_interval: Duration::from_millis(500),
    }
}

#[tokio::test]
async fn silent_stream_still_terminates_on_deadline() {
    // Server accepts and then only drains frames (answers nothing).
    let endpoint = spawn_server(|mut ws| async move {
        while let Some(Ok(_)) = ws.next().await {}
    })
    .await;

    let source = JetstreamSource::new(config(endpoint, 1));
    let start = Instant::now();
    let stats = source.run_async(|_| Ok(true)).await.unwrap();

    assert!(
        start.elapsed() < Duration::from_secs(3),
        "capture overran its deadline: {:?}",
        start.elapsed()
    );
    assert_eq!(stats.accepted_posts, 0);
}

#[tokio::test]
async fn flooded_stream_still_terminates_on_deadline() {
    // Server floods valid post messages as fast as the socket accepts them.
    let endpoint = spawn_server(|mut ws| async move {
        let mut rkey = 0u32;
        loop {
            rkey += 1;
            if ws.send(Message::Text(post_message(rkey))).await.is_err() {
                return;
            }
        }
    })
    .await;

    let source = JetstreamSource::new(config(endpoint, 1));
    let start = Instant::now();
    let stats = source.run_async(|_| Ok(true)).await.unwrap();

    assert!(
        start.elapsed() < Duration::from_secs(3),
        "capture overran its deadline: {:?}",
        start.elapsed()
    );
    assert!(stats.accepted_posts > 0);
    assert_eq!(stats.total_messages, stats.accepted_posts);
}

#[tokio::test]
async fn handler_can_stop_capture_early() {
    let endpoint = spawn_server(|mut ws| async move {
        let _ = ws.send(Message::Text(post_message(1))).await;
        while let Some(Ok(_)) = ws.next().await {}
    })
    .await;

    let source = JetstreamSource::new(config(endpoint, 30));
    let start = Instant::now();
    let stats = source.run_async(|_| Ok(false)).await.unwrap();

    assert!(start.elapsed() < Duration::from_secs(5));
    assert_eq!(stats.accepted_posts, 1);
}

#[tokio::test]
async fn irrelevant_messages_are_counted_and_dropped() {
    let endpoint = spawn_server(|mut ws| async move {
        let frames = [
            r#"{"did":"did:plc:x","kind":"identity"}"#.to_string(),
            "not json".to_string(),
            post_message(7),
        ];
        for frame in frames {
            let _ = ws.send(Message::Text(frame)).await;
        }
        while let Some(Ok(_)) = ws.next().await {}
    })
    .await;

    let source = JetstreamSource::new(config(endpoint, 1));
    let stats = source.run_async(|_| Ok(true)).await.unwrap();

    assert_eq!(stats.accepted_posts, 1);
    assert_eq!(stats.rejected_messages, 2);
    assert_eq!(stats.total_messages, 3);
}
