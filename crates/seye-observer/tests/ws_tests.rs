//! End-to-end tests for the `WebSocket` feed over a real TCP socket.
//!
//! Each test binds the router to an ephemeral port and talks to it with
//! a `tokio-tungstenite` client, so the full connection lifecycle runs:
//! upgrade, initial frame, commands, and deregistration on close.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, Stream, StreamExt};
use rand::SeedableRng;
use rand::rngs::StdRng;
use seye_core::config::SeyeConfig;
use seye_core::store::{StoreSettings, TrackStore};
use seye_observer::router::build_router;
use seye_observer::state::AppState;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

async fn serve() -> (SocketAddr, Arc<AppState>) {
    let store = TrackStore::with_rng(StoreSettings::default(), StdRng::seed_from_u64(7));
    let state = Arc::new(AppState::new(store.into_shared(), &SeyeConfig::default()));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = build_router(Arc::clone(&state));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, state)
}

/// Read text frames until one carries `event`.
async fn next_event<S>(stream: &mut S, event: &str) -> Value
where
    S: Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), stream.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        if let Message::Text(text) = msg {
            let json: Value = serde_json::from_str(text.as_str()).unwrap();
            if json["event"] == event {
                return json;
            }
        }
    }
}

async fn wait_for_subscribers(state: &AppState, expected: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while state.registry.len() != expected {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn connect_receives_seeded_picture() {
    let (addr, state) = serve().await;
    let (mut ws, _) = connect_async(format!("ws://{addr}/ws")).await.unwrap();

    let frame = next_event(&mut ws, "flightData").await;
    let count = frame["data"].as_array().unwrap().len();
    assert!((5..=10).contains(&count));
    assert_eq!(state.registry.len(), 1);
}

#[tokio::test]
async fn closing_the_socket_deregisters_the_subscriber() {
    let (addr, state) = serve().await;
    let (mut first, _) = connect_async(format!("ws://{addr}/ws")).await.unwrap();
    let (mut second, _) = connect_async(format!("ws://{addr}/socket")).await.unwrap();
    next_event(&mut first, "flightData").await;
    next_event(&mut second, "flightData").await;
    assert_eq!(state.registry.len(), 2);

    first.close(None).await.unwrap();
    wait_for_subscribers(&state, 1).await;

    drop(second);
    wait_for_subscribers(&state, 0).await;
}

#[tokio::test]
async fn socket_command_is_acknowledged_and_broadcast() {
    let (addr, state) = serve().await;
    let (mut commander, _) = connect_async(format!("ws://{addr}/ws")).await.unwrap();
    let (mut watcher, _) = connect_async(format!("ws://{addr}/ws")).await.unwrap();
    next_event(&mut commander, "flightData").await;
    next_event(&mut watcher, "flightData").await;

    commander
        .send(Message::text(
            r#"{"event":"removeAircraft","data":"FLT-1000"}"#,
        ))
        .await
        .unwrap();

    let reply = next_event(&mut commander, "commandResult").await;
    assert_eq!(reply["data"]["status"], "success");

    let frame = next_event(&mut watcher, "flightData").await;
    let ids: Vec<&str> = frame["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|r| r["id"].as_str())
        .collect();
    assert!(!ids.contains(&"FLT-1000"));
    assert!(state.store.lock().await.get(&"FLT-1000".into()).is_none());
}
