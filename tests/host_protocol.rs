// SPDX-License-Identifier: MPL-2.0
//! The stdio protocol end to end: `serve` on one side of an in-memory pipe,
//! `LineTransport` (or raw lines) on the other.
mod common;

use std::sync::Arc;
use std::time::Duration;

use common::Harness;
use serde_json::json;
use tokio::io::{duplex, AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream};
use tokio::task::JoinHandle;
use zenconvert::bridge::client::call_raw;
use zenconvert::bridge::{serve, BridgeClient, Envelope, ErrorCode, LineTransport, Transport};
use zenconvert::domain::navigation::ToolType;

const PIPE: usize = 64 * 1024;
const DEADLINE: Duration = Duration::from_secs(5);

/// Starts a host on fresh pipes and returns the far ends.
fn start_host(h: &Harness) -> (DuplexStream, DuplexStream, JoinHandle<std::io::Result<()>>) {
    let (to_host, host_in) = duplex(PIPE);
    let (host_out, from_host) = duplex(PIPE);
    let server = tokio::spawn(serve(
        h.dispatcher.clone(),
        BufReader::new(host_in),
        host_out,
        h.window.closed(),
    ));
    (to_host, from_host, server)
}

fn connect(h: &Harness) -> (Arc<LineTransport>, JoinHandle<std::io::Result<()>>) {
    let (to_host, from_host, server) = start_host(h);
    let transport = Arc::new(LineTransport::spawn(BufReader::new(from_host), to_host));
    (transport, server)
}

async fn read_envelopes(stream: DuplexStream) -> Vec<Envelope> {
    let mut lines = BufReader::new(stream).lines();
    let mut out = Vec::new();
    while let Ok(Some(line)) = lines.next_line().await {
        out.push(serde_json::from_str(&line).expect("host wrote a valid envelope"));
    }
    out
}

#[tokio::test]
async fn typed_client_works_over_the_wire() {
    let h = Harness::new();
    let (transport, _server) = connect(&h);
    let client = BridgeClient::new(transport);

    let state = client.window_state().await.unwrap();
    assert_eq!(state, h.window.snapshot());

    client.set_tool(ToolType::VideoConverter).await;
    let nav = client.current_tool().await.unwrap();
    assert_eq!(nav.current_tool, ToolType::VideoConverter);
    assert_eq!(nav.previous_tool, Some(ToolType::ImageConverter));
}

#[tokio::test]
async fn concurrent_calls_are_routed_by_request_id() {
    let h = Harness::new();
    let (transport, _server) = connect(&h);

    let calls = (0..16).map(|i| {
        let transport = Arc::clone(&transport);
        async move {
            let url = format!("https://youtu.be/video{i}");
            let envelope = call_raw(transport.as_ref(), "youtube:get-info", json!({ "url": url }))
                .await
                .unwrap();
            (url, envelope)
        }
    });
    let results = futures_util::future::join_all(calls).await;

    for (url, envelope) in results {
        let data = envelope.into_result().unwrap();
        // The fake extractor echoes the URL into the description.
        assert_eq!(data["info"]["description"], json!(url));
    }
    assert_eq!(transport.in_flight(), 0);
}

#[tokio::test]
async fn unknown_channel_over_the_wire() {
    let h = Harness::new();
    let (transport, _server) = connect(&h);
    let envelope = call_raw(transport.as_ref(), "shell:exec", json!({ "cmd": "ls" }))
        .await
        .unwrap();
    assert_eq!(envelope.error().unwrap().code, ErrorCode::UnknownChannel);
    assert_eq!(h.collaborator_calls(), 0);
}

#[tokio::test]
async fn malformed_frames_are_answered_when_an_id_can_be_recovered() {
    let h = Harness::new();
    let (mut to_host, from_host, server) = start_host(&h);

    let frames = [
        // Not JSON at all: dropped silently.
        "this is not json".to_string(),
        // Bad timestamp but a usable id: answered.
        json!({
            "type": "invoke",
            "channel": "window:get-state",
            "request": { "id": "req-7", "payload": {}, "timestamp": "yesterday" }
        })
        .to_string(),
        // Broken signal: never answered.
        json!({ "type": "send", "channel": "window:close", "request": { "id": "sig-1" } })
            .to_string(),
        // Well-formed call after the noise.
        json!({
            "type": "invoke",
            "channel": "navigation:get-tool",
            "request": { "id": "req-8", "payload": null, "timestamp": 0 }
        })
        .to_string(),
    ];
    for frame in frames {
        to_host.write_all(frame.as_bytes()).await.unwrap();
        to_host.write_all(b"\n").await.unwrap();
    }
    drop(to_host);

    let envelopes = tokio::time::timeout(DEADLINE, read_envelopes(from_host))
        .await
        .unwrap();
    tokio::time::timeout(DEADLINE, server).await.unwrap().unwrap().unwrap();

    assert_eq!(envelopes.len(), 2);
    let malformed = envelopes.iter().find(|e| e.request_id().as_str() == "req-7").unwrap();
    assert_eq!(malformed.error().unwrap().code, ErrorCode::ValidationError);
    let ok = envelopes.iter().find(|e| e.request_id().as_str() == "req-8").unwrap();
    assert!(ok.is_success());
    assert!(!h.window.is_closed());
}

#[tokio::test]
async fn end_of_input_lets_in_flight_calls_finish() {
    let h = Harness::new();
    let (mut to_host, from_host, server) = start_host(&h);

    for i in 0..3 {
        let frame = json!({
            "type": "invoke",
            "channel": "youtube:get-info",
            "request": { "id": format!("late-{i}"), "payload": { "url": "https://youtu.be/x" }, "timestamp": 0 }
        });
        to_host.write_all(format!("{frame}\n").as_bytes()).await.unwrap();
    }
    to_host.shutdown().await.unwrap();
    drop(to_host);

    let envelopes = tokio::time::timeout(DEADLINE, read_envelopes(from_host))
        .await
        .unwrap();
    tokio::time::timeout(DEADLINE, server).await.unwrap().unwrap().unwrap();

    let mut ids: Vec<_> = envelopes.iter().map(|e| e.request_id().to_string()).collect();
    ids.sort();
    assert_eq!(ids, ["late-0", "late-1", "late-2"]);
    assert!(envelopes.iter().all(Envelope::is_success));
}

#[tokio::test]
async fn closing_the_window_stops_the_host() {
    let h = Harness::new();
    let (transport, server) = connect(&h);
    let client = BridgeClient::new(transport.clone());

    client.close_window().await;
    tokio::time::timeout(DEADLINE, server).await.unwrap().unwrap().unwrap();
    assert!(h.window.is_closed());

    // The host is gone; calls fail instead of hanging.
    let err = tokio::time::timeout(DEADLINE, client.window_state())
        .await
        .unwrap()
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InternalError);
}

#[tokio::test]
async fn waiting_calls_fail_when_the_host_disappears() {
    let (to_host, host_in) = duplex(PIPE);
    let (host_out, from_host) = duplex(PIPE);
    let transport = Arc::new(LineTransport::spawn(BufReader::new(from_host), to_host));

    let pending = {
        let transport = Arc::clone(&transport);
        tokio::spawn(async move {
            transport
                .call("window:get-state", zenconvert::bridge::Request::new(json!({})))
                .await
        })
    };
    while transport.in_flight() == 0 {
        tokio::task::yield_now().await;
    }
    drop(host_out);
    drop(host_in);

    let err = tokio::time::timeout(DEADLINE, pending)
        .await
        .unwrap()
        .unwrap()
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InternalError);
    assert!(err.message.contains("closed"));
}
