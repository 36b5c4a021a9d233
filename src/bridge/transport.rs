// SPDX-License-Identifier: MPL-2.0
//! Newline-delimited JSON framing between the two processes.
//!
//! The presentation side writes one [`InboundFrame`] per line; the host
//! answers every `invoke` frame with one [`Envelope`] per line. `send` frames
//! get no answer. Replies are written in completion order, not request order;
//! the request id is the only correlation.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;

use super::dispatch::Dispatcher;
use super::envelope::{Envelope, RawRequest, RequestId};
use super::error::BridgeError;
use crate::config::MAX_FRAME_BYTES;
use crate::diagnostics::sanitize_message;

/// Replies waiting for the writer before `serve` applies backpressure.
const OUTBOUND_QUEUE: usize = 64;

/// One inbound line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundFrame {
    /// Call expecting exactly one envelope back.
    Invoke { channel: String, request: RawRequest },
    /// One-way signal.
    Send { channel: String, request: RawRequest },
}

enum Frame {
    Line(Vec<u8>),
    Oversized,
    Eof,
}

/// Reads one line of at most [`MAX_FRAME_BYTES`]. Longer lines are consumed
/// up to their newline and reported as oversized.
async fn next_frame<R>(reader: &mut R) -> std::io::Result<Frame>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let limit = MAX_FRAME_BYTES as u64 + 1;
    let read = (&mut *reader).take(limit).read_until(b'\n', &mut buf).await?;
    if read == 0 {
        return Ok(Frame::Eof);
    }
    if buf.ends_with(b"\n") || buf.len() <= MAX_FRAME_BYTES {
        return Ok(Frame::Line(buf));
    }

    let mut sink = Vec::new();
    loop {
        sink.clear();
        let n = (&mut *reader).take(64 * 1024).read_until(b'\n', &mut sink).await?;
        if n == 0 || sink.ends_with(b"\n") {
            return Ok(Frame::Oversized);
        }
    }
}

/// Best-effort id recovery from a frame that did not decode, so the caller
/// waiting on it is not left hanging. Returns `None` for signals.
fn salvage_request_id(line: &[u8]) -> Option<RequestId> {
    let value: Value = serde_json::from_slice(line).ok()?;
    if value.get("type").and_then(Value::as_str) == Some("send") {
        return None;
    }
    let id = value.get("request")?.get("id")?.as_str()?;
    RequestId::try_from(id.to_string()).ok()
}

async fn write_loop<W>(mut writer: W, mut rx: mpsc::Receiver<String>) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(line) = rx.recv().await {
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }
    Ok(())
}

fn encode(envelope: &Envelope) -> Option<String> {
    match serde_json::to_string(envelope) {
        Ok(line) => Some(line),
        Err(err) => {
            log::error!("Failed to encode envelope {}: {err}", envelope.request_id());
            None
        }
    }
}

/// Serves the protocol until the input ends or `shutdown` turns `true`.
///
/// On end of input, in-flight calls are allowed to finish and their replies
/// are flushed. On shutdown, in-flight calls are aborted.
///
/// # Errors
///
/// Returns I/O errors from reading the input or writing replies.
pub async fn serve<R, W>(
    dispatcher: Dispatcher,
    mut reader: R,
    writer: W,
    mut shutdown: watch::Receiver<bool>,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<String>(OUTBOUND_QUEUE);
    let writer_task = tokio::spawn(write_loop(writer, rx));
    let mut calls = JoinSet::new();
    let mut aborted = *shutdown.borrow_and_update();
    let mut watching = true;

    while !aborted {
        while calls.try_join_next().is_some() {}

        let frame = tokio::select! {
            frame = next_frame(&mut reader) => frame?,
            changed = shutdown.changed(), if watching => {
                if changed.is_err() {
                    watching = false;
                } else if *shutdown.borrow_and_update() {
                    log::info!("Shutdown requested; aborting {} in-flight call(s)", calls.len());
                    aborted = true;
                }
                continue;
            }
        };

        let line = match frame {
            Frame::Eof => break,
            Frame::Oversized => {
                log::warn!("Dropped inbound frame larger than {MAX_FRAME_BYTES} bytes");
                continue;
            }
            Frame::Line(line) => line,
        };
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        match serde_json::from_slice::<InboundFrame>(&line) {
            Ok(InboundFrame::Invoke { channel, request }) => {
                let dispatcher = dispatcher.clone();
                let tx = tx.clone();
                calls.spawn(async move {
                    let envelope = dispatcher.call(&channel, request).await;
                    if let Some(line) = encode(&envelope) {
                        let _ = tx.send(line).await;
                    }
                });
            }
            Ok(InboundFrame::Send { channel, request }) => dispatcher.signal(&channel, request),
            Err(err) => {
                let reason = sanitize_message(&err.to_string());
                log::warn!("Malformed inbound frame: {reason}");
                if let Some(id) = salvage_request_id(&line) {
                    let envelope = Envelope::failure(
                        id,
                        BridgeError::validation(format!("malformed request: {reason}")),
                    );
                    if let Some(line) = encode(&envelope) {
                        if tx.send(line).await.is_err() {
                            break;
                        }
                    }
                }
            }
        }
    }

    if aborted {
        calls.shutdown().await;
    } else {
        while calls.join_next().await.is_some() {}
    }
    drop(tx);

    match writer_task.await {
        Ok(result) => result,
        Err(err) => Err(std::io::Error::other(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn frames_split_on_newlines() {
        let mut input: &[u8] = b"{\"a\":1}\n{\"b\":2}";
        let Frame::Line(first) = next_frame(&mut input).await.unwrap() else {
            panic!("expected a line");
        };
        assert_eq!(first, b"{\"a\":1}\n");
        let Frame::Line(second) = next_frame(&mut input).await.unwrap() else {
            panic!("expected a trailing line");
        };
        assert_eq!(second, b"{\"b\":2}");
        assert!(matches!(next_frame(&mut input).await.unwrap(), Frame::Eof));
    }

    #[tokio::test]
    async fn oversized_frame_is_skipped_whole() {
        let mut data = vec![b'x'; MAX_FRAME_BYTES + 10];
        data.extend_from_slice(b"\n{}\n");
        let mut input: &[u8] = &data;
        assert!(matches!(next_frame(&mut input).await.unwrap(), Frame::Oversized));
        let Frame::Line(next) = next_frame(&mut input).await.unwrap() else {
            panic!("expected the following frame");
        };
        assert_eq!(next, b"{}\n");
    }

    #[test]
    fn salvages_id_from_invoke_with_bad_payload_shape() {
        let line = json!({
            "type": "invoke",
            "request": { "id": "abc", "payload": {} }
        })
        .to_string();
        assert_eq!(
            salvage_request_id(line.as_bytes()),
            Some(RequestId::try_from("abc".to_string()).unwrap())
        );
    }

    #[test]
    fn does_not_answer_broken_signals() {
        let line = json!({ "type": "send", "request": { "id": "abc" } }).to_string();
        assert_eq!(salvage_request_id(line.as_bytes()), None);
        assert_eq!(salvage_request_id(b"not json"), None);
    }

    #[test]
    fn inbound_frame_wire_shape() {
        let frame: InboundFrame = serde_json::from_value(json!({
            "type": "invoke",
            "channel": "window:get-state",
            "request": { "id": "r1", "payload": {}, "timestamp": 1 }
        }))
        .unwrap();
        let InboundFrame::Invoke { channel, request } = frame else {
            panic!("expected invoke");
        };
        assert_eq!(channel, "window:get-state");
        assert_eq!(request.id.as_str(), "r1");
    }
}
