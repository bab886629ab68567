//! Tests for avachat-stream: SSE chunk decoding and endpoint construction.

use avachat_stream::{
    chunk_stream, ChunkDelta, SseResponseProvider, StreamError, END_OF_STREAM_MARKER,
};
use futures::StreamExt;
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
struct FakeTransportError;

impl std::fmt::Display for FakeTransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("connection reset")
    }
}

fn sse_bytes(events: &[&str]) -> Vec<Result<Vec<u8>, FakeTransportError>> {
    events
        .iter()
        .map(|data| Ok(format!("data: {}\n\n", data).into_bytes()))
        .collect()
}

#[tokio::test]
async fn test_chunk_stream_yields_text_then_done() {
    let bytes = futures::stream::iter(sse_bytes(&["Hello", " world", END_OF_STREAM_MARKER]));
    let mut stream = chunk_stream(bytes, None);

    assert_eq!(
        stream.next().await.unwrap().unwrap(),
        ChunkDelta::Text("Hello".to_string())
    );
    assert_eq!(
        stream.next().await.unwrap().unwrap(),
        ChunkDelta::Text(" world".to_string())
    );
    assert_eq!(stream.next().await.unwrap().unwrap(), ChunkDelta::Done);
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn test_chunk_stream_ends_without_marker() {
    let bytes = futures::stream::iter(sse_bytes(&["partial"]));
    let mut stream = chunk_stream(bytes, None);

    assert_eq!(
        stream.next().await.unwrap().unwrap(),
        ChunkDelta::Text("partial".to_string())
    );
    // source exhausted with no marker: stream just ends
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn test_chunk_stream_transport_error() {
    let bytes = futures::stream::iter(vec![
        Ok(b"data: ok\n\n".to_vec()),
        Err(FakeTransportError),
    ]);
    let mut stream = chunk_stream(bytes, None);

    assert_eq!(
        stream.next().await.unwrap().unwrap(),
        ChunkDelta::Text("ok".to_string())
    );
    match stream.next().await.unwrap() {
        Err(StreamError::StreamError(msg)) => assert!(msg.contains("connection reset")),
        other => panic!("expected stream error, got {:?}", other),
    }
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn test_chunk_stream_cancellation() {
    let cancel = CancellationToken::new();
    // pending source: only cancellation can produce an item
    let bytes = futures::stream::pending::<Result<Vec<u8>, FakeTransportError>>();
    let mut stream = chunk_stream(bytes, Some(cancel.clone()));

    cancel.cancel();
    match stream.next().await.unwrap() {
        Err(StreamError::Cancelled) => {}
        other => panic!("expected cancellation, got {:?}", other),
    }
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn test_chunk_stream_preserves_marker_inside_text() {
    // marker must match the whole event payload, not a substring
    let bytes = futures::stream::iter(sse_bytes(&["before __END_OF_STREAM__ after"]));
    let mut stream = chunk_stream(bytes, None);

    assert_eq!(
        stream.next().await.unwrap().unwrap(),
        ChunkDelta::Text("before __END_OF_STREAM__ after".to_string())
    );
}

#[test]
fn test_endpoint_url_query_params() {
    let provider = SseResponseProvider::new("http://localhost:8000/");
    let url = provider.endpoint("user: hi", "MARIA_MODEL").unwrap();

    assert_eq!(url.path(), "/api/generate-assistant-response");
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    assert_eq!(pairs[0], ("prompt".to_string(), "user: hi".to_string()));
    assert_eq!(pairs[1], ("model".to_string(), "MARIA_MODEL".to_string()));
    assert_eq!(pairs[2].0, "t");
    assert!(pairs[2].1.parse::<i64>().unwrap() > 0);
}

#[test]
fn test_endpoint_trims_trailing_slash() {
    let a = SseResponseProvider::new("http://localhost:8000");
    let b = SseResponseProvider::new("http://localhost:8000///");
    assert_eq!(
        a.endpoint("p", "m").unwrap().path(),
        b.endpoint("p", "m").unwrap().path()
    );
}
