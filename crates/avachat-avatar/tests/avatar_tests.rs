//! Tests for avachat-avatar: token validation, speech sinks, snapshot bus.

use avachat_avatar::{
    token::validate_token, AvatarError, ChannelSpeechSink, NullSpeechSink, SessionToken,
    SnapshotBus, SpeechEvent, SpeechSink,
};
use avachat_core::{RawEntry, TranscriptEntry};

#[test]
fn test_session_token_deserialize() {
    let token: SessionToken = serde_json::from_str(
        r#"{"sessionToken": "tok-abc", "expiresAt": "2026-01-01T00:00:00Z"}"#,
    )
    .unwrap();
    assert_eq!(token.session_token, "tok-abc");
    assert_eq!(token.expires_at.as_deref(), Some("2026-01-01T00:00:00Z"));
}

#[test]
fn test_validate_token_rejects_empty() {
    let token: SessionToken = serde_json::from_str(r#"{"sessionToken": ""}"#).unwrap();
    match validate_token(token) {
        Err(AvatarError::EmptyToken) => {}
        other => panic!("expected empty-token error, got {:?}", other.map(|t| t.session_token)),
    }
}

#[test]
fn test_null_speech_sink_inactive() {
    let sink = NullSpeechSink;
    assert!(!sink.is_active());
    sink.push_chunk("dropped", false);
}

#[tokio::test]
async fn test_channel_speech_sink_forwards_events() {
    let (sink, mut rx) = ChannelSpeechSink::new();
    assert!(sink.is_active());

    sink.push_chunk("Hello", false);
    sink.push_chunk(" world", true);
    sink.end_message().await.unwrap();

    assert_eq!(
        rx.recv().await.unwrap(),
        SpeechEvent::Chunk {
            text: "Hello".to_string(),
            is_final: false
        }
    );
    assert_eq!(
        rx.recv().await.unwrap(),
        SpeechEvent::Chunk {
            text: " world".to_string(),
            is_final: true
        }
    );
    assert_eq!(rx.recv().await.unwrap(), SpeechEvent::End);
}

#[tokio::test]
async fn test_channel_speech_sink_closed_receiver() {
    let (sink, rx) = ChannelSpeechSink::new();
    drop(rx);

    assert!(!sink.is_active());
    match sink.end_message().await {
        Err(AvatarError::SpeechClosed) => {}
        other => panic!("expected speech-closed error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_snapshot_bus_fan_out() {
    let bus = SnapshotBus::new();
    let mut a = bus.subscribe();
    let mut b = bus.subscribe();
    assert_eq!(bus.subscriber_count(), 2);

    bus.publish(vec![TranscriptEntry::user("hi")]);

    let got_a = a.recv().await.unwrap();
    let got_b = b.recv().await.unwrap();
    assert_eq!(*got_a, vec![TranscriptEntry::user("hi")]);
    assert_eq!(*got_a, *got_b);
}

#[test]
fn test_snapshot_subscription_drop_unregisters() {
    let bus = SnapshotBus::new();
    let sub = bus.subscribe();
    assert_eq!(bus.subscriber_count(), 1);
    drop(sub);
    assert_eq!(bus.subscriber_count(), 0);

    // publishing with no subscribers is a no-op
    bus.publish(vec![TranscriptEntry::assistant("nobody listening")]);
}

#[test]
fn test_publish_raw_normalizes_once() {
    let bus = SnapshotBus::new();
    let mut sub = bus.subscribe();

    let raw: Vec<RawEntry> = serde_json::from_str(
        r#"[
            {"role": "user", "content": "question"},
            {"role": "tool", "content": "dropped"},
            {"role": "assistant", "content": [{"text": "answer"}]}
        ]"#,
    )
    .unwrap();
    bus.publish_raw(&raw);

    let snapshot = sub.try_recv().unwrap();
    assert_eq!(
        *snapshot,
        vec![
            TranscriptEntry::user("question"),
            TranscriptEntry::assistant("answer"),
        ]
    );
}
