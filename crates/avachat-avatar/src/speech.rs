//! Speech-synthesis sink seam
//!
//! Chunks are forwarded the moment they arrive; display batching never
//! applies here.

use crate::{AvatarError, AvatarResult};
use tokio::sync::mpsc;

/// Downstream speech message sink.
#[async_trait::async_trait]
pub trait SpeechSink: Send + Sync {
    /// Whether a speech message is currently open downstream.
    fn is_active(&self) -> bool;

    /// Forward one chunk immediately.
    fn push_chunk(&self, text: &str, is_final: bool);

    /// Close the current speech message; resolves once downstream accepted
    /// the end marker.
    async fn end_message(&self) -> AvatarResult<()>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SpeechEvent {
    Chunk { text: String, is_final: bool },
    End,
}

/// Sink that drops everything; used when no avatar session is attached.
pub struct NullSpeechSink;

#[async_trait::async_trait]
impl SpeechSink for NullSpeechSink {
    fn is_active(&self) -> bool {
        false
    }

    fn push_chunk(&self, _text: &str, _is_final: bool) {}

    async fn end_message(&self) -> AvatarResult<()> {
        Ok(())
    }
}

/// Sink that forwards speech events over an unbounded channel. Active while
/// the receiver is alive.
pub struct ChannelSpeechSink {
    tx: mpsc::UnboundedSender<SpeechEvent>,
}

impl ChannelSpeechSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SpeechEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait::async_trait]
impl SpeechSink for ChannelSpeechSink {
    fn is_active(&self) -> bool {
        !self.tx.is_closed()
    }

    fn push_chunk(&self, text: &str, is_final: bool) {
        let _ = self.tx.send(SpeechEvent::Chunk {
            text: text.to_string(),
            is_final,
        });
    }

    async fn end_message(&self) -> AvatarResult<()> {
        self.tx
            .send(SpeechEvent::End)
            .map_err(|_| AvatarError::SpeechClosed)
    }
}
