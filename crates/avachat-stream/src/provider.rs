//! Response provider trait

use futures::Stream;
use std::pin::Pin;
use tokio_util::sync::CancellationToken;

/// Result type for stream operations
pub type StreamResult<T> = Result<T, StreamError>;

/// Stream error types
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("authentication failed: {0}")]
    AuthFailed(String),

    #[error("stream error: {0}")]
    StreamError(String),

    #[error("cancelled")]
    Cancelled,

    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

/// One item of a generation stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChunkDelta {
    Text(String),
    Done,
}

/// Stream type for generated replies
pub type ChunkStream = Pin<Box<dyn Stream<Item = StreamResult<ChunkDelta>> + Send>>;

/// Text-generation backend seam
#[async_trait::async_trait]
pub trait ResponseProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Open a generation stream for one turn. If `cancel` is provided and
    /// triggered, the underlying transport is dropped and the stream yields
    /// `StreamError::Cancelled`.
    async fn open_stream(
        &self,
        transcript: &str,
        model: &str,
        cancel: Option<CancellationToken>,
    ) -> StreamResult<ChunkStream>;
}
