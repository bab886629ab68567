//! Avachat Avatar - client seams for the avatar-rendering service
//!
//! The rendering and streaming pipeline itself belongs to the external
//! service; this crate holds the pieces the engine talks to: the session
//! token client, the speech-synthesis sink, and the snapshot fan-out bus.

pub mod snapshot;
pub mod speech;
pub mod token;

pub use snapshot::{SnapshotBus, SnapshotSubscription};
pub use speech::{ChannelSpeechSink, NullSpeechSink, SpeechEvent, SpeechSink};
pub use token::{SessionToken, SessionTokenClient};

/// Result type for avatar-service operations
pub type AvatarResult<T> = Result<T, AvatarError>;

/// Avatar error types
#[derive(Debug, thiserror::Error)]
pub enum AvatarError {
    #[error("token fetch failed: {0}")]
    TokenFetch(String),

    #[error("empty session token payload")]
    EmptyToken,

    #[error("speech stream closed")]
    SpeechClosed,

    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}
