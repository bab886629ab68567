//! Error types for the engine

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("stream error: {0}")]
    Stream(#[from] avachat_stream::StreamError),

    #[error("speech error: {0}")]
    Speech(#[from] avachat_avatar::AvatarError),

    #[error("invalid session state: expected {expected}, was {actual}")]
    InvalidState {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("session terminated")]
    SessionTerminated,

    #[error("persist error: {0}")]
    Persist(#[from] avachat_core::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;
