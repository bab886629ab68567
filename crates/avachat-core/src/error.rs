//! Error types for Avachat

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("chat not found: {0}")]
    ChatNotFound(String),

    #[error("chat already exists: {0}")]
    ChatExists(String),

    #[error("invalid chat name: {0}")]
    InvalidChatName(String),

    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
