//! Core types for Avachat

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Chat identifier - cheaply cloneable
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct ChatKey(Arc<str>);

impl ChatKey {
    pub fn new(s: impl Into<String>) -> Self {
        Self(Arc::from(s.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChatKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ChatKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for ChatKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Conversation entry author
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized conversation entry. Snapshots, persisted turns, and display
/// all use this shape; the wire-shaped `RawEntry` is decoded into it exactly
/// once at the boundary.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TranscriptEntry {
    pub role: Role,
    #[serde(rename = "content")]
    pub text: String,
}

impl TranscriptEntry {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// Wire-shaped entry as delivered by the transcription service. `content`
/// arrives either as a bare string or as a list of text blocks.
#[derive(Clone, Debug, Deserialize)]
pub struct RawEntry {
    pub role: String,
    #[serde(default)]
    pub content: Option<RawContent>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum RawContent {
    Text(String),
    Blocks(Vec<RawBlock>),
}

#[derive(Clone, Debug, Deserialize)]
pub struct RawBlock {
    #[serde(default)]
    pub text: Option<String>,
}

impl RawEntry {
    /// Decode into the normalized shape. Entries with an unknown role or no
    /// extractable text are rejected rather than probed again downstream.
    pub fn normalize(&self) -> Option<TranscriptEntry> {
        let role = Role::parse(&self.role)?;
        let text = match self.content.as_ref()? {
            RawContent::Text(s) => s.clone(),
            RawContent::Blocks(blocks) => {
                let parts: Vec<&str> = blocks.iter().filter_map(|b| b.text.as_deref()).collect();
                if parts.is_empty() {
                    return None;
                }
                parts.join(" ")
            }
        };
        Some(TranscriptEntry { role, text })
    }
}

/// Normalize a full snapshot, dropping malformed entries.
pub fn normalize_snapshot(raw: &[RawEntry]) -> Vec<TranscriptEntry> {
    raw.iter().filter_map(RawEntry::normalize).collect()
}
