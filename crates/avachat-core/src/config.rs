//! Avachat config: serde structs for ~/.avachat/config.json
//!
//! Pure types and parsing only. Every field is optional; accessors supply
//! the defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_AVATAR_URL: &str = "https://api.anam.ai";
const DEFAULT_MODEL: &str = "MARIA_MODEL";
const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AvachatConfig {
    pub backend: CfgBackend,
    pub avatar: CfgAvatar,
    pub session: CfgSession,
    pub storage: CfgStorage,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CfgBackend {
    #[serde(rename = "baseUrl")]
    pub base_url: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CfgAvatar {
    #[serde(rename = "baseUrl")]
    pub base_url: Option<String>,
    #[serde(rename = "personaId")]
    pub persona_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CfgSession {
    #[serde(rename = "idleTimeoutSecs")]
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CfgStorage {
    pub dir: Option<String>,
}

impl AvachatConfig {
    /// Load from a specific path.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Discover from ~/.avachat/config.json.
    pub fn discover() -> Self {
        Self::load(&Self::default_path())
    }

    /// Default path: ~/.avachat/config.json
    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        PathBuf::from(home).join(".avachat").join("config.json")
    }

    pub fn backend_base_url(&self) -> &str {
        self.backend.base_url.as_deref().unwrap_or(DEFAULT_BACKEND_URL)
    }

    pub fn default_model(&self) -> &str {
        self.backend.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn avatar_base_url(&self) -> &str {
        self.avatar.base_url.as_deref().unwrap_or(DEFAULT_AVATAR_URL)
    }

    pub fn persona_id(&self) -> Option<&str> {
        self.avatar.persona_id.as_deref()
    }

    /// Coarse whole-session idle timeout.
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(
            self.session
                .idle_timeout_secs
                .unwrap_or(DEFAULT_IDLE_TIMEOUT_SECS),
        )
    }

    /// Chat storage root, defaulting to ~/.avachat/chats.
    pub fn storage_dir(&self) -> PathBuf {
        self.storage
            .dir
            .as_ref()
            .map(|d| expand_tilde(d))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
                PathBuf::from(home).join(".avachat").join("chats")
            })
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(path)
}
