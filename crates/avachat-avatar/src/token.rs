//! Session token client for the avatar service

use crate::{AvatarError, AvatarResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

const TOKEN_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Clone, Debug, Deserialize)]
pub struct SessionToken {
    #[serde(rename = "sessionToken")]
    pub session_token: String,
    #[serde(rename = "expiresAt")]
    pub expires_at: Option<String>,
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    #[serde(rename = "personaConfig")]
    persona_config: PersonaConfig<'a>,
}

#[derive(Serialize)]
struct PersonaConfig<'a> {
    #[serde(rename = "personaId")]
    persona_id: &'a str,
    #[serde(rename = "disableBrains")]
    disable_brains: bool,
}

pub struct SessionTokenClient {
    client: Client,
    base_url: String,
}

impl SessionTokenClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Fetch a session token for one persona. Brains stay disabled: reply
    /// generation goes through our own backend, the avatar only renders.
    pub async fn fetch(&self, persona_id: &str) -> AvatarResult<SessionToken> {
        let body = TokenRequest {
            persona_config: PersonaConfig {
                persona_id,
                disable_brains: true,
            },
        };

        debug!("fetching session token: persona={}", persona_id);

        let response = self
            .client
            .post(format!("{}/v1/auth/session-token", self.base_url))
            .timeout(TOKEN_TIMEOUT)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("token error {}: {}", status, error_text);
            return Err(AvatarError::TokenFetch(format!(
                "{}: {}",
                status, error_text
            )));
        }

        validate_token(response.json().await?)
    }
}

/// Reject 200 responses that carry no token.
pub fn validate_token(token: SessionToken) -> AvatarResult<SessionToken> {
    if token.session_token.is_empty() {
        return Err(AvatarError::EmptyToken);
    }
    Ok(token)
}
