//! SSE client for the generate-assistant-response endpoint

use crate::provider::{ChunkDelta, ChunkStream, ResponseProvider, StreamError, StreamResult};
use eventsource_stream::Eventsource;
use futures::StreamExt;
use reqwest::Client;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

/// Sentinel payload the backend emits after the last content chunk.
pub const END_OF_STREAM_MARKER: &str = "__END_OF_STREAM__";

pub struct SseResponseProvider {
    client: Client,
    base_url: String,
}

impl SseResponseProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Build the parameterized endpoint URL. The `t` query param is a
    /// cache-buster so intermediaries never replay a previous reply.
    pub fn endpoint(&self, transcript: &str, model: &str) -> StreamResult<url::Url> {
        let mut url = url::Url::parse(&format!(
            "{}/api/generate-assistant-response",
            self.base_url
        ))
        .map_err(|e| StreamError::RequestFailed(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("prompt", transcript)
            .append_pair("model", model)
            .append_pair("t", &chrono::Utc::now().timestamp_millis().to_string());
        Ok(url)
    }
}

#[async_trait::async_trait]
impl ResponseProvider for SseResponseProvider {
    fn name(&self) -> &str {
        "sse"
    }

    async fn open_stream(
        &self,
        transcript: &str,
        model: &str,
        cancel: Option<CancellationToken>,
    ) -> StreamResult<ChunkStream> {
        let url = self.endpoint(transcript, model)?;
        debug!("opening response stream: model={}", model);

        let response = self
            .client
            .get(url)
            .header("accept", "text/event-stream")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("backend error {}: {}", status, error_text);
            if status.as_u16() == 401 || status.as_u16() == 403 {
                return Err(StreamError::AuthFailed(error_text));
            }
            return Err(StreamError::RequestFailed(format!(
                "{}: {}",
                status, error_text
            )));
        }

        Ok(chunk_stream(response.bytes_stream(), cancel))
    }
}

/// Map an SSE byte stream into chunk deltas. The end-of-stream marker
/// terminates the stream after a `Done`; transport failures terminate it
/// after a `StreamError`. Triggering `cancel` drops the source, which closes
/// the transport.
pub fn chunk_stream<S, B, E>(bytes: S, cancel: Option<CancellationToken>) -> ChunkStream
where
    S: futures::Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    let cancel = cancel.unwrap_or_default();
    Box::pin(async_stream::stream! {
        let mut events = Box::pin(bytes.eventsource());
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("response stream cancelled");
                    yield Err(StreamError::Cancelled);
                    break;
                }
                event = events.next() => {
                    match event {
                        Some(Ok(ev)) => {
                            if ev.data == END_OF_STREAM_MARKER {
                                yield Ok(ChunkDelta::Done);
                                break;
                            }
                            yield Ok(ChunkDelta::Text(ev.data));
                        }
                        Some(Err(e)) => {
                            yield Err(StreamError::StreamError(e.to_string()));
                            break;
                        }
                        None => break,
                    }
                }
            }
        }
    })
}
