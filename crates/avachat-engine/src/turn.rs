//! One conversation turn: generation chunks → speech sink + batched display

use crate::buffer::StreamBuffer;
use crate::error::EngineResult;
use crate::surface::{DisplaySurface, FrameScheduler};
use avachat_avatar::SpeechSink;
use avachat_stream::{ChunkDelta, ResponseProvider, StreamError};
use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Fixed message shown when the stream fails before any content arrived.
pub const STREAM_ERROR_FALLBACK: &str = "Connection to the model failed. Please try again.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TurnStatus {
    Completed,
    Cancelled,
    Failed(String),
}

#[derive(Clone, Debug)]
pub struct TurnOutcome {
    /// Trimmed text accumulated over the turn; partial when not completed.
    pub text: String,
    pub status: TurnStatus,
}

/// Drive one generated reply. Every chunk goes to the speech sink the moment
/// it arrives; display writes coalesce to one per frame; end-of-stream sets
/// the exact trimmed final value after the sink's message is closed.
pub async fn run_turn(
    provider: &dyn ResponseProvider,
    model: &str,
    transcript: &str,
    sink: &dyn SpeechSink,
    surface: &dyn DisplaySurface,
    frames: &dyn FrameScheduler,
    cancel: CancellationToken,
) -> EngineResult<TurnOutcome> {
    let mut buffer = StreamBuffer::new();
    surface.set_streaming(true);

    let stream = match provider
        .open_stream(transcript, model, Some(cancel.clone()))
        .await
    {
        Ok(s) => s,
        Err(e) => {
            warn!("failed to open response stream: {}", e);
            buffer.fail(surface, STREAM_ERROR_FALLBACK);
            return Ok(TurnOutcome {
                text: String::new(),
                status: TurnStatus::Failed(e.to_string()),
            });
        }
    };
    tokio::pin!(stream);

    let mut frame_ticks = frames.frames();

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("turn cancelled");
                end_speech(sink).await;
                surface.set_streaming(false);
                return Ok(TurnOutcome {
                    text: buffer.content().trim().to_string(),
                    status: TurnStatus::Cancelled,
                });
            }
            Some(_) = frame_ticks.next(), if buffer.update_pending() => {
                buffer.on_frame(surface);
            }
            delta = stream.next() => {
                match delta {
                    Some(Ok(ChunkDelta::Text(chunk))) => {
                        if sink.is_active() {
                            sink.push_chunk(&chunk, false);
                        }
                        // Scheduling is implicit: the frame arm above is
                        // gated on the pending flag this sets.
                        buffer.push(&chunk);
                    }
                    Some(Ok(ChunkDelta::Done)) | None => {
                        end_speech(sink).await;
                        let text = buffer.finish(surface);
                        return Ok(TurnOutcome { text, status: TurnStatus::Completed });
                    }
                    Some(Err(StreamError::Cancelled)) => {
                        end_speech(sink).await;
                        surface.set_streaming(false);
                        return Ok(TurnOutcome {
                            text: buffer.content().trim().to_string(),
                            status: TurnStatus::Cancelled,
                        });
                    }
                    Some(Err(e)) => {
                        warn!("response stream failed: {}", e);
                        end_speech(sink).await;
                        let text = buffer.content().trim().to_string();
                        buffer.fail(surface, STREAM_ERROR_FALLBACK);
                        return Ok(TurnOutcome { text, status: TurnStatus::Failed(e.to_string()) });
                    }
                }
            }
        }
    }
}

/// Best-effort end-of-message; a sink failure never blocks the display
/// update that follows.
async fn end_speech(sink: &dyn SpeechSink) {
    if sink.is_active() {
        if let Err(e) = sink.end_message().await {
            warn!("speech sink end_message failed: {}", e);
        }
    }
}
