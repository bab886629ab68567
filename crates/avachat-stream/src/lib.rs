//! Avachat Stream - SSE response-stream client behind a provider trait

pub mod provider;
pub mod sse;

pub use provider::{ChunkDelta, ChunkStream, ResponseProvider, StreamError, StreamResult};
pub use sse::{chunk_stream, SseResponseProvider, END_OF_STREAM_MARKER};
pub use tokio_util::sync::CancellationToken;
