//! Display and frame-scheduling seams

use avachat_core::Role;
use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::wrappers::IntervalStream;
use tokio_stream::StreamExt;

/// One message bubble's display surface.
pub trait DisplaySurface: Send + Sync {
    fn set_text(&self, text: &str);
    fn scroll_to_end(&self);
    /// Toggle the in-progress marker.
    fn set_streaming(&self, streaming: bool);
}

/// The chat transcript view; hands out a surface for each new message.
pub trait ChatView: Send + Sync {
    fn begin_message(&self, role: Role) -> Arc<dyn DisplaySurface>;
}

/// Stream of display-refresh opportunities.
pub type FrameTicks = Pin<Box<dyn Stream<Item = ()> + Send>>;

/// Source of display-refresh opportunities. The turn runner draws at most
/// one buffered update per tick.
pub trait FrameScheduler: Send + Sync {
    fn frames(&self) -> FrameTicks;
}

/// Fixed-period ticks, roughly one per display refresh.
pub struct IntervalFrames {
    period: Duration,
}

impl IntervalFrames {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }
}

impl Default for IntervalFrames {
    fn default() -> Self {
        Self::new(Duration::from_millis(16))
    }
}

impl FrameScheduler for IntervalFrames {
    fn frames(&self) -> FrameTicks {
        Box::pin(IntervalStream::new(tokio::time::interval(self.period)).map(|_| ()))
    }
}

/// Ticks that are always ready. Coalesces nothing; tests and the line-mode
/// CLI use it.
pub struct ImmediateFrames;

impl FrameScheduler for ImmediateFrames {
    fn frames(&self) -> FrameTicks {
        Box::pin(futures::stream::repeat(()))
    }
}
