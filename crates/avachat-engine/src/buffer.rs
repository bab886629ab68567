//! Chunk-buffered render batching
//!
//! High-frequency generation chunks collapse into at most one visible write
//! per frame. Forwarding to the speech sink happens on arrival in the turn
//! runner and never goes through the frame path.

use crate::surface::DisplaySurface;

#[derive(Debug, Default)]
pub struct StreamBuffer {
    acc: String,
    pending: bool,
}

impl StreamBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one chunk. Returns `true` when a frame must be scheduled
    /// (none was pending); chunks arriving while one is pending collapse
    /// into that frame.
    pub fn push(&mut self, chunk: &str) -> bool {
        self.acc.push_str(chunk);
        if self.pending {
            false
        } else {
            self.pending = true;
            true
        }
    }

    /// Frame callback: write the full accumulator once, scroll, and clear
    /// the pending flag. Chunks that arrived since scheduling are included.
    pub fn on_frame(&mut self, surface: &dyn DisplaySurface) {
        surface.set_text(&self.acc);
        surface.scroll_to_end();
        self.pending = false;
    }

    /// End of stream: bypass the frame path and set the exact trimmed final
    /// value exactly once.
    pub fn finish(&mut self, surface: &dyn DisplaySurface) -> String {
        self.pending = false;
        surface.set_streaming(false);
        let final_text = self.acc.trim().to_string();
        surface.set_text(&final_text);
        surface.scroll_to_end();
        final_text
    }

    /// Stream error: keep whatever was already shown; fall back to `message`
    /// only when nothing had accumulated.
    pub fn fail(&mut self, surface: &dyn DisplaySurface, message: &str) {
        self.pending = false;
        surface.set_streaming(false);
        if self.acc.is_empty() {
            surface.set_text(message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.acc.is_empty()
    }

    pub fn content(&self) -> &str {
        &self.acc
    }

    pub fn update_pending(&self) -> bool {
        self.pending
    }
}
