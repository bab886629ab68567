//! Live transcript reconciliation
//!
//! The transcription service replaces the conversation history wholesale on
//! every notification. During a recording span we show only what the user
//! has said since the span began: the suffix of the joined user text past
//! the baseline captured at the first snapshot. The shown value only ever
//! grows or holds; it never shrinks or flickers.

use avachat_core::{Role, TranscriptEntry};

/// Join all user-authored text in a snapshot: entries separated by single
/// spaces, internal whitespace collapsed.
pub fn joined_user_text(snapshot: &[TranscriptEntry]) -> String {
    let mut out = String::new();
    for entry in snapshot {
        if entry.role != Role::User {
            continue;
        }
        for word in entry.text.split_whitespace() {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(word);
        }
    }
    out
}

/// Byte length of the longest common prefix, aligned to a char boundary.
fn common_prefix_len(a: &str, b: &str) -> usize {
    let mut len = 0;
    for (ca, cb) in a.chars().zip(b.chars()) {
        if ca != cb {
            break;
        }
        len += ca.len_utf8();
    }
    len
}

#[derive(Debug, Default)]
pub struct Reconciler {
    recording: bool,
    baseline: Option<String>,
    live: String,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a new recording span. The baseline is captured from the first
    /// snapshot observed after this call.
    pub fn start_span(&mut self) {
        self.recording = true;
        self.baseline = None;
        self.live.clear();
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// The in-progress utterance as currently shown.
    pub fn live_text(&self) -> &str {
        &self.live
    }

    /// Feed one snapshot. Returns the new display value when it changed,
    /// `None` otherwise. An empty candidate suffix never erases text that
    /// was already shown.
    pub fn observe(&mut self, snapshot: &[TranscriptEntry]) -> Option<&str> {
        if !self.recording {
            return None;
        }
        let current = joined_user_text(snapshot);
        let Some(baseline) = self.baseline.as_deref() else {
            self.baseline = Some(current);
            return None;
        };

        // A current text shorter than the baseline is an upstream rewrite.
        // Suppress the suffix instead of visually erasing prior text.
        let candidate = if current.chars().count() < baseline.chars().count() {
            ""
        } else {
            let prefix = common_prefix_len(&current, baseline);
            current[prefix..].trim_start()
        };

        if candidate.is_empty() || candidate == self.live {
            return None;
        }
        self.live = candidate.to_string();
        Some(&self.live)
    }

    /// End the span, returning the trimmed final utterance.
    pub fn finish_span(&mut self) -> String {
        self.recording = false;
        self.baseline = None;
        std::mem::take(&mut self.live).trim().to_string()
    }
}
