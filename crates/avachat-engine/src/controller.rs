//! Session controller: explicit lifecycle for one avatar chat session
//!
//! One owned object carries the session: create → active → terminated.
//! All shared mutable state lives here and is only touched through `&mut
//! self`, so a single driving task needs no locks.

use crate::error::{EngineError, EngineResult};
use crate::reconcile::Reconciler;
use crate::surface::{ChatView, DisplaySurface, FrameScheduler};
use crate::turn::{run_turn, TurnOutcome, TurnStatus};
use avachat_avatar::SpeechSink;
use avachat_core::{ChatKey, Role, TranscriptEntry};
use avachat_stream::ResponseProvider;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Append-only persistence for completed turns, keyed by chat name.
pub trait TurnSink: Send + Sync {
    fn append_turn(&self, chat: &ChatKey, role: Role, text: &str) -> avachat_core::Result<()>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Created,
    Active,
    Terminated,
}

impl SessionState {
    fn name(&self) -> &'static str {
        match self {
            SessionState::Created => "created",
            SessionState::Active => "active",
            SessionState::Terminated => "terminated",
        }
    }
}

pub struct SessionConfig {
    pub model: String,
    /// Coarse whole-session idle timeout, armed at activation.
    pub idle_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            model: "MARIA_MODEL".to_string(),
            idle_timeout: Duration::from_secs(300),
        }
    }
}

pub struct SessionController {
    state: SessionState,
    config: SessionConfig,
    chat: Option<ChatKey>,
    reconciler: Reconciler,
    user_surface: Option<Arc<dyn DisplaySurface>>,
    provider: Arc<dyn ResponseProvider>,
    sink: Arc<dyn SpeechSink>,
    view: Arc<dyn ChatView>,
    frames: Arc<dyn FrameScheduler>,
    turns: Arc<dyn TurnSink>,
    session_cancel: CancellationToken,
    active_turn: Option<CancellationToken>,
    deadline: Option<Instant>,
}

impl SessionController {
    pub fn new(
        provider: Arc<dyn ResponseProvider>,
        sink: Arc<dyn SpeechSink>,
        view: Arc<dyn ChatView>,
        frames: Arc<dyn FrameScheduler>,
        turns: Arc<dyn TurnSink>,
        config: SessionConfig,
    ) -> Self {
        Self {
            state: SessionState::Created,
            config,
            chat: None,
            reconciler: Reconciler::new(),
            user_surface: None,
            provider,
            sink,
            view,
            frames,
            turns,
            session_cancel: CancellationToken::new(),
            active_turn: None,
            deadline: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn chat(&self) -> Option<&ChatKey> {
        self.chat.as_ref()
    }

    /// Token cancelled when the session terminates; drivers can select on it.
    pub fn session_token(&self) -> CancellationToken {
        self.session_cancel.clone()
    }

    /// Created → Active. Binds the session to one chat and arms the idle
    /// deadline.
    pub fn activate(&mut self, chat: ChatKey) -> EngineResult<()> {
        match self.state {
            SessionState::Created => {}
            SessionState::Terminated => return Err(EngineError::SessionTerminated),
            other => {
                return Err(EngineError::InvalidState {
                    expected: "created",
                    actual: other.name(),
                })
            }
        }
        info!("session active: chat={}", chat);
        self.chat = Some(chat);
        self.deadline = Some(Instant::now() + self.config.idle_timeout);
        self.state = SessionState::Active;
        Ok(())
    }

    /// Begin a recording span: arm the reconciler and open a streaming user
    /// bubble. The baseline is captured from the first snapshot that follows.
    pub fn start_recording(&mut self) -> EngineResult<()> {
        self.ensure_active()?;
        if self.reconciler.is_recording() {
            return Ok(());
        }
        debug!("recording span started");
        self.reconciler.start_span();
        let surface = self.view.begin_message(Role::User);
        surface.set_streaming(true);
        self.user_surface = Some(surface);
        Ok(())
    }

    pub fn is_recording(&self) -> bool {
        self.reconciler.is_recording()
    }

    /// Deliver one full-history snapshot. The live user text is rewritten
    /// wholesale when it changed; the surface scrolls only then.
    pub fn on_snapshot(&mut self, snapshot: &[TranscriptEntry]) -> EngineResult<()> {
        self.ensure_active()?;
        if !self.reconciler.is_recording() {
            return Ok(());
        }
        if let Some(text) = self.reconciler.observe(snapshot) {
            if let Some(surface) = &self.user_surface {
                surface.set_text(text);
                surface.scroll_to_end();
            }
        }
        Ok(())
    }

    /// End the recording span. A non-empty utterance is persisted and runs a
    /// generation turn; any still-open prior stream is torn down first.
    pub async fn stop_recording(&mut self) -> EngineResult<Option<TurnOutcome>> {
        self.ensure_active()?;
        if !self.reconciler.is_recording() {
            return Ok(None);
        }
        let transcript = self.reconciler.finish_span();
        if let Some(surface) = self.user_surface.take() {
            surface.set_streaming(false);
            surface.set_text(&transcript);
        }
        if transcript.is_empty() {
            debug!("recording span ended empty");
            return Ok(None);
        }

        let chat = match &self.chat {
            Some(c) => c.clone(),
            None => {
                return Err(EngineError::InvalidState {
                    expected: "active",
                    actual: self.state.name(),
                })
            }
        };
        self.turns.append_turn(&chat, Role::User, &transcript)?;

        // At most one stream per turn: tear down the previous one first.
        if let Some(prior) = self.active_turn.take() {
            debug!("closing prior response stream");
            prior.cancel();
        }
        let cancel = self.session_cancel.child_token();
        self.active_turn = Some(cancel.clone());

        let reply_surface = self.view.begin_message(Role::Assistant);
        let outcome = run_turn(
            self.provider.as_ref(),
            &self.config.model,
            &transcript,
            self.sink.as_ref(),
            reply_surface.as_ref(),
            self.frames.as_ref(),
            cancel,
        )
        .await?;
        self.active_turn = None;

        match &outcome.status {
            TurnStatus::Completed => {
                if !outcome.text.is_empty() {
                    self.turns.append_turn(&chat, Role::Assistant, &outcome.text)?;
                }
            }
            TurnStatus::Cancelled => debug!("turn cancelled: chat={}", chat),
            TurnStatus::Failed(e) => warn!("turn failed: chat={}, error={}", chat, e),
        }
        Ok(Some(outcome))
    }

    /// Tear down: close any in-flight stream and mark the session
    /// terminated. Idempotent.
    pub fn terminate(&mut self) {
        if self.state == SessionState::Terminated {
            return;
        }
        if let Some(turn) = self.active_turn.take() {
            turn.cancel();
        }
        self.session_cancel.cancel();
        self.reconciler = Reconciler::new();
        self.user_surface = None;
        self.state = SessionState::Terminated;
        info!("session terminated");
    }

    fn ensure_active(&mut self) -> EngineResult<()> {
        self.check_idle();
        match self.state {
            SessionState::Active => Ok(()),
            SessionState::Terminated => Err(EngineError::SessionTerminated),
            other => Err(EngineError::InvalidState {
                expected: "active",
                actual: other.name(),
            }),
        }
    }

    /// Terminate once the whole-session idle deadline has passed. Checked on
    /// every operation; there is no detached timer task.
    fn check_idle(&mut self) {
        if self.state != SessionState::Active {
            return;
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                info!("session idle timeout reached");
                self.terminate();
            }
        }
    }
}
