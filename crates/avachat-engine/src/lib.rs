//! Avachat Engine - transcript reconciliation, render batching, and session control

pub mod buffer;
pub mod controller;
pub mod error;
pub mod reconcile;
pub mod surface;
pub mod turn;

pub use buffer::StreamBuffer;
pub use controller::{SessionConfig, SessionController, SessionState, TurnSink};
pub use error::{EngineError, EngineResult};
pub use reconcile::{joined_user_text, Reconciler};
pub use surface::{ChatView, DisplaySurface, FrameScheduler, ImmediateFrames, IntervalFrames};
pub use turn::{run_turn, TurnOutcome, TurnStatus, STREAM_ERROR_FALLBACK};
