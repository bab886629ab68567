//! avachat: streaming avatar-chat session engine
//!
//! Usage:
//!   avachat chat [--chat NAME] [--model ID]   → interactive chat in the terminal
//!   avachat new|list|rename|delete|export     → chat management
//!   avachat version

use avachat_avatar::{NullSpeechSink, SnapshotBus};
use avachat_core::{AvachatConfig, ChatKey, Role, TranscriptEntry};
use avachat_engine::{
    ChatView, DisplaySurface, EngineError, IntervalFrames, SessionConfig, SessionController,
    TurnSink, TurnStatus,
};
use avachat_store::ChatStore;
use avachat_stream::SseResponseProvider;
use clap::{Parser, Subcommand};
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "avachat",
    about = "Streaming avatar-chat session engine",
    version = env!("CARGO_PKG_VERSION")
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: ~/.avachat/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write logs to a file (in addition to stderr)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat in the terminal against the configured backend
    Chat {
        /// Chat name (default: last selected, or "default")
        #[arg(short, long)]
        chat: Option<String>,
        /// Model identifier passed to the backend
        #[arg(short, long)]
        model: Option<String>,
    },
    /// Create a new chat
    New { name: String },
    /// List chats
    List,
    /// Rename a chat
    Rename { old: String, new: String },
    /// Delete a chat
    Delete { name: String },
    /// Print a chat's record as JSON
    Export { name: String },
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (file_layer, _guard) = match &cli.log_file {
        Some(path) => {
            let dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
            let file = path.file_name().map(|f| f.to_string_lossy().to_string());
            let appender = tracing_appender::rolling::never(
                dir,
                file.unwrap_or_else(|| "avachat.log".to_string()),
            );
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "avachat=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    let config = match &cli.config {
        Some(path) => AvachatConfig::load(path),
        None => AvachatConfig::discover(),
    };
    let store = ChatStore::new(config.storage_dir());

    match cli.command {
        Commands::Chat { chat, model } => cmd_chat(config, store, chat, model).await,
        Commands::New { name } => {
            store.create(&name)?;
            println!("created '{}'", name);
            Ok(())
        }
        Commands::List => {
            let current = store.current();
            for name in store.list() {
                let marker = if current.as_deref() == Some(&name) { "*" } else { " " };
                println!("{} {}", marker, name);
            }
            Ok(())
        }
        Commands::Rename { old, new } => {
            store.rename(&old, &new)?;
            println!("renamed '{}' to '{}'", old, new);
            Ok(())
        }
        Commands::Delete { name } => {
            store.delete(&name)?;
            println!("deleted '{}'", name);
            Ok(())
        }
        Commands::Export { name } => {
            println!("{}", store.export(&name)?);
            Ok(())
        }
        Commands::Version => {
            println!("avachat {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// One overwriteable terminal line per message bubble.
struct TermSurface {
    label: &'static str,
}

impl DisplaySurface for TermSurface {
    fn set_text(&self, text: &str) {
        let mut out = std::io::stdout().lock();
        let _ = write!(out, "\r\x1b[2K{}: {}", self.label, text.replace('\n', " "));
        let _ = out.flush();
    }

    fn scroll_to_end(&self) {}

    fn set_streaming(&self, _streaming: bool) {}
}

struct TermView {
    line_open: AtomicBool,
}

impl TermView {
    fn new() -> Self {
        Self {
            line_open: AtomicBool::new(false),
        }
    }

    /// Close the line of the message currently on screen, if any.
    fn close_line(&self) {
        if self.line_open.swap(false, Ordering::SeqCst) {
            println!();
        }
    }
}

impl ChatView for TermView {
    fn begin_message(&self, role: Role) -> Arc<dyn DisplaySurface> {
        if self.line_open.swap(true, Ordering::SeqCst) {
            println!();
        }
        Arc::new(TermSurface {
            label: match role {
                Role::User => "you",
                Role::Assistant => "avatar",
            },
        })
    }
}

struct StoreTurns {
    store: Arc<ChatStore>,
}

impl TurnSink for StoreTurns {
    fn append_turn(&self, chat: &ChatKey, role: Role, text: &str) -> avachat_core::Result<()> {
        self.store.append(chat.as_str(), role, text)
    }
}

async fn cmd_chat(
    config: AvachatConfig,
    store: ChatStore,
    chat: Option<String>,
    model: Option<String>,
) -> anyhow::Result<()> {
    let store = Arc::new(store);
    let name = chat
        .or_else(|| store.current())
        .unwrap_or_else(|| "default".to_string());
    if !store.list().iter().any(|n| n == &name) {
        store.create(&name)?;
    }
    let mut history = store.select(&name)?;
    for entry in &history {
        println!(
            "{}: {}",
            match entry.role {
                Role::User => "you",
                Role::Assistant => "avatar",
            },
            entry.text
        );
    }

    tracing::info!("starting chat session: chat={}", name);
    let view = Arc::new(TermView::new());
    let session_config = SessionConfig {
        model: model.unwrap_or_else(|| config.default_model().to_string()),
        idle_timeout: config.idle_timeout(),
    };
    let mut controller = SessionController::new(
        Arc::new(SseResponseProvider::new(config.backend_base_url())),
        Arc::new(NullSpeechSink),
        view.clone(),
        Arc::new(IntervalFrames::default()),
        Arc::new(StoreTurns {
            store: store.clone(),
        }),
        session_config,
    );
    controller.activate(ChatKey::new(&name))?;

    // The terminal stands in for the transcription service: each typed line
    // arrives as a grown full-history snapshot over the bus.
    let bus = SnapshotBus::new();
    let mut sub = bus.subscribe();

    println!("chat '{}' - type a message, /quit to leave", name);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        {
            let mut out = std::io::stdout().lock();
            let _ = write!(out, "> ");
            let _ = out.flush();
        }
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }
        if line == "/quit" {
            break;
        }

        if let Err(e) = controller.start_recording() {
            break_on_terminated(e)?;
            break;
        }
        bus.publish(history.clone());
        history.push(TranscriptEntry::user(&line));
        bus.publish(history.clone());
        let mut failed = false;
        while let Some(snapshot) = sub.try_recv() {
            if let Err(e) = controller.on_snapshot(&snapshot) {
                break_on_terminated(e)?;
                failed = true;
                break;
            }
        }
        if failed {
            break;
        }

        match controller.stop_recording().await {
            Ok(Some(outcome)) => {
                view.close_line();
                if outcome.status == TurnStatus::Completed && !outcome.text.is_empty() {
                    history.push(TranscriptEntry::assistant(&outcome.text));
                }
            }
            Ok(None) => view.close_line(),
            Err(e) => {
                break_on_terminated(e)?;
                break;
            }
        }
    }

    controller.terminate();
    view.close_line();
    Ok(())
}

/// Idle-timeout termination ends the loop quietly; anything else bubbles up.
fn break_on_terminated(e: EngineError) -> anyhow::Result<()> {
    match e {
        EngineError::SessionTerminated => {
            println!("\nsession ended");
            Ok(())
        }
        other => Err(other.into()),
    }
}
