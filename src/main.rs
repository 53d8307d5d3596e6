//! Chat widget
//!
//! Entry point: terminal chat client (`chat`, the default) or the demo chat
//! endpoint (`serve`).

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use chat_widget::config::{AppConfig, Backend, Cli, Command};
use chat_widget::reply::{HttpReplySource, ReplySource, SimulatedReplySource};
use chat_widget::server::start_server;
use chat_widget::session::ChatSessionController;
use chat_widget::telemetry;
use chat_widget::ui::{InputField, KeyPress, TerminalInput, TerminalSurface};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present)
    let _ = dotenv();

    telemetry::init();

    let cli = Cli::parse();
    let config = Arc::new(AppConfig::load_from_cli(&cli).context("Configuration error")?);

    match cli.command {
        Some(Command::Serve(_)) => {
            start_server(config, Arc::new(SimulatedReplySource::instant())).await
        }
        Some(Command::Chat(_)) | None => run_chat(&config).await,
    }
}

/// Drive a chat session from stdin until EOF.
async fn run_chat(config: &AppConfig) -> anyhow::Result<()> {
    let source: Arc<dyn ReplySource> = match config.client.backend {
        Backend::Http => Arc::new(
            HttpReplySource::new(&config.client.endpoint)
                .with_context(|| format!("Invalid endpoint: {}", config.client.endpoint))?,
        ),
        Backend::Simulated => Arc::new(SimulatedReplySource::new(config.simulated_delay())),
    };

    info!(
        name: "chat.client.started",
        backend = ?config.client.backend,
        endpoint = %config.client.endpoint,
        "Chat client started"
    );

    let surface = Arc::new(TerminalSurface::stdout());
    let input = Arc::new(TerminalInput::new(Arc::clone(&surface)));
    let controller = Arc::new(ChatSessionController::new(
        surface,
        Arc::<TerminalInput>::clone(&input),
        source,
        config.session_settings(),
    ));

    controller.greet();

    // Each line arrives as a plain Enter press.
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last_request = None;
    while let Some(line) = lines.next_line().await? {
        if !input.is_enabled() {
            debug!(name: "chat.input.dropped", "Input disabled, line dropped");
            continue;
        }
        input.set_value(&line);
        let handled = controller.handle_key(&KeyPress::enter());
        if handled.request.is_some() {
            last_request = handled.request;
        } else {
            input.focus();
        }
    }

    if let Some(request) = last_request {
        request.await?;
    }
    Ok(())
}
