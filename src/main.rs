mod api;
mod app;
mod auth;
mod config;
mod logging;
mod ui;

use crate::api::client::ApiClient;
use crate::api::dispatch::{spawn_request, spawn_sign_in};
use crate::api::model::{QuestionTarget, RecordId};
use crate::app::action::Action;
use crate::app::event::AppEvent;
use crate::app::handler;
use crate::app::state::AppState;
use crate::app::ticker::QuizTicker;
use crate::auth::context::SessionContext;
use crate::auth::provider::{Authenticator, GoogleDeviceAuthenticator, StaticAuthenticator};
use crate::auth::store::CredentialStore;
use crate::config::model::AuthConfig;
use crate::config::{AppConfig, ProviderKind};
use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::EventStream,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::prelude::*;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Terminal client for GMAT practice sessions.
#[derive(Debug, Parser)]
#[command(name = "mockme", version, about)]
struct Cli {
    /// Config file (default: platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Practice API base URL
    #[arg(long)]
    api_url: Option<String>,

    /// Open the quiz for this session
    #[arg(long, conflicts_with = "question")]
    session: Option<String>,

    /// Open the quiz on a single question
    #[arg(long)]
    question: Option<String>,

    /// Identity-provider credential; selects the static provider
    #[arg(long)]
    credential: Option<String>,

    /// Log filter, e.g. `debug` or `mockme=trace`
    #[arg(long)]
    log_level: Option<String>,

    /// Write the effective configuration to the config file and exit
    #[arg(long)]
    write_config: bool,
}

impl Cli {
    fn target(&self) -> Option<QuestionTarget> {
        if let Some(id) = &self.session {
            return Some(QuestionTarget::Session(RecordId::new(id.as_str())));
        }
        self.question
            .as_ref()
            .map(|id| QuestionTarget::Question(RecordId::new(id.as_str())))
    }

    fn apply(&self, cfg: &mut AppConfig) {
        if let Some(url) = &self.api_url {
            cfg.api.base_url = url.clone();
        }
        if let Some(credential) = &self.credential {
            cfg.auth.credential = Some(credential.clone());
            cfg.auth.provider = ProviderKind::Static;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config
    let config_path = cli.config.clone().unwrap_or_else(config::config_path);
    let mut cfg = config::load_config(&config_path)?;
    cli.apply(&mut cfg);

    if cli.write_config {
        config::save_config(&cfg, &config_path)?;
        println!("Wrote {}", config_path.display());
        return Ok(());
    }

    if let Some(path) = logging::init(&cfg.logging, cli.log_level.as_deref())? {
        tracing::info!(log = %path.display(), api = %cfg.api.base_url, "mockme starting");
    }

    let store = CredentialStore::default_location();
    let ctx = SessionContext::load(store.clone())
        .with_context(|| format!("Failed to read credentials from {}", store.path().display()))?;
    let client = ApiClient::new(&cfg.api, ctx).context("Failed to build HTTP client")?;

    // Install panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal();
        original_hook(info);
    }));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let result = run_app(&mut terminal, cfg, client, cli.target()).await;

    // Restore terminal
    restore_terminal()?;

    if let Err(e) = result {
        tracing::error!(error = %e, "exiting with error");
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    tracing::info!("mockme exiting");
    Ok(())
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}

fn build_authenticator(
    auth: &AuthConfig,
    event_tx: mpsc::UnboundedSender<AppEvent>,
) -> Arc<dyn Authenticator> {
    match (auth.provider, &auth.credential) {
        (ProviderKind::Static, Some(credential)) => Arc::new(StaticAuthenticator::new(credential.as_str())),
        (ProviderKind::Static, None) => {
            tracing::warn!("static provider selected without a credential");
            Arc::new(StaticAuthenticator::new(""))
        }
        (ProviderKind::Google, _) => Arc::new(
            GoogleDeviceAuthenticator::new(
                auth.google_client_id.clone(),
                auth.google_client_secret.clone(),
                auth.scopes.clone(),
            )
            .with_prompt(Arc::new(move |prompt| {
                let _ = event_tx.send(AppEvent::DevicePrompt(prompt));
            })),
        ),
    }
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    cfg: AppConfig,
    client: ApiClient,
    target: Option<QuestionTarget>,
) -> Result<()> {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<AppEvent>();

    let authenticator = build_authenticator(&cfg.auth, event_tx.clone());
    let tick_rate = Duration::from_millis(cfg.ui.tick_rate_ms.max(10));
    let mut state = AppState::new(cfg, authenticator.name());
    let size = terminal.size()?;
    state.viewport = Rect::new(0, 0, size.width, size.height);

    let mut sign_in_task: Option<JoinHandle<()>> = None;
    let mut quiz_ticker: Option<QuizTicker> = None;

    // Spawn terminal input task
    let term_tx = event_tx.clone();
    tokio::spawn(async move {
        let mut reader = EventStream::new();
        while let Some(Ok(event)) = reader.next().await {
            if term_tx.send(AppEvent::Terminal(event)).is_err() {
                break;
            }
        }
    });

    // Spawn render tick task
    let tick_tx = event_tx.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tick_rate);
        loop {
            interval.tick().await;
            if tick_tx.send(AppEvent::Tick).is_err() {
                break;
            }
        }
    });

    let mut pending = handler::startup(&mut state, client.context().is_authenticated(), target);

    // Initial render
    terminal.draw(|f| ui::render(f, &state))?;

    // Main event loop
    loop {
        for action in pending.drain(..) {
            match action {
                Action::Api(request) => spawn_request(client.clone(), event_tx.clone(), request),
                Action::SignIn => {
                    if let Some(task) = sign_in_task.take() {
                        task.abort();
                    }
                    sign_in_task = Some(spawn_sign_in(
                        client.clone(),
                        authenticator.clone(),
                        event_tx.clone(),
                    ));
                }
                Action::CancelSignIn => {
                    if let Some(task) = sign_in_task.take() {
                        task.abort();
                        tracing::info!("sign-in cancelled");
                    }
                }
                Action::Logout => {
                    client.context().evict();
                }
                Action::StartQuizTicker { generation } => {
                    if quiz_ticker.as_ref().map(QuizTicker::generation) != Some(generation) {
                        quiz_ticker = Some(QuizTicker::start(generation, event_tx.clone()));
                    }
                }
                Action::StopQuizTicker => {
                    quiz_ticker = None;
                }
                Action::Quit => state.should_quit = true,
            }
        }

        if state.should_quit {
            break;
        }

        // Conditional render (only if dirty)
        if state.dirty {
            terminal.draw(|f| ui::render(f, &state))?;
            state.dirty = false;
        }

        let Some(event) = event_rx.recv().await else { break };
        pending = handler::handle_event(&mut state, event);
    }

    if let Some(task) = sign_in_task {
        task.abort();
    }
    drop(quiz_ticker);
    Ok(())
}
