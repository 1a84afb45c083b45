use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use folio_core::{Config, HttpAgentGateway, Overrides, Portfolio, RequestStyle, SessionMetadata};

mod app;
mod handler;
mod tui;
mod ui;

use app::{App, Screen};

const DEFAULT_LOG_FILTER: &str = "folio=info,folio_core=info";

#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(version, about = "Terminal portfolio with an assistant you can ask about its owner")]
struct Cli {
    /// Agent identifier sent with every question
    #[arg(long, env = "FOLIO_AGENT_ID")]
    agent_id: Option<String>,

    /// Agent endpoint URL
    #[arg(short, long, env = "FOLIO_AGENT_ENDPOINT")]
    endpoint: Option<String>,

    /// Request body style: identifiers or context
    #[arg(long)]
    style: Option<RequestStyle>,

    /// Portfolio content as JSON (built-in content when omitted)
    #[arg(short, long)]
    portfolio: Option<PathBuf>,

    /// Start on the dashboard page
    #[arg(long)]
    dashboard: bool,

    /// Log file (defaults to folio.log in the config directory)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to a file so they don't draw over the terminal UI
    init_logging(cli.log_file.clone())?;

    let config = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "could not load config, using defaults");
        Config::default()
    });
    let settings = config.resolve(Overrides {
        agent_id: cli.agent_id,
        endpoint: cli.endpoint,
        request_style: cli.style,
        portfolio_path: cli.portfolio,
    });

    let portfolio = match &settings.portfolio_path {
        Some(path) => Portfolio::load_from_json(path)?,
        None => Portfolio::default(),
    };

    let gateway = Arc::new(HttpAgentGateway::new(&settings.endpoint, settings.request_style));
    let session = SessionMetadata::new(&settings.agent_id);
    info!(
        endpoint = %settings.endpoint,
        style = settings.request_style.as_str(),
        session = session.session_id(),
        "starting folio"
    );

    let mut app = App::new(portfolio, gateway, session);
    if cli.dashboard {
        app.screen = Screen::Dashboard;
    }

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = run(&mut terminal, &mut app).await;
    tui::restore()?;

    result
}

async fn run(terminal: &mut tui::Tui, app: &mut App) -> Result<()> {
    let mut events = tui::EventHandler::new(tui::TICK_RATE);

    loop {
        app.poll_query_task().await;
        app.apply_effects(std::time::Instant::now());

        terminal.draw(|frame| ui::render(app, frame))?;

        if app.should_quit {
            break;
        }

        match events.next().await {
            Some(event) => handler::handle_event(app, event).await?,
            None => break,
        }
    }

    info!("shutting down");
    Ok(())
}

fn init_logging(log_file: Option<PathBuf>) -> Result<()> {
    let path = match log_file {
        Some(path) => path,
        None => {
            let dir = Config::config_dir()?;
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("creating {}", dir.display()))?;
            dir.join("folio.log")
        }
    };

    let file = std::fs::File::create(&path)
        .with_context(|| format!("creating log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_env_filter(filter)
        .with_ansi(false)
        .init();

    Ok(())
}
