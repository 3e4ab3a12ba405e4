// ABOUTME: Entry point for minibot — a terminal client for the Mini Agentic Bot service.
// ABOUTME: Parses CLI args, loads config, sets up logging, and runs the TUI or a one-shot command.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use minibot::api::HttpBackend;
use minibot::app::App;
use minibot::commands::{self, Command};
use minibot::config::{Config, LoggingConfig, Overrides};

#[derive(Parser)]
#[command(name = "minibot", version)]
#[command(about = "Chat with the Mini Agentic Bot and approve its data changes", long_about = None)]
struct Cli {
    /// Backend base URL (overrides config and MINIBOT_URL)
    #[arg(long, global = true)]
    url: Option<String>,
    /// User id sent with queries and approvals
    #[arg(long, global = true)]
    user_id: Option<String>,
    /// Config file (default: ~/.minibot/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Run a single command instead of the interactive TUI
    #[command(subcommand)]
    command: Option<Command>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            anyhow::ensure!(path.exists(), "config file not found: {}", path.display());
            Config::load_from(path)?
        }
        None => Config::load()?,
    };
    config.apply(Overrides::from_env().merge(Overrides {
        base_url: cli.url,
        user_id: cli.user_id,
    }));

    // The TUI owns the terminal, so its logs go to a file.
    init_tracing(&config.logging, cli.command.is_none())?;
    tracing::debug!(?config, "configuration loaded");

    match cli.command {
        None => App::new(config).run().await,
        Some(command) => {
            let server = &config.server;
            let backend = HttpBackend::new(&server.base_url, &server.user_id, server.timeout())?;
            let mut stdout = std::io::stdout();
            commands::run(command, &backend, &mut stdout).await
        }
    }
}

fn init_tracing(logging: &LoggingConfig, to_file: bool) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&logging.level)?,
    };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    if to_file {
        let path = logging.file_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        builder.with_ansi(false).with_writer(Mutex::new(file)).init();
    } else {
        builder.compact().with_writer(std::io::stderr).init();
    }
    Ok(())
}
