//! # termfolio server entry point
//!
//! ## Usage
//!
//! ```bash
//! # Serve on localhost:23234 with the default theme
//! termfolio
//!
//! # Listen on every interface with another theme
//! termfolio --host 0.0.0.0 --port 2323 --theme Dracula
//!
//! # Connect
//! ssh -p 23234 localhost
//!
//! # Serve plain Telnet instead
//! termfolio --transport telnet
//! ```
//!
//! Settings are read from `~/.config/termfolio/config.json` (or `--config`);
//! flags override the file. `SIGINT`/`SIGTERM` stop accepting connections and
//! give live sessions the configured grace period to finish.

use termfolio::config::{Config, Overrides, TransportKind};
use termfolio::logging::{init_logging, LogConfig};
use termfolio::server::{Server, ServerConfig};
use termfolio::session::SessionController;
use termfolio::ui::Theme;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};

/// termfolio - a terminal portfolio served over SSH
#[derive(Parser, Debug)]
#[command(name = "termfolio")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Serve a terminal portfolio to remote terminals", long_about = None)]
struct Args {
    /// Path to the JSON configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Protocol to serve
    #[arg(long, value_enum)]
    transport: Option<TransportKind>,

    /// Name of a built-in theme
    #[arg(short, long)]
    theme: Option<String>,

    /// Log filter, e.g. "debug" or "termfolio=trace" (default: $TERMFOLIO_LOG or "info")
    #[arg(long, value_name = "FILTER")]
    log_level: Option<String>,

    /// Append logs to this file instead of stderr
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Print the built-in themes and exit
    #[arg(long)]
    list_themes: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.list_themes {
        for theme in Theme::all() {
            println!("{}", theme.name);
        }
        return Ok(());
    }

    run(args).await
}

async fn run(args: Args) -> Result<()> {
    init_logging(&LogConfig::from_args(
        args.log_level.as_deref(),
        args.log_file.clone(),
    ))
    .context("Failed to initialize logging")?;

    let config = load_config(&args)?;
    let theme = resolve_theme(&config.theme);
    info!(theme = theme.name, "theme selected");

    let server = Server::new(
        ServerConfig::from(&config),
        SessionController::with_portfolio(theme),
    );
    server
        .run(shutdown_signal())
        .await
        .with_context(|| format!("Failed to serve on {}:{}", config.host, config.port))?;

    info!("server stopped");
    Ok(())
}

fn load_config(args: &Args) -> Result<Config> {
    let config = Config::load(args.config.as_deref())?;
    Ok(config.merge(Overrides {
        theme: args.theme.clone(),
        host: args.host.clone(),
        port: args.port,
        transport: args.transport,
    }))
}

fn resolve_theme(name: &str) -> &'static Theme {
    Theme::by_name(name).unwrap_or_else(|| {
        let fallback = Theme::default_theme();
        warn!(requested = name, fallback = fallback.name, "unknown theme");
        fallback
    })
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
