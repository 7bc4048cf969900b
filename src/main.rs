//! Homework Status Bot - Main Entry Point
//!
//! Polls the Practicum homework status API and sends review status
//! changes to a Telegram chat.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

use homework_status_bot::config::{BotSettings, Credentials};
use homework_status_bot::practicum::PracticumClient;
use homework_status_bot::scheduler::HomeworkPoller;
use homework_status_bot::telegram::TelegramNotifier;

/// Telegram bot reporting Practicum homework review status changes.
#[derive(Parser, Debug)]
#[command(name = "homework_bot")]
#[command(about = "Send Practicum homework review status changes to Telegram")]
#[command(version)]
struct Args {
    /// Path to the .env file for environment variables.
    #[arg(long, default_value = ".env")]
    env_file: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Also append log lines to this file.
    #[arg(long)]
    log_file: Option<String>,

    /// Unix timestamp to poll from (defaults to now).
    #[arg(long)]
    from_date: Option<i64>,

    /// Run a single polling cycle and exit.
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    init_logging(&args.log_level, args.log_file.as_deref())?;

    // Load environment variables
    if let Err(e) = dotenvy::from_filename(&args.env_file) {
        debug!("Could not load .env file ({}): {}", args.env_file, e);
    }

    // Token gate: nothing touches the network without all three secrets
    let credentials = match Credentials::from_env() {
        Ok(credentials) => credentials,
        Err(e) => {
            error!("Startup aborted: {}", e);
            return Err(e).context("Failed to load tokens from environment");
        }
    };

    let settings = BotSettings::from_env_with_defaults();
    debug!("Settings: {:?}", settings);

    let source = PracticumClient::new(
        settings.practicum_endpoint.clone(),
        credentials.practicum_token.clone(),
        settings.request_timeout(),
    )
    .context("Failed to build Practicum client")?;

    let notifier = TelegramNotifier::new(
        &settings.telegram_api_url,
        credentials.telegram_token.clone(),
        &credentials.telegram_chat_id,
        settings.request_timeout(),
    )
    .context("Failed to build Telegram client")?;

    let cursor = args.from_date.unwrap_or_else(|| Utc::now().timestamp());
    let mut poller = HomeworkPoller::new(source, notifier, &settings, cursor);

    info!(
        "Starting homework bot (endpoint: {}, chat: {}, cursor policy: {:?})",
        settings.practicum_endpoint, credentials.telegram_chat_id, settings.cursor_policy
    );

    if args.once {
        let outcome = poller.run_cycle().await;
        info!("Single cycle finished: {:?}", outcome);
        return Ok(());
    }

    info!("Bot is running. Use Ctrl+C to stop.");

    tokio::select! {
        () = poller.run() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
        }
    }

    Ok(())
}

/// Initializes the logging subsystem.
fn init_logging(level: &str, log_file: Option<&str>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match log_file {
        Some(path) => {
            let file = open_log_file(Path::new(path))?;
            builder
                .with_ansi(false)
                .with_writer(std::io::stderr.and(Mutex::new(file)))
                .init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }

    Ok(())
}

fn open_log_file(path: &Path) -> Result<std::fs::File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))
}
