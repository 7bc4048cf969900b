//! Standalone checker for homework status payloads.
//!
//! Runs the envelope check and the strict per-record check against a saved
//! JSON response or a live fetch, and reports every violation found.

use std::process::ExitCode;

use clap::Parser;
use serde_json::Value;

use homework_status_bot::config::{BotSettings, Credentials};
use homework_status_bot::homework::{
    HomeworkBatch, ValidationOptions, parse_status, validate_records, validate_response,
};
use homework_status_bot::practicum::PracticumClient;

/// Homework status payload checker.
#[derive(Parser, Debug)]
#[command(name = "check_homeworks")]
#[command(about = "Validates Practicum homework status payloads record by record")]
#[command(version)]
struct Args {
    /// Path to a saved JSON response to validate.
    #[arg(short, long, default_value = "homework_statuses.json", conflicts_with = "fetch")]
    file: String,

    /// Fetch a live response from this unix timestamp instead of reading a file.
    #[arg(long)]
    fetch: Option<i64>,

    /// Path to the .env file for environment variables (used with --fetch).
    #[arg(long, default_value = ".env")]
    env_file: String,

    /// Also require an integer `current_date`.
    #[arg(long)]
    require_current_date: bool,

    /// Show detailed information for each record.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let payload = match args.fetch {
        Some(from_date) => fetch_payload(&args.env_file, from_date, args.verbose).await,
        None => load_payload(&args.file),
    };

    match payload {
        Ok(payload) => check_payload(&payload, args.require_current_date, args.verbose),
        Err(e) => {
            eprintln!("✗ {e}");
            ExitCode::FAILURE
        }
    }
}

fn load_payload(path: &str) -> Result<Value, String> {
    println!("Validating: {path}\n");

    let content =
        std::fs::read_to_string(path).map_err(|e| format!("Failed to read {path}: {e}"))?;
    serde_json::from_str(&content).map_err(|e| format!("Failed to parse {path}: {e}"))
}

async fn fetch_payload(env_file: &str, from_date: i64, verbose: bool) -> Result<Value, String> {
    if let Some(warning) = load_env_file(env_file)
        && verbose
    {
        eprintln!("{warning}");
    }

    let credentials = Credentials::from_env().map_err(|e| e.to_string())?;
    let settings = BotSettings::from_env_with_defaults();
    println!("Fetching: {} (from_date={from_date})\n", settings.practicum_endpoint);

    let client = PracticumClient::new(
        settings.practicum_endpoint.clone(),
        credentials.practicum_token,
        settings.request_timeout(),
    )
    .map_err(|e| format!("Failed to build HTTP client: {e}"))?;

    client
        .fetch(from_date)
        .await
        .map_err(|e| format!("Fetch failed: {e}"))
}

/// Loads `env_file`, returning a warning when it cannot be read.
fn load_env_file(env_file: &str) -> Option<String> {
    dotenvy::from_filename(env_file)
        .err()
        .map(|e| format!("Could not load .env file ({env_file}): {e}"))
}

fn check_payload(payload: &Value, require_current_date: bool, verbose: bool) -> ExitCode {
    let options = ValidationOptions {
        require_current_date,
    };

    let batch = match validate_response(payload, options) {
        Ok(batch) => batch,
        Err(e) => {
            println!("✗ Envelope error: {e}");
            return ExitCode::FAILURE;
        }
    };

    println!("✓ Envelope OK: {} record(s)", batch.len());
    if let Some(current_date) = batch.current_date {
        println!("  current_date: {current_date}");
    }

    if verbose {
        print_records(&batch);
    }

    match validate_records(&batch) {
        Ok(homeworks) => {
            println!("\n✓ All {} records are valid!", homeworks.len());
            if let Some(latest) = batch.latest()
                && let Ok(message) = parse_status(latest)
            {
                println!("\nLatest status message:\n  {message}");
            }
            ExitCode::SUCCESS
        }
        Err(violations) => {
            println!();
            for violation in violations.errors() {
                println!("  ✗ {violation}");
            }
            println!(
                "\n✗ Validation failed: {} violation(s) in {} records",
                violations.errors().len(),
                batch.len()
            );
            ExitCode::FAILURE
        }
    }
}

fn print_records(batch: &HomeworkBatch) {
    for (index, record) in batch.homeworks.iter().enumerate() {
        let name = record
            .get("homework_name")
            .and_then(Value::as_str)
            .unwrap_or("?");
        let status = record.get("status").and_then(Value::as_str).unwrap_or("?");
        println!("[{index}] \"{}\" ({status})", truncate(name, 40));
    }
}

/// Truncates a string for display.
fn truncate(s: &str, max_len: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max_len {
        s.to_owned()
    } else {
        format!("{}...", chars[..max_len].iter().collect::<String>())
    }
}
