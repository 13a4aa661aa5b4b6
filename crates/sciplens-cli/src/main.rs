#![deny(unsafe_code)]

//! sciplens CLI — code navigation queries over a project's SCIP index.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use sciplens_config::AppConfig;
use sciplens_core::{EventLog, EventReader, QueryEngine, outline};

/// Events kept for `status` to report.
const STATUS_EVENT_CAPACITY: usize = 64;

/// Definition, reference and outline lookups from a SCIP index.
#[derive(Parser, Debug)]
#[command(name = "sciplens", version, about, long_about = None)]
struct Cli {
    /// Path to configuration file.
    #[arg(short, long, default_value = "sciplens.toml")]
    config: PathBuf,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Find where a symbol is defined.
    Definition {
        /// Full or partial SCIP symbol.
        symbol: String,

        /// File the lookup started from.
        #[arg(long)]
        context_file: Option<String>,
    },

    /// Find every occurrence of a symbol.
    References {
        /// Full or partial SCIP symbol.
        symbol: String,
    },

    /// List the symbols defined in a file.
    Symbols {
        /// Path relative to the project root, exactly as indexed.
        file: String,
    },

    /// Search symbols by readable name.
    Search { query: String },

    /// Print the module/class/method outline of the project.
    Outline {
        /// Emit JSON instead of indented text.
        #[arg(long)]
        json: bool,
    },

    /// Report whether the index exists and can be loaded.
    Status,

    /// Validate and display configuration.
    Config {
        /// Show the resolved configuration.
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let (config, from_file) = load_config(&cli.config).await?;
    let events = init_tracing(log_filter(cli.verbose, &config.logging.level));
    if !from_file {
        info!(path = %cli.config.display(), "Config file not found, using defaults");
    }

    let engine = QueryEngine::from_config(&config);
    match cli.command {
        Commands::Definition {
            symbol,
            context_file,
        } => print_json(
            &engine
                .find_definition(&symbol, context_file.as_deref())
                .await,
        )?,
        Commands::References { symbol } => print_json(&engine.find_references(&symbol).await)?,
        Commands::Symbols { file } => print_json(&engine.list_symbols(&file).await)?,
        Commands::Search { query } => print_json(&engine.search_symbols(&query).await)?,
        Commands::Outline { json } => {
            let tree = engine.build_project_tree().await;
            if json {
                print_json(&tree)?;
            } else {
                print!("{}", outline::render(&tree));
            }
        }
        Commands::Status => return Ok(cmd_status(&engine, &events).await),
        Commands::Config { show } => cmd_config(&cli.config, &config, show)?,
    }

    Ok(ExitCode::SUCCESS)
}

/// Filter directive: `-v` overrides the configured level.
fn log_filter(verbose: u8, configured: &str) -> String {
    match verbose {
        0 => configured.to_string(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Install the stderr subscriber and an event log for `status`.
/// `RUST_LOG` takes precedence over `default_filter`.
fn init_tracing(default_filter: String) -> EventReader {
    let events = EventLog::engine_only(STATUS_EVENT_CAPACITY);
    let reader = events.reader();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(events)
        .init();

    reader
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to encode result as JSON")?;
    println!("{json}");
    Ok(())
}

async fn cmd_status(engine: &QueryEngine, events: &EventReader) -> ExitCode {
    let path = engine.cache().path().display().to_string();

    if !engine.index_exists().await {
        println!("Not yet indexed: no SCIP index at '{path}'.");
        println!("Run the SCIP indexer for this project, then retry.");
        return ExitCode::FAILURE;
    }

    let code = match engine.load().await {
        Ok(index) => {
            let stats = index.stats();
            println!("Index at '{path}' is loaded.");
            println!("  documents:   {}", stats.documents);
            println!("  occurrences: {}", stats.occurrences);
            println!("  definitions: {}", stats.definitions);
            ExitCode::SUCCESS
        }
        Err(err) => {
            println!("Needs reindex: {}", err.message());
            println!("Regenerate '{path}' with the SCIP indexer.");
            ExitCode::FAILURE
        }
    };

    let recent = events.at_least(Level::INFO);
    if !recent.is_empty() {
        println!();
        println!("Recent events:");
        for event in recent {
            println!("  {event}");
        }
    }
    code
}

fn cmd_config(config_path: &Path, config: &AppConfig, show: bool) -> Result<()> {
    if show {
        let toml_str = toml::to_string_pretty(config).context("failed to encode config as TOML")?;
        println!("{toml_str}");
    } else {
        println!("Configuration at '{}' is valid.", config_path.display());
        println!("Index file: {}", config.index_file().display());
    }
    Ok(())
}

/// Load and validate the config, or fall back to defaults when the file does
/// not exist. The flag reports whether the file was read.
async fn load_config(path: &Path) -> Result<(AppConfig, bool)> {
    if tokio::fs::try_exists(path).await.unwrap_or(false) {
        let config = AppConfig::load(path)
            .await
            .with_context(|| format!("invalid config '{}'", path.display()))?;
        Ok((config, true))
    } else {
        Ok((AppConfig::default(), false))
    }
}
