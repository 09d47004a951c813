//! kuni-cli: play the country quiz in a terminal.
//!
//! Reads one guess per line from stdin, runs it against the live
//! metadata and boundary services, and prints the status message after
//! each guess. At end of input it can write the map as SVG and print a
//! JSON summary of the session.
//!
//! # Usage
//!
//! ```text
//! cargo run --bin kuni-cli -- [OPTIONS] < guesses.txt
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::io::{BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use kuni_core::{
    AliasTable, ColorAllocator, ColorStore, GameConfig, GameSession, MemoryColorStore, StoreError,
};
use kuni_export::SvgMetadata;
use kuni_services::{
    ConfigError, HttpBoundarySource, HttpCountryDirectory, JsonFileColorStore, ServiceConfig,
    build_client,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

/// Name the countries of the world from the command line.
///
/// Each line of standard input is one guess. Logging goes to stderr and
/// is controlled by `RUST_LOG` (default `warn`).
#[derive(Parser)]
#[command(name = "kuni-cli", version)]
struct Cli {
    /// Country metadata endpoint.
    #[arg(long, default_value = ServiceConfig::DEFAULT_METADATA_URL)]
    metadata_url: String,

    /// Boundary search endpoint.
    #[arg(long, default_value = ServiceConfig::DEFAULT_BOUNDARY_URL)]
    boundary_url: String,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = ServiceConfig::DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// JSON file remembering each country's color across runs.
    ///
    /// Without it colors last only for this run.
    #[arg(long)]
    memo: Option<PathBuf>,

    /// Boundary simplification tolerance in degrees.
    #[arg(long, default_value_t = GameConfig::DEFAULT_SIMPLIFY_TOLERANCE)]
    simplify_tolerance: f64,

    /// Zoom level reported for the latest accepted guess.
    #[arg(long, default_value_t = GameConfig::DEFAULT_FOCUS_ZOOM)]
    focus_zoom: u8,

    /// Seed for color picks, for reproducible runs.
    #[arg(long)]
    seed: Option<u64>,

    /// Write the final map to this SVG file.
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Print the final session summary as JSON.
    #[arg(long)]
    json: bool,

    /// Full configuration as a JSON string, with optional `game` and
    /// `services` objects.
    ///
    /// When provided, all other endpoint and game flags are ignored.
    #[arg(long)]
    config_json: Option<String>,
}

/// Everything the quiz loop is configured by.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct KuniConfig {
    game: GameConfig,
    services: ServiceConfig,
}

/// Build a [`KuniConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and the
/// individual flags are ignored, except `--memo`, which fills in a
/// missing `color_memo`.
fn config_from_cli(cli: &Cli) -> Result<KuniConfig, String> {
    let config = if let Some(ref json) = cli.config_json {
        let mut config: KuniConfig = serde_json::from_str(json)
            .map_err(|e| format!("Error parsing --config-json: {e}"))?;
        if config.services.color_memo.is_none() {
            config.services.color_memo.clone_from(&cli.memo);
        }
        config
    } else {
        KuniConfig {
            game: GameConfig {
                simplify_tolerance: cli.simplify_tolerance,
                focus_zoom: cli.focus_zoom,
            },
            services: ServiceConfig {
                metadata_url: cli.metadata_url.clone(),
                boundary_url: cli.boundary_url.clone(),
                timeout_secs: cli.timeout_secs,
                color_memo: cli.memo.clone(),
                ..ServiceConfig::default()
            },
        }
    };

    config.services.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

/// Color memo chosen at startup.
#[derive(Debug)]
enum CliColorStore {
    File(JsonFileColorStore),
    Memory(MemoryColorStore),
}

impl ColorStore for CliColorStore {
    fn load(&self, country: &str) -> Result<Option<String>, StoreError> {
        match self {
            Self::File(store) => store.load(country),
            Self::Memory(store) => store.load(country),
        }
    }

    fn save(&mut self, country: &str, color: &str) -> Result<(), StoreError> {
        match self {
            Self::File(store) => store.save(country, color),
            Self::Memory(store) => store.save(country, color),
        }
    }
}

fn connect(config: &ServiceConfig) -> Result<(HttpCountryDirectory, HttpBoundarySource), ConfigError> {
    let client = build_client(config)?;
    Ok((
        HttpCountryDirectory::with_client(client.clone(), config)?,
        HttpBoundarySource::with_client(client, config)?,
    ))
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let (directory, boundaries) = match connect(&config.services) {
        Ok(services) => services,
        Err(e) => {
            eprintln!("Error setting up services: {e}");
            return ExitCode::FAILURE;
        }
    };

    let store = config.services.color_memo.as_ref().map_or_else(
        || CliColorStore::Memory(MemoryColorStore::new()),
        |path| CliColorStore::File(JsonFileColorStore::new(path)),
    );
    let rng = cli.seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
    let mut session = GameSession::new(
        config.game,
        AliasTable::builtin(),
        ColorAllocator::new(store, rng),
    );

    let interactive = std::io::stdin().is_terminal();
    let prompt = || {
        if interactive {
            eprint!("> ");
            let _ = std::io::stderr().flush();
        }
    };

    prompt();
    for line in std::io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                eprintln!("Error reading input: {e}");
                return ExitCode::FAILURE;
            }
        };

        let outcome = session
            .submit(&line, &directory, &boundaries, |s| {
                tracing::debug!(score = s.score(), "committed, fetching boundary");
            })
            .await;

        if outcome.is_some() {
            println!("{}", session.status_message());
            if let Some(focus) = session.focus() {
                eprintln!(
                    "Score: {}  (map at {:.2}, {:.2} zoom {})",
                    session.score(),
                    focus.center.lat,
                    focus.center.lng,
                    focus.zoom,
                );
            } else {
                eprintln!("Score: {}", session.score());
            }
        }
        prompt();
    }

    let snapshot = session.snapshot();
    let snapshot_json = match serde_json::to_string_pretty(&snapshot) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error serializing session: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(ref svg_path) = cli.svg {
        let description = format!("Score: {}", session.score());
        let metadata = SvgMetadata {
            title: Some("kuni"),
            description: Some(&description),
            session_json: Some(&snapshot_json),
        };
        let svg = kuni_export::to_svg(session.shapes(), &metadata, None);
        match std::fs::write(svg_path, &svg) {
            Ok(()) => {
                eprintln!("SVG written to {} ({} bytes)", svg_path.display(), svg.len());
            }
            Err(e) => {
                eprintln!("Error writing SVG to {}: {e}", svg_path.display());
                return ExitCode::FAILURE;
            }
        }
    }

    if cli.json {
        println!("{snapshot_json}");
    } else {
        println!("Final score: {}", snapshot.score);
    }

    ExitCode::SUCCESS
}
