// logwhence - main.rs
//
// Replay entry point. Handles:
// 1. CLI argument parsing
// 2. Config loading (explicit path or platform default)
// 3. Logging initialisation (debug mode support)
// 4. Replay of a captured-event file into a JSON lines file

use logwhence::{app, platform, util};

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "logwhence", version, about)]
struct Cli {
    /// Captured native events, one JSON object per line.
    #[arg(short = 'i', long = "input")]
    input: PathBuf,

    /// Destination for normalised events (appended, JSON lines).
    #[arg(short = 'o', long = "output")]
    output: PathBuf,

    /// Config file (defaults to the platform config directory).
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        tracing::error!(error = %e, "Replay failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> util::error::Result<()> {
    // An explicit --config must load; the platform default may be absent.
    let (config, config_warnings, config_path) = match &cli.config {
        Some(path) => {
            let (config, warnings) = platform::config::load_config_strict(path)?;
            (config, warnings, path.clone())
        }
        None => {
            let path = platform::config::PlatformPaths::resolve().config_file();
            let (config, warnings) = platform::config::load_config(&path);
            (config, warnings, path)
        }
    };

    util::logging::init(cli.debug, config.log_level.as_deref());

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        config = %config_path.display(),
        "logwhence starting"
    );

    // Config was read before tracing existed; surface its warnings now.
    for warning in &config_warnings {
        tracing::warn!("{}", warning);
        eprintln!("Warning: {warning}");
    }

    let (summary, written) = app::replay::replay_file(&cli.input, &cli.output, &config)?;

    for err in &summary.errors {
        eprintln!("Skipped: {err}");
    }
    let unreported = summary.malformed.saturating_sub(summary.errors.len() as u64);
    if unreported > 0 {
        eprintln!("... and {unreported} more malformed lines");
    }
    println!(
        "{} lines, {} dispatched, {} malformed, {} written to {}",
        summary.lines,
        summary.dispatched,
        summary.malformed,
        written,
        cli.output.display()
    );
    Ok(())
}
