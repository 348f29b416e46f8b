use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use cro_match_actions::{logging, AppConfig};

#[derive(Parser)]
#[command(name = "action-runner")]
#[command(about = "Runs CRO matchmaker actions: one JSON request per stdin line, one reply per stdout line")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Provider roster file (overrides the config)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("failed to load config file '{}'", path.display()))?,
        None => AppConfig::default(),
    };
    if let Some(catalog) = args.catalog {
        config.catalog.path = Some(catalog);
    }

    logging::init_logger(&config.logging, args.verbose);
    tracing::info!(form = %config.dialogue.form_name, "starting action runner");

    let server = config.build_server().context("failed to build action server")?;

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read request")?;
        if line.trim().is_empty() {
            continue;
        }
        writeln!(stdout, "{}", server.handle_json(&line))?;
        stdout.flush()?;
    }

    tracing::info!("stdin closed, shutting down");
    Ok(())
}
