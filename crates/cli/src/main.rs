//! Bus fabric command-line front end.
//!
//! This binary builds a fabric from a JSON configuration. It provides:
//! 1. **Check:** Build the fabric and print its route table.
//! 2. **Run:** Build the fabric and replay a transaction script through the router.
//!
//! Log output goes to stderr; `RUST_LOG` selects the level (default `warn`, `-v` raises it).

mod script;

use std::path::{Path, PathBuf};
use std::process;

use busfab_core::{Fabric, FabricConfig, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "busfab",
    author,
    version,
    about = "Transaction-level bus fabric",
    long_about = "Build a bus fabric (router, handshake bridges, memories) from a JSON \
                  configuration and exercise it.\n\nExamples:\n  busfab check -c fabric.json\n  \
                  busfab run -c fabric.json -s smoke.json"
)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the fabric and print its route table.
    Check {
        /// Fabric configuration (JSON).
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Replay a transaction script against the fabric.
    Run {
        /// Fabric configuration (JSON).
        #[arg(short, long)]
        config: PathBuf,

        /// Transaction script (JSON array of steps).
        #[arg(short, long)]
        script: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let outcome = match &cli.command {
        Commands::Check { config } => cmd_check(config),
        Commands::Run { config, script } => cmd_run(config, script),
    };

    match outcome {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("[!] FATAL: {e}");
            process::exit(1);
        }
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build(config: &Path) -> Result<Fabric> {
    let config = FabricConfig::from_file(config)?;
    Fabric::from_config(&config)
}

/// Prints one row per target: index, name, range and post-decode mask.
fn cmd_check(config: &Path) -> Result<bool> {
    let fabric = build(config)?;
    let router = fabric.router();

    println!(
        "{:>3}  {:<16} {:>18} {:>18} {:>18}",
        "idx", "target", "base", "top", "mask"
    );
    for index in 0..router.target_count() {
        let name = router.target(index).map_or("?", |t| t.name());
        match router.route_entry(index) {
            Some(r) => println!(
                "{index:>3}  {name:<16} {:>#18x} {:>#18x} {:>#18x}",
                r.base, r.top, r.mask
            ),
            None => println!("{index:>3}  {name:<16} {:>18}", "(unrouted)"),
        }
    }
    Ok(true)
}

/// Replays the script, then prints per-target counters. Returns `false` on read mismatches.
fn cmd_run(config: &Path, script_path: &Path) -> Result<bool> {
    let mut fabric = build(config)?;
    let steps = script::load(script_path)?;
    let router = fabric.router_mut();

    let summary = script::replay(router, &steps)?;
    if let Some(log) = router.log_mut() {
        log.flush()?;
    }

    println!();
    println!(
        "[*] {} steps, {} mismatches, router time {}",
        summary.steps,
        summary.mismatches,
        router.local_time()
    );
    for index in 0..router.target_count() {
        if let (Some(target), Some(stats)) = (router.target(index), router.stats(index)) {
            println!(
                "    {:<16} reads {:>8}  writes {:>8}",
                target.name(),
                stats.reads,
                stats.writes
            );
        }
    }
    Ok(summary.mismatches == 0)
}
