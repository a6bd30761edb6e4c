//! # orient CLI entry point
//!
//! Parses command-line arguments, loads the engine configuration and
//! dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use orient_cli::demo::{run_demo, DemoArgs};
use orient_cli::run::{run_scenario_file, RunArgs};
use orient_core::OrientConfig;

/// Orientation simulator.
///
/// Runs scripted host events through the orientation arbitration engine
/// and reports the orientation every surface ends up in.
#[derive(Parser, Debug)]
#[command(name = "orient", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to an engine configuration file (YAML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write the JSON report here instead of stdout.
    #[arg(long, global = true)]
    out: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a scenario file.
    Run(RunArgs),

    /// Run a bundled rotate case.
    Demo(DemoArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    // Logs go to stderr so the report on stdout stays parseable.
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let result = load_config(cli.config.as_deref()).and_then(|config| match &cli.command {
        Commands::Run(args) => run_scenario_file(args, &config, cli.out.as_deref()),
        Commands::Demo(args) => run_demo(args, &config, cli.out.as_deref()),
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<OrientConfig> {
    match path {
        Some(path) => OrientConfig::from_path(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(OrientConfig::default()),
    }
}
