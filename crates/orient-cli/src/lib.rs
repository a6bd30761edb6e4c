//! # orient-cli — Orientation Simulator
//!
//! The `orient` binary drives the orientation engine against an in-memory
//! host, so rotation behavior can be scripted and checked without a device.
//!
//! ## Subcommands
//!
//! - `run` — execute a YAML scenario file
//! - `demo` — execute one of the bundled rotate cases
//!
//! Both print a JSON [`scenario::Report`] to stdout, or to `--out`.
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in `main.rs` and the `*Args` structs.
//! - Handlers delegate to `orient-state`; no orientation logic here.

use std::path::Path;

use anyhow::{Context, Result};

pub mod demo;
pub mod run;
pub mod scenario;

/// Print `report` as pretty JSON to `out`, or stdout when `None`.
pub fn write_report(report: &scenario::Report, out: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("serializing report")?;
    match out {
        Some(path) => std::fs::write(path, json + "\n")
            .with_context(|| format!("writing report to {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}
