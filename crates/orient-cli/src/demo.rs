//! # Demo Subcommand
//!
//! Built-in rotate cases: a list screen inside a navigation container that
//! pushes or presents a portrait-only, landscape-only or rotatable page,
//! plus a portrait sheet over a landscape-only video screen. Each case is a
//! bundled scenario file run through [`crate::scenario`].

use std::path::Path;

use anyhow::Result;
use clap::{Args, ValueEnum};

use orient_core::OrientConfig;

use crate::scenario::{run_scenario, Report, Scenario};
use crate::write_report;

/// Arguments for the `orient demo` subcommand.
#[derive(Args, Debug)]
pub struct DemoArgs {
    /// Case to run.
    #[arg(value_enum)]
    pub case: DemoCase,

    /// Print the bundled scenario instead of running it.
    #[arg(long)]
    pub show: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoCase {
    PushToOnlyPortrait,
    PushToOnlyLandscape,
    PushToAllButUpsideDown,
    PresentToOnlyPortrait,
    PresentToOnlyLandscape,
    PresentToAllButUpsideDown,
    PresentSheetOverLandscape,
}

impl DemoCase {
    pub const ALL: [DemoCase; 7] = [
        Self::PushToOnlyPortrait,
        Self::PushToOnlyLandscape,
        Self::PushToAllButUpsideDown,
        Self::PresentToOnlyPortrait,
        Self::PresentToOnlyLandscape,
        Self::PresentToAllButUpsideDown,
        Self::PresentSheetOverLandscape,
    ];

    /// The bundled scenario source.
    pub fn source(self) -> &'static str {
        match self {
            Self::PushToOnlyPortrait => include_str!("../scenarios/push-to-only-portrait.yaml"),
            Self::PushToOnlyLandscape => include_str!("../scenarios/push-to-only-landscape.yaml"),
            Self::PushToAllButUpsideDown => {
                include_str!("../scenarios/push-to-all-but-upside-down.yaml")
            }
            Self::PresentToOnlyPortrait => include_str!("../scenarios/present-to-only-portrait.yaml"),
            Self::PresentToOnlyLandscape => {
                include_str!("../scenarios/present-to-only-landscape.yaml")
            }
            Self::PresentToAllButUpsideDown => {
                include_str!("../scenarios/present-to-all-but-upside-down.yaml")
            }
            Self::PresentSheetOverLandscape => {
                include_str!("../scenarios/present-sheet-over-landscape.yaml")
            }
        }
    }

    pub fn scenario(self) -> Result<Scenario> {
        Scenario::from_yaml_str(self.source())
    }

    pub fn run(self, config: &OrientConfig) -> Result<Report> {
        run_scenario(&self.scenario()?, config)
    }
}

/// Execute `orient demo`.
pub fn run_demo(args: &DemoArgs, config: &OrientConfig, out: Option<&Path>) -> Result<u8> {
    if args.show {
        print!("{}", args.case.source());
        return Ok(0);
    }
    tracing::info!(case = ?args.case, "running demo case");
    let report = args.case.run(config)?;
    write_report(&report, out)?;
    Ok(0)
}
