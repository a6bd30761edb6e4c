//! # Run Subcommand
//!
//! Executes a scenario file and prints its report.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;

use orient_core::OrientConfig;

use crate::scenario::{run_scenario, Scenario};
use crate::write_report;

/// Arguments for the `orient run` subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the scenario YAML file.
    pub scenario: PathBuf,

    /// Exit with status 2 if any step was rejected.
    #[arg(long)]
    pub deny_rejections: bool,
}

/// Execute `orient run`.
pub fn run_scenario_file(args: &RunArgs, config: &OrientConfig, out: Option<&Path>) -> Result<u8> {
    let scenario = Scenario::from_path(&args.scenario)?;
    tracing::info!(
        path = %args.scenario.display(),
        surfaces = scenario.surfaces.len(),
        steps = scenario.steps.len(),
        "running scenario"
    );
    let report = run_scenario(&scenario, config)?;
    write_report(&report, out)?;

    let rejections = report.rejections();
    if rejections > 0 {
        tracing::warn!(rejections, "scenario had rejected steps");
        if args.deny_rejections {
            return Ok(2);
        }
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, yaml: &str) -> PathBuf {
        let path = dir.join("scenario.yaml");
        std::fs::write(&path, yaml).unwrap();
        path
    }

    #[test]
    fn test_writes_report_file() {
        let dir = tempfile::tempdir().unwrap();
        let scenario = write(dir.path(), "surfaces:\n  - name: a\nsteps:\n  - appear: a\n");
        let out = dir.path().join("report.json");
        let args = RunArgs {
            scenario,
            deny_rejections: false,
        };
        assert_eq!(run_scenario_file(&args, &OrientConfig::default(), Some(&out)).unwrap(), 0);

        let report: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(report["surfaces"][0]["name"], "a");
    }

    #[test]
    fn test_deny_rejections_sets_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let scenario = write(
            dir.path(),
            "surfaces:\n  - name: a\nsteps:\n  - set: { orientation: landscapeLeft, surface: a }\n",
        );
        let out = dir.path().join("report.json");
        let args = RunArgs {
            scenario,
            deny_rejections: true,
        };
        assert_eq!(run_scenario_file(&args, &OrientConfig::default(), Some(&out)).unwrap(), 2);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let args = RunArgs {
            scenario: dir.path().join("nope.yaml"),
            deny_rejections: false,
        };
        assert!(run_scenario_file(&args, &OrientConfig::default(), None).is_err());
    }
}
