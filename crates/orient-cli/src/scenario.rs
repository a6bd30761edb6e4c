//! # Scenario Runner
//!
//! Drives an [`OrientationManager`] backed by a [`SimulatedHost`] through a
//! scripted sequence of host events, and reports where every surface ended
//! up.
//!
//! ## Scenario Format
//!
//! ```yaml
//! name: video over list
//! device: portrait
//! surfaces:
//!   - name: nav
//!     kind: container
//!   - name: list
//!     supported: allButUpsideDown
//!     container: nav
//!     prefers: deviceHorizontal
//!   - name: sheet
//!     supported: portrait
//!     presentation: nonFullScreen
//! steps:
//!   - appear: list
//!   - tilt: landscapeLeft
//!   - present: { presenter: list, presentee: sheet }
//!   - wait_ms: 200
//!   - dismiss: list
//!   - wait_ms: 200
//! ```
//!
//! Surfaces refer to each other by name; a container must be declared
//! before the surfaces inside it.
//!
//! ## Clock
//!
//! Scenarios run on a paused tokio clock. `wait_ms` advances it and fires
//! whatever deferred steps fell due, so a scenario finishes instantly
//! regardless of its settle delays.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use orient_core::{DeviceTilt, OrientConfig, Orientation, OrientationMask};
use orient_state::{
    Commit, DismissPlan, LockOwner, OrientationManager, PresentPlan, PresentationPreference,
    PresentationStyle, Rejection, SimulatedHost, SurfaceId, SurfaceKind, SurfaceSpec,
    TransitionState,
};

// ─── Scenario Model ──────────────────────────────────────────────────

/// A scripted run.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,
    /// Device tilt before the first step.
    #[serde(default = "default_device")]
    pub device: DeviceTilt,
    #[serde(with = "serde_yaml::with::singleton_map_recursive")]
    pub surfaces: Vec<SurfaceDecl>,
    #[serde(default, with = "serde_yaml::with::singleton_map_recursive")]
    pub steps: Vec<Step>,
}

fn default_device() -> DeviceTilt {
    DeviceTilt::Portrait
}

/// One surface declaration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SurfaceDecl {
    pub name: String,
    #[serde(default)]
    pub supported: Option<OrientationMask>,
    #[serde(default)]
    pub kind: SurfaceKind,
    #[serde(default)]
    pub presentation: PresentationStyle,
    #[serde(default)]
    pub prefers: PresentationPreference,
    #[serde(default)]
    pub container: Option<String>,
}

/// One scripted host event.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// The surface is about to appear and becomes the active one.
    Appear(String),
    Disappear(String),
    /// A device tilt event.
    Tilt(DeviceTilt),
    /// Explicit commit, on the named surface or the active one.
    Set {
        orientation: Orientation,
        #[serde(default)]
        surface: Option<String>,
    },
    Lock {
        surface: String,
        owner: u64,
    },
    Unlock {
        surface: String,
        owner: u64,
    },
    ResetLocks(String),
    /// Move the surface into its effective mask.
    Reresolve(String),
    /// Replace the surface's declared supported mask.
    Supported {
        surface: String,
        mask: OrientationMask,
    },
    Present {
        presenter: String,
        presentee: String,
    },
    Dismiss(String),
    /// Advance the clock and fire due deferred steps.
    WaitMs(u64),
    Background,
    Foreground,
    /// Make the host fail (or stop failing) physical rotation requests.
    FailApply(bool),
}

impl Scenario {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("parsing scenario")
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        Self::from_yaml_str(&yaml).with_context(|| format!("in {}", path.display()))
    }
}

// ─── Report ──────────────────────────────────────────────────────────

/// Outcome of a scenario run, printed as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub scenario: Option<String>,
    pub surfaces: Vec<SurfaceReport>,
    pub steps: Vec<StepOutcome>,
    pub applied_masks: Vec<OrientationMask>,
    pub presented: Vec<PresentedReport>,
    pub transitions: Vec<TransitionReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SurfaceReport {
    pub name: String,
    pub orientation: Orientation,
    pub mask: Option<OrientationMask>,
    pub supported_mask: OrientationMask,
    pub preferred_mask: Option<OrientationMask>,
    pub temp_supported_mask: Option<OrientationMask>,
    pub locked: bool,
    pub active: bool,
    pub transition: TransitionState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    pub index: usize,
    pub step: String,
    pub outcome: String,
    pub rejected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresentedReport {
    pub presenter: String,
    pub presentee: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionReport {
    pub presenter: String,
    pub from: TransitionState,
    pub to: TransitionState,
}

impl Report {
    pub fn surface(&self, name: &str) -> Option<&SurfaceReport> {
        self.surfaces.iter().find(|s| s.name == name)
    }

    pub fn rejections(&self) -> usize {
        self.steps.iter().filter(|s| s.rejected).count()
    }
}

// ─── Runner ──────────────────────────────────────────────────────────

/// Run `scenario` to completion.
pub fn run_scenario(scenario: &Scenario, config: &OrientConfig) -> Result<Report> {
    config.validate().context("invalid configuration")?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .context("building simulator clock")?;
    runtime.block_on(async {
        let mut sim = Simulation::new(scenario, config.clone())?;
        for (index, step) in scenario.steps.iter().enumerate() {
            sim.step(index, step).await?;
        }
        Ok::<_, anyhow::Error>(sim.into_report(scenario.name.clone()))
    })
}

struct Simulation {
    manager: OrientationManager<SimulatedHost>,
    ids: HashMap<String, SurfaceId>,
    outcomes: Vec<StepOutcome>,
}

impl Simulation {
    fn new(scenario: &Scenario, config: OrientConfig) -> Result<Self> {
        let mut host = SimulatedHost::new();
        host.tilt = scenario.device;
        let mut manager = OrientationManager::new(host, config);
        let mut ids = HashMap::new();

        for decl in &scenario.surfaces {
            if ids.contains_key(&decl.name) {
                bail!("surface `{}` declared twice", decl.name);
            }
            let container = match &decl.container {
                Some(name) => Some(*ids.get(name).with_context(|| {
                    format!("surface `{}` is inside undeclared container `{name}`", decl.name)
                })?),
                None => None,
            };
            let spec = SurfaceSpec {
                name: decl.name.clone(),
                supported_mask: decl.supported,
                kind: decl.kind,
                presentation: decl.presentation,
                presentation_preference: decl.prefers,
                container,
            };
            ids.insert(decl.name.clone(), manager.register_surface(spec));
        }

        Ok(Self {
            manager,
            ids,
            outcomes: Vec::new(),
        })
    }

    fn id(&self, name: &str) -> Result<SurfaceId> {
        self.ids
            .get(name)
            .copied()
            .with_context(|| format!("unknown surface `{name}`"))
    }

    fn name(&self, id: SurfaceId) -> String {
        self.manager
            .surface(id)
            .map(|s| s.name().to_owned())
            .unwrap_or_else(|| id.to_string())
    }

    async fn step(&mut self, index: usize, step: &Step) -> Result<()> {
        let (outcome, rejected) = match step {
            Step::Appear(name) => {
                let id = self.id(name)?;
                let result = self.manager.surface_will_appear(id);
                if self.manager.surface(id).map(|s| s.kind()) == Some(SurfaceKind::Content) {
                    self.manager.host_mut().active = Some(id);
                }
                match result {
                    Some(result) => commit_outcome(result),
                    None => ("not resolved".to_owned(), false),
                }
            }
            Step::Disappear(name) => {
                let id = self.id(name)?;
                self.manager.surface_will_disappear(id);
                if self.manager.host().active == Some(id) {
                    self.manager.host_mut().active = None;
                }
                ("inactive".to_owned(), false)
            }
            Step::Tilt(tilt) => {
                self.manager.host_mut().tilt = *tilt;
                match self.manager.handle_device_tilt(*tilt) {
                    Some(result) => commit_outcome(result),
                    None => ("ignored".to_owned(), false),
                }
            }
            Step::Set { orientation, surface } => {
                let id = surface.as_deref().map(|name| self.id(name)).transpose()?;
                commit_outcome(self.manager.set(*orientation, id))
            }
            Step::Lock { surface, owner } => {
                let id = self.id(surface)?;
                match self.manager.lock_rotation(LockOwner(*owner), id) {
                    Ok(family) => (format!("locked to {family}"), false),
                    Err(rejection) => rejected(rejection),
                }
            }
            Step::Unlock { surface, owner } => {
                let id = self.id(surface)?;
                match self.manager.unlock_rotation(LockOwner(*owner), id) {
                    Ok(true) => ("unlocked".to_owned(), false),
                    Ok(false) => ("not locked by owner".to_owned(), false),
                    Err(rejection) => rejected(rejection),
                }
            }
            Step::ResetLocks(name) => {
                let id = self.id(name)?;
                match self.manager.reset_all_locks(id) {
                    Ok(()) => ("locks reset".to_owned(), false),
                    Err(rejection) => rejected(rejection),
                }
            }
            Step::Reresolve(name) => {
                let id = self.id(name)?;
                commit_outcome(self.manager.reresolve(id))
            }
            Step::Supported { surface, mask } => {
                let id = self.id(surface)?;
                match self.manager.set_supported_mask(id, *mask) {
                    Ok(()) => (format!("supports {mask}"), false),
                    Err(rejection) => rejected(rejection),
                }
            }
            Step::Present {
                presenter,
                presentee,
            } => {
                let (from, to) = (self.id(presenter)?, self.id(presentee)?);
                match self.manager.present(from, to) {
                    Ok(PresentPlan::PassThrough) => ("presented".to_owned(), false),
                    Ok(PresentPlan::RotateThenPresent { recover, .. }) => {
                        (format!("rotating presenter first, will recover {recover}"), false)
                    }
                    Err(rejection) => rejected(rejection),
                }
            }
            Step::Dismiss(name) => {
                let id = self.id(name)?;
                match self.manager.dismiss(id) {
                    Ok(DismissPlan::PassThrough) => ("dismissed".to_owned(), false),
                    Ok(DismissPlan::ClearOverride) => ("dismissed, override cleared".to_owned(), false),
                    Ok(DismissPlan::RecoverAfterSettle { recover }) => {
                        (format!("dismissed, recovering {recover}"), false)
                    }
                    Err(rejection) => rejected(rejection),
                }
            }
            Step::WaitMs(ms) => {
                tokio::time::advance(Duration::from_millis(*ms)).await;
                let fired = self.manager.run_due(Instant::now());
                (format!("{fired} deferred step(s) fired"), false)
            }
            Step::Background => {
                self.manager.host_mut().foreground = false;
                ("background".to_owned(), false)
            }
            Step::Foreground => {
                self.manager.host_mut().foreground = true;
                ("foreground".to_owned(), false)
            }
            Step::FailApply(fail) => {
                self.manager.host_mut().fail_apply = *fail;
                (format!("fail_apply = {fail}"), false)
            }
        };

        tracing::debug!(index, ?step, %outcome, "scenario step");
        self.outcomes.push(StepOutcome {
            index,
            step: format!("{step:?}"),
            outcome,
            rejected,
        });
        Ok(())
    }

    fn into_report(self, scenario: Option<String>) -> Report {
        let m = &self.manager;
        let surfaces = m
            .surfaces()
            .iter()
            .map(|s| SurfaceReport {
                name: s.name().to_owned(),
                orientation: s.current_orientation(),
                mask: s.current_mask(),
                supported_mask: s.supported_mask(),
                preferred_mask: s.preferred_mask(),
                temp_supported_mask: s.temp_supported_mask(),
                locked: m.is_locked_by_subviews(s.id()),
                active: s.is_active(),
                transition: m.transition_state(s.id()),
            })
            .collect();
        let presented = m
            .host()
            .presented()
            .into_iter()
            .map(|(presenter, presentee)| PresentedReport {
                presenter: self.name(presenter),
                presentee: self.name(presentee),
            })
            .collect();
        let transitions = m
            .transition_log()
            .iter()
            .map(|r| TransitionReport {
                presenter: self.name(r.presenter),
                from: r.from,
                to: r.to,
            })
            .collect();

        Report {
            scenario,
            surfaces,
            applied_masks: m.host().applied_masks(),
            presented,
            transitions,
            steps: self.outcomes,
        }
    }
}

fn commit_outcome(result: Result<Commit, Rejection>) -> (String, bool) {
    match result {
        Ok(commit) if commit.applied => (format!("committed {}", commit.orientation), false),
        Ok(commit) => (format!("committed {} (not applied)", commit.orientation), false),
        Err(rejection) => rejected(rejection),
    }
}

fn rejected(rejection: Rejection) -> (String, bool) {
    (format!("rejected: {rejection}"), true)
}
