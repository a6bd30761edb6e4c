//! # Present/Dismiss Transition State Machine
//!
//! Sequences orientation commits around modal presentations. Presenting a
//! portrait-only surface on top of a landscape presenter would otherwise
//! animate the new surface in with one stale landscape frame, because the
//! platform rotates asynchronously.
//!
//! ## States (per presenter)
//!
//! ```text
//!                 plan_present: trigger
//!   Normal ─────────────────────────────▶ PendingRotateThenPresent
//!     ▲                                          │ settle delay, host.present
//!     │                                          ▼
//!     │                               PresentedWithTempOverride
//!     │                                          │ dismiss, recover is landscape
//!     │ recovery commit                          ▼
//!     └──────────────────────────────────── Recovering
//! ```
//!
//! A dismiss whose saved orientation is not landscape, or a pending present
//! that cannot be carried out, lifts the override and returns straight to
//! `Normal`.
//!
//! ## Triggers
//!
//! - **Landscape presenter**: the presenter's effective mask is purely
//!   landscape and the presentee supports exactly `PORTRAIT`.
//! - **Portrait sheet**: the presentee is not full-screen, supports exactly
//!   `PORTRAIT`, and the presenter is not currently in portrait.
//!
//! This is the only place transient overrides are created, and each one is
//! lifted by the matching dismiss.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use orient_core::{OrientConfig, Orientation, OrientationMask};
use serde::{Deserialize, Serialize};

use crate::resolver;
use crate::surface::{PresentationStyle, Surface, SurfaceId};

/// Where a presenter is in the present/dismiss sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransitionState {
    /// No transition in flight.
    #[default]
    Normal,
    /// Presenter rotated to portrait; the present call waits for the
    /// rotation to settle.
    PendingRotateThenPresent,
    /// Presentee is on screen; the presenter carries the transient mask.
    PresentedWithTempOverride,
    /// Presentee dismissed; the presenter's saved orientation is restored
    /// after the settle delay.
    Recovering,
}

impl std::fmt::Display for TransitionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Normal => "NORMAL",
            Self::PendingRotateThenPresent => "PENDING_ROTATE_THEN_PRESENT",
            Self::PresentedWithTempOverride => "PRESENTED_WITH_TEMP_OVERRIDE",
            Self::Recovering => "RECOVERING",
        };
        f.write_str(s)
    }
}

/// Which condition caused a rotate-then-present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresentTrigger {
    LandscapePresenter,
    PortraitSheet,
}

/// What to do with a present request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentPlan {
    /// Present immediately, no override.
    PassThrough,
    /// Rotate the presenter to portrait, install the override, present
    /// after the settle delay.
    RotateThenPresent {
        trigger: PresentTrigger,
        /// Presenter orientation before the request.
        recover: Orientation,
    },
}

/// What to do once a dismiss has completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissPlan {
    /// No override was installed.
    PassThrough,
    /// Override lifted; the presenter keeps its normal resolution.
    ClearOverride,
    /// Override lifted; commit `recover` after the settle delay.
    RecoverAfterSettle { recover: Orientation },
}

/// One state change, kept as an audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub presenter: SurfaceId,
    pub presentee: Option<SurfaceId>,
    pub from: TransitionState,
    pub to: TransitionState,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
struct InFlight {
    presentee: Option<SurfaceId>,
    state: TransitionState,
}

/// Tracks in-flight transitions and owns the transient override fields.
#[derive(Debug)]
pub struct TransitionCoordinator {
    rotate_for_landscape_presenter: bool,
    rotate_for_portrait_sheet: bool,
    transient_mask: OrientationMask,
    in_flight: HashMap<SurfaceId, InFlight>,
    log: Vec<TransitionRecord>,
}

impl TransitionCoordinator {
    pub fn new(config: &OrientConfig) -> Self {
        Self {
            rotate_for_landscape_presenter: config.rotate_for_landscape_presenter,
            rotate_for_portrait_sheet: config.rotate_for_portrait_sheet,
            transient_mask: config.transient_mask,
            in_flight: HashMap::new(),
            log: Vec::new(),
        }
    }

    /// Current state of a presenter.
    pub fn state(&self, presenter: SurfaceId) -> TransitionState {
        self.in_flight
            .get(&presenter)
            .map(|t| t.state)
            .unwrap_or_default()
    }

    /// Audit trail of every state change so far.
    pub fn log(&self) -> &[TransitionRecord] {
        &self.log
    }

    /// Decide how to handle a present request. Pure.
    ///
    /// A presenter that already carries an override passes through, so a
    /// nested present never overwrites the saved orientation. A presenter
    /// that never resolved saves its default orientation instead of
    /// `Unknown`.
    pub fn plan_present(
        &self,
        presenter: &Surface,
        presentee: &Surface,
        device_preferred_horizontal: Orientation,
    ) -> PresentPlan {
        if presenter.temp_supported_mask().is_some() || self.state(presenter.id()) != TransitionState::Normal {
            return PresentPlan::PassThrough;
        }

        let presentee_portrait_only = presentee.supported_mask() == OrientationMask::PORTRAIT;
        if !presentee_portrait_only {
            return PresentPlan::PassThrough;
        }

        let recover = match presenter.current_orientation() {
            Orientation::Unknown => resolver::default_orientation(presenter, device_preferred_horizontal),
            current => current,
        };
        if self.rotate_for_landscape_presenter && resolver::effective_mask(presenter).is_purely_landscape() {
            return PresentPlan::RotateThenPresent {
                trigger: PresentTrigger::LandscapePresenter,
                recover,
            };
        }
        if self.rotate_for_portrait_sheet
            && presentee.presentation() == PresentationStyle::NonFullScreen
            && recover != Orientation::Portrait
        {
            return PresentPlan::RotateThenPresent {
                trigger: PresentTrigger::PortraitSheet,
                recover,
            };
        }
        PresentPlan::PassThrough
    }

    /// Enter `PendingRotateThenPresent`: install the transient mask and the
    /// saved orientation on the presenter.
    pub(crate) fn begin_rotate_then_present(
        &mut self,
        presenter: &mut Surface,
        presentee: SurfaceId,
        recover: Orientation,
    ) {
        presenter.install_override(self.transient_mask, recover);
        self.transition(
            presenter.id(),
            Some(presentee),
            TransitionState::PendingRotateThenPresent,
        );
    }

    /// The deferred present went through.
    pub(crate) fn mark_presented(&mut self, presenter: SurfaceId) {
        if self.state(presenter) == TransitionState::PendingRotateThenPresent {
            let presentee = self.in_flight.get(&presenter).and_then(|t| t.presentee);
            self.transition(presenter, presentee, TransitionState::PresentedWithTempOverride);
        }
    }

    /// Decide what a completed dismiss means for the presenter. Pure.
    pub fn plan_dismiss(&self, presenter: &Surface) -> DismissPlan {
        if presenter.temp_supported_mask().is_none() {
            return DismissPlan::PassThrough;
        }
        match presenter.recover_orientation() {
            Some(recover) if recover.is_landscape() => DismissPlan::RecoverAfterSettle { recover },
            _ => DismissPlan::ClearOverride,
        }
    }

    /// Lift the presenter's override according to [`Self::plan_dismiss`].
    pub(crate) fn end_override(&mut self, presenter: &mut Surface) -> DismissPlan {
        let plan = self.plan_dismiss(presenter);
        let id = presenter.id();
        let presentee = self.in_flight.get(&id).and_then(|t| t.presentee);
        match plan {
            DismissPlan::PassThrough => {}
            DismissPlan::ClearOverride => {
                presenter.clear_override();
                self.transition(id, presentee, TransitionState::Normal);
            }
            DismissPlan::RecoverAfterSettle { .. } => {
                presenter.clear_override();
                self.transition(id, presentee, TransitionState::Recovering);
            }
        }
        plan
    }

    /// The delayed recovery commit has run (or been skipped).
    pub(crate) fn finish_recovery(&mut self, presenter: SurfaceId) {
        if self.state(presenter) == TransitionState::Recovering {
            let presentee = self.in_flight.get(&presenter).and_then(|t| t.presentee);
            self.transition(presenter, presentee, TransitionState::Normal);
        }
    }

    /// Drop in-flight state for a removed surface.
    pub(crate) fn forget_surface(&mut self, surface: SurfaceId) {
        self.in_flight.remove(&surface);
    }

    fn transition(&mut self, presenter: SurfaceId, presentee: Option<SurfaceId>, to: TransitionState) {
        let from = self.state(presenter);
        if to == TransitionState::Normal {
            self.in_flight.remove(&presenter);
        } else {
            self.in_flight.insert(presenter, InFlight { presentee, state: to });
        }
        tracing::info!(%presenter, %from, %to, "presentation transition");
        self.log.push(TransitionRecord {
            presenter,
            presentee,
            from,
            to,
            at: Utc::now(),
        });
    }
}
