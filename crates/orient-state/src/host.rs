//! # Host Platform Interface
//!
//! The engine never talks to a windowing system directly. Everything it
//! needs from the platform goes through [`Host`]:
//!
//! - which surface is visible,
//! - the physical device tilt and whether the app is in the foreground,
//! - the request to physically rotate,
//! - the present/dismiss calls the transition state machine wraps.
//!
//! [`SimulatedHost`] is an in-memory implementation that records every
//! call. It backs the `orient` simulator CLI and the test suites.

use std::collections::HashMap;

use orient_core::{DeviceTilt, OrientationMask, PlatformError};
use serde::Serialize;

use crate::surface::SurfaceId;

/// Services the engine consumes from the host platform.
pub trait Host {
    /// The surface currently on screen, if any.
    fn active_surface(&self) -> Option<SurfaceId>;

    /// Ask the OS to rotate the display to `mask`.
    ///
    /// Failures are reported back but never undo the logical commit.
    fn apply_physical_orientation(&mut self, mask: OrientationMask) -> Result<(), PlatformError>;

    /// The device's physical orientation right now.
    fn device_tilt(&self) -> DeviceTilt;

    /// Whether the application is in the foreground and receiving events.
    fn is_foreground_active(&self) -> bool;

    /// Ask a surface (or its container) to re-query its supported mask.
    fn refresh_supported_mask(&mut self, _surface: SurfaceId) {}

    /// Present `presentee` modally over `presenter`.
    fn present(&mut self, presenter: SurfaceId, presentee: SurfaceId) -> Result<(), PlatformError>;

    /// Dismiss whatever `presenter` is presenting. Returns once the
    /// dismissal has completed.
    fn dismiss(&mut self, presenter: SurfaceId) -> Result<(), PlatformError>;
}

// ─── Simulated Host ──────────────────────────────────────────────────

/// A host call observed by [`SimulatedHost`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostEvent {
    Applied { mask: OrientationMask },
    ApplyFailed { mask: OrientationMask },
    Refreshed { surface: SurfaceId },
    Presented { presenter: SurfaceId, presentee: SurfaceId },
    Dismissed { presenter: SurfaceId },
}

/// In-memory host that records every call.
///
/// Presenting makes the presentee the active surface; dismissing hands it
/// back to the presenter, if that presenter had something on screen.
#[derive(Debug)]
pub struct SimulatedHost {
    pub active: Option<SurfaceId>,
    pub foreground: bool,
    pub tilt: DeviceTilt,
    /// Make `apply_physical_orientation` fail with `NoActiveWindow`.
    pub fail_apply: bool,
    /// Make `present` fail.
    pub fail_present: bool,
    /// Presenter → presentee currently on screen.
    presenting: HashMap<SurfaceId, SurfaceId>,
    events: Vec<HostEvent>,
}

impl Default for SimulatedHost {
    fn default() -> Self {
        Self {
            active: None,
            foreground: true,
            tilt: DeviceTilt::Portrait,
            fail_apply: false,
            fail_present: false,
            presenting: HashMap::new(),
            events: Vec::new(),
        }
    }
}

impl SimulatedHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call observed so far.
    pub fn events(&self) -> &[HostEvent] {
        &self.events
    }

    /// Masks successfully applied, in order.
    pub fn applied_masks(&self) -> Vec<OrientationMask> {
        self.events
            .iter()
            .filter_map(|e| match e {
                HostEvent::Applied { mask } => Some(*mask),
                _ => None,
            })
            .collect()
    }

    /// Presents carried out, in order.
    pub fn presented(&self) -> Vec<(SurfaceId, SurfaceId)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                HostEvent::Presented { presenter, presentee } => Some((*presenter, *presentee)),
                _ => None,
            })
            .collect()
    }

    /// Forget recorded events.
    pub fn clear_events(&mut self) {
        self.events.clear();
    }
}

impl Host for SimulatedHost {
    fn active_surface(&self) -> Option<SurfaceId> {
        self.active
    }

    fn apply_physical_orientation(&mut self, mask: OrientationMask) -> Result<(), PlatformError> {
        if self.fail_apply {
            self.events.push(HostEvent::ApplyFailed { mask });
            return Err(PlatformError::NoActiveWindow);
        }
        self.events.push(HostEvent::Applied { mask });
        Ok(())
    }

    fn device_tilt(&self) -> DeviceTilt {
        self.tilt
    }

    fn is_foreground_active(&self) -> bool {
        self.foreground
    }

    fn refresh_supported_mask(&mut self, surface: SurfaceId) {
        self.events.push(HostEvent::Refreshed { surface });
    }

    fn present(&mut self, presenter: SurfaceId, presentee: SurfaceId) -> Result<(), PlatformError> {
        if self.fail_present {
            return Err(PlatformError::Presentation(format!(
                "{presenter} cannot present {presentee}"
            )));
        }
        self.events.push(HostEvent::Presented { presenter, presentee });
        self.presenting.insert(presenter, presentee);
        self.active = Some(presentee);
        Ok(())
    }

    fn dismiss(&mut self, presenter: SurfaceId) -> Result<(), PlatformError> {
        self.events.push(HostEvent::Dismissed { presenter });
        if self.presenting.remove(&presenter).is_some() {
            self.active = Some(presenter);
        }
        Ok(())
    }
}
