//! # Rejections
//!
//! Why a request to the engine did not take effect. Rejections are routine
//! (the device points somewhere the surface forbids, nothing is on screen)
//! and are returned as values for the caller to inspect or ignore. They are
//! logged at `debug` and never escalate.

use orient_core::{Orientation, OrientationMask};
use thiserror::Error;

use crate::surface::SurfaceId;

/// A request that was rejected without changing any state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The orientation is `Unknown` or outside the surface's effective mask.
    #[error("orientation {orientation} rejected{}", effective_suffix(.effective))]
    InvalidOrientation {
        orientation: Orientation,
        /// Effective mask it was checked against; `None` for `Unknown`,
        /// which is rejected before any surface is consulted.
        effective: Option<OrientationMask>,
    },

    /// No surface was given and the host reports none on screen.
    #[error("no active surface")]
    NoActiveSurface,

    /// The surface handle no longer resolves.
    #[error("{0} no longer exists")]
    UnknownSurface(SurfaceId),
}

fn effective_suffix(effective: &Option<OrientationMask>) -> String {
    match effective {
        Some(mask) => format!(" by effective mask {mask}"),
        None => String::new(),
    }
}

/// The `OrientationService` task has stopped.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("orientation service is no longer running")]
pub struct ServiceClosed;
