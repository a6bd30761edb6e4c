//! # Orientation Resolver
//!
//! Pure functions that decide which orientation a surface may use. None of
//! them fail: every question has a concrete answer.
//!
//! ## Effective Mask Precedence
//!
//! ```text
//!   temp_supported_mask   (transition override)   ─┐
//!   preferred_mask        (subview lock)           ├─ first present wins
//!   supported_mask        (declared)              ─┘
//! ```
//!
//! ## Default Orientation
//!
//! Used on first appearance, when `current_orientation` is still `Unknown`:
//!
//! 1. The presentation preference, if it differs from the current
//!    orientation and the supported mask contains it.
//! 2. Portrait, if supported.
//! 3. `LandscapeRight` / `LandscapeLeft` if the mask is exactly that one.
//! 4. The device-preferred horizontal orientation if the mask is exactly
//!    `LANDSCAPE`.
//! 5. Portrait.

use orient_core::{Orientation, OrientationMask};

use crate::surface::Surface;

/// The mask validation consults, by precedence temp > preferred > supported.
pub fn effective_mask(surface: &Surface) -> OrientationMask {
    surface
        .temp_supported_mask()
        .or(surface.preferred_mask())
        .unwrap_or(surface.supported_mask())
}

/// Whether `candidate` may be committed on `surface`.
pub fn validate(surface: &Surface, candidate: Orientation) -> bool {
    if candidate == Orientation::Unknown {
        return false;
    }
    effective_mask(surface).contains(candidate.to_mask())
}

/// The orientation a surface opens in when it has never been resolved.
pub fn default_orientation(surface: &Surface, device_preferred_horizontal: Orientation) -> Orientation {
    let support = surface.supported_mask();

    if let Some(preferred) = surface
        .presentation_preference()
        .resolve(device_preferred_horizontal)
    {
        if preferred != surface.current_orientation() && support.contains_orientation(preferred) {
            return preferred;
        }
    }

    if support.contains(OrientationMask::PORTRAIT) {
        Orientation::Portrait
    } else if support == OrientationMask::LANDSCAPE_RIGHT {
        Orientation::LandscapeRight
    } else if support == OrientationMask::LANDSCAPE_LEFT {
        Orientation::LandscapeLeft
    } else if support == OrientationMask::LANDSCAPE {
        device_preferred_horizontal
    } else {
        Orientation::Portrait
    }
}

/// The mask the host should report as the surface's supported
/// orientations: the committed mask, or the default orientation's mask if
/// nothing has been committed yet.
pub fn resolved_mask(surface: &Surface, device_preferred_horizontal: Orientation) -> OrientationMask {
    surface
        .current_mask()
        .unwrap_or_else(|| default_orientation(surface, device_preferred_horizontal).to_mask())
}

/// The orientation to move to when the current one stops being allowed,
/// for example after a subview lock narrows the effective mask.
///
/// Keeps the current orientation when it is still valid. Otherwise prefers
/// portrait, then the device-preferred horizontal orientation, then the
/// first allowed orientation. `Unknown` if the effective mask is empty.
pub fn reresolve_orientation(surface: &Surface, device_preferred_horizontal: Orientation) -> Orientation {
    let current = surface.current_orientation();
    if current == Orientation::Unknown {
        return default_orientation(surface, device_preferred_horizontal);
    }
    if validate(surface, current) {
        return current;
    }
    let mask = effective_mask(surface);
    if mask.contains_orientation(Orientation::Portrait) {
        Orientation::Portrait
    } else if mask.contains_orientation(device_preferred_horizontal) {
        device_preferred_horizontal
    } else {
        mask.orientations().next().unwrap_or(Orientation::Unknown)
    }
}
