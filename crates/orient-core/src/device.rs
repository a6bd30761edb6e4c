//! # Device Tilt
//!
//! Physical device orientation as reported by the motion sensors, and its
//! mapping onto interface orientations.
//!
//! The landscape cases are cross-handed: tilting the device to its left
//! puts the interface in `LandscapeRight`, matching the camera-vs-display
//! convention of the platform.
//!
//! | device tilt | interface orientation |
//! |---|---|
//! | portrait | portrait |
//! | landscapeLeft | landscapeRight |
//! | landscapeRight | landscapeLeft |
//! | portraitUpsideDown | portraitUpsideDown |
//! | faceUp / faceDown / unknown | unknown |

use serde::{Deserialize, Serialize};

use crate::orientation::Orientation;

/// Physical device orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeviceTilt {
    /// Sensors have not reported yet.
    #[default]
    Unknown,
    /// Upright.
    Portrait,
    /// Upside down.
    PortraitUpsideDown,
    /// Rotated with the home button on the right.
    LandscapeLeft,
    /// Rotated with the home button on the left.
    LandscapeRight,
    /// Lying flat, screen up.
    FaceUp,
    /// Lying flat, screen down.
    FaceDown,
}

impl DeviceTilt {
    /// Map the tilt onto an interface orientation.
    ///
    /// Flat and unknown tilts yield [`Orientation::Unknown`], which callers
    /// ignore.
    pub fn to_interface_orientation(self) -> Orientation {
        match self {
            Self::Portrait => Orientation::Portrait,
            Self::PortraitUpsideDown => Orientation::PortraitUpsideDown,
            Self::LandscapeLeft => Orientation::LandscapeRight,
            Self::LandscapeRight => Orientation::LandscapeLeft,
            Self::Unknown | Self::FaceUp | Self::FaceDown => Orientation::Unknown,
        }
    }

    /// The landscape orientation a landscape-only surface should open in.
    ///
    /// Follows the device when it is already held sideways, otherwise
    /// defaults to `LandscapeRight`.
    pub fn preferred_horizontal(self) -> Orientation {
        match self {
            Self::LandscapeRight => Orientation::LandscapeLeft,
            _ => Orientation::LandscapeRight,
        }
    }

    /// Whether the device lies flat.
    pub fn is_flat(self) -> bool {
        matches!(self, Self::FaceUp | Self::FaceDown)
    }
}
