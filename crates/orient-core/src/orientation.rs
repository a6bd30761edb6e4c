//! # Interface Orientation
//!
//! The concrete orientation a surface is drawn in, and the portrait/landscape
//! family grouping used by subview rotation locks.
//!
//! `Orientation` has no total order. Only equality and family membership are
//! meaningful: the resolver never asks whether one orientation is "greater"
//! than another.

use serde::{Deserialize, Serialize};

use crate::device::DeviceTilt;
use crate::mask::OrientationMask;

/// A concrete interface orientation.
///
/// `Unknown` is the state of a surface that has never been resolved. It is
/// never a valid commit target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Orientation {
    /// Not yet resolved.
    #[default]
    Unknown,
    /// Home indicator at the bottom.
    Portrait,
    /// Home indicator at the top.
    PortraitUpsideDown,
    /// Content rotated so the top edge faces left.
    LandscapeLeft,
    /// Content rotated so the top edge faces right.
    LandscapeRight,
}

impl Orientation {
    /// The four orientations that can be committed.
    pub const CONCRETE: [Self; 4] = [
        Self::Portrait,
        Self::PortraitUpsideDown,
        Self::LandscapeLeft,
        Self::LandscapeRight,
    ];

    /// Whether this is `LandscapeLeft` or `LandscapeRight`.
    pub fn is_landscape(self) -> bool {
        matches!(self, Self::LandscapeLeft | Self::LandscapeRight)
    }

    /// Whether this is `Portrait` or `PortraitUpsideDown`.
    pub fn is_portrait(self) -> bool {
        matches!(self, Self::Portrait | Self::PortraitUpsideDown)
    }

    /// The lock family this orientation falls in.
    ///
    /// Anything that is not landscape (including `Unknown`) belongs to the
    /// portrait family.
    pub fn family(self) -> Family {
        if self.is_landscape() {
            Family::Landscape
        } else {
            Family::Portrait
        }
    }

    /// The single-orientation mask for this orientation.
    ///
    /// `Unknown` maps to [`OrientationMask::EMPTY`], which no mask contains
    /// as a proper singleton, so validation always rejects it.
    pub fn to_mask(self) -> OrientationMask {
        match self {
            Self::Unknown => OrientationMask::EMPTY,
            Self::Portrait => OrientationMask::PORTRAIT,
            Self::PortraitUpsideDown => OrientationMask::PORTRAIT_UPSIDE_DOWN,
            Self::LandscapeLeft => OrientationMask::LANDSCAPE_LEFT,
            Self::LandscapeRight => OrientationMask::LANDSCAPE_RIGHT,
        }
    }

    /// The device tilt that produces this interface orientation.
    ///
    /// Inverse of [`DeviceTilt::to_interface_orientation`]: the landscape
    /// cases are cross-handed.
    pub fn to_device_tilt(self) -> DeviceTilt {
        match self {
            Self::Unknown => DeviceTilt::Unknown,
            Self::Portrait => DeviceTilt::Portrait,
            Self::PortraitUpsideDown => DeviceTilt::PortraitUpsideDown,
            Self::LandscapeLeft => DeviceTilt::LandscapeRight,
            Self::LandscapeRight => DeviceTilt::LandscapeLeft,
        }
    }

    /// Canonical camelCase name, matching the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Portrait => "portrait",
            Self::PortraitUpsideDown => "portraitUpsideDown",
            Self::LandscapeLeft => "landscapeLeft",
            Self::LandscapeRight => "landscapeRight",
        }
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Portrait vs. landscape grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Family {
    /// Portrait and upside-down portrait.
    Portrait,
    /// Landscape left and landscape right.
    Landscape,
}

impl Family {
    /// The mask a lock of this family pins a surface to.
    pub fn mask(self) -> OrientationMask {
        match self {
            Self::Portrait => OrientationMask::PORTRAIT,
            Self::Landscape => OrientationMask::LANDSCAPE,
        }
    }

    /// The opposite family.
    pub fn other(self) -> Self {
        match self {
            Self::Portrait => Self::Landscape,
            Self::Landscape => Self::Portrait,
        }
    }
}

impl std::fmt::Display for Family {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Portrait => f.write_str("portrait"),
            Self::Landscape => f.write_str("landscape"),
        }
    }
}
