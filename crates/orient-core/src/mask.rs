//! # Orientation Masks
//!
//! A bit-set over the four concrete orientations. Masks describe what a
//! surface supports, what a subview lock pins it to, and what a transition
//! temporarily widens it to.
//!
//! ## Bit Layout
//!
//! The layout follows the platform convention of `1 << raw_orientation`:
//!
//! ```text
//!   bit 1  portrait
//!   bit 2  portraitUpsideDown
//!   bit 3  landscapeRight
//!   bit 4  landscapeLeft
//! ```
//!
//! ## Equality vs. Containment
//!
//! `mask == OrientationMask::LANDSCAPE_RIGHT` asks whether the mask is
//! *exactly* that one orientation. `mask.contains_orientation(LandscapeRight)`
//! asks whether it is allowed. The resolver depends on both, and they must
//! not be confused.

use std::ops::{BitAnd, BitOr};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::OrientError;
use crate::orientation::Orientation;

const PORTRAIT_BIT: u8 = 1 << 1;
const UPSIDE_DOWN_BIT: u8 = 1 << 2;
const LANDSCAPE_RIGHT_BIT: u8 = 1 << 3;
const LANDSCAPE_LEFT_BIT: u8 = 1 << 4;
const VALID_BITS: u8 = PORTRAIT_BIT | UPSIDE_DOWN_BIT | LANDSCAPE_RIGHT_BIT | LANDSCAPE_LEFT_BIT;

/// A set of allowed concrete orientations.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrientationMask(u8);

impl OrientationMask {
    /// No orientation allowed.
    pub const EMPTY: Self = Self(0);
    /// Portrait only.
    pub const PORTRAIT: Self = Self(PORTRAIT_BIT);
    /// Upside-down portrait only.
    pub const PORTRAIT_UPSIDE_DOWN: Self = Self(UPSIDE_DOWN_BIT);
    /// Landscape left only.
    pub const LANDSCAPE_LEFT: Self = Self(LANDSCAPE_LEFT_BIT);
    /// Landscape right only.
    pub const LANDSCAPE_RIGHT: Self = Self(LANDSCAPE_RIGHT_BIT);
    /// Both landscape orientations.
    pub const LANDSCAPE: Self = Self(LANDSCAPE_LEFT_BIT | LANDSCAPE_RIGHT_BIT);
    /// Portrait plus both landscape orientations.
    pub const ALL_BUT_UPSIDE_DOWN: Self = Self(PORTRAIT_BIT | LANDSCAPE_LEFT_BIT | LANDSCAPE_RIGHT_BIT);
    /// Every concrete orientation.
    pub const ALL: Self = Self(VALID_BITS);

    /// Build a mask from raw bits, discarding bits outside the valid layout.
    pub fn from_bits_truncate(bits: u8) -> Self {
        Self(bits & VALID_BITS)
    }

    /// Raw bit representation.
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Whether no orientation is allowed.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Superset test: every orientation in `other` is also in `self`.
    ///
    /// The empty mask is contained in everything; callers validating an
    /// orientation must reject `Unknown` before asking.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether a single orientation is allowed. Always false for `Unknown`.
    pub fn contains_orientation(self, orientation: Orientation) -> bool {
        let single = orientation.to_mask();
        !single.is_empty() && self.contains(single)
    }

    /// Set union.
    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Set intersection.
    pub fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// Non-empty and made up of landscape orientations only.
    ///
    /// True for exactly `LANDSCAPE`, `LANDSCAPE_LEFT` and `LANDSCAPE_RIGHT`.
    pub fn is_purely_landscape(self) -> bool {
        !self.is_empty() && Self::LANDSCAPE.contains(self)
    }

    /// The allowed orientations, in declaration order of [`Orientation`].
    pub fn orientations(self) -> impl Iterator<Item = Orientation> {
        Orientation::CONCRETE
            .into_iter()
            .filter(move |o| self.contains_orientation(*o))
    }
}

impl BitOr for OrientationMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitAnd for OrientationMask {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        self.intersection(rhs)
    }
}

impl From<Orientation> for OrientationMask {
    fn from(orientation: Orientation) -> Self {
        orientation.to_mask()
    }
}

// ─── Text Form ───────────────────────────────────────────────────────

/// Named aliases, checked before falling back to a `|`-joined list.
const ALIASES: [(&str, OrientationMask); 4] = [
    ("all", OrientationMask::ALL),
    ("allButUpsideDown", OrientationMask::ALL_BUT_UPSIDE_DOWN),
    ("landscape", OrientationMask::LANDSCAPE),
    ("none", OrientationMask::EMPTY),
];

impl std::fmt::Display for OrientationMask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some((name, _)) = ALIASES.iter().find(|(_, mask)| mask == self) {
            return f.write_str(name);
        }
        let mut first = true;
        for orientation in self.orientations() {
            if !first {
                f.write_str("|")?;
            }
            f.write_str(orientation.as_str())?;
            first = false;
        }
        Ok(())
    }
}

impl std::fmt::Debug for OrientationMask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrientationMask({self})")
    }
}

impl FromStr for OrientationMask {
    type Err = OrientError;

    /// Parse `|`-separated orientation names and aliases, e.g.
    /// `"portrait|landscapeRight"` or `"allButUpsideDown"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut mask = Self::EMPTY;
        for part in s.split('|').map(str::trim) {
            let next = match part {
                "portrait" => Self::PORTRAIT,
                "portraitUpsideDown" => Self::PORTRAIT_UPSIDE_DOWN,
                "landscapeLeft" => Self::LANDSCAPE_LEFT,
                "landscapeRight" => Self::LANDSCAPE_RIGHT,
                other => ALIASES
                    .iter()
                    .find(|(name, _)| *name == other)
                    .map(|(_, mask)| *mask)
                    .ok_or_else(|| OrientError::UnknownMaskName(other.to_string()))?,
            };
            mask = mask | next;
        }
        Ok(mask)
    }
}

impl TryFrom<String> for OrientationMask {
    type Error = OrientError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OrientationMask> for String {
    fn from(mask: OrientationMask) -> Self {
        mask.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_landscape_is_exactly_left_and_right() {
        assert_eq!(
            OrientationMask::LANDSCAPE,
            OrientationMask::LANDSCAPE_LEFT | OrientationMask::LANDSCAPE_RIGHT
        );
        assert_eq!(
            OrientationMask::LANDSCAPE.orientations().collect::<Vec<_>>(),
            vec![Orientation::LandscapeLeft, Orientation::LandscapeRight]
        );
    }

    #[test]
    fn test_all_but_upside_down() {
        let mask = OrientationMask::ALL_BUT_UPSIDE_DOWN;
        assert_eq!(mask, OrientationMask::PORTRAIT | OrientationMask::LANDSCAPE);
        assert!(!mask.contains_orientation(Orientation::PortraitUpsideDown));
    }

    #[test]
    fn test_equality_is_not_containment() {
        let mask = OrientationMask::LANDSCAPE;
        assert!(mask.contains_orientation(Orientation::LandscapeRight));
        assert_ne!(mask, OrientationMask::LANDSCAPE_RIGHT);
    }

    #[test]
    fn test_unknown_never_contained() {
        assert!(!OrientationMask::ALL.contains_orientation(Orientation::Unknown));
    }

    #[test]
    fn test_purely_landscape() {
        assert!(OrientationMask::LANDSCAPE.is_purely_landscape());
        assert!(OrientationMask::LANDSCAPE_LEFT.is_purely_landscape());
        assert!(OrientationMask::LANDSCAPE_RIGHT.is_purely_landscape());
        assert!(!OrientationMask::ALL_BUT_UPSIDE_DOWN.is_purely_landscape());
        assert!(!OrientationMask::EMPTY.is_purely_landscape());
    }

    #[test]
    fn test_from_bits_truncate_drops_unknown_bit() {
        assert_eq!(OrientationMask::from_bits_truncate(0b1), OrientationMask::EMPTY);
        assert_eq!(OrientationMask::from_bits_truncate(0xFF), OrientationMask::ALL);
    }

    #[test]
    fn test_display_prefers_aliases() {
        assert_eq!(OrientationMask::LANDSCAPE.to_string(), "landscape");
        assert_eq!(OrientationMask::ALL_BUT_UPSIDE_DOWN.to_string(), "allButUpsideDown");
        assert_eq!(
            (OrientationMask::PORTRAIT | OrientationMask::LANDSCAPE_RIGHT).to_string(),
            "portrait|landscapeRight"
        );
    }

    #[test]
    fn test_parse_names_and_aliases() {
        assert_eq!(
            "portrait | landscape".parse::<OrientationMask>().unwrap(),
            OrientationMask::ALL_BUT_UPSIDE_DOWN
        );
        assert_eq!(
            "landscapeLeft".parse::<OrientationMask>().unwrap(),
            OrientationMask::LANDSCAPE_LEFT
        );
        assert!(matches!(
            "sideways".parse::<OrientationMask>(),
            Err(OrientError::UnknownMaskName(name)) if name == "sideways"
        ));
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&OrientationMask::LANDSCAPE).unwrap();
        assert_eq!(json, "\"landscape\"");
        let back: OrientationMask = serde_json::from_str("\"portrait|landscapeLeft\"").unwrap();
        assert_eq!(back, OrientationMask::PORTRAIT | OrientationMask::LANDSCAPE_LEFT);
    }

    proptest! {
        #[test]
        fn prop_display_parse_is_lossless(bits in 0u8..=255) {
            let mask = OrientationMask::from_bits_truncate(bits);
            let parsed: OrientationMask = mask.to_string().parse().unwrap();
            prop_assert_eq!(parsed, mask);
        }

        #[test]
        fn prop_union_contains_both(a in 0u8..=255, b in 0u8..=255) {
            let a = OrientationMask::from_bits_truncate(a);
            let b = OrientationMask::from_bits_truncate(b);
            prop_assert!((a | b).contains(a));
            prop_assert!((a | b).contains(b));
            prop_assert!(a.contains(a & b));
        }
    }
}
