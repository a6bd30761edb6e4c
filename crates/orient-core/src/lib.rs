//! # orient-core — Foundational Orientation Types
//!
//! The leaf crate of the orientation stack. It defines the value types the
//! arbitration engine in `orient-state` reasons about:
//!
//! - [`Orientation`] and [`Family`] — a concrete interface orientation and
//!   its portrait/landscape grouping.
//! - [`OrientationMask`] — a bit-set of allowed orientations with the named
//!   constants (`PORTRAIT`, `LANDSCAPE`, `ALL_BUT_UPSIDE_DOWN`, ...).
//! - [`DeviceTilt`] — physical device orientation and its cross-handed
//!   mapping to interface orientations.
//! - [`OrientConfig`] — engine tunables loaded from YAML.
//! - [`OrientError`] / [`PlatformError`] — the error taxonomy.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `orient-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Pure values only: nothing in this crate has side effects.

#![forbid(unsafe_code)]

pub mod config;
pub mod device;
pub mod error;
pub mod mask;
pub mod orientation;

pub use config::OrientConfig;
pub use device::DeviceTilt;
pub use error::{OrientError, PlatformError};
pub use mask::OrientationMask;
pub use orientation::{Family, Orientation};
