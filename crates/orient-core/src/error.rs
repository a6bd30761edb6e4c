//! # Error Types
//!
//! Errors shared across the orientation stack. All use `thiserror` for
//! derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Nothing here is fatal. Orientation arbitration degrades to a no-op
//!   plus a diagnostic; it never takes the host application down.
//! - Routine rejections (an orientation the surface forbids, no visible
//!   surface) are not errors at this layer. They are modelled as
//!   `Rejection` values in `orient-state`.
//! - `PlatformError` is what the host reports when it cannot carry out a
//!   physical rotation or a presentation call.

use thiserror::Error;

/// Top-level error type for the orientation stack.
#[derive(Error, Debug)]
pub enum OrientError {
    /// A mask string contained a name that is not an orientation or alias.
    #[error("unknown orientation mask name: {0:?}")]
    UnknownMaskName(String),

    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_yaml::Error),

    /// A configuration value parsed but is out of range.
    #[error("invalid configuration value for {field}: {reason}")]
    ConfigValue {
        /// Offending field name.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure reported by the host platform.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// There is no window or scene to rotate.
    #[error("no active window")]
    NoActiveWindow,

    /// The platform refused the geometry request.
    #[error("geometry request rejected: {0}")]
    GeometryRejected(String),

    /// A present or dismiss call could not be carried out.
    #[error("presentation failed: {0}")]
    Presentation(String),
}
