//! # orient-state — Orientation Arbitration Engine
//!
//! Decides, for every presentable surface, which interface orientation it
//! may take, and commits that orientation to the host platform.
//!
//! ## Components
//!
//! - **Surfaces** (`surface.rs`): the surface record and the generational
//!   registry that owns it.
//!
//! - **Resolver** (`resolver.rs`): effective-mask precedence, validation,
//!   and the default orientation on first appearance. Pure.
//!
//! - **Locks** (`lock.rs`): subview rotation locks with family
//!   exclusivity.
//!
//! - **Transitions** (`transition.rs`): the present/dismiss state machine
//!   that rotates a presenter to portrait before a portrait-only presentee
//!   appears, and restores it afterwards.
//!
//! - **Manager** (`manager.rs`): the single commit authority. Owns all of
//!   the above plus the deferred step queue (`deferred.rs`).
//!
//! - **Service** (`service.rs`): runs the manager on a tokio task and
//!   fires deferred steps on their deadlines.
//!
//! - **Host** (`host.rs`): the platform interface and an in-memory
//!   simulation of it.
//!
//! ## Threading
//!
//! The manager is a plain `&mut self` value. Drive it from one place: the
//! host's UI loop, or the service task.

#![forbid(unsafe_code)]

pub mod deferred;
pub mod error;
pub mod host;
pub mod lock;
pub mod manager;
pub mod resolver;
pub mod service;
pub mod surface;
pub mod transition;

pub use deferred::{DeferredQueue, DeferredStep};
pub use error::{Rejection, ServiceClosed};
pub use host::{Host, HostEvent, SimulatedHost};
pub use lock::{LockArbiter, LockOwner};
pub use manager::{Commit, OrientationManager};
pub use service::{Command, OrientationService, ServiceHandle};
pub use surface::{
    PresentationPreference, PresentationStyle, Surface, SurfaceId, SurfaceKind, SurfaceRegistry,
    SurfaceSpec,
};
pub use transition::{
    DismissPlan, PresentPlan, PresentTrigger, TransitionCoordinator, TransitionRecord,
    TransitionState,
};
