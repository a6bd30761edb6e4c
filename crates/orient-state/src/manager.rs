//! # Orientation Manager — Commit Authority
//!
//! The one component allowed to commit an orientation. It owns every
//! surface, the lock arbiter, the transition coordinator and the deferred
//! step queue, and is driven from a single task: the host's UI loop, or an
//! [`OrientationService`](crate::service::OrientationService).
//!
//! ## Commit
//!
//! ```text
//!   set(orientation, surface?)
//!     ├─ Unknown orientation            → Rejection::InvalidOrientation
//!     ├─ no surface, host has none      → Rejection::NoActiveSurface
//!     ├─ stale surface id               → Rejection::UnknownSurface
//!     ├─ outside effective mask         → Rejection::InvalidOrientation
//!     └─ commit current_mask + current_orientation
//!          ├─ host.refresh_supported_mask(container), (surface)
//!          └─ host.apply_physical_orientation(mask)   failure: warn, keep commit
//! ```
//!
//! ## Ordering
//!
//! Every mutation goes through `&mut self`, so commits on a surface are
//! totally ordered and each one finishes, host call included, before the
//! next starts.

use std::time::Duration;

use tokio::time::Instant;

use orient_core::{DeviceTilt, Family, OrientConfig, Orientation, OrientationMask};

use crate::deferred::{DeferredQueue, DeferredStep};
use crate::error::Rejection;
use crate::host::Host;
use crate::lock::{LockArbiter, LockOwner};
use crate::resolver;
use crate::surface::{PresentationStyle, Surface, SurfaceId, SurfaceKind, SurfaceRegistry, SurfaceSpec};
use crate::transition::{
    DismissPlan, PresentPlan, TransitionCoordinator, TransitionRecord, TransitionState,
};

/// A committed orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Commit {
    pub surface: SurfaceId,
    pub orientation: Orientation,
    pub mask: OrientationMask,
    /// Whether the host applied the physical rotation. The commit stands
    /// either way.
    pub applied: bool,
}

/// Process-wide orientation coordinator.
#[derive(Debug)]
pub struct OrientationManager<H: Host> {
    host: H,
    config: OrientConfig,
    surfaces: SurfaceRegistry,
    locks: LockArbiter,
    transitions: TransitionCoordinator,
    deferred: DeferredQueue,
    last_tilt: Option<DeviceTilt>,
}

impl<H: Host> OrientationManager<H> {
    pub fn new(host: H, config: OrientConfig) -> Self {
        let transitions = TransitionCoordinator::new(&config);
        Self {
            host,
            config,
            surfaces: SurfaceRegistry::new(),
            locks: LockArbiter::new(),
            transitions,
            deferred: DeferredQueue::new(),
            last_tilt: None,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn config(&self) -> &OrientConfig {
        &self.config
    }

    /// Tear down the manager, handing the host back.
    pub fn into_host(self) -> H {
        self.host
    }

    // ── Surfaces ─────────────────────────────────────────────────────

    /// Register a surface created by the host.
    pub fn register_surface(&mut self, spec: SurfaceSpec) -> SurfaceId {
        let id = self.surfaces.insert(spec, self.config.default_supported_mask);
        tracing::debug!(surface = %id, "surface registered");
        id
    }

    /// Remove a torn-down surface along with its locks and any in-flight
    /// transition. Deferred steps naming it become no-ops.
    pub fn remove_surface(&mut self, id: SurfaceId) -> Option<Surface> {
        let surface = self.surfaces.remove(id)?;
        self.locks.forget_surface(id);
        self.transitions.forget_surface(id);
        tracing::debug!(surface = %id, name = surface.name(), "surface removed");
        Some(surface)
    }

    pub fn surface(&self, id: SurfaceId) -> Option<&Surface> {
        self.surfaces.get(id)
    }

    pub fn surfaces(&self) -> &SurfaceRegistry {
        &self.surfaces
    }

    /// Replace a surface's declared supported mask. Does not rotate.
    pub fn set_supported_mask(&mut self, id: SurfaceId, mask: OrientationMask) -> Result<(), Rejection> {
        let surface = self.surfaces.get_mut(id).ok_or(Rejection::UnknownSurface(id))?;
        surface.set_supported_mask(mask);
        Ok(())
    }

    pub fn current_orientation(&self, id: SurfaceId) -> Option<Orientation> {
        self.surfaces.get(id).map(Surface::current_orientation)
    }

    /// Mask of the last commit, `None` before the first one.
    pub fn current_mask(&self, id: SurfaceId) -> Option<OrientationMask> {
        self.surfaces.get(id).and_then(Surface::current_mask)
    }

    /// The mask the host should report for the surface: the committed mask,
    /// or the mask of its default orientation before the first commit.
    pub fn resolved_mask(&self, id: SurfaceId) -> Option<OrientationMask> {
        let horizontal = self.device_tilt().preferred_horizontal();
        self.surfaces
            .get(id)
            .map(|surface| resolver::resolved_mask(surface, horizontal))
    }

    /// Latest device tilt: the last event seen, else the host's reading.
    pub fn device_tilt(&self) -> DeviceTilt {
        self.last_tilt.unwrap_or_else(|| self.host.device_tilt())
    }

    // ── Commit ───────────────────────────────────────────────────────

    /// Commit `orientation` on `surface`, or on the host's active surface
    /// when `surface` is `None`.
    pub fn set(&mut self, orientation: Orientation, surface: Option<SurfaceId>) -> Result<Commit, Rejection> {
        let result = self.try_set(orientation, surface);
        if let Err(rejection) = &result {
            tracing::debug!(%orientation, %rejection, "orientation not committed");
        }
        result
    }

    fn try_set(&mut self, orientation: Orientation, surface: Option<SurfaceId>) -> Result<Commit, Rejection> {
        if orientation == Orientation::Unknown {
            return Err(Rejection::InvalidOrientation {
                orientation,
                effective: None,
            });
        }
        let id = match surface {
            Some(id) => id,
            None => self.host.active_surface().ok_or(Rejection::NoActiveSurface)?,
        };
        let target = self.surfaces.get_mut(id).ok_or(Rejection::UnknownSurface(id))?;
        if !resolver::validate(target, orientation) {
            return Err(Rejection::InvalidOrientation {
                orientation,
                effective: Some(resolver::effective_mask(target)),
            });
        }

        target.commit(orientation);
        let container = target.container();
        tracing::info!(surface = %id, name = target.name(), %orientation, "orientation committed");

        if let Some(container) = container.filter(|c| self.surfaces.contains(*c)) {
            self.host.refresh_supported_mask(container);
        }
        self.host.refresh_supported_mask(id);

        let mask = orientation.to_mask();
        let applied = match self.host.apply_physical_orientation(mask) {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(surface = %id, %mask, %error, "platform did not apply orientation");
                false
            }
        };
        Ok(Commit {
            surface: id,
            orientation,
            mask,
            applied,
        })
    }

    /// Move a surface into its effective mask after its constraints
    /// changed. Locking never rotates on its own; callers that want the
    /// surface to follow a new lock call this afterwards.
    pub fn reresolve(&mut self, id: SurfaceId) -> Result<Commit, Rejection> {
        let horizontal = self.device_tilt().preferred_horizontal();
        let surface = self.surfaces.get(id).ok_or(Rejection::UnknownSurface(id))?;
        let target = resolver::reresolve_orientation(surface, horizontal);
        self.set(target, Some(id))
    }

    // ── Device events ────────────────────────────────────────────────

    /// Handle a device tilt event. `None` when the event was ignored:
    /// app in the background, a flat or unknown tilt, nothing on screen,
    /// or the active surface already in that orientation.
    pub fn handle_device_tilt(&mut self, tilt: DeviceTilt) -> Option<Result<Commit, Rejection>> {
        self.last_tilt = Some(tilt);
        if !self.host.is_foreground_active() {
            tracing::trace!(?tilt, "tilt ignored in background");
            return None;
        }
        let candidate = tilt.to_interface_orientation();
        if candidate == Orientation::Unknown {
            return None;
        }
        let active = self.host.active_surface()?;
        if self.current_orientation(active) == Some(candidate) {
            return None;
        }
        Some(self.set(candidate, Some(active)))
    }

    // ── Lifecycle hooks ──────────────────────────────────────────────

    /// The surface is about to appear. Marks it active and resolves its
    /// orientation: the committed one if any, else its default.
    ///
    /// Containers do not resolve, and neither do surfaces presented
    /// full-screen, which the platform orients from their presentation
    /// preference. Returns `None` in those cases.
    pub fn surface_will_appear(&mut self, id: SurfaceId) -> Option<Result<Commit, Rejection>> {
        let horizontal = self.device_tilt().preferred_horizontal();
        let Some(surface) = self.surfaces.get_mut(id) else {
            return Some(Err(Rejection::UnknownSurface(id)));
        };
        surface.set_active(true);
        if surface.kind() == SurfaceKind::Container {
            return None;
        }
        if surface.presented_by().is_some() && surface.presentation() == PresentationStyle::FullScreen {
            return None;
        }
        let target = match surface.current_orientation() {
            Orientation::Unknown => resolver::default_orientation(surface, horizontal),
            current => current,
        };
        Some(self.set(target, Some(id)))
    }

    /// The surface is about to disappear.
    pub fn surface_will_disappear(&mut self, id: SurfaceId) {
        if let Some(surface) = self.surfaces.get_mut(id) {
            surface.set_active(false);
        }
    }

    // ── Subview locks ────────────────────────────────────────────────

    /// Lock the surface to the family of its current orientation.
    pub fn lock_rotation(&mut self, owner: LockOwner, id: SurfaceId) -> Result<Family, Rejection> {
        let surface = self.surfaces.get_mut(id).ok_or(Rejection::UnknownSurface(id))?;
        Ok(self.locks.lock(owner, surface))
    }

    /// Release one owner's lock. Returns whether it held one.
    pub fn unlock_rotation(&mut self, owner: LockOwner, id: SurfaceId) -> Result<bool, Rejection> {
        let surface = self.surfaces.get_mut(id).ok_or(Rejection::UnknownSurface(id))?;
        Ok(self.locks.unlock(owner, surface))
    }

    /// Release every lock on the surface.
    pub fn reset_all_locks(&mut self, id: SurfaceId) -> Result<(), Rejection> {
        let surface = self.surfaces.get_mut(id).ok_or(Rejection::UnknownSurface(id))?;
        self.locks.reset_all(surface);
        Ok(())
    }

    /// Release an owner on every surface, for owner teardown.
    pub fn release_lock_owner(&mut self, owner: LockOwner) -> usize {
        self.locks.release_owner(owner, &mut self.surfaces)
    }

    pub fn is_locked_by_subviews(&self, id: SurfaceId) -> bool {
        self.locks.is_locked(id)
    }

    pub fn locks(&self) -> &LockArbiter {
        &self.locks
    }

    // ── Presentation ─────────────────────────────────────────────────

    /// Present `presentee` over `presenter`, rotating the presenter first
    /// when the transition state machine calls for it.
    pub fn present(&mut self, presenter: SurfaceId, presentee: SurfaceId) -> Result<PresentPlan, Rejection> {
        let horizontal = self.device_tilt().preferred_horizontal();
        let plan = {
            let from = self.surfaces.get(presenter).ok_or(Rejection::UnknownSurface(presenter))?;
            let to = self.surfaces.get(presentee).ok_or(Rejection::UnknownSurface(presentee))?;
            self.transitions.plan_present(from, to, horizontal)
        };

        match plan {
            PresentPlan::PassThrough => self.present_now(presenter, presentee),
            PresentPlan::RotateThenPresent { trigger, recover } => {
                if let Some(surface) = self.surfaces.get_mut(presenter) {
                    self.transitions
                        .begin_rotate_then_present(surface, presentee, recover);
                }
                tracing::info!(%presenter, %presentee, ?trigger, %recover, "rotating presenter before present");
                if let Err(rejection) = self.set(Orientation::Portrait, Some(presenter)) {
                    tracing::warn!(%presenter, %rejection, "presenter not rotated before present");
                }
                self.schedule(DeferredStep::Present { presenter, presentee });
            }
        }
        Ok(plan)
    }

    /// Dismiss what `presenter` presents, then lift any transient override,
    /// restoring the saved orientation after the settle delay.
    pub fn dismiss(&mut self, presenter: SurfaceId) -> Result<DismissPlan, Rejection> {
        if !self.surfaces.contains(presenter) {
            return Err(Rejection::UnknownSurface(presenter));
        }
        if let Err(error) = self.host.dismiss(presenter) {
            tracing::warn!(%presenter, %error, "platform did not dismiss");
            return Ok(DismissPlan::PassThrough);
        }
        for surface in self.surfaces.iter_mut() {
            if surface.presented_by() == Some(presenter) {
                surface.set_presented_by(None);
            }
        }
        Ok(self.end_override(presenter))
    }

    pub fn transition_state(&self, presenter: SurfaceId) -> TransitionState {
        self.transitions.state(presenter)
    }

    pub fn transition_log(&self) -> &[TransitionRecord] {
        self.transitions.log()
    }

    fn present_now(&mut self, presenter: SurfaceId, presentee: SurfaceId) {
        match self.host.present(presenter, presentee) {
            Ok(()) => {
                if let Some(surface) = self.surfaces.get_mut(presentee) {
                    surface.set_presented_by(Some(presenter));
                }
                self.transitions.mark_presented(presenter);
            }
            Err(error) => {
                tracing::warn!(%presenter, %presentee, %error, "platform did not present");
                self.end_override(presenter);
            }
        }
    }

    fn end_override(&mut self, presenter: SurfaceId) -> DismissPlan {
        let Some(surface) = self.surfaces.get_mut(presenter) else {
            return DismissPlan::PassThrough;
        };
        let plan = self.transitions.end_override(surface);
        self.deferred.cancel(|step| {
            matches!(step, DeferredStep::Present { presenter: p, .. } if *p == presenter)
        });
        match plan {
            DismissPlan::RecoverAfterSettle { recover } => self.schedule(DeferredStep::Recover {
                presenter,
                orientation: recover,
            }),
            DismissPlan::ClearOverride => self.settle_outside_mask(presenter),
            DismissPlan::PassThrough => {}
        }
        plan
    }

    /// Re-resolve a presenter left outside its effective mask once its
    /// override is gone.
    fn settle_outside_mask(&mut self, presenter: SurfaceId) {
        let Some(surface) = self.surfaces.get(presenter) else {
            return;
        };
        let current = surface.current_orientation();
        if current == Orientation::Unknown || resolver::validate(surface, current) {
            return;
        }
        if let Err(rejection) = self.reresolve(presenter) {
            tracing::warn!(%presenter, %rejection, "presenter left outside its mask");
        }
    }

    // ── Deferred steps ───────────────────────────────────────────────

    fn schedule(&mut self, step: DeferredStep) {
        let due = Instant::now() + self.settle_delay();
        self.deferred.schedule(due, step);
    }

    fn settle_delay(&self) -> Duration {
        self.config.settle_delay()
    }

    /// When the next deferred step becomes due.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deferred.next_deadline()
    }

    /// Number of deferred steps waiting.
    pub fn pending_steps(&self) -> usize {
        self.deferred.len()
    }

    /// Fire every deferred step due at or before `now`. Returns how many
    /// fired.
    pub fn run_due(&mut self, now: Instant) -> usize {
        let mut fired = 0;
        while let Some(step) = self.deferred.pop_due(now) {
            self.fire(step);
            fired += 1;
        }
        fired
    }

    fn fire(&mut self, step: DeferredStep) {
        match step {
            DeferredStep::Present { presenter, presentee } => {
                if !self.surfaces.contains(presenter) {
                    tracing::debug!(%presenter, "presenter gone before deferred present");
                    self.transitions.forget_surface(presenter);
                    return;
                }
                if !self.surfaces.contains(presentee) {
                    tracing::debug!(%presentee, "presentee gone before deferred present");
                    self.end_override(presenter);
                    return;
                }
                self.present_now(presenter, presentee);
            }
            DeferredStep::Recover {
                presenter,
                orientation,
            } => {
                if !self.surfaces.contains(presenter) {
                    tracing::debug!(%presenter, "presenter gone before recovery");
                    self.transitions.forget_surface(presenter);
                    return;
                }
                if let Err(rejection) = self.set(orientation, Some(presenter)) {
                    tracing::warn!(%presenter, %orientation, %rejection, "recovery commit rejected");
                    self.settle_outside_mask(presenter);
                }
                self.transitions.finish_recovery(presenter);
            }
        }
    }
}
