//! # Subview Rotation Locks
//!
//! Lets subviews (a video player, a drawing canvas) pin their owning
//! surface to the orientation family it is currently in, independently of
//! the surface's declared supported mask.
//!
//! ## Family Exclusivity
//!
//! Each surface has two lock sets, one per family. Locking adds the owner
//! to the family of the surface's *current* orientation and empties the
//! other set, so the most recent lock decides the family:
//!
//! ```text
//!   portrait surface:   lock(A)  →  portrait {A}     landscape {}
//!   rotate to landscape
//!   landscape surface:  lock(B)  →  portrait {}      landscape {B}
//! ```
//!
//! After every change the surface's `preferred_mask` is recomputed:
//! `PORTRAIT` if the portrait set is non-empty, `LANDSCAPE` if the landscape
//! set is non-empty, `None` otherwise.
//!
//! ## Ownership
//!
//! The arbiter stores [`LockOwner`] ids only. An owner that goes away must
//! unlock itself, or the host calls [`LockArbiter::release_owner`] during
//! its teardown. Locking never rotates anything: callers that want the
//! surface to move immediately ask the manager to re-resolve.

use std::collections::{BTreeSet, HashMap};

use orient_core::{Family, OrientationMask};
use serde::{Deserialize, Serialize};

use crate::surface::{Surface, SurfaceId, SurfaceRegistry};

/// Opaque identity of a lock holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LockOwner(pub u64);

impl std::fmt::Display for LockOwner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "owner#{}", self.0)
    }
}

#[derive(Debug, Default)]
struct LockSets {
    portrait: BTreeSet<LockOwner>,
    landscape: BTreeSet<LockOwner>,
}

impl LockSets {
    fn set_mut(&mut self, family: Family) -> &mut BTreeSet<LockOwner> {
        match family {
            Family::Portrait => &mut self.portrait,
            Family::Landscape => &mut self.landscape,
        }
    }

    fn set(&self, family: Family) -> &BTreeSet<LockOwner> {
        match family {
            Family::Portrait => &self.portrait,
            Family::Landscape => &self.landscape,
        }
    }

    fn locked_family(&self) -> Option<Family> {
        if !self.portrait.is_empty() {
            Some(Family::Portrait)
        } else if !self.landscape.is_empty() {
            Some(Family::Landscape)
        } else {
            None
        }
    }

    fn preferred_mask(&self) -> Option<OrientationMask> {
        self.locked_family().map(Family::mask)
    }

    fn remove(&mut self, owner: LockOwner) -> bool {
        let in_portrait = self.portrait.remove(&owner);
        let in_landscape = self.landscape.remove(&owner);
        in_portrait || in_landscape
    }
}

/// Per-surface lock bookkeeping.
#[derive(Debug, Default)]
pub struct LockArbiter {
    locks: HashMap<SurfaceId, LockSets>,
}

impl LockArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock `surface` to the family of its current orientation on behalf
    /// of `owner`. Returns the locked family.
    pub fn lock(&mut self, owner: LockOwner, surface: &mut Surface) -> Family {
        let family = surface.current_orientation().family();
        let sets = self.locks.entry(surface.id()).or_default();
        sets.set_mut(family).insert(owner);
        sets.set_mut(family.other()).clear();
        surface.set_preferred_mask(sets.preferred_mask());
        tracing::debug!(surface = %surface.id(), %owner, %family, "rotation locked");
        family
    }

    /// Release `owner`'s lock on `surface`. Returns whether it held one.
    pub fn unlock(&mut self, owner: LockOwner, surface: &mut Surface) -> bool {
        let id = surface.id();
        let released = match self.locks.get_mut(&id) {
            Some(sets) => sets.remove(owner),
            None => false,
        };
        self.refresh(surface);
        if released {
            tracing::debug!(surface = %id, %owner, "rotation unlocked");
        }
        released
    }

    /// Release every lock on `surface`.
    pub fn reset_all(&mut self, surface: &mut Surface) {
        self.locks.remove(&surface.id());
        surface.set_preferred_mask(None);
        tracing::debug!(surface = %surface.id(), "all rotation locks reset");
    }

    /// Whether any subview holds a lock on the surface.
    pub fn is_locked(&self, surface: SurfaceId) -> bool {
        self.locked_family(surface).is_some()
    }

    /// The family the surface is locked to, if any.
    pub fn locked_family(&self, surface: SurfaceId) -> Option<Family> {
        self.locks.get(&surface).and_then(LockSets::locked_family)
    }

    /// Owners holding a lock of `family` on the surface.
    pub fn holders(&self, surface: SurfaceId, family: Family) -> Vec<LockOwner> {
        self.locks
            .get(&surface)
            .map(|sets| sets.set(family).iter().copied().collect())
            .unwrap_or_default()
    }

    /// Release `owner` on every surface. Used when the owner is torn down.
    /// Returns the number of surfaces it was released from.
    pub fn release_owner(&mut self, owner: LockOwner, registry: &mut SurfaceRegistry) -> usize {
        let held: Vec<SurfaceId> = self
            .locks
            .iter()
            .filter(|(_, sets)| sets.portrait.contains(&owner) || sets.landscape.contains(&owner))
            .map(|(id, _)| *id)
            .collect();
        for id in &held {
            match registry.get_mut(*id) {
                Some(surface) => {
                    self.unlock(owner, surface);
                }
                None => self.forget_surface(*id),
            }
        }
        held.len()
    }

    /// Drop all bookkeeping for a removed surface.
    pub fn forget_surface(&mut self, surface: SurfaceId) {
        self.locks.remove(&surface);
    }

    fn refresh(&mut self, surface: &mut Surface) {
        let id = surface.id();
        let preferred = self.locks.get(&id).and_then(LockSets::preferred_mask);
        if preferred.is_none() {
            self.locks.remove(&id);
        }
        surface.set_preferred_mask(preferred);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::SurfaceSpec;
    use orient_core::Orientation;

    fn registry_with_surface() -> (SurfaceRegistry, SurfaceId) {
        let mut registry = SurfaceRegistry::new();
        let id = registry.insert(
            SurfaceSpec::new("player").supported(OrientationMask::ALL_BUT_UPSIDE_DOWN),
            OrientationMask::PORTRAIT,
        );
        (registry, id)
    }

    const A: LockOwner = LockOwner(1);
    const B: LockOwner = LockOwner(2);

    #[test]
    fn test_lock_uses_current_family() {
        let (mut registry, id) = registry_with_surface();
        let mut arbiter = LockArbiter::new();
        let surface = registry.get_mut(id).unwrap();
        surface.commit(Orientation::LandscapeLeft);

        assert_eq!(arbiter.lock(A, surface), Family::Landscape);
        assert_eq!(surface.preferred_mask(), Some(OrientationMask::LANDSCAPE));
        assert!(arbiter.is_locked(id));
    }

    #[test]
    fn test_unknown_orientation_locks_portrait_family() {
        let (mut registry, id) = registry_with_surface();
        let mut arbiter = LockArbiter::new();
        let surface = registry.get_mut(id).unwrap();
        assert_eq!(arbiter.lock(A, surface), Family::Portrait);
        assert_eq!(surface.preferred_mask(), Some(OrientationMask::PORTRAIT));
    }

    #[test]
    fn test_latest_family_wins() {
        let (mut registry, id) = registry_with_surface();
        let mut arbiter = LockArbiter::new();
        let surface = registry.get_mut(id).unwrap();

        surface.commit(Orientation::Portrait);
        arbiter.lock(A, surface);
        surface.commit(Orientation::LandscapeRight);
        arbiter.lock(B, surface);

        assert!(arbiter.holders(id, Family::Portrait).is_empty());
        assert_eq!(arbiter.holders(id, Family::Landscape), vec![B]);
        assert_eq!(surface.preferred_mask(), Some(OrientationMask::LANDSCAPE));
    }

    #[test]
    fn test_unlock_last_owner_clears_preference() {
        let (mut registry, id) = registry_with_surface();
        let mut arbiter = LockArbiter::new();
        let surface = registry.get_mut(id).unwrap();

        arbiter.lock(A, surface);
        arbiter.lock(B, surface);
        assert!(arbiter.unlock(A, surface));
        assert_eq!(surface.preferred_mask(), Some(OrientationMask::PORTRAIT));
        assert!(arbiter.unlock(B, surface));
        assert_eq!(surface.preferred_mask(), None);
        assert!(!arbiter.is_locked(id));
        assert!(!arbiter.unlock(B, surface));
    }

    #[test]
    fn test_reset_all_clears_preference() {
        let (mut registry, id) = registry_with_surface();
        let mut arbiter = LockArbiter::new();
        let surface = registry.get_mut(id).unwrap();

        arbiter.lock(A, surface);
        arbiter.lock(B, surface);
        arbiter.reset_all(surface);
        assert_eq!(surface.preferred_mask(), None);
        assert!(!arbiter.is_locked(id));

        // Idempotent on an unlocked surface.
        arbiter.reset_all(surface);
        assert_eq!(surface.preferred_mask(), None);
    }

    #[test]
    fn test_release_owner_across_surfaces() {
        let mut registry = SurfaceRegistry::new();
        let first = registry.insert(SurfaceSpec::new("a"), OrientationMask::PORTRAIT);
        let second = registry.insert(SurfaceSpec::new("b"), OrientationMask::PORTRAIT);
        let mut arbiter = LockArbiter::new();

        arbiter.lock(A, registry.get_mut(first).unwrap());
        arbiter.lock(A, registry.get_mut(second).unwrap());
        arbiter.lock(B, registry.get_mut(second).unwrap());

        assert_eq!(arbiter.release_owner(A, &mut registry), 2);
        assert!(!arbiter.is_locked(first));
        assert_eq!(registry.get(first).unwrap().preferred_mask(), None);
        assert!(arbiter.is_locked(second));
    }

    #[test]
    fn test_release_owner_drops_removed_surfaces() {
        let (mut registry, id) = registry_with_surface();
        let mut arbiter = LockArbiter::new();
        arbiter.lock(A, registry.get_mut(id).unwrap());
        registry.remove(id);

        assert_eq!(arbiter.release_owner(A, &mut registry), 1);
        assert!(!arbiter.is_locked(id));
    }
}
