//! # Deferred Steps
//!
//! The settle delays of the transition state machine are never slept
//! through. Each delayed continuation is queued here with its due time and
//! fired later by whoever drives the manager: the host's own loop calling
//! `OrientationManager::run_due`, or the async `OrientationService`.
//!
//! Steps refer to surfaces by id only. A step whose surface has been
//! removed by the time it fires is skipped by the manager.

use tokio::time::Instant;

use orient_core::Orientation;

use crate::surface::SurfaceId;

/// A continuation waiting for its settle delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredStep {
    /// Carry out a present that waited for the presenter to rotate.
    Present {
        presenter: SurfaceId,
        presentee: SurfaceId,
    },
    /// Restore the presenter's orientation after a dismiss.
    Recover {
        presenter: SurfaceId,
        orientation: Orientation,
    },
}

impl DeferredStep {
    /// The presenter this step acts on.
    pub fn presenter(&self) -> SurfaceId {
        match self {
            Self::Present { presenter, .. } | Self::Recover { presenter, .. } => *presenter,
        }
    }
}

#[derive(Debug)]
struct Scheduled {
    due: Instant,
    seq: u64,
    step: DeferredStep,
}

/// Due-time ordered queue. Steps with equal due times fire in the order
/// they were scheduled.
#[derive(Debug, Default)]
pub struct DeferredQueue {
    entries: Vec<Scheduled>,
    next_seq: u64,
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: Instant, step: DeferredStep) {
        let seq = self.next_seq;
        self.next_seq += 1;
        let at = self
            .entries
            .partition_point(|e| (e.due, e.seq) <= (due, seq));
        self.entries.insert(at, Scheduled { due, seq, step });
    }

    /// Remove and return the earliest step due at or before `now`.
    pub fn pop_due(&mut self, now: Instant) -> Option<DeferredStep> {
        match self.entries.first() {
            Some(first) if first.due <= now => Some(self.entries.remove(0).step),
            _ => None,
        }
    }

    /// When the earliest step becomes due.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.first().map(|e| e.due)
    }

    /// Drop every step matching `predicate`. Returns how many were dropped.
    pub fn cancel(&mut self, mut predicate: impl FnMut(&DeferredStep) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| !predicate(&e.step));
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
