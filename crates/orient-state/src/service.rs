//! # Orientation Service
//!
//! Runs an [`OrientationManager`] on its own task for hosts whose UI loop
//! is async. Requests arrive over an mpsc channel as [`Command`]s and are
//! answered through oneshot replies; device tilt events arrive on a second
//! channel; deferred steps fire when their settle delay elapses.
//!
//! ```text
//!   ServiceHandle ──Command──▶ ┐
//!   tilt sender ───DeviceTilt─▶ ├─ select! ─▶ OrientationManager
//!   next_deadline ─sleep_until─▶ ┘
//! ```
//!
//! All three sources are drained by one loop, so the manager is never
//! touched concurrently. The loop ends when every [`ServiceHandle`] is
//! dropped, and hands the manager back.

use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

use orient_core::{DeviceTilt, Family, Orientation};

use crate::error::{Rejection, ServiceClosed};
use crate::host::Host;
use crate::lock::LockOwner;
use crate::manager::{Commit, OrientationManager};
use crate::surface::{Surface, SurfaceId, SurfaceSpec};
use crate::transition::{DismissPlan, PresentPlan, TransitionState};

const COMMAND_BUFFER: usize = 64;

type Reply<T> = oneshot::Sender<T>;

/// A request to the service task.
#[derive(Debug)]
pub enum Command {
    Register(SurfaceSpec, Reply<SurfaceId>),
    Remove(SurfaceId, Reply<Option<Surface>>),
    Set {
        orientation: Orientation,
        surface: Option<SurfaceId>,
        reply: Reply<Result<Commit, Rejection>>,
    },
    WillAppear(SurfaceId, Reply<Option<Result<Commit, Rejection>>>),
    WillDisappear(SurfaceId),
    Present {
        presenter: SurfaceId,
        presentee: SurfaceId,
        reply: Reply<Result<PresentPlan, Rejection>>,
    },
    Dismiss(SurfaceId, Reply<Result<DismissPlan, Rejection>>),
    Lock(LockOwner, SurfaceId, Reply<Result<Family, Rejection>>),
    Unlock(LockOwner, SurfaceId, Reply<Result<bool, Rejection>>),
    ResetLocks(SurfaceId, Reply<Result<(), Rejection>>),
    Snapshot(SurfaceId, Reply<Option<Surface>>),
    TransitionState(SurfaceId, Reply<TransitionState>),
}

/// Cloneable client side of an [`OrientationService`].
#[derive(Debug, Clone)]
pub struct ServiceHandle {
    commands: mpsc::Sender<Command>,
}

impl ServiceHandle {
    async fn request<T>(&self, make: impl FnOnce(Reply<T>) -> Command) -> Result<T, ServiceClosed> {
        let (tx, rx) = oneshot::channel();
        self.commands.send(make(tx)).await.map_err(|_| ServiceClosed)?;
        rx.await.map_err(|_| ServiceClosed)
    }

    pub async fn register_surface(&self, spec: SurfaceSpec) -> Result<SurfaceId, ServiceClosed> {
        self.request(|reply| Command::Register(spec, reply)).await
    }

    pub async fn remove_surface(&self, id: SurfaceId) -> Result<Option<Surface>, ServiceClosed> {
        self.request(|reply| Command::Remove(id, reply)).await
    }

    pub async fn set(
        &self,
        orientation: Orientation,
        surface: Option<SurfaceId>,
    ) -> Result<Result<Commit, Rejection>, ServiceClosed> {
        self.request(|reply| Command::Set {
            orientation,
            surface,
            reply,
        })
        .await
    }

    pub async fn surface_will_appear(
        &self,
        id: SurfaceId,
    ) -> Result<Option<Result<Commit, Rejection>>, ServiceClosed> {
        self.request(|reply| Command::WillAppear(id, reply)).await
    }

    pub async fn surface_will_disappear(&self, id: SurfaceId) -> Result<(), ServiceClosed> {
        self.commands
            .send(Command::WillDisappear(id))
            .await
            .map_err(|_| ServiceClosed)
    }

    pub async fn present(
        &self,
        presenter: SurfaceId,
        presentee: SurfaceId,
    ) -> Result<Result<PresentPlan, Rejection>, ServiceClosed> {
        self.request(|reply| Command::Present {
            presenter,
            presentee,
            reply,
        })
        .await
    }

    pub async fn dismiss(&self, presenter: SurfaceId) -> Result<Result<DismissPlan, Rejection>, ServiceClosed> {
        self.request(|reply| Command::Dismiss(presenter, reply)).await
    }

    pub async fn lock_rotation(
        &self,
        owner: LockOwner,
        id: SurfaceId,
    ) -> Result<Result<Family, Rejection>, ServiceClosed> {
        self.request(|reply| Command::Lock(owner, id, reply)).await
    }

    pub async fn unlock_rotation(
        &self,
        owner: LockOwner,
        id: SurfaceId,
    ) -> Result<Result<bool, Rejection>, ServiceClosed> {
        self.request(|reply| Command::Unlock(owner, id, reply)).await
    }

    pub async fn reset_all_locks(&self, id: SurfaceId) -> Result<Result<(), Rejection>, ServiceClosed> {
        self.request(|reply| Command::ResetLocks(id, reply)).await
    }

    /// A copy of the surface as it stands now.
    pub async fn surface(&self, id: SurfaceId) -> Result<Option<Surface>, ServiceClosed> {
        self.request(|reply| Command::Snapshot(id, reply)).await
    }

    pub async fn transition_state(&self, presenter: SurfaceId) -> Result<TransitionState, ServiceClosed> {
        self.request(|reply| Command::TransitionState(presenter, reply)).await
    }
}

/// Task that owns the manager.
#[derive(Debug)]
pub struct OrientationService<H: Host> {
    manager: OrientationManager<H>,
    commands: mpsc::Receiver<Command>,
    tilts: mpsc::Receiver<DeviceTilt>,
}

impl<H: Host> OrientationService<H> {
    /// Wrap `manager`. Device tilt events are read from `tilts`.
    pub fn new(manager: OrientationManager<H>, tilts: mpsc::Receiver<DeviceTilt>) -> (Self, ServiceHandle) {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let service = Self {
            manager,
            commands: rx,
            tilts,
        };
        (service, ServiceHandle { commands: tx })
    }

    /// Drive the manager until every handle is dropped.
    pub async fn run(mut self) -> OrientationManager<H> {
        let mut tilts_open = true;
        loop {
            let deadline = self.manager.next_deadline();
            // Due steps fire before anything queued behind them.
            tokio::select! {
                biased;
                _ = wait_until(deadline) => {
                    let fired = self.manager.run_due(Instant::now());
                    tracing::trace!(fired, "deferred steps fired");
                }
                tilt = self.tilts.recv(), if tilts_open => match tilt {
                    Some(tilt) => {
                        let _ = self.manager.handle_device_tilt(tilt);
                    }
                    None => tilts_open = false,
                },
                command = self.commands.recv() => match command {
                    Some(command) => self.dispatch(command),
                    None => break,
                },
            }
        }
        tracing::debug!("orientation service stopped");
        self.manager
    }

    fn dispatch(&mut self, command: Command) {
        let m = &mut self.manager;
        // A dropped reply receiver means the caller stopped waiting; the
        // request has still been applied.
        match command {
            Command::Register(spec, reply) => {
                let _ = reply.send(m.register_surface(spec));
            }
            Command::Remove(id, reply) => {
                let _ = reply.send(m.remove_surface(id));
            }
            Command::Set {
                orientation,
                surface,
                reply,
            } => {
                let _ = reply.send(m.set(orientation, surface));
            }
            Command::WillAppear(id, reply) => {
                let _ = reply.send(m.surface_will_appear(id));
            }
            Command::WillDisappear(id) => m.surface_will_disappear(id),
            Command::Present {
                presenter,
                presentee,
                reply,
            } => {
                let _ = reply.send(m.present(presenter, presentee));
            }
            Command::Dismiss(presenter, reply) => {
                let _ = reply.send(m.dismiss(presenter));
            }
            Command::Lock(owner, id, reply) => {
                let _ = reply.send(m.lock_rotation(owner, id));
            }
            Command::Unlock(owner, id, reply) => {
                let _ = reply.send(m.unlock_rotation(owner, id));
            }
            Command::ResetLocks(id, reply) => {
                let _ = reply.send(m.reset_all_locks(id));
            }
            Command::Snapshot(id, reply) => {
                let _ = reply.send(m.surface(id).cloned());
            }
            Command::TransitionState(presenter, reply) => {
                let _ = reply.send(m.transition_state(presenter));
            }
        }
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
