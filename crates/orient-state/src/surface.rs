//! # Surfaces and the Surface Registry
//!
//! A [`Surface`] is one presentable screen or panel with its own orientation
//! constraints. Surfaces live in a [`SurfaceRegistry`], a generational arena
//! owned by the `OrientationManager`; everything else refers to them by
//! [`SurfaceId`].
//!
//! ## Field Ownership
//!
//! Each orientation field has exactly one writer:
//!
//! | field | written by |
//! |---|---|
//! | `supported_mask` | the host, through the manager |
//! | `preferred_mask` | `LockArbiter` |
//! | `temp_supported_mask` + `recover_orientation` | `TransitionCoordinator` |
//! | `current_mask` + `current_orientation` | `OrientationManager::set` |
//! | `is_active` | lifecycle hooks |
//!
//! The writers live in this crate, so the setters are `pub(crate)` and the
//! pairs are only ever written together.
//!
//! ## Liveness
//!
//! A `SurfaceId` carries the generation of its slot. Once a surface is
//! removed its slot generation is bumped, so a stale id held by a deferred
//! step never resolves to the slot's next occupant.

use orient_core::{Orientation, OrientationMask};
use serde::{Deserialize, Serialize};

// ─── Identity ────────────────────────────────────────────────────────

/// Handle to a surface in a [`SurfaceRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SurfaceId {
    index: usize,
    generation: u32,
}

impl SurfaceId {
    /// Slot index.
    pub fn index(self) -> usize {
        self.index
    }

    /// Slot generation at the time the surface was registered.
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl std::fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "surface#{}.{}", self.index, self.generation)
    }
}

// ─── Declared Shape ──────────────────────────────────────────────────

/// Whether a surface shows content or only hosts other surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SurfaceKind {
    /// A content screen that resolves its own orientation.
    #[default]
    Content,
    /// A navigation or tab container. Containers defer to their top
    /// surface and never resolve an orientation on appear.
    Container,
}

/// How a surface is shown when presented modally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PresentationStyle {
    /// Covers the whole screen.
    #[default]
    FullScreen,
    /// A sheet, popover or other partial cover.
    NonFullScreen,
}

/// The orientation a surface asks to be presented in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PresentationPreference {
    /// No preference; the supported mask decides.
    #[default]
    None,
    /// A fixed orientation.
    Fixed(Orientation),
    /// Whichever landscape orientation the device is currently tilted to.
    DeviceHorizontal,
}

impl PresentationPreference {
    /// Resolve against the device-preferred horizontal orientation.
    pub fn resolve(self, device_preferred_horizontal: Orientation) -> Option<Orientation> {
        match self {
            Self::None | Self::Fixed(Orientation::Unknown) => None,
            Self::Fixed(orientation) => Some(orientation),
            Self::DeviceHorizontal => Some(device_preferred_horizontal),
        }
    }
}

/// Everything the host declares when registering a surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceSpec {
    /// Label used in diagnostics.
    pub name: String,
    /// Declared supported mask. `None` takes the configured default.
    pub supported_mask: Option<OrientationMask>,
    /// Content or container.
    pub kind: SurfaceKind,
    /// Modal presentation style.
    pub presentation: PresentationStyle,
    /// Orientation requested on presentation.
    pub presentation_preference: PresentationPreference,
    /// Enclosing container that must re-query after each commit.
    pub container: Option<SurfaceId>,
}

impl SurfaceSpec {
    /// A content surface with every other attribute defaulted.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            supported_mask: None,
            kind: SurfaceKind::Content,
            presentation: PresentationStyle::FullScreen,
            presentation_preference: PresentationPreference::None,
            container: None,
        }
    }

    /// Declare the supported mask.
    pub fn supported(mut self, mask: OrientationMask) -> Self {
        self.supported_mask = Some(mask);
        self
    }

    /// Mark as a navigation/tab container.
    pub fn container_kind(mut self) -> Self {
        self.kind = SurfaceKind::Container;
        self
    }

    /// Set the modal presentation style.
    pub fn presentation(mut self, style: PresentationStyle) -> Self {
        self.presentation = style;
        self
    }

    /// Set the presentation preference.
    pub fn prefers(mut self, preference: PresentationPreference) -> Self {
        self.presentation_preference = preference;
        self
    }

    /// Nest inside a container surface.
    pub fn inside(mut self, container: SurfaceId) -> Self {
        self.container = Some(container);
        self
    }
}

// ─── The Surface ─────────────────────────────────────────────────────

/// One presentable unit and its orientation state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Surface {
    id: SurfaceId,
    name: String,
    kind: SurfaceKind,
    presentation: PresentationStyle,
    presentation_preference: PresentationPreference,
    container: Option<SurfaceId>,
    presented_by: Option<SurfaceId>,
    supported_mask: OrientationMask,
    preferred_mask: Option<OrientationMask>,
    temp_supported_mask: Option<OrientationMask>,
    recover_orientation: Option<Orientation>,
    current_mask: Option<OrientationMask>,
    current_orientation: Orientation,
    is_active: bool,
}

impl Surface {
    pub(crate) fn new(id: SurfaceId, spec: SurfaceSpec, default_mask: OrientationMask) -> Self {
        Self {
            id,
            name: spec.name,
            kind: spec.kind,
            presentation: spec.presentation,
            presentation_preference: spec.presentation_preference,
            container: spec.container,
            presented_by: None,
            supported_mask: spec.supported_mask.unwrap_or(default_mask),
            preferred_mask: None,
            temp_supported_mask: None,
            recover_orientation: None,
            current_mask: None,
            current_orientation: Orientation::Unknown,
            is_active: false,
        }
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> SurfaceKind {
        self.kind
    }

    pub fn presentation(&self) -> PresentationStyle {
        self.presentation
    }

    pub fn presentation_preference(&self) -> PresentationPreference {
        self.presentation_preference
    }

    pub fn container(&self) -> Option<SurfaceId> {
        self.container
    }

    /// The surface that presented this one modally, while it is presented.
    pub fn presented_by(&self) -> Option<SurfaceId> {
        self.presented_by
    }

    /// Statically declared supported orientations.
    pub fn supported_mask(&self) -> OrientationMask {
        self.supported_mask
    }

    /// Family lock installed by subviews, if any.
    pub fn preferred_mask(&self) -> Option<OrientationMask> {
        self.preferred_mask
    }

    /// Transient mask installed during a rotate-then-present transition.
    pub fn temp_supported_mask(&self) -> Option<OrientationMask> {
        self.temp_supported_mask
    }

    /// Orientation to restore when the transient mask is lifted.
    pub fn recover_orientation(&self) -> Option<Orientation> {
        self.recover_orientation
    }

    /// Mask of the last committed orientation. `None` until the first
    /// commit; use `resolver::resolved_mask` for the derived value.
    pub fn current_mask(&self) -> Option<OrientationMask> {
        self.current_mask
    }

    /// Last committed orientation, `Unknown` before the first commit.
    pub fn current_orientation(&self) -> Orientation {
        self.current_orientation
    }

    /// Whether the surface is currently on screen.
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub(crate) fn set_supported_mask(&mut self, mask: OrientationMask) {
        self.supported_mask = mask;
    }

    pub(crate) fn set_preferred_mask(&mut self, mask: Option<OrientationMask>) {
        self.preferred_mask = mask;
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.is_active = active;
    }

    pub(crate) fn set_presented_by(&mut self, presenter: Option<SurfaceId>) {
        self.presented_by = presenter;
    }

    /// Record a committed orientation. Mask and orientation move together.
    pub(crate) fn commit(&mut self, orientation: Orientation) {
        self.current_mask = Some(orientation.to_mask());
        self.current_orientation = orientation;
    }

    /// Install the transient mask and the orientation to restore afterwards.
    pub(crate) fn install_override(&mut self, mask: OrientationMask, recover: Orientation) {
        self.temp_supported_mask = Some(mask);
        self.recover_orientation = Some(recover);
    }

    /// Lift the transient mask, returning the orientation that was saved
    /// with it. `None` when no override was installed.
    pub(crate) fn clear_override(&mut self) -> Option<Orientation> {
        self.temp_supported_mask = None;
        self.recover_orientation.take()
    }
}

// ─── Registry ────────────────────────────────────────────────────────

#[derive(Debug)]
struct Slot {
    generation: u32,
    surface: Option<Surface>,
}

/// Generational arena of surfaces.
#[derive(Debug, Default)]
pub struct SurfaceRegistry {
    slots: Vec<Slot>,
    free: Vec<usize>,
}

impl SurfaceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a surface and return its handle.
    pub fn insert(&mut self, spec: SurfaceSpec, default_mask: OrientationMask) -> SurfaceId {
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                let id = SurfaceId {
                    index,
                    generation: slot.generation,
                };
                slot.surface = Some(Surface::new(id, spec, default_mask));
                id
            }
            None => {
                let id = SurfaceId {
                    index: self.slots.len(),
                    generation: 0,
                };
                self.slots.push(Slot {
                    generation: 0,
                    surface: Some(Surface::new(id, spec, default_mask)),
                });
                id
            }
        }
    }

    /// Remove a surface. Its id never resolves again.
    pub fn remove(&mut self, id: SurfaceId) -> Option<Surface> {
        let slot = self.slots.get_mut(id.index)?;
        if slot.generation != id.generation {
            return None;
        }
        let surface = slot.surface.take()?;
        // A slot whose generation is spent is retired, never reused.
        if let Some(next) = slot.generation.checked_add(1) {
            slot.generation = next;
            self.free.push(id.index);
        }
        Some(surface)
    }

    pub fn get(&self, id: SurfaceId) -> Option<&Surface> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.surface.as_ref())
    }

    pub fn get_mut(&mut self, id: SurfaceId) -> Option<&mut Surface> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.surface.as_mut())
    }

    /// Liveness check for a handle.
    pub fn contains(&self, id: SurfaceId) -> bool {
        self.get(id).is_some()
    }

    /// Live surfaces in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Surface> {
        self.slots.iter().filter_map(|slot| slot.surface.as_ref())
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Surface> {
        self.slots.iter_mut().filter_map(|slot| slot.surface.as_mut())
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.surface.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
