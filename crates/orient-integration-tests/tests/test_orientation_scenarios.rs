//! # Orientation Scenarios
//!
//! End-to-end checks of the commit path through `OrientationManager` with
//! an in-memory host: device tilt handling, default resolution on appear,
//! subview locks and platform failures.

use orient_core::{DeviceTilt, Family, OrientConfig, Orientation, OrientationMask};
use orient_state::{
    HostEvent, LockOwner, OrientationManager, PresentationPreference, Rejection, SimulatedHost,
    SurfaceId, SurfaceSpec,
};

fn manager() -> OrientationManager<SimulatedHost> {
    OrientationManager::new(SimulatedHost::new(), OrientConfig::default())
}

fn active(m: &mut OrientationManager<SimulatedHost>, spec: SurfaceSpec) -> SurfaceId {
    let id = m.register_surface(spec);
    m.host_mut().active = Some(id);
    id
}

// ---------------------------------------------------------------------------
// 1. Device tilt
// ---------------------------------------------------------------------------

#[test]
fn rotatable_surface_follows_landscape_left_tilt() {
    let mut m = manager();
    let id = active(&mut m, SurfaceSpec::new("hp").supported(OrientationMask::ALL_BUT_UPSIDE_DOWN));

    let commit = m.handle_device_tilt(DeviceTilt::LandscapeLeft).unwrap().unwrap();

    assert_eq!(commit.orientation, Orientation::LandscapeRight);
    assert_eq!(m.current_orientation(id), Some(Orientation::LandscapeRight));
    assert_eq!(m.current_mask(id), Some(OrientationMask::LANDSCAPE_RIGHT));
    assert_eq!(m.host().applied_masks(), vec![OrientationMask::LANDSCAPE_RIGHT]);
}

#[test]
fn portrait_surface_rejects_landscape() {
    let mut m = manager();
    let id = active(&mut m, SurfaceSpec::new("portrait").supported(OrientationMask::PORTRAIT));
    m.set(Orientation::Portrait, None).unwrap();

    let rejection = m.set(Orientation::LandscapeRight, None).unwrap_err();
    assert_eq!(
        rejection,
        Rejection::InvalidOrientation {
            orientation: Orientation::LandscapeRight,
            effective: Some(OrientationMask::PORTRAIT),
        }
    );
    assert_eq!(m.current_orientation(id), Some(Orientation::Portrait));
    assert!(rejection.to_string().contains("landscapeRight"));
}

#[test]
fn tilt_sequence_skips_forbidden_and_flat_readings() {
    let mut m = manager();
    let id = active(&mut m, SurfaceSpec::new("hp").supported(OrientationMask::ALL_BUT_UPSIDE_DOWN));

    m.handle_device_tilt(DeviceTilt::LandscapeRight).unwrap().unwrap();
    assert!(m.handle_device_tilt(DeviceTilt::FaceDown).is_none());
    assert!(matches!(
        m.handle_device_tilt(DeviceTilt::PortraitUpsideDown),
        Some(Err(Rejection::InvalidOrientation { .. }))
    ));
    assert_eq!(m.current_orientation(id), Some(Orientation::LandscapeLeft));
}

#[test]
fn background_tilts_are_ignored_until_foreground() {
    let mut m = manager();
    let id = active(&mut m, SurfaceSpec::new("hp").supported(OrientationMask::ALL));
    m.host_mut().foreground = false;
    assert!(m.handle_device_tilt(DeviceTilt::LandscapeLeft).is_none());
    assert!(m.host().events().is_empty());

    m.host_mut().foreground = true;
    assert!(m.handle_device_tilt(DeviceTilt::LandscapeLeft).unwrap().is_ok());
    assert_eq!(m.current_orientation(id), Some(Orientation::LandscapeRight));
}

#[test]
fn tilt_without_active_surface_is_ignored() {
    let mut m = manager();
    m.register_surface(SurfaceSpec::new("offscreen").supported(OrientationMask::ALL));
    assert!(m.handle_device_tilt(DeviceTilt::LandscapeLeft).is_none());
}

// ---------------------------------------------------------------------------
// 2. Default resolution on appear
// ---------------------------------------------------------------------------

#[test]
fn exact_landscape_right_defaults_to_landscape_right_regardless_of_tilt() {
    for tilt in [DeviceTilt::Portrait, DeviceTilt::LandscapeLeft, DeviceTilt::LandscapeRight] {
        let mut m = manager();
        m.host_mut().tilt = tilt;
        let id = m.register_surface(SurfaceSpec::new("video").supported(OrientationMask::LANDSCAPE_RIGHT));
        let commit = m.surface_will_appear(id).unwrap().unwrap();
        assert_eq!(commit.orientation, Orientation::LandscapeRight, "{tilt:?}");
    }
}

#[test]
fn landscape_surface_opens_in_device_preferred_horizontal() {
    let mut m = manager();
    m.handle_device_tilt(DeviceTilt::LandscapeRight);
    let id = m.register_surface(SurfaceSpec::new("video").supported(OrientationMask::LANDSCAPE));
    assert_eq!(m.resolved_mask(id), Some(OrientationMask::LANDSCAPE_LEFT));
    let commit = m.surface_will_appear(id).unwrap().unwrap();
    assert_eq!(commit.orientation, Orientation::LandscapeLeft);
}

#[test]
fn fixed_presentation_preference_wins_on_first_appear() {
    let mut m = manager();
    let id = m.register_surface(
        SurfaceSpec::new("reader")
            .supported(OrientationMask::ALL_BUT_UPSIDE_DOWN)
            .prefers(PresentationPreference::Fixed(Orientation::LandscapeLeft)),
    );
    assert_eq!(
        m.surface_will_appear(id).unwrap().unwrap().orientation,
        Orientation::LandscapeLeft
    );
}

#[test]
fn unsupported_preference_falls_back_to_portrait() {
    let mut m = manager();
    let id = m.register_surface(
        SurfaceSpec::new("form").prefers(PresentationPreference::Fixed(Orientation::LandscapeLeft)),
    );
    assert_eq!(
        m.surface_will_appear(id).unwrap().unwrap().orientation,
        Orientation::Portrait
    );
}

#[test]
fn configured_default_mask_applies_to_undeclared_surfaces() {
    let config = OrientConfig {
        default_supported_mask: OrientationMask::ALL,
        ..OrientConfig::default()
    };
    let mut m = OrientationManager::new(SimulatedHost::new(), config);
    let id = m.register_surface(SurfaceSpec::new("anything"));
    assert_eq!(m.surface(id).unwrap().supported_mask(), OrientationMask::ALL);
    assert!(m.set(Orientation::PortraitUpsideDown, Some(id)).is_ok());
}

// ---------------------------------------------------------------------------
// 3. Subview locks
// ---------------------------------------------------------------------------

#[test]
fn most_recent_lock_decides_the_family() {
    let mut m = manager();
    let id = active(&mut m, SurfaceSpec::new("hp").supported(OrientationMask::ALL_BUT_UPSIDE_DOWN));
    m.set(Orientation::Portrait, None).unwrap();
    assert_eq!(m.lock_rotation(LockOwner(1), id), Ok(Family::Portrait));

    // Locked to portrait: a landscape tilt is refused.
    assert!(m.handle_device_tilt(DeviceTilt::LandscapeLeft).unwrap().is_err());

    // Release, rotate, and lock again from landscape.
    assert_eq!(m.unlock_rotation(LockOwner(1), id), Ok(true));
    m.handle_device_tilt(DeviceTilt::LandscapeLeft).unwrap().unwrap();
    m.lock_rotation(LockOwner(1), id).unwrap();
    assert_eq!(m.lock_rotation(LockOwner(2), id), Ok(Family::Landscape));

    assert_eq!(m.locks().holders(id, Family::Portrait), Vec::new());
    assert_eq!(m.locks().holders(id, Family::Landscape), vec![LockOwner(1), LockOwner(2)]);
    assert_eq!(m.surface(id).unwrap().preferred_mask(), Some(OrientationMask::LANDSCAPE));
}

#[test]
fn reset_all_locks_clears_preference_and_lock_state() {
    let mut m = manager();
    let id = m.register_surface(SurfaceSpec::new("hp").supported(OrientationMask::ALL_BUT_UPSIDE_DOWN));
    m.lock_rotation(LockOwner(1), id).unwrap();
    m.lock_rotation(LockOwner(2), id).unwrap();
    assert!(m.is_locked_by_subviews(id));

    m.reset_all_locks(id).unwrap();
    assert!(!m.is_locked_by_subviews(id));
    assert_eq!(m.surface(id).unwrap().preferred_mask(), None);
}

#[test]
fn released_owner_unlocks_every_surface() {
    let mut m = manager();
    let a = m.register_surface(SurfaceSpec::new("a"));
    let b = m.register_surface(SurfaceSpec::new("b"));
    m.lock_rotation(LockOwner(9), a).unwrap();
    m.lock_rotation(LockOwner(9), b).unwrap();
    m.lock_rotation(LockOwner(1), b).unwrap();

    assert_eq!(m.release_lock_owner(LockOwner(9)), 2);
    assert!(!m.is_locked_by_subviews(a));
    assert!(m.is_locked_by_subviews(b));
}

#[test]
fn reresolve_moves_surface_into_new_lock() {
    let mut m = manager();
    let id = m.register_surface(SurfaceSpec::new("hp").supported(OrientationMask::ALL_BUT_UPSIDE_DOWN));
    m.set(Orientation::LandscapeLeft, Some(id)).unwrap();
    m.set_supported_mask(id, OrientationMask::PORTRAIT).unwrap();
    let commit = m.reresolve(id).unwrap();
    assert_eq!(commit.orientation, Orientation::Portrait);
}

// ---------------------------------------------------------------------------
// 4. Platform failures and stale handles
// ---------------------------------------------------------------------------

#[test]
fn failed_apply_is_reported_but_commit_stands() {
    let mut m = manager();
    let id = active(&mut m, SurfaceSpec::new("hp").supported(OrientationMask::ALL));
    m.host_mut().fail_apply = true;

    let commit = m.handle_device_tilt(DeviceTilt::LandscapeLeft).unwrap().unwrap();
    assert!(!commit.applied);
    assert_eq!(m.current_orientation(id), Some(Orientation::LandscapeRight));
    assert_eq!(
        m.host().events().last(),
        Some(&HostEvent::ApplyFailed {
            mask: OrientationMask::LANDSCAPE_RIGHT
        })
    );

    // The same tilt again is a no-op: the logical state already matches.
    m.host_mut().fail_apply = false;
    assert!(m.handle_device_tilt(DeviceTilt::LandscapeLeft).is_none());
}

#[test]
fn stale_ids_are_rejected_everywhere() {
    let mut m = manager();
    let id = m.register_surface(SurfaceSpec::new("gone"));
    m.remove_surface(id).unwrap();
    let reused = m.register_surface(SurfaceSpec::new("new"));
    assert_eq!(reused.index(), id.index());

    assert_eq!(m.set(Orientation::Portrait, Some(id)), Err(Rejection::UnknownSurface(id)));
    assert_eq!(m.lock_rotation(LockOwner(1), id), Err(Rejection::UnknownSurface(id)));
    assert_eq!(m.present(id, reused), Err(Rejection::UnknownSurface(id)));
    assert_eq!(m.dismiss(id), Err(Rejection::UnknownSurface(id)));
    assert!(matches!(m.surface_will_appear(id), Some(Err(Rejection::UnknownSurface(_)))));
    assert!(m.surface(id).is_none());
    assert_eq!(m.surface(reused).unwrap().name(), "new");
}

#[test]
fn container_is_refreshed_before_its_child() {
    let mut m = manager();
    let nav = m.register_surface(SurfaceSpec::new("nav").container_kind());
    let child = m.register_surface(SurfaceSpec::new("child").inside(nav));
    assert!(m.surface_will_appear(nav).is_none());
    m.surface_will_appear(child).unwrap().unwrap();
    assert_eq!(
        m.host().events(),
        &[
            HostEvent::Refreshed { surface: nav },
            HostEvent::Refreshed { surface: child },
            HostEvent::Applied {
                mask: OrientationMask::PORTRAIT
            },
        ]
    );
}
