//! Undo/redo snapshot round trips across the editing state.

use glam::Vec3;

use meshprep_gizmos::gizmo::Gizmo;
use meshprep_gizmos::harness::TestHarness;
use meshprep_gizmos::snapshot::{load_snapshot, save_snapshot};
use shared::text::{TextConfig, TextStyle};
use shared::SupportPoint;

#[test]
fn test_support_gizmo_state_survives_snapshot() {
    let mut h = TestHarness::new();
    let id = h.add_cube("c1", 1.0);
    h.object_mut(&id).unwrap().support_points = vec![
        SupportPoint::new(Vec3::new(0.0, 0.0, 1.0), 0.2, false),
        SupportPoint::new(Vec3::new(0.5, 0.0, 1.0), 0.25, true),
    ];
    h.select(&id);
    h.enter_support_editing().unwrap();

    // Mutate the session so the snapshot carries real edit state
    let pos = h.camera.project(Vec3::ZERO, h.viewport).unwrap();
    assert!(h.press(pos));
    assert!(h.release(pos));
    h.supports.set_new_point_head_radius(0.4);
    h.supports.set_lock_unique_islands(true);

    let bytes = h.supports.save_state().unwrap();

    // A fresh gizmo restored from the snapshot is indistinguishable
    let mut h2 = TestHarness::new();
    h2.supports.load_state(&bytes).unwrap();

    assert!(h2.supports.is_in_editing_mode());
    assert_eq!(h2.supports.new_point_head_radius(), 0.4);
    assert!(h2.supports.lock_unique_islands());

    let a = h.supports.session().unwrap();
    let b = h2.supports.session().unwrap();
    assert_eq!(a.object_id(), b.object_id());
    assert_eq!(a.entries(), b.entries());
    assert_eq!(a.params(), b.params());
    assert_eq!(b.unsaved_changes(), a.unsaved_changes());
}

#[test]
fn test_snapshot_restores_discardable_session() {
    let mut h = TestHarness::new();
    let id = h.add_cube("c1", 1.0);
    let committed = vec![SupportPoint::new(Vec3::new(0.0, 0.0, 1.0), 0.2, false)];
    h.object_mut(&id).unwrap().support_points = committed.clone();
    h.select(&id);
    h.enter_support_editing().unwrap();

    let pos = h.camera.project(Vec3::new(0.4, 0.4, 1.0), h.viewport).unwrap();
    assert!(h.press(pos));
    assert!(h.release(pos));

    let bytes = h.supports.save_state().unwrap();
    let mut h2 = TestHarness::new();
    h2.supports.load_state(&bytes).unwrap();

    // The restored session still knows how to roll back to the committed set
    h2.discard_support_edits();
    assert!(!h2.supports.is_in_editing_mode());

    // And the original can still be applied independently
    assert!(h.apply_support_edits(true));
    assert_eq!(h.object(&id).unwrap().support_points.len(), 2);
}

#[test]
fn test_corrupt_snapshot_is_fatal() {
    let mut h = TestHarness::new();
    let id = h.add_cube("c1", 1.0);
    h.select(&id);
    h.enter_support_editing().unwrap();

    let mut bytes = h.supports.save_state().unwrap();
    bytes.truncate(10);

    let mut h2 = TestHarness::new();
    assert!(h2.supports.load_state(&bytes).is_err());
    // A failed load leaves the gizmo in its previous state
    assert!(!h2.supports.is_in_editing_mode());
}

#[test]
fn test_text_config_snapshot_round_trip() {
    let mut style = TextStyle::new(8.0, 1.5);
    style.boldness = Some(0.25);
    style.char_gap = Some(-1);
    style.family = Some("Sans".to_string());
    let cfg = TextConfig::new(style, "SN-0042");

    let bytes = save_snapshot(&cfg).unwrap();
    let back: TextConfig = load_snapshot(&bytes).unwrap();
    // Equality is epsilon-tolerant on the float-bearing optionals
    assert_eq!(cfg, back);
    assert_eq!(back.text, "SN-0042");
    assert_eq!(back.style.family.as_deref(), Some("Sans"));
}
