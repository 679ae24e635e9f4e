//! spec.md §8: `AddPeer`/`RemovePeer` round-trips and the duplicate-label
//! and unknown-peer error paths.

#[path = "common/mod.rs"]
mod common;

use controller_core::{CoreConfig, CoreError};

#[test]
fn add_peer_rejects_a_duplicate_label_in_either_role() {
    let mut controller = controller_core::Controller::new(CoreConfig::default());
    controller.add_peer(common::detector_address("D1", 1)).unwrap();

    let err = controller.add_peer(common::detector_address("D1", 2)).unwrap_err();
    assert!(matches!(err, CoreError::DuplicateLabel(label) if label == "D1"));

    // A label is unique across the whole fleet, not just within one role.
    let err = controller.add_peer(common::pose_solver_address("D1", 3)).unwrap_err();
    assert!(matches!(err, CoreError::DuplicateLabel(label) if label == "D1"));
}

#[test]
fn remove_peer_on_an_unknown_label_raises() {
    let mut controller = controller_core::Controller::new(CoreConfig::default());
    let err = controller.remove_peer("nobody").unwrap_err();
    assert!(matches!(err, CoreError::UnknownPeer(label) if label == "nobody"));
}

#[test]
fn connect_peer_and_disconnect_peer_on_an_unknown_label_raise() {
    let mut controller = controller_core::Controller::new(CoreConfig::default());
    assert!(matches!(controller.connect_peer("nobody"), Err(CoreError::UnknownPeer(_))));
    assert!(matches!(controller.disconnect_peer("nobody"), Err(CoreError::UnknownPeer(_))));
}

#[test]
fn add_remove_add_leaves_the_core_equivalent_to_a_single_add() {
    let mut once = controller_core::Controller::new(CoreConfig::default());
    once.add_peer(common::detector_address("D1", 9000)).unwrap();

    let mut round_tripped = controller_core::Controller::new(CoreConfig::default());
    round_tripped.add_peer(common::detector_address("D1", 9000)).unwrap();
    round_tripped.remove_peer("D1").unwrap();
    round_tripped.add_peer(common::detector_address("D1", 9000)).unwrap();

    assert_eq!(once.list_connection_reports(), round_tripped.list_connection_reports());
    assert_eq!(once.overall_status(), round_tripped.overall_status());
}
