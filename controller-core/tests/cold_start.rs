//! spec.md §8 scenario 1: cold start, one Detector, `DetectingOnly`.

#[path = "common/mod.rs"]
mod common;

use controller_core::{Controller, CoreConfig, OverallStatus, TrackingMode};
use controller_test_support::MockPeerServer;

#[tokio::test]
async fn cold_start_one_detector_detecting_only() {
    let server = MockPeerServer::start(common::detector_handler(
        "D1",
        common::CALIBRATED_RESOLUTION,
        common::CALIBRATED_RESOLUTION,
    ))
    .await;

    let mut controller = Controller::new(CoreConfig::default());
    controller.add_peer(common::detector_address("D1", server.port())).unwrap();
    controller.connect_peer("D1").unwrap();

    for _ in 0..20 {
        if controller.list_connected_detectors().contains(&"D1".to_owned()) {
            break;
        }
        controller.tick().await;
    }
    assert!(controller.list_connected_detectors().contains(&"D1".to_owned()));

    controller.start_tracking(TrackingMode::DetectingOnly);

    for _ in 0..20 {
        if controller.overall_status() == OverallStatus::Running {
            break;
        }
        controller.tick().await;
    }

    assert_eq!(controller.overall_status(), OverallStatus::Running);

    // Every Connected tick also issues a `dequeue_status_messages` exchange
    // (spec.md §4.4) interleaved between the phase requests below; strip
    // those housekeeping calls out before asserting the startup sequence.
    let phase_tags: Vec<String> = server
        .received_tags()
        .into_iter()
        .filter(|tag| tag != "dequeue_status_messages")
        .collect();
    assert_eq!(
        phase_tags,
        vec![
            "detector_start",
            "detector_calibration_detector_resolutions_list",
            "detector_calibration_detector_resolutions_list",
            "detector_camera_parameters_get",
            "detector_calibration_result_metadata_list",
            "detector_calibration_result_get",
        ]
    );
}
