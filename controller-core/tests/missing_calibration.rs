//! spec.md §8 scenario 3: a Detector's current resolution has no matching
//! calibration entry.

#[path = "common/mod.rs"]
mod common;

use controller_core::{Controller, CoreConfig, OverallStatus, TrackingMode};
use controller_protocol::{RequestRecord, Severity};
use controller_test_support::MockPeerServer;

#[tokio::test]
async fn detector_without_matching_calibration_is_skipped_but_solver_still_starts() {
    // D1 reports current resolution 1920x1080 but is only calibrated at 1280x720.
    let detector_server =
        MockPeerServer::start(common::detector_handler("D1", common::CALIBRATED_RESOLUTION, common::UNCALIBRATED_RESOLUTION))
            .await;
    let solver_server = MockPeerServer::start(common::pose_solver_handler()).await;

    let mut controller = Controller::new(CoreConfig::default());
    controller.add_peer(common::detector_address("D1", detector_server.port())).unwrap();
    controller.add_peer(common::pose_solver_address("P1", solver_server.port())).unwrap();
    controller.connect_peer("D1").unwrap();
    controller.connect_peer("P1").unwrap();

    for _ in 0..20 {
        let connected = controller.list_connected_detectors().contains(&"D1".to_owned())
            && controller.list_connected_pose_solvers().contains(&"P1".to_owned());
        if connected {
            break;
        }
        controller.tick().await;
    }

    controller.start_tracking(TrackingMode::DetectingAndSolving);

    for _ in 0..30 {
        if controller.overall_status() == OverallStatus::Running {
            break;
        }
        controller.tick().await;
    }

    assert_eq!(controller.overall_status(), OverallStatus::Running);

    let errors: Vec<_> = controller.drain_status_messages().into_iter().filter(|m| m.severity == Severity::Error).collect();
    assert!(errors.iter().any(|m| m.message.contains("D1") && m.message.contains("1920")));

    // D1 never reached GetIntrinsics, so the solver never received a
    // set_intrinsic_parameters call naming it.
    assert!(!detector_server.received_tags().contains(&"detector_calibration_result_get".to_owned()));
    assert!(!solver_server
        .received_records()
        .iter()
        .any(|r| matches!(r, RequestRecord::SetIntrinsicParameters { detector_label, .. } if detector_label == "D1")));
    assert!(solver_server.received_records().iter().any(|r| matches!(r, RequestRecord::StartPoseSolver)));
}
