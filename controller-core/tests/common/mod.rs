//! Shared fixtures for the integration tests: a Detector handler that plays
//! along with the full startup sequence, and small constructor helpers.

use controller_core::{PeerAddress, PeerRole};
use controller_protocol::types::{
    CalibrationResultMetadata, CalibrationResultState, DetectorResolution, ImageResolution, IntrinsicCalibration,
    IntrinsicParameters,
};
use controller_protocol::{RequestRecord, ResponseRecord};

pub const CALIBRATED_RESOLUTION: ImageResolution = ImageResolution { x_px: 1920, y_px: 1080 };
pub const UNCALIBRATED_RESOLUTION: ImageResolution = ImageResolution { x_px: 1280, y_px: 720 };

pub fn detector_address(label: &str, port: u16) -> PeerAddress {
    PeerAddress { label: label.to_owned(), role: PeerRole::Detector, host: "127.0.0.1".to_owned(), port }
}

pub fn pose_solver_address(label: &str, port: u16) -> PeerAddress {
    PeerAddress { label: label.to_owned(), role: PeerRole::PoseSolver, host: "127.0.0.1".to_owned(), port }
}

fn an_intrinsic() -> IntrinsicParameters {
    IntrinsicParameters {
        focal_length_x_px: 1000.0,
        focal_length_y_px: 1000.0,
        principal_point_x_px: 960.0,
        principal_point_y_px: 540.0,
        distortion_coefficients: vec![0.0, 0.0, 0.0],
    }
}

/// A Detector that reports a current resolution of `current_resolution` and
/// calibration coverage for `calibrated_resolution`.
pub fn detector_handler(
    serial: &'static str,
    current_resolution: ImageResolution,
    calibrated_resolution: ImageResolution,
) -> impl Fn(&RequestRecord) -> ResponseRecord + Send + Sync + 'static {
    move |record: &RequestRecord| match record {
        RequestRecord::DetectorStart | RequestRecord::DetectorStop => ResponseRecord::Empty,
        RequestRecord::ListCalibrationResolutions => ResponseRecord::ListCalibrationResolutions {
            detector_resolutions: vec![DetectorResolution {
                detector_serial_identifier: serial.to_owned(),
                image_resolution: calibrated_resolution,
            }],
        },
        RequestRecord::DetectorCameraParametersGet => {
            ResponseRecord::DetectorCameraParameters { parameters: vec![], resolution: current_resolution }
        }
        RequestRecord::ListCalibrationResultMetadata { .. } => ResponseRecord::ListCalibrationResultMetadata {
            metadata_list: vec![CalibrationResultMetadata {
                identifier: "cal-1".to_owned(),
                timestamp_utc: "2024-01-01T00:00:00Z".to_owned(),
                state: CalibrationResultState::Retain,
            }],
        },
        RequestRecord::GetCalibrationResult { .. } => ResponseRecord::GetCalibrationResult {
            intrinsic_calibration: IntrinsicCalibration {
                detector_serial_identifier: serial.to_owned(),
                image_resolution: current_resolution,
                calibrated_values: an_intrinsic(),
            },
        },
        RequestRecord::DetectorFrameGet { .. } => {
            ResponseRecord::DetectorFrameGet { detected_marker_snapshots: vec![], rejected_marker_snapshots: vec![] }
        }
        RequestRecord::DequeueStatusMessages => ResponseRecord::DequeueStatusMessages { status_messages: vec![] },
        _ => ResponseRecord::Empty,
    }
}

/// A Pose Solver that acknowledges everything and answers `GetPoses` with
/// an empty pose set.
pub fn pose_solver_handler() -> impl Fn(&RequestRecord) -> ResponseRecord + Send + Sync + 'static {
    move |record: &RequestRecord| match record {
        RequestRecord::GetPoses => ResponseRecord::GetPoses { detector_poses: vec![], target_poses: vec![] },
        _ => ResponseRecord::Empty,
    }
}
