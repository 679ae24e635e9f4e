//! Typed response records and the response series they travel in.
//!
//! spec.md §9 calls out the source's tagged-union-via-class-hierarchy
//! approach as a hazard and asks for a closed sum type instead; this enum is
//! that sum type. Adding a wire response kind without adding a variant here
//! is a compile error everywhere the enum is matched exhaustively.

use serde::{Deserialize, Serialize};

use crate::status::StatusMessage;
use crate::types::{
    CalibrationResultMetadata, CaptureFormat, DetectorResolution, ImageResolution,
    IntrinsicCalibration, MarkerSnapshot, Parameter, Pose,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "parsable_type")]
pub enum ResponseRecord {
    /// Plain acknowledgement, used for every request that has no payload to
    /// return (start/stop capture, start/stop pose solver, set-parameter
    /// calls, add_marker_corners, ...).
    #[serde(rename = "empty")]
    Empty,
    /// A server-side failure. Logged at `error` severity by the caller and
    /// treated as non-success for the series, never fatal (spec.md §7.4).
    #[serde(rename = "error")]
    Error { message: String },
    #[serde(rename = "dequeue_status_messages")]
    DequeueStatusMessages { status_messages: Vec<StatusMessage> },

    #[serde(rename = "detector_frame_get")]
    DetectorFrameGet {
        detected_marker_snapshots: Vec<MarkerSnapshot>,
        rejected_marker_snapshots: Vec<MarkerSnapshot>,
    },
    /// Answers both a plain camera-parameters query and the Startup
    /// Orchestrator's capture-properties probe; `resolution` is populated
    /// for the latter (see DESIGN.md).
    #[serde(rename = "detector_camera_parameters_get")]
    DetectorCameraParameters { parameters: Vec<Parameter>, resolution: ImageResolution },
    #[serde(rename = "detector_marker_parameters_get")]
    DetectorMarkerParameters { parameters: Vec<Parameter> },
    #[serde(rename = "detector_camera_image_get")]
    DetectorCameraImage { format: CaptureFormat, image_base64: String },
    #[serde(rename = "detector_calibration_detector_resolutions_list")]
    ListCalibrationResolutions { detector_resolutions: Vec<DetectorResolution> },
    #[serde(rename = "detector_calibration_result_metadata_list")]
    ListCalibrationResultMetadata { metadata_list: Vec<CalibrationResultMetadata> },
    #[serde(rename = "detector_calibration_result_get")]
    GetCalibrationResult { intrinsic_calibration: IntrinsicCalibration },
    #[serde(rename = "detector_calibration_image_add")]
    AddCalibrationImage { image_identifier: String },
    #[serde(rename = "detector_calibration_image_get")]
    GetCalibrationImage { image_base64: String },
    #[serde(rename = "detector_calibration_calculate")]
    CalculateCalibration { result_identifier: String, intrinsic_calibration: IntrinsicCalibration },

    #[serde(rename = "add_target_marker")]
    TargetMarkerAdded { target_id: String },
    #[serde(rename = "add_target_board")]
    TargetBoardAdded { target_id: String },
    #[serde(rename = "get_poses")]
    GetPoses { detector_poses: Vec<Pose>, target_poses: Vec<Pose> },
}

impl ResponseRecord {
    pub fn is_error(&self) -> bool {
        matches!(self, ResponseRecord::Error { .. })
    }
}

/// An ordered batch of responses, stamped with the peer that produced them.
///
/// Length is independent of the originating `RequestSeries`'s length; a
/// mismatch is a warning, not an error (spec.md §3, §7.6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseSeries {
    pub series: Vec<ResponseRecord>,
    pub responder: String,
}
