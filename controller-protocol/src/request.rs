//! Typed request records and the request series they travel in.
//!
//! Every variant carries its own `parsable_type` tag on the wire via serde's
//! internally-tagged representation. Tags are spelled out explicitly with
//! `#[serde(rename = "...")]` rather than left to snake_case derivation,
//! because several of them (the `detector_calibration_*` family especially)
//! don't follow the variant name's natural snake_case form.

use serde::{Deserialize, Serialize};

use crate::types::{CaptureFormat, ImageResolution, IntrinsicParameters, Matrix4x4, Parameter, Target, TargetMarker};

/// One typed request element. Closed over every tag named in spec.md §6.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "parsable_type")]
pub enum RequestRecord {
    #[serde(rename = "dequeue_status_messages")]
    DequeueStatusMessages,

    // Detector
    #[serde(rename = "detector_start")]
    DetectorStart,
    #[serde(rename = "detector_stop")]
    DetectorStop,
    /// Realizes the Relay Loop's `GetMarkerSnapshots` (spec.md §4.7).
    #[serde(rename = "detector_frame_get")]
    DetectorFrameGet { include_detected: bool, include_rejected: bool },
    /// Also realizes the Startup Orchestrator's `GetCaptureProperties`
    /// (spec.md §4.6 `GetResolutions` phase) — the original implementation
    /// aliases capture-properties queries onto the camera-parameters-get
    /// call (see DESIGN.md), and this port preserves that wire shape.
    #[serde(rename = "detector_camera_parameters_get")]
    DetectorCameraParametersGet,
    #[serde(rename = "detector_camera_parameters_set")]
    DetectorCameraParametersSet { parameters: Vec<Parameter> },
    #[serde(rename = "detector_marker_parameters_get")]
    DetectorMarkerParametersGet,
    #[serde(rename = "detector_marker_parameters_set")]
    DetectorMarkerParametersSet { parameters: Vec<Parameter> },
    #[serde(rename = "detector_camera_image_get")]
    DetectorCameraImageGet { format: CaptureFormat },
    #[serde(rename = "detector_calibration_detector_resolutions_list")]
    ListCalibrationResolutions,
    #[serde(rename = "detector_calibration_result_metadata_list")]
    ListCalibrationResultMetadata { image_resolution: ImageResolution },
    #[serde(rename = "detector_calibration_result_get")]
    GetCalibrationResult { result_identifier: String },
    #[serde(rename = "detector_calibration_image_add")]
    AddCalibrationImage { format: CaptureFormat, image_base64: String },
    #[serde(rename = "detector_calibration_image_get")]
    GetCalibrationImage { image_identifier: String },
    #[serde(rename = "detector_calibration_result_metadata_update")]
    UpdateCalibrationResultMetadata { result_identifier: String, retain: bool },
    #[serde(rename = "detector_calibration_calculate")]
    CalculateCalibration { image_resolution: ImageResolution },
    #[serde(rename = "detector_calibration_delete_staged")]
    DeleteStagedCalibration,

    // Pose Solver
    #[serde(rename = "start_pose_solver")]
    StartPoseSolver,
    #[serde(rename = "stop_pose_solver")]
    StopPoseSolver,
    #[serde(rename = "set_intrinsic_parameters")]
    SetIntrinsicParameters { detector_label: String, intrinsic_parameters: IntrinsicParameters },
    #[serde(rename = "set_extrinsic_parameters")]
    SetExtrinsicParameters { detector_label: String, transform_to_reference: Matrix4x4 },
    #[serde(rename = "set_reference_marker")]
    SetReferenceMarker { marker_id: i64, marker_diameter: f64 },
    #[serde(rename = "add_target_marker")]
    AddTargetMarker { marker_id: i64, marker_diameter: f64 },
    #[serde(rename = "add_target_board")]
    AddTargetBoard { board_id: String, markers: Vec<TargetMarker> },
    #[serde(rename = "set_targets")]
    SetTargets { targets: Vec<Target> },
    #[serde(rename = "add_marker_corners")]
    AddMarkerCorners {
        detector_label: String,
        detector_timestamp_utc: chrono::DateTime<chrono::Utc>,
        detected_marker_snapshots: Vec<crate::types::MarkerSnapshot>,
        rejected_marker_snapshots: Vec<crate::types::MarkerSnapshot>,
    },
    #[serde(rename = "get_poses")]
    GetPoses,
}

/// An ordered, non-empty batch of requests submitted as one websocket
/// round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestSeries {
    pub series: Vec<RequestRecord>,
}

impl RequestSeries {
    /// Construct a series. spec.md §3 requires request series to be
    /// non-empty; constructing one from an empty `Vec` is a programmer
    /// error in every call site in this workspace, so it's a debug
    /// assertion rather than a recoverable `Result`.
    pub fn new(series: Vec<RequestRecord>) -> Self {
        debug_assert!(!series.is_empty(), "RequestSeries must be non-empty");
        Self { series }
    }

    pub fn single(record: RequestRecord) -> Self {
        Self::new(vec![record])
    }
}
