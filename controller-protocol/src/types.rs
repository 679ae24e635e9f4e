//! Shared domain value types carried inside request/response records.
//!
//! These mirror the structures a Detector or Pose Solver exchanges with the
//! core; the core treats them as opaque payloads it stores and forwards, not
//! as values it computes over.

use serde::{Deserialize, Serialize};

/// A captured frame resolution, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageResolution {
    pub x_px: u32,
    pub y_px: u32,
}

/// A (detector, resolution) pair identifying one calibration slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DetectorResolution {
    pub detector_serial_identifier: String,
    pub image_resolution: ImageResolution,
}

/// Opaque intrinsic camera parameters (focal length, principal point,
/// distortion). The core never interprets these values, only relays them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntrinsicParameters {
    pub focal_length_x_px: f64,
    pub focal_length_y_px: f64,
    pub principal_point_x_px: f64,
    pub principal_point_y_px: f64,
    pub distortion_coefficients: Vec<f64>,
}

/// One staged or committed intrinsic calibration result, as returned by
/// `detector_calibration_result_get`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntrinsicCalibration {
    pub detector_serial_identifier: String,
    pub image_resolution: ImageResolution,
    pub calibrated_values: IntrinsicParameters,
}

/// Disposition of a staged calibration result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationResultState {
    Retain,
    Delete,
}

/// Metadata for one calibration result, as listed by
/// `detector_calibration_result_metadata_list`.
///
/// `timestamp_utc` is ISO-8601; the Startup Orchestrator parses it to pick
/// the freshest result (spec.md §4.6 tie-breaking rule).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationResultMetadata {
    pub identifier: String,
    pub timestamp_utc: String,
    pub state: CalibrationResultState,
}

/// One fiducial-marker corner observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerSnapshot {
    pub marker_id: i64,
    /// Four (x, y) image-plane corner points, in detection order.
    pub corner_image_points: Vec<(f64, f64)>,
}

/// A rigid 4x4 transform, row-major.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Matrix4x4(pub [f64; 16]);

/// A solved 6-DoF pose for one object (a Detector or a target marker/board).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub object_id: String,
    pub object_to_reference_matrix: Matrix4x4,
}

/// An opaque camera or marker-detection parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub key: String,
    pub value: serde_json::Value,
}

/// A target marker to be tracked by a Pose Solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetMarker {
    pub marker_id: i64,
    pub marker_diameter: f64,
}

/// A rigid board of several markers, tracked as one target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetBoard {
    pub board_id: String,
    pub markers: Vec<TargetMarker>,
}

/// Either kind of trackable target, as accepted by `set_targets`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "target_type", rename_all = "snake_case")]
pub enum Target {
    Marker(TargetMarker),
    Board(TargetBoard),
}

/// Encoded still-image capture format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureFormat {
    Jpeg,
    Png,
}
