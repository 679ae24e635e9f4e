//! Startup Orchestrator (C6): sequences the five startup phases and owns
//! the overall system status (spec.md §4.6).

use chrono::DateTime;
use controller_protocol::types::CalibrationResultState;
use controller_protocol::{RequestRecord, RequestSeries, ResponseRecord, ResponseSeries, Severity, StatusMessage};
use uuid::Uuid;
use tracing::warn;

use crate::correlator::Correlator;
use crate::peer::{DetectorLive, PeerRecord};
use crate::status_sink::StatusSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingMode {
    DetectingOnly,
    DetectingAndSolving,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Initial,
    StartingCapture,
    GetResolutions,
    ListIntrinsics,
    GetIntrinsics,
    SetIntrinsics,
    Final,
}

impl Phase {
    fn next(self) -> Phase {
        match self {
            Phase::StartingCapture => Phase::GetResolutions,
            Phase::GetResolutions => Phase::ListIntrinsics,
            Phase::ListIntrinsics => Phase::GetIntrinsics,
            Phase::GetIntrinsics => Phase::SetIntrinsics,
            Phase::SetIntrinsics => Phase::Final,
            Phase::Final | Phase::Initial => Phase::Final,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverallStatus {
    Stopped,
    Starting,
    Running,
    Stopping,
}

/// Sequences startup, tracks the current overall status, and owns the
/// pending-id set gating phase advancement.
pub struct Orchestrator {
    pub status: OverallStatus,
    phase: Phase,
    mode: TrackingMode,
    pending: Vec<Uuid>,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self { status: OverallStatus::Stopped, phase: Phase::Initial, mode: TrackingMode::DetectingOnly, pending: Vec::new() }
    }
}

impl Orchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// `StartTracking(mode)` (spec.md §4.6). A no-op if tracking is already
    /// starting, running, or stopping.
    pub fn start_tracking(
        &mut self,
        mode: TrackingMode,
        detectors: &mut [&mut PeerRecord],
        pose_solvers: &mut [&mut PeerRecord],
        correlator: &mut Correlator,
        status: &mut StatusSink,
    ) {
        if self.status != OverallStatus::Stopped {
            return;
        }
        self.mode = mode;
        self.status = OverallStatus::Starting;
        self.phase = Phase::StartingCapture;
        self.enter_and_cascade(detectors, pose_solvers, correlator, status);
    }

    /// `StopTracking` (spec.md §4.6): stop every connected peer and wait on
    /// both the stop acknowledgements and whatever was already in flight.
    pub fn stop_tracking(
        &mut self,
        detectors: &mut [&mut PeerRecord],
        pose_solvers: &mut [&mut PeerRecord],
        correlator: &mut Correlator,
    ) {
        for detector in detectors.iter_mut().filter(|d| d.is_connected()) {
            let id = correlator.submit(&detector.address.label, RequestSeries::single(RequestRecord::DetectorStop));
            self.pending.push(id);
            if let Some(live) = detector.live.role_live.as_detector_mut() {
                if let Some(in_flight) = live.request_id.take() {
                    self.pending.push(in_flight);
                }
            }
        }
        for solver in pose_solvers.iter_mut().filter(|p| p.is_connected()) {
            let id = correlator.submit(&solver.address.label, RequestSeries::single(RequestRecord::StopPoseSolver));
            self.pending.push(id);
            if let Some(live) = solver.live.role_live.as_pose_solver_mut() {
                if let Some(in_flight) = live.request_id.take() {
                    self.pending.push(in_flight);
                }
            }
        }
        self.status = OverallStatus::Stopping;
        self.phase = Phase::Initial;
        if self.pending.is_empty() {
            self.status = OverallStatus::Stopped;
        }
    }

    /// Claim whatever pending ids have arrived; when the set empties,
    /// advance to (and execute the entry action of) the next phase
    /// (spec.md §4.7 "Orchestrator drain").
    pub fn drain_pending(
        &mut self,
        detectors: &mut [&mut PeerRecord],
        pose_solvers: &mut [&mut PeerRecord],
        correlator: &mut Correlator,
        status: &mut StatusSink,
    ) {
        if self.pending.is_empty() {
            return;
        }
        self.pending.retain(|&id| match correlator.try_claim(id) {
            Ok(Some(response)) => {
                apply_response(&response, detectors, pose_solvers, status);
                false
            }
            Ok(None) => true,
            Err(_) => false,
        });

        if self.pending.is_empty() {
            match self.phase {
                Phase::Initial if self.status == OverallStatus::Stopping => {
                    self.status = OverallStatus::Stopped;
                }
                Phase::Initial => {}
                _ => self.enter_and_cascade(detectors, pose_solvers, correlator, status),
            }
        }
    }

    /// Enter `self.phase`'s action and, if it submitted nothing (no
    /// connected peers, or `SetIntrinsics` skipped for `DetectingOnly`),
    /// keep cascading forward until either a phase has something pending
    /// or `Final` is reached.
    fn enter_and_cascade(
        &mut self,
        detectors: &mut [&mut PeerRecord],
        pose_solvers: &mut [&mut PeerRecord],
        correlator: &mut Correlator,
        status: &mut StatusSink,
    ) {
        loop {
            self.pending = enter_phase(self.phase, self.mode, detectors, pose_solvers, correlator, status);
            if !self.pending.is_empty() {
                return;
            }
            if self.phase == Phase::Final {
                self.status = OverallStatus::Running;
                self.phase = Phase::Initial;
                return;
            }
            self.phase = self.phase.next();
        }
    }
}

fn enter_phase(
    phase: Phase,
    mode: TrackingMode,
    detectors: &mut [&mut PeerRecord],
    pose_solvers: &mut [&mut PeerRecord],
    correlator: &mut Correlator,
    status: &mut StatusSink,
) -> Vec<Uuid> {
    match phase {
        Phase::Initial | Phase::Final => Vec::new(),
        Phase::StartingCapture => detectors
            .iter_mut()
            .filter(|d| d.is_connected())
            .map(|d| {
                correlator.submit(
                    &d.address.label,
                    RequestSeries::new(vec![RequestRecord::DetectorStart, RequestRecord::ListCalibrationResolutions]),
                )
            })
            .collect(),
        Phase::GetResolutions => detectors
            .iter_mut()
            .filter(|d| d.is_connected())
            .map(|d| {
                correlator.submit(
                    &d.address.label,
                    RequestSeries::new(vec![
                        RequestRecord::ListCalibrationResolutions,
                        RequestRecord::DetectorCameraParametersGet,
                    ]),
                )
            })
            .collect(),
        Phase::ListIntrinsics => detectors
            .iter_mut()
            .filter(|d| d.is_connected())
            .filter_map(|d| {
                let label = d.address.label.clone();
                let live = d.live.role_live.as_detector_mut()?;
                let resolution = live.current_resolution?;
                let calibrated = live.calibrated_resolutions.iter().any(|r| r.image_resolution == resolution);
                if !calibrated {
                    status.push(StatusMessage::new(
                        Severity::Error,
                        "controller",
                        format!("no calibration for {label} at resolution {resolution:?}"),
                    ));
                    return None;
                }
                Some(correlator.submit(
                    &label,
                    RequestSeries::single(RequestRecord::ListCalibrationResultMetadata { image_resolution: resolution }),
                ))
            })
            .collect(),
        Phase::GetIntrinsics => detectors
            .iter_mut()
            .filter(|d| d.is_connected())
            .filter_map(|d| {
                let label = d.address.label.clone();
                let live = d.live.role_live.as_detector_mut()?;
                let result_identifier = live.calibration_result_identifier.clone()?;
                Some(correlator.submit(&label, RequestSeries::single(RequestRecord::GetCalibrationResult { result_identifier })))
            })
            .collect(),
        Phase::SetIntrinsics => {
            if mode == TrackingMode::DetectingOnly {
                return Vec::new();
            }
            let set_calls: Vec<RequestRecord> = detectors
                .iter()
                .filter_map(|d| {
                    let live = d.live.role_live.as_detector()?;
                    let intrinsic_parameters = live.current_intrinsic_parameters.clone()?;
                    Some(RequestRecord::SetIntrinsicParameters { detector_label: d.address.label.clone(), intrinsic_parameters })
                })
                .collect();
            pose_solvers
                .iter_mut()
                .filter(|p| p.is_connected())
                .map(|p| {
                    let mut series = set_calls.clone();
                    series.push(RequestRecord::StartPoseSolver);
                    correlator.submit(&p.address.label, RequestSeries::new(series))
                })
                .collect()
        }
    }
}

/// Fold one response series' effects into the peer state it names
/// (`responder`). Dispatch is by response variant, not by phase, since a
/// variant self-identifies what it carries regardless of which phase
/// submitted it.
fn apply_response(
    response: &ResponseSeries,
    detectors: &mut [&mut PeerRecord],
    _pose_solvers: &mut [&mut PeerRecord],
    status: &mut StatusSink,
) {
    let label = &response.responder;
    for record in &response.series {
        match record {
            ResponseRecord::Error { message } => {
                status.push(StatusMessage::new(Severity::Error, label.clone(), message.clone()));
            }
            ResponseRecord::ListCalibrationResolutions { detector_resolutions } => {
                if let Some(live) = find_detector(detectors, label) {
                    live.calibrated_resolutions = detector_resolutions.clone();
                }
            }
            ResponseRecord::DetectorCameraParameters { resolution, .. } => {
                if let Some(live) = find_detector(detectors, label) {
                    live.current_resolution = Some(*resolution);
                }
            }
            ResponseRecord::ListCalibrationResultMetadata { metadata_list } => {
                if let Some(live) = find_detector(detectors, label) {
                    live.calibration_result_identifier = pick_freshest(metadata_list);
                }
            }
            ResponseRecord::GetCalibrationResult { intrinsic_calibration } => {
                if let Some(live) = find_detector(detectors, label) {
                    live.current_intrinsic_parameters = Some(intrinsic_calibration.calibrated_values.clone());
                }
            }
            ResponseRecord::Empty => {}
            other => {
                warn!(peer = %label, response = ?other, "unexpected response during startup");
            }
        }
    }
}

fn find_detector<'a, 'b>(detectors: &'b mut [&'a mut PeerRecord], label: &str) -> Option<&'b mut DetectorLive> {
    detectors
        .iter_mut()
        .find(|d| d.address.label == label)
        .and_then(|d| d.live.role_live.as_detector_mut())
}

/// Tie-break among retained calibration results by maximum `timestamp_utc`
/// (spec.md §4.6). Entries staged for deletion are never chosen.
fn pick_freshest(metadata_list: &[controller_protocol::types::CalibrationResultMetadata]) -> Option<String> {
    metadata_list
        .iter()
        .filter(|m| m.state == CalibrationResultState::Retain)
        .max_by_key(|m| DateTime::parse_from_rfc3339(&m.timestamp_utc).ok())
        .map(|m| m.identifier.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use controller_protocol::types::{DetectorResolution, ImageResolution};
    use controller_protocol::types::CalibrationResultState;

    #[test]
    fn pick_freshest_prefers_max_timestamp_and_ignores_delete() {
        let list = vec![
            controller_protocol::types::CalibrationResultMetadata {
                identifier: "old".into(),
                timestamp_utc: "2024-01-01T00:00:00Z".into(),
                state: CalibrationResultState::Retain,
            },
            controller_protocol::types::CalibrationResultMetadata {
                identifier: "newest".into(),
                timestamp_utc: "2024-06-01T00:00:00Z".into(),
                state: CalibrationResultState::Retain,
            },
            controller_protocol::types::CalibrationResultMetadata {
                identifier: "deleted-but-newer".into(),
                timestamp_utc: "2025-01-01T00:00:00Z".into(),
                state: CalibrationResultState::Delete,
            },
        ];
        assert_eq!(pick_freshest(&list), Some("newest".to_owned()));
    }

    #[test]
    fn pick_freshest_empty_list_is_none() {
        assert_eq!(pick_freshest(&[]), None);
    }

    #[test]
    fn phase_sequence_runs_to_final() {
        let mut phase = Phase::StartingCapture;
        let mut seen = vec![phase];
        while phase != Phase::Final {
            phase = phase.next();
            seen.push(phase);
        }
        assert_eq!(
            seen,
            vec![
                Phase::StartingCapture,
                Phase::GetResolutions,
                Phase::ListIntrinsics,
                Phase::GetIntrinsics,
                Phase::SetIntrinsics,
                Phase::Final,
            ]
        );
    }

    #[test]
    fn stop_tracking_with_no_peers_yields_stopped() {
        let mut orchestrator = Orchestrator::new();
        orchestrator.status = OverallStatus::Running;
        let mut correlator = Correlator::new();
        orchestrator.stop_tracking(&mut [], &mut [], &mut correlator);
        assert_eq!(orchestrator.status, OverallStatus::Stopped);
    }

    #[test]
    fn detector_resolution_eq_used_for_calibration_match() {
        let resolution = ImageResolution { x_px: 1920, y_px: 1080 };
        let calibrated = DetectorResolution { detector_serial_identifier: "d1".into(), image_resolution: resolution };
        assert_eq!(calibrated.image_resolution, resolution);
    }
}
