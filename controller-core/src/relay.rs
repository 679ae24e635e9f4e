//! Relay Loop (C7): per-tick marker-snapshot polling of Detectors and
//! pose-query batching for Pose Solvers, while `status = Running`
//! (spec.md §4.7).

use controller_protocol::{RequestRecord, RequestSeries, ResponseRecord};

use crate::correlator::Correlator;
use crate::peer::PeerRecord;

/// Drive one Detector's poll slot: claim its outstanding frame if any reply
/// has arrived, then (re-)submit if the slot is free.
pub fn tick_detector(peer: &mut PeerRecord, correlator: &mut Correlator) {
    let label = peer.address.label.clone();
    let Some(live) = peer.live.role_live.as_detector_mut() else { return };

    if let Some(id) = live.request_id {
        match correlator.try_claim(id) {
            Ok(Some(response)) => {
                live.request_id = None;
                for record in response.series {
                    if let ResponseRecord::DetectorFrameGet { detected_marker_snapshots, rejected_marker_snapshots } = record {
                        live.detected_marker_snapshots = detected_marker_snapshots;
                        live.rejected_marker_snapshots = rejected_marker_snapshots;
                        live.marker_snapshot_timestamp = Some(chrono::Utc::now());
                    }
                }
            }
            Ok(None) => {}
            Err(_) => live.request_id = None,
        }
    }

    if live.request_id.is_none() {
        let id = correlator.submit(
            &label,
            RequestSeries::single(RequestRecord::DetectorFrameGet { include_detected: true, include_rejected: true }),
        );
        live.request_id = Some(id);
    }
}

/// Drive one Pose Solver's batch slot: claim its outstanding pose reply if
/// any has arrived, then build and submit the next batch (fresh Detector
/// corners plus a pose query) if the slot is free.
pub fn tick_pose_solver(peer: &mut PeerRecord, detectors: &[&PeerRecord], correlator: &mut Correlator) {
    let label = peer.address.label.clone();
    let Some(live) = peer.live.role_live.as_pose_solver_mut() else { return };

    if let Some(id) = live.request_id {
        match correlator.try_claim(id) {
            Ok(Some(response)) => {
                live.request_id = None;
                for record in response.series {
                    if let ResponseRecord::GetPoses { detector_poses, target_poses } = record {
                        live.detector_poses = detector_poses;
                        live.target_poses = target_poses;
                        live.poses_timestamp = Some(chrono::Utc::now());
                    }
                }
            }
            Ok(None) => {}
            Err(_) => live.request_id = None,
        }
    }

    if live.request_id.is_none() {
        let mut series = Vec::new();
        for detector in detectors {
            let Some(d) = detector.live.role_live.as_detector() else { continue };
            let Some(current) = d.marker_snapshot_timestamp else { continue };
            let last_seen = live.detector_timestamps.get(&detector.address.label).copied();
            if last_seen.map_or(true, |seen| current > seen) {
                series.push(RequestRecord::AddMarkerCorners {
                    detector_label: detector.address.label.clone(),
                    detector_timestamp_utc: current,
                    detected_marker_snapshots: d.detected_marker_snapshots.clone(),
                    rejected_marker_snapshots: d.rejected_marker_snapshots.clone(),
                });
                live.detector_timestamps.insert(detector.address.label.clone(), current);
            }
        }
        series.push(RequestRecord::GetPoses);
        let id = correlator.submit(&label, RequestSeries::new(series));
        live.request_id = Some(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peer::{PeerAddress, PeerRole};
    use controller_protocol::ResponseSeries;

    fn detector(label: &str) -> PeerRecord {
        PeerRecord::new(PeerAddress { label: label.to_owned(), role: PeerRole::Detector, host: "h".into(), port: 1 })
    }

    fn solver(label: &str) -> PeerRecord {
        PeerRecord::new(PeerAddress { label: label.to_owned(), role: PeerRole::PoseSolver, host: "h".into(), port: 1 })
    }

    #[test]
    fn detector_submits_a_poll_when_slot_is_free() {
        let mut d = detector("d1");
        let mut correlator = Correlator::new();
        tick_detector(&mut d, &mut correlator);
        assert!(d.live.role_live.as_detector().unwrap().request_id.is_some());
    }

    #[test]
    fn detector_does_not_resubmit_while_a_poll_is_outstanding() {
        let mut d = detector("d1");
        let mut correlator = Correlator::new();
        tick_detector(&mut d, &mut correlator);
        let first_id = d.live.role_live.as_detector().unwrap().request_id;
        tick_detector(&mut d, &mut correlator);
        assert_eq!(d.live.role_live.as_detector().unwrap().request_id, first_id);
    }

    #[test]
    fn pose_solver_sends_each_detector_frame_only_once() {
        let mut d = detector("d1");
        d.live.role_live.as_detector_mut().unwrap().marker_snapshot_timestamp = Some(chrono::Utc::now());
        let mut p = solver("p1");
        let mut correlator = Correlator::new();

        tick_pose_solver(&mut p, &[&d], &mut correlator);
        let id = p.live.role_live.as_pose_solver().unwrap().request_id.unwrap();
        let series = correlator.take_outbound("p1");
        assert_eq!(series.len(), 1);
        let (submitted, submitted_id) = &series[0];
        assert_eq!(*submitted_id, id);
        assert!(submitted.series.iter().any(|r| matches!(r, RequestRecord::AddMarkerCorners { .. })));

        correlator.post_response(id, ResponseSeries { series: vec![ResponseRecord::GetPoses { detector_poses: vec![], target_poses: vec![] }], responder: "p1".into() });
        tick_pose_solver(&mut p, &[&d], &mut correlator);

        // Same detector timestamp as before: a second batch is still built
        // (request_id was cleared), but it must not re-send d1's corners.
        let next_id = p.live.role_live.as_pose_solver().unwrap().request_id.unwrap();
        let series = correlator.take_outbound("p1");
        let (submitted, _) = &series[0];
        assert_eq!(submitted.series, vec![RequestRecord::GetPoses]);
        let _ = next_id;
    }
}
