//! Controller Façade (C8): the public operation surface over the core.
//! One owned `Controller` per process (spec.md §9, "no module-level
//! singleton").

use std::collections::HashMap;

use controller_protocol::StatusMessage;
use uuid::Uuid;

use crate::config::CoreConfig;
use crate::correlator::Correlator;
use crate::error::CoreError;
use crate::orchestrator::{Orchestrator, OverallStatus, TrackingMode};
use crate::peer::{ConnectionReport, MarkerFrame, PeerAddress, PeerRecord, PeerRole, PoseFrame};
use crate::status_sink::StatusSink;
use crate::{relay, supervisor};

/// The one core object a process constructs. Owns every peer (split into
/// Detectors and Pose Solvers so both can be borrowed independently during
/// a tick), the Correlator, the status sink, and the Startup Orchestrator.
pub struct Controller {
    config: CoreConfig,
    detectors: HashMap<String, PeerRecord>,
    pose_solvers: HashMap<String, PeerRecord>,
    correlator: Correlator,
    status: StatusSink,
    orchestrator: Orchestrator,
}

impl Controller {
    pub fn new(config: CoreConfig) -> Self {
        Self {
            config,
            detectors: HashMap::new(),
            pose_solvers: HashMap::new(),
            correlator: Correlator::new(),
            status: StatusSink::default(),
            orchestrator: Orchestrator::new(),
        }
    }

    pub fn overall_status(&self) -> OverallStatus {
        self.orchestrator.status
    }

    /// Fails if `address.label` is already present, in either role
    /// (spec.md §3, "every peer label is unique across the fleet").
    pub fn add_peer(&mut self, address: PeerAddress) -> Result<(), CoreError> {
        if self.detectors.contains_key(&address.label) || self.pose_solvers.contains_key(&address.label) {
            return Err(CoreError::DuplicateLabel(address.label));
        }
        let map = self.map_for_role(address.role);
        map.insert(address.label.clone(), PeerRecord::new(address));
        Ok(())
    }

    /// Fails if `label` is absent (spec.md §4.8).
    pub fn remove_peer(&mut self, label: &str) -> Result<(), CoreError> {
        if self.detectors.remove(label).is_some() || self.pose_solvers.remove(label).is_some() {
            Ok(())
        } else {
            Err(CoreError::UnknownPeer(label.to_owned()))
        }
    }

    pub fn connect_peer(&mut self, label: &str) -> Result<(), CoreError> {
        let Self { detectors, pose_solvers, status, .. } = self;
        let peer = detectors
            .get_mut(label)
            .or_else(|| pose_solvers.get_mut(label))
            .ok_or_else(|| CoreError::UnknownPeer(label.to_owned()))?;
        supervisor::connect_peer(peer, status);
        Ok(())
    }

    pub fn disconnect_peer(&mut self, label: &str) -> Result<(), CoreError> {
        let peer = self.peer_mut(label)?;
        supervisor::disconnect_peer(peer);
        Ok(())
    }

    pub fn list_connection_reports(&self) -> Vec<ConnectionReport> {
        let mut reports: Vec<ConnectionReport> =
            self.detectors.values().chain(self.pose_solvers.values()).map(ConnectionReport::from).collect();
        reports.sort_by(|a, b| a.label.cmp(&b.label));
        reports
    }

    pub fn list_connected_detectors(&self) -> Vec<String> {
        self.detectors.values().filter(|p| p.is_connected()).map(|p| p.address.label.clone()).collect()
    }

    pub fn list_connected_pose_solvers(&self) -> Vec<String> {
        self.pose_solvers.values().filter(|p| p.is_connected()).map(|p| p.address.label.clone()).collect()
    }

    pub fn start_tracking(&mut self, mode: TrackingMode) {
        let mut detectors: Vec<&mut PeerRecord> = self.detectors.values_mut().collect();
        let mut pose_solvers: Vec<&mut PeerRecord> = self.pose_solvers.values_mut().collect();
        self.orchestrator.start_tracking(mode, &mut detectors, &mut pose_solvers, &mut self.correlator, &mut self.status);
    }

    pub fn stop_tracking(&mut self) {
        let mut detectors: Vec<&mut PeerRecord> = self.detectors.values_mut().collect();
        let mut pose_solvers: Vec<&mut PeerRecord> = self.pose_solvers.values_mut().collect();
        self.orchestrator.stop_tracking(&mut detectors, &mut pose_solvers, &mut self.correlator);
    }

    /// "not yet" is represented as `None`: the peer is unknown, is not a
    /// Detector, or has produced no frame yet (spec.md §4.8).
    pub fn latest_detector_frame(&self, label: &str) -> Option<MarkerFrame> {
        let live = self.detectors.get(label)?.live.role_live.as_detector()?;
        let timestamp_utc = live.marker_snapshot_timestamp?;
        Some(MarkerFrame {
            detected_marker_snapshots: live.detected_marker_snapshots.clone(),
            rejected_marker_snapshots: live.rejected_marker_snapshots.clone(),
            timestamp_utc,
        })
    }

    pub fn latest_pose_solver_frame(&self, label: &str) -> Option<PoseFrame> {
        let live = self.pose_solvers.get(label)?.live.role_live.as_pose_solver()?;
        let timestamp_utc = live.poses_timestamp?;
        Some(PoseFrame { detector_poses: live.detector_poses.clone(), target_poses: live.target_poses.clone(), timestamp_utc })
    }

    pub fn ignore_request(&mut self, label: &str, id: Uuid) {
        self.correlator.ignore(label, id);
    }

    pub fn drain_status_messages(&mut self) -> Vec<StatusMessage> {
        self.status.drain()
    }

    /// One pass over every peer: Supervisor, then (if `Running`) the Relay
    /// Loop, then the Orchestrator's pending-id drain (spec.md §4.8 `Tick`).
    pub async fn tick(&mut self) {
        for peer in self.detectors.values_mut() {
            supervisor::tick(peer, &mut self.correlator, &mut self.status, &self.config).await;
        }
        for peer in self.pose_solvers.values_mut() {
            supervisor::tick(peer, &mut self.correlator, &mut self.status, &self.config).await;
        }

        if self.orchestrator.status == OverallStatus::Running {
            for peer in self.detectors.values_mut() {
                relay::tick_detector(peer, &mut self.correlator);
            }
            let detector_refs: Vec<&PeerRecord> = self.detectors.values().collect();
            for solver in self.pose_solvers.values_mut() {
                relay::tick_pose_solver(solver, &detector_refs, &mut self.correlator);
            }
        }

        let mut detectors: Vec<&mut PeerRecord> = self.detectors.values_mut().collect();
        let mut pose_solvers: Vec<&mut PeerRecord> = self.pose_solvers.values_mut().collect();
        self.orchestrator.drain_pending(&mut detectors, &mut pose_solvers, &mut self.correlator, &mut self.status);
    }

    fn map_for_role(&mut self, role: PeerRole) -> &mut HashMap<String, PeerRecord> {
        match role {
            PeerRole::Detector => &mut self.detectors,
            PeerRole::PoseSolver => &mut self.pose_solvers,
        }
    }

    fn peer_mut(&mut self, label: &str) -> Result<&mut PeerRecord, CoreError> {
        if self.detectors.contains_key(label) {
            return Ok(self.detectors.get_mut(label).expect("checked above"));
        }
        self.pose_solvers.get_mut(label).ok_or_else(|| CoreError::UnknownPeer(label.to_owned()))
    }
}
