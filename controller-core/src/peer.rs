//! Peer Record (C3): the immutable address half and the mutable live-state
//! half of one remote Detector or Pose Solver (spec.md §3, §4.3).

use std::collections::HashMap;
use std::time::Instant;

use chrono::{DateTime, Utc};
use controller_protocol::types::{DetectorResolution, ImageResolution, IntrinsicParameters, MarkerSnapshot, Pose};
use uuid::Uuid;

use crate::transport::PeerSocket;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerRole {
    Detector,
    PoseSolver,
}

/// Immutable identity of a peer. Never mutated after `AddPeer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerAddress {
    pub label: String,
    pub role: PeerRole,
    pub host: String,
    pub port: u16,
}

impl PeerAddress {
    /// The endpoint every peer speaks (spec.md §6).
    pub fn ws_url(&self) -> String {
        format!("ws://{}:{}/websocket", self.host, self.port)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Disconnected,
    Connecting,
    Connected,
    Disconnecting,
    Aborted,
}

/// Role-specific mutable buffers a Detector carries.
#[derive(Debug, Default)]
pub struct DetectorLive {
    pub request_id: Option<Uuid>,
    pub calibration_result_identifier: Option<String>,
    pub calibrated_resolutions: Vec<DetectorResolution>,
    pub current_resolution: Option<ImageResolution>,
    pub current_intrinsic_parameters: Option<IntrinsicParameters>,
    pub detected_marker_snapshots: Vec<MarkerSnapshot>,
    pub rejected_marker_snapshots: Vec<MarkerSnapshot>,
    pub marker_snapshot_timestamp: Option<DateTime<Utc>>,
}

/// Role-specific mutable buffers a Pose Solver carries.
#[derive(Debug, Default)]
pub struct PoseSolverLive {
    pub request_id: Option<Uuid>,
    pub detector_poses: Vec<Pose>,
    pub target_poses: Vec<Pose>,
    /// Absent entries are treated as -infinity (spec.md §4.7).
    pub detector_timestamps: HashMap<String, DateTime<Utc>>,
    pub poses_timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub enum RoleLive {
    Detector(DetectorLive),
    PoseSolver(PoseSolverLive),
}

impl RoleLive {
    pub fn as_detector(&self) -> Option<&DetectorLive> {
        match self {
            RoleLive::Detector(d) => Some(d),
            RoleLive::PoseSolver(_) => None,
        }
    }

    pub fn as_detector_mut(&mut self) -> Option<&mut DetectorLive> {
        match self {
            RoleLive::Detector(d) => Some(d),
            RoleLive::PoseSolver(_) => None,
        }
    }

    pub fn as_pose_solver(&self) -> Option<&PoseSolverLive> {
        match self {
            RoleLive::PoseSolver(p) => Some(p),
            RoleLive::Detector(_) => None,
        }
    }

    pub fn as_pose_solver_mut(&mut self) -> Option<&mut PoseSolverLive> {
        match self {
            RoleLive::PoseSolver(p) => Some(p),
            RoleLive::Detector(_) => None,
        }
    }
}

/// The mutable half of a peer record: session status, socket handle,
/// retry bookkeeping, and role-specific buffers.
pub struct PeerLiveState {
    pub status: SessionStatus,
    pub socket: Option<PeerSocket>,
    pub attempt_count: u32,
    pub next_attempt_at: Option<Instant>,
    pub role_live: RoleLive,
}

impl PeerLiveState {
    pub fn new(role: PeerRole) -> Self {
        let role_live = match role {
            PeerRole::Detector => RoleLive::Detector(DetectorLive::default()),
            PeerRole::PoseSolver => RoleLive::PoseSolver(PoseSolverLive::default()),
        };
        Self {
            status: SessionStatus::Disconnected,
            socket: None,
            attempt_count: 0,
            next_attempt_at: None,
            role_live,
        }
    }
}

/// One entry in the fleet: the sole owner of its address and its live state
/// (spec.md §9, "Peer is the sole owner of its live state").
pub struct PeerRecord {
    pub address: PeerAddress,
    pub live: PeerLiveState,
}

impl PeerRecord {
    pub fn new(address: PeerAddress) -> Self {
        let live = PeerLiveState::new(address.role);
        Self { address, live }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.live.status, SessionStatus::Connected)
    }
}

/// Snapshot returned by `ListConnectionReports` (spec.md §4.8).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionReport {
    pub label: String,
    pub role: PeerRole,
    pub host: String,
    pub port: u16,
    pub status: SessionStatus,
}

/// Snapshot returned by `LatestDetectorFrame` (spec.md §4.8).
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerFrame {
    pub detected_marker_snapshots: Vec<MarkerSnapshot>,
    pub rejected_marker_snapshots: Vec<MarkerSnapshot>,
    pub timestamp_utc: DateTime<Utc>,
}

/// Snapshot returned by `LatestPoseSolverFrame` (spec.md §4.8).
#[derive(Debug, Clone, PartialEq)]
pub struct PoseFrame {
    pub detector_poses: Vec<Pose>,
    pub target_poses: Vec<Pose>,
    pub timestamp_utc: DateTime<Utc>,
}

impl From<&PeerRecord> for ConnectionReport {
    fn from(peer: &PeerRecord) -> Self {
        Self {
            label: peer.address.label.clone(),
            role: peer.address.role,
            host: peer.address.host.clone(),
            port: peer.address.port,
            status: peer.live.status,
        }
    }
}
