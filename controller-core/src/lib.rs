//! Controller Core: supervises a fleet of Detector and Pose Solver
//! websocket peers, drives them through a multi-phase startup, and relays
//! marker observations to poses once running.
//!
//! See `controller-protocol` for the wire types this crate exchanges; this
//! crate is where the session lifecycle, correlation, startup sequencing,
//! and steady-state relay live.

pub mod config;
pub mod correlator;
pub mod error;
pub mod facade;
pub mod orchestrator;
pub mod peer;
pub mod relay;
pub mod status_sink;
pub mod supervisor;
pub mod transport;

pub use config::{CoreConfig, CoreConfigError};
pub use error::{CoreError, TransportError};
pub use facade::Controller;
pub use orchestrator::{OverallStatus, TrackingMode};
pub use peer::{ConnectionReport, MarkerFrame, PeerAddress, PeerRole, PoseFrame, SessionStatus};
