//! Error kinds for the core, split along spec.md §7's usage/transport line.

use thiserror::Error;

/// Programmer-mistake errors (spec.md §7.1): adding a duplicate label,
/// removing a missing label, claiming an id the Correlator never issued.
/// Callers that trip these have a bug, not a transient condition.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("peer label '{0}' already exists")]
    DuplicateLabel(String),
    #[error("no peer with label '{0}'")]
    UnknownPeer(String),
    #[error("request id '{0}' is not known to the correlator")]
    UnknownRequestId(uuid::Uuid),
}

/// Failures raised by the Websocket Transport (C2). Both variants are caught
/// by the Supervisor and turned into a session-state transition rather than
/// propagated to the Façade (spec.md §4.2, §7.2-3).
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("websocket error: {0}")]
    Ws(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("response envelope was not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("response envelope did not parse: {0}")]
    Protocol(#[from] controller_protocol::ParseError),
    #[error("peer closed the connection")]
    Closed,
}
