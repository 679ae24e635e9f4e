//! Status message envelope (spec.md §6) and its severity ordering.

use serde::{Deserialize, Serialize};

/// Severity of a status message. Ordered so a consumer can filter
/// `severity >= Warning`, which spec.md does not require but which any
/// practical consumer of a status sink needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{s}")
    }
}

/// One entry in the `dequeue_status_messages` wire response, or one entry
/// raised locally by the core itself (`source_label` set to the core's own
/// label in that case, e.g. `"controller"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub severity: Severity,
    pub message: String,
    pub source_label: String,
    pub timestamp_utc: chrono::DateTime<chrono::Utc>,
}

impl StatusMessage {
    pub fn new(severity: Severity, source_label: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            source_label: source_label.into(),
            timestamp_utc: chrono::Utc::now(),
        }
    }

    /// Emit this message through `tracing` at its own severity, in addition
    /// to whatever in-process sink stores it.
    pub fn log(&self) {
        match self.severity {
            Severity::Debug => tracing::debug!(source = %self.source_label, "{}", self.message),
            Severity::Info => tracing::info!(source = %self.source_label, "{}", self.message),
            Severity::Warning => tracing::warn!(source = %self.source_label, "{}", self.message),
            Severity::Error => tracing::error!(source = %self.source_label, "{}", self.message),
        }
    }
}
