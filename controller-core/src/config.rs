//! Core configuration (spec.md §6). Process bootstrap and file/env loading
//! are out of scope; callers construct a `CoreConfig` directly, typically
//! via [`CoreConfig::builder`].

/// Tunables for the Connection Supervisor and Websocket Transport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoreConfig {
    pub attempt_count_maximum: u32,
    pub attempt_time_gap: std::time::Duration,
    pub websocket_max_frame_bytes: u64,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            attempt_count_maximum: 5,
            attempt_time_gap: std::time::Duration::from_secs(5),
            // 2^48, the upper bound spec.md §6 asks for so an uncompressed
            // full-frame image never trips the frame-size ceiling.
            websocket_max_frame_bytes: 1u64 << 48,
        }
    }
}

impl CoreConfig {
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CoreConfigBuilder {
    attempt_count_maximum: Option<u32>,
    attempt_time_gap: Option<std::time::Duration>,
    websocket_max_frame_bytes: Option<u64>,
}

#[derive(Debug, thiserror::Error)]
pub enum CoreConfigError {
    #[error("attempt_count_maximum must be at least 1")]
    AttemptCountZero,
    #[error("websocket_max_frame_bytes must be at least 1")]
    MaxFrameBytesZero,
}

impl CoreConfigBuilder {
    pub fn attempt_count_maximum(mut self, n: u32) -> Self {
        self.attempt_count_maximum = Some(n);
        self
    }

    pub fn attempt_time_gap(mut self, gap: std::time::Duration) -> Self {
        self.attempt_time_gap = Some(gap);
        self
    }

    pub fn websocket_max_frame_bytes(mut self, bytes: u64) -> Self {
        self.websocket_max_frame_bytes = Some(bytes);
        self
    }

    pub fn build(self) -> Result<CoreConfig, CoreConfigError> {
        let defaults = CoreConfig::default();
        let attempt_count_maximum = self.attempt_count_maximum.unwrap_or(defaults.attempt_count_maximum);
        if attempt_count_maximum == 0 {
            return Err(CoreConfigError::AttemptCountZero);
        }
        let websocket_max_frame_bytes =
            self.websocket_max_frame_bytes.unwrap_or(defaults.websocket_max_frame_bytes);
        if websocket_max_frame_bytes == 0 {
            return Err(CoreConfigError::MaxFrameBytesZero);
        }
        Ok(CoreConfig {
            attempt_count_maximum,
            attempt_time_gap: self.attempt_time_gap.unwrap_or(defaults.attempt_time_gap),
            websocket_max_frame_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_spec_defaults() {
        let cfg = CoreConfig::default();
        assert_eq!(cfg.attempt_count_maximum, 5);
        assert_eq!(cfg.attempt_time_gap, std::time::Duration::from_secs(5));
        assert_eq!(cfg.websocket_max_frame_bytes, 1u64 << 48);
    }

    #[test]
    fn builder_rejects_zero_attempt_count() {
        let err = CoreConfig::builder().attempt_count_maximum(0).build().unwrap_err();
        assert!(matches!(err, CoreConfigError::AttemptCountZero));
    }

    #[test]
    fn builder_overrides_only_what_is_set() {
        let cfg = CoreConfig::builder().attempt_count_maximum(3).build().unwrap();
        assert_eq!(cfg.attempt_count_maximum, 3);
        assert_eq!(cfg.attempt_time_gap, CoreConfig::default().attempt_time_gap);
    }
}
