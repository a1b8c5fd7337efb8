//! Driver error types
//!
//! Most call sites use `anyhow::Result` with context (bridge replies are
//! loosely typed), but the conditions the retry machinery has to tell apart
//! get concrete variants here.

use thiserror::Error;

/// Errors raised by the command-translation layer
#[derive(Debug, Error)]
pub enum DriverError {
    /// The capture command was sent but the artifact never appeared on disk
    #[error("timed out waiting for screenshot file after {timeout_ms} ms")]
    CaptureTimeout { timeout_ms: u64 },

    /// Communication with the UIAutomation bridge process failed
    #[error("UIAutomation bridge communication failed: {0}")]
    Transport(String),

    /// The requested attribute is not part of the UIAElement surface
    #[error("UIAElements don't have the attribute '{0}'")]
    UnknownAttribute(String),

    /// The operation exists in the command table but has no implementation
    #[error("{0} is not implemented")]
    NotImplemented(&'static str),
}

impl DriverError {
    /// Whether a failed attempt is worth repeating.
    ///
    /// Timeouts and transport failures are transient: the bridge process may
    /// simply have been busy. Everything else is a caller bug and retrying
    /// would produce the same answer.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::CaptureTimeout { .. } | Self::Transport(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(DriverError::CaptureTimeout { timeout_ms: 10000 }.is_retryable());
        assert!(DriverError::Transport("socket closed".into()).is_retryable());
        assert!(!DriverError::UnknownAttribute("frame".into()).is_retryable());
        assert!(!DriverError::NotImplemented("setValue with robot").is_retryable());
    }
}
