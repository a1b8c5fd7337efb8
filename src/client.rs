//! Collaborator seams for the command layer
//!
//! The driver talks to two external processes: the UIAutomation bridge that
//! executes `au.*` command strings against the native UI, and the atom
//! executor that runs pre-packaged web-automation primitives inside a page.
//! Both are injected as traits so the command implementations stay testable
//! without a live device.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Client for the UIAutomation bridge process.
///
/// Commands are JavaScript-ish strings (`au.getElement('42').text()`); the
/// reply is whatever the bridge decoded from Instruments, so it comes back as
/// loose JSON. Implementations should surface transport problems as
/// [`crate::DriverError::Transport`].
#[async_trait]
pub trait UiAutoClient: Send + Sync {
    async fn send_command(&self, command: &str) -> Result<Value>;
}

/// Executor for web-automation atoms in a page context.
#[async_trait]
pub trait AtomExecutor: Send + Sync {
    async fn execute_atom(&self, atom: &str, args: Vec<Value>) -> Result<Value>;
}

/// Which automation surface the session currently targets.
///
/// Selected once when the session switches context, not re-checked per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionContext {
    /// Native UI via the UIAutomation bridge
    Native,
    /// Web view content via atoms
    Web,
}

impl SessionContext {
    pub fn is_web(self) -> bool {
        matches!(self, SessionContext::Web)
    }
}

/// Device orientation as reported by the bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
    Unknown,
}

impl Orientation {
    /// Parse the bridge's orientation string (`"PORTRAIT"` / `"LANDSCAPE"`).
    pub fn from_bridge(value: &str) -> Self {
        match value {
            "PORTRAIT" => Orientation::Portrait,
            "LANDSCAPE" => Orientation::Landscape,
            _ => Orientation::Unknown,
        }
    }

    pub fn is_landscape(self) -> bool {
        matches!(self, Orientation::Landscape)
    }
}
