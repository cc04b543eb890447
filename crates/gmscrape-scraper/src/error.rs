use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum BrowserError {
    #[error("timed out after {timeout_ms}ms waiting for {selector}")]
    Timeout { selector: String, timeout_ms: u64 },

    #[error("no element matches {0}")]
    NotFound(String),

    #[error("browser session lost: {0}")]
    SessionLost(String),

    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("browser command failed: {0}")]
    Command(String),
}

impl BrowserError {
    /// Whether the capability itself is gone, so no further command can succeed.
    #[must_use]
    pub fn is_session_lost(&self) -> bool {
        matches!(self, Self::SessionLost(_))
    }

    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
