use thiserror::Error;

/// Unified error type for the entire stock-portfolio-core library.
/// Every fallible public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Local validation ────────────────────────────────────────────
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    // ── Backend / Network ───────────────────────────────────────────
    #[error("Network error: {0}")]
    Network(String),

    #[error("Backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    #[error("Stock not found: {0}")]
    NotFound(String),

    #[error("Change was saved but reloading holdings failed: {0}")]
    Reload(String),

    #[error("Session has been closed")]
    SessionClosed,

    // ── Market data ─────────────────────────────────────────────────
    #[error("API error ({provider}): {message}")]
    Api { provider: String, message: String },

    // ── Serialization ───────────────────────────────────────────────
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl CoreError {
    /// `true` for failures that came from talking to the persistence backend
    /// (transport, non-success status, not-found, or a failed reload).
    #[must_use]
    pub fn is_backend(&self) -> bool {
        matches!(
            self,
            CoreError::Network(_)
                | CoreError::Backend { .. }
                | CoreError::NotFound(_)
                | CoreError::Reload(_)
                | CoreError::Deserialization(_)
        )
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest errors carry the full URL; strip the query so tokens never leak.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}
