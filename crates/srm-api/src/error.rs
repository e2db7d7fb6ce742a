use thiserror::Error;

/// Top-level error type for the `srm-api` crate.
///
/// Covers every failure mode of the router web API: authentication,
/// session loss, transport, and the `{success, error: {code}}` envelope.
/// `srm-core` classifies these into controller state transitions.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login rejected (wrong credentials, disabled account, 2FA required).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// No active session: never logged in, logged out, or the router
    /// dropped the session (SID expired, duplicate login, reboot).
    #[error("Not connected")]
    NotConnected,

    // ── Transport ───────────────────────────────────────────────────
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The whole request outlived the configured timeout.
    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Client construction failed: unreadable CA file or bad certificate.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Web API ─────────────────────────────────────────────────────
    /// The router answered with `success: false`.
    #[error("SRM API error {code} from {api}")]
    Api { api: String, code: i64 },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the session is gone and a fresh login is needed.
    pub fn is_not_connected(&self) -> bool {
        matches!(self, Self::NotConnected)
    }

    /// The `error.code` the router sent with `success: false`.
    pub fn api_error_code(&self) -> Option<i64> {
        match self {
            Self::Api { code, .. } => Some(*code),
            _ => None,
        }
    }
}
