// ── Core error types ──
//
// Errors surfaced by srm-core. The controller classifies these into
// state transitions: `Timeout` may be retried, `NotConnected` triggers the
// reconnect flow, and everything else halts the current cycle.
// The `From<srm_api::Error>` impl translates transport-layer errors.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to router at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Not connected")]
    NotConnected,

    #[error("Router connection timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Unknown state: {path}")]
    UnknownState { path: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// The SRM error code, when the router reported one.
        code: Option<i64>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    pub fn is_not_connected(&self) -> bool {
        matches!(self, Self::NotConnected)
    }

    /// Timeouts and connection-level failures (refused, unreachable, TLS).
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::ConnectionFailed { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<srm_api::Error> for CoreError {
    fn from(err: srm_api::Error) -> Self {
        match err {
            srm_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            srm_api::Error::NotConnected => CoreError::NotConnected,
            srm_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_ms: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        code: None,
                    }
                }
            }
            srm_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            srm_api::Error::Timeout { timeout_ms } => CoreError::Timeout { timeout_ms },
            srm_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            srm_api::Error::Api { api, code } => CoreError::Api {
                message: format!("{api} failed"),
                code: Some(code),
            },
            srm_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_loss_maps_to_not_connected() {
        let err = CoreError::from(srm_api::Error::NotConnected);
        assert!(err.is_not_connected());
        assert!(!err.is_transient());
    }

    #[test]
    fn api_timeout_keeps_duration() {
        let err = CoreError::from(srm_api::Error::Timeout { timeout_ms: 5000 });
        assert!(err.is_timeout());
        assert_eq!(err.to_string(), "Router connection timed out after 5000ms");
    }

    #[test]
    fn api_error_keeps_code() {
        let err = CoreError::from(srm_api::Error::Api {
            api: "SYNO.Mesh.Node.List".into(),
            code: 103,
        });
        assert!(matches!(err, CoreError::Api { code: Some(103), .. }));
    }
}
