// ── Runtime bridge configuration ──
//
// Describes how to reach the router and how the controller paces itself.
// Carries credentials but never touches disk: srm-config (or a test)
// builds a `BridgeConfig` and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::warn;
use url::Url;

use crate::error::CoreError;
use crate::ip::is_valid_ipv4;

/// Polling never runs more often than this.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Which connect failures schedule a reconnect.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum RetryPolicy {
    /// Only a timed-out login is retried.
    #[default]
    TimeoutOnly,
    /// Timeouts and connection-level failures are retried.
    Transient,
    /// Never retry automatically.
    Never,
}

impl RetryPolicy {
    pub fn should_retry(self, err: &CoreError) -> bool {
        match self {
            Self::TimeoutOnly => err.is_timeout(),
            Self::Transient => err.is_transient(),
            Self::Never => false,
        }
    }
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification. SRM ships a self-signed certificate.
    #[default]
    DangerAcceptInvalid,
}

/// Configuration for bridging a single router.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Router IPv4 address (dotted quad).
    pub host: String,
    /// HTTPS port of the SRM web UI.
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    pub tls: TlsVerification,
    /// Time between poll cycles. Floored to [`MIN_POLL_INTERVAL`].
    pub interval: Duration,
    /// Upper bound for login (and for logout at shutdown).
    pub connect_timeout: Duration,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
    /// Delay before every reconnect attempt.
    pub reconnect_delay: Duration,
    /// Quiet period after a wifi write-back before polling resumes.
    pub write_settle: Duration,
    pub retry_policy: RetryPolicy,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            host: "192.168.1.1".into(),
            port: 8001,
            username: "admin".into(),
            password: SecretString::from(String::new()),
            tls: TlsVerification::default(),
            interval: MIN_POLL_INTERVAL,
            connect_timeout: Duration::from_millis(5000),
            request_timeout: Duration::from_secs(30),
            reconnect_delay: Duration::from_secs(60),
            write_settle: Duration::from_secs(3),
            retry_policy: RetryPolicy::default(),
        }
    }
}

impl BridgeConfig {
    /// Check the router address and floor the poll interval.
    pub fn validated(mut self) -> Result<Self, CoreError> {
        if !is_valid_ipv4(&self.host) {
            return Err(CoreError::ValidationFailed {
                message: format!("router address {:?} is not a valid IPv4 address", self.host),
            });
        }
        if self.interval < MIN_POLL_INTERVAL {
            warn!(
                requested_secs = self.interval.as_secs(),
                min_secs = MIN_POLL_INTERVAL.as_secs(),
                "poll interval too short, using minimum"
            );
            self.interval = MIN_POLL_INTERVAL;
        }
        Ok(self)
    }

    /// `https://{host}:{port}`
    pub fn base_url(&self) -> Result<Url, CoreError> {
        Url::parse(&format!("https://{}:{}", self.host, self.port)).map_err(|e| {
            CoreError::Config {
                message: format!("invalid router URL: {e}"),
            }
        })
    }
}
