// HTTP transport settings
//
// Certificate handling and timeouts for the router connection. Every
// client gets its own cookie jar: SRM pairs the `_sid` parameter with an
// `id` cookie set at login, and a shared jar would mix sessions.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;

use crate::error::Error;

/// How the router's certificate is checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlsMode {
    /// Platform trust store.
    System,
    /// Trust the PEM certificate at this path in addition to the platform store.
    CustomCa(PathBuf),
    /// No verification. SRM ships with a self-signed certificate.
    DangerAcceptInvalid,
}

#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    /// Whole-request timeout.
    pub timeout: Duration,
    /// TCP + TLS handshake timeout. `None` keeps reqwest's default.
    pub connect_timeout: Option<Duration>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::DangerAcceptInvalid,
            timeout: Duration::from_secs(30),
            connect_timeout: None,
        }
    }
}

impl TransportConfig {
    /// Build a session-scoped HTTP client with a fresh cookie jar.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let builder = reqwest::Client::builder()
            .user_agent(concat!("srm-bridge/", env!("CARGO_PKG_VERSION")))
            .timeout(self.timeout)
            .cookie_provider(Arc::new(Jar::default()));
        let builder = match self.connect_timeout {
            Some(limit) => builder.connect_timeout(limit),
            None => builder,
        };

        with_tls(builder, &self.tls)?
            .build()
            .map_err(|e| Error::Tls(format!("cannot build HTTP client: {e}")))
    }
}

fn with_tls(
    builder: reqwest::ClientBuilder,
    tls: &TlsMode,
) -> Result<reqwest::ClientBuilder, Error> {
    Ok(match tls {
        TlsMode::System => builder,
        TlsMode::CustomCa(path) => builder.add_root_certificate(load_ca(path)?),
        TlsMode::DangerAcceptInvalid => builder.danger_accept_invalid_certs(true),
    })
}

fn load_ca(path: &Path) -> Result<reqwest::Certificate, Error> {
    let pem = std::fs::read(path)
        .map_err(|e| Error::Tls(format!("cannot read CA file {}: {e}", path.display())))?;
    reqwest::Certificate::from_pem(&pem)
        .map_err(|e| Error::Tls(format!("{} is not a PEM certificate: {e}", path.display())))
}
