// ── Router session seam ──
//
// The controller talks to the router through these traits so it can run
// against an in-memory router in tests. `SrmConnector` is the real
// implementation over `srm_api::SrmClient`.

use std::future::Future;
use std::time::Duration;

use secrecy::SecretString;
use srm_api::transport::{TlsMode, TransportConfig};
use srm_api::{
    ConnectionStatus, MeshNode, NetworkDevice, SrmClient, TrafficWindow, WifiProfile,
    WifiSettings,
};
use tracing::debug;
use url::Url;

use crate::config::{BridgeConfig, TlsVerification};
use crate::error::CoreError;

/// Everything needed to open a session.
#[derive(Debug, Clone)]
pub struct SessionTarget {
    pub base_url: Url,
    pub username: String,
    pub password: SecretString,
    pub tls: TlsVerification,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl SessionTarget {
    pub fn from_config(config: &BridgeConfig) -> Result<Self, CoreError> {
        Ok(Self {
            base_url: config.base_url()?,
            username: config.username.clone(),
            password: config.password.clone(),
            tls: config.tls.clone(),
            connect_timeout: config.connect_timeout,
            request_timeout: config.request_timeout,
        })
    }
}

/// Opens authenticated sessions.
pub trait Connector: Send + Sync + 'static {
    type Session: RouterSession;

    fn authenticate(
        &self,
        target: &SessionTarget,
    ) -> impl Future<Output = Result<Self::Session, CoreError>> + Send;
}

/// An authenticated router session.
pub trait RouterSession: Send + Sync + 'static {
    fn logout(&self) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn connection_status(&self)
    -> impl Future<Output = Result<ConnectionStatus, CoreError>> + Send;

    fn devices(&self) -> impl Future<Output = Result<Vec<NetworkDevice>, CoreError>> + Send;

    fn mesh_nodes(&self) -> impl Future<Output = Result<Vec<MeshNode>, CoreError>> + Send;

    fn wifi_settings(&self) -> impl Future<Output = Result<WifiSettings, CoreError>> + Send;

    fn traffic(
        &self,
        window: TrafficWindow,
    ) -> impl Future<Output = Result<serde_json::Value, CoreError>> + Send;

    fn set_wifi_settings(
        &self,
        profiles: &[WifiProfile],
    ) -> impl Future<Output = Result<(), CoreError>> + Send;
}

// ── SRM implementation ───────────────────────────────────────────────

/// Connects to a real SRM router.
#[derive(Debug, Clone, Copy, Default)]
pub struct SrmConnector;

/// A logged-in [`SrmClient`].
pub struct SrmSession {
    client: SrmClient,
}

impl SrmSession {
    pub fn client(&self) -> &SrmClient {
        &self.client
    }
}

impl Connector for SrmConnector {
    type Session = SrmSession;

    async fn authenticate(&self, target: &SessionTarget) -> Result<SrmSession, CoreError> {
        let transport = build_transport(target);
        let client = SrmClient::new(target.base_url.clone(), &transport)?;
        client.login(&target.username, &target.password).await?;
        debug!(url = %target.base_url, "session established");
        Ok(SrmSession { client })
    }
}

impl RouterSession for SrmSession {
    async fn logout(&self) -> Result<(), CoreError> {
        Ok(self.client.logout().await?)
    }

    async fn connection_status(&self) -> Result<ConnectionStatus, CoreError> {
        Ok(self.client.connection_status().await?)
    }

    async fn devices(&self) -> Result<Vec<NetworkDevice>, CoreError> {
        Ok(self.client.devices().await?)
    }

    async fn mesh_nodes(&self) -> Result<Vec<MeshNode>, CoreError> {
        Ok(self.client.mesh_nodes().await?)
    }

    async fn wifi_settings(&self) -> Result<WifiSettings, CoreError> {
        Ok(self.client.wifi_settings().await?)
    }

    async fn traffic(&self, window: TrafficWindow) -> Result<serde_json::Value, CoreError> {
        Ok(self.client.traffic(window).await?)
    }

    async fn set_wifi_settings(&self, profiles: &[WifiProfile]) -> Result<(), CoreError> {
        Ok(self.client.set_wifi_settings(profiles).await?)
    }
}

/// Build a [`TransportConfig`] from the session target.
fn build_transport(target: &SessionTarget) -> TransportConfig {
    TransportConfig {
        tls: tls_to_transport(&target.tls),
        timeout: target.request_timeout,
        connect_timeout: Some(target.connect_timeout),
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}
