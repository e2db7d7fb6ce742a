// Wifi endpoints
//
// The router only accepts the complete profile list on `set`; callers
// read, mutate one field, and push everything back.

use tracing::debug;

use crate::client::SrmClient;
use crate::error::Error;
use crate::models::{WifiProfile, WifiSettings};

const WIFI_API: &str = "SYNO.Wifi.Network.Setting";

impl SrmClient {
    /// Get all wifi profiles.
    ///
    /// `SYNO.Wifi.Network.Setting` / `get`
    pub async fn wifi_settings(&self) -> Result<WifiSettings, Error> {
        debug!("fetching wifi settings");
        self.call(WIFI_API, "get", 1, &[]).await
    }

    /// Replace the wifi profile list.
    ///
    /// `SYNO.Wifi.Network.Setting` / `set` with `profiles=<json>`
    pub async fn set_wifi_settings(&self, profiles: &[WifiProfile]) -> Result<(), Error> {
        let payload = serde_json::to_string(profiles).map_err(|e| Error::Deserialization {
            message: format!("failed to encode wifi profiles: {e}"),
            body: String::new(),
        })?;
        debug!(count = profiles.len(), "pushing wifi settings");
        self.call_unit(WIFI_API, "set", 1, &[("profiles", payload)])
            .await
    }
}
