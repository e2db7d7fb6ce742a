// Network endpoints
//
// WAN connection status and the client device inventory.

use tracing::debug;

use crate::client::SrmClient;
use crate::error::Error;
use crate::models::{ConnectionStatus, DeviceList, NetworkDevice, TrafficWindow};

impl SrmClient {
    /// Get the WAN connection status.
    ///
    /// `SYNO.Core.Network.Router.ConnectionStatus` / `get`
    pub async fn connection_status(&self) -> Result<ConnectionStatus, Error> {
        debug!("fetching connection status");
        self.call("SYNO.Core.Network.Router.ConnectionStatus", "get", 1, &[])
            .await
    }

    /// List every device the router knows about, online or not.
    ///
    /// `SYNO.Core.Network.NSM.Device` / `get` with `conntype=all`
    pub async fn devices(&self) -> Result<Vec<NetworkDevice>, Error> {
        debug!("fetching device list");
        let list: DeviceList = self
            .call(
                "SYNO.Core.Network.NSM.Device",
                "get",
                4,
                &[("conntype", "\"all\"".into())],
            )
            .await?;
        Ok(list.devices)
    }

    /// Get a traffic statistics snapshot for the given window.
    ///
    /// `SYNO.Core.NGFW.Traffic` / `get`. Returned loosely typed: the shape
    /// differs per window and firmware.
    pub async fn traffic(&self, window: TrafficWindow) -> Result<serde_json::Value, Error> {
        debug!(window = window.as_str(), "fetching traffic");
        self.call(
            "SYNO.Core.NGFW.Traffic",
            "get",
            1,
            &[
                ("interval", format!("\"{}\"", window.as_str())),
                ("mode", "\"net\"".into()),
            ],
        )
        .await
    }
}
