// SRM web API response types
//
// Each type keeps the fields the bridge reads as named members and
// captures everything else in `extra`, so profiles pushed back through
// `SYNO.Wifi.Network.Setting` keep the fields we never touch.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ── Connection status ────────────────────────────────────────────────

/// WAN connection status for both address families.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectionStatus {
    #[serde(default)]
    pub ipv4: IpConnection,
    #[serde(default)]
    pub ipv6: IpConnection,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IpConnection {
    /// e.g. `"connected"`, `"disconnected"`.
    #[serde(default)]
    pub conn_status: String,
    #[serde(default)]
    pub ip: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct DeviceList {
    #[serde(default)]
    pub devices: Vec<NetworkDevice>,
}

/// A client device known to the router.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkDevice {
    pub mac: String,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub ip_addr: Option<String>,
    #[serde(default)]
    pub is_online: bool,
    #[serde(default)]
    pub is_wireless: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Mesh ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct MeshNodeList {
    #[serde(default)]
    pub nodes: Vec<MeshNode>,
}

/// A mesh node (the router itself or a satellite).
///
/// Rates are reported in kbit/s.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshNode {
    pub name: String,
    #[serde(default)]
    pub band: String,
    #[serde(default)]
    pub connected_devices: u32,
    #[serde(default)]
    pub current_rate_rx: f64,
    #[serde(default)]
    pub current_rate_tx: f64,
    #[serde(default)]
    pub network_status: String,
    #[serde(default)]
    pub node_id: i32,
    #[serde(default)]
    pub node_status: String,
    #[serde(default)]
    pub parent_node_id: i32,
    #[serde(default)]
    pub signalstrength: i32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Wifi ─────────────────────────────────────────────────────────────

/// The full wifi profile list, read and written as one unit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WifiSettings {
    #[serde(default)]
    pub profiles: Vec<WifiProfile>,
}

/// One wifi network profile. The router models each band as a radio entry;
/// the first entry carries the settings shared by the profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WifiProfile {
    #[serde(default)]
    pub radio_list: Vec<WifiRadio>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WifiProfile {
    pub fn primary_radio(&self) -> Option<&WifiRadio> {
        self.radio_list.first()
    }

    pub fn primary_radio_mut(&mut self) -> Option<&mut WifiRadio> {
        self.radio_list.first_mut()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WifiRadio {
    pub ssid: String,
    #[serde(default)]
    pub enable: bool,
    #[serde(default)]
    pub enable_client_isolation: bool,
    #[serde(default)]
    pub hide_ssid: bool,
    #[serde(default)]
    pub mac_filter: MacFilter,
    #[serde(default)]
    pub schedule: WifiSchedule,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MacFilter {
    /// Number or string depending on firmware; `null` when unset.
    #[serde(default)]
    pub profile_id: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WifiSchedule {
    #[serde(default)]
    pub enable: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Traffic ──────────────────────────────────────────────────────────

/// Aggregation window for `SYNO.Core.NGFW.Traffic`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrafficWindow {
    Live,
    Day,
    Week,
    Month,
}

impl TrafficWindow {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }
}
