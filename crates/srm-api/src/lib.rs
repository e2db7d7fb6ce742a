// srm-api: Async Rust client for the Synology SRM router web API

pub mod auth;
pub mod client;
pub mod error;
pub mod mesh;
pub mod models;
pub mod network;
pub mod transport;
pub mod wifi;

pub use client::SrmClient;
pub use error::Error;
pub use models::{
    ConnectionStatus, IpConnection, MacFilter, MeshNode, NetworkDevice, TrafficWindow,
    WifiProfile, WifiRadio, WifiSchedule, WifiSettings,
};
pub use transport::{TlsMode, TransportConfig};
