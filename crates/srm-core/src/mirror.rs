// ── Poll cycle mirroring ──
//
// One read-and-mirror pass: connection status, devices, mesh nodes, wifi
// profiles, live traffic. Each category maps router fields onto store
// leaves through a field table; mesh and wifi sub-trees are created from
// the catalog before their first write.

use serde::Serialize;
use srm_api::{
    ConnectionStatus, MeshNode, NetworkDevice, TrafficWindow, WifiProfile, WifiRadio,
};
use tracing::{debug, trace};

use crate::catalog;
use crate::error::CoreError;
use crate::sanitize::sanitize_segment;
use crate::session::RouterSession;
use crate::store::{StateTree, StateValue};

/// Leaf id plus the accessor that produces its value.
type Field<T> = (&'static str, fn(&T) -> StateValue);

const ROUTER_FIELDS: &[Field<ConnectionStatus>] = &[
    ("IPV4_status", |s| s.ipv4.conn_status.as_str().into()),
    ("IPV4_IP", |s| s.ipv4.ip.as_str().into()),
    ("IPV6_status", |s| s.ipv6.conn_status.as_str().into()),
    ("IPV6_IP", |s| s.ipv6.ip.as_str().into()),
];

/// Device list leaves and the filter each one applies to the full list.
const DEVICE_LISTS: &[(&str, fn(&NetworkDevice) -> bool)] = &[
    ("all", |_| true),
    ("online", |d| d.is_online),
    ("online_wifi", |d| d.is_online && d.is_wireless),
    ("online_ethernet", |d| d.is_online && !d.is_wireless),
];

/// Rates arrive in kbit/s and are stored in Mbit/s.
const MESH_FIELDS: &[Field<MeshNode>] = &[
    ("band", |n| n.band.as_str().into()),
    ("connected_devices", |n| n.connected_devices.into()),
    ("current_rate_rx", |n| (n.current_rate_rx / 1000.0).into()),
    ("current_rate_tx", |n| (n.current_rate_tx / 1000.0).into()),
    ("network_status", |n| n.network_status.as_str().into()),
    ("node_id", |n| n.node_id.into()),
    ("node_status", |n| n.node_status.as_str().into()),
    ("parent_node_id", |n| n.parent_node_id.into()),
    ("signal_strength", |n| n.signalstrength.into()),
];

/// Read from the profile's primary radio.
const WIFI_FIELDS: &[Field<WifiRadio>] = &[
    ("enable", |r| r.enable.into()),
    ("enable_client_isolation", |r| r.enable_client_isolation.into()),
    ("hide_ssid", |r| r.hide_ssid.into()),
    ("mac_filter", |r| StateValue::from_json(&r.mac_filter.profile_id)),
    ("schedule_enable", |r| r.schedule.enable.into()),
];

/// Run one poll cycle against `session`, writing acked values to `store`.
///
/// Stops at the first failing call; values written before it stay.
pub async fn run_cycle<S: RouterSession>(session: &S, store: &StateTree) -> Result<(), CoreError> {
    let status = session.connection_status().await?;
    trace!(?status, "connection status");
    write_fields(store, "router", &status, ROUTER_FIELDS)?;

    let devices = session.devices().await?;
    debug!(count = devices.len(), "devices fetched");
    mirror_devices(store, &devices)?;

    let nodes = session.mesh_nodes().await?;
    debug!(count = nodes.len(), "mesh nodes fetched");
    store.write("devices.mesh", to_json(&nodes)?, true)?;
    mirror_mesh(store, &nodes)?;

    let wifi = session.wifi_settings().await?;
    debug!(count = wifi.profiles.len(), "wifi profiles fetched");
    mirror_wifi(store, wifi.profiles.iter().filter_map(WifiProfile::primary_radio))?;

    let live = session.traffic(TrafficWindow::Live).await?;
    store.write("traffic.live", to_json(&live)?, true)?;

    Ok(())
}

fn write_fields<T>(
    store: &StateTree,
    base: &str,
    source: &T,
    fields: &[Field<T>],
) -> Result<(), CoreError> {
    for (id, value) in fields {
        store.write(&format!("{base}.{id}"), value(source), true)?;
    }
    Ok(())
}

fn mirror_devices(store: &StateTree, devices: &[NetworkDevice]) -> Result<(), CoreError> {
    for (id, keep) in DEVICE_LISTS {
        let selected: Vec<&NetworkDevice> = devices.iter().filter(|d| keep(d)).collect();
        store.write(&format!("devices.{id}"), to_json(&selected)?, true)?;
    }
    Ok(())
}

fn mirror_mesh(store: &StateTree, nodes: &[MeshNode]) -> Result<(), CoreError> {
    for node in nodes {
        let base = format!("mesh.{}", sanitize_segment(&node.name));
        catalog::ensure_subtree(store, &base, &node.name, catalog::MESH);
        write_fields(store, &base, node, MESH_FIELDS)?;
    }
    Ok(())
}

fn mirror_wifi<'a>(
    store: &StateTree,
    radios: impl Iterator<Item = &'a WifiRadio>,
) -> Result<(), CoreError> {
    for radio in radios {
        let base = format!("wifi.{}", sanitize_segment(&radio.ssid));
        catalog::ensure_subtree(store, &base, &radio.ssid, catalog::WIFI);
        write_fields(store, &base, radio, WIFI_FIELDS)?;
    }
    Ok(())
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, CoreError> {
    serde_json::to_string(value)
        .map_err(|e| CoreError::Internal(format!("failed to encode state value: {e}")))
}
