// ── Object schema catalog ──
//
// Default object definitions per category. Static categories are created
// at startup; mesh and wifi sub-trees are created per node/profile the
// first time a poll cycle sees them.

use tracing::debug;

use crate::store::{ObjectKind, ObjectSchema, StateTree, ValueType};

/// Definition of one leaf below a category or sub-tree.
#[derive(Debug, Clone, Copy)]
pub struct LeafDef {
    pub id: &'static str,
    pub name: &'static str,
    pub role: &'static str,
    pub value_type: ValueType,
    pub write: bool,
    pub unit: Option<&'static str>,
}

impl LeafDef {
    pub fn schema(&self) -> ObjectSchema {
        ObjectSchema {
            kind: ObjectKind::State,
            name: self.name.to_owned(),
            role: self.role.to_owned(),
            value_type: self.value_type,
            read: true,
            write: self.write,
            unit: self.unit.map(str::to_owned),
        }
    }
}

const fn ro(
    id: &'static str,
    name: &'static str,
    role: &'static str,
    value_type: ValueType,
) -> LeafDef {
    LeafDef {
        id,
        name,
        role,
        value_type,
        write: false,
        unit: None,
    }
}

const fn with_unit(def: LeafDef, unit: &'static str) -> LeafDef {
    LeafDef {
        unit: Some(unit),
        ..def
    }
}

const fn switch(id: &'static str, name: &'static str) -> LeafDef {
    LeafDef {
        id,
        name,
        role: "switch",
        value_type: ValueType::Boolean,
        write: true,
        unit: None,
    }
}

// ── Categories ───────────────────────────────────────────────────────

pub const INFO: &[LeafDef] = &[ro(
    "connection",
    "Connected to router",
    "indicator.connected",
    ValueType::Boolean,
)];

pub const ROUTER: &[LeafDef] = &[
    ro("IPV4_status", "IPv4 connection status", "info.status", ValueType::String),
    ro("IPV4_IP", "IPv4 address", "info.ip", ValueType::String),
    ro("IPV6_status", "IPv6 connection status", "info.status", ValueType::String),
    ro("IPV6_IP", "IPv6 address", "info.ip", ValueType::String),
];

pub const DEVICES: &[LeafDef] = &[
    ro("all", "All known devices", "json", ValueType::String),
    ro("online", "Online devices", "json", ValueType::String),
    ro("online_wifi", "Online wifi devices", "json", ValueType::String),
    ro("online_ethernet", "Online ethernet devices", "json", ValueType::String),
    ro("mesh", "Mesh nodes", "json", ValueType::String),
];

pub const TRAFFIC: &[LeafDef] = &[ro("live", "Live traffic", "json", ValueType::String)];

pub const MESH: &[LeafDef] = &[
    ro("band", "Band", "text", ValueType::String),
    ro("connected_devices", "Connected devices", "value", ValueType::Number),
    with_unit(
        ro("current_rate_rx", "Current RX rate", "value", ValueType::Number),
        "Mbit/s",
    ),
    with_unit(
        ro("current_rate_tx", "Current TX rate", "value", ValueType::Number),
        "Mbit/s",
    ),
    ro("network_status", "Network status", "text", ValueType::String),
    ro("node_id", "Node ID", "value", ValueType::Number),
    ro("node_status", "Node status", "text", ValueType::String),
    ro("parent_node_id", "Parent node ID", "value", ValueType::Number),
    with_unit(
        ro("signal_strength", "Signal strength", "value", ValueType::Number),
        "%",
    ),
];

pub const WIFI: &[LeafDef] = &[
    switch("enable", "Wifi enabled"),
    switch("enable_client_isolation", "Client isolation"),
    switch("hide_ssid", "Hide SSID"),
    ro("mac_filter", "MAC filter profile", "value", ValueType::Mixed),
    switch("schedule_enable", "Schedule enabled"),
];

/// Categories created at startup, with their channel names.
pub const STATIC_CATEGORIES: [(&str, &str, &[LeafDef]); 4] = [
    ("info", "Information", INFO),
    ("router", "Router", ROUTER),
    ("devices", "Devices", DEVICES),
    ("traffic", "Traffic", TRAFFIC),
];

pub const INFO_CONNECTION: &str = "info.connection";

/// Create a channel at `base` and every leaf below it, keeping whatever
/// already exists.
pub fn ensure_subtree(store: &StateTree, base: &str, name: &str, leaves: &[LeafDef]) {
    let mut created = 0usize;
    if store.ensure_exists(base, ObjectSchema::channel(name)) {
        created += 1;
    }
    for leaf in leaves {
        if store.ensure_exists(&format!("{base}.{}", leaf.id), leaf.schema()) {
            created += 1;
        }
    }
    if created > 0 {
        debug!(base, created, "objects created");
    }
}

/// Create the `info`, `router`, `devices`, and `traffic` objects.
pub fn ensure_static_objects(store: &StateTree) {
    for (base, name, leaves) in STATIC_CATEGORIES {
        ensure_subtree(store, base, name, leaves);
    }
}
