// ── State tree value types ──
//
// Leaf values, their metadata, and the object schema that gates writes.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;

/// A typed leaf value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl StateValue {
    /// Map a loosely typed router field onto a leaf value. Arrays and
    /// objects are kept as their JSON text.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(*b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Self::Null, Self::Number),
            serde_json::Value::String(s) => Self::Text(s.clone()),
            other => Self::Text(other.to_string()),
        }
    }

    /// Parse operator input: `true`/`false`, `null`, finite numbers, and
    /// anything else as text.
    pub fn parse_loose(input: &str) -> Self {
        match input {
            "true" => Self::Bool(true),
            "false" => Self::Bool(false),
            "null" => Self::Null,
            _ => match input.parse::<f64>() {
                Ok(n) if n.is_finite() => Self::Number(n),
                _ => Self::Text(input.to_owned()),
            },
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for StateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for StateValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f64> for StateValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<u32> for StateValue {
    fn from(v: u32) -> Self {
        Self::Number(f64::from(v))
    }
}

impl From<i32> for StateValue {
    fn from(v: i32) -> Self {
        Self::Number(f64::from(v))
    }
}

impl From<&str> for StateValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for StateValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// A leaf value with its metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct State {
    pub val: StateValue,
    /// `true` when the value reflects the router, `false` for a pending
    /// operator command.
    pub ack: bool,
    /// Last write.
    pub ts: DateTime<Utc>,
    /// Last time the value actually changed.
    pub lc: DateTime<Utc>,
}

/// A state change notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateChange {
    pub path: String,
    pub state: State,
}

// ── Object schema ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ObjectKind {
    /// Grouping node (`mesh.<node>`, `wifi.<ssid>`, `router`, ...).
    Channel,
    /// Leaf holding a value.
    State,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ValueType {
    Boolean,
    Number,
    String,
    Mixed,
}

impl ValueType {
    /// Whether `value` may be stored under this type. `Null` always fits.
    pub fn accepts(self, value: &StateValue) -> bool {
        match (self, value) {
            (_, StateValue::Null)
            | (Self::Mixed, _)
            | (Self::Boolean, StateValue::Bool(_))
            | (Self::Number, StateValue::Number(_))
            | (Self::String, StateValue::Text(_)) => true,
            _ => false,
        }
    }
}

/// Definition of a store object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectSchema {
    pub kind: ObjectKind,
    /// Human-readable name.
    pub name: String,
    pub role: String,
    pub value_type: ValueType,
    pub read: bool,
    pub write: bool,
    pub unit: Option<String>,
}

impl ObjectSchema {
    pub fn channel(name: impl Into<String>) -> Self {
        Self {
            kind: ObjectKind::Channel,
            name: name.into(),
            role: String::new(),
            value_type: ValueType::Mixed,
            read: true,
            write: false,
            unit: None,
        }
    }
}
