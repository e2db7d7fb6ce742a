// srm-core: Connection lifecycle, polling, and state tree for srm-bridge.

pub mod catalog;
pub mod config;
pub mod controller;
pub mod error;
pub mod ip;
pub mod mirror;
pub mod sanitize;
mod scheduler;
pub mod session;
pub mod store;
mod write_back;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{BridgeConfig, MIN_POLL_INTERVAL, RetryPolicy, TlsVerification};
pub use controller::{Controller, ControllerState, poll_once};
pub use error::CoreError;
pub use ip::is_valid_ipv4;
pub use sanitize::sanitize_segment;
pub use session::{Connector, RouterSession, SessionTarget, SrmConnector, SrmSession};
pub use store::{
    CommandQueue, ObjectKind, ObjectSchema, PathPattern, State, StateChange, StateTree, StateValue,
    Subscription, TreeEntry, ValueType,
};
