// ── State tree ──
//
// Hierarchical, typed, acknowledged state entries mirrored from the router.

mod tree;
mod value;

pub use tree::{CommandQueue, PathPattern, StateTree, Subscription, TreeEntry};
pub use value::{ObjectKind, ObjectSchema, State, StateChange, StateValue, ValueType};
