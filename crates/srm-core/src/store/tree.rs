// ── Hierarchical state tree ──
//
// Thread-safe storage for objects and their leaf states, keyed by
// dot-separated paths. Every write is broadcast to subscribers; a
// subscription filters by path pattern. Unacknowledged writes are also
// queued for the one command consumer, which never loses them to lag.

use std::sync::Mutex;

use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::Serialize;
use tokio::sync::{broadcast, mpsc};
use tokio::sync::broadcast::error::RecvError;
use tokio_stream::Stream;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{trace, warn};

use super::value::{ObjectKind, ObjectSchema, State, StateChange, StateValue};
use crate::error::CoreError;

const CHANGE_CHANNEL_SIZE: usize = 256;

// ── Path patterns ────────────────────────────────────────────────────

/// Subscription pattern: an exact path, or a prefix ending in `*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    All,
    Prefix(String),
    Exact(String),
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Self {
        match pattern.strip_suffix('*') {
            Some("") => Self::All,
            Some(prefix) => Self::Prefix(prefix.to_owned()),
            None => Self::Exact(pattern.to_owned()),
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::All => true,
            Self::Prefix(prefix) => path.starts_with(prefix.as_str()),
            Self::Exact(exact) => path == exact,
        }
    }
}

// ── Subscription ─────────────────────────────────────────────────────

/// Receives state changes whose path matches a pattern.
pub struct Subscription {
    pattern: PathPattern,
    rx: broadcast::Receiver<StateChange>,
}

impl Subscription {
    /// Next matching change. `None` once the tree is gone.
    ///
    /// Cancel-safe: a change is only consumed when it is returned.
    pub async fn recv(&mut self) -> Option<StateChange> {
        loop {
            match self.rx.recv().await {
                Ok(change) if self.pattern.matches(&change.path) => return Some(change),
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "state change subscriber lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Convert into a `Stream` of matching changes. Lagged gaps are skipped.
    pub fn into_stream(self) -> impl Stream<Item = StateChange> + Send + Unpin + 'static {
        let pattern = self.pattern;
        BroadcastStream::new(self.rx)
            .filter_map(move |change| change.ok().filter(|c| pattern.matches(&c.path)))
    }
}

// ── CommandQueue ─────────────────────────────────────────────────────

/// Unacknowledged writes whose path matches a pattern, in write order.
///
/// Unbounded and separate from the broadcast ring, so a burst of mirror
/// writes cannot push an operator command out.
pub struct CommandQueue {
    pattern: PathPattern,
    rx: mpsc::UnboundedReceiver<StateChange>,
}

impl CommandQueue {
    /// Next matching command. `None` once the tree is gone or another
    /// queue replaced this one. Cancel-safe.
    pub async fn recv(&mut self) -> Option<StateChange> {
        loop {
            let change = self.rx.recv().await?;
            if self.pattern.matches(&change.path) {
                return Some(change);
            }
        }
    }
}

// ── StateTree ────────────────────────────────────────────────────────

/// One row of a tree listing.
#[derive(Debug, Clone, Serialize)]
pub struct TreeEntry {
    pub path: String,
    pub schema: ObjectSchema,
    pub state: Option<State>,
}

/// In-process hierarchical key/value store.
pub struct StateTree {
    objects: DashMap<String, ObjectSchema>,
    states: DashMap<String, State>,
    changes: broadcast::Sender<StateChange>,
    commands: Mutex<Option<mpsc::UnboundedSender<StateChange>>>,
}

impl Default for StateTree {
    fn default() -> Self {
        Self::new()
    }
}

impl StateTree {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_SIZE);
        Self {
            objects: DashMap::new(),
            states: DashMap::new(),
            changes,
            commands: Mutex::new(None),
        }
    }

    /// Create the object at `path` unless it already exists.
    /// Returns `true` if it was created.
    pub fn ensure_exists(&self, path: &str, schema: ObjectSchema) -> bool {
        match self.objects.entry(path.to_owned()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                trace!(path, kind = %schema.kind, "object created");
                slot.insert(schema);
                true
            }
        }
    }

    /// Write a leaf value and notify subscribers.
    ///
    /// Fails for paths without a state object and for values the object's
    /// type does not accept. `lc` only moves when the value changes.
    pub fn write(
        &self,
        path: &str,
        val: impl Into<StateValue>,
        ack: bool,
    ) -> Result<State, CoreError> {
        let val = val.into();
        {
            let schema = self
                .objects
                .get(path)
                .filter(|schema| schema.kind == ObjectKind::State)
                .ok_or_else(|| CoreError::UnknownState {
                    path: path.to_owned(),
                })?;
            if !schema.value_type.accepts(&val) {
                return Err(CoreError::ValidationFailed {
                    message: format!("{path} expects a {} value, got {val}", schema.value_type),
                });
            }
        }

        let now = Utc::now();
        let state = match self.states.entry(path.to_owned()) {
            Entry::Occupied(mut slot) => {
                let prev = slot.get_mut();
                let lc = if prev.val == val { prev.lc } else { now };
                *prev = State {
                    val,
                    ack,
                    ts: now,
                    lc,
                };
                prev.clone()
            }
            Entry::Vacant(slot) => slot
                .insert(State {
                    val,
                    ack,
                    ts: now,
                    lc: now,
                })
                .value()
                .clone(),
        };

        let change = StateChange {
            path: path.to_owned(),
            state: state.clone(),
        };
        if !ack {
            let mut commands = self.commands.lock().expect("command queue lock poisoned");
            let closed = commands
                .as_ref()
                .is_some_and(|tx| tx.send(change.clone()).is_err());
            if closed {
                *commands = None;
            }
        }
        // No subscribers is fine.
        let _ = self.changes.send(change);
        Ok(state)
    }

    pub fn get(&self, path: &str) -> Option<State> {
        self.states.get(path).map(|s| s.value().clone())
    }

    pub fn schema(&self, path: &str) -> Option<ObjectSchema> {
        self.objects.get(path).map(|s| s.value().clone())
    }

    /// Subscribe to changes matching `pattern` (`wifi.*`, `*`, or an exact path).
    pub fn subscribe(&self, pattern: &str) -> Subscription {
        Subscription {
            pattern: PathPattern::parse(pattern),
            rx: self.changes.subscribe(),
        }
    }

    /// Queue of unacknowledged writes matching `pattern`.
    ///
    /// There is one command consumer per tree: taking a new queue closes
    /// the previous one. Writes made before the call are not delivered.
    pub fn commands(&self, pattern: &str) -> CommandQueue {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.commands.lock().expect("command queue lock poisoned") = Some(tx);
        CommandQueue {
            pattern: PathPattern::parse(pattern),
            rx,
        }
    }

    /// All objects matching `pattern`, sorted by path.
    pub fn entries(&self, pattern: &str) -> Vec<TreeEntry> {
        let pattern = PathPattern::parse(pattern);
        let mut entries: Vec<TreeEntry> = self
            .objects
            .iter()
            .filter(|obj| pattern.matches(obj.key()))
            .map(|obj| TreeEntry {
                path: obj.key().clone(),
                schema: obj.value().clone(),
                state: self.get(obj.key()),
            })
            .collect();
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        entries
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }
}
