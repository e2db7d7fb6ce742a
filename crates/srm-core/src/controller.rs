// ── Controller ──
//
// Connection lifecycle for one router: authenticate, poll, detect session
// loss, back off, re-authenticate. A single worker task owns the session,
// the timer slot, and the write gate, and consumes timer fires and store
// change events one at a time, so a poll cycle never overlaps another
// cycle or a write-back.

use std::sync::Arc;

use strum::Display;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::catalog::{self, INFO_CONNECTION};
use crate::config::BridgeConfig;
use crate::error::CoreError;
use crate::mirror;
use crate::scheduler::{TimerKind, Timers, WriteGate};
use crate::session::{Connector, RouterSession, SessionTarget};
use crate::store::{CommandQueue, StateChange, StateTree};
use crate::write_back::{self, Outcome, WifiWrite};

// ── ControllerState ──────────────────────────────────────────────

/// Lifecycle state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ControllerState {
    /// Not connected and not retrying (startup, fatal error, rejected login).
    Disconnected,
    Connecting,
    Polling,
    /// Waiting for the reconnect timer.
    Backoff,
    /// Shut down. Terminal.
    Stopping,
}

// ── Controller ───────────────────────────────────────────────────

/// Handle to a running controller.
///
/// Cheaply cloneable. Dropping every handle does not stop the worker;
/// call [`shutdown()`](Self::shutdown).
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

/// State shared between the handle and the worker.
struct Shared {
    store: Arc<StateTree>,
    state: watch::Sender<ControllerState>,
    cancel: CancellationToken,
}

impl Controller {
    /// Start the worker task. Must be called within a tokio runtime.
    ///
    /// The worker resets `info.connection`, creates the static objects,
    /// validates `config`, and connects.
    pub fn spawn<C: Connector>(config: BridgeConfig, connector: C, store: Arc<StateTree>) -> Self {
        let (state, _) = watch::channel(ControllerState::Disconnected);
        let shared = Arc::new(Shared {
            store,
            state,
            cancel: CancellationToken::new(),
        });

        let worker = Worker {
            config,
            connector,
            shared: Arc::clone(&shared),
            session: None,
            timers: Timers::new(),
            gate: WriteGate::new(),
            changes: None,
            halted: false,
            reconnects: 0,
        };
        let handle = tokio::spawn(worker.run());

        Self {
            inner: Arc::new(ControllerInner {
                shared,
                worker: Mutex::new(Some(handle)),
            }),
        }
    }

    pub fn store(&self) -> &Arc<StateTree> {
        &self.inner.shared.store
    }

    pub fn state(&self) -> ControllerState {
        *self.inner.shared.state.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ControllerState> {
        self.inner.shared.state.subscribe()
    }

    /// Stop the worker and wait for it to finish.
    ///
    /// Cancels timers and in-flight work, logs out (bounded by the connect
    /// timeout), and clears `info.connection`. Always completes. Overlapping
    /// calls all return once teardown is done; later calls return
    /// immediately.
    pub async fn shutdown(&self) {
        let shared = &self.inner.shared;
        shared.cancel.cancel();
        // Held across the join so concurrent callers queue behind teardown.
        let mut worker = self.inner.worker.lock().await;
        let Some(handle) = worker.as_mut() else {
            return;
        };
        let result = handle.await;
        *worker = None;
        if let Err(e) = result {
            error!(error = %e, "controller worker ended abnormally");
            shared.state.send_replace(ControllerState::Stopping);
            if let Err(e) = shared.store.write(INFO_CONNECTION, false, true) {
                warn!(error = %e, "failed to clear connection indicator");
            }
        }
    }
}

/// Connect, run one poll cycle, and log out.
///
/// Used for one-shot snapshots; shares the mirroring code with the
/// controller but none of its lifecycle.
pub async fn poll_once<C: Connector>(
    config: &BridgeConfig,
    connector: &C,
    store: &StateTree,
) -> Result<(), CoreError> {
    catalog::ensure_static_objects(store);
    let target = SessionTarget::from_config(config)?;
    let session = authenticate(connector, &target, config).await?;
    store.write(INFO_CONNECTION, true, true)?;

    let result = mirror::run_cycle(&session, store).await;
    if let Err(e) = session.logout().await {
        warn!(error = %e, "logout failed (non-fatal)");
    }
    store.write(INFO_CONNECTION, false, true)?;
    result
}

async fn authenticate<C: Connector>(
    connector: &C,
    target: &SessionTarget,
    config: &BridgeConfig,
) -> Result<C::Session, CoreError> {
    tokio::time::timeout(config.connect_timeout, connector.authenticate(target))
        .await
        .unwrap_or_else(|_| {
            Err(CoreError::Timeout {
                timeout_ms: u64::try_from(config.connect_timeout.as_millis()).unwrap_or(u64::MAX),
            })
        })
}

// ── Worker ───────────────────────────────────────────────────────

enum Event {
    Timer(TimerKind),
    QuietElapsed,
    Change(StateChange),
}

struct Worker<C: Connector> {
    config: BridgeConfig,
    connector: C,
    shared: Arc<Shared>,
    session: Option<C::Session>,
    timers: Timers,
    gate: WriteGate,
    /// Unacknowledged `wifi.*` writes, queued from the first successful connect.
    changes: Option<CommandQueue>,
    /// Set by a failed poll cycle; cleared by a successful connect.
    halted: bool,
    reconnects: u32,
}

impl<C: Connector> Worker<C> {
    async fn run(mut self) {
        let cancel = self.shared.cancel.clone();
        catalog::ensure_static_objects(&self.shared.store);
        self.set_connection(false);

        match self.config.clone().validated() {
            Ok(config) => {
                self.config = config;
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => {}
                    () = self.connect() => {}
                }
            }
            Err(e) => error!(error = %e, "invalid configuration, not connecting"),
        }

        while !cancel.is_cancelled() {
            let event = tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                kind = self.timers.fired() => Event::Timer(kind),
                () = self.gate.quiet_elapsed() => Event::QuietElapsed,
                Some(change) = next_change(&mut self.changes) => Event::Change(change),
            };
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                () = self.dispatch(event) => {}
            }
        }

        self.teardown().await;
    }

    async fn dispatch(&mut self, event: Event) {
        match event {
            Event::Timer(TimerKind::Poll) => self.on_poll_tick().await,
            Event::Timer(TimerKind::Reconnect) => self.connect().await,
            Event::QuietElapsed => debug!("write settle window over"),
            Event::Change(change) => self.handle_write_back(&change).await,
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────

    async fn connect(&mut self) {
        self.session = None;
        self.set_state(ControllerState::Connecting);

        let result = match SessionTarget::from_config(&self.config) {
            Ok(target) => {
                info!(url = %target.base_url, attempt = self.reconnects + 1, "connecting to router");
                authenticate(&self.connector, &target, &self.config).await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(session) => {
                self.session = Some(session);
                self.halted = false;
                self.reconnects = 0;
                self.set_connection(true);
                if self.changes.is_none() {
                    self.changes = Some(self.shared.store.commands("wifi.*"));
                }
                self.set_state(ControllerState::Polling);
                info!(host = %self.config.host, "connected to router");
                self.start_polling().await;
            }
            Err(e) if self.config.retry_policy.should_retry(&e) => {
                warn!(
                    error = %e,
                    retry_in_secs = self.config.reconnect_delay.as_secs(),
                    "connection failed, will retry"
                );
                self.schedule_reconnect();
            }
            Err(e) => {
                error!(error = %e, policy = %self.config.retry_policy, "connection failed, not retrying");
                self.timers.cancel();
                self.set_connection(false);
                self.set_state(ControllerState::Disconnected);
            }
        }
    }

    fn schedule_reconnect(&mut self) {
        self.session = None;
        self.reconnects += 1;
        self.set_connection(false);
        self.set_state(ControllerState::Backoff);
        self.timers.arm_reconnect(self.config.reconnect_delay);
        info!(
            attempt = self.reconnects,
            delay_secs = self.config.reconnect_delay.as_secs(),
            "reconnect scheduled"
        );
    }

    async fn start_polling(&mut self) {
        self.timers.cancel();
        if self.shared.cancel.is_cancelled() || self.halted {
            return;
        }
        self.run_poll_cycle().await;
        if !self.halted {
            self.timers.arm_poll(self.config.interval);
            debug!(interval_secs = self.config.interval.as_secs(), "poll timer armed");
        }
    }

    async fn on_poll_tick(&mut self) {
        if self.gate.take_skip() {
            debug!("poll tick skipped, wifi write settling");
            return;
        }
        self.run_poll_cycle().await;
    }

    async fn run_poll_cycle(&mut self) {
        if self.halted {
            return;
        }
        let result = match self.session.as_ref() {
            Some(session) => {
                info!(host = %self.config.host, "polling router");
                mirror::run_cycle(session, &self.shared.store).await
            }
            None => Err(CoreError::NotConnected),
        };

        match result {
            Ok(()) => debug!("poll cycle complete"),
            Err(e) if e.is_not_connected() => {
                error!(
                    retry_in_secs = self.config.reconnect_delay.as_secs(),
                    "router session lost, reconnecting"
                );
                self.halted = true;
                self.schedule_reconnect();
            }
            Err(e) => {
                error!(error = %e, "poll cycle failed, polling halted");
                self.halted = true;
                self.timers.cancel();
                self.set_connection(false);
                self.set_state(ControllerState::Disconnected);
            }
        }
    }

    async fn handle_write_back(&mut self, change: &StateChange) {
        let Some(write) = WifiWrite::parse(change) else {
            debug!(path = %change.path, ack = change.state.ack, "change ignored");
            return;
        };
        let Some(permit) = self.gate.try_acquire() else {
            info!(path = %write.path, "wifi write already in progress, change ignored");
            return;
        };
        let Some(session) = self.session.as_ref() else {
            warn!(path = %write.path, "no router session, wifi write dropped");
            return;
        };

        match write_back::apply(session, &self.shared.store, &write).await {
            Ok(Outcome::Pushed) => {
                info!(path = %write.path, value = write.value, "wifi setting changed");
                self.gate.hold_quiet(permit, self.config.write_settle);
            }
            Ok(Outcome::Unchanged) => {
                debug!(path = %write.path, "wifi setting already has this value");
            }
            Ok(Outcome::NoProfile) => {
                warn!(ssid = %write.ssid, "no wifi profile with this name");
            }
            Err(e) => warn!(path = %write.path, error = %e, "wifi write failed"),
        }
        debug!(held = self.gate.is_held(), "write gate");
    }

    async fn teardown(&mut self) {
        self.timers.cancel();
        self.set_state(ControllerState::Stopping);
        if let Some(session) = self.session.take() {
            match tokio::time::timeout(self.config.connect_timeout, session.logout()).await {
                Ok(Ok(())) => debug!("logged out"),
                Ok(Err(e)) => warn!(error = %e, "logout failed (non-fatal)"),
                Err(_) => warn!("logout timed out"),
            }
        }
        self.set_connection(false);
        info!("controller stopped");
    }

    // ── Helpers ──────────────────────────────────────────────────

    /// `Stopping` is terminal.
    fn set_state(&self, next: ControllerState) {
        self.shared.state.send_if_modified(|current| {
            if *current == next || *current == ControllerState::Stopping {
                return false;
            }
            debug!(from = %current, to = %next, armed = ?self.timers.armed(), "state change");
            *current = next;
            true
        });
    }

    fn set_connection(&self, connected: bool) {
        if let Err(e) = self.shared.store.write(INFO_CONNECTION, connected, true) {
            warn!(error = %e, "failed to update connection indicator");
        }
    }
}

async fn next_change(changes: &mut Option<CommandQueue>) -> Option<StateChange> {
    match changes {
        Some(sub) => sub.recv().await,
        None => std::future::pending().await,
    }
}
