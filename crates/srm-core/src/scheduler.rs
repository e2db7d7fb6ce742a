// ── Controller timers and write gate ──
//
// `Timers` is one slot that holds either the recurring poll timer or the
// one-shot reconnect timer, never both. `WriteGate` hands out at most one
// `WritePermit`; the permit is released when dropped, and after a
// successful push it is parked for the settle window.

use std::future::pending;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::time::{Instant, Interval, MissedTickBehavior, Sleep, interval_at, sleep};

// ── Timers ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TimerKind {
    Poll,
    Reconnect,
}

enum Slot {
    Idle,
    Poll(Interval),
    Reconnect(Pin<Box<Sleep>>),
}

pub(crate) struct Timers {
    slot: Slot,
}

impl Timers {
    pub(crate) fn new() -> Self {
        Self { slot: Slot::Idle }
    }

    /// Arm the recurring poll timer. The first tick lands one `period` from now.
    pub(crate) fn arm_poll(&mut self, period: Duration) {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        self.slot = Slot::Poll(interval);
    }

    /// Arm the one-shot reconnect timer, replacing whatever was armed.
    pub(crate) fn arm_reconnect(&mut self, delay: Duration) {
        self.slot = Slot::Reconnect(Box::pin(sleep(delay)));
    }

    pub(crate) fn cancel(&mut self) {
        self.slot = Slot::Idle;
    }

    pub(crate) fn armed(&self) -> Option<TimerKind> {
        match self.slot {
            Slot::Idle => None,
            Slot::Poll(_) => Some(TimerKind::Poll),
            Slot::Reconnect(_) => Some(TimerKind::Reconnect),
        }
    }

    /// Resolves when the armed timer fires; pending while idle.
    /// A fired reconnect timer leaves the slot idle.
    ///
    /// Cancel-safe.
    pub(crate) async fn fired(&mut self) -> TimerKind {
        match &mut self.slot {
            Slot::Idle => pending().await,
            Slot::Poll(interval) => {
                interval.tick().await;
                TimerKind::Poll
            }
            Slot::Reconnect(delay) => {
                delay.as_mut().await;
                self.slot = Slot::Idle;
                TimerKind::Reconnect
            }
        }
    }
}

// ── Write gate ───────────────────────────────────────────────────────

/// Proof that a write-back is in progress. Dropping it opens the gate.
#[derive(Debug)]
pub(crate) struct WritePermit {
    busy: Arc<AtomicBool>,
}

impl Drop for WritePermit {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

struct Quiet {
    _permit: WritePermit,
    deadline: Pin<Box<Sleep>>,
}

pub(crate) struct WriteGate {
    busy: Arc<AtomicBool>,
    quiet: Option<Quiet>,
}

impl WriteGate {
    pub(crate) fn new() -> Self {
        Self {
            busy: Arc::new(AtomicBool::new(false)),
            quiet: None,
        }
    }

    pub(crate) fn try_acquire(&self) -> Option<WritePermit> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| WritePermit {
                busy: Arc::clone(&self.busy),
            })
    }

    pub(crate) fn is_held(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Keep `permit` until `window` has passed or a poll tick consumes it.
    pub(crate) fn hold_quiet(&mut self, permit: WritePermit, window: Duration) {
        self.quiet = Some(Quiet {
            _permit: permit,
            deadline: Box::pin(sleep(window)),
        });
    }

    /// A poll tick inside the settle window: skip it once and open the gate.
    pub(crate) fn take_skip(&mut self) -> bool {
        self.quiet.take().is_some()
    }

    /// Resolves when the settle window ends and releases the permit;
    /// pending when no window is open.
    ///
    /// Cancel-safe.
    pub(crate) async fn quiet_elapsed(&mut self) {
        match &mut self.quiet {
            Some(quiet) => quiet.deadline.as_mut().await,
            None => pending().await,
        }
        self.quiet = None;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn poll_timer_first_tick_after_period() {
        let mut timers = Timers::new();
        timers.arm_poll(Duration::from_secs(60));

        let early = tokio::time::timeout(Duration::from_secs(59), timers.fired()).await;
        assert!(early.is_err());
        assert_eq!(timers.fired().await, TimerKind::Poll);
        assert_eq!(timers.armed(), Some(TimerKind::Poll));
    }

    #[tokio::test(start_paused = true)]
    async fn arming_reconnect_replaces_poll() {
        let mut timers = Timers::new();
        timers.arm_poll(Duration::from_secs(10));
        timers.arm_reconnect(Duration::from_secs(60));
        assert_eq!(timers.armed(), Some(TimerKind::Reconnect));

        let start = Instant::now();
        assert_eq!(timers.fired().await, TimerKind::Reconnect);
        assert!(start.elapsed() >= Duration::from_secs(60));
        assert_eq!(timers.armed(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn idle_timers_never_fire() {
        let mut timers = Timers::new();
        timers.arm_reconnect(Duration::from_secs(1));
        timers.cancel();
        let fired = tokio::time::timeout(Duration::from_secs(3600), timers.fired()).await;
        assert!(fired.is_err());
    }

    #[test]
    fn permit_is_exclusive_and_released_on_drop() {
        let gate = WriteGate::new();
        let permit = gate.try_acquire().unwrap();
        assert!(gate.is_held());
        assert!(gate.try_acquire().is_none());
        drop(permit);
        assert!(!gate.is_held());
        assert!(gate.try_acquire().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn quiet_window_releases_after_deadline() {
        let mut gate = WriteGate::new();
        let permit = gate.try_acquire().unwrap();
        gate.hold_quiet(permit, Duration::from_secs(3));
        assert!(gate.is_held());

        gate.quiet_elapsed().await;
        assert!(!gate.is_held());
        assert!(!gate.take_skip());
    }

    #[tokio::test(start_paused = true)]
    async fn skip_consumes_window_once() {
        let mut gate = WriteGate::new();
        let permit = gate.try_acquire().unwrap();
        gate.hold_quiet(permit, Duration::from_secs(3));

        assert!(gate.take_skip());
        assert!(!gate.is_held());
        assert!(!gate.take_skip());
    }
}
