//! Trailing-edge debouncer.
//!
//! [`Debouncer::invoke`] collapses a burst of calls into one deferred call
//! carrying the last argument. At most one call is pending at any time: each
//! new invocation aborts the pending timer task and schedules a fresh one.
//! Arguments of superseded calls are dropped, never queued.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Single pending-call slot shared with the timer task.
#[derive(Default)]
struct Slot {
    /// Bumped on every invoke/cancel; a timer only fires if its ticket is current.
    ticket: u64,
    handle: Option<JoinHandle<()>>,
    /// When the current burst began (first invoke since the last fire).
    burst_started: Option<Instant>,
}

/// Wraps a single-argument operation so rapid calls collapse into one.
///
/// Operations taking several values take them as a tuple.
pub struct Debouncer<A> {
    operation: Arc<dyn Fn(A) + Send + Sync>,
    delay: Duration,
    max_wait: Option<Duration>,
    runtime: Handle,
    slot: Arc<Mutex<Slot>>,
}

impl<A> std::fmt::Debug for Debouncer<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debouncer")
            .field("delay", &self.delay)
            .field("max_wait", &self.max_wait)
            .field("pending", &self.is_pending())
            .finish_non_exhaustive()
    }
}

impl<A: Send + 'static> Debouncer<A> {
    /// Bind `operation` with a fixed quiet period. Nothing is scheduled yet.
    ///
    /// Timer tasks are spawned on `runtime`, so `invoke` may be called from
    /// threads outside the runtime (e.g. a stdin reader).
    pub fn new<F>(runtime: Handle, delay: Duration, operation: F) -> Self
    where
        F: Fn(A) + Send + Sync + 'static,
    {
        Self {
            operation: Arc::new(operation),
            delay,
            max_wait: None,
            runtime,
            slot: Arc::new(Mutex::new(Slot::default())),
        }
    }

    /// Cap how long a continuous burst may postpone the call.
    ///
    /// A cap shorter than the delay is raised to the delay.
    pub fn with_max_wait(mut self, max_wait: Option<Duration>) -> Self {
        self.max_wait = max_wait;
        self
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `operation(arg)` for `delay` from now, replacing any pending call.
    ///
    /// Never runs the operation inline, even with a zero delay.
    pub fn invoke(&self, arg: A) {
        let now = Instant::now();
        let mut slot = self.slot.lock();

        if let Some(handle) = slot.handle.take() {
            handle.abort();
            log::trace!("Debouncer: superseded pending call");
        }

        let burst_started = *slot.burst_started.get_or_insert(now);
        let mut deadline = now + self.delay;
        if let Some(max_wait) = self.max_wait {
            deadline = deadline.min(burst_started + max_wait.max(self.delay));
        }

        slot.ticket = slot.ticket.wrapping_add(1);
        let ticket = slot.ticket;
        let slot_ref = Arc::clone(&self.slot);
        let operation = Arc::clone(&self.operation);

        slot.handle = Some(self.runtime.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            {
                let mut slot = slot_ref.lock();
                // A newer invoke or a cancel slipped in between the timer
                // expiring and this task taking the lock.
                if slot.ticket != ticket {
                    return;
                }
                slot.handle = None;
                slot.burst_started = None;
            }
            operation(arg);
        }));
    }

    /// Drop the pending call, if any.
    pub fn cancel(&self) {
        let mut slot = self.slot.lock();
        slot.ticket = slot.ticket.wrapping_add(1);
        slot.burst_started = None;
        if let Some(handle) = slot.handle.take() {
            handle.abort();
            log::trace!("Debouncer: pending call cancelled");
        }
    }
}

impl<A> Debouncer<A> {
    /// Whether a call is scheduled and has not fired yet.
    pub fn is_pending(&self) -> bool {
        self.slot.lock().handle.is_some()
    }
}

impl<A> Drop for Debouncer<A> {
    fn drop(&mut self) {
        if let Some(handle) = self.slot.lock().handle.take() {
            handle.abort();
        }
    }
}
