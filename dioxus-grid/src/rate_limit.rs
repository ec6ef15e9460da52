//! Debounce and throttle primitives.
//!
//! The debouncer is a generation counter: every trigger invalidates all
//! earlier pending invocations, so a burst of k calls within the quiet
//! period collapses to exactly one invocation carrying the last call's
//! state. Consumers hold the ticket's generation and can re-check it when a
//! slow async result arrives, which also guards against stale responses
//! overwriting newer ones.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};

#[derive(Debug, Clone)]
pub struct Debouncer {
    wait: Duration,
    generation: Arc<AtomicU64>,
}

impl Debouncer {
    pub fn new(wait: Duration) -> Self {
        Self {
            wait,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Starts a new debounce window, superseding all earlier tickets.
    pub fn trigger(&self) -> DebounceTicket {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        DebounceTicket {
            wait: self.wait,
            generation,
            counter: self.generation.clone(),
        }
    }

    /// True while `generation` is still the newest trigger.
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Invalidates any pending ticket without starting a new window.
    pub fn cancel_pending(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

/// Outcome of a single [`Debouncer::trigger`] call.
#[derive(Debug)]
pub struct DebounceTicket {
    wait: Duration,
    generation: u64,
    counter: Arc<AtomicU64>,
}

impl DebounceTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Waits out the quiet period, then reports whether this ticket is still
    /// the newest trigger. Earlier tickets resolve to `false` and their
    /// callers simply drop the work.
    pub async fn settle(self) -> bool {
        sleep(self.wait).await;
        self.counter.load(Ordering::SeqCst) == self.generation
    }
}

/// Time gate for high-frequency events: [`ready`](Self::ready) returns true
/// at most once per interval.
#[derive(Debug)]
pub struct Throttle {
    interval: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    pub fn ready(&mut self) -> bool {
        let now = Instant::now();
        match self.last {
            Some(last) if now.duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn only_the_last_trigger_settles() {
        let debouncer = Debouncer::new(Duration::from_millis(300));

        let first = debouncer.trigger();
        let second = debouncer.trigger();
        let third = debouncer.trigger();

        assert!(!first.settle().await);
        assert!(!second.settle().await);
        assert!(third.settle().await);
    }

    #[tokio::test(start_paused = true)]
    async fn trigger_after_settle_forms_a_new_window() {
        let debouncer = Debouncer::new(Duration::from_millis(100));

        assert!(debouncer.trigger().settle().await);
        assert!(debouncer.trigger().settle().await);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_pending_invalidates_open_tickets() {
        let debouncer = Debouncer::new(Duration::from_millis(100));
        let ticket = debouncer.trigger();
        debouncer.cancel_pending();
        assert!(!ticket.settle().await);
    }

    #[tokio::test(start_paused = true)]
    async fn generation_check_detects_stale_results() {
        let debouncer = Debouncer::new(Duration::from_millis(100));
        let stale = debouncer.trigger().generation();
        let fresh = debouncer.trigger().generation();

        assert!(!debouncer.is_current(stale));
        assert!(debouncer.is_current(fresh));
    }

    #[tokio::test(start_paused = true)]
    async fn throttle_gates_within_interval() {
        let mut throttle = Throttle::new(Duration::from_millis(50));

        assert!(throttle.ready());
        assert!(!throttle.ready());

        tokio::time::advance(Duration::from_millis(60)).await;
        assert!(throttle.ready());

        throttle.reset();
        assert!(throttle.ready());
    }
}
