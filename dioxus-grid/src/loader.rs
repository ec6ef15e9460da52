//! Priority-queued image load scheduling.
//!
//! Three FIFO buckets with strict drain order (high before normal before
//! low) and an in-flight set bounded by a concurrency cap. The queue itself
//! performs no I/O; the caller admits keys, runs the loads, and reports
//! completions.

use std::collections::{HashSet, VecDeque};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LoadPriority {
    High,
    Normal,
    Low,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoaderConfig {
    /// Simultaneous in-flight loads. Exists to avoid saturating the decode
    /// pipeline, not for correctness.
    pub max_concurrent: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self { max_concurrent: 3 }
    }
}

#[derive(Debug, Default)]
pub struct LoadQueue {
    high: VecDeque<String>,
    normal: VecDeque<String>,
    low: VecDeque<String>,
    queued: HashSet<String>,
    in_flight: HashSet<String>,
    /// Keys already promoted by visibility; promotion happens at most once
    /// per key, mirroring a one-shot intersection observer.
    promoted: HashSet<String>,
    config: LoaderConfig,
}

impl LoadQueue {
    pub fn new(config: LoaderConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Queues a key for loading. Enqueueing a key that is already queued or
    /// in flight is a no-op.
    pub fn enqueue(&mut self, key: impl Into<String>, priority: LoadPriority) -> bool {
        let key = key.into();
        if self.queued.contains(&key) || self.in_flight.contains(&key) {
            return false;
        }
        self.queued.insert(key.clone());
        self.bucket_mut(priority).push_back(key);
        true
    }

    /// Moves a queued key into a different bucket (re-enqueued at the back,
    /// keeping FIFO order within the target bucket). An in-flight load is
    /// unaffected.
    pub fn reprioritize(&mut self, key: &str, priority: LoadPriority) -> bool {
        if !self.queued.contains(key) {
            return false;
        }
        let removed = self.remove_from_buckets(key);
        if removed {
            self.bucket_mut(priority).push_back(key.to_string());
        }
        removed
    }

    /// Marks a key as viewport-visible, promoting it to high priority.
    /// Subsequent calls for the same key do nothing.
    pub fn mark_visible(&mut self, key: &str) -> bool {
        if self.promoted.contains(key) {
            return false;
        }
        self.promoted.insert(key.to_string());
        self.reprioritize(key, LoadPriority::High)
    }

    /// Admits queued keys up to the concurrency cap, highest priority first,
    /// FIFO within a bucket. Returned keys are now in flight.
    pub fn admit(&mut self) -> Vec<String> {
        let mut admitted = Vec::new();
        while self.in_flight.len() < self.config.max_concurrent {
            let key = match self.pop_next() {
                Some(key) => key,
                None => break,
            };
            self.queued.remove(&key);
            self.in_flight.insert(key.clone());
            admitted.push(key);
        }
        admitted
    }

    /// Records completion (success or failure) of an in-flight load and
    /// immediately admits the next eligible keys.
    pub fn complete(&mut self, key: &str) -> Vec<String> {
        self.in_flight.remove(key);
        self.admit()
    }

    /// Drops a queued key that has not started loading.
    pub fn cancel(&mut self, key: &str) -> bool {
        if !self.queued.remove(key) {
            return false;
        }
        self.remove_from_buckets(key)
    }

    pub fn in_flight_len(&self) -> usize {
        self.in_flight.len()
    }

    pub fn pending_len(&self) -> usize {
        self.queued.len()
    }

    pub fn is_idle(&self) -> bool {
        self.queued.is_empty() && self.in_flight.is_empty()
    }

    fn bucket_mut(&mut self, priority: LoadPriority) -> &mut VecDeque<String> {
        match priority {
            LoadPriority::High => &mut self.high,
            LoadPriority::Normal => &mut self.normal,
            LoadPriority::Low => &mut self.low,
        }
    }

    fn pop_next(&mut self) -> Option<String> {
        self.high
            .pop_front()
            .or_else(|| self.normal.pop_front())
            .or_else(|| self.low.pop_front())
    }

    fn remove_from_buckets(&mut self, key: &str) -> bool {
        for bucket in [&mut self.high, &mut self.normal, &mut self.low] {
            if let Some(pos) = bucket.iter().position(|queued| queued == key) {
                bucket.remove(pos);
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue(cap: usize) -> LoadQueue {
        LoadQueue::new(LoaderConfig { max_concurrent: cap })
    }

    #[test]
    fn high_drains_before_normal_before_low() {
        // Interleave enqueues across priorities; admission must still be
        // strictly tiered.
        let mut q = queue(2);
        q.enqueue("l1", LoadPriority::Low);
        q.enqueue("h1", LoadPriority::High);
        q.enqueue("n1", LoadPriority::Normal);
        q.enqueue("h2", LoadPriority::High);
        q.enqueue("n2", LoadPriority::Normal);
        q.enqueue("h3", LoadPriority::High);

        let mut started = Vec::new();
        started.extend(q.admit());
        while started.len() < 6 {
            let done = started[started.len() - q.in_flight_len()].clone();
            started.extend(q.complete(&done));
        }

        let first_normal = started.iter().position(|k| k.starts_with('n')).unwrap();
        let last_high = started.iter().rposition(|k| k.starts_with('h')).unwrap();
        let first_low = started.iter().position(|k| k.starts_with('l')).unwrap();
        let last_normal = started.iter().rposition(|k| k.starts_with('n')).unwrap();
        assert!(last_high < first_normal, "start order was {:?}", started);
        assert!(last_normal < first_low, "start order was {:?}", started);
    }

    #[test]
    fn admission_respects_the_concurrency_cap() {
        let mut q = queue(3);
        for i in 0..8 {
            q.enqueue(format!("k{}", i), LoadPriority::Normal);
        }
        assert_eq!(q.admit().len(), 3);
        assert_eq!(q.in_flight_len(), 3);
        // No further admission until something completes.
        assert!(q.admit().is_empty());
        assert_eq!(q.complete("k0").len(), 1);
        assert_eq!(q.in_flight_len(), 3);
    }

    #[test]
    fn fifo_within_a_bucket() {
        let mut q = queue(1);
        q.enqueue("a", LoadPriority::Normal);
        q.enqueue("b", LoadPriority::Normal);
        q.enqueue("c", LoadPriority::Normal);

        assert_eq!(q.admit(), vec!["a".to_string()]);
        assert_eq!(q.complete("a"), vec!["b".to_string()]);
        assert_eq!(q.complete("b"), vec!["c".to_string()]);
    }

    #[test]
    fn duplicate_enqueue_is_a_no_op() {
        let mut q = queue(1);
        assert!(q.enqueue("a", LoadPriority::Low));
        assert!(!q.enqueue("a", LoadPriority::High));
        assert_eq!(q.pending_len(), 1);

        q.admit();
        assert!(!q.enqueue("a", LoadPriority::High));
    }

    #[test]
    fn visibility_promotion_is_at_most_once() {
        let mut q = queue(1);
        q.enqueue("a", LoadPriority::Low);
        q.enqueue("b", LoadPriority::Low);

        assert!(q.mark_visible("b"));
        // The observer is gone after the first promotion.
        assert!(!q.mark_visible("b"));

        assert_eq!(q.admit(), vec!["b".to_string()]);
    }

    #[test]
    fn reprioritize_does_not_touch_in_flight_loads() {
        let mut q = queue(1);
        q.enqueue("a", LoadPriority::Normal);
        q.admit();
        assert!(!q.reprioritize("a", LoadPriority::High));
        assert_eq!(q.in_flight_len(), 1);
    }

    #[test]
    fn cancel_removes_pending_only() {
        let mut q = queue(1);
        q.enqueue("a", LoadPriority::Normal);
        q.enqueue("b", LoadPriority::Normal);
        q.admit();

        assert!(!q.cancel("a"), "in-flight loads cannot be cancelled");
        assert!(q.cancel("b"));
        assert_eq!(q.pending_len(), 0);
    }
}
