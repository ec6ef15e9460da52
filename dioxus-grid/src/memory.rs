//! Image memory cache and memory-pressure monitoring.
//!
//! The cache maps keys to decoded data URLs with LRU + max-age eviction.
//! The monitor periodically samples a platform gauge and, above a pressure
//! threshold, runs registered cleanup callbacks; a platform without a gauge
//! degrades silently.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq)]
pub struct MemoryConfig {
    /// Aggregate cache size cap in bytes.
    pub max_bytes: usize,
    /// Entries untouched for longer than this are dropped on cleanup.
    pub max_age: Duration,
    /// Used/limit ratio above which cleanup callbacks run.
    pub pressure_threshold: f64,
    /// Gauge sampling interval.
    pub sample_interval: Duration,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_bytes: 64 * 1024 * 1024,
            max_age: Duration::from_secs(300),
            pressure_threshold: 0.8,
            sample_interval: Duration::from_secs(30),
        }
    }
}

#[derive(Debug)]
struct CacheEntry {
    data_url: String,
    size: usize,
    last_used: Instant,
}

#[derive(Debug, Default)]
pub struct ImageMemoryCache {
    entries: HashMap<String, CacheEntry>,
    total_bytes: usize,
    config: MemoryConfig,
}

impl ImageMemoryCache {
    pub fn new(config: MemoryConfig) -> Self {
        Self {
            entries: HashMap::new(),
            total_bytes: 0,
            config,
        }
    }

    /// Inserts an entry, replacing any previous value for the key. When the
    /// aggregate size overflows the cap, the cache shrinks to 80% of it,
    /// least-recently-used entries first.
    pub fn insert(&mut self, key: impl Into<String>, data_url: String) {
        let key = key.into();
        let size = data_url.len();
        if let Some(previous) = self.entries.remove(&key) {
            self.total_bytes -= previous.size;
        }
        self.total_bytes += size;
        self.entries.insert(
            key,
            CacheEntry {
                data_url,
                size,
                last_used: Instant::now(),
            },
        );
        if self.total_bytes > self.config.max_bytes {
            self.shrink_to((self.config.max_bytes as f64 * 0.8) as usize);
        }
    }

    /// Fetches an entry, refreshing its recency.
    pub fn get(&mut self, key: &str) -> Option<&str> {
        let entry = self.entries.get_mut(key)?;
        entry.last_used = Instant::now();
        Some(entry.data_url.as_str())
    }

    /// Reads an entry without touching its recency (render paths that must
    /// not mutate).
    pub fn peek(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|entry| entry.data_url.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> bool {
        match self.entries.remove(key) {
            Some(entry) => {
                self.total_bytes -= entry.size;
                true
            }
            None => false,
        }
    }

    /// Age- and size-based eviction; returns the number of dropped entries.
    pub fn cleanup(&mut self) -> usize {
        let now = Instant::now();
        let max_age = self.config.max_age;
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| now.duration_since(entry.last_used) > max_age)
            .map(|(key, _)| key.clone())
            .collect();

        let mut evicted = expired.len();
        for key in expired {
            self.remove(&key);
        }

        if self.total_bytes > self.config.max_bytes {
            evicted += self.shrink_to((self.config.max_bytes as f64 * 0.8) as usize);
        }

        if evicted > 0 {
            log::debug!(
                "image cache cleanup dropped {} entries, {} bytes remain",
                evicted,
                self.total_bytes
            );
        }
        evicted
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.total_bytes = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    fn shrink_to(&mut self, target: usize) -> usize {
        let mut by_age: Vec<(String, Instant)> = self
            .entries
            .iter()
            .map(|(key, entry)| (key.clone(), entry.last_used))
            .collect();
        by_age.sort_by_key(|(_, last_used)| *last_used);

        let mut evicted = 0;
        for (key, _) in by_age {
            if self.total_bytes <= target {
                break;
            }
            self.remove(&key);
            evicted += 1;
        }
        evicted
    }
}

/// Heap-pressure gauge. Returns `None` when the platform exposes nothing;
/// the monitor then skips the sample without complaining.
pub trait MemoryGauge {
    fn used_ratio(&self) -> Option<f64>;
}

/// Handle returned by [`MemoryMonitor::register`]; pass it back to
/// [`MemoryMonitor::unregister`] to remove the callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupHandle(usize);

#[derive(Default)]
pub struct MemoryMonitor {
    callbacks: Vec<(usize, Box<dyn Fn()>)>,
    next_id: usize,
}

impl MemoryMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, callback: impl Fn() + 'static) -> CleanupHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.callbacks.push((id, Box::new(callback)));
        CleanupHandle(id)
    }

    pub fn unregister(&mut self, handle: CleanupHandle) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(id, _)| *id != handle.0);
        self.callbacks.len() != before
    }

    /// Samples the gauge once; runs cleanup when the threshold is exceeded.
    /// Returns whether cleanup ran.
    pub fn tick(&self, gauge: &dyn MemoryGauge, threshold: f64) -> bool {
        match gauge.used_ratio() {
            Some(ratio) if ratio > threshold => {
                log::info!("memory pressure at {:.0}%, running cleanup", ratio * 100.0);
                self.run_cleanup();
                true
            }
            _ => false,
        }
    }

    /// Runs every registered callback. Each call is isolated so a panicking
    /// callback cannot prevent the rest from running.
    pub fn run_cleanup(&self) {
        for (id, callback) in &self.callbacks {
            if catch_unwind(AssertUnwindSafe(callback)).is_err() {
                log::warn!("cleanup callback {} panicked", id);
            }
        }
    }

    pub fn callback_count(&self) -> usize {
        self.callbacks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn small_cache(max_bytes: usize) -> ImageMemoryCache {
        ImageMemoryCache::new(MemoryConfig {
            max_bytes,
            max_age: Duration::from_secs(60),
            ..MemoryConfig::default()
        })
    }

    #[tokio::test(start_paused = true)]
    async fn size_overflow_evicts_least_recently_used_first() {
        let mut cache = small_cache(100);
        cache.insert("old", "x".repeat(40));
        tokio::time::advance(Duration::from_secs(1)).await;
        cache.insert("mid", "x".repeat(40));
        tokio::time::advance(Duration::from_secs(1)).await;
        // Touch "old" so "mid" becomes the LRU victim.
        cache.get("old");
        tokio::time::advance(Duration::from_secs(1)).await;

        cache.insert("new", "x".repeat(40));
        assert!(cache.total_bytes() <= 80);
        assert!(!cache.contains("mid"));
        assert!(cache.contains("old"));
        assert!(cache.contains("new"));
    }

    #[tokio::test(start_paused = true)]
    async fn cleanup_drops_aged_entries() {
        let mut cache = ImageMemoryCache::new(MemoryConfig {
            max_bytes: 10_000,
            max_age: Duration::from_secs(30),
            ..MemoryConfig::default()
        });
        cache.insert("stale", "data".to_string());
        tokio::time::advance(Duration::from_secs(31)).await;
        cache.insert("fresh", "data".to_string());

        assert_eq!(cache.cleanup(), 1);
        assert!(!cache.contains("stale"));
        assert!(cache.contains("fresh"));
    }

    #[test]
    fn remove_and_clear_keep_byte_accounting() {
        let mut cache = small_cache(1000);
        cache.insert("a", "12345".to_string());
        cache.insert("a", "123".to_string());
        assert_eq!(cache.total_bytes(), 3);
        assert!(cache.remove("a"));
        assert_eq!(cache.total_bytes(), 0);

        cache.insert("b", "12".to_string());
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.total_bytes(), 0);
    }

    struct FixedGauge(Option<f64>);

    impl MemoryGauge for FixedGauge {
        fn used_ratio(&self) -> Option<f64> {
            self.0
        }
    }

    #[test]
    fn monitor_runs_callbacks_above_threshold_only() {
        let runs = Rc::new(Cell::new(0usize));
        let seen = runs.clone();

        let mut monitor = MemoryMonitor::new();
        monitor.register(move || seen.set(seen.get() + 1));

        assert!(!monitor.tick(&FixedGauge(Some(0.5)), 0.8));
        assert_eq!(runs.get(), 0);

        assert!(monitor.tick(&FixedGauge(Some(0.9)), 0.8));
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn monitor_degrades_silently_without_a_gauge() {
        let monitor = MemoryMonitor::new();
        assert!(!monitor.tick(&FixedGauge(None), 0.8));
    }

    #[test]
    fn a_panicking_callback_does_not_stop_the_rest() {
        let runs = Rc::new(Cell::new(0usize));
        let seen = runs.clone();

        let mut monitor = MemoryMonitor::new();
        monitor.register(|| panic!("boom"));
        monitor.register(move || seen.set(seen.get() + 1));

        monitor.run_cleanup();
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn unregister_removes_the_callback() {
        let runs = Rc::new(Cell::new(0usize));
        let seen = runs.clone();

        let mut monitor = MemoryMonitor::new();
        let handle = monitor.register(move || seen.set(seen.get() + 1));
        assert!(monitor.unregister(handle));
        assert!(!monitor.unregister(handle));

        monitor.run_cleanup();
        assert_eq!(runs.get(), 0);
    }
}
