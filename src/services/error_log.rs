//! Capped in-memory log of recent errors.
//!
//! Unexpected failures are converted to UI state where they happen; this
//! ring buffer additionally keeps the most recent entries for the
//! diagnostics view so they never silently disappear.

use chrono::Local;
use std::collections::VecDeque;
use std::sync::{Mutex, OnceLock};

const MAX_ENTRIES: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorEntry {
    pub timestamp: String,
    pub context: String,
    pub message: String,
}

static LOG: OnceLock<Mutex<VecDeque<ErrorEntry>>> = OnceLock::new();

fn entries() -> &'static Mutex<VecDeque<ErrorEntry>> {
    LOG.get_or_init(|| Mutex::new(VecDeque::new()))
}

/// Records an error. Oldest entries fall out beyond the cap.
pub fn record(context: &str, message: &str) {
    log::error!("{}: {}", context, message);

    let entry = ErrorEntry {
        timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        context: context.to_string(),
        message: message.to_string(),
    };

    if let Ok(mut log) = entries().lock() {
        log.push_front(entry);
        log.truncate(MAX_ENTRIES);
    }
}

/// Most recent entries, newest first.
pub fn recent() -> Vec<ErrorEntry> {
    entries()
        .lock()
        .map(|log| log.iter().cloned().collect())
        .unwrap_or_default()
}

pub fn clear() {
    if let Ok(mut log) = entries().lock() {
        log.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_buffer_keeps_the_most_recent_entries() {
        clear();
        for i in 0..25 {
            record("test", &format!("error {}", i));
        }

        let entries = recent();
        assert_eq!(entries.len(), 20);
        // Newest first.
        assert_eq!(entries[0].message, "error 24");
        assert_eq!(entries[19].message, "error 5");

        clear();
        assert!(recent().is_empty());
    }
}
