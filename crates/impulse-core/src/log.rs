//! In-memory diagnostic log sink.
//!
//! Clonable handle over a shared, capped buffer of stamped log lines.
//! Purely diagnostic: nothing reads it back to make decisions, and a
//! full buffer evicts the oldest entry rather than blocking anything.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, PoisonError},
};

use chrono::Local;

/// Maximum retained entries; the oldest is evicted first.
const MAX_ENTRIES: usize = 1000;

/// Shared append-only log buffer.
///
/// Cheap to clone; all clones observe the same buffer. Entries are
/// prefixed with a local `[HH:mm:ss]` stamp at append time.
#[derive(Debug, Clone, Default)]
pub struct LogSink {
    entries: Arc<Mutex<VecDeque<String>>>,
}

impl LogSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a stamped entry, evicting the oldest past the cap.
    pub fn add(&self, message: &str) {
        let entry = format!("[{}] {message}", Local::now().format("%H:%M:%S"));
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.len() == MAX_ENTRIES {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Copy of the current entries, oldest first.
    pub fn snapshot(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    /// Discards all entries.
    pub fn clear(&self) {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// True when no entries are retained.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
