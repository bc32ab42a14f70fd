//! Collapses bursts of file events into one batch.
//!
//! Editors and version control touch many files (often the same file several
//! times) in quick succession. Events are held until the window has been
//! quiet for the configured debounce time, then flushed together.

use crate::utils::config::WatcherConfig;
use crate::watch::batch::{ChangeBatch, ChangeKind, FileChange};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

pub struct EventDebouncer {
    config: WatcherConfig,
    /// Net change per path so far
    pending: BTreeMap<PathBuf, ChangeKind>,
    last_event: Option<Instant>,
}

impl EventDebouncer {
    pub fn new(config: WatcherConfig) -> Self {
        Self {
            config,
            pending: BTreeMap::new(),
            last_event: None,
        }
    }

    pub fn add_event(&mut self, path: PathBuf, kind: ChangeKind) {
        self.last_event = Some(Instant::now());

        let Some(&existing) = self.pending.get(&path) else {
            self.pending.insert(path, kind);
            return;
        };
        let merged = match (existing, kind) {
            (ChangeKind::Created, ChangeKind::Modified) => ChangeKind::Created,
            // Never seen by the index
            (ChangeKind::Created, ChangeKind::Deleted) => {
                self.pending.remove(&path);
                return;
            }
            // Replaced in place
            (ChangeKind::Deleted, ChangeKind::Created | ChangeKind::Modified) => ChangeKind::Modified,
            (_, kind) => kind,
        };
        self.pending.insert(path, merged);
    }

    /// True once no event has arrived for the debounce window
    pub fn is_ready(&self) -> bool {
        self.last_event
            .is_some_and(|last| last.elapsed() >= self.config.debounce_duration())
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Time until the pending events may be flushed
    pub fn time_until_ready(&self) -> Option<Duration> {
        self.last_event.map(|last| {
            self.config
                .debounce_duration()
                .saturating_sub(last.elapsed())
        })
    }

    /// Drain pending changes, in path order. None when nothing is pending.
    pub fn flush(&mut self) -> Option<ChangeBatch> {
        self.last_event = None;
        if self.pending.is_empty() {
            return None;
        }

        let mut batch = ChangeBatch::new();
        for (path, kind) in std::mem::take(&mut self.pending) {
            batch.add(FileChange { path, kind });
        }
        Some(batch)
    }
}
