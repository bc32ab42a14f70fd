//! Live index updates from file system events.

pub mod batch;
pub mod debouncer;
pub mod watcher;

pub use batch::{ChangeBatch, ChangeKind, FileChange};
pub use debouncer::EventDebouncer;
pub use watcher::{apply_batch, run_watcher, BatchSummary};
