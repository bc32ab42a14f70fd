//! Keeps a workspace index current while files change.

use crate::index::build::Workspace;
use crate::index::cache::CacheStore;
use crate::index::documents::{is_ignored_path, read_document, relative_filename};
use crate::index::types::{DocId, IndexConfig};
use crate::query::backend::QueryBackend;
use crate::utils::config::WatcherConfig;
use crate::watch::batch::{ChangeBatch, ChangeKind};
use crate::watch::debouncer::EventDebouncer;
use anyhow::{Context, Result};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use log::{debug, info, warn};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::time::Duration;

/// Longest wait for file events before checking for shutdown
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// What applying one batch did to the index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub updated: Vec<String>,
    pub removed: Vec<String>,
    /// Changed paths that are not indexable (binary, too large, ignored)
    pub skipped: usize,
}

/// Gitignore rules at the workspace root
pub fn build_gitignore_matcher(root: &Path) -> Gitignore {
    let mut builder = GitignoreBuilder::new(root);
    if let Some(e) = builder.add(root.join(".gitignore")) {
        debug!("no usable .gitignore in {}: {e}", root.display());
    }
    builder.build().unwrap_or_else(|e| {
        warn!("ignoring .gitignore: {e}");
        Gitignore::empty()
    })
}

/// True when a changed path (relative to the root) should not reach the index
pub fn should_ignore_path(gitignore: &Gitignore, rel_path: &Path, config: &IndexConfig) -> bool {
    let hidden = rel_path
        .components()
        .any(|c| c.as_os_str().to_string_lossy().starts_with('.'));
    hidden
        || is_ignored_path(rel_path, config)
        || gitignore
            .matched_path_or_any_parents(rel_path, false)
            .is_ignore()
}

/// Apply a batch of relative paths to the workspace index and store it.
///
/// Files that vanished or became unindexable are removed. Re-read documents
/// take fresh ids from `next_id`, which only ever grows.
pub fn apply_batch<S: CacheStore>(
    workspace: &Workspace<S>,
    batch: &ChangeBatch,
    next_id: &mut DocId,
) -> Result<BatchSummary> {
    let mut summary = BatchSummary::default();
    let mut updated = Vec::new();

    for rel in batch.upserts() {
        let path = workspace.root.join(rel);
        match read_document(&workspace.root, &path, *next_id, &workspace.config) {
            Ok(Some(document)) => {
                *next_id += 1;
                summary.updated.push(document.filename.clone());
                updated.push(document);
            }
            Ok(None) => {
                summary.skipped += 1;
                if let Some(filename) = relative_filename(&workspace.root, &path) {
                    summary.removed.push(filename);
                }
            }
            Err(e) => {
                debug!("{e:#}");
                if let Some(filename) = relative_filename(&workspace.root, &path) {
                    summary.removed.push(filename);
                }
            }
        }
    }
    for rel in &batch.deleted {
        if let Some(filename) = relative_filename(&workspace.root, &workspace.root.join(rel)) {
            summary.removed.push(filename);
        }
    }

    workspace
        .cache
        .apply_changes(&workspace.backend, &updated, &summary.removed)
        .context("Failed to store updated index")?;
    Ok(summary)
}

fn change_kind(kind: &EventKind) -> Option<ChangeKind> {
    match kind {
        EventKind::Create(_) => Some(ChangeKind::Created),
        EventKind::Modify(_) => Some(ChangeKind::Modified),
        EventKind::Remove(_) => Some(ChangeKind::Deleted),
        _ => None,
    }
}

/// Watch the workspace root until `shutdown` is set, applying debounced
/// batches as they become ready. `on_batch` sees every applied batch.
pub fn run_watcher<S, F>(
    workspace: &Workspace<S>,
    config: WatcherConfig,
    shutdown: &AtomicBool,
    mut on_batch: F,
) -> Result<()>
where
    S: CacheStore,
    F: FnMut(&BatchSummary),
{
    let mut debouncer = EventDebouncer::new(config);
    let (event_tx, event_rx) = mpsc::channel();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| {
            if let Ok(event) = res {
                let _ = event_tx.send(event);
            }
        },
        notify::Config::default(),
    )
    .context("Failed to create file watcher")?;
    watcher
        .watch(&workspace.root, RecursiveMode::Recursive)
        .with_context(|| format!("Failed to watch {}", workspace.root.display()))?;

    let gitignore = build_gitignore_matcher(&workspace.root);
    // Scans number documents from zero, so ids past the count are unused
    let mut next_id = workspace.backend.document_count() as DocId;
    info!("watching {} for changes", workspace.root.display());

    while !shutdown.load(Ordering::Relaxed) {
        let wait = if debouncer.has_pending() {
            debouncer.time_until_ready().unwrap_or(POLL_INTERVAL).min(POLL_INTERVAL)
        } else {
            POLL_INTERVAL
        };
        match event_rx.recv_timeout(wait) {
            Ok(event) => {
                let Some(kind) = change_kind(&event.kind) else {
                    continue;
                };
                for path in event.paths {
                    if path.is_dir() {
                        continue;
                    }
                    let Ok(rel) = path.strip_prefix(&workspace.root).map(PathBuf::from) else {
                        continue;
                    };
                    if should_ignore_path(&gitignore, &rel, &workspace.config) {
                        continue;
                    }
                    debug!("[watch] {:?} {}", kind, rel.display());
                    debouncer.add_event(rel, kind);
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }

        if debouncer.has_pending() && debouncer.is_ready() {
            debug!("flushing {} pending paths", debouncer.pending_count());
            if let Some(batch) = debouncer.flush() {
                match apply_batch(workspace, &batch, &mut next_id) {
                    Ok(summary) => {
                        info!(
                            "applied {} changes ({} updated, {} removed)",
                            batch.total_changes(),
                            summary.updated.len(),
                            summary.removed.len()
                        );
                        on_batch(&summary);
                    }
                    Err(e) => warn!("failed to apply changes: {e:#}"),
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::cache::MemoryCacheStore;
    use crate::query::backend::BackendKind;
    use std::fs;

    fn workspace() -> (tempfile::TempDir, Workspace<MemoryCacheStore>) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "This is a test file.").unwrap();
        fs::write(dir.path().join("b.txt"), "Another test file.").unwrap();
        let ws = Workspace::with_store(
            dir.path(),
            BackendKind::Trie,
            IndexConfig::default(),
            MemoryCacheStore::new(),
        )
        .unwrap();
        ws.load_or_build(true).unwrap();
        (dir, ws)
    }

    #[test]
    fn test_apply_batch_updates_and_removes() {
        let (dir, ws) = workspace();
        assert_eq!(ws.backend.query("test", 0).len(), 2);

        fs::write(dir.path().join("a.txt"), "rewritten text").unwrap();
        fs::write(dir.path().join("c.txt"), "brand new test").unwrap();
        fs::remove_file(dir.path().join("b.txt")).unwrap();

        let batch = ChangeBatch {
            created: vec![PathBuf::from("c.txt")],
            modified: vec![PathBuf::from("a.txt")],
            deleted: vec![PathBuf::from("b.txt")],
        };
        let mut next_id = ws.document_count() as DocId;
        let summary = apply_batch(&ws, &batch, &mut next_id).unwrap();

        assert_eq!(summary.updated, vec!["c.txt".to_string(), "a.txt".to_string()]);
        assert_eq!(summary.removed, vec!["b.txt".to_string()]);
        let hits: Vec<_> = ws
            .backend
            .query("test", 0)
            .into_iter()
            .map(|m| m.filename)
            .collect();
        assert_eq!(hits, vec!["c.txt".to_string()]);
        assert_eq!(ws.backend.query("rewritten", 0).len(), 1);
    }

    #[test]
    fn test_apply_batch_missing_file_is_removed() {
        let (dir, ws) = workspace();
        fs::remove_file(dir.path().join("a.txt")).unwrap();
        let batch = ChangeBatch {
            modified: vec![PathBuf::from("a.txt")],
            ..ChangeBatch::default()
        };
        let mut next_id = 2;
        let summary = apply_batch(&ws, &batch, &mut next_id).unwrap();
        assert_eq!(summary.removed, vec!["a.txt".to_string()]);
        assert_eq!(next_id, 2);
        assert_eq!(ws.document_count(), 1);
    }

    #[test]
    fn test_apply_batch_never_reuses_ids() {
        let (dir, ws) = workspace();
        fs::remove_file(dir.path().join("b.txt")).unwrap();
        fs::write(dir.path().join("c.txt"), "third").unwrap();
        fs::write(dir.path().join("d.txt"), "fourth").unwrap();

        // Ids 0 and 1 went to the initial scan
        let mut next_id = ws.document_count() as DocId;
        let first = ChangeBatch {
            created: vec![PathBuf::from("c.txt")],
            deleted: vec![PathBuf::from("b.txt")],
            ..ChangeBatch::default()
        };
        apply_batch(&ws, &first, &mut next_id).unwrap();
        assert_eq!(next_id, 3);

        // The document count dropped back to two, but ids keep growing
        assert_eq!(ws.document_count(), 2);
        let second = ChangeBatch {
            created: vec![PathBuf::from("d.txt")],
            modified: vec![PathBuf::from("a.txt")],
            ..ChangeBatch::default()
        };
        apply_batch(&ws, &second, &mut next_id).unwrap();
        assert_eq!(next_id, 5);
        assert_eq!(ws.document_count(), 3);
    }

    #[test]
    fn test_should_ignore_path() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".gitignore"), "*.log\n").unwrap();
        let gitignore = build_gitignore_matcher(dir.path());
        let config = IndexConfig::default();

        assert!(should_ignore_path(&gitignore, Path::new("build.log"), &config));
        assert!(should_ignore_path(&gitignore, Path::new("node_modules/x.txt"), &config));
        assert!(should_ignore_path(&gitignore, Path::new(".hidden/x.txt"), &config));
        assert!(!should_ignore_path(&gitignore, Path::new("docs/readme.txt"), &config));
    }
}
