//! Load-or-build persistence for a workspace's index.
//!
//! The whole corpus is stored as one blob under [`INDEX_KEY`]. A stored blob
//! is trusted as-is: loading never checks it against the files on disk, so a
//! cached index stays stale until [`IndexCache::update`] is called for the
//! changed documents. An unreadable blob is dropped and rebuilt.

use crate::error::{Result, SearchError};
use crate::index::snapshot::{unix_now, CorpusSnapshot, SNAPSHOT_VERSION};
use crate::index::types::Document;
use crate::query::backend::QueryBackend;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Key under which the serialized index lives
pub const INDEX_KEY: &str = "fuzzy-index";

/// Opaque key-value storage scoped to one workspace
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn put(&self, key: &str, blob: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// One JSON file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileCacheStore {
    dir: PathBuf,
}

impl FileCacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted in the app data index directory for `root`
    pub fn for_workspace(root: &Path) -> anyhow::Result<Self> {
        Ok(Self::new(crate::utils::app_data::get_index_dir(root)?))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl CacheStore for FileCacheStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&self, key: &str, blob: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        // Write then rename so a crash never leaves a half-written blob
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, blob)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// In-process store for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryCacheStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, blob: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), blob.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
        Ok(())
    }
}

/// How [`IndexCache::load_or_build`] obtained the index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Restored from the stored blob; the supplier was not called
    Loaded,
    /// Built from the supplier's documents and stored
    Built,
}

/// Ties a backend's lifecycle to a [`CacheStore`]
pub struct IndexCache<S: CacheStore> {
    store: S,
    root_path: Option<PathBuf>,
    created_at: AtomicU64,
    persist_lock: Mutex<()>,
}

impl<S: CacheStore> IndexCache<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            root_path: None,
            created_at: AtomicU64::new(unix_now()),
            persist_lock: Mutex::new(()),
        }
    }

    /// Record the workspace root in every persisted snapshot
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root_path = Some(root.into());
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Restore the stored index into `backend`, or build it from `supplier`
    /// and store it when nothing usable is cached.
    pub fn load_or_build<B, F>(&self, backend: &B, supplier: F) -> Result<LoadOutcome>
    where
        B: QueryBackend + ?Sized,
        F: FnOnce() -> Vec<Document>,
    {
        if let Some(snapshot) = self.load()? {
            info!(
                "loaded cached index: {} documents, {} words",
                snapshot.documents.len(),
                snapshot.word_count()
            );
            self.created_at.store(snapshot.created_at, Ordering::Relaxed);
            backend.restore(snapshot);
            return Ok(LoadOutcome::Loaded);
        }

        info!("no cached index, building");
        let documents = supplier();
        backend.build_all(&documents);
        self.created_at.store(unix_now(), Ordering::Relaxed);
        self.persist(backend)?;
        Ok(LoadOutcome::Built)
    }

    /// Re-index one document and store the result
    pub fn update<B>(&self, backend: &B, document: &Document) -> Result<()>
    where
        B: QueryBackend + ?Sized,
    {
        backend.update_one(document);
        self.persist(backend)
    }

    /// Drop one document and store the result. Returns false if it was not indexed.
    pub fn remove<B>(&self, backend: &B, filename: &str) -> Result<bool>
    where
        B: QueryBackend + ?Sized,
    {
        if !backend.remove_one(filename) {
            return Ok(false);
        }
        self.persist(backend)?;
        Ok(true)
    }

    /// Apply several updates and removals, storing once at the end.
    /// Returns how many documents changed.
    pub fn apply_changes<B>(&self, backend: &B, updated: &[Document], removed: &[String]) -> Result<usize>
    where
        B: QueryBackend + ?Sized,
    {
        let mut changed = 0;
        for document in updated {
            backend.update_one(document);
            changed += 1;
        }
        for filename in removed {
            if backend.remove_one(filename) {
                changed += 1;
            }
        }
        if changed > 0 {
            self.persist(backend)?;
        }
        Ok(changed)
    }

    /// Forget the stored index; the next load rebuilds
    pub fn clear(&self) -> Result<()> {
        self.store.remove(INDEX_KEY)
    }

    /// Write the backend's current corpus under [`INDEX_KEY`]
    pub fn persist<B>(&self, backend: &B) -> Result<()>
    where
        B: QueryBackend + ?Sized,
    {
        let _guard = self.persist_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut snapshot = backend.snapshot();
        snapshot.root_path = self.root_path.clone();
        snapshot.created_at = self.created_at.load(Ordering::Relaxed);
        snapshot.updated_at = unix_now();

        let blob = snapshot.to_json()?;
        self.store.put(INDEX_KEY, &blob)?;
        debug!("persisted index ({} bytes)", blob.len());
        Ok(())
    }

    /// Decoded stored snapshot, or None when missing or unusable.
    /// Unusable blobs are removed so they are not read again.
    fn load(&self) -> Result<Option<CorpusSnapshot>> {
        let Some(blob) = self.store.get(INDEX_KEY)? else {
            return Ok(None);
        };
        match decode(&blob) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(e) => {
                warn!("discarding cached index: {e}");
                self.store.remove(INDEX_KEY)?;
                Ok(None)
            }
        }
    }
}

fn decode(blob: &str) -> Result<CorpusSnapshot> {
    let snapshot = CorpusSnapshot::from_json(blob)?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(SearchError::Cache(format!(
            "snapshot version {} (expected {})",
            snapshot.version, SNAPSHOT_VERSION
        )));
    }
    Ok(snapshot)
}
