use crate::index::cache::{CacheStore, FileCacheStore, IndexCache, LoadOutcome};
use crate::index::documents::{discover_files, load_documents};
use crate::index::types::{Document, IndexConfig};
use crate::query::backend::{Backend, BackendKind, QueryBackend};
use crate::utils::app_data::find_codebase_root;
use crate::utils::progress::{file_bar, spinner};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// A workspace root with its backend and index cache
pub struct Workspace<S: CacheStore = FileCacheStore> {
    pub root: PathBuf,
    pub config: IndexConfig,
    pub backend: Backend,
    pub cache: IndexCache<S>,
}

impl Workspace {
    /// Workspace cached in the app data directory
    pub fn open(root: &Path, kind: BackendKind, config: IndexConfig) -> Result<Self> {
        let root = root.canonicalize().context("Invalid path")?;
        let store = FileCacheStore::for_workspace(&root)?;
        Self::with_store(&root, kind, config, store)
    }
}

impl<S: CacheStore> Workspace<S> {
    pub fn with_store(root: &Path, kind: BackendKind, config: IndexConfig, store: S) -> Result<Self> {
        let root = root.canonicalize().context("Invalid path")?;
        Ok(Self {
            cache: IndexCache::new(store).with_root(&root),
            backend: Backend::new(kind, config.parallel_build),
            config,
            root,
        })
    }

    /// Restore the cached index, building it first if there is none
    pub fn load_or_build(&self, silent: bool) -> Result<LoadOutcome> {
        let start = Instant::now();
        let outcome = self
            .cache
            .load_or_build(&self.backend, || self.scan(silent))
            .context("Failed to load or build index")?;
        log::info!(
            "{:?} index for {} in {:.1}ms",
            outcome,
            self.root.display(),
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(outcome)
    }

    /// Drop the cached index and build from scratch
    pub fn rebuild(&self, silent: bool) -> Result<()> {
        self.cache.clear().context("Failed to clear cached index")?;
        self.load_or_build(silent)?;
        Ok(())
    }

    pub fn document_count(&self) -> usize {
        self.backend.document_count()
    }

    /// Read every indexable document under the root
    pub fn scan(&self, silent: bool) -> Vec<Document> {
        let discovering = (!silent).then(|| spinner("Discovering files..."));
        let files = discover_files(&self.root, &self.config);
        if let Some(s) = discovering {
            s.finish_with_message(format!("Found {} files", files.len()));
        }

        let bar = (!silent).then(|| file_bar(files.len() as u64, "Reading files..."));
        let documents = load_documents(&files, &self.config, bar.as_ref());
        if let Some(pb) = bar {
            pb.finish_with_message(format!("Indexed {} documents", documents.len()));
        }
        documents
    }
}

/// Build or rebuild the index for `root_path`
pub fn build_index(
    root_path: &Path,
    force: bool,
    kind: BackendKind,
    config: IndexConfig,
) -> Result<Workspace> {
    let workspace = Workspace::open(root_path, kind, config)?;
    println!("Indexing: {}", workspace.root.display());

    if force {
        workspace.rebuild(false)?;
    } else if workspace.load_or_build(false)? == LoadOutcome::Loaded {
        println!("Index already up to date (use --force to rebuild)");
    }

    println!(
        "Index stored at: {} ({} documents)",
        workspace.cache.store().dir().display(),
        workspace.document_count()
    );
    Ok(workspace)
}

/// Build index, detecting the workspace root from `start_path`
pub fn build_index_auto(
    start_path: &Path,
    force: bool,
    kind: BackendKind,
    config: IndexConfig,
) -> Result<Workspace> {
    let root = find_codebase_root(start_path)?;
    println!("Detected workspace root: {}", root.display());
    build_index(&root, force, kind, config)
}
