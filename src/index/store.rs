//! Per-corpus index store.
//!
//! The store publishes immutable [`CorpusIndex`] snapshots. Readers grab the
//! current `Arc` under a short read lock and walk it without holding the lock;
//! writers build new tries off to the side and swap a new snapshot in. A trie
//! reachable from a published snapshot is never mutated.

use crate::index::trie::DocumentTrie;
use crate::index::types::Document;
use log::{debug, info};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;

/// Immutable mapping from filename to that document's trie.
#[derive(Debug, Default, Clone)]
pub struct CorpusIndex {
    documents: BTreeMap<String, Arc<DocumentTrie>>,
}

impl CorpusIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a corpus from documents. Later duplicates of a filename win.
    pub fn build(documents: &[Document], parallel: bool) -> Self {
        let tries: Vec<DocumentTrie> = if parallel {
            documents.par_iter().map(DocumentTrie::build).collect()
        } else {
            documents.iter().map(DocumentTrie::build).collect()
        };
        tries.into_iter().collect()
    }

    pub fn get(&self, filename: &str) -> Option<&Arc<DocumentTrie>> {
        self.documents.get(filename)
    }

    /// Documents in filename order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Arc<DocumentTrie>)> {
        self.documents.iter()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn filenames(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }

    /// Copy of this corpus with one document's trie replaced.
    /// Only `Arc` handles are cloned; untouched tries are shared.
    fn with_document(&self, trie: DocumentTrie) -> Self {
        let mut documents = self.documents.clone();
        documents.insert(trie.filename.clone(), Arc::new(trie));
        Self { documents }
    }

    fn without_document(&self, filename: &str) -> Self {
        let mut documents = self.documents.clone();
        documents.remove(filename);
        Self { documents }
    }
}

impl FromIterator<DocumentTrie> for CorpusIndex {
    fn from_iter<I: IntoIterator<Item = DocumentTrie>>(iter: I) -> Self {
        let documents = iter
            .into_iter()
            .map(|trie| (trie.filename.clone(), Arc::new(trie)))
            .collect();
        Self { documents }
    }
}

/// Owner of the current corpus snapshot.
///
/// All document-level mutation goes through here. Writers are serialized by
/// `write_lock`; readers never block on a build in progress.
#[derive(Debug)]
pub struct IndexStore {
    current: RwLock<Arc<CorpusIndex>>,
    write_lock: Mutex<()>,
    parallel: bool,
}

impl Default for IndexStore {
    fn default() -> Self {
        Self::new(true)
    }
}

impl IndexStore {
    pub fn new(parallel: bool) -> Self {
        Self {
            current: RwLock::new(Arc::new(CorpusIndex::new())),
            write_lock: Mutex::new(()),
            parallel,
        }
    }

    /// Current snapshot. Stays valid (and unchanged) for as long as it is held.
    pub fn snapshot(&self) -> Arc<CorpusIndex> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    fn publish(&self, corpus: CorpusIndex) -> Arc<CorpusIndex> {
        let corpus = Arc::new(corpus);
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        *guard = Arc::clone(&corpus);
        corpus
    }

    /// Replace the whole corpus with tries built from `documents`.
    ///
    /// The new map is assembled completely before it is published, so a
    /// build that fails part-way leaves the previous snapshot visible.
    pub fn build_all(&self, documents: &[Document]) -> Arc<CorpusIndex> {
        let _writer = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let start = Instant::now();
        let corpus = CorpusIndex::build(documents, self.parallel);
        info!(
            "built {} document tries in {:.1}ms",
            corpus.len(),
            start.elapsed().as_secs_f64() * 1000.0
        );
        self.publish(corpus)
    }

    /// Rebuild only `document`'s trie and publish a snapshot containing it.
    pub fn update_one(&self, document: &Document) {
        let trie = DocumentTrie::build(document);
        let _writer = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let next = self.snapshot().with_document(trie);
        debug!("updated trie for {}", document.filename);
        self.publish(next);
    }

    /// Drop a document from the corpus. Returns false if it was not indexed.
    pub fn remove_one(&self, filename: &str) -> bool {
        let _writer = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let current = self.snapshot();
        if current.get(filename).is_none() {
            return false;
        }
        let next = current.without_document(filename);
        debug!("removed trie for {}", filename);
        self.publish(next);
        true
    }

    /// Publish a corpus assembled elsewhere (e.g. restored from a cache).
    pub fn replace(&self, corpus: CorpusIndex) -> Arc<CorpusIndex> {
        let _writer = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        self.publish(corpus)
    }

    pub fn get(&self, filename: &str) -> Option<Arc<DocumentTrie>> {
        self.snapshot().get(filename).cloned()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }
}
