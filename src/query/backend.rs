//! Index representations behind one query interface.
//!
//! The trie backend keeps one trie per document and returns matches in
//! traversal order. The VP-tree backend indexes the whole vocabulary once and
//! returns matches sorted by distance.

use crate::error::{Result, SearchError};
use crate::index::snapshot::CorpusSnapshot;
use crate::index::store::IndexStore;
use crate::index::types::{Document, MatchResult};
use crate::index::vptree::VpTreeIndex;
use crate::query::executor::QueryExecutor;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Operations every index representation supports
pub trait QueryBackend {
    /// Replace the corpus with one built from `documents`
    fn build_all(&self, documents: &[Document]);

    /// Re-index one document, adding it if new
    fn update_one(&self, document: &Document);

    /// Drop one document. Returns false if it was not indexed.
    fn remove_one(&self, filename: &str) -> bool;

    fn query(&self, word: &str, max_distance: usize) -> Vec<MatchResult>;

    /// Persistable form of the current corpus
    fn snapshot(&self) -> CorpusSnapshot;

    /// Replace the corpus with a previously persisted one
    fn restore(&self, snapshot: CorpusSnapshot);

    fn document_count(&self) -> usize;
}

impl QueryBackend for IndexStore {
    fn build_all(&self, documents: &[Document]) {
        IndexStore::build_all(self, documents);
    }

    fn update_one(&self, document: &Document) {
        IndexStore::update_one(self, document);
    }

    fn remove_one(&self, filename: &str) -> bool {
        IndexStore::remove_one(self, filename)
    }

    fn query(&self, word: &str, max_distance: usize) -> Vec<MatchResult> {
        let corpus = IndexStore::snapshot(self);
        QueryExecutor::new(&corpus).execute(word, max_distance)
    }

    fn snapshot(&self) -> CorpusSnapshot {
        CorpusSnapshot::from_corpus(&IndexStore::snapshot(self))
    }

    fn restore(&self, snapshot: CorpusSnapshot) {
        self.replace(snapshot.to_corpus());
    }

    fn document_count(&self) -> usize {
        self.len()
    }
}

impl QueryBackend for VpTreeIndex {
    fn build_all(&self, documents: &[Document]) {
        VpTreeIndex::build_all(self, documents);
    }

    fn update_one(&self, document: &Document) {
        VpTreeIndex::update_one(self, document);
    }

    fn remove_one(&self, filename: &str) -> bool {
        VpTreeIndex::remove_one(self, filename)
    }

    fn query(&self, word: &str, max_distance: usize) -> Vec<MatchResult> {
        VpTreeIndex::query(self, word, max_distance)
    }

    fn snapshot(&self) -> CorpusSnapshot {
        VpTreeIndex::snapshot(self)
    }

    fn restore(&self, snapshot: CorpusSnapshot) {
        VpTreeIndex::restore(self, snapshot);
    }

    fn document_count(&self) -> usize {
        self.len()
    }
}

/// Which index representation to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Trie,
    #[value(name = "vptree")]
    #[serde(rename = "vptree")]
    VpTree,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Trie => write!(f, "trie"),
            BackendKind::VpTree => write!(f, "vptree"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trie" => Ok(BackendKind::Trie),
            "vptree" | "vp-tree" => Ok(BackendKind::VpTree),
            other => Err(SearchError::invalid_argument(format!(
                "unknown backend {other:?} (expected trie or vptree)"
            ))),
        }
    }
}

/// A concrete index of either kind
#[derive(Debug)]
pub enum Backend {
    Trie(IndexStore),
    VpTree(VpTreeIndex),
}

impl Backend {
    pub fn new(kind: BackendKind, parallel: bool) -> Self {
        match kind {
            BackendKind::Trie => Backend::Trie(IndexStore::new(parallel)),
            BackendKind::VpTree => Backend::VpTree(VpTreeIndex::new()),
        }
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            Backend::Trie(_) => BackendKind::Trie,
            Backend::VpTree(_) => BackendKind::VpTree,
        }
    }

    fn inner(&self) -> &dyn QueryBackend {
        match self {
            Backend::Trie(store) => store,
            Backend::VpTree(index) => index,
        }
    }
}

impl QueryBackend for Backend {
    fn build_all(&self, documents: &[Document]) {
        self.inner().build_all(documents)
    }

    fn update_one(&self, document: &Document) {
        self.inner().update_one(document)
    }

    fn remove_one(&self, filename: &str) -> bool {
        self.inner().remove_one(filename)
    }

    fn query(&self, word: &str, max_distance: usize) -> Vec<MatchResult> {
        self.inner().query(word, max_distance)
    }

    fn snapshot(&self) -> CorpusSnapshot {
        self.inner().snapshot()
    }

    fn restore(&self, snapshot: CorpusSnapshot) {
        self.inner().restore(snapshot)
    }

    fn document_count(&self) -> usize {
        self.inner().document_count()
    }
}
