//! Backend-neutral persisted form of a corpus.
//!
//! Tries are flattened into per-document term tables (word -> positions) so
//! the serialized blob never nests once per character. Restoring re-inserts
//! positions in their stored order, which is the original scan order.

use crate::index::store::CorpusIndex;
use crate::index::trie::DocumentTrie;
use crate::index::types::{Document, Position};
use crate::utils::tokenizer::tokenize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// Bumped whenever the snapshot layout changes
pub const SNAPSHOT_VERSION: u32 = 1;

/// Words of one document with their occurrence positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    pub filename: String,
    pub file_path: PathBuf,
    pub terms: BTreeMap<String, Vec<Position>>,
}

impl DocumentSnapshot {
    pub fn from_trie(trie: &DocumentTrie) -> Self {
        let terms = trie
            .root
            .words()
            .into_iter()
            .map(|node| (node.prefix.clone(), node.positions.clone()))
            .collect();
        Self {
            filename: trie.filename.clone(),
            file_path: trie.source_file.clone(),
            terms,
        }
    }

    /// Tokenize a document straight into a term table
    pub fn from_document(document: &Document) -> Self {
        let mut terms: BTreeMap<String, Vec<Position>> = BTreeMap::new();
        for occurrence in tokenize(&document.contents) {
            terms
                .entry(occurrence.word)
                .or_default()
                .push(occurrence.position);
        }
        Self {
            filename: document.filename.clone(),
            file_path: document.file_path.clone(),
            terms,
        }
    }

    pub fn to_trie(&self) -> DocumentTrie {
        DocumentTrie::from_terms(
            self.filename.clone(),
            self.file_path.clone(),
            self.terms
                .iter()
                .map(|(word, positions)| (word.as_str(), positions.as_slice())),
        )
    }

    pub fn occurrence_count(&self) -> usize {
        self.terms.values().map(Vec::len).sum()
    }
}

/// Whole-corpus snapshot, the unit stored under the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusSnapshot {
    pub version: u32,
    pub root_path: Option<PathBuf>,
    pub created_at: u64,
    pub updated_at: u64,
    pub documents: Vec<DocumentSnapshot>,
}

impl Default for CorpusSnapshot {
    fn default() -> Self {
        let now = unix_now();
        Self {
            version: SNAPSHOT_VERSION,
            root_path: None,
            created_at: now,
            updated_at: now,
            documents: Vec::new(),
        }
    }
}

impl CorpusSnapshot {
    pub fn from_corpus(corpus: &CorpusIndex) -> Self {
        Self {
            documents: corpus
                .iter()
                .map(|(_, trie)| DocumentSnapshot::from_trie(trie))
                .collect(),
            ..Self::default()
        }
    }

    pub fn to_corpus(&self) -> CorpusIndex {
        self.documents.iter().map(DocumentSnapshot::to_trie).collect()
    }

    pub fn word_count(&self) -> usize {
        self.documents.iter().map(|d| d.terms.len()).sum()
    }

    pub fn occurrence_count(&self) -> usize {
        self.documents.iter().map(DocumentSnapshot::occurrence_count).sum()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(blob: &str) -> serde_json::Result<Self> {
        serde_json::from_str(blob)
    }
}

pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
