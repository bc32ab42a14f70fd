//! Vantage-point tree over the corpus vocabulary.
//!
//! An alternative to per-document tries: one metric tree over all distinct
//! words, with Levenshtein distance as the metric. Each node picks a vantage
//! word and splits the remaining words at the median distance to it, so the
//! tree stays balanced. Range queries use the triangle inequality to skip
//! halves that cannot contain a word within the bound.
//!
//! Unlike the trie backend, results come back sorted by distance.

use crate::index::snapshot::{CorpusSnapshot, DocumentSnapshot};
use crate::index::types::{Document, MatchResult};
use crate::utils::levenshtein::levenshtein_distance;
use log::{debug, info};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, RwLock};

#[derive(Debug)]
struct VpNode {
    /// Index into the vocabulary
    vantage: usize,
    /// Largest distance from the vantage to any word in `inside`.
    /// Every word in `outside` is at least this far away.
    radius: usize,
    inside: Option<Box<VpNode>>,
    outside: Option<Box<VpNode>>,
}

/// Balanced metric tree over a fixed vocabulary
#[derive(Debug, Default)]
pub struct VpTree {
    words: Vec<String>,
    root: Option<Box<VpNode>>,
}

impl VpTree {
    pub fn new(words: Vec<String>) -> Self {
        let items: Vec<usize> = (0..words.len()).collect();
        let root = build_node(&words, items);
        Self { words, root }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Every vocabulary word within `max_distance` of `query`, as
    /// (distance, word index), sorted by distance then word.
    pub fn within(&self, query: &str, max_distance: usize) -> Vec<(usize, usize)> {
        let mut found = Vec::new();
        let mut stack: Vec<&VpNode> = self.root.as_deref().into_iter().collect();

        while let Some(node) = stack.pop() {
            let d = levenshtein_distance(query, &self.words[node.vantage]);
            if d <= max_distance {
                found.push((d, node.vantage));
            }
            if let Some(inside) = node.inside.as_deref() {
                if d.saturating_sub(max_distance) <= node.radius {
                    stack.push(inside);
                }
            }
            if let Some(outside) = node.outside.as_deref() {
                if d + max_distance >= node.radius {
                    stack.push(outside);
                }
            }
        }

        found.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| self.words[a.1].cmp(&self.words[b.1])));
        found
    }

    pub fn word(&self, index: usize) -> &str {
        &self.words[index]
    }
}

fn build_node(words: &[String], mut items: Vec<usize>) -> Option<Box<VpNode>> {
    if items.is_empty() {
        return None;
    }
    let vantage = items.remove(0);
    if items.is_empty() {
        return Some(Box::new(VpNode {
            vantage,
            radius: 0,
            inside: None,
            outside: None,
        }));
    }

    let mut by_distance: Vec<(usize, usize)> = items
        .into_iter()
        .map(|i| (levenshtein_distance(&words[vantage], &words[i]), i))
        .collect();
    by_distance.sort_unstable();

    let mid = by_distance.len() / 2;
    let outside_items: Vec<usize> = by_distance[mid..].iter().map(|&(_, i)| i).collect();
    let inside_items: Vec<usize> = by_distance[..mid].iter().map(|&(_, i)| i).collect();
    let radius = if mid > 0 { by_distance[mid - 1].0 } else { by_distance[0].0 };

    Some(Box::new(VpNode {
        vantage,
        radius,
        inside: build_node(words, inside_items),
        outside: build_node(words, outside_items),
    }))
}

/// Corpus state published by [`VpTreeIndex`]
#[derive(Debug, Default)]
struct VpCorpus {
    documents: BTreeMap<String, Arc<DocumentSnapshot>>,
    tree: VpTree,
    /// Documents containing each vocabulary word, in filename order
    postings: Vec<Vec<Arc<DocumentSnapshot>>>,
}

impl VpCorpus {
    fn new(documents: BTreeMap<String, Arc<DocumentSnapshot>>) -> Self {
        let mut vocabulary: BTreeMap<&str, Vec<Arc<DocumentSnapshot>>> = BTreeMap::new();
        for doc in documents.values() {
            for word in doc.terms.keys() {
                vocabulary.entry(word.as_str()).or_default().push(Arc::clone(doc));
            }
        }
        let (words, postings): (Vec<String>, Vec<_>) = vocabulary
            .into_iter()
            .map(|(w, docs)| (w.to_string(), docs))
            .unzip();
        let tree = VpTree::new(words);
        Self {
            documents,
            tree,
            postings,
        }
    }
}

/// Vocabulary-wide VP-tree index with the same snapshot discipline as
/// [`crate::index::store::IndexStore`]: updates rebuild off to the side and
/// swap in a new corpus.
#[derive(Debug)]
pub struct VpTreeIndex {
    current: RwLock<Arc<VpCorpus>>,
    write_lock: Mutex<()>,
}

impl Default for VpTreeIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl VpTreeIndex {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(VpCorpus::default())),
            write_lock: Mutex::new(()),
        }
    }

    fn current(&self) -> Arc<VpCorpus> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    fn publish(&self, documents: BTreeMap<String, Arc<DocumentSnapshot>>) {
        let corpus = Arc::new(VpCorpus::new(documents));
        debug!("vp-tree rebuilt over {} words", corpus.tree.len());
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        *guard = corpus;
    }

    pub fn build_all(&self, documents: &[Document]) {
        let _writer = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let snapshots: Vec<DocumentSnapshot> = documents
            .par_iter()
            .map(DocumentSnapshot::from_document)
            .collect();
        let map = snapshots
            .into_iter()
            .map(|d| (d.filename.clone(), Arc::new(d)))
            .collect();
        self.publish(map);
        info!("vp-tree index built for {} documents", documents.len());
    }

    pub fn update_one(&self, document: &Document) {
        let _writer = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut map = self.current().documents.clone();
        map.insert(
            document.filename.clone(),
            Arc::new(DocumentSnapshot::from_document(document)),
        );
        self.publish(map);
    }

    pub fn remove_one(&self, filename: &str) -> bool {
        let _writer = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut map = self.current().documents.clone();
        if map.remove(filename).is_none() {
            return false;
        }
        self.publish(map);
        true
    }

    /// Matches sorted by distance, then word, then filename and position.
    pub fn query(&self, word: &str, max_distance: usize) -> Vec<MatchResult> {
        // Indexed words are never empty
        if word.is_empty() {
            return Vec::new();
        }
        let corpus = self.current();
        let mut results = Vec::new();
        for (distance, index) in corpus.tree.within(word, max_distance) {
            let matched = corpus.tree.word(index);
            for doc in &corpus.postings[index] {
                let Some(positions) = doc.terms.get(matched) else {
                    continue;
                };
                results.extend(positions.iter().map(|&position| MatchResult {
                    filename: doc.filename.clone(),
                    file_path: doc.file_path.clone(),
                    matched_word: matched.to_string(),
                    distance,
                    position,
                }));
            }
        }
        results
    }

    pub fn snapshot(&self) -> CorpusSnapshot {
        CorpusSnapshot {
            documents: self
                .current()
                .documents
                .values()
                .map(|d| d.as_ref().clone())
                .collect(),
            ..CorpusSnapshot::default()
        }
    }

    pub fn restore(&self, snapshot: CorpusSnapshot) {
        let _writer = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let map = snapshot
            .documents
            .into_iter()
            .map(|d| (d.filename.clone(), Arc::new(d)))
            .collect();
        self.publish(map);
    }

    pub fn len(&self) -> usize {
        self.current().documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Distinct words in the vocabulary
    pub fn vocabulary_size(&self) -> usize {
        self.current().tree.len()
    }
}
