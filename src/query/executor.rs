use crate::index::store::CorpusIndex;
use crate::index::types::MatchResult;
use crate::query::matcher::match_word;
use serde::Serialize;
use std::time::{Duration, Instant};

/// Results of one query plus bookkeeping about how it ran
#[derive(Debug, Clone, Default, Serialize)]
pub struct QueryResponse {
    pub results: Vec<MatchResult>,
    /// Number of occurrences found
    pub match_count: usize,
    /// Number of documents searched
    pub corpus_size: usize,
    #[serde(serialize_with = "serialize_millis")]
    pub duration: Duration,
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64() * 1000.0)
}

/// Closest words first, then filename and position
pub fn sort_by_distance(results: &mut [MatchResult]) {
    results.sort_by(|a, b| {
        a.distance
            .cmp(&b.distance)
            .then_with(|| a.filename.cmp(&b.filename))
            .then_with(|| a.position.cmp(&b.position))
    });
}

/// Query executor over one corpus snapshot
pub struct QueryExecutor<'a> {
    corpus: &'a CorpusIndex,
}

impl<'a> QueryExecutor<'a> {
    pub fn new(corpus: &'a CorpusIndex) -> Self {
        Self { corpus }
    }

    /// Every occurrence of every indexed word within `max_distance` of `word`.
    ///
    /// Ordered by filename, then trie traversal order, then position.
    /// Not ranked: callers wanting the closest words first must sort.
    pub fn execute(&self, word: &str, max_distance: usize) -> Vec<MatchResult> {
        let mut results = Vec::new();

        for (filename, trie) in self.corpus.iter() {
            for m in match_word(&trie.root, word, max_distance) {
                results.extend(m.positions.iter().map(|&position| MatchResult {
                    filename: filename.clone(),
                    file_path: trie.source_file.clone(),
                    matched_word: m.prefix.to_string(),
                    distance: m.distance,
                    position,
                }));
            }
        }

        results
    }

    /// Like [`execute`](Self::execute) but wrapped with timing and corpus size.
    pub fn search(&self, word: &str, max_distance: usize) -> QueryResponse {
        let start = Instant::now();
        let results = self.execute(word, max_distance);
        QueryResponse {
            match_count: results.len(),
            corpus_size: self.corpus.len(),
            duration: start.elapsed(),
            results,
        }
    }
}
