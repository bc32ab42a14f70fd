//! Per-document prefix tree.
//!
//! One [`DocumentTrie`] is built per document. Every path from the root spells
//! a word prefix; nodes flagged `end_of_word` spell a complete indexed word
//! and carry the positions of all its occurrences in scan order.

use crate::index::types::{Document, Position};
use crate::utils::tokenizer::tokenize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// One character transition in the trie.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TrieNode {
    /// Character consumed by this node (None at the root)
    pub letter: Option<char>,
    /// Characters from the root to this node
    pub prefix: String,
    pub children: BTreeMap<char, TrieNode>,
    pub end_of_word: bool,
    /// Occurrences of `prefix` as a whole word, in scan order
    pub positions: Vec<Position>,
}

impl TrieNode {
    /// Create an empty root
    pub fn root() -> Self {
        Self::default()
    }

    fn child_of(parent_prefix: &str, letter: char) -> Self {
        let mut prefix = String::with_capacity(parent_prefix.len() + letter.len_utf8());
        prefix.push_str(parent_prefix);
        prefix.push(letter);
        Self {
            letter: Some(letter),
            prefix,
            children: BTreeMap::new(),
            end_of_word: false,
            positions: Vec::new(),
        }
    }

    /// Record one occurrence of `word`, creating nodes as needed.
    pub fn insert(&mut self, word: &str, position: Position) {
        let mut current = self;
        for letter in word.chars() {
            let TrieNode {
                prefix, children, ..
            } = current;
            current = children
                .entry(letter)
                .or_insert_with(|| TrieNode::child_of(prefix, letter));
        }
        current.end_of_word = true;
        current.positions.push(position);
    }

    /// Node reached by following `word` exactly, if any.
    pub fn find(&self, word: &str) -> Option<&TrieNode> {
        let mut current = self;
        for letter in word.chars() {
            current = current.children.get(&letter)?;
        }
        Some(current)
    }

    /// True if `word` was indexed as a whole word.
    pub fn contains(&self, word: &str) -> bool {
        self.find(word).is_some_and(|n| n.end_of_word)
    }

    /// All word-end nodes in pre-order (character order among siblings).
    pub fn words(&self) -> Vec<&TrieNode> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.end_of_word {
                out.push(node);
            }
            stack.extend(node.children.values().rev());
        }
        out
    }

    /// Number of nodes including this one
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.values());
        }
        count
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty() && !self.end_of_word
    }
}

// Deep tries (very long words) would otherwise drop recursively
impl Drop for TrieNode {
    fn drop(&mut self) {
        let mut stack: Vec<TrieNode> = std::mem::take(&mut self.children).into_values().collect();
        while let Some(mut node) = stack.pop() {
            stack.extend(std::mem::take(&mut node.children).into_values());
        }
    }
}

/// The trie for one document plus the file it was built from.
///
/// The source file is shared by every node, so it is stored once here.
#[derive(Debug, PartialEq, Eq)]
pub struct DocumentTrie {
    pub filename: String,
    pub source_file: PathBuf,
    pub root: TrieNode,
}

impl DocumentTrie {
    /// Tokenize a document and build a fresh trie from its words.
    ///
    /// Rebuilding from the same document yields an equal, independent tree;
    /// callers replace rather than merge.
    pub fn build(document: &Document) -> Self {
        let mut root = TrieNode::root();
        for occurrence in tokenize(&document.contents) {
            root.insert(&occurrence.word, occurrence.position);
        }
        Self {
            filename: document.filename.clone(),
            source_file: document.file_path.clone(),
            root,
        }
    }

    /// Rebuild from already-tokenized words (used when restoring a cache)
    pub fn from_terms<'a>(
        filename: impl Into<String>,
        source_file: impl Into<PathBuf>,
        terms: impl IntoIterator<Item = (&'a str, &'a [Position])>,
    ) -> Self {
        let mut root = TrieNode::root();
        for (word, positions) in terms {
            for &position in positions {
                root.insert(word, position);
            }
        }
        Self {
            filename: filename.into(),
            source_file: source_file.into(),
            root,
        }
    }

    /// Distinct indexed words
    pub fn word_count(&self) -> usize {
        self.root.words().len()
    }

    /// Total indexed occurrences
    pub fn occurrence_count(&self) -> usize {
        self.root.words().iter().map(|n| n.positions.len()).sum()
    }
}
