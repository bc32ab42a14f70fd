//! # fuzzdex - typo-tolerant word search
//!
//! fuzzdex indexes every word of a set of text documents and answers
//! "which words are within edit distance `d` of this one, and where do they
//! occur?" without scanning the text again.
//!
//! ## Architecture
//!
//! - [`index`] - Per-document tries, the corpus store, the VP-tree
//!   alternative, persistence and directory scanning
//! - [`query`] - Bounded Levenshtein matching over tries, result
//!   aggregation, query parsing and the backend abstraction
//! - [`watch`] - Debounced file watching that keeps an index current
//! - [`output`] - Terminal and JSON result formatting
//! - [`utils`] - Tokenizer, reference edit distance, app data and config
//!
//! ## Quick Start
//!
//! ```
//! use fuzzdex::index::{Document, IndexStore};
//! use fuzzdex::query::QueryExecutor;
//!
//! let store = IndexStore::new(false);
//! store.build_all(&[
//!     Document::new(1, "file1", "/c/file1", "This is a test file."),
//!     Document::new(2, "file2", "/c/file2", "Another text file."),
//! ]);
//!
//! let corpus = store.snapshot();
//! let results = QueryExecutor::new(&corpus).execute("text", 1);
//! assert_eq!(results.len(), 2);
//! ```
//!
//! ## Matching
//!
//! Each document's words live in a trie. A query walks the trie carrying one
//! row of the edit-distance table per node, and abandons a subtree as soon
//! as every cell of the row exceeds the bound. Words sharing a prefix share
//! the work for that prefix.

pub mod error;
pub mod index;
pub mod output;
pub mod query;
pub mod utils;
pub mod watch;
