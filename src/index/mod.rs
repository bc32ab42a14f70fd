pub mod build;
pub mod cache;
pub mod documents;
pub mod snapshot;
pub mod stats;
pub mod store;
pub mod trie;
pub mod types;
pub mod vptree;

pub use cache::{CacheStore, FileCacheStore, IndexCache, LoadOutcome, MemoryCacheStore, INDEX_KEY};
pub use store::{CorpusIndex, IndexStore};
pub use trie::{DocumentTrie, TrieNode};
pub use types::*;
