use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Unique identifier for a document within one corpus build
pub type DocId = u32;

/// A text document handed to the index by the document supplier.
///
/// Immutable once handed over; a newer version of the same file replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: DocId,
    /// Corpus key (relative path for directory-backed corpora)
    pub filename: String,
    /// Location used to open the file
    pub file_path: PathBuf,
    pub contents: String,
}

impl Document {
    pub fn new(
        id: DocId,
        filename: impl Into<String>,
        file_path: impl Into<PathBuf>,
        contents: impl Into<String>,
    ) -> Self {
        Self {
            id,
            filename: filename.into(),
            file_path: file_path.into(),
            contents: contents.into(),
        }
    }
}

/// Where a word occurrence sits inside its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    /// 1-based line number
    pub line: u32,
    /// 0-based index of the word within its line
    pub word_index: u32,
    /// 0-based character offset of the word's first character within its line
    pub offset: u32,
}

impl Position {
    pub fn new(line: u32, word_index: u32, offset: u32) -> Self {
        Self {
            line,
            word_index,
            offset,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.offset + 1)
    }
}

/// One occurrence of an indexed word within the query's edit distance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub filename: String,
    pub file_path: PathBuf,
    pub matched_word: String,
    pub distance: usize,
    pub position: Position,
}

/// Configuration for building a corpus from a directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexConfig {
    pub max_file_size: u64,
    pub ignored_dirs: Vec<String>,
    /// Build document tries on the rayon pool
    pub parallel_build: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            max_file_size: 10 * 1024 * 1024,
            ignored_dirs: vec![
                ".git".to_string(),
                "node_modules".to_string(),
                "target".to_string(),
                "vendor".to_string(),
                "__pycache__".to_string(),
                ".venv".to_string(),
                "venv".to_string(),
            ],
            parallel_build: true,
        }
    }
}

impl IndexConfig {
    pub fn is_ignored_dir(&self, name: &str) -> bool {
        self.ignored_dirs.iter().any(|d| d == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_ordering_is_scan_order() {
        let a = Position::new(1, 3, 10);
        let b = Position::new(1, 4, 15);
        let c = Position::new(2, 0, 0);
        assert!(a < b && b < c);
    }

    #[test]
    fn test_position_display_is_one_based_column() {
        assert_eq!(Position::new(3, 1, 4).to_string(), "3:5");
    }

    #[test]
    fn test_index_config_ignores_vendor_dirs() {
        let config = IndexConfig::default();
        assert!(config.is_ignored_dir("node_modules"));
        assert!(config.is_ignored_dir("vendor"));
        assert!(!config.is_ignored_dir("src"));
    }

    #[test]
    fn test_match_result_json_roundtrip() {
        let m = MatchResult {
            filename: "docs/a.txt".to_string(),
            file_path: PathBuf::from("/w/docs/a.txt"),
            matched_word: "text".to_string(),
            distance: 1,
            position: Position::new(1, 1, 8),
        };
        let json = serde_json::to_string(&m).unwrap();
        let parsed: MatchResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, m);
    }
}
