//! Utility functions shared across the crate.
//!
//! ## Modules
//!
//! - [`app_data`] - Application data directory and per-workspace index dirs
//! - [`config`] - `config.toml` plus environment overrides
//! - [`levenshtein`] - Plain edit distance, the reference for the matcher
//! - [`progress`] - Progress bars that compile away without the `progress` feature
//! - [`tokenizer`] - Splitting text into lower-cased words with positions
//!
//! ```no_run
//! use fuzzdex::utils::tokenize;
//!
//! let words = tokenize("Hello, World");
//! assert_eq!(words[1].word, "world");
//! assert_eq!(words[1].position.offset, 7);
//! ```

pub mod app_data;
pub mod config;
pub mod levenshtein;
pub mod progress;
pub mod tokenizer;

pub use app_data::*;
pub use levenshtein::*;
pub use tokenizer::*;
