//! Turning a directory tree into [`Document`]s.
//!
//! Walking honours `.gitignore` and the configured ignored directory names.
//! Binary and oversized files are skipped. Reading happens on the rayon pool.

use crate::index::types::{DocId, Document, IndexConfig};
use crate::utils::progress::ProgressBar;
use anyhow::{Context, Result};
use ignore::WalkBuilder;
use log::{debug, warn};
use rayon::prelude::*;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// A file found by [`discover_files`], not yet read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    /// Corpus key: path relative to the root, `/`-separated
    pub filename: String,
}

/// Check if content looks binary (NUL bytes or many control characters)
pub fn is_binary(content: &[u8]) -> bool {
    let sample = &content[..content.len().min(8192)];
    if sample.is_empty() {
        return false;
    }

    let null_count = sample.iter().filter(|&&b| b == 0).count();
    if null_count > sample.len() / 10 {
        return true;
    }

    let non_text_count = sample
        .iter()
        .filter(|&&b| b < 0x20 && b != b'\n' && b != b'\r' && b != b'\t')
        .count();
    non_text_count > sample.len() / 8
}

/// `/`-separated relative path used as the corpus key
pub fn relative_filename(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// True when any directory on the path is in the ignore list
pub fn is_ignored_path(rel: &Path, config: &IndexConfig) -> bool {
    rel.components().any(|c| match c {
        Component::Normal(part) => config.is_ignored_dir(&part.to_string_lossy()),
        _ => false,
    })
}

/// Files under `root` in walk order (sorted by name within each directory)
pub fn discover_files(root: &Path, config: &IndexConfig) -> Vec<DiscoveredFile> {
    let ignored = config.ignored_dirs.clone();
    let walker = WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            let name = entry.file_name().to_string_lossy();
            !ignored.iter().any(|d| d.as_str() == name.as_ref())
        })
        .build();

    walker
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("skipping entry: {e}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
        .filter_map(|entry| {
            let path = entry.into_path();
            let filename = relative_filename(root, &path)?;
            Some(DiscoveredFile { path, filename })
        })
        .collect()
}

/// Read one file's text, or None when it is binary or too large
fn read_text(path: &Path, max_file_size: u64) -> Result<Option<String>> {
    let metadata = fs::metadata(path).with_context(|| format!("Failed to stat {}", path.display()))?;
    if !metadata.is_file() || metadata.len() > max_file_size {
        return Ok(None);
    }
    let content = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    if is_binary(&content) {
        return Ok(None);
    }
    Ok(Some(match String::from_utf8(content) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }))
}

/// Read discovered files in parallel. Ids follow the input order.
/// Unreadable files are logged and skipped.
pub fn load_documents(
    files: &[DiscoveredFile],
    config: &IndexConfig,
    progress: Option<&ProgressBar>,
) -> Vec<Document> {
    let texts: Vec<Option<String>> = files
        .par_iter()
        .map(|file| {
            let text = match read_text(&file.path, config.max_file_size) {
                Ok(text) => text,
                Err(e) => {
                    warn!("{e:#}");
                    None
                }
            };
            if let Some(pb) = progress {
                pb.inc(1);
            }
            text
        })
        .collect();

    let documents: Vec<Document> = files
        .iter()
        .zip(texts)
        .filter_map(|(file, text)| Some((file, text?)))
        .enumerate()
        .map(|(id, (file, text))| {
            Document::new(id as DocId, file.filename.clone(), file.path.clone(), text)
        })
        .collect();

    debug!("loaded {} of {} files", documents.len(), files.len());
    documents
}

/// Every indexable document under `root`
pub fn collect_documents(root: &Path, config: &IndexConfig) -> Vec<Document> {
    load_documents(&discover_files(root, config), config, None)
}

/// A single document for an incremental update.
///
/// Returns None when the path is outside `root`, ignored, binary or too large.
pub fn read_document(root: &Path, path: &Path, id: DocId, config: &IndexConfig) -> Result<Option<Document>> {
    let Some(filename) = relative_filename(root, path) else {
        return Ok(None);
    };
    if is_ignored_path(Path::new(&filename), config) {
        return Ok(None);
    }
    Ok(read_text(path, config.max_file_size)?
        .map(|text| Document::new(id, filename, path.to_path_buf(), text)))
}
