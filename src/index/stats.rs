use crate::index::cache::{CacheStore, FileCacheStore, INDEX_KEY};
use crate::index::snapshot::CorpusSnapshot;
use crate::utils::app_data::{find_codebase_root, list_indexed_codebases};
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;

/// Summary numbers for a stored index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusStats {
    pub document_count: usize,
    /// Words distinct across the whole corpus
    pub vocabulary_size: usize,
    /// Sum over documents of their distinct words (one trie path each)
    pub term_count: usize,
    pub occurrence_count: usize,
    /// (filename, distinct words), largest first
    pub largest_documents: Vec<(String, usize)>,
}

impl CorpusStats {
    pub fn from_snapshot(snapshot: &CorpusSnapshot, top: usize) -> Self {
        let vocabulary: HashSet<&str> = snapshot
            .documents
            .iter()
            .flat_map(|d| d.terms.keys().map(String::as_str))
            .collect();

        let mut largest: Vec<(String, usize)> = snapshot
            .documents
            .iter()
            .map(|d| (d.filename.clone(), d.terms.len()))
            .collect();
        largest.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        largest.truncate(top);

        Self {
            document_count: snapshot.documents.len(),
            vocabulary_size: vocabulary.len(),
            term_count: snapshot.word_count(),
            occurrence_count: snapshot.occurrence_count(),
            largest_documents: largest,
        }
    }
}

/// Display index statistics
pub fn show_stats(root_path: &Path) -> Result<()> {
    let root = find_codebase_root(root_path)?;
    let store = FileCacheStore::for_workspace(&root)?;
    let Some(blob) = store.get(INDEX_KEY)? else {
        println!("No index for {} (run `fuzzdex index` first)", root.display());
        return Ok(());
    };
    let snapshot = CorpusSnapshot::from_json(&blob).context("Failed to decode stored index")?;
    let stats = CorpusStats::from_snapshot(&snapshot, 10);

    println!("Index Statistics");
    println!("================");
    println!();
    println!("Root path:        {}", root.display());
    println!("Index location:   {}", store.dir().display());
    println!("Index version:    {}", snapshot.version);
    println!("Document count:   {}", stats.document_count);
    println!("Vocabulary:       {}", stats.vocabulary_size);
    println!("Trie words:       {}", stats.term_count);
    println!("Occurrences:      {}", stats.occurrence_count);
    println!("Index size:       {}", format_size(blob.len() as u64));

    if !stats.largest_documents.is_empty() {
        println!();
        println!("Largest documents (distinct words):");
        for (filename, words) in &stats.largest_documents {
            println!("  {:40} {}", filename, words);
        }
    }

    println!();
    println!("Created:          {}", format_timestamp(snapshot.created_at));
    println!("Updated:          {}", format_timestamp(snapshot.updated_at));

    Ok(())
}

/// List all indexed workspaces
pub fn list_indexes() -> Result<()> {
    let codebases = list_indexed_codebases()?;

    if codebases.is_empty() {
        println!("No indexed workspaces found.");
        return Ok(());
    }

    println!("Indexed Workspaces");
    println!("==================");
    println!();

    for codebase in codebases {
        let status = if codebase.root_path.exists() { "" } else { " [missing]" };
        println!("  {}{}", codebase.root_path.display(), status);
        println!(
            "    Index: {} ({})",
            codebase.index_dir.display(),
            format_size(codebase.size_bytes)
        );
        println!();
    }

    Ok(())
}

/// Format byte size to human readable
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Format unix timestamp
fn format_timestamp(ts: u64) -> String {
    use std::time::{Duration, UNIX_EPOCH};
    format!("{:?}", UNIX_EPOCH + Duration::from_secs(ts))
}
