use crate::index::cache::INDEX_KEY;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "fuzzdex";

/// Overrides the app data directory (used by tests and sandboxes)
pub const DATA_DIR_ENV: &str = "FUZZDEX_DATA_DIR";

/// Get the application data directory for storing indexes and config
pub fn get_app_data_dir() -> Result<PathBuf> {
    let app_dir = match std::env::var_os(DATA_DIR_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base = if cfg!(target_os = "macos") {
                dirs::home_dir().map(|h| h.join("Library").join("Application Support"))
            } else if cfg!(target_os = "windows") {
                dirs::data_local_dir()
            } else {
                // Linux/Unix: XDG_DATA_HOME or ~/.local/share
                dirs::data_dir()
            };
            base.context("Could not determine app data directory")?
                .join(APP_NAME)
        }
    };

    fs::create_dir_all(&app_dir)
        .with_context(|| format!("Failed to create {}", app_dir.display()))?;
    Ok(app_dir)
}

/// Get the index directory for a specific workspace root
pub fn get_index_dir(root_path: &Path) -> Result<PathBuf> {
    let indexes_dir = get_app_data_dir()?.join("indexes");
    fs::create_dir_all(&indexes_dir)?;
    Ok(indexes_dir.join(hash_path(root_path)))
}

/// Folder name for a workspace: sanitized dir name + hash of the full path
fn hash_path(path: &Path) -> String {
    let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

    let dir_name = canonical
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown");
    let sanitized: String = dir_name
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
        .take(16)
        .collect();

    let mut hasher = DefaultHasher::new();
    canonical.to_string_lossy().hash(&mut hasher);

    format!("{}-{:016x}", sanitized, hasher.finish())
}

fn blob_path(index_dir: &Path) -> PathBuf {
    index_dir.join(format!("{INDEX_KEY}.json"))
}

/// Find the workspace root for a path.
///
/// Walks up looking for a `.git` directory, then for an already indexed
/// ancestor, and falls back to the path itself.
pub fn find_codebase_root(start_path: &Path) -> Result<PathBuf> {
    let start = start_path
        .canonicalize()
        .with_context(|| format!("No such path: {}", start_path.display()))?;

    if let Some(git_root) = start.ancestors().find(|dir| dir.join(".git").exists()) {
        return Ok(git_root.to_path_buf());
    }

    for dir in start.ancestors() {
        if is_indexed(dir)? {
            return Ok(dir.to_path_buf());
        }
    }

    Ok(start)
}

/// Check if a workspace has a stored index
pub fn is_indexed(root_path: &Path) -> Result<bool> {
    Ok(blob_path(&get_index_dir(root_path)?).exists())
}

/// The header fields of a stored snapshot; document tables are skipped
#[derive(Deserialize)]
struct SnapshotHeader {
    root_path: Option<PathBuf>,
    #[serde(default)]
    updated_at: u64,
}

/// List all indexed workspaces
pub fn list_indexed_codebases() -> Result<Vec<IndexLocation>> {
    let indexes_dir = get_app_data_dir()?.join("indexes");
    if !indexes_dir.exists() {
        return Ok(Vec::new());
    }

    let mut codebases = Vec::new();
    for entry in fs::read_dir(&indexes_dir)? {
        let index_dir = entry?.path();
        let blob = blob_path(&index_dir);
        let Ok(file) = fs::File::open(&blob) else {
            continue;
        };
        let header: SnapshotHeader = match serde_json::from_reader(std::io::BufReader::new(file)) {
            Ok(header) => header,
            Err(e) => {
                log::warn!("skipping unreadable index {}: {e}", blob.display());
                continue;
            }
        };
        if let Some(root_path) = header.root_path {
            let size_bytes = fs::metadata(&blob).map(|m| m.len()).unwrap_or(0);
            codebases.push(IndexLocation {
                root_path,
                index_dir,
                updated_at: header.updated_at,
                size_bytes,
            });
        }
    }

    codebases.sort_by(|a, b| a.root_path.cmp(&b.root_path));
    Ok(codebases)
}

/// Remove the stored index for a workspace
pub fn remove_index(root_path: &Path) -> Result<bool> {
    let index_dir = get_index_dir(root_path)?;
    if !index_dir.exists() {
        return Ok(false);
    }
    fs::remove_dir_all(&index_dir)
        .with_context(|| format!("Failed to remove {}", index_dir.display()))?;
    Ok(true)
}

/// Information about an indexed workspace
#[derive(Debug, Clone)]
pub struct IndexLocation {
    pub root_path: PathBuf,
    pub index_dir: PathBuf,
    /// Unix seconds of the last persisted change
    pub updated_at: u64,
    pub size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_path() {
        let hash1 = hash_path(Path::new("/home/user/project"));
        let hash2 = hash_path(Path::new("/home/user/project"));
        let hash3 = hash_path(Path::new("/home/user/other"));

        assert_eq!(hash1, hash2);
        assert_ne!(hash1, hash3);
        assert!(hash1.starts_with("project-"));
    }

    #[test]
    fn test_hash_path_sanitizes_name() {
        let hash = hash_path(Path::new("/tmp/my project!!"));
        assert!(hash.starts_with("myproject-"));
    }

    #[test]
    fn test_blob_path_uses_index_key() {
        let path = blob_path(Path::new("/data/indexes/x"));
        assert_eq!(path, PathBuf::from("/data/indexes/x/fuzzy-index.json"));
    }

    #[test]
    fn test_header_ignores_documents() {
        let json = r#"{"version":1,"root_path":"/w","created_at":1,"updated_at":2,"documents":[]}"#;
        let header: SnapshotHeader = serde_json::from_str(json).unwrap();
        assert_eq!(header.root_path, Some(PathBuf::from("/w")));
        assert_eq!(header.updated_at, 2);
    }
}
