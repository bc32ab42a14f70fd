use std::path::PathBuf;

/// Kind of file change detected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Created,
    Modified,
    Deleted,
}

/// A single file change, path relative to the watched root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

/// Accumulated changes ready to be applied to the index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeBatch {
    pub created: Vec<PathBuf>,
    pub modified: Vec<PathBuf>,
    pub deleted: Vec<PathBuf>,
}

impl ChangeBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.modified.is_empty() && self.deleted.is_empty()
    }

    pub fn total_changes(&self) -> usize {
        self.created.len() + self.modified.len() + self.deleted.len()
    }

    /// Add a change, deduplicating per path
    pub fn add(&mut self, change: FileChange) {
        match change.kind {
            ChangeKind::Created => {
                if !self.created.contains(&change.path) {
                    self.created.push(change.path);
                }
            }
            ChangeKind::Modified => {
                if !self.created.contains(&change.path) && !self.modified.contains(&change.path) {
                    self.modified.push(change.path);
                }
            }
            ChangeKind::Deleted => {
                self.created.retain(|p| p != &change.path);
                self.modified.retain(|p| p != &change.path);
                if !self.deleted.contains(&change.path) {
                    self.deleted.push(change.path);
                }
            }
        }
    }

    /// Paths whose current contents need (re)indexing
    pub fn upserts(&self) -> impl Iterator<Item = &PathBuf> {
        self.created.iter().chain(self.modified.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(path: &str, kind: ChangeKind) -> FileChange {
        FileChange {
            path: PathBuf::from(path),
            kind,
        }
    }

    #[test]
    fn test_create_then_modify_stays_created() {
        let mut batch = ChangeBatch::new();
        batch.add(change("notes.txt", ChangeKind::Created));
        batch.add(change("notes.txt", ChangeKind::Modified));
        assert_eq!(batch.created.len(), 1);
        assert!(batch.modified.is_empty());
    }

    #[test]
    fn test_delete_clears_pending_upserts() {
        let mut batch = ChangeBatch::new();
        batch.add(change("a.txt", ChangeKind::Created));
        batch.add(change("b.txt", ChangeKind::Modified));
        batch.add(change("a.txt", ChangeKind::Deleted));
        batch.add(change("b.txt", ChangeKind::Deleted));
        assert!(batch.created.is_empty());
        assert!(batch.modified.is_empty());
        assert_eq!(batch.deleted.len(), 2);
    }

    #[test]
    fn test_repeated_modifications_once() {
        let mut batch = ChangeBatch::new();
        for _ in 0..3 {
            batch.add(change("file.txt", ChangeKind::Modified));
        }
        assert_eq!(batch.total_changes(), 1);
    }

    #[test]
    fn test_upserts() {
        let mut batch = ChangeBatch::new();
        batch.add(change("a.txt", ChangeKind::Created));
        batch.add(change("b.txt", ChangeKind::Modified));
        batch.add(change("c.txt", ChangeKind::Deleted));
        let upserts: Vec<_> = batch.upserts().cloned().collect();
        assert_eq!(upserts, vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")]);
        assert!(!batch.is_empty());
    }
}
