//! Document loader: reads a directory of text files into owned `Document`s.
//!
//! Order is deterministic (lexicographic by relative path). Unreadable and
//! non-UTF-8 files are skipped with a warning rather than failing the whole
//! load, matching the behavior of typical directory readers.

use crate::error::LoadError;
use crate::types::Document;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// File extensions treated as text documents by default.
pub const DEFAULT_EXTENSIONS: &[&str] = &["txt", "md", "rst", "html", "json", "yaml", "toml"];

/// Loads documents from a directory tree.
pub struct DocumentLoader {
    extensions: Vec<String>,
}

impl Default for DocumentLoader {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect())
    }
}

impl DocumentLoader {
    /// Create a loader accepting the given file extensions (lowercase, no dot).
    pub fn new(extensions: Vec<String>) -> Self {
        Self { extensions }
    }

    /// Load every readable text file under `dir`, one `Document` per file,
    /// sorted lexicographically by relative path.
    ///
    /// Fails with [`LoadError::DirectoryNotFound`] if `dir` does not exist.
    /// Files that cannot be read or are not valid UTF-8 are skipped with a
    /// warning.
    pub fn load(&self, dir: &Path) -> Result<Vec<Document>, LoadError> {
        if !dir.exists() {
            return Err(LoadError::DirectoryNotFound {
                path: dir.to_path_buf(),
            });
        }
        if !dir.is_dir() {
            return Err(LoadError::NotADirectory {
                path: dir.to_path_buf(),
            });
        }

        let mut documents = Vec::new();
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable directory entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            if !self.accepts(entry.path()) {
                debug!(path = %entry.path().display(), "Skipping file with unsupported extension");
                continue;
            }

            let text = match std::fs::read_to_string(entry.path()) {
                Ok(t) => t,
                Err(e) => {
                    warn!(path = %entry.path().display(), error = %e, "Skipping unreadable file");
                    continue;
                }
            };

            let id = entry
                .path()
                .strip_prefix(dir)
                .unwrap_or(entry.path())
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            documents.push(Document::new(id, entry.path(), text));
        }

        // WalkDir's sorted traversal is per-directory; sort by id so nested
        // trees come out in a single lexicographic order.
        documents.sort_by(|a, b| a.id.cmp(&b.id));

        debug!(count = documents.len(), dir = %dir.display(), "Loaded documents");
        Ok(documents)
    }

    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| {
                let lowered = e.to_lowercase();
                self.extensions.iter().any(|allowed| allowed == &lowered)
            })
            .unwrap_or(false)
    }
}
