//! Knowledge-directory loading.
//!
//! The corpus is a flat directory of text files (markdown in practice).
//! Files that cannot be read as UTF-8 are skipped with a warning so one bad
//! file does not block retrieval.

use std::fs;
use std::path::Path;

use tracing::{info, warn};

use super::store::Document;
use crate::error::RetrievalError;

/// Loads every regular file in `dir` as a document.
///
/// Entries are returned sorted by file name for deterministic ordering.
/// A missing directory yields an empty corpus.
///
/// # Errors
///
/// Returns [`RetrievalError::Corpus`] if the directory exists but cannot
/// be listed.
pub fn load_dir(dir: &Path) -> Result<Vec<Document>, RetrievalError> {
    if !dir.exists() {
        warn!(dir = %dir.display(), "knowledge directory does not exist");
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(dir).map_err(|e| RetrievalError::Corpus {
        path: dir.display().to_string(),
        message: e.to_string(),
    })?;

    let mut paths: Vec<_> = entries
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    paths.sort();

    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        match fs::read_to_string(&path) {
            Ok(text) => {
                documents.push(Document::new(name, text));
            }
            Err(e) => {
                warn!(file = %path.display(), error = %e, "skipping unreadable file");
            }
        }
    }

    info!(dir = %dir.display(), documents = documents.len(), "loaded knowledge directory");
    Ok(documents)
}
