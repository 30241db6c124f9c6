//! Directory loader: every readable file becomes one document.

use std::fs;
use std::path::Path;

use tracing::{info, warn};

use askdocs_core::{AskdocsError, Document, Result};

/// Load every readable file in `data_dir` into a document.
///
/// Files are visited in name order so repeated runs produce the same
/// document sequence. Unreadable files are skipped with a warning;
/// subdirectories are ignored.
pub fn load_documents(data_dir: &Path) -> Result<Vec<Document>> {
    if !data_dir.is_dir() {
        return Err(AskdocsError::SourceDirMissing {
            path: data_dir.to_path_buf(),
        });
    }

    let mut paths: Vec<_> = fs::read_dir(data_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    paths.sort();

    let mut documents = Vec::with_capacity(paths.len());

    for path in paths {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        match fs::read_to_string(&path) {
            Ok(text) => {
                info!("Loaded {} ({} bytes)", file_name, text.len());
                documents.push(Document::new(&file_name, text));
            }
            Err(e) => {
                warn!("Skipping unreadable file {}: {}", file_name, e);
            }
        }
    }

    if documents.is_empty() {
        return Err(AskdocsError::SourceDirEmpty {
            path: data_dir.to_path_buf(),
        });
    }

    info!("Loaded {} document(s) from {:?}", documents.len(), data_dir);

    Ok(documents)
}
