use std::path::{Path, PathBuf};

/// Errors surfaced by an explicit index load.
///
/// Queries never return this; they degrade to empty results instead.
#[derive(Debug, Clone, thiserror::Error)]
pub enum IndexError {
    /// The backing file is missing, unreadable, or does not decode. The
    /// external indexer has to be re-run.
    #[error("SCIP index at {} needs to be regenerated: {message}", .path.display())]
    NeedsReindex { path: PathBuf, message: String },
}

impl IndexError {
    pub(crate) fn needs_reindex(path: &Path, cause: impl std::fmt::Display) -> Self {
        IndexError::NeedsReindex {
            path: path.to_path_buf(),
            message: cause.to_string(),
        }
    }

    /// Message of the underlying failure.
    pub fn message(&self) -> &str {
        match self {
            IndexError::NeedsReindex { message, .. } => message,
        }
    }
}
