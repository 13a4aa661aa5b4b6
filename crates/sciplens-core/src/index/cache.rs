use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use super::error::IndexError;
use super::model::ScipIndex;

type Slot = Arc<OnceCell<Arc<ScipIndex>>>;

/// Lazily loaded, explicitly invalidated owner of the decoded index.
///
/// States are *Unloaded* (empty cell) and *Loaded* (filled cell). A failed
/// load leaves the cell empty, so the next caller tries again. Concurrent
/// callers on an empty cell wait on the same in-flight load instead of each
/// decoding the file.
#[derive(Debug)]
pub struct IndexCache {
    path: PathBuf,
    slot: Mutex<Slot>,
}

impl IndexCache {
    /// Create an unloaded cache backed by the index file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            slot: Mutex::new(Slot::default()),
        }
    }

    /// The backing index file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the backing file exists. Never fails; an unreadable parent
    /// directory counts as "does not exist".
    ///
    /// Lets a host tell "never indexed" apart from "index is corrupt" before
    /// it runs a query.
    pub async fn index_exists(&self) -> bool {
        tokio::fs::try_exists(&self.path).await.unwrap_or(false)
    }

    /// Load the index if it is not already loaded.
    ///
    /// Idempotent once loaded. Any read or decode failure leaves the cache
    /// unloaded and returns [`IndexError::NeedsReindex`].
    pub async fn load(&self) -> Result<Arc<ScipIndex>, IndexError> {
        let slot = self.current_slot();
        let result = slot
            .get_or_try_init(|| read_index(&self.path))
            .await
            .cloned();
        if let Err(err) = &result {
            warn!(path = %self.path.display(), error = %err.message(), "SCIP index load failed");
        }
        result
    }

    /// The loaded index, loading it first if needed. `None` when loading fails.
    pub async fn get(&self) -> Option<Arc<ScipIndex>> {
        match self.load().await {
            Ok(index) => Some(index),
            Err(_) => {
                debug!(path = %self.path.display(), "SCIP index unavailable, returning empty result");
                None
            }
        }
    }

    /// Drop the loaded index so the next access reads the file again.
    ///
    /// Loads already in flight finish against the old slot; their callers see
    /// the index as it was when they started.
    pub fn clear(&self) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Slot::default();
        debug!(path = %self.path.display(), "SCIP index cache cleared");
    }

    /// Whether an index is currently held in memory.
    pub fn is_loaded(&self) -> bool {
        self.current_slot().initialized()
    }

    fn current_slot(&self) -> Slot {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&slot)
    }
}

async fn read_index(path: &Path) -> Result<Arc<ScipIndex>, IndexError> {
    debug!(path = %path.display(), "Loading SCIP index");

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| IndexError::needs_reindex(path, e))?;
    let size = bytes.len();

    // Decoding is CPU-bound.
    let index = tokio::task::spawn_blocking(move || ScipIndex::decode(&bytes))
        .await
        .map_err(|e| IndexError::needs_reindex(path, e))?
        .map_err(|e| IndexError::needs_reindex(path, e))?;

    info!(
        path = %path.display(),
        bytes = size,
        documents = index.documents.len(),
        "SCIP index loaded"
    );
    Ok(Arc::new(index))
}
