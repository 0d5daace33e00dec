mod persisted_state;

use crate::error::{Error, ErrorKind};
use crate::AsyncResult;
use log::debug;
pub use persisted_state::{PersistedMigration, PersistedState};
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

/// Read side of the durable migration history.
pub trait StateStore: Send + Sync {
    fn load(&self) -> AsyncResult<'_, PersistedState>;
}

/// Keeps the history as a JSON document on disk.
///
/// ```json
/// { "lastRun": 1700000000000, "migrations": [{ "title": "001-init", "timestamp": 1700000000000 }] }
/// ```
///
/// A missing file is read as an empty history.
#[derive(Clone, Debug)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for FileStateStore {
    fn load(&self) -> AsyncResult<'_, PersistedState> {
        Box::pin(async move {
            let contents = match tokio::fs::read(&self.path).await {
                Ok(contents) => contents,
                Err(e) if e.kind() == IoErrorKind::NotFound => {
                    debug!(target: "creed::migrate", "State file {} does not exist, assuming empty state", self.path.display());
                    return Ok(PersistedState::default());
                }
                Err(e) => return Err(Error::new(ErrorKind::StoreLoadError, e)),
            };

            if contents.iter().all(u8::is_ascii_whitespace) {
                return Ok(PersistedState::default());
            }

            serde_json::from_slice(&contents).map_err(|e| {
                Error::new(
                    ErrorKind::StoreLoadError,
                    format!("Invalid state file {}: {}", self.path.display(), e),
                )
            })
        })
    }
}

/// Serves a fixed history held in memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryStateStore {
    state: PersistedState,
}

impl MemoryStateStore {
    pub fn new(state: PersistedState) -> Self {
        Self { state }
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self) -> AsyncResult<'_, PersistedState> {
        Box::pin(async move { Ok(self.state.clone()) })
    }
}
