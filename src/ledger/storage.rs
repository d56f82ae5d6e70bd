//! Durable storage for the ledger
//!
//! The ledger rewrites its whole state on every mutation. Writes land in a
//! sibling `.tmp` file which is synced and then renamed over the store, so a
//! crash never leaves a half-written ledger behind.

use crate::ledger::{LedgerResult, LedgerState, StorageError};
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Backend the ledger loads from and flushes to
#[cfg_attr(test, mockall::automock)]
pub trait WarningStorage: Send + Sync {
    /// Load the full ledger; a missing store is an empty ledger
    fn load(&self) -> LedgerResult<LedgerState>;

    /// Replace the stored ledger with `state`, returning once it is durable
    fn persist(&self, state: &LedgerState) -> LedgerResult<()>;
}

/// YAML file backed storage
#[derive(Debug, Clone)]
pub struct YamlFileStorage {
    path: PathBuf,
}

impl YamlFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the ledger file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling of the store with `.tmp` appended to the full file name
    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(path: &Path, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn write_synced(path: &Path, contents: &[u8]) -> Result<(), StorageError> {
        let mut file = File::create(path).map_err(|e| Self::io_error(path, e))?;
        file.write_all(contents)
            .and_then(|()| file.sync_all())
            .map_err(|e| Self::io_error(path, e))
    }

    #[cfg(unix)]
    fn sync_dir(dir: &Path) -> Result<(), StorageError> {
        File::open(dir)
            .and_then(|handle| handle.sync_all())
            .map_err(|e| Self::io_error(dir, e))
    }

    #[cfg(not(unix))]
    fn sync_dir(_dir: &Path) -> Result<(), StorageError> {
        Ok(())
    }
}

impl WarningStorage for YamlFileStorage {
    fn load(&self) -> LedgerResult<LedgerState> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No ledger at {}, starting empty", self.path.display());
                return Ok(LedgerState::default());
            }
            Err(e) => return Err(Self::io_error(&self.path, e).into()),
        };

        if contents.trim().is_empty() {
            return Ok(LedgerState::default());
        }

        serde_yaml::from_str(&contents).map_err(|source| {
            StorageError::Corrupt {
                path: self.path.clone(),
                source,
            }
            .into()
        })
    }

    fn persist(&self, state: &LedgerState) -> LedgerResult<()> {
        let yaml = serde_yaml::to_string(state).map_err(StorageError::Encode)?;

        let parent = self
            .path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty());
        if let Some(dir) = parent {
            fs::create_dir_all(dir).map_err(|e| Self::io_error(dir, e))?;
        }

        let tmp_path = self.tmp_path();
        Self::write_synced(&tmp_path, yaml.as_bytes())?;
        fs::rename(&tmp_path, &self.path).map_err(|e| Self::io_error(&self.path, e))?;
        Self::sync_dir(parent.unwrap_or_else(|| Path::new(".")))?;

        Ok(())
    }
}
