//! The dataset registry: list, get, add and update over the registry file.
//!
//! Every call re-reads the file; mutating calls rewrite it in full. Add and
//! update hold the registry's write lock across the whole read-modify-write
//! cycle, so two writers sharing one `DatasetRegistry` never drop each other's
//! changes. Writers in other processes are not coordinated.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::data::entry::{DatasetCollection, DatasetEntry, DatasetPatch, NewDataset};
use crate::data::store;

pub const DEFAULT_REGISTRY_PATH: &str = "config/model_parameters.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ConfigurationMissing,
    ConfigurationCorrupt,
    NotFound,
    Conflict,
    PersistenceFailure,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConfigurationMissing => "configuration_missing",
            Self::ConfigurationCorrupt => "configuration_corrupt",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::PersistenceFailure => "persistence_failure",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Registry failures. The display text is safe to show to clients; the
/// underlying I/O or parse error is kept as the source for logging.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Dataset configuration file not found.")]
    ConfigurationMissing(#[source] io::Error),
    #[error("Error decoding the dataset configuration file.")]
    ConfigurationCorrupt(#[source] serde_json::Error),
    #[error("No datasets available in the configuration.")]
    Empty,
    #[error("Dataset '{0}' not found in the configuration.")]
    NotFound(String),
    #[error("Dataset '{0}' already exists.")]
    Conflict(String),
    #[error("Failed to save the updated dataset configuration file.")]
    PersistenceFailure(#[source] io::Error),
}

impl RegistryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigurationMissing(_) => ErrorKind::ConfigurationMissing,
            Self::ConfigurationCorrupt(_) => ErrorKind::ConfigurationCorrupt,
            Self::Empty | Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::PersistenceFailure(_) => ErrorKind::PersistenceFailure,
        }
    }
}

/// A successful registry call: a human-readable message plus its payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome<T> {
    pub message: String,
    pub data: T,
}

impl<T> Outcome<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data,
        }
    }
}

#[derive(Debug)]
pub struct DatasetRegistry {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl DatasetRegistry {
    /// The file at `path` must already exist; the registry never creates it.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn list(&self) -> Result<Outcome<DatasetCollection>, RegistryError> {
        let collection = store::read_collection(&self.path)?;
        if collection.is_empty() {
            return Err(RegistryError::Empty);
        }
        debug!(count = collection.len(), "listed datasets");
        Ok(Outcome::new("All datasets", collection))
    }

    pub fn get(&self, name: &str) -> Result<Outcome<DatasetEntry>, RegistryError> {
        let collection = store::read_collection(&self.path)?;
        let entry = collection
            .get(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        Ok(Outcome::new(format!("Dataset '{name}' found."), entry))
    }

    pub fn add(
        &self,
        name: &str,
        dataset: NewDataset,
    ) -> Result<Outcome<DatasetEntry>, RegistryError> {
        let _guard = self.lock_writes();
        let mut collection = store::read_collection(&self.path)?;
        if collection.contains(name) {
            return Err(RegistryError::Conflict(name.to_string()));
        }

        let entry = DatasetEntry::from(dataset);
        collection.insert(name, entry.clone());
        store::write_collection(&self.path, &collection)?;

        info!(dataset = %name, "dataset added");
        Ok(Outcome::new(format!("Dataset '{name}' added successfully."), entry))
    }

    pub fn update(
        &self,
        name: &str,
        patch: DatasetPatch,
    ) -> Result<Outcome<DatasetEntry>, RegistryError> {
        let _guard = self.lock_writes();
        let mut collection = store::read_collection(&self.path)?;
        let fields = patch.len();
        let entry = collection
            .merge(name, patch)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        store::write_collection(&self.path, &collection)?;

        info!(dataset = %name, fields, "dataset updated");
        Ok(Outcome::new(
            format!("Dataset '{name}' updated successfully."),
            entry,
        ))
    }

    // The guard protects no data, so a poisoned lock is still usable.
    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
