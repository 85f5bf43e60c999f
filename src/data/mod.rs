//! Dataset registry: the JSON-backed collection of dataset descriptors and the
//! operations that read, mutate and persist it.

pub mod entry;
pub mod registry;
pub mod store;
pub mod validate;

pub use entry::{DatasetCollection, DatasetEntry, DatasetPatch, NewDataset};
pub use registry::{DatasetRegistry, ErrorKind, Outcome, RegistryError};
