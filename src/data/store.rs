//! Reading and persisting the registry file.
//!
//! The file is always rewritten in full. Writes go to a temporary file next to
//! the target which is then renamed over it, so readers never see a partially
//! written collection.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tempfile::NamedTempFile;
use tracing::{error, warn};

use crate::data::entry::DatasetCollection;
use crate::data::registry::RegistryError;

const INDENT: &[u8] = b"    ";

pub fn read_collection(path: &Path) -> Result<DatasetCollection, RegistryError> {
    let raw = fs::read(path).map_err(|err| {
        warn!(path = %path.display(), error = %err, "dataset configuration file unreadable");
        RegistryError::ConfigurationMissing(err)
    })?;
    // Bytes that are not UTF-8 are rejected by the parser, not by the read.
    serde_json::from_slice(&raw).map_err(|err| {
        warn!(path = %path.display(), error = %err, "dataset configuration file is not a valid collection");
        RegistryError::ConfigurationCorrupt(err)
    })
}

pub fn write_collection(path: &Path, collection: &DatasetCollection) -> Result<(), RegistryError> {
    persist(path, collection).map_err(|err| {
        error!(path = %path.display(), error = %err, "failed to persist dataset configuration file");
        RegistryError::PersistenceFailure(err)
    })
}

/// Serializes the collection the way it is stored on disk: 4-space indented,
/// newline terminated.
pub fn to_pretty_json(collection: &DatasetCollection) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(INDENT));
    collection.serialize(&mut serializer).map_err(io::Error::from)?;
    out.push(b'\n');
    Ok(out)
}

fn persist(path: &Path, collection: &DatasetCollection) -> io::Result<()> {
    let bytes = to_pretty_json(collection)?;
    replace_file(path, |tmp| tmp.write_all(&bytes))
}

/// Fills a temporary sibling of `path` with `fill`, then renames it over
/// `path`. If `fill` fails the temporary file is dropped and `path` is left
/// as it was.
fn replace_file<F>(path: &Path, fill: F) -> io::Result<()>
where
    F: FnOnce(&mut NamedTempFile) -> io::Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    if let Ok(meta) = fs::metadata(path) {
        tmp.as_file().set_permissions(meta.permissions())?;
    }
    fill(&mut tmp)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}
