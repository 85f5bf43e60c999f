//! Credentials for the third-party dataset host, loaded once at startup.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("credentials file '{path}' could not be read: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("credentials file '{path}' is not valid JSON credentials: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("credentials file '{path}' has a blank '{field}'")]
    Blank { path: PathBuf, field: &'static str },
}

/// `{"username": ..., "key": ...}`. `Debug` never prints the key.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    username: String,
    key: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            key: key.into(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, CredentialsError> {
        let raw = fs::read_to_string(path).map_err(|source| CredentialsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let credentials: Credentials =
            serde_json::from_str(&raw).map_err(|source| CredentialsError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        for (field, value) in [("username", &credentials.username), ("key", &credentials.key)] {
            if value.trim().is_empty() {
                return Err(CredentialsError::Blank {
                    path: path.to_path_buf(),
                    field,
                });
            }
        }
        Ok(credentials)
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// The key with all but its last four characters replaced by `*`.
    pub fn masked_key(&self) -> String {
        let visible = 4;
        let len = self.key.chars().count();
        if len <= visible {
            return "*".repeat(len);
        }
        let tail: String = self.key.chars().skip(len - visible).collect();
        format!("{}{tail}", "*".repeat(len - visible))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("key", &self.masked_key())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_reads_username_and_key() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("kaggle.json");
        fs::write(&path, r#"{"username": "ada", "key": "0123456789abcdef"}"#).expect("seed");

        let credentials = Credentials::load(&path).expect("credentials should load");
        assert_eq!(credentials, Credentials::new("ada", "0123456789abcdef"));
    }

    #[test]
    fn load_fails_on_missing_file_or_bad_shape() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("absent.json");
        assert!(matches!(
            Credentials::load(&missing),
            Err(CredentialsError::Read { .. })
        ));

        let wrong = dir.path().join("wrong.json");
        fs::write(&wrong, r#"{"username": "ada"}"#).expect("seed");
        assert!(matches!(
            Credentials::load(&wrong),
            Err(CredentialsError::Parse { .. })
        ));

        let blank = dir.path().join("blank.json");
        fs::write(&blank, r#"{"username": "ada", "key": " "}"#).expect("seed");
        assert!(matches!(
            Credentials::load(&blank),
            Err(CredentialsError::Blank { field: "key", .. })
        ));
    }

    #[test]
    fn debug_output_masks_the_key() {
        let credentials = Credentials::new("ada", "0123456789abcdef");
        let debug = format!("{credentials:?}");
        assert!(debug.contains("ada"));
        assert!(debug.contains("************cdef"));
        assert!(!debug.contains("0123456789"));
        assert_eq!(Credentials::new("ada", "abc").masked_key(), "***");
    }
}
