//! Process configuration, read once at startup and passed down explicitly.

use std::env;
use std::path::PathBuf;

pub mod credentials;

pub use credentials::{Credentials, CredentialsError};

use crate::data::registry::DEFAULT_REGISTRY_PATH;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_CREDENTIALS_PATH: &str = "config/kaggle.json";

pub const BIND_ENV: &str = "DATASETS_BIND";
pub const REGISTRY_PATH_ENV: &str = "DATASETS_REGISTRY_PATH";
pub const CREDENTIALS_PATH_ENV: &str = "DATASETS_CREDENTIALS_PATH";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub registry_path: PathBuf,
    pub credentials_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            registry_path: PathBuf::from(DEFAULT_REGISTRY_PATH),
            credentials_path: PathBuf::from(DEFAULT_CREDENTIALS_PATH),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; blank values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();
        Self {
            bind_addr: read(BIND_ENV).unwrap_or(defaults.bind_addr),
            registry_path: read(REGISTRY_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.registry_path),
            credentials_path: read(CREDENTIALS_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.credentials_path),
        }
    }
}
