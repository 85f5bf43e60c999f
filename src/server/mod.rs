use std::io;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::{Credentials, ServerConfig};
use crate::data::registry::{DatasetRegistry, RegistryError};

pub mod api;
pub mod docs;
pub mod routes;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind { addr: String, source: io::Error },
    #[error("server error: {0}")]
    Serve(#[from] io::Error),
}

/// Shared by every handler. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct AppState {
    registry: Arc<DatasetRegistry>,
    credentials: Arc<Credentials>,
}

impl AppState {
    pub fn new(registry: DatasetRegistry, credentials: Credentials) -> Self {
        Self {
            registry: Arc::new(registry),
            credentials: Arc::new(credentials),
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Runs a registry call on the blocking pool; registry calls do synchronous file I/O.
    pub async fn with_registry<T, F>(&self, op: F) -> Result<T, api::ApiError>
    where
        F: FnOnce(&DatasetRegistry) -> Result<T, RegistryError> + Send + 'static,
        T: Send + 'static,
    {
        let registry = Arc::clone(&self.registry);
        let result = tokio::task::spawn_blocking(move || op(&registry))
            .await
            .map_err(|err| api::ApiError::Internal(err.to_string()))?;
        result.map_err(api::ApiError::from)
    }
}

pub async fn run_server(config: &ServerConfig, credentials: Credentials) -> Result<(), ServerError> {
    if !config.registry_path.exists() {
        warn!(
            path = %config.registry_path.display(),
            "dataset configuration file does not exist; dataset routes will fail until it is created"
        );
    }

    let state = AppState::new(DatasetRegistry::new(&config.registry_path), credentials);
    info!(
        username = state.credentials().username(),
        "dataset host credentials loaded"
    );

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: config.bind_addr.clone(),
            source,
        })?;
    info!("dataset registry listening on http://{}", config.bind_addr);

    axum::serve(listener, routes::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("dataset registry stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "unable to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
