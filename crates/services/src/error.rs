//! Shared error types for the services crate.

use thiserror::Error;

use academy_core::model::SettingsError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `ProgressService`.
///
/// Catalog misses are never errors; only the store can fail.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `SettingsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SettingsServiceError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by a `MessagesClient`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MessagesError {
    #[error("messages API returned an empty response")]
    EmptyResponse,
    #[error("messages API request failed with status {status}: {message}")]
    HttpStatus {
        status: reqwest::StatusCode,
        message: String,
    },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by `PlaygroundService`.
///
/// A failed model call is not one of these; it is recorded on the session.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PlaygroundError {
    #[error("no API key configured for {0}")]
    MissingApiKey(&'static str),
    #[error("invalid session import: {0}")]
    InvalidImport(#[source] serde_json::Error),
    #[error("failed to export sessions: {0}")]
    Export(#[source] serde_json::Error),
    #[error(transparent)]
    Settings(#[from] SettingsServiceError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
