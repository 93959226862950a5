//! Error types for jukebox-bot
//!
//! Command-level errors are turned into private replies by the dispatcher.
//! Only [`Error::BackendFatal`] is allowed to end the process.

use std::time::Duration;
use thiserror::Error;

/// Main error type for jukebox-bot
#[derive(Error, Debug)]
pub enum Error {
    /// Resolver found nothing for the query
    #[error("Nothing matched: {0}")]
    NotFound(String),

    /// Undo requested with an empty add history
    #[error("Nothing to undo")]
    EmptyHistory,

    /// Resolver did not answer within its bound
    #[error("Resolution timed out after {0:?}")]
    ResolutionTimeout(Duration),

    /// Unrecoverable streaming or session failure
    #[error("Backend failure: {0}")]
    BackendFatal(String),

    /// Malformed command argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Catalog content is inconsistent
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Errors from the shared library (config, IO, TOML)
    #[error(transparent)]
    Common(#[from] jukebox_common::Error),
}

impl Error {
    /// True for errors that must terminate the coordinator
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::BackendFatal(_))
    }
}

/// Convenience Result type using jukebox-bot Error
pub type Result<T> = std::result::Result<T, Error>;
