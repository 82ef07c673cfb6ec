//! Error types. [`ConnectError`] is handed back to the caller to handle;
//! every [`Error`] aborts the run.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures that abort a run.
#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request to '{url}' failed")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("file operation failed on '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read the table catalog")]
    Catalog(#[source] rusqlite::Error),

    #[error("failed to scan table '{table}'")]
    Scan {
        table: String,
        #[source]
        source: rusqlite::Error,
    },

    /// The name was not returned by the catalog, so it is never put into SQL.
    #[error("table '{0}' is not in the database catalog")]
    UnknownTable(String),

    #[error("failed to close database connection")]
    Close(#[source] rusqlite::Error),
}

/// Opening the database failed. Reported and handed back to the caller
/// instead of aborting the run.
#[derive(Error, Debug)]
#[error("error connecting to database '{path}': {source}")]
pub struct ConnectError {
    pub path: PathBuf,
    #[source]
    pub source: rusqlite::Error,
}
