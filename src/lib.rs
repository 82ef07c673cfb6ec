//! Download a SQLite database and load its tables into memory.
//!
//! # Intention
//!
//! - Fetch a database file over HTTP and store it locally.
//! - Open it, list its tables and read each one into a [`TableSnapshot`].
//!
//! # Architectural Boundaries
//!
//! - SQLite parsing is left to `rusqlite`; nothing here reads the file format.
//! - Snapshots are read-only copies. Nothing is written back to the database.

pub mod config;
pub mod error;
pub mod fetch;
pub mod snapshot;
pub mod sqlite;

pub use config::SnapshotConfig;
pub use error::{ConnectError, Error, Result};
pub use fetch::{download, Fetcher};
pub use snapshot::{Column, ColumnType, TableSnapshot, Tables, Value};
pub use sqlite::{connect, load_all_tables, Database};
