//! Run settings and their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_URL: &str =
    "https://techassessment.blob.core.windows.net/aiap-preparatory-bootcamp/score.db";
pub const DEFAULT_DB_PATH: &str = "score.db";
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

/// Settings for one download-and-load run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Where the database file is fetched from
    pub url: String,
    /// Local path the download is written to and opened from
    pub db_path: PathBuf,
    /// User agent sent with the HTTP request
    pub user_agent: String,
    /// Rows printed per table by the binary
    pub preview_rows: usize,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
            preview_rows: DEFAULT_PREVIEW_ROWS,
        }
    }
}

impl SnapshotConfig {
    /// Create a config for the given source and destination
    pub fn new(url: impl Into<String>, db_path: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            db_path: db_path.into(),
            ..Self::default()
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_preview_rows(mut self, rows: usize) -> Self {
        self.preview_rows = rows;
        self
    }
}
