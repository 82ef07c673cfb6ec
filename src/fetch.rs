//! HTTP download of the database file.
//!
//! The whole body is buffered and written in one go. There is no resume,
//! no checksum and no retry: whatever the server sends is what lands on disk.

use reqwest::blocking::Client;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::config::SnapshotConfig;
use crate::error::{Error, Result};

/// Blocking HTTP client used to fetch database files
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Create a fetcher with the user agent from the given config
    pub fn from_config(config: &SnapshotConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .build()
            .map_err(|source| Error::Http {
                url: config.url.clone(),
                source,
            })?;
        Ok(Self { client })
    }

    /// GET `url` and write the response body to `dest_path`, replacing any
    /// existing file. Returns the number of bytes written.
    pub fn download(&self, url: &str, dest_path: &Path) -> Result<u64> {
        debug!("Downloading {} to {}", url, dest_path.display());

        let http_err = |source| Error::Http {
            url: url.to_string(),
            source,
        };
        let response = self.client.get(url).send().map_err(http_err)?;

        let status = response.status();
        if !status.is_success() {
            warn!("{} answered with status {}, writing body anyway", url, status);
        }

        let body = response.bytes().map_err(http_err)?;
        fs::write(dest_path, &body).map_err(|source| Error::Io {
            path: dest_path.to_path_buf(),
            source,
        })?;

        info!(
            "Database downloaded and saved to {} ({} bytes).",
            dest_path.display(),
            body.len()
        );
        Ok(body.len() as u64)
    }
}

/// Download with a default client. See [`Fetcher::download`].
pub fn download(url: &str, dest_path: impl AsRef<Path>) -> Result<u64> {
    let config = SnapshotConfig::new(url, dest_path.as_ref());
    Fetcher::from_config(&config)?.download(url, dest_path.as_ref())
}
