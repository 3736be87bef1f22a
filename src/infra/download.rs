//! Archive fetching
//!
//! Streams branch snapshot archives from the hosting service to disk,
//! creating parent directories as needed. The pipeline fetches one archive
//! at a time and treats every network or filesystem error as fatal; there
//! is no retry at this layer. The size and content digest of each fetch are
//! debug-logged so two runs can be compared after the fact.

use std::path::Path;
use std::time::Duration;

use futures::StreamExt;
use sha2::{Digest, Sha256};
use tokio::io::AsyncWriteExt;

use crate::error::DownloadError;

fn network_error(url: &str, error: impl std::fmt::Display) -> DownloadError {
    DownloadError::NetworkError {
        url: url.to_string(),
        error: error.to_string(),
    }
}

fn io_error(path: &Path, error: impl std::fmt::Display) -> DownloadError {
    DownloadError::IoError {
        path: path.to_path_buf(),
        error: error.to_string(),
    }
}

/// HTTP client for fetching source archives
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
}

impl HttpClient {
    /// Create a client with timeouts suited to large archive fetches
    pub fn new() -> Self {
        Self {
            inner: reqwest::Client::builder()
                .timeout(Duration::from_secs(300))
                .connect_timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    /// Stream the archive at `url` into `dest`
    ///
    /// Returns the number of bytes written.
    pub async fn download(&self, url: &str, dest: &Path) -> Result<u64, DownloadError> {
        let response = self
            .inner
            .get(url)
            .send()
            .await
            .map_err(|e| network_error(url, e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(network_error(url, format!("HTTP {status}")));
        }

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error(parent, e))?;
        }
        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| io_error(dest, e))?;

        let mut digest = Sha256::new();
        let mut written: u64 = 0;
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| network_error(url, e))?;
            file.write_all(&chunk).await.map_err(|e| io_error(dest, e))?;
            digest.update(&chunk);
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(|e| io_error(dest, e))?;

        tracing::debug!(
            url,
            size = written,
            digest = %hex::encode(digest.finalize()),
            "fetched archive"
        );
        Ok(written)
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}
