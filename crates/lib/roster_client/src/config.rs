//! Client configuration.

use std::path::PathBuf;

use roster_core::storage::FileStore;

/// Base URL used when `ROSTER_API_URL` is unset.
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Configuration for the API client.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// API base URL, without a trailing slash (e.g. "http://localhost:8080").
    pub base_url: String,
    /// Directory holding credentials and the selected server.
    pub data_dir: PathBuf,
    /// Retry budget for reads; 401 responses are never retried.
    pub query_retries: u32,
}

impl ClientConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable               | Default                 |
    /// |------------------------|-------------------------|
    /// | `ROSTER_API_URL`       | `http://localhost:8080` |
    /// | `ROSTER_DATA_DIR`      | `<data dir>/roster`     |
    /// | `ROSTER_QUERY_RETRIES` | `0`                     |
    pub fn from_env() -> Self {
        let base_url = std::env::var("ROSTER_API_URL")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.into());
        Self {
            base_url: normalize_base_url(&base_url),
            data_dir: std::env::var_os("ROSTER_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(FileStore::default_dir),
            query_retries: std::env::var("ROSTER_QUERY_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
        }
    }

    /// Builder-style override of the base URL.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = normalize_base_url(base_url);
        self
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
