//! Server configuration read from the environment.

use std::env;
use std::net::SocketAddr;

use insightlens::ingestion::DEFAULT_MAX_ROWS;

/// Default bind address.
pub const DEFAULT_ADDR: &str = "127.0.0.1:8000";

/// Default upload size limit in megabytes.
pub const DEFAULT_MAX_UPLOAD_MB: usize = 25;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// Uploads with more data rows than this are rejected with 413.
    pub max_rows: usize,
    /// Request body limit for `/upload`, in bytes.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            max_rows: DEFAULT_MAX_ROWS,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// Load from `INSIGHTLENS_ADDR`, `INSIGHTLENS_MAX_ROWS` and
    /// `INSIGHTLENS_MAX_UPLOAD_MB`, falling back to defaults for unset ones.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let addr = lookup("INSIGHTLENS_ADDR")
            .unwrap_or_else(|| DEFAULT_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| anyhow::anyhow!("Invalid INSIGHTLENS_ADDR: {}", e))?;

        let max_rows = match lookup("INSIGHTLENS_MAX_ROWS") {
            Some(raw) => raw
                .parse::<usize>()
                .map_err(|e| anyhow::anyhow!("Invalid INSIGHTLENS_MAX_ROWS {:?}: {}", raw, e))?,
            None => DEFAULT_MAX_ROWS,
        };

        let max_upload_mb = match lookup("INSIGHTLENS_MAX_UPLOAD_MB") {
            Some(raw) => raw.parse::<usize>().map_err(|e| {
                anyhow::anyhow!("Invalid INSIGHTLENS_MAX_UPLOAD_MB {:?}: {}", raw, e)
            })?,
            None => DEFAULT_MAX_UPLOAD_MB,
        };

        Ok(Self {
            addr,
            max_rows,
            max_upload_bytes: max_upload_mb * 1024 * 1024,
        })
    }
}
