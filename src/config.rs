use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Runtime settings for the HTTP service.
///
/// Loaded from an optional JSON file; any field the file leaves out keeps
/// its default. Command-line flags are applied on top by the binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Where raw uploads are copied (created on demand)
    pub upload_dir: PathBuf,
    /// Largest accepted multipart upload, in bytes
    pub max_upload_bytes: u64,
    /// Serves `index.html` at `/` and other files under `/static/`
    pub static_dir: PathBuf,
    /// Overrides the platform log directory
    pub log_dir: Option<PathBuf>,
    /// Whether to write rolling log files in addition to stdout
    pub log_to_file: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 5000,
            upload_dir: PathBuf::from("uploads"),
            max_upload_bytes: 50 * 1024 * 1024,
            static_dir: PathBuf::from("static"),
            log_dir: None,
            log_to_file: true,
        }
    }
}

impl ServerConfig {
    /// Reads a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or is not valid JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Loads `path` when given, otherwise returns the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    /// Address to bind, validated from `host` and `port`.
    pub fn socket_addr(&self) -> crate::error::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| {
                crate::error::ScourError::Config(format!(
                    "Invalid listen address {}:{}: {e}",
                    self.host, self.port
                ))
            })
    }
}
