//! CLI configuration management.
//!
//! Configuration is stored as TOML:
//! - Linux: `~/.config/relaydrop/config.toml`
//! - Windows: `%APPDATA%/relaydrop/config.toml`

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};

use relaydrop_transfer::{DEFAULT_KEY_PREFIX, DEFAULT_KEY_SUBPATH, KeyLayout};
use relaydrop_uploader::UploaderConfig;

/// Marker left in sample configurations instead of a real endpoint.
const PLACEHOLDER_ENDPOINT: &str = "your-api-gateway";

/// Uploader configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Backend endpoint that hands out pre-signed URLs.
    #[serde(default)]
    pub endpoint: String,

    /// Destination bucket.
    #[serde(default)]
    pub bucket: String,

    /// Bucket region, used for result links.
    #[serde(default)]
    pub region: String,

    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    #[serde(default = "default_key_subpath")]
    pub key_subpath: String,

    /// Multipart chunk size in MiB.
    #[serde(default = "default_chunk_size_mib")]
    pub chunk_size_mib: u64,
}

fn default_key_prefix() -> String {
    DEFAULT_KEY_PREFIX.into()
}

fn default_key_subpath() -> String {
    DEFAULT_KEY_SUBPATH.into()
}

fn default_chunk_size_mib() -> u64 {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            bucket: String::new(),
            region: String::new(),
            key_prefix: default_key_prefix(),
            key_subpath: default_key_subpath(),
            chunk_size_mib: default_chunk_size_mib(),
        }
    }
}

impl Config {
    /// Loads configuration from `path`, or from the default location.
    ///
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => config_path()?,
        };

        if !path.exists() {
            tracing::debug!(path = %path.display(), "no configuration file, using defaults");
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Config =
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Applies command-line overrides.
    pub fn with_overrides(mut self, endpoint: Option<String>, bucket: Option<String>) -> Self {
        if let Some(endpoint) = endpoint {
            self.endpoint = endpoint;
        }
        if let Some(bucket) = bucket {
            self.bucket = bucket;
        }
        self
    }

    /// Chunk size in bytes.
    pub fn chunk_size(&self) -> anyhow::Result<u64> {
        if self.chunk_size_mib == 0 {
            bail!("chunk_size_mib must be greater than zero");
        }
        self.chunk_size_mib
            .checked_mul(1024 * 1024)
            .context("chunk_size_mib is too large")
    }

    /// Checks the settings an upload needs.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.endpoint.trim().is_empty() || self.endpoint.contains(PLACEHOLDER_ENDPOINT) {
            bail!("backend endpoint is not configured; set `endpoint` or pass --endpoint");
        }
        if self.bucket.trim().is_empty() {
            bail!("destination bucket is not configured; set `bucket` or pass --bucket");
        }
        self.chunk_size()?;
        Ok(())
    }

    /// Builds the uploader settings.
    pub fn uploader_config(&self) -> anyhow::Result<UploaderConfig> {
        let mut config = UploaderConfig::new(self.bucket.clone());
        config.region = self.region.clone();
        config.chunk_size = self.chunk_size()?;
        config.layout = KeyLayout {
            prefix: self.key_prefix.clone(),
            subpath: self.key_subpath.clone(),
        };
        Ok(config)
    }
}

/// Returns the platform-specific configuration file path.
fn config_path() -> anyhow::Result<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        let appdata = std::env::var("APPDATA").context("APPDATA is not set")?;
        Ok(PathBuf::from(appdata).join("relaydrop").join("config.toml"))
    }

    #[cfg(not(target_os = "windows"))]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        Ok(PathBuf::from(home)
            .join(".config")
            .join("relaydrop")
            .join("config.toml"))
    }
}
