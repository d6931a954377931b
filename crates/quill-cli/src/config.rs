//! CLI configuration: `~/.config/quill/config.toml`.
//!
//! ```toml
//! store = "/home/me/.local/share/quill/records.json"
//! secret = "hunter2"
//! relays = ["wss://relay.example.com"]
//! ```
//!
//! Every field is optional and every flag overrides its config value. The
//! relay list is carried for the transport layer that fetches records; the
//! reconciliation commands themselves only read the local store.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Path of the record store file.
    pub store: Option<PathBuf>,
    /// Signing secret for the development signer.
    pub secret: Option<String>,
    /// Relays the transport layer should fetch from.
    #[serde(default)]
    pub relays: Vec<String>,
}

impl Config {
    /// Default config file location (`<config dir>/quill/config.toml`).
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("quill").join("config.toml"))
    }

    /// Load from the default location; a missing file is an empty config.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read or parsed.
    pub fn load() -> anyhow::Result<Self> {
        Self::default_path().map_or_else(|| Ok(Self::default()), |path| Self::load_from(&path))
    }

    /// Load from an explicit path; a missing file is an empty config.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Store path after defaulting: config value, else
    /// `<data dir>/quill/records.json`, else `./records.json`.
    #[must_use]
    pub fn store_path(&self) -> PathBuf {
        self.store.clone().unwrap_or_else(|| {
            dirs::data_dir().map_or_else(
                || PathBuf::from("records.json"),
                |dir| dir.join("quill").join("records.json"),
            )
        })
    }
}
