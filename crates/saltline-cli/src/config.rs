//! Configuration file and flag overrides.
//!
//! ```toml
//! chunk_size = 65536
//! log_level = "info"
//! uppercase_hex = true
//! rekey_interval = 0
//! ```
//!
//! Every field is optional. Command-line flags win over file values.

use std::path::Path;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

/// Smallest accepted stream chunk size.
pub const MIN_CHUNK_SIZE: usize = 1024;

/// Largest accepted stream chunk size.
pub const MAX_CHUNK_SIZE: usize = 16 * 1024 * 1024;

/// Runtime settings for the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Plaintext bytes per stream chunk
    pub chunk_size: usize,
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String,
    /// Emit uppercase hex
    pub uppercase_hex: bool,
    /// Chunks between REKEY markers when encrypting; 0 disables
    pub rekey_interval: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chunk_size: 64 * 1024,
            log_level: "info".to_owned(),
            uppercase_hex: true,
            rekey_interval: 0,
        }
    }
}

/// Values given on the command line, applied over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// `--log-level`
    pub log_level: Option<String>,
    /// `--chunk-size`
    pub chunk_size: Option<usize>,
    /// `--lowercase`
    pub lowercase: bool,
    /// `--rekey-interval`
    pub rekey_interval: Option<u64>,
}

impl Config {
    /// Parse TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).context("invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("loading config {}", path.display()))
    }

    /// Apply command-line overrides and re-validate.
    pub fn with_overrides(mut self, overrides: Overrides) -> Result<Self> {
        if let Some(level) = overrides.log_level {
            self.log_level = level;
        }
        if let Some(size) = overrides.chunk_size {
            self.chunk_size = size;
        }
        if overrides.lowercase {
            self.uppercase_hex = false;
        }
        if let Some(interval) = overrides.rekey_interval {
            self.rekey_interval = interval;
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        check_chunk_size(self.chunk_size)
    }

    /// Hex in the configured case.
    pub fn hex(&self, bytes: &[u8]) -> String {
        if self.uppercase_hex {
            saltline_core::encoding::to_hex(bytes)
        } else {
            saltline_core::encoding::to_hex_lower(bytes)
        }
    }
}

/// Chunk sizes must lie in `MIN_CHUNK_SIZE..=MAX_CHUNK_SIZE`.
pub fn check_chunk_size(size: usize) -> Result<()> {
    ensure!(
        (MIN_CHUNK_SIZE..=MAX_CHUNK_SIZE).contains(&size),
        "chunk size {size} outside {MIN_CHUNK_SIZE}..={MAX_CHUNK_SIZE}"
    );
    Ok(())
}
