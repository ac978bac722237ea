//! Configuration for scangate.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Scanner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Verification client configuration.
    #[serde(default)]
    pub verify: VerifyConfig,

    /// Capacity of the session input channel.
    ///
    /// Decode frames arriving while the channel is full are dropped; the
    /// source outpaces the session by design.
    #[serde(default = "default_input_capacity")]
    pub input_capacity: usize,

    /// Log level.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Verification client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyConfig {
    /// Request timeout in seconds.
    ///
    /// Bounds how long a session can sit in `Processing`; a timed-out call
    /// is a transport failure and classifies as `VerificationError`.
    #[serde(default = "default_verify_timeout")]
    pub timeout_secs: u64,
}

impl VerifyConfig {
    /// Request timeout as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            verify: VerifyConfig::default(),
            input_capacity: default_input_capacity(),
            log_level: default_log_level(),
        }
    }
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_verify_timeout(),
        }
    }
}

const fn default_verify_timeout() -> u64 {
    10
}

const fn default_input_capacity() -> usize {
    64
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ScannerConfig {
    /// Default location of the configuration file.
    #[must_use]
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("", "", "scangate")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("scangate.toml"))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Save configuration to a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn to_file(&self, path: &std::path::Path) -> crate::Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
