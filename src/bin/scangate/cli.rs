//! Command-line interface definition.

use clap::Parser;
use scangate::ScannerConfig;
use std::path::PathBuf;

/// At-the-door ticket verification terminal driven by a QR scan feed.
#[derive(Parser, Debug)]
#[command(name = "scangate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verification request timeout in seconds.
    #[arg(long, env = "SCANGATE_VERIFY_TIMEOUT")]
    pub verify_timeout: Option<u64>,

    /// Capacity of the session input channel.
    #[arg(long, env = "SCANGATE_INPUT_CAPACITY")]
    pub input_capacity: Option<usize>,

    /// Log level.
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    pub log_level: String,

    /// Path to configuration file.
    #[arg(long, short)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Convert CLI arguments into a `ScannerConfig`.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file is specified but cannot be loaded.
    pub fn into_config(self) -> color_eyre::Result<ScannerConfig> {
        // Start with default config or load from file
        let mut config = if let Some(ref path) = self.config {
            ScannerConfig::from_file(path)?
        } else {
            ScannerConfig::default()
        };

        // Override with CLI arguments
        if let Some(secs) = self.verify_timeout {
            config.verify.timeout_secs = secs;
        }
        if let Some(capacity) = self.input_capacity {
            config.input_capacity = capacity;
        }
        config.log_level = self.log_level;

        Ok(config)
    }
}
