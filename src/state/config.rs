//! Application configuration with persistence.
//!
//! This module provides the [`AppConfig`] structure for managing application
//! settings with automatic load/save to disk.
//!
//! # Configuration File Location
//!
//! The configuration file is stored at:
//! - Linux: `~/.config/lazysol/config.json`
//! - macOS: `~/Library/Application Support/lazysol/config.json`
//! - Windows: `%APPDATA%/lazysol/config.json`
//!
//! # Example
//!
//! ```ignore
//! use crate::state::AppConfig;
//!
//! let mut config = AppConfig::load();
//! config.set_endpoint(Network::Devnet, Some("http://localhost:8899".into()));
//! config.save()?;
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use color_eyre::Result;
use serde::{Deserialize, Serialize};

use crate::domain::Network;

// ============================================================================
// Constants
// ============================================================================

/// Application name used for configuration directory.
const APP_NAME: &str = "lazysol";

/// Configuration file name.
const CONFIG_FILE: &str = "config.json";

// ============================================================================
// AppConfig
// ============================================================================

/// Application configuration structure for persistence.
///
/// # Fields
///
/// * `network` - The cluster selected at startup
/// * `rpc_overrides` - Custom RPC endpoints, at most one per cluster
/// * `wallet_address` - Address of the wallet to connect, if any
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// The cluster selected at startup.
    #[serde(default)]
    pub network: Network,
    /// Custom RPC endpoints keyed by cluster.
    #[serde(default)]
    pub rpc_overrides: BTreeMap<Network, String>,
    /// Address of the wallet to connect.
    #[serde(default)]
    pub wallet_address: Option<String>,
}

impl AppConfig {
    /// Returns the path to the configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration directory cannot be determined
    /// or created.
    pub fn config_path() -> Result<PathBuf> {
        let mut path = dirs::config_dir().ok_or_else(|| {
            color_eyre::eyre::eyre!(
                "Could not determine config directory. Expected XDG_CONFIG_HOME or ~/.config on Linux, ~/Library/Application Support on macOS, %APPDATA% on Windows"
            )
        })?;
        path.push(APP_NAME);
        fs::create_dir_all(&path)?;
        path.push(CONFIG_FILE);
        Ok(path)
    }

    /// Loads the configuration from disk, falling back to defaults.
    #[must_use]
    pub fn load() -> Self {
        match Self::try_load() {
            Ok(config) => config,
            Err(err) => {
                tracing::debug!("config load failed, using defaults: {err}");
                Self::default()
            }
        }
    }

    /// Attempts to load the configuration from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration path cannot be determined
    /// - The file cannot be read
    /// - The JSON content cannot be parsed
    pub fn try_load() -> Result<Self> {
        let path = Self::config_path()?;
        let content = fs::read_to_string(&path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Saves the configuration to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be determined or the file cannot
    /// be written.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// The endpoint to use for `network`: the override, else the public one.
    #[must_use]
    pub fn endpoint_for(&self, network: Network) -> &str {
        self.rpc_overrides
            .get(&network)
            .map(String::as_str)
            .unwrap_or(network.rpc_url())
    }

    /// Sets or clears the custom endpoint for `network`.
    pub fn set_endpoint(&mut self, network: Network, endpoint: Option<String>) {
        match endpoint {
            Some(endpoint) => {
                self.rpc_overrides.insert(network, endpoint);
            }
            None => {
                self.rpc_overrides.remove(&network);
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
