//! Solana cluster selection.
//!
//! This module defines the supported clusters and their default public
//! JSON-RPC endpoints. Exactly one endpoint is used per cluster at a time;
//! overrides come from [`crate::state::AppConfig`].

use serde::{Deserialize, Serialize};

// ============================================================================
// Network Configuration
// ============================================================================

/// Solana cluster variants.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Network {
    /// The production cluster.
    MainnetBeta,
    /// Developer cluster; the startup default.
    #[default]
    Devnet,
    /// Validator test cluster.
    Testnet,
}

impl Network {
    /// All built-in clusters in display order.
    pub const ALL: [Self; 3] = [Self::MainnetBeta, Self::Devnet, Self::Testnet];

    /// Returns the cluster identifier used in RPC URLs and on the command line.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MainnetBeta => "mainnet-beta",
            Self::Devnet => "devnet",
            Self::Testnet => "testnet",
        }
    }

    /// Returns the short human-readable name of the cluster.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::MainnetBeta => "Mainnet",
            Self::Devnet => "Devnet",
            Self::Testnet => "Testnet",
        }
    }

    /// Returns the public JSON-RPC endpoint for this cluster.
    #[must_use]
    pub const fn rpc_url(&self) -> &'static str {
        match self {
            Self::MainnetBeta => "https://api.mainnet-beta.solana.com",
            Self::Devnet => "https://api.devnet.solana.com",
            Self::Testnet => "https://api.testnet.solana.com",
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet-beta" | "mainnet" => Ok(Self::MainnetBeta),
            "devnet" => Ok(Self::Devnet),
            "testnet" => Ok(Self::Testnet),
            other => Err(format!(
                "unknown network '{other}' (expected mainnet-beta, devnet or testnet)"
            )),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
