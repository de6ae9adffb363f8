//! Connected-wallet activity.
//!
//! [`WalletConnector`] stands in for the browser wallet extension: it may be
//! missing entirely, and when present it hands back the connected address.
//! [`fetch_wallet_activity`] loads that address's recent transactions.

use async_trait::async_trait;

use super::Gateway;
use super::retry::fetch_records;
use crate::constants::{WALLET_INSTALL_URL, WALLET_SIGNATURE_LIMIT};
use crate::domain::{Address, ExplorerError, TransactionRecord};

/// Fetch up to ten recent transactions for `wallet`.
///
/// No wallet means no activity. Individual transactions that fail are
/// skipped by the per-signature retry.
///
/// # Errors
///
/// Returns an error when the signature listing itself fails.
pub async fn fetch_wallet_activity(
    gateway: &Gateway,
    wallet: Option<&Address>,
) -> Result<Vec<TransactionRecord>, ExplorerError> {
    let Some(wallet) = wallet else {
        return Ok(Vec::new());
    };

    let signatures = gateway
        .get_signatures_for_address(wallet, WALLET_SIGNATURE_LIMIT)
        .await?;

    Ok(fetch_records(gateway, signatures.iter().map(|s| s.signature.as_str()).collect::<Vec<_>>()).await)
}

// ============================================================================
// Wallet Connector
// ============================================================================

/// A wallet provider the user can connect.
#[async_trait]
pub trait WalletConnector: Send + Sync {
    /// Whether a provider is installed at all.
    fn is_available(&self) -> bool;

    /// Asks the provider for the connected account.
    async fn connect(&self) -> Result<Address, ExplorerError>;

    /// Where to send the user when no provider is installed.
    fn install_url(&self) -> &str {
        WALLET_INSTALL_URL
    }
}

/// Wallet provider backed by an address from the command line or config.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredWallet {
    address: Option<String>,
}

impl ConfiguredWallet {
    #[must_use]
    pub fn new(address: Option<String>) -> Self {
        Self { address }
    }
}

#[async_trait]
impl WalletConnector for ConfiguredWallet {
    fn is_available(&self) -> bool {
        self.address.is_some()
    }

    async fn connect(&self) -> Result<Address, ExplorerError> {
        self.address
            .as_deref()
            .ok_or_else(|| ExplorerError::invalid_input("no wallet address configured"))?
            .parse()
    }
}

/// Connects through `connector`, opening the install page when it is missing.
///
/// Returns `Ok(None)` when the user was routed to the install page.
///
/// # Errors
///
/// Returns an error when the provider refuses or returns a malformed address.
pub async fn connect_or_install(
    connector: &dyn WalletConnector,
) -> Result<Option<Address>, ExplorerError> {
    if !connector.is_available() {
        tracing::info!("no wallet provider, opening {}", connector.install_url());
        if let Err(e) = open::that(connector.install_url()) {
            tracing::warn!("could not open {}: {e}", connector.install_url());
        }
        return Ok(None);
    }
    connector.connect().await.map(Some)
}

// ============================================================================
// Tests
// ============================================================================
