//! Ledger access for the LazySol explorer.
//!
//! This module provides:
//! - [`rpc`] - JSON-RPC transport and the [`LedgerRpc`] seam
//! - [`gateway`] - The live, network-bound connection
//! - [`retry`] - Bounded retry for per-signature fetches
//! - [`search`] - Free-form query resolution
//! - [`wallet`] - Connected-wallet activity
//!
//! # Example
//!
//! ```ignore
//! use crate::client::{Gateway, Resolver};
//! use crate::domain::Network;
//!
//! let gateway = Gateway::connect(Network::Devnet, Network::Devnet.rpc_url())?;
//! let result = Resolver::new(&gateway).resolve("245000000").await?;
//! ```

pub mod gateway;
pub mod retry;
pub mod rpc;
pub mod search;
pub mod wallet;

// ============================================================================
// Re-exports
// ============================================================================

pub use gateway::{Gateway, GatewayId};
pub use retry::{RetryPolicy, fetch_record, fetch_records};
pub use rpc::{HttpRpcClient, LedgerRpc, PerformanceSample, SignatureInfo};
pub use search::Resolver;
pub use wallet::{ConfiguredWallet, WalletConnector, connect_or_install, fetch_wallet_activity};
