//! Domain types for the LazySol Solana explorer.
//!
//! # Module Organization
//!
//! - [`error`] - Error taxonomy for RPC and explorer operations
//! - [`network`] - Cluster selection (mainnet-beta, devnet, testnet)
//! - [`address`] - Account address parsing
//! - [`block`] - Raw blocks and block summaries
//! - [`transaction`] - Raw transactions, normalized records, the normalizer

// ============================================================================
// Module Declarations
// ============================================================================

pub mod address;
pub mod block;
pub mod error;
pub mod network;
pub mod transaction;

// ============================================================================
// Re-exports
// ============================================================================

pub use address::Address;
pub use block::{BlockSummary, RawBlock, Reward};
pub use error::ExplorerError;
pub use network::Network;
pub use transaction::{
    Outcome, RawInstruction, RawTransaction, TransactionRecord, format_time_ago,
    format_timestamp, normalize,
};

// ============================================================================
// Query Result
// ============================================================================

/// Outcome of resolving one free-form search string.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum QueryResult {
    /// Nothing matched.
    #[default]
    NotFound,
    /// The query was a transaction signature.
    SingleTransaction(Box<TransactionRecord>),
    /// The query was an address or slot; newest first.
    TransactionList(Vec<TransactionRecord>),
}
