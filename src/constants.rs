//! Application constants for LazySol.
//!
//! Timing, batch sizes and fixed addresses shared by the gateway, resolver,
//! poller and wallet fetcher.

use std::time::Duration;

// ============================================================================
// RPC
// ============================================================================

/// Commitment level used for every read except the finalized-slot query.
pub const COMMITMENT: &str = "confirmed";

/// Per-request HTTP timeout.
pub const RPC_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// Per-signature retry
// ============================================================================

/// Attempts made for one transaction fetch before it is abandoned.
pub const TX_FETCH_ATTEMPTS: u32 = 3;

/// Pause between attempts of one transaction fetch.
pub const TX_FETCH_RETRY_DELAY: Duration = Duration::from_secs(1);

// ============================================================================
// Snapshot poller
// ============================================================================

/// Interval between regular poll cycles.
pub const POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Base unit of the linear cycle backoff (2s, 4s, 6s).
pub const BACKOFF_STEP: Duration = Duration::from_millis(2000);

/// Cycle retries allowed before waiting for the next regular tick.
pub const MAX_CYCLE_RETRIES: u32 = 3;

/// Number of recent blocks fetched per cycle.
pub const RECENT_BLOCKS: u64 = 5;

/// Number of recent transactions fetched per cycle.
pub const RECENT_TRANSACTIONS: usize = 5;

/// Addresses probed in order for recent activity; the first with any
/// signatures wins.
pub const FALLBACK_ADDRESSES: [&str; 3] = [
    "Vote111111111111111111111111111111111111111",
    "11111111111111111111111111111111",
    "SysvarC1ock11111111111111111111111111111111",
];

// ============================================================================
// Search and wallet
// ============================================================================

/// Signatures fetched when a query resolves to an address.
pub const ADDRESS_SIGNATURE_LIMIT: usize = 10;

/// Transactions taken from a block when a query resolves to a slot.
pub const BLOCK_TRANSACTION_LIMIT: usize = 5;

/// Signatures fetched for the connected wallet.
pub const WALLET_SIGNATURE_LIMIT: usize = 10;

/// Where users without a wallet extension are sent.
pub const WALLET_INSTALL_URL: &str = "https://phantom.app/";
