//! Block types for the Solana ledger.
//!
//! [`RawBlock`] mirrors the `getBlock` response requested with
//! `transactionDetails: "signatures"`; [`BlockSummary`] is the compact view
//! the poller publishes.

use serde::Deserialize;

// ============================================================================
// Raw RPC Shapes
// ============================================================================

/// A reward entry attached to a block.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reward {
    /// Account that received the reward.
    pub pubkey: String,
    /// Reward kind ("Fee", "Rent", "Voting", "Staking"), when reported.
    #[serde(default)]
    pub reward_type: Option<String>,
}

/// Block as returned by `getBlock`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBlock {
    /// Unix timestamp of the block, if the node has one.
    #[serde(default)]
    pub block_time: Option<i64>,
    /// Signatures of the contained transactions, in block order.
    #[serde(default)]
    pub signatures: Vec<String>,
    /// Rewards paid out in this block.
    #[serde(default)]
    pub rewards: Vec<Reward>,
}

impl RawBlock {
    /// The block producer, taken from the fee reward.
    ///
    /// Falls back to the first reward recipient, then `"Unknown"`.
    #[must_use]
    pub fn leader(&self) -> &str {
        self.rewards
            .iter()
            .find(|r| r.reward_type.as_deref() == Some("Fee"))
            .or_else(|| self.rewards.first())
            .map_or("Unknown", |r| r.pubkey.as_str())
    }
}

// ============================================================================
// Block Summary
// ============================================================================

/// Basic block information for the recent-blocks list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSummary {
    /// Slot the block was produced in.
    pub slot: u64,
    /// Unix timestamp, when available.
    pub timestamp: Option<i64>,
    /// Number of transactions in the block.
    pub transaction_count: usize,
    /// Identity of the block producer.
    pub leader: String,
}

impl BlockSummary {
    /// Builds a summary for `slot` from its raw block.
    #[must_use]
    pub fn from_raw(slot: u64, block: &RawBlock) -> Self {
        Self {
            slot,
            timestamp: block.block_time,
            transaction_count: block.signatures.len(),
            leader: block.leader().to_string(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
