//! Transaction types for the Solana ledger.
//!
//! # Module Organization
//!
//! - [`raw`] - Raw `getTransaction` response shapes
//! - [`normalize`] - Conversion of raw responses into [`TransactionRecord`]

pub mod normalize;
pub mod raw;

pub use normalize::{normalize, normalize_at};
pub use raw::{
    OpaqueInstruction, ParsedInstruction, ParsedPayload, RawInstruction, RawMeta, RawTransaction,
};

/// Minor units (lamports) per SOL.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

// ============================================================================
// Helper Functions
// ============================================================================

/// Format a Unix timestamp into a human-readable string.
///
/// Returns "Timestamp not available" for non-positive values.
#[must_use]
pub fn format_timestamp(timestamp_secs: i64) -> String {
    if timestamp_secs <= 0 {
        return "Timestamp not available".to_string();
    }

    let datetime =
        chrono::DateTime::from_timestamp(timestamp_secs, 0).unwrap_or_else(chrono::Utc::now);

    datetime.format("%a, %d %b %Y %H:%M:%S").to_string()
}

/// Render how long ago `timestamp` was, relative to `now` (both Unix seconds).
#[must_use]
pub fn format_time_ago(timestamp: i64, now: i64) -> String {
    let seconds = now.saturating_sub(timestamp).max(0);
    match seconds {
        0..60 => format!("{seconds}s ago"),
        60..3600 => format!("{}m ago", seconds / 60),
        _ => format!("{}h ago", seconds / 3600),
    }
}

/// Convert a lamport amount into a SOL decimal string.
///
/// Division happens in `f64`, so precision is that of a double.
#[must_use]
pub fn lamports_to_sol(lamports: u64) -> String {
    (lamports as f64 / LAMPORTS_PER_SOL as f64).to_string()
}

// ============================================================================
// Outcome
// ============================================================================

/// Execution result of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Executed without error.
    Success,
    /// Metadata carried an error object.
    Failed,
}

impl Outcome {
    /// Returns the display label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Transaction Record
// ============================================================================

/// The canonical, normalized view of one transaction.
///
/// Built fresh per fetch and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    /// Transaction signature.
    pub signature: String,
    /// Slot the transaction landed in.
    pub slot: u64,
    /// Block time, or the fetch wall-clock time when the node omitted it.
    pub timestamp: i64,
    /// Instruction-derived type tag, program id, or "Unknown".
    pub classification: String,
    /// Transfer source, when the first instruction is a parsed transfer.
    pub transfer_from: Option<String>,
    /// Transfer destination, when the first instruction is a parsed transfer.
    pub transfer_to: Option<String>,
    /// Transfer amount in SOL, when the first instruction is a parsed transfer.
    pub transfer_amount: Option<String>,
    /// Fee in lamports.
    pub fee_paid: u64,
    /// Execution result.
    pub outcome: Outcome,
    /// Top-level instructions in execution order.
    pub raw_instructions: Vec<RawInstruction>,
    /// Program log lines.
    pub program_logs: Vec<String>,
}

impl TransactionRecord {
    /// Whether the first instruction was recognized as a transfer.
    #[must_use]
    pub fn is_transfer(&self) -> bool {
        self.transfer_from.is_some() && self.transfer_to.is_some()
    }

    /// One-line summary for list views.
    #[must_use]
    pub fn summary_line(&self) -> String {
        let mut line = format!(
            "{} slot {} {} {}",
            self.signature, self.slot, self.classification, self.outcome
        );
        if let (Some(from), Some(to)) = (&self.transfer_from, &self.transfer_to) {
            let amount = self.transfer_amount.as_deref().unwrap_or("?");
            line.push_str(&format!(" {amount} SOL {from} -> {to}"));
        }
        line
    }
}

// ============================================================================
// Tests
// ============================================================================
