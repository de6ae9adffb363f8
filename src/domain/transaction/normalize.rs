//! Conversion of raw ledger transactions into [`TransactionRecord`].
//!
//! Only the first instruction is inspected for transfer detection and
//! classification. Transactions with several instructions or several
//! transfers are therefore reported by their first instruction alone.

use serde_json::Value;

use super::raw::{ParsedPayload, RawInstruction, RawTransaction};
use super::{Outcome, TransactionRecord, lamports_to_sol};

/// Classification used when no instruction information exists.
pub const UNKNOWN_CLASSIFICATION: &str = "Unknown";

/// Instruction type tag that marks a transfer.
const TRANSFER_TAG: &str = "transfer";

/// Normalize a raw transaction, defaulting a missing block time to now.
#[must_use]
pub fn normalize(signature: &str, raw: &RawTransaction) -> TransactionRecord {
    normalize_at(signature, raw, chrono::Utc::now().timestamp())
}

/// Normalize a raw transaction using `now` as the fallback timestamp.
#[must_use]
pub fn normalize_at(signature: &str, raw: &RawTransaction, now: i64) -> TransactionRecord {
    let meta = raw.meta.as_ref();

    let outcome = match meta.and_then(|m| m.err.as_ref()) {
        Some(_) => Outcome::Failed,
        None => Outcome::Success,
    };
    let fee_paid = meta.and_then(|m| m.fee).unwrap_or(0);
    let program_logs = meta
        .and_then(|m| m.log_messages.clone())
        .unwrap_or_default();
    let raw_instructions = raw
        .transaction
        .message
        .instructions
        .clone()
        .unwrap_or_default();

    let first = raw_instructions.first();
    let transfer = first.and_then(extract_transfer);
    let classification = first.map_or_else(|| UNKNOWN_CLASSIFICATION.to_string(), classify);

    let (transfer_from, transfer_to, transfer_amount) = match transfer {
        Some(t) => (Some(t.from), Some(t.to), t.amount),
        None => (None, None, None),
    };

    TransactionRecord {
        signature: signature.to_string(),
        slot: raw.slot,
        timestamp: raw.block_time.unwrap_or(now),
        classification,
        transfer_from,
        transfer_to,
        transfer_amount,
        fee_paid,
        outcome,
        raw_instructions,
        program_logs,
    }
}

// ============================================================================
// Extraction Functions
// ============================================================================

struct Transfer {
    from: String,
    to: String,
    amount: Option<String>,
}

/// Type tag of a decoded instruction, program identity otherwise.
fn classify(instruction: &RawInstruction) -> String {
    match instruction {
        RawInstruction::Parsed(ix) => match &ix.parsed {
            ParsedPayload::Typed { kind, .. } if !kind.is_empty() => kind.clone(),
            _ if !ix.program.is_empty() => ix.program.clone(),
            _ => ix.program_id.clone(),
        },
        RawInstruction::Opaque(ix) if !ix.program_id.is_empty() => ix.program_id.clone(),
        RawInstruction::Opaque(_) => UNKNOWN_CLASSIFICATION.to_string(),
    }
}

/// Pull source, destination and amount out of a parsed transfer.
fn extract_transfer(instruction: &RawInstruction) -> Option<Transfer> {
    let RawInstruction::Parsed(ix) = instruction else {
        return None;
    };
    let ParsedPayload::Typed { kind, info } = &ix.parsed else {
        return None;
    };
    if kind != TRANSFER_TAG {
        return None;
    }

    let field = |name: &str| info.get(name).and_then(Value::as_str).map(String::from);

    Some(Transfer {
        from: field("source")?,
        to: field("destination")?,
        amount: info
            .get("lamports")
            .and_then(Value::as_u64)
            .map(lamports_to_sol),
    })
}

// ============================================================================
// Tests
// ============================================================================
