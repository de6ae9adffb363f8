//! Raw `getTransaction` response shapes.
//!
//! The node returns instructions in two encodings depending on whether it
//! recognizes the owning program: a decoded `parsed` payload, or an opaque
//! base58 `data` blob. [`RawInstruction`] keeps that distinction as a tagged
//! variant instead of an untyped JSON value.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Transaction Envelope
// ============================================================================

/// A transaction as returned by `getTransaction` with `jsonParsed` encoding.
///
/// Every field the normalizer reads is optional or defaulted so partially
/// populated responses still deserialize.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransaction {
    /// Slot the transaction landed in.
    #[serde(default)]
    pub slot: u64,
    /// Unix timestamp of the containing block, if known.
    #[serde(default)]
    pub block_time: Option<i64>,
    /// Execution metadata.
    #[serde(default)]
    pub meta: Option<RawMeta>,
    /// The signed transaction body.
    #[serde(default)]
    pub transaction: RawEnvelope,
}

/// Execution metadata of a transaction.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMeta {
    /// Error object; present (non-null) only for failed transactions.
    #[serde(default)]
    pub err: Option<Value>,
    /// Fee charged, in lamports.
    #[serde(default)]
    pub fee: Option<u64>,
    /// Program log lines.
    #[serde(default)]
    pub log_messages: Option<Vec<String>>,
}

/// Signed transaction body.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawEnvelope {
    /// The message holding the instruction list.
    #[serde(default)]
    pub message: RawMessage,
}

/// Transaction message.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawMessage {
    /// Top-level instructions in execution order.
    #[serde(default)]
    pub instructions: Option<Vec<RawInstruction>>,
}

// ============================================================================
// Instructions
// ============================================================================

/// One top-level instruction, in whichever encoding the node chose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawInstruction {
    /// Instruction of a program the node knows how to decode.
    Parsed(ParsedInstruction),
    /// Instruction of an unrecognized program.
    Opaque(OpaqueInstruction),
}

/// A decoded instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedInstruction {
    /// Program name as reported by the node (e.g. "system", "spl-token").
    #[serde(default)]
    pub program: String,
    /// Program account address.
    pub program_id: String,
    /// The decoded payload.
    pub parsed: ParsedPayload,
}

/// Decoded instruction payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParsedPayload {
    /// Structured payload with a type tag, e.g. `{"type": "transfer", "info": {...}}`.
    Typed {
        /// Instruction type tag.
        #[serde(rename = "type")]
        kind: String,
        /// Type-specific fields.
        #[serde(default)]
        info: Value,
    },
    /// Free-form payload (the memo program decodes to a plain string).
    Text(String),
}

/// An instruction the node could not decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpaqueInstruction {
    /// Program account address.
    pub program_id: String,
    /// Accounts passed to the instruction.
    #[serde(default)]
    pub accounts: Vec<String>,
    /// Base58-encoded instruction data.
    #[serde(default)]
    pub data: String,
}

impl RawInstruction {
    /// The program this instruction invokes.
    #[must_use]
    pub fn program_id(&self) -> &str {
        match self {
            Self::Parsed(ix) => &ix.program_id,
            Self::Opaque(ix) => &ix.program_id,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
