//! Error types for ledger RPC and explorer operations.
//!
//! Absence of an entity is not an error in this crate: lookups return
//! `Ok(None)` for pruned blocks or unknown transactions. The variants here
//! cover the failures that remain: transport, RPC rejections, malformed
//! payloads, bad input and bad configuration.

use thiserror::Error;

// ============================================================================
// JSON-RPC error codes
// ============================================================================

/// Block not available for the requested slot.
pub const RPC_BLOCK_NOT_AVAILABLE: i64 = -32004;
/// Node is behind or unhealthy.
pub const RPC_NODE_UNHEALTHY: i64 = -32005;
/// Slot was skipped or is missing due to ledger jump.
pub const RPC_SLOT_SKIPPED: i64 = -32007;
/// Slot was skipped or is missing in long-term storage.
pub const RPC_LONG_TERM_STORAGE_SLOT_SKIPPED: i64 = -32009;
/// Block status not yet available.
pub const RPC_BLOCK_STATUS_NOT_AVAILABLE_YET: i64 = -32014;
/// Generic internal server error.
pub const RPC_INTERNAL_ERROR: i64 = -32603;
/// Rate limit reported inside the JSON-RPC error object.
pub const RPC_RATE_LIMITED: i64 = 429;

// ============================================================================
// Error Types
// ============================================================================

/// Custom error type for explorer operations.
#[derive(Debug, Error)]
pub enum ExplorerError {
    /// Transport-level errors from HTTP requests.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// HTTP status that did not carry a JSON-RPC payload.
    #[error("HTTP {status} from RPC endpoint")]
    Http {
        /// The response status code.
        status: u16,
    },

    /// The RPC node answered with a JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code.
        code: i64,
        /// Message reported by the node.
        message: String,
    },

    /// JSON parsing or data structure errors.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of what failed to parse.
        message: String,
    },

    /// Invalid user input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Unusable endpoint or configuration. Never retried.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ExplorerError {
    /// Create a new parse error with the given message.
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a new JSON-RPC error.
    #[must_use]
    pub fn rpc(code: i64, message: impl Into<String>) -> Self {
        Self::Rpc {
            code,
            message: message.into(),
        }
    }

    /// Create a new invalid input error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a new configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether retrying the same request could plausibly succeed.
    ///
    /// Timeouts, connection failures, rate limiting, 5xx responses and
    /// "node unhealthy" RPC errors are transient. Rejected parameters,
    /// malformed payloads and configuration problems are not.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(err) => {
                err.is_timeout()
                    || err.is_connect()
                    || err.is_request()
                    || err
                        .status()
                        .is_some_and(|s| s.as_u16() == 429 || s.is_server_error())
            }
            Self::Http { status } => *status == 429 || *status >= 500,
            Self::Rpc { code, .. } => {
                matches!(
                    *code,
                    RPC_NODE_UNHEALTHY | RPC_INTERNAL_ERROR | RPC_RATE_LIMITED
                )
            }
            Self::Parse { .. } | Self::InvalidInput(_) | Self::Config(_) => false,
        }
    }

    /// Whether this RPC error code means "the entity does not exist".
    ///
    /// Skipped or pruned slots are reported by the node as errors, but
    /// callers treat them as absence.
    #[must_use]
    pub fn is_absence(&self) -> bool {
        matches!(
            self,
            Self::Rpc { code, .. } if matches!(
                *code,
                RPC_BLOCK_NOT_AVAILABLE
                    | RPC_SLOT_SKIPPED
                    | RPC_LONG_TERM_STORAGE_SLOT_SKIPPED
                    | RPC_BLOCK_STATUS_NOT_AVAILABLE_YET
            )
        )
    }

    /// Convert to a `color_eyre::Report` for the binary's error surface.
    #[must_use = "this converts the error into a Report for display"]
    pub fn into_report(self) -> color_eyre::Report {
        color_eyre::eyre::eyre!("{}", self)
    }
}

// ============================================================================
// Tests
// ============================================================================
