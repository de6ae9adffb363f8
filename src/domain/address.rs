//! Account address parsing.
//!
//! An address is the base58 encoding of a 32-byte public key. Parsing only
//! checks the alphabet and decoded length; whether the key is on the curve
//! or owns any data is left to the RPC node.

use std::fmt;
use std::str::FromStr;

use super::error::ExplorerError;

/// Decoded length of an account public key.
pub const ADDRESS_BYTES: usize = 32;

/// Shortest base58 rendering of a 32-byte key.
pub const MIN_ADDRESS_LEN: usize = 32;

/// Longest base58 rendering of a 32-byte key.
pub const MAX_ADDRESS_LEN: usize = 44;

/// A syntactically valid account address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address(String);

impl Address {
    /// Returns the base58 form of the address.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Address {
    type Err = ExplorerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if !(MIN_ADDRESS_LEN..=MAX_ADDRESS_LEN).contains(&trimmed.len()) {
            return Err(ExplorerError::invalid_input(format!(
                "address must be {MIN_ADDRESS_LEN}-{MAX_ADDRESS_LEN} characters, got {}",
                trimmed.len()
            )));
        }

        let bytes = bs58::decode(trimmed)
            .into_vec()
            .map_err(|e| ExplorerError::invalid_input(format!("address is not base58: {e}")))?;

        if bytes.len() != ADDRESS_BYTES {
            return Err(ExplorerError::invalid_input(format!(
                "address decodes to {} bytes, expected {ADDRESS_BYTES}",
                bytes.len()
            )));
        }

        Ok(Self(trimmed.to_string()))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
