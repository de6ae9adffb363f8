//! Free-form query resolution.
//!
//! A query is tried, in order, as a transaction signature, an account
//! address and a slot number. The first strategy that produces transactions
//! wins. Malformed input and "not found" answers make a strategy miss; only
//! transport failures that outlive their retries are returned as errors.
//!
//! Signatures are tried before addresses even though both are base58 strings
//! of overlapping lengths. A string valid as both is resolved as a signature.

use super::Gateway;
use super::retry::{RetryPolicy, fetch_record, fetch_records};
use crate::constants::{ADDRESS_SIGNATURE_LIMIT, BLOCK_TRANSACTION_LIMIT};
use crate::domain::{Address, ExplorerError, QueryResult};

/// Resolves search strings against one gateway.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    gateway: &'a Gateway,
}

impl<'a> Resolver<'a> {
    #[must_use]
    pub fn new(gateway: &'a Gateway) -> Self {
        Self { gateway }
    }

    /// Resolve `query` into transactions.
    ///
    /// # Errors
    ///
    /// Returns an error only for transient transport failures that survived
    /// their retries. Every ordinary non-match yields `QueryResult::NotFound`.
    pub async fn resolve(&self, query: &str) -> Result<QueryResult, ExplorerError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(QueryResult::NotFound);
        }

        if let Some(result) = self.as_signature(query).await? {
            return Ok(result);
        }
        if let Some(result) = self.as_address(query).await? {
            return Ok(result);
        }
        if let Some(result) = self.as_slot(query).await? {
            return Ok(result);
        }

        tracing::debug!("no strategy matched '{query}'");
        Ok(QueryResult::NotFound)
    }

    async fn as_signature(&self, query: &str) -> Result<Option<QueryResult>, ExplorerError> {
        match fetch_record(self.gateway, query).await {
            Ok(Some(record)) => Ok(Some(QueryResult::SingleTransaction(Box::new(record)))),
            Ok(None) => Ok(None),
            Err(e) if e.is_transient() => Err(e),
            Err(e) => {
                tracing::debug!("'{query}' is not a transaction signature: {e}");
                Ok(None)
            }
        }
    }

    async fn as_address(&self, query: &str) -> Result<Option<QueryResult>, ExplorerError> {
        let address = match query.parse::<Address>() {
            Ok(address) => address,
            Err(e) => {
                tracing::debug!("'{query}' is not an address: {e}");
                return Ok(None);
            }
        };

        let signatures = match self.signatures_for(&address).await {
            Ok(signatures) => signatures,
            Err(e) if e.is_transient() => return Err(e),
            Err(e) => {
                tracing::debug!("address lookup for {address} rejected: {e}");
                return Ok(None);
            }
        };

        let records = fetch_records(
            self.gateway,
            signatures
                .iter()
                .map(|s| s.signature.as_str())
                .collect::<Vec<_>>(),
        )
        .await;

        Ok((!records.is_empty()).then_some(QueryResult::TransactionList(records)))
    }

    async fn as_slot(&self, query: &str) -> Result<Option<QueryResult>, ExplorerError> {
        let Ok(slot) = query.parse::<u64>() else {
            tracing::debug!("'{query}' is not a slot number");
            return Ok(None);
        };

        let gateway = self.gateway;
        let block = match RetryPolicy::default()
            .run("getBlock", move || gateway.get_block(slot))
            .await
        {
            Ok(Some(block)) => block,
            Ok(None) => return Ok(None),
            Err(e) if e.is_transient() => return Err(e),
            Err(e) => {
                tracing::debug!("block {slot} lookup rejected: {e}");
                return Ok(None);
            }
        };

        let records = fetch_records(
            self.gateway,
            block
                .signatures
                .iter()
                .take(BLOCK_TRANSACTION_LIMIT)
                .map(String::as_str),
        )
        .await;

        Ok(Some(QueryResult::TransactionList(records)))
    }

    async fn signatures_for(
        &self,
        address: &Address,
    ) -> Result<Vec<super::SignatureInfo>, ExplorerError> {
        let gateway = self.gateway;
        RetryPolicy::default()
            .run("getSignaturesForAddress", move || {
                gateway.get_signatures_for_address(address, ADDRESS_SIGNATURE_LIMIT)
            })
            .await
    }
}

// ============================================================================
// Tests
// ============================================================================
