//! JSON-RPC access to a Solana node.
//!
//! [`LedgerRpc`] is the seam between the explorer logic and the wire: the
//! production [`HttpRpcClient`] speaks JSON-RPC 2.0 over HTTP, tests plug in
//! a scripted ledger. Every method distinguishes absence (`Ok(None)` or an
//! empty list) from failure (`Err`).

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::constants::{COMMITMENT, RPC_TIMEOUT};
use crate::domain::{Address, ExplorerError, RawBlock, RawTransaction};

// ============================================================================
// Response Types
// ============================================================================

/// One entry of a `getSignaturesForAddress` response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureInfo {
    /// Transaction signature.
    pub signature: String,
    /// Slot the transaction landed in.
    #[serde(default)]
    pub slot: u64,
    /// Error object when the transaction failed.
    #[serde(default)]
    pub err: Option<Value>,
    /// Block time, when known.
    #[serde(default)]
    pub block_time: Option<i64>,
}

/// One entry of a `getRecentPerformanceSamples` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSample {
    /// Transactions processed during the sample window.
    pub num_transactions: u64,
    /// Length of the sample window in seconds.
    pub sample_period_secs: u64,
}

impl PerformanceSample {
    /// Transactions per second, rounded to the nearest integer.
    ///
    /// Returns `None` for an empty sample window.
    #[must_use]
    pub fn tps(&self) -> Option<u64> {
        (self.sample_period_secs > 0)
            .then(|| (self.num_transactions as f64 / self.sample_period_secs as f64).round() as u64)
    }
}

// ============================================================================
// Trait
// ============================================================================

/// Read-only primitives of a ledger node.
#[async_trait]
pub trait LedgerRpc: Send + Sync {
    /// Latest slot at `finalized` commitment.
    async fn get_latest_finalized_slot(&self) -> Result<u64, ExplorerError>;

    /// Block at `slot`, or `None` when it was skipped or pruned.
    async fn get_block(&self, slot: u64) -> Result<Option<RawBlock>, ExplorerError>;

    /// Most recent signatures touching `address`, newest first.
    async fn get_signatures_for_address(
        &self,
        address: &Address,
        limit: usize,
    ) -> Result<Vec<SignatureInfo>, ExplorerError>;

    /// Transaction by signature, or `None` when unknown to the node.
    async fn get_transaction(
        &self,
        signature: &str,
    ) -> Result<Option<RawTransaction>, ExplorerError>;

    /// Most recent throughput sample, if the node reports one.
    async fn get_recent_performance_sample(
        &self,
    ) -> Result<Option<PerformanceSample>, ExplorerError>;
}

// ============================================================================
// HTTP Client
// ============================================================================

#[derive(Debug, Deserialize)]
struct RpcEnvelope {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// JSON-RPC 2.0 client bound to a single endpoint.
#[derive(Debug)]
pub struct HttpRpcClient {
    endpoint: Url,
    client: Client,
    next_id: AtomicU64,
}

impl HttpRpcClient {
    /// Creates a client for `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns `ExplorerError::Config` when the endpoint is not an http(s)
    /// URL or the HTTP client cannot be built.
    pub fn new(endpoint: &str) -> Result<Self, ExplorerError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| ExplorerError::config(format!("invalid RPC endpoint '{endpoint}': {e}")))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(ExplorerError::config(format!(
                "RPC endpoint must use http or https, got '{}'",
                endpoint.scheme()
            )));
        }

        let client = Client::builder()
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(30))
            .timeout(RPC_TIMEOUT)
            .build()
            .map_err(|e| ExplorerError::config(e.to_string()))?;

        Ok(Self {
            endpoint,
            client,
            next_id: AtomicU64::new(1),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, ExplorerError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let response = self
            .client
            .post(self.endpoint.clone())
            .header("accept", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(method, status = status.as_u16(), "RPC endpoint rejected request");
            return Err(ExplorerError::Http {
                status: status.as_u16(),
            });
        }

        let envelope: RpcEnvelope = response
            .json()
            .await
            .map_err(|e| ExplorerError::parse(format!("{method}: {e}")))?;

        if let Some(err) = envelope.error {
            tracing::debug!(method, code = err.code, "RPC error: {}", err.message);
            return Err(ExplorerError::rpc(err.code, err.message));
        }

        serde_json::from_value(envelope.result.unwrap_or(Value::Null))
            .map_err(|e| ExplorerError::parse(format!("{method} result: {e}")))
    }
}

#[async_trait]
impl LedgerRpc for HttpRpcClient {
    async fn get_latest_finalized_slot(&self) -> Result<u64, ExplorerError> {
        self.call("getSlot", json!([{ "commitment": "finalized" }]))
            .await
    }

    async fn get_block(&self, slot: u64) -> Result<Option<RawBlock>, ExplorerError> {
        let params = json!([slot, {
            "commitment": COMMITMENT,
            "encoding": "json",
            "transactionDetails": "signatures",
            "rewards": true,
            "maxSupportedTransactionVersion": 0,
        }]);
        match self.call::<Option<RawBlock>>("getBlock", params).await {
            Err(e) if e.is_absence() => Ok(None),
            other => other,
        }
    }

    async fn get_signatures_for_address(
        &self,
        address: &Address,
        limit: usize,
    ) -> Result<Vec<SignatureInfo>, ExplorerError> {
        let params = json!([address.as_str(), { "limit": limit, "commitment": COMMITMENT }]);
        self.call("getSignaturesForAddress", params).await
    }

    async fn get_transaction(
        &self,
        signature: &str,
    ) -> Result<Option<RawTransaction>, ExplorerError> {
        let params = json!([signature, {
            "commitment": COMMITMENT,
            "encoding": "jsonParsed",
            "maxSupportedTransactionVersion": 0,
        }]);
        self.call("getTransaction", params).await
    }

    async fn get_recent_performance_sample(
        &self,
    ) -> Result<Option<PerformanceSample>, ExplorerError> {
        let samples: Vec<PerformanceSample> =
            self.call("getRecentPerformanceSamples", json!([1])).await?;
        Ok(samples.into_iter().next())
    }
}

// ============================================================================
// Tests
// ============================================================================
