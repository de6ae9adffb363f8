//! The live connection to one cluster.
//!
//! A [`Gateway`] binds one [`Network`] to one RPC endpoint. It is never
//! mutated: switching networks builds a new gateway with a fresh
//! [`GatewayId`], and results computed against an older id are stale.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::rpc::{HttpRpcClient, LedgerRpc, PerformanceSample, SignatureInfo};
use crate::constants::COMMITMENT;
use crate::domain::{Address, ExplorerError, Network, RawBlock, RawTransaction};

static NEXT_GATEWAY_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one gateway instance; strictly increasing per process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GatewayId(u64);

impl GatewayId {
    fn next() -> Self {
        Self(NEXT_GATEWAY_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for GatewayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gw#{}", self.0)
    }
}

/// Connection to a single cluster endpoint.
#[derive(Clone)]
pub struct Gateway {
    id: GatewayId,
    network: Network,
    endpoint: String,
    rpc: Arc<dyn LedgerRpc>,
}

impl fmt::Debug for Gateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gateway")
            .field("id", &self.id)
            .field("network", &self.network)
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl Gateway {
    /// Connects to `network` through `endpoint`.
    ///
    /// No request is sent; only the endpoint is validated.
    ///
    /// # Errors
    ///
    /// Returns `ExplorerError::Config` when the endpoint is malformed.
    pub fn connect(network: Network, endpoint: &str) -> Result<Self, ExplorerError> {
        let client = HttpRpcClient::new(endpoint)?;
        tracing::info!(%network, endpoint, commitment = COMMITMENT, "connected gateway");
        Ok(Self {
            id: GatewayId::next(),
            network,
            endpoint: endpoint.to_string(),
            rpc: Arc::new(client),
        })
    }

    /// Builds a gateway over an arbitrary ledger implementation.
    #[must_use]
    pub fn with_rpc(network: Network, rpc: Arc<dyn LedgerRpc>) -> Self {
        Self {
            id: GatewayId::next(),
            network,
            endpoint: network.rpc_url().to_string(),
            rpc,
        }
    }

    #[must_use]
    pub fn id(&self) -> GatewayId {
        self.id
    }

    #[must_use]
    pub fn network(&self) -> Network {
        self.network
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Latest finalized slot.
    ///
    /// # Errors
    ///
    /// Propagates transport and RPC failures.
    pub async fn get_latest_finalized_slot(&self) -> Result<u64, ExplorerError> {
        self.rpc.get_latest_finalized_slot().await
    }

    /// Block at `slot`, `None` when skipped or pruned.
    ///
    /// # Errors
    ///
    /// Propagates transport and RPC failures.
    pub async fn get_block(&self, slot: u64) -> Result<Option<RawBlock>, ExplorerError> {
        self.rpc.get_block(slot).await
    }

    /// Newest-first signatures for `address`.
    ///
    /// # Errors
    ///
    /// Propagates transport and RPC failures.
    pub async fn get_signatures_for_address(
        &self,
        address: &Address,
        limit: usize,
    ) -> Result<Vec<SignatureInfo>, ExplorerError> {
        self.rpc.get_signatures_for_address(address, limit).await
    }

    /// Raw transaction, `None` when unknown.
    ///
    /// # Errors
    ///
    /// Propagates transport and RPC failures.
    pub async fn get_transaction(
        &self,
        signature: &str,
    ) -> Result<Option<RawTransaction>, ExplorerError> {
        self.rpc.get_transaction(signature).await
    }

    /// Most recent throughput sample.
    ///
    /// # Errors
    ///
    /// Propagates transport and RPC failures.
    pub async fn get_recent_throughput_sample(
        &self,
    ) -> Result<Option<PerformanceSample>, ExplorerError> {
        self.rpc.get_recent_performance_sample().await
    }
}
