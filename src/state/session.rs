//! The explorer session: one live gateway plus everything read from it.
//!
//! [`Session`] is the context object the poller, resolver and wallet fetcher
//! share. Every result is applied under the state lock together with a check
//! that the gateway it was computed against is still the active one, so a
//! response that arrives after a network switch is dropped instead of
//! mixing two clusters' data.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{RwLock, mpsc};

use super::SessionMessage;
use super::poller::{CycleOutcome, PollerHandle, PollerPhase};
use crate::client::{Gateway, GatewayId, Resolver, fetch_wallet_activity};
use crate::constants::MAX_CYCLE_RETRIES;
use crate::domain::{Address, BlockSummary, ExplorerError, Network, QueryResult, TransactionRecord};

// ============================================================================
// State
// ============================================================================

/// Latest poll results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    /// Recent blocks, newest first.
    pub blocks: Vec<BlockSummary>,
    /// Recent network transactions.
    pub transactions: Vec<TransactionRecord>,
    /// Transactions per second from the last good sample.
    pub tps: Option<u64>,
}

/// Everything the presentation layer renders.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub network: Network,
    pub gateway: Arc<Gateway>,
    pub snapshot: Snapshot,
    pub search_results: QueryResult,
    pub wallet: Option<Address>,
    pub wallet_transactions: Vec<TransactionRecord>,
    /// Consecutive failed poll cycles, reset by a successful one.
    pub retry_count: u32,
    /// True until the first cycle finishes, successfully or not, after start
    /// or a network switch.
    pub is_loading: bool,
    pub is_search_loading: bool,
    pub is_wallet_loading: bool,
    pub has_searched: bool,
    /// Bumped by every search; only the latest one may store its result.
    search_generation: u64,
}

impl SessionState {
    fn new(gateway: Arc<Gateway>) -> Self {
        Self {
            network: gateway.network(),
            gateway,
            snapshot: Snapshot::default(),
            search_results: QueryResult::NotFound,
            wallet: None,
            wallet_transactions: Vec::new(),
            retry_count: 0,
            is_loading: true,
            is_search_loading: false,
            is_wallet_loading: false,
            has_searched: false,
            search_generation: 0,
        }
    }

    fn is_current(&self, gateway_id: GatewayId) -> bool {
        self.gateway.id() == gateway_id
    }
}

// ============================================================================
// Session
// ============================================================================

#[derive(Debug)]
struct SessionInner {
    state: RwLock<SessionState>,
    poller: Mutex<Option<PollerHandle>>,
    messages: mpsc::UnboundedSender<SessionMessage>,
}

/// Shared handle to the explorer session. Cheap to clone.
///
/// A running poller keeps the session alive; call [`Session::shutdown`]
/// when done.
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    /// Creates a session over `gateway` and the channel its updates go to.
    #[must_use]
    pub fn new(gateway: Gateway) -> (Self, mpsc::UnboundedReceiver<SessionMessage>) {
        let (messages, receiver) = mpsc::unbounded_channel();
        let session = Self {
            inner: Arc::new(SessionInner {
                state: RwLock::new(SessionState::new(Arc::new(gateway))),
                poller: Mutex::new(None),
                messages,
            }),
        };
        (session, receiver)
    }

    /// A consistent copy of the current state.
    pub async fn view(&self) -> SessionState {
        self.inner.state.read().await.clone()
    }

    /// The active gateway.
    pub async fn gateway(&self) -> Arc<Gateway> {
        Arc::clone(&self.inner.state.read().await.gateway)
    }

    fn notify(&self, message: SessionMessage) {
        // Receiver may be dropped during shutdown - safe to ignore
        let _ = self.inner.messages.send(message);
    }

    // ========================================================================
    // Polling
    // ========================================================================

    /// Starts polling the active gateway, replacing any running poller.
    pub async fn start_polling(&self) {
        self.stop_polling();
        let gateway = self.gateway().await;
        let handle = PollerHandle::spawn(self.clone(), gateway);
        *self
            .inner
            .poller
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(handle);
    }

    /// Stops the poller and any pending backoff retry.
    pub fn stop_polling(&self) {
        let handle = self
            .inner
            .poller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.stop();
        }
    }

    #[must_use]
    pub fn is_polling(&self) -> bool {
        self.inner
            .poller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Phase of the running poller, if any.
    #[must_use]
    pub fn poller_phase(&self) -> Option<PollerPhase> {
        self.inner
            .poller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(PollerHandle::phase)
    }

    /// Applies a successful cycle computed against `gateway_id`.
    ///
    /// Returns `false` when the session has moved to another gateway.
    /// Empty block or transaction lists keep the previous ones, and a
    /// missing throughput sample keeps the previous tps.
    pub async fn apply_cycle(&self, gateway_id: GatewayId, outcome: CycleOutcome) -> bool {
        {
            let mut state = self.inner.state.write().await;
            if !state.is_current(gateway_id) {
                tracing::warn!("discarding poll result from stale {gateway_id}");
                return false;
            }

            let CycleOutcome {
                blocks,
                transactions,
                tps,
            } = outcome;
            if !blocks.is_empty() {
                state.snapshot.blocks = blocks;
            }
            if !transactions.is_empty() {
                state.snapshot.transactions = transactions;
            }
            if tps.is_some() {
                state.snapshot.tps = tps;
            }
            state.retry_count = 0;
            state.is_loading = false;
        }
        self.notify(SessionMessage::SnapshotUpdated);
        true
    }

    /// Records a failed cycle against `gateway_id`.
    ///
    /// Returns the retry number to schedule, or `None` when the retry budget
    /// is spent or the gateway is stale.
    pub async fn record_cycle_failure(&self, gateway_id: GatewayId) -> Option<u32> {
        let attempt = {
            let mut state = self.inner.state.write().await;
            if !state.is_current(gateway_id) {
                return None;
            }
            state.is_loading = false;
            if state.retry_count >= MAX_CYCLE_RETRIES {
                tracing::warn!("poll retries exhausted, waiting for next interval");
                return None;
            }
            state.retry_count += 1;
            state.retry_count
        };
        self.notify(SessionMessage::CycleFailed { attempt });
        Some(attempt)
    }

    // ========================================================================
    // Network
    // ========================================================================

    /// Connects to `network` through `endpoint` and switches to it.
    ///
    /// # Errors
    ///
    /// Returns `ExplorerError::Config` for a malformed endpoint; the session
    /// is left untouched in that case.
    pub async fn connect(&self, network: Network, endpoint: &str) -> Result<(), ExplorerError> {
        let gateway = Gateway::connect(network, endpoint)?;
        self.switch_network(gateway).await;
        Ok(())
    }

    /// Replaces the active gateway.
    ///
    /// The old poller is stopped before anything else changes, and a new one
    /// is started if polling was active. Network-bound data is cleared; the
    /// connected wallet is kept and reloaded from the new cluster.
    pub async fn switch_network(&self, gateway: Gateway) {
        let was_polling = self.is_polling();
        self.stop_polling();

        let network = gateway.network();
        tracing::info!(%network, gateway = %gateway.id(), "switching network");
        let has_wallet = {
            let mut state = self.inner.state.write().await;
            let wallet = state.wallet.take();
            *state = SessionState::new(Arc::new(gateway));
            state.wallet = wallet;
            state.wallet.is_some()
        };
        self.notify(SessionMessage::NetworkSwitched(network));

        if was_polling {
            self.start_polling().await;
        }
        if has_wallet {
            let session = self.clone();
            tokio::spawn(async move { session.refresh_wallet().await });
        }
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// Starts a search; the result arrives as [`SessionMessage::SearchCompleted`].
    pub fn search(&self, query: impl Into<String>) {
        let session = self.clone();
        let query = query.into();
        tokio::spawn(async move {
            session.search_now(&query).await;
        });
    }

    /// Resolves `query` and stores the result.
    ///
    /// Transport failures are logged and shown as `NotFound`. A result that
    /// finishes after a newer search was started is returned but not stored.
    pub async fn search_now(&self, query: &str) -> QueryResult {
        let (gateway, generation) = {
            let mut state = self.inner.state.write().await;
            state.is_search_loading = true;
            state.has_searched = true;
            state.search_generation += 1;
            (Arc::clone(&state.gateway), state.search_generation)
        };

        let result = match Resolver::new(&gateway).resolve(query).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("search for '{query}' failed: {e}");
                QueryResult::NotFound
            }
        };

        {
            let mut state = self.inner.state.write().await;
            if !state.is_current(gateway.id()) {
                tracing::warn!("discarding search result from stale {}", gateway.id());
                return result;
            }
            if state.search_generation != generation {
                tracing::debug!("discarding superseded search for '{query}'");
                return result;
            }
            state.search_results = result.clone();
            state.is_search_loading = false;
        }
        self.notify(SessionMessage::SearchCompleted(result.clone()));
        result
    }

    // ========================================================================
    // Wallet
    // ========================================================================

    /// Connects (`Some`) or disconnects (`None`) a wallet and reloads its list.
    ///
    /// Disconnecting clears the list immediately.
    pub async fn set_wallet(&self, wallet: Option<Address>) {
        {
            let mut state = self.inner.state.write().await;
            if state.wallet == wallet {
                return;
            }
            if wallet.is_none() {
                state.wallet_transactions.clear();
            }
            state.wallet = wallet;
        }
        self.refresh_wallet().await;
    }

    /// Reloads the connected wallet's transactions.
    ///
    /// A failed listing clears the list rather than keeping stale entries.
    pub async fn refresh_wallet(&self) {
        let (gateway, wallet) = {
            let mut state = self.inner.state.write().await;
            state.is_wallet_loading = true;
            (Arc::clone(&state.gateway), state.wallet.clone())
        };

        let result = fetch_wallet_activity(&gateway, wallet.as_ref()).await;

        {
            let mut state = self.inner.state.write().await;
            if !state.is_current(gateway.id()) || state.wallet != wallet {
                tracing::warn!("discarding stale wallet activity");
                return;
            }
            state.wallet_transactions = match result {
                Ok(records) => records,
                Err(e) => {
                    tracing::warn!("wallet activity unavailable: {e}");
                    Vec::new()
                }
            };
            state.is_wallet_loading = false;
        }
        self.notify(SessionMessage::WalletUpdated);
    }

    /// Stops background work. The session stays readable.
    pub fn shutdown(&self) {
        self.stop_polling();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::LedgerRpc;
    use crate::test_utils::{JsonMother, MockLedger};
    use std::time::Duration;
    use tokio::time::sleep;

    const WALLET: &str = "Vote111111111111111111111111111111111111111";

    fn gateway(network: Network, ledger: &MockLedger) -> Gateway {
        Gateway::with_rpc(network, Arc::new(ledger.clone()) as Arc<dyn LedgerRpc>)
    }

    fn block_slots(state: &SessionState) -> Vec<u64> {
        state.snapshot.blocks.iter().map(|b| b.slot).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_cycle_fills_snapshot() {
        let ledger = MockLedger::new()
            .with_slot(100)
            .with_block(100, JsonMother::block(3))
            .with_performance(1_200, 60);
        let (session, mut messages) = Session::new(gateway(Network::Devnet, &ledger));
        assert!(session.view().await.is_loading);

        session.start_polling().await;
        assert_eq!(messages.recv().await, Some(SessionMessage::SnapshotUpdated));

        let state = session.view().await;
        assert!(!state.is_loading);
        assert_eq!(block_slots(&state), vec![100]);
        assert_eq!(state.snapshot.tps, Some(20));
        session.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cycle_fails_twice_then_recovers() {
        let ledger = MockLedger::new()
            .with_slot(100)
            .with_slot_failures(2)
            .with_block(100, JsonMother::block(1));
        let (session, _messages) = Session::new(gateway(Network::Devnet, &ledger));
        session.start_polling().await;

        sleep(Duration::from_secs(1)).await;
        let state = session.view().await;
        assert_eq!(state.retry_count, 1);
        assert!(!state.is_loading);
        assert_eq!(
            session.poller_phase(),
            Some(PollerPhase::BackoffWait { attempt: 1 })
        );

        sleep(Duration::from_secs(2)).await;
        assert_eq!(session.view().await.retry_count, 2);

        sleep(Duration::from_millis(3_500)).await;
        let state = session.view().await;
        assert_eq!(state.retry_count, 0);
        assert_eq!(block_slots(&state), vec![100]);
        session.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_budget_is_capped() {
        let ledger = MockLedger::new().with_slot_failures(u32::MAX);
        let (session, _messages) = Session::new(gateway(Network::Devnet, &ledger));
        session.start_polling().await;

        // Failures at 0s, 2s and 6s use the budget; the 10s tick finds none left.
        sleep(Duration::from_secs(9)).await;
        assert_eq!(session.view().await.retry_count, MAX_CYCLE_RETRIES);

        sleep(Duration::from_secs(4)).await;
        let state = session.view().await;
        assert_eq!(state.retry_count, MAX_CYCLE_RETRIES);
        assert!(!state.is_loading);
        assert_eq!(session.poller_phase(), Some(PollerPhase::Idle));
        session.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_switch_discards_in_flight_cycle() {
        let old = MockLedger::new()
            .with_slot(500)
            .with_slot_delay(Duration::from_secs(5))
            .with_block(500, JsonMother::block(1));
        let new = MockLedger::new()
            .with_slot(900)
            .with_block(900, JsonMother::block(2));

        let (session, _messages) = Session::new(gateway(Network::MainnetBeta, &old));
        session.start_polling().await;
        sleep(Duration::from_secs(1)).await;

        session.switch_network(gateway(Network::Devnet, &new)).await;
        sleep(Duration::from_secs(8)).await;

        let state = session.view().await;
        assert_eq!(state.network, Network::Devnet);
        assert_eq!(block_slots(&state), vec![900]);
        session.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_cycle_result_is_rejected() {
        let old = MockLedger::new()
            .with_slot(500)
            .with_block(500, JsonMother::block(1));
        let (session, _messages) = Session::new(gateway(Network::MainnetBeta, &old));
        let old_gateway = session.gateway().await;

        session
            .switch_network(gateway(Network::Testnet, &MockLedger::new()))
            .await;
        let late = crate::state::poller::run_cycle(&old_gateway).await.unwrap();

        assert!(!session.apply_cycle(old_gateway.id(), late).await);
        assert!(session.view().await.snapshot.blocks.is_empty());
        assert_eq!(session.record_cycle_failure(old_gateway.id()).await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_sample_keeps_previous_tps() {
        let ledger = MockLedger::new()
            .with_slot(100)
            .with_block(100, JsonMother::block(1))
            .with_performance(600, 60);
        let (session, _messages) = Session::new(gateway(Network::Devnet, &ledger));
        session.start_polling().await;
        sleep(Duration::from_secs(1)).await;
        assert_eq!(session.view().await.snapshot.tps, Some(10));

        ledger.set_performance_failing(true);
        sleep(Duration::from_secs(10)).await;

        assert_eq!(session.view().await.snapshot.tps, Some(10));
        session.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_cycle_keeps_previous_lists() {
        let ledger = MockLedger::new().with_slot(100);
        let (session, _messages) = Session::new(gateway(Network::Devnet, &ledger));
        let id = session.gateway().await.id();

        let first = CycleOutcome {
            blocks: vec![BlockSummary {
                slot: 100,
                timestamp: None,
                transaction_count: 0,
                leader: "Unknown".to_string(),
            }],
            ..CycleOutcome::default()
        };
        assert!(session.apply_cycle(id, first).await);
        assert!(session.apply_cycle(id, CycleOutcome::default()).await);

        assert_eq!(block_slots(&session.view().await), vec![100]);
    }

    #[tokio::test]
    async fn test_bad_endpoint_keeps_session() {
        let (session, _messages) =
            Session::new(gateway(Network::Devnet, &MockLedger::new()));
        let before = session.gateway().await.id();

        let result = session.connect(Network::Testnet, "not a url").await;

        assert!(matches!(result, Err(ExplorerError::Config(_))));
        assert_eq!(session.gateway().await.id(), before);
    }

    #[tokio::test]
    async fn test_connect_switches_and_notifies() {
        let (session, mut messages) =
            Session::new(gateway(Network::Devnet, &MockLedger::new()));
        let before = session.gateway().await.id();

        session
            .connect(Network::Testnet, "http://127.0.0.1:8899")
            .await
            .unwrap();

        assert_eq!(
            messages.recv().await,
            Some(SessionMessage::NetworkSwitched(Network::Testnet))
        );
        let state = session.view().await;
        assert_eq!(state.network, Network::Testnet);
        assert_ne!(state.gateway.id(), before);
        assert!(!session.is_polling());
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_stores_result_and_notifies() {
        let ledger = MockLedger::new().with_transaction("sigA", JsonMother::transfer(1));
        let (session, mut messages) = Session::new(gateway(Network::Devnet, &ledger));

        session.search("sigA");
        let message = messages.recv().await;

        assert!(matches!(
            message,
            Some(SessionMessage::SearchCompleted(QueryResult::SingleTransaction(_)))
        ));
        let state = session.view().await;
        assert!(state.has_searched);
        assert!(!state.is_search_loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slower_older_search_does_not_overwrite_newer() {
        let ledger = MockLedger::new()
            .with_transaction("sigSlow", JsonMother::transfer(1))
            .with_transaction_delay("sigSlow", Duration::from_secs(5))
            .with_transaction("sigFast", JsonMother::transfer(2));
        let (session, _messages) = Session::new(gateway(Network::Devnet, &ledger));

        session.search("sigSlow");
        sleep(Duration::from_secs(1)).await;
        session.search_now("sigFast").await;
        sleep(Duration::from_secs(10)).await;

        let state = session.view().await;
        match &state.search_results {
            QueryResult::SingleTransaction(record) => assert_eq!(record.signature, "sigFast"),
            other => panic!("expected a single transaction, got {other:?}"),
        }
        assert!(!state.is_search_loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_transport_failure_is_not_found() {
        let ledger = MockLedger::new().failing_transactions();
        let (session, _messages) = Session::new(gateway(Network::Devnet, &ledger));

        let result = session.search_now("sigA").await;

        assert_eq!(result, QueryResult::NotFound);
        assert_eq!(session.view().await.search_results, QueryResult::NotFound);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wallet_connect_and_disconnect() {
        let ledger = MockLedger::new()
            .with_signatures(WALLET, &["w1"])
            .with_transaction("w1", JsonMother::transfer(1));
        let (session, _messages) = Session::new(gateway(Network::Devnet, &ledger));

        session.set_wallet(Some(WALLET.parse().unwrap())).await;
        assert_eq!(session.view().await.wallet_transactions.len(), 1);

        session.set_wallet(None).await;
        let state = session.view().await;
        assert!(state.wallet.is_none());
        assert!(state.wallet_transactions.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wallet_failure_clears_list() {
        let ledger = MockLedger::new()
            .with_signatures(WALLET, &["w1"])
            .with_transaction("w1", JsonMother::transfer(1));
        let (session, _messages) = Session::new(gateway(Network::Devnet, &ledger));
        session.set_wallet(Some(WALLET.parse().unwrap())).await;

        ledger.set_signatures_failing(WALLET);
        session.refresh_wallet().await;

        let state = session.view().await;
        assert!(state.wallet_transactions.is_empty());
        assert!(!state.is_wallet_loading);
    }
}
