//! Background refresh of the recent-blocks / recent-transactions snapshot.
//!
//! One poller runs per gateway. It polls immediately, then every
//! [`POLL_INTERVAL`]. A failed cycle schedules a one-shot retry after a
//! linear backoff (2s, 4s, 6s) until the session's retry budget is spent;
//! after that only the regular interval fires until a cycle succeeds.
//!
//! Stopping the poller aborts its task, which cancels both the interval and
//! any pending backoff. Results are applied through the session, which drops
//! them if the session has moved on to another gateway in the meantime.

use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{MissedTickBehavior, Sleep, interval, sleep};

use super::Session;
use crate::client::{Gateway, GatewayId, fetch_records};
use crate::constants::{
    BACKOFF_STEP, FALLBACK_ADDRESSES, POLL_INTERVAL, RECENT_BLOCKS, RECENT_TRANSACTIONS,
};
use crate::domain::{Address, BlockSummary, ExplorerError, TransactionRecord};

// ============================================================================
// Cycle
// ============================================================================

/// Everything one successful poll cycle produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleOutcome {
    /// Recent blocks, newest first.
    pub blocks: Vec<BlockSummary>,
    /// Recent transactions from the first active fallback address.
    pub transactions: Vec<TransactionRecord>,
    /// Transactions per second, when a sample was available.
    pub tps: Option<u64>,
}

/// Run one poll cycle against `gateway`.
///
/// Individual block, address and sample failures are tolerated and logged.
///
/// # Errors
///
/// Returns an error when the latest finalized slot cannot be read.
pub async fn run_cycle(gateway: &Arc<Gateway>) -> Result<CycleOutcome, ExplorerError> {
    let slot = gateway.get_latest_finalized_slot().await?;
    let blocks = fetch_recent_blocks(gateway, slot).await;
    let transactions = fetch_recent_transactions(gateway).await;

    let tps = match gateway.get_recent_throughput_sample().await {
        Ok(sample) => sample.and_then(|s| s.tps()),
        Err(e) => {
            tracing::debug!("throughput sample unavailable: {e}");
            None
        }
    };

    Ok(CycleOutcome {
        blocks,
        transactions,
        tps,
    })
}

/// Fetch the blocks at `slot`, `slot - 1`, ... concurrently.
async fn fetch_recent_blocks(gateway: &Arc<Gateway>, slot: u64) -> Vec<BlockSummary> {
    let mut join_set = JoinSet::new();

    for block_slot in (0..RECENT_BLOCKS).filter_map(|i| slot.checked_sub(i)) {
        let gateway = Arc::clone(gateway);
        join_set.spawn(async move {
            match gateway.get_block(block_slot).await {
                Ok(block) => block.map(|b| BlockSummary::from_raw(block_slot, &b)),
                Err(e) => {
                    tracing::debug!("block {block_slot} fetch failed: {e}");
                    None
                }
            }
        });
    }

    let mut blocks: Vec<BlockSummary> = join_set.join_all().await.into_iter().flatten().collect();
    blocks.sort_by(|a, b| b.slot.cmp(&a.slot));
    blocks
}

/// Recent transactions of the first fallback address that has any.
async fn fetch_recent_transactions(gateway: &Gateway) -> Vec<TransactionRecord> {
    for candidate in FALLBACK_ADDRESSES {
        let address: Address = match candidate.parse() {
            Ok(address) => address,
            Err(e) => {
                tracing::debug!("skipping fallback address {candidate}: {e}");
                continue;
            }
        };

        match gateway
            .get_signatures_for_address(&address, RECENT_TRANSACTIONS)
            .await
        {
            Ok(signatures) if !signatures.is_empty() => {
                return fetch_records(
                    gateway,
                    signatures
                        .iter()
                        .take(RECENT_TRANSACTIONS)
                        .map(|s| s.signature.as_str())
                        .collect::<Vec<_>>(),
                )
                .await;
            }
            Ok(_) => tracing::debug!("no recent activity for {address}"),
            Err(e) => tracing::debug!("signature listing for {address} failed: {e}"),
        }
    }
    Vec::new()
}

// ============================================================================
// Poller Task
// ============================================================================

/// What the poller is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollerPhase {
    /// Waiting for the next regular tick.
    #[default]
    Idle,
    /// A cycle is in flight.
    Polling,
    /// Waiting out the backoff before retry number `attempt`.
    BackoffWait {
        /// Retry number, starting at 1.
        attempt: u32,
    },
}

impl std::fmt::Display for PollerPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Polling => write!(f, "polling"),
            Self::BackoffWait { attempt } => write!(f, "waiting to retry ({attempt})"),
        }
    }
}

/// Handle to a running poller. Dropping it stops the poller.
#[derive(Debug)]
pub struct PollerHandle {
    gateway_id: GatewayId,
    phase: watch::Receiver<PollerPhase>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Spawn a poller for `gateway` that reports into `session`.
    #[must_use]
    pub fn spawn(session: Session, gateway: Arc<Gateway>) -> Self {
        let (phase_tx, phase) = watch::channel(PollerPhase::Idle);
        let gateway_id = gateway.id();
        let task = tokio::spawn(poll_loop(session, gateway, phase_tx));
        tracing::debug!("poller started for {gateway_id}");
        Self {
            gateway_id,
            phase,
            task,
        }
    }

    /// Current phase of the poll loop.
    #[must_use]
    pub fn phase(&self) -> PollerPhase {
        *self.phase.borrow()
    }

    /// Stop the interval and any pending backoff retry.
    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.task.abort();
        tracing::debug!("poller stopped for {}", self.gateway_id);
    }
}

type Backoff = Option<Pin<Box<Sleep>>>;

async fn wait_backoff(backoff: &mut Backoff) {
    match backoff {
        Some(delay) => delay.as_mut().await,
        None => std::future::pending().await,
    }
}

async fn poll_loop(session: Session, gateway: Arc<Gateway>, phase: watch::Sender<PollerPhase>) {
    let mut ticker = interval(POLL_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut backoff: Backoff = None;

    loop {
        let retrying = tokio::select! {
            _ = ticker.tick() => false,
            () = wait_backoff(&mut backoff), if backoff.is_some() => true,
        };
        if retrying {
            tracing::debug!("retrying poll cycle for {}", gateway.id());
        }

        phase.send_replace(PollerPhase::Polling);
        backoff = match run_cycle(&gateway).await {
            Ok(outcome) => {
                session.apply_cycle(gateway.id(), outcome).await;
                phase.send_replace(PollerPhase::Idle);
                None
            }
            Err(e) => {
                tracing::warn!("poll cycle on {} failed: {e}", gateway.network());
                match session.record_cycle_failure(gateway.id()).await {
                    Some(attempt) => {
                        phase.send_replace(PollerPhase::BackoffWait { attempt });
                        Some(Box::pin(sleep(BACKOFF_STEP * attempt)))
                    }
                    None => {
                        phase.send_replace(PollerPhase::Idle);
                        None
                    }
                }
            }
        };
    }
}

// ============================================================================
// Tests
// ============================================================================
