//! Bounded retry for individual transaction fetches.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

use super::Gateway;
use crate::constants::{TX_FETCH_ATTEMPTS, TX_FETCH_RETRY_DELAY};
use crate::domain::{ExplorerError, TransactionRecord, normalize};

/// Retry policy: a fixed number of attempts with a fixed pause between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub attempts: u32,
    /// Pause between consecutive attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: TX_FETCH_ATTEMPTS,
            delay: TX_FETCH_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Runs `op` until it succeeds, fails permanently, or attempts run out.
    ///
    /// Only errors for which [`ExplorerError::is_transient`] holds are
    /// retried; the last error is returned once attempts are exhausted.
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T, ExplorerError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ExplorerError>>,
    {
        let attempts = self.attempts.max(1);
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < attempts => {
                    tracing::debug!("{label}: attempt {attempt}/{attempts} failed: {e}");
                    attempt += 1;
                    sleep(self.delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Fetch and normalize one transaction with the default retry policy.
///
/// Returns `Ok(None)` when the node does not know the signature.
///
/// # Errors
///
/// Returns the last error once retries are exhausted or on a permanent failure.
pub async fn fetch_record(
    gateway: &Gateway,
    signature: &str,
) -> Result<Option<TransactionRecord>, ExplorerError> {
    let raw = RetryPolicy::default()
        .run(signature, move || gateway.get_transaction(signature))
        .await?;
    Ok(raw.map(|raw| normalize(signature, &raw)))
}

/// Fetch and normalize each signature in order, skipping the ones that
/// are unknown or keep failing.
pub async fn fetch_records<'a, I>(gateway: &Gateway, signatures: I) -> Vec<TransactionRecord>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut records = Vec::new();
    for signature in signatures {
        match fetch_record(gateway, signature).await {
            Ok(Some(record)) => records.push(record),
            Ok(None) => tracing::debug!("transaction {signature} not found"),
            Err(e) => tracing::warn!("abandoning transaction {signature}: {e}"),
        }
    }
    records
}

// ============================================================================
// Tests
// ============================================================================
