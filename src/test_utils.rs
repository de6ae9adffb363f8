//! Shared test utilities and Mother pattern factories.
//!
//! `JsonMother` builds node responses as they arrive on the wire,
//! `TransactionMother` builds already-normalized records, and `MockLedger`
//! is a scriptable in-memory [`LedgerRpc`]. Use these helpers to avoid
//! copy-pasting setup code across tests.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::client::{LedgerRpc, PerformanceSample, SignatureInfo};
use crate::domain::{Address, ExplorerError, Outcome, RawBlock, RawTransaction, TransactionRecord};

pub const LEADER: &str = "LeaderIdentity1111111111111111111111111111";
pub const SENDER: &str = "Sender111";
pub const RECEIVER: &str = "Receiver111";
pub const BLOCK_TIME: i64 = 1_700_000_000;

const SYSTEM_PROGRAM: &str = "11111111111111111111111111111111";
const MEMO_PROGRAM: &str = "MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr";

// ============================================================================
// JSON Fixtures
// ============================================================================

pub struct JsonMother;

impl JsonMother {
    /// A block with `count` generated signatures and a fee reward.
    #[must_use]
    pub fn block(count: usize) -> Value {
        let signatures: Vec<String> = (0..count).map(|i| format!("blockSig{i}")).collect();
        let refs: Vec<&str> = signatures.iter().map(String::as_str).collect();
        Self::block_with(&refs)
    }

    #[must_use]
    pub fn block_with(signatures: &[&str]) -> Value {
        json!({
            "blockHeight": 900,
            "blockTime": BLOCK_TIME,
            "blockhash": "EkSnNWid2cvwEVnVx9aBqawnmiCNiDgp3gUdkDPTKN1N",
            "parentSlot": 999,
            "signatures": signatures,
            "rewards": [
                {"pubkey": "Voter1", "lamports": 10, "rewardType": "Voting"},
                {"pubkey": LEADER, "lamports": 5000, "rewardType": "Fee"}
            ]
        })
    }

    /// A system transfer of `lamports` followed by a memo.
    #[must_use]
    pub fn transfer(lamports: u64) -> Value {
        Self::with_instructions(vec![Self::transfer_ix(lamports), Self::memo_ix("thanks")])
    }

    /// A transfer preceded by a compute-budget instruction.
    #[must_use]
    pub fn transfer_after_budget() -> Value {
        Self::with_instructions(vec![
            Self::opaque_ix("ComputeBudget111111111111111111111111111111"),
            Self::transfer_ix(1_000_000),
        ])
    }

    #[must_use]
    pub fn memo(text: &str) -> Value {
        Self::with_instructions(vec![Self::memo_ix(text)])
    }

    /// A single instruction of a program the node could not decode.
    #[must_use]
    pub fn opaque(program_id: &str) -> Value {
        Self::with_instructions(vec![Self::opaque_ix(program_id)])
    }

    /// A single parsed system instruction of type `kind`.
    #[must_use]
    pub fn parsed(kind: &str) -> Value {
        Self::with_instructions(vec![json!({
            "program": "system",
            "programId": SYSTEM_PROGRAM,
            "parsed": {"type": kind, "info": {}},
            "stackHeight": null
        })])
    }

    /// A response with no block time, no meta and no instructions.
    #[must_use]
    pub fn sparse() -> Value {
        json!({
            "slot": 42,
            "transaction": {"message": {}}
        })
    }

    fn with_instructions(instructions: Vec<Value>) -> Value {
        json!({
            "slot": 1000,
            "blockTime": BLOCK_TIME,
            "meta": {
                "err": null,
                "fee": 5000,
                "logMessages": [
                    format!("Program {SYSTEM_PROGRAM} invoke [1]"),
                    format!("Program {SYSTEM_PROGRAM} success")
                ]
            },
            "transaction": {
                "message": {
                    "accountKeys": [],
                    "instructions": instructions,
                    "recentBlockhash": "EkSnNWid2cvwEVnVx9aBqawnmiCNiDgp3gUdkDPTKN1N"
                },
                "signatures": ["fixture"]
            },
            "version": 0
        })
    }

    fn transfer_ix(lamports: u64) -> Value {
        json!({
            "program": "system",
            "programId": SYSTEM_PROGRAM,
            "parsed": {
                "type": "transfer",
                "info": {"source": SENDER, "destination": RECEIVER, "lamports": lamports}
            }
        })
    }

    fn memo_ix(text: &str) -> Value {
        json!({
            "program": "spl-memo",
            "programId": MEMO_PROGRAM,
            "parsed": text
        })
    }

    fn opaque_ix(program_id: &str) -> Value {
        json!({
            "programId": program_id,
            "accounts": [],
            "data": "3DdGGhkhJbjm"
        })
    }
}

// ============================================================================
// Record Fixtures
// ============================================================================

pub struct TransactionMother;

impl TransactionMother {
    /// A successful 0.5 SOL transfer.
    #[must_use]
    pub fn transfer(signature: &str) -> TransactionRecord {
        TransactionRecord {
            signature: signature.to_string(),
            slot: 1000,
            timestamp: BLOCK_TIME,
            classification: "transfer".to_string(),
            transfer_from: Some(SENDER.to_string()),
            transfer_to: Some(RECEIVER.to_string()),
            transfer_amount: Some("0.5".to_string()),
            fee_paid: 5000,
            outcome: Outcome::Success,
            raw_instructions: Vec::new(),
            program_logs: Vec::new(),
        }
    }

    /// A failed transaction without instruction information.
    #[must_use]
    pub fn unknown(signature: &str) -> TransactionRecord {
        TransactionRecord {
            classification: "Unknown".to_string(),
            transfer_from: None,
            transfer_to: None,
            transfer_amount: None,
            outcome: Outcome::Failed,
            ..Self::transfer(signature)
        }
    }
}

// ============================================================================
// Mock Ledger
// ============================================================================

#[derive(Debug, Default)]
struct LedgerScript {
    slot: u64,
    slot_failures: u32,
    slot_delay: Option<Duration>,
    blocks: HashMap<u64, Value>,
    failing_blocks: HashSet<u64>,
    signatures: HashMap<String, Vec<String>>,
    failing_signatures: HashSet<String>,
    last_signature_limit: Option<usize>,
    transactions: HashMap<String, Value>,
    transaction_delays: HashMap<String, Duration>,
    flaky_transactions: HashMap<String, u32>,
    broken_transactions: HashSet<String>,
    transactions_fail: bool,
    performance: Option<PerformanceSample>,
    performance_fails: bool,
}

/// Scriptable in-memory ledger.
///
/// Clones share one script, so a test can keep a clone to inspect calls or
/// change behavior after handing the ledger to a gateway. Anything not
/// scripted is absent: slot 0, no blocks, no signatures, no transactions.
#[derive(Debug, Clone, Default)]
pub struct MockLedger {
    script: Arc<Mutex<LedgerScript>>,
}

fn unavailable() -> ExplorerError {
    ExplorerError::Http { status: 503 }
}

impl MockLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn edit(&self, f: impl FnOnce(&mut LedgerScript)) {
        f(&mut self.script.lock().unwrap_or_else(PoisonError::into_inner));
    }

    fn read<T>(&self, f: impl FnOnce(&mut LedgerScript) -> T) -> T {
        f(&mut self.script.lock().unwrap_or_else(PoisonError::into_inner))
    }

    #[must_use]
    pub fn with_slot(self, slot: u64) -> Self {
        self.edit(|s| s.slot = slot);
        self
    }

    /// The next `count` slot queries fail with a transient error.
    #[must_use]
    pub fn with_slot_failures(self, count: u32) -> Self {
        self.edit(|s| s.slot_failures = count);
        self
    }

    /// Slot queries take `delay` to answer.
    #[must_use]
    pub fn with_slot_delay(self, delay: Duration) -> Self {
        self.edit(|s| s.slot_delay = Some(delay));
        self
    }

    #[must_use]
    pub fn with_block(self, slot: u64, block: Value) -> Self {
        self.edit(|s| {
            s.blocks.insert(slot, block);
        });
        self
    }

    #[must_use]
    pub fn with_failing_block(self, slot: u64) -> Self {
        self.edit(|s| {
            s.failing_blocks.insert(slot);
        });
        self
    }

    #[must_use]
    pub fn with_signatures(self, address: &str, signatures: &[&str]) -> Self {
        self.edit(|s| {
            s.signatures.insert(
                address.to_string(),
                signatures.iter().map(ToString::to_string).collect(),
            );
        });
        self
    }

    #[must_use]
    pub fn with_failing_signatures(self, address: &str) -> Self {
        self.set_signatures_failing(address);
        self
    }

    pub fn set_signatures_failing(&self, address: &str) {
        self.edit(|s| {
            s.failing_signatures.insert(address.to_string());
        });
    }

    #[must_use]
    pub fn with_transaction(self, signature: &str, transaction: Value) -> Self {
        self.edit(|s| {
            s.transactions.insert(signature.to_string(), transaction);
        });
        self
    }

    /// Fetching `signature` takes `delay` to answer.
    #[must_use]
    pub fn with_transaction_delay(self, signature: &str, delay: Duration) -> Self {
        self.edit(|s| {
            s.transaction_delays.insert(signature.to_string(), delay);
        });
        self
    }

    /// A transaction whose first `failures` fetches fail transiently.
    #[must_use]
    pub fn with_flaky_transaction(self, signature: &str, failures: u32, transaction: Value) -> Self {
        self.edit(|s| {
            s.flaky_transactions.insert(signature.to_string(), failures);
        });
        self.with_transaction(signature, transaction)
    }

    /// A transaction whose fetch always fails transiently.
    #[must_use]
    pub fn with_broken_transaction(self, signature: &str) -> Self {
        self.edit(|s| {
            s.broken_transactions.insert(signature.to_string());
        });
        self
    }

    /// Every transaction fetch fails transiently.
    #[must_use]
    pub fn failing_transactions(self) -> Self {
        self.edit(|s| s.transactions_fail = true);
        self
    }

    #[must_use]
    pub fn with_performance(self, num_transactions: u64, sample_period_secs: u64) -> Self {
        self.edit(|s| {
            s.performance = Some(PerformanceSample {
                num_transactions,
                sample_period_secs,
            });
        });
        self
    }

    #[must_use]
    pub fn with_failing_performance(self) -> Self {
        self.set_performance_failing(true);
        self
    }

    pub fn set_performance_failing(&self, failing: bool) {
        self.edit(|s| s.performance_fails = failing);
    }

    /// Limit passed to the most recent signature listing.
    #[must_use]
    pub fn last_signature_limit(&self) -> Option<usize> {
        self.read(|s| s.last_signature_limit)
    }
}

#[async_trait]
impl LedgerRpc for MockLedger {
    async fn get_latest_finalized_slot(&self) -> Result<u64, ExplorerError> {
        let delay = self.read(|s| s.slot_delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.read(|s| {
            if s.slot_failures > 0 {
                s.slot_failures -= 1;
                return Err(unavailable());
            }
            Ok(s.slot)
        })
    }

    async fn get_block(&self, slot: u64) -> Result<Option<RawBlock>, ExplorerError> {
        self.read(|s| {
            if s.failing_blocks.contains(&slot) {
                return Err(unavailable());
            }
            s.blocks
                .get(&slot)
                .map(|block| serde_json::from_value(block.clone()))
                .transpose()
                .map_err(|e| ExplorerError::parse(e.to_string()))
        })
    }

    async fn get_signatures_for_address(
        &self,
        address: &Address,
        limit: usize,
    ) -> Result<Vec<SignatureInfo>, ExplorerError> {
        self.read(|s| {
            s.last_signature_limit = Some(limit);
            if s.failing_signatures.contains(address.as_str()) {
                return Err(unavailable());
            }
            Ok(s.signatures
                .get(address.as_str())
                .into_iter()
                .flatten()
                .take(limit)
                .map(|signature| SignatureInfo {
                    signature: signature.clone(),
                    slot: 1000,
                    err: None,
                    block_time: Some(BLOCK_TIME),
                })
                .collect())
        })
    }

    async fn get_transaction(&self, signature: &str) -> Result<Option<RawTransaction>, ExplorerError> {
        let delay = self.read(|s| s.transaction_delays.get(signature).copied());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.read(|s| {
            if s.transactions_fail || s.broken_transactions.contains(signature) {
                return Err(unavailable());
            }
            if let Some(remaining) = s.flaky_transactions.get_mut(signature)
                && *remaining > 0
            {
                *remaining -= 1;
                return Err(unavailable());
            }
            s.transactions
                .get(signature)
                .map(|tx| serde_json::from_value(tx.clone()))
                .transpose()
                .map_err(|e| ExplorerError::parse(e.to_string()))
        })
    }

    async fn get_recent_performance_sample(
        &self,
    ) -> Result<Option<PerformanceSample>, ExplorerError> {
        self.read(|s| {
            if s.performance_fails {
                return Err(unavailable());
            }
            Ok(s.performance)
        })
    }
}
