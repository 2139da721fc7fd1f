//! Launchpad token-count strategies, in priority order.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use fey_core::constants::{
    EXPLORER_COUNT_MAX, EXPLORER_COUNT_MIN, LAUNCHPAD_COUNT_FUNCTIONS, SELECTOR_COUNT_MAX,
    SELECTOR_COUNT_MIN, STORAGE_SLOT_COUNT_MAX, STORAGE_SLOT_COUNT_MIN, STORAGE_SLOT_SCAN_LIMIT,
};
use fey_fetch::abi::{decode_uint, encode_call, function_selector};
use fey_fetch::{ExplorerClient, RpcClient};

use crate::{Bounds, Probe, ProbeOutcome};

const SELECTOR_BOUNDS: Bounds = Bounds::new(SELECTOR_COUNT_MIN, SELECTOR_COUNT_MAX);
const STORAGE_BOUNDS: Bounds = Bounds::new(STORAGE_SLOT_COUNT_MIN, STORAGE_SLOT_COUNT_MAX);
const EXPLORER_BOUNDS: Bounds = Bounds::new(EXPLORER_COUNT_MIN, EXPLORER_COUNT_MAX);

/// Builds the launchpad strategy list: count getters, then raw storage
/// slots, then explorer-derived counts.
pub fn launchpad_probes(rpc: Arc<RpcClient>, explorer: Arc<ExplorerClient>) -> Vec<Box<dyn Probe>> {
    let mut probes: Vec<Box<dyn Probe>> = Vec::new();

    for name in LAUNCHPAD_COUNT_FUNCTIONS {
        probes.push(Box::new(SelectorProbe::new(rpc.clone(), name)));
    }
    for slot in 0..STORAGE_SLOT_SCAN_LIMIT {
        probes.push(Box::new(StorageSlotProbe::new(rpc.clone(), slot)));
    }

    probes.push(Box::new(ContractCreationProbe::new(explorer.clone())));
    probes.push(Box::new(SuccessfulTxProbe::new(explorer.clone())));
    probes.push(Box::new(LogTxProbe::new(explorer)));
    probes
}

/// Calls a zero-argument count getter such as `tokenCount()`.
pub struct SelectorProbe {
    rpc: Arc<RpcClient>,
    name: String,
    data: String,
}

impl SelectorProbe {
    /// Creates a probe for the getter `name` (without parentheses).
    pub fn new(rpc: Arc<RpcClient>, name: &str) -> Self {
        let data = encode_call(function_selector(&format!("{name}()")), &[]);
        Self {
            rpc,
            name: name.to_string(),
            data,
        }
    }
}

#[async_trait]
impl Probe for SelectorProbe {
    fn source(&self) -> &str {
        &self.name
    }

    async fn attempt(&self, address: &str) -> ProbeOutcome {
        match self.rpc.call_uint(address, &self.data).await {
            Ok(Some(value)) => SELECTOR_BOUNDS.classify(value),
            Ok(None) => ProbeOutcome::Failed("empty result".into()),
            Err(e) => ProbeOutcome::Failed(e.to_string()),
        }
    }
}

/// Reads a raw storage slot, e.g. the length word of a dynamic array.
pub struct StorageSlotProbe {
    rpc: Arc<RpcClient>,
    slot: u64,
    source: String,
}

impl StorageSlotProbe {
    /// Creates a probe for `slot`.
    pub fn new(rpc: Arc<RpcClient>, slot: u64) -> Self {
        Self {
            rpc,
            slot,
            source: format!("storage_slot_{slot}"),
        }
    }
}

#[async_trait]
impl Probe for StorageSlotProbe {
    fn source(&self) -> &str {
        &self.source
    }

    async fn attempt(&self, address: &str) -> ProbeOutcome {
        let word = match self.rpc.get_storage_at(address, self.slot).await {
            Ok(word) => word,
            Err(e) => return ProbeOutcome::Failed(e.to_string()),
        };
        match decode_uint(&word) {
            Ok(Some(value)) => STORAGE_BOUNDS.classify(value),
            Ok(None) => ProbeOutcome::Failed("empty slot".into()),
            Err(e) => ProbeOutcome::Failed(e.to_string()),
        }
    }
}

/// Counts contract deployments among the address's internal transactions.
pub struct ContractCreationProbe {
    explorer: Arc<ExplorerClient>,
}

impl ContractCreationProbe {
    /// Creates the probe.
    pub fn new(explorer: Arc<ExplorerClient>) -> Self {
        Self { explorer }
    }
}

#[async_trait]
impl Probe for ContractCreationProbe {
    fn source(&self) -> &str {
        "basescan_contract_creations"
    }

    async fn attempt(&self, address: &str) -> ProbeOutcome {
        match self.explorer.internal_transactions(address).await {
            Ok(txs) => {
                let created = txs.iter().filter(|tx| tx.is_contract_creation()).count();
                EXPLORER_BOUNDS.classify(created as u64)
            }
            Err(e) => ProbeOutcome::Failed(e.to_string()),
        }
    }
}

/// Counts successful transactions to the address as a proxy for launches.
pub struct SuccessfulTxProbe {
    explorer: Arc<ExplorerClient>,
}

impl SuccessfulTxProbe {
    /// Creates the probe.
    pub fn new(explorer: Arc<ExplorerClient>) -> Self {
        Self { explorer }
    }
}

#[async_trait]
impl Probe for SuccessfulTxProbe {
    fn source(&self) -> &str {
        "basescan_tx_count_proxy"
    }

    async fn attempt(&self, address: &str) -> ProbeOutcome {
        match self.explorer.transactions(address).await {
            Ok(txs) => EXPLORER_BOUNDS.classify(txs.iter().filter(|tx| tx.succeeded()).count() as u64),
            Err(e) => ProbeOutcome::Failed(e.to_string()),
        }
    }
}

/// Counts distinct transactions among the address's event logs.
pub struct LogTxProbe {
    explorer: Arc<ExplorerClient>,
}

impl LogTxProbe {
    /// Creates the probe.
    pub fn new(explorer: Arc<ExplorerClient>) -> Self {
        Self { explorer }
    }
}

#[async_trait]
impl Probe for LogTxProbe {
    fn source(&self) -> &str {
        "basescan_tx_count"
    }

    async fn attempt(&self, address: &str) -> ProbeOutcome {
        match self.explorer.logs(address).await {
            Ok(logs) => {
                let distinct: HashSet<&str> = logs
                    .iter()
                    .map(|log| log.transaction_hash.as_str())
                    .filter(|hash| !hash.is_empty())
                    .collect();
                EXPLORER_BOUNDS.classify(distinct.len() as u64)
            }
            Err(e) => ProbeOutcome::Failed(e.to_string()),
        }
    }
}
