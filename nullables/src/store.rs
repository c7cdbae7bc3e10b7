//! Nullable store — thread-safe in-memory transfer ledger for testing.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use trestle_store::{StoreError, TransferStore};
use trestle_types::{AppchainId, BridgeTransferRecord};

/// An in-memory transfer ledger with the same semantics as the durable
/// backend: idempotent append, forward-only update, per-appchain clear.
pub struct NullTransferStore {
    partitions: Mutex<HashMap<String, BTreeMap<String, BridgeTransferRecord>>>,
}

impl NullTransferStore {
    pub fn new() -> Self {
        Self {
            partitions: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for NullTransferStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TransferStore for NullTransferStore {
    fn append(
        &self,
        appchain: &AppchainId,
        record: &BridgeTransferRecord,
    ) -> Result<bool, StoreError> {
        let mut partitions = self.partitions.lock().unwrap();
        let partition = partitions.entry(appchain.as_str().to_string()).or_default();
        if partition.contains_key(&record.key()) {
            return Ok(false);
        }
        partition.insert(record.key(), record.clone());
        Ok(true)
    }

    fn update(
        &self,
        appchain: &AppchainId,
        record: &BridgeTransferRecord,
    ) -> Result<(), StoreError> {
        let mut partitions = self.partitions.lock().unwrap();
        let partition = partitions
            .get_mut(appchain.as_str())
            .ok_or_else(|| StoreError::NotFound(record.key()))?;
        let existing = partition
            .get(&record.key())
            .ok_or_else(|| StoreError::NotFound(record.key()))?;
        if !existing.can_transition_to(&record.status) {
            return Err(StoreError::InvalidTransition(format!(
                "{}: {} -> {}",
                record.key(),
                existing.status,
                record.status
            )));
        }
        partition.insert(record.key(), record.clone());
        Ok(())
    }

    fn list(&self, appchain: &AppchainId) -> Result<Vec<BridgeTransferRecord>, StoreError> {
        Ok(self
            .partitions
            .lock()
            .unwrap()
            .get(appchain.as_str())
            .map(|partition| partition.values().cloned().collect())
            .unwrap_or_default())
    }

    fn clear(&self, appchain: &AppchainId) -> Result<(), StoreError> {
        self.partitions.lock().unwrap().remove(appchain.as_str());
        Ok(())
    }
}
