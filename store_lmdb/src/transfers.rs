//! LMDB implementation of TransferStore.
//!
//! Key format: `appchain_id_bytes ++ 0x00 ++ direction_byte ++ sequence_id_be`
//! (binary composite key). Appchain ids are variable-length, so a NUL
//! separator delimits the partition for prefix scans; ids come from the
//! catalog and never contain NUL themselves.

use std::ops::Bound;

use heed::types::Bytes;
use heed::{Database, Env};
use std::sync::Arc;

use trestle_store::{StoreError, TransferStore};
use trestle_types::{AppchainId, BridgeTransferRecord};

use crate::environment::LmdbEnvironment;
use crate::LmdbError;

pub struct LmdbTransferStore {
    env: Arc<Env>,
    transfers_db: Database<Bytes, Bytes>,
}

impl LmdbTransferStore {
    pub fn new(environment: &LmdbEnvironment) -> Self {
        Self {
            env: Arc::clone(&environment.env),
            transfers_db: environment.transfers_db,
        }
    }
}

/// Build the composite key for one record.
fn transfer_key(appchain: &AppchainId, record: &BridgeTransferRecord) -> Vec<u8> {
    let id = appchain.as_str().as_bytes();
    let mut key = Vec::with_capacity(id.len() + 1 + 1 + 8);
    key.extend_from_slice(id);
    key.push(0);
    key.push(record.direction.as_byte());
    key.extend_from_slice(&record.sequence_id.to_be_bytes());
    key
}

/// Partition prefix for one appchain: `id ++ 0x00`.
fn partition_prefix(appchain: &AppchainId) -> Vec<u8> {
    let id = appchain.as_str().as_bytes();
    let mut prefix = Vec::with_capacity(id.len() + 1);
    prefix.extend_from_slice(id);
    prefix.push(0);
    prefix
}

/// Increment a key prefix in place to form an exclusive upper bound.
fn increment_prefix(prefix: &mut [u8]) {
    for byte in prefix.iter_mut().rev() {
        if *byte < 0xFF {
            *byte += 1;
            return;
        }
        *byte = 0;
    }
}

impl TransferStore for LmdbTransferStore {
    fn append(
        &self,
        appchain: &AppchainId,
        record: &BridgeTransferRecord,
    ) -> Result<bool, StoreError> {
        let key = transfer_key(appchain, record);
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        if self
            .transfers_db
            .get(&wtxn, &key)
            .map_err(LmdbError::from)?
            .is_some()
        {
            // Idempotent ingestion: the record was already appended (for
            // example before a client reload).
            return Ok(false);
        }
        let bytes = bincode::serialize(record).map_err(LmdbError::from)?;
        self.transfers_db
            .put(&mut wtxn, &key, &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(true)
    }

    fn update(
        &self,
        appchain: &AppchainId,
        record: &BridgeTransferRecord,
    ) -> Result<(), StoreError> {
        let key = transfer_key(appchain, record);
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let existing = self
            .transfers_db
            .get(&wtxn, &key)
            .map_err(LmdbError::from)?
            .ok_or_else(|| LmdbError::NotFound(record.key()))?;
        let existing: BridgeTransferRecord =
            bincode::deserialize(existing).map_err(LmdbError::from)?;
        if !existing.can_transition_to(&record.status) {
            return Err(StoreError::InvalidTransition(format!(
                "{}: {} -> {}",
                record.key(),
                existing.status,
                record.status
            )));
        }
        let bytes = bincode::serialize(record).map_err(LmdbError::from)?;
        self.transfers_db
            .put(&mut wtxn, &key, &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn list(&self, appchain: &AppchainId) -> Result<Vec<BridgeTransferRecord>, StoreError> {
        let prefix = partition_prefix(appchain);
        let mut upper = prefix.clone();
        increment_prefix(&mut upper);

        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let bounds = (
            Bound::Included(prefix.as_slice()),
            Bound::Excluded(upper.as_slice()),
        );
        let iter = self
            .transfers_db
            .range(&rtxn, &bounds)
            .map_err(LmdbError::from)?;
        let mut results = Vec::new();
        for entry in iter {
            let (_key, val) = entry.map_err(LmdbError::from)?;
            let record: BridgeTransferRecord =
                bincode::deserialize(val).map_err(LmdbError::from)?;
            results.push(record);
        }
        Ok(results)
    }

    fn clear(&self, appchain: &AppchainId) -> Result<(), StoreError> {
        let prefix = partition_prefix(appchain);
        let mut upper = prefix.clone();
        increment_prefix(&mut upper);

        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let mut keys = Vec::new();
        {
            let bounds = (
                Bound::Included(prefix.as_slice()),
                Bound::Excluded(upper.as_slice()),
            );
            let iter = self
                .transfers_db
                .range(&wtxn, &bounds)
                .map_err(LmdbError::from)?;
            for entry in iter {
                let (key, _val) = entry.map_err(LmdbError::from)?;
                keys.push(key.to_vec());
            }
        }
        for key in &keys {
            self.transfers_db
                .delete(&mut wtxn, key)
                .map_err(LmdbError::from)?;
        }
        wtxn.commit().map_err(LmdbError::from)?;
        tracing::info!(appchain = %appchain, removed = keys.len(), "cleared transfer ledger");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trestle_types::{Direction, Timestamp, TransferStatus};

    fn record(seq: u64, direction: Direction, status: TransferStatus) -> BridgeTransferRecord {
        BridgeTransferRecord {
            appchain_id: AppchainId::new("gravity"),
            sequence_id: seq,
            direction,
            from_account: "alice.home".into(),
            to_account: "0xd43593c715fdd31c61141abd04a99fd6822c8558854ccde39a5684e7a56da27d"
                .into(),
            amount: "1000000000000".into(),
            token_contract_id: String::new(),
            status,
            message: None,
            timestamp: Timestamp::new(1_700_000_000),
            hash: "0xfeed".into(),
        }
    }

    fn open_store(dir: &std::path::Path) -> LmdbTransferStore {
        let env = LmdbEnvironment::open_with(dir, 16 * 1024 * 1024, 4).unwrap();
        LmdbTransferStore::new(&env)
    }

    #[test]
    fn append_then_list() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(dir.path());
        let chain = AppchainId::new("gravity");

        let appended = store
            .append(&chain, &record(1, Direction::HomeToAppchain, TransferStatus::Pending))
            .unwrap();
        assert!(appended);
        let listed = store.list(&chain).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].sequence_id, 1);
    }

    #[test]
    fn append_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(dir.path());
        let chain = AppchainId::new("gravity");
        let rec = record(7, Direction::AppchainToHome, TransferStatus::Pending);

        assert!(store.append(&chain, &rec).unwrap());
        assert!(!store.append(&chain, &rec).unwrap());
        assert_eq!(store.list(&chain).unwrap().len(), 1);
    }

    #[test]
    fn same_sequence_different_direction_coexists() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(dir.path());
        let chain = AppchainId::new("gravity");

        store
            .append(&chain, &record(5, Direction::HomeToAppchain, TransferStatus::Pending))
            .unwrap();
        store
            .append(&chain, &record(5, Direction::AppchainToHome, TransferStatus::Pending))
            .unwrap();
        assert_eq!(store.list(&chain).unwrap().len(), 2);
    }

    #[test]
    fn update_moves_forward() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(dir.path());
        let chain = AppchainId::new("gravity");
        let pending = record(3, Direction::AppchainToHome, TransferStatus::Pending);
        store.append(&chain, &pending).unwrap();

        let mut done = pending.clone();
        done.status = TransferStatus::Succeed;
        store.update(&chain, &done).unwrap();

        let listed = store.list(&chain).unwrap();
        assert_eq!(listed[0].status, TransferStatus::Succeed);
    }

    #[test]
    fn update_rejects_backward_transition() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(dir.path());
        let chain = AppchainId::new("gravity");
        let mut rec = record(3, Direction::AppchainToHome, TransferStatus::Pending);
        store.append(&chain, &rec).unwrap();

        rec.status = TransferStatus::Failed;
        rec.message = Some("Insufficient balance".into());
        store.update(&chain, &rec).unwrap();

        rec.status = TransferStatus::Pending;
        let err = store.update(&chain, &rec).unwrap_err();
        assert!(matches!(err, StoreError::InvalidTransition(_)));

        // The stored record is untouched.
        let listed = store.list(&chain).unwrap();
        assert_eq!(listed[0].status, TransferStatus::Failed);
    }

    #[test]
    fn update_unknown_key_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(dir.path());
        let chain = AppchainId::new("gravity");
        let rec = record(99, Direction::HomeToAppchain, TransferStatus::Pending);
        assert!(matches!(
            store.update(&chain, &rec).unwrap_err(),
            StoreError::NotFound(_)
        ));
    }

    #[test]
    fn clear_is_scoped_to_one_appchain() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(dir.path());
        let gravity = AppchainId::new("gravity");
        let orbit = AppchainId::new("orbit");

        store
            .append(&gravity, &record(1, Direction::HomeToAppchain, TransferStatus::Pending))
            .unwrap();
        store
            .append(&orbit, &record(1, Direction::HomeToAppchain, TransferStatus::Pending))
            .unwrap();

        store.clear(&gravity).unwrap();
        assert!(store.list(&gravity).unwrap().is_empty());
        assert_eq!(store.list(&orbit).unwrap().len(), 1);
    }

    #[test]
    fn prefix_does_not_bleed_into_longer_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(dir.path());
        let short = AppchainId::new("grav");
        let long = AppchainId::new("gravity");

        store
            .append(&long, &record(1, Direction::HomeToAppchain, TransferStatus::Pending))
            .unwrap();
        assert!(store.list(&short).unwrap().is_empty());
        store.clear(&short).unwrap();
        assert_eq!(store.list(&long).unwrap().len(), 1);
    }

    #[test]
    fn records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let chain = AppchainId::new("gravity");
        {
            let store = open_store(dir.path());
            store
                .append(&chain, &record(11, Direction::AppchainToHome, TransferStatus::Pending))
                .unwrap();
        }
        let store = open_store(dir.path());
        let listed = store.list(&chain).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].sequence_id, 11);
    }
}
