//! Pending-transfer ledger storage trait.

use crate::StoreError;
use trestle_types::{AppchainId, BridgeTransferRecord};

/// Durable, per-appchain keyed store of submitted-but-unconfirmed transfers.
///
/// Records are keyed by `(appchain_id, direction, sequence_id)`. The ledger
/// is the single source of truth for what is still in flight: neither chain
/// retains a durable client-addressable view of *pending* state once the
/// client disconnects, so the ledger must survive process restarts and be
/// rehydrated at startup.
pub trait TransferStore: Send + Sync {
    /// Add a new record. Appending a key that already exists is a no-op
    /// returning `false`, not an error — resubmission after a client reload
    /// must not create phantom duplicates.
    fn append(
        &self,
        appchain: &AppchainId,
        record: &BridgeTransferRecord,
    ) -> Result<bool, StoreError>;

    /// Replace a record by its key. Backward status transitions (away from
    /// a terminal state) are rejected with [`StoreError::InvalidTransition`]
    /// and leave the stored record untouched.
    fn update(
        &self,
        appchain: &AppchainId,
        record: &BridgeTransferRecord,
    ) -> Result<(), StoreError>;

    /// All records for one appchain, unfiltered. Callers may filter or sort
    /// by account or recency; the ledger itself does not.
    fn list(&self, appchain: &AppchainId) -> Result<Vec<BridgeTransferRecord>, StoreError>;

    /// Delete all records for one appchain. Used only on explicit user
    /// action, never automatically. Other appchains' records are untouched.
    fn clear(&self, appchain: &AppchainId) -> Result<(), StoreError>;
}
