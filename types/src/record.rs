//! The pending cross-chain transfer record and its status state machine.

use crate::appchain::AppchainId;
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a cross-chain transfer.
///
/// Determines which chain is authoritative for the pending check: the proof
/// of completion lives on the *receiving* chain, not the sending one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    HomeToAppchain,
    AppchainToHome,
}

impl Direction {
    /// Stable string form, used in ledger keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::HomeToAppchain => "home_to_appchain",
            Direction::AppchainToHome => "appchain_to_home",
        }
    }

    /// Stable single-byte form, used in storage composite keys.
    pub fn as_byte(&self) -> u8 {
        match self {
            Direction::HomeToAppchain => 0,
            Direction::AppchainToHome => 1,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a pending transfer.
///
/// Transitions are forward-only: `Pending → Succeed` or `Pending → Failed`.
/// A terminal status is never revisited.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferStatus {
    Pending,
    Succeed,
    Failed,
}

impl TransferStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferStatus::Succeed | TransferStatus::Failed)
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransferStatus::Pending => "pending",
            TransferStatus::Succeed => "succeed",
            TransferStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// A transfer that has been submitted on its source chain but not yet
/// confirmed on the destination chain.
///
/// Created client-side immediately after a successful submission call — the
/// client does not wait for finality. Mutated only by the reconciliation
/// poller. `sequence_id` is assigned by the source chain's bridging module
/// and is unique within `(appchain_id, direction)`; the client never
/// fabricates it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeTransferRecord {
    pub appchain_id: AppchainId,
    pub sequence_id: u64,
    pub direction: Direction,
    /// Sender, in the source chain's native format.
    pub from_account: String,
    /// Receiver, already translated to the destination chain's expected
    /// format at submission time.
    pub to_account: String,
    /// Fixed-point integer string in the sending chain's precision. Empty
    /// for collectibles, which never carry an amount.
    pub amount: String,
    /// Which asset moved. Empty sentinel means the native asset.
    pub token_contract_id: String,
    pub status: TransferStatus,
    /// Present only when `Failed`: the destination chain's failure reason.
    pub message: Option<String>,
    /// Creation time. Ordering and display only; not protocol-significant.
    pub timestamp: Timestamp,
    /// Source-chain transaction identifier, for audit links only.
    pub hash: String,
}

impl BridgeTransferRecord {
    /// Ledger key within an appchain partition: `{direction}:{sequence_id}`.
    pub fn key(&self) -> String {
        format!("{}:{}", self.direction.as_str(), self.sequence_id)
    }

    /// Whether a status change from `self.status` to `next` moves forward.
    /// Identity transitions are allowed (idempotent re-application).
    pub fn can_transition_to(&self, next: &TransferStatus) -> bool {
        self.status == *next || !self.status.is_terminal()
    }
}
