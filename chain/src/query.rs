//! Read-only chain query capabilities.
//!
//! Two traits because there is no single chain that is authoritative for
//! both transfer directions: each direction's proof of completion lives on
//! the receiving chain. The reconciliation poller and the preflight
//! validator depend on these traits, never on the HTTP clients directly.

use crate::result::{MessageResult, NotificationOutcome};
use crate::ChainError;
use async_trait::async_trait;
use trestle_types::AccountId;

/// Read access to the home ledger.
#[async_trait]
pub trait HomeQuery: Send + Sync {
    /// Whether the account exists in the home ledger's account state.
    async fn account_exists(&self, account: &AccountId) -> Result<bool, ChainError>;

    /// Whether `account` has registered storage with the given token
    /// contract. Fungible transfers into the home token-contract model
    /// require this one-time registration before the account can hold a
    /// balance.
    async fn storage_registered(
        &self,
        token: &AccountId,
        account: &AccountId,
    ) -> Result<bool, ChainError>;

    /// The anchor's processing result for an inbound appchain message.
    /// `None` means the chain has not processed the message yet.
    async fn message_processing_result(
        &self,
        anchor: &AccountId,
        nonce: u64,
    ) -> Result<Option<MessageResult>, ChainError>;
}

/// Read access to one appchain, over the connection established for the
/// active appchain selection.
#[async_trait]
pub trait AppchainQuery: Send + Sync {
    /// Whether the account already holds a provider reference count in the
    /// appchain's system module.
    async fn account_registered(&self, key: &[u8; 32]) -> Result<bool, ChainError>;

    /// Outcome recorded in the appchain's notification history for a
    /// home→appchain message. `None` means no outcome yet.
    async fn notification_outcome(
        &self,
        sequence: u64,
    ) -> Result<Option<NotificationOutcome>, ChainError>;
}
