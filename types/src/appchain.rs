//! Appchain identity and descriptor.

use crate::account::AccountId;
use crate::asset::Decimals;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an appchain. Partition key for the pending-transfer ledger.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AppchainId(String);

impl AppchainId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppchainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Metadata for the appchain's wrapped fungible token on the home ledger.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WrappedTokenMeta {
    pub symbol: String,
    /// Decimals may differ per side of the bridge — wrapping can change
    /// precision.
    pub decimals: Decimals,
}

/// Static description of one appchain, as supplied by the asset catalog.
///
/// Immutable once fetched; the catalog refreshes it on a timer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppchainDescriptor {
    pub id: AppchainId,
    /// Anchor contract on the home ledger that terminates this appchain's
    /// bridge messages.
    pub anchor_contract: AccountId,
    /// RPC endpoint of the appchain's own chain.
    pub rpc_endpoint: String,
    /// Address-format prefix the appchain expects for native addresses.
    pub ss58_prefix: u16,
    pub wrapped_token: WrappedTokenMeta,
    /// Asset-class identifiers for non-fungible collectibles.
    pub collectible_classes: Vec<u64>,
}
