//! Bridgeable assets: fungible tokens and non-fungible collectibles.

use crate::account::AccountId;
use serde::{Deserialize, Serialize};

/// Which side of the bridge an operation refers to.
///
/// A single logical asset may carry different precision on each side, so
/// every decimals lookup names its side explicitly — decimals are never
/// inferred positionally.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BridgeSide {
    Home,
    Appchain,
}

/// Per-asset decimals, scalar or split per bridge side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Decimals {
    Uniform(u8),
    PerSide { home: u8, appchain: u8 },
}

impl Decimals {
    /// The decimals value in effect on the given side.
    pub fn on(&self, side: BridgeSide) -> u8 {
        match (self, side) {
            (Decimals::Uniform(d), _) => *d,
            (Decimals::PerSide { home, .. }, BridgeSide::Home) => *home,
            (Decimals::PerSide { appchain, .. }, BridgeSide::Appchain) => *appchain,
        }
    }
}

/// A bridgeable fungible token.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenAsset {
    /// Token contract on the home ledger.
    pub contract_id: AccountId,
    /// Numeric asset id on the appchain side. `None` means the appchain's
    /// native asset (represented on the home ledger as the wrapped token).
    pub appchain_asset_id: Option<u32>,
    pub decimals: Decimals,
    pub symbol: String,
    pub icon: Option<String>,
}

impl TokenAsset {
    /// Whether this is the appchain's native asset (the wrapped token).
    pub fn is_native(&self) -> bool {
        self.appchain_asset_id.is_none()
    }
}

/// Equality is by contract id: two catalog snapshots of the same token
/// compare equal even if display metadata drifted.
impl PartialEq for TokenAsset {
    fn eq(&self, other: &Self) -> bool {
        self.contract_id == other.contract_id
    }
}

impl Eq for TokenAsset {}

/// A non-fungible collectible instance.
///
/// Collectibles cannot be split: a transfer always moves exactly this one
/// instance and never carries a numeric amount.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collectible {
    /// Instance id within the class.
    pub instance: String,
    /// Asset-class id the instance belongs to.
    pub class: u64,
    /// Current owner, in the holding chain's native address format.
    pub owner: String,
    /// Home-ledger collectible contract.
    pub contract_id: AccountId,
    pub name: Option<String>,
}
