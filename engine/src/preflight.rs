//! Preflight validation — decide whether a transfer is permitted and
//! compute bounds before anything is submitted.

use std::sync::Arc;

use trestle_chain::{AppchainQuery, HomeQuery};
use trestle_codec::{address, amount};
use trestle_types::{
    AccountId, BridgeError, BridgeParams, BridgeSide, Direction, TokenAsset,
};

use crate::orchestrator::AssetRef;
use crate::session::BridgeSession;

/// Result of validating a transfer target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetStatus {
    /// Whether the account already exists on the target chain.
    pub exists: bool,
    /// Whether the account must make a one-time storage/registration
    /// deposit before it can receive the asset. Applies only to fungible
    /// transfers into the home ledger's token-contract model.
    pub needs_storage_deposit: bool,
}

/// Validates transfer targets and computes transfer bounds.
///
/// Each check is stateless and resolves syntactic problems synchronously;
/// only syntactically valid targets reach the network. Account-existence
/// checks are network calls keyed on user keystroke input — callers drive
/// them from a settled view of the input field
/// ([`BridgeParams::account_check_debounce_ms`]), not from raw keystrokes.
pub struct PreflightValidator {
    home: Arc<dyn HomeQuery>,
    appchain: Arc<dyn AppchainQuery>,
    ss58_prefix: u16,
    params: BridgeParams,
}

impl PreflightValidator {
    pub fn new(session: &BridgeSession) -> Self {
        Self {
            home: Arc::clone(&session.home),
            appchain: Arc::clone(&session.appchain),
            ss58_prefix: session.descriptor.ss58_prefix,
            params: session.params.clone(),
        }
    }

    /// Validate the target account of a transfer in the given direction.
    ///
    /// A malformed account fails with [`BridgeError::InvalidAddress`] before
    /// any query is made.
    pub async fn check_target_account(
        &self,
        direction: Direction,
        account: &str,
        asset: &AssetRef,
    ) -> Result<TargetStatus, BridgeError> {
        match direction {
            // Target lives on the appchain: syntax is an SS58 decode, and
            // existence is a provider reference count in the system module.
            Direction::HomeToAppchain => {
                let key = address::to_native_bytes(account, self.ss58_prefix)?;
                let exists = self
                    .appchain
                    .account_registered(&key)
                    .await
                    .map_err(BridgeError::from)?;
                Ok(TargetStatus {
                    exists,
                    needs_storage_deposit: false,
                })
            }
            // Target lives on the home ledger.
            Direction::AppchainToHome => {
                let account = AccountId::parse(account)?;
                let exists = self
                    .home
                    .account_exists(&account)
                    .await
                    .map_err(BridgeError::from)?;
                let needs_storage_deposit = match asset {
                    AssetRef::Fungible(token) => !self
                        .home
                        .storage_registered(&token.contract_id, &account)
                        .await
                        .map_err(BridgeError::from)?,
                    AssetRef::Collectible(_) => false,
                };
                Ok(TargetStatus {
                    exists,
                    needs_storage_deposit,
                })
            }
        }
    }

    /// Maximum transferable balance for an asset and direction.
    ///
    /// For the home→appchain direction on the native wrapped asset (no
    /// appchain asset id) the protocol fee is paid in the asset itself, so
    /// the maximum is `balance − fee`, floored at zero. Every other
    /// asset/direction combination pays its fee in a different asset and
    /// returns the balance unchanged. The rule is deliberately this narrow;
    /// widening it to non-native fungibles needs product confirmation.
    pub fn max_transferable(
        &self,
        balance: &str,
        asset: &TokenAsset,
        direction: Direction,
    ) -> Result<String, BridgeError> {
        if direction == Direction::HomeToAppchain && asset.is_native() {
            return amount::sub_decimal_floor(
                balance,
                &self.params.wrapped_token_fee,
                asset.decimals.on(BridgeSide::Home),
            );
        }
        Ok(balance.to_string())
    }
}
