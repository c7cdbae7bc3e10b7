//! Transfer orchestration — one chain action per submission.
//!
//! The orchestrator builds the single "burn/lock" action that initiates a
//! cross-chain transfer, hands it to the signing capability, and turns the
//! receipt into a fully populated pending record. It does not wait for
//! cross-chain settlement; reconciliation is the poller's job.

use std::sync::Arc;

use serde_json::json;

use trestle_chain::events::{
    find_event, AssetBurnedEvent, ChainEvent, CollectibleLockedEvent, LockedEvent,
    MessageQueuedEvent,
};
use trestle_chain::{ActionSigner, ChainAction};
use trestle_codec::{address, amount};
use trestle_types::{
    AccountId, AppchainDescriptor, BridgeError, BridgeSide, BridgeTransferRecord, Collectible,
    Direction, Timestamp, TokenAsset, TransferStatus,
};

use crate::session::BridgeSession;

/// The asset being transferred — fungible or collectible, never both.
#[derive(Clone, Debug)]
pub enum AssetRef {
    Fungible(TokenAsset),
    Collectible(Collectible),
}

/// Input to one submission.
#[derive(Clone, Debug)]
pub struct TransferSpec {
    pub direction: Direction,
    pub asset: AssetRef,
    /// Human-readable decimal amount. Required for fungible transfers;
    /// ignored for collectibles, which always move exactly one instance.
    pub amount: Option<String>,
    /// Target account in the destination chain's input format.
    pub target_account: String,
}

/// A constructed action plus the record fields it determines.
#[derive(Debug)]
pub struct PreparedTransfer {
    pub action: ChainAction,
    /// Receiver translated to the destination chain's expected format.
    pub to_account: String,
    /// Fixed-point integer amount in the sending chain's precision; empty
    /// for collectibles.
    pub amount_integer: String,
    /// Empty sentinel for the native asset.
    pub token_contract_id: String,
    /// Event kind that carries the chain-assigned sequence id for this
    /// submission.
    pub expected_event: &'static str,
}

pub struct TransferOrchestrator {
    descriptor: AppchainDescriptor,
    signer: Arc<dyn ActionSigner>,
}

impl TransferOrchestrator {
    pub fn new(session: &BridgeSession) -> Self {
        Self {
            descriptor: session.descriptor.clone(),
            signer: Arc::clone(&session.signer),
        }
    }

    /// Construct the chain action for a spec. Pure: no signing, no I/O.
    ///
    /// Address and amount problems surface here, before anything reaches
    /// the wallet or the network.
    pub fn prepare(&self, spec: &TransferSpec) -> Result<PreparedTransfer, BridgeError> {
        match (spec.direction, &spec.asset) {
            (Direction::HomeToAppchain, AssetRef::Fungible(token)) => {
                let receiver = self.appchain_receiver_hex(&spec.target_account)?;
                let integer = amount::to_chain_integer(
                    Self::required_amount(spec)?,
                    token.decimals.on(BridgeSide::Home),
                )?;
                if token.is_native() {
                    // The wrapped native asset burns directly on the anchor.
                    Ok(PreparedTransfer {
                        action: ChainAction::HomeCall {
                            contract: self.descriptor.anchor_contract.clone(),
                            method: "burn_wrapped".into(),
                            args: json!({ "receiver": receiver, "amount": integer }),
                            deposit: "0".into(),
                        },
                        to_account: receiver,
                        amount_integer: integer,
                        token_contract_id: String::new(),
                        expected_event: MessageQueuedEvent::KIND,
                    })
                } else {
                    // Other tokens transfer to the anchor with a message
                    // naming the appchain receiver. The one-unit deposit is
                    // required by the storage-registration model.
                    let msg = json!({ "bridge_to_appchain": { "receiver": receiver } });
                    Ok(PreparedTransfer {
                        action: ChainAction::HomeCall {
                            contract: token.contract_id.clone(),
                            method: "transfer_with_message".into(),
                            args: json!({
                                "receiver_id": self.descriptor.anchor_contract.as_str(),
                                "amount": integer,
                                "msg": msg.to_string(),
                            }),
                            deposit: "1".into(),
                        },
                        to_account: receiver,
                        amount_integer: integer,
                        token_contract_id: token.contract_id.as_str().to_string(),
                        expected_event: MessageQueuedEvent::KIND,
                    })
                }
            }
            (Direction::HomeToAppchain, AssetRef::Collectible(collectible)) => {
                let receiver = self.appchain_receiver_hex(&spec.target_account)?;
                let msg = json!({ "bridge_to_appchain": { "receiver": receiver } });
                Ok(PreparedTransfer {
                    action: ChainAction::HomeCall {
                        contract: collectible.contract_id.clone(),
                        method: "transfer_with_message".into(),
                        args: json!({
                            "receiver_id": self.descriptor.anchor_contract.as_str(),
                            "instance": collectible.instance,
                            "msg": msg.to_string(),
                        }),
                        deposit: "1".into(),
                    },
                    to_account: receiver,
                    amount_integer: String::new(),
                    token_contract_id: collectible.contract_id.as_str().to_string(),
                    expected_event: MessageQueuedEvent::KIND,
                })
            }
            (Direction::AppchainToHome, AssetRef::Fungible(token)) => {
                let receiver = AccountId::parse(&spec.target_account)?;
                let receiver_hex = address::to_hex(receiver.as_str().as_bytes());
                let integer = amount::to_chain_integer(
                    Self::required_amount(spec)?,
                    token.decimals.on(BridgeSide::Appchain),
                )?;
                let (call, args, expected_event, contract_id) = if token.is_native() {
                    (
                        "lock",
                        json!({ "receiver": receiver_hex, "amount": integer }),
                        LockedEvent::KIND,
                        String::new(),
                    )
                } else {
                    let asset_id = token.appchain_asset_id.ok_or_else(|| {
                        BridgeError::Other(format!(
                            "token {} has no appchain asset id",
                            token.contract_id
                        ))
                    })?;
                    (
                        "burn_asset",
                        json!({
                            "asset_id": asset_id,
                            "receiver": receiver_hex,
                            "amount": integer,
                        }),
                        AssetBurnedEvent::KIND,
                        token.contract_id.as_str().to_string(),
                    )
                };
                Ok(PreparedTransfer {
                    action: ChainAction::AppchainExtrinsic {
                        pallet: "bridge".into(),
                        call: call.into(),
                        args,
                    },
                    to_account: receiver.as_str().to_string(),
                    amount_integer: integer,
                    token_contract_id: contract_id,
                    expected_event,
                })
            }
            (Direction::AppchainToHome, AssetRef::Collectible(collectible)) => {
                let receiver = AccountId::parse(&spec.target_account)?;
                let receiver_hex = address::to_hex(receiver.as_str().as_bytes());
                Ok(PreparedTransfer {
                    action: ChainAction::AppchainExtrinsic {
                        pallet: "bridge".into(),
                        call: "lock_collectible".into(),
                        args: json!({
                            "class": collectible.class,
                            "instance": collectible.instance,
                            "receiver": receiver_hex,
                        }),
                    },
                    to_account: receiver.as_str().to_string(),
                    amount_integer: String::new(),
                    token_contract_id: collectible.contract_id.as_str().to_string(),
                    expected_event: CollectibleLockedEvent::KIND,
                })
            }
        }
    }

    /// Sign and submit one action, then build the pending record from the
    /// receipt. The chain-assigned sequence id comes from the event kind
    /// specific to this submission; a missing or undecodable event is a
    /// hard failure and no record is produced.
    pub async fn submit(&self, spec: &TransferSpec) -> Result<BridgeTransferRecord, BridgeError> {
        let prepared = self.prepare(spec)?;
        let receipt = self
            .signer
            .submit(&prepared.action)
            .await
            .map_err(BridgeError::from)?;
        let sequence_id = Self::sequence_from(&receipt.events, prepared.expected_event)?;

        tracing::info!(
            appchain = %self.descriptor.id,
            direction = %spec.direction,
            sequence = sequence_id,
            tx = %receipt.tx_hash,
            "transfer submitted"
        );

        Ok(BridgeTransferRecord {
            appchain_id: self.descriptor.id.clone(),
            sequence_id,
            direction: spec.direction,
            from_account: self.signer.account().to_string(),
            to_account: prepared.to_account,
            amount: prepared.amount_integer,
            token_contract_id: prepared.token_contract_id,
            status: TransferStatus::Pending,
            message: None,
            timestamp: Timestamp::now(),
            hash: receipt.tx_hash,
        })
    }

    fn required_amount(spec: &TransferSpec) -> Result<&str, BridgeError> {
        spec.amount
            .as_deref()
            .ok_or_else(|| BridgeError::InvalidAmount("fungible transfer without amount".into()))
    }

    /// Translate an appchain target address to the hex form the bridge
    /// contracts expect.
    fn appchain_receiver_hex(&self, target: &str) -> Result<String, BridgeError> {
        let key = address::to_native_bytes(target, self.descriptor.ss58_prefix)?;
        Ok(address::to_hex(&key))
    }

    fn sequence_from(events: &[ChainEvent], expected: &'static str) -> Result<u64, BridgeError> {
        let event = find_event(events, expected).ok_or_else(|| {
            BridgeError::TransferUnconfirmed(format!("no {expected} event in receipt"))
        })?;
        let unconfirmed = |e: trestle_chain::ChainError| {
            BridgeError::TransferUnconfirmed(e.to_string())
        };
        let sequence = match expected {
            LockedEvent::KIND => LockedEvent::decode(event).map_err(unconfirmed)?.sequence,
            AssetBurnedEvent::KIND => {
                AssetBurnedEvent::decode(event).map_err(unconfirmed)?.sequence
            }
            CollectibleLockedEvent::KIND => {
                CollectibleLockedEvent::decode(event)
                    .map_err(unconfirmed)?
                    .sequence
            }
            MessageQueuedEvent::KIND => {
                MessageQueuedEvent::decode(event).map_err(unconfirmed)?.sequence
            }
            other => {
                return Err(BridgeError::TransferUnconfirmed(format!(
                    "unknown event kind {other}"
                )))
            }
        };
        Ok(sequence)
    }
}
