//! The signing capability boundary.
//!
//! Wallet-connection and cryptographic signing internals live outside this
//! repository; the engine sees only an [`ActionSigner`] that accepts exactly
//! one chain action per submission and returns the transaction receipt once
//! the wallet and chain accept it. It does not wait for cross-chain
//! settlement.

use crate::events::ChainEvent;
use crate::SignerError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use trestle_types::AccountId;

/// The single on-chain action a submission constructs.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "chain", rename_all = "snake_case")]
pub enum ChainAction {
    /// A function call on a home-ledger contract.
    HomeCall {
        contract: AccountId,
        method: String,
        args: Value,
        /// Attached deposit as an integer string in the home chain's
        /// smallest unit, matching how amounts travel everywhere else.
        deposit: String,
    },
    /// A signed extrinsic on the active appchain.
    AppchainExtrinsic {
        pallet: String,
        call: String,
        args: Value,
    },
}

/// Receipt returned once the source chain accepted the action.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubmitReceipt {
    /// Source-chain transaction/extrinsic identifier.
    pub tx_hash: String,
    /// Events emitted during execution, in order.
    pub events: Vec<ChainEvent>,
}

/// Signing capability supplied by the wallet session.
#[async_trait]
pub trait ActionSigner: Send + Sync {
    /// The signing account, in the source chain's native format.
    fn account(&self) -> &str;

    /// Sign and submit one action; resolves when the chain accepts it.
    async fn submit(&self, action: &ChainAction) -> Result<SubmitReceipt, SignerError>;
}

#[derive(Deserialize)]
struct SignerErrorBody {
    kind: String,
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct SignerResponse {
    #[serde(default)]
    error: Option<SignerErrorBody>,
    #[serde(default)]
    tx_hash: Option<String>,
    #[serde(default)]
    events: Vec<ChainEvent>,
}

/// `ActionSigner` that forwards actions to a wallet daemon over HTTP.
///
/// The daemon prompts the user, signs, submits, and reports either a receipt
/// or a structured error. A `user_cancelled` error kind is mapped to
/// [`SignerError::UserCancelled`] so callers can swallow it.
pub struct HttpSigner {
    http: reqwest::Client,
    endpoint: String,
    account: String,
}

impl HttpSigner {
    pub fn new(
        endpoint: impl Into<String>,
        account: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SignerError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| SignerError::Transport(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            account: account.into(),
        })
    }
}

#[async_trait]
impl ActionSigner for HttpSigner {
    fn account(&self) -> &str {
        &self.account
    }

    async fn submit(&self, action: &ChainAction) -> Result<SubmitReceipt, SignerError> {
        let body = serde_json::json!({
            "account": self.account,
            "action": action,
        });
        let response = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| SignerError::Transport(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(SignerError::Transport(format!(
                "signer returned HTTP {}",
                response.status()
            )));
        }

        let parsed: SignerResponse = response
            .json()
            .await
            .map_err(|e| SignerError::Transport(format!("invalid signer response: {e}")))?;

        if let Some(err) = parsed.error {
            return match err.kind.as_str() {
                "user_cancelled" => Err(SignerError::UserCancelled),
                _ => Err(SignerError::Rejected(err.message)),
            };
        }

        let tx_hash = parsed
            .tx_hash
            .ok_or_else(|| SignerError::Transport("signer response has no tx_hash".into()))?;
        Ok(SubmitReceipt {
            tx_hash,
            events: parsed.events,
        })
    }
}
