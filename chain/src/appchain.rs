//! HTTP client for one appchain's RPC endpoint.
//!
//! One client is constructed per active appchain selection and dropped when
//! the user switches appchains; connection reuse within a selection comes
//! from the client's keep-alive pool.

use crate::query::AppchainQuery;
use crate::result::{parse_notification, NotificationOutcome};
use crate::ChainError;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

/// Client for storage-map reads on an appchain, keyed by pallet/item/args.
#[derive(Clone)]
pub struct AppchainRpcClient {
    http: reqwest::Client,
    rpc_url: String,
}

impl AppchainRpcClient {
    pub fn new(rpc_url: impl Into<String>, timeout: Duration) -> Result<Self, ChainError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ChainError::Transport(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            rpc_url: rpc_url.into(),
        })
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// Read one storage value. Returns `Value::Null` for an empty slot.
    pub async fn state_read(
        &self,
        pallet: &str,
        item: &str,
        args: Value,
    ) -> Result<Value, ChainError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "state_read",
            "params": { "pallet": pallet, "item": item, "args": args },
        });

        let response = self
            .http
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChainError::Transport(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ChainError::Transport(format!(
                "appchain RPC returned HTTP {}",
                response.status()
            )));
        }

        let envelope: Value = response
            .json()
            .await
            .map_err(|e| ChainError::InvalidResponse(format!("invalid JSON response: {e}")))?;

        if let Some(err) = envelope.get("error") {
            return Err(ChainError::Rpc(err.to_string()));
        }
        envelope
            .get("result")
            .cloned()
            .ok_or_else(|| ChainError::InvalidResponse("response has no result field".into()))
    }
}

#[async_trait]
impl AppchainQuery for AppchainRpcClient {
    async fn account_registered(&self, key: &[u8; 32]) -> Result<bool, ChainError> {
        let account = self
            .state_read(
                "system",
                "account",
                json!([format!("0x{}", hex::encode(key))]),
            )
            .await?;
        if account.is_null() {
            return Ok(false);
        }
        let providers = account
            .get("providers")
            .and_then(Value::as_u64)
            .unwrap_or(0);
        let consumers = account
            .get("consumers")
            .and_then(Value::as_u64)
            .unwrap_or(0);
        Ok(providers > 0 || consumers > 0)
    }

    async fn notification_outcome(
        &self,
        sequence: u64,
    ) -> Result<Option<NotificationOutcome>, ChainError> {
        let value = self
            .state_read("bridge", "notification_history", json!([sequence]))
            .await?;
        Ok(parse_notification(&value))
    }
}
