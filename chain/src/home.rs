//! HTTP client for the home ledger's JSON-RPC endpoint.

use crate::query::HomeQuery;
use crate::result::{parse_message_result, MessageResult};
use crate::ChainError;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use trestle_types::AccountId;

/// Client for read-only contract view calls on the home ledger.
///
/// Wraps `reqwest::Client` with the chain's RPC URL and provides typed
/// methods for each view the engine needs.
#[derive(Clone)]
pub struct HomeRpcClient {
    http: reqwest::Client,
    rpc_url: String,
}

impl HomeRpcClient {
    /// Create a new client targeting the given RPC URL.
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

    /// Send a JSON-RPC request and return the `result` field.
    async fn rpc(&self, method: &str, params: Value) -> Result<Value, ChainError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
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
                "home RPC returned HTTP {}",
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

    /// Call a read-only contract view method with JSON args.
    pub async fn view_call(
        &self,
        contract: &AccountId,
        method: &str,
        args: Value,
    ) -> Result<Value, ChainError> {
        self.rpc(
            "view_call",
            json!({
                "contract": contract.as_str(),
                "method": method,
                "args": args,
            }),
        )
        .await
    }

    /// Fetch account state, `None` if the account does not exist.
    pub async fn view_account(&self, account: &AccountId) -> Result<Option<Value>, ChainError> {
        let result = self
            .rpc("view_account", json!({ "account": account.as_str() }))
            .await?;
        Ok(match result {
            Value::Null => None,
            other => Some(other),
        })
    }
}

#[async_trait]
impl HomeQuery for HomeRpcClient {
    async fn account_exists(&self, account: &AccountId) -> Result<bool, ChainError> {
        Ok(self.view_account(account).await?.is_some())
    }

    async fn storage_registered(
        &self,
        token: &AccountId,
        account: &AccountId,
    ) -> Result<bool, ChainError> {
        let balance = self
            .view_call(
                token,
                "storage_balance_of",
                json!({ "account_id": account.as_str() }),
            )
            .await?;
        Ok(!balance.is_null())
    }

    async fn message_processing_result(
        &self,
        anchor: &AccountId,
        nonce: u64,
    ) -> Result<Option<MessageResult>, ChainError> {
        let result = self
            .view_call(
                anchor,
                "message_processing_result",
                json!({ "nonce": nonce }),
            )
            .await?;
        match result {
            Value::Null => Ok(None),
            present => parse_message_result(&present).map(Some),
        }
    }
}
