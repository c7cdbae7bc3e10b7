//! Nullable chains — programmable query responses for testing.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use trestle_chain::result::parse_notification;
use trestle_chain::{AppchainQuery, ChainError, HomeQuery, MessageResult, NotificationOutcome};
use trestle_types::AccountId;

/// An in-memory home ledger for testing.
/// Thread-safe for use with tokio's multi-threaded runtime.
pub struct NullHomeChain {
    accounts: Mutex<HashSet<String>>,
    /// `(token_contract, account)` pairs with storage registration.
    registered: Mutex<HashSet<(String, String)>>,
    /// Message processing results by nonce.
    results: Mutex<HashMap<u64, MessageResult>>,
    /// Nonces whose queries fail with a transport error.
    failing_nonces: Mutex<HashSet<u64>>,
    /// Artificial latency per query, for concurrency tests.
    latency: Mutex<Option<Duration>>,
}

impl NullHomeChain {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashSet::new()),
            registered: Mutex::new(HashSet::new()),
            results: Mutex::new(HashMap::new()),
            failing_nonces: Mutex::new(HashSet::new()),
            latency: Mutex::new(None),
        }
    }

    pub fn add_account(&self, account: &str) {
        self.accounts.lock().unwrap().insert(account.to_string());
    }

    pub fn register_storage(&self, token: &str, account: &str) {
        self.registered
            .lock()
            .unwrap()
            .insert((token.to_string(), account.to_string()));
    }

    /// Program the anchor's processing result for a nonce.
    pub fn set_message_result(&self, nonce: u64, result: MessageResult) {
        self.results.lock().unwrap().insert(nonce, result);
    }

    /// Make queries for a nonce fail with a transport error.
    pub fn fail_nonce(&self, nonce: u64) {
        self.failing_nonces.lock().unwrap().insert(nonce);
    }

    pub fn heal_nonce(&self, nonce: u64) {
        self.failing_nonces.lock().unwrap().remove(&nonce);
    }

    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = Some(latency);
    }

    async fn simulate_latency(&self) {
        let latency = *self.latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

impl Default for NullHomeChain {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HomeQuery for NullHomeChain {
    async fn account_exists(&self, account: &AccountId) -> Result<bool, ChainError> {
        self.simulate_latency().await;
        Ok(self.accounts.lock().unwrap().contains(account.as_str()))
    }

    async fn storage_registered(
        &self,
        token: &AccountId,
        account: &AccountId,
    ) -> Result<bool, ChainError> {
        self.simulate_latency().await;
        Ok(self
            .registered
            .lock()
            .unwrap()
            .contains(&(token.as_str().to_string(), account.as_str().to_string())))
    }

    async fn message_processing_result(
        &self,
        _anchor: &AccountId,
        nonce: u64,
    ) -> Result<Option<MessageResult>, ChainError> {
        self.simulate_latency().await;
        if self.failing_nonces.lock().unwrap().contains(&nonce) {
            return Err(ChainError::Transport(format!(
                "connection reset querying nonce {nonce}"
            )));
        }
        Ok(self.results.lock().unwrap().get(&nonce).cloned())
    }
}

/// An in-memory appchain for testing.
pub struct NullAppchain {
    /// Raw keys with a provider reference count.
    registered_keys: Mutex<HashSet<[u8; 32]>>,
    /// Notification-history values by sequence, stored as raw JSON so the
    /// real parser is exercised.
    notifications: Mutex<HashMap<u64, Value>>,
    failing_sequences: Mutex<HashSet<u64>>,
    latency: Mutex<Option<Duration>>,
}

impl NullAppchain {
    pub fn new() -> Self {
        Self {
            registered_keys: Mutex::new(HashSet::new()),
            notifications: Mutex::new(HashMap::new()),
            failing_sequences: Mutex::new(HashSet::new()),
            latency: Mutex::new(None),
        }
    }

    pub fn register_key(&self, key: [u8; 32]) {
        self.registered_keys.lock().unwrap().insert(key);
    }

    /// Program the raw notification-history value for a sequence.
    pub fn set_notification(&self, sequence: u64, value: Value) {
        self.notifications.lock().unwrap().insert(sequence, value);
    }

    pub fn fail_sequence(&self, sequence: u64) {
        self.failing_sequences.lock().unwrap().insert(sequence);
    }

    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = Some(latency);
    }

    async fn simulate_latency(&self) {
        let latency = *self.latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

impl Default for NullAppchain {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AppchainQuery for NullAppchain {
    async fn account_registered(&self, key: &[u8; 32]) -> Result<bool, ChainError> {
        self.simulate_latency().await;
        Ok(self.registered_keys.lock().unwrap().contains(key))
    }

    async fn notification_outcome(
        &self,
        sequence: u64,
    ) -> Result<Option<NotificationOutcome>, ChainError> {
        self.simulate_latency().await;
        if self.failing_sequences.lock().unwrap().contains(&sequence) {
            return Err(ChainError::Transport(format!(
                "connection reset querying sequence {sequence}"
            )));
        }
        let value = self
            .notifications
            .lock()
            .unwrap()
            .get(&sequence)
            .cloned()
            .unwrap_or(Value::Null);
        Ok(parse_notification(&value))
    }
}
