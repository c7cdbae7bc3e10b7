//! Nullable signer — scripted submission outcomes for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use trestle_chain::{ActionSigner, ChainAction, SignerError, SubmitReceipt};

/// A signer whose responses are scripted up front.
///
/// Each `submit` consumes the next scripted outcome and records the action
/// it was asked to sign, so tests can assert on exactly what the
/// orchestrator constructed.
pub struct NullSigner {
    account: String,
    script: Mutex<VecDeque<Result<SubmitReceipt, SignerError>>>,
    submitted: Mutex<Vec<ChainAction>>,
}

impl NullSigner {
    pub fn new(account: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            script: Mutex::new(VecDeque::new()),
            submitted: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful receipt.
    pub fn enqueue_receipt(&self, receipt: SubmitReceipt) {
        self.script.lock().unwrap().push_back(Ok(receipt));
    }

    /// Queue a failure.
    pub fn enqueue_error(&self, error: SignerError) {
        self.script.lock().unwrap().push_back(Err(error));
    }

    /// Actions submitted so far, in order.
    pub fn submitted(&self) -> Vec<ChainAction> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl ActionSigner for NullSigner {
    fn account(&self) -> &str {
        &self.account
    }

    async fn submit(&self, action: &ChainAction) -> Result<SubmitReceipt, SignerError> {
        self.submitted.lock().unwrap().push(action.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(SignerError::Rejected("no scripted response".into())))
    }
}
