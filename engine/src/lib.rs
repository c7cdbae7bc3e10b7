//! The Trestle bridge transfer engine.
//!
//! Ties the pieces together behind one facade: preflight validation,
//! transfer orchestration, the pending-transfer ledger and the
//! reconciliation poller, all working against an explicitly injected
//! [`BridgeSession`].

pub mod config;
pub mod orchestrator;
pub mod poller;
pub mod preflight;
pub mod session;

pub use config::BridgeConfig;
pub use orchestrator::{AssetRef, TransferOrchestrator, TransferSpec};
pub use poller::{PollerHandle, ReconcileSummary, ReconciliationPoller};
pub use preflight::{PreflightValidator, TargetStatus};
pub use session::BridgeSession;

use std::sync::Arc;
use std::time::Duration;

use trestle_chain::AppchainQuery;
use trestle_types::{
    AppchainDescriptor, AppchainId, BridgeError, BridgeTransferRecord, Direction, TokenAsset,
};

/// The engine facade the UI layer drives.
///
/// Owns the reconciliation loop's lifecycle: the loop starts on demand, is
/// restarted against the new partition when the active appchain switches,
/// and is torn down on disconnect. The ledger itself is never cleared by
/// lifecycle changes.
pub struct BridgeEngine {
    session: Arc<BridgeSession>,
    poller: Option<PollerHandle>,
}

impl BridgeEngine {
    pub fn new(session: BridgeSession) -> Self {
        Self {
            session: Arc::new(session),
            poller: None,
        }
    }

    pub fn session(&self) -> &Arc<BridgeSession> {
        &self.session
    }

    /// Start the reconciliation loop if it is not already running.
    pub fn start_poller(&mut self) {
        if self.poller.is_some() {
            return;
        }
        let poller = Arc::new(ReconciliationPoller::new(Arc::clone(&self.session)));
        let interval = Duration::from_secs(self.session.params.poll_interval_secs);
        self.poller = Some(poller::spawn(poller, interval));
        tracing::debug!(appchain = %self.session.appchain_id(), "reconciliation loop started");
    }

    /// Stop the reconciliation loop; in-flight query results are discarded.
    pub async fn stop_poller(&mut self) {
        if let Some(handle) = self.poller.take() {
            handle.stop().await;
        }
    }

    /// Switch the active appchain: replace the appchain connection and
    /// restart the poller against the new partition. Pending records of the
    /// previous appchain stay in the ledger untouched.
    pub async fn switch_appchain(
        &mut self,
        descriptor: AppchainDescriptor,
        appchain: Arc<dyn AppchainQuery>,
    ) {
        let was_running = self.poller.is_some();
        self.stop_poller().await;
        self.session = Arc::new(self.session.with_appchain(descriptor, appchain));
        if was_running {
            self.start_poller();
        }
        tracing::info!(appchain = %self.session.appchain_id(), "switched active appchain");
    }

    /// Tear down the session at wallet disconnect.
    pub async fn disconnect(mut self) {
        self.stop_poller().await;
    }

    /// Validate, construct, sign and submit one transfer, then record it.
    ///
    /// A target that fails validation never reaches the orchestrator — no
    /// chain action is constructed. On success the pending record is
    /// appended to the ledger (idempotently) and returned.
    pub async fn submit_transfer(
        &self,
        spec: &TransferSpec,
    ) -> Result<BridgeTransferRecord, BridgeError> {
        let validator = PreflightValidator::new(&self.session);
        let status = validator
            .check_target_account(spec.direction, &spec.target_account, &spec.asset)
            .await?;

        if spec.direction == Direction::AppchainToHome && !status.exists {
            return Err(BridgeError::InvalidAddress(format!(
                "target account {} does not exist on the home ledger",
                spec.target_account
            )));
        }
        if status.needs_storage_deposit {
            return Err(BridgeError::Other(format!(
                "target account {} must register storage with the token contract first",
                spec.target_account
            )));
        }

        let orchestrator = TransferOrchestrator::new(&self.session);
        let record = orchestrator.submit(spec).await?;

        let appended = self
            .session
            .store
            .append(&record.appchain_id, &record)
            .map_err(|e| BridgeError::Storage(e.to_string()))?;
        if !appended {
            tracing::debug!(key = %record.key(), "transfer was already recorded");
        }
        Ok(record)
    }

    /// All recorded transfers for an appchain, unfiltered.
    pub fn transfers(
        &self,
        appchain: &AppchainId,
    ) -> Result<Vec<BridgeTransferRecord>, BridgeError> {
        self.session
            .store
            .list(appchain)
            .map_err(|e| BridgeError::Storage(e.to_string()))
    }

    /// Delete one appchain's records. Explicit user action only.
    pub fn clear_transfers(&self, appchain: &AppchainId) -> Result<(), BridgeError> {
        self.session
            .store
            .clear(appchain)
            .map_err(|e| BridgeError::Storage(e.to_string()))
    }

    /// Validate a transfer target after the caller's input debounce.
    pub async fn validate_target(
        &self,
        direction: Direction,
        account: &str,
        asset: &AssetRef,
    ) -> Result<TargetStatus, BridgeError> {
        PreflightValidator::new(&self.session)
            .check_target_account(direction, account, asset)
            .await
    }

    /// Maximum transferable balance for an asset and direction.
    pub fn max_transferable(
        &self,
        balance: &str,
        asset: &TokenAsset,
        direction: Direction,
    ) -> Result<String, BridgeError> {
        PreflightValidator::new(&self.session).max_transferable(balance, asset, direction)
    }
}
