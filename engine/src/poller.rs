//! Reconciliation poller — drives pending records to their terminal states.
//!
//! No single chain is authoritative for both transfer directions: each
//! direction's proof of completion lives on the receiving chain. Every tick
//! the poller partitions the pending set by direction, asks the relevant
//! chain per record, and applies forward transitions through the ledger.
//! Reconciliation is a set operation, not a queue — records may resolve out
//! of submission order.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;

use trestle_chain::{MessageResult, NotificationOutcome};
use trestle_types::{BridgeError, BridgeTransferRecord, Direction, TransferStatus};

use crate::session::BridgeSession;

/// What one reconciliation pass did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// The pass was skipped because a previous one was still in flight.
    pub skipped: bool,
    /// Pending records examined.
    pub examined: usize,
    /// Records moved to `Succeed`.
    pub succeeded: usize,
    /// Records moved to `Failed`.
    pub failed: usize,
    /// Records whose individual query failed; left pending for retry.
    pub query_failures: usize,
}

pub struct ReconciliationPoller {
    session: Arc<BridgeSession>,
    /// Mutual exclusion for passes: bounds outstanding queries to at most
    /// one full pass at a time when the network is slow. `try_lock` skips
    /// the tick; the guard's drop releases on every exit path.
    in_flight: Mutex<()>,
}

impl ReconciliationPoller {
    pub fn new(session: Arc<BridgeSession>) -> Self {
        Self {
            session,
            in_flight: Mutex::new(()),
        }
    }

    /// Run one reconciliation pass over the active appchain's pending set.
    ///
    /// A record whose query fails with a transport error stays `Pending`
    /// and is retried next tick; a query failure is never conflated with a
    /// chain-reported `Failed`.
    pub async fn reconcile_once(&self) -> Result<ReconcileSummary, BridgeError> {
        let _guard = match self.in_flight.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                tracing::debug!("previous reconciliation pass still in flight, skipping tick");
                return Ok(ReconcileSummary {
                    skipped: true,
                    ..Default::default()
                });
            }
        };

        let appchain_id = self.session.appchain_id();
        let pending: Vec<BridgeTransferRecord> = self
            .session
            .store
            .list(appchain_id)
            .map_err(|e| BridgeError::Storage(e.to_string()))?
            .into_iter()
            .filter(|record| record.status == TransferStatus::Pending)
            .collect();

        let mut summary = ReconcileSummary {
            examined: pending.len(),
            ..Default::default()
        };

        for record in pending {
            match self.query_outcome(&record).await {
                Ok(None) => {} // destination chain has not processed it yet
                Ok(Some((status, message))) => {
                    let mut updated = record.clone();
                    updated.status = status.clone();
                    updated.message = message;
                    match self.session.store.update(appchain_id, &updated) {
                        Ok(()) => {
                            match status {
                                TransferStatus::Succeed => summary.succeeded += 1,
                                TransferStatus::Failed => summary.failed += 1,
                                TransferStatus::Pending => {}
                            }
                            tracing::info!(
                                appchain = %appchain_id,
                                key = %updated.key(),
                                status = %updated.status,
                                "transfer reconciled"
                            );
                        }
                        Err(e) => {
                            tracing::warn!(
                                appchain = %appchain_id,
                                key = %record.key(),
                                error = %e,
                                "failed to apply reconciliation transition"
                            );
                        }
                    }
                }
                Err(e) => {
                    summary.query_failures += 1;
                    tracing::warn!(
                        appchain = %appchain_id,
                        key = %record.key(),
                        error = %e,
                        "reconciliation query failed, will retry next tick"
                    );
                }
            }
        }

        Ok(summary)
    }

    /// Ask the chain that is authoritative for this record's direction.
    async fn query_outcome(
        &self,
        record: &BridgeTransferRecord,
    ) -> Result<Option<(TransferStatus, Option<String>)>, trestle_chain::ChainError> {
        match record.direction {
            // Completion proof lives on the home anchor.
            Direction::AppchainToHome => {
                let result = self
                    .session
                    .home
                    .message_processing_result(
                        &self.session.descriptor.anchor_contract,
                        record.sequence_id,
                    )
                    .await?;
                Ok(result.map(|result| match result {
                    MessageResult::Ok => (TransferStatus::Succeed, None),
                    MessageResult::Error { message } => {
                        (TransferStatus::Failed, Some(message))
                    }
                }))
            }
            // Completion proof lives in the appchain's notification history.
            Direction::HomeToAppchain => {
                let outcome = self
                    .session
                    .appchain
                    .notification_outcome(record.sequence_id)
                    .await?;
                Ok(outcome.map(|outcome| match outcome {
                    NotificationOutcome::Delivered => (TransferStatus::Succeed, None),
                    NotificationOutcome::Failed(message) => {
                        (TransferStatus::Failed, Some(message))
                    }
                }))
            }
        }
    }
}

/// Cancellation handle for a spawned reconciliation loop.
pub struct PollerHandle {
    shutdown: broadcast::Sender<()>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Stop the loop. An in-flight pass is cancelled, not awaited: query
    /// results that arrive after teardown are discarded rather than applied.
    pub async fn stop(self) {
        let _ = self.shutdown.send(());
        let _ = self.task.await;
    }
}

/// Spawn the fixed-interval reconciliation loop for a session.
pub fn spawn(poller: Arc<ReconciliationPoller>, interval: Duration) -> PollerHandle {
    let (shutdown, mut shutdown_rx) = broadcast::channel(1);
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => {
                    tracing::info!("reconciliation task shutting down");
                    break;
                }
                _ = ticker.tick() => {}
            }
            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => {
                    tracing::info!("reconciliation task shutting down mid-pass");
                    break;
                }
                result = poller.reconcile_once() => {
                    if let Err(e) = result {
                        tracing::warn!(error = %e, "reconciliation pass failed");
                    }
                }
            }
        }
    });
    PollerHandle { shutdown, task }
}
