//! End-to-end engine tests over the nullable boundaries.
//!
//! Submission flows through preflight and orchestration into the ledger,
//! then reconciliation passes drive records to their terminal states — all
//! against programmable in-memory chains, signer and store.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};

use trestle_chain::{ChainEvent, MessageResult, SignerError, SubmitReceipt};
use trestle_engine::{AssetRef, BridgeEngine, BridgeSession, ReconciliationPoller, TransferSpec};
use trestle_nullables::{NullAppchain, NullHomeChain, NullSigner, NullTransferStore};
use trestle_store::transfers::TransferStore;
use trestle_types::{
    AccountId, AppchainDescriptor, AppchainId, BridgeError, BridgeParams, Collectible, Decimals,
    Direction, TokenAsset, TransferStatus, WrappedTokenMeta,
};

const SS58_PREFIX: u16 = 42;

fn descriptor() -> AppchainDescriptor {
    AppchainDescriptor {
        id: AppchainId::new("gravity"),
        anchor_contract: AccountId::new_unchecked("gravity.anchor.bridge"),
        rpc_endpoint: "https://rpc.gravity.example".into(),
        ss58_prefix: SS58_PREFIX,
        wrapped_token: WrappedTokenMeta {
            symbol: "GRV".into(),
            decimals: Decimals::PerSide {
                home: 18,
                appchain: 12,
            },
        },
        collectible_classes: vec![0],
    }
}

struct Harness {
    home: Arc<NullHomeChain>,
    appchain: Arc<NullAppchain>,
    signer: Arc<NullSigner>,
    store: Arc<NullTransferStore>,
    engine: BridgeEngine,
}

fn harness() -> Harness {
    let home = Arc::new(NullHomeChain::new());
    let appchain = Arc::new(NullAppchain::new());
    let signer = Arc::new(NullSigner::new("alice.home"));
    let store = Arc::new(NullTransferStore::new());
    let engine = BridgeEngine::new(BridgeSession {
        descriptor: descriptor(),
        params: BridgeParams::default(),
        home: Arc::clone(&home) as _,
        appchain: Arc::clone(&appchain) as _,
        signer: Arc::clone(&signer) as _,
        store: Arc::clone(&store) as _,
    });
    Harness {
        home,
        appchain,
        signer,
        store,
        engine,
    }
}

fn poller(harness: &Harness) -> ReconciliationPoller {
    ReconciliationPoller::new(Arc::clone(harness.engine.session()))
}

fn native_token() -> TokenAsset {
    TokenAsset {
        contract_id: AccountId::new_unchecked("grv.wrapped.home"),
        appchain_asset_id: None,
        decimals: Decimals::PerSide {
            home: 18,
            appchain: 12,
        },
        symbol: "GRV".into(),
        icon: None,
    }
}

fn appchain_target() -> String {
    trestle_codec::to_ss58(&[9u8; 32], SS58_PREFIX)
}

fn locked_receipt(sequence: u64) -> SubmitReceipt {
    SubmitReceipt {
        tx_hash: format!("0xa{sequence}"),
        events: vec![ChainEvent {
            kind: "Locked".into(),
            data: json!(["5Grw...", "alice.home", "2000000000000", sequence]),
        }],
    }
}

fn queued_receipt(sequence: u64) -> SubmitReceipt {
    SubmitReceipt {
        tx_hash: format!("0xb{sequence}"),
        events: vec![ChainEvent {
            kind: "MessageQueued".into(),
            data: json!({ "sequence": sequence }),
        }],
    }
}

fn outbound_spec() -> TransferSpec {
    TransferSpec {
        direction: Direction::HomeToAppchain,
        asset: AssetRef::Fungible(native_token()),
        amount: Some("2".into()),
        target_account: appchain_target(),
    }
}

fn inbound_spec() -> TransferSpec {
    TransferSpec {
        direction: Direction::AppchainToHome,
        asset: AssetRef::Fungible(native_token()),
        amount: Some("2".into()),
        target_account: "bob.home".into(),
    }
}

fn allow_inbound(harness: &Harness) {
    harness.home.add_account("bob.home");
    harness.home.register_storage("grv.wrapped.home", "bob.home");
}

#[tokio::test]
async fn outbound_submission_lands_pending_in_the_ledger() {
    let harness = harness();
    harness.signer.enqueue_receipt(queued_receipt(41));

    let record = harness.engine.submit_transfer(&outbound_spec()).await.unwrap();
    assert_eq!(record.sequence_id, 41);
    assert_eq!(record.status, TransferStatus::Pending);
    assert_eq!(record.from_account, "alice.home");
    assert!(record.to_account.starts_with("0x"));
    // Sending side is home: 18 decimals.
    assert_eq!(record.amount, "2000000000000000000");

    let listed = harness.engine.transfers(&AppchainId::new("gravity")).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0], record);
}

#[tokio::test]
async fn outbound_success_notification_confirms_exactly_one_record() {
    let harness = harness();
    harness.signer.enqueue_receipt(queued_receipt(1));
    harness.signer.enqueue_receipt(queued_receipt(2));
    harness.engine.submit_transfer(&outbound_spec()).await.unwrap();
    harness.engine.submit_transfer(&outbound_spec()).await.unwrap();

    harness.appchain.set_notification(1, Value::String("Success".into()));

    let summary = poller(&harness).reconcile_once().await.unwrap();
    assert_eq!(summary.examined, 2);
    assert_eq!(summary.succeeded, 1);

    let records = harness.engine.transfers(&AppchainId::new("gravity")).unwrap();
    let by_seq = |seq: u64| records.iter().find(|r| r.sequence_id == seq).unwrap();
    assert_eq!(by_seq(1).status, TransferStatus::Succeed);
    // The other record is untouched.
    assert_eq!(by_seq(2).status, TransferStatus::Pending);
}

#[tokio::test]
async fn outbound_failure_value_becomes_the_message() {
    let harness = harness();
    harness.signer.enqueue_receipt(queued_receipt(1));
    harness.engine.submit_transfer(&outbound_spec()).await.unwrap();

    harness
        .appchain
        .set_notification(1, Value::String("TokenMintFailed".into()));
    poller(&harness).reconcile_once().await.unwrap();

    let records = harness.engine.transfers(&AppchainId::new("gravity")).unwrap();
    assert_eq!(records[0].status, TransferStatus::Failed);
    assert_eq!(records[0].message.as_deref(), Some("TokenMintFailed"));
}

#[tokio::test]
async fn inbound_error_result_fails_with_chain_message() {
    let harness = harness();
    allow_inbound(&harness);
    harness.signer.enqueue_receipt(locked_receipt(7));
    harness.engine.submit_transfer(&inbound_spec()).await.unwrap();

    harness.home.set_message_result(
        7,
        MessageResult::Error {
            message: "Insufficient balance".into(),
        },
    );
    let summary = poller(&harness).reconcile_once().await.unwrap();
    assert_eq!(summary.failed, 1);

    let records = harness.engine.transfers(&AppchainId::new("gravity")).unwrap();
    assert_eq!(records[0].status, TransferStatus::Failed);
    assert_eq!(records[0].message.as_deref(), Some("Insufficient balance"));
}

#[tokio::test]
async fn absent_results_leave_records_pending() {
    let harness = harness();
    allow_inbound(&harness);
    harness.signer.enqueue_receipt(locked_receipt(7));
    harness.engine.submit_transfer(&inbound_spec()).await.unwrap();

    // Neither chain has processed anything yet.
    let summary = poller(&harness).reconcile_once().await.unwrap();
    assert_eq!(summary.examined, 1);
    assert_eq!(summary.succeeded + summary.failed, 0);

    let records = harness.engine.transfers(&AppchainId::new("gravity")).unwrap();
    assert_eq!(records[0].status, TransferStatus::Pending);
}

#[tokio::test]
async fn query_failure_is_not_a_chain_failure() {
    let harness = harness();
    allow_inbound(&harness);
    harness.signer.enqueue_receipt(locked_receipt(3));
    harness.engine.submit_transfer(&inbound_spec()).await.unwrap();

    harness.home.fail_nonce(3);
    let summary = poller(&harness).reconcile_once().await.unwrap();
    assert_eq!(summary.query_failures, 1);
    let records = harness.engine.transfers(&AppchainId::new("gravity")).unwrap();
    assert_eq!(records[0].status, TransferStatus::Pending);

    // The network heals; the next tick resolves the record.
    harness.home.heal_nonce(3);
    harness.home.set_message_result(3, MessageResult::Ok);
    poller(&harness).reconcile_once().await.unwrap();
    let records = harness.engine.transfers(&AppchainId::new("gravity")).unwrap();
    assert_eq!(records[0].status, TransferStatus::Succeed);
}

#[tokio::test]
async fn terminal_records_are_never_requeried_or_overwritten() {
    let harness = harness();
    harness.signer.enqueue_receipt(queued_receipt(1));
    harness.engine.submit_transfer(&outbound_spec()).await.unwrap();

    harness.appchain.set_notification(1, Value::String("Success".into()));
    poller(&harness).reconcile_once().await.unwrap();

    // A later, contradictory value must not drag the record backward.
    harness
        .appchain
        .set_notification(1, Value::String("Reverted".into()));
    let summary = poller(&harness).reconcile_once().await.unwrap();
    assert_eq!(summary.examined, 0);

    let records = harness.engine.transfers(&AppchainId::new("gravity")).unwrap();
    assert_eq!(records[0].status, TransferStatus::Succeed);
    assert_eq!(records[0].message, None);
}

#[tokio::test]
async fn concurrent_passes_skip_instead_of_fanning_out() {
    let harness = harness();
    allow_inbound(&harness);
    harness.signer.enqueue_receipt(locked_receipt(5));
    harness.engine.submit_transfer(&inbound_spec()).await.unwrap();

    harness.home.set_latency(Duration::from_millis(20));
    let poller = poller(&harness);
    let (first, second) = tokio::join!(poller.reconcile_once(), poller.reconcile_once());
    let (first, second) = (first.unwrap(), second.unwrap());
    assert!(
        first.skipped != second.skipped,
        "exactly one concurrent pass must be skipped"
    );
}

#[tokio::test]
async fn invalid_target_never_reaches_the_signer() {
    let harness = harness();
    let mut spec = outbound_spec();
    spec.target_account =
        "0xd43593c715fdd31c61141abd04a99fd6822c8558854ccde39a5684e7a56da27d".into();

    let err = harness.engine.submit_transfer(&spec).await.unwrap_err();
    assert!(matches!(err, BridgeError::InvalidAddress(_)));
    assert!(harness.signer.submitted().is_empty());
    assert!(harness.engine.transfers(&AppchainId::new("gravity")).unwrap().is_empty());
}

#[tokio::test]
async fn missing_storage_registration_blocks_inbound_fungibles() {
    let harness = harness();
    harness.home.add_account("bob.home");
    // No storage registration for bob.home.

    let err = harness.engine.submit_transfer(&inbound_spec()).await.unwrap_err();
    assert!(matches!(err, BridgeError::Other(_)));
    assert!(harness.signer.submitted().is_empty());
}

#[tokio::test]
async fn user_cancellation_is_distinguished_from_rejection() {
    let harness = harness();
    harness.signer.enqueue_error(SignerError::UserCancelled);
    let err = harness.engine.submit_transfer(&outbound_spec()).await.unwrap_err();
    assert!(matches!(err, BridgeError::UserCancelled));

    harness
        .signer
        .enqueue_error(SignerError::Rejected("deposit too small".into()));
    let err = harness.engine.submit_transfer(&outbound_spec()).await.unwrap_err();
    match err {
        BridgeError::ChainRejected(message) => assert_eq!(message, "deposit too small"),
        other => panic!("unexpected error: {other}"),
    }

    // Neither attempt left a ledger entry.
    assert!(harness.engine.transfers(&AppchainId::new("gravity")).unwrap().is_empty());
}

#[tokio::test]
async fn missing_confirming_event_is_a_hard_failure() {
    let harness = harness();
    harness.signer.enqueue_receipt(SubmitReceipt {
        tx_hash: "0xcafe".into(),
        events: vec![ChainEvent {
            kind: "SomethingElse".into(),
            data: json!({}),
        }],
    });

    let err = harness.engine.submit_transfer(&outbound_spec()).await.unwrap_err();
    assert!(matches!(err, BridgeError::TransferUnconfirmed(_)));
    assert!(harness.engine.transfers(&AppchainId::new("gravity")).unwrap().is_empty());
}

#[tokio::test]
async fn resubmitted_sequence_is_recorded_once() {
    let harness = harness();
    harness.signer.enqueue_receipt(queued_receipt(17));
    harness.signer.enqueue_receipt(queued_receipt(17));

    harness.engine.submit_transfer(&outbound_spec()).await.unwrap();
    harness.engine.submit_transfer(&outbound_spec()).await.unwrap();

    assert_eq!(
        harness.engine.transfers(&AppchainId::new("gravity")).unwrap().len(),
        1
    );
}

#[tokio::test]
async fn clear_only_touches_one_appchain() {
    let harness = harness();
    harness.signer.enqueue_receipt(queued_receipt(1));
    harness.engine.submit_transfer(&outbound_spec()).await.unwrap();

    // A record for a different appchain, written directly to the shared store.
    let mut other = harness.engine.transfers(&AppchainId::new("gravity")).unwrap()[0].clone();
    other.appchain_id = AppchainId::new("orbit");
    harness.store.append(&AppchainId::new("orbit"), &other).unwrap();

    harness.engine.clear_transfers(&AppchainId::new("gravity")).unwrap();
    assert!(harness.engine.transfers(&AppchainId::new("gravity")).unwrap().is_empty());
    assert_eq!(harness.engine.transfers(&AppchainId::new("orbit")).unwrap().len(), 1);
}

#[tokio::test]
async fn collectible_submission_never_carries_an_amount() {
    let harness = harness();
    allow_inbound(&harness);
    harness.signer.enqueue_receipt(SubmitReceipt {
        tx_hash: "0xdead".into(),
        events: vec![ChainEvent {
            kind: "CollectibleLocked".into(),
            data: json!([0, "12", "5Grw...", "bob.home", 6]),
        }],
    });

    let spec = TransferSpec {
        direction: Direction::AppchainToHome,
        asset: AssetRef::Collectible(Collectible {
            instance: "12".into(),
            class: 0,
            owner: appchain_target(),
            contract_id: AccountId::new_unchecked("relics.home"),
            name: None,
        }),
        amount: None,
        target_account: "bob.home".into(),
    };
    let record = harness.engine.submit_transfer(&spec).await.unwrap();
    assert_eq!(record.amount, "");
    assert_eq!(record.sequence_id, 6);
    assert_eq!(record.token_contract_id, "relics.home");
}

#[tokio::test]
async fn switching_appchains_restarts_polling_against_the_new_partition() {
    let mut harness = harness();
    harness.signer.enqueue_receipt(queued_receipt(1));
    harness.engine.submit_transfer(&outbound_spec()).await.unwrap();

    harness.engine.start_poller();

    let orbit = AppchainDescriptor {
        id: AppchainId::new("orbit"),
        anchor_contract: AccountId::new_unchecked("orbit.anchor.bridge"),
        rpc_endpoint: "https://rpc.orbit.example".into(),
        ss58_prefix: SS58_PREFIX,
        wrapped_token: WrappedTokenMeta {
            symbol: "ORB".into(),
            decimals: Decimals::Uniform(12),
        },
        collectible_classes: vec![],
    };
    let orbit_chain = Arc::new(NullAppchain::new());
    harness.engine.switch_appchain(orbit, orbit_chain as _).await;

    // The gravity record is still in the ledger, just no longer polled.
    assert_eq!(harness.engine.transfers(&AppchainId::new("gravity")).unwrap().len(), 1);
    assert!(harness.engine.transfers(&AppchainId::new("orbit")).unwrap().is_empty());

    let summary = ReconciliationPoller::new(Arc::clone(harness.engine.session()))
        .reconcile_once()
        .await
        .unwrap();
    assert_eq!(summary.examined, 0);

    harness.engine.disconnect().await;
}
