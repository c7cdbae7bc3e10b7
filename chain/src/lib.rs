//! Chain access for the Trestle bridge engine.
//!
//! The engine talks to two kinds of chains that do not share a consensus
//! view: the home ledger (contract view calls over JSON-RPC) and each
//! appchain (storage reads keyed by pallet/item/args). This crate provides:
//!
//! - the read-only query capabilities ([`HomeQuery`], [`AppchainQuery`]) and
//!   their HTTP implementations;
//! - the two union-shaped chain responses as explicit tagged types with
//!   named parsers ([`result`]);
//! - one typed decoder per bridge event kind ([`events`]);
//! - the signing capability boundary ([`ActionSigner`]) and the single
//!   action shapes the orchestrator constructs ([`ChainAction`]);
//! - the asset-metadata feed client ([`catalog`]).

pub mod appchain;
pub mod catalog;
pub mod error;
pub mod events;
pub mod home;
pub mod query;
pub mod result;
pub mod signer;

pub use appchain::AppchainRpcClient;
pub use catalog::{AssetCatalog, HttpAssetCatalog};
pub use error::{ChainError, SignerError};
pub use events::ChainEvent;
pub use home::HomeRpcClient;
pub use query::{AppchainQuery, HomeQuery};
pub use result::{MessageResult, NotificationOutcome};
pub use signer::{ActionSigner, ChainAction, HttpSigner, SubmitReceipt};
