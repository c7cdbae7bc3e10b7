//! Fundamental types for the Trestle bridge engine.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: chain and account identifiers, bridgeable assets, the pending
//! transfer record and its status state machine, timestamps, protocol
//! parameters, and the top-level error taxonomy.

pub mod account;
pub mod appchain;
pub mod asset;
pub mod error;
pub mod params;
pub mod record;
pub mod time;

pub use account::AccountId;
pub use appchain::{AppchainDescriptor, AppchainId, WrappedTokenMeta};
pub use asset::{BridgeSide, Collectible, Decimals, TokenAsset};
pub use error::BridgeError;
pub use params::BridgeParams;
pub use record::{BridgeTransferRecord, Direction, TransferStatus};
pub use time::Timestamp;
