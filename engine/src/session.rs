//! The bridge session — explicit dependency injection for the engine.
//!
//! One session exists per wallet connection. It owns the chain query
//! capabilities, the signing capability, the transfer ledger and the active
//! appchain's descriptor. Nothing in the engine reads ambient module state;
//! every component receives the session it works against.

use std::sync::Arc;

use trestle_chain::{ActionSigner, AppchainQuery, HomeQuery};
use trestle_store::TransferStore;
use trestle_types::{AppchainDescriptor, AppchainId, BridgeParams};

/// Dependencies and configuration for one wallet connection.
pub struct BridgeSession {
    /// Descriptor of the active appchain selection.
    pub descriptor: AppchainDescriptor,
    pub params: BridgeParams,
    pub home: Arc<dyn HomeQuery>,
    /// Query client for the active appchain. Replaced wholesale on an
    /// appchain switch; the previous client is dropped with its connections.
    pub appchain: Arc<dyn AppchainQuery>,
    pub signer: Arc<dyn ActionSigner>,
    pub store: Arc<dyn TransferStore>,
}

impl BridgeSession {
    pub fn appchain_id(&self) -> &AppchainId {
        &self.descriptor.id
    }

    /// Derive a session for a different active appchain, keeping the home
    /// ledger, signer, ledger store and parameters.
    pub fn with_appchain(
        &self,
        descriptor: AppchainDescriptor,
        appchain: Arc<dyn AppchainQuery>,
    ) -> Self {
        Self {
            descriptor,
            params: self.params.clone(),
            home: Arc::clone(&self.home),
            appchain,
            signer: Arc::clone(&self.signer),
            store: Arc::clone(&self.store),
        }
    }
}
