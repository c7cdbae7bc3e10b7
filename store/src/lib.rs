//! Abstract storage traits for the Trestle bridge engine.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The rest of the workspace depends only on the traits.

pub mod error;
pub mod transfers;

pub use error::StoreError;
pub use transfers::TransferStore;
