//! LMDB storage backend for the Trestle bridge engine.
//!
//! Implements the storage traits from `trestle-store` using the `heed` LMDB
//! bindings. The pending-transfer ledger maps to a single LMDB database
//! within one environment; opening the environment at startup rehydrates
//! every record written before the last shutdown.

pub mod environment;
pub mod error;
pub mod transfers;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use transfers::LmdbTransferStore;
