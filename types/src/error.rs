//! Top-level error taxonomy shared across crates.

use thiserror::Error;

/// Common error type for the Trestle bridge engine.
///
/// Validation and codec failures (`InvalidAddress`, `InvalidAmount`,
/// `NegativeAmount`) resolve synchronously and block submission before any
/// chain action is constructed. `UserCancelled` is swallowed by callers and
/// never presented as an error. `ChainRejected` and `TransferUnconfirmed`
/// are surfaced once per submission attempt.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("negative amount: {0}")]
    NegativeAmount(String),

    #[error("signing cancelled by user")]
    UserCancelled,

    #[error("chain rejected submission: {0}")]
    ChainRejected(String),

    #[error("submission accepted but confirming event not found: {0}")]
    TransferUnconfirmed(String),

    #[error("chain query error: {0}")]
    Query(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}
