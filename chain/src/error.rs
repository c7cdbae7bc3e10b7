use thiserror::Error;
use trestle_types::BridgeError;

/// Errors from read-only chain queries.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("chain RPC error: {0}")]
    Rpc(String),

    #[error("unexpected response shape: {0}")]
    InvalidResponse(String),
}

impl From<ChainError> for BridgeError {
    fn from(e: ChainError) -> Self {
        BridgeError::Query(e.to_string())
    }
}

/// Errors from the signing capability.
///
/// `UserCancelled` must stay distinguishable from a true submission failure:
/// callers swallow it silently instead of surfacing an error.
#[derive(Debug, Error)]
pub enum SignerError {
    #[error("signing cancelled by user")]
    UserCancelled,

    #[error("chain rejected submission: {0}")]
    Rejected(String),

    #[error("transport error: {0}")]
    Transport(String),
}

impl From<SignerError> for BridgeError {
    fn from(e: SignerError) -> Self {
        match e {
            SignerError::UserCancelled => BridgeError::UserCancelled,
            SignerError::Rejected(msg) => BridgeError::ChainRejected(msg),
            SignerError::Transport(msg) => BridgeError::ChainRejected(msg),
        }
    }
}
