//! Engine parameters — tunables the bridge engine reads at runtime.

use serde::{Deserialize, Serialize};

/// Runtime parameters for the bridge engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BridgeParams {
    /// Protocol fee charged on home→appchain transfers of the native
    /// wrapped asset, as a decimal string in the token's display precision.
    /// Subtracted from the maximum transferable balance on that path only.
    pub wrapped_token_fee: String,

    /// Reconciliation poll interval in seconds.
    pub poll_interval_secs: u64,

    /// How long callers should let the target-account field settle before
    /// invoking the preflight existence check. The validator itself is
    /// stateless; this is the contract for its drivers.
    pub account_check_debounce_ms: u64,

    /// Request timeout for chain RPC calls, in seconds.
    pub rpc_timeout_secs: u64,

    /// How long a cached asset-catalog snapshot stays fresh, in seconds.
    pub catalog_ttl_secs: u64,
}

impl Default for BridgeParams {
    fn default() -> Self {
        Self {
            wrapped_token_fee: "0.5".to_string(),
            poll_interval_secs: 5,
            account_check_debounce_ms: 600,
            rpc_timeout_secs: 30,
            catalog_ttl_secs: 300,
        }
    }
}
