//! Engine configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use trestle_types::{BridgeError, BridgeParams};

/// Configuration for the bridge engine.
///
/// Can be loaded from a TOML file via [`BridgeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). CLI flags override file values.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Home-ledger JSON-RPC endpoint.
    #[serde(default = "default_home_rpc_url")]
    pub home_rpc_url: String,

    /// Wallet daemon endpoint supplying the signing capability.
    #[serde(default = "default_signer_url")]
    pub signer_url: String,

    /// Asset-metadata feed base URL.
    #[serde(default = "default_catalog_url")]
    pub catalog_url: String,

    /// Data directory for the transfer ledger.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Signing account on the home ledger.
    #[serde(default)]
    pub account: String,

    /// Active appchain identifier.
    #[serde(default)]
    pub appchain: String,

    /// Engine tunables.
    #[serde(default)]
    pub params: BridgeParams,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_home_rpc_url() -> String {
    "http://127.0.0.1:3030".to_string()
}

fn default_signer_url() -> String {
    "http://127.0.0.1:4040/sign".to_string()
}

fn default_catalog_url() -> String {
    "http://127.0.0.1:5050".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./trestle_data")
}

// ── Impl ───────────────────────────────────────────────────────────────

impl BridgeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, BridgeError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| BridgeError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, BridgeError> {
        toml::from_str(s).map_err(|e| BridgeError::Config(e.to_string()))
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            home_rpc_url: default_home_rpc_url(),
            signer_url: default_signer_url(),
            catalog_url: default_catalog_url(),
            data_dir: default_data_dir(),
            account: String::new(),
            appchain: String::new(),
            params: BridgeParams::default(),
        }
    }
}
