//! Asset-metadata feed client.
//!
//! The catalog is an external collaborator: a read-only HTTP feed that lists
//! the bridgeable assets of each appchain and its descriptor. The engine
//! consumes only this read contract. Snapshots are cached with a TTL so
//! keystroke-driven UI reads do not refetch.

use crate::ChainError;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use trestle_types::{AppchainDescriptor, AppchainId, Collectible, TokenAsset};

/// Read contract of the asset-metadata feed.
#[async_trait]
pub trait AssetCatalog: Send + Sync {
    async fn descriptor(&self, appchain: &AppchainId) -> Result<AppchainDescriptor, ChainError>;

    async fn list_tokens(&self, appchain: &AppchainId) -> Result<Vec<TokenAsset>, ChainError>;

    async fn list_collectible_classes(
        &self,
        appchain: &AppchainId,
    ) -> Result<Vec<u64>, ChainError>;

    /// Collectible instances owned by an account, for preflight display.
    async fn list_collectibles(
        &self,
        appchain: &AppchainId,
        owner: &str,
    ) -> Result<Vec<Collectible>, ChainError>;
}

/// One feed response per appchain.
#[derive(Clone, Debug, Deserialize)]
pub struct CatalogSnapshot {
    pub descriptor: AppchainDescriptor,
    pub tokens: Vec<TokenAsset>,
    #[serde(default)]
    pub collectibles: Vec<Collectible>,
}

/// HTTP implementation of the feed with a per-appchain TTL cache.
pub struct HttpAssetCatalog {
    http: reqwest::Client,
    base_url: String,
    ttl: Duration,
    cache: RwLock<HashMap<String, (Instant, CatalogSnapshot)>>,
}

impl HttpAssetCatalog {
    pub fn new(
        base_url: impl Into<String>,
        ttl: Duration,
        timeout: Duration,
    ) -> Result<Self, ChainError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ChainError::Transport(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ttl,
            cache: RwLock::new(HashMap::new()),
        })
    }

    /// Return the cached snapshot if fresh, otherwise refetch.
    async fn snapshot(&self, appchain: &AppchainId) -> Result<CatalogSnapshot, ChainError> {
        {
            let cache = self.cache.read().await;
            if let Some((fetched_at, snapshot)) = cache.get(appchain.as_str()) {
                if fetched_at.elapsed() < self.ttl {
                    return Ok(snapshot.clone());
                }
            }
        }

        let url = format!("{}/appchains/{}", self.base_url, appchain);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ChainError::Transport(format!("request failed: {e}")))?;
        if !response.status().is_success() {
            return Err(ChainError::Transport(format!(
                "catalog returned HTTP {} from {url}",
                response.status()
            )));
        }
        let snapshot: CatalogSnapshot = response
            .json()
            .await
            .map_err(|e| ChainError::InvalidResponse(format!("invalid catalog response: {e}")))?;

        let mut cache = self.cache.write().await;
        cache.insert(
            appchain.as_str().to_string(),
            (Instant::now(), snapshot.clone()),
        );
        Ok(snapshot)
    }
}

#[async_trait]
impl AssetCatalog for HttpAssetCatalog {
    async fn descriptor(&self, appchain: &AppchainId) -> Result<AppchainDescriptor, ChainError> {
        Ok(self.snapshot(appchain).await?.descriptor)
    }

    async fn list_tokens(&self, appchain: &AppchainId) -> Result<Vec<TokenAsset>, ChainError> {
        Ok(self.snapshot(appchain).await?.tokens)
    }

    async fn list_collectible_classes(
        &self,
        appchain: &AppchainId,
    ) -> Result<Vec<u64>, ChainError> {
        Ok(self
            .snapshot(appchain)
            .await?
            .descriptor
            .collectible_classes)
    }

    async fn list_collectibles(
        &self,
        appchain: &AppchainId,
        owner: &str,
    ) -> Result<Vec<Collectible>, ChainError> {
        Ok(self
            .snapshot(appchain)
            .await?
            .collectibles
            .into_iter()
            .filter(|c| c.owner == owner)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn snapshot_deserializes_feed_shape() {
        let snapshot: CatalogSnapshot = serde_json::from_value(json!({
            "descriptor": {
                "id": "gravity",
                "anchor_contract": "gravity.anchor.bridge",
                "rpc_endpoint": "https://rpc.gravity.example",
                "ss58_prefix": 42,
                "wrapped_token": {
                    "symbol": "GRV",
                    "decimals": {"home": 18, "appchain": 12},
                },
                "collectible_classes": [0, 1],
            },
            "tokens": [{
                "contract_id": "usdt.home",
                "appchain_asset_id": 7,
                "decimals": 6,
                "symbol": "USDT",
                "icon": null,
            }],
        }))
        .unwrap();

        assert_eq!(snapshot.descriptor.id.as_str(), "gravity");
        assert_eq!(snapshot.descriptor.ss58_prefix, 42);
        assert_eq!(snapshot.tokens.len(), 1);
        assert_eq!(snapshot.tokens[0].appchain_asset_id, Some(7));
        assert!(snapshot.collectibles.is_empty());
    }
}
