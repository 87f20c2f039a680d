//! External asset store collaborator.
//!
//! Image assets (school banners, uniform photos) live on an external object
//! store and are referenced by URL. The catalog only ever needs to delete
//! them, and deletion is best effort: a failure is logged and swallowed so
//! the primary record is never left stuck behind a blob cleanup problem.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
#[error("asset store error: {0}")]
pub struct AssetStoreError(pub String);

#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Delete the asset behind the given reference.
    async fn delete(&self, reference: &str) -> Result<(), AssetStoreError>;
}

/// Asset store that drops all deletions. Used when no object store is
/// configured and in tests that don't care about assets.
pub struct NoopAssetStore;

#[async_trait]
impl AssetStore for NoopAssetStore {
    async fn delete(&self, reference: &str) -> Result<(), AssetStoreError> {
        debug!(reference, "No asset store configured; skipping delete");
        Ok(())
    }
}

/// Asset store backed by an HTTP object-store endpoint.
///
/// Issues `DELETE {endpoint}/{reference}` and treats any non-success status
/// as a failure.
pub struct HttpAssetStore {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpAssetStore {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl AssetStore for HttpAssetStore {
    async fn delete(&self, reference: &str) -> Result<(), AssetStoreError> {
        let url = format!(
            "{}/{}",
            self.endpoint.trim_end_matches('/'),
            reference.trim_start_matches('/')
        );

        self.client
            .delete(&url)
            .send()
            .await
            .map_err(|e| AssetStoreError(e.to_string()))?
            .error_for_status()
            .map_err(|e| AssetStoreError(e.to_string()))?;

        debug!(reference, "Deleted asset");
        Ok(())
    }
}

/// Best-effort release of an asset reference. Never fails the caller.
pub(crate) async fn release(store: &dyn AssetStore, reference: &str) {
    if let Err(err) = store.delete(reference).await {
        warn!(reference, error = %err, "Asset delete failed; leaving orphaned blob");
    }
}
