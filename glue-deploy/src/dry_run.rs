//! A [`BlobStore`] that touches nothing: every bucket exists, uploads are only logged.

use async_trait::async_trait;
use glue_deploy_core::contract::{BlobStore, CreateBucketParams, StoreError};
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct DryRunStore {
    uploads: Mutex<Vec<String>>,
}

impl DryRunStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// `s3://` URIs that would have been written, in call order.
    pub fn uploads(&self) -> Vec<String> {
        self.uploads
            .lock()
            .map(|uploads| uploads.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl BlobStore for DryRunStore {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool, StoreError> {
        tracing::info!(bucket, "[DRY RUN] Assuming bucket exists");
        Ok(true)
    }

    async fn create_bucket(&self, params: &CreateBucketParams) -> Result<(), StoreError> {
        tracing::info!(bucket = %params.bucket, "[DRY RUN] Would create bucket");
        Ok(())
    }

    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<(), StoreError> {
        let uri = format!("s3://{bucket}/{key}");
        tracing::info!(%uri, size = body.len(), "[DRY RUN] Would upload object");
        self.uploads
            .lock()
            .map_err(|e| -> StoreError { e.to_string().into() })?
            .push(uri);
        Ok(())
    }
}
