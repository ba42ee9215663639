#![doc = "S3 integration for CLI and core: implements the BlobStore trait against AWS S3."]
//
//! # S3 Blob Store
//!
//! Bridges the [`BlobStore`] abstraction in `glue-deploy-core` to the AWS SDK.
//! Credentials and region come from the default AWS provider chain; a region
//! can be forced from the CLI.
//!
//! - `bucket_exists` maps a not-found `HeadBucket` to `false`; any other failure
//!   (e.g. access denied) is an error.
//! - No method retries at this level beyond what the SDK does on its own.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{
    BucketCannedAcl, BucketLocationConstraint, CreateBucketConfiguration, ObjectOwnership,
};
use aws_sdk_s3::Client as S3Client;

use glue_deploy_core::contract::{BlobStore, CreateBucketParams, StoreError};

pub struct S3BlobStore {
    client: S3Client,
}

impl S3BlobStore {
    /// Build a client from the default credential chain.
    pub async fn from_env(region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_sdk_s3::config::Region::new(region));
        }
        let sdk_config = loader.load().await;
        tracing::info!(region = ?sdk_config.region(), "Initialized S3 client");
        Self {
            client: S3Client::new(&sdk_config),
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool, StoreError> {
        match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(true),
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_not_found() {
                    tracing::debug!(bucket, "Bucket not found");
                    Ok(false)
                } else {
                    tracing::error!(error = ?service_err, bucket, "HeadBucket failed");
                    Err(Box::new(service_err))
                }
            }
        }
    }

    async fn create_bucket(&self, params: &CreateBucketParams) -> Result<(), StoreError> {
        tracing::info!(bucket = %params.bucket, location = ?params.location_constraint(), "Creating bucket");
        let mut request = self.client.create_bucket().bucket(&params.bucket);

        if let Some(acl) = &params.acl {
            request = request.acl(BucketCannedAcl::from(acl.as_str()));
        }
        if let Some(constraint) = params.location_constraint() {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(constraint))
                    .build(),
            );
        }
        if let Some(grant) = &params.grant_full_control {
            request = request.grant_full_control(grant);
        }
        if let Some(grant) = &params.grant_read {
            request = request.grant_read(grant);
        }
        if let Some(grant) = &params.grant_read_acp {
            request = request.grant_read_acp(grant);
        }
        if let Some(grant) = &params.grant_write {
            request = request.grant_write(grant);
        }
        if let Some(grant) = &params.grant_write_acp {
            request = request.grant_write_acp(grant);
        }
        if let Some(enabled) = params.object_lock_enabled_for_bucket {
            request = request.object_lock_enabled_for_bucket(enabled);
        }
        if let Some(ownership) = &params.object_ownership {
            request = request.object_ownership(ObjectOwnership::from(ownership.as_str()));
        }

        match request.send().await {
            Ok(_) => {
                tracing::info!(bucket = %params.bucket, "Bucket created");
                Ok(())
            }
            Err(err) => {
                let service_err = err.into_service_error();
                tracing::error!(error = ?service_err, bucket = %params.bucket, "CreateBucket failed");
                Err(Box::new(service_err))
            }
        }
    }

    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<(), StoreError> {
        tracing::debug!(bucket, key, size = body.len(), "Uploading object");
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|err| {
                tracing::error!(error = ?err, bucket, key, "PutObject failed");
                Box::new(err.into_service_error()) as StoreError
            })?;
        Ok(())
    }
}
