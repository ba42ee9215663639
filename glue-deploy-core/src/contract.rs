//! # contract: capabilities the staging pipeline depends on
//!
//! This module defines the two seams between the core and the outside world:
//! - [`BlobStore`]: existence check, bucket creation and object upload against
//!   an object store (S3 in production, a mock in tests).
//! - [`TemplateAccumulator`]: the append-only collector of compiled resource
//!   fragments and outputs.
//!
//! ## Mocking & Testing
//! - `BlobStore` is annotated for `mockall` so consumers can generate
//!   deterministic mocks for unit/integration tests. The mock is exported when
//!   the `test-export-mocks` feature is enabled (on by default).
//!
//! ## Adding New Stores
//! - Implement the trait for your destination.
//! - Convert all meaningful upstream errors to a boxed error; the pipeline
//!   propagates them unchanged.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A compiled, template-consumable document for one resource or output.
pub type ResourceFragment = serde_json::Value;

/// Error type for [`BlobStore`] (simple boxed error, as transports differ).
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Normalized parameters for a CreateBucket call.
///
/// Produced by [`crate::compile::compile_bucket_creation_params`]; the
/// `LocationConstraint` shorthand never survives into this type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateBucketParams {
    pub bucket: String,
    #[serde(rename = "ACL", skip_serializing_if = "Option::is_none")]
    pub acl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_bucket_configuration: Option<crate::config::BucketConfiguration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grant_full_control: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grant_read: Option<String>,
    #[serde(rename = "GrantReadACP", skip_serializing_if = "Option::is_none")]
    pub grant_read_acp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grant_write: Option<String>,
    #[serde(rename = "GrantWriteACP", skip_serializing_if = "Option::is_none")]
    pub grant_write_acp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_lock_enabled_for_bucket: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_ownership: Option<String>,
}

impl CreateBucketParams {
    /// Location constraint from the nested creation configuration, if any.
    pub fn location_constraint(&self) -> Option<&str> {
        self.create_bucket_configuration
            .as_ref()
            .and_then(|c| c.location_constraint.as_deref())
    }
}

/// Trait for the object store that receives staged artifacts.
///
/// The implementor is responsible for connecting to a backing service.
/// No method is retried by the caller: every failure aborts the run.
#[cfg_attr(any(test, feature = "test-export-mocks"), mockall::automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Whether the bucket exists and is reachable.
    async fn bucket_exists(&self, bucket: &str) -> Result<bool, StoreError>;

    /// Create a bucket. Fails if it already exists or access is denied.
    async fn create_bucket(&self, params: &CreateBucketParams) -> Result<(), StoreError>;

    /// Upload one object, replacing any object under the same key.
    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>)
        -> Result<(), StoreError>;
}

/// Append-only mapping from (section, name) to a resource fragment.
///
/// Sections are template sections such as `"resources"` or `"outputs"`.
/// A second append under the same (section, name) replaces the first.
pub trait TemplateAccumulator {
    fn append(&mut self, section: &str, name: &str, fragment: ResourceFragment);
}
