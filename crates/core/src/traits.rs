//! ObjectStore trait definition
//!
//! This trait is the whole contract cloudstash needs from a storage provider.
//! BucketSync, BucketLifecycle and the single-object operations only talk to
//! a store through it, so the provider SDKs stay in their adapter crates.

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Metadata for an object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectInfo {
    /// Object key
    pub key: String,

    /// Size in bytes
    pub size_bytes: i64,

    /// Human-readable size
    pub size_human: String,

    /// Last modified timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<Timestamp>,

    /// ETag or provider checksum
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,

    /// Storage class
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,

    /// Content type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

impl ObjectInfo {
    /// Create a new ObjectInfo with only key and size filled in
    pub fn new(key: impl Into<String>, size: i64) -> Self {
        Self {
            key: key.into(),
            size_bytes: size,
            size_human: humansize::format_size(size.max(0) as u64, humansize::BINARY),
            last_modified: None,
            etag: None,
            storage_class: None,
            content_type: None,
        }
    }
}

/// Metadata for a bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerInfo {
    /// Bucket name
    pub name: String,

    /// Region or location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Default storage class
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,

    /// Creation timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<Timestamp>,

    /// Provider-specific attributes (versioning, labels, ...)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl ContainerInfo {
    /// Create a new ContainerInfo with only the name filled in
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: None,
            storage_class: None,
            created: None,
            extra: BTreeMap::new(),
        }
    }
}

/// Options for bucket creation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateContainerOptions {
    /// Region (S3) or location (GCS)
    pub region: Option<String>,

    /// Default storage class for the bucket
    pub storage_class: Option<String>,
}

/// Trait for bucket storage operations
///
/// Every call blocks the caller until the provider acknowledges it. Failures
/// are reported through the taxonomy in [`crate::Error`]: `NotFound`,
/// `AlreadyExists`, `NotEmpty`, `LocalIo` and `Remote`.
///
/// This trait is implemented by the provider adapters and can be mocked for testing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List buckets visible to the profile
    async fn list_containers(&self) -> Result<Vec<ContainerInfo>>;

    /// Check if a bucket exists
    ///
    /// `Ok(false)` means the provider said the bucket is absent. A failed
    /// check is an `Err`, never `Ok(false)`.
    async fn container_exists(&self, container: &str) -> Result<bool>;

    /// Get bucket metadata
    async fn container_info(&self, container: &str) -> Result<ContainerInfo>;

    /// Create a bucket
    async fn create_container(
        &self,
        container: &str,
        options: &CreateContainerOptions,
    ) -> Result<()>;

    /// Delete an empty bucket
    async fn delete_container(&self, container: &str) -> Result<()>;

    /// List every object whose key starts with `prefix` ("" for all)
    ///
    /// Implementations page through the whole listing; the result reflects
    /// the bucket at call time.
    async fn list_objects(&self, container: &str, prefix: &str) -> Result<Vec<ObjectInfo>>;

    /// Get object metadata
    async fn head_object(&self, container: &str, key: &str) -> Result<ObjectInfo>;

    /// Download an object into a local file, returning the bytes written
    async fn download_file(&self, container: &str, key: &str, dest: &Path) -> Result<u64>;

    /// Upload a local file as an object
    async fn upload_file(&self, container: &str, key: &str, source: &Path) -> Result<ObjectInfo>;

    /// Server-side copy of one object
    async fn copy_object(
        &self,
        src_container: &str,
        src_key: &str,
        dst_container: &str,
        dst_key: &str,
    ) -> Result<()>;

    /// Delete one object
    async fn delete_object(&self, container: &str, key: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_info_new() {
        let info = ObjectInfo::new("test.txt", 1024);
        assert_eq!(info.key, "test.txt");
        assert_eq!(info.size_bytes, 1024);
        assert_eq!(info.size_human, "1 KiB");
    }

    #[test]
    fn test_container_info_json_skips_empty_fields() {
        let info = ContainerInfo::new("my-bucket");
        let json = serde_json::to_string(&info).unwrap();
        assert_eq!(json, r#"{"name":"my-bucket"}"#);
    }
}
