//! Google Cloud Storage client implementation
//!
//! Wraps google-cloud-storage and implements the ObjectStore trait from cs-core.

use std::path::Path;

use async_trait::async_trait;
use google_cloud_storage::client::{Client, ClientConfig};
use google_cloud_storage::http::Error as GcsError;
use google_cloud_storage::http::buckets::Bucket;
use google_cloud_storage::http::buckets::delete::DeleteBucketRequest;
use google_cloud_storage::http::buckets::get::GetBucketRequest;
use google_cloud_storage::http::buckets::insert::{
    BucketCreationConfig, InsertBucketParam, InsertBucketRequest,
};
use google_cloud_storage::http::buckets::list::ListBucketsRequest;
use google_cloud_storage::http::objects::Object;
use google_cloud_storage::http::objects::copy::CopyObjectRequest;
use google_cloud_storage::http::objects::delete::DeleteObjectRequest;
use google_cloud_storage::http::objects::download::Range;
use google_cloud_storage::http::objects::get::GetObjectRequest;
use google_cloud_storage::http::objects::list::ListObjectsRequest;
use google_cloud_storage::http::objects::upload::{Media, UploadObjectRequest, UploadType};

use cs_core::{
    ContainerInfo, CreateContainerOptions, Error, ObjectInfo, ObjectStore, Profile, Result,
};

/// Location used for new buckets when neither the command nor the profile names one
const DEFAULT_LOCATION: &str = "US";

/// Google Cloud Storage client wrapper
pub struct GcsClient {
    inner: Client,
    project: Option<String>,
    location: Option<String>,
}

impl GcsClient {
    /// Create a new client from a profile using application default credentials
    pub async fn new(profile: &Profile) -> Result<Self> {
        let config = ClientConfig::default()
            .with_auth()
            .await
            .map_err(|e| Error::Auth(e.to_string()))?;
        let project = profile.project.clone().or_else(|| config.project_id.clone());

        tracing::debug!(profile = %profile.name, ?project, "created gcs client");

        Ok(Self {
            inner: Client::new(config),
            project,
            location: profile.default_bucket_region().map(str::to_owned),
        })
    }

    fn project(&self) -> Result<&str> {
        self.project.as_deref().ok_or_else(|| {
            Error::Config("no GCS project configured; set one with `cstash profile set --project`".into())
        })
    }
}

/// Classify a GCS error; `subject` names what was being addressed
fn classify(err: GcsError, subject: &str) -> Error {
    match &err {
        GcsError::Response(response) => {
            classify_status(response.code, subject, response.message.clone())
        }
        GcsError::TokenSource(_) => Error::Auth(err.to_string()),
        _ => Error::Remote(err.to_string()),
    }
}

fn classify_status(code: u16, subject: &str, message: String) -> Error {
    match code {
        404 => Error::NotFound(subject.to_string()),
        409 => Error::AlreadyExists(subject.to_string()),
        401 | 403 => Error::Auth(message),
        _ => Error::Remote(format!("{code}: {message}")),
    }
}

fn container_info(bucket: Bucket) -> ContainerInfo {
    let mut info = ContainerInfo::new(bucket.name);
    info.location = Some(bucket.location).filter(|l| !l.is_empty());
    info.storage_class = Some(bucket.storage_class).filter(|c| !c.is_empty());
    info.created = bucket
        .time_created
        .and_then(|t| jiff::Timestamp::from_second(t.unix_timestamp()).ok());

    if !bucket.location_type.is_empty() {
        info.extra
            .insert("location_type".to_string(), bucket.location_type);
    }
    if let Some(versioning) = bucket.versioning {
        info.extra.insert(
            "versioning".to_string(),
            if versioning.enabled { "Enabled" } else { "Disabled" }.to_string(),
        );
    }
    for (key, value) in bucket.labels.unwrap_or_default() {
        info.extra.insert(format!("label.{key}"), value);
    }
    info
}

fn object_info(object: Object) -> ObjectInfo {
    let mut info = ObjectInfo::new(object.name, object.size);
    info.last_modified = object
        .updated
        .and_then(|t| jiff::Timestamp::from_second(t.unix_timestamp()).ok());
    info.etag = Some(object.etag).filter(|e| !e.is_empty());
    info.content_type = object.content_type;
    info.storage_class = object.storage_class;
    info
}

#[async_trait]
impl ObjectStore for GcsClient {
    async fn list_containers(&self) -> Result<Vec<ContainerInfo>> {
        let project = self.project()?.to_string();
        let mut containers = Vec::new();
        let mut page_token = None;

        loop {
            let response = self
                .inner
                .list_buckets(&ListBucketsRequest {
                    project: project.clone(),
                    page_token: page_token.take(),
                    ..Default::default()
                })
                .await
                .map_err(|e| classify(e, "buckets"))?;

            containers.extend(response.items.into_iter().map(container_info));

            match response.next_page_token {
                Some(next) if !next.is_empty() => page_token = Some(next),
                _ => break,
            }
        }

        Ok(containers)
    }

    async fn container_exists(&self, container: &str) -> Result<bool> {
        match self.container_info(container).await {
            Ok(_) => Ok(true),
            Err(Error::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn container_info(&self, container: &str) -> Result<ContainerInfo> {
        let bucket = self
            .inner
            .get_bucket(&GetBucketRequest {
                bucket: container.to_string(),
                ..Default::default()
            })
            .await
            .map_err(|e| classify(e, container))?;
        Ok(container_info(bucket))
    }

    async fn create_container(
        &self,
        container: &str,
        options: &CreateContainerOptions,
    ) -> Result<()> {
        let location = options
            .region
            .clone()
            .or_else(|| self.location.clone())
            .unwrap_or_else(|| DEFAULT_LOCATION.to_string());

        let request = InsertBucketRequest {
            name: container.to_string(),
            param: InsertBucketParam {
                project: self.project()?.to_string(),
                ..Default::default()
            },
            bucket: BucketCreationConfig {
                location: location.clone(),
                storage_class: options.storage_class.clone(),
                ..Default::default()
            },
        };

        let bucket = self
            .inner
            .insert_bucket(&request)
            .await
            .map_err(|e| classify(e, container))?;

        tracing::debug!(
            container,
            location = %bucket.location,
            storage_class = %bucket.storage_class,
            "bucket created"
        );
        Ok(())
    }

    async fn delete_container(&self, container: &str) -> Result<()> {
        self.inner
            .delete_bucket(&DeleteBucketRequest {
                bucket: container.to_string(),
                ..Default::default()
            })
            .await
            .map_err(|e| match classify(e, container) {
                // GCS reports a non-empty bucket as a conflict.
                Error::AlreadyExists(subject) => Error::NotEmpty(subject),
                other => other,
            })
    }

    async fn list_objects(&self, container: &str, prefix: &str) -> Result<Vec<ObjectInfo>> {
        let mut objects = Vec::new();
        let mut page_token = None;

        loop {
            let response = self
                .inner
                .list_objects(&ListObjectsRequest {
                    bucket: container.to_string(),
                    prefix: Some(prefix.to_string()).filter(|p| !p.is_empty()),
                    page_token: page_token.take(),
                    ..Default::default()
                })
                .await
                .map_err(|e| classify(e, container))?;

            objects.extend(response.items.unwrap_or_default().into_iter().map(object_info));

            match response.next_page_token {
                Some(next) if !next.is_empty() => page_token = Some(next),
                _ => break,
            }
        }

        tracing::debug!(container, prefix, count = objects.len(), "listed objects");
        Ok(objects)
    }

    async fn head_object(&self, container: &str, key: &str) -> Result<ObjectInfo> {
        let object = self
            .inner
            .get_object(&GetObjectRequest {
                bucket: container.to_string(),
                object: key.to_string(),
                ..Default::default()
            })
            .await
            .map_err(|e| classify(e, &format!("{container}/{key}")))?;
        Ok(object_info(object))
    }

    async fn download_file(&self, container: &str, key: &str, dest: &Path) -> Result<u64> {
        let data = self
            .inner
            .download_object(
                &GetObjectRequest {
                    bucket: container.to_string(),
                    object: key.to_string(),
                    ..Default::default()
                },
                &Range::default(),
            )
            .await
            .map_err(|e| classify(e, &format!("{container}/{key}")))?;

        tokio::fs::write(dest, &data)
            .await
            .map_err(|e| Error::local_io(dest, e))?;
        Ok(data.len() as u64)
    }

    async fn upload_file(&self, container: &str, key: &str, source: &Path) -> Result<ObjectInfo> {
        let data = tokio::fs::read(source)
            .await
            .map_err(|e| Error::local_io(source, e))?;

        let mut media = Media::new(key.to_string());
        media.content_type = mime_guess::from_path(source)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
            .into();

        let object = self
            .inner
            .upload_object(
                &UploadObjectRequest {
                    bucket: container.to_string(),
                    ..Default::default()
                },
                data,
                &UploadType::Simple(media),
            )
            .await
            .map_err(|e| classify(e, &format!("{container}/{key}")))?;
        Ok(object_info(object))
    }

    async fn copy_object(
        &self,
        src_container: &str,
        src_key: &str,
        dst_container: &str,
        dst_key: &str,
    ) -> Result<()> {
        self.inner
            .copy_object(&CopyObjectRequest {
                source_bucket: src_container.to_string(),
                source_object: src_key.to_string(),
                destination_bucket: dst_container.to_string(),
                destination_object: dst_key.to_string(),
                ..Default::default()
            })
            .await
            .map_err(|e| classify(e, &format!("{src_container}/{src_key}")))?;
        Ok(())
    }

    async fn delete_object(&self, container: &str, key: &str) -> Result<()> {
        self.inner
            .delete_object(&DeleteObjectRequest {
                bucket: container.to_string(),
                object: key.to_string(),
                ..Default::default()
            })
            .await
            .map_err(|e| classify(e, &format!("{container}/{key}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(matches!(classify_status(404, "b", String::new()), Error::NotFound(s) if s == "b"));
        assert!(matches!(classify_status(409, "b", String::new()), Error::AlreadyExists(_)));
        assert!(matches!(classify_status(403, "b", "denied".into()), Error::Auth(m) if m == "denied"));
        assert!(matches!(classify_status(503, "b", "busy".into()), Error::Remote(m) if m == "503: busy"));
    }

    #[test]
    fn test_container_info_from_bucket() {
        let bucket = Bucket {
            name: "archive".to_string(),
            location: "EU".to_string(),
            storage_class: "COLDLINE".to_string(),
            location_type: "multi-region".to_string(),
            ..Default::default()
        };

        let info = container_info(bucket);
        assert_eq!(info.name, "archive");
        assert_eq!(info.location.as_deref(), Some("EU"));
        assert_eq!(info.storage_class.as_deref(), Some("COLDLINE"));
        assert_eq!(info.extra.get("location_type").map(String::as_str), Some("multi-region"));
        assert!(info.created.is_none());
    }

    #[test]
    fn test_object_info_from_object() {
        let object = Object {
            name: "logs/a.gz".to_string(),
            size: 2048,
            content_type: Some("application/gzip".to_string()),
            ..Default::default()
        };

        let info = object_info(object);
        assert_eq!(info.key, "logs/a.gz");
        assert_eq!(info.size_bytes, 2048);
        assert!(info.etag.is_none());
        assert_eq!(info.content_type.as_deref(), Some("application/gzip"));
    }
}
