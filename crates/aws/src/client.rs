//! S3 client implementation
//!
//! Wraps aws-sdk-s3 and implements the ObjectStore trait from cs-core.

use std::path::Path;

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};

use cs_core::{
    ContainerInfo, CreateContainerOptions, Error, ObjectInfo, ObjectStore, Profile, Result,
};

use crate::error::classify;

/// Region S3 treats as the default; it must not be sent as a LocationConstraint
const DEFAULT_REGION: &str = "us-east-1";

/// S3 client wrapper
pub struct S3Client {
    inner: aws_sdk_s3::Client,
    region: Option<String>,
}

impl S3Client {
    /// Create a new S3 client from a profile
    ///
    /// Credentials come from the SDK's default provider chain.
    pub async fn new(profile: &Profile) -> Result<Self> {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = &profile.region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }
        if let Some(endpoint) = &profile.endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let config = loader.load().await;
        let region = config.region().map(|r| r.to_string());

        let s3_config = aws_sdk_s3::config::Builder::from(&config)
            .force_path_style(profile.path_style)
            .build();

        tracing::debug!(profile = %profile.name, ?region, "created s3 client");

        Ok(Self {
            inner: aws_sdk_s3::Client::from_conf(s3_config),
            region,
        })
    }

    /// Get the underlying aws-sdk-s3 client
    pub fn inner(&self) -> &aws_sdk_s3::Client {
        &self.inner
    }
}

fn timestamp(value: &aws_smithy_types::DateTime) -> Option<jiff::Timestamp> {
    jiff::Timestamp::from_second(value.secs()).ok()
}

fn trim_etag(etag: &str) -> String {
    etag.trim_matches('"').to_string()
}

/// LocationConstraint to send when creating a bucket in `region`
fn location_constraint(region: Option<&str>) -> Option<CreateBucketConfiguration> {
    match region {
        None | Some(DEFAULT_REGION) | Some("") => None,
        Some(region) => Some(
            CreateBucketConfiguration::builder()
                .location_constraint(BucketLocationConstraint::from(region))
                .build(),
        ),
    }
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn list_containers(&self) -> Result<Vec<ContainerInfo>> {
        let mut containers = Vec::new();
        let mut token: Option<String> = None;

        loop {
            let response = self
                .inner
                .list_buckets()
                .set_continuation_token(token.take())
                .send()
                .await
                .map_err(|e| classify(e, "buckets"))?;

            for bucket in response.buckets() {
                let mut info = ContainerInfo::new(bucket.name().unwrap_or_default());
                info.created = bucket.creation_date().and_then(timestamp);
                info.location = bucket.bucket_region().map(str::to_owned);
                containers.push(info);
            }

            match response.continuation_token() {
                Some(next) if !next.is_empty() => token = Some(next.to_string()),
                _ => break,
            }
        }

        Ok(containers)
    }

    async fn container_exists(&self, container: &str) -> Result<bool> {
        match self.inner.head_bucket().bucket(container).send().await {
            Ok(_) => Ok(true),
            Err(e) if e.as_service_error().is_some_and(|se| se.is_not_found()) => Ok(false),
            Err(e) => match classify(e, container) {
                Error::NotFound(_) => Ok(false),
                other => Err(other),
            },
        }
    }

    async fn container_info(&self, container: &str) -> Result<ContainerInfo> {
        let head = self
            .inner
            .head_bucket()
            .bucket(container)
            .send()
            .await
            .map_err(|e| classify(e, container))?;

        let mut info = ContainerInfo::new(container);
        info.location = head.bucket_region().map(str::to_owned);

        if info.location.is_none() {
            let location = self
                .inner
                .get_bucket_location()
                .bucket(container)
                .send()
                .await
                .map_err(|e| classify(e, container))?;
            // An empty constraint means the default region.
            info.location = Some(
                location
                    .location_constraint()
                    .map(|c| c.as_str())
                    .filter(|c| !c.is_empty())
                    .unwrap_or(DEFAULT_REGION)
                    .to_string(),
            );
        }

        match self
            .inner
            .get_bucket_versioning()
            .bucket(container)
            .send()
            .await
        {
            Ok(versioning) => {
                let status = versioning
                    .status()
                    .map(|s| s.as_str().to_string())
                    .unwrap_or_else(|| "Disabled".to_string());
                info.extra.insert("versioning".to_string(), status);
            }
            Err(e) => tracing::debug!(container, error = %classify(e, container), "versioning lookup failed"),
        }

        Ok(info)
    }

    async fn create_container(
        &self,
        container: &str,
        options: &CreateContainerOptions,
    ) -> Result<()> {
        let region = options.region.as_deref().or(self.region.as_deref());
        if let Some(class) = &options.storage_class {
            tracing::warn!(container, class, "S3 buckets have no default storage class; ignoring");
        }

        self.inner
            .create_bucket()
            .bucket(container)
            .set_create_bucket_configuration(location_constraint(region))
            .send()
            .await
            .map_err(|e| classify(e, container))?;

        tracing::debug!(container, ?region, "bucket created");
        Ok(())
    }

    async fn delete_container(&self, container: &str) -> Result<()> {
        self.inner
            .delete_bucket()
            .bucket(container)
            .send()
            .await
            .map_err(|e| classify(e, container))?;
        Ok(())
    }

    async fn list_objects(&self, container: &str, prefix: &str) -> Result<Vec<ObjectInfo>> {
        let mut objects = Vec::new();
        let mut token: Option<String> = None;

        loop {
            let mut request = self.inner.list_objects_v2().bucket(container);
            if !prefix.is_empty() {
                request = request.prefix(prefix);
            }
            let response = request
                .set_continuation_token(token.take())
                .send()
                .await
                .map_err(|e| classify(e, container))?;

            for object in response.contents() {
                let mut info =
                    ObjectInfo::new(object.key().unwrap_or_default(), object.size().unwrap_or(0));
                info.last_modified = object.last_modified().and_then(timestamp);
                info.etag = object.e_tag().map(trim_etag);
                info.storage_class = object.storage_class().map(|sc| sc.as_str().to_string());
                objects.push(info);
            }

            match response.next_continuation_token() {
                Some(next) if response.is_truncated().unwrap_or(false) => {
                    token = Some(next.to_string())
                }
                _ => break,
            }
        }

        tracing::debug!(container, prefix, count = objects.len(), "listed objects");
        Ok(objects)
    }

    async fn head_object(&self, container: &str, key: &str) -> Result<ObjectInfo> {
        let response = self
            .inner
            .head_object()
            .bucket(container)
            .key(key)
            .send()
            .await
            .map_err(|e| classify(e, &format!("{container}/{key}")))?;

        let mut info = ObjectInfo::new(key, response.content_length().unwrap_or(0));
        info.last_modified = response.last_modified().and_then(timestamp);
        info.etag = response.e_tag().map(trim_etag);
        info.content_type = response.content_type().map(str::to_owned);
        info.storage_class = response.storage_class().map(|sc| sc.as_str().to_string());
        Ok(info)
    }

    async fn download_file(&self, container: &str, key: &str, dest: &Path) -> Result<u64> {
        let response = self
            .inner
            .get_object()
            .bucket(container)
            .key(key)
            .send()
            .await
            .map_err(|e| classify(e, &format!("{container}/{key}")))?;

        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| Error::local_io(dest, e))?;
        let mut body = response.body.into_async_read();
        let written = tokio::io::copy(&mut body, &mut file)
            .await
            .map_err(|e| Error::Remote(format!("download of {container}/{key} failed: {e}")))?;
        Ok(written)
    }

    async fn upload_file(&self, container: &str, key: &str, source: &Path) -> Result<ObjectInfo> {
        let size = tokio::fs::metadata(source)
            .await
            .map_err(|e| Error::local_io(source, e))?
            .len();
        let body = ByteStream::from_path(source).await.map_err(|e| {
            Error::local_io(source, std::io::Error::other(e.to_string()))
        })?;
        let content_type = mime_guess::from_path(source).first_or_octet_stream();

        let response = self
            .inner
            .put_object()
            .bucket(container)
            .key(key)
            .content_type(content_type.essence_str())
            .body(body)
            .send()
            .await
            .map_err(|e| classify(e, &format!("{container}/{key}")))?;

        let mut info = ObjectInfo::new(key, size as i64);
        info.etag = response.e_tag().map(trim_etag);
        info.content_type = Some(content_type.essence_str().to_string());
        info.last_modified = Some(jiff::Timestamp::now());
        Ok(info)
    }

    async fn copy_object(
        &self,
        src_container: &str,
        src_key: &str,
        dst_container: &str,
        dst_key: &str,
    ) -> Result<()> {
        let copy_source = format!("{src_container}/{src_key}");

        self.inner
            .copy_object()
            .copy_source(&copy_source)
            .bucket(dst_container)
            .key(dst_key)
            .send()
            .await
            .map_err(|e| classify(e, &copy_source))?;
        Ok(())
    }

    async fn delete_object(&self, container: &str, key: &str) -> Result<()> {
        self.inner
            .delete_object()
            .bucket(container)
            .key(key)
            .send()
            .await
            .map_err(|e| classify(e, &format!("{container}/{key}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_location_constraint_for_default_region() {
        assert!(location_constraint(None).is_none());
        assert!(location_constraint(Some("us-east-1")).is_none());
    }

    #[test]
    fn test_location_constraint_for_other_regions() {
        let config = location_constraint(Some("eu-west-1")).unwrap();
        assert_eq!(
            config.location_constraint().map(|c| c.as_str()),
            Some("eu-west-1")
        );
    }

    #[test]
    fn test_trim_etag() {
        assert_eq!(trim_etag("\"abc123\""), "abc123");
        assert_eq!(trim_etag("abc123"), "abc123");
    }

    #[test]
    fn test_timestamp_conversion() {
        let dt = aws_smithy_types::DateTime::from_secs(1_700_000_000);
        assert_eq!(timestamp(&dt).unwrap().as_second(), 1_700_000_000);
    }
}
