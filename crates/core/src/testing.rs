//! In-memory ObjectStore used by unit tests

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::traits::{ContainerInfo, CreateContainerOptions, ObjectInfo, ObjectStore};

type Bucket = BTreeMap<String, Vec<u8>>;

#[derive(Default)]
pub(crate) struct MemoryStore {
    buckets: Mutex<BTreeMap<String, Bucket>>,
    failing_keys: Mutex<HashSet<String>>,
    calls: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_bucket(self, name: &str) -> Self {
        self.buckets
            .lock()
            .unwrap()
            .insert(name.to_string(), Bucket::new());
        self
    }

    pub(crate) fn put(&self, bucket: &str, key: &str, data: &[u8]) {
        self.buckets
            .lock()
            .unwrap()
            .entry(bucket.to_string())
            .or_default()
            .insert(key.to_string(), data.to_vec());
    }

    /// Writes to or deletions of `key` fail with a remote error
    pub(crate) fn fail_on(&self, key: &str) {
        self.failing_keys.lock().unwrap().insert(key.to_string());
    }

    pub(crate) fn keys(&self, bucket: &str) -> Vec<String> {
        self.buckets
            .lock()
            .unwrap()
            .get(bucket)
            .map(|b| b.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub(crate) fn get(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.buckets
            .lock()
            .unwrap()
            .get(bucket)
            .and_then(|b| b.get(key).cloned())
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn log(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_failure(&self, key: &str) -> Result<()> {
        if self.failing_keys.lock().unwrap().contains(key) {
            return Err(Error::Remote(format!("injected failure for {key}")));
        }
        Ok(())
    }

    fn write(&self, bucket: &str, key: &str, data: Vec<u8>) -> Result<()> {
        let mut buckets = self.buckets.lock().unwrap();
        let objects = buckets
            .get_mut(bucket)
            .ok_or_else(|| Error::NotFound(format!("bucket {bucket}")))?;
        objects.insert(key.to_string(), data);
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list_containers(&self) -> Result<Vec<ContainerInfo>> {
        Ok(self
            .buckets
            .lock()
            .unwrap()
            .keys()
            .map(ContainerInfo::new)
            .collect())
    }

    async fn container_exists(&self, container: &str) -> Result<bool> {
        Ok(self.buckets.lock().unwrap().contains_key(container))
    }

    async fn container_info(&self, container: &str) -> Result<ContainerInfo> {
        if self.container_exists(container).await? {
            Ok(ContainerInfo::new(container))
        } else {
            Err(Error::NotFound(format!("bucket {container}")))
        }
    }

    async fn create_container(
        &self,
        container: &str,
        _options: &CreateContainerOptions,
    ) -> Result<()> {
        self.log(format!("create_container {container}"));
        let mut buckets = self.buckets.lock().unwrap();
        if buckets.contains_key(container) {
            return Err(Error::AlreadyExists(container.to_string()));
        }
        buckets.insert(container.to_string(), Bucket::new());
        Ok(())
    }

    async fn delete_container(&self, container: &str) -> Result<()> {
        self.log(format!("delete_container {container}"));
        let mut buckets = self.buckets.lock().unwrap();
        match buckets.get(container) {
            None => Err(Error::NotFound(format!("bucket {container}"))),
            Some(objects) if !objects.is_empty() => Err(Error::NotEmpty(container.to_string())),
            Some(_) => {
                buckets.remove(container);
                Ok(())
            }
        }
    }

    async fn list_objects(&self, container: &str, prefix: &str) -> Result<Vec<ObjectInfo>> {
        let buckets = self.buckets.lock().unwrap();
        let objects = buckets
            .get(container)
            .ok_or_else(|| Error::NotFound(format!("bucket {container}")))?;
        Ok(objects
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, data)| ObjectInfo::new(key.clone(), data.len() as i64))
            .collect())
    }

    async fn head_object(&self, container: &str, key: &str) -> Result<ObjectInfo> {
        self.get(container, key)
            .map(|data| ObjectInfo::new(key, data.len() as i64))
            .ok_or_else(|| Error::NotFound(format!("{container}/{key}")))
    }

    async fn download_file(&self, container: &str, key: &str, dest: &Path) -> Result<u64> {
        let data = self
            .get(container, key)
            .ok_or_else(|| Error::NotFound(format!("{container}/{key}")))?;
        tokio::fs::write(dest, &data)
            .await
            .map_err(|e| Error::local_io(dest, e))?;
        Ok(data.len() as u64)
    }

    async fn upload_file(&self, container: &str, key: &str, source: &Path) -> Result<ObjectInfo> {
        self.log(format!("upload {container}/{key}"));
        self.check_failure(key)?;
        let data = tokio::fs::read(source)
            .await
            .map_err(|e| Error::local_io(source, e))?;
        let size = data.len() as i64;
        self.write(container, key, data)?;
        Ok(ObjectInfo::new(key, size))
    }

    async fn copy_object(
        &self,
        src_container: &str,
        src_key: &str,
        dst_container: &str,
        dst_key: &str,
    ) -> Result<()> {
        self.log(format!(
            "copy {src_container}/{src_key} -> {dst_container}/{dst_key}"
        ));
        self.check_failure(dst_key)?;
        let data = self
            .get(src_container, src_key)
            .ok_or_else(|| Error::NotFound(format!("{src_container}/{src_key}")))?;
        self.write(dst_container, dst_key, data)
    }

    async fn delete_object(&self, container: &str, key: &str) -> Result<()> {
        self.log(format!("delete_object {container}/{key}"));
        self.check_failure(key)?;
        let mut buckets = self.buckets.lock().unwrap();
        buckets
            .get_mut(container)
            .and_then(|objects| objects.remove(key))
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(format!("{container}/{key}")))
    }
}
