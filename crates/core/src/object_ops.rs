//! Single-object operations
//!
//! Upload, download, copy, move, rename and delete of one object. Destination
//! keys follow the same rules everywhere: no key means "keep the name", a key
//! ending in `/` is a prefix the name is placed under. Keys naming an
//! existing object are used exactly as given.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::keymap::ObjectKey;
use crate::traits::{ObjectInfo, ObjectStore};

/// Resolve the destination key for an item called `name`
pub fn resolve_key(target: Option<&str>, name: &str) -> Result<ObjectKey> {
    match target {
        None | Some("") => ObjectKey::new(name),
        Some(prefix) if prefix.ends_with('/') => {
            ObjectKey::new(name).map(|key| key.with_prefix(prefix))
        }
        Some(key) => ObjectKey::new(key),
    }
}

/// Key of an object that already exists; only emptiness is checked
fn existing_key(raw: &str) -> Result<ObjectKey> {
    if raw.is_empty() {
        return Err(Error::InvalidArgument("object key cannot be empty".into()));
    }
    Ok(ObjectKey::from_listing(raw))
}

/// Upload one local file
pub async fn upload(
    store: &dyn ObjectStore,
    source: &Path,
    bucket: &str,
    key: Option<&str>,
) -> Result<ObjectInfo> {
    let metadata = tokio::fs::metadata(source)
        .await
        .map_err(|e| Error::local_io(source, e))?;
    if !metadata.is_file() {
        return Err(Error::InvalidArgument(format!(
            "{} is not a regular file; use backup for directories",
            source.display()
        )));
    }

    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| Error::InvalidArgument(format!("{} has no file name", source.display())))?;
    let key = resolve_key(key, &name)?;

    tracing::debug!(source = %source.display(), bucket, key = %key, "uploading");
    store.upload_file(bucket, key.as_str(), source).await
}

/// Download one object, returning where it was written and its size
///
/// With no destination the object lands in the current directory under its
/// base name. A destination that is an existing directory receives the base
/// name inside it.
pub async fn download(
    store: &dyn ObjectStore,
    bucket: &str,
    key: &str,
    dest: Option<&Path>,
) -> Result<(PathBuf, u64)> {
    let object_key = existing_key(key)?;
    let base_name = object_key.base_name();
    let no_name = || {
        Error::InvalidArgument(format!(
            "'{key}' has no file name; give a destination file"
        ))
    };

    let dest = match dest {
        None if base_name.is_empty() => return Err(no_name()),
        None => PathBuf::from(base_name),
        Some(path) if path.is_dir() => {
            if base_name.is_empty() {
                return Err(no_name());
            }
            path.join(base_name)
        }
        Some(path) => path.to_path_buf(),
    };

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| Error::local_io(parent, e))?;
    }

    let written = store.download_file(bucket, object_key.as_str(), &dest).await?;
    tracing::debug!(bucket, key, dest = %dest.display(), written, "downloaded");
    Ok((dest, written))
}

/// Server-side copy; returns the destination key
pub async fn copy(
    store: &dyn ObjectStore,
    src_bucket: &str,
    src_key: &str,
    dst_bucket: &str,
    dst_key: Option<&str>,
) -> Result<ObjectKey> {
    let src = existing_key(src_key)?;
    copy_from(store, src_bucket, &src, dst_bucket, dst_key).await
}

async fn copy_from(
    store: &dyn ObjectStore,
    src_bucket: &str,
    src: &ObjectKey,
    dst_bucket: &str,
    dst_key: Option<&str>,
) -> Result<ObjectKey> {
    let dst = match dst_key {
        None | Some("") => src.clone(),
        Some(_) => resolve_key(dst_key, src.base_name())?,
    };

    if src_bucket == dst_bucket && *src == dst {
        return Err(Error::InvalidArgument(format!(
            "cannot copy {src_bucket}/{src} onto itself"
        )));
    }

    store
        .copy_object(src_bucket, src.as_str(), dst_bucket, dst.as_str())
        .await?;
    tracing::debug!(src_bucket, src_key = %src, dst_bucket, dst_key = %dst, "copied");
    Ok(dst)
}

/// Copy then delete the source
///
/// The source is only deleted once the copy succeeded.
pub async fn move_object(
    store: &dyn ObjectStore,
    src_bucket: &str,
    src_key: &str,
    dst_bucket: &str,
    dst_key: Option<&str>,
) -> Result<ObjectKey> {
    let src = existing_key(src_key)?;
    let dst = copy_from(store, src_bucket, &src, dst_bucket, dst_key).await?;
    store.delete_object(src_bucket, src.as_str()).await?;
    Ok(dst)
}

/// Move an object to a new key in the same bucket
pub async fn rename(
    store: &dyn ObjectStore,
    bucket: &str,
    key: &str,
    new_key: &str,
) -> Result<ObjectKey> {
    move_object(store, bucket, key, bucket, Some(new_key)).await
}

pub async fn delete(store: &dyn ObjectStore, bucket: &str, key: &str) -> Result<()> {
    let key = existing_key(key)?;
    store.delete_object(bucket, key.as_str()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStore;
    use crate::traits::MockObjectStore;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_key() {
        assert_eq!(resolve_key(None, "a.txt").unwrap().as_str(), "a.txt");
        assert_eq!(resolve_key(Some(""), "a.txt").unwrap().as_str(), "a.txt");
        assert_eq!(resolve_key(Some("docs/"), "a.txt").unwrap().as_str(), "docs/a.txt");
        assert_eq!(resolve_key(Some("b.txt"), "a.txt").unwrap().as_str(), "b.txt");
    }

    #[tokio::test]
    async fn test_upload_uses_base_name() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("notes.md");
        std::fs::write(&file, "hello").unwrap();
        let store = MemoryStore::new().with_bucket("b");

        let info = upload(&store, &file, "b", None).await.unwrap();
        assert_eq!(info.key, "notes.md");
        assert_eq!(info.size_bytes, 5);

        upload(&store, &file, "b", Some("docs/")).await.unwrap();
        assert_eq!(store.keys("b"), vec!["docs/notes.md", "notes.md"]);
    }

    #[tokio::test]
    async fn test_upload_missing_file_is_local_io() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::new().with_bucket("b");

        let err = upload(&store, &dir.path().join("nope"), "b", None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::LocalIo { .. }));
    }

    #[tokio::test]
    async fn test_upload_directory_is_rejected() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::new().with_bucket("b");

        let err = upload(&store, dir.path(), "b", None).await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_download_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::new().with_bucket("b");
        store.put("b", "logs/app.log", b"line");

        let dest = dir.path().join("nested/out/app.log");
        let (path, written) = download(&store, "b", "logs/app.log", Some(&dest))
            .await
            .unwrap();

        assert_eq!(path, dest);
        assert_eq!(written, 4);
        assert_eq!(std::fs::read(&dest).unwrap(), b"line");
    }

    #[tokio::test]
    async fn test_download_into_existing_directory() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::new().with_bucket("b");
        store.put("b", "logs/app.log", b"line");

        let (path, _) = download(&store, "b", "logs/app.log", Some(dir.path()))
            .await
            .unwrap();
        assert_eq!(path, dir.path().join("app.log"));
    }

    #[tokio::test]
    async fn test_copy_onto_itself_is_rejected() {
        let mut store = MockObjectStore::new();
        store.expect_copy_object().never();

        let err = copy(&store, "b", "a.txt", "b", None).await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));

        let err = copy(&store, "b", "a.txt", "b", Some("a.txt")).await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_copy_between_buckets_keeps_key() {
        let store = MemoryStore::new().with_bucket("src").with_bucket("dst");
        store.put("src", "dir/a.txt", b"a");

        let key = copy(&store, "src", "dir/a.txt", "dst", None).await.unwrap();
        assert_eq!(key.as_str(), "dir/a.txt");

        let key = copy(&store, "src", "dir/a.txt", "dst", Some("other/")).await.unwrap();
        assert_eq!(key.as_str(), "other/a.txt");
        assert_eq!(store.keys("dst"), vec!["dir/a.txt", "other/a.txt"]);
    }

    #[tokio::test]
    async fn test_move_deletes_source() {
        let store = MemoryStore::new().with_bucket("src").with_bucket("dst");
        store.put("src", "a.txt", b"a");

        move_object(&store, "src", "a.txt", "dst", None).await.unwrap();

        assert!(store.keys("src").is_empty());
        assert_eq!(store.keys("dst"), vec!["a.txt"]);
    }

    #[tokio::test]
    async fn test_move_keeps_source_when_copy_fails() {
        let store = MemoryStore::new().with_bucket("src").with_bucket("dst");
        store.put("src", "a.txt", b"a");
        store.fail_on("b.txt");

        let result = move_object(&store, "src", "a.txt", "dst", Some("b.txt")).await;

        assert!(result.is_err());
        assert_eq!(store.keys("src"), vec!["a.txt"]);
        assert!(!store.calls().iter().any(|c| c.starts_with("delete_object")));
    }

    #[tokio::test]
    async fn test_move_slash_prefixed_key_leaves_its_neighbour_alone() {
        let store = MemoryStore::new().with_bucket("b").with_bucket("d");
        store.put("b", "/a.txt", b"SLASHED");
        store.put("b", "a.txt", b"PLAIN");

        let key = move_object(&store, "b", "/a.txt", "d", None).await.unwrap();

        assert_eq!(key.as_str(), "/a.txt");
        assert_eq!(store.keys("b"), vec!["a.txt"]);
        assert_eq!(store.get("b", "a.txt").unwrap(), b"PLAIN");
        assert_eq!(store.get("d", "/a.txt").unwrap(), b"SLASHED");
    }

    #[tokio::test]
    async fn test_move_to_prefix_removes_exact_source() {
        let store = MemoryStore::new().with_bucket("b");
        store.put("b", "dir\\x.txt", b"x");
        store.put("b", "dir/x.txt", b"other");

        let key = move_object(&store, "b", "dir\\x.txt", "b", Some("moved/"))
            .await
            .unwrap();

        // The new key is built from user input and so is normalized.
        assert_eq!(key.as_str(), "moved/dir/x.txt");
        assert_eq!(store.keys("b"), vec!["dir/x.txt", "moved/dir/x.txt"]);
        assert_eq!(store.get("b", "moved/dir/x.txt").unwrap(), b"x");
    }

    #[tokio::test]
    async fn test_delete_and_download_address_the_exact_key() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::new().with_bucket("b");
        store.put("b", "/lead.txt", b"slashed");
        store.put("b", "lead.txt", b"plain");

        let (_, written) = download(&store, "b", "/lead.txt", Some(&dir.path().join("out")))
            .await
            .unwrap();
        assert_eq!(written, 7);

        delete(&store, "b", "/lead.txt").await.unwrap();
        assert_eq!(store.keys("b"), vec!["lead.txt"]);
    }

    #[tokio::test]
    async fn test_download_of_nameless_key_needs_destination() {
        let store = MemoryStore::new().with_bucket("b");
        store.put("b", "/", b"root");

        let err = download(&store, "b", "/", None).await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_rename_within_bucket() {
        let store = MemoryStore::new().with_bucket("b");
        store.put("b", "old.txt", b"x");

        let key = rename(&store, "b", "old.txt", "new.txt").await.unwrap();

        assert_eq!(key.as_str(), "new.txt");
        assert_eq!(store.keys("b"), vec!["new.txt"]);
        assert_eq!(store.get("b", "new.txt").unwrap(), b"x");
    }

    #[tokio::test]
    async fn test_delete_missing_object_is_not_found() {
        let store = MemoryStore::new().with_bucket("b");
        let err = delete(&store, "b", "ghost").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
