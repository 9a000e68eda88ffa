//! Destination key mapping
//!
//! Turns an enumerated source item into the key it is stored under in the
//! destination bucket. Pure functions only; nothing here touches a store or
//! the filesystem.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A slash-separated object key
///
/// Keys built with [`ObjectKey::new`] from local paths or user input are
/// non-empty, never start with `/` and never contain `\`. Keys reported by a
/// store come in through [`ObjectKey::from_listing`] and are kept byte for
/// byte, since that exact string is what addresses the object.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Normalize a raw key: backslashes become `/`, leading slashes are dropped
    pub fn new(raw: impl AsRef<str>) -> Result<Self> {
        let normalized = raw.as_ref().replace('\\', "/");
        let trimmed = normalized.trim_start_matches('/');
        if trimmed.is_empty() {
            return Err(Error::InvalidArgument(format!(
                "'{}' is not a valid object key",
                raw.as_ref()
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// A key exactly as a store listed it; no normalization
    pub fn from_listing(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Build a key from relative path components
    fn from_components(path: &Path) -> Result<Self> {
        let mut parts = Vec::new();
        for component in path.components() {
            match component {
                Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
                Component::CurDir => {}
                _ => {
                    return Err(Error::InvalidArgument(format!(
                        "'{}' cannot be turned into an object key",
                        path.display()
                    )));
                }
            }
        }
        Self::new(parts.join("/"))
    }

    /// Prepend a destination prefix, inserting `/` when the prefix lacks one
    pub fn with_prefix(&self, prefix: &str) -> Self {
        let prefix = prefix.trim_start_matches('/');
        if prefix.is_empty() {
            self.clone()
        } else if prefix.ends_with('/') {
            Self(format!("{prefix}{}", self.0))
        } else {
            Self(format!("{prefix}/{}", self.0))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment of the key
    pub fn base_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One thing to transfer, produced by enumeration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceItem {
    /// A regular file on the local filesystem
    LocalFile { path: PathBuf },
    /// An object in a source bucket
    RemoteObject { container: String, key: ObjectKey },
    /// Part of a local tree that could not be read during enumeration
    Unreadable { path: PathBuf, reason: String },
}

impl fmt::Display for SourceItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceItem::LocalFile { path } => write!(f, "{}", path.display()),
            SourceItem::RemoteObject { container, key } => write!(f, "{container}/{key}"),
            SourceItem::Unreadable { path, .. } => write!(f, "{}", path.display()),
        }
    }
}

/// Computes destination keys for source items
#[derive(Debug, Clone, Default)]
pub struct KeyMapper {
    prefix: Option<String>,
    override_key: Option<ObjectKey>,
}

impl KeyMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place every mapped key under `prefix`
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.prefix = if prefix.trim_start_matches('/').is_empty() {
            None
        } else {
            Some(prefix)
        };
        self
    }

    /// Store the item under exactly this key (prefix is ignored)
    pub fn with_override(mut self, key: Option<ObjectKey>) -> Self {
        self.override_key = key;
        self
    }

    pub fn override_key(&self) -> Option<&ObjectKey> {
        self.override_key.as_ref()
    }

    /// Map `item` to its destination key
    ///
    /// A local file is keyed by its path relative to `root`; when the file is
    /// the root itself, by its base name. A remote object keeps its key.
    /// `root` is not consulted for remote objects.
    ///
    /// Fails with `InvalidRoot` when a local file is outside `root`.
    pub fn map(&self, item: &SourceItem, root: &Path) -> Result<ObjectKey> {
        if let Some(key) = &self.override_key {
            return Ok(key.clone());
        }

        let key = match item {
            SourceItem::LocalFile { path } | SourceItem::Unreadable { path, .. } => {
                map_local(path, root)?
            }
            SourceItem::RemoteObject { key, .. } => key.clone(),
        };

        Ok(match &self.prefix {
            Some(prefix) => key.with_prefix(prefix),
            None => key,
        })
    }
}

fn map_local(path: &Path, root: &Path) -> Result<ObjectKey> {
    let invalid_root = || Error::InvalidRoot {
        path: path.to_path_buf(),
        root: root.to_path_buf(),
    };

    if path == root {
        let name = path.file_name().ok_or_else(invalid_root)?;
        return ObjectKey::new(name.to_string_lossy());
    }

    let relative = path.strip_prefix(root).map_err(|_| invalid_root())?;
    ObjectKey::from_components(relative).map_err(|_| invalid_root())
}
