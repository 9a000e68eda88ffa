//! Location syntax
//!
//! Remote locations are written `profile/bucket[/key]`. Anything that starts
//! with `/`, `./` or `../`, or whose first segment cannot be a profile name,
//! is a local path.

use std::fmt;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::profile::is_valid_profile_name;

/// A bucket, or a key or prefix inside one, reached through a profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemotePath {
    pub profile: String,
    pub bucket: String,
    /// Object key or prefix; empty for the bucket itself
    pub key: String,
    /// True for the bucket itself or a key ending in '/'
    pub is_dir: bool,
}

impl RemotePath {
    pub fn new(
        profile: impl Into<String>,
        bucket: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        let key = key.into();
        Self {
            profile: profile.into(),
            bucket: bucket.into(),
            is_dir: key.is_empty() || key.ends_with('/'),
            key,
        }
    }

    /// Parse a location that must be remote
    pub fn parse(path: &str) -> Result<Self> {
        match parse_path(path)? {
            ParsedPath::Remote(remote) => Ok(remote),
            ParsedPath::Local(_) => Err(Error::InvalidPath(format!(
                "'{path}' is a local path. Expected: profile/bucket[/key]"
            ))),
        }
    }

    /// Parse a location that must be a whole bucket (a trailing '/' is allowed)
    pub fn parse_bucket(path: &str) -> Result<Self> {
        let remote = Self::parse(path.trim_end_matches('/'))?;
        if remote.key.is_empty() {
            Ok(remote)
        } else {
            Err(Error::InvalidPath(format!(
                "'{path}' names an object. Expected: profile/bucket"
            )))
        }
    }

    /// Parse a location that must be a single object
    pub fn parse_object(path: &str) -> Result<Self> {
        let remote = Self::parse(path)?;
        if remote.is_dir {
            Err(Error::InvalidPath(format!(
                "'{path}' does not name an object. Expected: profile/bucket/key"
            )))
        } else {
            Ok(remote)
        }
    }

    /// The key as a prefix, `None` for the bucket root
    pub fn prefix(&self) -> Option<&str> {
        Some(self.key.as_str()).filter(|k| !k.is_empty())
    }

    pub fn to_full_path(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for RemotePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.profile, self.bucket)?;
        if !self.key.is_empty() {
            write!(f, "/{}", self.key)?;
        }
        Ok(())
    }
}

/// A location on either side of a transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedPath {
    Local(PathBuf),
    Remote(RemotePath),
}

impl ParsedPath {
    pub fn is_remote(&self) -> bool {
        matches!(self, ParsedPath::Remote(_))
    }

    pub fn as_remote(&self) -> Option<&RemotePath> {
        match self {
            ParsedPath::Remote(remote) => Some(remote),
            ParsedPath::Local(_) => None,
        }
    }

    pub fn as_local(&self) -> Option<&PathBuf> {
        match self {
            ParsedPath::Local(path) => Some(path),
            ParsedPath::Remote(_) => None,
        }
    }
}

fn looks_local(path: &str) -> bool {
    if path.starts_with('/') || path.starts_with("./") || path.starts_with("../") {
        return true;
    }
    if matches!(path, "." | "..") {
        return true;
    }
    // C:\ and C:/ style drive paths
    let bytes = path.as_bytes();
    cfg!(windows) && bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Classify a location as local or remote
pub fn parse_path(path: &str) -> Result<ParsedPath> {
    if path.is_empty() {
        return Err(Error::InvalidPath("Path cannot be empty".into()));
    }
    if looks_local(path) {
        return Ok(ParsedPath::Local(PathBuf::from(path)));
    }

    let Some((profile, rest)) = path.split_once('/') else {
        // A bare word is a file name if it has an extension, otherwise a
        // half-written remote location.
        if path.contains('.') || path.contains('\\') {
            return Ok(ParsedPath::Local(PathBuf::from(path)));
        }
        return Err(Error::InvalidPath(format!(
            "Path '{path}' is incomplete. Use format: profile/bucket[/key]"
        )));
    };

    if !is_valid_profile_name(profile) {
        return Ok(ParsedPath::Local(PathBuf::from(path)));
    }

    let (bucket, key) = rest.split_once('/').unwrap_or((rest, ""));
    if bucket.is_empty() {
        return Err(Error::InvalidPath("Bucket name cannot be empty".into()));
    }

    Ok(ParsedPath::Remote(RemotePath::new(profile, bucket, key)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(path: &str) -> RemotePath {
        parse_path(path).unwrap().as_remote().cloned().unwrap()
    }

    #[test]
    fn test_object_location() {
        let r = remote("aws/media/2024/cat.png");
        assert_eq!((r.profile.as_str(), r.bucket.as_str()), ("aws", "media"));
        assert_eq!(r.key, "2024/cat.png");
        assert!(!r.is_dir);
        assert_eq!(r.to_string(), "aws/media/2024/cat.png");
    }

    #[test]
    fn test_bucket_and_prefix_locations() {
        let bucket = remote("gcp/media");
        assert!(bucket.is_dir);
        assert_eq!(bucket.prefix(), None);
        assert_eq!(bucket.to_full_path(), "gcp/media");

        let prefix = remote("gcp/media/2024/");
        assert!(prefix.is_dir);
        assert_eq!(prefix.prefix(), Some("2024/"));
    }

    #[test]
    fn test_local_locations() {
        for path in ["/srv/data", "./data", "../data", ".", "..", "notes.txt", "my.dir/file"] {
            let parsed = parse_path(path).unwrap();
            assert!(!parsed.is_remote(), "{path} should be local");
            assert_eq!(parsed.as_local().unwrap(), &PathBuf::from(path));
        }
    }

    #[test]
    fn test_incomplete_locations() {
        assert!(parse_path("").is_err());
        assert!(parse_path("aws").is_err());
        assert!(parse_path("aws/").is_err());
        assert!(parse_path("aws//key").is_err());
    }

    #[test]
    fn test_parse_rejects_local() {
        assert!(matches!(
            RemotePath::parse("./backup"),
            Err(Error::InvalidPath(_))
        ));
    }

    #[test]
    fn test_parse_bucket() {
        assert_eq!(RemotePath::parse_bucket("aws/logs/").unwrap().bucket, "logs");
        assert!(RemotePath::parse_bucket("aws/logs/today.log").is_err());
    }

    #[test]
    fn test_parse_object() {
        assert_eq!(RemotePath::parse_object("aws/logs/a.log").unwrap().key, "a.log");
        assert!(RemotePath::parse_object("aws/logs").is_err());
        assert!(RemotePath::parse_object("aws/logs/2024/").is_err());
    }
}
