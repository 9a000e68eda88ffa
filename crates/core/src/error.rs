//! The one error type every cloudstash crate returns
//!
//! Provider adapters translate SDK failures into these variants, and the CLI
//! turns each variant into a process exit code via [`Error::exit_code`].

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Invalid combination of arguments
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    #[error("Profile already exists: {0}")]
    ProfileExists(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Local file could not be read or written
    #[error("Local I/O error on {}: {source}", path.display())]
    LocalIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Bucket or object does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bucket name collision
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Destructive operation blocked because the bucket still holds objects
    #[error("Not empty: {0}")]
    NotEmpty(String),

    /// Transport or provider failure (retryable)
    #[error("Remote error: {0}")]
    Remote(String),

    /// A local file was mapped against a root it does not live under
    #[error("{} is not inside {}", path.display(), root.display())]
    InvalidRoot { path: PathBuf, root: PathBuf },

    /// Feature not supported by backend
    #[error("Unsupported feature: {0}")]
    UnsupportedFeature(String),

    /// Operation cancelled before completion
    #[error("Cancelled: {0}")]
    Cancelled(String),

    #[error("{0}")]
    General(String),
}

impl Error {
    /// Wrap an I/O error together with the local path it happened on
    pub fn local_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::LocalIo {
            path: path.into(),
            source,
        }
    }

    /// Exit status for a command that ends with this error
    pub const fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidPath(_) | Error::InvalidArgument(_) => 2, // UsageError
            Error::Config(_) | Error::InvalidUrl(_) => 2,           // UsageError
            Error::InvalidRoot { .. } => 2,                         // UsageError
            Error::Remote(_) => 3,                                  // NetworkError
            Error::Auth(_) => 4,                                    // AuthError
            Error::NotFound(_) | Error::ProfileNotFound(_) => 5,    // NotFound
            Error::AlreadyExists(_) | Error::NotEmpty(_) => 6,      // Conflict
            Error::ProfileExists(_) => 6,                           // Conflict
            Error::UnsupportedFeature(_) => 7,                      // UnsupportedFeature
            Error::Cancelled(_) => 130,                             // Interrupted
            _ => 1,                                                 // GeneralError
        }
    }

    /// Whether this error means the addressed bucket or object is absent
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_exit_codes() {
        assert_eq!(Error::InvalidPath("test".into()).exit_code(), 2);
        assert_eq!(Error::InvalidArgument("test".into()).exit_code(), 2);
        assert_eq!(Error::Config("test".into()).exit_code(), 2);
        assert_eq!(Error::Remote("test".into()).exit_code(), 3);
        assert_eq!(Error::Auth("test".into()).exit_code(), 4);
        assert_eq!(Error::NotFound("test".into()).exit_code(), 5);
        assert_eq!(Error::ProfileNotFound("test".into()).exit_code(), 5);
        assert_eq!(Error::AlreadyExists("test".into()).exit_code(), 6);
        assert_eq!(Error::NotEmpty("test".into()).exit_code(), 6);
        assert_eq!(Error::UnsupportedFeature("test".into()).exit_code(), 7);
        assert_eq!(Error::Cancelled("test".into()).exit_code(), 130);
        assert_eq!(Error::General("test".into()).exit_code(), 1);
    }

    #[test]
    fn test_error_display() {
        let err = Error::ProfileNotFound("prod".into());
        assert_eq!(err.to_string(), "Profile not found: prod");

        let err = Error::InvalidRoot {
            path: PathBuf::from("/etc/passwd"),
            root: PathBuf::from("/data"),
        };
        assert_eq!(err.to_string(), "/etc/passwd is not inside /data");
    }

    #[test]
    fn test_local_io_keeps_path() {
        let err = Error::local_io(
            "/data/a.txt",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("/data/a.txt"));
        assert_eq!(err.exit_code(), 1);
    }
}
