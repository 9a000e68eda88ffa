//! Storage profile management
//!
//! A profile is a named reference to one cloud provider account: which SDK to
//! use, where to reach it and the defaults applied when creating buckets.
//! Credentials are never stored here; each SDK resolves them from its own
//! default chain.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::ConfigManager;
use crate::error::{Error, Result};

/// Cloud provider backing a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Amazon S3 or an S3-compatible endpoint
    S3,
    /// Google Cloud Storage
    Gcs,
}

impl Provider {
    pub const fn as_str(self) -> &'static str {
        match self {
            Provider::S3 => "s3",
            Provider::Gcs => "gcs",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "s3" | "aws" => Ok(Provider::S3),
            "gcs" | "gcp" | "google" => Ok(Provider::Gcs),
            other => Err(Error::InvalidArgument(format!(
                "unknown provider '{other}' (expected s3 or gcs)"
            ))),
        }
    }
}

/// A named storage account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Unique name for this profile
    pub name: String,

    /// Provider SDK to use
    pub provider: Provider,

    /// Region for API calls (S3) and default bucket region
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Custom endpoint URL (S3-compatible services)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Project that owns new buckets (GCS)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,

    /// Default location for new buckets (GCS), e.g. "US"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Default storage class for new buckets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,

    /// Use path-style bucket addressing (S3-compatible services)
    #[serde(default)]
    pub path_style: bool,
}

impl Profile {
    /// Create a new profile with only the required fields
    pub fn new(name: impl Into<String>, provider: Provider) -> Self {
        Self {
            name: name.into(),
            provider,
            region: None,
            endpoint: None,
            project: None,
            location: None,
            storage_class: None,
            path_style: false,
        }
    }

    /// Check the fields that can be validated offline
    pub fn validate(&self) -> Result<()> {
        if !is_valid_profile_name(&self.name) {
            return Err(Error::InvalidArgument(format!(
                "profile name '{}' may only contain letters, digits, '_' and '-'",
                self.name
            )));
        }
        if let Some(endpoint) = &self.endpoint {
            url::Url::parse(endpoint)?;
        }
        Ok(())
    }

    /// Region or location new buckets are placed in when none is given
    pub fn default_bucket_region(&self) -> Option<&str> {
        match self.provider {
            Provider::S3 => self.region.as_deref(),
            Provider::Gcs => self.location.as_deref().or(self.region.as_deref()),
        }
    }
}

/// Check if a string is a valid profile name
pub(crate) fn is_valid_profile_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Manager for profile operations
pub struct ProfileManager {
    config_manager: ConfigManager,
}

impl ProfileManager {
    /// Create a new ProfileManager with a specific ConfigManager
    pub fn with_config_manager(config_manager: ConfigManager) -> Self {
        Self { config_manager }
    }

    /// Create a new ProfileManager using the default config location
    pub fn new() -> Result<Self> {
        let config_manager = ConfigManager::new()?;
        Ok(Self { config_manager })
    }

    /// List all configured profiles
    pub fn list(&self) -> Result<Vec<Profile>> {
        let config = self.config_manager.load()?;
        Ok(config.profiles)
    }

    /// Get a profile by name
    pub fn get(&self, name: &str) -> Result<Profile> {
        let config = self.config_manager.load()?;
        config
            .profiles
            .into_iter()
            .find(|p| p.name == name)
            .ok_or_else(|| Error::ProfileNotFound(name.to_string()))
    }

    /// Add or update a profile
    pub fn set(&self, profile: Profile) -> Result<()> {
        profile.validate()?;
        let mut config = self.config_manager.load()?;

        config.profiles.retain(|p| p.name != profile.name);
        config.profiles.push(profile);

        self.config_manager.save(&config)
    }

    /// Remove a profile
    pub fn remove(&self, name: &str) -> Result<()> {
        let mut config = self.config_manager.load()?;
        let original_len = config.profiles.len();

        config.profiles.retain(|p| p.name != name);

        if config.profiles.len() == original_len {
            return Err(Error::ProfileNotFound(name.to_string()));
        }

        self.config_manager.save(&config)
    }

    /// Check if a profile exists
    pub fn exists(&self, name: &str) -> Result<bool> {
        let config = self.config_manager.load()?;
        Ok(config.profiles.iter().any(|p| p.name == name))
    }
}
