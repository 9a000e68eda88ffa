//! Configuration file
//!
//! One TOML file holds the CLI defaults and every storage profile. It lives at
//! `<config dir>/cloudstash/config.toml`, or in `$CSTASH_CONFIG_DIR` when set.
//!
//! PROTECTED FILE: Changes to schema_version require migration support.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::profile::Profile;

/// Current configuration schema version
///
/// Bumping this needs a step in [`upgrade`] and a test loading the old layout.
pub const SCHEMA_VERSION: u32 = 1;

/// Environment variable that overrides the configuration directory
pub const CONFIG_DIR_ENV: &str = "CSTASH_CONFIG_DIR";

const FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Layout version of the file
    pub schema_version: u32,

    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub profiles: Vec<Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            defaults: Defaults::default(),
            profiles: Vec::new(),
        }
    }
}

impl Config {
    fn validate(&self) -> Result<()> {
        if self.defaults.concurrency == 0 {
            return Err(Error::Config(
                "defaults.concurrency must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// CLI behavior applied when a flag is not given
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    /// "human" or "json"
    pub output: String,

    /// "auto", "always" or "never"
    pub color: String,

    pub progress: bool,

    /// Transfers a batch keeps in flight
    pub concurrency: usize,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: "human".to_string(),
            color: "auto".to_string(),
            progress: true,
            concurrency: 1,
        }
    }
}

/// Bring an older file up to [`SCHEMA_VERSION`]
fn upgrade(mut config: Config) -> Config {
    // Version 0 files were written before the field existed; the layout is
    // otherwise identical.
    tracing::debug!(
        from = config.schema_version,
        to = SCHEMA_VERSION,
        "upgrading configuration"
    );
    config.schema_version = SCHEMA_VERSION;
    config
}

/// Reads and writes the configuration file
#[derive(Debug)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Locate the file from `$CSTASH_CONFIG_DIR` or the platform config dir
    pub fn new() -> Result<Self> {
        let dir = match std::env::var_os(CONFIG_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::config_dir()
                .ok_or_else(|| Error::Config("Could not determine config directory".into()))?
                .join("cloudstash"),
        };
        Ok(Self::with_path(dir.join(FILE_NAME)))
    }

    /// Use an explicit file path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load the file, or defaults when it does not exist yet
    pub fn load(&self) -> Result<Config> {
        let content = match std::fs::read_to_string(&self.config_path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Config::default()),
            Err(e) => return Err(Error::local_io(&self.config_path, e)),
        };

        let mut config: Config = toml::from_str(&content)?;
        if config.schema_version > SCHEMA_VERSION {
            return Err(Error::Config(format!(
                "Configuration file version {} is newer than supported version {SCHEMA_VERSION}. Please upgrade cstash.",
                config.schema_version
            )));
        }
        if config.schema_version < SCHEMA_VERSION {
            config = upgrade(config);
        }

        config.validate()?;
        Ok(config)
    }

    /// Write the file, creating its directory; owner-only on Unix
    pub fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::local_io(parent, e))?;
        }

        let content = toml::to_string_pretty(config)?;
        std::fs::write(&self.config_path, content)
            .map_err(|e| Error::local_io(&self.config_path, e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.config_path, std::fs::Permissions::from_mode(0o600))
                .map_err(|e| Error::local_io(&self.config_path, e))?;
        }

        Ok(())
    }
}
