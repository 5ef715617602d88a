//! Configuration file handling for chargebook.
//!
//! The configuration file is stored at `$CHARGEBOOK_HOME/config.json` and holds the owning user
//! that every query is scoped to, along with presentation settings.

use crate::db::Db;
use crate::format::FormatConfig;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "chargebook";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const CHARGEBOOK_SQLITE: &str = "chargebook.sqlite";
const DEFAULT_USER: &str = "default";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$CHARGEBOOK_HOME` and from there it loads `$CHARGEBOOK_HOME/config.json` and opens
/// the SQLite database next to it.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    db: Db,
    sqlite_path: PathBuf,
}

impl Config {
    /// Creates the data directory and:
    /// - Writes an initial `config.json` with default settings, owned by `user` if given
    /// - Creates the SQLite database and its schema
    ///
    /// # Errors
    /// - If a `config.json` already exists in `dir`.
    /// - If any file operations fail.
    pub async fn create(dir: impl Into<PathBuf>, user: Option<&str>) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the chargebook home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            bail!(
                "A chargebook home already exists at '{}'",
                root.to_string_lossy()
            )
        }

        let config_file = ConfigFile {
            user: user.unwrap_or(DEFAULT_USER).to_string(),
            ..ConfigFile::default()
        };
        config_file.validate()?;
        config_file.save(&config_path).await?;

        let sqlite_path = root.join(CHARGEBOOK_SQLITE);
        let db = Db::init(&sqlite_path)
            .await
            .context("Unable to create SQLite DB")?;

        Ok(Self {
            root,
            config_path,
            config_file,
            db,
            sqlite_path,
        })
    }

    /// This will
    /// - validate that `chargebook_home` exists and that the config file exists
    /// - load the config file
    /// - open the database, migrating its schema if needed
    pub async fn load(chargebook_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = chargebook_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The chargebook home is missing, run 'chargebook init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let sqlite_path = root.join(CHARGEBOOK_SQLITE);
        let db = Db::load(&sqlite_path)
            .await
            .context("Unable to load SQLite DB")?;

        Ok(Self {
            root,
            config_path,
            config_file,
            db,
            sqlite_path,
        })
    }

    /// Replaces the configured user for the lifetime of this object. The file on disk is not
    /// changed.
    pub fn with_user(mut self, user: Option<&str>) -> Result<Self> {
        if let Some(user) = user {
            self.config_file.user = user.to_string();
            self.config_file.validate()?;
        }
        Ok(self)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn sqlite_path(&self) -> &Path {
        &self.sqlite_path
    }

    pub(crate) fn db(&self) -> &Db {
        &self.db
    }

    /// The owning user that scopes all records and the baseline.
    pub fn user(&self) -> &str {
        &self.config_file.user
    }

    pub fn format(&self) -> &FormatConfig {
        &self.config_file.format
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "chargebook",
///   "config_version": 1,
///   "user": "default",
///   "format": {
///     "currency_symbol": "R$",
///     "distance_unit": "km",
///     "thousands_separator": true
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "chargebook"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// The owning user
    #[serde(default = "default_user")]
    user: String,

    #[serde(default)]
    format: FormatConfig,
}

fn default_user() -> String {
    DEFAULT_USER.to_string()
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            user: default_user(),
            format: FormatConfig::default(),
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if it is not a chargebook config.
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let config: ConfigFile = utils::deserialize(path.as_ref()).await?;
        config.validate()?;
        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }

    fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            self.app_name
        );
        anyhow::ensure!(
            self.config_version <= CONFIG_VERSION,
            "Unsupported config_version {}, this program understands up to {}",
            self.config_version,
            CONFIG_VERSION
        );
        anyhow::ensure!(!self.user.trim().is_empty(), "The user must not be empty");
        Ok(())
    }
}
