//! Configuration file handling for daydash.
//!
//! The configuration file is stored at `$DAYDASH_HOME/config.json` and contains settings such as
//! the weather location, the dashboard timezone, timing and the AI models to use.

use crate::backup::Backup;
use crate::{utils, Result};
use anyhow::{bail, Context};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_NAME: &str = "daydash";
const CONFIG_VERSION: u8 = 1;
const BACKUP_COPIES: u32 = 5;
const BACKUPS: &str = ".backups";
const CONFIG_JSON: &str = "config.json";
const STORAGE_JSON: &str = "storage.json";
const DEFAULT_LOCATION: &str = "Busan";
const DEFAULT_TIMEZONE: &str = "Asia/Seoul";
const DEFAULT_WEATHER_INTERVAL_MINUTES: u64 = 30;
const DEFAULT_COMMENTARY_DEBOUNCE_MS: u64 = 800;
const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$DAYDASH_HOME` and from there it loads `$DAYDASH_HOME/config.json`. It provides
/// paths to the other items that are expected in a certain location within the home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    backups: PathBuf,
    config_path: PathBuf,
    storage_path: PathBuf,
    config_file: ConfigFile,
    timezone: Tz,
}

impl Config {
    /// Creates the home directory, its backups subdirectory and an initial `config.json` with
    /// default settings.
    ///
    /// # Errors
    /// - Returns an error if `config.json` already exists or if any file operation fails.
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the daydash home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            bail!(
                "A config file already exists at '{}'",
                config_path.display()
            )
        }

        let backups = root.join(BACKUPS);
        utils::make_dir(&backups).await?;

        let config_file = ConfigFile::default();
        config_file.save(&config_path).await?;
        let timezone = config_file.timezone()?;

        Ok(Self {
            storage_path: root.join(STORAGE_JSON),
            root,
            backups,
            config_path,
            config_file,
            timezone,
        })
    }

    /// This will
    /// - validate that `daydash_home` exists and that the config file exists
    /// - load and validate the config file
    /// - validate that the backups directory exists
    /// - return the loaded configuration object
    pub async fn load(daydash_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = daydash_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The daydash home directory is missing, run 'daydash init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;
        let timezone = config_file.timezone()?;

        let config = Self {
            backups: root.join(BACKUPS),
            storage_path: root.join(STORAGE_JSON),
            root,
            config_path,
            config_file,
            timezone,
        };
        if !config.backups.is_dir() {
            bail!(
                "The backups directory is missing '{}'",
                config.backups.display()
            )
        }
        Ok(config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn backups(&self) -> &Path {
        &self.backups
    }

    /// The file holding the key-value store, `$DAYDASH_HOME/storage.json`.
    pub fn storage_path(&self) -> &Path {
        &self.storage_path
    }

    pub fn location(&self) -> &str {
        &self.config_file.location
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn weather_interval(&self) -> Duration {
        Duration::from_secs(self.config_file.weather_interval_minutes * 60)
    }

    pub fn commentary_debounce(&self) -> Duration {
        Duration::from_millis(self.config_file.commentary_debounce_ms)
    }

    pub fn text_model(&self) -> &str {
        &self.config_file.text_model
    }

    pub fn image_model(&self) -> &str {
        &self.config_file.image_model
    }

    pub fn api_base_url(&self) -> &str {
        &self.config_file.api_base_url
    }

    pub fn backup_copies(&self) -> u32 {
        self.config_file.backup_copies
    }

    /// Creates a new `Backup` instance for managing backup files.
    pub fn backup(&self) -> Backup {
        Backup::new(&self.backups, self.backup_copies())
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "daydash",
///   "config_version": 1,
///   "location": "Busan",
///   "timezone": "Asia/Seoul",
///   "weather_interval_minutes": 30,
///   "commentary_debounce_ms": 800,
///   "text_model": "gemini-2.5-flash",
///   "image_model": "gemini-2.5-flash-image",
///   "api_base_url": "https://generativelanguage.googleapis.com",
///   "backup_copies": 5
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "daydash"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// The place the weather report is fetched for
    #[serde(default = "default_location")]
    location: String,

    /// IANA name of the timezone used for the clock and for grouping spending by day
    #[serde(default = "default_timezone")]
    timezone: String,

    #[serde(default = "default_weather_interval_minutes")]
    weather_interval_minutes: u64,

    /// Quiet period before a spending comment is requested
    #[serde(default = "default_commentary_debounce_ms")]
    commentary_debounce_ms: u64,

    #[serde(default = "default_text_model")]
    text_model: String,

    #[serde(default = "default_image_model")]
    image_model: String,

    #[serde(default = "default_api_base_url")]
    api_base_url: String,

    /// Number of backup copies to keep
    #[serde(default = "default_backup_copies")]
    backup_copies: u32,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            location: default_location(),
            timezone: default_timezone(),
            weather_interval_minutes: DEFAULT_WEATHER_INTERVAL_MINUTES,
            commentary_debounce_ms: DEFAULT_COMMENTARY_DEBOUNCE_MS,
            text_model: default_text_model(),
            image_model: default_image_model(),
            api_base_url: default_api_base_url(),
            backup_copies: BACKUP_COPIES,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path and validates it.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if a setting is invalid
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = utils::read(path)
            .await
            .with_context(|| format!("Failed to read config file at {}", path.display()))?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        anyhow::ensure!(
            config.weather_interval_minutes > 0,
            "Invalid weather_interval_minutes in config file: must be at least 1"
        );
        let _ = config.timezone()?;

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }

    fn timezone(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| anyhow::anyhow!("Invalid timezone '{}' in config file: {e}", self.timezone))
    }
}

fn default_location() -> String {
    DEFAULT_LOCATION.to_string()
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_weather_interval_minutes() -> u64 {
    DEFAULT_WEATHER_INTERVAL_MINUTES
}

fn default_commentary_debounce_ms() -> u64 {
    DEFAULT_COMMENTARY_DEBOUNCE_MS
}

fn default_text_model() -> String {
    DEFAULT_TEXT_MODEL.to_string()
}

fn default_image_model() -> String {
    DEFAULT_IMAGE_MODEL.to_string()
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_backup_copies() -> u32 {
    BACKUP_COPIES
}
