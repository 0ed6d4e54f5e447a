//! Configuration file handling.
//!
//! The configuration file is stored at `$EXPENSES_HOME/config.json`. It names the currency label
//! used when printing amounts and, optionally, where the key-value store lives.

use crate::persist::FileStore;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "expenses";
const CONFIG_VERSION: u8 = 1;
const DEFAULT_CURRENCY: &str = "CHF";
const STORE: &str = "store";
const CONFIG_JSON: &str = "config.json";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$EXPENSES_HOME` and from there it loads `$EXPENSES_HOME/config.json`.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    store_dir: PathBuf,
}

impl Config {
    /// Creates the home directory, the store directory and an initial `config.json`.
    ///
    /// # Errors
    /// - Returns an error if `config.json` already exists or any file operation fails.
    pub async fn create(dir: impl Into<PathBuf>, currency: Option<&str>) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the expenses home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            bail!(
                "A config file already exists at '{}'",
                config_path.display()
            );
        }

        let config_file = ConfigFile {
            currency: currency.unwrap_or(DEFAULT_CURRENCY).to_string(),
            ..ConfigFile::default()
        };
        let store_dir = config_file.resolve_store_dir(&root);
        utils::make_dir(&store_dir).await?;
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            config_path,
            config_file,
            store_dir,
        })
    }

    /// This will
    /// - validate that the home directory and the config file exist
    /// - load the config file
    /// - validate that the store directory exists
    pub async fn load(home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = home.into();
        if !maybe_relative.is_dir() {
            bail!(
                "The expenses home directory '{}' is missing, run 'expenses init' first",
                maybe_relative.display()
            )
        }
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!(
                "The config file is missing '{}', run 'expenses init' first",
                config_path.display()
            )
        }
        let config_file = ConfigFile::load(&config_path).await?;
        let store_dir = config_file.resolve_store_dir(&root);
        if !store_dir.is_dir() {
            bail!("The store directory is missing '{}'", store_dir.display())
        }

        Ok(Self {
            root,
            config_path,
            config_file,
            store_dir,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn store_dir(&self) -> &Path {
        &self.store_dir
    }

    pub fn currency(&self) -> &str {
        &self.config_file.currency
    }

    /// The key-value store that holds the projects.
    pub fn store(&self) -> FileStore {
        FileStore::new(&self.store_dir)
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "expenses",
///   "config_version": 1,
///   "currency": "CHF",
///   "store_dir": "store"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "expenses"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// The label printed next to amounts. No conversion is ever done.
    #[serde(default = "default_currency")]
    currency: String,

    /// Directory of the key-value store (optional, relative to the home directory or absolute)
    /// Defaults to $EXPENSES_HOME/store if not specified
    #[serde(skip_serializing_if = "Option::is_none")]
    store_dir: Option<PathBuf>,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            currency: default_currency(),
            store_dir: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path).await?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }

    /// Returns `store_dir` if it is absolute, joins it to `root` if it is relative, and defaults
    /// to `root/store`.
    fn resolve_store_dir(&self, root: &Path) -> PathBuf {
        match &self.store_dir {
            Some(p) if p.is_absolute() => p.clone(),
            Some(p) => root.join(p),
            None => root.join(STORE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_config_create_and_load() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("expenses_home");

        let created = Config::create(&home, Some("EUR")).await.unwrap();
        assert_eq!(created.currency(), "EUR");
        assert!(created.store_dir().is_dir());
        assert!(created.config_path().is_file());

        let loaded = Config::load(&home).await.unwrap();
        assert_eq!(loaded.currency(), "EUR");
        assert_eq!(loaded.store_dir(), created.store_dir());
    }

    #[tokio::test]
    async fn test_config_create_twice_fails() {
        let dir = TempDir::new().unwrap();
        Config::create(dir.path(), None).await.unwrap();
        assert!(Config::create(dir.path(), None).await.is_err());
    }

    #[tokio::test]
    async fn test_config_default_currency() {
        let dir = TempDir::new().unwrap();
        let config = Config::create(dir.path(), None).await.unwrap();
        assert_eq!(config.currency(), "CHF");
    }

    #[tokio::test]
    async fn test_config_load_missing_home() {
        let dir = TempDir::new().unwrap();
        let result = Config::load(dir.path().join("nope")).await;
        assert!(result.unwrap_err().to_string().contains("expenses init"));
    }

    #[tokio::test]
    async fn test_config_file_load_with_minimal_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_JSON);
        utils::write(&path, r#"{"app_name": "expenses", "config_version": 1}"#)
            .await
            .unwrap();
        let config = ConfigFile::load(&path).await.unwrap();
        assert_eq!(config.currency, "CHF");
        assert_eq!(
            config.resolve_store_dir(dir.path()),
            dir.path().join(STORE)
        );
    }

    #[tokio::test]
    async fn test_config_file_load_invalid_app_name() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_JSON);
        utils::write(&path, r#"{"app_name": "ledger", "config_version": 1}"#)
            .await
            .unwrap();
        let result = ConfigFile::load(&path).await;
        assert!(result.unwrap_err().to_string().contains("Invalid app_name"));
    }

    #[test]
    fn test_config_file_serialization_omits_none_fields() {
        let json = serde_json::to_string(&ConfigFile::default()).unwrap();
        assert!(!json.contains("store_dir"));
    }

    #[test]
    fn test_resolve_store_dir() {
        let root = Path::new("/home/me/expenses");
        let relative = ConfigFile {
            store_dir: Some(PathBuf::from("data")),
            ..ConfigFile::default()
        };
        assert_eq!(relative.resolve_store_dir(root), root.join("data"));
        let absolute = ConfigFile {
            store_dir: Some(PathBuf::from("/var/expenses")),
            ..ConfigFile::default()
        };
        assert_eq!(
            absolute.resolve_store_dir(root),
            PathBuf::from("/var/expenses")
        );
    }
}
