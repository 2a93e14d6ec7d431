use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::query::SortOption;

pub const DEFAULT_PLACEHOLDER_URL: &str =
    "https://images.unsplash.com/photo-1633332755192-727a05c4013d?w=200&h=200&fit=crop&crop=face";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub avatar: AvatarConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("./data/gravibook-contacts.json")
}

#[derive(Debug, Deserialize, Clone)]
pub struct AvatarConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_gravatar_url")]
    pub gravatar_url: String,
    #[serde(default = "default_random_user_url")]
    pub random_user_url: String,
    #[serde(default = "default_placeholder_url")]
    pub placeholder_url: String,
    #[serde(default = "default_size")]
    pub size: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            gravatar_url: default_gravatar_url(),
            random_user_url: default_random_user_url(),
            placeholder_url: default_placeholder_url(),
            size: default_size(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_gravatar_url() -> String {
    "https://www.gravatar.com".to_string()
}
fn default_random_user_url() -> String {
    "https://randomuser.me".to_string()
}
fn default_placeholder_url() -> String {
    DEFAULT_PLACEHOLDER_URL.to_string()
}
fn default_size() -> u32 {
    200
}
fn default_timeout_secs() -> u64 {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct DisplayConfig {
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default)]
    pub sort: SortOption,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            sort: SortOption::default(),
        }
    }
}

fn default_locale() -> String {
    "pl".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExportConfig {
    #[serde(default = "default_product")]
    pub product: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            product: default_product(),
        }
    }
}

fn default_product() -> String {
    "gravibook".to_string()
}

impl Config {
    /// Built-in defaults, used when no config file exists.
    pub fn minimal() -> Self {
        Self::default()
    }
}

/// Load and validate a config file. A missing file yields [`Config::minimal`].
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::minimal());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.avatar.timeout_secs == 0 {
        anyhow::bail!("avatar.timeout_secs must be > 0");
    }

    if !(1..=2048).contains(&config.avatar.size) {
        anyhow::bail!("avatar.size must be in [1, 2048]");
    }

    if config.avatar.placeholder_url.trim().is_empty() {
        anyhow::bail!("avatar.placeholder_url must not be empty");
    }

    if config.export.product.trim().is_empty() {
        anyhow::bail!("export.product must not be empty");
    }

    if config.display.locale.parse::<icu::locid::Locale>().is_err() {
        anyhow::bail!(
            "display.locale '{}' is not a valid BCP-47 locale",
            config.display.locale
        );
    }

    Ok(())
}

/// Example config written by `gravibook init`.
pub const EXAMPLE_CONFIG: &str = include_str!("../config/gravibook.example.toml");

/// Write [`EXAMPLE_CONFIG`] to `path` unless a file is already there.
pub fn write_example_config(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, EXAMPLE_CONFIG)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(tmp: &TempDir, body: &str) -> PathBuf {
        let path = tmp.path().join("gravibook.toml");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let cfg = load_config(&tmp.path().join("nope.toml")).unwrap();
        assert!(cfg.avatar.enabled);
        assert_eq!(cfg.export.product, "gravibook");
        assert_eq!(cfg.display.sort, SortOption::NameAsc);
    }

    #[test]
    fn test_example_config_parses() {
        let tmp = TempDir::new().unwrap();
        let path = write(&tmp, EXAMPLE_CONFIG);
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.avatar.size, 200);
        assert_eq!(cfg.display.locale, "pl");
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = write(&tmp, "[display]\nsort = \"created-desc\"\n");
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.display.sort, SortOption::CreatedDesc);
        assert_eq!(cfg.avatar.timeout_secs, 5);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = write(&tmp, "[avatar]\ntimeout_secs = 0\n");
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn test_bad_sort_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = write(&tmp, "[display]\nsort = \"random\"\n");
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_write_example_config_does_not_overwrite() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config/gravibook.toml");
        assert!(write_example_config(&path).unwrap());
        std::fs::write(&path, "# mine").unwrap();
        assert!(!write_example_config(&path).unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# mine");
    }
}
