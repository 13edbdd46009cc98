use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use pokedex_core::DEFAULT_CAPACITY;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub progress: ProgressConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_path")]
    pub path: PathBuf,
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
            capacity: default_capacity(),
        }
    }
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("pokemon_data.csv")
}
fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProgressConfig {
    #[serde(default = "default_progress_path")]
    pub path: PathBuf,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            path: default_progress_path(),
        }
    }
}

fn default_progress_path() -> PathBuf {
    PathBuf::from("user_progress.dat")
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// HTML page served at `/` and `/index.html`.
    #[serde(default = "default_page")]
    pub page: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            page: default_page(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}
fn default_page() -> Option<PathBuf> {
    Some(PathBuf::from("pokedex.html"))
}

#[derive(Debug, Deserialize, Clone)]
pub struct FetchConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://pokeapi.co/api/v2".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if !(1..=u16::MAX as usize).contains(&config.catalog.capacity) {
        anyhow::bail!("catalog.capacity must be in 1..={}", u16::MAX);
    }

    if config.server.bind.trim().is_empty() {
        anyhow::bail!("server.bind must not be empty");
    }

    if config.fetch.timeout_secs == 0 {
        anyhow::bail!("fetch.timeout_secs must be > 0");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.catalog.capacity, 151);
        assert_eq!(config.catalog.path, PathBuf::from("pokemon_data.csv"));
        assert_eq!(config.progress.path, PathBuf::from("user_progress.dat"));
        assert_eq!(config.server.bind, "127.0.0.1:8080");
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_sections_override_defaults() {
        let config: Config = toml::from_str(
            r#"
[catalog]
path = "data/kanto.csv"
capacity = 3

[server]
bind = "0.0.0.0:9000"
page = "web/index.html"
"#,
        )
        .unwrap();
        assert_eq!(config.catalog.capacity, 3);
        assert_eq!(config.catalog.path, PathBuf::from("data/kanto.csv"));
        assert_eq!(config.server.page, Some(PathBuf::from("web/index.html")));
        assert_eq!(config.fetch.timeout_secs, 30);
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let config: Config = toml::from_str("[catalog]\ncapacity = 0\n").unwrap();
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("catalog.capacity"));
    }

    #[test]
    fn test_rejects_empty_bind() {
        let config: Config = toml::from_str("[server]\nbind = \"  \"\n").unwrap();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config(Path::new("/nonexistent/dex.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
