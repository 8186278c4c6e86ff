//! Optional TOML configuration shared by the binaries.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::CatalogSource;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub activities: ActivitiesConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CatalogConfig {
    pub path: Option<PathBuf>,
    pub url: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ActivitiesConfig {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0:3000".to_string()
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config file")?;
        Ok(config)
    }
}

impl CatalogConfig {
    /// Resolve the catalogue source; exactly one of `path` and `url` must be set
    pub fn source(&self) -> Result<CatalogSource> {
        match (&self.path, &self.url) {
            (Some(path), None) => Ok(CatalogSource::File(path.clone())),
            (None, Some(url)) => Ok(CatalogSource::Url(url.clone())),
            (Some(_), Some(_)) => bail!("catalog.path and catalog.url are mutually exclusive"),
            (None, None) => bail!("no catalogue configured (set catalog.path or catalog.url)"),
        }
    }
}
