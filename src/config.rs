//! Optional `inventory.toml` settings

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Database file used when neither the command line nor the config names one
pub const DEFAULT_DATABASE: &str = "assetInventory.db";

/// Config file looked up in the working directory
pub const CONFIG_FILE: &str = "inventory.toml";

/// Settings read from `inventory.toml`. Every key is optional.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct InventoryConfig {
    /// Database file, relative to the working directory
    pub database: Option<String>,
}

impl InventoryConfig {
    /// Config pointing at one database file
    pub fn for_database(database: &Path) -> Self {
        Self {
            database: Some(database.display().to_string()),
        }
    }

    /// Read the config at `path`, or `inventory.toml` when no path is given.
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = path.unwrap_or(Path::new(CONFIG_FILE));
        if !path.exists() {
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    /// Write the config to `path`. An existing file is kept unless `overwrite` is set.
    pub fn save(&self, path: &Path, overwrite: bool) -> anyhow::Result<()> {
        if path.exists() && !overwrite {
            anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
        }

        std::fs::write(path, toml::to_string_pretty(self)?)
            .with_context(|| format!("failed to write config {}", path.display()))
    }

    /// Database to open: `explicit` (flag or env) wins, then this config, then the default.
    /// Missing parent directories are created.
    pub fn database_path(&self, explicit: Option<&Path>) -> anyhow::Result<PathBuf> {
        let path = match (explicit, &self.database) {
            (Some(path), _) => path.to_path_buf(),
            (None, Some(configured)) => PathBuf::from(configured),
            (None, None) => PathBuf::from(DEFAULT_DATABASE),
        };

        match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() && !dir.exists() => {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("failed to create {}", dir.display()))?;
            }
            _ => {}
        }
        Ok(path)
    }
}
