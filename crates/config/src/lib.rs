//! Layered configuration for the IRVE registry.
//!
//! Values are merged, last one wins, from:
//! 1. built-in defaults,
//! 2. a configuration file (TOML, YAML or JSON, by extension),
//! 3. environment variables prefixed with `IRVE_`, nested keys separated by
//!    `__` (for example `IRVE_IMPORT__CHUNK_SIZE=500`).

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const ENV_PREFIX: &str = "IRVE_";
const DATABASE_FILENAME: &str = "irve.sqlite3";
const CONFIG_FILENAME: &str = "config.toml";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("fr", "irve", "irve")
}

/// Where the configuration file is looked for when none is given.
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

fn default_database_path() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().join(DATABASE_FILENAME))
        .unwrap_or_else(|| PathBuf::from(DATABASE_FILENAME))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub import: ImportConfig,
    /// A `tracing` filter directive, used when `RUST_LOG` is not set.
    pub log: String,
}
impl Default for Config {
    fn default() -> Self {
        Self { database: DatabaseConfig::default(), import: ImportConfig::default(), log: "info".to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub max_connections: u32,
}
impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: default_database_path(), max_connections: 5 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Rows per bulk upsert statement.
    pub chunk_size: usize,
    /// Largest list submitted to the batch normalizer at once.
    pub batch_max_size: usize,
}
impl Default for ImportConfig {
    fn default() -> Self {
        Self { chunk_size: 1000, batch_max_size: 1000 }
    }
}

impl Config {
    /// Load and validate the configuration.
    ///
    /// An explicit `path` must exist. Without one, the default location is
    /// used if a file is there.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) if !path.is_file() => exn::bail!(ErrorKind::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => default_config_path().filter(|path| path.is_file()),
        };
        Self::from_figment(Self::figment(file.as_deref())?.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Defaults layered with the given file, without the environment.
    fn figment(file: Option<&Path>) -> Result<Figment> {
        let figment = Figment::from(Serialized::defaults(Config::default()));
        let Some(file) = file else {
            return Ok(figment);
        };
        debug!(path = %file.display(), "loading configuration file");
        let extension = file.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
        Ok(match extension.as_deref() {
            Some("toml") => figment.merge(Toml::file_exact(file)),
            Some("yaml" | "yml") => figment.merge(Yaml::file_exact(file)),
            Some("json") => figment.merge(Json::file_exact(file)),
            _ => exn::bail!(ErrorKind::UnsupportedFormat(file.to_path_buf())),
        })
    }

    fn from_figment(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.database.max_connections == 0 {
            exn::bail!(ErrorKind::Invalid { field: "database.max_connections", reason: "must be at least 1" });
        }
        if self.import.chunk_size == 0 {
            exn::bail!(ErrorKind::Invalid { field: "import.chunk_size", reason: "must be at least 1" });
        }
        if self.import.batch_max_size < 2 {
            exn::bail!(ErrorKind::Invalid { field: "import.batch_max_size", reason: "must be at least 2" });
        }
        Ok(())
    }
}
