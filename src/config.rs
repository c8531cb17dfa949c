//! Configuration loading.
//!
//! Settings come from `sqlweave.toml` in the working directory, falling back
//! to `<config dir>/sqlweave/config.toml`. Environment variables override
//! file values.
//!
//! ```toml
//! [database]
//! url = "mysql://root@localhost/fitness"
//! dialect = "mysql"
//!
//! [compiler]
//! identity = "Id"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::dialect::Dialect;
use crate::error::{MapperError, MapperResult};

pub const LOCAL_CONFIG: &str = "sqlweave.toml";
pub const ENV_DATABASE_URL: &str = "SQLWEAVE_DATABASE_URL";
pub const ENV_DIALECT: &str = "SQLWEAVE_DIALECT";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub compiler: CompilerConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    /// Explicit dialect; otherwise inferred from the URL scheme.
    pub dialect: Option<Dialect>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Identity field used for inserts when none is given.
    pub identity: Option<String>,
}

impl Config {
    /// Load from the first config file found, then apply the environment.
    pub fn load() -> MapperResult<Self> {
        let config = match Self::locate() {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn from_file(path: &Path) -> MapperResult<Self> {
        tracing::debug!("Loading config from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> MapperResult<Self> {
        Ok(toml::from_str(content)?)
    }

    fn locate() -> Option<PathBuf> {
        let local = PathBuf::from(LOCAL_CONFIG);
        if local.exists() {
            return Some(local);
        }
        dirs::config_dir()
            .map(|dir| dir.join("sqlweave").join("config.toml"))
            .filter(|path| path.exists())
    }

    /// Apply overrides read through `lookup`.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> MapperResult<Self> {
        if let Some(url) = lookup(ENV_DATABASE_URL) {
            self.database.url = Some(url);
        }
        if let Some(dialect) = lookup(ENV_DIALECT) {
            self.database.dialect = Some(dialect.parse().map_err(|_| {
                MapperError::Config(format!("{ENV_DIALECT} has unknown dialect '{dialect}'"))
            })?);
        }
        Ok(self)
    }

    /// Configured dialect, else the URL's, else the default.
    pub fn dialect(&self) -> Dialect {
        self.database
            .dialect
            .or_else(|| self.database.url.as_deref().map(Dialect::from_url))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let config = Config::from_toml(
            r#"
            [database]
            url = "mysql://root@localhost/fitness"

            [compiler]
            identity = "Id"
            "#,
        )
        .unwrap();
        assert_eq!(config.dialect(), Dialect::MySql);
        assert_eq!(config.compiler.identity.as_deref(), Some("Id"));
    }

    #[test]
    fn test_explicit_dialect_wins() {
        let config = Config::from_toml("[database]\nurl = \"mysql://x\"\ndialect = \"oracle\"\n").unwrap();
        assert_eq!(config.dialect(), Dialect::Oracle);
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::default()
            .with_overrides(|key| match key {
                ENV_DATABASE_URL => Some("sqlite::memory:".to_string()),
                ENV_DIALECT => Some("mssql".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.database.url.as_deref(), Some("sqlite::memory:"));
        assert_eq!(config.dialect(), Dialect::MsSql);

        let bad = Config::default().with_overrides(|key| (key == ENV_DIALECT).then(|| "db2".to_string()));
        assert!(matches!(bad, Err(MapperError::Config(_))));
    }

    #[test]
    fn test_empty_config() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.dialect(), Dialect::Default);
    }
}
