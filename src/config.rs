//! Host configuration - the read-only value source for the plan
//!
//! A groundwork config is a small TOML file:
//!
//! ```toml
//! [user]
//! name = "valhalla"
//! home = "/home/valhalla"
//!
//! basedir = "/srv/valhalla"
//! ```
//!
//! Loaded once per run and read-only thereafter; the reconciler never
//! mutates it.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config key missing: {0}")]
    KeyMissing(String),

    #[error("config key '{0}' is not a string")]
    NotAString(String),
}

/// Immutable key-value source backing resource declarations
#[derive(Debug, Clone)]
pub struct NodeConfig {
    value: toml::Value,
}

impl NodeConfig {
    /// Load the config, preferring an explicit path over the defaults
    ///
    /// Search order: `--config PATH`, then `/etc/groundwork.toml`, then
    /// `~/.config/groundwork/config.toml`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => default_config_path()?,
        };

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Could not read config file: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Parse a config from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let value: toml::Value = toml::from_str(content).context("Invalid TOML")?;
        Ok(Self { value })
    }

    /// Resolve a dotted key (e.g. "user.name") to a string value
    pub fn resolve(&self, key: &str) -> Result<&str, ConfigError> {
        let mut node = &self.value;
        for part in key.split('.') {
            node = node
                .get(part)
                .ok_or_else(|| ConfigError::KeyMissing(key.to_string()))?;
        }
        node.as_str()
            .ok_or_else(|| ConfigError::NotAString(key.to_string()))
    }

    /// Name of the account the host is provisioned for
    pub fn user_name(&self) -> Result<&str, ConfigError> {
        self.resolve("user.name")
    }

    /// Home directory of that account, tilde-expanded
    pub fn user_home(&self) -> Result<PathBuf, ConfigError> {
        let raw = self.resolve("user.home")?;
        Ok(PathBuf::from(shellexpand::tilde(raw).as_ref()))
    }

    /// Directory that holds checkouts, tilde-expanded
    pub fn basedir(&self) -> Result<PathBuf, ConfigError> {
        let raw = self.resolve("basedir")?;
        Ok(PathBuf::from(shellexpand::tilde(raw).as_ref()))
    }
}

/// First default config path that exists
fn default_config_path() -> Result<PathBuf> {
    let system = PathBuf::from("/etc/groundwork.toml");
    if system.exists() {
        return Ok(system);
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    let user = home.join(".config").join("groundwork").join("config.toml");
    if user.exists() {
        return Ok(user);
    }

    anyhow::bail!(
        "No config found: pass --config or create {} or {}",
        system.display(),
        user.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = r#"
        basedir = "/srv/valhalla"

        [user]
        name = "valhalla"
        home = "/home/valhalla"
    "#;

    #[test]
    fn resolves_dotted_keys() {
        let config = NodeConfig::parse(EXAMPLE).unwrap();
        assert_eq!(config.resolve("user.name").unwrap(), "valhalla");
        assert_eq!(config.resolve("basedir").unwrap(), "/srv/valhalla");
    }

    #[test]
    fn missing_key_is_an_error() {
        let config = NodeConfig::parse(EXAMPLE).unwrap();
        let err = config.resolve("user.shell").unwrap_err();
        assert!(matches!(err, ConfigError::KeyMissing(_)));
        assert!(err.to_string().contains("user.shell"));
    }

    #[test]
    fn non_string_value_is_an_error() {
        let config = NodeConfig::parse("count = 3").unwrap();
        assert!(matches!(
            config.resolve("count"),
            Err(ConfigError::NotAString(_))
        ));
    }

    #[test]
    fn typed_accessors_expand_tilde() {
        let config = NodeConfig::parse(
            r#"
            basedir = "~/checkouts"

            [user]
            name = "builder"
            home = "/home/builder"
        "#,
        )
        .unwrap();

        assert_eq!(config.user_name().unwrap(), "builder");
        assert_eq!(config.user_home().unwrap(), PathBuf::from("/home/builder"));
        assert!(!config.basedir().unwrap().to_string_lossy().contains('~'));
    }
}
