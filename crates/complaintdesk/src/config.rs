//! Configuration management for complaintdesk.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::net::SocketAddr;
use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "complaintdesk";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "complaints.db";

/// Prefix for environment variable overrides.
const ENV_PREFIX: &str = "COMPLAINTDESK_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `COMPLAINTDESK_`, sections
///    separated by `__`, e.g. `COMPLAINTDESK_SERVER__BIND`)
/// 2. TOML config file at `~/.config/complaintdesk/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration.
    pub server: ServerConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Branding shown on every page.
    pub site: SiteConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the server listens on.
    pub bind: String,
    /// Public URL of the complaint form; the QR code page defaults to it.
    pub public_url: String,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/complaintdesk/complaints.db`
    pub database_path: Option<PathBuf>,
    /// Create the complaints table when the server starts.
    pub provision_on_startup: bool,
    /// Let the admin page create the complaints table.
    /// When false, operators must run the setup SQL by hand.
    pub allow_provisioning: bool,
}

/// Branding configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Name of the residential community.
    pub community_name: String,
    /// Organization managing the community.
    pub organization: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
            public_url: "http://localhost:8080".to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None, // Will be resolved to default at runtime
            provision_on_startup: false,
            allow_provisioning: true,
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            community_name: "The Heritage".to_string(),
            organization: "KBK Enterprises".to_string(),
        }
    }
}

impl Config {
    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);
        Self::from_figment(Self::figment(&config_file))
    }

    /// The provider stack used by [`Config::load_from`].
    #[must_use]
    pub fn figment(config_file: &std::path::Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Extract and validate a configuration from a figment.
    ///
    /// # Errors
    ///
    /// Returns an error if extraction or validation fails.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        self.bind_addr()?;

        if self.server.public_url.trim().is_empty() {
            return Err(Error::config_validation("server.public_url must not be empty"));
        }

        if self.site.community_name.trim().is_empty() {
            return Err(Error::config_validation("site.community_name must not be empty"));
        }

        Ok(())
    }

    /// Parse the server bind address.
    ///
    /// # Errors
    ///
    /// Returns an error if `server.bind` is not a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.server.bind.parse().map_err(|_| {
            Error::config_validation(format!(
                "server.bind is not a socket address: {}",
                self.server.bind
            ))
        })
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.bind, "127.0.0.1:8080");
        assert!(!config.storage.provision_on_startup);
        assert!(config.storage.allow_provisioning);
        assert_eq!(config.site.community_name, "The Heritage");
    }

    #[test]
    fn test_default_storage_config() {
        let storage = StorageConfig::default();

        assert!(storage.database_path.is_none());
        assert!(!storage.provision_on_startup);
        assert!(storage.allow_provisioning);
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_bad_bind() {
        let mut config = Config::default();
        config.server.bind = "localhost".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("server.bind"));
    }

    #[test]
    fn test_validate_empty_public_url() {
        let mut config = Config::default();
        config.server.public_url = "  ".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("public_url"));
    }

    #[test]
    fn test_validate_empty_community_name() {
        let mut config = Config::default();
        config.site.community_name = String::new();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("community_name"));
    }

    #[test]
    fn test_bind_addr() {
        let config = Config::default();
        let addr = config.bind_addr().unwrap();
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn test_database_path_default() {
        let config = Config::default();
        let path = config.database_path();

        assert!(path.to_string_lossy().contains("complaints.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/db.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/db.sqlite")
        );
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("complaintdesk"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        // Loading from a nonexistent path should work (uses defaults)
        let result = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml")));
        assert!(result.is_ok());
    }

    #[test]
    fn test_load_from_toml_and_env() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [server]
                bind = "0.0.0.0:9000"

                [site]
                community_name = "Maple Court"
                "#,
            )?;
            jail.set_env("COMPLAINTDESK_STORAGE__PROVISION_ON_STARTUP", "true");
            jail.set_env("COMPLAINTDESK_SERVER__PUBLIC_URL", "https://complaints.example.org");

            let config = Config::from_figment(Config::figment(std::path::Path::new("config.toml")))
                .map_err(|e| e.to_string())?;
            assert_eq!(config.server.bind, "0.0.0.0:9000");
            assert_eq!(config.server.public_url, "https://complaints.example.org");
            assert_eq!(config.site.community_name, "Maple Court");
            assert_eq!(config.site.organization, "KBK Enterprises");
            assert!(config.storage.provision_on_startup);
            Ok(())
        });
    }

    #[test]
    fn test_load_invalid_toml_value() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[server]\nbind = \"nope\"\n")?;
            let result = Config::from_figment(Config::figment(std::path::Path::new("config.toml")));
            assert!(result.is_err());
            Ok(())
        });
    }

    #[test]
    fn test_storage_config_deserialize() {
        let json = r#"{"database_path": "/tmp/c.db", "allow_provisioning": false}"#;
        let storage: StorageConfig = serde_json::from_str(json).unwrap();
        assert_eq!(storage.database_path, Some(PathBuf::from("/tmp/c.db")));
        assert!(!storage.allow_provisioning);
        assert!(!storage.provision_on_startup);
    }

    #[test]
    fn test_config_serialize() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(json.contains("community_name"));
        assert!(json.contains("public_url"));
    }
}
