use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    pub directory: PathBuf,
    pub file_prefix: String,
    pub level: String,
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }

    pub fn load_or_create() -> Result<Self, ConfigError> {
        Self::load_or_create_at(&Self::config_path())
    }

    pub fn load_or_create_at(config_path: &Path) -> Result<Self, ConfigError> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            Self::from_toml(&content)
        } else {
            let config = Self::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ts-calendar")
    }

    pub fn save_to(&self, config_path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ts-calendar");

        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3500,
            },
            database: DatabaseConfig {
                path: data_dir.join("calendar.db"),
            },
            logging: LoggingConfig {
                directory: Self::config_dir(),
                file_prefix: "ts-calendar.log".to_string(),
                level: "info".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_listens_on_port_3500() {
        let config = Config::default();
        assert_eq!(config.server.port, 3500);
        assert_eq!(config.bind_address(), "127.0.0.1:3500");
    }

    #[test]
    fn default_config_logs_at_info() {
        let config = Config::default();
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn default_database_lives_in_data_dir() {
        let config = Config::default();
        assert!(config.database.path.ends_with("ts-calendar/calendar.db"));
    }

    #[test]
    fn parse_valid_toml_config() {
        let toml_content = r#"
            [server]
            host = "0.0.0.0"
            port = 8080

            [database]
            path = "/tmp/calendar.db"

            [logging]
            directory = "/tmp/logs"
            file_prefix = "calendar.log"
            level = "debug"
        "#;

        let config = Config::from_toml(toml_content).unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.path, PathBuf::from("/tmp/calendar.db"));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn parse_invalid_toml_returns_error() {
        let invalid_toml = "this is not valid toml";
        let result = Config::from_toml(invalid_toml);
        assert!(result.is_err());
    }

    #[test]
    fn load_or_create_writes_defaults_then_reads_them_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let created = Config::load_or_create_at(&path).unwrap();
        assert!(path.exists());

        let loaded = Config::load_or_create_at(&path).unwrap();
        assert_eq!(created, loaded);
    }
}
