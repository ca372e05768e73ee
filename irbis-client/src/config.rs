//! Client configuration.
//!
//! Configuration is loaded in the following order (later overrides earlier):
//! 1. Default values
//! 2. YAML config file (if specified via IRBIS_CONFIG or --config)
//! 3. Environment variables
//! 4. Connection string (IRBIS_CONNECTION_STRING or --connection-string)

use crate::connection::{ConnectionConfig, DEFAULT_READ_BUFFER_SIZE};
use irbis_protocol::{Session, Workstation, DEFAULT_DATABASE, DEFAULT_HOST, DEFAULT_PORT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Server address and credentials.
    pub connection: ConnectionSection,
    /// Socket settings.
    pub network: NetworkSection,
}

impl ClientConfig {
    /// Loads configuration from file, then applies environment variable
    /// overrides and the connection string.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("IRBIS_CONFIG").ok().map(PathBuf::from);
        let mut config = Self::load_from(path.as_deref())?;

        if let Ok(text) = std::env::var("IRBIS_CONNECTION_STRING") {
            config.apply_connection_string(&text);
        }

        Ok(config)
    }

    /// Defaults, then the file if given, then environment variables.
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;
        let config: ClientConfig = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;
        Ok(config)
    }

    /// Loads configuration from environment variables only.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        self.connection.apply_overrides(&var);
        self.network.apply_overrides(&var);
    }

    /// Applies `key=value;` pairs on top of the connection section.
    pub fn apply_connection_string(&mut self, text: &str) {
        let mut session = self.to_session();
        session.apply_connection_string(text);
        self.connection = ConnectionSection {
            host: session.host,
            port: session.port,
            username: session.username,
            password: session.password,
            database: session.database,
            workstation: session.workstation,
        };
    }

    /// Saves configuration to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = serde_yaml::to_string(self)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;
        std::fs::write(path, content).map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;
        Ok(())
    }

    /// Session parameters; ids start at zero.
    pub fn to_session(&self) -> Session {
        let c = &self.connection;
        Session {
            host: c.host.clone(),
            port: c.port,
            username: c.username.clone(),
            password: c.password.clone(),
            database: c.database.clone(),
            workstation: c.workstation,
            ..Session::default()
        }
    }

    pub fn connection_config(&self) -> ConnectionConfig {
        ConnectionConfig::new()
            .with_connect_timeout(self.network.connect_timeout())
            .with_read_timeout(self.network.read_timeout())
            .with_read_buffer_size(self.network.read_buffer_size)
    }
}

/// Server address and credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSection {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
    pub workstation: Workstation,
}

impl Default for ConnectionSection {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            username: String::new(),
            password: String::new(),
            database: DEFAULT_DATABASE.to_string(),
            workstation: Workstation::default(),
        }
    }
}

impl ConnectionSection {
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(host) = var("IRBIS_HOST") {
            self.host = host;
        }

        if let Some(port) = var("IRBIS_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                if port > 0 {
                    self.port = port;
                }
            }
        }

        if let Some(username) = var("IRBIS_USER") {
            self.username = username;
        }

        if let Some(password) = var("IRBIS_PASSWORD") {
            self.password = password;
        }

        if let Some(database) = var("IRBIS_DATABASE") {
            self.database = database;
        }

        if let Some(code) = var("IRBIS_WORKSTATION") {
            if let Some(workstation) = Workstation::parse(&code) {
                self.workstation = workstation;
            }
        }
    }
}

/// Socket settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSection {
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Request/response timeout in seconds.
    pub read_timeout_secs: u64,
    /// Socket read chunk size in bytes.
    pub read_buffer_size: usize,
}

impl Default for NetworkSection {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            read_timeout_secs: 30,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
        }
    }
}

impl NetworkSection {
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(timeout) = var("IRBIS_CONNECT_TIMEOUT") {
            if let Ok(secs) = timeout.parse() {
                self.connect_timeout_secs = secs;
            }
        }

        if let Some(timeout) = var("IRBIS_READ_TIMEOUT") {
            if let Ok(secs) = timeout.parse() {
                self.read_timeout_secs = secs;
            }
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }
}

/// Configuration loading error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {1}", path = .0.display())]
    IoError(PathBuf, std::io::Error),

    #[error("failed to parse config file '{path}': {1}", path = .0.display())]
    ParseError(PathBuf, String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.connection.host, "127.0.0.1");
        assert_eq!(config.connection.port, 6666);
        assert_eq!(config.connection.database, "IBIS");
        assert_eq!(config.connection.workstation, Workstation::Cataloger);
        assert_eq!(config.network.connect_timeout(), Duration::from_secs(10));
        assert_eq!(config.network.read_timeout(), Duration::from_secs(30));
        assert_eq!(config.network.read_buffer_size, DEFAULT_READ_BUFFER_SIZE);
    }

    #[test]
    fn test_yaml_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("irbis.yaml");

        let mut config = ClientConfig::default();
        config.connection.username = "librarian".to_string();
        config.connection.workstation = Workstation::Reader;
        config.network.read_timeout_secs = 5;
        config.save(&path).unwrap();

        let loaded = ClientConfig::from_file(&path).unwrap();
        assert_eq!(loaded.connection.username, "librarian");
        assert_eq!(loaded.connection.workstation, Workstation::Reader);
        assert_eq!(loaded.network.read_timeout_secs, 5);
    }

    #[test]
    fn test_partial_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(
            &mut file,
            b"connection:\n  host: irbis.local\n  workstation: A\n",
        )
        .unwrap();

        let config = ClientConfig::from_file(file.path()).unwrap();
        assert_eq!(config.connection.host, "irbis.local");
        assert_eq!(config.connection.port, 6666);
        assert_eq!(config.connection.workstation, Workstation::Administrator);
        assert_eq!(config.network.connect_timeout_secs, 10);
    }

    #[test]
    fn test_file_errors() {
        let err = ClientConfig::from_file("/nonexistent/irbis.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::IoError(..)));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"connection: [unclosed").unwrap();
        let err = ClientConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(..)));
        assert!(err.to_string().contains("failed to parse"));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("IRBIS_HOST", "10.0.0.5"),
            ("IRBIS_PORT", "not-a-port"),
            ("IRBIS_USER", "admin"),
            ("IRBIS_WORKSTATION", "R"),
            ("IRBIS_READ_TIMEOUT", "7"),
        ]
        .into_iter()
        .collect();

        let mut config = ClientConfig::default();
        config.apply_overrides(|name| vars.get(name).map(|v| v.to_string()));
        assert_eq!(config.connection.host, "10.0.0.5");
        assert_eq!(config.connection.port, 6666);
        assert_eq!(config.connection.username, "admin");
        assert_eq!(config.connection.workstation, Workstation::Reader);
        assert_eq!(config.network.read_timeout_secs, 7);
    }

    #[test]
    fn test_connection_string_wins() {
        let mut config = ClientConfig::default();
        config.connection.host = "from-file".to_string();
        config.apply_connection_string("server=from-string;user=u;pwd=p;catalog=RDR;");

        let session = config.to_session();
        assert_eq!(session.host, "from-string");
        assert_eq!(session.username, "u");
        assert_eq!(session.password, "p");
        assert_eq!(session.database, "RDR");
        assert_eq!(session.client_id, 0);
    }

    #[test]
    fn test_connection_config() {
        let mut config = ClientConfig::default();
        config.network.read_buffer_size = 16;
        let connection = config.connection_config();
        assert_eq!(connection.read_buffer_size, crate::connection::MIN_READ_BUFFER_SIZE);
        assert_eq!(connection.read_timeout, Duration::from_secs(30));
    }
}
