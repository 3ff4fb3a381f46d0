use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// User entry for the built-in PAP policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub password: String,
}

/// Engine configuration, loaded from a JSON file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Address to bind the UDP listener to
    #[serde(default = "default_listen_address")]
    pub listen_address: String,
    /// Port to bind (1812 auth / 1813 acct share one listener here)
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,
    /// Shared secret for all peers of this listener
    pub secret: String,
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default)]
    pub log_level: Option<String>,
    /// Optional vendor dictionary file
    #[serde(default)]
    pub vendor_dictionary: Option<PathBuf>,
    /// Users accepted by the built-in PAP policy
    #[serde(default)]
    pub users: Vec<User>,
}

fn default_listen_address() -> String {
    "0.0.0.0".to_string()
}

fn default_listen_port() -> u16 {
    1812
}

impl Default for Config {
    fn default() -> Self {
        Config {
            listen_address: default_listen_address(),
            listen_port: default_listen_port(),
            secret: String::new(),
            log_level: None,
            vendor_dictionary: None,
            users: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Write configuration to a JSON file
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Example configuration written when no config file exists yet
    pub fn example() -> Self {
        Config {
            listen_address: "0.0.0.0".to_string(),
            listen_port: 1812,
            secret: "changeme".to_string(),
            log_level: Some("info".to_string()),
            vendor_dictionary: None,
            users: vec![User {
                username: "testuser".to_string(),
                password: "testpass".to_string(),
            }],
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.is_empty() {
            return Err(ConfigError::Invalid(
                "shared secret must not be empty".to_string(),
            ));
        }
        self.socket_addr()?;
        Ok(())
    }

    /// Resolve the configured listen address and port
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.listen_address, self.listen_port)
            .parse()
            .map_err(|e| {
                ConfigError::Invalid(format!(
                    "invalid listen address {}:{}: {}",
                    self.listen_address, self.listen_port, e
                ))
            })
    }
}
