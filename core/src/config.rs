//! Configuration management

use crate::utils::string::matches_mask;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Server configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server information
    pub server: ServerConfig,
    /// Listener and runtime settings
    pub connection: ConnectionConfig,
    /// Protocol limits
    pub limits: LimitsConfig,
    /// Operator blocks
    pub operators: Vec<OperatorConfig>,
    /// Logging settings
    pub logging: LoggingConfig,
}

/// Server-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server name
    pub name: String,
    /// Server description
    pub description: String,
    /// Server version
    pub version: String,
    /// Network name
    pub network: String,
}

/// How connections are scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IoMode {
    /// Multi-threaded runtime
    Thread,
    /// Single-threaded event loop
    Event,
}

/// Connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Bind address
    pub bind_address: String,
    /// Ports to listen on
    pub ports: Vec<u16>,
    /// Runtime flavour
    pub io_mode: IoMode,
    /// Longest accepted inbound line, excluding CRLF
    pub max_line_length: usize,
}

/// Protocol limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Targets per PRIVMSG/NOTICE/USERIP invocation
    pub max_targets: usize,
    /// Users kicked per KICK invocation
    pub max_kicks: usize,
    /// Longest kick reason
    pub kick_length: usize,
    /// Longest nickname
    pub nick_length: usize,
}

/// Operator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorConfig {
    /// Name given to OPER
    pub name: String,
    /// Operator password (SHA256 hashed)
    pub password_hash: String,
    /// Operator hostmask (ident@host pattern)
    pub hostmask: String,
    /// Grants administrator status as well
    #[serde(default)]
    pub admin: bool,
}

impl OperatorConfig {
    /// Create a new operator configuration
    pub fn new(name: &str, password: &str, hostmask: &str, admin: bool) -> Self {
        Self {
            name: name.to_string(),
            password_hash: PasswordHasher::hash_password(password),
            hostmask: hostmask.to_string(),
            admin,
        }
    }

    /// Verify password
    pub fn verify_password(&self, password: &str) -> bool {
        PasswordHasher::verify_password(password, &self.password_hash)
    }

    /// Check if `ident@host` matches this operator's hostmask
    pub fn matches_hostmask(&self, ident: &str, host: &str) -> bool {
        matches_mask(&self.hostmask, &format!("{}@{}", ident, host))
    }
}

/// Password hashing utilities
pub struct PasswordHasher;

impl PasswordHasher {
    /// Hash a password using SHA256
    pub fn hash_password(password: &str) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(password.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Verify a password against its hash
    pub fn verify_password(password: &str, hash: &str) -> bool {
        Self::hash_password(password).eq_ignore_ascii_case(hash)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Maximum level: trace, debug, info, warn or error
    pub level: String,
    /// Emit audit events for privileged actions
    pub audit: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "irc.example.org".to_string(),
            description: "ferrircd server".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            network: "ExampleNet".to_string(),
        }
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            ports: vec![6667],
            io_mode: IoMode::Thread,
            max_line_length: 510,
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_targets: 4,
            max_kicks: 6,
            kick_length: 160,
            nick_length: 32,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            audit: true,
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))
    }

    /// Save configuration to file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_toml()?)
            .map_err(|e| Error::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.name.is_empty() || self.server.name.contains(' ') {
            return Err(Error::Config("Server name must be a single non-empty word".to_string()));
        }

        if self.connection.ports.is_empty() {
            return Err(Error::Config("At least one port must be configured".to_string()));
        }

        let mut seen_ports = std::collections::HashSet::new();
        for port in &self.connection.ports {
            if *port == 0 {
                return Err(Error::Config("Port cannot be 0".to_string()));
            }
            if !seen_ports.insert(*port) {
                return Err(Error::Config(format!("Duplicate port {} in configuration", port)));
            }
        }

        let limits = &self.limits;
        if limits.max_targets == 0 || limits.max_kicks == 0 || limits.kick_length == 0 || limits.nick_length == 0 {
            return Err(Error::Config("Limits must be greater than 0".to_string()));
        }

        for oper in &self.operators {
            if oper.name.is_empty() {
                return Err(Error::Config("Operator name cannot be empty".to_string()));
            }
            if oper.password_hash.len() != 64 || !oper.password_hash.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(Error::Config(format!(
                    "Operator {} password_hash must be a hex SHA-256 digest",
                    oper.name
                )));
            }
        }

        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            other => Err(Error::Config(format!("Unknown log level: {}", other))),
        }
    }

    /// Find the operator block for an OPER name
    pub fn find_operator(&self, name: &str) -> Option<&OperatorConfig> {
        self.operators.iter().find(|oper| oper.name == name)
    }
}
