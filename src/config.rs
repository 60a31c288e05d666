//! Runtime configuration of `storefrontd`.
//!
//! The daemon parses its command line into an option struct and converts it into a
//! [`ServerConfig`], filling in defaults for everything left unset.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::document::DEFAULT_MEDIA_URL;

/// Host bound when none is given.
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Port bound when none is given.
pub const DEFAULT_PORT: u16 = 8080;

/// Settings of one `storefrontd` process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// PostgreSQL URL; the in-memory store is used when unset.
    pub database_url: Option<String>,
    /// YAML fixture applied at startup.
    pub seed: Option<PathBuf>,
    /// Host to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Prefix joined to image references in documents.
    pub media_url: String,
    /// Emit logs as JSON lines.
    pub log_json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            seed: None,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            media_url: DEFAULT_MEDIA_URL.to_string(),
            log_json: false,
        }
    }
}

impl ServerConfig {
    /// Returns the socket address to bind.
    pub fn bind_address(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    /// Describes the configured store for startup logs, hiding database credentials.
    pub fn store_description(&self) -> String {
        match &self.database_url {
            None => "in-memory".to_string(),
            Some(url) => match url::Url::parse(url) {
                Ok(parsed) => format!(
                    "postgres {}{}",
                    parsed.host_str().unwrap_or("localhost"),
                    parsed.path()
                ),
                Err(_) => "postgres".to_string(),
            },
        }
    }
}
