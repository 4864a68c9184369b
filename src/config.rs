//! Runtime configuration
//!
//! Both binaries take one optional positional argument, the TCP port.
//! Everything else is fixed at these defaults.

use std::path::PathBuf;

use crate::codec::DEFAULT_MAX_FRAME_LENGTH;
use crate::error::AppError;

/// Port used when none is given
pub const DEFAULT_PORT: u16 = 6666;

/// Host the server binds to and the client dials
pub const DEFAULT_HOST: &str = "localhost";

/// Rooms created at startup
pub const DEFAULT_ROOMS: [&str; 3] = ["main", "lol", "kek"];

/// Room every client joins on login
pub const DEFAULT_ROOM: &str = "main";

pub const SERVER_LOG_FILE: &str = "serverLog.log";
pub const CLIENT_LOG_FILE: &str = "clLog.log";

/// Server settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Fixed room set, created once at startup
    pub rooms: Vec<String>,
    pub default_room: String,
    /// Append-only diagnostic log
    pub log_file: PathBuf,
    pub max_frame_length: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            rooms: DEFAULT_ROOMS.iter().map(|r| r.to_string()).collect(),
            default_room: DEFAULT_ROOM.to_string(),
            log_file: PathBuf::from(SERVER_LOG_FILE),
            max_frame_length: DEFAULT_MAX_FRAME_LENGTH,
        }
    }
}

impl ServerConfig {
    /// Build from command line arguments, program name excluded
    pub fn from_args<I>(args: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = String>,
    {
        Ok(Self {
            port: parse_port(args.into_iter().next())?,
            ..Self::default()
        })
    }

    /// Address passed to the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Client settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    pub log_file: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            log_file: PathBuf::from(CLIENT_LOG_FILE),
        }
    }
}

impl ClientConfig {
    /// Build from command line arguments, program name excluded
    pub fn from_args<I>(args: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = String>,
    {
        Ok(Self {
            port: parse_port(args.into_iter().next())?,
            ..Self::default()
        })
    }

    /// Address to dial
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_port(arg: Option<String>) -> Result<u16, AppError> {
    match arg {
        None => Ok(DEFAULT_PORT),
        Some(port) => port.trim().parse().map_err(|_| AppError::InvalidPort(port)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_server_defaults() {
        let config = ServerConfig::from_args(args(&[])).unwrap();
        assert_eq!(config.port, 6666);
        assert_eq!(config.bind_addr(), "localhost:6666");
        assert_eq!(config.rooms, vec!["main", "lol", "kek"]);
        assert_eq!(config.default_room, "main");
        assert_eq!(config.log_file, PathBuf::from("serverLog.log"));
    }

    #[test]
    fn test_port_argument() {
        let config = ServerConfig::from_args(args(&["7000"])).unwrap();
        assert_eq!(config.bind_addr(), "localhost:7000");

        let client = ClientConfig::from_args(args(&["7000"])).unwrap();
        assert_eq!(client.server_addr(), "localhost:7000");
    }

    #[test]
    fn test_invalid_port() {
        let err = ServerConfig::from_args(args(&["seventy"])).unwrap_err();
        assert!(matches!(err, AppError::InvalidPort(p) if p == "seventy"));

        assert!(ClientConfig::from_args(args(&["70000"])).is_err());
    }
}
