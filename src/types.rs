//! Basic type definitions for the chat server
//!
//! Provides newtype wrappers for type safety:
//! - `ClientId`: the username a client logged in with
//! - `ConnectionId`: UUID-based identifier of one accepted socket

use std::borrow::Borrow;

use uuid::Uuid;

/// Author name used for notices generated by the server itself
pub const SYSTEM_USER: &str = "bot";

/// Unique client identifier (newtype pattern)
///
/// Equals the username chosen at login. Unique among active sessions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientId(pub String);

impl ClientId {
    pub fn new(username: impl Into<String>) -> Self {
        Self(username.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ClientId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of one accepted connection
///
/// Exists before the client has a username, so log lines for a session
/// can be correlated from accept to close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Create a new random connection ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_connection_id_unique() {
        let id1 = ConnectionId::new();
        let id2 = ConnectionId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_client_id_lookup_by_str() {
        let mut map = HashMap::new();
        map.insert(ClientId::new("alice"), 1);

        assert_eq!(map.get("alice"), Some(&1));
        assert!(map.get("bob").is_none());
    }

    #[test]
    fn test_client_id_display() {
        assert_eq!(ClientId::new("alice").to_string(), "alice");
    }
}
