//! Chat server listener
//!
//! Binds the listening socket, builds the room registry once and spawns
//! one session task per accepted connection. No connection limit.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::config::ServerConfig;
use crate::error::AppError;
use crate::handler::{handle_connection, SessionContext};
use crate::registry::RoomRegistry;

/// Bound chat server
pub struct ChatServer {
    listener: TcpListener,
    ctx: SessionContext,
}

impl ChatServer {
    /// Create the rooms and bind the listener
    ///
    /// Fails if the address cannot be bound or the default room is not in
    /// the room set.
    pub async fn bind(config: &ServerConfig) -> Result<Self, AppError> {
        let registry = Arc::new(RoomRegistry::with_rooms(config.rooms.iter().cloned()));
        let ctx = SessionContext::new(registry, &config.default_room, config.max_frame_length)?;
        let listener = TcpListener::bind(config.bind_addr()).await?;
        Ok(Self { listener, ctx })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, AppError> {
        Ok(self.listener.local_addr()?)
    }

    pub fn registry(&self) -> &Arc<RoomRegistry> {
        &self.ctx.registry
    }

    /// Accept connections until the task is dropped
    pub async fn run(self) {
        info!(
            "ChatServer started with rooms {:?}",
            self.ctx.registry.room_names()
        );

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    debug!("New connection from {}", addr);
                    let ctx = self.ctx.clone();

                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, ctx).await {
                            error!("Connection {} ended with error: {}", addr, e);
                        }
                    });
                }
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_config() -> ServerConfig {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            ..ServerConfig::default()
        }
    }

    #[tokio::test]
    async fn test_bind_creates_rooms() {
        let server = ChatServer::bind(&local_config()).await.unwrap();

        assert_ne!(server.local_addr().unwrap().port(), 0);
        assert_eq!(server.registry().room_names(), vec!["kek", "lol", "main"]);
    }

    #[tokio::test]
    async fn test_bind_rejects_unknown_default_room() {
        let config = ServerConfig {
            default_room: "lobby".to_string(),
            ..local_config()
        };

        let result = ChatServer::bind(&config).await;
        assert!(matches!(result, Err(AppError::UnknownDefaultRoom(_))));
    }

    #[tokio::test]
    async fn test_bind_fails_on_address_in_use() {
        let first = ChatServer::bind(&local_config()).await.unwrap();
        let config = ServerConfig {
            port: first.local_addr().unwrap().port(),
            ..local_config()
        };

        let result = ChatServer::bind(&config).await;
        assert!(matches!(result, Err(AppError::Io(_))));
    }
}
