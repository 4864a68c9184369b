//! Multi-room TCP Chat Server Library
//!
//! A chat server with a fixed set of named rooms. Clients log in with a
//! unique username, land in the default room, and can switch rooms,
//! fetch a room's history and broadcast text to the other members.
//!
//! # Features
//! - Newline-delimited JSON frames, tagged by a `Command` field
//! - Username uniqueness across all rooms
//! - Per-room append-only history
//! - Room switching with join and welcome notices
//!
//! # Architecture
//! Shared state behind locks, one task per connection:
//! - `RoomRegistry` is built once and shared by every session
//! - Each `Room` guards its membership and history with one mutex
//! - Each connection's outbound half sits behind its own mutex, since
//!   other sessions' broadcasts write to it too
//!
//! # Example
//! ```ignore
//! use multiroom_chat::{ChatServer, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), multiroom_chat::AppError> {
//!     let server = ChatServer::bind(&ServerConfig::default()).await?;
//!     server.run().await;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod handler;
pub mod logging;
pub mod message;
pub mod registry;
pub mod remote;
pub mod room;
pub mod server;
pub mod types;

// Re-export main types for convenience
pub use client::{Client, ClientSink};
pub use codec::{ClientCodec, FrameCodec, ServerCodec};
pub use config::{ClientConfig, ServerConfig};
pub use error::{AppError, FrameError, SendError};
pub use handler::{handle_connection, Session, SessionContext, SessionState};
pub use message::{ClientMessage, LoginOutcome, Post, ServerMessage};
pub use registry::RoomRegistry;
pub use remote::{RemoteConnection, RemoteReceiver, RemoteSender};
pub use room::Room;
pub use server::ChatServer;
pub use types::{ClientId, ConnectionId, SYSTEM_USER};
