//! Client struct definition
//!
//! Represents a logged-in client and the outbound half of its connection.

use std::sync::Arc;

use futures_util::SinkExt;
use tokio::io::AsyncWrite;
use tokio::sync::Mutex;
use tokio_util::codec::FramedWrite;

use crate::codec::ServerCodec;
use crate::error::SendError;
use crate::message::ServerMessage;
use crate::types::{ClientId, ConnectionId};

/// Outbound frame writer over any byte stream
pub type FrameWriter = FramedWrite<Box<dyn AsyncWrite + Send + Unpin>, ServerCodec>;

/// Outbound side of one connection
///
/// Frames reach a connection from its own session and from other sessions
/// broadcasting into the same room. Every write takes the mutex, so a
/// frame is always written whole before the next one starts.
#[derive(Clone)]
pub struct ClientSink {
    conn: ConnectionId,
    writer: Arc<Mutex<FrameWriter>>,
}

impl ClientSink {
    /// Wrap the write half of a connection
    pub fn new<W>(conn: ConnectionId, writer: W, codec: ServerCodec) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let writer: Box<dyn AsyncWrite + Send + Unpin> = Box::new(writer);
        Self {
            conn,
            writer: Arc::new(Mutex::new(FramedWrite::new(writer, codec))),
        }
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.conn
    }

    /// Encode and flush one frame
    pub async fn send(&self, msg: ServerMessage) -> Result<(), SendError> {
        let mut writer = self.writer.lock().await;
        writer.send(msg).await?;
        Ok(())
    }

    /// Flush and shut down the write half
    pub async fn close(&self) -> Result<(), SendError> {
        let mut writer = self.writer.lock().await;
        writer.close().await?;
        Ok(())
    }
}

impl std::fmt::Debug for ClientSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSink").field("conn", &self.conn).finish()
    }
}

/// Logged-in client
///
/// Owned by the room it is currently joined to.
#[derive(Debug, Clone)]
pub struct Client {
    /// Username, unique among active sessions
    pub id: ClientId,
    /// Server → Client frame sink
    pub sink: ClientSink,
}

impl Client {
    pub fn new(id: ClientId, sink: ClientSink) -> Self {
        Self { id, sink }
    }
}

/// In-memory connected client for tests: the client plus a reader on the
/// other end of its connection
#[cfg(test)]
pub(crate) fn connected_client(
    name: &str,
) -> (
    Client,
    tokio_util::codec::FramedRead<tokio::io::DuplexStream, crate::codec::ClientCodec>,
) {
    let (server_io, client_io) = tokio::io::duplex(64 * 1024);
    let sink = ClientSink::new(ConnectionId::new(), server_io, ServerCodec::new());
    let reader =
        tokio_util::codec::FramedRead::new(client_io, crate::codec::ClientCodec::unbounded());
    (Client::new(ClientId::new(name), sink), reader)
}
