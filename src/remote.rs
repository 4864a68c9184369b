//! Client side of the protocol
//!
//! A typed connection to a chat server. Used by the `chat_client` binary;
//! its send and receive halves can be driven from separate tasks.

use futures_util::{SinkExt, StreamExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::debug;

use crate::codec::ClientCodec;
use crate::error::AppError;
use crate::message::{ClientMessage, ServerMessage};

/// Connection to a chat server
pub struct RemoteConnection {
    sender: RemoteSender,
    receiver: RemoteReceiver,
}

impl RemoteConnection {
    pub async fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self, AppError> {
        let stream = TcpStream::connect(addr).await?;
        debug!("Connected to {}", stream.peer_addr()?);

        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            sender: RemoteSender {
                inner: FramedWrite::new(write_half, ClientCodec::new()),
            },
            receiver: RemoteReceiver {
                inner: FramedRead::new(read_half, ClientCodec::unbounded()),
            },
        })
    }

    pub async fn send(&mut self, msg: ClientMessage) -> Result<(), AppError> {
        self.sender.send(msg).await
    }

    pub async fn recv(&mut self) -> Result<ServerMessage, AppError> {
        self.receiver.recv().await
    }

    pub async fn login(&mut self, username: &str) -> Result<(), AppError> {
        self.sender.login(username).await
    }

    pub async fn say(&mut self, text: &str) -> Result<(), AppError> {
        self.sender.say(text).await
    }

    pub async fn change_room(&mut self, room: &str) -> Result<(), AppError> {
        self.sender.change_room(room).await
    }

    pub async fn request_messages(&mut self, room: &str) -> Result<(), AppError> {
        self.sender.request_messages(room).await
    }

    /// Split into halves for concurrent sending and receiving
    pub fn split(self) -> (RemoteSender, RemoteReceiver) {
        (self.sender, self.receiver)
    }
}

/// Outbound half of a [`RemoteConnection`]
pub struct RemoteSender {
    inner: FramedWrite<OwnedWriteHalf, ClientCodec>,
}

impl RemoteSender {
    pub async fn send(&mut self, msg: ClientMessage) -> Result<(), AppError> {
        self.inner.send(msg).await?;
        Ok(())
    }

    pub async fn login(&mut self, username: &str) -> Result<(), AppError> {
        self.send(ClientMessage::Login {
            username: username.to_string(),
        })
        .await
    }

    pub async fn say(&mut self, text: &str) -> Result<(), AppError> {
        self.send(ClientMessage::Msg {
            text: text.to_string(),
        })
        .await
    }

    pub async fn change_room(&mut self, room: &str) -> Result<(), AppError> {
        self.send(ClientMessage::ChangeRoom {
            rom: room.to_string(),
        })
        .await
    }

    pub async fn request_messages(&mut self, room: &str) -> Result<(), AppError> {
        self.send(ClientMessage::Messages {
            rom: room.to_string(),
        })
        .await
    }
}

/// Inbound half of a [`RemoteConnection`]
pub struct RemoteReceiver {
    inner: FramedRead<OwnedReadHalf, ClientCodec>,
}

impl RemoteReceiver {
    /// Next frame from the server
    ///
    /// Returns `AppError::ConnectionClosed` once the server closes the stream.
    pub async fn recv(&mut self) -> Result<ServerMessage, AppError> {
        match self.inner.next().await {
            Some(frame) => Ok(frame?),
            None => Err(AppError::ConnectionClosed),
        }
    }
}
