//! Connection handler
//!
//! Runs one session per accepted connection: decodes inbound frames,
//! drives the login / room state machine and replies through the
//! connection's shared sink.

use std::sync::Arc;

use futures_util::StreamExt;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::FramedRead;
use tracing::{debug, info, warn};

use crate::client::{Client, ClientSink};
use crate::codec::ServerCodec;
use crate::error::AppError;
use crate::message::{ClientMessage, LoginOutcome, ServerMessage};
use crate::registry::RoomRegistry;
use crate::room::Room;
use crate::types::{ClientId, ConnectionId};

/// Everything a session needs from the server
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub registry: Arc<RoomRegistry>,
    /// Room every client joins on login
    pub default_room: Arc<Room>,
    pub max_frame_length: usize,
}

impl SessionContext {
    /// Fails if `default_room` is not registered
    pub fn new(
        registry: Arc<RoomRegistry>,
        default_room: &str,
        max_frame_length: usize,
    ) -> Result<Self, AppError> {
        let default_room = registry
            .get(default_room)
            .ok_or_else(|| AppError::UnknownDefaultRoom(default_room.to_string()))?;
        Ok(Self {
            registry,
            default_room,
            max_frame_length,
        })
    }
}

/// Session state
#[derive(Debug)]
pub enum SessionState {
    /// Connected, no username yet
    Unauthenticated,
    /// Logged in and a member of `room`
    Authenticated { client: Client, room: Arc<Room> },
    /// Stream ended; membership already released
    Closed,
}

/// Per-connection protocol state machine
pub struct Session {
    conn: ConnectionId,
    ctx: SessionContext,
    sink: ClientSink,
    state: SessionState,
}

impl Session {
    pub fn new(ctx: SessionContext, sink: ClientSink) -> Self {
        Self {
            conn: sink.connection_id(),
            ctx,
            sink,
            state: SessionState::Unauthenticated,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Room the session is bound to, once logged in
    pub fn current_room(&self) -> Option<&Arc<Room>> {
        match &self.state {
            SessionState::Authenticated { room, .. } => Some(room),
            _ => None,
        }
    }

    /// Apply one inbound frame
    ///
    /// Commands that need a login are ignored before one; unknown commands
    /// are always ignored.
    pub async fn handle_message(&mut self, msg: ClientMessage) {
        match msg {
            ClientMessage::Login { username } => self.handle_login(username).await,
            ClientMessage::Msg { text } => {
                let SessionState::Authenticated { client, room } = &self.state else {
                    return;
                };
                debug!(conn = %self.conn, user = %client.id, room = %room.name(), "msg");
                room.broadcast(client.id.as_str(), &text).await;
            }
            ClientMessage::ChangeRoom { rom } => {
                let SessionState::Authenticated { client, room } = &mut self.state else {
                    return;
                };
                *room = self
                    .ctx
                    .registry
                    .change_room(client, room.clone(), &rom)
                    .await;
            }
            ClientMessage::Messages { rom } => {
                let SessionState::Authenticated { client, room } = &self.state else {
                    return;
                };
                if rom != room.name() {
                    debug!(
                        conn = %self.conn,
                        user = %client.id,
                        requested = %rom,
                        "history requested for another room, serving current room {}",
                        room.name()
                    );
                }
                room.get_messages(client.id.as_str()).await;
            }
            ClientMessage::Unknown => {
                debug!(conn = %self.conn, "ignoring unknown command");
            }
        }
    }

    // The login reply and room list go out before the client joins the
    // room, so no broadcast can reach it ahead of its login outcome.
    async fn handle_login(&mut self, username: String) {
        if let SessionState::Authenticated { client, .. } = &self.state {
            debug!(conn = %self.conn, user = %client.id, "ignoring repeated login");
            return;
        }

        let client = Client::new(ClientId::new(username), self.sink.clone());
        let room = self.ctx.default_room.clone();

        if !self.ctx.registry.claim(&client.id).await {
            info!(conn = %self.conn, user = %client.id, "login rejected, username in use");
            self.reply(ServerMessage::Login {
                text: LoginOutcome::Fail,
            })
            .await;
            return;
        }

        info!(conn = %self.conn, user = %client.id, room = %room.name(), "logged in");
        self.reply(ServerMessage::Login {
            text: LoginOutcome::Success,
        })
        .await;
        self.reply(ServerMessage::AvailableRoms {
            list: self.ctx.registry.room_names(),
        })
        .await;

        if !room.add_client(client.clone()).await {
            // unreachable while every member holds a claim
            warn!(conn = %self.conn, user = %client.id, room = %room.name(), "claimed id already in room");
            self.ctx.registry.release(client.id.as_str()).await;
            return;
        }
        room.announce(
            client.id.as_str(),
            &format!(" user {} has joined the rom", client.id),
        )
        .await;

        self.state = SessionState::Authenticated { client, room };
    }

    async fn reply(&self, msg: ServerMessage) {
        if let Err(e) = self.sink.send(msg).await {
            warn!(conn = %self.conn, "reply failed: {}", e);
        }
    }

    /// Release room membership and username, then shut the outbound half
    pub async fn close(&mut self) {
        let state = std::mem::replace(&mut self.state, SessionState::Closed);
        if let SessionState::Authenticated { client, room } = state {
            room.remove_client(client.id.as_str()).await;
            self.ctx.registry.release(client.id.as_str()).await;
            info!(conn = %self.conn, user = %client.id, room = %room.name(), "left");
        }
        if let Err(e) = self.sink.close().await {
            debug!(conn = %self.conn, "close failed: {}", e);
        }
    }
}

/// Handle a new connection
///
/// Returns once the peer closes the stream or sends an undecodable frame.
/// Membership is released in both cases.
pub async fn handle_connection<S>(stream: S, ctx: SessionContext) -> Result<(), AppError>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let conn = ConnectionId::new();
    let (read_half, write_half) = tokio::io::split(stream);

    let mut frames = FramedRead::new(read_half, ServerCodec::with_max_length(ctx.max_frame_length));
    let sink = ClientSink::new(
        conn,
        write_half,
        ServerCodec::with_max_length(ctx.max_frame_length),
    );
    let mut session = Session::new(ctx, sink);
    debug!(conn = %conn, "session started");

    let result = loop {
        match frames.next().await {
            Some(Ok(msg)) => session.handle_message(msg).await,
            Some(Err(e)) => break Err(AppError::Frame(e)),
            None => break Ok(()),
        }
    };

    session.close().await;
    debug!(conn = %conn, "session closed");
    result
}
