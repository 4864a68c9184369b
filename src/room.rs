//! Room struct definition
//!
//! A named broadcast domain with its own membership and message history.
//! Membership and history live behind one mutex, so a broadcast and a
//! history read always observe a consistent pair. Frames are sent after
//! the lock is released, from a snapshot of the recipients taken under it;
//! a stalled peer slows only the task writing to it.

use std::collections::HashMap;

use futures_util::future::join_all;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::client::{Client, ClientSink};
use crate::message::{Post, ServerMessage};
use crate::types::{ClientId, SYSTEM_USER};

#[derive(Debug, Default)]
struct RoomState {
    /// Current members: ClientId -> outbound sink
    members: HashMap<ClientId, ClientSink>,
    /// Accepted posts, oldest first. Append-only.
    history: Vec<Post>,
}

impl RoomState {
    fn recipients_except(&self, excluded: &str) -> Vec<(ClientId, ClientSink)> {
        self.members
            .iter()
            .filter(|(id, _)| id.as_str() != excluded)
            .map(|(id, sink)| (id.clone(), sink.clone()))
            .collect()
    }
}

/// Chat room
#[derive(Debug)]
pub struct Room {
    /// Room name, unique and immutable
    name: String,
    state: Mutex<RoomState>,
}

impl Room {
    /// Create an empty room
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Mutex::new(RoomState::default()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a client
    ///
    /// Returns false if a member with the same id is already present; the
    /// existing member is left untouched.
    pub async fn add_client(&self, client: Client) -> bool {
        let mut state = self.state.lock().await;
        if state.members.contains_key(&client.id) {
            return false;
        }
        debug!(room = %self.name, user = %client.id, "client added");
        state.members.insert(client.id, client.sink);
        true
    }

    /// Remove a client. Absent ids are ignored.
    pub async fn remove_client(&self, id: &str) {
        let mut state = self.state.lock().await;
        if state.members.remove(id).is_some() {
            debug!(room = %self.name, user = %id, "client removed");
        }
    }

    /// Check if a client is a member of this room
    pub async fn contains(&self, id: &str) -> bool {
        self.state.lock().await.members.contains_key(id)
    }

    /// Number of current members
    pub async fn member_count(&self) -> usize {
        self.state.lock().await.members.len()
    }

    /// Record a post from `sender` and deliver it to every other member
    pub async fn broadcast(&self, sender: &str, text: &str) {
        let recipients = {
            let mut state = self.state.lock().await;
            state.history.push(Post::now(sender, text));
            state.recipients_except(sender)
        };

        debug!(room = %self.name, user = %sender, recipients = recipients.len(), "broadcasting");
        self.deliver(
            recipients,
            ServerMessage::Msg {
                user: sender.to_string(),
                text: text.to_string(),
            },
        )
        .await;
    }

    /// Deliver a server-authored notice to every member except `except`
    ///
    /// Notices are not part of the room history.
    pub async fn announce(&self, except: &str, text: &str) {
        let recipients = self.state.lock().await.recipients_except(except);
        self.deliver(
            recipients,
            ServerMessage::Msg {
                user: SYSTEM_USER.to_string(),
                text: text.to_string(),
            },
        )
        .await;
    }

    /// Send one frame to one member
    ///
    /// Does nothing if `target` is not a member of this room.
    pub async fn send_to_user(&self, target: &str, msg: ServerMessage) {
        let sink = self.state.lock().await.members.get(target).cloned();
        let Some(sink) = sink else {
            debug!(room = %self.name, user = %target, "unicast target not in room");
            return;
        };

        if let Err(e) = sink.send(msg).await {
            warn!(room = %self.name, user = %target, "unicast failed: {}", e);
        }
    }

    /// Send the full history, in insertion order, to one member
    pub async fn get_messages(&self, target: &str) {
        let (sink, list) = {
            let state = self.state.lock().await;
            let Some(sink) = state.members.get(target).cloned() else {
                debug!(room = %self.name, user = %target, "history target not in room");
                return;
            };
            (sink, state.history.clone())
        };

        if let Err(e) = sink.send(ServerMessage::MessageList { list }).await {
            warn!(room = %self.name, user = %target, "history send failed: {}", e);
        }
    }

    /// Copy of the history, oldest first
    pub async fn history(&self) -> Vec<Post> {
        self.state.lock().await.history.clone()
    }

    // Per-recipient best effort: a failed write is logged and the rest
    // still receive the frame.
    async fn deliver(&self, recipients: Vec<(ClientId, ClientSink)>, msg: ServerMessage) {
        let sends = recipients.iter().map(|(id, sink)| {
            let msg = msg.clone();
            async move {
                if let Err(e) = sink.send(msg).await {
                    warn!(room = %self.name, user = %id, "delivery failed: {}", e);
                }
            }
        });
        join_all(sends).await;
    }
}
