//! Room registry
//!
//! Owns the fixed name -> room mapping. Built once at startup and shared
//! by reference with every session.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::client::Client;
use crate::message::ServerMessage;
use crate::room::Room;
use crate::types::{ClientId, SYSTEM_USER};

/// All rooms of one server
#[derive(Debug, Default)]
pub struct RoomRegistry {
    /// Room name -> Room. Not mutated once the registry is shared.
    rooms: HashMap<String, Arc<Room>>,
    /// Held while a room switch moves membership between two rooms
    lock: Mutex<()>,
    /// Usernames of every logged-in session, whatever room it is in
    online: Mutex<HashSet<ClientId>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry holding one empty room per name
    pub fn with_rooms<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = Self::new();
        for name in names {
            registry.add_room(Room::new(name));
        }
        registry
    }

    /// Register a room. A name that already exists is left unchanged.
    pub fn add_room(&mut self, room: Room) {
        if self.rooms.contains_key(room.name()) {
            debug!(room = %room.name(), "room already registered");
            return;
        }
        self.rooms.insert(room.name().to_string(), Arc::new(room));
    }

    /// Look up a room by name
    pub fn get(&self, name: &str) -> Option<Arc<Room>> {
        self.rooms.get(name).cloned()
    }

    /// All room names, sorted
    pub fn room_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.rooms.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a session is logged in under this id
    pub async fn is_online(&self, id: &str) -> bool {
        self.online.lock().await.contains(id)
    }

    /// Reserve a username for a logging-in session
    ///
    /// Returns false if another session holds it, in any room. The claim
    /// lasts until [`release`](Self::release), so a name stays unique across
    /// the whole server however its holder moves between rooms.
    pub async fn claim(&self, id: &ClientId) -> bool {
        self.online.lock().await.insert(id.clone())
    }

    /// Give a username back. Unclaimed ids are ignored.
    pub async fn release(&self, id: &str) {
        self.online.lock().await.remove(id);
    }

    /// Move `client` from `prev` to the room named `new_room`
    ///
    /// The membership move happens under the registry lock; the join notice
    /// to the new room's members and the welcome to the client are sent after
    /// it is released. Returns the room the client is in afterwards: `prev`
    /// when `new_room` does not exist.
    pub async fn change_room(&self, client: &Client, prev: Arc<Room>, new_room: &str) -> Arc<Room> {
        let Some(next) = self.get(new_room) else {
            debug!(user = %client.id, room = %new_room, "unknown room");
            return prev;
        };
        if Arc::ptr_eq(&prev, &next) {
            return prev;
        }

        {
            let _guard = self.lock.lock().await;
            prev.remove_client(client.id.as_str()).await;
            if !next.add_client(client.clone()).await {
                prev.add_client(client.clone()).await;
                return prev;
            }
        }

        next.announce(
            client.id.as_str(),
            &format!(" user {} has joined the rom", client.id),
        )
        .await;
        next.send_to_user(
            client.id.as_str(),
            ServerMessage::Msg {
                user: SYSTEM_USER.to_string(),
                text: format!("welcome to rom {}", next.name()),
            },
        )
        .await;

        info!(user = %client.id, from = %prev.name(), to = %next.name(), "changed room");
        next
    }
}
