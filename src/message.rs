//! Message protocol definitions
//!
//! JSON-based bidirectional message protocol using Serde's tagged enum
//! for type-safe serialization/deserialization. The tag field is
//! `Command`; one variant per command in each direction.

use chrono::Local;
use serde::{Deserialize, Serialize};

/// Client → Server message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "Command", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Request to join with this identity
    Login { username: String },
    /// Broadcast text to the current room
    Msg { text: String },
    /// Switch to the named room
    #[serde(alias = "changeRom")]
    ChangeRoom { rom: String },
    /// Request the current room's history
    Messages { rom: String },
    /// Any command outside the vocabulary above; ignored by the server
    #[serde(other)]
    Unknown,
}

/// Server → Client message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "Command", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Login outcome
    Login { text: LoginOutcome },
    /// A broadcast message, or a notice authored by the server
    Msg { user: String, text: String },
    /// All room names
    AvailableRoms { list: Vec<String> },
    /// Room history, oldest first
    MessageList { list: Vec<Post> },
    #[serde(other)]
    Unknown,
}

/// Result carried by a `login` reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoginOutcome {
    /// Spelling is part of the wire format
    #[serde(rename = "sucess")]
    Success,
    #[serde(rename = "fail")]
    Fail,
}

/// One accepted chat message in a room's history
///
/// Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Post {
    pub username: String,
    pub message: String,
    /// Local wall-clock time of acceptance, `HH:MM`
    pub time: String,
}

impl Post {
    /// Create a post stamped with the current local time
    pub fn now(username: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            message: message.into(),
            time: Local::now().format("%H:%M").to_string(),
        }
    }
}
