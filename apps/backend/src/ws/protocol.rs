use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{PlayerId, RoomSettings};
use crate::errors::{DomainError, ErrorCategory, ErrorCode};
use crate::rooms::{RoomIntent, RoomSnapshot};

pub const PROTOCOL_VERSION: u32 = 1;

/// Frames that bind a connection to a seat.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum SessionMsg {
    CreateRoom {
        player_name: String,
        #[serde(default)]
        settings: Option<RoomSettings>,
    },
    JoinRoom {
        room_code: String,
        player_name: String,
    },
    /// Reclaim a seat after a dropped connection.
    Resume {
        room_code: String,
        player_key: Uuid,
    },
}

/// Table talk. Relayed to the room; never versioned.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ChatMsg {
    Chat { message: String },
}

/// A room intent plus the version the client last saw.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentEnvelope {
    #[serde(flatten)]
    pub intent: RoomIntent,
    #[serde(default)]
    pub expected_version: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ClientMsg {
    Session(SessionMsg),
    Chat(ChatMsg),
    Intent(IntentEnvelope),
}

impl ClientMsg {
    pub fn parse(text: &str) -> Result<Self, DomainError> {
        serde_json::from_str(text).map_err(|err| {
            DomainError::validation(
                crate::errors::ValidationKind::Malformed,
                format!("unrecognised message: {err}"),
            )
        })
    }
}

/// Direct replies and state frames. Room events go out as their own frames.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ServerMsg<'a> {
    Welcome {
        protocol: u32,
        room_code: &'a str,
        player_key: Uuid,
        seat: PlayerId,
    },
    RoomState {
        room: &'a RoomSnapshot,
    },
    Error {
        code: ErrorCode,
        category: ErrorCategory,
        message: String,
    },
}

impl ServerMsg<'_> {
    pub fn error(err: &DomainError) -> Self {
        ServerMsg::Error {
            code: err.code(),
            category: err.category(),
            message: err.detail().to_string(),
        }
    }
}
