//! Rooms: membership, the hosted game, and the task that serializes access.

pub mod event_log;
pub mod manager;
pub mod room;
pub mod worker;

pub use manager::{RoomManager, RoomsConfig};
pub use room::{
    JoinTicket, LobbyEvent, LobbyIntent, Recorded, Room, RoomEvent, RoomIntent, RoomSnapshot, RoomStatus,
    RoomSummary,
};
pub use worker::{spawn_room, RoomBroadcast, RoomHandle};
