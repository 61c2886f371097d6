// Room builders shared by the room suites.

use monopoly_backend::domain::RoomSettings;
use monopoly_backend::rooms::{LobbyIntent, Room};
use uuid::Uuid;

/// A classic-edition room with `players` seated, everyone ready, game started.
/// Returns the room and the player keys in seat order.
pub fn started_room(players: usize, seed: u64) -> (Room, Vec<Uuid>) {
    let mut room = Room::new("TST234", RoomSettings::classic(), seed).expect("room");
    let keys: Vec<Uuid> = (0..players)
        .map(|i| room.join(&format!("P{i}")).expect("join").0.key)
        .collect();
    for key in &keys[1..] {
        room.handle(*key, LobbyIntent::SetReady { ready: true }.into(), None)
            .expect("ready");
    }
    room.handle(keys[0], LobbyIntent::StartGame.into(), None)
        .expect("start");
    (room, keys)
}
