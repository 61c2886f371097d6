// Rooms behind the manager and their worker tasks.

use std::time::Duration;

use monopoly_backend::domain::{Action, GameEvent, RoomSettings};
use monopoly_backend::errors::{DomainError, NotFoundKind};
use monopoly_backend::rooms::{LobbyIntent, RoomEvent, RoomManager, RoomStatus, RoomsConfig};

fn manager() -> RoomManager {
    RoomManager::new(RoomsConfig {
        max_rooms: 4,
        turn_timeout_secs: 5,
        ..RoomsConfig::default()
    })
}

#[tokio::test]
async fn concurrent_submissions_are_applied_one_at_a_time() {
    let rooms = manager();
    let handle = rooms.create_room(RoomSettings::classic()).unwrap();
    let a = handle.join("A").await.unwrap();
    let b = handle.join("B").await.unwrap();
    handle
        .submit(b.key, LobbyIntent::SetReady { ready: true }.into(), None)
        .await
        .unwrap();
    let version = handle
        .submit(a.key, LobbyIntent::StartGame.into(), None)
        .await
        .unwrap();

    // Both race for the same version; exactly one wins.
    let first = handle.submit(a.key, Action::RollDice.into(), Some(version));
    let second = handle.submit(a.key, Action::RollDice.into(), Some(version));
    let (first, second) = tokio::join!(first, second);
    assert_eq!(u8::from(first.is_ok()) + u8::from(second.is_ok()), 1);
    assert_eq!(handle.snapshot().version, version + 1);
}

#[tokio::test]
async fn subscribers_see_every_applied_intent() {
    let rooms = manager();
    let handle = rooms.create_room(RoomSettings::classic()).unwrap();
    let mut updates = handle.subscribe();
    let a = handle.join("A").await.unwrap();

    let update = tokio::time::timeout(Duration::from_secs(1), updates.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(update.version, 1);
    assert_eq!(update.snapshot.members.len(), 1);
    assert_eq!(update.snapshot.members[0].name, "A");
    assert!(handle.connect(a.key).await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn absent_players_have_their_turns_skipped() {
    let rooms = manager();
    let handle = rooms.create_room(rooms.default_settings()).unwrap();
    let a = handle.join("A").await.unwrap();
    let b = handle.join("B").await.unwrap();
    handle
        .submit(b.key, LobbyIntent::SetReady { ready: true }.into(), None)
        .await
        .unwrap();
    handle
        .submit(a.key, LobbyIntent::StartGame.into(), None)
        .await
        .unwrap();
    let mut updates = handle.subscribe();

    // Nobody connected: seat 0's deadline runs out.
    tokio::time::sleep(Duration::from_secs(6)).await;
    let update = updates.recv().await.unwrap();
    assert!(update
        .events
        .iter()
        .any(|e| matches!(e, RoomEvent::Game(GameEvent::TurnChanged { player_id: 1, .. }))));
    let game = update.snapshot.game.as_ref().unwrap();
    assert_eq!(game.current_player_id, 1);
    assert!(game.last_roll.is_none());
}

#[tokio::test]
async fn shut_down_rooms_are_not_found() {
    let rooms = manager();
    let handle = rooms.create_room(RoomSettings::classic()).unwrap();
    let code = handle.code().to_string();
    rooms.shutdown_all().await;

    let err = rooms.get(&code).err().unwrap();
    assert!(matches!(err, DomainError::NotFound(NotFoundKind::Room, _)));
    let err = handle.join("late").await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound(NotFoundKind::Room, _)));
    assert_eq!(handle.snapshot().status, RoomStatus::Lobby);
}
