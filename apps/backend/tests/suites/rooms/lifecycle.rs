// Lobby to game over through `Room` directly.

use monopoly_backend::domain::{Action, GameEvent, TurnPhase};
use monopoly_backend::errors::{ConflictKind, DomainError, ValidationKind};
use monopoly_backend::rooms::{LobbyEvent, LobbyIntent, RoomEvent, RoomIntent, RoomStatus};

use crate::support::rooms::started_room;

#[test]
fn first_roll_moves_the_first_seat() {
    let (mut room, keys) = started_room(3, 5);
    let before = room.version();
    let events = room
        .handle(keys[0], RoomIntent::Game(Action::RollDice), Some(before))
        .unwrap();

    assert_eq!(room.version(), before + 1);
    assert!(events
        .iter()
        .any(|e| matches!(e, RoomEvent::Game(GameEvent::DiceRolled { player_id: 0, .. }))));
    let snap = room.snapshot();
    let game = snap.game.expect("game running");
    assert!(game.last_roll.is_some());
}

#[test]
fn out_of_turn_intents_change_nothing() {
    let (mut room, keys) = started_room(2, 5);
    let before = room.snapshot();
    let err = room
        .handle(keys[1], RoomIntent::Game(Action::RollDice), None)
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(ValidationKind::OutOfTurn, _)));
    assert_eq!(room.snapshot(), before);
    assert_eq!(room.history().len(), 4);
}

#[test]
fn stale_version_is_an_optimistic_lock_conflict() {
    let (mut room, keys) = started_room(2, 5);
    let stale = room.version() - 1;
    let err = room
        .handle(keys[0], RoomIntent::Game(Action::RollDice), Some(stale))
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(ConflictKind::OptimisticLock, _)));
    assert_eq!(err.code().as_str(), "OPTIMISTIC_LOCK");
}

#[test]
fn leaving_players_forfeit_until_one_remains() {
    let (mut room, keys) = started_room(3, 9);

    let events = room
        .handle(keys[1], LobbyIntent::LeaveRoom.into(), None)
        .unwrap();
    assert!(events
        .iter()
        .any(|e| matches!(e, RoomEvent::Game(GameEvent::PlayerBankrupt { player_id: 1, .. }))));
    assert_eq!(room.status(), RoomStatus::InProgress);

    room.handle(keys[0], LobbyIntent::LeaveRoom.into(), None)
        .unwrap();
    assert_eq!(room.status(), RoomStatus::GameOver);
    let game = room.game().unwrap();
    assert_eq!(game.winner(), Some(2));
    assert!(matches!(game.phase, TurnPhase::GameOver { winner_id: 2 }));

    let err = room
        .handle(keys[1], RoomIntent::Game(Action::RollDice), None)
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(ValidationKind::NotSeated, _)));
}

#[test]
fn lobby_events_are_logged_in_order() {
    let (room, _) = started_room(2, 1);
    let logged: Vec<&RoomEvent> = room.log().iter().map(|l| &l.event).collect();
    assert!(matches!(logged[0], RoomEvent::Lobby(LobbyEvent::MemberJoined { seat: 0, .. })));
    assert!(matches!(logged[1], RoomEvent::Lobby(LobbyEvent::MemberJoined { seat: 1, .. })));
    assert!(matches!(logged[2], RoomEvent::Lobby(LobbyEvent::ReadyChanged { .. })));
    assert!(matches!(logged[3], RoomEvent::Lobby(LobbyEvent::GameStarted { players: 2 })));
    let seqs: Vec<u64> = room.log().iter().map(|l| l.seq).collect();
    assert!(seqs.windows(2).all(|w| w[1] == w[0] + 1));
}

#[test]
fn skipping_a_turn_hands_play_to_the_next_seat() {
    let (mut room, _) = started_room(2, 3);
    let turn = room.awaited().unwrap();
    assert_eq!(turn.0, 0);
    room.skip_turn().unwrap();
    let next = room.awaited().unwrap();
    assert_eq!(next.0, 1);
    assert!(next.1 > turn.1);
}
