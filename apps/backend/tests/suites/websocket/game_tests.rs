// Starting and playing a game over sockets.

use serde_json::json;

use crate::support::app::test_state;
use crate::support::websocket::{start_test_server, ws_url};
use crate::support::websocket_client::{TestResult, WebSocketClient};

/// Host and one guest in a started classic game.
async fn started_pair(url: &str) -> TestResult<(WebSocketClient, WebSocketClient, u64)> {
    let mut host = WebSocketClient::connect(url).await?;
    let (welcome, _) = host
        .create_room("Host", Some(json!({ "edition": "classic" })))
        .await?;
    let code = welcome["roomCode"].as_str().unwrap().to_string();
    let mut guest = WebSocketClient::connect(url).await?;
    guest.join_room(&code, "Guest").await?;

    guest.send_json(json!({ "type": "set-ready", "ready": true })).await?;
    guest.recv_type("ready-changed").await?;
    host.send_json(json!({ "type": "start-game" })).await?;
    host.recv_type("game-started").await?;
    let state = guest.recv_state_at(4).await?;
    assert_eq!(state["room"]["status"], "in-progress");
    let version = state["room"]["version"].as_u64().unwrap();
    Ok((host, guest, version))
}

#[tokio::test]
async fn both_players_see_the_first_roll() -> TestResult {
    let (server, addr, join) = start_test_server(test_state()).await?;
    let (mut host, mut guest, version) = started_pair(&ws_url(addr)).await?;

    host.send_json(json!({ "type": "roll-dice", "expectedVersion": version }))
        .await?;
    for client in [&mut host, &mut guest] {
        let rolled = client.recv_type("dice-rolled").await?;
        assert_eq!(rolled["playerId"], 0);
        let values = rolled["values"].as_array().unwrap();
        assert!(values.iter().all(|v| (1..=6).contains(&v.as_u64().unwrap())));
        let state = client.recv_state_at(version + 1).await?;
        assert!(state["room"]["game"]["lastRoll"].is_array());
    }

    server.stop(true).await;
    let _ = join.await;
    Ok(())
}

#[tokio::test]
async fn rejected_intents_only_reach_the_sender() -> TestResult {
    let (server, addr, join) = start_test_server(test_state()).await?;
    let (mut host, mut guest, version) = started_pair(&ws_url(addr)).await?;

    guest.send_json(json!({ "type": "roll-dice" })).await?;
    let err = guest.recv_type("error").await?;
    assert_eq!(err["code"], "OUT_OF_TURN");

    host.send_json(json!({ "type": "roll-dice", "expectedVersion": version + 7 }))
        .await?;
    let err = host.recv_type("error").await?;
    assert_eq!(err["code"], "OPTIMISTIC_LOCK");
    assert_eq!(err["category"], "conflict");

    // The host's next good intent is the first broadcast either side sees.
    host.send_json(json!({ "type": "roll-dice" })).await?;
    let first = guest.recv_json().await?;
    assert_ne!(first["type"], "error");

    server.stop(true).await;
    let _ = join.await;
    Ok(())
}

#[tokio::test]
async fn only_the_host_starts_the_game() -> TestResult {
    let (server, addr, join) = start_test_server(test_state()).await?;
    let url = ws_url(addr);
    let mut host = WebSocketClient::connect(&url).await?;
    let (welcome, _) = host.create_room("Host", None).await?;
    let code = welcome["roomCode"].as_str().unwrap().to_string();
    let mut guest = WebSocketClient::connect(&url).await?;
    guest.join_room(&code, "Guest").await?;

    guest.send_json(json!({ "type": "start-game" })).await?;
    assert_eq!(guest.recv_type("error").await?["code"], "NOT_HOST");

    host.send_json(json!({ "type": "start-game" })).await?;
    assert_eq!(host.recv_type("error").await?["code"], "PLAYERS_NOT_READY");

    server.stop(true).await;
    let _ = join.await;
    Ok(())
}
