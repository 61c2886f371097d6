// Dropping and reclaiming a seat.

use std::time::Duration;

use serde_json::json;
use uuid::Uuid;

use crate::support::app::test_state;
use crate::support::websocket::{start_test_server, ws_url};
use crate::support::websocket_client::{TestResult, WebSocketClient};

#[tokio::test]
async fn resume_reclaims_the_same_seat() -> TestResult {
    let (server, addr, join) = start_test_server(test_state()).await?;
    let url = ws_url(addr);

    let mut host = WebSocketClient::connect(&url).await?;
    let (welcome, _) = host.create_room("Host", None).await?;
    let code = welcome["roomCode"].as_str().unwrap().to_string();

    let mut guest = WebSocketClient::connect(&url).await?;
    let (guest_welcome, _) = guest.join_room(&code, "Guest").await?;
    let key = guest_welcome["playerKey"].as_str().unwrap().to_string();
    guest.close().await?;

    let dropped = loop {
        let change = host.recv_type("connection-changed").await?;
        if change["connected"] == false {
            break change;
        }
    };
    assert_eq!(dropped["seat"], 1);
    assert_eq!(dropped["connected"], false);

    let mut again = WebSocketClient::connect(&url).await?;
    again
        .send_json(json!({ "type": "resume", "roomCode": code, "playerKey": key }))
        .await?;
    let welcome = again.recv_type("welcome").await?;
    assert_eq!(welcome["seat"], 1);
    assert_eq!(welcome["playerKey"], key.as_str());
    let state = again.recv_type("room-state").await?;
    assert_eq!(state["room"]["members"][1]["connected"], true);
    assert_eq!(state["room"]["members"][1]["name"], "Guest");

    server.stop(true).await;
    let _ = join.await;
    Ok(())
}

#[tokio::test]
async fn unknown_keys_cannot_resume() -> TestResult {
    let (server, addr, join) = start_test_server(test_state()).await?;
    let url = ws_url(addr);
    let mut host = WebSocketClient::connect(&url).await?;
    let (welcome, _) = host.create_room("Host", None).await?;
    let code = welcome["roomCode"].as_str().unwrap().to_string();

    let mut stranger = WebSocketClient::connect(&url).await?;
    stranger
        .send_json(json!({ "type": "resume", "roomCode": code, "playerKey": Uuid::new_v4() }))
        .await?;
    let err = stranger.recv_type("error").await?;
    assert_eq!(err["code"], "NOT_SEATED");

    // The connection stays usable and can still join normally.
    let (welcome, _) = stranger.join_room(&code, "Late").await?;
    assert_eq!(welcome["seat"], 1);

    server.stop(true).await;
    let _ = join.await;
    Ok(())
}

#[tokio::test]
async fn leaving_unbinds_the_connection() -> TestResult {
    let (server, addr, join) = start_test_server(test_state()).await?;
    let url = ws_url(addr);
    let mut host = WebSocketClient::connect(&url).await?;
    let (welcome, _) = host.create_room("Host", None).await?;
    let code = welcome["roomCode"].as_str().unwrap().to_string();
    let mut guest = WebSocketClient::connect(&url).await?;
    guest.join_room(&code, "Guest").await?;

    guest.send_json(json!({ "type": "leave-room" })).await?;
    let left = host.recv_type("member-left").await?;
    assert_eq!(left["seat"], 1);

    // Give the leave reply time to land, then the guest is unseated.
    tokio::time::sleep(Duration::from_millis(50)).await;
    guest.send_json(json!({ "type": "set-ready", "ready": true })).await?;
    assert_eq!(guest.recv_type("error").await?["code"], "NOT_SEATED");

    server.stop(true).await;
    let _ = join.await;
    Ok(())
}

#[tokio::test]
async fn closing_a_stale_socket_keeps_a_resumed_seat_online() -> TestResult {
    let (server, addr, join) = start_test_server(test_state()).await?;
    let url = ws_url(addr);
    let mut host = WebSocketClient::connect(&url).await?;
    let (welcome, _) = host.create_room("Host", None).await?;
    let code = welcome["roomCode"].as_str().unwrap().to_string();

    let mut stale = WebSocketClient::connect(&url).await?;
    let (guest_welcome, _) = stale.join_room(&code, "Guest").await?;
    let key = guest_welcome["playerKey"].as_str().unwrap().to_string();

    // Resume on a second socket while the first is still open.
    let mut fresh = WebSocketClient::connect(&url).await?;
    fresh
        .send_json(json!({ "type": "resume", "roomCode": code, "playerKey": key }))
        .await?;
    assert_eq!(fresh.recv_type("welcome").await?["seat"], 1);
    fresh.recv_type("room-state").await?;

    stale.close().await?;
    tokio::time::sleep(Duration::from_millis(100)).await;

    fresh.send_json(json!({ "type": "set-ready", "ready": true })).await?;
    fresh.recv_type("ready-changed").await?;
    let state = fresh.recv_type("room-state").await?;
    assert_eq!(state["room"]["members"][1]["connected"], true);
    assert_eq!(state["room"]["members"][1]["ready"], true);

    server.stop(true).await;
    let _ = join.await;
    Ok(())
}
