use actix_web::test;
use monopoly_backend::domain::RoomSettings;
use serde_json::Value;

use crate::support::app::{create_test_app, test_state};

#[actix_web::test]
async fn lobby_list_shows_only_open_rooms() {
    let state = test_state();
    let rooms = state.rooms();

    let open = rooms.create_room(RoomSettings::classic()).unwrap();
    open.join("Asha").await.unwrap();

    let mut two_seats = RoomSettings::classic();
    two_seats.max_players = 2;
    let full = rooms.create_room(two_seats).unwrap();
    full.join("A").await.unwrap();
    full.join("B").await.unwrap();

    let app = create_test_app(state).await;
    let req = test::TestRequest::get().uri("/api/rooms").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let listed = body.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["code"], open.code());
    assert_eq!(listed[0]["players"], 1);
    assert_eq!(listed[0]["host"], "Asha");
    assert_eq!(listed[0]["edition"], "classic");
}

#[actix_web::test]
async fn room_snapshot_is_served_by_loose_code() {
    let state = test_state();
    let handle = state.rooms().create_room(RoomSettings::classic()).unwrap();
    handle.join("Asha").await.unwrap();

    let app = create_test_app(state).await;
    let uri = format!("/api/rooms/{}", handle.code().to_lowercase());
    let req = test::TestRequest::get().uri(&uri).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["code"], handle.code());
    assert_eq!(body["status"], "lobby");
    assert_eq!(body["version"], 1);
    assert_eq!(body["members"][0]["name"], "Asha");
    // Player keys never leave the server.
    assert!(!body.to_string().contains("key"));
}
